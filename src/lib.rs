//! IR core of a dynamic binary translator.
//!
//! A front-end lifts guest (x86-family) instructions into the linear, sized
//! IR defined in [`ir`]; the optimization passes in [`ir::opt`] rewrite it in
//! place before a back-end emits host (AArch64-like) code. Host-encoding
//! knowledge needed by the optimizer lives in [`backend`].

pub mod backend;
pub mod host_features;
pub mod ir;
