pub mod constant_propagation;

pub use constant_propagation::ConstantPropagation;
