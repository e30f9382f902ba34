pub mod emitter;
pub mod function;
pub mod node;
pub mod opcode;
pub mod opt;
pub mod types;

pub use emitter::IREmitter;
pub use function::{Block, Function};
pub use node::{BlockRef, Node, NodeRef, MAX_ARGS};
pub use opcode::Op;
pub use types::{CondClass, MemOffsetType, ShiftType};
