use std::fmt;

use crate::ir::opcode::Op;

/// Maximum number of operand edges per IR node.
pub const MAX_ARGS: usize = 4;

/// Index into a Function's node arena.
///
/// The arena is append-only, so refs stay valid across pass mutations. The
/// raw index doubles as the node ID: the front-end allocates nodes in program
/// order, so IDs grow monotonically in program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(pub u32);

impl NodeRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Index into a Function's block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRef(pub u32);

impl BlockRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block{}", self.0)
    }
}

/// A single IR node: the opcode header of one operation.
///
/// `size` is the result byte width (1, 2, 4, 8 or 16). Operand edges either
/// reference another node or are `None`, the invalid sentinel used for
/// optional operands such as a memory op's offset.
#[derive(Debug, Clone)]
pub struct Node {
    pub op: Op,
    pub size: u8,
    pub args: [Option<NodeRef>; MAX_ARGS],
    /// Number of operand edges in the function referencing this node.
    pub uses: u32,
}

impl Node {
    pub fn new(op: Op, size: u8, args: &[Option<NodeRef>]) -> Self {
        assert!(
            args.len() == op.num_args(),
            "{} expects {} args, got {}",
            op.name(),
            op.num_args(),
            args.len()
        );
        let mut node_args = [None; MAX_ARGS];
        node_args[..args.len()].copy_from_slice(args);
        Self { op, size, args: node_args, uses: 0 }
    }

    pub fn num_args(&self) -> usize {
        self.op.num_args()
    }

    /// Operand edge at `idx`. `None` is the invalid sentinel.
    pub fn arg(&self, idx: usize) -> Option<NodeRef> {
        self.args[idx]
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.op.name(), self.size)?;
        for i in 0..self.num_args() {
            let sep = if i == 0 { " " } else { ", " };
            match self.args[i] {
                Some(r) => write!(f, "{}{}", sep, r)?,
                None => write!(f, "{}invalid", sep)?,
            }
        }
        // Attribute text comes after the operands.
        let attrs = format!("{}", self.op);
        if let Some(rest) = attrs.strip_prefix(self.op.name()) {
            if !rest.is_empty() {
                write!(f, " ({})", rest.trim_start())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let n = Node::new(Op::Add, 4, &[Some(NodeRef(0)), Some(NodeRef(1))]);
        assert_eq!(n.num_args(), 2);
        assert_eq!(n.arg(0), Some(NodeRef(0)));
        assert_eq!(n.uses, 0);
    }

    #[test]
    fn test_invalid_operand_slot() {
        let n = Node::new(
            Op::LoadMem { offset_type: crate::ir::types::MemOffsetType::Sxtx },
            8,
            &[Some(NodeRef(3)), None],
        );
        assert_eq!(n.arg(1), None);
        let text = format!("{}", n);
        assert!(text.contains("invalid"));
    }

    #[test]
    #[should_panic]
    fn test_arity_mismatch_panics() {
        Node::new(Op::Add, 4, &[Some(NodeRef(0))]);
    }
}
