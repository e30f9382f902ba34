use std::fmt;

use crate::ir::node::BlockRef;
use crate::ir::types::{CondClass, MemOffsetType, ShiftType};

/// IR opcodes for the x86-lifting IR.
///
/// Unlike a width-suffixed opcode set, every op here is sized by the node
/// header's byte width; attributes that are part of the operation itself
/// (immediate values, bitfield positions, offset modes) ride on the variant.
/// Runtime data always flows through operand edges, never through attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    // --- Constants and entrypoint-relative values ---
    Constant { value: u64 },
    InlineConstant { value: u64 },
    EntrypointOffset { offset: i64 },
    InlineEntrypointOffset { offset: i64 },

    // --- Integer arithmetic ---
    Add,
    Sub,
    AddWithFlags,
    SubWithFlags,
    AddNZCV,
    SubNZCV,
    Adc,
    AdcWithFlags,
    Neg,
    Mul,
    SubShift { shift: ShiftType, shift_amount: u8 },

    // --- Bitwise ---
    And,
    AndWithFlags,
    Andn,
    Or,
    Xor,
    OrLshl { bit_shift: u8 },
    OrLshr { bit_shift: u8 },

    // --- Shifts ---
    Lshl,
    Lshr,
    Ashr,
    Ror,

    // --- Bitfields ---
    Bfe { width: u8, lsb: u8 },
    Sbfe { width: u8, lsb: u8 },
    Bfi { width: u8, lsb: u8 },

    // --- Flag generation and conditionals ---
    TestNZ,
    RmifNZCV { rotate: u8, mask: u8 },
    CondAddNZCV { cond: CondClass },
    CondSubNZCV { cond: CondClass },
    Select { cond: CondClass },
    NZCVSelect { cond: CondClass },

    // --- Control flow ---
    Jump { target: BlockRef },
    CondJump { cond: CondClass, true_target: BlockRef, false_target: BlockRef },
    ExitFunction,

    // --- Memory and guest context ---
    LoadMem { offset_type: MemOffsetType },
    StoreMem { offset_type: MemOffsetType },
    LoadMemTSO { offset_type: MemOffsetType },
    StoreMemTSO { offset_type: MemOffsetType },
    Prefetch { offset_type: MemOffsetType },
    LoadContext { offset: u32 },
    StoreContext { offset: u32 },
    MemCpy,
    MemSet,

    // --- Vector ---
    VMov,
}

impl Op {
    /// Number of operand edges this opcode carries.
    pub fn num_args(&self) -> usize {
        use Op::*;
        match self {
            Constant { .. } | InlineConstant { .. } | EntrypointOffset { .. }
            | InlineEntrypointOffset { .. } | LoadContext { .. } | Jump { .. } => 0,

            Neg | VMov | Bfe { .. } | Sbfe { .. } | RmifNZCV { .. } | ExitFunction
            | StoreContext { .. } => 1,

            Add | Sub | AddWithFlags | SubWithFlags | AddNZCV | SubNZCV | Adc
            | AdcWithFlags | Mul | SubShift { .. } | And | AndWithFlags | Andn | Or
            | Xor | OrLshl { .. } | OrLshr { .. } | Lshl | Lshr | Ashr | Ror
            | Bfi { .. } | TestNZ | CondAddNZCV { .. } | CondSubNZCV { .. }
            | NZCVSelect { .. } | CondJump { .. } | LoadMem { .. } | LoadMemTSO { .. }
            | Prefetch { .. } => 2,

            StoreMem { .. } | StoreMemTSO { .. } => 3,

            Select { .. } | MemCpy | MemSet => 4,
        }
    }

    /// True if the op does something beyond producing a result value:
    /// writes memory or context, writes host flags, or transfers control.
    /// Such ops are never rewritten into a plain `Constant`.
    pub fn has_side_effects(&self) -> bool {
        use Op::*;
        matches!(
            self,
            AddWithFlags | SubWithFlags | AddNZCV | SubNZCV | AdcWithFlags | TestNZ
                | RmifNZCV { .. } | CondAddNZCV { .. } | CondSubNZCV { .. }
                | Jump { .. } | CondJump { .. } | ExitFunction
                | StoreMem { .. } | StoreMemTSO { .. } | StoreContext { .. }
                | Prefetch { .. } | MemCpy | MemSet
        )
    }

    /// Short mnemonic for printing.
    pub fn name(&self) -> &'static str {
        use Op::*;
        match self {
            Constant { .. } => "Constant",
            InlineConstant { .. } => "InlineConstant",
            EntrypointOffset { .. } => "EntrypointOffset",
            InlineEntrypointOffset { .. } => "InlineEntrypointOffset",
            Add => "Add",
            Sub => "Sub",
            AddWithFlags => "AddWithFlags",
            SubWithFlags => "SubWithFlags",
            AddNZCV => "AddNZCV",
            SubNZCV => "SubNZCV",
            Adc => "Adc",
            AdcWithFlags => "AdcWithFlags",
            Neg => "Neg",
            Mul => "Mul",
            SubShift { .. } => "SubShift",
            And => "And",
            AndWithFlags => "AndWithFlags",
            Andn => "Andn",
            Or => "Or",
            Xor => "Xor",
            OrLshl { .. } => "OrLshl",
            OrLshr { .. } => "OrLshr",
            Lshl => "Lshl",
            Lshr => "Lshr",
            Ashr => "Ashr",
            Ror => "Ror",
            Bfe { .. } => "Bfe",
            Sbfe { .. } => "Sbfe",
            Bfi { .. } => "Bfi",
            TestNZ => "TestNZ",
            RmifNZCV { .. } => "RmifNZCV",
            CondAddNZCV { .. } => "CondAddNZCV",
            CondSubNZCV { .. } => "CondSubNZCV",
            Select { .. } => "Select",
            NZCVSelect { .. } => "NZCVSelect",
            Jump { .. } => "Jump",
            CondJump { .. } => "CondJump",
            ExitFunction => "ExitFunction",
            LoadMem { .. } => "LoadMem",
            StoreMem { .. } => "StoreMem",
            LoadMemTSO { .. } => "LoadMemTSO",
            StoreMemTSO { .. } => "StoreMemTSO",
            Prefetch { .. } => "Prefetch",
            LoadContext { .. } => "LoadContext",
            StoreContext { .. } => "StoreContext",
            MemCpy => "MemCpy",
            MemSet => "MemSet",
            VMov => "VMov",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        match self {
            Op::Constant { value } | Op::InlineConstant { value } => {
                write!(f, " #{:#x}", value)
            }
            Op::EntrypointOffset { offset } | Op::InlineEntrypointOffset { offset } => {
                write!(f, " entry{:+#x}", offset)
            }
            Op::SubShift { shift, shift_amount } => write!(f, " {} #{}", shift, shift_amount),
            Op::OrLshl { bit_shift } | Op::OrLshr { bit_shift } => {
                write!(f, " #{}", bit_shift)
            }
            Op::Bfe { width, lsb } | Op::Sbfe { width, lsb } | Op::Bfi { width, lsb } => {
                write!(f, " lsb={} width={}", lsb, width)
            }
            Op::RmifNZCV { rotate, mask } => write!(f, " rot={} mask={:#x}", rotate, mask),
            Op::CondAddNZCV { cond }
            | Op::CondSubNZCV { cond }
            | Op::Select { cond }
            | Op::NZCVSelect { cond } => write!(f, " {}", cond),
            Op::Jump { target } => write!(f, " -> {}", target),
            Op::CondJump { cond, true_target, false_target } => {
                write!(f, " {} -> {}, {}", cond, true_target, false_target)
            }
            Op::LoadMem { offset_type }
            | Op::StoreMem { offset_type }
            | Op::LoadMemTSO { offset_type }
            | Op::StoreMemTSO { offset_type }
            | Op::Prefetch { offset_type } => write!(f, " [{}]", offset_type),
            Op::LoadContext { offset } | Op::StoreContext { offset } => {
                write!(f, " ctx+{:#x}", offset)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_metadata() {
        assert_eq!(Op::Constant { value: 0 }.num_args(), 0);
        assert_eq!(Op::Neg.num_args(), 1);
        assert_eq!(Op::Add.num_args(), 2);
        assert_eq!(Op::StoreMem { offset_type: MemOffsetType::Sxtx }.num_args(), 3);
        assert_eq!(Op::Select { cond: CondClass::Eq }.num_args(), 4);
    }

    #[test]
    fn test_side_effects() {
        assert!(!Op::Add.has_side_effects());
        assert!(Op::AddWithFlags.has_side_effects());
        assert!(Op::StoreMem { offset_type: MemOffsetType::Sxtx }.has_side_effects());
        assert!(!Op::NZCVSelect { cond: CondClass::Eq }.has_side_effects());
        assert!(Op::ExitFunction.has_side_effects());
    }

    #[test]
    fn test_display_attributes() {
        let op = Op::Bfe { width: 8, lsb: 4 };
        assert_eq!(format!("{}", op), "Bfe lsb=4 width=8");
        let op = Op::Constant { value: 0x10 };
        assert_eq!(format!("{}", op), "Constant #0x10");
    }
}
