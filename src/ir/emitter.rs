use crate::ir::function::Function;
use crate::ir::node::{BlockRef, Node, NodeRef};
use crate::ir::opcode::Op;
use crate::ir::types::{CondClass, MemOffsetType, ShiftType};

/// Builder over a [`Function`] — one constructor per opcode plus a write
/// cursor controlling where new nodes land in program order.
///
/// The front-end appends; optimization passes reposition the cursor so that
/// a newly created node dominates the node that will reference it.
pub struct IREmitter<'a> {
    pub func: &'a mut Function,
    /// (block index, insertion position). Advances after every emission so
    /// consecutive emissions stay in order.
    cursor: Option<(usize, usize)>,
}

impl<'a> IREmitter<'a> {
    pub fn new(func: &'a mut Function) -> Self {
        Self { func, cursor: None }
    }

    /// Start a new block and aim the cursor at it.
    pub fn begin_block(&mut self) -> BlockRef {
        let b = self.func.add_block();
        self.cursor = Some((b.index(), 0));
        b
    }

    /// Aim the cursor so the next emission lands immediately after `node`.
    pub fn set_write_cursor(&mut self, node: NodeRef) {
        let (b, pos) = self.func.position_of(node).expect("cursor target not in function");
        self.cursor = Some((b, pos + 1));
    }

    /// Aim the cursor so the next emission lands immediately before `node`.
    pub fn set_write_cursor_before(&mut self, node: NodeRef) {
        let (b, pos) = self.func.position_of(node).expect("cursor target not in function");
        self.cursor = Some((b, pos));
    }

    fn emit(&mut self, op: Op, size: u8, args: &[Option<NodeRef>]) -> NodeRef {
        let (block, pos) = self.cursor.expect("no write cursor set");
        let r = self.func.insert_node(block, pos, Node::new(op, size, args));
        self.cursor = Some((block, pos + 1));
        r
    }

    // --- Constants ---

    /// Materialize a 64-bit literal.
    pub fn constant(&mut self, value: u64) -> NodeRef {
        self.emit(Op::Constant { value }, 8, &[])
    }

    /// An immediate the back-end encodes directly into a host instruction
    /// instead of materializing into a register.
    pub fn inline_constant(&mut self, value: u64) -> NodeRef {
        self.emit(Op::InlineConstant { value }, 8, &[])
    }

    pub fn entrypoint_offset(&mut self, size: u8, offset: i64) -> NodeRef {
        self.emit(Op::EntrypointOffset { offset }, size, &[])
    }

    pub fn inline_entrypoint_offset(&mut self, size: u8, offset: i64) -> NodeRef {
        self.emit(Op::InlineEntrypointOffset { offset }, size, &[])
    }

    // --- Integer arithmetic ---

    pub fn add(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Add, size, &[Some(a), Some(b)])
    }

    pub fn sub(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Sub, size, &[Some(a), Some(b)])
    }

    pub fn add_with_flags(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::AddWithFlags, size, &[Some(a), Some(b)])
    }

    pub fn sub_with_flags(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::SubWithFlags, size, &[Some(a), Some(b)])
    }

    pub fn add_nzcv(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::AddNZCV, size, &[Some(a), Some(b)])
    }

    pub fn sub_nzcv(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::SubNZCV, size, &[Some(a), Some(b)])
    }

    pub fn adc(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Adc, size, &[Some(a), Some(b)])
    }

    pub fn adc_with_flags(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::AdcWithFlags, size, &[Some(a), Some(b)])
    }

    pub fn neg(&mut self, size: u8, a: NodeRef) -> NodeRef {
        self.emit(Op::Neg, size, &[Some(a)])
    }

    pub fn mul(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Mul, size, &[Some(a), Some(b)])
    }

    pub fn sub_shift(
        &mut self,
        size: u8,
        a: NodeRef,
        b: NodeRef,
        shift: ShiftType,
        shift_amount: u8,
    ) -> NodeRef {
        self.emit(Op::SubShift { shift, shift_amount }, size, &[Some(a), Some(b)])
    }

    // --- Bitwise ---

    pub fn and(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::And, size, &[Some(a), Some(b)])
    }

    pub fn and_with_flags(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::AndWithFlags, size, &[Some(a), Some(b)])
    }

    pub fn andn(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Andn, size, &[Some(a), Some(b)])
    }

    pub fn or(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Or, size, &[Some(a), Some(b)])
    }

    pub fn xor(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Xor, size, &[Some(a), Some(b)])
    }

    pub fn or_lshl(&mut self, size: u8, a: NodeRef, b: NodeRef, bit_shift: u8) -> NodeRef {
        self.emit(Op::OrLshl { bit_shift }, size, &[Some(a), Some(b)])
    }

    pub fn or_lshr(&mut self, size: u8, a: NodeRef, b: NodeRef, bit_shift: u8) -> NodeRef {
        self.emit(Op::OrLshr { bit_shift }, size, &[Some(a), Some(b)])
    }

    // --- Shifts ---

    pub fn lshl(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Lshl, size, &[Some(a), Some(b)])
    }

    pub fn lshr(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Lshr, size, &[Some(a), Some(b)])
    }

    pub fn ashr(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Ashr, size, &[Some(a), Some(b)])
    }

    pub fn ror(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::Ror, size, &[Some(a), Some(b)])
    }

    // --- Bitfields ---

    pub fn bfe(&mut self, size: u8, width: u8, lsb: u8, src: NodeRef) -> NodeRef {
        self.emit(Op::Bfe { width, lsb }, size, &[Some(src)])
    }

    pub fn sbfe(&mut self, size: u8, width: u8, lsb: u8, src: NodeRef) -> NodeRef {
        self.emit(Op::Sbfe { width, lsb }, size, &[Some(src)])
    }

    pub fn bfi(&mut self, size: u8, width: u8, lsb: u8, dst: NodeRef, src: NodeRef) -> NodeRef {
        self.emit(Op::Bfi { width, lsb }, size, &[Some(dst), Some(src)])
    }

    // --- Flag generation and conditionals ---

    pub fn test_nz(&mut self, size: u8, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::TestNZ, size, &[Some(a), Some(b)])
    }

    pub fn rmif_nzcv(&mut self, src: NodeRef, rotate: u8, mask: u8) -> NodeRef {
        self.emit(Op::RmifNZCV { rotate, mask }, 8, &[Some(src)])
    }

    pub fn cond_add_nzcv(&mut self, size: u8, cond: CondClass, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::CondAddNZCV { cond }, size, &[Some(a), Some(b)])
    }

    pub fn cond_sub_nzcv(&mut self, size: u8, cond: CondClass, a: NodeRef, b: NodeRef) -> NodeRef {
        self.emit(Op::CondSubNZCV { cond }, size, &[Some(a), Some(b)])
    }

    pub fn select(
        &mut self,
        size: u8,
        cond: CondClass,
        cmp1: NodeRef,
        cmp2: NodeRef,
        true_val: NodeRef,
        false_val: NodeRef,
    ) -> NodeRef {
        self.emit(
            Op::Select { cond },
            size,
            &[Some(cmp1), Some(cmp2), Some(true_val), Some(false_val)],
        )
    }

    pub fn nzcv_select(
        &mut self,
        size: u8,
        cond: CondClass,
        true_val: NodeRef,
        false_val: NodeRef,
    ) -> NodeRef {
        self.emit(Op::NZCVSelect { cond }, size, &[Some(true_val), Some(false_val)])
    }

    // --- Control flow ---

    pub fn jump(&mut self, target: BlockRef) -> NodeRef {
        self.emit(Op::Jump { target }, 0, &[])
    }

    pub fn cond_jump(
        &mut self,
        size: u8,
        cond: CondClass,
        cmp1: NodeRef,
        cmp2: NodeRef,
        true_target: BlockRef,
        false_target: BlockRef,
    ) -> NodeRef {
        self.emit(
            Op::CondJump { cond, true_target, false_target },
            size,
            &[Some(cmp1), Some(cmp2)],
        )
    }

    pub fn exit_function(&mut self, new_rip: NodeRef) -> NodeRef {
        self.emit(Op::ExitFunction, 0, &[Some(new_rip)])
    }

    // --- Memory and guest context ---

    pub fn load_mem(
        &mut self,
        size: u8,
        addr: NodeRef,
        offset: Option<NodeRef>,
        offset_type: MemOffsetType,
    ) -> NodeRef {
        self.emit(Op::LoadMem { offset_type }, size, &[Some(addr), offset])
    }

    pub fn store_mem(
        &mut self,
        size: u8,
        addr: NodeRef,
        value: NodeRef,
        offset: Option<NodeRef>,
        offset_type: MemOffsetType,
    ) -> NodeRef {
        self.emit(Op::StoreMem { offset_type }, size, &[Some(addr), Some(value), offset])
    }

    pub fn load_mem_tso(
        &mut self,
        size: u8,
        addr: NodeRef,
        offset: Option<NodeRef>,
        offset_type: MemOffsetType,
    ) -> NodeRef {
        self.emit(Op::LoadMemTSO { offset_type }, size, &[Some(addr), offset])
    }

    pub fn store_mem_tso(
        &mut self,
        size: u8,
        addr: NodeRef,
        value: NodeRef,
        offset: Option<NodeRef>,
        offset_type: MemOffsetType,
    ) -> NodeRef {
        self.emit(Op::StoreMemTSO { offset_type }, size, &[Some(addr), Some(value), offset])
    }

    pub fn prefetch(
        &mut self,
        size: u8,
        addr: NodeRef,
        offset: Option<NodeRef>,
        offset_type: MemOffsetType,
    ) -> NodeRef {
        self.emit(Op::Prefetch { offset_type }, size, &[Some(addr), offset])
    }

    pub fn load_context(&mut self, size: u8, offset: u32) -> NodeRef {
        self.emit(Op::LoadContext { offset }, size, &[])
    }

    pub fn store_context(&mut self, size: u8, offset: u32, value: NodeRef) -> NodeRef {
        self.emit(Op::StoreContext { offset }, size, &[Some(value)])
    }

    pub fn mem_cpy(
        &mut self,
        size: u8,
        dest: NodeRef,
        src: NodeRef,
        length: NodeRef,
        direction: NodeRef,
    ) -> NodeRef {
        self.emit(Op::MemCpy, size, &[Some(dest), Some(src), Some(length), Some(direction)])
    }

    pub fn mem_set(
        &mut self,
        size: u8,
        dest: NodeRef,
        value: NodeRef,
        length: NodeRef,
        direction: NodeRef,
    ) -> NodeRef {
        self.emit(Op::MemSet, size, &[Some(dest), Some(value), Some(length), Some(direction)])
    }

    // --- Vector ---

    pub fn vmov(&mut self, size: u8, src: NodeRef) -> NodeRef {
        self.emit(Op::VMov, size, &[Some(src)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emissions_stay_in_order() {
        let mut func = Function::new();
        let mut emit = IREmitter::new(&mut func);
        let b = emit.begin_block();
        let a = emit.constant(1);
        let c = emit.constant(2);
        let sum = emit.add(8, a, c);

        assert_eq!(func.block_code(b), &[a, c, sum]);
    }

    #[test]
    fn test_cursor_before_inserts_dominating_node() {
        let mut func = Function::new();
        let mut emit = IREmitter::new(&mut func);
        let b = emit.begin_block();
        let x = emit.load_context(8, 0);
        let sink = emit.store_context(8, 8, x);

        emit.set_write_cursor_before(sink);
        let c = emit.constant(5);
        assert_eq!(emit.func.block_code(b), &[x, c, sink]);

        // A second emission lands after the first, still before the sink.
        let c2 = emit.constant(6);
        assert_eq!(emit.func.block_code(b), &[x, c, c2, sink]);
    }

    #[test]
    fn test_cursor_after_node() {
        let mut func = Function::new();
        let mut emit = IREmitter::new(&mut func);
        let b = emit.begin_block();
        let x = emit.load_context(8, 0);
        let y = emit.load_context(8, 8);

        emit.set_write_cursor(x);
        let c = emit.constant(1);
        assert_eq!(func.block_code(b), &[x, c, y]);
    }

    #[test]
    fn test_blocks_are_ordered() {
        let mut func = Function::new();
        let mut emit = IREmitter::new(&mut func);
        let b0 = emit.begin_block();
        let a = emit.constant(1);
        let b1 = emit.begin_block();
        let c = emit.constant(2);

        assert_eq!(func.block_count(), 2);
        assert_eq!(func.block_code(b0), &[a]);
        assert_eq!(func.block_code(b1), &[c]);
        assert_eq!(func.all_code(), vec![a, c]);
    }
}
