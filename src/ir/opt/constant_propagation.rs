use std::collections::HashMap;

use crate::backend::a64::imm::{
    has_consecutive_bits, is_imm_add_sub, is_imm_logical, is_imm_memory, is_tso_imm9,
};
use crate::host_features::HostFeatures;
use crate::ir::emitter::IREmitter;
use crate::ir::function::Function;
use crate::ir::node::{BlockRef, NodeRef};
use crate::ir::opcode::Op;
use crate::ir::types::{MemOffsetType, ShiftType};

/// Result width mask for a node size in bytes. Sizes of 8 bytes and up
/// saturate to the all-ones mask (vector headers never fold), and size 0 must
/// not shift by 64.
fn get_mask(size: u8) -> u64 {
    let bits = size as u32 * 8;
    if bits == 0 || bits >= 64 {
        u64::MAX
    } else {
        u64::MAX >> (64 - bits)
    }
}

/// Variable shift amounts wrap at the operand width on the host: 5 bits of
/// shift for 32-bit-and-below operations, 6 bits for 64-bit.
fn shift_mask(size: u8) -> u64 {
    if size == 8 {
        63
    } else {
        31
    }
}

fn source_bit_mask(width: u8) -> u64 {
    if width == 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Constant propagation, zero-extend elimination, address-gen coalescing,
/// constant pooling and constant inlining.
///
/// Runs three phases in order over the current IR:
/// 1. per-block constant pooling and coalescing of nearby constant memory
///    addresses into base+offset form,
/// 2. a whole-function constant folding / peephole sweep,
/// 3. optionally, rewriting constant operands the back-end can encode
///    directly into an inline-immediate form.
///
/// The pass is best-effort and infallible: a node that matches no rule is
/// left untouched.
pub struct ConstantPropagation {
    inline_constants: bool,
    supports_tso_imm9: bool,
    const_pool: HashMap<u64, ConstPoolData>,
    addressgen_consts: Vec<(NodeRef, u64)>,
    /// Inline constants pool well; equal immediates share one node per run.
    inline_constant_gen: HashMap<u64, NodeRef>,
}

struct ConstPoolData {
    node: NodeRef,
    node_id: u32,
}

/// Bounds how far apart two uses of a pooled constant may be. Unbounded
/// pooling stretches live ranges until register allocator interference
/// pressure makes long constant-heavy blocks crawl.
const CONSTANT_POOL_RANGE_LIMIT: u32 = 500;

impl ConstantPropagation {
    pub fn new(inline_constants: bool, supports_tso_imm9: bool) -> Self {
        Self {
            inline_constants,
            supports_tso_imm9,
            const_pool: HashMap::new(),
            addressgen_consts: Vec::new(),
            inline_constant_gen: HashMap::new(),
        }
    }

    /// Convenience constructor deriving the TSO-offset switch from detected
    /// host features.
    pub fn from_host_features(inline_constants: bool, features: HostFeatures) -> Self {
        Self::new(inline_constants, features.supports_tso_imm9())
    }

    /// Run all phases over `emit`'s function, mutating it in place.
    pub fn run(&mut self, emit: &mut IREmitter) {
        self.handle_constant_pools(emit);

        for bi in 0..emit.func.block_count() {
            let block = BlockRef(bi as u32);
            // Walk by position so replacement nodes spliced in after the
            // current one are themselves visited (a strength-reduced shift
            // may immediately qualify for shift-by-zero elimination).
            let mut i = 0;
            while i < emit.func.block_code(block).len() {
                let node = emit.func.block_code(block)[i];
                propagate_node(emit, node);
                i += 1;
            }
        }

        if self.inline_constants {
            self.constant_inlining(emit);
        }
    }

    /// Phase 1: within each block, pool equal constants under a live-range
    /// bound and rewrite constant memory addresses near an earlier constant
    /// address as base+offset.
    fn handle_constant_pools(&mut self, emit: &mut IREmitter) {
        for bi in 0..emit.func.block_count() {
            let block = BlockRef(bi as u32);
            let code: Vec<NodeRef> = emit.func.block_code(block).to_vec();
            for node in code {
                let op = emit.func.node(node).op;
                match op {
                    Op::LoadMem { .. } | Op::StoreMem { .. } => {
                        let (addr_index, offset_index) = match op {
                            Op::LoadMem { .. } => (0, 1),
                            _ => (0, 2),
                        };
                        let addr_edge = emit.func.node(node).arg(addr_index);
                        let addr = emit.func.as_constant(addr_edge);
                        if let (Some(addr_node), Some(addr)) = (addr_edge, addr) {
                            if emit.func.node(node).arg(offset_index).is_none() {
                                let base = self
                                    .addressgen_consts
                                    .iter()
                                    .find(|entry| addr.wrapping_sub(entry.1) < 65536)
                                    .copied();
                                if let Some((base_node, base_addr)) = base {
                                    emit.func.replace_arg(node, addr_index, base_node);
                                    let offset = emit.constant(addr.wrapping_sub(base_addr));
                                    emit.func.replace_arg(node, offset_index, offset);
                                } else {
                                    self.addressgen_consts.push((addr_node, addr));
                                }
                            }
                        }
                    }
                    Op::Constant { value } => {
                        let new_id = emit.func.node_id(node);
                        match self.const_pool.get(&value).map(|e| (e.node, e.node_id)) {
                            Some((_, old_id))
                                if new_id.wrapping_sub(old_id) > CONSTANT_POOL_RANGE_LIMIT =>
                            {
                                // Too far from the tracked node to reuse;
                                // track this one instead.
                                self.const_pool
                                    .insert(value, ConstPoolData { node, node_id: new_id });
                            }
                            Some((rep, _)) => {
                                emit.func.replace_uses_with_after(node, rep, node);
                            }
                            None => {
                                self.const_pool
                                    .insert(value, ConstPoolData { node, node_id: new_id });
                            }
                        }
                    }
                    _ => {}
                }
                // Keep the cursor trailing the walk so offset constants land
                // directly before the memory op that needs them.
                emit.set_write_cursor(node);
            }
            self.addressgen_consts.clear();
            self.const_pool.clear();
        }
    }

    /// Phase 3: swap constant operands into inline-immediate form wherever
    /// the host encoding window allows.
    fn constant_inlining(&mut self, emit: &mut IREmitter) {
        self.inline_constant_gen.clear();

        for node in emit.func.all_code() {
            let op = emit.func.node(node).op;
            let size = emit.func.node(node).size;
            match op {
                Op::Lshr | Op::Ashr | Op::Ror | Op::Lshl => {
                    if let Some(c) = emit.func.as_constant(emit.func.node(node).arg(1)) {
                        let arg = emit.func.node(node).arg(1).unwrap();
                        emit.set_write_cursor(arg);
                        // The host wraps the shift amount; bake the wrap in.
                        let c = if size <= 4 { c & 31 } else { c & 63 };
                        let imm = self.create_inline_constant(emit, c);
                        emit.func.replace_arg(node, 1, imm);
                    }
                }
                Op::Add | Op::Sub | Op::AddNZCV | Op::SubNZCV | Op::AddWithFlags
                | Op::SubWithFlags => {
                    if let Some(c2) = emit.func.as_constant(emit.func.node(node).arg(1)) {
                        // 8/16-bit operations never take an immediate; nothing
                        // is in bounds after the JIT's width shift.
                        if is_imm_add_sub(c2) && size >= 4 {
                            self.inline_arg(emit, node, 1, c2);
                        }
                    } else if matches!(op, Op::SubNZCV | Op::SubWithFlags | Op::Sub) {
                        if emit.func.as_constant(emit.func.node(node).arg(0)) == Some(0) {
                            self.inline_arg(emit, node, 0, 0);
                        }
                    }
                }
                Op::Adc | Op::AdcWithFlags | Op::RmifNZCV { .. } => {
                    if emit.func.as_constant(emit.func.node(node).arg(0)) == Some(0) {
                        self.inline_arg(emit, node, 0, 0);
                    }
                }
                Op::CondAddNZCV { .. } | Op::CondSubNZCV { .. } => {
                    if let Some(c2) = emit.func.as_constant(emit.func.node(node).arg(1)) {
                        if is_imm_add_sub(c2) {
                            self.inline_arg(emit, node, 1, c2);
                        }
                    }
                    if emit.func.as_constant(emit.func.node(node).arg(0)) == Some(0) {
                        self.inline_arg(emit, node, 0, 0);
                    }
                }
                Op::TestNZ => {
                    if let Some(c) = emit.func.as_constant(emit.func.node(node).arg(1)) {
                        if is_imm_logical(c, size as u32 * 8) {
                            self.inline_arg(emit, node, 1, c);
                        }
                    }
                }
                Op::Select { .. } => {
                    if let Some(c1) = emit.func.as_constant(emit.func.node(node).arg(1)) {
                        if is_imm_add_sub(c1) {
                            self.inline_arg(emit, node, 1, c1);
                        }
                    }

                    let all_ones = if size == 8 { u64::MAX } else { 0xffff_ffff };
                    let c2 = emit.func.as_constant(emit.func.node(node).arg(2));
                    let c3 = emit.func.as_constant(emit.func.node(node).arg(3));
                    if let (Some(c2), Some(c3)) = (c2, c3) {
                        if (c2 == 1 || c2 == all_ones) && c3 == 0 {
                            let arg = emit.func.node(node).arg(2).unwrap();
                            emit.set_write_cursor(arg);
                            let true_imm = self.create_inline_constant(emit, c2);
                            emit.func.replace_arg(node, 2, true_imm);
                            let false_imm = self.create_inline_constant(emit, c3);
                            emit.func.replace_arg(node, 3, false_imm);
                        }
                    }
                }
                Op::NZCVSelect { .. } => {
                    let all_ones = if size == 8 { u64::MAX } else { 0xffff_ffff };

                    // The false value may always be zero, but the true value
                    // can only be the special 1 / ~0 constant alongside it.
                    if emit.func.as_constant(emit.func.node(node).arg(1)) == Some(0) {
                        self.inline_arg(emit, node, 1, 0);

                        if let Some(c0) = emit.func.as_constant(emit.func.node(node).arg(0)) {
                            if c0 == 1 || c0 == all_ones {
                                self.inline_arg(emit, node, 0, c0);
                            }
                        }
                    }
                }
                Op::CondJump { .. } => {
                    if let Some(c2) = emit.func.as_constant(emit.func.node(node).arg(1)) {
                        if is_imm_add_sub(c2) {
                            self.inline_arg(emit, node, 1, c2);
                        }
                    }
                }
                Op::ExitFunction => {
                    let rip_edge = emit.func.node(node).arg(0);
                    if let Some(c) = emit.func.as_constant(rip_edge) {
                        self.inline_arg(emit, node, 0, c);
                    } else if let Some(rip) = rip_edge {
                        if let Op::EntrypointOffset { offset } = emit.func.node(rip).op {
                            let eo_size = emit.func.node(rip).size;
                            emit.set_write_cursor(rip);
                            let imm = emit.inline_entrypoint_offset(eo_size, offset);
                            emit.func.replace_arg(node, 0, imm);
                        }
                    }
                }
                Op::Or | Op::Xor | Op::And | Op::AndWithFlags | Op::Andn => {
                    if let Some(c2) = emit.func.as_constant(emit.func.node(node).arg(1)) {
                        if is_imm_logical(c2, size as u32 * 8) {
                            self.inline_arg(emit, node, 1, c2);
                        }
                    }
                }
                Op::LoadMem { offset_type } | Op::StoreMem { offset_type }
                | Op::Prefetch { offset_type } => {
                    let offset_index = match op {
                        Op::StoreMem { .. } => 2,
                        _ => 1,
                    };
                    if offset_type == MemOffsetType::Sxtx {
                        if let Some(c) =
                            emit.func.as_constant(emit.func.node(node).arg(offset_index))
                        {
                            if is_imm_memory(c, size) {
                                self.inline_arg(emit, node, offset_index, c);
                            }
                        }
                    }
                }
                Op::LoadMemTSO { offset_type } | Op::StoreMemTSO { offset_type } => {
                    let offset_index = match op {
                        Op::StoreMemTSO { .. } => 2,
                        _ => 1,
                    };
                    if self.supports_tso_imm9 && offset_type == MemOffsetType::Sxtx {
                        if let Some(c) =
                            emit.func.as_constant(emit.func.node(node).arg(offset_index))
                        {
                            if is_tso_imm9(c) {
                                self.inline_arg(emit, node, offset_index, c);
                            }
                        }
                    }
                }
                Op::MemCpy | Op::MemSet => {
                    const DIRECTION_INDEX: usize = 3;
                    if let Some(c) =
                        emit.func.as_constant(emit.func.node(node).arg(DIRECTION_INDEX))
                    {
                        self.inline_arg(emit, node, DIRECTION_INDEX, c);
                    }
                }
                _ => {}
            }
        }
    }

    /// Swap `node`'s operand `index` (currently a `Constant` of `value`) for
    /// an inline constant positioned at the original constant's site.
    fn inline_arg(&mut self, emit: &mut IREmitter, node: NodeRef, index: usize, value: u64) {
        let arg = emit.func.node(node).arg(index).unwrap();
        emit.set_write_cursor(arg);
        let imm = self.create_inline_constant(emit, value);
        emit.func.replace_arg(node, index, imm);
    }

    fn create_inline_constant(&mut self, emit: &mut IREmitter, value: u64) -> NodeRef {
        if let Some(&existing) = self.inline_constant_gen.get(&value) {
            return existing;
        }
        let imm = emit.inline_constant(value);
        self.inline_constant_gen.insert(value, imm);
        imm
    }
}

/// Phase 2 dispatch: per-opcode folding and peephole rewrites.
fn propagate_node(emit: &mut IREmitter, node: NodeRef) {
    let op = emit.func.node(node).op;
    match op {
        Op::Add | Op::Sub | Op::AddWithFlags | Op::SubWithFlags => fold_add_sub(emit, node),
        Op::SubShift { shift, shift_amount } => fold_sub_shift(emit, node, shift, shift_amount),
        Op::And => fold_and(emit, node),
        Op::Or => fold_or(emit, node),
        Op::OrLshl { bit_shift } => {
            let size = emit.func.node(node).size;
            if let (Some(c1), Some(c2)) = both_constants(emit.func, node) {
                let value = c1 | (c2 << bit_shift);
                emit.func.replace_with_constant(node, value & get_mask(size));
            }
        }
        Op::OrLshr { bit_shift } => {
            let size = emit.func.node(node).size;
            if let (Some(c1), Some(c2)) = both_constants(emit.func, node) {
                let value = c1 | (c2 >> bit_shift);
                emit.func.replace_with_constant(node, value & get_mask(size));
            }
        }
        Op::Xor => fold_xor(emit, node),
        Op::Neg => {
            let size = emit.func.node(node).size;
            if let Some(c) = emit.func.as_constant(emit.func.node(node).arg(0)) {
                emit.func.replace_with_constant(node, c.wrapping_neg() & get_mask(size));
            }
        }
        Op::Lshl => fold_shift(emit, node, |a, b| a << b),
        Op::Lshr => fold_shift(emit, node, |a, b| a >> b),
        Op::Bfe { width, lsb } => fold_bfe(emit, node, width, lsb),
        Op::Sbfe { width, lsb } => fold_sbfe(emit, node, width, lsb),
        Op::Bfi { width, lsb } => fold_bfi(emit, node, width, lsb),
        Op::Mul => fold_mul(emit, node),
        Op::VMov => {
            let size = emit.func.node(node).size;
            if let Some(src) = emit.func.node(node).arg(0) {
                let src_node = emit.func.node(src);
                // Loads already zero-extend into the vector destination.
                if size >= src_node.size && is_zero_extending_load(src_node.op) {
                    emit.func.replace_all_uses_with(node, src);
                }
            }
        }
        _ => {}
    }
}

fn both_constants(func: &Function, node: NodeRef) -> (Option<u64>, Option<u64>) {
    let c1 = func.as_constant(func.node(node).arg(0));
    let c2 = func.as_constant(func.node(node).arg(1));
    (c1, c2)
}

fn is_zero_extending_load(op: Op) -> bool {
    matches!(op, Op::LoadMem { .. } | Op::LoadMemTSO { .. } | Op::LoadContext { .. })
}

/// True if `r` is a `Select` producing exactly 1 or 0.
fn is_select_of_one_zero(func: &Function, r: NodeRef) -> bool {
    let node = func.node(r);
    matches!(node.op, Op::Select { .. })
        && func.as_constant(node.arg(2)) == Some(1)
        && func.as_constant(node.arg(3)) == Some(0)
}

/// True if `src` is itself a bitfield extract at least as narrow as `width`,
/// making a re-extract of `width` bits redundant.
fn is_redundant_extract(func: &Function, src: NodeRef, width: u8) -> bool {
    match func.node(src).op {
        Op::Bfe { width: src_width, .. } => width >= src_width,
        _ => false,
    }
}

fn fold_add_sub(emit: &mut IREmitter, node: NodeRef) {
    let op = emit.func.node(node).op;
    let size = emit.func.node(node).size;
    let (c1, c2) = both_constants(emit.func, node);

    if c1.is_some() && c2.is_some() && op == Op::Add {
        let value = c1.unwrap().wrapping_add(c2.unwrap());
        emit.func.replace_with_constant(node, value & get_mask(size));
    } else if c1.is_some() && c2.is_some() && op == Op::Sub {
        let value = c1.unwrap().wrapping_sub(c2.unwrap());
        emit.func.replace_with_constant(node, value & get_mask(size));
        // The flags-updating variants are not folded: a Constant carries no
        // flag write.
    } else if let Some(c2) = c2 {
        if !is_imm_add_sub(c2) && is_imm_add_sub(c2.wrapping_neg()) {
            // The immediate misses the add/sub window but its negation fits,
            // so negate the operation to inline the constant.
            let flipped = match op {
                Op::Add => Op::Sub,
                Op::Sub => Op::Add,
                Op::AddWithFlags => Op::SubWithFlags,
                Op::SubWithFlags => Op::AddWithFlags,
                _ => unreachable!(),
            };
            emit.func.node_mut(node).op = flipped;

            emit.set_write_cursor_before(node);
            let negated = emit.constant(c2.wrapping_neg());
            emit.func.replace_arg(node, 1, negated);
        }
    }
}

fn fold_sub_shift(emit: &mut IREmitter, node: NodeRef, shift: ShiftType, shift_amount: u8) {
    let size = emit.func.node(node).size;
    if shift != ShiftType::Lsl {
        return;
    }
    // Shows up in direction-flag arithmetic when DF was set just before.
    if let (Some(c1), Some(c2)) = both_constants(emit.func, node) {
        let value = c1.wrapping_sub(c2 << shift_amount);
        emit.func.replace_with_constant(node, value & get_mask(size));
    }
}

fn fold_and(emit: &mut IREmitter, node: NodeRef) {
    let size = emit.func.node(node).size;
    let (c1, c2) = both_constants(emit.func, node);

    if let (Some(c1), Some(c2)) = (c1, c2) {
        emit.func.replace_with_constant(node, (c1 & c2) & get_mask(size));
    } else if c2 == Some(1) {
        // Masking a 0/1 select to one bit is a no-op; common in flag calcs.
        if let Some(src) = emit.func.node(node).arg(0) {
            if is_select_of_one_zero(emit.func, src) {
                emit.func.replace_all_uses_with(node, src);
            }
        }
    } else if emit.func.node(node).arg(0) == emit.func.node(node).arg(1) {
        if let Some(src) = emit.func.node(node).arg(0) {
            emit.func.replace_all_uses_with(node, src);
        }
    }
}

fn fold_or(emit: &mut IREmitter, node: NodeRef) {
    let size = emit.func.node(node).size;
    let (c1, c2) = both_constants(emit.func, node);

    if let (Some(c1), Some(c2)) = (c1, c2) {
        emit.func.replace_with_constant(node, (c1 | c2) & get_mask(size));
    } else if emit.func.node(node).arg(0) == emit.func.node(node).arg(1) {
        if let Some(src) = emit.func.node(node).arg(0) {
            emit.func.replace_all_uses_with(node, src);
        }
    }
}

fn fold_xor(emit: &mut IREmitter, node: NodeRef) {
    let size = emit.func.node(node).size;
    let (c1, c2) = both_constants(emit.func, node);

    if let (Some(c1), Some(c2)) = (c1, c2) {
        emit.func.replace_with_constant(node, (c1 ^ c2) & get_mask(size));
    } else if emit.func.node(node).arg(0) == emit.func.node(node).arg(1)
        && emit.func.node(node).arg(0).is_some()
    {
        // x ^ x is zero.
        emit.set_write_cursor(node);
        let zero = emit.constant(0);
        emit.func.replace_all_uses_with(node, zero);
    } else {
        // x ^ 0 is x, whichever side the zero is on.
        for i in 0..2 {
            if emit.func.as_constant(emit.func.node(node).arg(i)) != Some(0) {
                continue;
            }
            if let Some(other) = emit.func.node(node).arg(1 - i) {
                emit.func.replace_all_uses_with(node, other);
            }
            break;
        }
    }
}

fn fold_shift(emit: &mut IREmitter, node: NodeRef, op: fn(u64, u64) -> u64) {
    let size = emit.func.node(node).size;
    let (c1, c2) = both_constants(emit.func, node);

    if let (Some(c1), Some(c2)) = (c1, c2) {
        let value = op(c1, c2 & shift_mask(size));
        emit.func.replace_with_constant(node, value & get_mask(size));
    } else if c2 == Some(0) {
        if let Some(src) = emit.func.node(node).arg(0) {
            emit.func.replace_all_uses_with(node, src);
        }
    }
}

fn fold_bfe(emit: &mut IREmitter, node: NodeRef, width: u8, lsb: u8) {
    let size = emit.func.node(node).size;
    let src = match emit.func.node(node).arg(0) {
        Some(src) => src,
        None => return,
    };

    if is_redundant_extract(emit.func, src, width) {
        emit.func.replace_all_uses_with(node, src);
        return;
    }

    if lsb == 0 {
        // Loads already zero-extend; extracting at least the loaded width
        // changes nothing.
        let src_node = emit.func.node(src);
        if width as u32 >= src_node.size as u32 * 8 && is_zero_extending_load(src_node.op) {
            emit.func.replace_all_uses_with(node, src);
            return;
        }
    }

    let c = emit.func.as_constant(Some(src));
    if size <= 8 && c.is_some() {
        let source_mask = source_bit_mask(width) << lsb;
        let value = (c.unwrap() & source_mask) >> lsb;
        emit.func.replace_with_constant(node, value & get_mask(size));
    } else if width == 1 && lsb == 0 && is_select_of_one_zero(emit.func, src) {
        // A 0/1 select is already a single bit.
        emit.func.replace_all_uses_with(node, src);
    }
    // A full-width extract with lsb 0 looks like an identity, but source
    // width metadata is not reliable enough to eliminate it yet.
}

fn fold_sbfe(emit: &mut IREmitter, node: NodeRef, width: u8, lsb: u8) {
    let size = emit.func.node(node).size;
    if let Some(c) = emit.func.as_constant(emit.func.node(node).arg(0)) {
        let source_mask = source_bit_mask(width) << lsb;
        let extracted = (c & source_mask) >> lsb;
        let shift = 64 - width as u32;
        let extended = ((extracted as i64) << shift >> shift) as u64;
        emit.func.replace_with_constant(node, extended & get_mask(size));
    }
}

fn fold_bfi(emit: &mut IREmitter, node: NodeRef, width: u8, lsb: u8) {
    let size = emit.func.node(node).size;
    let (c_dst, c_src) = both_constants(emit.func, node);

    if let (Some(c_dst), Some(c_src)) = (c_dst, c_src) {
        let source_mask = source_bit_mask(width);
        let value = (c_dst & !(source_mask << lsb)) | ((c_src & source_mask) << lsb);
        emit.func.replace_with_constant(node, value & get_mask(size));
    } else if let Some(c_src) = c_src {
        // Inserting a solid run of bits is just a mask set or clear.
        if has_consecutive_bits(c_src, width) {
            emit.set_write_cursor(node);
            let field = source_bit_mask(width) << lsb;
            let dst = match emit.func.node(node).arg(0) {
                Some(dst) => dst,
                None => return,
            };
            let field_const = emit.constant(field);
            let rewritten = if c_src & 1 != 0 {
                emit.or(size, dst, field_const)
            } else {
                emit.andn(size, dst, field_const)
            };
            emit.func.replace_all_uses_with(node, rewritten);
        }
    }
}

fn fold_mul(emit: &mut IREmitter, node: NodeRef) {
    let size = emit.func.node(node).size;
    let (c1, c2) = both_constants(emit.func, node);

    if let (Some(c1), Some(c2)) = (c1, c2) {
        emit.func.replace_with_constant(node, c1.wrapping_mul(c2) & get_mask(size));
    } else if let Some(c2) = c2 {
        if c2.count_ones() == 1 && (size == 4 || size == 8) {
            let amount = c2.trailing_zeros() as u64;
            if let Some(src) = emit.func.node(node).arg(0) {
                emit.set_write_cursor(node);
                let amount_const = emit.constant(amount);
                let shift = emit.lshl(size, src, amount_const);
                emit.func.replace_all_uses_with(node, shift);
            }
        }
    }
}
