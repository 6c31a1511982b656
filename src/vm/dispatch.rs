//! Decodes one instruction at a time and applies its kernel to a batch
//! window, per `spec.md` §4.7 steps 1-3.

use crate::error::Error;
use crate::instruction::{self, Instruction, Operand};
use crate::opcode::{BinaryOp, OpKind, OperandForm, SampleArity, UnaryForm};
use crate::vm::context::{ExecutionContext, RegisterLocation};
use crate::vm::kernels;

/// A resolved operand, valid for the whole batch window it was resolved
/// in. A register carries a raw pointer rather than a borrow of the
/// context, so `dst`, `src1`, and `src2` — which may alias the same
/// register, as `accumulate` writes do — can all be resolved up front and
/// then read/written in whatever order the kernel needs.
#[derive(Clone, Copy)]
enum Side {
    Register { ptr: *mut f32, elem_stride: usize, component: u8, is_io: bool, accumulate: bool },
    Flat([f32; 4]),
}

impl Side {
    /// Reads `count` lanes for window-local element `e` (global element
    /// `o + e` for an I/O register, `e` for a temporary — `spec.md` §4.7
    /// "temporary registers are addressed relative to the current batch
    /// window"). An `out accumulate` register ignores both `o` and `e` and
    /// always addresses element `0` — its backing buffer holds exactly one
    /// element no matter how many elements the batch covers.
    fn read(self, o: usize, e: usize, count: u8) -> [f32; 4] {
        match self {
            Side::Register { ptr, elem_stride, component, is_io, accumulate } => {
                let index = if accumulate { 0 } else if is_io { o + e } else { e };
                // SAFETY: `index` is within the bound the caller validated
                // against the register's backing array (the I/O array's
                // declared element count, or `batch_limit` for a temp).
                let base = unsafe { ptr.add(index * elem_stride + component as usize) };
                let mut out = [0.0f32; 4];
                for (i, slot) in out.iter_mut().enumerate().take(count as usize) {
                    *slot = unsafe { *base.add(i) };
                }
                out
            }
            Side::Flat(values) => values,
        }
    }

    fn write(self, o: usize, e: usize, values: [f32; 4], count: u8) {
        let Side::Register { ptr, elem_stride, component, is_io, accumulate } = self else {
            unreachable!("a destination operand is always a register")
        };
        let index = if accumulate { 0 } else if is_io { o + e } else { e };
        let base = unsafe { ptr.add(index * elem_stride + component as usize) };
        for i in 0..count as usize {
            unsafe { *base.add(i) = values[i] };
        }
    }
}

impl From<RegisterLocation> for Side {
    fn from(loc: RegisterLocation) -> Self {
        Side::Register {
            ptr: loc.ptr,
            elem_stride: loc.elem_stride,
            component: 0,
            is_io: loc.is_io,
            accumulate: loc.accumulate,
        }
    }
}

fn with_component(side: Side, component: u8) -> Side {
    match side {
        Side::Register { ptr, elem_stride, is_io, accumulate, .. } => {
            Side::Register { ptr, elem_stride, component, is_io, accumulate }
        }
        flat => flat,
    }
}

/// Resolves one operand byte into a [`Side`], consuming inline-constant
/// words from `words[*pc..]` when the byte is the `0xFF` sentinel.
/// `count` is the number of lanes this operand occupies, fully determined
/// by the instruction's [`OpKind`] (see the per-family counts in
/// `operand_lane_counts`) — it is also how many inline words are consumed
/// and how many lanes are read back out of a register or uniform.
fn resolve_side(
    ctx: &ExecutionContext,
    operand: Operand,
    is_const_side: bool,
    count: u8,
    words: &[u32],
    pc: &mut usize,
) -> Result<Side, Error> {
    match operand {
        Operand::InlineConstant => {
            let values =
                instruction::decode_inline_constant(words, *pc, count as usize).ok_or(Error::InvalidBytecode)?;
            *pc += count as usize;
            let mut flat = [0.0f32; 4];
            flat[..count as usize].copy_from_slice(&values);
            Ok(Side::Flat(flat))
        }
        Operand::Slot { index, component } => {
            if is_const_side {
                let stored = ctx.uniform_value(index as u32)?;
                let mut flat = [0.0f32; 4];
                for i in 0..count as usize {
                    flat[i] = stored[component as usize + i];
                }
                Ok(Side::Flat(flat))
            } else {
                let loc = ctx.register_location(index as u32)?;
                Ok(with_component(Side::from(loc), component))
            }
        }
    }
}

fn binary_forms(form: OperandForm) -> (bool, bool) {
    match form {
        OperandForm::RR => (false, false),
        OperandForm::RC => (false, true),
        OperandForm::CR => (true, false),
        OperandForm::CC => (true, true),
    }
}

fn is_const_unary(form: UnaryForm) -> bool {
    matches!(form, UnaryForm::C)
}

/// Applies `f` element-wise over the batch window, reading `n_in` lanes
/// from each source and writing `n_out` lanes to the destination.
fn elementwise(
    o: usize,
    b: usize,
    dst: Side,
    src1: Side,
    src2: Option<Side>,
    n_in: u8,
    n_out: u8,
    f: impl Fn([f32; 4], [f32; 4]) -> [f32; 4],
) {
    for e in 0..b {
        let a = src1.read(o, e, n_in);
        let b_vals = src2.map(|s| s.read(o, e, n_in)).unwrap_or([0.0; 4]);
        let result = f(a, b_vals);
        dst.write(o, e, result, n_out);
    }
}

/// Decodes and executes the instruction already identified as `kind` at
/// `instr`, starting its inline-constant words at `words[pc..]`. Returns
/// the program counter just past this instruction and any inline words it
/// consumed.
pub(super) fn execute_instruction(
    ctx: &mut ExecutionContext,
    kind: OpKind,
    instr: Instruction,
    words: &[u32],
    mut pc: usize,
    o: usize,
    b: usize,
) -> Result<usize, Error> {
    match kind {
        OpKind::Binary { op, dim, form } => {
            let n = dim.component_count();
            let (c1, c2) = binary_forms(form);
            let (n1, n2) = if matches!(op, BinaryOp::Mul | BinaryOp::Div) { (n, 1) } else { (n, n) };
            let src1 = resolve_side(ctx, instr.src1_operand(), c1, n1, words, &mut pc)?;
            let src2 = resolve_side(ctx, instr.src2_operand(), c2, n2, words, &mut pc)?;
            let dst = Side::from(ctx.register_location(dst_index(instr))?);
            let dst = with_component(dst, dst_component(instr));
            for e in 0..b {
                let a = src1.read(o, e, n1);
                let bb = src2.read(o, e, n2);
                let result = kernels::binary(op, n, a, bb);
                dst.write(o, e, result, n);
            }
            Ok(pc)
        }
        OpKind::Dot { dim, form } => {
            let n = dim.component_count();
            let (c1, c2) = binary_forms(form);
            let src1 = resolve_side(ctx, instr.src1_operand(), c1, n, words, &mut pc)?;
            let src2 = resolve_side(ctx, instr.src2_operand(), c2, n, words, &mut pc)?;
            let dst = with_component(Side::from(ctx.register_location(dst_index(instr))?), dst_component(instr));
            elementwise(o, b, dst, src1, Some(src2), n, 1, |a, bb| [kernels::dot(n, a, bb), 0.0, 0.0, 0.0]);
            Ok(pc)
        }
        OpKind::Cross { form } => {
            let (c1, c2) = binary_forms(form);
            let src1 = resolve_side(ctx, instr.src1_operand(), c1, 3, words, &mut pc)?;
            let src2 = resolve_side(ctx, instr.src2_operand(), c2, 3, words, &mut pc)?;
            let dst = with_component(Side::from(ctx.register_location(dst_index(instr))?), dst_component(instr));
            elementwise(o, b, dst, src1, Some(src2), 3, 3, kernels::cross);
            Ok(pc)
        }
        OpKind::Unary { op, dim, form } => {
            let n = dim.component_count();
            let const_side = is_const_unary(form);
            let src1 = resolve_side(ctx, instr.src1_operand(), const_side, n, words, &mut pc)?;
            let dst = with_component(Side::from(ctx.register_location(dst_index(instr))?), dst_component(instr));
            elementwise(o, b, dst, src1, None, n, n, |a, _| kernels::unary(op, n, a));
            Ok(pc)
        }
        OpKind::ScalarUnary { op, form } => {
            let const_side = is_const_unary(form);
            let src1 = resolve_side(ctx, instr.src1_operand(), const_side, 1, words, &mut pc)?;
            let dst = with_component(Side::from(ctx.register_location(dst_index(instr))?), dst_component(instr));
            elementwise(o, b, dst, src1, None, 1, 1, |a, _| [kernels::scalar_unary(op, a[0]), 0.0, 0.0, 0.0]);
            Ok(pc)
        }
        OpKind::VecUnary { op, dim, form } => {
            let n = dim.component_count();
            let const_side = is_const_unary(form);
            let src1 = resolve_side(ctx, instr.src1_operand(), const_side, n, words, &mut pc)?;
            let dst = with_component(Side::from(ctx.register_location(dst_index(instr))?), dst_component(instr));
            let n_out = kernels::vec_unary_output_count(op, n);
            elementwise(o, b, dst, src1, None, n, n_out, |a, _| kernels::vec_unary(op, n, a));
            Ok(pc)
        }
        OpKind::Compare { op, form } => {
            let (c1, c2) = binary_forms(form);
            let src1 = resolve_side(ctx, instr.src1_operand(), c1, 1, words, &mut pc)?;
            let src2 = resolve_side(ctx, instr.src2_operand(), c2, 1, words, &mut pc)?;
            let flags = ctx.flags_ptr();
            for e in 0..b {
                let a = src1.read(o, e, 1)[0];
                let bb = src2.read(o, e, 1)[0];
                let flag = kernels::compare(op, a, bb) as u8;
                // SAFETY: `e < b <= batch_limit`, the flag buffer's length.
                unsafe { *flags.add(e) = flag };
            }
            Ok(pc)
        }
        OpKind::Cond { dim, form } => {
            let n = dim.component_count();
            let (c1, c2) = binary_forms(form);
            let then_side = resolve_side(ctx, instr.src1_operand(), c1, n, words, &mut pc)?;
            let else_side = resolve_side(ctx, instr.src2_operand(), c2, n, words, &mut pc)?;
            let dst = with_component(Side::from(ctx.register_location(dst_index(instr))?), dst_component(instr));
            let flags = ctx.flags_ptr();
            for e in 0..b {
                // SAFETY: written by the `Compare` that must precede this
                // `Cond` in program order, within the same batch window.
                let flag = unsafe { *flags.add(e) };
                let chosen = if flag & 1 != 0 { then_side } else { else_side };
                dst.write(o, e, chosen.read(o, e, n), n);
            }
            Ok(pc)
        }
        OpKind::Sample { arity } => execute_sample(ctx, instr, arity, words, pc, o, b),
    }
}

fn dst_index(instr: Instruction) -> u32 {
    match instr.dst_operand() {
        Operand::Slot { index, .. } => index as u32,
        Operand::InlineConstant => unreachable!("a destination byte is never the inline-constant sentinel"),
    }
}

fn dst_component(instr: Instruction) -> u8 {
    match instr.dst_operand() {
        Operand::Slot { component, .. } => component,
        Operand::InlineConstant => unreachable!("a destination byte is never the inline-constant sentinel"),
    }
}

/// `spec.md` §6.2: "Sampler opcodes encode the sampler index in `src1`
/// (no sentinel)"; the coordinate in `src2` is always a register after
/// code generation materializes any uniform or literal coordinate into
/// one (see `codegen::FunctionCodegen::materialize_register`) — `Sample`
/// carries no operand-form bits to otherwise tell register and uniform
/// slots apart.
fn execute_sample(
    ctx: &mut ExecutionContext,
    instr: Instruction,
    arity: SampleArity,
    words: &[u32],
    mut pc: usize,
    o: usize,
    b: usize,
) -> Result<usize, Error> {
    let sampler_index = match instr.src1_operand() {
        Operand::Slot { index, .. } => index as u32,
        Operand::InlineConstant => return Err(Error::InvalidBytecode),
    };
    if sampler_index as usize >= ctx.sampler_count() {
        return Err(Error::InvalidIndex);
    }

    let n = match arity {
        SampleArity::One => 1,
        SampleArity::Two => 2,
        SampleArity::Three => 3,
    };
    let coord = resolve_side(ctx, instr.src2_operand(), false, n, words, &mut pc)?;
    let dst = with_component(Side::from(ctx.register_location(dst_index(instr))?), dst_component(instr));

    let mut dst_values = vec![[0.0f32; 4]; b];
    let sampler = ctx.sampler_mut(sampler_index)?;
    match arity {
        SampleArity::One => {
            let coords: Vec<f32> = (0..b).map(|e| coord.read(o, e, 1)[0]).collect();
            sampler.sample1d(&coords, &mut dst_values)?;
        }
        SampleArity::Two => {
            let coords: Vec<[f32; 2]> = (0..b)
                .map(|e| {
                    let v = coord.read(o, e, 2);
                    [v[0], v[1]]
                })
                .collect();
            sampler.sample2d(&coords, &mut dst_values)?;
        }
        SampleArity::Three => {
            let coords: Vec<[f32; 3]> = (0..b)
                .map(|e| {
                    let v = coord.read(o, e, 3);
                    [v[0], v[1], v[2]]
                })
                .collect();
            sampler.sample3d(&coords, &mut dst_values)?;
        }
    }

    for (e, values) in dst_values.into_iter().enumerate() {
        dst.write(o, e, values, 4);
    }
    Ok(pc)
}
