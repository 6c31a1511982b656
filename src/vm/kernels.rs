//! Per-operator element math, per `spec.md` §4.7 "Numeric semantics".
//!
//! Every kernel here operates on one element's lanes at a time; the
//! batch-window loop lives in [`super::dispatch`].

use crate::ast::CompareOp;
use crate::opcode::{BinaryOp, ScalarUnaryOp, UnaryOp, VecUnaryOp};

/// `ADD`/`SUB`/`MIN`/`MAX` apply lane-for-lane over `n` lanes. `MUL`/`DIV`
/// never see `vecN op vecN` (rejected at type-check time) so the second
/// operand's lane 0 alone is the scalar multiplier/divisor, which also
/// correctly covers the `scalar op scalar` case where `n == 1`.
pub(super) fn binary(op: BinaryOp, n: u8, a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    for i in 0..n as usize {
        out[i] = match op {
            BinaryOp::Add => a[i] + b[i],
            BinaryOp::Sub => a[i] - b[i],
            BinaryOp::Mul => a[i] * b[0],
            BinaryOp::Div => a[i] / b[0],
            BinaryOp::Min => a[i].min(b[i]),
            BinaryOp::Max => a[i].max(b[i]),
        };
    }
    out
}

pub(super) fn dot(n: u8, a: [f32; 4], b: [f32; 4]) -> f32 {
    (0..n as usize).map(|i| a[i] * b[i]).sum()
}

/// Right-hand-rule cross product, `spec.md` §4.7.
pub(super) fn cross(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
        0.0,
    ]
}

pub(super) fn unary(op: UnaryOp, n: u8, a: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    for i in 0..n as usize {
        out[i] = match op {
            UnaryOp::Neg => -a[i],
            UnaryOp::Floor => a[i].floor(),
            UnaryOp::Ceil => a[i].ceil(),
            UnaryOp::Assign => a[i],
        };
    }
    out
}

pub(super) fn scalar_unary(op: ScalarUnaryOp, x: f32) -> f32 {
    match op {
        ScalarUnaryOp::Sqrt => x.sqrt(),
        ScalarUnaryOp::InvSqrt => 1.0 / x.sqrt(),
        ScalarUnaryOp::Sin => x.sin(),
        ScalarUnaryOp::Cos => x.cos(),
        ScalarUnaryOp::Tan => x.tan(),
        ScalarUnaryOp::Asin => x.asin(),
        ScalarUnaryOp::Acos => x.acos(),
        ScalarUnaryOp::Atan => x.atan(),
    }
}

pub(super) fn vec_unary_output_count(op: VecUnaryOp, n: u8) -> u8 {
    match op {
        VecUnaryOp::Length => 1,
        VecUnaryOp::Normalize => n,
    }
}

/// `normalize` of the zero vector returns the zero vector rather than
/// dividing by a zero length into NaN/∞.
pub(super) fn vec_unary(op: VecUnaryOp, n: u8, a: [f32; 4]) -> [f32; 4] {
    let length = dot(n, a, a).sqrt();
    match op {
        VecUnaryOp::Length => [length, 0.0, 0.0, 0.0],
        VecUnaryOp::Normalize => {
            let mut out = [0.0f32; 4];
            if length != 0.0 {
                for i in 0..n as usize {
                    out[i] = a[i] / length;
                }
            }
            out
        }
    }
}

pub(super) fn compare(op: CompareOp, a: f32, b: f32) -> bool {
    match op {
        CompareOp::Gt => a > b,
        CompareOp::Lt => a < b,
        CompareOp::Ge => a >= b,
        CompareOp::Le => a <= b,
        CompareOp::Eq => a == b,
    }
}
