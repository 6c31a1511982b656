//! The opcode space: operators crossed with a dimension (scalar/vec2/3/4)
//! and an operand-form suffix (`_RR`/`_RC`/`_CR`/`_CC` for two-operand
//! instructions, `_R`/`_C` for one-operand instructions), per `spec.md`
//! §4.5 "Opcode selection".
//!
//! Rather than a single flat enum with one variant per combination (211 of
//! them), the opcode byte is computed arithmetically from a per-operator
//! base plus a dimension/form offset — the same scheme `spec.md` describes
//! ("the suffix ... added to the base opcode of the operator+dimension").
//! [`encode`] and [`decode`] are the only two places that formula lives.

use crate::ast::{CompareOp, Type};

/// One of the four element widths an instruction can operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
}

impl Dim {
    pub fn from_type(ty: Type) -> Option<Dim> {
        match ty {
            Type::Scalar => Some(Dim::Scalar),
            Type::Vec2 => Some(Dim::Vec2),
            Type::Vec3 => Some(Dim::Vec3),
            Type::Vec4 => Some(Dim::Vec4),
            _ => None,
        }
    }

    pub fn component_count(self) -> u8 {
        match self {
            Dim::Scalar => 1,
            Dim::Vec2 => 2,
            Dim::Vec3 => 3,
            Dim::Vec4 => 4,
        }
    }

    /// Index in `0..4`, used as the dimension multiplier for families that
    /// support all four widths.
    fn full_index(self) -> u8 {
        match self {
            Dim::Scalar => 0,
            Dim::Vec2 => 1,
            Dim::Vec3 => 2,
            Dim::Vec4 => 3,
        }
    }

    fn from_full_index(index: u8) -> Option<Dim> {
        match index {
            0 => Some(Dim::Scalar),
            1 => Some(Dim::Vec2),
            2 => Some(Dim::Vec3),
            3 => Some(Dim::Vec4),
            _ => None,
        }
    }

    /// Index in `0..3`, used by families restricted to vec2/vec3/vec4
    /// (`dot`, `length`, `normalize`).
    fn vec_index(self) -> Option<u8> {
        match self {
            Dim::Scalar => None,
            Dim::Vec2 => Some(0),
            Dim::Vec3 => Some(1),
            Dim::Vec4 => Some(2),
        }
    }

    fn from_vec_index(index: u8) -> Option<Dim> {
        match index {
            0 => Some(Dim::Vec2),
            1 => Some(Dim::Vec3),
            2 => Some(Dim::Vec4),
            _ => None,
        }
    }
}

/// Operand-form suffix for a two-operand instruction: whether each side is
/// a register (`R`) or a constant/uniform (`C`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandForm {
    RR = 0,
    RC = 1,
    CR = 2,
    CC = 3,
}

impl OperandForm {
    pub fn select(lhs_is_const_or_uniform: bool, rhs_is_const_or_uniform: bool) -> OperandForm {
        match (lhs_is_const_or_uniform, rhs_is_const_or_uniform) {
            (false, false) => OperandForm::RR,
            (false, true) => OperandForm::RC,
            (true, false) => OperandForm::CR,
            (true, true) => OperandForm::CC,
        }
    }

    fn from_index(index: u8) -> Option<OperandForm> {
        match index {
            0 => Some(OperandForm::RR),
            1 => Some(OperandForm::RC),
            2 => Some(OperandForm::CR),
            3 => Some(OperandForm::CC),
            _ => None,
        }
    }

    fn index(self) -> u8 {
        self as u8
    }
}

/// Operand-form suffix for a one-operand instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryForm {
    R = 0,
    C = 1,
}

impl UnaryForm {
    pub fn select(is_const_or_uniform: bool) -> UnaryForm {
        if is_const_or_uniform {
            UnaryForm::C
        } else {
            UnaryForm::R
        }
    }

    fn from_index(index: u8) -> Option<UnaryForm> {
        match index {
            0 => Some(UnaryForm::R),
            1 => Some(UnaryForm::C),
            _ => None,
        }
    }

    fn index(self) -> u8 {
        self as u8
    }
}

/// Which of the three sampling builtins an opcode is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleArity {
    One,
    Two,
    Three,
}

/// A decoded instruction's operation, independent of its operand encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// `ADD`/`SUB`/`MUL`/`DIV`/`MIN`/`MAX` — two operands, any dimension.
    Binary { op: BinaryOp, dim: Dim, form: OperandForm },
    /// `DOT` — two same-dimension vector operands, scalar result.
    Dot { dim: Dim, form: OperandForm },
    /// `CROSS` — two vec3 operands, vec3 result.
    Cross { form: OperandForm },
    /// `NEG`/`FLOOR`/`CEIL`/`ASSIGN` — one operand, any dimension.
    Unary { op: UnaryOp, dim: Dim, form: UnaryForm },
    /// `SQRT`/`INVSQRT`/trig family — one scalar operand.
    ScalarUnary { op: ScalarUnaryOp, form: UnaryForm },
    /// `LENGTH`/`NORMALIZE` — one vector operand.
    VecUnary { op: VecUnaryOp, dim: Dim, form: UnaryForm },
    /// `CMP_GT`/`CMP_LT`/`CMP_GE`/`CMP_LE`/`CMP_EQ` — scalar comparison,
    /// writes the flag buffer.
    Compare { op: CompareOp, form: OperandForm },
    /// Conditional assignment: selects between two branch operands using
    /// the flag buffer.
    Cond { dim: Dim, form: OperandForm },
    /// `SAMPLE1D`/`SAMPLE2D`/`SAMPLE3D`.
    Sample { arity: SampleArity },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Floor,
    Ceil,
    Assign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarUnaryOp {
    Sqrt,
    InvSqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VecUnaryOp {
    Length,
    Normalize,
}

// --- base offsets -----------------------------------------------------
//
// Each family reserves a contiguous run of opcode bytes. A "full" binary
// family spans all four dimensions times all four forms (16 bytes); a
// "full" unary family spans all four dimensions times two forms (8
// bytes); a vector-only binary family (dot) spans three dimensions times
// four forms (12 bytes); a vector-only unary family (length, normalize)
// spans three dimensions times two forms (6 bytes); scalar-only families
// (sqrt, trig, comparisons, cross) span just their forms.

const BASE_ADD: u8 = 0;
const BASE_SUB: u8 = BASE_ADD + 16;
const BASE_MUL: u8 = BASE_SUB + 16;
const BASE_DIV: u8 = BASE_MUL + 16;
const BASE_NEG: u8 = BASE_DIV + 16;
const BASE_SQRT: u8 = BASE_NEG + 8;
const BASE_INVSQRT: u8 = BASE_SQRT + 2;
const BASE_SIN: u8 = BASE_INVSQRT + 2;
const BASE_COS: u8 = BASE_SIN + 2;
const BASE_TAN: u8 = BASE_COS + 2;
const BASE_ASIN: u8 = BASE_TAN + 2;
const BASE_ACOS: u8 = BASE_ASIN + 2;
const BASE_ATAN: u8 = BASE_ACOS + 2;
const BASE_FLOOR: u8 = BASE_ATAN + 2;
const BASE_CEIL: u8 = BASE_FLOOR + 8;
const BASE_DOT: u8 = BASE_CEIL + 8;
const BASE_LENGTH: u8 = BASE_DOT + 12;
const BASE_CROSS: u8 = BASE_LENGTH + 6;
const BASE_NORMALIZE: u8 = BASE_CROSS + 4;
const BASE_MIN: u8 = BASE_NORMALIZE + 6;
const BASE_MAX: u8 = BASE_MIN + 16;
const BASE_ASSIGN: u8 = BASE_MAX + 16;
const BASE_CMP_GT: u8 = BASE_ASSIGN + 8;
const BASE_CMP_LT: u8 = BASE_CMP_GT + 4;
const BASE_CMP_GE: u8 = BASE_CMP_LT + 4;
const BASE_CMP_LE: u8 = BASE_CMP_GE + 4;
const BASE_CMP_EQ: u8 = BASE_CMP_LE + 4;
const BASE_COND: u8 = BASE_CMP_EQ + 4;
const BASE_SAMPLE1D: u8 = BASE_COND + 16;
const BASE_SAMPLE2D: u8 = BASE_SAMPLE1D + 1;
const BASE_SAMPLE3D: u8 = BASE_SAMPLE2D + 1;

/// One past the highest opcode byte this crate ever emits or accepts.
pub const OPCODE_COUNT: u8 = BASE_SAMPLE3D + 1;

fn binary_base(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add => BASE_ADD,
        BinaryOp::Sub => BASE_SUB,
        BinaryOp::Mul => BASE_MUL,
        BinaryOp::Div => BASE_DIV,
        BinaryOp::Min => BASE_MIN,
        BinaryOp::Max => BASE_MAX,
    }
}

fn unary_base(op: UnaryOp) -> u8 {
    match op {
        UnaryOp::Neg => BASE_NEG,
        UnaryOp::Floor => BASE_FLOOR,
        UnaryOp::Ceil => BASE_CEIL,
        UnaryOp::Assign => BASE_ASSIGN,
    }
}

fn scalar_unary_base(op: ScalarUnaryOp) -> u8 {
    match op {
        ScalarUnaryOp::Sqrt => BASE_SQRT,
        ScalarUnaryOp::InvSqrt => BASE_INVSQRT,
        ScalarUnaryOp::Sin => BASE_SIN,
        ScalarUnaryOp::Cos => BASE_COS,
        ScalarUnaryOp::Tan => BASE_TAN,
        ScalarUnaryOp::Asin => BASE_ASIN,
        ScalarUnaryOp::Acos => BASE_ACOS,
        ScalarUnaryOp::Atan => BASE_ATAN,
    }
}

fn vec_unary_base(op: VecUnaryOp) -> u8 {
    match op {
        VecUnaryOp::Length => BASE_LENGTH,
        VecUnaryOp::Normalize => BASE_NORMALIZE,
    }
}

fn compare_base(op: CompareOp) -> u8 {
    match op {
        CompareOp::Gt => BASE_CMP_GT,
        CompareOp::Lt => BASE_CMP_LT,
        CompareOp::Ge => BASE_CMP_GE,
        CompareOp::Le => BASE_CMP_LE,
        CompareOp::Eq => BASE_CMP_EQ,
    }
}

/// Computes the opcode byte for a fully-decoded [`OpKind`].
pub fn encode(kind: OpKind) -> u8 {
    match kind {
        OpKind::Binary { op, dim, form } => {
            binary_base(op) + dim.full_index() * 4 + form.index()
        }
        OpKind::Dot { dim, form } => {
            let vec_index = dim.vec_index().expect("dot requires a vector dimension");
            BASE_DOT + vec_index * 4 + form.index()
        }
        OpKind::Cross { form } => BASE_CROSS + form.index(),
        OpKind::Unary { op, dim, form } => unary_base(op) + dim.full_index() * 2 + form.index(),
        OpKind::ScalarUnary { op, form } => scalar_unary_base(op) + form.index(),
        OpKind::VecUnary { op, dim, form } => {
            let vec_index = dim.vec_index().expect("length/normalize require a vector dimension");
            vec_unary_base(op) + vec_index * 2 + form.index()
        }
        OpKind::Compare { op, form } => compare_base(op) + form.index(),
        OpKind::Cond { dim, form } => BASE_COND + dim.full_index() * 4 + form.index(),
        OpKind::Sample { arity } => match arity {
            SampleArity::One => BASE_SAMPLE1D,
            SampleArity::Two => BASE_SAMPLE2D,
            SampleArity::Three => BASE_SAMPLE3D,
        },
    }
}

/// Recovers the [`OpKind`] an opcode byte was built from. Returns `None`
/// for any byte not produced by [`encode`] — callers turn that into
/// `Error::InvalidBytecode`.
pub fn decode(opcode: u8) -> Option<OpKind> {
    let in_range = |base: u8, size: u8| opcode >= base && opcode < base + size;

    if in_range(BASE_ADD, 16) {
        return decode_binary(BinaryOp::Add, BASE_ADD, opcode);
    }
    if in_range(BASE_SUB, 16) {
        return decode_binary(BinaryOp::Sub, BASE_SUB, opcode);
    }
    if in_range(BASE_MUL, 16) {
        return decode_binary(BinaryOp::Mul, BASE_MUL, opcode);
    }
    if in_range(BASE_DIV, 16) {
        return decode_binary(BinaryOp::Div, BASE_DIV, opcode);
    }
    if in_range(BASE_NEG, 8) {
        return decode_unary(UnaryOp::Neg, BASE_NEG, opcode);
    }
    if in_range(BASE_SQRT, 2) {
        return decode_scalar_unary(ScalarUnaryOp::Sqrt, BASE_SQRT, opcode);
    }
    if in_range(BASE_INVSQRT, 2) {
        return decode_scalar_unary(ScalarUnaryOp::InvSqrt, BASE_INVSQRT, opcode);
    }
    if in_range(BASE_SIN, 2) {
        return decode_scalar_unary(ScalarUnaryOp::Sin, BASE_SIN, opcode);
    }
    if in_range(BASE_COS, 2) {
        return decode_scalar_unary(ScalarUnaryOp::Cos, BASE_COS, opcode);
    }
    if in_range(BASE_TAN, 2) {
        return decode_scalar_unary(ScalarUnaryOp::Tan, BASE_TAN, opcode);
    }
    if in_range(BASE_ASIN, 2) {
        return decode_scalar_unary(ScalarUnaryOp::Asin, BASE_ASIN, opcode);
    }
    if in_range(BASE_ACOS, 2) {
        return decode_scalar_unary(ScalarUnaryOp::Acos, BASE_ACOS, opcode);
    }
    if in_range(BASE_ATAN, 2) {
        return decode_scalar_unary(ScalarUnaryOp::Atan, BASE_ATAN, opcode);
    }
    if in_range(BASE_FLOOR, 8) {
        return decode_unary(UnaryOp::Floor, BASE_FLOOR, opcode);
    }
    if in_range(BASE_CEIL, 8) {
        return decode_unary(UnaryOp::Ceil, BASE_CEIL, opcode);
    }
    if in_range(BASE_DOT, 12) {
        let offset = opcode - BASE_DOT;
        let dim = Dim::from_vec_index(offset / 4)?;
        let form = OperandForm::from_index(offset % 4)?;
        return Some(OpKind::Dot { dim, form });
    }
    if in_range(BASE_LENGTH, 6) {
        return decode_vec_unary(VecUnaryOp::Length, BASE_LENGTH, opcode);
    }
    if in_range(BASE_CROSS, 4) {
        let form = OperandForm::from_index(opcode - BASE_CROSS)?;
        return Some(OpKind::Cross { form });
    }
    if in_range(BASE_NORMALIZE, 6) {
        return decode_vec_unary(VecUnaryOp::Normalize, BASE_NORMALIZE, opcode);
    }
    if in_range(BASE_MIN, 16) {
        return decode_binary(BinaryOp::Min, BASE_MIN, opcode);
    }
    if in_range(BASE_MAX, 16) {
        return decode_binary(BinaryOp::Max, BASE_MAX, opcode);
    }
    if in_range(BASE_ASSIGN, 8) {
        return decode_unary(UnaryOp::Assign, BASE_ASSIGN, opcode);
    }
    if in_range(BASE_CMP_GT, 4) {
        return decode_compare(CompareOp::Gt, BASE_CMP_GT, opcode);
    }
    if in_range(BASE_CMP_LT, 4) {
        return decode_compare(CompareOp::Lt, BASE_CMP_LT, opcode);
    }
    if in_range(BASE_CMP_GE, 4) {
        return decode_compare(CompareOp::Ge, BASE_CMP_GE, opcode);
    }
    if in_range(BASE_CMP_LE, 4) {
        return decode_compare(CompareOp::Le, BASE_CMP_LE, opcode);
    }
    if in_range(BASE_CMP_EQ, 4) {
        return decode_compare(CompareOp::Eq, BASE_CMP_EQ, opcode);
    }
    if in_range(BASE_COND, 16) {
        let offset = opcode - BASE_COND;
        let dim = Dim::from_full_index(offset / 4)?;
        let form = OperandForm::from_index(offset % 4)?;
        return Some(OpKind::Cond { dim, form });
    }
    if opcode == BASE_SAMPLE1D {
        return Some(OpKind::Sample { arity: SampleArity::One });
    }
    if opcode == BASE_SAMPLE2D {
        return Some(OpKind::Sample { arity: SampleArity::Two });
    }
    if opcode == BASE_SAMPLE3D {
        return Some(OpKind::Sample { arity: SampleArity::Three });
    }
    None
}

fn decode_binary(op: BinaryOp, base: u8, opcode: u8) -> Option<OpKind> {
    let offset = opcode - base;
    let dim = Dim::from_full_index(offset / 4)?;
    let form = OperandForm::from_index(offset % 4)?;
    Some(OpKind::Binary { op, dim, form })
}

fn decode_unary(op: UnaryOp, base: u8, opcode: u8) -> Option<OpKind> {
    let offset = opcode - base;
    let dim = Dim::from_full_index(offset / 2)?;
    let form = UnaryForm::from_index(offset % 2)?;
    Some(OpKind::Unary { op, dim, form })
}

fn decode_scalar_unary(op: ScalarUnaryOp, base: u8, opcode: u8) -> Option<OpKind> {
    let form = UnaryForm::from_index(opcode - base)?;
    Some(OpKind::ScalarUnary { op, form })
}

fn decode_vec_unary(op: VecUnaryOp, base: u8, opcode: u8) -> Option<OpKind> {
    let offset = opcode - base;
    let dim = Dim::from_vec_index(offset / 2)?;
    let form = UnaryForm::from_index(offset % 2)?;
    Some(OpKind::VecUnary { op, dim, form })
}

fn decode_compare(op: CompareOp, base: u8, opcode: u8) -> Option<OpKind> {
    let form = OperandForm::from_index(opcode - base)?;
    Some(OpKind::Compare { op, form })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_dims() -> [Dim; 4] {
        [Dim::Scalar, Dim::Vec2, Dim::Vec3, Dim::Vec4]
    }

    fn all_forms() -> [OperandForm; 4] {
        [OperandForm::RR, OperandForm::RC, OperandForm::CR, OperandForm::CC]
    }

    fn all_unary_forms() -> [UnaryForm; 2] {
        [UnaryForm::R, UnaryForm::C]
    }

    #[test]
    fn opcode_space_fits_in_a_byte_with_room_to_spare() {
        assert!(OPCODE_COUNT < 255);
    }

    #[test]
    fn binary_family_round_trips() {
        for &op in &[BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div, BinaryOp::Min, BinaryOp::Max] {
            for dim in all_dims() {
                for form in all_forms() {
                    let kind = OpKind::Binary { op, dim, form };
                    let byte = encode(kind);
                    assert_eq!(decode(byte), Some(kind));
                }
            }
        }
    }

    #[test]
    fn unary_family_round_trips() {
        for &op in &[UnaryOp::Neg, UnaryOp::Floor, UnaryOp::Ceil, UnaryOp::Assign] {
            for dim in all_dims() {
                for form in all_unary_forms() {
                    let kind = OpKind::Unary { op, dim, form };
                    let byte = encode(kind);
                    assert_eq!(decode(byte), Some(kind));
                }
            }
        }
    }

    #[test]
    fn dot_and_cross_and_normalize_round_trip() {
        for dim in [Dim::Vec2, Dim::Vec3, Dim::Vec4] {
            for form in all_forms() {
                let kind = OpKind::Dot { dim, form };
                assert_eq!(decode(encode(kind)), Some(kind));
            }
            for form in all_unary_forms() {
                let kind = OpKind::VecUnary { op: VecUnaryOp::Length, dim, form };
                assert_eq!(decode(encode(kind)), Some(kind));
                let kind = OpKind::VecUnary { op: VecUnaryOp::Normalize, dim, form };
                assert_eq!(decode(encode(kind)), Some(kind));
            }
        }
        for form in all_forms() {
            let kind = OpKind::Cross { form };
            assert_eq!(decode(encode(kind)), Some(kind));
        }
    }

    #[test]
    fn compare_and_cond_and_sample_round_trip() {
        for &op in &[CompareOp::Gt, CompareOp::Lt, CompareOp::Ge, CompareOp::Le, CompareOp::Eq] {
            for form in all_forms() {
                let kind = OpKind::Compare { op, form };
                assert_eq!(decode(encode(kind)), Some(kind));
            }
        }
        for dim in all_dims() {
            for form in all_forms() {
                let kind = OpKind::Cond { dim, form };
                assert_eq!(decode(encode(kind)), Some(kind));
            }
        }
        for arity in [SampleArity::One, SampleArity::Two, SampleArity::Three] {
            let kind = OpKind::Sample { arity };
            assert_eq!(decode(encode(kind)), Some(kind));
        }
    }

    #[test]
    fn unused_high_byte_decodes_to_none() {
        assert_eq!(decode(255), None);
        assert_eq!(decode(OPCODE_COUNT), None);
    }

    #[test]
    fn no_two_families_overlap() {
        let mut seen = [false; 256];
        for opcode in 0..OPCODE_COUNT {
            if let Some(kind) = decode(opcode) {
                assert_eq!(encode(kind), opcode, "opcode {opcode} decodes to a kind that re-encodes differently");
                seen[opcode as usize] = true;
            }
        }
        assert!(seen[..OPCODE_COUNT as usize].iter().all(|&s| s));
    }
}
