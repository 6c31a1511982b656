//! Lowers a type-checked [`Program`](crate::ast::Program) into the
//! register-based instruction streams `spec.md` §4.5 describes.
//!
//! The generator walks each expression left-to-right, allocating one
//! fresh temporary register per non-leaf node (§4.5 "Code generator");
//! leaves (variable references, literals, member access) resolve to an
//! existing register, a uniform-table index, or an inlined constant
//! instead of allocating anything.

use std::collections::HashMap;

use tracing::trace;

use crate::ast::{AssignTarget, Expr, ExprKind, Stmt, Type};
use crate::env::Attribute;
use crate::error::Error;
use crate::instruction::{self, Instruction, Operand};
use crate::opcode::{self, BinaryOp, Dim, OpKind, OperandForm, SampleArity, ScalarUnaryOp, UnaryForm, UnaryOp, VecUnaryOp};
use crate::parser::ParsedProgram;
use crate::symtab::Symbol;

/// One function's compiled instruction stream.
#[derive(Debug, Clone)]
pub struct MethodCode {
    pub name: Symbol,
    pub words: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct CodegenOutput {
    pub register_count: u32,
    pub methods: Vec<MethodCode>,
}

/// Where a lowered expression's value currently lives.
#[derive(Debug, Clone)]
enum ValueLoc {
    Register { index: u32, component: u8 },
    Uniform { index: u32, component: u8 },
    Literal(Vec<f32>),
}

impl ValueLoc {
    fn is_const_or_uniform(&self) -> bool {
        !matches!(self, ValueLoc::Register { .. })
    }

    fn operand(&self) -> Operand {
        match self {
            ValueLoc::Register { index, component } | ValueLoc::Uniform { index, component } => {
                Operand::slot(*index as u8, *component)
            }
            ValueLoc::Literal(_) => Operand::InlineConstant,
        }
    }

    fn inline_words(&self) -> Option<Vec<u32>> {
        match self {
            ValueLoc::Literal(values) => Some(instruction::encode_inline_constant(values)),
            _ => None,
        }
    }
}

pub fn generate(parsed: &ParsedProgram) -> Result<CodegenOutput, Error> {
    if parsed.streams.len() > instruction::MAX_SLOT_INDEX as usize + 1 {
        return Err(Error::InvalidRegister);
    }
    if parsed.uniforms.len() > instruction::MAX_SLOT_INDEX as usize + 1 {
        return Err(Error::InvalidIndex);
    }
    if parsed.samplers.len() > instruction::MAX_SLOT_INDEX as usize + 1 {
        return Err(Error::InvalidIndex);
    }

    let n_io = parsed.streams.len() as u32;
    let mut register_count = n_io;
    let mut methods = Vec::with_capacity(parsed.program.functions.len());

    for function in &parsed.program.functions {
        let mut gen = FunctionCodegen::new(parsed, n_io);
        for stmt in &function.body {
            gen.lower_stmt(stmt)?;
        }
        register_count = register_count.max(gen.next_temp);
        trace!(temps = gen.next_temp - n_io, words = gen.words.len(), "generated method");
        methods.push(MethodCode { name: function.name, words: gen.words });
    }

    if register_count > instruction::MAX_SLOT_INDEX as u32 + 1 {
        return Err(Error::InvalidRegister);
    }

    Ok(CodegenOutput { register_count, methods })
}

struct FunctionCodegen<'p> {
    parsed: &'p ParsedProgram,
    locals: HashMap<Symbol, (u32, Type)>,
    next_temp: u32,
    words: Vec<u32>,
}

impl<'p> FunctionCodegen<'p> {
    fn new(parsed: &'p ParsedProgram, n_io: u32) -> Self {
        Self {
            parsed,
            locals: HashMap::new(),
            next_temp: n_io,
            words: Vec::new(),
        }
    }

    fn alloc_temp(&mut self) -> Result<u32, Error> {
        let index = self.next_temp;
        if index > instruction::MAX_SLOT_INDEX as u32 {
            return Err(Error::InvalidRegister);
        }
        self.next_temp += 1;
        Ok(index)
    }

    fn emit(&mut self, opcode: u8, dst: Operand, src1: Operand, src2: Operand) {
        let instr = Instruction::new(opcode, dst.encode(), src1.encode(), src2.encode());
        self.words.push(instr.pack());
    }

    fn emit_inline(&mut self, loc: &ValueLoc) {
        if let Some(words) = loc.inline_words() {
            self.words.extend(words);
        }
    }

    // --- statements ------------------------------------------------------

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::VarDecl { symbol, ty, init } => {
                let loc = self.lower_expr(init)?;
                let register = self.alloc_temp()?;
                self.emit_write(register, 0, *ty, &loc, false);
                self.locals.insert(*symbol, (register, *ty));
            }
            Stmt::Assign { target, value } => {
                let loc = self.lower_expr(value)?;
                let (register, component, ty, accumulate) = self.resolve_assign_target(target);
                self.emit_write(register, component, ty, &loc, accumulate);
            }
        }
        Ok(())
    }

    fn resolve_assign_target(&self, target: &AssignTarget) -> (u32, u8, Type, bool) {
        let component = target.components.as_ref().map(|c| c[0]).unwrap_or(0);
        if let Some(&(register, local_ty)) = self.locals.get(&target.symbol) {
            let ty = match &target.components {
                Some(c) => Type::of_component_count(c.len() as u8).expect("parser validated member length"),
                None => local_ty,
            };
            return (register, component, ty, false);
        }
        let (var, _) = self
            .parsed
            .env
            .lookup(target.symbol)
            .expect("assignment target was resolved during parsing");
        let ty = match &target.components {
            Some(c) => Type::of_component_count(c.len() as u8).expect("parser validated member length"),
            None => var.ty,
        };
        (var.slot, component, ty, var.accumulate)
    }

    /// Writes `loc` into `(register, component)`. When `accumulate` is set
    /// this reuses the `ADD` opcode family instead of `ASSIGN`, per §4.5
    /// "when the destination is declared `accumulate`".
    fn emit_write(&mut self, register: u32, component: u8, ty: Type, loc: &ValueLoc, accumulate: bool) {
        let dim = Dim::from_type(ty).expect("assignment target is always numeric");
        let dst = Operand::slot(register as u8, component);
        if accumulate {
            let self_read = Operand::slot(register as u8, component);
            let form = OperandForm::select(false, loc.is_const_or_uniform());
            let opcode = opcode::encode(OpKind::Binary { op: BinaryOp::Add, dim, form });
            self.emit(opcode, dst, self_read, loc.operand());
        } else {
            let form = UnaryForm::select(loc.is_const_or_uniform());
            let opcode = opcode::encode(OpKind::Unary { op: UnaryOp::Assign, dim, form });
            self.emit(opcode, dst, loc.operand(), Operand::slot(0, 0));
        }
        self.emit_inline(loc);
    }

    // --- expressions -------------------------------------------------------

    fn lower_expr(&mut self, expr: &Expr) -> Result<ValueLoc, Error> {
        match &expr.kind {
            ExprKind::ScalarLiteral(value) => Ok(ValueLoc::Literal(vec![*value])),
            ExprKind::Variable(symbol) => self.lower_variable(*symbol),
            ExprKind::Member { base, components } => self.lower_member(base, components),
            ExprKind::Negate(operand) => self.lower_unary(UnaryOp::Neg, operand),
            ExprKind::Add(lhs, rhs) => self.lower_binary(BinaryOp::Add, lhs, rhs, expr.ty, false),
            ExprKind::Sub(lhs, rhs) => self.lower_binary(BinaryOp::Sub, lhs, rhs, expr.ty, false),
            ExprKind::Mul(lhs, rhs) => self.lower_binary(BinaryOp::Mul, lhs, rhs, expr.ty, true),
            ExprKind::Div(lhs, rhs) => self.lower_binary(BinaryOp::Div, lhs, rhs, expr.ty, false),
            ExprKind::Min(lhs, rhs) => self.lower_binary(BinaryOp::Min, lhs, rhs, expr.ty, false),
            ExprKind::Max(lhs, rhs) => self.lower_binary(BinaryOp::Max, lhs, rhs, expr.ty, false),
            ExprKind::Dot(lhs, rhs) => self.lower_dot(lhs, rhs),
            ExprKind::Cross(lhs, rhs) => self.lower_cross(lhs, rhs),
            ExprKind::Length(operand) => self.lower_vec_unary(VecUnaryOp::Length, operand),
            ExprKind::Normalize(operand) => self.lower_vec_unary(VecUnaryOp::Normalize, operand),
            ExprKind::Sqrt(operand) => self.lower_scalar_unary(ScalarUnaryOp::Sqrt, operand),
            ExprKind::InvSqrt(operand) => self.lower_scalar_unary(ScalarUnaryOp::InvSqrt, operand),
            ExprKind::Sin(operand) => self.lower_scalar_unary(ScalarUnaryOp::Sin, operand),
            ExprKind::Cos(operand) => self.lower_scalar_unary(ScalarUnaryOp::Cos, operand),
            ExprKind::Tan(operand) => self.lower_scalar_unary(ScalarUnaryOp::Tan, operand),
            ExprKind::Asin(operand) => self.lower_scalar_unary(ScalarUnaryOp::Asin, operand),
            ExprKind::Acos(operand) => self.lower_scalar_unary(ScalarUnaryOp::Acos, operand),
            ExprKind::Atan(operand) => self.lower_scalar_unary(ScalarUnaryOp::Atan, operand),
            ExprKind::Floor(operand) => self.lower_unary(UnaryOp::Floor, operand),
            ExprKind::Ceil(operand) => self.lower_unary(UnaryOp::Ceil, operand),
            ExprKind::Sample { dim, sampler, coord } => self.lower_sample(*dim, *sampler, coord),
            ExprKind::Ternary { cond, then_branch, else_branch } => self.lower_ternary(cond, then_branch, else_branch),
            ExprKind::Comparison { .. } => {
                unreachable!("the parser only allows a comparison as a ternary condition")
            }
        }
    }

    fn lower_variable(&mut self, symbol: Symbol) -> Result<ValueLoc, Error> {
        if let Some(&(register, _)) = self.locals.get(&symbol) {
            return Ok(ValueLoc::Register { index: register, component: 0 });
        }
        let (var, _) = self.parsed.env.lookup(symbol).expect("variable was resolved during parsing");
        Ok(match var.attribute {
            Attribute::Input | Attribute::Output | Attribute::InOut | Attribute::Local => {
                ValueLoc::Register { index: var.slot, component: 0 }
            }
            Attribute::Uniform => ValueLoc::Uniform { index: var.slot, component: 0 },
            Attribute::Constant => {
                let values = match var.constant_value.as_ref().expect("const always has a value") {
                    crate::env::ConstValue::Scalar(v) => vec![*v],
                    crate::env::ConstValue::Vec2(v) => v.to_vec(),
                    crate::env::ConstValue::Vec3(v) => v.to_vec(),
                    crate::env::ConstValue::Vec4(v) => v.to_vec(),
                };
                ValueLoc::Literal(values)
            }
            Attribute::Sampler => unreachable!("the parser rejects a sampler used as a value"),
        })
    }

    fn lower_member(&mut self, base: &Expr, components: &[u8]) -> Result<ValueLoc, Error> {
        let base_loc = self.lower_expr(base)?;
        let lane = components[0];
        Ok(match base_loc {
            ValueLoc::Register { index, .. } => ValueLoc::Register { index, component: lane },
            ValueLoc::Uniform { index, .. } => ValueLoc::Uniform { index, component: lane },
            ValueLoc::Literal(values) => ValueLoc::Literal(components.iter().map(|&c| values[c as usize]).collect()),
        })
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<ValueLoc, Error> {
        let dim = Dim::from_type(operand.ty).expect("unary operand is numeric");
        let loc = self.lower_expr(operand)?;
        let form = UnaryForm::select(loc.is_const_or_uniform());
        let opcode = opcode::encode(OpKind::Unary { op, dim, form });
        let dst = self.alloc_temp()?;
        self.emit(opcode, Operand::slot(dst as u8, 0), loc.operand(), Operand::slot(0, 0));
        self.emit_inline(&loc);
        Ok(ValueLoc::Register { index: dst, component: 0 })
    }

    fn lower_scalar_unary(&mut self, op: ScalarUnaryOp, operand: &Expr) -> Result<ValueLoc, Error> {
        let loc = self.lower_expr(operand)?;
        let form = UnaryForm::select(loc.is_const_or_uniform());
        let opcode = opcode::encode(OpKind::ScalarUnary { op, form });
        let dst = self.alloc_temp()?;
        self.emit(opcode, Operand::slot(dst as u8, 0), loc.operand(), Operand::slot(0, 0));
        self.emit_inline(&loc);
        Ok(ValueLoc::Register { index: dst, component: 0 })
    }

    fn lower_vec_unary(&mut self, op: VecUnaryOp, operand: &Expr) -> Result<ValueLoc, Error> {
        let dim = Dim::from_type(operand.ty).expect("vector-unary operand is a vector");
        let loc = self.lower_expr(operand)?;
        let form = UnaryForm::select(loc.is_const_or_uniform());
        let opcode = opcode::encode(OpKind::VecUnary { op, dim, form });
        let dst = self.alloc_temp()?;
        self.emit(opcode, Operand::slot(dst as u8, 0), loc.operand(), Operand::slot(0, 0));
        self.emit_inline(&loc);
        Ok(ValueLoc::Register { index: dst, component: 0 })
    }

    fn lower_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr, result_ty: Type, commutative_scalar_vector: bool) -> Result<ValueLoc, Error> {
        let mut lhs_loc = self.lower_expr(lhs)?;
        let mut rhs_loc = self.lower_expr(rhs)?;
        // Multiplication is commutative; keep the vector operand first so
        // MUL only ever needs a "vector x scalar" kernel, never the reverse.
        if commutative_scalar_vector && lhs.ty == Type::Scalar && rhs.ty != Type::Scalar {
            std::mem::swap(&mut lhs_loc, &mut rhs_loc);
        }
        let dim = Dim::from_type(result_ty).expect("binary operator result is numeric");
        let form = OperandForm::select(lhs_loc.is_const_or_uniform(), rhs_loc.is_const_or_uniform());
        let opcode = opcode::encode(OpKind::Binary { op, dim, form });
        let dst = self.alloc_temp()?;
        self.emit(opcode, Operand::slot(dst as u8, 0), lhs_loc.operand(), rhs_loc.operand());
        self.emit_inline(&lhs_loc);
        self.emit_inline(&rhs_loc);
        Ok(ValueLoc::Register { index: dst, component: 0 })
    }

    fn lower_dot(&mut self, lhs: &Expr, rhs: &Expr) -> Result<ValueLoc, Error> {
        let dim = Dim::from_type(lhs.ty).expect("dot operands are vectors");
        let lhs_loc = self.lower_expr(lhs)?;
        let rhs_loc = self.lower_expr(rhs)?;
        let form = OperandForm::select(lhs_loc.is_const_or_uniform(), rhs_loc.is_const_or_uniform());
        let opcode = opcode::encode(OpKind::Dot { dim, form });
        let dst = self.alloc_temp()?;
        self.emit(opcode, Operand::slot(dst as u8, 0), lhs_loc.operand(), rhs_loc.operand());
        self.emit_inline(&lhs_loc);
        self.emit_inline(&rhs_loc);
        Ok(ValueLoc::Register { index: dst, component: 0 })
    }

    fn lower_cross(&mut self, lhs: &Expr, rhs: &Expr) -> Result<ValueLoc, Error> {
        let lhs_loc = self.lower_expr(lhs)?;
        let rhs_loc = self.lower_expr(rhs)?;
        let form = OperandForm::select(lhs_loc.is_const_or_uniform(), rhs_loc.is_const_or_uniform());
        let opcode = opcode::encode(OpKind::Cross { form });
        let dst = self.alloc_temp()?;
        self.emit(opcode, Operand::slot(dst as u8, 0), lhs_loc.operand(), rhs_loc.operand());
        self.emit_inline(&lhs_loc);
        self.emit_inline(&rhs_loc);
        Ok(ValueLoc::Register { index: dst, component: 0 })
    }

    fn lower_sample(&mut self, dim: crate::ast::SampleDim, sampler: Symbol, coord: &Expr) -> Result<ValueLoc, Error> {
        let (sampler_var, _) = self.parsed.env.lookup(sampler).expect("sampler was resolved during parsing");
        let arity = match dim {
            crate::ast::SampleDim::One => SampleArity::One,
            crate::ast::SampleDim::Two => SampleArity::Two,
            crate::ast::SampleDim::Three => SampleArity::Three,
        };
        let coord_loc = self.lower_expr(coord)?;
        // `Sample` has no operand-form bits, so a slot byte is always read as
        // a register by the VM: a uniform or literal coordinate has to be
        // copied into a register first rather than passed through directly.
        let coord_loc = self.materialize_register(coord_loc, coord.ty)?;
        let opcode = opcode::encode(OpKind::Sample { arity });
        let dst = self.alloc_temp()?;
        self.emit(
            opcode,
            Operand::slot(dst as u8, 0),
            Operand::slot(sampler_var.slot as u8, 0),
            coord_loc.operand(),
        );
        self.emit_inline(&coord_loc);
        Ok(ValueLoc::Register { index: dst, component: 0 })
    }

    /// Copies `loc` into a fresh register if it isn't already one.
    fn materialize_register(&mut self, loc: ValueLoc, ty: Type) -> Result<ValueLoc, Error> {
        if matches!(loc, ValueLoc::Register { .. }) {
            return Ok(loc);
        }
        let dim = Dim::from_type(ty).expect("materialized value is numeric");
        let form = UnaryForm::select(loc.is_const_or_uniform());
        let opcode = opcode::encode(OpKind::Unary { op: UnaryOp::Assign, dim, form });
        let dst = self.alloc_temp()?;
        self.emit(opcode, Operand::slot(dst as u8, 0), loc.operand(), Operand::slot(0, 0));
        self.emit_inline(&loc);
        Ok(ValueLoc::Register { index: dst, component: 0 })
    }

    fn lower_ternary(&mut self, cond: &Expr, then_branch: &Expr, else_branch: &Expr) -> Result<ValueLoc, Error> {
        let ExprKind::Comparison { op, lhs, rhs } = &cond.kind else {
            unreachable!("the parser only allows a comparison as a ternary condition")
        };
        let lhs_loc = self.lower_expr(lhs)?;
        let rhs_loc = self.lower_expr(rhs)?;
        let cmp_form = OperandForm::select(lhs_loc.is_const_or_uniform(), rhs_loc.is_const_or_uniform());
        let cmp_opcode = opcode::encode(OpKind::Compare { op: *op, form: cmp_form });
        self.emit(cmp_opcode, Operand::slot(0, 0), lhs_loc.operand(), rhs_loc.operand());
        self.emit_inline(&lhs_loc);
        self.emit_inline(&rhs_loc);

        let then_loc = self.lower_expr(then_branch)?;
        let else_loc = self.lower_expr(else_branch)?;
        let dim = Dim::from_type(then_branch.ty).expect("ternary branches are numeric");
        let cond_form = OperandForm::select(then_loc.is_const_or_uniform(), else_loc.is_const_or_uniform());
        let cond_opcode = opcode::encode(OpKind::Cond { dim, form: cond_form });
        let dst = self.alloc_temp()?;
        self.emit(cond_opcode, Operand::slot(dst as u8, 0), then_loc.operand(), else_loc.operand());
        self.emit_inline(&then_loc);
        self.emit_inline(&else_loc);
        Ok(ValueLoc::Register { index: dst, component: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Instruction;

    fn compile_ok(source: &str) -> (ParsedProgram, CodegenOutput) {
        let parsed = crate::parser::parse(source).expect("source should parse");
        let out = generate(&parsed).expect("codegen should succeed");
        (parsed, out)
    }

    #[test]
    fn scalar_add_constant_emits_add_then_assign() {
        let (_, out) = compile_ok("in float a; out float b; void main(){ b = a + 1.0; }");
        let words = &out.methods[0].words;
        // ADD RC (register + inline constant) then one inline word, then ASSIGN.
        let add = Instruction::unpack(words[0]);
        assert_eq!(opcode::decode(add.opcode), Some(OpKind::Binary { op: BinaryOp::Add, dim: Dim::Scalar, form: OperandForm::RC }));
        assert_eq!(f32::from_bits(words[1]), 1.0);
        let assign = Instruction::unpack(words[2]);
        assert_eq!(
            opcode::decode(assign.opcode),
            Some(OpKind::Unary { op: UnaryOp::Assign, dim: Dim::Scalar, form: UnaryForm::R })
        );
    }

    #[test]
    fn register_count_covers_io_and_temporaries() {
        let (parsed, out) = compile_ok("in float a; out float b; void main(){ b = a + 1.0; }");
        assert_eq!(out.register_count, parsed.streams.len() as u32 + 1);
    }

    #[test]
    fn accumulate_output_reuses_add_opcode() {
        let (_, out) = compile_ok("in vec4 x; in vec4 y; out accumulate vec4 v; void main(){ v = x + y; }");
        let words = &out.methods[0].words;
        let add_xy = Instruction::unpack(words[0]);
        assert_eq!(opcode::decode(add_xy.opcode), Some(OpKind::Binary { op: BinaryOp::Add, dim: Dim::Vec4, form: OperandForm::RR }));
        let accumulate = Instruction::unpack(words[1]);
        assert_eq!(opcode::decode(accumulate.opcode), Some(OpKind::Binary { op: BinaryOp::Add, dim: Dim::Vec4, form: OperandForm::RR }));
    }

    #[test]
    fn ternary_emits_compare_then_cond() {
        let (_, out) = compile_ok("in float a; in float b; out float c; void main(){ c = a < b ? a : b; }");
        let words = &out.methods[0].words;
        let cmp = Instruction::unpack(words[0]);
        assert_eq!(opcode::decode(cmp.opcode), Some(OpKind::Compare { op: crate::ast::CompareOp::Lt, form: OperandForm::RR }));
        let cond = Instruction::unpack(words[1]);
        assert!(matches!(opcode::decode(cond.opcode), Some(OpKind::Cond { .. })));
    }

    #[test]
    fn dot_product_uses_dot_opcode() {
        let (_, out) = compile_ok("in vec3 u; in vec3 v; out float d; void main(){ d = dot(u,v); }");
        let words = &out.methods[0].words;
        let dot = Instruction::unpack(words[0]);
        assert_eq!(opcode::decode(dot.opcode), Some(OpKind::Dot { dim: Dim::Vec3, form: OperandForm::RR }));
    }

    #[test]
    fn scalar_times_vector_swaps_operands_to_keep_vector_first() {
        let (_, out) = compile_ok("in vec2 a; uniform float r; out vec2 c; void main(){ c = r * a; }");
        let words = &out.methods[0].words;
        let mul = Instruction::unpack(words[0]);
        // Regardless of source order, src1 must be the vector register and
        // src2 the uniform scalar, i.e. the RC form (register, const/uniform).
        assert_eq!(opcode::decode(mul.opcode), Some(OpKind::Binary { op: BinaryOp::Mul, dim: Dim::Vec2, form: OperandForm::RC }));
    }

    #[test]
    fn member_write_encodes_component_in_destination() {
        let (_, out) = compile_ok("in vec3 a; out vec3 b; void main(){ b.z = a.x; }");
        let words = &out.methods[0].words;
        let assign = Instruction::unpack(words[0]);
        assert_eq!(Operand::decode(assign.dst), Operand::slot(1, 2));
        assert_eq!(Operand::decode(assign.src1), Operand::slot(0, 0));
    }

    #[test]
    fn uniform_sample_coordinate_is_materialized_into_a_register() {
        let (_, out) =
            compile_ok("uniform float u; sampler tex; out vec4 c; void main(){ c = sample1D(tex, u); }");
        let words = &out.methods[0].words;
        // ASSIGN copies the uniform into a register first...
        let assign = Instruction::unpack(words[0]);
        assert_eq!(
            opcode::decode(assign.opcode),
            Some(OpKind::Unary { op: UnaryOp::Assign, dim: Dim::Scalar, form: UnaryForm::C })
        );
        // ...then SAMPLE1D reads that register, never the raw uniform slot.
        let sample = Instruction::unpack(words[1]);
        assert_eq!(opcode::decode(sample.opcode), Some(OpKind::Sample { arity: SampleArity::One }));
        assert_eq!(Operand::decode(sample.src2), Operand::slot(1, 0));
    }

    #[test]
    fn too_many_streams_is_rejected() {
        let mut source = String::new();
        for i in 0..70 {
            source.push_str(&format!("in float a{i};\n"));
        }
        source.push_str("void main(){}\n");
        let parsed = crate::parser::parse(&source).expect("source should parse");
        assert!(matches!(generate(&parsed), Err(Error::InvalidRegister)));
    }
}
