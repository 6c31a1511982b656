//! Recursive-descent parser and inline type checker, per `spec.md` §4.4.
//!
//! There is no separate type-checking pass: every expression node is
//! assigned its [`Type`](crate::ast::Type) the moment it is built, and a
//! type-rule violation is reported immediately as a `ParseError` at the
//! position of the offending token.

use tracing::{debug, trace};

use crate::ast::{AssignTarget, CompareOp, Components, Expr, ExprKind, Function, Program, SampleDim, Stmt, Type};
use crate::env::{Attribute, ConstValue, Environment, Variable};
use crate::error::{Error, Position};
use crate::lexer::{Keyword, Lexer, Punct, Token, TokenKind};
use crate::symtab::{Symbol, SymbolTable};

/// One global's slot assignment, in declaration order — the order the
/// bytecode artifact's name tables are built in.
#[derive(Debug, Clone)]
pub struct GlobalSlot {
    pub symbol: Symbol,
    pub ty: Type,
    pub slot: u32,
}

/// Everything the code generator needs that isn't part of the typed AST:
/// the interned names, the declared scopes, and the declaration-ordered
/// slot tables for each global kind.
pub struct ParsedProgram {
    pub program: Program,
    pub symbols: SymbolTable,
    pub env: Environment,
    pub streams: Vec<GlobalSlot>,
    pub uniforms: Vec<GlobalSlot>,
    pub samplers: Vec<GlobalSlot>,
}

pub fn parse(source: &str) -> Result<ParsedProgram, Error> {
    let mut parser = Parser::new(source);
    parser.parse_program()
}

struct Parser {
    lexer: Lexer,
    symbols: SymbolTable,
    env: Environment,
    streams: Vec<GlobalSlot>,
    uniforms: Vec<GlobalSlot>,
    samplers: Vec<GlobalSlot>,
    next_stream_slot: u32,
    next_uniform_slot: u32,
    next_sampler_slot: u32,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            symbols: SymbolTable::new(),
            env: Environment::new(),
            streams: Vec::new(),
            uniforms: Vec::new(),
            samplers: Vec::new(),
            next_stream_slot: 0,
            next_uniform_slot: 0,
            next_sampler_slot: 0,
        }
    }

    fn position(&mut self) -> Position {
        self.lexer.peek().at
    }

    fn error(&mut self, message: impl Into<String>) -> Error {
        Error::parse(message, self.position())
    }

    fn peek(&mut self) -> &TokenKind {
        &self.lexer.peek().kind
    }

    fn advance(&mut self) -> Token {
        self.lexer.next()
    }

    fn expect_punct(&mut self, punct: Punct) -> Result<(), Error> {
        let at = self.position();
        let token = self.advance();
        if token.kind == TokenKind::Punct(punct) {
            Ok(())
        } else {
            Err(Error::parse(format!("expected `{punct:?}`, found {:?}", token.kind), at))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), Error> {
        let at = self.position();
        let token = self.advance();
        if token.kind == TokenKind::Keyword(keyword) {
            Ok(())
        } else {
            Err(Error::parse(format!("expected `{keyword:?}`, found {:?}", token.kind), at))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, Error> {
        let at = self.position();
        match self.advance().kind {
            TokenKind::Identifier(name) => Ok(name),
            other => Err(Error::parse(format!("expected an identifier, found {other:?}"), at)),
        }
    }

    fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.insert(name, true).expect("create_if_missing is set")
    }

    // --- program -------------------------------------------------------

    fn parse_program(&mut self) -> Result<ParsedProgram, Error> {
        while self.is_global_decl_start() {
            self.parse_global_decl()?;
        }
        let mut functions = Vec::new();
        while !matches!(self.peek(), TokenKind::Eof) {
            if self.is_global_decl_start() {
                return Err(self.error("global declarations must precede all function definitions"));
            }
            functions.push(self.parse_function()?);
        }
        Ok(ParsedProgram {
            program: Program { functions },
            symbols: std::mem::take(&mut self.symbols),
            env: std::mem::replace(&mut self.env, Environment::new()),
            streams: std::mem::take(&mut self.streams),
            uniforms: std::mem::take(&mut self.uniforms),
            samplers: std::mem::take(&mut self.samplers),
        })
    }

    fn is_global_decl_start(&mut self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Keyword(Keyword::In)
                | TokenKind::Keyword(Keyword::Out)
                | TokenKind::Keyword(Keyword::Inout)
                | TokenKind::Keyword(Keyword::Const)
                | TokenKind::Keyword(Keyword::Uniform)
                | TokenKind::Keyword(Keyword::Sampler)
        )
    }

    fn parse_global_decl(&mut self) -> Result<(), Error> {
        match self.peek().clone() {
            TokenKind::Keyword(Keyword::In) | TokenKind::Keyword(Keyword::Out) | TokenKind::Keyword(Keyword::Inout) => {
                self.parse_io_decl()
            }
            TokenKind::Keyword(Keyword::Const) => self.parse_const_decl(),
            TokenKind::Keyword(Keyword::Uniform) => self.parse_uniform_decl(),
            TokenKind::Keyword(Keyword::Sampler) => self.parse_sampler_decl(),
            other => Err(self.error(format!("expected a global declaration, found {other:?}"))),
        }
    }

    fn parse_io_decl(&mut self) -> Result<(), Error> {
        let at = self.position();
        let attribute = match self.advance().kind {
            TokenKind::Keyword(Keyword::In) => Attribute::Input,
            TokenKind::Keyword(Keyword::Out) => Attribute::Output,
            TokenKind::Keyword(Keyword::Inout) => Attribute::InOut,
            _ => unreachable!("caller checked is_global_decl_start"),
        };
        let accumulate = if matches!(self.peek(), TokenKind::Keyword(Keyword::Accumulate)) {
            self.advance();
            true
        } else {
            false
        };
        if accumulate && !matches!(attribute, Attribute::Output | Attribute::InOut) {
            return Err(Error::parse("`accumulate` only applies to `out`/`inout` variables", at));
        }
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;
        self.expect_punct(Punct::Semicolon)?;

        let symbol = self.intern(&name);
        let slot = self.next_stream_slot;
        if !self.env.declare_with(symbol, ty, attribute, slot, None, accumulate) {
            return Err(Error::parse(format!("`{name}` is already declared in this scope"), at));
        }
        self.next_stream_slot += 1;
        self.streams.push(GlobalSlot { symbol, ty, slot });
        debug!(name, ?ty, ?attribute, slot, "declared stream variable");
        Ok(())
    }

    fn parse_uniform_decl(&mut self) -> Result<(), Error> {
        let at = self.position();
        self.expect_keyword(Keyword::Uniform)?;
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;
        self.expect_punct(Punct::Semicolon)?;

        let symbol = self.intern(&name);
        let slot = self.next_uniform_slot;
        if !self.env.declare(symbol, ty, Attribute::Uniform, slot) {
            return Err(Error::parse(format!("`{name}` is already declared in this scope"), at));
        }
        self.next_uniform_slot += 1;
        self.uniforms.push(GlobalSlot { symbol, ty, slot });
        debug!(name, ?ty, slot, "declared uniform");
        Ok(())
    }

    fn parse_sampler_decl(&mut self) -> Result<(), Error> {
        let at = self.position();
        self.expect_keyword(Keyword::Sampler)?;
        let name = self.expect_identifier()?;
        self.expect_punct(Punct::Semicolon)?;

        let symbol = self.intern(&name);
        let slot = self.next_sampler_slot;
        if !self.env.declare(symbol, Type::Sampler, Attribute::Sampler, slot) {
            return Err(Error::parse(format!("`{name}` is already declared in this scope"), at));
        }
        self.next_sampler_slot += 1;
        self.samplers.push(GlobalSlot { symbol, ty: Type::Sampler, slot });
        debug!(name, slot, "declared sampler");
        Ok(())
    }

    fn parse_const_decl(&mut self) -> Result<(), Error> {
        let at = self.position();
        self.expect_keyword(Keyword::Const)?;
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;
        self.expect_punct(Punct::Assign)?;
        let value = self.parse_const_value(ty)?;
        self.expect_punct(Punct::Semicolon)?;

        let symbol = self.intern(&name);
        if !self.env.declare_with(symbol, ty, Attribute::Constant, 0, Some(value), false) {
            return Err(Error::parse(format!("`{name}` is already declared in this scope"), at));
        }
        debug!(name, ?ty, "declared constant");
        Ok(())
    }

    fn parse_const_value(&mut self, ty: Type) -> Result<ConstValue, Error> {
        let at = self.position();
        if matches!(self.peek(), TokenKind::Punct(Punct::LBrace)) {
            self.advance();
            let mut values = Vec::new();
            loop {
                values.push(self.parse_signed_number()?);
                if matches!(self.peek(), TokenKind::Punct(Punct::Comma)) {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect_punct(Punct::RBrace)?;
            return match (ty, values.len()) {
                (Type::Vec2, 2) => Ok(ConstValue::Vec2([values[0], values[1]])),
                (Type::Vec3, 3) => Ok(ConstValue::Vec3([values[0], values[1], values[2]])),
                (Type::Vec4, 4) => Ok(ConstValue::Vec4([values[0], values[1], values[2], values[3]])),
                _ => Err(Error::parse(
                    format!("expected {} values for a `{ty}` constant, found {}", ty.component_count(), values.len()),
                    at,
                )),
            };
        }
        let value = self.parse_signed_number()?;
        if ty != Type::Scalar {
            return Err(Error::parse(format!("`{ty}` constant requires a `{{...}}` initializer"), at));
        }
        Ok(ConstValue::Scalar(value))
    }

    fn parse_signed_number(&mut self) -> Result<f32, Error> {
        let negate = if matches!(self.peek(), TokenKind::Punct(Punct::Minus)) {
            self.advance();
            true
        } else {
            false
        };
        let at = self.position();
        let value = match self.advance().kind {
            TokenKind::RealLiteral(v) => v,
            TokenKind::IntegerLiteral(v) => v as f32,
            other => return Err(Error::parse(format!("expected a number, found {other:?}"), at)),
        };
        Ok(if negate { -value } else { value })
    }

    fn parse_type(&mut self) -> Result<Type, Error> {
        let at = self.position();
        let ty = match self.advance().kind {
            TokenKind::Keyword(Keyword::Float) => Type::Scalar,
            TokenKind::Keyword(Keyword::Vec2) => Type::Vec2,
            TokenKind::Keyword(Keyword::Vec3) => Type::Vec3,
            TokenKind::Keyword(Keyword::Vec4) => Type::Vec4,
            other => return Err(Error::parse(format!("expected a type, found {other:?}"), at)),
        };
        Ok(ty)
    }

    // --- functions -------------------------------------------------------

    fn parse_function(&mut self) -> Result<Function, Error> {
        let at = self.position();
        self.expect_keyword(Keyword::Void)
            .map_err(|_| Error::parse("function definitions must declare `void` return type", at))?;
        let name = self.expect_identifier()?;
        self.expect_punct(Punct::LParen)?;
        self.expect_punct(Punct::RParen)?;
        self.expect_punct(Punct::LBrace)?;

        let symbol = self.intern(&name);
        self.env.enter();
        trace!(name, "entering function body");
        let mut body = Vec::new();
        while !matches!(self.peek(), TokenKind::Punct(Punct::RBrace)) {
            body.push(self.parse_statement()?);
        }
        self.advance(); // consume '}'
        self.env.leave();
        trace!(name, statements = body.len(), "left function body");

        Ok(Function { name: symbol, body })
    }

    fn parse_statement(&mut self) -> Result<Stmt, Error> {
        match self.peek().clone() {
            TokenKind::Keyword(Keyword::Float)
            | TokenKind::Keyword(Keyword::Vec2)
            | TokenKind::Keyword(Keyword::Vec3)
            | TokenKind::Keyword(Keyword::Vec4) => self.parse_var_decl(),
            TokenKind::Identifier(_) => self.parse_assignment(),
            other => Err(self.error(format!("expected a statement, found {other:?}"))),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, Error> {
        let ty = self.parse_type()?;
        let at = self.position();
        let name = self.expect_identifier()?;
        self.expect_punct(Punct::Assign)?;
        let init = self.parse_expression()?;
        self.expect_punct(Punct::Semicolon)?;

        if init.ty != ty {
            return Err(Error::parse(format!("cannot initialize `{ty}` variable `{name}` with a `{}` value", init.ty), at));
        }
        let symbol = self.intern(&name);
        if let Some((_, from_ancestor)) = self.env.lookup(symbol) {
            if from_ancestor {
                debug!(name, "local variable shadows an outer declaration");
            }
        }
        if !self.env.declare(symbol, ty, Attribute::Local, 0) {
            return Err(Error::parse(format!("`{name}` is already declared in this scope"), at));
        }
        Ok(Stmt::VarDecl { symbol, ty, init })
    }

    fn parse_assignment(&mut self) -> Result<Stmt, Error> {
        let at = self.position();
        let name = self.expect_identifier()?;
        let symbol = self.intern(&name);
        let var = self
            .env
            .lookup(symbol)
            .map(|(var, _)| var.clone())
            .ok_or_else(|| Error::parse(format!("`{name}` is not declared"), at))?;

        match var.attribute {
            Attribute::Sampler => return Err(Error::parse(format!("`{name}` is a sampler and has no value to assign"), at)),
            Attribute::Input => return Err(Error::parse(format!("cannot assign to input variable `{name}`"), at)),
            Attribute::Constant => return Err(Error::parse(format!("cannot assign to constant `{name}`"), at)),
            Attribute::Uniform => return Err(Error::parse(format!("cannot assign to uniform `{name}`"), at)),
            Attribute::Output | Attribute::InOut | Attribute::Local => {}
        }

        let components = if matches!(self.peek(), TokenKind::Punct(Punct::Dot)) {
            self.advance();
            Some(self.parse_member(var.ty)?)
        } else {
            None
        };
        let target_ty = match &components {
            Some(c) => Type::of_component_count(c.len() as u8).expect("parse_member validated length"),
            None => var.ty,
        };

        self.expect_punct(Punct::Assign)?;
        let value_at = self.position();
        let value = self.parse_expression()?;
        self.expect_punct(Punct::Semicolon)?;

        if value.ty != target_ty {
            return Err(Error::parse(format!("cannot assign a `{}` value to `{name}` of type `{target_ty}`", value.ty), value_at));
        }

        Ok(Stmt::Assign { target: AssignTarget { symbol, components }, value })
    }

    /// Parses a member-access suffix (already past the `.`) against a base
    /// value of component count `base_count`, per §4.4 "Member access":
    /// a single letter selects one scalar; a multi-letter member must be
    /// exactly the prefix "xy", "xyz", or "xyzw" starting at component 0.
    fn parse_member(&mut self, base_ty: Type) -> Result<Components, Error> {
        let at = self.position();
        let base_count = base_ty.component_count();
        if base_count <= 1 {
            return Err(Error::parse("member access is not valid on a scalar", at));
        }
        let name = self.expect_identifier()?;
        const LANES: &str = "xyzw";
        let single_lane_in_range = name.len() == 1 && LANES.find(name.as_str()).is_some_and(|i| (i as u8) < base_count);
        let valid_prefix = matches!(name.as_str(), "xy" | "xyz" | "xyzw") && name.len() as u8 <= base_count;
        if !single_lane_in_range && !valid_prefix {
            return Err(Error::parse(format!("`{name}` is not a valid member (expected a prefix of \"xyzw\")"), at));
        }
        Ok(name.bytes().map(|b| LANES.find(b as char).unwrap() as u8).collect())
    }

    // --- expressions -----------------------------------------------------

    fn parse_expression(&mut self) -> Result<Expr, Error> {
        let cond = self.parse_comparison()?;
        if matches!(self.peek(), TokenKind::Punct(Punct::Question)) {
            let at = self.position();
            self.advance();
            if cond.ty != Type::Bool {
                return Err(Error::parse("ternary condition must be a comparison", at));
            }
            let then_branch = self.parse_comparison()?;
            self.expect_punct(Punct::Colon)?;
            let else_branch = self.parse_comparison()?;
            if matches!(then_branch.kind, ExprKind::Ternary { .. }) || matches!(else_branch.kind, ExprKind::Ternary { .. }) {
                return Err(Error::parse("nested ternary expressions are not supported", at));
            }
            if !then_branch.ty.is_numeric() || then_branch.ty != else_branch.ty {
                return Err(Error::parse(
                    format!("ternary branches must share a numeric type (found `{}` and `{}`)", then_branch.ty, else_branch.ty),
                    at,
                ));
            }
            let ty = then_branch.ty;
            return Ok(Expr::new(
                ExprKind::Ternary {
                    cond: Box::new(cond),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                },
                ty,
            ));
        }
        Ok(cond)
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        let lhs = self.parse_addsub()?;
        let at = self.position();
        let op = match self.peek() {
            TokenKind::Punct(Punct::Gt) => CompareOp::Gt,
            TokenKind::Punct(Punct::Lt) => CompareOp::Lt,
            TokenKind::Punct(Punct::Ge) => CompareOp::Ge,
            TokenKind::Punct(Punct::Le) => CompareOp::Le,
            TokenKind::Punct(Punct::Eq) => CompareOp::Eq,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_addsub()?;
        if lhs.ty != Type::Scalar || rhs.ty != Type::Scalar {
            return Err(Error::parse("comparison operands must be scalar", at));
        }
        Ok(Expr::new(ExprKind::Comparison { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, Type::Bool))
    }

    fn parse_addsub(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_term()?;
        loop {
            let at = self.position();
            let plus = matches!(self.peek(), TokenKind::Punct(Punct::Plus));
            let minus = matches!(self.peek(), TokenKind::Punct(Punct::Minus));
            if !plus && !minus {
                break;
            }
            self.advance();
            let rhs = self.parse_term()?;
            if lhs.ty != rhs.ty {
                return Err(Error::parse(format!("cannot combine `{}` and `{}`", lhs.ty, rhs.ty), at));
            }
            let ty = lhs.ty;
            let kind = if plus { ExprKind::Add(Box::new(lhs), Box::new(rhs)) } else { ExprKind::Sub(Box::new(lhs), Box::new(rhs)) };
            lhs = Expr::new(kind, ty);
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_factor()?;
        loop {
            let at = self.position();
            let mul = matches!(self.peek(), TokenKind::Punct(Punct::Star));
            let div = matches!(self.peek(), TokenKind::Punct(Punct::Slash));
            if !mul && !div {
                break;
            }
            self.advance();
            let rhs = self.parse_factor()?;
            lhs = if mul {
                let ty = mul_type(lhs.ty, rhs.ty).ok_or_else(|| Error::parse(format!("cannot multiply `{}` by `{}`", lhs.ty, rhs.ty), at))?;
                Expr::new(ExprKind::Mul(Box::new(lhs), Box::new(rhs)), ty)
            } else {
                let ty = div_type(lhs.ty, rhs.ty).ok_or_else(|| Error::parse(format!("cannot divide `{}` by `{}`", lhs.ty, rhs.ty), at))?;
                Expr::new(ExprKind::Div(Box::new(lhs), Box::new(rhs)), ty)
            };
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<Expr, Error> {
        let at = self.position();
        match self.peek().clone() {
            TokenKind::RealLiteral(v) => {
                self.advance();
                Ok(Expr::new(ExprKind::ScalarLiteral(v), Type::Scalar))
            }
            TokenKind::IntegerLiteral(v) => {
                self.advance();
                Ok(Expr::new(ExprKind::ScalarLiteral(v as f32), Type::Scalar))
            }
            TokenKind::Punct(Punct::Minus) => {
                self.advance();
                let operand = self.parse_factor()?;
                if !operand.ty.is_numeric() {
                    return Err(Error::parse(format!("cannot negate a `{}` value", operand.ty), at));
                }
                let ty = operand.ty;
                Ok(Expr::new(ExprKind::Negate(Box::new(operand)), ty))
            }
            TokenKind::Punct(Punct::LParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_punct(Punct::RParen)?;
                Ok(inner)
            }
            TokenKind::Keyword(keyword) if builtin_name(keyword).is_some() => self.parse_builtin_call(keyword),
            TokenKind::Identifier(name) => {
                self.advance();
                let symbol = self.intern(&name);
                let var = self.env.lookup(symbol).map(|(var, _)| var.clone()).ok_or_else(|| Error::parse(format!("`{name}` is not declared"), at))?;
                self.parse_variable_reference(symbol, &var)
            }
            other => Err(Error::parse(format!("expected an expression, found {other:?}"), at)),
        }
    }

    fn parse_variable_reference(&mut self, symbol: Symbol, var: &Variable) -> Result<Expr, Error> {
        let at = self.position();
        if matches!(var.attribute, Attribute::Sampler) {
            return Err(Error::parse("a sampler cannot be used as a value", at));
        }
        let base = Expr::new(ExprKind::Variable(symbol), var.ty);
        if matches!(self.peek(), TokenKind::Punct(Punct::Dot)) {
            self.advance();
            let components = self.parse_member(var.ty)?;
            let ty = Type::of_component_count(components.len() as u8).expect("parse_member validated length");
            return Ok(Expr::new(ExprKind::Member { base: Box::new(base), components }, ty));
        }
        Ok(base)
    }

    fn parse_builtin_call(&mut self, keyword: Keyword) -> Result<Expr, Error> {
        let at = self.position();
        self.advance();
        self.expect_punct(Punct::LParen)?;

        let expr = match keyword {
            Keyword::Sample1D | Keyword::Sample2D | Keyword::Sample3D => {
                let dim = match keyword {
                    Keyword::Sample1D => SampleDim::One,
                    Keyword::Sample2D => SampleDim::Two,
                    Keyword::Sample3D => SampleDim::Three,
                    _ => unreachable!(),
                };
                let sampler_at = self.position();
                let sampler_name = self.expect_identifier()?;
                let sampler_symbol = self.intern(&sampler_name);
                let sampler_var = self
                    .env
                    .lookup(sampler_symbol)
                    .map(|(v, _)| v.clone())
                    .ok_or_else(|| Error::parse(format!("`{sampler_name}` is not declared"), sampler_at))?;
                if !matches!(sampler_var.attribute, Attribute::Sampler) {
                    return Err(Error::parse(format!("`{sampler_name}` is not a sampler"), sampler_at));
                }
                self.expect_punct(Punct::Comma)?;
                let coord_at = self.position();
                let coord = self.parse_expression()?;
                let expected = match dim {
                    SampleDim::One => Type::Scalar,
                    SampleDim::Two => Type::Vec2,
                    SampleDim::Three => Type::Vec3,
                };
                if coord.ty != expected {
                    return Err(Error::parse(format!("{:?} expects a `{expected}` coordinate, found `{}`", keyword, coord.ty), coord_at));
                }
                Expr::new(ExprKind::Sample { dim, sampler: sampler_symbol, coord: Box::new(coord) }, Type::Vec4)
            }
            Keyword::Dot | Keyword::Cross | Keyword::Min | Keyword::Max => {
                let lhs = self.parse_expression()?;
                self.expect_punct(Punct::Comma)?;
                let rhs = self.parse_expression()?;
                match keyword {
                    Keyword::Dot => {
                        if !lhs.ty.is_vector() || lhs.ty != rhs.ty {
                            return Err(Error::parse("dot() requires two operands of the same vector type", at));
                        }
                        Expr::new(ExprKind::Dot(Box::new(lhs), Box::new(rhs)), Type::Scalar)
                    }
                    Keyword::Cross => {
                        if lhs.ty != Type::Vec3 || rhs.ty != Type::Vec3 {
                            return Err(Error::parse("cross() requires two vec3 operands", at));
                        }
                        Expr::new(ExprKind::Cross(Box::new(lhs), Box::new(rhs)), Type::Vec3)
                    }
                    Keyword::Min | Keyword::Max => {
                        if !lhs.ty.is_numeric() || lhs.ty != rhs.ty {
                            return Err(Error::parse(format!("{:?}() requires two operands of the same numeric type", keyword), at));
                        }
                        let ty = lhs.ty;
                        let kind = if keyword == Keyword::Min { ExprKind::Min(Box::new(lhs), Box::new(rhs)) } else { ExprKind::Max(Box::new(lhs), Box::new(rhs)) };
                        Expr::new(kind, ty)
                    }
                    _ => unreachable!(),
                }
            }
            Keyword::Length | Keyword::Normalize => {
                let operand = self.parse_expression()?;
                if !operand.ty.is_vector() {
                    return Err(Error::parse(format!("{:?}() requires a vector operand", keyword), at));
                }
                if keyword == Keyword::Length {
                    Expr::new(ExprKind::Length(Box::new(operand)), Type::Scalar)
                } else {
                    let ty = operand.ty;
                    Expr::new(ExprKind::Normalize(Box::new(operand)), ty)
                }
            }
            Keyword::Floor | Keyword::Ceil => {
                let operand = self.parse_expression()?;
                if !operand.ty.is_numeric() {
                    return Err(Error::parse(format!("{:?}() requires a numeric operand", keyword), at));
                }
                let ty = operand.ty;
                let kind = if keyword == Keyword::Floor { ExprKind::Floor(Box::new(operand)) } else { ExprKind::Ceil(Box::new(operand)) };
                Expr::new(kind, ty)
            }
            Keyword::Sin | Keyword::Cos | Keyword::Tan | Keyword::Asin | Keyword::Acos | Keyword::Atan | Keyword::Sqrt | Keyword::Invsqrt => {
                let operand = self.parse_expression()?;
                if operand.ty != Type::Scalar {
                    return Err(Error::parse(format!("{:?}() requires a scalar operand", keyword), at));
                }
                let kind = match keyword {
                    Keyword::Sin => ExprKind::Sin(Box::new(operand)),
                    Keyword::Cos => ExprKind::Cos(Box::new(operand)),
                    Keyword::Tan => ExprKind::Tan(Box::new(operand)),
                    Keyword::Asin => ExprKind::Asin(Box::new(operand)),
                    Keyword::Acos => ExprKind::Acos(Box::new(operand)),
                    Keyword::Atan => ExprKind::Atan(Box::new(operand)),
                    Keyword::Sqrt => ExprKind::Sqrt(Box::new(operand)),
                    Keyword::Invsqrt => ExprKind::InvSqrt(Box::new(operand)),
                    _ => unreachable!(),
                };
                Expr::new(kind, Type::Scalar)
            }
            _ => return Err(self.error(format!("`{keyword:?}` is not callable"))),
        };

        self.expect_punct(Punct::RParen)?;
        Ok(expr)
    }
}

fn builtin_name(keyword: Keyword) -> Option<&'static str> {
    Some(match keyword {
        Keyword::Dot => "dot",
        Keyword::Cross => "cross",
        Keyword::Length => "length",
        Keyword::Normalize => "normalize",
        Keyword::Sqrt => "sqrt",
        Keyword::Invsqrt => "invsqrt",
        Keyword::Sin => "sin",
        Keyword::Cos => "cos",
        Keyword::Tan => "tan",
        Keyword::Asin => "asin",
        Keyword::Acos => "acos",
        Keyword::Atan => "atan",
        Keyword::Min => "min",
        Keyword::Max => "max",
        Keyword::Floor => "floor",
        Keyword::Ceil => "ceil",
        Keyword::Sample1D => "sample1D",
        Keyword::Sample2D => "sample2D",
        Keyword::Sample3D => "sample3D",
        _ => return None,
    })
}

fn mul_type(lhs: Type, rhs: Type) -> Option<Type> {
    match (lhs, rhs) {
        (Type::Scalar, Type::Scalar) => Some(Type::Scalar),
        (Type::Scalar, v) if v.is_vector() => Some(v),
        (v, Type::Scalar) if v.is_vector() => Some(v),
        _ => None,
    }
}

fn div_type(lhs: Type, rhs: Type) -> Option<Type> {
    match (lhs, rhs) {
        (Type::Scalar, Type::Scalar) => Some(Type::Scalar),
        (v, Type::Scalar) if v.is_vector() => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> ParsedProgram {
        parse(source).unwrap_or_else(|e| panic!("expected {source:?} to parse, got {e}"))
    }

    fn parse_err(source: &str) -> Error {
        parse(source).expect_err("expected a parse error")
    }

    #[test]
    fn parses_scalar_add_constant() {
        let parsed = parse_ok("in float a; out float b; void main(){ b = a + 1.0; }");
        assert_eq!(parsed.streams.len(), 2);
        assert_eq!(parsed.program.functions.len(), 1);
        assert_eq!(parsed.program.functions[0].body.len(), 1);
    }

    #[test]
    fn rejects_global_after_function() {
        let err = parse_err("void main(){} in float a;");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn rejects_mismatched_vector_assignment() {
        let err = parse_err("in vec2 a; out vec3 b; void main(){ b = a; }");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn rejects_member_access_on_scalar() {
        let err = parse_err("in float a; out float b; void main(){ b = a.x; }");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn rejects_invalid_member_name() {
        let err = parse_err("in vec3 a; out float b; void main(){ b = a.yz; }");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn accepts_valid_member_prefix() {
        parse_ok("in vec3 a; out vec2 b; void main(){ b = a.xy; }");
    }

    #[test]
    fn rejects_member_lane_past_component_count() {
        let err = parse_err("in vec2 a; out float b; void main(){ b = a.z; }");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn rejects_nested_ternary() {
        let err = parse_err("in float a; in float b; out float c; void main(){ c = a < b ? (a < b ? a : b) : b; }");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn accepts_ternary_select() {
        parse_ok("in float a; in float b; out float c; void main(){ c = a < b ? a : b; }");
    }

    #[test]
    fn rejects_non_void_function() {
        let err = parse_err("float main(){ }");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn accepts_accumulate_output() {
        let parsed = parse_ok("in vec4 x; in vec4 y; out accumulate vec4 v; void main(){ v = x + y; }");
        let (var, _) = parsed.env.lookup(parsed.streams[2].symbol).unwrap();
        assert!(var.accumulate);
    }

    #[test]
    fn rejects_accumulate_on_input() {
        let err = parse_err("in accumulate float a; void main(){}");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn rejects_vector_times_vector() {
        let err = parse_err("in vec2 a; in vec2 b; out vec2 c; void main(){ c = a * b; }");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn rejects_scalar_divided_by_vector() {
        let err = parse_err("in float a; in vec2 b; out vec2 c; void main(){ c = a / b; }");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn parses_const_vector_and_dot_product() {
        let parsed = parse_ok("in vec3 u; in vec3 v; out float d; void main(){ d = dot(u,v); }");
        assert_eq!(parsed.program.functions[0].body.len(), 1);
    }

    #[test]
    fn rejects_assignment_to_uniform() {
        let err = parse_err("uniform float r; void main(){ r = 1.0; }");
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn rejects_assignment_to_undeclared_name() {
        let err = parse_err("out float b; void main(){ b = a; }");
        assert!(matches!(err, Error::ParseError { .. }));
    }
}
