//! A small GLSL-like shader language compiled to a compact register-based
//! bytecode and executed over batched columnar float arrays — per-element
//! vector arithmetic expressed once and applied to many elements with low
//! per-element overhead.
//!
//! [`compile`] is the front door: source text in, a read-only [`Bytecode`]
//! artifact out. From there, [`vm::ExecutionContext`] binds caller-owned
//! memory to the artifact's streams/uniforms/samplers and runs a named
//! method over a batch of elements.

/// Tokenizer
mod lexer;
/// Identifier interning
mod symtab;
/// Nested lexical scopes
mod env;
/// Typed expression/statement tree
pub mod ast;
/// The crate's single error type
pub mod error;
/// Opcode encoding
pub mod opcode;
/// The 32-bit instruction word
pub mod instruction;
/// Recursive-descent parser and type checker
mod parser;
/// AST-to-bytecode lowering
mod codegen;
/// The compiled artifact
pub mod bytecode;
/// The external sampler callback interface
pub mod sampler;
/// The batched bytecode virtual machine
pub mod vm;

pub use self::bytecode::Bytecode;
pub use self::error::Error;

/// Compiles `source` into a read-only [`Bytecode`] artifact.
///
/// Parses and type-checks the source (`ast`/`parser`), lowers it into
/// register-based instructions (`codegen`), and assembles the result into
/// the artifact's name→slot tables. Only the first error encountered is
/// reported; the generator never returns a partial artifact.
pub fn compile(source: &str) -> Result<Bytecode, Error> {
    let parsed = parser::parse(source)?;
    let generated = codegen::generate(&parsed)?;
    Ok(Bytecode::from_compiled(parsed, generated))
}
