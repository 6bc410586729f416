//! Crate root: wires together the compilation pipeline.
//!
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` owns all syntactic knowledge and builds the node tree.
//! - `ast` defines the nodes and checks tree shape as nodes are built.
//! - `value` describes where an emitted expression's result lives.
//! - `codegen` walks the tree, folds constants and appends instructions.
//! - `error` centralises the error type shared by the other modules.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod parser;
pub mod tokenizer;
pub mod value;

use tracing::debug;

pub use codegen::{AsmBuffer, CodeStore};
pub use error::{CompileError, CompileResult};
pub use value::ValueInfo;

/// Compile a source string into Intel-syntax x86-64 assembly.
///
/// On error nothing is returned; code emitted before the failure is dropped.
pub fn compile(source: &str) -> CompileResult<String> {
  let tokens = tokenizer::tokenize(source)?;
  debug!(tokens = tokens.len(), "tokenized");
  let program = parser::parse(tokens, source)?;
  let mut buffer = AsmBuffer::new();
  codegen::generate(&program, &mut buffer)?;
  Ok(buffer.render())
}
