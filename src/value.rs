//! Where an expression's result lives once its code has been emitted.

use std::fmt;

use snafu::ResultExt;

use crate::error::{CompileResult, InvalidLiteralSnafu};

/// Storage of an emitted expression's value.
///
/// Only compile-time constants exist today. Consumers match on this enum
/// exhaustively, so a new storage kind (a register, a stack slot) makes every
/// site that has to learn about it stop compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueInfo {
  /// Known at compile time; the payload is its decimal text.
  Literal(String),
}

impl ValueInfo {
  pub fn literal(text: impl Into<String>) -> Self {
    Self::Literal(text.into())
  }
}

impl fmt::Display for ValueInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValueInfo::Literal(text) => write!(f, "{text}"),
    }
  }
}

/// Parse a literal payload as a 64-bit signed integer.
pub fn parse_literal(text: &str) -> CompileResult<i64> {
  text.parse::<i64>().context(InvalidLiteralSnafu { text })
}
