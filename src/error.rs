//! Shared error utilities used across the compilation pipeline.
//!
//! Front-end diagnostics point at the offending byte with a caret, the way
//! chibicc does. Back-end errors carry no location: a malformed tree is a bug
//! in whoever built it, and an unsupported construct is a feature fence.

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("{expr_line}\n{marker} {message}"))]
  WithLocation {
    expr_line: String,
    marker: String,
    message: String,
  },

  /// A node was handed a child or token that does not fit its grammar slot.
  #[snafu(display("malformed tree: expected {expected}, got {got}"))]
  MalformedTree { expected: String, got: String },

  #[snafu(display("not yet supported: {feature}"))]
  NotYetSupported { feature: String },

  #[snafu(display("expression nested deeper than {limit} levels"))]
  ExpressionTooDeep { limit: usize },

  #[snafu(display("integer overflow while folding {lhs} {op} {rhs}"))]
  IntegerOverflow {
    op: &'static str,
    lhs: i64,
    rhs: i64,
  },

  #[snafu(display("invalid integer literal \"{text}\""))]
  InvalidLiteral {
    text: String,
    source: std::num::ParseIntError,
  },
}

impl CompileError {
  /// Construct an error anchored at a specific byte offset in the source.
  pub fn at(expr: &str, loc: usize, message: impl Into<String>) -> Self {
    let expr_line = format!("'{expr}'");
    let safe_loc = loc.min(expr.len());
    let char_offset = expr[..safe_loc].chars().count() + 1; // account for opening quote
    let marker = format!("{}^", " ".repeat(char_offset));
    WithLocationSnafu {
      expr_line,
      marker,
      message,
    }
    .build()
  }

  pub fn malformed(expected: impl ToString, got: impl ToString) -> Self {
    MalformedTreeSnafu {
      expected: expected.to_string(),
      got: got.to_string(),
    }
    .build()
  }

  pub fn unsupported(feature: impl Into<String>) -> Self {
    NotYetSupportedSnafu { feature }.build()
  }

  pub fn is_malformed_tree(&self) -> bool {
    matches!(self, Self::MalformedTree { .. })
  }

  pub fn is_not_yet_supported(&self) -> bool {
    matches!(self, Self::NotYetSupported { .. })
  }
}
