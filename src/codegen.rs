//! Code generation: walk the syntax tree and append x86-64 instructions
//! (Intel syntax) to a `CodeStore`.
//!
//! The walk is post-order. Expression nodes hand back a `ValueInfo`
//! describing where their result lives; statements and functions only append
//! instructions. Expressions built purely from literals are folded here and
//! emit nothing at all.

use snafu::OptionExt;
use tracing::{debug, trace};

use crate::ast::{BinaryOperation, MainFunction, Node, NumberLiteral, Program, Return, Symbol};
use crate::error::{CompileError, CompileResult, IntegerOverflowSnafu};
use crate::tokenizer::TokenKind;
use crate::value::{ValueInfo, parse_literal};

const RETURN_REG: &str = "rax";
const FRAME_REG: &str = "rbp";
const STACK_REG: &str = "rsp";

/// Append-only sink for emitted code.
pub trait CodeStore {
  /// Mark a jump or entry target at the current position.
  fn add_label(&mut self, name: &str);

  /// Append one instruction: the mnemonic followed by its operands.
  fn add_command(&mut self, parts: &[&str]);

  /// Called each time an expression has produced its value.
  fn record_value(&mut self, _value: &ValueInfo) {}
}

/// One entry of an `AsmBuffer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
  Label(String),
  Command(Vec<String>),
}

/// In-memory `CodeStore` that renders to an assembler source file.
#[derive(Debug, Default)]
pub struct AsmBuffer {
  lines: Vec<AsmLine>,
}

impl AsmBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn lines(&self) -> &[AsmLine] {
    &self.lines
  }

  /// Render the buffer as GNU as input. Every label is exported, since the
  /// only labels emitted today are function entry points.
  pub fn render(&self) -> String {
    let mut asm = String::new();
    asm.push_str(".intel_syntax noprefix\n");
    for line in &self.lines {
      if let AsmLine::Label(name) = line {
        asm.push_str(&format!(".global {name}\n"));
      }
    }

    for line in &self.lines {
      match line {
        AsmLine::Label(name) => asm.push_str(&format!("{name}:\n")),
        AsmLine::Command(parts) => {
          let Some((mnemonic, operands)) = parts.split_first() else {
            continue;
          };
          asm.push_str("    ");
          asm.push_str(mnemonic);
          if !operands.is_empty() {
            asm.push(' ');
            asm.push_str(&operands.join(", "));
          }
          asm.push('\n');
        }
      }
    }
    asm
  }
}

impl CodeStore for AsmBuffer {
  fn add_label(&mut self, name: &str) {
    trace!(name, "label");
    self.lines.push(AsmLine::Label(name.to_string()));
  }

  fn add_command(&mut self, parts: &[&str]) {
    debug_assert!(!parts.is_empty(), "command without a mnemonic");
    trace!(command = ?parts, "command");
    self
      .lines
      .push(AsmLine::Command(parts.iter().map(|part| part.to_string()).collect()));
  }
}

/// Emit every function of the program, in order.
pub fn generate(program: &Program, store: &mut dyn CodeStore) -> CompileResult<()> {
  for function in program.functions() {
    function.emit_function(store)?;
  }
  Ok(())
}

impl Node {
  /// Emit a node in `main_function` position.
  pub fn emit_function(&self, store: &mut dyn CodeStore) -> CompileResult<()> {
    match self {
      Node::MainFunction(function) => function.make_code(store),
      other => Err(CompileError::malformed(
        format!("symbol {}", Symbol::MainFunction),
        format!("symbol {}", other.symbol()),
      )),
    }
  }

  /// Emit a node in `statement` position.
  pub fn emit_statement(&self, store: &mut dyn CodeStore) -> CompileResult<()> {
    match self {
      Node::Return(ret) => ret.make_code(store),
      other => Err(CompileError::malformed(
        format!("symbol {}", Symbol::Statement),
        format!("symbol {}", other.symbol()),
      )),
    }
  }

  /// Emit a node in `expression` position and describe its result.
  pub fn emit_value(&self, store: &mut dyn CodeStore) -> CompileResult<ValueInfo> {
    let value = match self {
      Node::Number(number) => number.make_code(store),
      Node::Binary(binary) => binary.make_code(store)?,
      other => {
        return Err(CompileError::malformed(
          format!("symbol {}", Symbol::Expression),
          format!("symbol {}", other.symbol()),
        ));
      }
    };
    store.record_value(&value);
    Ok(value)
  }
}

impl MainFunction {
  pub fn make_code(&self, store: &mut dyn CodeStore) -> CompileResult<()> {
    debug!(statements = self.statements().len(), "emitting main");
    store.add_label("main");
    store.add_command(&["push", FRAME_REG]);
    store.add_command(&["mov", FRAME_REG, STACK_REG]);

    for statement in self.statements() {
      statement.emit_statement(store)?;
    }

    // Falling off the end of main returns 0.
    store.add_command(&["mov", RETURN_REG, "0"]);
    store.add_command(&["pop", FRAME_REG]);
    store.add_command(&["ret"]);
    Ok(())
  }
}

impl Return {
  pub fn make_code(&self, store: &mut dyn CodeStore) -> CompileResult<()> {
    let value = self.value().emit_value(store)?;
    let literal = parse_literal(literal_operand(&value)?)?.to_string();
    store.add_command(&["mov", RETURN_REG, &literal]);
    store.add_command(&["pop", FRAME_REG]);
    store.add_command(&["ret"]);
    Ok(())
  }
}

impl NumberLiteral {
  pub fn make_code(&self, _store: &mut dyn CodeStore) -> ValueInfo {
    ValueInfo::literal(self.token().content.as_str())
  }
}

impl BinaryOperation {
  pub fn make_code(&self, store: &mut dyn CodeStore) -> CompileResult<ValueInfo> {
    // Left operand first, so side effects keep source order once they exist.
    let lhs = self.lhs().emit_value(store)?;
    let rhs = self.rhs().emit_value(store)?;

    match self.op().kind {
      TokenKind::Plus => fold(&lhs, &rhs, "+", i64::checked_add),
      TokenKind::Star => fold(&lhs, &rhs, "*", i64::checked_mul),
      _ => Err(CompileError::unsupported(format!(
        "binary operator \"{}\"",
        self.op().content
      ))),
    }
  }
}

/// Text of a value that has to be a compile-time constant.
fn literal_operand(value: &ValueInfo) -> CompileResult<&str> {
  match value {
    ValueInfo::Literal(text) => Ok(text.as_str()),
  }
}

fn fold(
  lhs: &ValueInfo,
  rhs: &ValueInfo,
  op: &'static str,
  apply: fn(i64, i64) -> Option<i64>,
) -> CompileResult<ValueInfo> {
  match (lhs, rhs) {
    (ValueInfo::Literal(lhs), ValueInfo::Literal(rhs)) => {
      let lhs = parse_literal(lhs)?;
      let rhs = parse_literal(rhs)?;
      let folded = apply(lhs, rhs).context(IntegerOverflowSnafu { op, lhs, rhs })?;
      debug!(lhs, op, rhs, folded, "folded constant");
      Ok(ValueInfo::literal(folded.to_string()))
    }
  }
}
