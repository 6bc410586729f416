//! Syntax tree nodes, one variant per grammar rule.
//!
//! Every node knows the grammar symbol it produces. Constructors check the
//! symbol of each child they adopt (and the kind of each token they keep), so
//! a parser bug surfaces as a `MalformedTree` error right where the bad node
//! is built instead of as wrong assembly later on. The check is local: a
//! child is trusted to have validated its own children when it was built.
//!
//! Expression nodes also track their height, and no expression may grow
//! taller than `MAX_EXPRESSION_DEPTH`. Emission, comparison and drop all
//! recurse once per level, so the limit keeps them off the end of the stack.

use std::fmt;

use snafu::ensure;

use crate::error::{CompileError, CompileResult, ExpressionTooDeepSnafu};
use crate::tokenizer::{Token, TokenKind};

/// Most operator levels an expression tree may have.
pub const MAX_EXPRESSION_DEPTH: usize = 256;

/// Grammar nonterminal a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
  MainFunction,
  Statement,
  Expression,
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Symbol::MainFunction => "main_function",
      Symbol::Statement => "statement",
      Symbol::Expression => "expression",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  MainFunction(MainFunction),
  Return(Return),
  Number(NumberLiteral),
  Binary(BinaryOperation),
}

impl Node {
  pub fn symbol(&self) -> Symbol {
    match self {
      Node::MainFunction(_) => Symbol::MainFunction,
      Node::Return(_) => Symbol::Statement,
      Node::Number(_) | Node::Binary(_) => Symbol::Expression,
    }
  }

  /// Number of operator levels below and including this node. Literals are 0.
  pub fn depth(&self) -> usize {
    match self {
      Node::MainFunction(function) => function
        .statements
        .iter()
        .map(Node::depth)
        .max()
        .unwrap_or(0),
      Node::Return(ret) => ret.value.depth(),
      Node::Number(_) => 0,
      Node::Binary(binary) => binary.depth,
    }
  }
}

fn expect_symbol(node: &Node, symbol: Symbol) -> CompileResult<()> {
  if node.symbol() != symbol {
    return Err(CompileError::malformed(
      format!("symbol {symbol}"),
      format!("symbol {}", node.symbol()),
    ));
  }
  Ok(())
}

fn expect_kind(token: &Token, kind: TokenKind) -> CompileResult<()> {
  if token.kind != kind {
    return Err(CompileError::malformed(
      format!("token kind {kind}"),
      format!("token kind {}", token.kind),
    ));
  }
  Ok(())
}

/// `int main() { ... }`: the body of the program's only function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainFunction {
  statements: Vec<Node>,
}

impl MainFunction {
  pub fn new(statements: Vec<Node>) -> CompileResult<Node> {
    for statement in &statements {
      expect_symbol(statement, Symbol::Statement)?;
    }
    Ok(Node::MainFunction(Self { statements }))
  }

  pub fn statements(&self) -> &[Node] {
    &self.statements
  }
}

/// `return <expression>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Return {
  value: Box<Node>,
}

impl Return {
  pub fn new(value: Node) -> CompileResult<Node> {
    expect_symbol(&value, Symbol::Expression)?;
    Ok(Node::Return(Self {
      value: Box::new(value),
    }))
  }

  pub fn value(&self) -> &Node {
    &self.value
  }
}

/// A decimal integer literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLiteral {
  number: Token,
}

impl NumberLiteral {
  pub fn new(number: Token) -> CompileResult<Node> {
    expect_kind(&number, TokenKind::Num)?;
    Ok(Node::Number(Self { number }))
  }

  pub fn token(&self) -> &Token {
    &self.number
  }
}

/// `<lhs> <op> <rhs>`.
///
/// The operator token is stored as given; which operators can actually be
/// lowered is decided at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOperation {
  lhs: Box<Node>,
  op: Token,
  rhs: Box<Node>,
  depth: usize,
}

impl BinaryOperation {
  pub fn new(lhs: Node, op: Token, rhs: Node) -> CompileResult<Node> {
    expect_symbol(&lhs, Symbol::Expression)?;
    expect_symbol(&rhs, Symbol::Expression)?;
    let depth = lhs.depth().max(rhs.depth()) + 1;
    ensure!(
      depth <= MAX_EXPRESSION_DEPTH,
      ExpressionTooDeepSnafu {
        limit: MAX_EXPRESSION_DEPTH
      }
    );
    Ok(Node::Binary(Self {
      lhs: Box::new(lhs),
      op,
      rhs: Box::new(rhs),
      depth,
    }))
  }

  pub fn lhs(&self) -> &Node {
    &self.lhs
  }

  pub fn op(&self) -> &Token {
    &self.op
  }

  pub fn rhs(&self) -> &Node {
    &self.rhs
  }
}

/// A translation unit: the function definitions in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
  functions: Vec<Node>,
}

impl Program {
  pub fn new(functions: Vec<Node>) -> CompileResult<Self> {
    for function in &functions {
      expect_symbol(function, Symbol::MainFunction)?;
    }
    Ok(Self { functions })
  }

  pub fn functions(&self) -> &[Node] {
    &self.functions
  }
}
