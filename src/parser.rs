//! Recursive-descent parser producing a `Program` of validated nodes.
//!
//! Grammar accepted today:
//!
//! ```text
//! program  = "int" "main" "(" ")" "{" stmt* "}" EOF
//! stmt     = "return" add ";"
//! add      = mul ("+" mul)*
//! mul      = primary ("*" primary)*
//! primary  = num | "(" add ")"
//! ```
//!
//! Nodes are built through their validating constructors, so a rule that
//! wires the wrong child into a node fails here rather than in codegen.

use crate::ast::{
  BinaryOperation, MAX_EXPRESSION_DEPTH, MainFunction, Node, NumberLiteral, Program, Return,
};
use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{Token, TokenKind, describe_token};

/// Deepest parenthesis nesting accepted; the parser recurses once per level.
pub const MAX_NESTING_DEPTH: usize = MAX_EXPRESSION_DEPTH;

/// Parse a whole translation unit from the token stream.
pub fn parse(tokens: Vec<Token>, source: &str) -> CompileResult<Program> {
  let mut stream = TokenStream::new(tokens, source);

  if stream.is_eof() {
    return Err(CompileError::at(source, 0, "program is empty"));
  }

  let main = parse_main(&mut stream)?;

  if let Some(token) = stream.peek()
    && token.kind != TokenKind::Eof
  {
    let got = describe_token(Some(token));
    return Err(CompileError::at(
      source,
      token.loc,
      format!("unexpected token \"{got}\""),
    ));
  }

  Program::new(vec![main])
}

fn parse_main(stream: &mut TokenStream) -> CompileResult<Node> {
  stream.skip(TokenKind::Int, "int")?;
  stream.skip_ident("main")?;
  stream.skip(TokenKind::LParen, "(")?;
  stream.skip(TokenKind::RParen, ")")?;
  stream.skip(TokenKind::LBrace, "{")?;

  let mut statements = Vec::new();
  while !stream.equal(TokenKind::RBrace) {
    statements.push(parse_stmt(stream)?);
  }

  MainFunction::new(statements)
}

fn parse_stmt(stream: &mut TokenStream) -> CompileResult<Node> {
  // `return` is the only statement form so far.
  stream.skip(TokenKind::Return, "return")?;
  let value = parse_add(stream)?;
  stream.skip(TokenKind::Semicolon, ";")?;
  Return::new(value)
}

fn parse_add(stream: &mut TokenStream) -> CompileResult<Node> {
  let mut node = parse_mul(stream)?;

  while let Some(op) = stream.take(TokenKind::Plus) {
    let rhs = parse_mul(stream)?;
    node = stream.binary(node, op, rhs)?;
  }

  Ok(node)
}

fn parse_mul(stream: &mut TokenStream) -> CompileResult<Node> {
  let mut node = parse_primary(stream)?;

  while let Some(op) = stream.take(TokenKind::Star) {
    let rhs = parse_primary(stream)?;
    node = stream.binary(node, op, rhs)?;
  }

  Ok(node)
}

fn parse_primary(stream: &mut TokenStream) -> CompileResult<Node> {
  if let Some(open) = stream.take(TokenKind::LParen) {
    if stream.depth == MAX_NESTING_DEPTH {
      return Err(CompileError::at(
        stream.source,
        open.loc,
        format!("expression nested deeper than {MAX_NESTING_DEPTH} levels"),
      ));
    }
    stream.depth += 1;
    let node = parse_add(stream)?;
    stream.depth -= 1;
    stream.skip(TokenKind::RParen, ")")?;
    return Ok(node);
  }

  let number = stream.get_number()?;
  NumberLiteral::new(number)
}

/// Lightweight cursor over the token vector.
struct TokenStream<'a> {
  tokens: Vec<Token>,
  source: &'a str,
  pos: usize,
  depth: usize,
}

impl<'a> TokenStream<'a> {
  fn new(tokens: Vec<Token>, source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
      depth: 0,
    }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  /// Consume the current token if it has the given kind.
  fn equal(&mut self, kind: TokenKind) -> bool {
    self.take(kind).is_some()
  }

  /// Consume and return the current token if it has the given kind.
  fn take(&mut self, kind: TokenKind) -> Option<Token> {
    if let Some(token) = self.peek()
      && token.kind == kind
    {
      let token = token.clone();
      self.pos += 1;
      return Some(token);
    }
    None
  }

  fn skip(&mut self, kind: TokenKind, text: &str) -> CompileResult<()> {
    if self.equal(kind) {
      Ok(())
    } else {
      Err(self.error_here(format!("expected \"{text}\", but got \"{}\"", self.got())))
    }
  }

  fn skip_ident(&mut self, name: &str) -> CompileResult<()> {
    if let Some(token) = self.peek()
      && token.kind == TokenKind::Ident
      && token.content == name
    {
      self.pos += 1;
      return Ok(());
    }
    Err(self.error_here(format!("expected \"{name}\", but got \"{}\"", self.got())))
  }

  fn get_number(&mut self) -> CompileResult<Token> {
    if let Some(token) = self.take(TokenKind::Num) {
      return Ok(token);
    }
    Err(self.error_here(format!("expected a number, but got \"{}\"", self.got())))
  }

  /// Build a binary node, pointing at the operator if the tree gets too tall.
  fn binary(&self, lhs: Node, op: Token, rhs: Node) -> CompileResult<Node> {
    let loc = op.loc;
    BinaryOperation::new(lhs, op, rhs).map_err(|err| {
      if matches!(err, CompileError::ExpressionTooDeep { .. }) {
        CompileError::at(self.source, loc, err.to_string())
      } else {
        err
      }
    })
  }

  fn got(&self) -> String {
    describe_token(self.peek())
  }

  fn error_here(&self, message: String) -> CompileError {
    let loc = self.peek().map_or(self.source.len(), |token| token.loc);
    CompileError::at(self.source, loc, message)
  }

  fn is_eof(&self) -> bool {
    matches!(self.peek().map(|token| token.kind), Some(TokenKind::Eof))
  }
}
