//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer knows nothing about grammar beyond telling keywords apart
//! from identifiers. Every token keeps the exact source text it came from so
//! later stages can carry literals around without re-reading the input.

use std::fmt;

use crate::error::{CompileError, CompileResult};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Num,
  Ident,
  Int,
  Return,
  Plus,
  Star,
  LParen,
  RParen,
  LBrace,
  RBrace,
  Semicolon,
  Eof,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TokenKind::Num => "number",
      TokenKind::Ident => "identifier",
      TokenKind::Int => "int",
      TokenKind::Return => "return",
      TokenKind::Plus => "plus",
      TokenKind::Star => "star",
      TokenKind::LParen => "open paren",
      TokenKind::RParen => "close paren",
      TokenKind::LBrace => "open brace",
      TokenKind::RBrace => "close brace",
      TokenKind::Semicolon => "semicolon",
      TokenKind::Eof => "EOF",
    };
    f.write_str(name)
  }
}

/// A classified slice of source text.
///
/// Two tokens are equal when their kind and content match; where they were
/// found in the source does not take part in the comparison.
#[derive(Debug, Clone)]
pub struct Token {
  pub kind: TokenKind,
  pub content: String,
  pub loc: usize,
}

impl Token {
  pub fn new(kind: TokenKind, content: impl Into<String>, loc: usize) -> Self {
    Self {
      kind,
      content: content.into(),
      loc,
    }
  }

  /// Build a token with no source position, handy for trees assembled by hand.
  pub fn synthetic(kind: TokenKind, content: impl Into<String>) -> Self {
    Self::new(kind, content, 0)
  }

  pub fn number(text: impl Into<String>) -> Self {
    Self::synthetic(TokenKind::Num, text)
  }

  pub fn plus() -> Self {
    Self::synthetic(TokenKind::Plus, "+")
  }

  pub fn star() -> Self {
    Self::synthetic(TokenKind::Star, "*")
  }
}

impl PartialEq for Token {
  fn eq(&self, other: &Self) -> bool {
    self.kind == other.kind && self.content == other.content
  }
}

impl Eq for Token {}

fn keyword_or_ident(word: &str) -> TokenKind {
  match word {
    "int" => TokenKind::Int,
    "return" => TokenKind::Return,
    _ => TokenKind::Ident,
  }
}

fn punctuator(c: u8) -> Option<TokenKind> {
  let kind = match c {
    b'+' => TokenKind::Plus,
    b'*' => TokenKind::Star,
    b'(' => TokenKind::LParen,
    b')' => TokenKind::RParen,
    b'{' => TokenKind::LBrace,
    b'}' => TokenKind::RBrace,
    b';' => TokenKind::Semicolon,
    _ => return None,
  };
  Some(kind)
}

/// Lex the input into a flat vector of tokens terminated by an `Eof` marker.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    if c.is_ascii_whitespace() {
      i += 1;
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      if i < bytes.len() && (bytes[i].is_ascii_alphabetic() || bytes[i] == b'_') {
        return Err(CompileError::at(input, i, "invalid suffix on number"));
      }
      tokens.push(Token::new(TokenKind::Num, &input[start..i], start));
      continue;
    }

    if c.is_ascii_alphabetic() || c == b'_' {
      let start = i;
      while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
      }
      let word = &input[start..i];
      tokens.push(Token::new(keyword_or_ident(word), word, start));
      continue;
    }

    if let Some(kind) = punctuator(c) {
      tokens.push(Token::new(kind, &input[i..i + 1], i));
      i += 1;
      continue;
    }

    let invalid_char = input[i..].chars().next().unwrap_or('\0');
    return Err(CompileError::at(
      input,
      i,
      format!("invalid token: '{invalid_char}'"),
    ));
  }

  tokens.push(Token::new(TokenKind::Eof, "", input.len()));
  Ok(tokens)
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: Option<&Token>) -> String {
  match token {
    Some(t) => match t.kind {
      TokenKind::Eof => "EOF".to_string(),
      _ => t.content.clone(),
    },
    None => "EOF".to_string(),
  }
}
