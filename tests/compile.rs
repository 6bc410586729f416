use foldcc::ast::{BinaryOperation, MainFunction, Node, NumberLiteral, Program, Return};
use foldcc::codegen::{AsmLine, generate};
use foldcc::tokenizer::Token;
use foldcc::{AsmBuffer, CodeStore, CompileError, ValueInfo, compile};
use insta::assert_snapshot;

fn returned_value(source: &str) -> String {
  let asm = compile(source).unwrap();
  let line = asm
    .lines()
    .find(|line| line.trim_start().starts_with("mov rax, "))
    .unwrap();
  line.trim_start()["mov rax, ".len()..].to_string()
}

#[test]
fn folds_sum() {
  assert_eq!(returned_value("int main() { return 2 + 3; }"), "5");
}

#[test]
fn folds_product_then_sum() {
  assert_eq!(returned_value("int main() { return 2 * 3 + 4; }"), "10");
}

#[test]
fn folds_parenthesised_product() {
  assert_eq!(
    returned_value("int main() { return (2 + 3) * (4 + 5); }"),
    "45"
  );
}

#[test]
fn emits_full_listing() {
  let asm = compile("int main() { return 2 + 3; }").unwrap();
  assert_snapshot!(asm, @r"
  .intel_syntax noprefix
  .global main
  main:
      push rbp
      mov rbp, rsp
      mov rax, 5
      pop rbp
      ret
      mov rax, 0
      pop rbp
      ret
  ");
}

#[test]
fn empty_main_returns_zero() {
  let asm = compile("int main() {}").unwrap();
  assert!(asm.ends_with("    mov rax, 0\n    pop rbp\n    ret\n"));
}

#[test]
fn overflow_fails_compilation() {
  let err = compile("int main() { return 9223372036854775807 + 1; }").unwrap_err();
  assert!(matches!(err, CompileError::IntegerOverflow { .. }));
  assert_eq!(
    err.to_string(),
    "integer overflow while folding 9223372036854775807 + 1"
  );
}

#[test]
fn oversized_literal_fails_compilation() {
  let err = compile("int main() { return 99999999999999999999; }");
  assert!(matches!(err, Err(CompileError::InvalidLiteral { .. })));
}

#[test]
fn syntax_error_points_at_token() {
  let err = compile("int main() { return 1 + ; }").unwrap_err();
  assert_eq!(
    err.to_string(),
    "'int main() { return 1 + ; }'\n                         ^ expected a number, but got \";\""
  );
}

/// Keeps only the order in which expression values came back.
#[derive(Default)]
struct ValueOrder {
  values: Vec<String>,
  commands: usize,
}

impl CodeStore for ValueOrder {
  fn add_label(&mut self, _name: &str) {}

  fn add_command(&mut self, _parts: &[&str]) {
    self.commands += 1;
  }

  fn record_value(&mut self, value: &ValueInfo) {
    self.values.push(value.to_string());
  }
}

fn num(text: &str) -> Node {
  NumberLiteral::new(Token::number(text)).unwrap()
}

#[test]
fn hand_built_tree_evaluates_left_to_right() {
  let expr = BinaryOperation::new(
    BinaryOperation::new(num("2"), Token::plus(), num("3")).unwrap(),
    Token::star(),
    BinaryOperation::new(num("4"), Token::plus(), num("5")).unwrap(),
  )
  .unwrap();
  let program = Program::new(vec![
    MainFunction::new(vec![Return::new(expr).unwrap()]).unwrap(),
  ])
  .unwrap();

  let mut store = ValueOrder::default();
  generate(&program, &mut store).unwrap();
  assert_eq!(store.values, vec!["2", "3", "5", "4", "5", "9", "45"]);
  // prologue (2) + return (3) + fallback (3)
  assert_eq!(store.commands, 8);
}

#[test]
fn buffer_keeps_emission_order() {
  let program = Program::new(vec![
    MainFunction::new(vec![Return::new(num("7")).unwrap()]).unwrap(),
  ])
  .unwrap();
  let mut buffer = AsmBuffer::new();
  generate(&program, &mut buffer).unwrap();

  let command = |parts: &[&str]| AsmLine::Command(parts.iter().map(|p| p.to_string()).collect());
  assert_eq!(buffer.lines()[0], AsmLine::Label("main".to_string()));
  assert_eq!(buffer.lines()[3], command(&["mov", "rax", "7"]));
  assert_eq!(buffer.lines().last(), Some(&command(&["ret"])));
}

#[test]
fn long_operator_chain_is_rejected_with_location() {
  let terms = vec!["1"; 20_000].join(" + ");
  let err = compile(&format!("int main() {{ return {terms}; }}")).unwrap_err();
  assert!(matches!(err, CompileError::WithLocation { .. }));
  assert!(
    err
      .to_string()
      .ends_with("^ expression nested deeper than 256 levels")
  );
}

#[test]
fn chain_at_depth_limit_compiles() {
  let terms = vec!["1"; 257].join(" + ");
  assert_eq!(
    returned_value(&format!("int main() {{ return {terms}; }}")),
    "257"
  );
}
