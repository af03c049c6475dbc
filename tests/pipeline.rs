use pretty_assertions::assert_eq;

use classc::display::print_ast;
use classc::feedback::{Report, Stage};
use classc::frontend::ast::{BodyItem, Program, Stmt, Type};
use classc::frontend::run;
use classc::frontend::token::TokenKind;

const SHAPE: &str = "\
# a class with every kind of member
class Shape {
  public attribute width: float;
  private attribute corners: integer{4}{};
  function area: (scale: float) -> float;
  constructor: (w: float);
}
";

const AREA: &str = "\
function Shape::area(scale: float) -> float [
  localVar total: float;
  localVar i: integer;
  total = 0.0;
  i = 0;
  while (i < 4) {
    total = total + scale * 2.5;
    i = i + 1;
  };
  if (total >= 10.0) then write(total); else write(0.0); ;
  return(total);
]
";

#[test]
fn class_and_member_names_are_unresolved_references() {
    let analysis = run(SHAPE);
    assert!(analysis.program.is_some());

    let diagnostics = analysis.diagnostics();
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Attribute 'width' is not declared in the enclosing scope",
            "Attribute 'corners' is not declared in the enclosing scope",
            "Function 'area' is not declared in the enclosing scope",
            "Class 'Shape' used before declaration",
        ]
    );
    assert!(diagnostics.iter().all(|d| d.stage == Stage::Semantic));
    assert_eq!(diagnostics[0].line, Some(3));
    assert_eq!(diagnostics[3].line, Some(2));

    let Some(Program::Class(class)) = &analysis.program else {
        panic!("expected a class");
    };
    let names: Vec<_> = class.declared_names.get().unwrap().iter().cloned().collect();
    assert_eq!(names, vec!["area", "corners", "width"]);
}

#[test]
fn oversized_literal_is_only_a_lexical_error() {
    let analysis = run("function f() -> void [ write(-9223372036854775808); write(99999999999999999999); ]");
    assert!(analysis.program.is_some());

    let diagnostics = analysis.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].stage, Stage::Lexical);
    assert_eq!(diagnostics[0].position, Some(58));
}

#[test]
fn duplicate_parameter_is_reported() {
    let analysis = run("function f(a: integer, a: float) -> void [ ]");
    let diagnostics = analysis.diagnostics();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "Variable 'a' already declared in the current scope"
    );
}

#[test]
fn function_definition_checks_clean() {
    let analysis = run(AREA);
    assert!(analysis.is_ok(), "{:?}", analysis.errors);

    let Some(Program::Function(func)) = &analysis.program else {
        panic!("expected a function");
    };
    assert_eq!(func.head.qualified_name(), "Shape::area");
    assert_eq!(func.resolved.get(), Some(&Type::Float));
    assert_eq!(func.body.len(), 7);

    match &func.body[4] {
        BodyItem::Stmt(Stmt::While { cond, body, .. }) => {
            assert_eq!(cond.resolved(), Some(&Type::Integer));
            assert_eq!(body.len(), 2);
        }
        other => panic!("expected while loop, got {:?}", other),
    }
}

#[test]
fn ast_listing() {
    let analysis = run("function main() -> void [ localVar x: integer; write(-x * 2); ]");
    let program = analysis.program.expect("program parses");

    let expected = "\
FuncDef : void
  FuncHead main -> void
  LocalVarDecl x: integer : integer
  Write
    BinaryOp * : integer
      UnaryOp - : integer
        Variable x : integer
      Literal 2 : integer
";
    assert_eq!(print_ast(&program), expected);
}

#[test]
fn duplicate_local_is_the_only_error() {
    let analysis = run(
        "function f() -> void [\n  localVar x: integer;\n  x := 1;\n  localVar x: integer;\n]",
    );
    let diagnostics = analysis.diagnostics();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].stage, Stage::Semantic);
    assert_eq!(diagnostics[0].line, Some(4));
    assert_eq!(
        diagnostics[0].message,
        "Variable 'x' already declared in the current scope"
    );
}

#[test]
fn missing_else_reports_syntax_error() {
    let analysis = run("function f() -> void [\n  if (a < b) then { write(a); };\n]");
    assert!(analysis.program.is_none());

    let diagnostics = analysis.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].stage, Stage::Syntactic);
    assert_eq!(diagnostics[0].line, Some(2));
    assert_eq!(
        diagnostics[0].message,
        "Syntax error at ;, line 2, position 54: expected 'else'"
    );
}

#[test]
fn truncated_input_reports_eof() {
    let analysis = run("class A { attribute x: integer;");
    let diagnostics = analysis.diagnostics();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Syntax error at EOF: expected '}'");
    assert_eq!(diagnostics[0].position, None);
}

#[test]
fn illegal_characters_are_skipped() {
    let analysis = run("class A { attribute x: integer; ~ }");
    assert!(analysis.program.is_some());

    let report = Report::new("a.cls".to_string(), analysis.diagnostics(), analysis.tokens.len() - 1);
    assert_eq!(report.count(Stage::Lexical), 1);
    assert_eq!(report.count(Stage::Syntactic), 0);
    assert_eq!(report.token_count, 9);
    assert!(!report.success);
}

#[test]
fn retokenizing_lexemes_is_stable() {
    let first = run(AREA);
    let joined: Vec<String> = first
        .tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.lexeme.clone())
        .collect();
    let second = run(&joined.join(" "));

    let kinds = |tokens: &[classc::frontend::token::Token]| -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind.clone()).collect()
    };
    assert_eq!(kinds(&first.tokens), kinds(&second.tokens));
}
