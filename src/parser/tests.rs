//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Operator precedence and the postfix output order
//! - Calls with positional and named arguments
//! - Declarations, assignments and compound assignments
//! - Control flow statements and `if` in value position
//! - Items: functions, imports, globals, structs and submodules

use super::parser::parse;
use crate::{
    ast::{
        expressions::{Expr, Literal, TokKind},
        items::{Item, ModuleAst},
        statements::Stmt,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<ModuleAst, Error> {
    let lexed = tokenize(source.to_string(), Some("test.eb".to_string()))?;
    parse(lexed, "test")
}

fn body_of(source: &str) -> Vec<Stmt> {
    let module = parse_source(source).unwrap();
    match module.items.into_iter().next() {
        Some(Item::Function(function)) => function.body.body,
        other => panic!("expected a function, got {:?}", other),
    }
}

/// Space separated postfix rendering, `call/arity` for calls.
fn render(expr: &Expr) -> String {
    expr.toks
        .iter()
        .map(|tok| match &tok.kind {
            TokKind::Literal(Literal::Int(value)) => value.to_string(),
            TokKind::Literal(Literal::Float(value)) => format!("{:?}", value),
            TokKind::Literal(Literal::Bool(value)) => value.to_string(),
            TokKind::Var(var) => var.name.clone(),
            TokKind::Call(call) => format!("{}/{}", call.name, call.arg_count()),
            TokKind::Member(member) => format!(".{}", member.name),
            TokKind::If(_) => String::from("if"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn expr_of(source: &str) -> String {
    let body = body_of(&format!("fn main() {{ {} }}", source));
    match &body[0] {
        Stmt::Expression(stmt) => render(&stmt.expr),
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

#[test]
fn test_parse_precedence() {
    assert_eq!(expr_of("1 + 2 * 3"), "1 2 3 */2 +/2");
    assert_eq!(expr_of("(1 + 2) * 3"), "1 2 +/2 3 */2");
    assert_eq!(expr_of("a < b && c == d || e"), "a b </2 c d ==/2 &&/2 e ||/2");
    assert_eq!(expr_of("a & b | c ^ d"), "a b &/2 c d ^/2 |/2");
    assert_eq!(expr_of("1 << 2 + 3"), "1 2 3 +/2 <</2");
}

#[test]
fn test_parse_left_associative() {
    assert_eq!(expr_of("a - b - c"), "a b -/2 c -/2");
    assert_eq!(expr_of("a / b / c"), "a b //2 c //2");
}

#[test]
fn test_parse_unary_operators() {
    assert_eq!(expr_of("-a * b"), "a -/1 b */2");
    assert_eq!(expr_of("!a && b"), "a !/1 b &&/2");
    assert_eq!(expr_of("/x"), "x //1");
    assert_eq!(expr_of("- -a"), "a -/1 -/1");
}

#[test]
fn test_parse_operator_continues_next_line() {
    assert_eq!(expr_of("1 +\n 2"), "1 2 +/2");
}

#[test]
fn test_parse_calls() {
    assert_eq!(expr_of("f()"), "f/0");
    assert_eq!(expr_of("f(1, g(2), 3 + 4)"), "1 2 g/1 3 4 +/2 f/3");
    assert_eq!(expr_of("m.f(x)"), "x m.f/1");
}

#[test]
fn test_parse_named_arguments() {
    let body = body_of("fn main() { f(1, scale=2, bias=3) }");
    let Stmt::Expression(stmt) = &body[0] else {
        panic!("expected an expression statement");
    };

    let call = stmt.expr.toks.last().unwrap().as_call().unwrap();
    assert_eq!(call.arity, 1);
    assert_eq!(call.named, vec!["scale".to_string(), "bias".to_string()]);
    assert_eq!(render(&stmt.expr), "1 2 3 f/3");
}

#[test]
fn test_parse_positional_after_named() {
    let error = parse_source("fn main() { f(a=1, 2) }").unwrap_err();
    assert_eq!(*error.get_impl(), ErrorImpl::ExpectedNamedArgument);
}

#[test]
fn test_parse_member_access() {
    assert_eq!(expr_of("p.x + 1"), "p.x 1 +/2");
    assert_eq!(expr_of("f().a.b"), "f/0 .a .b");
}

#[test]
fn test_parse_literals() {
    assert_eq!(expr_of("true != false"), "true false !=/2");
    assert_eq!(expr_of("1.5 * 2"), "1.5 2 */2");
}

#[test]
fn test_parse_declarations() {
    let body = body_of("fn main() {\n x := 1\n y: I64 = 2\n z: F32\n}");
    assert_eq!(body.len(), 3);

    let Stmt::Declaration(x) = &body[0] else {
        panic!("expected declaration");
    };
    assert_eq!(x.name, "x");
    assert!(x.ty.is_none());
    assert_eq!(render(x.init.as_ref().unwrap()), "1");

    let Stmt::Declaration(y) = &body[1] else {
        panic!("expected declaration");
    };
    assert_eq!(y.ty.as_ref().unwrap().name, "I64");
    assert!(y.init.is_some());

    let Stmt::Declaration(z) = &body[2] else {
        panic!("expected declaration");
    };
    assert_eq!(z.ty.as_ref().unwrap().name, "F32");
    assert!(z.init.is_none());
}

#[test]
fn test_parse_assignments() {
    let body = body_of("fn main() { x = 1; p.y = 2; x += 3 * 4 }");

    let Stmt::Assignment(plain) = &body[0] else {
        panic!("expected assignment");
    };
    assert_eq!(plain.target, "x");
    assert_eq!(render(&plain.value), "1");

    let Stmt::Assignment(member) = &body[1] else {
        panic!("expected assignment");
    };
    assert_eq!(member.target, "p.y");

    let Stmt::Assignment(compound) = &body[2] else {
        panic!("expected assignment");
    };
    assert_eq!(compound.target, "x");
    assert_eq!(render(&compound.value), "x 3 4 */2 +/2");
}

#[test]
fn test_parse_if_chain() {
    let body = body_of("fn main() {\n if a { f() }\n else if b { g() } else { h() }\n}");
    assert_eq!(body.len(), 1);

    let Stmt::If(if_stmt) = &body[0] else {
        panic!("expected if statement, got {:?}", body[0]);
    };
    assert_eq!(if_stmt.conditions.len(), 2);
    assert_eq!(if_stmt.blocks.len(), 3);
    assert!(if_stmt.has_else());
}

#[test]
fn test_parse_if_as_value() {
    let body = body_of("fn main() { x := 1 + if c { 2 } else { 3 } }");
    let Stmt::Declaration(decl) = &body[0] else {
        panic!("expected declaration");
    };

    assert_eq!(render(decl.init.as_ref().unwrap()), "1 if +/2");
}

#[test]
fn test_parse_loops() {
    let body = body_of("fn main() { while x < 3 { break }; while { continue; break *2 } }");
    assert_eq!(body.len(), 2);

    let Stmt::While(forever) = &body[1] else {
        panic!("expected while");
    };
    assert_eq!(render(&forever.condition), "true");

    let Stmt::Break(brk) = &forever.body.body[1] else {
        panic!("expected break");
    };
    assert_eq!(brk.amount, 2);
}

#[test]
fn test_parse_return() {
    let body = body_of("fn main() { return\n }");
    assert!(matches!(&body[0], Stmt::Return(ret) if ret.value.is_none()));

    let body = body_of("fn main(): I32 { return 1 + 2 }");
    assert!(matches!(&body[0], Stmt::Return(ret) if ret.value.is_some()));
}

#[test]
fn test_parse_statements_need_separator() {
    let error = parse_source("fn main() { x := 1 y := 2 }").unwrap_err();
    assert!(matches!(
        error.get_impl(),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}

#[test]
fn test_parse_function_item() {
    let module =
        parse_source("pub fn lerp(a: F64, b: F64, [t: F64 = 0.5, clamp: Bool]): F64 { a }")
            .unwrap();

    let Item::Function(function) = &module.items[0] else {
        panic!("expected function");
    };
    assert!(function.is_pub);
    assert_eq!(function.name, "lerp");
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.named.len(), 2);
    assert!(function.named[0].default.is_some());
    assert!(function.named[1].default.is_none());
    assert_eq!(function.ret.as_ref().unwrap().name, "F64");
}

#[test]
fn test_parse_imports() {
    let module = parse_source("import std.io\nimport geometry.[shapes, linear.vector]").unwrap();

    let Item::Import(single) = &module.items[0] else {
        panic!("expected import");
    };
    assert_eq!(single.paths, vec![vec!["std".to_string(), "io".to_string()]]);

    let Item::Import(list) = &module.items[1] else {
        panic!("expected import");
    };
    assert_eq!(list.paths.len(), 2);
    assert_eq!(list.paths[1], vec!["geometry", "linear", "vector"]);
}

#[test]
fn test_parse_globals_and_structs() {
    let module = parse_source(
        "const LIMIT: U32 = 10\nglobal counter := 0\npub struct Point {\n x: F64\n y: F64\n}",
    )
    .unwrap();

    let Item::Global(limit) = &module.items[0] else {
        panic!("expected global");
    };
    assert!(limit.is_const);
    assert_eq!(limit.ty.as_ref().unwrap().name, "U32");

    let Item::Global(counter) = &module.items[1] else {
        panic!("expected global");
    };
    assert!(!counter.is_const);
    assert!(counter.ty.is_none());

    let Item::Struct(point) = &module.items[2] else {
        panic!("expected struct");
    };
    assert!(point.is_pub);
    assert_eq!(point.members.len(), 2);
}

#[test]
fn test_parse_modules() {
    let module = parse_source("module math {\n fn one(): I32 { 1 }\n}\nextend math { const TWO := 2 }")
        .unwrap();

    let Item::Module(math) = &module.items[0] else {
        panic!("expected module");
    };
    assert!(!math.is_extend);
    assert_eq!(math.items.len(), 1);

    let Item::Module(extend) = &module.items[1] else {
        panic!("expected module");
    };
    assert!(extend.is_extend);
}

#[test]
fn test_parse_qualified_module_name() {
    let error = parse_source("module a.b { }").unwrap_err();
    assert!(matches!(
        error.get_impl(),
        ErrorImpl::InvalidModuleName { .. }
    ));
}

#[test]
fn test_parse_unexpected_item() {
    let error = parse_source("x := 1").unwrap_err();
    assert!(matches!(
        error.get_impl(),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}
