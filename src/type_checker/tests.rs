//! Unit tests for type checking, overload resolution and completion.

use super::{
    overload::{resolve_overload, Resolution},
    std::{can_cast, Std},
};
use crate::{
    ast::{
        expressions::{Call, TokKind},
        items::Item,
        module::{FnForm, Module},
        statements::Stmt,
        types::{Prim, PrimSet, Type},
    },
    compiler::compiler::analyse,
    errors::errors::{Error, ErrorImpl},
    resolver::resolver::NoImports,
};

fn analyse_source(source: &str) -> Result<Module, Error> {
    analyse(source.to_string(), "test.eb", "test", &Std::new(), &mut NoImports)
}

/// Type of the last variable called `name`.
fn var_type(module: &Module, name: &str) -> Type {
    module
        .state
        .vars()
        .iter()
        .rev()
        .find(|var| var.name == name)
        .map(|var| var.ty.clone())
        .unwrap_or_else(|| panic!("no variable {}", name))
}

fn error_of(source: &str) -> ErrorImpl {
    analyse_source(source).unwrap_err().get_impl().clone()
}

fn operator_call(name: &str) -> Call {
    Call {
        name: name.to_string(),
        arity: 2,
        named: vec![],
        is_operator: true,
        candidates: vec![],
        target: None,
    }
}

#[test]
fn test_literal_defaults() {
    let module = analyse_source("fn f() { x := 3\n y := 3.0\n z := 1u }").unwrap();

    assert_eq!(var_type(&module, "x"), Type::from(Prim::I32));
    assert_eq!(var_type(&module, "y"), Type::from(Prim::F64));
    assert_eq!(var_type(&module, "z"), Type::from(Prim::U32));
}

#[test]
fn test_float_operand_narrows_variable() {
    let module = analyse_source("fn f() { x := 3\n z := x + 4.5 }").unwrap();

    assert_eq!(var_type(&module, "x"), Type::from(Prim::F64));
    assert_eq!(var_type(&module, "z"), Type::from(Prim::F64));
}

#[test]
fn test_context_narrows_literals() {
    let module = analyse_source("fn f(a: I64): I64 { b := 2\n c: U8 = 7\n a * b }").unwrap();

    assert_eq!(var_type(&module, "b"), Type::from(Prim::I64));
    assert_eq!(var_type(&module, "c"), Type::from(Prim::U8));
}

#[test]
fn test_every_token_is_complete() {
    let module = analyse_source("fn f(): F32 { x := 1 + 2 * 3\n b := x < 4\n 1.5 }").unwrap();

    let Item::Function(function) = &module.ast.items[0] else {
        panic!("expected a function");
    };
    for stmt in &function.body.body {
        let expr = match stmt {
            Stmt::Declaration(decl) => decl.init.as_ref().unwrap(),
            Stmt::Return(ret) => ret.value.as_ref().unwrap(),
            other => panic!("unexpected statement {:?}", other),
        };
        for tok in &expr.toks {
            assert!(tok.ty.is_complete(), "{:?} left incomplete", tok);
            if let Some(call) = tok.as_call() {
                assert!(call.target.is_some(), "{} left unbound", call.name);
            }
        }
    }

    assert_eq!(var_type(&module, "x"), Type::from(Prim::I32));
    assert_eq!(var_type(&module, "b"), Type::bool());
}

#[test]
fn test_operator_tie_prefers_wider_overload() {
    let std = Std::new();
    let candidates: Vec<_> = std
        .operators("+", 2)
        .iter()
        .filter(|sig| {
            let prim = sig.params[0].ty.prim();
            prim == Some(Prim::I32) || prim == Some(Prim::I64)
        })
        .cloned()
        .collect();
    assert_eq!(candidates.len(), 2);

    let literal = Type::Prim(PrimSet::NUMERIC);
    let resolution = resolve_overload(
        &std,
        &operator_call("+"),
        &candidates,
        &[literal.clone(), literal],
    )
    .unwrap();

    match resolution {
        Resolution::Resolved { target, casts } => {
            assert_eq!(target.ret, Type::from(Prim::I64));
            assert!(casts.iter().all(|cast| cast.is_none()));
        }
        other => panic!("expected a resolved call, got {:?}", other),
    }
}

#[test]
fn test_ambiguous_literals_are_deferred() {
    let std = Std::new();
    let literal = Type::Prim(PrimSet::NUMERIC);
    let resolution = resolve_overload(
        &std,
        &operator_call("*"),
        std.operators("*", 2),
        &[literal.clone(), literal],
    )
    .unwrap();

    match resolution {
        Resolution::Deferred { merged, candidates } => {
            assert_eq!(merged, Type::Prim(PrimSet::NUMERIC));
            assert_eq!(candidates.len(), std.operators("*", 2).len());
        }
        other => panic!("expected a deferred call, got {:?}", other),
    }
}

#[test]
fn test_mixed_signedness_is_ambiguous() {
    let error = error_of("fn f(a: U8, b: I8) { c := a + b }");
    assert_eq!(
        error,
        ErrorImpl::AmbiguousCall {
            function: String::from("+")
        }
    );
}

#[test]
fn test_casts() {
    assert!(can_cast(Prim::I32, Prim::I64));
    assert!(can_cast(Prim::U8, Prim::I16));
    assert!(can_cast(Prim::F32, Prim::F64));
    assert!(!can_cast(Prim::U8, Prim::I8));
    assert!(!can_cast(Prim::I64, Prim::I32));
    assert!(!can_cast(Prim::I32, Prim::F64));
    assert!(!can_cast(Prim::I32, Prim::I32));
}

#[test]
fn test_widening_argument_gets_cast() {
    let module = analyse_source("fn g(x: I64): I64 { x }\nfn f(a: I32): I64 { g(a) }").unwrap();

    let Item::Function(function) = &module.ast.items[1] else {
        panic!("expected a function");
    };
    let Stmt::Return(ret) = &function.body.body[0] else {
        panic!("expected an implicit return");
    };
    let toks = &ret.value.as_ref().unwrap().toks;

    assert_eq!(toks.len(), 3);
    let cast = toks[1].as_call().and_then(|call| call.target.clone()).unwrap();
    assert_eq!(cast.form, FnForm::Cast);
    assert_eq!(cast.mangled, "std.cast.I32.I64");
    assert_eq!(toks[2].ty, Type::from(Prim::I64));
}

#[test]
fn test_constructor_and_members() {
    let module =
        analyse_source("struct P { x: I32, y: F64 }\nfn f(): F64 { p := P(x = 1)\n p.y }").unwrap();

    let Type::Struct(def) = var_type(&module, "p") else {
        panic!("expected a struct");
    };
    assert_eq!(def.name, "P");

    let Item::Function(function) = &module.ast.items[1] else {
        panic!("expected a function");
    };
    let Stmt::Return(ret) = &function.body.body[1] else {
        panic!("expected an implicit return");
    };
    match &ret.value.as_ref().unwrap().toks[1].kind {
        TokKind::Member(member) => assert_eq!(member.index, Some(1)),
        other => panic!("expected a member, got {:?}", other),
    }
}

#[test]
fn test_if_expression_joins_branches() {
    let module =
        analyse_source("fn f(c: Bool): F64 { x := if c { 1 } else { 2.5 }\n return x }").unwrap();
    assert_eq!(var_type(&module, "x"), Type::from(Prim::F64));
}

#[test]
fn test_type_errors() {
    assert!(matches!(
        error_of("fn f(): I32 { return 1.5 }"),
        ErrorImpl::TypeMatchError { .. }
    ));
    assert!(matches!(
        error_of("fn f() { if 1 { } }"),
        ErrorImpl::TypeMatchError { .. }
    ));
    assert!(matches!(
        error_of("fn f() { return 1 }"),
        ErrorImpl::TypeMatchError { .. }
    ));
    assert!(matches!(
        error_of("fn g() { }\nfn f() { x := g() }"),
        ErrorImpl::TypeMatchError { .. }
    ));
    assert!(matches!(
        error_of("fn f() { x: I8 = 300 }"),
        ErrorImpl::IntegerOutOfRange { .. }
    ));
    assert!(matches!(
        error_of("fn f() { x := true + 1 }"),
        ErrorImpl::NoMatchingOverload { .. }
    ));
}

#[test]
fn test_assignment_rules() {
    assert_eq!(
        error_of("fn f(a: I32) { a = 2 }"),
        ErrorImpl::AssignToParameter {
            variable: String::from("a")
        }
    );
    assert_eq!(
        error_of("const k := 1\nfn f() { k = 2 }"),
        ErrorImpl::AssignToConstant {
            variable: String::from("k")
        }
    );

    let module = analyse_source("global total := 0\nfn f() { total += 2 }").unwrap();
    assert!(module.state.vars().is_empty());
}

#[test]
fn test_control_flow_properties() {
    assert_eq!(
        error_of("fn f(x: Bool): I32 { if x { return 1 } }"),
        ErrorImpl::ExpectedReturnAfterIf
    );
    assert!(analyse_source("fn f(x: Bool): I32 { if x { return 1 } else { return 2 } }").is_ok());

    assert_eq!(
        error_of("fn f() { return\n x := 1 }"),
        ErrorImpl::UnreachableCode
    );
    assert_eq!(
        error_of("fn f() { if true { return } else { return }\n x := 1 }"),
        ErrorImpl::UnreachableAfterIf
    );

    assert!(analyse_source("fn f() { while { while { break *2 } } }").is_ok());
    assert_eq!(
        error_of("fn f() { while { while { break *3 } } }"),
        ErrorImpl::NoLoopToBreak
    );
}

#[test]
fn test_overload_arity() {
    assert!(analyse_source("fn f(a: I32) { }\nfn f(a: I32, b: I32) { }").is_ok());
    assert!(matches!(
        error_of("fn f(a: I32) { }\nfn f(a: I32) { }"),
        ErrorImpl::FunctionAlreadyDeclared { .. }
    ));
}

#[test]
fn test_short_circuit_calls_are_typed() {
    let module = analyse_source(
        "fn ready(): Bool { true }\nfn f(): Bool { ready() && ready() }",
    )
    .unwrap();

    let Item::Function(function) = &module.ast.items[1] else {
        panic!("expected a function");
    };
    assert!(matches!(&function.body.body[1], Stmt::If(_)));
    assert!(module
        .state
        .vars()
        .iter()
        .any(|var| var.hidden && var.ty == Type::bool()));
}

#[test]
fn test_short_circuit_in_loop_condition_is_typed() {
    let module = analyse_source(
        "fn f(): Bool { true }\nfn g(): Bool { true }\nfn main() { while f() && g() { continue } }",
    )
    .unwrap();

    let Item::Function(function) = &module.ast.items[2] else {
        panic!("expected a function");
    };
    let Stmt::While(while_stmt) = &function.body.body[0] else {
        panic!("expected a while");
    };
    let Stmt::If(lowered) = &while_stmt.body.body[1] else {
        panic!("expected the lowered `&&`");
    };

    let calls_in = |block: usize| -> Vec<String> {
        let Some(Stmt::Assignment(assign)) = lowered.blocks[block].body.last() else {
            panic!("expected an assignment");
        };
        assign
            .value
            .toks
            .iter()
            .filter_map(|tok| tok.as_call())
            .map(|call| call.target.as_ref().unwrap().mangled.clone())
            .collect()
    };
    assert_eq!(calls_in(0), Vec::<String>::new());
    assert_eq!(calls_in(1), vec!["test.g.0.0"]);
    assert!(lowered.conditions[0]
        .toks
        .iter()
        .any(|tok| tok.as_call().is_some_and(|call| call.name == "f")));
}

#[test]
fn test_negated_literal_reaches_signed_minimum() {
    let module = analyse_source("fn f() { x: I8 = -128\n y := -2147483648\n z := -128i8 }").unwrap();
    assert_eq!(var_type(&module, "x"), Type::from(Prim::I8));
    assert_eq!(var_type(&module, "y"), Type::from(Prim::I32));
    assert_eq!(var_type(&module, "z"), Type::from(Prim::I8));

    for source in [
        "fn f() { x: I8 = 128 }",
        "fn f() { x: I8 = -129 }",
        "fn f() { x := 128i8 }",
        "fn f() { x: I8 = 1 - 128 }",
    ] {
        assert!(
            matches!(error_of(source), ErrorImpl::IntegerOutOfRange { .. }),
            "{} accepted",
            source
        );
    }
}

#[test]
fn test_narrowing_stops_at_declarations() {
    let module =
        analyse_source("fn f() { a := 1\n b := 2\n c := a + b\n d: I64 = c }").unwrap();

    assert_eq!(var_type(&module, "a"), Type::from(Prim::I32));
    assert_eq!(var_type(&module, "b"), Type::from(Prim::I32));
    assert_eq!(var_type(&module, "c"), Type::from(Prim::I64));

    let Item::Function(function) = &module.ast.items[0] else {
        panic!("expected a function");
    };
    let Stmt::Declaration(decl) = &function.body.body[2] else {
        panic!("expected a declaration");
    };
    let toks = &decl.init.as_ref().unwrap().toks;
    let cast = toks.last().and_then(|tok| tok.as_call()).and_then(|call| call.target.clone());
    assert_eq!(cast.unwrap().mangled, "std.cast.I32.I64");
}
