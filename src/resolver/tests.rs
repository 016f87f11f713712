//! Unit tests for name resolution and static evaluation.

use std::{collections::HashMap, rc::Rc};

use super::{
    resolver::{resolve, ModuleLoader, NoImports},
    static_eval::{eval_as, fits},
};
use crate::{
    ast::{
        expressions::{Binding, Expr, TokKind},
        items::Item,
        module::{Declarations, FnForm, Module},
        statements::Stmt,
        types::{Prim, Type, Value},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::std::Std,
    Position,
};

struct MapLoader(HashMap<String, Rc<Declarations>>);

impl ModuleLoader for MapLoader {
    fn import(&mut self, name: &str, position: &Position) -> Result<Rc<Declarations>, Error> {
        self.0.get(name).cloned().ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownModule {
                    module: name.to_string(),
                },
                position.clone(),
            )
        })
    }
}

fn resolve_named(source: &str, name: &str, loader: &mut dyn ModuleLoader) -> Result<Module, Error> {
    let lexed = tokenize(source.to_string(), Some(format!("{}.eb", name)))?;
    let ast = parse(lexed, name)?;
    resolve(ast, &Std::new(), loader)
}

fn resolve_source(source: &str) -> Result<Module, Error> {
    resolve_named(source, "test", &mut NoImports)
}

fn geometry_loader() -> MapLoader {
    let geometry = resolve_named(
        "pub fn area(w: I32, h: I32): I32 { w * h }\n\
         fn secret(): I32 { 1 }\n\
         pub const unit := 1\n\
         pub module shapes { pub struct Square { side: F64 } }",
        "geometry",
        &mut NoImports,
    )
    .unwrap();

    MapLoader(HashMap::from([(String::from("geometry"), geometry.decls)]))
}

fn body(module: &Module, index: usize) -> &Vec<Stmt> {
    match &module.ast.items[index] {
        Item::Function(function) => &function.body.body,
        other => panic!("expected a function, got {:?}", other),
    }
}

fn init(stmt: &Stmt) -> &Expr {
    match stmt {
        Stmt::Declaration(decl) => decl.init.as_ref().unwrap(),
        Stmt::Expression(stmt) => &stmt.expr,
        other => panic!("expected a declaration, got {:?}", other),
    }
}

fn parse_expr_of(source: &str) -> Expr {
    let lexed = tokenize(format!("fn main() {{ {} }}", source), None).unwrap();
    let ast = parse(lexed, "test").unwrap();
    match ast.items.into_iter().next() {
        Some(Item::Function(function)) => match function.body.body.into_iter().next() {
            Some(Stmt::Expression(stmt)) => stmt.expr,
            other => panic!("expected an expression, got {:?}", other),
        },
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_shadowing_binds_previous_declaration() {
    let module = resolve_source("fn f(a: I32) { x := a\n x := x + 1 }").unwrap();
    let stmts = body(&module, 0);

    let (Stmt::Declaration(first), Stmt::Declaration(second)) = (&stmts[0], &stmts[1]) else {
        panic!("expected two declarations");
    };
    assert_ne!(first.var, second.var);

    match &init(&stmts[1]).toks[0].kind {
        TokKind::Var(var) => match var.binding {
            Some(Binding::Local(id)) => assert_eq!(Some(id), first.var),
            ref other => panic!("expected a local, got {:?}", other),
        },
        other => panic!("expected a variable, got {:?}", other),
    }

    match &init(&stmts[0]).toks[0].kind {
        TokKind::Var(var) => match var.binding {
            Some(Binding::Local(id)) => assert!(module.state.var(id).is_param),
            ref other => panic!("expected the parameter, got {:?}", other),
        },
        other => panic!("expected a variable, got {:?}", other),
    }
}

#[test]
fn test_block_scopes_end() {
    let error = resolve_source("fn f(c: Bool) { if c { y := 1 }\n z := y }").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::VariableNotDeclared {
            variable: String::from("y")
        }
    );
}

#[test]
fn test_globals_are_evaluated() {
    let module =
        resolve_source("global count := 3\nconst ratio: F64 = 1 + 2\nfn f() { x := count }").unwrap();

    let Item::Global(count) = &module.ast.items[0] else {
        panic!("expected a global");
    };
    let decl = count.decl.as_ref().unwrap();
    assert_eq!(decl.ty, Type::from(Prim::I32));
    assert_eq!(decl.value, Value::Int(3));
    assert_eq!(decl.mangled, "test.count");

    let Item::Global(ratio) = &module.ast.items[1] else {
        panic!("expected a global");
    };
    assert_eq!(ratio.decl.as_ref().unwrap().value, Value::Float(3.0));
    assert!(ratio.decl.as_ref().unwrap().is_const);

    match &init(&body(&module, 2)[0]).toks[0].kind {
        TokKind::Var(var) => assert!(matches!(&var.binding, Some(Binding::Global(g)) if g.name == "count")),
        other => panic!("expected a variable, got {:?}", other),
    }
}

#[test]
fn test_global_errors() {
    let error = resolve_source("global small: I8 = 300").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::IntegerOutOfRange { .. }));

    let error = resolve_source("global other := 1\nglobal copy := other").unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::ExpectedConstantExpression);

    let error = resolve_source("global twice := 1\nglobal twice := 2").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::GlobalAlreadyDeclared { .. }));
}

#[test]
fn test_mangled_names_and_overloads() {
    let module = resolve_source(
        "fn g(x: I32) { }\nfn g(x: F64) { }\nmodule m { fn f(): I32 { 1 }\n fn f(x: I32): I32 { x } }",
    )
    .unwrap();

    let mangled: Vec<String> = module
        .decls
        .all_functions()
        .iter()
        .map(|sig| sig.mangled.clone())
        .collect();
    assert_eq!(
        mangled,
        vec!["test.g.1.0", "test.g.1.1", "test.m.f.0.0", "test.m.f.1.0"]
    );
    assert_eq!(module.decls.overloads("g", 1).len(), 2);
}

#[test]
fn test_duplicate_function() {
    let error = resolve_source("fn g(x: I32) { }\nfn g(y: I32): I32 { y }").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::FunctionAlreadyDeclared { .. }));
}

#[test]
fn test_unknown_names() {
    let error = resolve_source("fn f() { missing(1) }").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnknownFunction {
            function: String::from("missing"),
            arity: 1
        }
    );

    let error = resolve_source("fn f() { x := y }").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::VariableNotDeclared { .. }));

    let error = resolve_source("fn f(a: Vec3) { }").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::UnknownType { .. }));

    let error = resolve_source("fn g([t: F64]) { }\nfn f() { g(s = 1.0) }").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::UnknownNamedParameter { .. }));
}

#[test]
fn test_operators_get_builtin_candidates() {
    let module = resolve_source("fn f() { 1 + 2 }").unwrap();
    let expr = init(&body(&module, 0)[0]);

    let call = expr.toks[2].as_call().unwrap();
    assert!(call.is_operator);
    assert_eq!(call.candidates.len(), Std::new().operators("+", 2).len());
}

#[test]
fn test_struct_members_and_constructor() {
    let module = resolve_source(
        "struct Point { x: I32, y: I32 }\nfn f() { p := Point(x = 1, y = 2)\n a := p.x\n p.y = 3 }",
    )
    .unwrap();
    let stmts = body(&module, 1);

    let constructor = &init(&stmts[0]).toks[2].as_call().unwrap().candidates[0];
    assert_eq!(constructor.form, FnForm::Constructor);
    assert_eq!(constructor.named.len(), 2);
    assert_eq!(constructor.named[1].default, Value::Int(0));

    let toks = &init(&stmts[1]).toks;
    assert_eq!(toks.len(), 2);
    assert!(matches!(&toks[0].kind, TokKind::Var(var) if var.name == "p"));
    assert!(matches!(&toks[1].kind, TokKind::Member(member) if member.name == "x"));

    let Stmt::Assignment(assign) = &stmts[2] else {
        panic!("expected an assignment");
    };
    assert!(matches!(assign.binding, Some(Binding::Local(_))));
    assert_eq!(assign.members.len(), 1);
    assert_eq!(assign.members[0].name, "y");
}

#[test]
fn test_qualified_import_calls() {
    let mut loader = geometry_loader();
    let module = resolve_named(
        "import geometry\nfn f(): I32 { geometry.area(2, 3) + area(1, 1) + geometry.unit }",
        "main",
        &mut loader,
    )
    .unwrap();

    assert_eq!(module.imports.len(), 1);
    assert_eq!(module.externals.functions.len(), 1);
    assert_eq!(module.externals.functions[0].mangled, "geometry.area.2.0");
    assert_eq!(module.externals.globals.len(), 1);
}

#[test]
fn test_import_on_demand_and_nested_types() {
    let mut loader = geometry_loader();
    let module = resolve_named(
        "fn f(s: geometry.shapes.Square): F64 { s.side }",
        "main",
        &mut loader,
    )
    .unwrap();

    assert_eq!(module.imports.len(), 1);
    assert_eq!(module.externals.structs.len(), 1);
    assert_eq!(module.externals.structs[0].mangled, "geometry.shapes.Square");
}

#[test]
fn test_private_access() {
    let mut loader = geometry_loader();
    let error = resolve_named("import geometry\nfn f() { geometry.secret() }", "main", &mut loader)
        .unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::PrivateAccess { .. }));
}

#[test]
fn test_unknown_import() {
    let mut loader = geometry_loader();
    let error = resolve_named("import algebra\nfn f() { }", "main", &mut loader).unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnknownModule {
            module: String::from("algebra")
        }
    );

    let error = resolve_named("import geometry.circles", "main", &mut loader).unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::UnknownModule { .. }));
}

#[test]
fn test_extend_merges_modules() {
    let module = resolve_source("module m { fn a() { } }\nextend m { fn b() { a() } }").unwrap();
    let m = module.decls.submodule(&[String::from("m")]).unwrap();
    assert_eq!(m.overloads("a", 0).len(), 1);
    assert_eq!(m.overloads("b", 0).len(), 1);

    let error = resolve_source("extend q { fn b() { } }").unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::UnknownModule { .. }));
}

#[test]
fn test_static_eval() {
    let f64_type = Type::from(Prim::F64);

    let (value, ty) = eval_as(&parse_expr_of("2 * 3 + 1"), None).unwrap();
    assert_eq!((value, ty), (Value::Int(7), Type::from(Prim::I32)));

    let (value, _) = eval_as(&parse_expr_of("1 / 4"), Some(&f64_type)).unwrap();
    assert_eq!(value, Value::Float(0.0));

    let (value, _) = eval_as(&parse_expr_of("1.0 / 4.0"), Some(&f64_type)).unwrap();
    assert_eq!(value, Value::Float(0.25));

    let (value, _) = eval_as(&parse_expr_of("!(1 < 2)"), None).unwrap();
    assert_eq!(value, Value::Bool(false));

    let error = eval_as(&parse_expr_of("1 / 0"), None).unwrap_err();
    assert_eq!(error, ErrorImpl::ExpectedConstantExpression);

    let error = eval_as(&parse_expr_of("1.5"), Some(&Type::from(Prim::I32))).unwrap_err();
    assert!(matches!(error, ErrorImpl::TypeMatchError { .. }));

    assert!(fits(-128, Prim::I8));
    assert!(!fits(128, Prim::I8));
    assert!(fits(255, Prim::U8));
    assert!(!fits(-1, Prim::U64));
}
