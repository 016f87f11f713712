//! Textual IR of an analysed module.
//!
//! The listing is what the sidecar carries as its IR payload. It shows every
//! item under its mangled name and every expression in the postfix order a
//! backend evaluates it, with the concrete type of each token:
//!
//! ```text
//! fn test.add.2.0(a: I32, b: I32): I32 {
//!   ret a#0:I32 b#1:I32 std.+.2.2:I32
//! }
//! ```

use std::fmt::Write;

use crate::{
    ast::{
        expressions::{Binding, Expr, Literal, TokKind},
        items::Item,
        module::Module,
        statements::{BlockStmt, Stmt},
    },
    type_checker::state::State,
};

const INDENT: &str = "  ";

fn render_expr(expr: &Expr) -> String {
    expr.toks
        .iter()
        .map(|tok| {
            let text = match &tok.kind {
                TokKind::Literal(Literal::Bool(value)) => value.to_string(),
                TokKind::Literal(Literal::Int(value)) => value.to_string(),
                TokKind::Literal(Literal::Float(value)) => format!("{:?}", value),
                TokKind::Var(var) => match &var.binding {
                    Some(Binding::Local(id)) => format!("{}#{}", var.name, id.0),
                    Some(Binding::Global(global)) => format!("@{}", global.mangled),
                    None => format!("?{}", var.name),
                },
                TokKind::Call(call) => match &call.target {
                    Some(target) => target.mangled.clone(),
                    None => format!("?{}", call.name),
                },
                TokKind::Member(member) => match member.index {
                    Some(index) => format!(".{}#{}", member.name, index),
                    None => format!(".{}", member.name),
                },
                TokKind::If(_) => String::from("?if"),
            };
            format!("{}:{}", text, tok.ty)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_block(out: &mut String, block: &BlockStmt, state: &State, depth: usize) {
    for stmt in &block.body {
        render_stmt(out, stmt, state, depth);
    }
}

fn render_stmt(out: &mut String, stmt: &Stmt, state: &State, depth: usize) {
    let pad = INDENT.repeat(depth);

    let _ = match stmt {
        Stmt::Declaration(decl) => {
            let (id, ty) = match decl.var {
                Some(id) => (id.0.to_string(), state.var(id).ty.to_string()),
                None => (String::from("?"), String::from("?")),
            };
            match &decl.init {
                Some(init) => writeln!(out, "{}let {}#{}: {} = {}", pad, decl.name, id, ty, render_expr(init)),
                None => writeln!(out, "{}let {}#{}: {}", pad, decl.name, id, ty),
            }
        }
        Stmt::Assignment(assign) => {
            let mut target = match &assign.binding {
                Some(Binding::Local(id)) => format!("{}#{}", assign.target, id.0),
                Some(Binding::Global(global)) => format!("@{}", global.mangled),
                None => format!("?{}", assign.target),
            };
            for member in &assign.members {
                target.push_str(&format!(".{}#{}", member.name, member.index.unwrap_or_default()));
            }
            writeln!(out, "{}set {} = {}", pad, target, render_expr(&assign.value))
        }
        Stmt::Expression(stmt) => writeln!(out, "{}eval {}", pad, render_expr(&stmt.expr)),
        Stmt::Return(ret) => match &ret.value {
            Some(value) => writeln!(out, "{}ret {}", pad, render_expr(value)),
            None => writeln!(out, "{}ret", pad),
        },
        Stmt::If(if_stmt) => {
            for (i, block) in if_stmt.blocks.iter().enumerate() {
                let _ = match (i, if_stmt.conditions.get(i)) {
                    (0, Some(condition)) => writeln!(out, "{}if {} {{", pad, render_expr(condition)),
                    (_, Some(condition)) => writeln!(out, "{}elif {} {{", pad, render_expr(condition)),
                    (_, None) => writeln!(out, "{}else {{", pad),
                };
                render_block(out, block, state, depth + 1);
            }
            writeln!(out, "{}}}", pad)
        }
        Stmt::While(while_stmt) => {
            let _ = writeln!(out, "{}while {} {{", pad, render_expr(&while_stmt.condition));
            render_block(out, &while_stmt.body, state, depth + 1);
            writeln!(out, "{}}}", pad)
        }
        Stmt::Break(stmt) => writeln!(out, "{}break {}", pad, stmt.amount),
        Stmt::Continue(_) => writeln!(out, "{}continue", pad),
    };
}

fn render_items(out: &mut String, items: &[Item], state: &State) {
    for item in items {
        let _ = match item {
            Item::Function(function) => {
                let Some(sig) = &function.sig else {
                    continue;
                };

                let mut params: Vec<String> = sig
                    .params
                    .iter()
                    .map(|param| format!("{}: {}", param.name, param.ty))
                    .collect();
                params.extend(
                    sig.named
                        .iter()
                        .map(|param| format!("[{}: {} = {:?}]", param.name, param.ty, param.default)),
                );

                let _ = writeln!(out, "fn {}({}): {} {{", sig.mangled, params.join(", "), sig.ret);
                render_block(out, &function.body, state, 1);
                writeln!(out, "}}")
            }
            Item::Global(global) => match &global.decl {
                Some(decl) => writeln!(
                    out,
                    "{} {}: {} = {:?}",
                    if decl.is_const { "const" } else { "global" },
                    decl.mangled,
                    decl.ty,
                    decl.value
                ),
                None => Ok(()),
            },
            Item::Struct(item) => match &item.def {
                Some(def) => {
                    let members: Vec<String> = def
                        .members
                        .borrow()
                        .iter()
                        .map(|(name, ty)| format!("{}: {}", name, ty))
                        .collect();
                    writeln!(out, "struct {} {{ {} }}", def.mangled, members.join(", "))
                }
                None => Ok(()),
            },
            Item::Module(module) => {
                render_items(out, &module.items, state);
                Ok(())
            }
            Item::Import(_) => Ok(()),
        };
    }
}

/// Renders the analysed `module`, external items first.
pub fn render(module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "; module {}", module.decls.path);

    for function in &module.externals.functions {
        let params: Vec<String> = function.params.iter().map(|param| param.ty.to_string()).collect();
        let _ = writeln!(out, "extern fn {}({}): {}", function.mangled, params.join(", "), function.ret);
    }
    for global in &module.externals.globals {
        let _ = writeln!(out, "extern global {}: {}", global.mangled, global.ty);
    }
    for def in &module.externals.structs {
        let _ = writeln!(out, "extern struct {}", def.mangled);
    }

    render_items(&mut out, &module.ast.items, &module.state);
    out
}
