//! Hoisting of `if` expressions.
//!
//! An `if` used as a value is moved in front of the statement that uses it.
//! A hidden temporary is declared first, each branch assigns its last
//! expression to the temporary, and the value position reads the temporary:
//!
//! ```text
//! x := 1 + if c { a } else { b }
//! ```
//!
//! becomes
//!
//! ```text
//! eb$tmp0
//! if c { eb$tmp0 = a } else { eb$tmp0 = b }
//! x := 1 + eb$tmp0
//! ```
//!
//! A `while` whose condition holds an `if` expression first gets its
//! condition moved into a guard at the top of the body.

use tracing::{debug, info_span};

use crate::{
    ast::{
        expressions::{Expr, Tok, TokKind},
        items::{Item, ModuleAst},
        statements::{
            AssignmentStmt, BlockStmt, BreakStmt, DeclarationStmt, IfStmt, Stmt, WhileStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    Span,
};

/// Prefix of the compiler-made temporaries, unreachable from source names.
pub const TEMPORARY_PREFIX: &str = "eb$tmp";

struct Dropper {
    next: usize,
}

impl Dropper {
    fn drop_items(&mut self, items: &mut [Item]) -> Result<(), Error> {
        for item in items {
            match item {
                Item::Function(function) => self.drop_block(&mut function.body)?,
                Item::Module(module) => self.drop_items(&mut module.items)?,
                _ => {}
            }
        }

        Ok(())
    }

    fn drop_block(&mut self, block: &mut BlockStmt) -> Result<(), Error> {
        let mut i = 0;

        while i < block.body.len() {
            let hoisted = self.hoist(&mut block.body[i])?;

            if !hoisted.is_empty() {
                // The hoisted `if` may hold further `if` expressions in its condition.
                block.body.splice(i..i, hoisted);
                continue;
            }

            for inner in block.body[i].blocks_mut() {
                self.drop_block(inner)?;
            }
            i += 1;
        }

        Ok(())
    }

    /// Pulls every `if` expression out of `stmt`, returning the statements to put before it.
    fn hoist(&mut self, stmt: &mut Stmt) -> Result<Vec<Stmt>, Error> {
        match stmt {
            Stmt::While(while_stmt) if while_stmt.condition.contains_if() => {
                guard_loop(while_stmt)
            }
            Stmt::If(if_stmt) => split_else_if(if_stmt),
            _ => {}
        }

        let mut hoisted = vec![];

        for expr in stmt.exprs_mut() {
            for tok in expr.toks.iter_mut() {
                if !matches!(tok.kind, TokKind::If(_)) {
                    continue;
                }

                let name = format!("{}{}", TEMPORARY_PREFIX, self.next);
                self.next += 1;

                let span = tok.span.clone();
                let TokKind::If(if_stmt) =
                    std::mem::replace(&mut tok.kind, Tok::var(name.clone(), span.clone()).kind)
                else {
                    continue;
                };

                let mut if_stmt = *if_stmt;
                if !if_stmt.has_else() {
                    return Err(Error::new(
                        ErrorImpl::DroppingIfWithoutElse,
                        if_stmt.span.start.clone(),
                    ));
                }
                for block in if_stmt.blocks.iter_mut() {
                    create_drop(block, &name, &if_stmt.span)?;
                }

                hoisted.push(Stmt::Declaration(DeclarationStmt {
                    name,
                    ty: None,
                    init: None,
                    var: None,
                    hidden: true,
                    span: span.clone(),
                }));
                hoisted.push(Stmt::If(if_stmt));
            }
        }

        Ok(hoisted)
    }
}

/// Turns `while c { body }` into `while true { if c { } else { break } body }`.
///
/// The condition then lives in the loop body, where its `if` expressions are
/// hoisted like any other and run again on every iteration.
fn guard_loop(while_stmt: &mut WhileStmt) {
    let span = while_stmt.condition.span.clone();
    let condition = std::mem::replace(
        &mut while_stmt.condition,
        Expr::single(Tok::bool(true, span.clone())),
    );

    let guard = IfStmt {
        conditions: vec![condition],
        blocks: vec![
            BlockStmt::new(vec![], span.clone()),
            BlockStmt::new(
                vec![Stmt::Break(BreakStmt {
                    amount: 1,
                    span: span.clone(),
                })],
                span.clone(),
            ),
        ],
        span,
    };

    while_stmt.body.body.insert(0, Stmt::If(guard));
}

/// Moves `else if` branches from the first one whose condition holds an `if`
/// expression into a nested `if` inside a plain `else`, so the condition can
/// be hoisted without running before the earlier conditions.
fn split_else_if(if_stmt: &mut IfStmt) {
    let Some(k) = (1..if_stmt.conditions.len()).find(|&k| if_stmt.conditions[k].contains_if())
    else {
        return;
    };

    let conditions: Vec<Expr> = if_stmt.conditions.drain(k..).collect();
    let blocks: Vec<BlockStmt> = if_stmt.blocks.drain(k..).collect();

    let span = match (conditions.first(), blocks.last()) {
        (Some(first), Some(last)) => first.span.to(&last.span),
        _ => if_stmt.span.clone(),
    };

    let nested = IfStmt {
        conditions,
        blocks,
        span: span.clone(),
    };

    if_stmt
        .blocks
        .push(BlockStmt::new(vec![Stmt::If(nested)], span));
}

/// Makes the last statement of `block` assign its value to `target`.
fn create_drop(block: &mut BlockStmt, target: &str, if_span: &Span) -> Result<(), Error> {
    let Some(last) = block.body.pop() else {
        return Err(Error::new(ErrorImpl::ExpectedDrop, if_span.start.clone()));
    };

    let replacement = match last {
        Stmt::Expression(stmt) => Stmt::Assignment(AssignmentStmt {
            target: target.to_string(),
            binding: None,
            members: vec![],
            value: stmt.expr,
            span: stmt.span,
        }),
        Stmt::If(mut nested) => {
            if !nested.has_else() {
                return Err(Error::new(
                    ErrorImpl::DroppingIfWithoutElse,
                    nested.span.start.clone(),
                ));
            }
            for inner in nested.blocks.iter_mut() {
                create_drop(inner, target, &nested.span)?;
            }
            Stmt::If(nested)
        }
        stmt @ (Stmt::Return(_) | Stmt::Break(_) | Stmt::Continue(_)) => stmt,
        other => {
            return Err(Error::new(ErrorImpl::ExpectedDrop, other.span().start.clone()));
        }
    };

    block.body.push(replacement);
    Ok(())
}

/// Hoists every `if` expression of `ast` into statements.
pub fn create_drops(ast: &mut ModuleAst) -> Result<(), Error> {
    let _span = info_span!("pipeline.drops", file = ast.name.as_str()).entered();

    let mut dropper = Dropper { next: 0 };
    dropper.drop_items(&mut ast.items)?;

    debug!(temporaries = dropper.next, "if expressions hoisted");
    Ok(())
}
