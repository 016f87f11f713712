//! Short-circuit lowering.
//!
//! `a && b` and `a || b` are plain operator calls that evaluate both sides.
//! When either side has side effects the operator is rewritten into a
//! conditional so the right side only runs when it decides the result:
//!
//! - `a || b` becomes `if a { true } else { b }`
//! - `a && b` becomes `if !a { false } else { b }`

use tracing::{debug, info_span};

use crate::ast::{
    expressions::{Expr, Tok, TokKind},
    items::{Item, ModuleAst},
    statements::{BlockStmt, ExpressionStmt, IfStmt, Stmt},
};

/// A value on the scan stack: where its tokens start and whether evaluating it has side effects.
#[derive(Debug, Clone, Copy)]
struct Value {
    start: usize,
    side_effects: bool,
}

struct Circuiter {
    rewrites: usize,
}

impl Circuiter {
    fn shorten_items(&mut self, items: &mut [Item]) {
        for item in items {
            match item {
                Item::Function(function) => self.shorten_block(&mut function.body),
                Item::Module(module) => self.shorten_items(&mut module.items),
                _ => {}
            }
        }
    }

    fn shorten_block(&mut self, block: &mut BlockStmt) {
        for stmt in block.body.iter_mut() {
            for expr in stmt.exprs_mut() {
                self.shorten_expr(expr);
            }
            for inner in stmt.blocks_mut() {
                self.shorten_block(inner);
            }
        }
    }

    fn shorten_if(&mut self, if_stmt: &mut IfStmt) {
        for condition in if_stmt.conditions.iter_mut() {
            self.shorten_expr(condition);
        }
        for block in if_stmt.blocks.iter_mut() {
            self.shorten_block(block);
        }
    }

    /// Rewrites the first short-circuiting operator with side effects, then rescans.
    fn shorten_expr(&mut self, expr: &mut Expr) {
        while let Some((left, right, operator)) = self.find_rewrite(expr) {
            let or = expr.toks[operator]
                .as_call()
                .map(|call| call.name == "||")
                .unwrap_or(false);
            let span = expr.toks[left].span.to(&expr.toks[operator].span);
            let operator_span = expr.toks[operator].span.clone();

            let removed: Vec<Tok> = expr.toks.drain(left..=operator).collect();
            let mut removed = removed.into_iter();

            let mut condition: Vec<Tok> = removed.by_ref().take(right - left).collect();
            let alternative: Vec<Tok> = removed.take(operator - right).collect();

            if !or {
                condition.push(Tok::operator("!", 1, operator_span.clone()));
            }

            let condition_span = condition
                .first()
                .map(|tok| tok.span.clone())
                .unwrap_or_else(|| operator_span.clone());
            let alternative_span = alternative
                .first()
                .map(|tok| tok.span.clone())
                .unwrap_or_else(|| operator_span.clone());

            let decided = Expr::single(Tok::bool(or, operator_span.clone()));
            let otherwise = Expr::new(alternative, alternative_span);

            let if_stmt = IfStmt {
                conditions: vec![Expr::new(condition, condition_span)],
                blocks: vec![
                    expression_block(decided),
                    expression_block(otherwise),
                ],
                span,
            };

            expr.toks.insert(left, Tok::if_expr(if_stmt));
            self.rewrites += 1;
        }
    }

    /// Finds `(left start, right start, operator index)` of an operator to rewrite.
    fn find_rewrite(&mut self, expr: &mut Expr) -> Option<(usize, usize, usize)> {
        let mut stack: Vec<Value> = vec![];

        for i in 0..expr.toks.len() {
            let value = match &mut expr.toks[i].kind {
                TokKind::Literal(_) | TokKind::Var(_) => Value {
                    start: i,
                    side_effects: false,
                },
                TokKind::If(if_stmt) => {
                    self.shorten_if(if_stmt);
                    Value {
                        start: i,
                        side_effects: true,
                    }
                }
                TokKind::Member(_) => {
                    let base = stack.pop()?;
                    Value {
                        start: base.start,
                        side_effects: base.side_effects,
                    }
                }
                TokKind::Call(call) => {
                    let count = call.arg_count();
                    if stack.len() < count {
                        return None;
                    }
                    let args = stack.split_off(stack.len() - count);
                    let args_effects = args.iter().any(|arg| arg.side_effects);

                    let short_circuits =
                        call.is_operator && count == 2 && (call.name == "&&" || call.name == "||");
                    if short_circuits && args_effects {
                        return Some((args[0].start, args[1].start, i));
                    }

                    Value {
                        start: args.first().map(|arg| arg.start).unwrap_or(i),
                        side_effects: args_effects || !call.is_operator,
                    }
                }
            };

            stack.push(value);
        }

        None
    }
}

fn expression_block(expr: Expr) -> BlockStmt {
    let span = expr.span.clone();
    BlockStmt::new(
        vec![Stmt::Expression(ExpressionStmt {
            expr,
            span: span.clone(),
        })],
        span,
    )
}

/// Lowers every short-circuiting operator with side effects in `ast` into a conditional.
pub fn shorten(ast: &mut ModuleAst) {
    let _span = info_span!("pipeline.circuiter", file = ast.name.as_str()).entered();

    let mut circuiter = Circuiter { rewrites: 0 };
    circuiter.shorten_items(&mut ast.items);

    debug!(rewrites = circuiter.rewrites, "short-circuit operators lowered");
}
