//! Checks that every `break` and `continue` has a loop to leave.

use tracing::info_span;

use crate::{
    ast::{
        items::{Item, ModuleAst},
        statements::{BlockStmt, Stmt},
    },
    errors::errors::{Error, ErrorImpl},
    type_checker::state::State,
};

fn check_items(items: &[Item], state: &mut State) -> Result<(), Error> {
    for item in items {
        match item {
            Item::Function(function) => {
                state.enter_scope(function.body.id, false);
                let result = check_stmts(&function.body, state);
                state.exit_scope();
                result?;
            }
            Item::Module(module) => check_items(&module.items, state)?,
            _ => {}
        }
    }

    Ok(())
}

fn check_block(block: &BlockStmt, is_loop: bool, state: &mut State) -> Result<(), Error> {
    state.enter_scope(block.id, is_loop);
    let result = check_stmts(block, state);
    state.exit_scope();
    result
}

fn check_stmts(block: &BlockStmt, state: &mut State) -> Result<(), Error> {
    for stmt in &block.body {
        match stmt {
            Stmt::Break(brk) => {
                if state.get_loop(brk.amount as usize).is_none() {
                    return Err(Error::new(ErrorImpl::NoLoopToBreak, brk.span.start.clone()));
                }
            }
            Stmt::Continue(cont) => {
                if state.get_loop(1).is_none() {
                    return Err(Error::new(
                        ErrorImpl::NoLoopToContinue,
                        cont.span.start.clone(),
                    ));
                }
            }
            Stmt::If(if_stmt) => {
                for inner in &if_stmt.blocks {
                    check_block(inner, false, state)?;
                }
            }
            Stmt::While(while_stmt) => check_block(&while_stmt.body, true, state)?,
            _ => {}
        }
    }

    Ok(())
}

/// Rejects `break` and `continue` outside of enough enclosing loops.
pub fn check_loops(ast: &ModuleAst, state: &mut State) -> Result<(), Error> {
    let _span = info_span!("pipeline.loop_check", file = ast.name.as_str()).entered();
    check_items(&ast.items, state)
}
