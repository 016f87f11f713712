//! Reachability and return checking.
//!
//! Statements after a `return`, `break` or `continue`, or after an `if` whose
//! every branch leaves, are rejected. A function with a return type whose body
//! can fall off the end gets implicit returns: a trailing expression statement
//! becomes `return expr`, and a trailing `if` with an `else` gets the same
//! treatment in each branch that falls through.

use tracing::{debug, info_span};

use crate::{
    ast::{
        items::{Item, ModuleAst},
        statements::{BlockStmt, ReturnStmt, Stmt},
        types::Prim,
    },
    errors::errors::{Error, ErrorImpl},
};

/// How control leaves a statement or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Execution continues with the next statement.
    Falls,
    Returns,
    /// Leaves through `break` or `continue`.
    Jumps,
}

impl Flow {
    pub fn leaves(&self) -> bool {
        *self != Flow::Falls
    }
}

/// Flow of a whole block, rejecting statements that can never run.
pub fn check_block(block: &BlockStmt) -> Result<Flow, Error> {
    for (i, stmt) in block.body.iter().enumerate() {
        let flow = check_stmt(stmt)?;

        if !flow.leaves() {
            continue;
        }

        if let Some(next) = block.body.get(i + 1) {
            return Err(match stmt {
                Stmt::If(if_stmt) => {
                    Error::new(ErrorImpl::UnreachableAfterIf, if_stmt.span.start.clone())
                }
                _ => Error::new(ErrorImpl::UnreachableCode, next.span().start.clone()),
            });
        }

        return Ok(flow);
    }

    Ok(Flow::Falls)
}

fn check_stmt(stmt: &Stmt) -> Result<Flow, Error> {
    Ok(match stmt {
        Stmt::Return(_) => Flow::Returns,
        Stmt::Break(_) | Stmt::Continue(_) => Flow::Jumps,
        Stmt::If(if_stmt) => {
            let mut flows = vec![];
            for block in &if_stmt.blocks {
                flows.push(check_block(block)?);
            }

            if !if_stmt.has_else() || flows.iter().any(|flow| !flow.leaves()) {
                Flow::Falls
            } else if flows.iter().all(|flow| *flow == Flow::Returns) {
                Flow::Returns
            } else {
                Flow::Jumps
            }
        }
        Stmt::While(while_stmt) => {
            check_block(&while_stmt.body)?;
            Flow::Falls
        }
        _ => Flow::Falls,
    })
}

/// Turns the value a block falls off with into an explicit `return`.
pub fn create_implicit_returns(block: &mut BlockStmt) -> Result<(), Error> {
    let block_start = block.span.start.clone();
    let Some(last) = block.body.pop() else {
        return Err(Error::new(ErrorImpl::ExpectedReturn, block_start));
    };

    let replacement = match last {
        Stmt::Expression(stmt) => Stmt::Return(ReturnStmt {
            value: Some(stmt.expr),
            span: stmt.span,
        }),
        Stmt::If(mut if_stmt) => {
            if !if_stmt.has_else() {
                return Err(Error::new(
                    ErrorImpl::ExpectedReturnAfterIf,
                    if_stmt.span.start.clone(),
                ));
            }

            for inner in if_stmt.blocks.iter_mut() {
                if !check_block(inner)?.leaves() {
                    create_implicit_returns(inner)?;
                }
            }
            Stmt::If(if_stmt)
        }
        stmt @ Stmt::Return(_) => stmt,
        other => {
            return Err(Error::new(ErrorImpl::ExpectedReturn, other.span().start.clone()));
        }
    };

    block.body.push(replacement);
    Ok(())
}

struct ReturnChecker {
    implicit: usize,
}

impl ReturnChecker {
    fn check_items(&mut self, items: &mut [Item]) -> Result<(), Error> {
        for item in items {
            match item {
                Item::Function(function) => {
                    let flow = check_block(&function.body)?;

                    let returns_value = function
                        .ret
                        .as_ref()
                        .map(|ty| Prim::from_name(&ty.name) != Some(Prim::Void))
                        .unwrap_or(false);

                    if returns_value && !flow.leaves() {
                        create_implicit_returns(&mut function.body)?;
                        self.implicit += 1;
                    }
                }
                Item::Module(module) => self.check_items(&mut module.items)?,
                _ => {}
            }
        }

        Ok(())
    }
}

/// Checks reachability in every function of `ast` and adds implicit returns.
pub fn check_returns(ast: &mut ModuleAst) -> Result<(), Error> {
    let _span = info_span!("pipeline.return_check", file = ast.name.as_str()).entered();

    let mut checker = ReturnChecker { implicit: 0 };
    checker.check_items(&mut ast.items)?;

    debug!(functions = checker.implicit, "implicit returns created");
    Ok(())
}
