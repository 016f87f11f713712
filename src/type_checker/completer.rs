//! Completion of still ambiguous types.
//!
//! After type checking, a value may still have several possible types. Each
//! block first settles the types of its own variables, then every expression
//! is pushed towards the type its context wants, falling back to the default
//! member of its set. A last walk per expression binds every deferred
//! operator to a single overload and checks that nothing is left open.

use std::rc::Rc;

use tracing::{debug, info_span};

use crate::{
    ast::{
        expressions::{Binding, Expr, Literal, Tok, TokKind},
        items::Item,
        module::{FnSig, Module},
        statements::{BlockStmt, Stmt},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    resolver::static_eval::fits,
    Position,
};

use super::{
    overload::{resolve_overload, Resolution},
    state::State,
    std::{is_comparison, Std},
    type_checker::{
        apply_result, arg_end, assignment_target_type, binding_type, insert_casts, narrow, CellRef,
        Slot,
    },
};

pub struct Completer<'a> {
    std: &'a Std,
    state: &'a mut State,
    ret: Type,
}

impl<'a> Completer<'a> {
    pub fn new(std: &'a Std, state: &'a mut State) -> Self {
        Completer {
            std,
            state,
            ret: Type::void(),
        }
    }

    fn complete_items(&mut self, items: &mut [Item]) -> Result<(), Error> {
        for item in items {
            match item {
                Item::Function(function) => {
                    let Some(sig) = &function.sig else {
                        continue;
                    };

                    self.ret = sig.ret.clone();
                    self.complete_block(&mut function.body)?;
                    debug!(function = sig.mangled.as_str(), "types completed");
                }
                Item::Module(module) => self.complete_items(&mut module.items)?,
                _ => {}
            }
        }

        Ok(())
    }

    fn complete_block(&mut self, block: &mut BlockStmt) -> Result<(), Error> {
        for stmt in block.body.iter() {
            if let Stmt::Declaration(decl) = stmt {
                let undetermined = || Error::new(ErrorImpl::UndeterminedType, decl.span.start.clone());

                let id = decl.var.ok_or_else(undetermined)?;
                let ty = self.state.var(id).ty.complete().ok_or_else(undetermined)?;
                self.state.var_mut(id).ty = ty;
            }
        }

        for stmt in block.body.iter_mut() {
            match stmt {
                Stmt::Declaration(decl) => {
                    if let (Some(init), Some(id)) = (&mut decl.init, decl.var) {
                        let ty = self.state.var(id).ty.clone();
                        self.complete_expr(init, Some(&ty))?;
                    }
                }
                Stmt::Assignment(assign) => {
                    let target = assignment_target_type(self.state, assign)?;
                    self.complete_expr(&mut assign.value, Some(&target))?;
                }
                Stmt::Expression(stmt) => self.complete_expr(&mut stmt.expr, None)?,
                Stmt::Return(ret) => {
                    if let Some(value) = &mut ret.value {
                        let expected = self.ret.clone();
                        self.complete_expr(value, Some(&expected))?;
                    }
                }
                Stmt::If(if_stmt) => {
                    for condition in if_stmt.conditions.iter_mut() {
                        self.complete_expr(condition, Some(&Type::bool()))?;
                    }
                    for block in if_stmt.blocks.iter_mut() {
                        self.complete_block(block)?;
                    }
                }
                Stmt::While(while_stmt) => {
                    self.complete_expr(&mut while_stmt.condition, Some(&Type::bool()))?;
                    self.complete_block(&mut while_stmt.body)?;
                }
                Stmt::Break(_) | Stmt::Continue(_) => {}
            }
        }

        Ok(())
    }

    /// Binds the call at `i` to a single overload of its current argument types.
    fn resolve_call(
        &mut self,
        expr: &mut Expr,
        i: usize,
        args: &[Slot],
        casts: &mut Vec<(usize, Rc<FnSig>)>,
    ) -> Result<Type, Error> {
        let position = expr.toks[i].span.start.clone();
        let Some(call) = expr.toks[i].as_call().cloned() else {
            return Err(Error::new(ErrorImpl::UndeterminedType, position));
        };

        let candidates = if call.is_operator {
            self.std.operators(&call.name, call.arity).to_vec()
        } else {
            call.candidates.clone()
        };

        let arg_types: Vec<Type> = args.iter().map(|arg| arg.ty.clone()).collect();
        let resolution = resolve_overload(self.std, &call, &candidates, &arg_types)
            .map_err(|error| Error::new(error, position.clone()))?;

        let Resolution::Resolved {
            target,
            casts: arg_casts,
        } = resolution
        else {
            return Err(Error::new(ErrorImpl::UndeterminedType, position));
        };

        let params = target.param_types_for(&call.named).unwrap_or_default();
        for (j, cast) in arg_casts.into_iter().enumerate() {
            match cast {
                Some(cast) => casts.push((arg_end(args, j, i), cast)),
                None => {
                    if let Some(param) = params.get(j) {
                        narrow(&mut expr.toks, self.state, &args[j].refs, param);
                    }
                }
            }
        }

        let ret = target.ret.clone();
        if let TokKind::Call(call) = &mut expr.toks[i].kind {
            call.candidates = vec![Rc::clone(&target)];
            call.target = Some(target);
        }
        expr.toks[i].ty = ret.clone();

        Ok(ret)
    }

    /// Forces `expr` into `context`, or its default type without one.
    fn complete_expr(&mut self, expr: &mut Expr, context: Option<&Type>) -> Result<(), Error> {
        let mut stack: Vec<Slot> = vec![];
        let mut casts: Vec<(usize, Rc<FnSig>)> = vec![];

        for i in 0..expr.toks.len() {
            let position = expr.toks[i].span.start.clone();

            let slot = match &expr.toks[i].kind {
                TokKind::Literal(_) => {
                    Slot::leaf(expr.toks[i].ty.clone(), vec![CellRef::Tok(i)], i)
                }
                TokKind::Var(var) => {
                    let Some(binding) = var.binding.clone() else {
                        return Err(Error::new(
                            ErrorImpl::VariableNotDeclared {
                                variable: var.name.clone(),
                            },
                            position,
                        ));
                    };

                    let ty = binding_type(self.state, &binding);
                    let mut refs = vec![CellRef::Tok(i)];
                    if let Binding::Local(id) = binding {
                        refs.push(CellRef::Var(id));
                    }

                    expr.toks[i].ty = ty.clone();
                    Slot::leaf(ty, refs, i)
                }
                TokKind::Member(_) => {
                    let Some(base) = stack.pop() else {
                        return Err(Error::new(ErrorImpl::UndeterminedType, position));
                    };
                    Slot::new(expr.toks[i].ty.clone(), vec![], base.start)
                }
                TokKind::Call(call) => {
                    let count = call.arg_count();
                    let resolved = call.target.is_some();
                    let comparison = is_comparison(&call.name);

                    if stack.len() < count {
                        return Err(Error::new(ErrorImpl::UndeterminedType, position));
                    }
                    let args = stack.split_off(stack.len() - count);
                    let start = args.first().map(|arg| arg.start).unwrap_or(i);

                    let merged = merge_all(&args);

                    if resolved {
                        Slot::new(expr.toks[i].ty.clone(), vec![], start)
                    } else if comparison {
                        if let Some(merged) = merged {
                            let complete = merged
                                .complete()
                                .ok_or_else(|| Error::new(ErrorImpl::UndeterminedType, position))?;
                            for arg in &args {
                                narrow(&mut expr.toks, self.state, &arg.refs, &complete);
                            }
                        }
                        Slot::new(Type::bool(), vec![], start)
                    } else if let Some(merged) = merged {
                        let mut refs: Vec<CellRef> =
                            args.into_iter().flat_map(|arg| arg.refs).collect();
                        refs.push(CellRef::Tok(i));
                        expr.toks[i].ty = merged.clone();
                        Slot::new(merged, refs, start)
                    } else {
                        let ret = self.resolve_call(expr, i, &args, &mut casts)?;
                        Slot::new(ret, vec![], start)
                    }
                }
                TokKind::If(_) => {
                    return Err(Error::new(ErrorImpl::UndeterminedType, position));
                }
            };

            stack.push(slot);
        }

        let Some(top) = stack.pop() else {
            return Err(Error::new(ErrorImpl::UndeterminedType, expr.span.start.clone()));
        };

        let ty = match context {
            Some(context) => apply_result(
                &mut expr.toks,
                self.state,
                self.std,
                &top,
                context,
                &mut casts,
                &expr.span.start,
            )?,
            None => top.ty.clone(),
        };

        if !ty.is_complete() {
            let complete = ty
                .complete()
                .ok_or_else(|| Error::new(ErrorImpl::UndeterminedType, expr.span.start.clone()))?;
            narrow(&mut expr.toks, self.state, &top.refs, &complete);
        }

        insert_casts(&mut expr.toks, casts);
        self.finish_expr(expr)
    }

    /// Binds the remaining deferred calls and checks every token is fully typed.
    fn finish_expr(&mut self, expr: &mut Expr) -> Result<(), Error> {
        let mut stack: Vec<Slot> = vec![];
        let mut casts: Vec<(usize, Rc<FnSig>)> = vec![];

        for i in 0..expr.toks.len() {
            let slot = match &expr.toks[i].kind {
                TokKind::Var(var) => {
                    if let Some(binding) = &var.binding {
                        expr.toks[i].ty = binding_type(self.state, binding);
                    }
                    Slot::new(expr.toks[i].ty.clone(), vec![], i)
                }
                TokKind::Member(_) => {
                    let start = stack.pop().map(|base| base.start).unwrap_or(i);
                    Slot::new(expr.toks[i].ty.clone(), vec![], start)
                }
                TokKind::Call(call) => {
                    let count = call.arg_count().min(stack.len());
                    let resolved = call.target.is_some();
                    let args = stack.split_off(stack.len() - count);
                    let start = args.first().map(|arg| arg.start).unwrap_or(i);

                    if !resolved {
                        self.resolve_call(expr, i, &args, &mut casts)?;
                    }
                    Slot::new(expr.toks[i].ty.clone(), vec![], start)
                }
                _ => Slot::new(expr.toks[i].ty.clone(), vec![], i),
            };

            stack.push(slot);
        }

        insert_casts(&mut expr.toks, casts);

        for (i, tok) in expr.toks.iter().enumerate() {
            if !tok.ty.is_complete() {
                return Err(Error::new(ErrorImpl::UndeterminedType, tok.span.start.clone()));
            }
            check_literal_range(tok, expr.toks.get(i + 1).is_some_and(is_negation))?;
        }

        Ok(())
    }
}

/// Intersection of the argument types, `None` when empty or without arguments.
fn merge_all(args: &[Slot]) -> Option<Type> {
    let (first, rest) = args.split_first()?;
    rest.iter()
        .try_fold(first.ty.clone(), |merged, arg| merged.merge(&arg.ty))
}

fn is_negation(tok: &Tok) -> bool {
    tok.as_call()
        .is_some_and(|call| call.is_operator && call.name == "-" && call.arity == 1)
}

/// Rejects integer literals that do not fit the type they ended up with.
///
/// `-128` is the literal `128` followed by a negation, so a negated literal
/// is checked with its sign.
fn check_literal_range(tok: &Tok, negated: bool) -> Result<(), Error> {
    let (TokKind::Literal(Literal::Int(value)), Some(prim)) = (&tok.kind, tok.ty.prim()) else {
        return Ok(());
    };

    if !prim.is_int() {
        return Ok(());
    }

    let value = if negated {
        -(*value as i128)
    } else {
        *value as i128
    };

    if !fits(value, prim) {
        return Err(Error::new(
            ErrorImpl::IntegerOutOfRange {
                literal: value.to_string(),
            },
            tok.span.start.clone(),
        ));
    }

    Ok(())
}

/// Settles every ambiguous type of `module` and binds every deferred call.
pub fn complete(module: &mut Module, std: &Std) -> Result<(), Error> {
    let _span = info_span!("pipeline.complete", file = module.ast.name.as_str()).entered();

    let Module { ast, state, .. } = module;
    let mut completer = Completer::new(std, state);
    completer.complete_items(&mut ast.items)
}

fn undetermined(position: &Position) -> Error {
    Error::new(ErrorImpl::UndeterminedType, position.clone())
}

fn verify_items(items: &[Item], state: &State) -> Result<(), Error> {
    for item in items {
        match item {
            Item::Function(function) => verify_block(&function.body, state)?,
            Item::Module(module) => verify_items(&module.items, state)?,
            _ => {}
        }
    }

    Ok(())
}

fn verify_block(block: &BlockStmt, state: &State) -> Result<(), Error> {
    for stmt in &block.body {
        match stmt {
            Stmt::Declaration(decl) => {
                let complete = decl
                    .var
                    .is_some_and(|id| state.var(id).ty.is_complete());
                if !complete {
                    return Err(undetermined(&decl.span.start));
                }
            }
            Stmt::Assignment(assign) => {
                let bound = assign.binding.is_some()
                    && assign.members.iter().all(|member| member.index.is_some());
                if !bound {
                    return Err(undetermined(&assign.span.start));
                }
            }
            _ => {}
        }

        for expr in stmt.exprs() {
            verify_expr(expr)?;
        }
        for inner in stmt.blocks() {
            verify_block(inner, state)?;
        }
    }

    Ok(())
}

fn verify_expr(expr: &Expr) -> Result<(), Error> {
    for tok in &expr.toks {
        let bound = match &tok.kind {
            TokKind::Literal(_) => true,
            TokKind::Var(var) => var.binding.is_some(),
            TokKind::Call(call) => call.target.is_some(),
            TokKind::Member(member) => member.index.is_some(),
            TokKind::If(_) => false,
        };

        if !bound || !tok.ty.is_complete() {
            return Err(undetermined(&tok.span.start));
        }
    }

    Ok(())
}

/// Checks that `module` is ready for code generation.
///
/// Every token must have a concrete type, every call a single target and
/// every variable reference a binding. Conditional expressions must have been
/// lowered to statements by now.
pub fn verify(module: &Module) -> Result<(), Error> {
    let _span = info_span!("pipeline.verify", file = module.ast.name.as_str()).entered();

    verify_items(&module.ast.items, &module.state)
}
