//! Lattice type checking.
//!
//! Every expression is run through a stack machine over types. A slot on the
//! stack remembers which token and variable types produced it while it is
//! still ambiguous, so narrowing the slot later narrows all of them at once.
//! Types only ever shrink here; picking defaults is left to the completer.

use std::rc::Rc;

use tracing::{debug, info_span};

use crate::{
    ast::{
        expressions::{Binding, Call, Expr, Tok, TokKind},
        items::Item,
        module::{FnSig, Module},
        statements::{AssignmentStmt, BlockStmt, Stmt},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    overload::{resolve_overload, Resolution},
    state::{State, VarId},
    std::{can_cast, is_comparison, Std},
};

/// A type cell a stack slot was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRef {
    Tok(usize),
    Var(VarId),
}

#[derive(Debug, Clone)]
pub struct Slot {
    pub ty: Type,
    /// Cells to narrow together with this slot, empty once the type is complete.
    pub refs: Vec<CellRef>,
    /// Index of the first token of the value.
    pub start: usize,
}

impl Slot {
    pub fn new(ty: Type, refs: Vec<CellRef>, start: usize) -> Self {
        Slot { ty, refs, start }
    }

    /// A slot for token `index`, linked to it only while its type is ambiguous.
    pub fn leaf(ty: Type, mut refs: Vec<CellRef>, index: usize) -> Self {
        if ty.is_complete() {
            refs.clear();
        }
        Slot::new(ty, refs, index)
    }
}

/// Sets every cell in `refs` to `ty`.
pub fn narrow(toks: &mut [Tok], state: &mut State, refs: &[CellRef], ty: &Type) {
    for cell in refs {
        match cell {
            CellRef::Tok(index) => toks[*index].ty = ty.clone(),
            CellRef::Var(id) => state.var_mut(*id).ty = ty.clone(),
        }
    }
}

/// Index of the last token of argument `j`, given the call token at `call_index`.
pub fn arg_end(args: &[Slot], j: usize, call_index: usize) -> usize {
    match args.get(j + 1) {
        Some(next) => next.start - 1,
        None => call_index - 1,
    }
}

/// Inserts each cast right after the token it converts, in one batch.
pub fn insert_casts(toks: &mut Vec<Tok>, mut casts: Vec<(usize, Rc<FnSig>)>) {
    casts.sort_by(|a, b| b.0.cmp(&a.0));

    for (after, cast) in casts {
        let span = toks[after].span.clone();
        toks.insert(after + 1, Tok::resolved_call(cast, span));
    }
}

pub fn binding_type(state: &State, binding: &Binding) -> Type {
    match binding {
        Binding::Local(id) => state.var(*id).ty.clone(),
        Binding::Global(global) => global.ty.clone(),
    }
}

/// Type of the place an assignment writes, filling in member indices on the way.
pub fn assignment_target_type(state: &State, stmt: &mut AssignmentStmt) -> Result<Type, Error> {
    let Some(binding) = &stmt.binding else {
        return Err(Error::new(
            ErrorImpl::VariableNotDeclared {
                variable: stmt.target.clone(),
            },
            stmt.span.start.clone(),
        ));
    };

    let mut ty = binding_type(state, binding);

    for member in stmt.members.iter_mut() {
        let found = match &ty {
            Type::Struct(def) => def.member(&member.name),
            Type::Prim(_) => None,
        };

        let Some((index, member_ty)) = found else {
            return Err(Error::new(
                ErrorImpl::UnknownMember {
                    member: member.name.clone(),
                    type_: ty.to_string(),
                },
                stmt.span.start.clone(),
            ));
        };

        member.index = Some(index);
        ty = member_ty;
    }

    Ok(ty)
}

/// Converts the expression result in `top` to `res`: narrowing when the types
/// overlap, casting when a widening conversion exists.
pub fn apply_result(
    toks: &mut [Tok],
    state: &mut State,
    std: &Std,
    top: &Slot,
    res: &Type,
    casts: &mut Vec<(usize, Rc<FnSig>)>,
    position: &Position,
) -> Result<Type, Error> {
    if let Some(merged) = top.ty.merge(res) {
        narrow(toks, state, &top.refs, &merged);
        return Ok(merged);
    }

    if let (Some(from), Some(to)) = (top.ty.prim(), res.prim()) {
        if can_cast(from, to) {
            if let Some(cast) = std.cast(from, to) {
                casts.push((toks.len() - 1, Rc::clone(cast)));
                return Ok(res.clone());
            }
        }
    }

    Err(type_mismatch(res, &top.ty, position))
}

pub fn type_mismatch(expected: &Type, received: &Type, position: &Position) -> Error {
    Error::new(
        ErrorImpl::TypeMatchError {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        position.clone(),
    )
}

pub struct TypeChecker<'a> {
    std: &'a Std,
    state: &'a mut State,
    /// Return type of the function being checked.
    ret: Type,
}

impl<'a> TypeChecker<'a> {
    pub fn new(std: &'a Std, state: &'a mut State) -> Self {
        TypeChecker {
            std,
            state,
            ret: Type::void(),
        }
    }

    fn check_items(&mut self, items: &mut [Item]) -> Result<(), Error> {
        for item in items {
            match item {
                Item::Function(function) => {
                    let Some(sig) = &function.sig else {
                        continue;
                    };

                    self.ret = sig.ret.clone();
                    self.check_block(&mut function.body)?;
                    debug!(function = sig.mangled.as_str(), "type checked");
                }
                Item::Module(module) => self.check_items(&mut module.items)?,
                _ => {}
            }
        }

        Ok(())
    }

    fn check_block(&mut self, block: &mut BlockStmt) -> Result<(), Error> {
        for stmt in block.body.iter_mut() {
            self.check_stmt(stmt)?;
        }

        Ok(())
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Declaration(decl) => {
                let Some(id) = decl.var else {
                    return Err(Error::new(
                        ErrorImpl::VariableNotDeclared {
                            variable: decl.name.clone(),
                        },
                        decl.span.start.clone(),
                    ));
                };

                let declared = decl.ty.as_ref().map(|_| self.state.var(id).ty.clone());

                let ty = match (&mut decl.init, declared) {
                    (Some(init), declared) => {
                        let ty = self.check_expr(init, declared.as_ref())?;
                        if ty.is_void() {
                            return Err(Error::new(
                                ErrorImpl::TypeMatchError {
                                    expected: String::from("a value"),
                                    received: ty.to_string(),
                                },
                                init.span.start.clone(),
                            ));
                        }
                        ty
                    }
                    (None, Some(declared)) => declared,
                    (None, None) => Type::any_value(),
                };

                // Not linked to the initializer's cells: narrowing the variable
                // later leaves the operands it was computed from alone.
                self.state.var_mut(id).ty = ty;
            }
            Stmt::Assignment(assign) => {
                match &assign.binding {
                    Some(Binding::Local(id)) if self.state.var(*id).is_param => {
                        return Err(Error::new(
                            ErrorImpl::AssignToParameter {
                                variable: assign.target.clone(),
                            },
                            assign.span.start.clone(),
                        ));
                    }
                    Some(Binding::Global(global)) if global.is_const => {
                        return Err(Error::new(
                            ErrorImpl::AssignToConstant {
                                variable: assign.target.clone(),
                            },
                            assign.span.start.clone(),
                        ));
                    }
                    _ => {}
                }

                let target = assignment_target_type(self.state, assign)?;
                let ty = self.check_expr(&mut assign.value, Some(&target))?;

                if !target.is_complete() {
                    if let Some(Binding::Local(id)) = &assign.binding {
                        self.state.var_mut(*id).ty = ty;
                    }
                }
            }
            Stmt::Expression(stmt) => {
                self.check_expr(&mut stmt.expr, None)?;
            }
            Stmt::Return(ret) => {
                let expected = self.ret.clone();
                match &mut ret.value {
                    Some(value) => {
                        if expected.is_void() {
                            let received = self.check_expr(value, None)?;
                            return Err(type_mismatch(&expected, &received, &value.span.start));
                        }
                        self.check_expr(value, Some(&expected))?;
                    }
                    None if !expected.is_void() => {
                        return Err(type_mismatch(&expected, &Type::void(), &ret.span.start));
                    }
                    None => {}
                }
            }
            Stmt::If(if_stmt) => {
                for condition in if_stmt.conditions.iter_mut() {
                    self.check_expr(condition, Some(&Type::bool()))?;
                }
                for block in if_stmt.blocks.iter_mut() {
                    self.check_block(block)?;
                }
            }
            Stmt::While(while_stmt) => {
                self.check_expr(&mut while_stmt.condition, Some(&Type::bool()))?;
                self.check_block(&mut while_stmt.body)?;
            }
            Stmt::Break(_) | Stmt::Continue(_) => {}
        }

        Ok(())
    }

    /// Type checks `expr`, forcing its value into `res` when given.
    pub fn check_expr(&mut self, expr: &mut Expr, res: Option<&Type>) -> Result<Type, Error> {
        let mut stack: Vec<Slot> = vec![];
        let mut casts: Vec<(usize, Rc<FnSig>)> = vec![];

        for i in 0..expr.toks.len() {
            let position = expr.toks[i].span.start.clone();

            let slot = match &expr.toks[i].kind {
                TokKind::Literal(_) => {
                    Slot::leaf(expr.toks[i].ty.clone(), vec![CellRef::Tok(i)], i)
                }
                TokKind::Var(var) => {
                    let Some(binding) = &var.binding else {
                        return Err(Error::new(
                            ErrorImpl::VariableNotDeclared {
                                variable: var.name.clone(),
                            },
                            position,
                        ));
                    };

                    let ty = binding_type(self.state, binding);
                    let mut refs = vec![CellRef::Tok(i)];
                    if let Binding::Local(id) = binding {
                        refs.push(CellRef::Var(*id));
                    }

                    expr.toks[i].ty = ty.clone();
                    Slot::leaf(ty, refs, i)
                }
                TokKind::Member(member) => {
                    let name = member.name.clone();
                    let Some(base) = stack.pop() else {
                        return Err(Error::new(ErrorImpl::UndeterminedType, position));
                    };

                    let found = match &base.ty {
                        Type::Struct(def) => def.member(&name),
                        Type::Prim(_) => None,
                    };
                    let Some((index, ty)) = found else {
                        return Err(Error::new(
                            ErrorImpl::UnknownMember {
                                member: name,
                                type_: base.ty.to_string(),
                            },
                            position,
                        ));
                    };

                    if let TokKind::Member(member) = &mut expr.toks[i].kind {
                        member.index = Some(index);
                    }
                    expr.toks[i].ty = ty.clone();
                    Slot::new(ty, vec![], base.start)
                }
                TokKind::Call(call) => {
                    let call = call.clone();
                    let count = call.arg_count();
                    if stack.len() < count {
                        return Err(Error::new(ErrorImpl::UndeterminedType, position));
                    }

                    let args = stack.split_off(stack.len() - count);
                    let start = args.first().map(|arg| arg.start).unwrap_or(i);

                    if let Some(target) = &call.target {
                        Slot::new(target.ret.clone(), vec![], start)
                    } else {
                        self.check_call(expr, i, &call, args, start, &mut casts)?
                    }
                }
                TokKind::If(_) => {
                    return Err(Error::new(ErrorImpl::UndeterminedType, position));
                }
            };

            stack.push(slot);
        }

        if stack.len() != 1 {
            return Err(Error::new(ErrorImpl::UndeterminedType, expr.span.start.clone()));
        }

        let top = stack.remove(0);
        let ty = match res {
            Some(res) => apply_result(
                &mut expr.toks,
                self.state,
                self.std,
                &top,
                res,
                &mut casts,
                &expr.span.start,
            )?,
            None => top.ty,
        };

        insert_casts(&mut expr.toks, casts);
        Ok(ty)
    }

    fn check_call(
        &mut self,
        expr: &mut Expr,
        i: usize,
        call: &Call,
        args: Vec<Slot>,
        start: usize,
        casts: &mut Vec<(usize, Rc<FnSig>)>,
    ) -> Result<Slot, Error> {
        let arg_types: Vec<Type> = args.iter().map(|arg| arg.ty.clone()).collect();
        let resolution = resolve_overload(self.std, call, &call.candidates, &arg_types)
            .map_err(|error| Error::new(error, expr.toks[i].span.start.clone()))?;

        match resolution {
            Resolution::Resolved {
                target,
                casts: arg_casts,
            } => {
                let params = target.param_types_for(&call.named).unwrap_or_default();

                for (j, cast) in arg_casts.into_iter().enumerate() {
                    match cast {
                        Some(cast) => casts.push((arg_end(&args, j, i), cast)),
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

                Ok(Slot::new(ret, vec![], start))
            }
            Resolution::Deferred { merged, candidates } => {
                for arg in &args {
                    narrow(&mut expr.toks, self.state, &arg.refs, &merged);
                }

                if let TokKind::Call(call) = &mut expr.toks[i].kind {
                    call.candidates = candidates;
                }

                if is_comparison(&call.name) {
                    expr.toks[i].ty = Type::bool();
                    return Ok(Slot::new(Type::bool(), vec![], start));
                }

                let mut refs: Vec<CellRef> =
                    args.into_iter().flat_map(|arg| arg.refs).collect();
                refs.push(CellRef::Tok(i));
                expr.toks[i].ty = merged.clone();

                Ok(Slot::new(merged, refs, start))
            }
        }
    }
}

/// Type checks every function body of `module`.
pub fn type_check(module: &mut Module, std: &Std) -> Result<(), Error> {
    let _span = info_span!("pipeline.type_check", file = module.ast.name.as_str()).entered();

    let Module { ast, state, .. } = module;
    let mut checker = TypeChecker::new(std, state);
    checker.check_items(&mut ast.items)
}

