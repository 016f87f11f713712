//! Flattened expressions.
//!
//! An [`Expr`] is a postfix sequence of [`Tok`]s evaluated by a stack machine:
//! literals and variable references push one value, calls pop their
//! arguments and push their result, member accesses replace the top value.
//! Operators are ordinary calls to built-in operator functions named after
//! their symbol.

use std::rc::Rc;

use crate::{type_checker::state::VarId, Span};

use super::{
    module::{FnSig, GlobalDecl},
    statements::IfStmt,
    types::Type,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(u64),
    Float(f64),
}

/// What a variable reference resolved to.
#[derive(Debug, Clone)]
pub enum Binding {
    Local(VarId),
    Global(Rc<GlobalDecl>),
}

#[derive(Debug, Clone)]
pub struct VarRef {
    pub name: String,
    pub binding: Option<Binding>,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub name: String,
    /// Number of positional arguments.
    pub arity: usize,
    /// Names of the trailing named arguments, in call order.
    pub named: Vec<String>,
    pub is_operator: bool,
    /// Overloads still in the running, narrowed by type checking.
    pub candidates: Vec<Rc<FnSig>>,
    pub target: Option<Rc<FnSig>>,
}

impl Call {
    /// Values the call pops off the stack.
    pub fn arg_count(&self) -> usize {
        self.arity + self.named.len()
    }
}

#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub index: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum TokKind {
    Literal(Literal),
    Var(VarRef),
    Call(Call),
    /// An `if` used as a value.
    If(Box<IfStmt>),
    Member(Member),
}

#[derive(Debug, Clone)]
pub struct Tok {
    pub kind: TokKind,
    pub ty: Type,
    pub span: Span,
}

impl Tok {
    pub fn literal(literal: Literal, ty: Type, span: Span) -> Self {
        Tok {
            kind: TokKind::Literal(literal),
            ty,
            span,
        }
    }

    pub fn bool(value: bool, span: Span) -> Self {
        Tok::literal(Literal::Bool(value), Type::bool(), span)
    }

    pub fn var(name: String, span: Span) -> Self {
        Tok {
            kind: TokKind::Var(VarRef {
                name,
                binding: None,
            }),
            ty: Type::any_value(),
            span,
        }
    }

    pub fn call(name: String, arity: usize, named: Vec<String>, span: Span) -> Self {
        Tok {
            kind: TokKind::Call(Call {
                name,
                arity,
                named,
                is_operator: false,
                candidates: vec![],
                target: None,
            }),
            ty: Type::any_value(),
            span,
        }
    }

    pub fn operator(symbol: &str, arity: usize, span: Span) -> Self {
        Tok {
            kind: TokKind::Call(Call {
                name: symbol.to_string(),
                arity,
                named: vec![],
                is_operator: true,
                candidates: vec![],
                target: None,
            }),
            ty: Type::any_value(),
            span,
        }
    }

    /// A call already bound to `target`, used for inserted casts.
    pub fn resolved_call(target: Rc<FnSig>, span: Span) -> Self {
        Tok {
            ty: target.ret.clone(),
            kind: TokKind::Call(Call {
                name: target.name.clone(),
                arity: target.params.len(),
                named: vec![],
                is_operator: false,
                candidates: vec![Rc::clone(&target)],
                target: Some(target),
            }),
            span,
        }
    }

    pub fn member(name: String, span: Span) -> Self {
        Tok {
            kind: TokKind::Member(Member { name, index: None }),
            ty: Type::any_value(),
            span,
        }
    }

    pub fn if_expr(if_stmt: IfStmt) -> Self {
        Tok {
            span: if_stmt.span.clone(),
            kind: TokKind::If(Box::new(if_stmt)),
            ty: Type::any_value(),
        }
    }

    pub fn as_call(&self) -> Option<&Call> {
        match &self.kind {
            TokKind::Call(call) => Some(call),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub toks: Vec<Tok>,
    pub span: Span,
}

impl Expr {
    pub fn new(toks: Vec<Tok>, span: Span) -> Self {
        Expr { toks, span }
    }

    pub fn single(tok: Tok) -> Self {
        let span = tok.span.clone();
        Expr {
            toks: vec![tok],
            span,
        }
    }

    pub fn contains_if(&self) -> bool {
        self.toks.iter().any(|tok| matches!(tok.kind, TokKind::If(_)))
    }
}
