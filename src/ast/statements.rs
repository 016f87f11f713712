use std::sync::atomic::{AtomicU32, Ordering};

use crate::{type_checker::state::VarId, Span};

use super::{
    expressions::{Binding, Expr, Member},
    types::TypeName,
};

static BLOCK_ID: AtomicU32 = AtomicU32::new(1);

/// Hands out the identity the scope tree uses to recognise a block on re-entry.
pub fn next_block_id() -> u32 {
    BLOCK_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub id: u32,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl BlockStmt {
    pub fn new(body: Vec<Stmt>, span: Span) -> Self {
        BlockStmt {
            id: next_block_id(),
            body,
            span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeclarationStmt {
    pub name: String,
    pub ty: Option<TypeName>,
    pub init: Option<Expr>,
    pub var: Option<VarId>,
    /// Compiler-made temporary.
    pub hidden: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssignmentStmt {
    /// Variable being written, possibly dotted (`p.x`).
    pub target: String,
    pub binding: Option<Binding>,
    /// Struct members walked from the bound variable.
    pub members: Vec<Member>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// `if c0 {b0} else if c1 {b1} else {b2}`, flattened.
///
/// `conditions.len()` is `blocks.len()`, or one less when a trailing else exists.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub conditions: Vec<Expr>,
    pub blocks: Vec<BlockStmt>,
    pub span: Span,
}

impl IfStmt {
    pub fn has_else(&self) -> bool {
        self.blocks.len() > self.conditions.len()
    }
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BreakStmt {
    /// Number of enclosing loops to leave.
    pub amount: u32,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ContinueStmt {
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Declaration(DeclarationStmt),
    Assignment(AssignmentStmt),
    Expression(ExpressionStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Declaration(stmt) => &stmt.span,
            Stmt::Assignment(stmt) => &stmt.span,
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::Break(stmt) => &stmt.span,
            Stmt::Continue(stmt) => &stmt.span,
        }
    }

    /// Expressions owned directly by this statement, not those of nested blocks.
    pub fn exprs(&self) -> Vec<&Expr> {
        match self {
            Stmt::Declaration(stmt) => stmt.init.iter().collect(),
            Stmt::Assignment(stmt) => vec![&stmt.value],
            Stmt::Expression(stmt) => vec![&stmt.expr],
            Stmt::Return(stmt) => stmt.value.iter().collect(),
            Stmt::If(stmt) => stmt.conditions.iter().collect(),
            Stmt::While(stmt) => vec![&stmt.condition],
            Stmt::Break(_) | Stmt::Continue(_) => vec![],
        }
    }

    pub fn blocks(&self) -> Vec<&BlockStmt> {
        match self {
            Stmt::If(stmt) => stmt.blocks.iter().collect(),
            Stmt::While(stmt) => vec![&stmt.body],
            _ => vec![],
        }
    }

    pub fn exprs_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Stmt::Declaration(stmt) => stmt.init.iter_mut().collect(),
            Stmt::Assignment(stmt) => vec![&mut stmt.value],
            Stmt::Expression(stmt) => vec![&mut stmt.expr],
            Stmt::Return(stmt) => stmt.value.iter_mut().collect(),
            Stmt::If(stmt) => stmt.conditions.iter_mut().collect(),
            Stmt::While(stmt) => vec![&mut stmt.condition],
            Stmt::Break(_) | Stmt::Continue(_) => vec![],
        }
    }

    pub fn blocks_mut(&mut self) -> Vec<&mut BlockStmt> {
        match self {
            Stmt::If(stmt) => stmt.blocks.iter_mut().collect(),
            Stmt::While(stmt) => vec![&mut stmt.body],
            _ => vec![],
        }
    }
}
