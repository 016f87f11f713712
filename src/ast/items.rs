use std::rc::Rc;

use crate::{lexer::tokens::Directive, Span};

use super::{
    expressions::Expr,
    module::{FnSig, GlobalDecl},
    statements::BlockStmt,
    types::{StructDef, TypeName},
};

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
    pub span: Span,
}

/// A parameter from the bracketed tail of a parameter list, passed by name.
#[derive(Debug, Clone)]
pub struct NamedParam {
    pub name: String,
    pub ty: TypeName,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionItem {
    pub name: String,
    pub params: Vec<Param>,
    pub named: Vec<NamedParam>,
    pub ret: Option<TypeName>,
    pub body: BlockStmt,
    pub is_pub: bool,
    pub span: Span,
    pub sig: Option<Rc<FnSig>>,
}

#[derive(Debug, Clone)]
pub struct ImportItem {
    /// One dotted path per imported module, `import a.[b, c]` gives `a.b` and `a.c`.
    pub paths: Vec<Vec<String>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct GlobalItem {
    pub name: String,
    pub ty: Option<TypeName>,
    pub init: Expr,
    pub is_const: bool,
    pub is_pub: bool,
    pub span: Span,
    pub decl: Option<Rc<GlobalDecl>>,
}

#[derive(Debug, Clone)]
pub struct StructItem {
    pub name: String,
    pub members: Vec<Param>,
    pub is_pub: bool,
    pub span: Span,
    pub def: Option<Rc<StructDef>>,
}

#[derive(Debug, Clone)]
pub struct ModuleItem {
    pub name: String,
    pub items: Vec<Item>,
    pub is_pub: bool,
    /// `extend m { .. }`, adds to an already declared `module m`.
    pub is_extend: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Item {
    Function(FunctionItem),
    Import(ImportItem),
    Global(GlobalItem),
    Struct(StructItem),
    Module(ModuleItem),
}

impl Item {
    pub fn span(&self) -> &Span {
        match self {
            Item::Function(item) => &item.span,
            Item::Import(item) => &item.span,
            Item::Global(item) => &item.span,
            Item::Struct(item) => &item.span,
            Item::Module(item) => &item.span,
        }
    }
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct ModuleAst {
    pub name: String,
    pub items: Vec<Item>,
    pub directives: Vec<Directive>,
}
