//! Resolved declarations of a module.
//!
//! [`Declarations`] is what other modules see when they import a file: the
//! function overload buckets, globals, structs and nested submodules. A
//! [`Module`] pairs that interface with the analysed syntax tree handed to
//! code generation.

use std::{collections::HashMap, rc::Rc};

use crate::{errors::errors::ErrorImpl, type_checker::state::State, Span};

use super::{
    items::ModuleAst,
    types::{StructDef, Type, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnForm {
    User,
    Operator,
    Cast,
    Constructor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSig {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedSig {
    pub name: String,
    pub ty: Type,
    pub default: Value,
}

#[derive(Debug)]
pub struct FnSig {
    pub name: String,
    /// `module.path.name.arity.index`, unique across the program.
    pub mangled: String,
    pub params: Vec<ParamSig>,
    pub named: Vec<NamedSig>,
    pub ret: Type,
    pub form: FnForm,
    pub is_pub: bool,
    /// Dotted path of the declaring module, empty for built-ins.
    pub module: String,
    pub span: Span,
}

impl FnSig {
    pub fn named_param(&self, name: &str) -> Option<(usize, &NamedSig)> {
        self.named
            .iter()
            .enumerate()
            .find(|(_, param)| param.name == name)
    }

    /// Parameter types matching a call with these named arguments, `None` if a name is unknown.
    pub fn param_types_for(&self, named: &[String]) -> Option<Vec<Type>> {
        let mut types: Vec<Type> = self.params.iter().map(|param| param.ty.clone()).collect();

        for name in named {
            let (_, param) = self.named_param(name)?;
            types.push(param.ty.clone());
        }

        Some(types)
    }

    pub fn same_signature(&self, other: &FnSig) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(a, b)| a.ty == b.ty)
    }

    pub fn describe(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({}): {}", self.name, params.join(", "), self.ret)
    }
}

#[derive(Debug)]
pub struct GlobalDecl {
    pub name: String,
    pub mangled: String,
    pub ty: Type,
    pub value: Value,
    pub is_const: bool,
    pub is_pub: bool,
    pub module: String,
}

/// Everything a module declares, keyed for lookup.
#[derive(Debug, Default)]
pub struct Declarations {
    pub path: String,
    pub functions: HashMap<(String, usize), Vec<Rc<FnSig>>>,
    pub globals: HashMap<String, Rc<GlobalDecl>>,
    pub structs: HashMap<String, Rc<StructDef>>,
    pub submodules: HashMap<String, Declarations>,
}

impl Declarations {
    pub fn new(path: String) -> Self {
        Declarations {
            path,
            ..Default::default()
        }
    }

    pub fn overloads(&self, name: &str, arity: usize) -> &[Rc<FnSig>] {
        self.functions
            .get(&(name.to_string(), arity))
            .map(|bucket| bucket.as_slice())
            .unwrap_or(&[])
    }

    /// Overload index the next function of this name and arity will get.
    pub fn next_overload_index(&self, name: &str, arity: usize) -> usize {
        self.overloads(name, arity).len()
    }

    pub fn add_function(&mut self, sig: Rc<FnSig>) -> Result<(), ErrorImpl> {
        let key = (sig.name.clone(), sig.params.len());
        let bucket = self.functions.entry(key).or_default();

        if bucket.iter().any(|existing| existing.same_signature(&sig)) {
            return Err(ErrorImpl::FunctionAlreadyDeclared {
                function: sig.describe(),
            });
        }

        bucket.push(sig);
        Ok(())
    }

    pub fn add_global(&mut self, global: Rc<GlobalDecl>) -> Result<(), ErrorImpl> {
        if self.globals.contains_key(&global.name) {
            return Err(ErrorImpl::GlobalAlreadyDeclared {
                global: global.name.clone(),
            });
        }

        self.globals.insert(global.name.clone(), global);
        Ok(())
    }

    pub fn add_struct(&mut self, def: Rc<StructDef>) -> Result<(), ErrorImpl> {
        if self.structs.contains_key(&def.name) {
            return Err(ErrorImpl::StructAlreadyDeclared {
                name: def.name.clone(),
            });
        }

        self.structs.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn submodule(&self, path: &[String]) -> Option<&Declarations> {
        path.iter()
            .try_fold(self, |decls, part| decls.submodules.get(part))
    }

    /// Every function declared here and in nested submodules.
    pub fn all_functions(&self) -> Vec<Rc<FnSig>> {
        let mut functions: Vec<Rc<FnSig>> = self.functions.values().flatten().cloned().collect();
        functions.sort_by(|a, b| a.mangled.cmp(&b.mangled));

        let mut names: Vec<&String> = self.submodules.keys().collect();
        names.sort();
        for name in names {
            functions.extend(self.submodules[name].all_functions());
        }

        functions
    }
}

/// An imported module: the file's declarations plus the path written in the import.
#[derive(Debug, Clone)]
pub struct Import {
    pub path: Vec<String>,
    pub root: Rc<Declarations>,
}

impl Import {
    pub fn decls(&self) -> Option<&Declarations> {
        self.root.submodule(&self.path[1..])
    }
}

/// Items from other files referenced by this module, for the backend to declare.
#[derive(Debug, Default)]
pub struct Externals {
    pub functions: Vec<Rc<FnSig>>,
    pub globals: Vec<Rc<GlobalDecl>>,
    pub structs: Vec<Rc<StructDef>>,
}

impl Externals {
    pub fn add_function(&mut self, sig: &Rc<FnSig>) {
        if !self.functions.iter().any(|f| f.mangled == sig.mangled) {
            self.functions.push(Rc::clone(sig));
        }
    }

    pub fn add_global(&mut self, global: &Rc<GlobalDecl>) {
        if !self.globals.iter().any(|g| g.mangled == global.mangled) {
            self.globals.push(Rc::clone(global));
        }
    }

    pub fn add_struct(&mut self, def: &Rc<StructDef>) {
        if !self.structs.iter().any(|s| s.mangled == def.mangled) {
            self.structs.push(Rc::clone(def));
        }
    }
}

/// A fully analysed source file.
#[derive(Debug)]
pub struct Module {
    pub ast: ModuleAst,
    pub decls: Rc<Declarations>,
    pub imports: Vec<Import>,
    pub externals: Externals,
    /// Scope tree and variable arena the syntax tree's `VarId`s point into.
    pub state: State,
}
