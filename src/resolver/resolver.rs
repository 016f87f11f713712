//! Name resolution.
//!
//! Declarations are collected in phases over the whole module tree so that
//! items may refer to each other in any order:
//!
//! 1. structs, so every type name is known
//! 2. imports, loading other files through the [`ModuleLoader`]
//! 3. struct members and constructors
//! 4. function signatures and globals
//!
//! Function bodies are walked last. Every variable reference is bound to a
//! local [`VarId`](crate::type_checker::state::VarId) or a global, and every
//! call gets the overloads visible from its call site.

use std::rc::Rc;

use tracing::{debug, info_span, trace};

use crate::{
    ast::{
        expressions::{Binding, Call, Expr, Member, Tok, TokKind},
        items::{FunctionItem, GlobalItem, Item, ModuleAst, ModuleItem, StructItem},
        module::{
            Declarations, Externals, FnForm, FnSig, GlobalDecl, Import, Module, NamedSig, ParamSig,
        },
        statements::{BlockStmt, Stmt},
        types::{Prim, StructDef, Type, TypeName, Value},
    },
    errors::errors::{Error, ErrorImpl},
    type_checker::{state::State, std::Std},
    Position,
};

use super::static_eval::eval_as;

/// Access to the declarations of other files.
pub trait ModuleLoader {
    /// Declarations of the file named `name`, analysing it first if needed.
    fn import(&mut self, name: &str, position: &Position) -> Result<Rc<Declarations>, Error>;
}

/// A loader for a single file, every import fails.
pub struct NoImports;

impl ModuleLoader for NoImports {
    fn import(&mut self, name: &str, position: &Position) -> Result<Rc<Declarations>, Error> {
        Err(Error::new(
            ErrorImpl::UnknownModule {
                module: name.to_string(),
            },
            position.clone(),
        ))
    }
}

/// A module found by path.
#[derive(Debug, Clone)]
enum ModuleRef {
    /// A module of this file, by path below the file root.
    Local(Vec<String>),
    /// A module of another file, by path below that file's root.
    External(Rc<Declarations>, Vec<String>),
}

impl ModuleRef {
    fn is_external(&self) -> bool {
        matches!(self, ModuleRef::External(..))
    }
}

fn split(name: &str) -> Vec<String> {
    name.split('.').map(|part| part.to_string()).collect()
}

fn at(error: ErrorImpl, position: &Position) -> Error {
    Error::new(error, position.clone())
}

pub struct Resolver<'a> {
    std: &'a Std,
    loader: &'a mut dyn ModuleLoader,
    decls: Declarations,
    imports: Vec<Import>,
    externals: Externals,
    state: State,
}

impl<'a> Resolver<'a> {
    pub fn new(file: &str, std: &'a Std, loader: &'a mut dyn ModuleLoader) -> Self {
        Resolver {
            std,
            loader,
            decls: Declarations::new(file.to_string()),
            imports: vec![],
            externals: Externals::default(),
            state: State::new(),
        }
    }

    /// Dotted path of the module at `scope`, used as the prefix of mangled names.
    fn module_path(&self, scope: &[String]) -> String {
        let mut parts = vec![self.decls.path.clone()];
        parts.extend_from_slice(scope);
        parts.join(".")
    }

    fn local_mut(&mut self, scope: &[String]) -> &mut Declarations {
        let mut decls = &mut self.decls;
        for part in scope {
            let path = format!("{}.{}", decls.path, part);
            decls = decls
                .submodules
                .entry(part.clone())
                .or_insert_with(|| Declarations::new(path));
        }
        decls
    }

    fn module_decls<'s>(&'s self, module: &'s ModuleRef) -> Option<&'s Declarations> {
        match module {
            ModuleRef::Local(path) => self.decls.submodule(path),
            ModuleRef::External(root, path) => root.submodule(path),
        }
    }

    /// Loads the file `name` as an import of this module.
    fn load(&mut self, path: Vec<String>, position: &Position) -> Result<Rc<Declarations>, Error> {
        if let Some(existing) = self.imports.iter().find(|import| import.path[0] == path[0]) {
            let root = Rc::clone(&existing.root);
            if !self.imports.iter().any(|import| import.path == path) {
                self.imports.push(Import {
                    path,
                    root: Rc::clone(&root),
                });
            }
            return Ok(root);
        }

        let root = self.loader.import(&path[0], position)?;
        debug!(module = path.join(".").as_str(), "module imported");
        self.imports.push(Import {
            path,
            root: Rc::clone(&root),
        });

        Ok(root)
    }

    /// Finds the module `parts` names, as seen from `scope`.
    ///
    /// Nested modules are tried innermost first, then imports by full path or
    /// by their last segment, and finally a file of that name is loaded.
    fn find_module(
        &mut self,
        parts: &[String],
        scope: &[String],
        position: &Position,
    ) -> Result<ModuleRef, Error> {
        for depth in (0..=scope.len()).rev() {
            let mut path = scope[..depth].to_vec();
            path.extend_from_slice(parts);
            if self.decls.submodule(&path).is_some() {
                return Ok(ModuleRef::Local(path));
            }
        }

        for import in &self.imports {
            if parts.starts_with(&import.path) {
                let mut path = import.path[1..].to_vec();
                path.extend_from_slice(&parts[import.path.len()..]);
                if import.root.submodule(&path).is_some() {
                    return Ok(ModuleRef::External(Rc::clone(&import.root), path));
                }
            }

            if import.path.len() > 1 && import.path.last() == parts.first() {
                let mut path = import.path[1..].to_vec();
                path.extend_from_slice(&parts[1..]);
                if import.root.submodule(&path).is_some() {
                    return Ok(ModuleRef::External(Rc::clone(&import.root), path));
                }
            }
        }

        let unknown = || {
            at(
                ErrorImpl::UnknownModule {
                    module: parts.join("."),
                },
                position,
            )
        };

        if self.imports.iter().any(|import| import.path[0] == parts[0]) {
            return Err(unknown());
        }

        let root = self.load(vec![parts[0].clone()], position)?;
        let path = parts[1..].to_vec();
        if root.submodule(&path).is_none() {
            return Err(unknown());
        }

        Ok(ModuleRef::External(root, path))
    }

    fn check_visible(is_pub: bool, external: bool, name: &str, position: &Position) -> Result<(), Error> {
        if external && !is_pub {
            return Err(at(
                ErrorImpl::PrivateAccess {
                    name: name.to_string(),
                },
                position,
            ));
        }
        Ok(())
    }

    fn resolve_type(&mut self, name: &TypeName, scope: &[String]) -> Result<Type, Error> {
        let position = &name.span.start;
        let unknown = || {
            at(
                ErrorImpl::UnknownType {
                    type_: name.name.clone(),
                },
                position,
            )
        };

        if let Some(prim) = Prim::from_name(&name.name) {
            return match prim {
                Prim::Void => Err(unknown()),
                prim => Ok(Type::from(prim)),
            };
        }

        let parts = split(&name.name);

        if parts.len() == 1 {
            for depth in (0..=scope.len()).rev() {
                let found = self
                    .decls
                    .submodule(&scope[..depth])
                    .and_then(|decls| decls.structs.get(&name.name));
                if let Some(def) = found {
                    return Ok(Type::Struct(Rc::clone(def)));
                }
            }

            let imported = self.imports.iter().find_map(|import| {
                import
                    .decls()
                    .and_then(|decls| decls.structs.get(&name.name))
                    .filter(|def| def.is_pub)
                    .cloned()
            });
            if let Some(def) = imported {
                self.externals.add_struct(&def);
                return Ok(Type::Struct(def));
            }

            return Err(unknown());
        }

        let (last, module) = parts.split_last().ok_or_else(unknown)?;
        let module = self.find_module(module, scope, position)?;
        let def = self
            .module_decls(&module)
            .and_then(|decls| decls.structs.get(last))
            .cloned()
            .ok_or_else(unknown)?;

        Self::check_visible(def.is_pub, module.is_external(), &name.name, position)?;
        if module.is_external() {
            self.externals.add_struct(&def);
        }

        Ok(Type::Struct(def))
    }

    fn resolve_ret(&mut self, ret: Option<&TypeName>, scope: &[String]) -> Result<Type, Error> {
        match ret {
            None => Ok(Type::void()),
            Some(name) if name.name == Prim::Void.name() => Ok(Type::void()),
            Some(name) => self.resolve_type(name, scope),
        }
    }

    /// Folds `extend m { .. }` blocks into the `module m` they extend.
    fn merge_extends(items: &mut Vec<Item>) -> Result<(), Error> {
        let mut merged: Vec<Item> = Vec::with_capacity(items.len());

        for item in items.drain(..) {
            let Item::Module(module) = item else {
                merged.push(item);
                continue;
            };

            let existing = merged.iter_mut().find_map(|item| match item {
                Item::Module(existing) if existing.name == module.name => Some(existing),
                _ => None,
            });

            match existing {
                Some(existing) => existing.items.extend(module.items),
                None if module.is_extend => {
                    return Err(at(
                        ErrorImpl::UnknownModule {
                            module: module.name,
                        },
                        &module.span.start,
                    ));
                }
                None => merged.push(Item::Module(module)),
            }
        }

        for item in merged.iter_mut() {
            if let Item::Module(module) = item {
                Self::merge_extends(&mut module.items)?;
            }
        }

        *items = merged;
        Ok(())
    }

    fn declare_structs(&mut self, items: &mut [Item], scope: &[String]) -> Result<(), Error> {
        let path = self.module_path(scope);
        self.local_mut(scope);

        for item in items {
            match item {
                Item::Struct(item) => {
                    let def = Rc::new(StructDef {
                        name: item.name.clone(),
                        mangled: format!("{}.{}", path, item.name),
                        members: Default::default(),
                        is_pub: item.is_pub,
                    });

                    self.local_mut(scope)
                        .add_struct(Rc::clone(&def))
                        .map_err(|error| at(error, &item.span.start))?;
                    item.def = Some(def);
                }
                Item::Module(module) => {
                    let mut inner = scope.to_vec();
                    inner.push(module.name.clone());
                    self.declare_structs(&mut module.items, &inner)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn declare_imports(&mut self, items: &[Item]) -> Result<(), Error> {
        for item in items {
            match item {
                Item::Import(import) => {
                    for path in &import.paths {
                        let root = self.load(path.clone(), &import.span.start)?;
                        if root.submodule(&path[1..]).is_none() {
                            return Err(at(
                                ErrorImpl::UnknownModule {
                                    module: path.join("."),
                                },
                                &import.span.start,
                            ));
                        }
                    }
                }
                Item::Module(module) => self.declare_imports(&module.items)?,
                _ => {}
            }
        }

        Ok(())
    }

    fn declare_members(&mut self, items: &[Item], scope: &[String]) -> Result<(), Error> {
        let path = self.module_path(scope);

        for item in items {
            match item {
                Item::Struct(item) => self.declare_struct_members(item, scope, &path)?,
                Item::Module(module) => {
                    let mut inner = scope.to_vec();
                    inner.push(module.name.clone());
                    self.declare_members(&module.items, &inner)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Fills in the members of a struct and declares its constructor.
    fn declare_struct_members(
        &mut self,
        item: &StructItem,
        scope: &[String],
        path: &str,
    ) -> Result<(), Error> {
        let Some(def) = &item.def else {
            return Ok(());
        };

        let mut members = vec![];
        for member in &item.members {
            let ty = self.resolve_type(&member.ty, scope)?;
            members.push((member.name.clone(), ty));
        }

        let named = members
            .iter()
            .map(|(name, ty)| NamedSig {
                name: name.clone(),
                ty: ty.clone(),
                default: Value::zero_of(ty),
            })
            .collect();
        *def.members.borrow_mut() = members;

        let index = self.local_mut(scope).next_overload_index(&item.name, 0);
        let constructor = FnSig {
            name: item.name.clone(),
            mangled: format!("{}.{}.0.{}", path, item.name, index),
            params: vec![],
            named,
            ret: Type::Struct(Rc::clone(def)),
            form: FnForm::Constructor,
            is_pub: item.is_pub,
            module: path.to_string(),
            span: item.span.clone(),
        };

        self.local_mut(scope)
            .add_function(Rc::new(constructor))
            .map_err(|error| at(error, &item.span.start))
    }

    fn declare_values(&mut self, items: &mut [Item], scope: &[String]) -> Result<(), Error> {
        for item in items {
            match item {
                Item::Function(function) => self.declare_function(function, scope)?,
                Item::Global(global) => self.declare_global(global, scope)?,
                Item::Module(module) => {
                    let mut inner = scope.to_vec();
                    inner.push(module.name.clone());
                    self.declare_values(&mut module.items, &inner)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn declare_function(&mut self, function: &mut FunctionItem, scope: &[String]) -> Result<(), Error> {
        let path = self.module_path(scope);

        let mut params = vec![];
        for param in &function.params {
            params.push(ParamSig {
                name: param.name.clone(),
                ty: self.resolve_type(&param.ty, scope)?,
            });
        }

        let mut named = vec![];
        for param in &function.named {
            let ty = self.resolve_type(&param.ty, scope)?;
            let default = match &param.default {
                Some(default) => eval_as(default, Some(&ty))
                    .map_err(|error| at(error, &default.span.start))?
                    .0,
                None => Value::zero_of(&ty),
            };
            named.push(NamedSig {
                name: param.name.clone(),
                ty,
                default,
            });
        }

        let ret = self.resolve_ret(function.ret.as_ref(), scope)?;
        let arity = params.len();
        let index = self.local_mut(scope).next_overload_index(&function.name, arity);

        let sig = Rc::new(FnSig {
            name: function.name.clone(),
            mangled: format!("{}.{}.{}.{}", path, function.name, arity, index),
            params,
            named,
            ret,
            form: FnForm::User,
            is_pub: function.is_pub,
            module: path,
            span: function.span.clone(),
        });

        self.local_mut(scope)
            .add_function(Rc::clone(&sig))
            .map_err(|error| at(error, &function.span.start))?;
        trace!(function = sig.mangled.as_str(), "function declared");

        function.sig = Some(sig);
        Ok(())
    }

    fn declare_global(&mut self, global: &mut GlobalItem, scope: &[String]) -> Result<(), Error> {
        let path = self.module_path(scope);

        let declared = match &global.ty {
            Some(ty) => Some(self.resolve_type(ty, scope)?),
            None => None,
        };
        let (value, ty) = eval_as(&global.init, declared.as_ref())
            .map_err(|error| at(error, &global.init.span.start))?;

        let decl = Rc::new(GlobalDecl {
            name: global.name.clone(),
            mangled: format!("{}.{}", path, global.name),
            ty,
            value,
            is_const: global.is_const,
            is_pub: global.is_pub,
            module: path,
        });

        self.local_mut(scope)
            .add_global(Rc::clone(&decl))
            .map_err(|error| at(error, &global.span.start))?;

        global.decl = Some(decl);
        Ok(())
    }

    fn resolve_items(&mut self, items: &mut [Item], scope: &[String]) -> Result<(), Error> {
        for item in items {
            match item {
                Item::Function(function) => self.resolve_function(function, scope)?,
                Item::Module(ModuleItem { name, items, .. }) => {
                    let mut inner = scope.to_vec();
                    inner.push(name.clone());
                    self.resolve_items(items, &inner)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn resolve_function(&mut self, function: &mut FunctionItem, scope: &[String]) -> Result<(), Error> {
        let Some(sig) = function.sig.clone() else {
            return Ok(());
        };

        self.state.enter_scope(function.body.id, false);

        let params = sig
            .params
            .iter()
            .map(|param| (param.name.clone(), param.ty.clone()))
            .chain(sig.named.iter().map(|param| (param.name.clone(), param.ty.clone())));
        for (name, ty) in params {
            self.state
                .declare(&name, ty, true, false, function.span.clone());
        }

        let result = self.resolve_stmts(&mut function.body, scope);
        self.state.exit_scope();
        result
    }

    fn resolve_block(&mut self, block: &mut BlockStmt, is_loop: bool, scope: &[String]) -> Result<(), Error> {
        self.state.enter_scope(block.id, is_loop);
        let result = self.resolve_stmts(block, scope);
        self.state.exit_scope();
        result
    }

    fn resolve_stmts(&mut self, block: &mut BlockStmt, scope: &[String]) -> Result<(), Error> {
        for stmt in block.body.iter_mut() {
            match stmt {
                Stmt::Declaration(decl) => {
                    if let Some(init) = &mut decl.init {
                        self.resolve_expr(init, scope)?;
                    }

                    let ty = match &decl.ty {
                        Some(ty) => self.resolve_type(ty, scope)?,
                        None => Type::any_value(),
                    };
                    let id = self
                        .state
                        .declare(&decl.name, ty, false, decl.hidden, decl.span.clone());
                    decl.var = Some(id);
                }
                Stmt::Assignment(assign) => {
                    self.resolve_expr(&mut assign.value, scope)?;

                    let (binding, members) =
                        self.resolve_variable(&assign.target, scope, &assign.span.start)?;
                    assign.binding = Some(binding);
                    assign.members = members
                        .into_iter()
                        .map(|name| Member { name, index: None })
                        .collect();
                }
                Stmt::Expression(stmt) => self.resolve_expr(&mut stmt.expr, scope)?,
                Stmt::Return(ret) => {
                    if let Some(value) = &mut ret.value {
                        self.resolve_expr(value, scope)?;
                    }
                }
                Stmt::If(if_stmt) => {
                    for condition in if_stmt.conditions.iter_mut() {
                        self.resolve_expr(condition, scope)?;
                    }
                    for inner in if_stmt.blocks.iter_mut() {
                        self.resolve_block(inner, false, scope)?;
                    }
                }
                Stmt::While(while_stmt) => {
                    self.resolve_expr(&mut while_stmt.condition, scope)?;
                    self.resolve_block(&mut while_stmt.body, true, scope)?;
                }
                Stmt::Break(_) | Stmt::Continue(_) => {}
            }
        }

        Ok(())
    }

    fn resolve_expr(&mut self, expr: &mut Expr, scope: &[String]) -> Result<(), Error> {
        let toks = std::mem::take(&mut expr.toks);
        let mut resolved = Vec::with_capacity(toks.len());

        for mut tok in toks {
            let position = tok.span.start.clone();

            match &mut tok.kind {
                TokKind::Var(var) => {
                    let (binding, members) = self.resolve_variable(&var.name, scope, &position)?;
                    if !members.is_empty() {
                        let parts = split(&var.name);
                        var.name = parts[..parts.len() - members.len()].join(".");
                    }
                    var.binding = Some(binding);

                    let span = tok.span.clone();
                    resolved.push(tok);
                    for member in members {
                        resolved.push(Tok::member(member, span.clone()));
                    }
                }
                TokKind::Call(call) => {
                    self.resolve_call(call, scope, &position)?;
                    resolved.push(tok);
                }
                _ => resolved.push(tok),
            }
        }

        expr.toks = resolved;
        Ok(())
    }

    /// Binds a possibly dotted name, returning the binding and the trailing member names.
    fn resolve_variable(
        &mut self,
        name: &str,
        scope: &[String],
        position: &Position,
    ) -> Result<(Binding, Vec<String>), Error> {
        let parts = split(name);

        if let Some(id) = self.state.lookup(&parts[0]) {
            return Ok((Binding::Local(id), parts[1..].to_vec()));
        }

        if let Some(global) = self.find_global(&parts, scope, position)? {
            return Ok(global);
        }

        Err(at(
            ErrorImpl::VariableNotDeclared {
                variable: name.to_string(),
            },
            position,
        ))
    }

    fn find_global(
        &mut self,
        parts: &[String],
        scope: &[String],
        position: &Position,
    ) -> Result<Option<(Binding, Vec<String>)>, Error> {
        for depth in (0..=scope.len()).rev() {
            let found = self
                .decls
                .submodule(&scope[..depth])
                .and_then(|decls| decls.globals.get(&parts[0]))
                .cloned();
            if let Some(global) = found {
                return Ok(Some((Binding::Global(global), parts[1..].to_vec())));
            }
        }

        let imported = self.imports.iter().find_map(|import| {
            import
                .decls()
                .and_then(|decls| decls.globals.get(&parts[0]))
                .filter(|global| global.is_pub)
                .cloned()
        });
        if let Some(global) = imported {
            self.externals.add_global(&global);
            return Ok(Some((Binding::Global(global), parts[1..].to_vec())));
        }

        for k in 1..parts.len() {
            let module = match self.find_module(&parts[..k], scope, position) {
                Ok(module) => module,
                Err(error) if k == 1 => return Err(error),
                Err(_) => break,
            };

            let found = self
                .module_decls(&module)
                .and_then(|decls| decls.globals.get(&parts[k]))
                .cloned();
            if let Some(global) = found {
                let name = parts[..=k].join(".");
                Self::check_visible(global.is_pub, module.is_external(), &name, position)?;
                if module.is_external() {
                    self.externals.add_global(&global);
                }
                return Ok(Some((Binding::Global(global), parts[k + 1..].to_vec())));
            }
        }

        Ok(None)
    }

    /// Sets the overloads a call may bind to.
    fn resolve_call(&mut self, call: &mut Call, scope: &[String], position: &Position) -> Result<(), Error> {
        if call.is_operator {
            call.candidates = self.std.operators(&call.name, call.arity).to_vec();
            if call.candidates.is_empty() {
                return Err(at(
                    ErrorImpl::UnknownFunction {
                        function: call.name.clone(),
                        arity: call.arity,
                    },
                    position,
                ));
            }
            return Ok(());
        }

        let parts = split(&call.name);
        let (candidates, external) = match parts.split_last() {
            Some((_, [])) | None => self.unqualified_overloads(&call.name, call.arity, scope),
            Some((last, module)) => {
                let module = self.find_module(module, scope, position)?;
                let candidates = self
                    .module_decls(&module)
                    .map(|decls| decls.overloads(last, call.arity).to_vec())
                    .unwrap_or_default();
                (candidates, module.is_external())
            }
        };

        if candidates.is_empty() {
            return Err(at(
                ErrorImpl::UnknownFunction {
                    function: call.name.clone(),
                    arity: call.arity,
                },
                position,
            ));
        }

        let visible: Vec<Rc<FnSig>> = candidates
            .into_iter()
            .filter(|candidate| !external || candidate.is_pub)
            .collect();
        if visible.is_empty() {
            return Err(at(
                ErrorImpl::PrivateAccess {
                    name: call.name.clone(),
                },
                position,
            ));
        }

        let accepting: Vec<Rc<FnSig>> = visible
            .iter()
            .filter(|candidate| candidate.param_types_for(&call.named).is_some())
            .cloned()
            .collect();
        if accepting.is_empty() {
            let unknown = call
                .named
                .iter()
                .find(|name| visible[0].named_param(name).is_none())
                .cloned()
                .unwrap_or_default();
            return Err(at(
                ErrorImpl::UnknownNamedParameter {
                    function: call.name.clone(),
                    name: unknown,
                },
                position,
            ));
        }

        if external {
            for candidate in &accepting {
                self.externals.add_function(candidate);
            }
        }

        call.candidates = accepting;
        Ok(())
    }

    /// Overloads of an unqualified name: the innermost enclosing module declaring
    /// any, otherwise the public ones of every import.
    fn unqualified_overloads(&self, name: &str, arity: usize, scope: &[String]) -> (Vec<Rc<FnSig>>, bool) {
        for depth in (0..=scope.len()).rev() {
            let found = self
                .decls
                .submodule(&scope[..depth])
                .map(|decls| decls.overloads(name, arity))
                .unwrap_or(&[]);
            if !found.is_empty() {
                return (found.to_vec(), false);
            }
        }

        let imported = self
            .imports
            .iter()
            .filter_map(|import| import.decls())
            .flat_map(|decls| decls.overloads(name, arity).iter().cloned())
            .filter(|sig| sig.is_pub)
            .fold(Vec::<Rc<FnSig>>::new(), |mut all, sig| {
                if !all.iter().any(|existing| existing.mangled == sig.mangled) {
                    all.push(sig);
                }
                all
            });

        (imported, true)
    }
}

/// Resolves every name of `ast`, producing a module ready for type checking.
pub fn resolve(
    mut ast: ModuleAst,
    std: &Std,
    loader: &mut dyn ModuleLoader,
) -> Result<Module, Error> {
    let _span = info_span!("pipeline.resolve", file = ast.name.as_str()).entered();

    let mut resolver = Resolver::new(&ast.name, std, loader);

    Resolver::merge_extends(&mut ast.items)?;
    resolver.declare_structs(&mut ast.items, &[])?;
    resolver.declare_imports(&ast.items)?;
    resolver.declare_members(&ast.items, &[])?;
    resolver.declare_values(&mut ast.items, &[])?;
    resolver.resolve_items(&mut ast.items, &[])?;

    debug!(
        functions = resolver.decls.all_functions().len(),
        imports = resolver.imports.len(),
        variables = resolver.state.vars().len(),
        "names resolved"
    );

    Ok(Module {
        ast,
        decls: Rc::new(resolver.decls),
        imports: resolver.imports,
        externals: resolver.externals,
        state: resolver.state,
    })
}
