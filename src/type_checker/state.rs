//! Scope tree and variable arena shared by every pass over a module.
//!
//! Each block gets one [`Scope`], created the first time a pass enters it and
//! found again by block id afterwards. Later passes re-enter the same scopes and
//! re-declare the same variables in the same order, so a declaration maps to
//! the same [`VarId`] every time.

use std::collections::HashMap;

use crate::{ast::types::Type, Span};

/// Index of a variable in the [`State`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub usize);

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub is_param: bool,
    /// Compiler-made temporary.
    pub hidden: bool,
    pub span: Span,
}

#[derive(Debug)]
struct Slot {
    /// Index into `vars` of the declaration currently in view, `-1` before the first.
    version: i32,
    vars: Vec<VarId>,
}

impl Default for Slot {
    fn default() -> Self {
        Slot {
            version: -1,
            vars: vec![],
        }
    }
}

#[derive(Debug)]
pub struct Scope {
    parent: Option<usize>,
    block: u32,
    names: HashMap<String, Slot>,
    children: HashMap<u32, usize>,
    is_loop: bool,
}

#[derive(Debug, Default)]
pub struct State {
    vars: Vec<Variable>,
    scopes: Vec<Scope>,
    roots: HashMap<u32, usize>,
    current: Option<usize>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the scope of `block`, creating it on first entry.
    ///
    /// Re-entering hides every local again until it is re-declared; parameters stay visible.
    pub fn enter_scope(&mut self, block: u32, is_loop: bool) {
        let existing = match self.current {
            Some(current) => self.scopes[current].children.get(&block).copied(),
            None => self.roots.get(&block).copied(),
        };

        let index = match existing {
            Some(index) => {
                let vars = &self.vars;
                for slot in self.scopes[index].names.values_mut() {
                    let is_param = slot
                        .vars
                        .first()
                        .map(|id| vars[id.0].is_param)
                        .unwrap_or(false);
                    slot.version = if is_param { 0 } else { -1 };
                }
                index
            }
            None => {
                let index = self.scopes.len();
                self.scopes.push(Scope {
                    parent: self.current,
                    block,
                    names: HashMap::new(),
                    children: HashMap::new(),
                    is_loop,
                });

                match self.current {
                    Some(current) => {
                        self.scopes[current].children.insert(block, index);
                    }
                    None => {
                        self.roots.insert(block, index);
                    }
                }
                index
            }
        };

        self.current = Some(index);
    }

    pub fn exit_scope(&mut self) {
        self.current = self
            .current
            .and_then(|current| self.scopes[current].parent);
    }

    /// Declares `name` in the current scope, shadowing any earlier declaration.
    ///
    /// On a repeated walk the variable made by the first walk is handed back.
    pub fn declare(&mut self, name: &str, ty: Type, is_param: bool, hidden: bool, span: Span) -> VarId {
        let Some(current) = self.current else {
            let id = VarId(self.vars.len());
            self.vars.push(Variable {
                name: name.to_string(),
                ty,
                is_param,
                hidden,
                span,
            });
            return id;
        };

        let slot = self.scopes[current]
            .names
            .entry(name.to_string())
            .or_default();

        if is_param && slot.version == 0 && !slot.vars.is_empty() {
            return slot.vars[0];
        }

        slot.version += 1;
        let version = slot.version as usize;

        if let Some(id) = slot.vars.get(version) {
            return *id;
        }

        let id = VarId(self.vars.len());
        slot.vars.push(id);
        self.vars.push(Variable {
            name: name.to_string(),
            ty,
            is_param,
            hidden,
            span,
        });

        id
    }

    /// Finds the declaration of `name` visible from the current scope.
    pub fn lookup(&self, name: &str) -> Option<VarId> {
        let mut scope = self.current;

        while let Some(index) = scope {
            let current = &self.scopes[index];
            if let Some(slot) = current.names.get(name) {
                if slot.version >= 0 {
                    return slot.vars.get(slot.version as usize).copied();
                }
            }
            scope = current.parent;
        }

        None
    }

    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id.0]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut Variable {
        &mut self.vars[id.0]
    }

    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    /// Block id of the `amount`-th enclosing loop, counting from 1.
    pub fn get_loop(&self, amount: usize) -> Option<u32> {
        if amount == 0 {
            return None;
        }

        let mut seen = 0;
        let mut scope = self.current;

        while let Some(index) = scope {
            let current = &self.scopes[index];
            if current.is_loop {
                seen += 1;
                if seen == amount {
                    return Some(current.block);
                }
            }
            scope = current.parent;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::Prim;

    #[test]
    fn test_redeclaring_on_second_walk_reuses_variables() {
        let mut state = State::new();

        state.enter_scope(1, false);
        let param = state.declare("x", Type::from(Prim::I32), true, false, Span::null());
        assert_eq!(state.lookup("x"), Some(param));
        let local = state.declare("x", Type::from(Prim::F64), false, false, Span::null());
        assert_eq!(state.lookup("x"), Some(local));
        state.exit_scope();

        state.enter_scope(1, false);
        assert_eq!(state.lookup("x"), Some(param));
        assert_eq!(state.declare("x", Type::any_value(), true, false, Span::null()), param);
        assert_eq!(state.declare("x", Type::any_value(), false, false, Span::null()), local);
        state.exit_scope();

        assert_eq!(state.vars().len(), 2);
        assert_eq!(state.var(local).ty, Type::from(Prim::F64));
    }

    #[test]
    fn test_locals_hidden_until_redeclared() {
        let mut state = State::new();

        state.enter_scope(1, false);
        state.declare("y", Type::bool(), false, false, Span::null());
        state.exit_scope();

        state.enter_scope(1, false);
        assert_eq!(state.lookup("y"), None);
        state.exit_scope();
    }

    #[test]
    fn test_loops() {
        let mut state = State::new();

        state.enter_scope(1, false);
        state.enter_scope(2, true);
        state.enter_scope(3, false);
        state.enter_scope(4, true);

        assert_eq!(state.get_loop(1), Some(4));
        assert_eq!(state.get_loop(2), Some(2));
        assert_eq!(state.get_loop(3), None);
        assert_eq!(state.get_loop(0), None);
    }
}
