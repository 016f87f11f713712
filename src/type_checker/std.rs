//! Built-in operator and cast functions.
//!
//! Operators are ordinary overloaded functions named after their symbol, so
//! `a + b` resolves through the same overload machinery as a user call.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{
        module::{FnForm, FnSig, ParamSig},
        types::{Prim, Type, ALL_PRIMS},
    },
    Span,
};

const ARITHMETIC: [&str; 5] = ["+", "-", "*", "/", "%"];
const BITWISE: [&str; 3] = ["&", "|", "^"];
const SHIFTS: [&str; 2] = ["<<", ">>"];
const ORDERING: [&str; 4] = ["<", "<=", ">", ">="];
const EQUALITY: [&str; 2] = ["==", "!="];
const LOGICAL: [&str; 2] = ["&&", "||"];

/// Whether an operator yields `Bool` regardless of its operand types.
pub fn is_comparison(name: &str) -> bool {
    ORDERING.contains(&name) || EQUALITY.contains(&name)
}

/// Whether a value of `from` may be passed where `to` is expected without an explicit conversion.
pub fn can_cast(from: Prim, to: Prim) -> bool {
    if from == to {
        return false;
    }

    let same_signedness = (from.is_signed() && to.is_signed()) || (from.is_unsigned() && to.is_unsigned());
    if same_signedness || (from.is_unsigned() && to.is_signed()) {
        return to.width() > from.width();
    }

    from == Prim::F32 && to == Prim::F64
}

#[derive(Debug)]
pub struct Std {
    operators: HashMap<(String, usize), Vec<Rc<FnSig>>>,
    casts: HashMap<(Prim, Prim), Rc<FnSig>>,
}

impl Default for Std {
    fn default() -> Self {
        Self::new()
    }
}

impl Std {
    pub fn new() -> Self {
        let mut std = Std {
            operators: HashMap::new(),
            casts: HashMap::new(),
        };

        for prim in ALL_PRIMS {
            if prim.is_int() {
                std.add_all(&ARITHMETIC, prim, prim);
                std.add_all(&BITWISE, prim, prim);
                std.add_all(&SHIFTS, prim, prim);
                std.add_all(&ORDERING, prim, Prim::Bool);
                std.add_all(&EQUALITY, prim, Prim::Bool);
                std.add_unary("/", prim);
                if prim.is_signed() {
                    std.add_unary("-", prim);
                }
            } else if prim.is_float() {
                std.add_all(&ARITHMETIC, prim, prim);
                std.add_all(&ORDERING, prim, Prim::Bool);
                std.add_all(&EQUALITY, prim, Prim::Bool);
                std.add_unary("/", prim);
                std.add_unary("-", prim);
            } else if prim == Prim::Bool {
                std.add_all(&BITWISE, prim, prim);
                std.add_all(&EQUALITY, prim, prim);
                std.add_all(&LOGICAL, prim, prim);
                std.add_unary("!", prim);
            }
        }

        for from in ALL_PRIMS {
            for to in ALL_PRIMS {
                if can_cast(from, to) {
                    std.add_cast(from, to);
                }
            }
        }

        std
    }

    fn add_all(&mut self, symbols: &[&str], operand: Prim, ret: Prim) {
        for symbol in symbols {
            self.add_operator(symbol, &[operand, operand], ret);
        }
    }

    fn add_unary(&mut self, symbol: &str, operand: Prim) {
        self.add_operator(symbol, &[operand], operand);
    }

    fn add_operator(&mut self, symbol: &str, operands: &[Prim], ret: Prim) {
        let bucket = self
            .operators
            .entry((symbol.to_string(), operands.len()))
            .or_default();

        let params = operands
            .iter()
            .enumerate()
            .map(|(i, prim)| ParamSig {
                name: format!("arg{}", i),
                ty: Type::from(*prim),
            })
            .collect();

        bucket.push(Rc::new(FnSig {
            name: symbol.to_string(),
            mangled: format!("std.{}.{}.{}", symbol, operands.len(), bucket.len()),
            params,
            named: vec![],
            ret: Type::from(ret),
            form: FnForm::Operator,
            is_pub: true,
            module: String::new(),
            span: Span::null(),
        }));
    }

    fn add_cast(&mut self, from: Prim, to: Prim) {
        let sig = FnSig {
            name: to.name().to_string(),
            mangled: format!("std.cast.{}.{}", from.name(), to.name()),
            params: vec![ParamSig {
                name: String::from("value"),
                ty: Type::from(from),
            }],
            named: vec![],
            ret: Type::from(to),
            form: FnForm::Cast,
            is_pub: true,
            module: String::new(),
            span: Span::null(),
        };

        self.casts.insert((from, to), Rc::new(sig));
    }

    /// Built-in overloads of the operator `symbol` taking `arity` operands.
    pub fn operators(&self, symbol: &str, arity: usize) -> &[Rc<FnSig>] {
        self.operators
            .get(&(symbol.to_string(), arity))
            .map(|bucket| bucket.as_slice())
            .unwrap_or(&[])
    }

    pub fn cast(&self, from: Prim, to: Prim) -> Option<&Rc<FnSig>> {
        self.casts.get(&(from, to))
    }
}
