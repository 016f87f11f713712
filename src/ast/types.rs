//! Type system definitions for the AST.
//!
//! Types form a lattice over sets of primitives:
//!
//! - A singleton set is a resolved primitive type
//! - A larger set is an *incomplete* type, every primitive the value could
//!   still become (used for unsuffixed literals and anything derived from them)
//! - The empty set never escapes: `merge` reports it as `None`
//!
//! Struct types sit outside the lattice and only merge with themselves.

use std::{cell::RefCell, fmt::Display, rc::Rc};

use bitflags::bitflags;

use crate::{lexer::tokens::Suffix, Span};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PrimSet: u16 {
        const VOID = 1 << 0;
        const BOOL = 1 << 1;
        const I8 = 1 << 2;
        const I16 = 1 << 3;
        const I32 = 1 << 4;
        const I64 = 1 << 5;
        const IPTR = 1 << 6;
        const U8 = 1 << 7;
        const U16 = 1 << 8;
        const U32 = 1 << 9;
        const U64 = 1 << 10;
        const UPTR = 1 << 11;
        const F32 = 1 << 12;
        const F64 = 1 << 13;

        const SIGNED = Self::I8.bits() | Self::I16.bits() | Self::I32.bits() | Self::I64.bits() | Self::IPTR.bits();
        const UNSIGNED = Self::U8.bits() | Self::U16.bits() | Self::U32.bits() | Self::U64.bits() | Self::UPTR.bits();
        const INTS = Self::SIGNED.bits() | Self::UNSIGNED.bits();
        const FLOATS = Self::F32.bits() | Self::F64.bits();
        const NUMERIC = Self::INTS.bits() | Self::FLOATS.bits();
        /// Every value type, the starting point of an untyped hidden temporary.
        const VALUES = Self::BOOL.bits() | Self::NUMERIC.bits();
    }
}

/// A single primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prim {
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    IPtr,
    U8,
    U16,
    U32,
    U64,
    UPtr,
    F32,
    F64,
}

pub const ALL_PRIMS: [Prim; 14] = [
    Prim::Void,
    Prim::Bool,
    Prim::I8,
    Prim::I16,
    Prim::I32,
    Prim::I64,
    Prim::IPtr,
    Prim::U8,
    Prim::U16,
    Prim::U32,
    Prim::U64,
    Prim::UPtr,
    Prim::F32,
    Prim::F64,
];

/// Order in which `complete` picks a default out of an ambiguous set.
const COMPLETION_ORDER: [Prim; 12] = [
    Prim::I32,
    Prim::F64,
    Prim::U32,
    Prim::I64,
    Prim::U64,
    Prim::F32,
    Prim::IPtr,
    Prim::UPtr,
    Prim::I16,
    Prim::U16,
    Prim::I8,
    Prim::U8,
];

impl Prim {
    pub fn flag(&self) -> PrimSet {
        match self {
            Prim::Void => PrimSet::VOID,
            Prim::Bool => PrimSet::BOOL,
            Prim::I8 => PrimSet::I8,
            Prim::I16 => PrimSet::I16,
            Prim::I32 => PrimSet::I32,
            Prim::I64 => PrimSet::I64,
            Prim::IPtr => PrimSet::IPTR,
            Prim::U8 => PrimSet::U8,
            Prim::U16 => PrimSet::U16,
            Prim::U32 => PrimSet::U32,
            Prim::U64 => PrimSet::U64,
            Prim::UPtr => PrimSet::UPTR,
            Prim::F32 => PrimSet::F32,
            Prim::F64 => PrimSet::F64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Prim::Void => "Void",
            Prim::Bool => "Bool",
            Prim::I8 => "I8",
            Prim::I16 => "I16",
            Prim::I32 => "I32",
            Prim::I64 => "I64",
            Prim::IPtr => "IPtr",
            Prim::U8 => "U8",
            Prim::U16 => "U16",
            Prim::U32 => "U32",
            Prim::U64 => "U64",
            Prim::UPtr => "UPtr",
            Prim::F32 => "F32",
            Prim::F64 => "F64",
        }
    }

    pub fn from_name(name: &str) -> Option<Prim> {
        ALL_PRIMS.iter().copied().find(|prim| prim.name() == name)
    }

    /// Width in bits, pointer-sized integers count as 64.
    pub fn width(&self) -> u32 {
        match self {
            Prim::Void => 0,
            Prim::Bool => 1,
            Prim::I8 | Prim::U8 => 8,
            Prim::I16 | Prim::U16 => 16,
            Prim::I32 | Prim::U32 | Prim::F32 => 32,
            Prim::I64 | Prim::U64 | Prim::F64 | Prim::IPtr | Prim::UPtr => 64,
        }
    }

    pub fn is_signed(&self) -> bool {
        PrimSet::SIGNED.contains(self.flag())
    }

    pub fn is_unsigned(&self) -> bool {
        PrimSet::UNSIGNED.contains(self.flag())
    }

    pub fn is_int(&self) -> bool {
        PrimSet::INTS.contains(self.flag())
    }

    pub fn is_float(&self) -> bool {
        PrimSet::FLOATS.contains(self.flag())
    }

    /// Generality used to break ties between two equally cheap operator overloads.
    pub fn generality(&self) -> (u32, bool, bool) {
        (self.width(), self.is_float(), self.is_signed())
    }

    /// Single-character tag used by the build sidecar.
    pub fn tag(&self) -> u8 {
        match self {
            Prim::Void => b'v',
            Prim::Bool => b'b',
            Prim::I8 => b'1',
            Prim::I16 => b'2',
            Prim::I32 => b'i',
            Prim::I64 => b'8',
            Prim::IPtr => b'p',
            Prim::U8 => b'B',
            Prim::U16 => b'S',
            Prim::U32 => b'U',
            Prim::U64 => b'L',
            Prim::UPtr => b'u',
            Prim::F32 => b'f',
            Prim::F64 => b'd',
        }
    }

    pub fn from_tag(tag: u8) -> Option<Prim> {
        ALL_PRIMS.iter().copied().find(|prim| prim.tag() == tag)
    }
}

impl PrimSet {
    pub fn prims(&self) -> impl Iterator<Item = Prim> + '_ {
        ALL_PRIMS
            .iter()
            .copied()
            .filter(move |prim| self.contains(prim.flag()))
    }

    pub fn single(&self) -> Option<Prim> {
        if self.bits().count_ones() == 1 {
            self.prims().next()
        } else {
            None
        }
    }
}

/// A named struct, members are filled in once every struct of the module is known.
#[derive(Default)]
pub struct StructDef {
    pub name: String,
    pub mangled: String,
    pub members: RefCell<Vec<(String, Type)>>,
    pub is_pub: bool,
}

impl StructDef {
    pub fn member(&self, name: &str) -> Option<(usize, Type)> {
        self.members
            .borrow()
            .iter()
            .enumerate()
            .find(|(_, (member, _))| member == name)
            .map(|(index, (_, ty))| (index, ty.clone()))
    }
}

impl std::fmt::Debug for StructDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "struct {}", self.mangled)
    }
}

#[derive(Debug, Clone)]
pub enum Type {
    Prim(PrimSet),
    Struct(Rc<StructDef>),
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Prim(a), Type::Prim(b)) => a == b,
            (Type::Struct(a), Type::Struct(b)) => Rc::ptr_eq(a, b) || a.mangled == b.mangled,
            _ => false,
        }
    }
}

impl From<Prim> for Type {
    fn from(prim: Prim) -> Self {
        Type::Prim(prim.flag())
    }
}

impl Type {
    pub fn void() -> Self {
        Type::from(Prim::Void)
    }

    pub fn bool() -> Self {
        Type::from(Prim::Bool)
    }

    /// The still-unconstrained type of a value that could be anything.
    pub fn any_value() -> Self {
        Type::Prim(PrimSet::VALUES)
    }

    /// Initial type of a numeric literal carrying `suffix`.
    pub fn from_suffix(suffix: Suffix, is_float: bool) -> Self {
        let set = match suffix {
            Suffix::Unspecified if is_float => PrimSet::FLOATS,
            Suffix::Unspecified => PrimSet::NUMERIC,
            Suffix::I8 => PrimSet::I8,
            Suffix::I16 => PrimSet::I16,
            Suffix::I32 => PrimSet::I32,
            Suffix::I64 => PrimSet::I64,
            Suffix::Signed => PrimSet::SIGNED,
            Suffix::U8 => PrimSet::U8,
            Suffix::U16 => PrimSet::U16,
            Suffix::U32 => PrimSet::U32,
            Suffix::U64 => PrimSet::U64,
            Suffix::Unsigned => PrimSet::UNSIGNED,
            Suffix::F32 => PrimSet::F32,
            Suffix::F64 => PrimSet::F64,
            Suffix::Float => PrimSet::FLOATS,
        };

        Type::Prim(set)
    }

    pub fn prim(&self) -> Option<Prim> {
        match self {
            Type::Prim(set) => set.single(),
            Type::Struct(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Type::Prim(set) => set.single().is_some(),
            Type::Struct(_) => true,
        }
    }

    pub fn is_void(&self) -> bool {
        self.prim() == Some(Prim::Void)
    }

    /// Whether a value of this type may still become `other`.
    pub fn contains(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Prim(a), Type::Prim(b)) => !b.is_empty() && a.contains(*b),
            (Type::Struct(_), Type::Struct(_)) => self == other,
            _ => false,
        }
    }

    /// Intersection of the two types, `None` when they have nothing in common.
    pub fn merge(&self, other: &Type) -> Option<Type> {
        match (self, other) {
            (Type::Prim(a), Type::Prim(b)) => {
                let merged = *a & *b;
                if merged.is_empty() {
                    None
                } else {
                    Some(Type::Prim(merged))
                }
            }
            (Type::Struct(_), Type::Struct(_)) if self == other => Some(self.clone()),
            _ => None,
        }
    }

    /// Union of the two types, `None` when a struct is involved.
    pub fn union(&self, other: &Type) -> Option<Type> {
        match (self, other) {
            (Type::Prim(a), Type::Prim(b)) => Some(Type::Prim(*a | *b)),
            (Type::Struct(_), Type::Struct(_)) if self == other => Some(self.clone()),
            _ => None,
        }
    }

    /// Resolves an ambiguous set to its default member.
    ///
    /// Integer-capable sets become `I32`, float-only sets become `F64`; a set
    /// still mixing `Bool` with other types cannot be completed.
    pub fn complete(&self) -> Option<Type> {
        match self {
            Type::Struct(_) => Some(self.clone()),
            Type::Prim(set) => {
                if let Some(prim) = set.single() {
                    return Some(Type::from(prim));
                }
                if set.contains(PrimSet::BOOL) || set.contains(PrimSet::VOID) || set.is_empty() {
                    return None;
                }
                COMPLETION_ORDER
                    .iter()
                    .find(|prim| set.contains(prim.flag()))
                    .map(|prim| Type::from(*prim))
            }
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Struct(def) => write!(f, "{}", def.name),
            Type::Prim(set) => {
                if let Some(prim) = set.single() {
                    return write!(f, "{}", prim.name());
                }
                let names: Vec<&str> = set.prims().map(|prim| prim.name()).collect();
                write!(f, "{{{}}}", names.join("|"))
            }
        }
    }
}

/// A type as written in source, `I32` or `geometry.Point`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    pub name: String,
    pub span: Span,
}

/// A compile-time constant, produced by static evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i128),
    Float(f64),
    Struct(Vec<Value>),
}

impl Value {
    /// The zero value of a complete type.
    pub fn zero_of(ty: &Type) -> Value {
        match ty {
            Type::Struct(def) => Value::Struct(
                def.members
                    .borrow()
                    .iter()
                    .map(|(_, member)| Value::zero_of(member))
                    .collect(),
            ),
            Type::Prim(_) => match ty.prim() {
                Some(Prim::Bool) => Value::Bool(false),
                Some(prim) if prim.is_float() => Value::Float(0.0),
                _ => Value::Int(0),
            },
        }
    }

    /// Bit pattern of a primitive constant, as stored by the build sidecar.
    pub fn to_bits(&self) -> u64 {
        match self {
            Value::Bool(value) => *value as u64,
            Value::Int(value) => *value as u64,
            Value::Float(value) => value.to_bits(),
            Value::Struct(_) => 0,
        }
    }

    pub fn from_bits(bits: u64, prim: Prim) -> Value {
        match prim {
            Prim::Bool => Value::Bool(bits != 0),
            Prim::F32 | Prim::F64 => Value::Float(f64::from_bits(bits)),
            prim if prim.is_signed() => Value::Int(bits as i64 as i128),
            _ => Value::Int(bits as i128),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_defaults() {
        let int_literal = Type::from_suffix(Suffix::Unspecified, false);
        let float_literal = Type::from_suffix(Suffix::Unspecified, true);

        assert_eq!(int_literal.complete(), Some(Type::from(Prim::I32)));
        assert_eq!(float_literal.complete(), Some(Type::from(Prim::F64)));
        assert_eq!(
            Type::from_suffix(Suffix::Unsigned, false).complete(),
            Some(Type::from(Prim::U32))
        );
        assert_eq!(
            Type::from_suffix(Suffix::Float, false).complete(),
            Some(Type::from(Prim::F64))
        );
    }

    #[test]
    fn test_merge_narrows() {
        let int_literal = Type::from_suffix(Suffix::Unspecified, false);
        let float_literal = Type::from_suffix(Suffix::Unspecified, true);

        let merged = int_literal.merge(&float_literal).unwrap();
        assert_eq!(merged, Type::Prim(PrimSet::FLOATS));
        assert!(Type::bool().merge(&int_literal).is_none());
        assert!(Type::from(Prim::I32).merge(&Type::from(Prim::I64)).is_none());
    }

    #[test]
    fn test_union_widens() {
        let union = Type::from(Prim::I32).union(&Type::from(Prim::F64)).unwrap();
        assert!(union.contains(&Type::from(Prim::I32)));
        assert!(union.contains(&Type::from(Prim::F64)));
        assert!(!union.is_complete());
        assert_eq!(union.to_string(), "{I32|F64}");
    }

    #[test]
    fn test_undeterminable() {
        assert!(Type::any_value().complete().is_none());
        assert_eq!(
            Type::Prim(PrimSet::I64 | PrimSet::U64).complete(),
            Some(Type::from(Prim::I64))
        );
    }

    #[test]
    fn test_tags() {
        for prim in ALL_PRIMS {
            assert_eq!(Prim::from_tag(prim.tag()), Some(prim));
        }
        assert_eq!(Prim::from_tag(b'i'), Some(Prim::I32));
        assert_eq!(Prim::from_tag(b'?'), None);
        assert_eq!(Value::from_bits(Value::Int(-3).to_bits(), Prim::I32), Value::Int(-3));
    }
}
