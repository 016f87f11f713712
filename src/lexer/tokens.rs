use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("fn", TokenKind::Fn);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("break", TokenKind::Break);
        map.insert("continue", TokenKind::Continue);
        map.insert("pub", TokenKind::Pub);
        map.insert("import", TokenKind::Import);
        map.insert("global", TokenKind::Global);
        map.insert("const", TokenKind::Const);
        map.insert("struct", TokenKind::Struct);
        map.insert("module", TokenKind::Module);
        map.insert("extend", TokenKind::Extend);
        map
    };
    pub static ref SUFFIX_LOOKUP: HashMap<&'static str, Suffix> = {
        let mut map = HashMap::new();
        map.insert("", Suffix::Unspecified);
        map.insert("i8", Suffix::I8);
        map.insert("i16", Suffix::I16);
        map.insert("i32", Suffix::I32);
        map.insert("i64", Suffix::I64);
        map.insert("i", Suffix::Signed);
        map.insert("u8", Suffix::U8);
        map.insert("u16", Suffix::U16);
        map.insert("u32", Suffix::U32);
        map.insert("u64", Suffix::U64);
        map.insert("u", Suffix::Unsigned);
        map.insert("f32", Suffix::F32);
        map.insert("f64", Suffix::F64);
        map.insert("f", Suffix::Float);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    /// Newline or `;`
    End,
    Int,
    Float,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment,      // =
    ColonAssignment, // :=
    Equals,          // ==
    Not,             // !
    NotEquals,       // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    ShiftLeft,
    ShiftRight,

    Or,
    And,
    Ampersand,
    Pipe,
    Caret,

    Dot,
    Colon,
    Comma,

    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    AmpersandEquals,
    PipeEquals,
    CaretEquals,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Fn,
    True,
    False,
    Return,
    If,
    Else,
    While,
    Break,
    Continue,
    Pub,
    Import,
    Global,
    Const,
    Struct,
    Module,
    Extend,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Width suffix attached to a numeric literal.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Suffix {
    Unspecified,
    I8,
    I16,
    I32,
    I64,
    /// `i`: any signed integer
    Signed,
    U8,
    U16,
    U32,
    U64,
    /// `u`: any unsigned integer
    Unsigned,
    F32,
    F64,
    /// `f`: any float
    Float,
}

impl Suffix {
    pub fn is_float(&self) -> bool {
        matches!(self, Suffix::F32 | Suffix::F64 | Suffix::Float)
    }

    /// Largest value an integer literal with this suffix may hold.
    ///
    /// Signed suffixes allow the magnitude of the type's minimum, which is only
    /// valid under a negation. That is checked once types are known.
    pub fn max_value(&self) -> u64 {
        match self {
            Suffix::I8 => i8::MIN.unsigned_abs() as u64,
            Suffix::I16 => i16::MIN.unsigned_abs() as u64,
            Suffix::I32 => i32::MIN.unsigned_abs() as u64,
            Suffix::I64 | Suffix::Signed => i64::MIN.unsigned_abs(),
            Suffix::U8 => u8::MAX as u64,
            Suffix::U16 => u16::MAX as u64,
            Suffix::U32 => u32::MAX as u64,
            _ => u64::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(u64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberLiteral {
    pub value: NumberValue,
    pub suffix: Suffix,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
    /// Parsed value of `Int`/`Float` tokens.
    pub number: Option<NumberLiteral>,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::End => write!(f, "end of statement"),
            TokenKind::EOF => write!(f, "end of file"),
            _ => write!(f, "{}", self.value),
        }
    }
}

impl Token {
    pub fn is_one_of_many(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// Segments of a dotted identifier, `a.b.c` gives `["a", "b", "c"]`.
    pub fn parts(&self) -> Vec<&str> {
        self.value.split('.').collect()
    }

    pub fn is_qualified(&self) -> bool {
        self.kind == TokenKind::Identifier && self.value.contains('.')
    }
}

/// A `#trait value` line of a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Include,
    OutBuild,
    OutExec,
}

impl DirectiveKind {
    pub fn from_name(name: &str) -> Option<DirectiveKind> {
        match name {
            "include" => Some(DirectiveKind::Include),
            "out_build" => Some(DirectiveKind::OutBuild),
            "out_exec" => Some(DirectiveKind::OutExec),
            _ => None,
        }
    }
}

/// Output of the lexer: the token stream plus the file's directives.
#[derive(Debug, Clone)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub directives: Vec<Directive>,
}
