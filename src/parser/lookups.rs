use std::collections::HashMap;

use crate::{
    ast::{expressions::Tok, items::Item, statements::Stmt},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::*, items::*, parser::Parser, stmt::*};

/// Operator precedence, weakest first. Every binary level is left-associative.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    LogicalOr,
    LogicalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    Member,
    Primary,
}

pub type ItemHandler = fn(&mut Parser, bool) -> Result<Item, Error>;
pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;
pub type NUDHandler = fn(&mut Parser, &mut Vec<Tok>) -> Result<(), Error>;
pub type LEDHandler = fn(&mut Parser, &mut Vec<Tok>, BindingPower) -> Result<(), Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    // Logical
    parser.led(TokenKind::Or, BindingPower::LogicalOr, parse_binary_expr);
    parser.led(TokenKind::And, BindingPower::LogicalAnd, parse_binary_expr);

    // Bitwise
    parser.led(TokenKind::Pipe, BindingPower::BitOr, parse_binary_expr);
    parser.led(TokenKind::Caret, BindingPower::BitXor, parse_binary_expr);
    parser.led(TokenKind::Ampersand, BindingPower::BitAnd, parse_binary_expr);

    // Equality and relational
    parser.led(TokenKind::Equals, BindingPower::Equality, parse_binary_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Equality, parse_binary_expr);
    parser.led(TokenKind::Less, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::GreaterEquals, BindingPower::Relational, parse_binary_expr);

    // Shifts, additive and multiplicative
    parser.led(TokenKind::ShiftLeft, BindingPower::Shift, parse_binary_expr);
    parser.led(TokenKind::ShiftRight, BindingPower::Shift, parse_binary_expr);
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Percent, BindingPower::Multiplicative, parse_binary_expr);

    // Member
    parser.led(TokenKind::Dot, BindingPower::Member, parse_member_expr);

    // Literals, symbols and prefix operators
    parser.nud(TokenKind::Int, parse_primary_expr);
    parser.nud(TokenKind::Float, parse_primary_expr);
    parser.nud(TokenKind::True, parse_primary_expr);
    parser.nud(TokenKind::False, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_symbol_expr);
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Slash, parse_prefix_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::If, parse_if_expr);

    // Statements
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::While, parse_while_stmt);
    parser.stmt(TokenKind::Break, parse_break_stmt);
    parser.stmt(TokenKind::Continue, parse_continue_stmt);

    // Items
    parser.item(TokenKind::Fn, parse_fn_item);
    parser.item(TokenKind::Import, parse_import_item);
    parser.item(TokenKind::Global, parse_global_item);
    parser.item(TokenKind::Const, parse_global_item);
    parser.item(TokenKind::Struct, parse_struct_item);
    parser.item(TokenKind::Module, parse_module_item);
    parser.item(TokenKind::Extend, parse_module_item);
}

/// Operator function a binary operator token calls.
pub fn binary_operator_name(kind: TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::Or => "||",
        TokenKind::And => "&&",
        TokenKind::Pipe => "|",
        TokenKind::Caret => "^",
        TokenKind::Ampersand => "&",
        TokenKind::Equals => "==",
        TokenKind::NotEquals => "!=",
        TokenKind::Less => "<",
        TokenKind::LessEquals => "<=",
        TokenKind::Greater => ">",
        TokenKind::GreaterEquals => ">=",
        TokenKind::ShiftLeft => "<<",
        TokenKind::ShiftRight => ">>",
        TokenKind::Plus => "+",
        TokenKind::Dash => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        _ => return None,
    })
}

/// Operator a compound assignment such as `+=` applies.
pub fn compound_operator_name(kind: TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::PlusEquals => "+",
        TokenKind::MinusEquals => "-",
        TokenKind::StarEquals => "*",
        TokenKind::SlashEquals => "/",
        TokenKind::AmpersandEquals => "&",
        TokenKind::PipeEquals => "|",
        TokenKind::CaretEquals => "^",
        _ => return None,
    })
}

// Lookup tables inside parser struct, so it's easier
pub type ItemLookup = HashMap<TokenKind, ItemHandler>;
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
