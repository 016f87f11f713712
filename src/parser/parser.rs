//! Token cursor and the parse entry point.
//!
//! Items and statements dispatch on their leading token through handler
//! tables. Expressions go through a Pratt parser that writes its output in
//! postfix order, so no expression tree is ever built.

use std::collections::HashMap;

use crate::{
    ast::items::{Item, ModuleAst},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Lexed, Token, TokenKind},
    Position, Span,
};

use super::{
    items::parse_item,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, ItemHandler, ItemLookup, LEDHandler,
        LEDLookup, NUDHandler, NUDLookup, StmtHandler, StmtLookup,
    },
};

/// Cursor over one file's tokens plus the handler tables keyed by token kind.
pub struct Parser {
    /// Always ends in `EOF`, reads past the end keep returning it
    tokens: Vec<Token>,
    pos: usize,
    item_lookup: ItemLookup,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
}

impl Parser {
    /// Parser positioned at the first token, with every handler registered.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut parser = Parser {
            tokens,
            pos: 0,
            item_lookup: HashMap::new(),
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        };
        create_token_lookups(&mut parser);
        parser
    }

    pub fn current_token(&self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Returns the kind of the token `n` places ahead.
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[index].kind
    }

    /// Kind of the first token after any statement terminators.
    pub fn peek_past_ends(&self) -> TokenKind {
        let mut n = 0;
        while self.peek_kind(n) == TokenKind::End {
            n += 1;
        }
        self.peek_kind(n)
    }

    /// Consumes the current token and hands it back. `EOF` is never consumed.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Skips newline and `;` terminators.
    pub fn skip_ends(&mut self) {
        while self.current_token_kind() == TokenKind::End {
            self.advance();
        }
    }

    /// Consumes a token of `kind` or fails with a bare unexpected-token error.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.current_token_kind() != kind {
            return Err(self.unexpected());
        }
        Ok(self.advance().clone())
    }

    /// Like [`Parser::expect`], with `message` saying what was wanted.
    pub fn expect_detailed(&mut self, kind: TokenKind, message: &str) -> Result<Token, Error> {
        if self.current_token_kind() != kind {
            return Err(self.unexpected_detailed(message));
        }
        Ok(self.advance().clone())
    }

    pub fn unexpected(&self) -> Error {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: self.current_token().to_string(),
            },
            self.get_position(),
        )
    }

    pub fn unexpected_detailed(&self, message: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: self.current_token().to_string(),
                message: message.to_string(),
            },
            self.get_position(),
        )
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_item_lookup(&self) -> &ItemLookup {
        &self.item_lookup
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Binding power of the current token, `Default` when it cannot continue an expression.
    pub fn current_bp(&self) -> BindingPower {
        *self
            .binding_power_lookup
            .get(&self.current_token_kind())
            .unwrap_or(&BindingPower::Default)
    }

    /// Registers an infix handler together with the operator's precedence.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Prefix handlers do not touch the binding power table, a token such as
    /// `-` can be both a prefix and an infix operator.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    pub fn item(&mut self, kind: TokenKind, item_fn: ItemHandler) {
        self.item_lookup.insert(kind, item_fn);
    }

    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// End position of the most recently consumed token.
    pub fn previous_end(&self) -> Position {
        let index = self.pos.saturating_sub(1);
        self.tokens[index].span.end.clone()
    }

    /// Span from `start` up to the end of the most recently consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        Span {
            start,
            end: self.previous_end(),
        }
    }
}

/// Parses a lexed file into the items of module `module_name`.
///
/// Stops at the first error. The lexer's directives are carried over
/// untouched for the driver.
pub fn parse(lexed: Lexed, module_name: &str) -> Result<ModuleAst, Error> {
    let mut parser = Parser::new(lexed.tokens);
    let mut items: Vec<Item> = vec![];

    parser.skip_ends();
    while parser.has_tokens() {
        items.push(parse_item(&mut parser)?);
        parser.skip_ends();
    }

    Ok(ModuleAst {
        name: module_name.to_string(),
        items,
        directives: lexed.directives,
    })
}
