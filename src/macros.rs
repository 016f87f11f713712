//! Token construction shorthands used by the lexer's pattern table.

/// Builds a [`Token`](crate::lexer::tokens::Token) that carries no literal value.
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Identifier, "main".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
            number: None,
        }
    };
}

/// Handler for a pattern whose text is fixed, such as `:=` or `==`.
///
/// The lexer is moved past `$value` and a token of `$kind` spanning it is
/// pushed. Patterns with variable text need a handler of their own.
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new(r"^:=").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::ColonAssignment, ":="),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            let start = lexer.position();
            lexer.advance_n($value.len());
            let end = lexer.position();
            lexer.push(MK_TOKEN!($kind, String::from($value), Span { start, end }));
            Ok(())
        }
    };
}
