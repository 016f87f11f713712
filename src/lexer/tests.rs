//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers (plain, dotted and non-ASCII)
//! - Numeric literals with base prefixes and width suffixes
//! - Operators, punctuation and statement terminators
//! - Comments and directives
//! - Error cases

use super::{
    lexer::{parse_number, tokenize},
    tokens::{DirectiveKind, NumberValue, Suffix, TokenKind},
};
use crate::errors::errors::ErrorImpl;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.eb".to_string()))
        .unwrap()
        .tokens
        .iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "fn true false return if else while break continue pub import global const struct module extend";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Fn,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Return,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Break,
            TokenKind::Continue,
            TokenKind::Pub,
            TokenKind::Import,
            TokenKind::Global,
            TokenKind::Const,
            TokenKind::Struct,
            TokenKind::Module,
            TokenKind::Extend,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo baz_123 _underscore größe math.sqrt a.b.c".to_string();
    let tokens = tokenize(source, Some("test.eb".to_string())).unwrap().tokens;

    assert!(tokens[..6].iter().all(|t| t.kind == TokenKind::Identifier));
    assert_eq!(tokens[3].value, "größe");
    assert_eq!(tokens[4].parts(), vec!["math", "sqrt"]);
    assert!(tokens[5].is_qualified());
    assert_eq!(tokens[5].parts().len(), 3);
    assert!(!tokens[0].is_qualified());
}

#[test]
fn test_tokenize_import_list() {
    assert_eq!(
        kinds("import a.[x, y]"),
        vec![
            TokenKind::Import,
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::OpenBracket,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Identifier,
            TokenKind::CloseBracket,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_terminators() {
    assert_eq!(
        kinds("x := 1\ny = 2; z"),
        vec![
            TokenKind::Identifier,
            TokenKind::ColonAssignment,
            TokenKind::Int,
            TokenKind::End,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Int,
            TokenKind::End,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("== != <= >= << >> && || += -= *= /= &= |= ^= < > & | ^ ! + - * / % . : ,"),
        vec![
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::ShiftLeft,
            TokenKind::ShiftRight,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
            TokenKind::AmpersandEquals,
            TokenKind::PipeEquals,
            TokenKind::CaretEquals,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Ampersand,
            TokenKind::Pipe,
            TokenKind::Caret,
            TokenKind::Not,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Dot,
            TokenKind::Colon,
            TokenKind::Comma,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.5 0x1F 0b101u8 7i64 2f .5 1e3 1_000".to_string();
    let tokens = tokenize(source, Some("test.eb".to_string())).unwrap().tokens;

    let number = |i: usize| tokens[i].number.unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Int);
    assert_eq!(number(0).value, NumberValue::Int(42));
    assert_eq!(number(0).suffix, Suffix::Unspecified);

    assert_eq!(tokens[1].kind, TokenKind::Float);
    assert_eq!(number(1).value, NumberValue::Float(3.5));

    assert_eq!(number(2).value, NumberValue::Int(31));
    assert_eq!(number(3).value, NumberValue::Int(5));
    assert_eq!(number(3).suffix, Suffix::U8);
    assert_eq!(number(4).suffix, Suffix::I64);

    assert_eq!(tokens[5].kind, TokenKind::Float);
    assert_eq!(number(5).suffix, Suffix::Float);
    assert_eq!(number(6).value, NumberValue::Float(0.5));
    assert_eq!(number(7).value, NumberValue::Float(1000.0));
    assert_eq!(number(8).value, NumberValue::Int(1000));
}

#[test]
fn test_parse_number_bases() {
    assert_eq!(parse_number("0q33").unwrap().value, NumberValue::Int(15));
    assert_eq!(parse_number("0o17").unwrap().value, NumberValue::Int(15));
    assert_eq!(parse_number("0d15").unwrap().value, NumberValue::Int(15));
    assert_eq!(parse_number("0xffu16").unwrap().suffix, Suffix::U16);
    assert_eq!(parse_number("10u").unwrap().suffix, Suffix::Unsigned);
    assert_eq!(parse_number("10i").unwrap().suffix, Suffix::Signed);
}

#[test]
fn test_invalid_suffixes() {
    assert_eq!(
        parse_number("12q8"),
        Err(ErrorImpl::InvalidIntegralSuffix {
            suffix: "q8".to_string()
        })
    );
    assert_eq!(
        parse_number("1.5i32"),
        Err(ErrorImpl::InvalidFloatSuffix {
            suffix: "i32".to_string()
        })
    );
    assert!(matches!(
        parse_number("0x10f32"),
        Ok(literal) if literal.value == NumberValue::Int(0x10f32)
    ));
    assert!(matches!(
        parse_number("0b11f"),
        Err(ErrorImpl::InvalidIntegralSuffix { .. })
    ));
}

#[test]
fn test_integer_out_of_range() {
    assert!(matches!(
        parse_number("129i8"),
        Err(ErrorImpl::IntegerOutOfRange { .. })
    ));
    assert!(parse_number("128i8").is_ok());
    assert!(parse_number("9223372036854775808i64").is_ok());
    assert!(parse_number("255u8").is_ok());
    assert!(matches!(
        parse_number("99999999999999999999"),
        Err(ErrorImpl::IntegerOutOfRange { .. })
    ));
}

#[test]
fn test_tokenize_comments() {
    let source = "x // line comment\n/* block\ncomment */ y".to_string();
    let tokens = tokenize(source, Some("test.eb".to_string())).unwrap().tokens;

    assert_eq!(tokens[0].value, "x");
    assert_eq!(tokens[1].kind, TokenKind::End);
    assert_eq!(tokens[2].value, "y");
    assert_eq!(tokens[2].span.start.line, 3);
    assert_eq!(tokens[2].span.start.column, 12);
}

#[test]
fn test_unterminated_comment() {
    let error = tokenize("x /* never closed".to_string(), Some("test.eb".to_string()))
        .unwrap_err();

    assert_eq!(error.get_error_name(), "UnterminatedComment");
    assert_eq!(error.get_position().line, 1);
    assert_eq!(error.get_position().column, 3);
}

#[test]
fn test_tokenize_directives() {
    let source = "#include other.eb\n#out_build build\nfn main() {}".to_string();
    let lexed = tokenize(source, Some("test.eb".to_string())).unwrap();

    assert_eq!(lexed.directives.len(), 2);
    assert_eq!(lexed.directives[0].kind, DirectiveKind::Include);
    assert_eq!(lexed.directives[0].value, "other.eb");
    assert_eq!(lexed.directives[1].kind, DirectiveKind::OutBuild);
    assert_eq!(lexed.tokens[2].kind, TokenKind::Fn);
}

#[test]
fn test_directive_values() {
    let source = "#include other.eb // helpers\n#out_exec app\n".to_string();
    let lexed = tokenize(source, Some("test.eb".to_string())).unwrap();
    assert_eq!(lexed.directives[0].value, "other.eb");
    assert_eq!(lexed.directives[1].value, "app");

    for source in ["#include\nfn main() {}", "#out_build   // nothing\n"] {
        let error = tokenize(source.to_string(), Some("test.eb".to_string())).unwrap_err();
        assert_eq!(error.get_error_name(), "MissingDirectiveValue");
        assert_eq!(error.get_position().line, 1);
        assert_eq!(error.get_position().column, 1);
    }
}

#[test]
fn test_unknown_directive() {
    let error = tokenize("#nonsense 1".to_string(), None).unwrap_err();
    assert_eq!(error.get_error_name(), "UnknownDirective");
}

#[test]
fn test_unrecognised_token() {
    let error = tokenize("x := @".to_string(), Some("test.eb".to_string())).unwrap_err();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().column, 6);
}
