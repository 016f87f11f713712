use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{
    Directive, DirectiveKind, Lexed, NumberLiteral, NumberValue, Suffix, Token, TokenKind,
    RESERVED_LOOKUP, SUFFIX_LOOKUP,
};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

const IDENTIFIER: &str = r"(?:[A-Za-z_]|[^\x00-\x7F])(?:[A-Za-z0-9_]|[^\x00-\x7F])*";

lazy_static! {
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^[ \t\r]+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^\n").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::End, "\n") },
        RegexPattern { regex: Regex::new(r"^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::End, ";") },
        RegexPattern { regex: Regex::new(r"^//[^\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^/\*").unwrap(), handler: block_comment_handler },
        RegexPattern { regex: Regex::new(r"^#([A-Za-z_]+)[ \t]*([^\n]*)").unwrap(), handler: directive_handler },
        RegexPattern {
            regex: Regex::new(r"^(?:0[bqoxd][0-9A-Za-z_]*|(?:[0-9][0-9_]*(?:\.[0-9][0-9_]*)?|\.[0-9][0-9_]*)(?:[eE][+-]?[0-9]+)?[A-Za-z0-9_]*)").unwrap(),
            handler: number_handler,
        },
        RegexPattern { regex: Regex::new(&format!(r"^{IDENTIFIER}(?:\.{IDENTIFIER})*")).unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new(r"^:=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::ColonAssignment, ":=") },
        RegexPattern { regex: Regex::new(r"^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new(r"^!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new(r"^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new(r"^>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=") },
        RegexPattern { regex: Regex::new(r"^<<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::ShiftLeft, "<<") },
        RegexPattern { regex: Regex::new(r"^>>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::ShiftRight, ">>") },
        RegexPattern { regex: Regex::new(r"^\|\|").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Or, "||") },
        RegexPattern { regex: Regex::new(r"^&&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::And, "&&") },
        RegexPattern { regex: Regex::new(r"^\+=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=") },
        RegexPattern { regex: Regex::new(r"^-=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=") },
        RegexPattern { regex: Regex::new(r"^\*=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=") },
        RegexPattern { regex: Regex::new(r"^/=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=") },
        RegexPattern { regex: Regex::new(r"^&=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::AmpersandEquals, "&=") },
        RegexPattern { regex: Regex::new(r"^\|=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PipeEquals, "|=") },
        RegexPattern { regex: Regex::new(r"^\^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CaretEquals, "^=") },
        RegexPattern { regex: Regex::new(r"^\[").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[") },
        RegexPattern { regex: Regex::new(r"^\]").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]") },
        RegexPattern { regex: Regex::new(r"^\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{") },
        RegexPattern { regex: Regex::new(r"^\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}") },
        RegexPattern { regex: Regex::new(r"^\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new(r"^\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
        RegexPattern { regex: Regex::new(r"^!").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Not, "!") },
        RegexPattern { regex: Regex::new(r"^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
        RegexPattern { regex: Regex::new(r"^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new(r"^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new(r"^&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&") },
        RegexPattern { regex: Regex::new(r"^\|").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|") },
        RegexPattern { regex: Regex::new(r"^\^").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Caret, "^") },
        RegexPattern { regex: Regex::new(r"^\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dot, ".") },
        RegexPattern { regex: Regex::new(r"^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new(r"^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new(r"^\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new(r"^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new(r"^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new(r"^\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new(r"^%").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Percent, "%") },
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    directives: Vec<Directive>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            tokens: vec![],
            directives: vec![],
            source,
            pos: 0,
            line: 1,
            column: 1,
            file: file_name,
        }
    }

    /// Moves `n` bytes forward, keeping line and column in step.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for ch in self.source[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column, Rc::clone(&self.file))
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }
}

fn matched_len(lexer: &Lexer, regex: &Regex) -> usize {
    regex.find(lexer.remainder()).map_or(0, |m| m.end())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = matched_len(lexer, regex);
    lexer.advance_n(matched);
    Ok(())
}

fn block_comment_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let start = lexer.position();

    match lexer.remainder()[2..].find("*/") {
        Some(end) => {
            lexer.advance_n(end + 4);
            Ok(())
        }
        None => Err(Error::new(ErrorImpl::UnterminatedComment, start)),
    }
}

fn directive_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let start = lexer.position();
    let Some(captures) = regex.captures(lexer.remainder()) else {
        return Err(Error::new(
            ErrorImpl::UnrecognisedToken {
                token: lexer.at().to_string(),
            },
            start,
        ));
    };

    let name = captures[1].to_string();
    let argument = &captures[2];
    let value = match argument.find("//") {
        Some(comment) => &argument[..comment],
        None => argument,
    }
    .trim()
    .to_string();
    let length = captures[0].len();

    let Some(kind) = DirectiveKind::from_name(&name) else {
        return Err(Error::new(ErrorImpl::UnknownDirective { directive: name }, start));
    };
    if value.is_empty() {
        return Err(Error::new(ErrorImpl::MissingDirectiveValue { directive: name }, start));
    }

    lexer.advance_n(length);
    let end = lexer.position();
    lexer.directives.push(Directive {
        kind,
        value,
        span: Span { start, end },
    });

    Ok(())
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let start = lexer.position();
    let matched = regex
        .find(lexer.remainder())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let literal = parse_number(&matched).map_err(|error| Error::new(error, start.clone()))?;

    lexer.advance_n(matched.len());
    let end = lexer.position();

    let kind = match literal.value {
        NumberValue::Int(_) => TokenKind::Int,
        NumberValue::Float(_) => TokenKind::Float,
    };

    lexer.push(Token {
        kind,
        value: matched,
        span: Span { start, end },
        number: Some(literal),
    });

    Ok(())
}

/// Parses the text of a numeric literal into its value and suffix.
///
/// Handles the `0b`/`0q`/`0o`/`0x`/`0d` base prefixes, `_` separators,
/// fractional parts, exponents and width suffixes.
pub fn parse_number(text: &str) -> Result<NumberLiteral, ErrorImpl> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let bytes = cleaned.as_bytes();

    let radix = if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'b' => Some(2),
            b'q' => Some(4),
            b'o' => Some(8),
            b'x' => Some(16),
            b'd' => Some(10),
            _ => None,
        }
    } else {
        None
    };

    if let Some(radix) = radix {
        let body = &cleaned[2..];
        let digits_end = body
            .find(|c: char| !c.is_digit(radix))
            .unwrap_or(body.len());
        let (digits, suffix_text) = body.split_at(digits_end);

        let suffix = match SUFFIX_LOOKUP.get(suffix_text) {
            Some(suffix) if !suffix.is_float() => *suffix,
            _ => {
                return Err(ErrorImpl::InvalidIntegralSuffix {
                    suffix: suffix_text.to_string(),
                })
            }
        };

        let value = u64::from_str_radix(digits, radix).map_err(|_| {
            ErrorImpl::IntegerOutOfRange {
                literal: text.to_string(),
            }
        })?;

        return checked_int(text, value, suffix);
    }

    let mut i = 0;
    let mut is_float = false;

    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        is_float = true;
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            is_float = true;
            i = j;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }

    let (mantissa, suffix_text) = cleaned.split_at(i);

    if is_float {
        let suffix = match SUFFIX_LOOKUP.get(suffix_text) {
            Some(suffix) if suffix.is_float() || *suffix == Suffix::Unspecified => *suffix,
            _ => {
                return Err(ErrorImpl::InvalidFloatSuffix {
                    suffix: suffix_text.to_string(),
                })
            }
        };

        return parse_float(text, mantissa, suffix);
    }

    let Some(suffix) = SUFFIX_LOOKUP.get(suffix_text).copied() else {
        return Err(ErrorImpl::InvalidIntegralSuffix {
            suffix: suffix_text.to_string(),
        });
    };

    if suffix.is_float() {
        return parse_float(text, mantissa, suffix);
    }

    let value = mantissa
        .parse::<u64>()
        .map_err(|_| ErrorImpl::IntegerOutOfRange {
            literal: text.to_string(),
        })?;

    checked_int(text, value, suffix)
}

fn checked_int(text: &str, value: u64, suffix: Suffix) -> Result<NumberLiteral, ErrorImpl> {
    if value > suffix.max_value() {
        return Err(ErrorImpl::IntegerOutOfRange {
            literal: text.to_string(),
        });
    }

    Ok(NumberLiteral {
        value: NumberValue::Int(value),
        suffix,
    })
}

fn parse_float(text: &str, mantissa: &str, suffix: Suffix) -> Result<NumberLiteral, ErrorImpl> {
    let value = mantissa
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ErrorImpl::InvalidFloat {
            literal: text.to_string(),
        })?;

    Ok(NumberLiteral {
        value: NumberValue::Float(value),
        suffix,
    })
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let start = lexer.position();
    let value = regex
        .find(lexer.remainder())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    lexer.advance_n(value.len());
    let span = Span {
        start,
        end: lexer.position(),
    };

    if let Some(kind) = RESERVED_LOOKUP.get(value.as_str()) {
        lexer.push(MK_TOKEN!(*kind, value, span));
    } else {
        lexer.push(MK_TOKEN!(TokenKind::Identifier, value, span));
    }

    Ok(())
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Lexed, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position(),
                ))
            }
        }
    }

    let position = lex.position();
    lex.push(MK_TOKEN!(
        TokenKind::EOF,
        String::from("EOF"),
        Span::at(position)
    ));

    Ok(Lexed {
        tokens: lex.tokens,
        directives: lex.directives,
    })
}
