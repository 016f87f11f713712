use crate::{
    ast::{
        expressions::{Expr, Literal, Tok},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{NumberValue, TokenKind},
};

use super::{
    lookups::{binary_operator_name, BindingPower},
    parser::Parser,
    stmt::parse_if,
};

/// Parses a complete expression into its postfix token sequence.
pub fn parse_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.get_position();
    let mut toks = vec![];
    parse_expr_into(parser, &mut toks, BindingPower::Default)?;

    Ok(Expr::new(toks, parser.span_from(start)))
}

/// Pratt loop: the prefix handler emits the left operand, then every operator
/// binding tighter than `bp` emits its right operand followed by itself.
pub fn parse_expr_into(
    parser: &mut Parser,
    out: &mut Vec<Tok>,
    bp: BindingPower,
) -> Result<(), Error> {
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };

    nud(parser, out)?;

    while parser.current_bp() > bp {
        let token_kind = parser.current_token_kind();
        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected());
        };

        let operator_bp = parser.current_bp();
        led(parser, out, operator_bp)?;
    }

    Ok(())
}

pub fn parse_primary_expr(parser: &mut Parser, out: &mut Vec<Tok>) -> Result<(), Error> {
    let token = parser.advance().clone();

    let tok = match token.kind {
        TokenKind::True => Tok::bool(true, token.span),
        TokenKind::False => Tok::bool(false, token.span),
        TokenKind::Int | TokenKind::Float => {
            let Some(number) = token.number else {
                return Err(Error::new(
                    ErrorImpl::InvalidFloat {
                        literal: token.value.clone(),
                    },
                    token.span.start,
                ));
            };

            match number.value {
                NumberValue::Int(value) => Tok::literal(
                    Literal::Int(value),
                    Type::from_suffix(number.suffix, false),
                    token.span,
                ),
                NumberValue::Float(value) => Tok::literal(
                    Literal::Float(value),
                    Type::from_suffix(number.suffix, true),
                    token.span,
                ),
            }
        }
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.to_string(),
                },
                token.span.start,
            ))
        }
    };

    out.push(tok);
    Ok(())
}

/// A variable reference, or a call when the identifier is followed by `(`.
pub fn parse_symbol_expr(parser: &mut Parser, out: &mut Vec<Tok>) -> Result<(), Error> {
    let token = parser.advance().clone();

    if parser.current_token_kind() != TokenKind::OpenParen {
        out.push(Tok::var(token.value, token.span));
        return Ok(());
    }

    parser.advance();
    parser.skip_ends();

    let mut positional = 0;
    let mut named: Vec<String> = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        if parser.current_token_kind() == TokenKind::Identifier
            && parser.peek_kind(1) == TokenKind::Assignment
        {
            named.push(parser.advance().value.clone());
            parser.advance();
        } else if !named.is_empty() {
            return Err(Error::new(
                ErrorImpl::ExpectedNamedArgument,
                parser.get_position(),
            ));
        } else {
            positional += 1;
        }

        parse_expr_into(parser, out, BindingPower::Default)?;
        parser.skip_ends();

        match parser.current_token_kind() {
            TokenKind::Comma => {
                parser.advance();
                parser.skip_ends();
            }
            TokenKind::CloseParen => {}
            _ => return Err(parser.unexpected_detailed("expected `,` or `)` in argument list")),
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let span = parser.span_from(token.span.start.clone());
    out.push(Tok::call(token.value, positional, named, span));
    Ok(())
}

pub fn parse_prefix_expr(parser: &mut Parser, out: &mut Vec<Tok>) -> Result<(), Error> {
    let operator_token = parser.advance().clone();
    let symbol = match operator_token.kind {
        TokenKind::Dash => "-",
        TokenKind::Slash => "/",
        _ => "!",
    };

    parse_expr_into(parser, out, BindingPower::Unary)?;
    out.push(Tok::operator(symbol, 1, operator_token.span));

    Ok(())
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    out: &mut Vec<Tok>,
    bp: BindingPower,
) -> Result<(), Error> {
    let operator_token = parser.advance().clone();
    let Some(symbol) = binary_operator_name(operator_token.kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.to_string(),
            },
            operator_token.span.start,
        ));
    };

    // An operator at the end of a line continues the expression on the next one.
    parser.skip_ends();
    parse_expr_into(parser, out, bp)?;
    out.push(Tok::operator(symbol, 2, operator_token.span));

    Ok(())
}

pub fn parse_grouping_expr(parser: &mut Parser, out: &mut Vec<Tok>) -> Result<(), Error> {
    parser.advance();
    parser.skip_ends();
    parse_expr_into(parser, out, BindingPower::Default)?;
    parser.skip_ends();
    parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close the group")?;

    Ok(())
}

/// `expr.member`, where the member token may itself be dotted (`f().a.b`).
pub fn parse_member_expr(
    parser: &mut Parser,
    out: &mut Vec<Tok>,
    _bp: BindingPower,
) -> Result<(), Error> {
    parser.advance();
    let member = parser.expect_detailed(TokenKind::Identifier, "expected member name")?;

    for part in member.parts() {
        out.push(Tok::member(part.to_string(), member.span.clone()));
    }

    Ok(())
}

/// An `if` in value position, kept whole as a single token.
pub fn parse_if_expr(parser: &mut Parser, out: &mut Vec<Tok>) -> Result<(), Error> {
    let if_stmt = parse_if(parser)?;
    out.push(Tok::if_expr(if_stmt));

    Ok(())
}
