use crate::{
    ast::{
        expressions::{Expr, Tok, TokKind},
        statements::{
            AssignmentStmt, BlockStmt, BreakStmt, ContinueStmt, DeclarationStmt, ExpressionStmt,
            IfStmt, ReturnStmt, Stmt, WhileStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{NumberValue, TokenKind},
};

use super::{
    expr::parse_expr,
    items::parse_type,
    lookups::compound_operator_name,
    parser::Parser,
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return handler(parser);
    }

    if parser.current_token_kind() == TokenKind::Identifier {
        match parser.peek_kind(1) {
            TokenKind::ColonAssignment | TokenKind::Colon => return parse_declaration_stmt(parser),
            TokenKind::Assignment => return parse_assignment_stmt(parser),
            kind if compound_operator_name(kind).is_some() => {
                return parse_assignment_stmt(parser)
            }
            _ => {}
        }
    }

    let mut expr = parse_expr(parser)?;

    // A lone `if` is a statement, not a value.
    if expr.toks.len() == 1 && matches!(expr.toks[0].kind, TokKind::If(_)) {
        if let Some(tok) = expr.toks.pop() {
            if let TokKind::If(if_stmt) = tok.kind {
                return Ok(Stmt::If(*if_stmt));
            }
        }
    }

    Ok(Stmt::Expression(ExpressionStmt {
        span: expr.span.clone(),
        expr,
    }))
}

/// `{ stmt; stmt \n stmt }`
pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.get_position();
    parser.expect_detailed(TokenKind::OpenCurly, "expected `{` to open a block")?;

    let mut body = vec![];
    loop {
        parser.skip_ends();

        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::EOF => {
                return Err(parser.unexpected_detailed("expected `}` to close the block"))
            }
            _ => {}
        }

        body.push(parse_stmt(parser)?);

        if !parser
            .current_token()
            .is_one_of_many(&[TokenKind::End, TokenKind::CloseCurly])
        {
            return Err(parser.unexpected_detailed("expected end of statement"));
        }
    }

    parser.advance();
    Ok(BlockStmt::new(body, parser.span_from(start)))
}

fn parse_declaration_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let name_token = parser.advance().clone();
    if name_token.is_qualified() {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: name_token.value.clone(),
                message: String::from("variable names cannot be qualified"),
            },
            name_token.span.start,
        ));
    }

    let (ty, init) = if parser.advance().kind == TokenKind::ColonAssignment {
        (None, Some(parse_expr(parser)?))
    } else {
        let ty = parse_type(parser)?;
        let init = if parser.current_token_kind() == TokenKind::Assignment {
            parser.advance();
            Some(parse_expr(parser)?)
        } else {
            None
        };
        (Some(ty), init)
    };

    Ok(Stmt::Declaration(DeclarationStmt {
        name: name_token.value,
        ty,
        init,
        var: None,
        hidden: false,
        span: parser.span_from(name_token.span.start),
    }))
}

/// `x = e`, or `x op= e` which is stored as `x = x op e`.
fn parse_assignment_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let target_token = parser.advance().clone();
    let operator_token = parser.advance().clone();
    let rhs = parse_expr(parser)?;

    let value = match compound_operator_name(operator_token.kind) {
        Some(symbol) => {
            let mut toks = Vec::with_capacity(rhs.toks.len() + 2);
            toks.push(Tok::var(
                target_token.value.clone(),
                target_token.span.clone(),
            ));
            toks.extend(rhs.toks);
            toks.push(Tok::operator(symbol, 2, operator_token.span));
            Expr::new(toks, rhs.span)
        }
        None => rhs,
    };

    Ok(Stmt::Assignment(AssignmentStmt {
        target: target_token.value,
        binding: None,
        members: vec![],
        value,
        span: parser.span_from(target_token.span.start),
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = if parser.current_token().is_one_of_many(&[
        TokenKind::End,
        TokenKind::CloseCurly,
        TokenKind::EOF,
    ]) {
        None
    } else {
        Some(parse_expr(parser)?)
    };

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: parser.span_from(start),
    }))
}

/// `if c {..} else if c {..} else {..}`, also used for `if` in value position.
pub fn parse_if(parser: &mut Parser) -> Result<IfStmt, Error> {
    let start = parser.expect(TokenKind::If)?.span.start;

    let mut conditions = vec![parse_expr(parser)?];
    let mut blocks = vec![parse_block(parser)?];

    while parser.peek_past_ends() == TokenKind::Else {
        parser.skip_ends();
        parser.advance();

        if parser.current_token_kind() == TokenKind::If {
            parser.advance();
            conditions.push(parse_expr(parser)?);
            blocks.push(parse_block(parser)?);
        } else {
            blocks.push(parse_block(parser)?);
            break;
        }
    }

    Ok(IfStmt {
        conditions,
        blocks,
        span: parser.span_from(start),
    })
}

/// `while c {..}`, or `while {..}` looping forever.
pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let while_token = parser.advance().clone();

    let condition = if parser.current_token_kind() == TokenKind::OpenCurly {
        Expr::single(Tok::bool(true, while_token.span.clone()))
    } else {
        parse_expr(parser)?
    };
    let body = parse_block(parser)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body,
        span: parser.span_from(while_token.span.start),
    }))
}

/// `break`, or `break *n` to leave `n` loops at once.
pub fn parse_break_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();
    let mut amount = 1;

    if parser.current_token_kind() == TokenKind::Star {
        parser.advance();
        let count = parser.expect_detailed(TokenKind::Int, "expected loop count after `*`")?;

        amount = match count.number.map(|number| number.value) {
            Some(NumberValue::Int(value)) if value <= u32::MAX as u64 => value as u32,
            _ => {
                return Err(Error::new(
                    ErrorImpl::IntegerOutOfRange {
                        literal: count.value,
                    },
                    count.span.start,
                ))
            }
        };
    }

    Ok(Stmt::Break(BreakStmt {
        amount,
        span: parser.span_from(start),
    }))
}

pub fn parse_continue_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    Ok(Stmt::Continue(ContinueStmt {
        span: parser.span_from(start),
    }))
}
