use crate::{
    ast::{
        items::{
            FunctionItem, GlobalItem, ImportItem, Item, ModuleItem, NamedParam, Param, StructItem,
        },
        types::TypeName,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{expr::parse_expr, parser::Parser, stmt::parse_block};

/// Parses one top-level or module-level item, with its optional `pub` prefix.
pub fn parse_item(parser: &mut Parser) -> Result<Item, Error> {
    let is_pub = parser.current_token_kind() == TokenKind::Pub;
    if is_pub {
        parser.advance();
    }

    let Some(handler) = parser
        .get_item_lookup()
        .get(&parser.current_token_kind())
        .copied()
    else {
        return Err(parser.unexpected_detailed(
            "expected `fn`, `import`, `global`, `const`, `struct`, `module` or `extend`",
        ));
    };

    handler(parser, is_pub)
}

/// A type annotation, a possibly qualified name such as `I32` or `geometry.Point`.
pub fn parse_type(parser: &mut Parser) -> Result<TypeName, Error> {
    let token = parser.expect_detailed(TokenKind::Identifier, "expected type name")?;

    Ok(TypeName {
        name: token.value,
        span: token.span,
    })
}

fn parse_param(parser: &mut Parser) -> Result<Param, Error> {
    let name = parser.expect_detailed(TokenKind::Identifier, "expected parameter name")?;
    parser.expect_detailed(TokenKind::Colon, "expected `:` after parameter name")?;
    let ty = parse_type(parser)?;

    Ok(Param {
        span: parser.span_from(name.span.start),
        name: name.value,
        ty,
    })
}

/// `[name: T = default, ...]` at the end of a parameter list.
fn parse_named_params(parser: &mut Parser) -> Result<Vec<NamedParam>, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let mut named = vec![];

    parser.skip_ends();
    while parser.current_token_kind() != TokenKind::CloseBracket {
        let param = parse_param(parser)?;
        let default = if parser.current_token_kind() == TokenKind::Assignment {
            parser.advance();
            Some(parse_expr(parser)?)
        } else {
            None
        };

        named.push(NamedParam {
            name: param.name,
            ty: param.ty,
            default,
            span: parser.span_from(param.span.start),
        });

        parser.skip_ends();
        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            parser.skip_ends();
        } else if parser.current_token_kind() != TokenKind::CloseBracket {
            return Err(parser.unexpected_detailed("expected `,` or `]` in named parameters"));
        }
    }

    parser.advance();
    Ok(named)
}

/// `fn name(a: T, b: T, [c: T = 1]): R { .. }`
pub fn parse_fn_item(parser: &mut Parser, is_pub: bool) -> Result<Item, Error> {
    let start = parser.advance().span.start.clone();
    let name = parser.expect_detailed(TokenKind::Identifier, "expected function name")?;
    if name.is_qualified() {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: name.value,
                message: String::from("function names cannot be qualified"),
            },
            name.span.start,
        ));
    }

    parser.expect_detailed(TokenKind::OpenParen, "expected `(` after function name")?;
    parser.skip_ends();

    let mut params = vec![];
    let mut named = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        if parser.current_token_kind() == TokenKind::OpenBracket {
            named = parse_named_params(parser)?;
            parser.skip_ends();
            break;
        }

        params.push(parse_param(parser)?);
        parser.skip_ends();

        match parser.current_token_kind() {
            TokenKind::Comma => {
                parser.advance();
                parser.skip_ends();
            }
            TokenKind::CloseParen => {}
            _ => return Err(parser.unexpected_detailed("expected `,` or `)` in parameters")),
        }
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close parameters")?;

    let ret = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(Item::Function(FunctionItem {
        name: name.value,
        params,
        named,
        ret,
        body,
        is_pub,
        span: parser.span_from(start),
        sig: None,
    }))
}

/// `import a.b` or `import a.[b, c.d]`
pub fn parse_import_item(parser: &mut Parser, _is_pub: bool) -> Result<Item, Error> {
    let start = parser.advance().span.start.clone();
    let head = parser.expect_detailed(TokenKind::Identifier, "expected module path")?;
    let prefix: Vec<String> = head.parts().iter().map(|part| part.to_string()).collect();

    let mut paths = vec![];

    if parser.current_token_kind() == TokenKind::Dot
        && parser.peek_kind(1) == TokenKind::OpenBracket
    {
        parser.advance();
        parser.advance();
        parser.skip_ends();

        while parser.current_token_kind() != TokenKind::CloseBracket {
            let tail = parser.expect_detailed(TokenKind::Identifier, "expected module path")?;

            let mut path = prefix.clone();
            path.extend(tail.parts().iter().map(|part| part.to_string()));
            paths.push(path);

            parser.skip_ends();
            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
                parser.skip_ends();
            } else if parser.current_token_kind() != TokenKind::CloseBracket {
                return Err(parser.unexpected_detailed("expected `,` or `]` in import list"));
            }
        }

        parser.advance();
    } else {
        paths.push(prefix);
    }

    Ok(Item::Import(ImportItem {
        paths,
        span: parser.span_from(start),
    }))
}

/// `global name: T = e`, `const name := e`
pub fn parse_global_item(parser: &mut Parser, is_pub: bool) -> Result<Item, Error> {
    let keyword = parser.advance().clone();
    let is_const = keyword.kind == TokenKind::Const;
    let name = parser.expect_detailed(TokenKind::Identifier, "expected global name")?;

    let ty = match parser.current_token_kind() {
        TokenKind::ColonAssignment => {
            parser.advance();
            None
        }
        TokenKind::Colon => {
            parser.advance();
            let ty = parse_type(parser)?;
            parser.expect_detailed(TokenKind::Assignment, "globals must be initialised")?;
            Some(ty)
        }
        _ => return Err(parser.unexpected_detailed("expected `:` or `:=` after global name")),
    };

    let init = parse_expr(parser)?;

    Ok(Item::Global(GlobalItem {
        name: name.value,
        ty,
        init,
        is_const,
        is_pub,
        span: parser.span_from(keyword.span.start),
        decl: None,
    }))
}

/// `struct Name { a: T, b: T }`, members separated by commas or line ends.
pub fn parse_struct_item(parser: &mut Parser, is_pub: bool) -> Result<Item, Error> {
    let start = parser.advance().span.start.clone();
    let name = parser.expect_detailed(TokenKind::Identifier, "expected struct name")?;
    parser.expect_detailed(TokenKind::OpenCurly, "expected `{` after struct name")?;

    let mut members = vec![];
    loop {
        parser.skip_ends();
        if parser.current_token_kind() == TokenKind::CloseCurly {
            break;
        }

        members.push(parse_param(parser)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if !parser
            .current_token()
            .is_one_of_many(&[TokenKind::End, TokenKind::CloseCurly])
        {
            return Err(parser.unexpected_detailed("expected `,` between struct members"));
        }
    }

    parser.advance();

    Ok(Item::Struct(StructItem {
        name: name.value,
        members,
        is_pub,
        span: parser.span_from(start),
        def: None,
    }))
}

/// `module name { items }` or `extend name { items }`
pub fn parse_module_item(parser: &mut Parser, is_pub: bool) -> Result<Item, Error> {
    let keyword = parser.advance().clone();
    let is_extend = keyword.kind == TokenKind::Extend;

    let name = parser.expect_detailed(TokenKind::Identifier, "expected module name")?;
    if name.is_qualified() {
        return Err(Error::new(
            ErrorImpl::InvalidModuleName { name: name.value },
            name.span.start,
        ));
    }

    parser.expect_detailed(TokenKind::OpenCurly, "expected `{` after module name")?;

    let mut items = vec![];
    loop {
        parser.skip_ends();
        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::EOF => {
                return Err(parser.unexpected_detailed("expected `}` to close the module"))
            }
            _ => items.push(parse_item(parser)?),
        }
    }

    parser.advance();

    Ok(Item::Module(ModuleItem {
        name: name.value,
        items,
        is_pub,
        is_extend,
        span: parser.span_from(keyword.span.start),
    }))
}
