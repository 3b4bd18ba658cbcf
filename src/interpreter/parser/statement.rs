use std::iter::Peekable;

use crate::{
    ast::{Node, RequireForm},
    error::SyntaxError,
    interpreter::{
        parser::{
            block::{parse_lambda_rest, parse_params},
            core::{ParseResult, parse_expression},
            utils::{
                consume_keyword, consume_symbol, expect_symbol, next_token, parse_comma_separated,
                parse_identifier, peek_token, unexpected,
            },
        },
        token::{SourcePos, Token, TokenKind},
    },
};

/// Compound assignment operators and the function each one applies.
const COMPOUND_ASSIGNMENTS: &[(&str, &str)] =
    &[("+=", "add"), ("-=", "sub"), ("*=", "mul"), ("/=", "div"), ("%=", "mod")];

/// Keywords that may directly follow a bare `return`.
const RETURN_FOLLOWERS: &[&str] = &["end", "catch", "finally", "else", "elif"];

/// Parses one statement.
///
/// Grammar:
/// ```text
///     statement := "def" definition
///                | "require" require
///                | "return" expression?
///                | "break" | "continue"
///                | "error" expression
///                | expression (("=" | "+=" | "-=" | "*=" | "/=" | "%=") expression)?
/// ```
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the statement.
///
/// # Returns
/// The statement node. Compound assignments are desugared, so
/// `x += 1` yields the same tree as `x = add(x, 1)`.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let token = peek_token(tokens)?;
    let pos = token.pos.clone();

    if consume_keyword(tokens, "def") {
        return parse_def(tokens, &pos);
    }
    if consume_keyword(tokens, "require") {
        return parse_require(tokens, &pos);
    }
    if consume_keyword(tokens, "break") {
        return Ok(Node::Break { pos });
    }
    if consume_keyword(tokens, "continue") {
        return Ok(Node::Continue { pos });
    }
    if consume_keyword(tokens, "return") {
        let value = if ends_statement(peek_token(tokens)?) {
            None
        } else {
            Some(Box::new(parse_expression(tokens)?))
        };
        return Ok(Node::Return { value, pos });
    }
    if consume_keyword(tokens, "error") {
        let value = parse_expression(tokens)?;
        return Ok(Node::Error { value: Box::new(value),
                                pos });
    }

    let expr = parse_expression(tokens)?;
    parse_assignment(tokens, expr)
}

/// Whether `token` can only follow a complete statement.
fn ends_statement(token: &Token) -> bool {
    token.kind == TokenKind::Eof
    || [";", ")"].iter().any(|s| token.is_symbol(s))
    || RETURN_FOLLOWERS.iter().any(|k| token.is_keyword(k))
}

/// Turns `expr` into an assignment if an assignment operator follows.
fn parse_assignment<'a, I>(tokens: &mut Peekable<I>, expr: Node) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let token = peek_token(tokens)?;
    let compound = COMPOUND_ASSIGNMENTS.iter()
                                       .find(|(symbol, _)| token.is_symbol(symbol))
                                       .map(|(_, function)| *function);
    if !token.is_symbol("=") && compound.is_none() {
        return Ok(expr);
    }
    tokens.next();
    let pos = token.pos.clone();
    let rhs = parse_expression(tokens)?;

    let value = match compound {
        Some(function) => Node::call_named(function, vec![expr.clone(), rhs], &pos),
        None => rhs,
    };

    match expr {
        Node::Identifier { name, .. } => Ok(Node::Assign { name,
                                                           value: Box::new(value),
                                                           pos }),
        Node::Deref { target, index, .. } => Ok(Node::DerefAssign { target,
                                                                    index,
                                                                    value: Box::new(value),
                                                                    pos }),
        _ => Err(SyntaxError::InvalidAssignmentTarget { pos }),
    }
}

/// Parses the rest of a `def` statement.
///
/// Grammar:
/// ```text
///     def := "def" identifier "=" expression
///          | "def" identifier "(" params ")" statement
///          | "def" "[" identifier ("," identifier)* "]" "=" expression
/// ```
///
/// A lambda bound by `def` takes the bound name, which stack traces show.
fn parse_def<'a, I>(tokens: &mut Peekable<I>, pos: &SourcePos) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    if consume_symbol(tokens, "[") {
        let mut names = Vec::new();
        loop {
            names.push(parse_identifier(tokens)?.0);
            let token = next_token(tokens)?;
            if token.is_symbol("]") {
                break;
            }
            if !token.is_symbol(",") {
                return Err(unexpected(token, "',' or ']'"));
            }
        }
        expect_symbol(tokens, "=")?;
        let value = parse_expression(tokens)?;
        return Ok(Node::DefDestructure { names,
                                         value: Box::new(value),
                                         pos: pos.clone() });
    }

    let (name, _) = parse_identifier(tokens)?;

    if peek_token(tokens)?.is_symbol("(") {
        let lambda_pos = peek_token(tokens)?.pos.clone();
        let params = parse_params(tokens)?;
        let lambda = parse_lambda_rest(tokens, Some(name.clone()), params, lambda_pos)?;
        return Ok(Node::Def { name,
                              value: Box::new(lambda),
                              pos: pos.clone() });
    }

    expect_symbol(tokens, "=")?;
    let value = match parse_expression(tokens)? {
        Node::Lambda { name: None,
                       params,
                       body,
                       pos, } => Node::Lambda { name: Some(name.clone()),
                                                params,
                                                body,
                                                pos },
        other => other,
    };
    Ok(Node::Def { name,
                   value: Box::new(value),
                   pos: pos.clone() })
}

/// Parses the rest of a `require` statement.
///
/// The import list may be bracketed or bare.
///
/// Grammar:
/// ```text
///     require := "require" expression
///                ( "as" identifier
///                | "unqualified"
///                | "import" "[" (symbol ("," symbol)*)? "]"
///                | "import" symbol ("," symbol)* )?
///     symbol  := identifier ("as" identifier)?
/// ```
fn parse_require<'a, I>(tokens: &mut Peekable<I>, pos: &SourcePos) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let spec = parse_expression(tokens)?;

    let form = if consume_keyword(tokens, "as") {
        RequireForm::Bind(Some(parse_identifier(tokens)?.0))
    } else if consume_keyword(tokens, "unqualified") {
        RequireForm::Unqualified
    } else if consume_keyword(tokens, "import") {
        if consume_symbol(tokens, "[") {
            RequireForm::Import(parse_comma_separated(tokens, parse_import_symbol, "]")?)
        } else {
            let mut symbols = vec![parse_import_symbol(tokens)?];
            while consume_symbol(tokens, ",") {
                symbols.push(parse_import_symbol(tokens)?);
            }
            RequireForm::Import(symbols)
        }
    } else {
        RequireForm::Bind(None)
    };

    Ok(Node::Require { spec: Box::new(spec),
                       form,
                       pos: pos.clone() })
}

fn parse_import_symbol<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<(String, Option<String>)>
    where I: Iterator<Item = &'a Token> + Clone
{
    let (symbol, _) = parse_identifier(tokens)?;
    let alias = if consume_keyword(tokens, "as") {
        Some(parse_identifier(tokens)?.0)
    } else {
        None
    };
    Ok((symbol, alias))
}
