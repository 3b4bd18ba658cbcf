use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{CatchClause, LoopTarget, Node, Parameter},
    error::SyntaxError,
    interpreter::{
        parser::{
            core::{ParseResult, collapse, parse_expression, parse_statements},
            statement::parse_statement,
            unary::parse_postfix_expression,
            utils::{
                consume_keyword, consume_symbol, expect_keyword, expect_symbol,
                parse_comma_separated, parse_identifier,
            },
        },
        token::{SourcePos, Token},
    },
};

/// Parses a `do` block with optional `catch` and `finally` clauses.
///
/// Syntax:
/// ```text
///     do <statements>
///     (catch all <statement> | catch <matcher> <statement>)*
///     (finally <statements>)?
///     end
/// ```
///
/// A block holding a single statement and no clauses collapses to that
/// statement, since blocks do not open a scope of their own.
///
/// # Parameters
/// - `tokens`: Token stream positioned at `do`.
///
/// # Returns
/// A [`Node::Block`], or the single statement it would wrap.
///
/// # Errors
/// - `UnexpectedToken` if `end` is missing.
/// - Propagates any errors from statement parsing.
pub fn parse_do_block<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_keyword(tokens, "do")?.pos.clone();
    let body = parse_statements(tokens, |t| {
                   t.is_keyword("catch") || t.is_keyword("finally") || t.is_keyword("end")
               })?;

    let mut catches = Vec::new();
    while consume_keyword(tokens, "catch") {
        let matcher = if tokens.next_if(|t| t.is_identifier("all")).is_some() {
            None
        } else {
            Some(parse_postfix_expression(tokens)?)
        };
        let handler = parse_statement(tokens)?;
        catches.push(CatchClause { matcher, handler });
    }

    let finally = if consume_keyword(tokens, "finally") {
        parse_statements(tokens, |t| t.is_keyword("end"))?
    } else {
        Vec::new()
    };
    expect_keyword(tokens, "end")?;

    if catches.is_empty() && finally.is_empty() {
        return Ok(collapse(body, pos));
    }
    Ok(Node::Block { body,
                     catches,
                     finally,
                     pos })
}

/// Parses a parenthesised statement sequence `( stmt ; stmt … )`.
///
/// A single statement in parentheses is just that statement, which makes
/// plain grouping `(a + b)` a special case.
pub fn parse_paren_block<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_symbol(tokens, "(")?.pos.clone();
    let body = parse_statements(tokens, |t| t.is_symbol(")"))?;
    expect_symbol(tokens, ")")?;
    Ok(collapse(body, pos))
}

/// Parses an `if` expression with optional `elif` branches and `else`.
///
/// Syntax:
/// ```text
///     if <condition> then <statement>
///     (elif <condition> then <statement>)*
///     (else <statement>)?
/// ```
///
/// # Returns
/// A [`Node::If`] holding every branch in order.
pub fn parse_if<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_keyword(tokens, "if")?.pos.clone();
    let mut branches = Vec::new();
    loop {
        let condition = parse_expression(tokens)?;
        expect_keyword(tokens, "then")?;
        let branch = parse_statement(tokens)?;
        branches.push((condition, branch));
        if !consume_keyword(tokens, "elif") {
            break;
        }
    }

    let otherwise = if consume_keyword(tokens, "else") {
        Some(Box::new(parse_statement(tokens)?))
    } else {
        None
    };

    Ok(Node::If { branches,
                  otherwise,
                  pos })
}

/// Parses `for x in iterable body` and `for [a, b] in iterable body`.
pub fn parse_for<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_keyword(tokens, "for")?.pos.clone();
    let target = if consume_symbol(tokens, "[") {
        LoopTarget::Destructure(parse_comma_separated(tokens, |t| Ok(parse_identifier(t)?.0), "]")?)
    } else {
        LoopTarget::Name(parse_identifier(tokens)?.0)
    };
    expect_keyword(tokens, "in")?;
    let iterable = parse_expression(tokens)?;
    let body = parse_statement(tokens)?;

    Ok(Node::For { target,
                   iterable: Box::new(iterable),
                   body: Box::new(body),
                   pos })
}

/// Parses `while condition body`.
pub fn parse_while<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_keyword(tokens, "while")?.pos.clone();
    let condition = parse_expression(tokens)?;
    let body = parse_statement(tokens)?;

    Ok(Node::While { condition: Box::new(condition),
                     body: Box::new(body),
                     pos })
}

/// Parses an anonymous function `fn(params) body`.
pub fn parse_lambda<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_keyword(tokens, "fn")?.pos.clone();
    let params = parse_params(tokens)?;
    parse_lambda_rest(tokens, None, params, pos)
}

/// Parses a lambda body and assembles the lambda node.
pub(in crate::interpreter::parser) fn parse_lambda_rest<'a, I>(tokens: &mut Peekable<I>,
                                                               name: Option<String>,
                                                               params: Vec<Parameter>,
                                                               pos: SourcePos)
                                                               -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let body = parse_statement(tokens)?;
    Ok(Node::Lambda { name,
                      params: Rc::from(params),
                      body: Rc::new(body),
                      pos })
}

/// Parses a parenthesised parameter list.
///
/// Grammar:
/// ```text
///     params := "(" (param ("," param)*)? ")"
///     param  := identifier "..."? ("=" expression)?
/// ```
///
/// # Errors
/// `MisplacedRestParameter` if a rest parameter is not the last one.
pub(in crate::interpreter::parser) fn parse_params<'a, I>(tokens: &mut Peekable<I>)
                                                          -> ParseResult<Vec<Parameter>>
    where I: Iterator<Item = &'a Token> + Clone
{
    expect_symbol(tokens, "(")?;
    let params = parse_comma_separated(tokens, parse_param, ")")?;

    if let Some((_, init)) = params.split_last()
       && let Some((misplaced, pos)) = init.iter().find(|(p, _)| p.rest)
    {
        return Err(SyntaxError::MisplacedRestParameter { name: misplaced.name.clone(),
                                                         pos:  pos.clone(), });
    }
    Ok(params.into_iter().map(|(param, _)| param).collect())
}

fn parse_param<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<(Parameter, SourcePos)>
    where I: Iterator<Item = &'a Token> + Clone
{
    let (name, pos) = parse_identifier(tokens)?;
    let rest = consume_symbol(tokens, "...");
    let default = if consume_symbol(tokens, "=") {
        Some(parse_expression(tokens)?)
    } else {
        None
    };
    Ok((Parameter { name, default, rest }, pos))
}
