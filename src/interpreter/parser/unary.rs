use std::iter::Peekable;

use crate::{
    ast::{CallArgument, LiteralValue, Node},
    error::SyntaxError,
    interpreter::{
        parser::{
            block::{parse_do_block, parse_for, parse_if, parse_lambda, parse_paren_block, parse_while},
            collection::{parse_list, parse_map, parse_object, parse_set},
            core::{ParseResult, parse_expression},
            utils::{
                consume_symbol, expect_symbol, lookahead, next_token,
                parse_comma_separated, parse_identifier, peek_token, unexpected,
            },
        },
        token::{SourcePos, Token, TokenKind},
    },
};

/// Predicate words accepted after `is` and the functions they call.
const IS_PREDICATES: &[(&str, &str)] = &[("empty", "is_empty"),
                                         ("zero", "is_zero"),
                                         ("negative", "is_negative"),
                                         ("numerical", "is_numerical"),
                                         ("alphanumerical", "is_alphanumerical"),
                                         ("date", "is_date"),
                                         ("time", "is_time")];

/// Parses a unary expression.
///
/// Supports the prefix operators `-` and `+`. A `-` directly in front of a
/// numeric literal is folded into a negative literal by [`parse_primary`];
/// in front of anything else it becomes `sub(0, operand)`. A `+` leaves its
/// operand unchanged.
///
/// Unary operators are right-associative, so `- -x` negates twice.
///
/// Grammar:
/// ```text
///     unary := ("-" | "+") unary
///            | predicate
/// ```
///
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
///
/// # Returns
/// The operand, or a call of `sub` wrapping it.
pub fn parse_unary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let token = peek_token(tokens)?;
    if token.is_symbol("-") && !lookahead(tokens, 1).is_some_and(is_numeric_literal) {
        tokens.next();
        let operand = parse_unary(tokens)?;
        let zero = Node::Literal { value: LiteralValue::Int(0),
                                   pos:   token.pos.clone(), };
        return Ok(Node::call_named("sub", vec![zero, operand], &token.pos));
    }
    if consume_symbol(tokens, "+") {
        return parse_unary(tokens);
    }
    parse_predicate(tokens)
}

fn is_numeric_literal(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Int | TokenKind::Decimal)
}

/// Parses the postfix predicates.
///
/// Grammar:
/// ```text
///     predicate := postfix ( "is" "not"? predicate_word
///                          | "not"? ("starts" "with" | "ends" "with" | "contains" | "matches" | "in") postfix )*
///     predicate_word := "empty" | "zero" | "negative" | "numerical"
///                     | "alphanumerical" | "date" ("with" "hour")? | "time"
/// ```
///
/// Each predicate becomes a call of its built-in, `x in y` a call of
/// `contains(y, x)`. A `not` wraps the call in a negation.
pub fn parse_predicate<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut operand = parse_postfix_expression(tokens)?;

    loop {
        let token = peek_token(tokens)?;
        let pos = token.pos.clone();

        if let Some((function, negated, length)) = is_predicate(tokens) {
            for _ in 0..length {
                tokens.next();
            }
            operand = negate(Node::call_named(function, vec![operand], &pos), negated, &pos);
            continue;
        }

        let negated = token.is_keyword("not");
        let offset = usize::from(negated);
        let Some((function, length)) = binary_predicate(tokens, offset) else {
            break;
        };
        for _ in 0..offset + length {
            tokens.next();
        }
        let argument = parse_postfix_expression(tokens)?;
        let call = if function == "in" {
            Node::call_named("contains", vec![argument, operand], &pos)
        } else {
            Node::call_named(function, vec![operand, argument], &pos)
        };
        operand = negate(call, negated, &pos);
    }
    Ok(operand)
}

fn negate(node: Node, negated: bool, pos: &SourcePos) -> Node {
    if negated {
        Node::Not { operand: Box::new(node),
                    pos:     pos.clone(), }
    } else {
        node
    }
}

/// Recognises `is [not] word` at the front of the stream.
///
/// Returns the predicate function, whether it is negated, and the number of
/// tokens to consume. A word followed by `(` is a call, not a predicate, so
/// `x is date(y)` stays a comparison.
fn is_predicate<'a, I>(tokens: &Peekable<I>) -> Option<(&'static str, bool, usize)>
    where I: Iterator<Item = &'a Token> + Clone
{
    if !lookahead(tokens, 0)?.is_keyword("is") {
        return None;
    }
    let negated = lookahead(tokens, 1)?.is_keyword("not");
    let at = 1 + usize::from(negated);
    let word = lookahead(tokens, at)?;
    let (_, function) = IS_PREDICATES.iter().find(|(w, _)| word.is_identifier(w))?;
    if lookahead(tokens, at + 1).is_some_and(|t| t.is_symbol("(")) {
        return None;
    }

    if *function == "is_date"
       && lookahead(tokens, at + 1).is_some_and(|t| t.is_keyword("with"))
       && lookahead(tokens, at + 2).is_some_and(|t| t.is_identifier("hour"))
    {
        return Some(("is_date_hour", negated, at + 3));
    }
    Some((function, negated, at + 1))
}

/// Recognises a two-operand predicate `offset` tokens ahead.
///
/// Returns the function name, `in` for membership, and the number of tokens
/// spelling the predicate.
fn binary_predicate<'a, I>(tokens: &Peekable<I>, offset: usize) -> Option<(&'static str, usize)>
    where I: Iterator<Item = &'a Token> + Clone
{
    let token = lookahead(tokens, offset)?;
    let followed_by_with = || lookahead(tokens, offset + 1).is_some_and(|t| t.is_keyword("with"));

    if token.is_identifier("starts") && followed_by_with() {
        Some(("starts_with", 2))
    } else if token.is_identifier("ends") && followed_by_with() {
        Some(("ends_with", 2))
    } else if token.is_keyword("contains") {
        Some(("contains", 1))
    } else if token.is_keyword("matches") {
        Some(("matches", 1))
    } else if token.is_keyword("in") {
        Some(("in", 1))
    } else {
        None
    }
}

/// Parses a primary expression followed by any postfix operators.
pub fn parse_postfix_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let primary = parse_primary(tokens)?;
    parse_postfix(tokens, primary)
}

/// Applies postfix operators to an already parsed expression.
///
/// Supported forms:
/// - `f(args)`: call.
/// - `x[i]`: indexing.
/// - `x->name`: member access, the same as `x['name']`.
/// - `x->name(args)`: member invocation.
/// - `x !> f(args)` and `x !> f`: pipeline, calling `f` with `x` as the
///   first argument.
///
/// Operators chain left to right, so `a->b(1)[0]` indexes the result of the
/// invocation.
pub fn parse_postfix<'a, I>(tokens: &mut Peekable<I>, mut expr: Node) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    loop {
        let token = peek_token(tokens)?;
        let pos = token.pos.clone();

        if consume_symbol(tokens, "(") {
            let args = parse_call_arguments(tokens)?;
            expr = Node::Call { function: Box::new(expr),
                                args,
                                pos };
        } else if consume_symbol(tokens, "[") {
            let index = parse_expression(tokens)?;
            expect_symbol(tokens, "]")?;
            expr = Node::Deref { target: Box::new(expr),
                                 index: Box::new(index),
                                 pos };
        } else if consume_symbol(tokens, "->") {
            let (member, member_pos) = parse_identifier(tokens)?;
            if consume_symbol(tokens, "(") {
                let args = parse_call_arguments(tokens)?;
                expr = Node::Invoke { target: Box::new(expr),
                                      member,
                                      args,
                                      pos };
            } else {
                let index = Node::Literal { value: LiteralValue::String(member),
                                            pos:   member_pos, };
                expr = Node::Deref { target: Box::new(expr),
                                     index: Box::new(index),
                                     pos };
            }
        } else if consume_symbol(tokens, "!>") {
            let function = parse_primary(tokens)?;
            let mut args = vec![CallArgument::positional(expr)];
            if consume_symbol(tokens, "(") {
                args.extend(parse_call_arguments(tokens)?);
            }
            expr = Node::Call { function: Box::new(function),
                                args,
                                pos };
        } else {
            return Ok(expr);
        }
    }
}

/// Parses call arguments after the opening parenthesis.
///
/// An argument is `name = expression`, `...expression` or a plain
/// expression.
pub fn parse_call_arguments<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<CallArgument>>
    where I: Iterator<Item = &'a Token> + Clone
{
    parse_comma_separated(tokens, parse_call_argument, ")")
}

fn parse_call_argument<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<CallArgument>
    where I: Iterator<Item = &'a Token> + Clone
{
    let is_named = lookahead(tokens, 0).is_some_and(|t| t.kind == TokenKind::Identifier)
                   && lookahead(tokens, 1).is_some_and(|t| t.is_symbol("="));
    if is_named {
        let (name, _) = parse_identifier(tokens)?;
        tokens.next();
        return Ok(CallArgument { name:  Some(name),
                                 value: parse_expression(tokens)?, });
    }
    Ok(CallArgument::positional(parse_expression(tokens)?))
}

/// Parses a primary (atomic) expression.
///
/// Primary expressions form the base of the expression grammar and include:
/// - literals, including negative numeric literals
/// - identifiers
/// - lambdas (`fn`)
/// - `do` blocks and parenthesised statement sequences
/// - `if`, `for` and `while`
/// - list, set, map and object literals and comprehensions
/// - spreads (`...x`)
///
/// This function does not handle unary or postfix operators. It dispatches
/// to specialised parsing functions depending on the leading token.
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the start of a primary expression.
///
/// # Returns
/// The parsed primary [`Node`] or a `SyntaxError` on failure.
pub fn parse_primary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let token = peek_token(tokens)?;
    let pos = token.pos.clone();

    match token.kind {
        TokenKind::Int | TokenKind::Decimal | TokenKind::String | TokenKind::Pattern | TokenKind::Boolean => {
            tokens.next();
            parse_literal(token, "")
        },
        TokenKind::Identifier => {
            tokens.next();
            Ok(Node::Identifier { name: token.value.clone(),
                                  pos })
        },
        TokenKind::Keyword => match token.value.as_str() {
            "fn" => parse_lambda(tokens),
            "do" => parse_do_block(tokens),
            "if" => parse_if(tokens),
            "for" => parse_for(tokens),
            "while" => parse_while(tokens),
            _ => Err(unexpected(token, "an expression")),
        },
        TokenKind::Interpunction => match token.value.as_str() {
            "-" => {
                tokens.next();
                parse_literal(next_token(tokens)?, "-")
            },
            "(" => parse_paren_block(tokens),
            "[" => parse_list(tokens),
            "<<" => parse_set(tokens),
            "<<<" => parse_map(tokens),
            "<*" => parse_object(tokens),
            "..." => {
                tokens.next();
                let value = parse_postfix_expression(tokens)?;
                Ok(Node::Spread { value: Box::new(value),
                                  pos })
            },
            _ => Err(unexpected(token, "an expression")),
        },
        TokenKind::Eof => Err(unexpected(token, "an expression")),
    }
}

/// Builds a literal node from a literal token.
///
/// `sign` is prepended to numeric text, so folding `-` into the literal
/// accepts `-9223372036854775808`.
fn parse_literal(token: &Token, sign: &str) -> ParseResult<Node> {
    let invalid = || SyntaxError::InvalidNumber { text: format!("{sign}{}", token.value),
                                                  pos:  token.pos.clone(), };
    let value = match token.kind {
        TokenKind::Int => LiteralValue::Int(format!("{sign}{}", token.value).parse().map_err(|_| invalid())?),
        TokenKind::Decimal => {
            LiteralValue::Decimal(format!("{sign}{}", token.value).parse().map_err(|_| invalid())?)
        },
        TokenKind::String if sign.is_empty() => LiteralValue::String(token.value.clone()),
        TokenKind::Pattern if sign.is_empty() => LiteralValue::Pattern(token.value.clone()),
        TokenKind::Boolean if sign.is_empty() => LiteralValue::Boolean(token.value == "TRUE"),
        _ => return Err(unexpected(token, "a literal")),
    };
    Ok(Node::Literal { value,
                       pos: token.pos.clone() })
}
