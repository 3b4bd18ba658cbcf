use std::iter::Peekable;

use crate::{
    ast::{LogicalOp, Node},
    interpreter::{
        parser::{
            core::ParseResult,
            unary::parse_unary,
            utils::{consume_keyword, lookahead, peek_token},
        },
        token::{Token, TokenKind},
    },
};

/// Parses one left-associative level of `and`, `or` or `xor`.
fn parse_logical<'a, I>(tokens: &mut Peekable<I>,
                        keyword: &str,
                        op: LogicalOp,
                        parse_operand: fn(&mut Peekable<I>) -> ParseResult<Node>)
                        -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_operand(tokens)?;
    loop {
        let pos = peek_token(tokens)?.pos.clone();
        if !consume_keyword(tokens, keyword) {
            break;
        }
        let right = parse_operand(tokens)?;
        left = Node::Logical { op,
                               left: Box::new(left),
                               right: Box::new(right),
                               pos };
    }
    Ok(left)
}

/// Parses `or` expressions, the lowest precedence level.
///
/// The rule is: `or := xor ("or" xor)*`
pub fn parse_or<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    parse_logical(tokens, "or", LogicalOp::Or, parse_xor)
}

/// The rule is: `xor := and ("xor" and)*`
pub fn parse_xor<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    parse_logical(tokens, "xor", LogicalOp::Xor, parse_and)
}

/// The rule is: `and := not ("and" not)*`
pub fn parse_and<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    parse_logical(tokens, "and", LogicalOp::And, parse_not)
}

/// Parses logical negation.
///
/// `not` is right-associative, so `not not x` negates twice.
///
/// The rule is: `not := "not" not | relational`
pub fn parse_not<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = peek_token(tokens)?.pos.clone();
    if consume_keyword(tokens, "not") {
        let operand = parse_not(tokens)?;
        return Ok(Node::Not { operand: Box::new(operand),
                              pos });
    }
    parse_relational(tokens)
}

/// Returns the comparison function of the relational operator at the front
/// of the stream, and how many tokens spell it.
fn relational_operator<'a, I>(tokens: &Peekable<I>) -> Option<(&'static str, usize)>
    where I: Iterator<Item = &'a Token> + Clone
{
    let token = lookahead(tokens, 0)?;
    if token.is_keyword("is") {
        return if lookahead(tokens, 1).is_some_and(|t| t.is_keyword("not")) {
            Some(("not_equals", 2))
        } else {
            Some(("equals", 1))
        };
    }
    if token.kind != TokenKind::Interpunction {
        return None;
    }
    let function = match token.value.as_str() {
        "==" => "equals",
        "!=" | "<>" => "not_equals",
        "<" => "less",
        "<=" => "less_equals",
        ">" => "greater",
        ">=" => "greater_equals",
        _ => return None,
    };
    Some((function, 1))
}

/// Parses relational and equality operators.
///
/// Handles `==`, `!=`, `<>`, `<`, `<=`, `>`, `>=`, `is` and `is not`, each
/// desugared into a call of the matching comparison function.
///
/// A chain such as `a < b <= c` becomes the conjunction of its pairwise
/// comparisons, `less(a, b) and less_equals(b, c)`.
///
/// The rule is: `relational := additive (op additive)*`
///
/// # Parameters
/// - `tokens`: Token stream wrapped in a `Peekable`.
///
/// # Returns
/// The comparison call, the conjunction of a chain, or the additive
/// expression when no operator follows.
pub fn parse_relational<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_additive(tokens)?;
    let mut chain: Option<Node> = None;

    while let Some((function, length)) = relational_operator(tokens) {
        let pos = peek_token(tokens)?.pos.clone();
        for _ in 0..length {
            tokens.next();
        }
        let right = parse_additive(tokens)?;
        let comparison = Node::call_named(function, vec![left, right.clone()], &pos);

        chain = Some(match chain {
                         None => comparison,
                         Some(previous) => Node::Logical { op: LogicalOp::And,
                                                           left: Box::new(previous),
                                                           right: Box::new(comparison),
                                                           pos },
                     });
        left = right;
    }

    Ok(chain.unwrap_or(left))
}

/// Parses one left-associative level of arithmetic operators.
fn parse_arithmetic<'a, I>(tokens: &mut Peekable<I>,
                           operators: &[(&str, &str)],
                           parse_operand: fn(&mut Peekable<I>) -> ParseResult<Node>)
                           -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_operand(tokens)?;
    loop {
        let token = peek_token(tokens)?;
        let Some((_, function)) = operators.iter().find(|(symbol, _)| token.is_symbol(symbol)) else {
            break;
        };
        tokens.next();
        let right = parse_operand(tokens)?;
        left = Node::call_named(function, vec![left, right], &token.pos);
    }
    Ok(left)
}

/// Parses addition and subtraction expressions.
///
/// Handles left-associative binary operators: `+` and `-`, desugared into
/// calls of `add` and `sub`.
///
/// The rule is: `additive := multiplicative (("+" | "-") multiplicative)*`
///
/// # Parameters
/// - `tokens`: Token stream.
///
/// # Returns
/// A tree of calls representing the parsed expression.
pub fn parse_additive<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    parse_arithmetic(tokens, &[("+", "add"), ("-", "sub")], parse_multiplicative)
}

/// Parses multiplication-level expressions.
///
/// Handles left-associative operators `*`, `/` and `%`, desugared into calls
/// of `mul`, `div` and `mod`.
///
/// The rule is: `multiplicative := unary (("*" | "/" | "%") unary)*`
pub fn parse_multiplicative<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    parse_arithmetic(tokens, &[("*", "mul"), ("/", "div"), ("%", "mod")], parse_unary)
}
