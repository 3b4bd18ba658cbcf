use std::iter::Peekable;

use crate::{
    ast::{ComprehensionKind, Generator, Generators, MapEntry, Node, ObjectEntry},
    interpreter::{
        parser::{
            core::{ParseResult, parse_expression},
            unary::parse_postfix_expression,
            utils::{
                consume_keyword, consume_symbol, expect_keyword, expect_symbol,
                parse_comma_separated, parse_identifier, peek_token,
            },
        },
        token::{SourcePos, Token},
    },
};

/// Parses a list literal or list comprehension.
///
/// Grammar:
/// ```text
///     list := "[" (element ("," element)*)? "]"
///           | "[" expression generators ("if" expression)? "]"
/// ```
///
/// # Parameters
/// - `tokens`: Token iterator positioned at `[`.
///
/// # Returns
/// A [`Node::List`] or a [`Node::Comprehension`] of kind `List`.
///
/// # Example
/// ```
/// use ckl::interpreter::parser::core::parse_source;
///
/// let node = parse_source("[x * x for x in xs if x > 1]", "{input}").unwrap();
/// assert_eq!(node.to_string(), "[mul(x, x) for x in xs if greater(x, 1)]");
/// ```
pub fn parse_list<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_symbol(tokens, "[")?.pos.clone();
    parse_sequence(tokens, ComprehensionKind::List, "]", pos)
}

/// Parses a set literal `<<a, b>>` or set comprehension.
pub fn parse_set<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_symbol(tokens, "<<")?.pos.clone();
    parse_sequence(tokens, ComprehensionKind::Set, ">>", pos)
}

/// Shared body of list and set literals, which differ only in delimiters.
fn parse_sequence<'a, I>(tokens: &mut Peekable<I>,
                         kind: ComprehensionKind,
                         closing: &str,
                         pos: SourcePos)
                         -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let build = |elements, pos| match kind {
        ComprehensionKind::Set => Node::Set { elements, pos },
        _ => Node::List { elements, pos },
    };

    if consume_symbol(tokens, closing) {
        return Ok(build(Vec::new(), pos));
    }

    let first = parse_expression(tokens)?;
    if peek_token(tokens)?.is_keyword("for") {
        let node = parse_comprehension(tokens, kind, first, None, pos)?;
        expect_symbol(tokens, closing)?;
        return Ok(node);
    }

    let mut elements = vec![first];
    if !consume_symbol(tokens, closing) {
        expect_symbol(tokens, ",")?;
        elements.extend(parse_comma_separated(tokens, parse_expression, closing)?);
    }
    Ok(build(elements, pos))
}

/// Parses a map literal or map comprehension.
///
/// Grammar:
/// ```text
///     map   := "<<<" (entry ("," entry)*)? ">>>"
///            | "<<<" expression "=>" expression generators ("if" expression)? ">>>"
///     entry := expression "=>" expression | "..." expression
/// ```
pub fn parse_map<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_symbol(tokens, "<<<")?.pos.clone();
    if consume_symbol(tokens, ">>>") {
        return Ok(Node::Map { entries: Vec::new(),
                              pos });
    }

    let first = parse_map_entry(tokens)?;
    if let MapEntry::Pair(key, value) = &first
       && peek_token(tokens)?.is_keyword("for")
    {
        let node = parse_comprehension(tokens,
                                       ComprehensionKind::Map,
                                       key.clone(),
                                       Some(value.clone()),
                                       pos)?;
        expect_symbol(tokens, ">>>")?;
        return Ok(node);
    }

    let mut entries = vec![first];
    if !consume_symbol(tokens, ">>>") {
        expect_symbol(tokens, ",")?;
        entries.extend(parse_comma_separated(tokens, parse_map_entry, ">>>")?);
    }
    Ok(Node::Map { entries, pos })
}

fn parse_map_entry<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<MapEntry>
    where I: Iterator<Item = &'a Token> + Clone
{
    if consume_symbol(tokens, "...") {
        return Ok(MapEntry::Spread(parse_postfix_expression(tokens)?));
    }
    let key = parse_expression(tokens)?;
    expect_symbol(tokens, "=>")?;
    let value = parse_expression(tokens)?;
    Ok(MapEntry::Pair(key, value))
}

/// Parses an object literal `<* name = value, ...other *>`.
///
/// Later fields override earlier ones, including fields copied by a spread.
pub fn parse_object<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = expect_symbol(tokens, "<*")?.pos.clone();
    let entries = parse_comma_separated(tokens, parse_object_entry, "*>")?;
    Ok(Node::Object { entries, pos })
}

fn parse_object_entry<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<ObjectEntry>
    where I: Iterator<Item = &'a Token> + Clone
{
    if consume_symbol(tokens, "...") {
        return Ok(ObjectEntry::Spread(parse_postfix_expression(tokens)?));
    }
    let (name, _) = parse_identifier(tokens)?;
    expect_symbol(tokens, "=")?;
    Ok(ObjectEntry::Field(name, parse_expression(tokens)?))
}

/// Parses the generators and optional condition following the element of
/// a comprehension.
///
/// Grammar:
/// ```text
///     generators := generator
///                 | generator generator
///                 | generator "also" generator
///     generator  := "for" identifier "in" expression
/// ```
///
/// Two plain generators iterate every combination, the second varying
/// fastest. Joined by `also` they advance together and must yield the same
/// number of elements.
fn parse_comprehension<'a, I>(tokens: &mut Peekable<I>,
                              kind: ComprehensionKind,
                              element: Node,
                              value: Option<Node>,
                              pos: SourcePos)
                              -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    let first = parse_generator(tokens)?;
    let generators = if consume_keyword(tokens, "also") {
        Generators::Parallel(first, parse_generator(tokens)?)
    } else if peek_token(tokens)?.is_keyword("for") {
        Generators::Product(first, parse_generator(tokens)?)
    } else {
        Generators::Single(first)
    };

    let condition = if consume_keyword(tokens, "if") {
        Some(Box::new(parse_expression(tokens)?))
    } else {
        None
    };

    Ok(Node::Comprehension { kind,
                             element: Box::new(element),
                             value: value.map(Box::new),
                             generators: Box::new(generators),
                             condition,
                             pos })
}

fn parse_generator<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Generator>
    where I: Iterator<Item = &'a Token> + Clone
{
    expect_keyword(tokens, "for")?;
    let (var, _) = parse_identifier(tokens)?;
    expect_keyword(tokens, "in")?;
    let iterable = parse_expression(tokens)?;
    Ok(Generator { var, iterable })
}
