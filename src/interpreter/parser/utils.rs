use std::iter::Peekable;

use crate::{
    error::SyntaxError,
    interpreter::{
        parser::core::ParseResult,
        token::{SourcePos, Token, TokenKind},
    },
};

/// Builds the error for an unexpected token, or for the end of input when
/// `token` is the end marker.
pub(in crate::interpreter::parser) fn unexpected(token: &Token, expected: &str) -> SyntaxError {
    if token.kind == TokenKind::Eof {
        SyntaxError::UnexpectedEndOfInput { pos: token.pos.clone() }
    } else {
        SyntaxError::UnexpectedToken { token:    token.to_string(),
                                       expected: expected.to_string(),
                                       pos:      token.pos.clone(), }
    }
}

/// Returns the next token without consuming it.
///
/// The lexer terminates every stream with an end marker, so running out of
/// tokens only happens after the marker was consumed.
pub(in crate::interpreter::parser) fn peek_token<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<&'a Token>
    where I: Iterator<Item = &'a Token>
{
    tokens.peek()
          .copied()
          .ok_or_else(|| SyntaxError::UnexpectedEndOfInput { pos: SourcePos::native() })
}

/// Consumes and returns the next token.
pub(in crate::interpreter::parser) fn next_token<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<&'a Token>
    where I: Iterator<Item = &'a Token>
{
    tokens.next()
          .ok_or_else(|| SyntaxError::UnexpectedEndOfInput { pos: SourcePos::native() })
}

/// Returns the token `n` positions ahead of the next one without consuming
/// anything.
pub(in crate::interpreter::parser) fn lookahead<'a, I>(tokens: &Peekable<I>, n: usize) -> Option<&'a Token>
    where I: Iterator<Item = &'a Token> + Clone
{
    tokens.clone().nth(n)
}

/// Consumes the next token if it is the interpunction `symbol`.
pub(in crate::interpreter::parser) fn consume_symbol<'a, I>(tokens: &mut Peekable<I>, symbol: &str) -> bool
    where I: Iterator<Item = &'a Token>
{
    tokens.next_if(|t| t.is_symbol(symbol)).is_some()
}

/// Consumes the next token if it is the keyword `word`.
pub(in crate::interpreter::parser) fn consume_keyword<'a, I>(tokens: &mut Peekable<I>, word: &str) -> bool
    where I: Iterator<Item = &'a Token>
{
    tokens.next_if(|t| t.is_keyword(word)).is_some()
}

/// Consumes the interpunction `symbol` or fails.
pub(in crate::interpreter::parser) fn expect_symbol<'a, I>(tokens: &mut Peekable<I>,
                                                           symbol: &str)
                                                           -> ParseResult<&'a Token>
    where I: Iterator<Item = &'a Token>
{
    let token = next_token(tokens)?;
    if token.is_symbol(symbol) {
        Ok(token)
    } else {
        Err(unexpected(token, &format!("'{symbol}'")))
    }
}

/// Consumes the keyword `word` or fails.
pub(in crate::interpreter::parser) fn expect_keyword<'a, I>(tokens: &mut Peekable<I>,
                                                            word: &str)
                                                            -> ParseResult<&'a Token>
    where I: Iterator<Item = &'a Token>
{
    let token = next_token(tokens)?;
    if token.is_keyword(word) {
        Ok(token)
    } else {
        Err(unexpected(token, &format!("'{word}'")))
    }
}

/// Parses a plain identifier and returns its name and position.
///
/// # Errors
/// Returns a `SyntaxError` if the next token is not an identifier.
pub(in crate::interpreter::parser) fn parse_identifier<'a, I>(tokens: &mut Peekable<I>)
                                                              -> ParseResult<(String, SourcePos)>
    where I: Iterator<Item = &'a Token>
{
    let token = next_token(tokens)?;
    if token.kind == TokenKind::Identifier {
        Ok((token.value.clone(), token.pos.clone()))
    } else {
        Err(unexpected(token, "an identifier"))
    }
}

/// Parses a comma-separated list of items until a closing symbol.
///
/// This utility is shared by collection literals, argument lists and
/// parameter lists. It repeatedly calls `parse_item` to parse one element,
/// expecting either:
///
/// - a comma, to continue the list, or
/// - the closing symbol, to end it.
///
/// An immediately encountered closing symbol produces an empty list.
///
/// Grammar (simplified): `list := item ("," item)*`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the first item or closing symbol.
/// - `parse_item`: Function used to parse each list element.
/// - `closing`: The symbol that terminates the list (e.g., `]` or `)`).
///
/// # Returns
/// A vector of parsed items.
///
/// # Errors
/// Returns a `SyntaxError` if:
/// - an item fails to parse,
/// - an unexpected token is encountered,
/// - the stream ends before the closing symbol.
pub(in crate::interpreter::parser) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    parse_item: impl Fn(&mut Peekable<I>) -> ParseResult<T>,
    closing: &str)
    -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut items = Vec::new();
    if consume_symbol(tokens, closing) {
        return Ok(items);
    }
    loop {
        items.push(parse_item(tokens)?);
        let token = next_token(tokens)?;
        if token.is_symbol(",") {
            continue;
        }
        if token.is_symbol(closing) {
            break;
        }
        return Err(unexpected(token, &format!("',' or '{closing}'")));
    }
    Ok(items)
}
