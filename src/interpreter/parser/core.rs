use std::iter::Peekable;

use tracing::debug;

use crate::{
    ast::Node,
    error::SyntaxError,
    interpreter::{
        lexer::tokenize,
        parser::{
            binary::parse_or,
            statement::parse_statement,
            utils::{next_token, peek_token, unexpected},
        },
        token::{SourcePos, Token, TokenKind},
    },
    util::stack::ensure_sufficient_stack,
};

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Parses a complete token stream into a single node.
///
/// A program of one statement is that statement; longer programs become a
/// block without `catch` or `finally` clauses.
///
/// # Parameters
/// - `tokens`: The tokens produced by [`tokenize`], ending with the end
///   marker.
///
/// # Returns
/// The root node of the program.
///
/// # Errors
/// A `SyntaxError` for the first token the grammar does not accept.
pub fn parse(tokens: &[Token]) -> ParseResult<Node> {
    let mut iter = tokens.iter().peekable();
    let pos = tokens.first()
                    .map_or_else(SourcePos::native, |t| t.pos.clone());

    let body = parse_statements(&mut iter, |_| false)?;
    let end = next_token(&mut iter)?;
    if end.kind != TokenKind::Eof {
        return Err(unexpected(end, "end of input"));
    }
    Ok(collapse(body, pos))
}

/// Tokenizes and parses `source` in one step.
///
/// # Example
/// ```
/// use ckl::interpreter::parser::core::parse_source;
///
/// let node = parse_source("a + b * c", "{input}").unwrap();
/// assert_eq!(node.to_string(), "add(a, mul(b, c))");
/// ```
pub fn parse_source(source: &str, filename: &str) -> ParseResult<Node> {
    debug!(filename, bytes = source.len(), "parsing");
    let tokens = tokenize(source, filename)?;
    parse(&tokens)
}

/// Parses a full expression.
///
/// This is the entry point for expression parsing.
/// It begins at the lowest-precedence level, `or`, and recursively
/// descends through the precedence hierarchy:
///
/// ```text
///     or < xor < and < not < relational < additive < multiplicative
///        < unary < predicates < postfix < primary
/// ```
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the expression.
///
/// # Returns
/// The parsed expression node.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Node>
    where I: Iterator<Item = &'a Token> + Clone
{
    ensure_sufficient_stack(|| parse_or(tokens))
}

/// Parses statements until the end of input or a token accepted by
/// `is_terminator`, which is left unconsumed.
///
/// Statements may be separated by `;`.
pub(in crate::interpreter::parser) fn parse_statements<'a, I>(tokens: &mut Peekable<I>,
                                                              is_terminator: impl Fn(&Token) -> bool)
                                                              -> ParseResult<Vec<Node>>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut statements = Vec::new();
    loop {
        while tokens.next_if(|t| t.is_symbol(";")).is_some() {}

        let token = peek_token(tokens)?;
        if token.kind == TokenKind::Eof || is_terminator(token) {
            return Ok(statements);
        }
        statements.push(parse_statement(tokens)?);
    }
}

/// Turns a statement sequence into one node: a single statement stands for
/// itself, anything else becomes a plain block.
pub(in crate::interpreter::parser) fn collapse(mut body: Vec<Node>, pos: SourcePos) -> Node {
    if body.len() == 1
       && let Some(single) = body.pop()
    {
        return single;
    }
    Node::Block { body,
                  catches: Vec::new(),
                  finally: Vec::new(),
                  pos }
}
