use ckl::{
    error::SyntaxError,
    interpreter::{
        lexer::tokenize,
        token::{Token, TokenKind},
    },
};
use pretty_assertions::assert_eq;

fn lex(source: &str) -> Vec<(TokenKind, String)> {
    tokenize(source, "{input}").unwrap_or_else(|e| panic!("Lexing failed: {e}"))
                               .into_iter()
                               .map(|t| (t.kind, t.value))
                               .collect()
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|(kind, _)| kind).collect()
}

fn values(source: &str) -> Vec<String> {
    lex(source).into_iter().map(|(_, value)| value).collect()
}

#[test]
fn stream_ends_with_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_eq!(kinds("   # only a comment"), vec![TokenKind::Eof]);
}

#[test]
fn keywords_identifiers_and_booleans() {
    assert_eq!(lex("def value TRUE FALSE is_empty"),
               vec![(TokenKind::Keyword, "def".to_string()),
                    (TokenKind::Identifier, "value".to_string()),
                    (TokenKind::Boolean, "TRUE".to_string()),
                    (TokenKind::Boolean, "FALSE".to_string()),
                    (TokenKind::Identifier, "is_empty".to_string()),
                    (TokenKind::Eof, String::new())]);
}

#[test]
fn contextual_words_are_identifiers() {
    assert_eq!(kinds("empty starts all"),
               vec![TokenKind::Identifier,
                    TokenKind::Identifier,
                    TokenKind::Identifier,
                    TokenKind::Eof]);
}

#[test]
fn numbers() {
    assert_eq!(lex("42 3.25 7."),
               vec![(TokenKind::Int, "42".to_string()),
                    (TokenKind::Decimal, "3.25".to_string()),
                    (TokenKind::Int, "7".to_string()),
                    (TokenKind::Interpunction, ".".to_string()),
                    (TokenKind::Eof, String::new())]);
}

#[test]
fn operators_take_the_longest_match() {
    assert_eq!(values("<<< >>> << >> <* *> <= <> -> !> ... => += a<b"),
               vec!["<<<", ">>>", "<<", ">>", "<*", "*>", "<=", "<>", "->", "!>", "...", "=>", "+=",
                    "a", "<", "b", ""]);
}

#[test]
fn adjacent_closers_split_into_operators() {
    assert_eq!(values("*>->x"), vec!["*>", "->", "x", ""]);
}

#[test]
fn strings_decode_escapes() {
    assert_eq!(lex(r#"'it\'s' "a\tb\n" "\x41\x62""#),
               vec![(TokenKind::String, "it's".to_string()),
                    (TokenKind::String, "a\tb\n".to_string()),
                    (TokenKind::String, "Ab".to_string()),
                    (TokenKind::Eof, String::new())]);
}

#[test]
fn hex_escapes_need_double_quotes() {
    assert!(matches!(tokenize(r"'\x41'", "{input}"),
                     Err(SyntaxError::InvalidEscape { ref sequence, .. }) if sequence == "\\x"));
}

#[test]
fn invalid_escape_is_error() {
    assert!(matches!(tokenize(r"'\q'", "{input}"), Err(SyntaxError::InvalidEscape { .. })));
}

#[test]
fn unterminated_string_is_error() {
    let Err(SyntaxError::UnterminatedString { pos }) = tokenize("x = 'abc", "{input}") else {
        panic!("expected an unterminated string");
    };
    assert_eq!((pos.line, pos.column), (1, 5));
}

#[test]
fn patterns() {
    assert_eq!(lex("//a/b[0-9]+// / 2"),
               vec![(TokenKind::Pattern, "a/b[0-9]+".to_string()),
                    (TokenKind::Interpunction, "/".to_string()),
                    (TokenKind::Int, "2".to_string()),
                    (TokenKind::Eof, String::new())]);
    assert!(matches!(tokenize("//abc", "{input}"), Err(SyntaxError::UnterminatedPattern { .. })));
}

#[test]
fn comments_run_to_end_of_line() {
    assert_eq!(values("a # b c\nd"), vec!["a", "d", ""]);
}

#[test]
fn positions_are_one_based() {
    let tokens: Vec<Token> = tokenize("def x\n  = 1", "script.ckl").unwrap();
    let positions: Vec<(usize, usize)> = tokens.iter().map(|t| (t.pos.line, t.pos.column)).collect();
    assert_eq!(positions, vec![(1, 1), (1, 5), (2, 3), (2, 5), (2, 6)]);
    assert_eq!(&*tokens[0].pos.filename, "script.ckl");
}

#[test]
fn unicode_identifiers() {
    assert_eq!(lex("größe"),
               vec![(TokenKind::Identifier, "größe".to_string()), (TokenKind::Eof, String::new())]);
}
