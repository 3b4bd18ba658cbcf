use std::{rc::Rc, str::Chars};

use tracing::trace;

use crate::{
    error::SyntaxError,
    interpreter::{
        parser::core::ParseResult,
        token::{SourcePos, Token, TokenKind},
    },
};

/// Reserved words. Identifiers spelled like one of these become
/// [`TokenKind::Keyword`] tokens.
pub const KEYWORDS: &[&str] = &["def",
                                "fn",
                                "do",
                                "end",
                                "if",
                                "then",
                                "elif",
                                "else",
                                "for",
                                "in",
                                "also",
                                "while",
                                "catch",
                                "finally",
                                "break",
                                "continue",
                                "return",
                                "error",
                                "require",
                                "as",
                                "unqualified",
                                "import",
                                "and",
                                "or",
                                "xor",
                                "not",
                                "is",
                                "with",
                                "contains",
                                "matches"];

/// Every multi-character operator. Each proper prefix of an entry is either
/// a single character or itself in this list, which lets the scanner extend
/// operators one character at a time.
const OPERATORS: &[&str] = &["<<<", ">>>", "...", "<<", "<=", "<*", "<>", ">>", ">=", "!=", "!>",
                             "->", "-=", "*>", "*=", "/=", "+=", "%=", "==", "=>", ".."];

/// Scanner states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Identifier,
    Int,
    Decimal,
    Operator,
    Comment,
    Str(char),
    Escape(char),
    Pattern,
    PatternSlash,
}

/// Converts source text into a token stream terminated by an
/// [`TokenKind::Eof`] token.
///
/// Fails only for malformed escape sequences and unterminated string or
/// pattern literals. Any other unexpected character is passed on as an
/// interpunction token for the parser to reject.
///
/// # Example
/// ```
/// use ckl::interpreter::{lexer::tokenize, token::TokenKind};
///
/// let tokens = tokenize("def x = 1.5 # comment", "{input}").unwrap();
/// let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
///
/// assert_eq!(kinds,
///            vec![TokenKind::Keyword,
///                 TokenKind::Identifier,
///                 TokenKind::Interpunction,
///                 TokenKind::Decimal,
///                 TokenKind::Eof]);
/// ```
pub fn tokenize(source: &str, filename: &str) -> ParseResult<Vec<Token>> {
    let tokens = Lexer::new(source, filename).run()?;
    trace!(filename, count = tokens.len(), "tokenized");
    Ok(tokens)
}

struct Lexer<'a> {
    chars:    Chars<'a>,
    filename: Rc<str>,
    line:     usize,
    column:   usize,
    tokens:   Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, filename: &str) -> Self {
        Self { chars:    source.chars(),
               filename: Rc::from(filename),
               line:     1,
               column:   1,
               tokens:   Vec::new(), }
    }

    fn pos(&self) -> SourcePos {
        SourcePos::new(&self.filename, self.line, self.column)
    }

    /// Peeks at the next character without consuming it.
    fn first(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Peeks one character past [`Self::first`].
    fn second(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    /// Consumes one character. This is the only place the position advances.
    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn emit(&mut self, kind: TokenKind, text: &mut String, start: &SourcePos) {
        let kind = match kind {
            TokenKind::Identifier if text == "TRUE" || text == "FALSE" => TokenKind::Boolean,
            TokenKind::Identifier if KEYWORDS.contains(&text.as_str()) => TokenKind::Keyword,
            other => other,
        };
        self.tokens.push(Token::new(kind, std::mem::take(text), start.clone()));
    }

    fn run(mut self) -> ParseResult<Vec<Token>> {
        let mut state = State::Start;
        let mut text = String::new();
        let mut start = self.pos();

        while let Some(ch) = self.first() {
            state = match state {
                State::Start => {
                    start = self.pos();
                    self.bump();
                    Self::start_state(ch, &mut text)
                },
                State::Identifier => {
                    if ch.is_alphanumeric() || ch == '_' {
                        self.bump();
                        text.push(ch);
                        State::Identifier
                    } else {
                        self.emit(TokenKind::Identifier, &mut text, &start);
                        State::Start
                    }
                },
                State::Int => {
                    if ch.is_ascii_digit() {
                        self.bump();
                        text.push(ch);
                        State::Int
                    } else if ch == '.' && self.second().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                        text.push(ch);
                        State::Decimal
                    } else {
                        self.emit(TokenKind::Int, &mut text, &start);
                        State::Start
                    }
                },
                State::Decimal => {
                    if ch.is_ascii_digit() {
                        self.bump();
                        text.push(ch);
                        State::Decimal
                    } else {
                        self.emit(TokenKind::Decimal, &mut text, &start);
                        State::Start
                    }
                },
                State::Operator => {
                    if text == "/" && ch == '/' {
                        self.bump();
                        text.clear();
                        State::Pattern
                    } else if extends_operator(&text, ch) {
                        self.bump();
                        text.push(ch);
                        State::Operator
                    } else {
                        self.emit(TokenKind::Interpunction, &mut text, &start);
                        State::Start
                    }
                },
                State::Comment => {
                    self.bump();
                    if ch == '\n' { State::Start } else { State::Comment }
                },
                State::Str(quote) => {
                    self.bump();
                    if ch == quote {
                        self.emit(TokenKind::String, &mut text, &start);
                        State::Start
                    } else if ch == '\\' {
                        State::Escape(quote)
                    } else {
                        text.push(ch);
                        State::Str(quote)
                    }
                },
                State::Escape(quote) => {
                    let escape_pos = self.pos();
                    self.bump();
                    match ch {
                        'n' => text.push('\n'),
                        'r' => text.push('\r'),
                        't' => text.push('\t'),
                        '\\' | '\'' | '"' => text.push(ch),
                        'x' if quote == '"' => {
                            self.scan_hex(&mut text, &escape_pos)?;
                        },
                        _ => {
                            return Err(SyntaxError::InvalidEscape { sequence: format!("\\{ch}"),
                                                                    pos:      escape_pos, });
                        },
                    }
                    State::Str(quote)
                },
                State::Pattern => {
                    self.bump();
                    if ch == '/' {
                        State::PatternSlash
                    } else {
                        text.push(ch);
                        State::Pattern
                    }
                },
                State::PatternSlash => {
                    if ch == '/' {
                        self.bump();
                        self.emit(TokenKind::Pattern, &mut text, &start);
                        State::Start
                    } else {
                        text.push('/');
                        State::Pattern
                    }
                },
            };
        }

        self.flush(state, &mut text, &start)?;
        let end = self.pos();
        self.tokens.push(Token::new(TokenKind::Eof, "", end));
        Ok(self.tokens)
    }

    /// Decides the state that follows the first character of a token.
    fn start_state(ch: char, text: &mut String) -> State {
        match ch {
            c if c.is_whitespace() => State::Start,
            '#' => State::Comment,
            '\'' | '"' => State::Str(ch),
            c if c.is_alphabetic() || c == '_' => {
                text.push(c);
                State::Identifier
            },
            c if c.is_ascii_digit() => {
                text.push(c);
                State::Int
            },
            c => {
                text.push(c);
                State::Operator
            },
        }
    }

    /// Reads the two hex digits of a `\xHH` escape and appends the character.
    fn scan_hex(&mut self, text: &mut String, escape_pos: &SourcePos) -> ParseResult<()> {
        let mut value = 0u32;
        for _ in 0..2 {
            let Some(ch) = self.first() else {
                return Err(SyntaxError::UnterminatedString { pos: escape_pos.clone() });
            };
            let Some(digit) = ch.to_digit(16) else {
                return Err(SyntaxError::InvalidEscape { sequence: format!("\\x{ch}"),
                                                        pos:      escape_pos.clone(), });
            };
            self.bump();
            value = value * 16 + digit;
        }
        text.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
        Ok(())
    }

    /// Finishes whatever token is in progress at end of input.
    fn flush(&mut self, state: State, text: &mut String, start: &SourcePos) -> ParseResult<()> {
        match state {
            State::Start | State::Comment => {},
            State::Identifier => self.emit(TokenKind::Identifier, text, start),
            State::Int => self.emit(TokenKind::Int, text, start),
            State::Decimal => self.emit(TokenKind::Decimal, text, start),
            State::Operator => self.emit(TokenKind::Interpunction, text, start),
            State::Str(_) | State::Escape(_) => {
                return Err(SyntaxError::UnterminatedString { pos: start.clone() });
            },
            State::Pattern | State::PatternSlash => {
                return Err(SyntaxError::UnterminatedPattern { pos: start.clone() });
            },
        }
        Ok(())
    }
}

/// Returns `true` if appending `ch` to the operator `text` still spells an
/// operator.
fn extends_operator(text: &str, ch: char) -> bool {
    let mut candidate = String::with_capacity(text.len() + 1);
    candidate.push_str(text);
    candidate.push(ch);
    OPERATORS.contains(&candidate.as_str())
}
