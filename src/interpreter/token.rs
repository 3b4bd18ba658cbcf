use std::{fmt, rc::Rc};

/// A location in a source file.
///
/// Lines and columns are 1-based. The filename is shared between all
/// positions of one source so cloning a position is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePos {
    /// The name of the file (or pseudo-file such as `{input}`) the position
    /// belongs to.
    pub filename: Rc<str>,
    /// The 1-based line number.
    pub line:     usize,
    /// The 1-based column number.
    pub column:   usize,
}

impl SourcePos {
    /// Creates a position.
    #[must_use]
    pub fn new(filename: &Rc<str>, line: usize, column: usize) -> Self {
        Self { filename: Rc::clone(filename),
               line,
               column }
    }

    /// A position for values and errors that do not originate from source
    /// text, such as native functions invoked by the host.
    #[must_use]
    pub fn native() -> Self {
        Self { filename: Rc::from("{native}"),
               line:     0,
               column:   0, }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// The category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A name such as `foo` or `_bar1`.
    Identifier,
    /// A reserved word such as `def` or `while`.
    Keyword,
    /// `TRUE` or `FALSE`.
    Boolean,
    /// An integer literal. The text is the digit sequence.
    Int,
    /// A decimal literal such as `3.25`.
    Decimal,
    /// A string literal. The text holds the unescaped contents.
    String,
    /// A pattern literal `//...//`. The text holds the regular expression.
    Pattern,
    /// Operators and punctuation such as `(`, `->` or `<<<`.
    Interpunction,
    /// Marks the end of the token stream.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "identifier",
            Self::Keyword => "keyword",
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Pattern => "pattern",
            Self::Interpunction => "interpunction",
            Self::Eof => "end of input",
        };
        write!(f, "{name}")
    }
}

/// A lexical token. Produced once by the lexer and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token category.
    pub kind:  TokenKind,
    /// The token text. For strings and patterns this is the decoded contents.
    pub value: String,
    /// Where the token starts.
    pub pos:   SourcePos,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>, pos: SourcePos) -> Self {
        Self { kind,
               value: value.into(),
               pos }
    }

    /// Returns `true` if this is the keyword `word`.
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.value == word
    }

    /// Returns `true` if this is the interpunction `symbol`.
    #[must_use]
    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Interpunction && self.value == symbol
    }

    /// Returns `true` if this is an identifier spelled `name`.
    ///
    /// Used for contextual words like `empty` or `starts` that are only
    /// special in one grammatical position.
    #[must_use]
    pub fn is_identifier(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.value == name
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::String => write!(f, "'{}'", self.value),
            TokenKind::Pattern => write!(f, "//{}//", self.value),
            _ => write!(f, "{}", self.value),
        }
    }
}
