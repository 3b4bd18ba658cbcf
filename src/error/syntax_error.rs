use crate::interpreter::token::SourcePos;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur during lexing or parsing.
pub enum SyntaxError {
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// The token encountered.
        token:    String,
        /// What the parser was looking for.
        expected: String,
        /// Where the token starts.
        pos:      SourcePos,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// The position of the end of input.
        pos: SourcePos,
    },
    /// A string literal was not closed before the end of input.
    UnterminatedString {
        /// Where the literal starts.
        pos: SourcePos,
    },
    /// A pattern literal `//...//` was not closed before the end of input.
    UnterminatedPattern {
        /// Where the literal starts.
        pos: SourcePos,
    },
    /// A backslash escape inside a string literal is not supported.
    InvalidEscape {
        /// The offending escape sequence as written.
        sequence: String,
        /// Where the escape starts.
        pos:      SourcePos,
    },
    /// A numeric literal cannot be represented.
    InvalidNumber {
        /// The literal text.
        text: String,
        /// Where the literal starts.
        pos:  SourcePos,
    },
    /// The left side of `=` or a compound assignment is not assignable.
    InvalidAssignmentTarget {
        /// Where the assignment operator is.
        pos: SourcePos,
    },
    /// A rest parameter `name...` is followed by further parameters.
    MisplacedRestParameter {
        /// The rest parameter's name.
        name: String,
        /// Where the parameter is declared.
        pos:  SourcePos,
    },
}

impl SyntaxError {
    /// Returns the position the error refers to.
    #[must_use]
    pub const fn pos(&self) -> &SourcePos {
        match self {
            Self::UnexpectedToken { pos, .. }
            | Self::UnexpectedEndOfInput { pos }
            | Self::UnterminatedString { pos }
            | Self::UnterminatedPattern { pos }
            | Self::InvalidEscape { pos, .. }
            | Self::InvalidNumber { pos, .. }
            | Self::InvalidAssignmentTarget { pos }
            | Self::MisplacedRestParameter { pos, .. } => pos,
        }
    }

    /// Returns the message without the position prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::UnexpectedToken { token, expected, .. } => {
                format!("Unexpected token {token}, expected {expected}")
            },
            Self::UnexpectedEndOfInput { .. } => "Unexpected end of input".to_string(),
            Self::UnterminatedString { .. } => "Unterminated string literal".to_string(),
            Self::UnterminatedPattern { .. } => "Unterminated pattern literal".to_string(),
            Self::InvalidEscape { sequence, .. } => format!("Invalid escape sequence {sequence}"),
            Self::InvalidNumber { text, .. } => format!("Invalid numeric literal {text}"),
            Self::InvalidAssignmentTarget { .. } => {
                "Only identifiers, index and member expressions can be assigned to".to_string()
            },
            Self::MisplacedRestParameter { name, .. } => {
                format!("Rest parameter {name}... must be the last parameter")
            },
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Syntax error at {}: {}.", self.pos(), self.message())
    }
}

impl std::error::Error for SyntaxError {}
