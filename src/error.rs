use std::fmt;

/// Syntax errors.
///
/// Defines all error types that can occur during lexing and parsing of source
/// code: unterminated literals, malformed escapes, unexpected tokens and
/// misplaced constructs. Syntax errors are never visible to in-language
/// `catch` clauses.
pub mod syntax_error;
/// Runtime errors.
///
/// Contains the structured error raised during evaluation. It carries a kind
/// (and with it a value payload that `catch` clauses match against), the
/// triggering source position, and a stack trace that grows as the error
/// unwinds through call frames.
pub mod runtime_error;

pub use runtime_error::{RuntimeError, RuntimeErrorKind, StackFrame};
pub use syntax_error::SyntaxError;

/// Any failure reported by the interpreter facade.
///
/// The two channels are disjoint: syntax errors come from lexing or parsing a
/// source text, runtime errors from evaluating it.
#[derive(Debug)]
pub enum Error {
    /// The source text could not be tokenized or parsed.
    Syntax(SyntaxError),
    /// Evaluation raised an error that no `catch` clause handled.
    Runtime(RuntimeError),
}

impl From<SyntaxError> for Error {
    fn from(e: SyntaxError) -> Self {
        Self::Syntax(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "{e}"),
            Self::Runtime(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}
