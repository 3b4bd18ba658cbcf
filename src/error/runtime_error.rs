use crate::{
    error::SyntaxError,
    interpreter::{token::SourcePos, value::core::Value},
};

#[derive(Debug, Clone)]
/// Represents the kinds of errors raised during evaluation.
pub enum RuntimeErrorKind {
    /// Looked up a name that no enclosing environment binds.
    UndefinedSymbol {
        /// The name of the symbol.
        name: String,
    },
    /// Tried to call a value that is not a function.
    NotAFunction {
        /// The type of the value that was called.
        found: String,
    },
    /// A required parameter received no argument and has no default.
    MissingArgument {
        /// The function being called.
        function: String,
        /// The parameter left unbound.
        param:    String,
    },
    /// More positional arguments than parameters, and no rest parameter.
    TooManyArguments {
        /// The function being called.
        function: String,
    },
    /// A named argument matches no parameter, and no rest parameter exists.
    UnknownArgument {
        /// The function being called.
        function: String,
        /// The argument name.
        name:     String,
    },
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
    },
    /// Attempted division by zero and no `DIV_0_VALUE` is configured.
    DivisionByZero,
    /// Integer arithmetic overflowed.
    Overflow,
    /// Tried to access a list or string element outside its bounds.
    IndexOutOfBounds {
        /// The index that was requested.
        index:  i64,
        /// The length of the indexed value.
        length: usize,
    },
    /// An object has no field of this name.
    UnknownField {
        /// The requested field.
        name: String,
    },
    /// A pattern could not be compiled as a regular expression.
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// The reason reported by the regex engine.
        details: String,
    },
    /// `break` or `continue` reached a function or program boundary without
    /// an enclosing loop.
    ControlFlowEscape {
        /// The sentinel that escaped.
        sentinel: &'static str,
    },
    /// Too many nested calls.
    StackOverflow {
        /// The configured depth limit.
        depth: usize,
    },
    /// A module requires itself, directly or through other modules.
    CircularRequire {
        /// The module whose load was attempted again.
        module: String,
        /// The modules currently being loaded, outermost first.
        chain:  Vec<String>,
    },
    /// No source could be found for a module.
    ModuleNotFound {
        /// The module specification.
        module:  String,
        /// Why the source provider failed.
        details: String,
    },
    /// Source text handed to `require` or `eval` did not parse.
    Syntax(Box<SyntaxError>),
    /// Reading or writing a stream failed.
    Io {
        /// The underlying error message.
        details: String,
    },
    /// The `assert` built-in received a falsy value.
    AssertionFailed,
    /// Raised by user code through `error expr`.
    Thrown {
        /// The value passed to `error`.
        payload: Value,
    },
}

impl std::fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedSymbol { name } => write!(f, "Symbol '{name}' is not defined"),
            Self::NotAFunction { found } => write!(f, "Cannot call a value of type {found}"),
            Self::MissingArgument { function, param } => {
                write!(f, "Missing argument '{param}' in call to {function}")
            },
            Self::TooManyArguments { function } => write!(f, "Too many arguments for {function}"),
            Self::UnknownArgument { function, name } => {
                write!(f, "Function {function} has no parameter named '{name}'")
            },
            Self::TypeError { details } => write!(f, "Type error: {details}"),
            Self::DivisionByZero => write!(f, "Division by zero"),
            Self::Overflow => write!(f, "Integer overflow"),
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "Index {index} out of bounds for length {length}")
            },
            Self::UnknownField { name } => write!(f, "Object has no field '{name}'"),
            Self::InvalidPattern { pattern, details } => {
                write!(f, "Invalid pattern //{pattern}//: {details}")
            },
            Self::ControlFlowEscape { sentinel } => {
                write!(f, "'{sentinel}' used outside of a loop")
            },
            Self::StackOverflow { depth } => {
                write!(f, "Call depth exceeded the limit of {depth} frames")
            },
            Self::CircularRequire { module, chain } => {
                write!(f,
                       "Circular require of module '{module}' (loading {})",
                       chain.join(" -> "))
            },
            Self::ModuleNotFound { module, details } => {
                write!(f, "Module '{module}' not found: {details}")
            },
            Self::Syntax(e) => write!(f, "{e}"),
            Self::Io { details } => write!(f, "I/O error: {details}"),
            Self::AssertionFailed => write!(f, "Assertion failed"),
            Self::Thrown { payload } => write!(f, "{payload}"),
        }
    }
}

/// One entry of a runtime error's stack trace.
#[derive(Debug, Clone)]
pub struct StackFrame {
    /// Description of the call site, usually the called function's name.
    pub description: String,
    /// Where the call happened.
    pub pos:         SourcePos,
}

/// A structured runtime error.
///
/// Runtime errors unwind call frames as ordinary `Err` results. Every call
/// boundary they cross appends a [`StackFrame`], and a `catch` clause whose
/// matcher accepts [`RuntimeError::payload`] stops the unwinding.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    /// What went wrong.
    pub kind:       RuntimeErrorKind,
    /// The position that raised the error.
    pub pos:        SourcePos,
    /// Call frames the error unwound through, innermost first.
    pub stacktrace: Vec<StackFrame>,
}

impl RuntimeError {
    /// Creates an error with an empty stack trace.
    #[must_use]
    pub const fn new(kind: RuntimeErrorKind, pos: SourcePos) -> Self {
        Self { kind,
               pos,
               stacktrace: Vec::new() }
    }

    /// Shorthand for a [`RuntimeErrorKind::TypeError`].
    #[must_use]
    pub fn type_error(details: impl Into<String>, pos: &SourcePos) -> Self {
        Self::new(RuntimeErrorKind::TypeError { details: details.into() }, pos.clone())
    }

    /// Shorthand for a [`RuntimeErrorKind::Thrown`] error raised by `error`.
    #[must_use]
    pub fn thrown(payload: Value, pos: &SourcePos) -> Self {
        Self::new(RuntimeErrorKind::Thrown { payload }, pos.clone())
    }

    /// Appends a call frame while unwinding.
    #[must_use]
    pub fn with_frame(mut self, description: impl Into<String>, pos: &SourcePos) -> Self {
        self.stacktrace.push(StackFrame { description: description.into(),
                                          pos:         pos.clone(), });
        self
    }

    /// The value `catch` matchers see.
    ///
    /// Errors raised by `error expr` expose the thrown value; every other kind
    /// exposes its message as a string.
    #[must_use]
    pub fn payload(&self) -> Value {
        match &self.kind {
            RuntimeErrorKind::Thrown { payload } => payload.clone(),
            kind => Value::String(kind.to_string()),
        }
    }

    /// Renders the stack trace, one frame per line.
    #[must_use]
    pub fn render_stacktrace(&self) -> String {
        self.stacktrace
            .iter()
            .map(|frame| format!("    at {} ({})\n", frame.description, frame.pos))
            .collect()
    }
}

impl From<SyntaxError> for RuntimeError {
    fn from(e: SyntaxError) -> Self {
        let pos = e.pos().clone();
        Self::new(RuntimeErrorKind::Syntax(Box::new(e)), pos)
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error at {}: {}.", self.pos, self.kind)
    }
}

impl std::error::Error for RuntimeError {}
