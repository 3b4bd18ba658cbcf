//! # ckl
//!
//! ckl is an embeddable interpreter for a small dynamic scripting language.
//! It tokenizes, parses and evaluates scripts with closures, structured
//! errors, collection comprehensions and modules.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::rc::Rc;

use crate::{
    error::Error,
    interpreter::{
        environment::Environment,
        evaluator::{core::run_program, function::builtin::install},
        module::{FileSourceProvider, SourceProvider},
        parser::core::parse_source,
        value::core::Value,
    },
};

/// Defines the structure of parsed code.
///
/// This module declares the `Node` enum and related types that represent the
/// syntactic structure of source code as a tree. The AST is built by the parser
/// and traversed by the evaluator.
///
/// # Responsibilities
/// - Defines node types for all language constructs.
/// - Attaches source positions to AST nodes for error reporting.
/// - Prints nodes back as canonical source text.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing, parsing, or
/// evaluating code. Syntax errors and runtime errors are kept apart: only the
/// latter can be caught by scripts.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches source positions and stack traces for context.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations, environments and modules to provide a complete runtime
/// for scripts.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and value
///   types.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion and helpers.
///
/// This module provides reusable helpers that are used throughout the
/// interpreter, parser, and evaluator: numeric conversions, date handling and
/// stack growth for deep recursion.
pub mod util;

/// Filename reported for scripts passed as text.
pub const SCRIPT_FILENAME: &str = "<script>";

/// An interpreter instance.
///
/// Each instance owns a base environment holding the built-in functions and
/// constants, and a global environment below it where scripts define their
/// names. Successive calls to [`Interpreter::eval`] share the globals and
/// the module cache.
///
/// # Example
/// ```
/// use ckl::{Interpreter, interpreter::value::core::Value};
///
/// let interpreter = Interpreter::new();
/// interpreter.eval("def square(x) x * x", "<doc>").unwrap();
/// let value = interpreter.eval("square(7)", "<doc>").unwrap();
/// assert!(matches!(value, Value::Int(49)));
/// ```
pub struct Interpreter {
    globals: Environment,
}

impl Interpreter {
    /// Creates an interpreter loading modules from the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_source_provider(Rc::new(FileSourceProvider::default()))
    }

    /// Creates an interpreter loading modules through `provider`.
    #[must_use]
    pub fn with_source_provider(provider: Rc<dyn SourceProvider>) -> Self {
        let base = Environment::new_root(provider);
        install(&base);
        Self { globals: base.child() }
    }

    /// The environment scripts run in.
    ///
    /// Embedders may define values here before running a script, for
    /// example to replace `stdout` with a buffered stream.
    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.globals
    }

    /// Parses and runs `source`, returning the value of its last statement.
    ///
    /// A top-level `return` ends the script with its value.
    ///
    /// # Parameters
    /// - `source`: The script text.
    /// - `filename`: The name positions and stack traces report.
    ///
    /// # Errors
    /// - [`Error::Syntax`] if the script does not parse.
    /// - [`Error::Runtime`] for an error no `catch` clause handled, and for
    ///   `break` or `continue` outside of a loop.
    pub fn eval(&self, source: &str, filename: &str) -> Result<Value, Error> {
        let node = parse_source(source, filename)?;
        Ok(run_program(&node, &self.globals)?)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the final evaluation result after execution.
///
/// This function runs the provided source string in a fresh interpreter. If
/// `auto_print` is set and the script's value is not `NULL`, the value is
/// printed to standard output.
///
/// # Errors
/// Returns an error if parsing or evaluation fails.
///
/// # Examples
/// ```
/// use ckl::get_result;
///
/// // Simple expression: the result will be calculated and no error should occur.
/// let source = "def result = 2 + 2";
/// let res = get_result(source, false);
/// assert!(res.is_ok());
///
/// // Example with an intentional error (unknown variable).
/// let source = "def y = x + 1"; // 'x' is not defined
/// let res = get_result(source, false);
/// assert!(res.is_err());
/// ```
pub fn get_result(source: &str, auto_print: bool) -> Result<Value, Error> {
    let value = Interpreter::new().eval(source, SCRIPT_FILENAME)?;

    if auto_print && !value.is_null() {
        println!("{value}");
    }

    Ok(value)
}
