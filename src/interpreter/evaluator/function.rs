/// The callable-value contract.
///
/// Defines the `Callable` trait, argument binding through `Args`, and the
/// call helper that guards call depth and records stack frames.
pub mod core;

/// User lambdas and their closure capture.
pub mod lambda;

/// Native built-in functions.
///
/// Wraps plain Rust functions as callables and holds the table the base
/// environment is populated from.
pub mod builtin;

/// Arithmetic and comparison, the targets of the desugared operators.
pub mod operators;

/// The `is ...`, `starts with`, `contains` and `matches` predicates.
pub mod predicates;

/// Collection construction and inspection.
pub mod collections;

/// Conversions between value types, plus `assert`.
pub mod conversion;

/// Streams, and parsing or evaluating code at runtime.
pub mod io;
