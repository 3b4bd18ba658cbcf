/// Parser entry points.
///
/// Turns a token stream into a single program node and hosts the
/// statement-sequence helpers shared by every block form.
pub mod core;

/// Statement parsing.
///
/// Definitions, assignments (including the compound forms, which are
/// desugared into calls), `require` and the control-flow statements.
pub mod statement;

/// Binary operator parsing.
///
/// The precedence levels from `or` down to multiplication. Arithmetic and
/// comparison operators are desugared into calls of named functions.
pub mod binary;

/// Unary, predicate, postfix and primary expressions.
pub mod unary;

/// Block forms: `do … end`, parenthesised sequences, `if`, `for`, `while`
/// and lambdas.
pub mod block;

/// Collection literals and comprehensions.
pub mod collection;

/// Token stream helpers shared by the parsing functions.
mod utils;
