/// The `Value` enum and its container types.
///
/// Defines every runtime value: immutable scalars, shared mutable
/// collections, functions, streams, quoted AST nodes and the control-flow
/// sentinels.
pub mod core;

/// Total ordering and structural equality.
///
/// The total order keys sets and maps and backs `compare` and the relational
/// operators. Structural equality backs `equals`.
pub mod compare;

/// Arithmetic with numeric promotion.
///
/// Implements the operations behind `add`, `sub`, `mul`, `div` and `mod`,
/// including collection, string and date operands.
pub mod arith;

/// Input and output stream handles.
pub mod stream;
