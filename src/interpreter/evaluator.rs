/// Evaluates a node and returns early from the enclosing function with any
/// control sentinel (`break`, `continue`, `return`) it yields.
macro_rules! eval_value {
    ($node:expr, $env:expr) => {
        match $node.evaluate($env)? {
            value if value.is_sentinel() => return Ok(value),
            value => value,
        }
    };
}

/// Like `eval_value!`, for functions returning
/// `EvalResult<ControlFlow<Value, T>>`.
macro_rules! eval_flow {
    ($node:expr, $env:expr) => {
        match $node.evaluate($env)? {
            value if value.is_sentinel() => return Ok(::std::ops::ControlFlow::Break(value)),
            value => value,
        }
    };
}

/// Unwraps an `EvalResult<ControlFlow<Value, T>>`, returning early with the
/// sentinel when the flow was interrupted.
macro_rules! unwrap_flow {
    ($flow:expr) => {
        match $flow? {
            ::std::ops::ControlFlow::Continue(value) => value,
            ::std::ops::ControlFlow::Break(sentinel) => return Ok(sentinel),
        }
    };
}

/// Core evaluation logic.
///
/// Contains the node dispatch, the result type shared by the evaluator, and
/// the program entry point that unwraps `return` at top level.
pub mod core;

/// Blocks, statement sequencing, and `catch`/`finally` handling.
pub mod block;

/// `for` and `while` loops.
///
/// Each iteration runs in a fresh child environment and consumes the
/// `break` and `continue` sentinels.
pub mod loops;

/// Collection literals and comprehensions.
pub mod collection;

/// Indexing and indexed assignment.
pub mod access;

/// Function calls, member invocation, and argument spreading.
pub mod call;

/// Module loading through `require`.
pub mod require;

/// Function evaluation.
///
/// Handles user-defined and built-in function calls, argument binding, and
/// the built-in catalogue.
pub mod function;
