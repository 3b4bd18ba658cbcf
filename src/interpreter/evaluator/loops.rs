use crate::{
    ast::{LoopTarget, Node},
    interpreter::{
        environment::Environment, evaluator::core::EvalResult, token::SourcePos,
        value::core::Value,
    },
};

/// What the loop does after one run of its body.
enum Step {
    Next,
    Exit(Value),
}

/// Consumes the loop sentinels of one body result.
///
/// `break` ends the loop with `TRUE`; `return` ends it and keeps
/// propagating; `continue` and regular values move on to the next
/// iteration, the latter becoming the loop's value so far.
fn step(result: Value, last: &mut Value) -> Step {
    match result {
        Value::Break => Step::Exit(Value::Boolean(true)),
        Value::Continue => Step::Next,
        ret @ Value::Return(_) => Step::Exit(ret),
        value => {
            *last = value;
            Step::Next
        },
    }
}

/// Binds the loop variable, or destructures the element into several names
/// padded with `NULL`.
fn bind_target(target: &LoopTarget, item: Value, env: &Environment, pos: &SourcePos) -> EvalResult<()> {
    match target {
        LoopTarget::Name(name) => env.define(name, item),
        LoopTarget::Destructure(names) => {
            let parts = item.iterate(pos)?;
            for (i, name) in names.iter().enumerate() {
                env.define(name, parts.get(i).cloned().unwrap_or(Value::Null));
            }
        },
    }
    Ok(())
}

/// Evaluates `for target in iterable body`.
///
/// The iterable is snapshotted before the first iteration. Each iteration
/// runs in a fresh child of `env`, so closures created in the body capture
/// that iteration's binding.
///
/// # Returns
/// `TRUE` after a `break`, otherwise the last body value, or `NULL` when
/// the body never ran.
pub fn eval_for(target: &LoopTarget,
                iterable: &Node,
                body: &Node,
                env: &Environment,
                pos: &SourcePos)
                -> EvalResult<Value> {
    let items = eval_value!(iterable, env).iterate(pos)?;
    let mut last = Value::Null;

    for item in items {
        let iteration_env = env.child();
        bind_target(target, item, &iteration_env, pos)?;
        if let Step::Exit(value) = step(body.evaluate(&iteration_env)?, &mut last) {
            return Ok(value);
        }
    }
    Ok(last)
}

/// Evaluates `while condition body`, with the same results as
/// [`eval_for`].
pub fn eval_while(condition: &Node, body: &Node, env: &Environment) -> EvalResult<Value> {
    let mut last = Value::Null;

    while eval_value!(condition, env).is_truthy() {
        let iteration_env = env.child();
        if let Step::Exit(value) = step(body.evaluate(&iteration_env)?, &mut last) {
            return Ok(value);
        }
    }
    Ok(last)
}
