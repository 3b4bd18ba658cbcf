use tracing::debug;

use crate::{
    ast::{CatchClause, Node},
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        environment::Environment,
        evaluator::{core::EvalResult, function::core::call_positional},
        value::{compare::is_equals, core::Value},
    },
};

/// Name bound to the caught error inside a `catch` handler.
pub const ERROR_BINDING: &str = "_err";

/// Evaluates statements in order and yields the last value.
///
/// Stops at the first control sentinel and yields it. An empty sequence
/// yields `NULL`.
pub fn eval_sequence(statements: &[Node], env: &Environment) -> EvalResult<Value> {
    let mut last = Value::Null;
    for statement in statements {
        last = eval_value!(statement, env);
    }
    Ok(last)
}

/// Evaluates a `do … catch … finally … end` block.
///
/// The body runs in `env` itself. A runtime error raised by the body is
/// offered to each `catch` clause in order; the first whose matcher accepts
/// the payload handles it. The `finally` statements run on every exit path,
/// and an error or sentinel they produce replaces the block's outcome.
pub fn eval_block(body: &[Node],
                  catches: &[CatchClause],
                  finally: &[Node],
                  env: &Environment)
                  -> EvalResult<Value> {
    let result = match eval_sequence(body, env) {
        Err(error) if !catches.is_empty() => handle_error(error, catches, env),
        other => other,
    };

    if finally.is_empty() {
        return result;
    }
    match eval_sequence(finally, env)? {
        sentinel if sentinel.is_sentinel() => Ok(sentinel),
        _ => result,
    }
}

fn handle_error(error: RuntimeError, catches: &[CatchClause], env: &Environment) -> EvalResult<Value> {
    // Syntax errors from `eval` or `require` are not catchable.
    if matches!(error.kind, RuntimeErrorKind::Syntax(_)) {
        return Err(error);
    }

    let payload = error.payload();
    for clause in catches {
        if catch_matches(clause.matcher.as_ref(), &payload, env)? {
            debug!(error = %error.kind, pos = %error.pos, "caught");
            let handler_env = env.child();
            handler_env.define(ERROR_BINDING, Value::Error(Box::new(payload)));
            return clause.handler.evaluate(&handler_env);
        }
    }
    Err(error)
}

/// A function matcher is called with the payload, any other matcher value
/// is compared with it. `catch all` has no matcher and accepts everything.
fn catch_matches(matcher: Option<&Node>, payload: &Value, env: &Environment) -> EvalResult<bool> {
    let Some(matcher) = matcher else {
        return Ok(true);
    };
    match matcher.evaluate(env)? {
        Value::Func(func) => {
            Ok(call_positional(&func, vec![payload.clone()], env, matcher.pos())?.is_truthy())
        },
        value => Ok(is_equals(&value, payload)),
    }
}
