use std::cmp::Ordering;

use crate::{
    error::RuntimeErrorKind,
    interpreter::{
        environment::Environment,
        evaluator::{core::EvalResult, function::core::Args},
        token::SourcePos,
        value::{
            arith,
            compare::{compare_values, is_equals},
            core::Value,
        },
    },
};

/// Name of the binding consulted when a division by zero occurs.
pub const DIV_ZERO_BINDING: &str = "DIV_0_VALUE";

fn operands(args: &Args) -> EvalResult<(Value, Value)> {
    Ok((args.get("a")?, args.get("b")?))
}

/// Replaces a division-by-zero error with the environment's `DIV_0_VALUE`,
/// if one is bound to something other than `NULL`.
fn with_div_zero_fallback(result: EvalResult<Value>, env: &Environment) -> EvalResult<Value> {
    match result {
        Err(e) if matches!(e.kind, RuntimeErrorKind::DivisionByZero) => {
            env.get(DIV_ZERO_BINDING).filter(|v| !v.is_null()).ok_or(e)
        },
        other => other,
    }
}

/// `add(a, b)`, the target of `+`.
pub fn add(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let (a, b) = operands(args)?;
    arith::add(&a, &b, pos)
}

/// `sub(a, b)`, the target of `-`.
pub fn sub(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let (a, b) = operands(args)?;
    arith::sub(&a, &b, pos)
}

/// `mul(a, b)`, the target of `*`.
pub fn mul(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let (a, b) = operands(args)?;
    arith::mul(&a, &b, pos)
}

/// `div(a, b)`, the target of `/`.
///
/// Division by zero yields `DIV_0_VALUE` when the caller's environment binds
/// it.
pub fn div(args: &Args, env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let (a, b) = operands(args)?;
    with_div_zero_fallback(arith::div(&a, &b, pos), env)
}

/// `mod(a, b)`, the target of `%`.
pub fn modulo(args: &Args, env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let (a, b) = operands(args)?;
    with_div_zero_fallback(arith::modulo(&a, &b, pos), env)
}

/// `equals(a, b)`, the target of `==` and `is`.
pub fn equals(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    let (a, b) = operands(args)?;
    Ok(Value::Boolean(is_equals(&a, &b)))
}

/// `not_equals(a, b)`, the target of `!=`, `<>` and `is not`.
pub fn not_equals(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    let (a, b) = operands(args)?;
    Ok(Value::Boolean(!is_equals(&a, &b)))
}

fn ordering(args: &Args, accept: impl Fn(Ordering) -> bool) -> EvalResult<Value> {
    let (a, b) = operands(args)?;
    Ok(Value::Boolean(accept(compare_values(&a, &b))))
}

/// `less(a, b)`, the target of `<`.
pub fn less(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    ordering(args, Ordering::is_lt)
}

/// `less_equals(a, b)`, the target of `<=`.
pub fn less_equals(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    ordering(args, Ordering::is_le)
}

/// `greater(a, b)`, the target of `>`.
pub fn greater(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    ordering(args, Ordering::is_gt)
}

/// `greater_equals(a, b)`, the target of `>=`.
pub fn greater_equals(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    ordering(args, Ordering::is_ge)
}

/// `compare(a, b)` returns `-1`, `0` or `1` under the total order.
pub fn compare(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    let (a, b) = operands(args)?;
    Ok(Value::Int(match compare_values(&a, &b) {
                      Ordering::Less => -1,
                      Ordering::Equal => 0,
                      Ordering::Greater => 1,
                  }))
}
