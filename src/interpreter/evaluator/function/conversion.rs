use std::rc::Rc;

use chrono::Local;

use crate::{
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        environment::Environment,
        evaluator::{core::EvalResult, function::core::Args},
        token::SourcePos,
        value::core::{PatternValue, Value},
    },
    util::{
        date::parse_date,
        num::{f64_to_i64_truncated, i64_to_f64_lossy},
    },
};

/// `string(obj)`: the value as it prints.
pub fn string(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::String(args.get_string("obj")?))
}

/// `int(obj)`.
///
/// Decimals truncate toward zero, strings are parsed after trimming, and
/// booleans become `1` or `0`. `NULL` stays `NULL`.
pub fn int(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    match args.get("obj")? {
        Value::Null => Ok(Value::Null),
        Value::Int(n) => Ok(Value::Int(n)),
        Value::Decimal(d) => Ok(Value::Int(f64_to_i64_truncated(d, pos)?)),
        Value::Boolean(b) => Ok(Value::Int(i64::from(b))),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Int(n));
            }
            match text.parse::<f64>() {
                Ok(d) => Ok(Value::Int(f64_to_i64_truncated(d, pos)?)),
                Err(_) => Err(RuntimeError::type_error(format!("Cannot convert '{s}' to int"), pos)),
            }
        },
        other => Err(RuntimeError::type_error(format!("Cannot convert {} to int", other.type_name()),
                                              pos)),
    }
}

/// `decimal(obj)`, the counterpart of [`int`].
pub fn decimal(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    match args.get("obj")? {
        Value::Null => Ok(Value::Null),
        Value::Int(n) => Ok(Value::Decimal(i64_to_f64_lossy(n))),
        Value::Decimal(d) => Ok(Value::Decimal(d)),
        Value::Boolean(b) => Ok(Value::Decimal(if b { 1.0 } else { 0.0 })),
        Value::String(s) => s.trim().parse::<f64>().map(Value::Decimal).map_err(|_| {
                                                          RuntimeError::type_error(format!("Cannot convert '{s}' to decimal"),
                                                                                   pos)
                                                      }),
        other => Err(RuntimeError::type_error(format!("Cannot convert {} to decimal",
                                                      other.type_name()),
                                              pos)),
    }
}

/// `boolean(obj)`: the truthiness of `obj`.
pub fn boolean(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::Boolean(args.get("obj")?.is_truthy()))
}

/// `type(obj)`: the type name, such as `int` or `list`.
pub fn type_of(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::from(args.get("obj")?.type_name()))
}

pub fn identity(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    args.get("obj")
}

/// `date(obj = NULL)`.
///
/// Without an argument returns the current local time. Strings and integers
/// are parsed as `yyyyMMdd[HH[mm[ss]]]`.
pub fn date(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    match args.get_or_null("obj") {
        None => Ok(Value::Date(Local::now().naive_local())),
        Some(Value::Date(d)) => Ok(Value::Date(d)),
        Some(other @ (Value::String(_) | Value::Int(_))) => {
            let text = other.to_string();
            parse_date(text.trim()).map(Value::Date).ok_or_else(|| {
                                                         RuntimeError::type_error(format!("'{text}' is not a valid date"),
                                                                                  pos)
                                                     })
        },
        Some(other) => Err(RuntimeError::type_error(format!("Cannot convert {} to date",
                                                            other.type_name()),
                                                    pos)),
    }
}

/// `pattern(obj)`: compiles the rendered value as a regular expression.
pub fn pattern(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    match args.get("obj")? {
        p @ Value::Pattern(_) => Ok(p),
        other => Ok(Value::Pattern(Rc::new(PatternValue::compile(&other.to_string(), pos)?))),
    }
}

/// `assert(condition, message = NULL)`.
///
/// A falsy condition raises the message as a catchable error, or a plain
/// assertion failure without one.
pub fn assert(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    if args.get("condition")?.is_truthy() {
        return Ok(Value::Boolean(true));
    }
    match args.get_or_null("message") {
        Some(message) => Err(RuntimeError::thrown(message, pos)),
        None => Err(RuntimeError::new(RuntimeErrorKind::AssertionFailed, pos.clone())),
    }
}
