use std::rc::Rc;

use crate::{
    interpreter::{
        environment::Environment,
        evaluator::{core::EvalResult, function::core::Args},
        token::SourcePos,
        value::{
            compare::is_equals,
            core::{PatternValue, Value},
        },
    },
    util::date,
};

/// `x is empty`: `NULL`, empty strings and empty collections.
pub fn is_empty(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::Boolean(match args.get("obj")? {
                          Value::Null => true,
                          Value::String(s) => s.is_empty(),
                          Value::List(l) => l.borrow().is_empty(),
                          Value::Set(s) => s.borrow().is_empty(),
                          Value::Map(m) => m.borrow().is_empty(),
                          Value::Object(o) => o.fields.borrow().is_empty(),
                          _ => false,
                      }))
}

/// `x is zero`: numeric zero. Other values are never zero.
pub fn is_zero(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::Boolean(match args.get("obj")? {
                          Value::Int(n) => n == 0,
                          Value::Decimal(d) => d == 0.0,
                          _ => false,
                      }))
}

/// `x is negative`: numbers below zero.
pub fn is_negative(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::Boolean(match args.get("obj")? {
                          Value::Int(n) => n < 0,
                          Value::Decimal(d) => d < 0.0,
                          _ => false,
                      }))
}

/// `x is numerical`: numbers, and strings that parse as one.
pub fn is_numerical(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::Boolean(match args.get("obj")? {
                          Value::Int(_) | Value::Decimal(_) => true,
                          Value::String(s) => {
                              s.parse::<i64>().is_ok()
                              || s.parse::<f64>().is_ok_and(f64::is_finite)
                          },
                          _ => false,
                      }))
}

/// `x is alphanumerical`: non-empty text of letters and digits only.
pub fn is_alphanumerical(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::Boolean(match args.get("obj")? {
                          Value::Int(_) => true,
                          Value::String(s) => !s.is_empty() && s.chars().all(char::is_alphanumeric),
                          _ => false,
                      }))
}

fn date_text_of_length(value: &Value, length: usize) -> bool {
    match value {
        Value::Date(_) => true,
        Value::String(_) | Value::Int(_) => {
            let text = value.to_string();
            text.len() == length && date::parse_date(&text).is_some()
        },
        _ => false,
    }
}

/// `x is date`: date values and valid `yyyyMMdd` text.
pub fn is_date(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::Boolean(date_text_of_length(&args.get("obj")?, 8)))
}

/// `x is date with hour`: date values and valid `yyyyMMddHH` text.
pub fn is_date_hour(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::Boolean(date_text_of_length(&args.get("obj")?, 10)))
}

/// `x is time`: valid `HHmm` text.
pub fn is_time(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::Boolean(match args.get("obj")? {
                          Value::String(s) => date::is_time(&s),
                          _ => false,
                      }))
}

/// `x starts with y`. `NULL` never starts with anything.
pub fn starts_with(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    let (s, part) = (args.get("str")?, args.get("part")?);
    Ok(Value::Boolean(!s.is_null() && s.to_string().starts_with(&part.to_string())))
}

/// `x ends with y`. `NULL` never ends with anything.
pub fn ends_with(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    let (s, part) = (args.get("str")?, args.get("part")?);
    Ok(Value::Boolean(!s.is_null() && s.to_string().ends_with(&part.to_string())))
}

/// `x contains y`, and `y in x`.
///
/// Strings test for a substring, lists and sets for an equal element, maps
/// for a key and objects for a field name.
pub fn contains(args: &Args, _env: &Environment, _pos: &SourcePos) -> EvalResult<Value> {
    let part = args.get("part")?;
    Ok(Value::Boolean(match args.get("obj")? {
                          Value::String(s) => s.contains(&part.to_string()),
                          Value::List(l) => l.borrow().iter().any(|e| is_equals(e, &part)),
                          Value::Set(s) => s.borrow().contains(&part),
                          Value::Map(m) => m.borrow().contains_key(&part),
                          Value::Object(o) => o.fields.borrow().contains_key(&part.to_string()),
                          _ => false,
                      }))
}

/// `x matches y`: the pattern matches somewhere in the rendered value.
///
/// The pattern may be a pattern value or a string compiled on the fly.
pub fn matches(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let s = args.get("str")?;
    if s.is_null() {
        return Ok(Value::Boolean(false));
    }
    let pattern = match args.get("pattern")? {
        Value::Pattern(p) => p,
        other => Rc::new(PatternValue::compile(&other.to_string(), pos)?),
    };
    Ok(Value::Boolean(pattern.regex.is_match(&s.to_string())))
}
