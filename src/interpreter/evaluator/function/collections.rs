use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::{core::EvalResult, function::core::Args},
        token::SourcePos,
        value::{arith, core::Value},
    },
    util::num::usize_to_i64_checked,
};

/// Upper bound on the number of elements `range` materialises.
const MAX_RANGE_LENGTH: i64 = 100_000_000;

/// `length(obj)`: characters of a string, elements of a collection, fields
/// of an object. `NULL` has length zero.
pub fn length(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let length = match args.get("obj")? {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::List(l) => l.borrow().len(),
        Value::Set(s) => s.borrow().len(),
        Value::Map(m) => m.borrow().len(),
        Value::Object(o) => o.fields.borrow().len(),
        other => {
            return Err(RuntimeError::type_error(format!("Cannot take the length of {}",
                                                        other.type_name()),
                                                pos));
        },
    };
    Ok(Value::Int(usize_to_i64_checked(length, RuntimeError::type_error("Length too large", pos))?))
}

/// `range(a, b = NULL, step = 1)`.
///
/// With one argument counts from `0` up to `a`, exclusive. With two counts
/// from `a` to `b`, exclusive, moving by `step`.
pub fn range(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let (start, end) = match args.get_or_null("b") {
        Some(b) => (args.get_int("a")?, b.as_int(pos)?),
        None => (0, args.get_int("a")?),
    };
    let step = match args.get_or_null("step") {
        Some(step) => step.as_int(pos)?,
        None => 1,
    };
    if step == 0 {
        return Err(RuntimeError::type_error("range step must not be zero", pos));
    }

    let count = (i128::from(end) - i128::from(start)) / i128::from(step);
    if count > i128::from(MAX_RANGE_LENGTH) {
        return Err(RuntimeError::type_error(format!("range of {count} elements is too large"), pos));
    }

    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < end) || (step < 0 && current > end) {
        items.push(Value::Int(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(Value::from(items))
}

/// `sum(list)` with the promotion rules of `add`.
pub fn sum(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let items = args.get("list")?.iterate(pos)?;
    arith::sum(&items, pos)
}

/// `list(obj)`: a new list of the elements `obj` iterates.
pub fn list(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::from(args.get("obj")?.iterate(pos)?))
}

/// `set(obj)`: a new set of the elements `obj` iterates.
pub fn set(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    Ok(Value::from(args.get("obj")?.iterate(pos)?.into_iter().collect::<BTreeSet<_>>()))
}

/// `map(obj)`: a new map.
///
/// Maps are copied, objects contribute their fields, and any other iterable
/// must yield `[key, value]` pairs.
pub fn map(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let entries = match args.get("obj")? {
        Value::Map(m) => m.borrow().clone(),
        Value::Object(o) => o.fields
                             .borrow()
                             .iter()
                             .map(|(k, v)| (Value::from(k.as_str()), v.clone()))
                             .collect(),
        other => {
            let mut entries = BTreeMap::new();
            for pair in other.iterate(pos)? {
                let Value::List(pair) = pair else {
                    return Err(RuntimeError::type_error("map() expects [key, value] pairs", pos));
                };
                let pair = pair.borrow();
                let [key, value] = pair.as_slice() else {
                    return Err(RuntimeError::type_error("map() expects [key, value] pairs", pos));
                };
                entries.insert(key.clone(), value.clone());
            }
            entries
        },
    };
    Ok(Value::from(entries))
}

/// `keys(obj)`: map keys or object field names, as a list.
pub fn keys(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    match args.get("obj")? {
        Value::Map(m) => Ok(Value::from(m.borrow().keys().cloned().collect::<Vec<_>>())),
        Value::Object(o) => {
            Ok(Value::from(o.fields.borrow().keys().map(|k| Value::from(k.as_str())).collect::<Vec<_>>()))
        },
        other => Err(RuntimeError::type_error(format!("{} has no keys", other.type_name()), pos)),
    }
}

/// `values(obj)`: map values or object field values, as a list.
pub fn values(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    match args.get("obj")? {
        Value::Map(m) => Ok(Value::from(m.borrow().values().cloned().collect::<Vec<_>>())),
        Value::Object(o) => Ok(Value::from(o.fields.borrow().values().cloned().collect::<Vec<_>>())),
        other => Err(RuntimeError::type_error(format!("{} has no values", other.type_name()), pos)),
    }
}

/// `append(obj, element)` adds to a list or set in place and returns it.
pub fn append(args: &Args, _env: &Environment, pos: &SourcePos) -> EvalResult<Value> {
    let target = args.get("obj")?;
    let element = args.get("element")?;
    match &target {
        Value::List(l) => l.borrow_mut().push(element),
        Value::Set(s) => {
            // Ordering may render the set itself, so it must not be borrowed mutably while inserting.
            let mut updated = s.borrow().clone();
            updated.insert(element);
            *s.borrow_mut() = updated;
        },
        other => {
            return Err(RuntimeError::type_error(format!("Cannot append to {}", other.type_name()),
                                                pos));
        },
    }
    Ok(target)
}
