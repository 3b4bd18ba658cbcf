use std::{cell::RefCell, rc::Rc};

use crate::{
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{
        evaluator::core::EvalResult,
        token::SourcePos,
        value::{compare::is_equals, core::Value},
    },
    util::date::{add_days, days_between},
};

/// The arithmetic operations that take part in numeric promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
        }
    }
}

fn overflow(pos: &SourcePos) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::Overflow, pos.clone())
}

fn division_by_zero(pos: &SourcePos) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::DivisionByZero, pos.clone())
}

fn unsupported(op: ArithOp, a: &Value, b: &Value, pos: &SourcePos) -> RuntimeError {
    RuntimeError::type_error(format!("Cannot {} {} and {}", op.name(), a.type_name(), b.type_name()),
                             pos)
}

/// Applies a numeric operation with Int/Decimal promotion.
///
/// Int with Int stays Int and fails on overflow. If either operand is a
/// Decimal both are treated as Decimals.
///
/// # Errors
/// `DivisionByZero`, `Overflow`, or `TypeError` for non-numeric operands.
///
/// # Example
/// ```
/// use ckl::interpreter::{
///     token::SourcePos,
///     value::{arith::{ArithOp, numeric}, core::Value},
/// };
///
/// let pos = SourcePos::native();
/// assert_eq!(numeric(ArithOp::Add, &Value::Int(1), &Value::Int(1), &pos).unwrap(),
///            Value::Int(2));
/// assert!(matches!(numeric(ArithOp::Add, &Value::Int(1), &Value::Decimal(1.0), &pos).unwrap(),
///                  Value::Decimal(d) if d == 2.0));
/// assert!(numeric(ArithOp::Div, &Value::Int(1), &Value::Int(0), &pos).is_err());
/// ```
pub fn numeric(op: ArithOp, a: &Value, b: &Value, pos: &SourcePos) -> EvalResult<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            let (x, y) = (*x, *y);
            let result = match op {
                ArithOp::Add => x.checked_add(y),
                ArithOp::Sub => x.checked_sub(y),
                ArithOp::Mul => x.checked_mul(y),
                ArithOp::Div | ArithOp::Mod if y == 0 => return Err(division_by_zero(pos)),
                ArithOp::Div => x.checked_div(y),
                ArithOp::Mod => x.checked_rem(y),
            };
            result.map(Value::Int).ok_or_else(|| overflow(pos))
        },
        (Value::Int(_) | Value::Decimal(_), Value::Int(_) | Value::Decimal(_)) => {
            let x = a.as_decimal(pos)?;
            let y = b.as_decimal(pos)?;
            let result = match op {
                ArithOp::Add => x + y,
                ArithOp::Sub => x - y,
                ArithOp::Mul => x * y,
                ArithOp::Div | ArithOp::Mod if y == 0.0 => return Err(division_by_zero(pos)),
                ArithOp::Div => x / y,
                ArithOp::Mod => x % y,
            };
            Ok(Value::Decimal(result))
        },
        _ => Err(unsupported(op, a, b, pos)),
    }
}

fn shift_date(date: chrono::NaiveDateTime, days: f64, pos: &SourcePos) -> EvalResult<Value> {
    add_days(date, days).map(Value::Date).ok_or_else(|| overflow(pos))
}

/// `add`: numeric addition, concatenation, union and date shifting.
///
/// - `NULL` on either side yields `NULL`.
/// - A list on the left appends the right operand, or all its elements if it
///   is a list or set. A set on the left forms the union the same way.
/// - A list on the right prepends a scalar left operand.
/// - Maps merge, the right operand winning on equal keys.
/// - A string on either side concatenates the rendered scalars.
/// - A date plus a number shifts by that many days.
///
/// # Errors
/// `Overflow` or `TypeError`.
pub fn add(a: &Value, b: &Value, pos: &SourcePos) -> EvalResult<Value> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::List(l), other) => {
            let mut items = l.borrow().clone();
            match other {
                Value::List(_) | Value::Set(_) => items.extend(other.iterate(pos)?),
                _ => items.push(other.clone()),
            }
            Ok(Value::from(items))
        },
        (Value::Set(s), other) => {
            let mut items = s.borrow().clone();
            match other {
                Value::List(_) | Value::Set(_) => items.extend(other.iterate(pos)?),
                _ => {
                    items.insert(other.clone());
                },
            }
            Ok(Value::Set(Rc::new(RefCell::new(items))))
        },
        (Value::Map(x), Value::Map(y)) => {
            let mut entries = x.borrow().clone();
            entries.extend(y.borrow().iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok(Value::from(entries))
        },
        (scalar, Value::List(l)) if !matches!(scalar, Value::Set(_) | Value::Map(_)) => {
            let mut items = Vec::with_capacity(l.borrow().len() + 1);
            items.push(scalar.clone());
            items.extend(l.borrow().iter().cloned());
            Ok(Value::from(items))
        },
        (Value::String(s), other) if !is_collection(other) => Ok(Value::String(format!("{s}{other}"))),
        (other, Value::String(s)) if !is_collection(other) => Ok(Value::String(format!("{other}{s}"))),
        (Value::Date(d), Value::Int(_) | Value::Decimal(_)) => shift_date(*d, b.as_decimal(pos)?, pos),
        (Value::Int(_) | Value::Decimal(_), Value::Date(d)) => shift_date(*d, a.as_decimal(pos)?, pos),
        _ => numeric(ArithOp::Add, a, b, pos),
    }
}

/// `sub`: numeric subtraction, element removal and date differences.
///
/// - `NULL` on either side yields `NULL`.
/// - A list or set on the left loses every element equal to the right
///   operand, or to any element of it if it is a list or set.
/// - A map on the left loses the right operand as a key.
/// - A date minus a number shifts back; a date minus a date yields the whole
///   day difference.
///
/// # Errors
/// `Overflow` or `TypeError`.
pub fn sub(a: &Value, b: &Value, pos: &SourcePos) -> EvalResult<Value> {
    let removed = |other: &Value| -> EvalResult<Vec<Value>> {
        match other {
            Value::List(_) | Value::Set(_) => other.iterate(pos),
            _ => Ok(vec![other.clone()]),
        }
    };
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::List(l), other) => {
            let removed = removed(other)?;
            let items = l.borrow()
                         .iter()
                         .filter(|item| !removed.iter().any(|r| is_equals(item, r)))
                         .cloned()
                         .collect::<Vec<_>>();
            Ok(Value::from(items))
        },
        (Value::Set(s), other) => {
            let removed = removed(other)?;
            let mut items = s.borrow().clone();
            items.retain(|item| !removed.iter().any(|r| is_equals(item, r)));
            Ok(Value::Set(Rc::new(RefCell::new(items))))
        },
        (Value::Map(m), key) => {
            let mut entries = m.borrow().clone();
            entries.remove(key);
            Ok(Value::from(entries))
        },
        (Value::Date(x), Value::Date(y)) => Ok(Value::Int(days_between(*x, *y))),
        (Value::Date(d), Value::Int(_) | Value::Decimal(_)) => shift_date(*d, -b.as_decimal(pos)?, pos),
        _ => numeric(ArithOp::Sub, a, b, pos),
    }
}

/// `mul`: numeric multiplication, and repetition of strings and lists by an
/// integer count.
///
/// # Errors
/// `Overflow` or `TypeError`.
pub fn mul(a: &Value, b: &Value, pos: &SourcePos) -> EvalResult<Value> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::String(s), Value::Int(n)) | (Value::Int(n), Value::String(s)) => {
            let count = repeat_count(*n, s.len(), pos)?;
            Ok(Value::String(s.repeat(count)))
        },
        (Value::List(l), Value::Int(n)) | (Value::Int(n), Value::List(l)) => {
            let items = l.borrow().clone();
            let count = repeat_count(*n, items.len(), pos)?;
            let mut out = Vec::with_capacity(items.len() * count);
            for _ in 0..count {
                out.extend(items.iter().cloned());
            }
            Ok(Value::from(out))
        },
        _ => numeric(ArithOp::Mul, a, b, pos),
    }
}

/// `div`: numeric division. Integer division truncates.
///
/// # Errors
/// `DivisionByZero`, `Overflow` or `TypeError`.
pub fn div(a: &Value, b: &Value, pos: &SourcePos) -> EvalResult<Value> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        _ => numeric(ArithOp::Div, a, b, pos),
    }
}

/// `mod`: remainder with the sign of the dividend.
///
/// # Errors
/// `DivisionByZero`, `Overflow` or `TypeError`.
pub fn modulo(a: &Value, b: &Value, pos: &SourcePos) -> EvalResult<Value> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        _ => numeric(ArithOp::Mod, a, b, pos),
    }
}

/// Upper bound on the length of a repeated string or list.
const MAX_REPEAT_LENGTH: usize = 100_000_000;

/// Negative repetition counts repeat zero times. Fails with `Overflow` when
/// `len` items repeated `n` times would exceed [`MAX_REPEAT_LENGTH`].
fn repeat_count(n: i64, len: usize, pos: &SourcePos) -> EvalResult<usize> {
    let count = usize::try_from(n).unwrap_or(0);
    match len.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LENGTH => Ok(count),
        _ => Err(overflow(pos)),
    }
}

const fn is_collection(value: &Value) -> bool {
    matches!(value, Value::List(_) | Value::Set(_) | Value::Map(_) | Value::Object(_))
}

/// Sums a sequence of values with the promotion rules of `add`.
///
/// Returns `Int(0)` for an empty sequence.
///
/// # Errors
/// Any error [`add`] raises.
pub fn sum(values: &[Value], pos: &SourcePos) -> EvalResult<Value> {
    let Some((first, rest)) = values.split_first() else {
        return Ok(Value::Int(0));
    };
    rest.iter().try_fold(first.clone(), |acc, v| add(&acc, v, pos))
}
