use std::{cmp::Ordering, rc::Rc};

use ordered_float::OrderedFloat;

use crate::{interpreter::value::core::Value, util::num::i64_to_f64_lossy};

/// Position of each type in the tie-break order used when two values of
/// different types render to the same text.
const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Boolean(_) => 1,
        Value::Int(_) | Value::Decimal(_) => 2,
        Value::Date(_) => 3,
        Value::String(_) => 4,
        Value::Pattern(_) => 5,
        Value::List(_) => 6,
        Value::Set(_) => 7,
        Value::Map(_) => 8,
        Value::Object(_) => 9,
        Value::Func(_) => 10,
        Value::Input(_) => 11,
        Value::Output(_) => 12,
        Value::Error(_) => 13,
        Value::Node(_) => 14,
        Value::Break | Value::Continue | Value::Return(_) => 15,
    }
}

/// Compares two sequences element by element, shorter first on a tie.
fn compare_sequences<'a>(a: impl Iterator<Item=&'a Value>,
                         mut b: impl Iterator<Item=&'a Value>)
                         -> Ordering {
    for x in a {
        let Some(y) = b.next() else {
            return Ordering::Greater;
        };
        let ord = compare_values(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    if b.next().is_some() { Ordering::Less } else { Ordering::Equal }
}

/// The total order over all values.
///
/// - Numbers compare numerically. If either side is a decimal both are
///   compared as decimals.
/// - Dates compare chronologically, booleans `FALSE` first, strings
///   lexicographically.
/// - Lists, sets and maps of the same kind compare element by element.
/// - Everything else compares by its rendered text, with the type deciding
///   between different types that render the same, so `1` and `'1'` differ.
///
/// # Example
/// ```
/// use std::cmp::Ordering;
///
/// use ckl::interpreter::value::{compare::compare_values, core::Value};
///
/// assert_eq!(compare_values(&Value::Int(2), &Value::Decimal(10.0)), Ordering::Less);
/// assert_eq!(compare_values(&Value::Int(1), &Value::Decimal(1.0)), Ordering::Equal);
/// assert_eq!(compare_values(&Value::Int(10), &Value::from("9")), Ordering::Less);
/// assert_ne!(compare_values(&Value::Int(1), &Value::from("1")), Ordering::Equal);
/// ```
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Int(x), Value::Decimal(y)) => OrderedFloat(i64_to_f64_lossy(*x)).cmp(&OrderedFloat(*y)),
        (Value::Decimal(x), Value::Int(y)) => OrderedFloat(*x).cmp(&OrderedFloat(i64_to_f64_lossy(*y))),
        (Value::Decimal(x), Value::Decimal(y)) => OrderedFloat(*x).cmp(&OrderedFloat(*y)),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) | (Value::Break, Value::Break) | (Value::Continue, Value::Continue) => {
            Ordering::Equal
        },
        (Value::List(x), Value::List(y)) => {
            if Rc::ptr_eq(x, y) {
                return Ordering::Equal;
            }
            compare_sequences(x.borrow().iter(), y.borrow().iter())
        },
        (Value::Set(x), Value::Set(y)) => {
            if Rc::ptr_eq(x, y) {
                return Ordering::Equal;
            }
            compare_sequences(x.borrow().iter(), y.borrow().iter())
        },
        (Value::Map(x), Value::Map(y)) => {
            if Rc::ptr_eq(x, y) {
                return Ordering::Equal;
            }
            let (x, y) = (x.borrow(), y.borrow());
            compare_sequences(x.iter().flat_map(|(k, v)| [k, v]), y.iter().flat_map(|(k, v)| [k, v]))
        },
        _ => a.to_string()
              .cmp(&b.to_string())
              .then_with(|| type_rank(a).cmp(&type_rank(b))),
    }
}

/// Structural equality, as used by `equals`.
///
/// Stricter than the total order across types: `1` never equals `'1'`.
/// Numbers compare numerically, containers by content, functions and
/// streams by identity.
///
/// # Example
/// ```
/// use ckl::interpreter::value::{compare::is_equals, core::Value};
///
/// let a = Value::from(vec![Value::Int(1), Value::from("x")]);
/// let b = Value::from(vec![Value::Decimal(1.0), Value::from("x")]);
///
/// assert!(is_equals(&a, &b));
/// assert!(!is_equals(&Value::Int(1), &Value::from("1")));
/// ```
#[must_use]
pub fn is_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(_) | Value::Decimal(_), Value::Int(_) | Value::Decimal(_)) => {
            compare_values(a, b) == Ordering::Equal
        },
        (Value::List(x), Value::List(y)) => {
            Rc::ptr_eq(x, y) || {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| is_equals(p, q))
            }
        },
        (Value::Set(x), Value::Set(y)) => {
            Rc::ptr_eq(x, y) || {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| is_equals(p, q))
            }
        },
        (Value::Map(x), Value::Map(y)) => {
            Rc::ptr_eq(x, y) || {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|((k1, v1), (k2, v2))| is_equals(k1, k2) && is_equals(v1, v2))
            }
        },
        (Value::Object(x), Value::Object(y)) => {
            Rc::ptr_eq(x, y) || {
                let (fx, fy) = (x.fields.borrow(), y.fields.borrow());
                x.module == y.module
                && fx.len() == fy.len()
                && fx.iter()
                     .zip(fy.iter())
                     .all(|((k1, v1), (k2, v2))| k1 == k2 && is_equals(v1, v2))
            }
        },
        (Value::Func(x), Value::Func(y)) => Rc::ptr_eq(x, y),
        (Value::Input(x), Value::Input(y)) => Rc::ptr_eq(x, y),
        (Value::Output(x), Value::Output(y)) => Rc::ptr_eq(x, y),
        (Value::Pattern(x), Value::Pattern(y)) => x.source == y.source,
        (Value::Error(x), Value::Error(y)) | (Value::Return(x), Value::Return(y)) => is_equals(x, y),
        (Value::Node(x), Value::Node(y)) => x == y,
        _ => type_rank(a) == type_rank(b) && compare_values(a, b) == Ordering::Equal,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        compare_values(self, other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_values(self, other)
    }
}
