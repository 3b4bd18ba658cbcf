use crate::{
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::{evaluator::core::EvalResult, token::SourcePos},
};

/// Converts an `i64` to `f64`, rounding values beyond `2^53`.
///
/// Used where the language promotes Int to Decimal: the promotion is allowed
/// to lose precision, just as the Decimal result would.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub const fn i64_to_f64_lossy(value: i64) -> f64 {
    value as f64
}

/// Converts a `usize` to `i64`.
///
/// ## Errors
/// Returns `Err(error)` if the value does not fit.
pub fn usize_to_i64_checked<E>(value: usize, error: E) -> Result<i64, E> {
    i64::try_from(value).map_err(|_| error)
}

/// Converts an `f64` to `i64` if it is finite, in range and integral.
///
/// ## Errors
/// - `TypeError` for non-finite or fractional values.
/// - `Overflow` for values outside the `i64` range.
///
/// ## Example
/// ```
/// use ckl::{
///     error::RuntimeErrorKind,
///     interpreter::token::SourcePos,
///     util::num::f64_to_i64_checked,
/// };
///
/// let pos = SourcePos::native();
/// assert_eq!(f64_to_i64_checked(1000.0, &pos).unwrap(), 1000);
///
/// let err = f64_to_i64_checked(1.5, &pos).unwrap_err();
/// assert!(matches!(err.kind, RuntimeErrorKind::TypeError { .. }));
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn f64_to_i64_checked(value: f64, pos: &SourcePos) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(RuntimeError::type_error(format!("Cannot convert non-finite value {value} to int"),
                                            pos));
    }
    if value.fract() != 0.0 {
        return Err(RuntimeError::type_error(format!("Decimal {value} is not integral"), pos));
    }
    f64_to_i64_truncated(value, pos)
}

/// Converts an `f64` to `i64`, dropping any fractional part.
///
/// ## Errors
/// - `TypeError` for NaN and infinities.
/// - `Overflow` for values outside the `i64` range.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn f64_to_i64_truncated(value: f64, pos: &SourcePos) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(RuntimeError::type_error(format!("Cannot convert non-finite value {value} to int"),
                                            pos));
    }
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(RuntimeError::new(RuntimeErrorKind::Overflow, pos.clone()));
    }
    Ok(value.trunc() as i64)
}

/// Resolves a possibly negative index against a sequence length.
///
/// Negative indices count from the end, so `-1` is the last element.
///
/// ## Errors
/// `IndexOutOfBounds` if the resolved index does not address an element.
///
/// ## Example
/// ```
/// use ckl::{interpreter::token::SourcePos, util::num::resolve_index};
///
/// let pos = SourcePos::native();
/// assert_eq!(resolve_index(1, 3, &pos).unwrap(), 1);
/// assert_eq!(resolve_index(-1, 3, &pos).unwrap(), 2);
/// assert!(resolve_index(3, 3, &pos).is_err());
/// assert!(resolve_index(-4, 3, &pos).is_err());
/// ```
pub fn resolve_index(index: i64, length: usize, pos: &SourcePos) -> EvalResult<usize> {
    let out_of_bounds = || RuntimeError::new(RuntimeErrorKind::IndexOutOfBounds { index, length },
                                             pos.clone());
    let length_i64 = usize_to_i64_checked(length, out_of_bounds())?;
    let resolved = if index < 0 { length_i64 + index } else { index };
    if resolved < 0 || resolved >= length_i64 {
        return Err(out_of_bounds());
    }
    usize::try_from(resolved).map_err(|_| out_of_bounds())
}
