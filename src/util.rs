/// Numeric conversion helpers.
///
/// Lossless conversions between `i64`, `usize` and `f64`. Every function
/// returns a `Result` so callers can attach their own runtime error.
pub mod num;

/// Date helpers.
///
/// Parsing and formatting of the compact `yyyyMMddHHmmss` date notation and
/// day-based date arithmetic.
pub mod date;

/// Stack growth for deeply recursive parsing and evaluation.
pub mod stack;
