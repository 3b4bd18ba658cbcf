use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// Seconds in one day.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// The canonical textual form of a date value.
pub const DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Formats a date as `yyyyMMddHHmmss`.
///
/// # Example
/// ```
/// use ckl::util::date::{format_date, parse_date};
///
/// let d = parse_date("20240229").unwrap();
/// assert_eq!(format_date(&d), "20240229000000");
/// ```
#[must_use]
pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses the compact date notation.
///
/// Accepts `yyyyMMdd`, `yyyyMMddHH`, `yyyyMMddHHmm` and `yyyyMMddHHmmss`.
/// Missing time components are zero.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |range: std::ops::Range<usize>| -> Option<u32> { text.get(range)?.parse().ok() };
    let (hour, minute, second) = match text.len() {
        8 => (0, 0, 0),
        10 => (field(8..10)?, 0, 0),
        12 => (field(8..10)?, field(10..12)?, 0),
        14 => (field(8..10)?, field(10..12)?, field(12..14)?),
        _ => return None,
    };
    let year = text.get(0..4)?.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(NaiveDateTime::new(date, time))
}

/// Returns `true` for a valid `HHmm` time of day.
#[must_use]
pub fn is_time(text: &str) -> bool {
    text.len() == 4
    && text.bytes().all(|b| b.is_ascii_digit())
    && text.get(0..2)
           .zip(text.get(2..4))
           .and_then(|(h, m)| NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0))
           .is_some()
}

/// Shifts a date by a possibly fractional number of days.
///
/// Returns `None` if the result is outside the representable range.
///
/// # Example
/// ```
/// use ckl::util::date::{add_days, format_date, parse_date};
///
/// let d = parse_date("20231231").unwrap();
/// assert_eq!(format_date(&add_days(d, 1.5).unwrap()), "20240101120000");
/// ```
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn add_days(date: NaiveDateTime, days: f64) -> Option<NaiveDateTime> {
    let seconds = (days * SECONDS_PER_DAY).round();
    if !seconds.is_finite() || seconds.abs() >= 1e15 {
        return None;
    }
    date.checked_add_signed(TimeDelta::try_seconds(seconds as i64)?)
}

/// Whole calendar days from `to` to `from`.
///
/// # Example
/// ```
/// use ckl::util::date::{days_between, parse_date};
///
/// let a = parse_date("20240301").unwrap();
/// let b = parse_date("20240228").unwrap();
/// assert_eq!(days_between(a, b), 2);
/// ```
#[must_use]
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (from.date() - to.date()).num_days()
}
