//! Shared numeric and temporal parsing used by the concrete descriptors.
//!
//! Casting favors the fast path: canonical ISO strings match a compiled
//! regex and never reach the lenient scanner. Garbage never raises; it
//! falls through to `None` and the caller maps that to `Null`.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use super::TimezoneMode;
use crate::value::{TimeParts, Value};

static NUMERIC_LEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[+-]?\d").expect("numeric lead pattern"));

static INT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("integer prefix pattern"));

static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("float prefix pattern")
});

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("iso date pattern"));

static ISO_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2}) (\d{2}):(\d{2}):(\d{2})(\.\d+)?$")
        .expect("iso datetime pattern")
});

static LENIENT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})").expect("lenient date pattern"));

static LENIENT_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})[T ](\d{1,2}):(\d{1,2})(?::(\d{1,2})(\.\d+)?)?\s*(Z|[+-]\d{2}:?\d{2}|[+-]\d{2})?",
    )
    .expect("lenient datetime pattern")
});

static LEADING_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[ T]").expect("leading date pattern"));

pub(crate) fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// A string that does not even start with a signed digit. `"wibble"` casts
/// to zero, and the numeric dirty check must not confuse that zero with a
/// stored zero.
pub(crate) fn non_numeric_string(s: &str) -> bool {
    !NUMERIC_LEAD.is_match(s)
}

/// Dirty-tracking probe for the numeric kinds: a non-numeric string
/// replacing a previously present value counts as a change, even though
/// both may cast to the same default.
pub(crate) fn number_to_non_number(old_value: &Value, new_value_before_type_cast: &Value) -> bool {
    !old_value.is_null() && non_numeric_string(&new_value_before_type_cast.to_string())
}

/// Integer prefix parse: optional sign, digits, trailing garbage ignored,
/// no leading numeric content yields zero. Overflow saturates.
pub(crate) fn string_to_i128(s: &str) -> i128 {
    match INT_PREFIX.captures(s) {
        Some(caps) => {
            let digits = caps.get(1).map(|m| m.as_str()).unwrap_or("0");
            digits.parse::<i128>().unwrap_or_else(|_| {
                if digits.starts_with('-') {
                    i128::MIN
                } else {
                    i128::MAX
                }
            })
        }
        None => 0,
    }
}

/// Float prefix parse with the same garbage tolerance as the integer one.
pub(crate) fn string_to_f64(s: &str) -> f64 {
    FLOAT_PREFIX
        .captures(s)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// All-zero dates coming out of legacy storage normalize to nothing.
pub(crate) fn new_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    if year == 0 && month == 0 && day == 0 {
        return None;
    }
    if !(i32::MIN as i64..=i32::MAX as i64).contains(&year) || month < 1 || day < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
}

pub(crate) fn fast_string_to_date(s: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(s)?;
    new_date(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

pub(crate) fn fallback_string_to_date(s: &str) -> Option<NaiveDate> {
    let caps = LENIENT_DATE.captures(s)?;
    new_date(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

/// `".5"` means half a second; `".123456"` means 123456 microseconds.
fn fraction_to_micros(fraction: &str) -> u32 {
    let digits = fraction.trim_start_matches('.');
    let mut padded = String::with_capacity(6);
    for c in digits.chars().take(6) {
        padded.push(c);
    }
    while padded.len() < 6 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

fn parse_utc_offset(s: &str) -> Option<i32> {
    if s == "Z" {
        return Some(0);
    }
    let sign = match s.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let rest: String = s[1..].chars().filter(|c| *c != ':').collect();
    let hours: i32 = rest.get(0..2)?.parse().ok()?;
    let minutes: i32 = rest.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    Some(sign * (hours * 3600 + minutes * 60))
}

/// Assemble a timestamp from parsed components. An explicit UTC offset is
/// resolved into the configured zone; offsetless input is taken as wall
/// time as-is.
#[allow(clippy::too_many_arguments)]
pub(crate) fn new_time(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
    microsecond: u32,
    utc_offset: Option<i32>,
    mode: TimezoneMode,
) -> Option<NaiveDateTime> {
    let date = new_date(year, month, day)?;
    if !(0..24).contains(&hour) || !(0..60).contains(&minute) || !(0..60).contains(&second) {
        return None;
    }
    let naive = date.and_hms_micro_opt(hour as u32, minute as u32, second as u32, microsecond)?;
    match utc_offset {
        Some(offset) => {
            let utc = naive - Duration::seconds(offset as i64);
            match mode {
                TimezoneMode::Utc => Some(utc),
                TimezoneMode::Local => Some(Local.from_utc_datetime(&utc).naive_local()),
            }
        }
        None => Some(naive),
    }
}

/// Fast path for `YYYY-MM-DD HH:MM:SS[.ffffff]`. Does not handle offsets;
/// those take the lenient path.
pub(crate) fn fast_string_to_time(s: &str, mode: TimezoneMode) -> Option<NaiveDateTime> {
    let caps = ISO_DATETIME.captures(s)?;
    let micros = caps
        .get(7)
        .map(|m| fraction_to_micros(m.as_str()))
        .unwrap_or(0);
    new_time(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
        caps[4].parse().ok()?,
        caps[5].parse().ok()?,
        caps[6].parse().ok()?,
        micros,
        None,
        mode,
    )
}

/// Lenient scan: tolerates `T` separators, single-digit components, missing
/// seconds, and an optional trailing UTC offset.
pub(crate) fn fallback_string_to_time(s: &str, mode: TimezoneMode) -> Option<NaiveDateTime> {
    let caps = LENIENT_DATETIME.captures(s)?;
    let second = caps.get(6).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let micros = caps
        .get(7)
        .map(|m| fraction_to_micros(m.as_str()))
        .unwrap_or(0);
    let offset = caps.get(8).and_then(|m| parse_utc_offset(m.as_str()));
    new_time(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
        caps[4].parse().ok()?,
        caps[5].parse().ok()?,
        second,
        micros,
        offset,
        mode,
    )
}

/// Date-only strings in a timestamp field read as midnight. Anything with
/// a clock component either already parsed or carries a malformed time,
/// and stays unconverted.
pub(crate) fn fallback_date_to_midnight(s: &str) -> Option<NaiveDateTime> {
    if s.contains(':') {
        return None;
    }
    fallback_string_to_date(s)?.and_hms_opt(0, 0, 0)
}

/// Truncate sub-second digits beyond the configured precision. Rounds
/// down, never up; comparison and storage both see the truncated form.
pub(crate) fn apply_seconds_precision(dt: NaiveDateTime, precision: Option<u32>) -> NaiveDateTime {
    let precision = match precision {
        Some(p) if p < 9 => p,
        _ => return dt,
    };
    let round_power = 10u32.pow(9 - precision);
    let nanos = dt.time().nanosecond();
    if nanos >= 1_000_000_000 {
        return dt; // leap second representation, leave untouched
    }
    let rounded_off = nanos % round_power;
    if rounded_off > 0 {
        dt.with_nanosecond(nanos - rounded_off).unwrap_or(dt)
    } else {
        dt
    }
}

/// Rewrite any leading `YYYY-MM-DD ` onto the fixed reference date so only
/// the time-of-day survives.
pub(crate) fn rebase_on_reference_date(s: &str) -> String {
    match LEADING_DATE.find(s) {
        Some(m) => format!("2000-01-01 {}", &s[m.end()..]),
        None => format!("2000-01-01 {}", s),
    }
}

/// Build a timestamp from positional components, filling the supplied
/// defaults first. Components 1..=3 must all be present after defaulting.
pub(crate) fn multiparameter_time(
    parts: &TimeParts,
    defaults: &[(u32, i64)],
    mode: TimezoneMode,
) -> Option<NaiveDateTime> {
    let mut merged = parts.clone();
    for (position, value) in defaults {
        if !merged.contains(*position) {
            merged.insert(*position, *value);
        }
    }
    let year = merged.get(1)?;
    let month = merged.get(2)?;
    let day = merged.get(3)?;
    new_time(
        year,
        month,
        day,
        merged.get(4).unwrap_or(0),
        merged.get(5).unwrap_or(0),
        merged.get(6).unwrap_or(0),
        0,
        None,
        mode,
    )
}
