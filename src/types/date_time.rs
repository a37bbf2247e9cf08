use super::helpers;
use super::{TimezoneMode, Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

/// Timestamp with configurable sub-second precision and offset handling.
/// Date-only input, scalar or string, reads as midnight.
///
/// Multi-parameter input must carry year, month, and day; hour and minute
/// default to zero. A missing leading component is an assignment-time
/// argument error, not a silent guess.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateTime {
    precision: Option<u32>,
    timezone: TimezoneMode,
}

const MULTIPARAMETER_DEFAULTS: [(u32, i64); 2] = [(4, 0), (5, 0)];

impl DateTime {
    pub fn new(precision: Option<u32>, timezone: TimezoneMode) -> Self {
        DateTime {
            precision,
            timezone,
        }
    }
}

impl Type for DateTime {
    fn kind(&self) -> TypeKind {
        TypeKind::DateTime
    }

    fn precision(&self) -> Option<u32> {
        self.precision
    }

    fn timezone(&self) -> Option<TimezoneMode> {
        Some(self.timezone)
    }

    fn cast_value(&self, value: &Value) -> Value {
        match value {
            Value::Str(s) => {
                if s.is_empty() {
                    return Value::Null;
                }
                helpers::fast_string_to_time(s, self.timezone)
                    .or_else(|| helpers::fallback_string_to_time(s, self.timezone))
                    .or_else(|| helpers::fallback_date_to_midnight(s))
                    .map(|t| Value::DateTime(helpers::apply_seconds_precision(t, self.precision)))
                    .unwrap_or(Value::Null)
            }
            Value::DateTime(t) => {
                Value::DateTime(helpers::apply_seconds_precision(*t, self.precision))
            }
            Value::Date(d) => match d.and_hms_opt(0, 0, 0) {
                Some(t) => Value::DateTime(t),
                None => Value::Null,
            },
            Value::TimeParts(parts) => {
                helpers::multiparameter_time(parts, &MULTIPARAMETER_DEFAULTS, self.timezone)
                    .map(|t| Value::DateTime(helpers::apply_seconds_precision(t, self.precision)))
                    .unwrap_or(Value::Null)
            }
            _ => Value::Null,
        }
    }

    // Storage timestamps are already parsed; only the precision truncation
    // still applies.
    fn deserialize(&self, value: &Value) -> Value {
        match value {
            Value::DateTime(t) => {
                Value::DateTime(helpers::apply_seconds_precision(*t, self.precision))
            }
            other => self.cast(other),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        Ok(self.cast(value))
    }

    fn assert_valid_value(&self, value: &Value) -> Result<(), Error> {
        if let Value::TimeParts(parts) = value {
            let missing: Vec<u32> = (1..=3).filter(|p| !parts.contains(*p)).collect();
            if !missing.is_empty() {
                return Err(Error::Argument {
                    message: format!(
                        "provided {:?} doesn't contain necessary positions {:?}",
                        parts, missing
                    ),
                });
            }
        }
        Ok(())
    }

    fn value_constructed_by_mass_assignment(&self, value: &Value) -> bool {
        matches!(value, Value::TimeParts(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TimeParts;
    use chrono::NaiveDate;

    fn ty() -> DateTime {
        DateTime::default()
    }

    fn nov_first(h: u32, m: u32, s: u32) -> Value {
        Value::DateTime(
            NaiveDate::from_ymd_opt(2019, 11, 1)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
        )
    }

    #[test]
    fn casts_iso_strings_on_the_fast_path() {
        assert_eq!(
            ty().cast(&Value::from("2019-11-01 20:45:12")),
            nov_first(20, 45, 12)
        );
    }

    #[test]
    fn lenient_path_handles_t_separator_and_offsets() {
        assert_eq!(
            ty().cast(&Value::from("2019-11-01T09:00:00+09:00")),
            nov_first(0, 0, 0)
        );
    }

    #[test]
    fn garbage_and_zero_dates_cast_to_null() {
        assert_eq!(ty().cast(&Value::from("not a time")), Value::Null);
        assert_eq!(ty().cast(&Value::from("0000-00-00 00:00:00")), Value::Null);
        assert_eq!(ty().cast(&Value::from("0000-00-00")), Value::Null);
    }

    #[test]
    fn date_only_strings_read_as_midnight() {
        assert_eq!(ty().cast(&Value::from("2019-11-01")), nov_first(0, 0, 0));
        assert_eq!(ty().cast(&Value::from("2019/11/1")), nov_first(0, 0, 0));
    }

    #[test]
    fn seconds_precision_truncates_fractions() {
        let ty = DateTime::new(Some(2), TimezoneMode::Utc);
        let casted = ty.cast(&Value::from("2019-11-01 20:45:00.123456"));
        match casted {
            Value::DateTime(t) => {
                use chrono::Timelike;
                assert_eq!(t.time().nanosecond(), 120_000_000);
            }
            other => panic!("expected a timestamp, got {:?}", other),
        }
    }

    #[test]
    fn multiparameter_requires_year_month_day() {
        let complete = TimeParts::new()
            .with(1, 2019)
            .with(2, 11)
            .with(3, 1)
            .with(4, 20)
            .with(5, 45);
        assert_eq!(ty().cast(&Value::TimeParts(complete.clone())), nov_first(20, 45, 0));
        assert!(ty().assert_valid_value(&Value::TimeParts(complete)).is_ok());

        let missing = TimeParts::new().with(1, 2019).with(3, 1);
        assert!(matches!(
            ty().assert_valid_value(&Value::TimeParts(missing)),
            Err(Error::Argument { .. })
        ));
    }
}
