use chrono::NaiveDate;

use super::helpers;
use super::{TimezoneMode, Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

/// Time of day, pinned to the reference date 2000-01-01 so two values
/// compare on their clock component alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct Time {
    precision: Option<u32>,
    timezone: TimezoneMode,
}

const MULTIPARAMETER_DEFAULTS: [(u32, i64); 5] = [(1, 2000), (2, 1), (3, 1), (4, 0), (5, 0)];

impl Time {
    pub fn new(precision: Option<u32>, timezone: TimezoneMode) -> Self {
        Time {
            precision,
            timezone,
        }
    }

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1).expect("reference date is valid")
    }
}

impl Type for Time {
    fn kind(&self) -> TypeKind {
        TypeKind::Time
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
                let rebased = helpers::rebase_on_reference_date(s);
                helpers::fast_string_to_time(&rebased, self.timezone)
                    .or_else(|| helpers::fallback_string_to_time(&rebased, self.timezone))
                    .map(|t| Value::DateTime(helpers::apply_seconds_precision(t, self.precision)))
                    .unwrap_or(Value::Null)
            }
            Value::DateTime(t) => {
                let rebased = Self::reference_date().and_time(t.time());
                Value::DateTime(helpers::apply_seconds_precision(rebased, self.precision))
            }
            Value::TimeParts(parts) => {
                helpers::multiparameter_time(parts, &MULTIPARAMETER_DEFAULTS, self.timezone)
                    .map(|t| Value::DateTime(helpers::apply_seconds_precision(t, self.precision)))
                    .unwrap_or(Value::Null)
            }
            _ => Value::Null,
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        Ok(self.cast(value))
    }

    fn value_constructed_by_mass_assignment(&self, value: &Value) -> bool {
        matches!(value, Value::TimeParts(_))
    }
}
