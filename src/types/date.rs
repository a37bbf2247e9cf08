use super::helpers;
use super::{Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

#[derive(Clone, Copy, Debug, Default)]
pub struct Date;

impl Type for Date {
    fn kind(&self) -> TypeKind {
        TypeKind::Date
    }

    fn cast_value(&self, value: &Value) -> Value {
        match value {
            Value::Str(s) => {
                if s.is_empty() {
                    return Value::Null;
                }
                helpers::fast_string_to_date(s)
                    .or_else(|| helpers::fallback_string_to_date(s))
                    .map(Value::Date)
                    .unwrap_or(Value::Null)
            }
            Value::Date(d) => Value::Date(*d),
            Value::DateTime(t) => Value::Date(t.date()),
            Value::TimeParts(parts) => {
                helpers::multiparameter_time(parts, &[], super::TimezoneMode::Utc)
                    .map(|t| Value::Date(t.date()))
                    .unwrap_or(Value::Null)
            }
            _ => Value::Null,
        }
    }

    // Storage hands dates over already parsed.
    fn deserialize(&self, value: &Value) -> Value {
        match value {
            Value::Date(d) => Value::Date(*d),
            other => self.cast(other),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        Ok(self.cast(value))
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

    fn nov_first() -> Value {
        Value::Date(NaiveDate::from_ymd_opt(2019, 11, 1).unwrap())
    }

    #[test]
    fn casts_iso_strings() {
        assert_eq!(Date.cast(&Value::from("2019-11-01")), nov_first());
    }

    #[test]
    fn falls_back_to_lenient_scanning() {
        assert_eq!(Date.cast(&Value::from("2019/11/1 was a Friday")), nov_first());
    }

    #[test]
    fn garbage_and_zero_dates_cast_to_null() {
        assert_eq!(Date.cast(&Value::from("not-a-date")), Value::Null);
        assert_eq!(Date.cast(&Value::from("0000-00-00")), Value::Null);
        assert_eq!(Date.cast(&Value::from("")), Value::Null);
    }

    #[test]
    fn timestamps_truncate_to_their_date() {
        let dt = NaiveDate::from_ymd_opt(2019, 11, 1)
            .unwrap()
            .and_hms_opt(20, 45, 0)
            .unwrap();
        assert_eq!(Date.cast(&Value::DateTime(dt)), nov_first());
    }

    #[test]
    fn multiparameter_input() {
        let parts = TimeParts::new().with(1, 2019).with(2, 11).with(3, 1);
        assert_eq!(Date.cast(&Value::TimeParts(parts)), nov_first());

        let missing = TimeParts::new().with(1, 2019).with(2, 11);
        assert_eq!(Date.cast(&Value::TimeParts(missing.clone())), Value::Null);
        assert!(Date.value_constructed_by_mass_assignment(&Value::TimeParts(missing)));
    }
}
