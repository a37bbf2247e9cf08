use bigdecimal::{RoundingMode, ToPrimitive};

use super::helpers;
use super::{Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

/// Integer prefix coercion shared by the bounded and unbounded kinds:
/// `"1ignore"` casts to 1, `"bad1"` to 0, blanks and non-finite floats to
/// `Null`, booleans to 1/0, fractional kinds truncate toward zero.
pub(crate) fn cast_integer_value(value: &Value) -> Value {
    match value {
        Value::Bool(b) => Value::Int(if *b { 1 } else { 0 }),
        Value::Str(s) => {
            if helpers::blank(s) {
                Value::Null
            } else {
                Value::Int(helpers::string_to_i128(s))
            }
        }
        Value::Int(n) => Value::Int(*n),
        Value::Float(f) => {
            if f.is_finite() {
                Value::Int(*f as i128)
            } else {
                Value::Null
            }
        }
        Value::Decimal(d) => {
            let truncated = d.with_scale_round(0, RoundingMode::Down);
            match truncated.to_i128() {
                Some(n) => Value::Int(n),
                None => Value::Null,
            }
        }
        _ => Value::Null,
    }
}

/// Signed integer bounded by a byte-width `limit` (4 bytes unless
/// configured, i.e. the 32-bit signed range).
#[derive(Clone, Copy, Debug, Default)]
pub struct Integer {
    limit: Option<u32>,
}

impl Integer {
    pub const DEFAULT_LIMIT: u32 = 4;

    pub fn new(limit: Option<u32>) -> Self {
        Integer { limit }
    }

    fn limit_bytes(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }

    // 8 bits per byte with one bit for the sign.
    fn max_value(&self) -> Option<i128> {
        let bits = self.limit_bytes().saturating_mul(8).saturating_sub(1);
        if bits >= 127 {
            None
        } else {
            Some(1i128 << bits)
        }
    }

    fn ensure_in_range(&self, n: i128) -> Result<(), Error> {
        if let Some(max) = self.max_value() {
            if n < -max || n >= max {
                return Err(Error::Range {
                    value: n.to_string(),
                    kind: TypeKind::Integer,
                    limit_bytes: Some(self.limit_bytes()),
                });
            }
        }
        Ok(())
    }
}

impl Type for Integer {
    fn kind(&self) -> TypeKind {
        TypeKind::Integer
    }

    fn limit(&self) -> Option<u32> {
        self.limit
    }

    fn cast_value(&self, value: &Value) -> Value {
        cast_integer_value(value)
    }

    // Storage already holds integers; skip the prefix parser for them.
    fn deserialize(&self, value: &Value) -> Value {
        match value {
            Value::Int(n) => Value::Int(*n),
            Value::Null => Value::Null,
            other => self.cast(other),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        if let Value::Str(s) = value {
            if helpers::non_numeric_string(s) {
                return Ok(Value::Null);
            }
        }
        let casted = self.cast(value);
        if let Value::Int(n) = &casted {
            self.ensure_in_range(*n)?;
        }
        Ok(casted)
    }

    fn assert_valid_value(&self, value: &Value) -> Result<(), Error> {
        self.serialize(value).map(|_| ())
    }

    fn changed(
        &self,
        old_value: &Value,
        new_value: &Value,
        new_value_before_type_cast: &Value,
    ) -> bool {
        old_value != new_value
            || helpers::number_to_non_number(old_value, new_value_before_type_cast)
    }
}
