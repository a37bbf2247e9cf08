use super::helpers;
use super::integer::cast_integer_value;
use super::{Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

/// Integer without a byte-width bound: same coercion as [`super::Integer`],
/// no range check on serialize.
#[derive(Clone, Copy, Debug, Default)]
pub struct BigInteger;

impl Type for BigInteger {
    fn kind(&self) -> TypeKind {
        TypeKind::BigInteger
    }

    fn cast_value(&self, value: &Value) -> Value {
        cast_integer_value(value)
    }

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
        Ok(self.cast(value))
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
