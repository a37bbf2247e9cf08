use super::immutable_string::{cast_string_value, serialize_string_value};
use super::{Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

/// Mutable string: every cast yields an independently owned `String`, so
/// in-place edits of the cast value are observable against the raw
/// original.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringType;

impl Type for StringType {
    fn kind(&self) -> TypeKind {
        TypeKind::String
    }

    fn cast_value(&self, value: &Value) -> Value {
        cast_string_value(value)
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        Ok(serialize_string_value(value))
    }

    fn changed_in_place(&self, raw_old_value: &Value, new_value: &Value) -> bool {
        match new_value {
            Value::Str(_) => raw_old_value != new_value,
            _ => false,
        }
    }

    fn mutable(&self) -> bool {
        true
    }
}
