use super::{Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

pub(crate) fn cast_string_value(value: &Value) -> Value {
    match value {
        Value::Bool(true) => Value::Str("t".to_string()),
        Value::Bool(false) => Value::Str("f".to_string()),
        Value::Str(s) => Value::Str(s.clone()),
        other => Value::Str(other.to_string()),
    }
}

pub(crate) fn serialize_string_value(value: &Value) -> Value {
    match value {
        Value::Int(_) | Value::Float(_) | Value::Decimal(_) => Value::Str(value.to_string()),
        Value::Bool(true) => Value::Str("t".to_string()),
        Value::Bool(false) => Value::Str("f".to_string()),
        other => other.clone(),
    }
}

/// String whose cast results are frozen: the attribute layer refuses to
/// hand out mutable access to them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmutableString;

impl Type for ImmutableString {
    fn kind(&self) -> TypeKind {
        TypeKind::ImmutableString
    }

    fn cast_value(&self, value: &Value) -> Value {
        cast_string_value(value)
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        Ok(serialize_string_value(value))
    }
}
