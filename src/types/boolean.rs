use super::{Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

/// The fixed set of textual spellings that coerce to `false`. Everything
/// else that is non-null and non-blank coerces to `true`.
const FALSE_STRINGS: [&str; 7] = ["0", "f", "F", "false", "FALSE", "off", "OFF"];

#[derive(Clone, Copy, Debug, Default)]
pub struct Boolean;

impl Type for Boolean {
    fn kind(&self) -> TypeKind {
        TypeKind::Boolean
    }

    fn cast_value(&self, value: &Value) -> Value {
        match value {
            Value::Str(s) if s.is_empty() => Value::Null,
            Value::Str(s) => Value::Bool(!FALSE_STRINGS.contains(&s.as_str())),
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(0) => Value::Bool(false),
            _ => Value::Bool(true),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        Ok(self.cast(value))
    }
}
