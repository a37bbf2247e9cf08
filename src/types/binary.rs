use super::{Type, TypeKind};
use crate::error::Error;
use crate::value::{Bytes, Value};

/// Binary blob. Canonical and storage form are both the opaque byte
/// holder; strings contribute their UTF-8 bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Binary;

impl Type for Binary {
    fn kind(&self) -> TypeKind {
        TypeKind::Binary
    }

    fn cast_value(&self, value: &Value) -> Value {
        match value {
            Value::Bytes(b) => Value::Bytes(b.clone()),
            Value::Str(s) => Value::Bytes(Bytes::from(s.as_str())),
            other => Value::Bytes(Bytes::new(other.to_string().into_bytes())),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        Ok(self.cast(value))
    }

    fn changed_in_place(&self, raw_old_value: &Value, new_value: &Value) -> bool {
        self.deserialize(raw_old_value) != *new_value
    }

    fn mutable(&self) -> bool {
        true
    }
}
