use bigdecimal::ToPrimitive;

use super::helpers;
use super::{Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

#[derive(Clone, Copy, Debug, Default)]
pub struct Float;

impl Type for Float {
    fn kind(&self) -> TypeKind {
        TypeKind::Float
    }

    fn cast_value(&self, value: &Value) -> Value {
        match value {
            Value::Bool(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => match s.as_str() {
                _ if helpers::blank(s) => Value::Null,
                "Infinity" => Value::Float(f64::INFINITY),
                "-Infinity" => Value::Float(f64::NEG_INFINITY),
                "NaN" => Value::Float(f64::NAN),
                other => Value::Float(helpers::string_to_f64(other)),
            },
            Value::Float(f) => Value::Float(*f),
            Value::Int(n) => Value::Float(*n as f64),
            Value::Decimal(d) => match d.to_f64() {
                Some(f) => Value::Float(f),
                None => Value::Null,
            },
            _ => Value::Null,
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_special_strings() {
        assert_eq!(Float.cast(&Value::from("Infinity")), Value::Float(f64::INFINITY));
        assert_eq!(
            Float.cast(&Value::from("-Infinity")),
            Value::Float(f64::NEG_INFINITY)
        );
        match Float.cast(&Value::from("NaN")) {
            Value::Float(f) => assert!(f.is_nan()),
            other => panic!("expected a float, got {:?}", other),
        }
    }

    #[test]
    fn casts_prefixes_and_blanks() {
        assert_eq!(Float.cast(&Value::from("1.5junk")), Value::Float(1.5));
        assert_eq!(Float.cast(&Value::from("junk")), Value::Float(0.0));
        assert_eq!(Float.cast(&Value::from("")), Value::Null);
        assert_eq!(Float.cast(&Value::from(3)), Value::Float(3.0));
    }
}
