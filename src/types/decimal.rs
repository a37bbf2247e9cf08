use std::str::FromStr;

use bigdecimal::{BigDecimal, FromPrimitive, RoundingMode};

use super::helpers;
use super::{Type, TypeKind};
use crate::error::Error;
use crate::value::Value;

/// Arbitrary-precision decimal. Numeric inputs are bounded to `precision`
/// significant digits (18 unless configured); the result is rounded
/// half-up to `scale` fractional digits when a scale is configured.
#[derive(Clone, Debug, Default)]
pub struct Decimal {
    precision: Option<u32>,
    scale: Option<i64>,
}

impl Decimal {
    pub const DEFAULT_PRECISION: u64 = 18;

    pub fn new(precision: Option<u32>, scale: Option<i64>) -> Self {
        Decimal { precision, scale }
    }

    fn with_precision(&self, d: BigDecimal) -> BigDecimal {
        d.with_prec(self.precision.map(u64::from).unwrap_or(Self::DEFAULT_PRECISION))
    }

    fn apply_scale(&self, d: BigDecimal) -> BigDecimal {
        match self.scale {
            Some(scale) => d.with_scale_round(scale, RoundingMode::HalfUp),
            None => d,
        }
    }

    fn from_float(&self, f: f64) -> Option<BigDecimal> {
        if !f.is_finite() {
            return None;
        }
        // Shortest round-trip text, so 1.5 stays 1.5 instead of its exact
        // binary expansion.
        let shortest = BigDecimal::from_str(&format!("{}", f)).ok()?;
        match self.precision {
            Some(precision) => {
                let scaled = self.apply_scale(shortest);
                // f64 carries at most 16 meaningful decimal digits.
                Some(scaled.with_prec(u64::from(precision.min(16))))
            }
            None => Some(shortest),
        }
    }
}

fn string_to_decimal(s: &str) -> BigDecimal {
    BigDecimal::from_str(s.trim()).unwrap_or_default()
}

impl Type for Decimal {
    fn kind(&self) -> TypeKind {
        TypeKind::Decimal
    }

    fn precision(&self) -> Option<u32> {
        self.precision
    }

    fn scale(&self) -> Option<i64> {
        self.scale
    }

    fn cast_value(&self, value: &Value) -> Value {
        let casted = match value {
            Value::Bool(b) => BigDecimal::from(if *b { 1 } else { 0 }),
            Value::Int(n) => {
                self.with_precision(BigDecimal::from_i128(*n).unwrap_or_default())
            }
            Value::Float(f) => match self.from_float(*f) {
                Some(d) => d,
                None => return Value::Null,
            },
            Value::Decimal(d) => self.with_precision(d.clone()),
            Value::Str(s) => {
                if helpers::blank(s) {
                    return Value::Null;
                }
                string_to_decimal(s)
            }
            other => string_to_decimal(&other.to_string()),
        };
        Value::Decimal(self.apply_scale(casted))
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

    fn decimal(s: &str) -> Value {
        Value::Decimal(BigDecimal::from_str(s).unwrap())
    }

    #[test]
    fn rounds_half_up_at_the_configured_scale() {
        let ty = Decimal::new(None, Some(2));
        assert_eq!(ty.cast(&Value::from("1.005")), decimal("1.01"));
        assert_eq!(ty.cast(&Value::from("1.004")), decimal("1.00"));
    }

    #[test]
    fn casts_floats_through_shortest_representation() {
        let ty = Decimal::default();
        assert_eq!(ty.cast(&Value::from(1.5)), decimal("1.5"));
    }

    #[test]
    fn invalid_strings_cast_to_zero() {
        let ty = Decimal::default();
        assert_eq!(ty.cast(&Value::from("not-a-number")), decimal("0"));
        assert_eq!(ty.cast(&Value::from("")), Value::Null);
    }

    #[test]
    fn non_finite_floats_cast_to_null() {
        let ty = Decimal::default();
        assert_eq!(ty.cast(&Value::from(f64::NAN)), Value::Null);
        assert_eq!(ty.cast(&Value::from(f64::INFINITY)), Value::Null);
    }

    #[test]
    fn precision_bounds_significant_digits() {
        let ty = Decimal::new(Some(4), None);
        assert_eq!(ty.cast(&Value::Int(123456)), decimal("123500"));
    }

    #[test]
    fn cast_is_idempotent() {
        let ty = Decimal::new(Some(10), Some(2));
        for input in [Value::from("1.005"), Value::from(2.5), Value::Int(7)] {
            let once = ty.cast(&input);
            assert_eq!(ty.cast(&once), once);
        }
    }
}
