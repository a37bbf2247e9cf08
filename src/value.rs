use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use base64::{engine::general_purpose::STANDARD, Engine};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The closed universe of values the engine passes between the record
/// layer, the type descriptors, and storage.
///
/// A single variant set covers all three roles: raw input (whatever the
/// record hands us), canonical in-memory form (what a cast produces), and
/// storage form (what serialize produces). Descriptors narrow which
/// variants they emit; `Value` itself stays agnostic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    Decimal(BigDecimal),
    Str(String),
    Bytes(Bytes),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    TimeParts(TimeParts),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateTime(t) => t.hash(state),
            Value::TimeParts(p) => p.hash(state),
        }
    }
}

/// Stringification used by the string descriptors and by the numeric
/// dirty-tracking probe. Follows the conventions of the storage text
/// formats: dates as `YYYY-MM-DD`, timestamps without zone suffix, floats
/// always carrying a fractional part.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => {
                if x.is_nan() {
                    write!(f, "NaN")
                } else if x.is_infinite() {
                    write!(f, "{}Infinity", if *x < 0.0 { "-" } else { "" })
                } else if x.fract() == 0.0 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b.as_slice())),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::TimeParts(p) => write!(f, "{:?}", p.parts),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i128)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n as i128)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(Bytes::new(bytes))
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::DateTime(t)
    }
}

impl From<TimeParts> for Value {
    fn from(p: TimeParts) -> Self {
        Value::TimeParts(p)
    }
}

/// Opaque byte holder for binary values.
///
/// Serializes as base64 text so byte payloads survive text transports
/// unmangled, and exposes the hex digest the record layer prints in logs
/// and fixtures.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex digest of the raw bytes.
    pub fn hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Bytes(bytes.to_vec())
    }
}

impl From<&str> for Bytes {
    fn from(s: &str) -> Self {
        Bytes(s.as_bytes().to_vec())
    }
}

impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(&self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map(Bytes).map_err(serde::de::Error::custom)
    }
}

/// Multi-parameter temporal input: positional components keyed 1..=6
/// (year, month, day, hour, minute, second), the structured form a form
/// builder submits instead of one scalar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeParts {
    pub(crate) parts: BTreeMap<u32, i64>,
}

impl TimeParts {
    pub fn new() -> Self {
        TimeParts::default()
    }

    pub fn with(mut self, position: u32, value: i64) -> Self {
        self.parts.insert(position, value);
        self
    }

    pub fn insert(&mut self, position: u32, value: i64) {
        self.parts.insert(position, value);
    }

    pub fn get(&self, position: u32) -> Option<i64> {
        self.parts.get(&position).copied()
    }

    pub fn contains(&self, position: u32) -> bool {
        self.parts.contains_key(&position)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_round_trip_base64() {
        let bytes = Bytes::new(vec![0, 159, 146, 150]);
        let encoded = serde_json::to_string(&bytes).unwrap();
        assert_eq!(encoded, "\"AJ+Slg==\"");
        let decoded: Bytes = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn bytes_hex() {
        assert_eq!(Bytes::from("abc").hex(), "616263");
    }

    #[test]
    fn display_formats() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(100000.0).to_string(), "100000.0");
        let date = NaiveDate::from_ymd_opt(2019, 11, 1).unwrap();
        assert_eq!(Value::from(date).to_string(), "2019-11-01");
    }

    #[test]
    fn time_parts_positions() {
        let parts = TimeParts::new().with(1, 2019).with(2, 11).with(3, 1);
        assert_eq!(parts.get(1), Some(2019));
        assert!(parts.contains(3));
        assert!(!parts.contains(4));
    }

    #[test]
    fn float_hash_uses_bit_pattern() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut a = DefaultHasher::new();
        let mut b = DefaultHasher::new();
        Value::from(1.5).hash(&mut a);
        Value::from(1.5).hash(&mut b);
        assert_eq!(a.finish(), b.finish());
    }
}
