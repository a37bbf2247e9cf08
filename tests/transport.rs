use std::sync::Arc;

use attrcast::{Attribute, Error, Integer, StringType, Type, TypeKind, Value};

fn integer_type() -> Arc<dyn Type> {
    Arc::new(Integer::default())
}

#[test]
fn json_round_trip_preserves_an_unread_attribute() {
    let attr = Attribute::from_database("count", Value::from("7"), integer_type());
    assert!(!attr.has_been_read());

    let encoded = serde_json::to_string(&attr).unwrap();
    let decoded: Attribute = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, attr);
    assert!(!decoded.has_been_read());
    assert_eq!(decoded.value(), &Value::Int(7));
}

#[test]
fn json_round_trip_preserves_memoization_state() {
    let attr = Attribute::from_database("count", Value::from("7"), integer_type());
    let _ = attr.value();
    assert!(attr.has_been_read());

    let encoded = serde_json::to_string(&attr).unwrap();
    let decoded: Attribute = serde_json::from_str(&encoded).unwrap();

    assert!(decoded.has_been_read());
    assert_eq!(decoded.value(), &Value::Int(7));
}

#[test]
fn transport_preserves_the_provenance_chain() {
    let attr = Attribute::from_database("count", Value::from("1"), integer_type());
    let changed = attr.with_value_from_user(Value::from("2")).unwrap();
    assert!(changed.changed());

    let bytes = changed.to_bytes().unwrap();
    let restored = Attribute::from_bytes(&bytes).unwrap();

    assert_eq!(restored, changed);
    assert!(restored.changed());
    assert_eq!(restored.original_value(), Value::Int(1));
    assert_eq!(restored.value(), &Value::Int(2));
}

#[test]
fn bitcode_round_trip_preserves_descriptor_configuration() {
    let narrow: Arc<dyn Type> = Arc::new(Integer::new(Some(2)));
    let attr = Attribute::from_database("count", Value::Int(40000), narrow);

    let restored = Attribute::from_bytes(&attr.to_bytes().unwrap()).unwrap();
    assert_eq!(restored.type_descriptor().limit(), Some(2));
    assert!(restored.value_for_database().is_err());
}

#[test]
fn string_values_round_trip_with_their_raw_form() {
    let attr = Attribute::from_database("name", Value::from("bar"), Arc::new(StringType));
    let _ = attr.value();

    let restored = Attribute::from_bytes(&attr.to_bytes().unwrap()).unwrap();
    assert!(restored.has_been_read());
    assert_eq!(restored.value_before_type_cast(), &Value::from("bar"));
    assert!(!restored.changed());
}

/// A descriptor outside the built-in set: it serializes as its custom
/// kind, and the receiving side cannot rebuild behavior from that.
#[derive(Debug)]
struct Inches;

impl Type for Inches {
    fn kind(&self) -> TypeKind {
        TypeKind::Custom("inches".to_string())
    }

    fn cast_value(&self, value: &Value) -> Value {
        match value {
            Value::Int(n) => Value::Int(*n),
            Value::Str(s) => Value::Int(s.trim_end_matches("\"").parse().unwrap_or(0)),
            _ => Value::Null,
        }
    }
}

#[test]
fn custom_descriptors_do_not_survive_transport() {
    let attr = Attribute::from_user("height", Value::from("74\""), Arc::new(Inches), None);
    assert_eq!(attr.value(), &Value::Int(74));

    let bytes = attr.to_bytes().unwrap();
    assert!(matches!(
        Attribute::from_bytes(&bytes),
        Err(Error::Payload { .. })
    ));

    let json = serde_json::to_string(&attr).unwrap();
    let err = serde_json::from_str::<Attribute>(&json).unwrap_err();
    assert!(
        err.to_string().contains("inches"),
        "unexpected message: {}",
        err
    );
}
