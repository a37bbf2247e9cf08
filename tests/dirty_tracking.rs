use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use attrcast::{Attribute, Error, Integer, StringType, Type, TypeKind, Value};

fn string_type() -> Arc<dyn Type> {
    Arc::new(StringType)
}

fn integer_type() -> Arc<dyn Type> {
    Arc::new(Integer::default())
}

#[test]
fn in_place_mutation_is_observed() {
    let mut attr = Attribute::from_database("name", Value::from("bar"), string_type());
    assert!(!attr.changed());

    // Append to the cast string without going through an assignment API.
    if let Value::Str(s) = attr.value_mut().unwrap() {
        s.push('!');
    }
    assert!(attr.changed_in_place());
    assert!(attr.changed());
    assert_eq!(attr.value(), &Value::from("bar!"));

    // An unread sibling built from the same inputs reports no change.
    let unread = Attribute::from_database("name", Value::from("bar"), string_type());
    assert!(!unread.changed_in_place());
    assert!(!unread.changed());
}

/// Descriptor whose mutation comparator always fires and counts every
/// serialize/deserialize, to prove the unread short-circuit never invokes
/// either.
#[derive(Debug, Default)]
struct CountingString {
    serializes: AtomicUsize,
    deserializes: AtomicUsize,
}

impl Type for CountingString {
    fn kind(&self) -> TypeKind {
        TypeKind::Custom("counting_string".to_string())
    }

    fn cast_value(&self, value: &Value) -> Value {
        Value::Str(value.to_string())
    }

    fn deserialize(&self, value: &Value) -> Value {
        self.deserializes.fetch_add(1, Ordering::Relaxed);
        self.cast(value)
    }

    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        self.serializes.fetch_add(1, Ordering::Relaxed);
        Ok(value.clone())
    }

    fn changed_in_place(&self, _raw_old_value: &Value, _new_value: &Value) -> bool {
        true
    }

    fn mutable(&self) -> bool {
        true
    }
}

#[test]
fn unread_attributes_short_circuit_change_detection() {
    let counting = Arc::new(CountingString::default());
    let attr = Attribute::from_database(
        "name",
        Value::from("bar"),
        Arc::clone(&counting) as Arc<dyn Type>,
    );

    assert!(!attr.changed_in_place());
    assert!(!attr.changed());
    assert_eq!(counting.serializes.load(Ordering::Relaxed), 0);
    assert_eq!(counting.deserializes.load(Ordering::Relaxed), 0);

    // Once read, the comparator runs and reports the mutation.
    let _ = attr.value();
    assert!(attr.changed_in_place());
}

#[test]
fn assignment_chains_report_against_the_original() {
    let attr = Attribute::from_database("count", Value::from("1"), integer_type());
    assert!(!attr.changed());

    let changed = attr.with_value_from_user(Value::from("2")).unwrap();
    assert!(changed.changed());
    assert_eq!(changed.original_value(), Value::Int(1));

    // Assigning the original value back reads as unchanged.
    let back = changed.with_value_from_user(Value::from("1")).unwrap();
    assert!(!back.changed());
}

#[test]
fn original_value_survives_any_chain_length() {
    let attr = Attribute::from_database("count", Value::from("1"), integer_type());
    let chained = attr
        .with_value_from_user(Value::from("2"))
        .unwrap()
        .with_value_from_user(Value::from("3"))
        .unwrap()
        .with_value_from_user(Value::from("4"))
        .unwrap();
    assert_eq!(chained.original_value(), attr.original_value());
    assert_eq!(chained.value(), &Value::Int(4));
}

#[test]
fn forgetting_assignment_resets_the_baseline() {
    let attr = Attribute::from_database("count", Value::from("1"), integer_type());
    let changed = attr.with_value_from_user(Value::from("2")).unwrap();
    assert!(changed.changed());

    let forgotten = changed.forgetting_assignment().unwrap();
    assert!(!forgotten.changed());
    assert_eq!(forgotten.value(), &Value::Int(2));
    assert_eq!(forgotten.original_value(), Value::Int(2));
}

#[test]
fn garbage_text_over_a_numeric_field_counts_as_changed() {
    let attr = Attribute::from_database("count", Value::Int(0), integer_type());
    let garbage = attr.with_value_from_user(Value::from("wibble")).unwrap();
    // Both cast to zero, but a human typed garbage; that is a change.
    assert_eq!(garbage.value(), &Value::Int(0));
    assert!(garbage.changed());
}

#[test]
fn out_of_range_assignment_is_rejected_up_front() {
    let attr = Attribute::from_database("count", Value::Int(1), integer_type());
    let result = attr.with_value_from_user(Value::Int(2147483648));
    assert!(matches!(result, Err(Error::Range { .. })));

    let stored = attr.with_value_from_user(Value::Int(2147483647)).unwrap();
    assert_eq!(
        stored.value_for_database().unwrap(),
        Value::Int(2147483647)
    );
}

#[test]
fn round_trip_through_the_database_form() {
    let attr = Attribute::from_database("name", Value::from("bar"), string_type());
    let assigned = attr.with_value_from_user(Value::from(42)).unwrap();
    assert_eq!(assigned.value(), &Value::from("42"));

    let stored = assigned.value_for_database().unwrap();
    let reloaded = assigned.with_value_from_database(stored).unwrap();
    assert_eq!(reloaded.value(), &Value::from("42"));
    assert!(!reloaded.changed());
}
