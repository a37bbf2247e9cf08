mod big_integer;
mod binary;
mod boolean;
mod date;
mod date_time;
mod decimal;
mod float;
pub(crate) mod helpers;
mod immutable_string;
mod integer;
mod string;
mod time;

pub use big_integer::BigInteger;
pub use binary::Binary;
pub use boolean::Boolean;
pub use date::Date;
pub use date_time::DateTime;
pub use decimal::Decimal;
pub use float::Float;
pub use immutable_string::ImmutableString;
pub use integer::Integer;
pub use string::StringType;
pub use time::Time;

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value::Value;

/// A type descriptor: the policy object that turns raw values into their
/// canonical in-memory form, turns canonical values back into storage form,
/// and decides what counts as a change.
///
/// Descriptors are stateless with respect to any single value being cast.
/// One instance is shared across many attributes (and threads), so
/// implementations hold nothing but immutable configuration.
pub trait Type: fmt::Debug + Send + Sync {
    fn kind(&self) -> TypeKind;

    fn precision(&self) -> Option<u32> {
        None
    }

    fn scale(&self) -> Option<i64> {
        None
    }

    /// Byte-width bound for integer kinds.
    fn limit(&self) -> Option<u32> {
        None
    }

    fn timezone(&self) -> Option<TimezoneMode> {
        None
    }

    /// Serializable configuration record. Drives descriptor equality and
    /// attribute transport.
    fn spec(&self) -> TypeSpec {
        TypeSpec {
            kind: self.kind(),
            precision: self.precision(),
            scale: self.scale(),
            limit: self.limit(),
            timezone: self.timezone(),
        }
    }

    /// Cast a value arriving from user or application code. `Null` passes
    /// through unchanged; everything else goes through [`Type::cast_value`].
    ///
    /// Idempotent: `cast(cast(x))` is value-equal to `cast(x)`, because an
    /// attribute may be cast, serialized, and re-cast across its provenance
    /// chain without drift.
    fn cast(&self, value: &Value) -> Value {
        if value.is_null() {
            Value::Null
        } else {
            self.cast_value(value)
        }
    }

    fn cast_value(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Cast a value arriving from storage. Defaults to [`Type::cast`];
    /// kinds whose storage form is already canonical override this to skip
    /// re-parsing, but stay value-equivalent to `cast` on the same input.
    fn deserialize(&self, value: &Value) -> Value {
        self.cast(value)
    }

    /// Convert a canonical value to its storage form. Must satisfy the
    /// round-trip law: `cast(serialize(cast(x))?)` is value-equal to
    /// `cast(x)`.
    fn serialize(&self, value: &Value) -> Result<Value, Error> {
        Ok(value.clone())
    }

    fn changed(
        &self,
        old_value: &Value,
        new_value: &Value,
        _new_value_before_type_cast: &Value,
    ) -> bool {
        old_value != new_value
    }

    /// Whether the cast value was mutated after being read. Immutable kinds
    /// never mutate in place; mutable kinds compare the serialized current
    /// value against the raw original.
    fn changed_in_place(&self, _raw_old_value: &Value, _new_value: &Value) -> bool {
        false
    }

    /// Assignment-time validation hook. Runs on user-supplied values only,
    /// never on already-trusted storage data.
    fn assert_valid_value(&self, _value: &Value) -> Result<(), Error> {
        Ok(())
    }

    /// Whether the raw value was synthesized by structured multi-parameter
    /// input rather than typed by a human.
    fn value_constructed_by_mass_assignment(&self, _value: &Value) -> bool {
        false
    }

    /// Whether cast results may be mutated in place. Gates
    /// `Attribute::value_mut`; a frozen result refuses mutation loudly.
    fn mutable(&self) -> bool {
        false
    }
}

impl PartialEq for dyn Type {
    fn eq(&self, other: &Self) -> bool {
        self.spec() == other.spec()
    }
}

/// Symbolic kind tag for a descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    BigInteger,
    Binary,
    Boolean,
    Date,
    DateTime,
    Decimal,
    Float,
    ImmutableString,
    Integer,
    String,
    Time,
    Untyped,
    Custom(String),
}

/// Whether offset-carrying temporal input resolves to UTC or to local wall
/// time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimezoneMode {
    #[default]
    Utc,
    Local,
}

/// The configuration of a descriptor, detached from its behavior. Two
/// descriptors are equal when their specs are equal; a spec for a built-in
/// kind can be instantiated back into a live descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSpec {
    pub kind: TypeKind,
    pub precision: Option<u32>,
    pub scale: Option<i64>,
    pub limit: Option<u32>,
    pub timezone: Option<TimezoneMode>,
}

impl TypeSpec {
    pub fn of(kind: TypeKind) -> Self {
        TypeSpec {
            kind,
            precision: None,
            scale: None,
            limit: None,
            timezone: None,
        }
    }

    /// Rebuild a live descriptor from this spec. Custom kinds carry no
    /// behavior and cannot be instantiated; callers re-attach those with
    /// `Attribute::with_type` after transport.
    pub fn instantiate(&self) -> Result<Arc<dyn Type>, Error> {
        let ty: Arc<dyn Type> = match &self.kind {
            TypeKind::BigInteger => Arc::new(BigInteger),
            TypeKind::Binary => Arc::new(Binary),
            TypeKind::Boolean => Arc::new(Boolean),
            TypeKind::Date => Arc::new(Date),
            TypeKind::DateTime => Arc::new(DateTime::new(
                self.precision,
                self.timezone.unwrap_or_default(),
            )),
            TypeKind::Decimal => Arc::new(Decimal::new(self.precision, self.scale)),
            TypeKind::Float => Arc::new(Float),
            TypeKind::ImmutableString => Arc::new(ImmutableString),
            TypeKind::Integer => Arc::new(Integer::new(self.limit)),
            TypeKind::String => Arc::new(StringType),
            TypeKind::Time => Arc::new(Time::new(
                self.precision,
                self.timezone.unwrap_or_default(),
            )),
            TypeKind::Untyped => Arc::new(Untyped),
            TypeKind::Custom(name) => {
                return Err(Error::UnknownType { name: name.clone() })
            }
        };
        Ok(ty)
    }
}

/// Identity descriptor used where no type was declared, e.g. for `Null`
/// attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Untyped;

impl Type for Untyped {
    fn kind(&self) -> TypeKind {
        TypeKind::Untyped
    }
}

static DEFAULT_TYPE: Lazy<Arc<dyn Type>> = Lazy::new(|| Arc::new(Untyped));

/// The process-wide default descriptor.
pub fn default_type() -> Arc<dyn Type> {
    Arc::clone(&DEFAULT_TYPE)
}
