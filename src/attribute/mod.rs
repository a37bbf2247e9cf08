use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Error;
use crate::types::{default_type, Type, TypeSpec};
use crate::value::Value;

/// Where an attribute's raw value came from. The set is closed: every
/// dispatch over it is an exhaustive match, so a new provenance kind is a
/// compile-time decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Raw value originates from storage; casting goes through
    /// `deserialize`.
    FromDatabase,
    /// Raw value originates from user or application code; casting goes
    /// through `cast`.
    FromUser,
    /// Value is already canonical; casting is identity.
    WithCastValue,
    /// The attribute name does not exist on the record. Reads yield
    /// `Null`; any write fails.
    Null,
    /// Declared but never assigned.
    Uninitialized,
}

static NULL_VALUE: Value = Value::Null;

/// A value-holder pairing one raw input with a type descriptor.
///
/// Attributes are immutable value objects: assigning produces a new
/// instance chained to this one, never a mutated variant. The one
/// exception is in-place mutation of the cast value itself (appending to a
/// cast string), which dirty tracking still observes.
///
/// The cast value is computed at most once and cached in a tri-state cell,
/// so "has been read" stays observable even when the cast result is
/// legitimately `Null` or `false`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "EncodedAttribute", into = "EncodedAttribute")]
pub struct Attribute {
    name: String,
    value_before_type_cast: Value,
    ty: Arc<dyn Type>,
    source: Source,
    original_attribute: Option<Box<Attribute>>,
    cache: OnceCell<Value>,
}

impl Attribute {
    pub fn from_database(name: impl Into<String>, value: Value, ty: Arc<dyn Type>) -> Attribute {
        Attribute::build(name, value, ty, Source::FromDatabase, None)
    }

    pub fn from_user(
        name: impl Into<String>,
        value: Value,
        ty: Arc<dyn Type>,
        original_attribute: Option<Attribute>,
    ) -> Attribute {
        Attribute::build(
            name,
            value,
            ty,
            Source::FromUser,
            original_attribute.map(Box::new),
        )
    }

    pub fn from_cast_value(name: impl Into<String>, value: Value, ty: Arc<dyn Type>) -> Attribute {
        Attribute::build(name, value, ty, Source::WithCastValue, None)
    }

    /// Placeholder for an attribute name the record does not recognize.
    pub fn null(name: impl Into<String>) -> Attribute {
        Attribute::build(name, Value::Null, default_type(), Source::Null, None)
    }

    pub fn uninitialized(name: impl Into<String>, ty: Arc<dyn Type>) -> Attribute {
        Attribute::build(name, Value::Null, ty, Source::Uninitialized, None)
    }

    fn build(
        name: impl Into<String>,
        value_before_type_cast: Value,
        ty: Arc<dyn Type>,
        source: Source,
        original_attribute: Option<Box<Attribute>>,
    ) -> Attribute {
        Attribute {
            name: name.into(),
            value_before_type_cast,
            ty,
            source,
            original_attribute,
            cache: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_before_type_cast(&self) -> &Value {
        &self.value_before_type_cast
    }

    pub fn type_descriptor(&self) -> &Arc<dyn Type> {
        &self.ty
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// The cast value, computed on first read and cached. Uninitialized
    /// attributes read as `Null` without touching the cache; use
    /// [`Attribute::value_or_else`] to surface them.
    pub fn value(&self) -> &Value {
        if let Source::Uninitialized = self.source {
            return &NULL_VALUE;
        }
        self.cache
            .get_or_init(|| self.type_cast(&self.value_before_type_cast))
    }

    /// Like [`Attribute::value`], but an uninitialized attribute runs the
    /// caller-supplied callback with the attribute name instead. Records use
    /// the hook to raise descriptive unknown-attribute errors lazily.
    pub fn value_or_else<F>(&self, on_uninitialized: F) -> Value
    where
        F: FnOnce(&str) -> Value,
    {
        if let Source::Uninitialized = self.source {
            on_uninitialized(&self.name)
        } else {
            self.value().clone()
        }
    }

    /// Mutable access to the cast value, for in-place edits. Refused when
    /// the descriptor freezes its results, and for attributes that have no
    /// value to mutate.
    pub fn value_mut(&mut self) -> Result<&mut Value, Error> {
        if let Source::Null | Source::Uninitialized = self.source {
            return Err(Error::MissingAttribute {
                name: self.name.clone(),
            });
        }
        if !self.ty.mutable() {
            return Err(Error::Frozen {
                kind: self.ty.kind(),
            });
        }
        if self.cache.get().is_none() {
            let casted = self.type_cast(&self.value_before_type_cast);
            let _ = self.cache.set(casted);
        }
        Ok(self.cache.get_mut().expect("cast value just initialized"))
    }

    /// The value before any pending assignments, recovered by walking the
    /// provenance chain back to its earliest ancestor.
    pub fn original_value(&self) -> Value {
        self.original_value_opt().unwrap_or(Value::Null)
    }

    // None encodes the uninitialized sentinel: an assignment over a slot
    // that never held anything always counts as changed, even when the
    // assigned value casts to Null.
    fn original_value_opt(&self) -> Option<Value> {
        match &self.original_attribute {
            Some(original) => original.original_value_opt(),
            None => match self.source {
                Source::Uninitialized => None,
                _ => Some(self.type_cast(&self.value_before_type_cast)),
            },
        }
    }

    /// Canonical storage form of the current value.
    pub fn value_for_database(&self) -> Result<Value, Error> {
        if let Source::Uninitialized = self.source {
            return Ok(Value::Null);
        }
        self.ty.serialize(self.value())
    }

    fn original_value_for_database(&self) -> Result<Value, Error> {
        match &self.original_attribute {
            Some(original) => original.original_value_for_database(),
            None => match self.source {
                // Storage already holds the serialized form.
                Source::FromDatabase => Ok(self.value_before_type_cast.clone()),
                Source::Uninitialized => Ok(Value::Null),
                _ => self.ty.serialize(&self.original_value()),
            },
        }
    }

    pub fn changed(&self) -> bool {
        self.changed_from_assignment() || self.changed_in_place()
    }

    fn changed_from_assignment(&self) -> bool {
        if self.original_attribute.is_none() {
            return false;
        }
        match self.original_value_opt() {
            None => true,
            Some(original) => {
                self.ty
                    .changed(&original, self.value(), &self.value_before_type_cast)
            }
        }
    }

    /// Whether the cast value was mutated after being read. A value that
    /// was never read cannot have been mutated; that case short-circuits
    /// without running any serialize/deserialize comparison.
    pub fn changed_in_place(&self) -> bool {
        if !self.has_been_read() {
            return false;
        }
        if let Source::WithCastValue = self.source {
            return false;
        }
        match self.original_value_for_database() {
            Ok(raw_old) => self.ty.changed_in_place(&raw_old, self.value()),
            // A value the type refuses to serialize cannot match what
            // storage holds.
            Err(_) => true,
        }
    }

    pub fn has_been_read(&self) -> bool {
        self.cache.get().is_some()
    }

    /// True only for user assignments whose raw value was actually typed
    /// by a human, not synthesized from structured multi-parameter input.
    /// Numeric validators key off this to read the pre-cast text.
    pub fn came_from_user(&self) -> bool {
        matches!(self.source, Source::FromUser)
            && !self
                .ty
                .value_constructed_by_mass_assignment(&self.value_before_type_cast)
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self.source, Source::Uninitialized)
    }

    /// Assign a user value, chaining this attribute as the new one's
    /// provenance. Runs the descriptor's assignment-time validation.
    pub fn with_value_from_user(&self, value: Value) -> Result<Attribute, Error> {
        self.guard_writable()?;
        self.ty.assert_valid_value(&value)?;
        let original = match &self.original_attribute {
            Some(original) => original.clone(),
            None => Box::new(self.clone()),
        };
        Ok(Attribute {
            name: self.name.clone(),
            value_before_type_cast: value,
            ty: Arc::clone(&self.ty),
            source: Source::FromUser,
            original_attribute: Some(original),
            cache: OnceCell::new(),
        })
    }

    pub fn with_value_from_database(&self, value: Value) -> Result<Attribute, Error> {
        self.guard_writable()?;
        Ok(Attribute::from_database(
            &self.name,
            value,
            Arc::clone(&self.ty),
        ))
    }

    pub fn with_cast_value(&self, value: Value) -> Result<Attribute, Error> {
        self.guard_writable()?;
        Ok(Attribute::from_cast_value(
            &self.name,
            value,
            Arc::clone(&self.ty),
        ))
    }

    /// Re-wrap the serialized current value as a fresh storage-loaded
    /// attribute, discarding provenance. Pending assignments stop counting
    /// as changes.
    pub fn forgetting_assignment(&self) -> Result<Attribute, Error> {
        if let Source::Uninitialized = self.source {
            return Ok(self.clone());
        }
        let stored = self.value_for_database()?;
        self.with_value_from_database(stored)
    }

    /// Re-type the attribute. An in-place mutation is first crystallized
    /// into an explicit user assignment under the old type so it is not
    /// silently lost.
    pub fn with_type(&self, ty: Arc<dyn Type>) -> Result<Attribute, Error> {
        match self.source {
            // Retyping never makes a missing attribute writable.
            Source::Null => Ok(Attribute::build(
                &self.name,
                Value::Null,
                ty,
                Source::Null,
                None,
            )),
            Source::Uninitialized => Ok(Attribute::uninitialized(&self.name, ty)),
            _ => {
                if self.changed_in_place() {
                    trace!(name = %self.name, "crystallizing in-place mutation before re-typing");
                    self.with_value_from_user(self.value().clone())?.with_type(ty)
                } else {
                    Ok(Attribute {
                        name: self.name.clone(),
                        value_before_type_cast: self.value_before_type_cast.clone(),
                        ty,
                        source: self.source,
                        original_attribute: self.original_attribute.clone(),
                        cache: OnceCell::new(),
                    })
                }
            }
        }
    }

    /// Compact binary transport form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        bitcode::serialize(self).map_err(|e| Error::Payload {
            message: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Attribute, Error> {
        bitcode::deserialize(bytes).map_err(|e| Error::Payload {
            message: e.to_string(),
        })
    }

    fn guard_writable(&self) -> Result<(), Error> {
        if let Source::Null = self.source {
            return Err(Error::MissingAttribute {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    fn type_cast(&self, value: &Value) -> Value {
        match self.source {
            Source::FromDatabase => self.ty.deserialize(value),
            Source::FromUser => self.ty.cast(value),
            Source::WithCastValue => value.clone(),
            Source::Null => Value::Null,
            Source::Uninitialized => Value::Null,
        }
    }
}

/// Structural equality over provenance, name, raw value, and descriptor
/// configuration. Never over the memoized cast value, which is derived
/// and may be absent.
impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.name == other.name
            && self.value_before_type_cast == other.value_before_type_cast
            && self.ty.spec() == other.ty.spec()
    }
}

impl Hash for Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.name.hash(state);
        self.value_before_type_cast.hash(state);
        self.ty.spec().hash(state);
    }
}

/// Wire form of an attribute: the descriptor travels as its spec, the
/// memo cell as an optional value so memoization state survives exactly.
#[derive(Serialize, Deserialize)]
struct EncodedAttribute {
    name: String,
    source: Source,
    value_before_type_cast: Value,
    #[serde(rename = "type")]
    type_spec: TypeSpec,
    original_attribute: Option<Box<EncodedAttribute>>,
    value: Option<Value>,
}

impl From<Attribute> for EncodedAttribute {
    fn from(attr: Attribute) -> Self {
        let value = attr.cache.get().cloned();
        EncodedAttribute {
            name: attr.name,
            source: attr.source,
            value_before_type_cast: attr.value_before_type_cast,
            type_spec: attr.ty.spec(),
            original_attribute: attr
                .original_attribute
                .map(|original| Box::new(EncodedAttribute::from(*original))),
            value,
        }
    }
}

impl TryFrom<EncodedAttribute> for Attribute {
    type Error = Error;

    fn try_from(encoded: EncodedAttribute) -> Result<Self, Error> {
        let ty = encoded.type_spec.instantiate()?;
        let original_attribute = match encoded.original_attribute {
            Some(original) => Some(Box::new(Attribute::try_from(*original)?)),
            None => None,
        };
        let cache = OnceCell::new();
        if let Some(value) = encoded.value {
            let _ = cache.set(value);
        }
        Ok(Attribute {
            name: encoded.name,
            value_before_type_cast: encoded.value_before_type_cast,
            ty,
            source: encoded.source,
            original_attribute,
            cache,
        })
    }
}
