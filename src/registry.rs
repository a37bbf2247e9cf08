use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Error;
use crate::types::{
    BigInteger, Binary, Boolean, Date, DateTime, Decimal, Float, ImmutableString, Integer,
    StringType, Time, TimezoneMode, Type,
};

/// Constructor arguments forwarded to a type factory at lookup time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeOptions {
    pub precision: Option<u32>,
    pub scale: Option<i64>,
    pub limit: Option<u32>,
    pub timezone: Option<TimezoneMode>,
}

impl TypeOptions {
    pub fn timezone_or_default(&self) -> TimezoneMode {
        self.timezone.unwrap_or_default()
    }
}

type TypeFactory = Box<dyn Fn(&TypeOptions) -> Arc<dyn Type> + Send + Sync>;

/// One registry entry: a name and the factory that builds descriptors for
/// it. Matching is exact-name equality today; the options are handed to
/// [`Registration::matches`] so a future matcher may consider them.
pub struct Registration {
    name: String,
    factory: TypeFactory,
}

impl Registration {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&TypeOptions) -> Arc<dyn Type> + Send + Sync + 'static,
    {
        Registration {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, name: &str, _options: &TypeOptions) -> bool {
        self.name == name
    }

    fn build(&self, options: &TypeOptions) -> Arc<dyn Type> {
        (self.factory)(options)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered lookup table from symbolic type names to descriptor factories.
///
/// The first registration whose name matches wins, in insertion order.
/// Appending a second entry under an existing name therefore never
/// overrides the first; overriding means building a fresh registry.
/// Factories run on every lookup and return a new descriptor per call.
#[derive(Debug, Default)]
pub struct Registry {
    registrations: Vec<Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// A registry pre-populated with every built-in kind under its
    /// canonical name.
    pub fn with_default_types() -> Self {
        let mut registry = Registry::new();
        registry.register("big_integer", |_: &TypeOptions| {
            Arc::new(BigInteger) as Arc<dyn Type>
        });
        registry.register("binary", |_: &TypeOptions| Arc::new(Binary) as Arc<dyn Type>);
        registry.register("boolean", |_: &TypeOptions| {
            Arc::new(Boolean) as Arc<dyn Type>
        });
        registry.register("date", |_: &TypeOptions| Arc::new(Date) as Arc<dyn Type>);
        registry.register("datetime", |options: &TypeOptions| {
            Arc::new(DateTime::new(options.precision, options.timezone_or_default()))
                as Arc<dyn Type>
        });
        registry.register("decimal", |options: &TypeOptions| {
            Arc::new(Decimal::new(options.precision, options.scale)) as Arc<dyn Type>
        });
        registry.register("float", |_: &TypeOptions| Arc::new(Float) as Arc<dyn Type>);
        registry.register("immutable_string", |_: &TypeOptions| {
            Arc::new(ImmutableString) as Arc<dyn Type>
        });
        registry.register("integer", |options: &TypeOptions| {
            Arc::new(Integer::new(options.limit)) as Arc<dyn Type>
        });
        registry.register("string", |_: &TypeOptions| {
            Arc::new(StringType) as Arc<dyn Type>
        });
        registry.register("time", |options: &TypeOptions| {
            Arc::new(Time::new(options.precision, options.timezone_or_default())) as Arc<dyn Type>
        });
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&TypeOptions) -> Arc<dyn Type> + Send + Sync + 'static,
    {
        let registration = Registration::new(name, factory);
        trace!(name = registration.name(), "registered type");
        self.registrations.push(registration);
    }

    pub fn lookup(&self, name: &str, options: &TypeOptions) -> Result<Arc<dyn Type>, Error> {
        match self
            .registrations
            .iter()
            .find(|r| r.matches(name, options))
        {
            Some(registration) => Ok(registration.build(options)),
            None => {
                debug!(name, "type lookup missed");
                Err(Error::UnknownType {
                    name: name.to_string(),
                })
            }
        }
    }
}
