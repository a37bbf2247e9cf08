mod attribute;
mod error;
mod registry;
mod types;
mod value;

pub use attribute::{Attribute, Source};
pub use error::Error;
pub use registry::{Registration, Registry, TypeOptions};
pub use types::{
    default_type, BigInteger, Binary, Boolean, Date, DateTime, Decimal, Float, ImmutableString,
    Integer, StringType, Time, TimezoneMode, Type, TypeKind, TypeSpec, Untyped,
};
pub use value::{Bytes, TimeParts, Value};
