use std::fmt;

use crate::types::TypeKind;

/// Failure taxonomy for the attribute engine.
///
/// Malformed user *input* (garbage text in a numeric or temporal field) is
/// never an error; it coerces to `Null` or zero per the type's cast rules.
/// Errors are reserved for contract violations: out-of-domain magnitudes,
/// writes to nonexistent attributes, unknown type names, malformed
/// multi-parameter assignments, and transport failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Range {
        value: String,
        kind: TypeKind,
        limit_bytes: Option<u32>,
    },
    MissingAttribute {
        name: String,
    },
    UnknownType {
        name: String,
    },
    Argument {
        message: String,
    },
    Frozen {
        kind: TypeKind,
    },
    Payload {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Range {
                value,
                kind,
                limit_bytes,
            } => match limit_bytes {
                Some(limit) => write!(
                    f,
                    "{} is out of range for {:?} with limit {} bytes",
                    value, kind, limit
                ),
                None => write!(f, "{} is out of range for {:?}", value, kind),
            },
            Error::MissingAttribute { name } => {
                write!(f, "can't write unknown attribute `{}`", name)
            }
            Error::UnknownType { name } => write!(f, "unknown type {:?}", name),
            Error::Argument { message } => write!(f, "{}", message),
            Error::Frozen { kind } => {
                write!(f, "can't modify a frozen value cast by {:?}", kind)
            }
            Error::Payload { message } => write!(f, "payload error: {}", message),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_display_includes_limit() {
        let err = Error::Range {
            value: "2147483648".to_string(),
            kind: TypeKind::Integer,
            limit_bytes: Some(4),
        };
        assert_eq!(
            err.to_string(),
            "2147483648 is out of range for Integer with limit 4 bytes"
        );
    }

    #[test]
    fn missing_attribute_display_names_the_attribute() {
        let err = Error::MissingAttribute {
            name: "flavor".to_string(),
        };
        assert_eq!(err.to_string(), "can't write unknown attribute `flavor`");
    }
}
