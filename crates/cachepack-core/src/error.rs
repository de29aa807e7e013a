//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout cachepack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! Errors fall into two classes:
//!
//! - **Type errors**: a value or structure the codec cannot represent:
//!   unsupported kinds, forbidden kinds, malformed envelopes, invalid record
//!   descriptors, record construction failures, excessive nesting.
//! - **Registration errors**: anything touching the model allow-list:
//!   unknown aliases, unregistered record types, conflicting registrations.
//!   These are never absorbed.
//!
//! Byte-level JSON and canonicalization failures are carried separately.

use thiserror::Error;

use crate::marker::Marker;

/// Top-level error type for cachepack.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The value kind has no wire representation.
    #[error("unsupported type for packing: {kind}")]
    Unsupported {
        /// Name of the offending value kind.
        kind: &'static str,
    },

    /// The value kind is explicitly banned from serialization.
    #[error("{kind} objects cannot be serialized")]
    Forbidden {
        /// Name of the offending value kind.
        kind: &'static str,
    },

    /// Floats must be finite to be represented as JSON numbers.
    #[error("non-finite float cannot be represented: {0}")]
    NonFiniteFloat(f64),

    /// A marker envelope carried a payload that does not decode.
    #[error("malformed {marker} envelope: {source}")]
    MalformedEnvelope {
        /// The marker whose payload failed.
        marker: Marker,
        /// What was wrong with the payload.
        #[source]
        source: ParseError,
    },

    /// A record type or alias failed registration-time validation.
    #[error("invalid record type {type_name}: {reason}")]
    InvalidRecord {
        /// Qualified name of the record type.
        type_name: String,
        /// Why the record was rejected.
        reason: String,
    },

    /// A mapping or record key collides with a reserved marker key.
    #[error("key {key:?} is reserved for marker envelopes")]
    ReservedKey {
        /// The offending key.
        key: String,
    },

    /// A MODEL envelope names a different record than the position declares.
    #[error("expected model '{expected}', found '{found}'")]
    AliasMismatch {
        /// Alias declared for the position.
        expected: String,
        /// Alias carried by the payload.
        found: String,
    },

    /// A value had a different kind than the target type requires.
    #[error("expected {expected}, found {found}")]
    ValueMismatch {
        /// Kind the conversion expected.
        expected: &'static str,
        /// Kind actually present.
        found: &'static str,
    },

    /// A record field is required but absent from the payload.
    #[error("missing field `{field}`")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// A payload field has no counterpart in the record type.
    #[error("unexpected field `{field}`")]
    UnexpectedField {
        /// Field name.
        field: String,
    },

    /// A record field failed to convert.
    #[error("field `{field}`: {source}")]
    Field {
        /// Field name.
        field: String,
        /// Underlying conversion error.
        #[source]
        source: Box<CodecError>,
    },

    /// A registered record type could not be constructed from its fields.
    #[error("cannot construct model {alias}: {source}")]
    Construction {
        /// Alias of the record type.
        alias: String,
        /// Underlying construction error.
        #[source]
        source: Box<CodecError>,
    },

    /// Input nesting exceeded the configured limit.
    #[error("nesting depth exceeds limit of {limit}")]
    DepthExceeded {
        /// The configured maximum depth.
        limit: usize,
    },

    /// Model allow-list violation.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Byte-level JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Returns true for errors in the registration class.
    pub fn is_registration_error(&self) -> bool {
        match self {
            Self::Registration(_) => true,
            Self::Field { source, .. } | Self::Construction { source, .. } => {
                source.is_registration_error()
            }
            _ => false,
        }
    }

    /// Returns true for errors in the type class.
    pub fn is_type_error(&self) -> bool {
        match self {
            Self::Unsupported { .. }
            | Self::Forbidden { .. }
            | Self::NonFiniteFloat(_)
            | Self::MalformedEnvelope { .. }
            | Self::InvalidRecord { .. }
            | Self::ReservedKey { .. }
            | Self::AliasMismatch { .. }
            | Self::ValueMismatch { .. }
            | Self::MissingField { .. }
            | Self::UnexpectedField { .. }
            | Self::DepthExceeded { .. } => true,
            Self::Field { source, .. } | Self::Construction { source, .. } => {
                source.is_type_error()
            }
            Self::Registration(_) | Self::Canonicalization(_) | Self::Json(_) => false,
        }
    }
}

/// Model allow-list violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The alias already names a different type.
    #[error("duplicate alias '{alias}': already registered for {existing}, cannot register {attempted}")]
    DuplicateAlias {
        /// The contested alias.
        alias: String,
        /// Type currently holding the alias.
        existing: String,
        /// Type that tried to claim it.
        attempted: String,
    },

    /// The type is already registered; re-registration is refused.
    #[error("model {type_name} already registered with alias '{alias}'")]
    AlreadyRegistered {
        /// Type that was registered twice.
        type_name: String,
        /// Alias it already holds.
        alias: String,
    },

    /// A record instance of an unregistered type reached `pack`.
    #[error("model {type_name} is not registered")]
    UnregisteredType {
        /// Type of the offending instance.
        type_name: String,
    },

    /// A MODEL envelope named an alias the registry does not know.
    #[error("model with alias '{alias}' is not registered")]
    UnknownAlias {
        /// The unresolved alias.
        alias: String,
    },
}

/// Failure to parse the textual form of a scalar extension type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not a finite decimal number.
    #[error("invalid decimal literal {0:?}")]
    InvalidDecimal(String),

    /// Not a 24-digit hex object id.
    #[error("invalid object id {0:?}")]
    InvalidObjectId(String),

    /// Not an ISO-8601 calendar date.
    #[error("invalid ISO-8601 date {0:?}")]
    InvalidDate(String),

    /// Not an ISO-8601 datetime.
    #[error("invalid ISO-8601 datetime {0:?}")]
    InvalidDateTime(String),

    /// The payload had the wrong JSON kind for this marker.
    #[error("expected {expected} payload, found {found}")]
    WrongPayload {
        /// JSON kind the marker requires.
        expected: &'static str,
        /// JSON kind actually present.
        found: &'static str,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_errors_classify() {
        let err: CodecError = RegistrationError::UnknownAlias {
            alias: "user.v1".to_string(),
        }
        .into();
        assert!(err.is_registration_error());
        assert!(!err.is_type_error());
        assert!(err.to_string().contains("user.v1"));
    }

    #[test]
    fn type_errors_classify() {
        let err = CodecError::Unsupported { kind: "bytes" };
        assert!(err.is_type_error());
        assert!(!err.is_registration_error());
        assert_eq!(err.to_string(), "unsupported type for packing: bytes");
    }

    #[test]
    fn nested_errors_keep_their_class() {
        let inner = CodecError::Registration(RegistrationError::UnknownAlias {
            alias: "ghost".to_string(),
        });
        let wrapped = CodecError::Field {
            field: "owner".to_string(),
            source: Box::new(inner),
        };
        assert!(wrapped.is_registration_error());

        let construction = CodecError::Construction {
            alias: "order.v1".to_string(),
            source: Box::new(CodecError::MissingField {
                field: "id".to_string(),
            }),
        };
        assert!(construction.is_type_error());
        assert!(construction.to_string().contains("order.v1"));
    }

    #[test]
    fn malformed_envelope_names_marker() {
        let err = CodecError::MalformedEnvelope {
            marker: Marker::Date,
            source: ParseError::InvalidDate("yesterday".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATE"), "{msg}");
        assert!(msg.contains("yesterday"), "{msg}");
    }
}
