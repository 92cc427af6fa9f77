//! Error types for annota.

use thiserror::Error;

/// Result type alias using annota's core Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for metadata struct, registry and codec operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Constructor misuse: too many positional values, unknown or duplicated keyword
    #[error("Construction error: {0}")]
    Construction(String),

    /// A value was rejected by an attribute descriptor
    #[error("Invalid value for '{attribute}': {reason}")]
    Validation { attribute: String, reason: String },

    /// Factory could not resolve a metadata type name
    #[error("Unknown metadata type: {0}")]
    UnknownMetadataType(String),

    /// A version stamp could not be parsed
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// A migration step could not transform old data
    #[error("Migration error: {0}")]
    Migration(String),

    /// Annotation codec was handed a value of the wrong shape
    #[error("Codec error: {0}")]
    Codec(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on the named attribute.
    pub fn validation(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_construction() {
        let err = Error::Construction("unexpected keyword 'bogus'".to_string());
        assert_eq!(
            err.to_string(),
            "Construction error: unexpected keyword 'bogus'"
        );
    }

    #[test]
    fn test_error_display_validation() {
        let err = Error::validation("nanoseconds", "value 2000000000 above maximum 1000000000");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'nanoseconds': value 2000000000 above maximum 1000000000"
        );
    }

    #[test]
    fn test_error_display_unknown_type() {
        let err = Error::UnknownMetadataType("NotAType".to_string());
        assert_eq!(err.to_string(), "Unknown metadata type: NotAType");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
