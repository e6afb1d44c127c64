//! Domain error types for the Object Types module.

use object_types_sdk::ObjectTypesError;
use thiserror::Error;

/// Domain-level errors for the Object Types module.
///
/// Registration and bootstrap-order variants are fatal startup defects;
/// `NotFound` is only produced by lookups that explicitly require a descriptor.
#[derive(Error, Debug)]
pub enum DomainError {
    /// A registration is missing its name, backing type or descriptor.
    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    /// `ensure_all` ran before startup pre-initialization completed.
    #[error("Object types are not pre-initialized")]
    NotPreInitialized,

    /// `ensure_all` was re-entered on the building thread.
    #[error("Re-entrant object type initialization")]
    ReentrantEnsure,

    /// A type was registered after the catalog was frozen.
    #[error("Registration closed: {0}")]
    RegistrationClosed(String),

    /// The requested object type is unknown.
    #[error("Object type not found: {0}")]
    NotFound(String),
}

impl DomainError {
    /// Creates an `InvalidRegistration` error.
    #[must_use]
    pub fn invalid_registration(message: impl Into<String>) -> Self {
        Self::InvalidRegistration(message.into())
    }

    /// Creates a `RegistrationClosed` error.
    #[must_use]
    pub fn registration_closed(object_type: impl Into<String>) -> Self {
        Self::RegistrationClosed(object_type.into())
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(object_type: impl Into<String>) -> Self {
        Self::NotFound(object_type.into())
    }
}

impl From<DomainError> for ObjectTypesError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidRegistration(msg) => ObjectTypesError::invalid_registration(msg),
            DomainError::NotPreInitialized => ObjectTypesError::not_pre_initialized(),
            DomainError::ReentrantEnsure => ObjectTypesError::reentrant_ensure(),
            DomainError::RegistrationClosed(name) => ObjectTypesError::registration_closed(name),
            DomainError::NotFound(name) => ObjectTypesError::not_found(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = DomainError::invalid_registration("missing backing type");
        assert!(matches!(err, DomainError::InvalidRegistration(_)));

        let err = DomainError::registration_closed("cms.late");
        assert!(matches!(err, DomainError::RegistrationClosed(_)));

        let err = DomainError::not_found("cms.unknown");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_domain_to_sdk_error_conversion() {
        let sdk_err: ObjectTypesError = DomainError::not_found("cms.unknown").into();
        assert!(sdk_err.is_not_found());

        let sdk_err: ObjectTypesError = DomainError::invalid_registration("no name").into();
        assert!(sdk_err.is_invalid_registration());

        let sdk_err: ObjectTypesError = DomainError::NotPreInitialized.into();
        assert!(matches!(sdk_err, ObjectTypesError::NotPreInitialized));

        let sdk_err: ObjectTypesError = DomainError::ReentrantEnsure.into();
        assert!(matches!(sdk_err, ObjectTypesError::ReentrantEnsure));

        let sdk_err: ObjectTypesError = DomainError::registration_closed("cms.late").into();
        assert!(sdk_err.is_ordering_error());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidRegistration("no name".to_owned());
        assert_eq!(err.to_string(), "Invalid registration: no name");

        let err = DomainError::NotFound("cms.user".to_owned());
        assert_eq!(err.to_string(), "Object type not found: cms.user");
    }
}
