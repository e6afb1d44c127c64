//! Public error types for the `object-types` module.
//!
//! These errors are safe to expose to other modules and consumers.

use thiserror::Error;

/// Errors that can be returned by the `ObjectTypesApi`.
#[derive(Error, Debug, Clone)]
pub enum ObjectTypesError {
    /// A registration is missing its name, backing type or descriptor.
    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    /// The catalog was requested before startup registration completed.
    #[error("Object types are not pre-initialized")]
    NotPreInitialized,

    /// The catalog build was re-entered while it was running.
    #[error("Re-entrant object type initialization")]
    ReentrantEnsure,

    /// A type was registered after the catalog was frozen.
    #[error("Registration closed: {0}")]
    RegistrationClosed(String),

    /// The requested object type is unknown.
    #[error("Object type not found: {0}")]
    NotFound(String),
}

impl ObjectTypesError {
    /// Creates an `InvalidRegistration` error.
    #[must_use]
    pub fn invalid_registration(message: impl Into<String>) -> Self {
        Self::InvalidRegistration(message.into())
    }

    /// Creates a `NotPreInitialized` error.
    #[must_use]
    pub const fn not_pre_initialized() -> Self {
        Self::NotPreInitialized
    }

    /// Creates a `ReentrantEnsure` error.
    #[must_use]
    pub const fn reentrant_ensure() -> Self {
        Self::ReentrantEnsure
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

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if this is a configuration (registration) error.
    #[must_use]
    pub const fn is_invalid_registration(&self) -> bool {
        matches!(self, Self::InvalidRegistration(_))
    }

    /// Returns `true` if this error reports a bootstrap ordering bug.
    #[must_use]
    pub const fn is_ordering_error(&self) -> bool {
        matches!(
            self,
            Self::NotPreInitialized | Self::ReentrantEnsure | Self::RegistrationClosed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = ObjectTypesError::invalid_registration("missing backing type");
        assert!(err.is_invalid_registration());
        assert!(err.to_string().contains("missing backing type"));

        let err = ObjectTypesError::not_found("cms.unknown");
        assert!(err.is_not_found());

        assert!(ObjectTypesError::not_pre_initialized().is_ordering_error());
        assert!(ObjectTypesError::reentrant_ensure().is_ordering_error());
        assert!(ObjectTypesError::registration_closed("cms.late").is_ordering_error());
        assert!(!ObjectTypesError::not_found("cms.unknown").is_ordering_error());
    }

    #[test]
    fn test_error_display() {
        let err = ObjectTypesError::NotFound("cms.user".to_owned());
        assert_eq!(err.to_string(), "Object type not found: cms.user");

        let err = ObjectTypesError::NotPreInitialized;
        assert_eq!(err.to_string(), "Object types are not pre-initialized");

        let err = ObjectTypesError::ReentrantEnsure;
        assert_eq!(err.to_string(), "Re-entrant object type initialization");

        let err = ObjectTypesError::RegistrationClosed("cms.late".to_owned());
        assert_eq!(err.to_string(), "Registration closed: cms.late");
    }
}
