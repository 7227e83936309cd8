//! Configuration validation error types.

use derive_getters::Getters;

/// Validation error for an ill-formed resource configuration.
///
/// Raised before any network call: bad snowflakes, malformed timestamps,
/// malformed JSON, mutually-exclusive or required-if violations.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Validation Error: {}: {} at line {} in {}", attribute, message, line, file)]
pub struct ValidationError {
    /// Attribute the error refers to.
    attribute: String,
    /// What is wrong with the value.
    message: String,
    line: u32,
    file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    ///
    /// # Examples
    ///
    /// ```
    /// use concord_error::ValidationError;
    ///
    /// let err = ValidationError::new("server_id", "must be a snowflake");
    /// assert_eq!(err.attribute(), "server_id");
    /// ```
    #[track_caller]
    pub fn new(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            attribute: attribute.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
