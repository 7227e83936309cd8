//! Unsupported-operation error types.

/// A resource explicitly rejects an operation the API has no form for.
///
/// Bans, invites and thread members have no in-place edit on the Discord
/// API; their Update handler returns this error instead of guessing.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "Unsupported Operation: {} does not support {} at line {} in {}",
    resource,
    operation,
    line,
    file
)]
pub struct UnsupportedError {
    /// Resource type name
    pub resource: String,
    /// Rejected operation name
    pub operation: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl UnsupportedError {
    /// Create a new UnsupportedError at the current location.
    #[track_caller]
    pub fn new(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            resource: resource.into(),
            operation: operation.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
