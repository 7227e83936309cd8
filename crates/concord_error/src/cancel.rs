//! Cancellation and timeout error types.

/// Operation cancelled or deadline expired.
///
/// Surfaced as a distinct diagnostic so the host can tell a timeout apart
/// from a remote failure.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cancelled: {} at line {} in {}", message, line, file)]
pub struct CancellationError {
    /// What was cancelled and why
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl CancellationError {
    /// Create a new CancellationError at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
