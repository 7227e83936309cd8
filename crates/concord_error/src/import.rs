//! Import error types.

use derive_getters::Getters;

/// Error parsing a composite import identifier.
///
/// Composite ids are colon-delimited (`a:b` or `a:b:c`); splitting into the
/// wrong number of parts is rejected with the expected shape in the message.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display(
    "Import Error: expected id of the form {}, got {:?} at line {} in {}",
    expected,
    got,
    line,
    file
)]
pub struct ImportError {
    /// Expected id shape, e.g. `"server_id:user_id"`.
    expected: String,
    /// The id string that failed to parse.
    got: String,
    line: u32,
    file: &'static str,
}

impl ImportError {
    /// Create a new ImportError with automatic location tracking.
    #[track_caller]
    pub fn new(expected: impl Into<String>, got: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            expected: expected.into(),
            got: got.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
