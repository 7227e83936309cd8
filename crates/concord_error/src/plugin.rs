//! Plugin server error types.

use derive_getters::Getters;

/// Plugin server error variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum PluginErrorKind {
    /// Failed to bind the plugin socket.
    #[display("Failed to bind plugin socket: {_0}")]
    BindFailed(String),

    /// Two providers registered the same resource or data-source type name.
    #[display("Duplicate type registered by both providers: {_0}")]
    DuplicateType(String),

    /// Request named a type no provider serves.
    #[display("Unknown type: {_0}")]
    UnknownType(String),

    /// A frame failed to parse or serialize.
    #[display("Malformed frame: {_0}")]
    MalformedFrame(String),

    /// The shared transport was missing or mistyped at Configure time.
    #[display("Provider is not configured: {_0}")]
    NotConfigured(String),
}

/// Plugin server error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Plugin Error: {} at line {} in {}", kind, line, file)]
pub struct PluginError {
    kind: PluginErrorKind,
    line: u32,
    file: &'static str,
}

impl PluginError {
    /// Create a new PluginError with automatic location tracking.
    ///
    /// # Examples
    ///
    /// ```
    /// use concord_error::{PluginError, PluginErrorKind};
    ///
    /// let err = PluginError::new(PluginErrorKind::UnknownType("discord_widget".into()));
    /// ```
    #[track_caller]
    pub fn new(kind: PluginErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
