//! Top-level error wrapper types.

use crate::{
    CancellationError, ConfigError, ImportError, JsonError, PluginError, TransportError,
    UnsupportedError, ValidationError,
};

/// This is the foundation error enum. Every Concord crate surfaces its
/// failures through one of these variants.
///
/// # Examples
///
/// ```
/// use concord_error::{ConcordError, TransportError};
///
/// let terr = TransportError::new("GET", "/gateway", 500, None, "upstream down");
/// let err: ConcordError = terr.into();
/// assert!(format!("{}", err).contains("Transport Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ConcordErrorKind {
    /// REST transport error
    #[from(TransportError)]
    Transport(TransportError),
    /// Configuration validation error
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Composite-id import error
    #[from(ImportError)]
    Import(ImportError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Provider configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Plugin server error
    #[from(PluginError)]
    Plugin(PluginError),
    /// Operation the API has no form for
    #[from(UnsupportedError)]
    Unsupported(UnsupportedError),
    /// Cancellation or timeout
    #[from(CancellationError)]
    Cancelled(CancellationError),
}

/// Concord error with kind discrimination.
///
/// # Examples
///
/// ```
/// use concord_error::{ConcordResult, ValidationError};
///
/// fn might_fail() -> ConcordResult<()> {
///     Err(ValidationError::new("channel_id", "missing"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Concord Error: {}", _0)]
pub struct ConcordError(Box<ConcordErrorKind>);

impl ConcordError {
    /// Create a new error from a kind.
    pub fn new(kind: ConcordErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConcordErrorKind {
        &self.0
    }

    /// The transport error inside, when this is a transport failure.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self.kind() {
            ConcordErrorKind::Transport(t) => Some(t),
            _ => None,
        }
    }

    /// True when the underlying failure was a 404 read of a managed object.
    pub fn is_not_found(&self) -> bool {
        self.as_transport().is_some_and(TransportError::is_not_found)
    }
}

// Generic From implementation for any type that converts to ConcordErrorKind
impl<T> From<T> for ConcordError
where
    T: Into<ConcordErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Concord operations.
///
/// # Examples
///
/// ```
/// use concord_error::{ConcordResult, JsonError};
///
/// fn parse() -> ConcordResult<String> {
///     Err(JsonError::new("unexpected end of input"))?
/// }
/// ```
pub type ConcordResult<T> = std::result::Result<T, ConcordError>;
