//! Transport error types.

use derive_getters::Getters;

/// Error surfaced by the REST transport for a failed Discord request.
///
/// Carries everything the reconciliation runtime needs to distinguish a
/// tombstone (404) from a retryable failure (429, 5xx) from a hard error,
/// plus Discord's stable numeric error code when the response body had one.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display(
    "Transport Error: {} {} returned {}{}: {} at line {} in {}",
    method,
    path,
    status,
    discord_code.map(|c| format!(" (code {})", c)).unwrap_or_default(),
    message,
    line,
    file
)]
pub struct TransportError {
    /// HTTP method of the failed request.
    method: String,
    /// Request path relative to the API base.
    path: String,
    /// HTTP status code, or 0 for connection-level failures.
    status: u16,
    /// Discord's JSON error code, when the body carried one.
    discord_code: Option<u32>,
    /// Human-readable message from Discord or the HTTP layer.
    message: String,
    line: u32,
    file: &'static str,
}

impl TransportError {
    /// Create a new TransportError with automatic location tracking.
    ///
    /// # Examples
    ///
    /// ```
    /// use concord_error::TransportError;
    ///
    /// let err = TransportError::new("GET", "/guilds/1", 404, Some(10004), "Unknown Guild");
    /// assert!(err.is_not_found());
    /// ```
    #[track_caller]
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        status: u16,
        discord_code: Option<u32>,
        message: impl Into<String>,
    ) -> Self {
        let location = std::panic::Location::caller();
        Self {
            method: method.into(),
            path: path.into(),
            status,
            discord_code,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a connection-level error (no HTTP status was received).
    #[track_caller]
    pub fn connection(
        method: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(method, path, 0, None, message)
    }

    /// True when the remote object no longer exists (tombstone signal).
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// True when the request was rate limited.
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// True for server-side failures worth retrying.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}
