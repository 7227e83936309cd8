//! Operation diagnostics.
//!
//! Every runtime operation returns diagnostics rather than aborting the
//! process; the host decides how to present them. Errors stop the host
//! from writing state, warnings do not.

use concord_error::ConcordError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Operation failed; state must not be written.
    Error,
    /// Noteworthy but non-fatal.
    Warning,
}

/// One diagnostic: severity, a short summary, optional detail and the
/// attribute it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Diagnostic {
    severity: Severity,
    summary: String,
    detail: Option<String>,
    attribute: Option<String>,
}

impl Diagnostic {
    /// Build an error diagnostic.
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: Some(detail.into()),
            attribute: None,
        }
    }

    /// Build a warning diagnostic.
    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: Some(detail.into()),
            attribute: None,
        }
    }

    /// Attach the attribute this diagnostic refers to.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

/// An ordered collection of diagnostics.
///
/// # Examples
///
/// ```
/// use concord_provider::Diagnostics;
///
/// let mut diags = Diagnostics::new();
/// diags.warn("destroy is state-only", "the remote object was not reverted");
/// assert!(!diags.has_errors());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error.
    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.0.push(Diagnostic::error(summary, detail));
    }

    /// Append a warning.
    pub fn warn(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.0.push(Diagnostic::warning(summary, detail));
    }

    /// Append a prebuilt diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Append every diagnostic from `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// True when any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| *d.severity() == Severity::Error)
    }

    /// The diagnostics in order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ConcordError> for Diagnostics {
    fn from(err: ConcordError) -> Self {
        let mut diags = Diagnostics::new();
        diags.error("operation failed", err.to_string());
        diags
    }
}

impl From<&ConcordError> for Diagnostic {
    fn from(err: &ConcordError) -> Self {
        Diagnostic::error("operation failed", err.to_string())
    }
}
