//! Error types for the Concord provider.
//!
//! This crate provides the foundation error types used throughout the
//! Concord workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean
//! error handling:
//! - `*ErrorKind` enum defines specific error conditions (where a kind
//!   discrimination is useful)
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use concord_error::{ConcordResult, ValidationError};
//!
//! fn check_name(name: &str) -> ConcordResult<()> {
//!     if name.is_empty() {
//!         Err(ValidationError::new("name", "must not be empty"))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_name("").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod config;
mod error;
mod import;
mod json;
mod plugin;
mod transport;
mod unsupported;
mod validation;

pub use cancel::CancellationError;
pub use config::ConfigError;
pub use error::{ConcordError, ConcordErrorKind, ConcordResult};
pub use import::ImportError;
pub use json::JsonError;
pub use plugin::{PluginError, PluginErrorKind};
pub use transport::TransportError;
pub use unsupported::UnsupportedError;
pub use validation::ValidationError;
