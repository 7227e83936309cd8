//! Declarative Discord guild management.
//!
//! This facade re-exports the member crates so consumers can depend on
//! `concord` alone; the binary in this crate serves the provider over a
//! unix socket.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use concord_core;
pub use concord_error;
pub use concord_plugin;
pub use concord_provider;
pub use concord_resources;
pub use concord_transport;

mod config;

pub use config::ProviderConfig;
