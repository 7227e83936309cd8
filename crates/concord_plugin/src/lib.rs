//! The multiplexed plugin server.
//!
//! Hosts the two provider surfaces behind one protocol-6 endpoint: a unix
//! socket speaking newline-delimited JSON frames. The mux routes each
//! request to exactly one surface by resource type name and shares a
//! single configured REST transport between them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod frame;
mod mux;
mod provider;
mod server;

pub use frame::{Op, Request, Response};
pub use mux::ProviderMux;
pub use provider::ProviderSurface;
pub use server::{PROTOCOL_VERSION, PluginServer};
