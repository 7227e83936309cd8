//! Discord REST transport and rate-limit coordination.
//!
//! This crate is the only path through which Concord talks to Discord.
//! [`DiscordRest`] issues requests with bot authorization, audit-log
//! reasons, multipart uploads and typed error surfacing; the embedded
//! [`RateLimitCoordinator`] enforces Discord's per-route bucket limits,
//! the global limit, and bounded retry on 429/5xx.
//!
//! Resource code must never retry on its own; the coordinator owns every
//! retry decision.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod rest;
mod route;

pub use config::{RestConfig, RestConfigBuilder};
pub use limiter::{BucketSnapshot, RateLimitCoordinator, RateLimitUpdate};
pub use rest::{DiscordRest, Method};
pub use route::route_key;
