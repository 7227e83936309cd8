//! Core types for the Concord provider.
//!
//! This crate holds the domain vocabulary every other Concord crate builds
//! on: snowflake identifiers, colon-delimited composite identifiers,
//! canonical JSON rendering with the 32-bit hashcode used for synthetic
//! resource ids, the 64-bit permission algebra, tri-state attribute values,
//! and base64 data-URI helpers for image and sound uploads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod composite;
mod data_uri;
mod json;
mod permissions;
mod snowflake;
mod value;

pub use composite::CompositeId;
pub use data_uri::{decode_data_uri, encode_data_uri, mime_for_path};
pub use json::{hashcode, normalize_json, normalize_value, synthetic_id};
pub use permissions::{Permission, PermissionChoice, PermissionSet};
pub use snowflake::Snowflake;
pub use value::{AttrValue, UNKNOWN_KEY};
