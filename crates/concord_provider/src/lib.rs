//! The reconciliation runtime every Concord resource is built on.
//!
//! A resource supplies a schema, a remote API shape and translation
//! routines; this crate supplies the uniform lifecycle around them:
//! config-time validation, plan-time normalization (diff-stable JSON,
//! CRLF trimming, write-only preservation), three-valued diffing,
//! 404-as-tombstone reads, read-back after update, state-only destroy for
//! authoritative-set resources, and composite-id import.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod diagnostics;
mod diff;
mod plan;
mod resource;
mod runtime;
mod schema;
mod state;
mod validate;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use diff::{PatchBuilder, project_fields};
pub use plan::plan_modify;
pub use resource::{Context, DataSource, DestroyScope, Resource};
pub use runtime::ResourceRuntime;
pub use schema::{AttrType, Attribute, PlanModifier, Schema, Validator};
pub use state::ResourceState;
pub use validate::validate_config;
