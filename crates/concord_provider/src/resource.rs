//! The resource and data-source contracts.

use crate::{ResourceState, Schema};
use concord_error::{ConcordResult, ImportError};
use concord_transport::DiscordRest;
use derive_getters::Getters;
use derive_new::new;

/// Per-operation context handed to resource handlers.
///
/// Carries the shared transport; the only way a resource reaches Discord.
#[derive(Debug, Clone, Getters, new)]
pub struct Context {
    /// The shared REST transport.
    rest: DiscordRest,
}

/// What Delete does to the remote object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DestroyScope {
    /// Delete the remote object (404 treated as success).
    Remote,
    /// Authoritative-set resource: remove from state only and warn. The
    /// remote has no meaningful default to revert to.
    StateOnly,
}

/// One managed resource type.
///
/// Implementations supply the schema, the remote API shape and the
/// desired-to-remote translation; [`ResourceRuntime`](crate::ResourceRuntime)
/// supplies the uniform lifecycle around them.
///
/// Handlers must never retry or rate-limit on their own; the transport
/// owns both.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// The type name the host routes on, e.g. `discord_channel`.
    fn type_name(&self) -> &'static str;

    /// The declared schema.
    fn schema(&self) -> Schema;

    /// Destroy semantics; authoritative-set resources override to
    /// [`DestroyScope::StateOnly`].
    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::Remote
    }

    /// Create the remote object from the planned state and record its id.
    /// Computed fields are filled by the runtime's read-back.
    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()>;

    /// Refresh state from the remote object. A 404 may surface as a
    /// transport error; the runtime converts it to a tombstone.
    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()>;

    /// Apply the minimal patch from plan vs prior. An empty patch must
    /// issue zero network writes.
    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()>;

    /// Remove the remote object. Only called when
    /// [`destroy_scope`](Self::destroy_scope) is [`DestroyScope::Remote`].
    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()>;

    /// Seed state from an import id. Single-id resources use the default;
    /// composite-key resources parse `a:b` (or `a:b:c`) into component
    /// attributes.
    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        if id.is_empty() {
            return Err(ImportError::new("a non-empty id", id).into());
        }
        let mut state = ResourceState::new();
        state.set_id(id);
        Ok(state)
    }
}

/// One read-only data source.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// The type name the host routes on, e.g. `discord_role`.
    fn type_name(&self) -> &'static str;

    /// The declared schema.
    fn schema(&self) -> Schema;

    /// Resolve the data source: fill computed attributes from config.
    async fn read(&self, ctx: &Context, config: &mut ResourceState) -> ConcordResult<()>;
}
