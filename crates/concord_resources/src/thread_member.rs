//! The `discord_thread_member` resource.

use crate::common::{audit_reason, require_str};
use concord_core::CompositeId;
use concord_error::{ConcordResult, UnsupportedError};
use concord_provider::{Attribute, Context, Resource, ResourceState, Schema};
use concord_transport::Method;
use serde_json::json;

/// Thread membership, keyed by `thread_id:user_id`. Membership is binary;
/// there is nothing to update in place.
pub struct ThreadMember;

#[async_trait::async_trait]
impl Resource for ThreadMember {
    fn type_name(&self) -> &'static str {
        "discord_thread_member"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("thread_id").require().force_new())
            .attribute(Attribute::snowflake("user_id").require().force_new())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::string("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let thread_id = require_str(state, "thread_id")?;
        let user_id = require_str(state, "user_id")?;
        ctx.rest()
            .do_json(
                Method::PUT,
                &format!("/channels/{}/thread-members/{}", thread_id, user_id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        state.set_id(CompositeId::pair(thread_id, user_id).to_string());
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let (thread_id, user_id) = CompositeId::split_pair("thread_id:user_id", &id)?;
        ctx.rest()
            .do_json(
                Method::GET,
                &format!("/channels/{}/thread-members/{}", thread_id, user_id),
                &[],
                None,
                None,
            )
            .await?;
        state.set_known("thread_id", json!(thread_id));
        state.set_known("user_id", json!(user_id));
        Ok(())
    }

    async fn update(
        &self,
        _ctx: &Context,
        _planned: &mut ResourceState,
        _prior: &ResourceState,
    ) -> ConcordResult<()> {
        Err(UnsupportedError::new("discord_thread_member", "update").into())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let (thread_id, user_id) = CompositeId::split_pair("thread_id:user_id", &id)?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/channels/{}/thread-members/{}", thread_id, user_id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (thread_id, user_id) = CompositeId::split_pair("thread_id:user_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("thread_id", json!(thread_id));
        state.set_known("user_id", json!(user_id));
        state.set_id(id);
        Ok(state)
    }
}
