//! The `discord_role_order` resource.

use crate::channel_order::{apply_order, refresh_order};
use crate::common::require_str;
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, DestroyScope, Resource, ResourceState, Schema,
};
use concord_transport::Method;
use serde_json::Value;
use tracing::warn;

/// Orders a set of guild roles by list index with one batch position
/// PATCH, the role counterpart of channel ordering.
pub struct RoleOrder;

#[async_trait::async_trait]
impl Resource for RoleOrder {
    fn type_name(&self) -> &'static str {
        "discord_role_order"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string_list("roles").require())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        apply_order(ctx, &server_id, state, "roles", "roles").await?;
        state.set_id(server_id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Vec<Value>>(
                Method::GET,
                &format!("/guilds/{}/roles", server_id),
                &[],
                None,
                None,
            )
            .await?;
        refresh_order(state, "roles", &remote);
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let server_id = require_str(prior, "server_id")?;
        if planned.get("roles").differs_from(&prior.get("roles")) {
            apply_order(ctx, &server_id, planned, "roles", "roles").await?;
        }
        planned.set_id(server_id);
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            server_id = %state.str_value("server_id").unwrap_or_default(),
            "Removing role ordering from state; positions are untouched"
        );
        Ok(())
    }
}
