//! The `discord_system_channel` resource.

use crate::common::{audit_reason, require_str};
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, project_fields,
};
use concord_transport::Method;
use serde_json::{Value, json};

/// The guild's system message channel. Destroy resets the setting to none
/// rather than deleting anything.
pub struct SystemChannel;

#[async_trait::async_trait]
impl Resource for SystemChannel {
    fn type_name(&self) -> &'static str {
        "discord_system_channel"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::snowflake("system_channel_id").require())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let channel_id = require_str(state, "system_channel_id")?;
        ctx.rest()
            .do_json(
                Method::PATCH,
                &format!("/guilds/{}", server_id),
                &[],
                Some(&json!({ "system_channel_id": channel_id })),
                audit_reason(state).as_deref(),
            )
            .await?;
        state.set_id(server_id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/guilds/{}", server_id),
                &[],
                None,
                None,
            )
            .await?;
        project_fields(state, &remote, &[("system_channel_id", "system_channel_id")]);
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let server_id = require_str(prior, "server_id")?;
        let patch = PatchBuilder::new(planned, prior)
            .field("system_channel_id")
            .build();
        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/guilds/{}", server_id),
                    &[],
                    Some(&Value::Object(body)),
                    audit_reason(planned).as_deref(),
                )
                .await?;
        }
        planned.set_id(server_id);
        Ok(())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        // Reset rather than delete; the guild keeps no system channel.
        ctx.rest()
            .do_json(
                Method::PATCH,
                &format!("/guilds/{}", server_id),
                &[],
                Some(&json!({ "system_channel_id": Value::Null })),
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }
}
