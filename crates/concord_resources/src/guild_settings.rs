//! The `discord_guild_settings` resource.

use crate::common::{audit_reason, payload_value, require_str, store_response};
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, DestroyScope, Resource, ResourceState, Schema,
};
use concord_transport::Method;
use serde_json::Value;
use tracing::warn;

/// Guild-level settings as a JSON passthrough: the configured document is
/// PATCHed verbatim to the guild and the response stored normalized.
/// Fields outside the document are never touched, so two applies of the
/// same document are idempotent.
pub struct GuildSettings;

#[async_trait::async_trait]
impl Resource for GuildSettings {
    fn type_name(&self) -> &'static str {
        "discord_guild_settings"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::json("payload_json").require())
            .attribute(Attribute::json("response_json").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let payload = payload_value(state)?;
        let response = ctx
            .rest()
            .do_json_as::<Value>(
                Method::PATCH,
                &format!("/guilds/{}", server_id),
                &[],
                Some(&payload),
                audit_reason(state).as_deref(),
            )
            .await?;
        store_response(state, &response)?;
        state.set_id(server_id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let response = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/guilds/{}", server_id),
                &[],
                None,
                None,
            )
            .await?;
        store_response(state, &response)?;
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let server_id = require_str(prior, "server_id")?;
        if planned
            .get("payload_json")
            .differs_from(&prior.get("payload_json"))
        {
            let payload = payload_value(planned)?;
            let response = ctx
                .rest()
                .do_json_as::<Value>(
                    Method::PATCH,
                    &format!("/guilds/{}", server_id),
                    &[],
                    Some(&payload),
                    audit_reason(planned).as_deref(),
                )
                .await?;
            store_response(planned, &response)?;
        }
        planned.set_id(server_id);
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            server_id = %state.str_value("server_id").unwrap_or_default(),
            "Removing guild settings from state; the remote guild keeps its configuration"
        );
        Ok(())
    }
}
