//! The `discord_widget_settings` resource.

use crate::common::{audit_reason, require_str};
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, DestroyScope, PatchBuilder, Resource, ResourceState, Schema,
    project_fields,
};
use concord_transport::Method;
use serde_json::{Value, json};
use tracing::warn;

/// The guild widget toggle. A widget cannot be deleted, only disabled;
/// destroy removes it from state and leaves the remote setting alone.
pub struct WidgetSettings;

#[async_trait::async_trait]
impl Resource for WidgetSettings {
    fn type_name(&self) -> &'static str {
        "discord_widget_settings"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::bool("enabled").require())
            .attribute(Attribute::snowflake("channel_id"))
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
            .require_when("channel_id", "enabled", json!(true))
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let mut body = json!({ "enabled": state.bool_value("enabled").unwrap_or(false) });
        if let Some(channel) = state.str_value("channel_id") {
            body["channel_id"] = json!(channel);
        }
        ctx.rest()
            .do_json(
                Method::PATCH,
                &format!("/guilds/{}/widget", server_id),
                &[],
                Some(&body),
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
                &format!("/guilds/{}/widget", server_id),
                &[],
                None,
                None,
            )
            .await?;
        project_fields(
            state,
            &remote,
            &[("enabled", "enabled"), ("channel_id", "channel_id")],
        );
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
            .field("enabled")
            .field("channel_id")
            .build();
        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/guilds/{}/widget", server_id),
                    &[],
                    Some(&Value::Object(body)),
                    audit_reason(planned).as_deref(),
                )
                .await?;
        }
        planned.set_id(server_id);
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            server_id = %state.str_value("server_id").unwrap_or_default(),
            "Removing widget settings from state; the remote widget keeps its configuration"
        );
        Ok(())
    }
}
