//! The `discord_welcome_screen` resource.

use crate::common::{audit_reason, require_str};
use concord_core::normalize_json;
use concord_error::{ConcordResult, JsonError, ValidationError};
use concord_provider::{
    Attribute, Context, DestroyScope, Resource, ResourceState, Schema, project_fields,
};
use concord_transport::Method;
use serde_json::{Value, json};
use tracing::warn;

/// The guild welcome screen, adopted and patched in place. The welcome
/// channel list is a normalized JSON document.
pub struct WelcomeScreen;

fn welcome_channels_wire(state: &ResourceState) -> ConcordResult<Option<Value>> {
    match state.str_value("welcome_channels") {
        Some(raw) => {
            let parsed: Value = serde_json::from_str(&raw)
                .map_err(|e| ValidationError::new("welcome_channels", format!("invalid: {e}")))?;
            if !parsed.is_array() {
                return Err(
                    ValidationError::new("welcome_channels", "expected a JSON array").into(),
                );
            }
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

async fn patch_screen(
    ctx: &Context,
    server_id: &str,
    state: &ResourceState,
) -> ConcordResult<()> {
    let mut body = json!({});
    if let Some(enabled) = state.bool_value("enabled") {
        body["enabled"] = json!(enabled);
    }
    if let Some(description) = state.str_value("description") {
        body["description"] = json!(description);
    }
    if let Some(channels) = welcome_channels_wire(state)? {
        body["welcome_channels"] = channels;
    }
    ctx.rest()
        .do_json(
            Method::PATCH,
            &format!("/guilds/{}/welcome-screen", server_id),
            &[],
            Some(&body),
            audit_reason(state).as_deref(),
        )
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl Resource for WelcomeScreen {
    fn type_name(&self) -> &'static str {
        "discord_welcome_screen"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::bool("enabled"))
            .attribute(Attribute::string("description"))
            .attribute(Attribute::json("welcome_channels"))
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        patch_screen(ctx, &server_id, state).await?;
        state.set_id(server_id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/guilds/{}/welcome-screen", server_id),
                &[],
                None,
                None,
            )
            .await?;
        project_fields(state, &remote, &[("description", "description")]);
        // The GET shape has no `enabled` flag; presence implies enabled.
        if state.bool_value("enabled").is_none() {
            state.set_known("enabled", json!(true));
        }
        match remote.get("welcome_channels") {
            Some(channels) if channels.is_array() => {
                let document = serde_json::to_string(channels)
                    .map_err(|e| JsonError::new(e.to_string()))?;
                state.set_known("welcome_channels", json!(normalize_json(&document)?));
            }
            _ => state.set_null("welcome_channels"),
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let server_id = require_str(prior, "server_id")?;
        let changed = ["enabled", "description", "welcome_channels"]
            .iter()
            .any(|attr| planned.get(attr).differs_from(&prior.get(attr)));
        if changed {
            patch_screen(ctx, &server_id, planned).await?;
        }
        planned.set_id(server_id);
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            server_id = %state.str_value("server_id").unwrap_or_default(),
            "Removing welcome screen from state; the remote screen is untouched"
        );
        Ok(())
    }
}
