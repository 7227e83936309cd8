//! The `discord_stage_instance` resource.

use crate::common::{audit_reason, require_str, response_id};
use concord_error::{ConcordResult, ImportError};
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, project_fields,
};
use concord_transport::Method;
use serde_json::{Value, json};

/// Live stage instances. Addressed by the stage channel id on the wire;
/// the instance's own snowflake is recorded as the resource id.
pub struct StageInstance;

#[async_trait::async_trait]
impl Resource for StageInstance {
    fn type_name(&self) -> &'static str {
        "discord_stage_instance"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("channel_id").require().force_new())
            .attribute(Attribute::string("topic").require())
            .attribute(Attribute::bool("send_start_notification").force_new().write_only_attr())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
        let topic = require_str(state, "topic")?;
        let mut body = json!({ "channel_id": channel_id, "topic": topic });
        if let Some(notify) = state.bool_value("send_start_notification") {
            body["send_start_notification"] = json!(notify);
        }
        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                "/stage-instances",
                &[],
                Some(&body),
                audit_reason(state).as_deref(),
            )
            .await?;
        state.set_id(response_id(&created)?);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/stage-instances/{}", channel_id),
                &[],
                None,
                None,
            )
            .await?;
        project_fields(state, &remote, &[("topic", "topic")]);
        if let Some(instance_id) = remote["id"].as_str() {
            state.set_id(instance_id);
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let channel_id = require_str(prior, "channel_id")?;
        let patch = PatchBuilder::new(planned, prior).field("topic").build();
        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/stage-instances/{}", channel_id),
                    &[],
                    Some(&Value::Object(body)),
                    audit_reason(planned).as_deref(),
                )
                .await?;
        }
        if let Some(id) = prior.id() {
            planned.set_id(id);
        }
        Ok(())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/stage-instances/{}", channel_id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        if id.is_empty() {
            return Err(ImportError::new("a stage channel id", id).into());
        }
        let mut state = ResourceState::new();
        state.set_known("channel_id", json!(id));
        state.set_id(id);
        Ok(state)
    }
}
