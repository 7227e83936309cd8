//! The `discord_webhook` resource.

use crate::common::{audit_reason, insert_known, require_str, response_id};
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, project_fields,
};
use concord_transport::Method;
use serde_json::{Map, Value, json};

/// Channel webhooks.
///
/// The webhook token is only returned by create and by token-bearing
/// reads; a read that omits it must not clobber the stored value.
pub struct Webhook;

#[async_trait::async_trait]
impl Resource for Webhook {
    fn type_name(&self) -> &'static str {
        "discord_webhook"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("channel_id").require())
            .attribute(Attribute::string("name").require())
            .attribute(Attribute::string("avatar_data_uri").write_only_attr())
            .attribute(Attribute::string("token").compute())
            .attribute(Attribute::string("url").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
        let mut body = Map::new();
        insert_known(&mut body, state, "name", "name");
        insert_known(&mut body, state, "avatar_data_uri", "avatar");

        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/channels/{}/webhooks", channel_id),
                &[],
                Some(&Value::Object(body)),
                audit_reason(state).as_deref(),
            )
            .await?;
        let id = response_id(&created)?;
        if let Some(token) = created["token"].as_str() {
            state.set_known("token", json!(token));
            state.set_known(
                "url",
                json!(format!("https://discord.com/api/webhooks/{}/{}", id, token)),
            );
        }
        state.set_id(id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(Method::GET, &format!("/webhooks/{}", id), &[], None, None)
            .await?;
        project_fields(state, &remote, &[("name", "name"), ("channel_id", "channel_id")]);
        // Token is omitted from most reads; only overwrite when present.
        if let Some(token) = remote["token"].as_str() {
            state.set_known("token", json!(token));
            state.set_known(
                "url",
                json!(format!("https://discord.com/api/webhooks/{}/{}", id, token)),
            );
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let id = require_str(prior, "id")?;
        let patch = PatchBuilder::new(planned, prior)
            .field("name")
            .field("channel_id")
            .field_as("avatar_data_uri", "avatar")
            .build();
        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/webhooks/{}", id),
                    &[],
                    Some(&Value::Object(body)),
                    audit_reason(planned).as_deref(),
                )
                .await?;
        }
        planned.set_id(id);
        Ok(())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/webhooks/{}", id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }
}
