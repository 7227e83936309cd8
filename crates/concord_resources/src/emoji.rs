//! The `discord_emoji` resource.

use crate::common::{audit_reason, insert_known, require_str, response_id};
use concord_core::CompositeId;
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, project_fields,
};
use concord_transport::Method;
use serde_json::{Map, Value, json};

/// Custom guild emoji. The image is a write-only data URI fixed at
/// create; only name and role gating can change afterwards.
pub struct Emoji;

#[async_trait::async_trait]
impl Resource for Emoji {
    fn type_name(&self) -> &'static str {
        "discord_emoji"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string("name").require())
            .attribute(
                Attribute::string("image_data_uri")
                    .require()
                    .force_new()
                    .write_only_attr(),
            )
            .attribute(Attribute::string_list("roles"))
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let mut body = Map::new();
        insert_known(&mut body, state, "name", "name");
        insert_known(&mut body, state, "image_data_uri", "image");
        insert_known(&mut body, state, "roles", "roles");

        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/guilds/{}/emojis", server_id),
                &[],
                Some(&Value::Object(body)),
                audit_reason(state).as_deref(),
            )
            .await?;
        state.set_id(response_id(&created)?);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let id = require_str(state, "id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/guilds/{}/emojis/{}", server_id, id),
                &[],
                None,
                None,
            )
            .await?;
        project_fields(state, &remote, &[("name", "name"), ("roles", "roles")]);
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let server_id = require_str(prior, "server_id")?;
        let id = require_str(prior, "id")?;
        let patch = PatchBuilder::new(planned, prior).field("name").field("roles").build();
        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/guilds/{}/emojis/{}", server_id, id),
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
        let server_id = require_str(state, "server_id")?;
        let id = require_str(state, "id")?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/guilds/{}/emojis/{}", server_id, id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (server_id, emoji_id) = CompositeId::split_pair("server_id:emoji_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("server_id", json!(server_id));
        state.set_id(emoji_id);
        Ok(state)
    }
}
