//! The `discord_soundboard_sound` resource.

use crate::common::{audit_reason, insert_known, require_str, response_id};
use concord_core::{CompositeId, decode_data_uri};
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, project_fields,
};
use concord_transport::Method;
use serde_json::{Map, Value, json};

/// Guild soundboard sounds. The audio payload is a write-only data URI
/// fixed at create; the API never echoes it back.
pub struct SoundboardSound;

#[async_trait::async_trait]
impl Resource for SoundboardSound {
    fn type_name(&self) -> &'static str {
        "discord_soundboard_sound"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string("name").require())
            .attribute(
                Attribute::string("sound_data_uri")
                    .require()
                    .force_new()
                    .write_only_attr(),
            )
            .attribute(Attribute::float("volume"))
            .attribute(Attribute::snowflake("emoji_id"))
            .attribute(Attribute::string("emoji_name"))
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
            .exactly_one(vec!["emoji_id", "emoji_name"])
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let sound = require_str(state, "sound_data_uri")?;
        // Decode up front so a malformed URI fails before the request.
        decode_data_uri("sound_data_uri", &sound)?;

        let mut body = Map::new();
        body.insert("sound".into(), Value::String(sound));
        insert_known(&mut body, state, "name", "name");
        insert_known(&mut body, state, "volume", "volume");
        insert_known(&mut body, state, "emoji_id", "emoji_id");
        insert_known(&mut body, state, "emoji_name", "emoji_name");

        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/guilds/{}/soundboard-sounds", server_id),
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
                &format!("/guilds/{}/soundboard-sounds/{}", server_id, id),
                &[],
                None,
                None,
            )
            .await?;
        project_fields(
            state,
            &remote,
            &[
                ("name", "name"),
                ("volume", "volume"),
                ("emoji_id", "emoji_id"),
                ("emoji_name", "emoji_name"),
            ],
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
        let id = require_str(prior, "id")?;
        let patch = PatchBuilder::new(planned, prior)
            .field("name")
            .field("volume")
            .field("emoji_id")
            .field("emoji_name")
            .build();
        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/guilds/{}/soundboard-sounds/{}", server_id, id),
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
                &format!("/guilds/{}/soundboard-sounds/{}", server_id, id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (server_id, sound_id) = CompositeId::split_pair("server_id:sound_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("server_id", json!(server_id));
        state.set_id(sound_id);
        Ok(state)
    }
}
