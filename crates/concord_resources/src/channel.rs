//! The `discord_channel` resource.

use crate::common::{audit_reason, insert_known, require_str, response_id};
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, Validator, project_fields,
};
use concord_transport::Method;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Guild channels: text, voice, category, news, forum and stage.
pub struct Channel;

const TYPES: &[(&str, i64)] = &[
    ("text", 0),
    ("voice", 2),
    ("category", 4),
    ("news", 5),
    ("stage", 13),
    ("forum", 15),
];

fn type_code(name: &str) -> Option<i64> {
    TYPES.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

fn type_label(code: i64) -> Option<&'static str> {
    TYPES.iter().find(|(_, c)| *c == code).map(|(n, _)| *n)
}

const READ_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("topic", "topic"),
    ("nsfw", "nsfw"),
    ("position", "position"),
    ("parent_id", "parent_id"),
    ("bitrate", "bitrate"),
    ("user_limit", "user_limit"),
    ("rate_limit_per_user", "rate_limit_per_user"),
];

#[async_trait::async_trait]
impl Resource for Channel {
    fn type_name(&self) -> &'static str {
        "discord_channel"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string("name").require())
            .attribute(
                Attribute::string("type")
                    .require()
                    .force_new()
                    .validator(Validator::OneOf(TYPES.iter().map(|(n, _)| *n).collect())),
            )
            .attribute(Attribute::string("topic"))
            .attribute(Attribute::bool("nsfw"))
            .attribute(Attribute::int("position").compute())
            .attribute(Attribute::snowflake("parent_id"))
            .attribute(Attribute::int("bitrate"))
            .attribute(Attribute::int("user_limit"))
            .attribute(Attribute::int("rate_limit_per_user").validator(Validator::IntRange(0, 21600)))
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let type_name = require_str(state, "type")?;
        let code = type_code(&type_name)
            .ok_or_else(|| ValidationError::new("type", format!("unknown channel type {:?}", type_name)))?;

        let mut body = Map::new();
        body.insert("type".into(), json!(code));
        insert_known(&mut body, state, "name", "name");
        insert_known(&mut body, state, "topic", "topic");
        insert_known(&mut body, state, "nsfw", "nsfw");
        insert_known(&mut body, state, "parent_id", "parent_id");
        insert_known(&mut body, state, "bitrate", "bitrate");
        insert_known(&mut body, state, "user_limit", "user_limit");
        insert_known(&mut body, state, "rate_limit_per_user", "rate_limit_per_user");

        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/guilds/{}/channels", server_id),
                &[],
                Some(&Value::Object(body)),
                audit_reason(state).as_deref(),
            )
            .await?;
        let id = response_id(&created)?;
        debug!(%id, "Created channel");
        state.set_id(id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(Method::GET, &format!("/channels/{}", id), &[], None, None)
            .await?;

        project_fields(state, &remote, READ_FIELDS);
        if let Some(guild_id) = remote["guild_id"].as_str() {
            state.set_known("server_id", json!(guild_id));
        }
        if let Some(label) = remote["type"].as_i64().and_then(type_label) {
            state.set_known("type", json!(label));
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
            .field("topic")
            .field("nsfw")
            .field("parent_id")
            .field("bitrate")
            .field("user_limit")
            .field("rate_limit_per_user")
            .build();

        let Some(body) = patch else {
            debug!("Channel unchanged, skipping PATCH");
            return Ok(());
        };
        ctx.rest()
            .do_json(
                Method::PATCH,
                &format!("/channels/{}", id),
                &[],
                Some(&Value::Object(body)),
                audit_reason(planned).as_deref(),
            )
            .await?;
        planned.set_id(id);
        Ok(())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/channels/{}", id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_round_trip() {
        for (name, code) in TYPES {
            assert_eq!(type_code(name), Some(*code));
            assert_eq!(type_label(*code), Some(*name));
        }
        assert_eq!(type_code("dm"), None);
    }

    #[test]
    fn test_schema_marks_server_id_force_new() {
        let schema = Channel.schema();
        let attr = schema.attribute_named("server_id").unwrap();
        assert!(attr.requires_replace());
        assert!(attr.required());
    }
}
