//! The `discord_ban` resource.

use crate::common::{audit_reason, require_str};
use concord_core::CompositeId;
use concord_error::{ConcordResult, UnsupportedError};
use concord_provider::{Attribute, Context, Resource, ResourceState, Schema, Validator};
use concord_transport::Method;
use serde_json::{Map, Value, json};

/// Guild bans, keyed by `server_id:user_id`.
///
/// The API has no in-place edit for a ban; every attribute forces
/// recreate, and `delete_message_seconds` only takes effect at create.
pub struct Ban;

#[async_trait::async_trait]
impl Resource for Ban {
    fn type_name(&self) -> &'static str {
        "discord_ban"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::snowflake("user_id").require().force_new())
            .attribute(
                Attribute::int("delete_message_seconds")
                    .force_new()
                    .validator(Validator::IntRange(0, 604_800)),
            )
            .attribute(Attribute::string("ban_reason").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::string("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let user_id = require_str(state, "user_id")?;
        let mut body = Map::new();
        if let Some(seconds) = state.int_value("delete_message_seconds") {
            body.insert("delete_message_seconds".into(), json!(seconds));
        }
        ctx.rest()
            .do_json(
                Method::PUT,
                &format!("/guilds/{}/bans/{}", server_id, user_id),
                &[],
                Some(&Value::Object(body)),
                audit_reason(state).as_deref(),
            )
            .await?;
        state.set_id(CompositeId::pair(server_id, user_id).to_string());
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let (server_id, user_id) = CompositeId::split_pair("server_id:user_id", &id)?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/guilds/{}/bans/{}", server_id, user_id),
                &[],
                None,
                None,
            )
            .await?;
        state.set_known("server_id", json!(server_id));
        state.set_known("user_id", json!(user_id));
        match remote["reason"].as_str() {
            Some(reason) => state.set_known("ban_reason", json!(reason)),
            None => state.set_null("ban_reason"),
        }
        Ok(())
    }

    async fn update(
        &self,
        _ctx: &Context,
        _planned: &mut ResourceState,
        _prior: &ResourceState,
    ) -> ConcordResult<()> {
        Err(UnsupportedError::new("discord_ban", "update").into())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let (server_id, user_id) = CompositeId::split_pair("server_id:user_id", &id)?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/guilds/{}/bans/{}", server_id, user_id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (server_id, user_id) = CompositeId::split_pair("server_id:user_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("server_id", json!(server_id));
        state.set_known("user_id", json!(user_id));
        state.set_id(id);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_requires_pair() {
        let state = Ban.import("81384788765712384:53908232506183680").unwrap();
        assert_eq!(
            state.str_value("user_id").as_deref(),
            Some("53908232506183680")
        );
        assert!(Ban.import("81384788765712384").is_err());
        assert!(Ban.import("a:b:c").is_err());
    }

    #[test]
    fn test_every_config_attribute_forces_replace() {
        let schema = Ban.schema();
        for name in ["server_id", "user_id", "delete_message_seconds"] {
            assert!(schema.attribute_named(name).unwrap().requires_replace(), "{name}");
        }
    }
}
