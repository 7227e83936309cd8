//! The `discord_invite` resource.

use crate::common::{audit_reason, require_str};
use concord_error::{ConcordResult, UnsupportedError};
use concord_provider::{Attribute, Context, Resource, ResourceState, Schema, Validator};
use concord_transport::Method;
use serde_json::{Map, Value, json};

/// Channel invites. The invite code is the id; invites cannot be edited,
/// so every attribute forces recreate.
pub struct Invite;

#[async_trait::async_trait]
impl Resource for Invite {
    fn type_name(&self) -> &'static str {
        "discord_invite"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("channel_id").require().force_new())
            .attribute(
                Attribute::int("max_age")
                    .force_new()
                    .validator(Validator::IntRange(0, 604_800)),
            )
            .attribute(
                Attribute::int("max_uses")
                    .force_new()
                    .validator(Validator::IntRange(0, 100)),
            )
            .attribute(Attribute::bool("temporary").force_new())
            .attribute(Attribute::bool("unique").force_new())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::string("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
        let mut body = Map::new();
        for attr in ["max_age", "max_uses"] {
            if let Some(n) = state.int_value(attr) {
                body.insert(attr.into(), json!(n));
            }
        }
        for attr in ["temporary", "unique"] {
            if let Some(b) = state.bool_value(attr) {
                body.insert(attr.into(), json!(b));
            }
        }
        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/channels/{}/invites", channel_id),
                &[],
                Some(&Value::Object(body)),
                audit_reason(state).as_deref(),
            )
            .await?;
        let code = created["code"].as_str().ok_or_else(|| {
            concord_error::JsonError::new("invite response had no code field")
        })?;
        state.set_id(code);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let code = require_str(state, "id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/invites/{}", code),
                &[],
                None,
                None,
            )
            .await?;
        if let Some(channel) = remote["channel"]["id"].as_str() {
            state.set_known("channel_id", json!(channel));
        }
        Ok(())
    }

    async fn update(
        &self,
        _ctx: &Context,
        _planned: &mut ResourceState,
        _prior: &ResourceState,
    ) -> ConcordResult<()> {
        Err(UnsupportedError::new("discord_invite", "update").into())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let code = require_str(state, "id")?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/invites/{}", code),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }
}
