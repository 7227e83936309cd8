//! The `discord_message` resource.
//!
//! Message content is trimmed of a single trailing newline at plan time so
//! heredoc-authored content does not diff forever. Embeds are compared
//! shallowly: presence and title, since Discord rewrites embed internals
//! (color defaults, proxy URLs) on its side.

use crate::common::{audit_reason, insert_known, require_str, response_id};
use concord_core::CompositeId;
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, PatchBuilder, PlanModifier, Resource, ResourceState, Schema, project_fields,
};
use concord_transport::Method;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Messages posted by the provider's bot user into a channel.
pub struct Message;

/// Shallow embed comparison: presence and title only.
fn embed_changed(planned: &ResourceState, prior: &ResourceState) -> bool {
    let planned_embed = planned.str_value("embed");
    let prior_embed = prior.str_value("embed");
    match (&planned_embed, &prior_embed) {
        (None, None) => false,
        (Some(a), Some(b)) => embed_title(a) != embed_title(b),
        _ => true,
    }
}

fn embed_title(raw: &str) -> Option<String> {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v["title"].as_str().map(String::from))
}

fn embed_wire(state: &ResourceState) -> ConcordResult<Option<Value>> {
    match state.str_value("embed") {
        Some(raw) => {
            let parsed: Value = serde_json::from_str(&raw)
                .map_err(|e| concord_error::JsonError::new(format!("embed: {e}")))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

async fn set_pinned(
    ctx: &Context,
    channel_id: &str,
    message_id: &str,
    pinned: bool,
    reason: Option<&str>,
) -> ConcordResult<()> {
    let method = if pinned { Method::PUT } else { Method::DELETE };
    debug!(message_id, pinned, "Changing pin state");
    ctx.rest()
        .do_json(
            method,
            &format!("/channels/{}/pins/{}", channel_id, message_id),
            &[],
            None,
            reason,
        )
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl Resource for Message {
    fn type_name(&self) -> &'static str {
        "discord_message"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("channel_id").require().force_new())
            .attribute(Attribute::string("content").plan_modifier(PlanModifier::TrimTrailingCrlf))
            .attribute(Attribute::json("embed"))
            .attribute(Attribute::bool("tts").force_new())
            .attribute(Attribute::bool("pinned"))
            .attribute(Attribute::snowflake("author_id").compute())
            .attribute(Attribute::string("timestamp").compute())
            .attribute(Attribute::string("edited_timestamp").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
        let mut body = Map::new();
        insert_known(&mut body, state, "content", "content");
        insert_known(&mut body, state, "tts", "tts");
        if let Some(embed) = embed_wire(state)? {
            body.insert("embeds".into(), json!([embed]));
        }

        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/channels/{}/messages", channel_id),
                &[],
                Some(&Value::Object(body)),
                audit_reason(state).as_deref(),
            )
            .await?;
        let message_id = response_id(&created)?;
        state.set_id(CompositeId::pair(&channel_id, &message_id).to_string());

        if state.bool_value("pinned") == Some(true) {
            set_pinned(ctx, &channel_id, &message_id, true, audit_reason(state).as_deref())
                .await?;
        }
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let (channel_id, message_id) = CompositeId::split_pair("channel_id:message_id", &id)?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/channels/{}/messages/{}", channel_id, message_id),
                &[],
                None,
                None,
            )
            .await?;

        state.set_known("channel_id", json!(channel_id));
        project_fields(
            state,
            &remote,
            &[
                ("content", "content"),
                ("tts", "tts"),
                ("pinned", "pinned"),
                ("timestamp", "timestamp"),
                ("edited_timestamp", "edited_timestamp"),
            ],
        );
        if let Some(author) = remote["author"]["id"].as_str() {
            state.set_known("author_id", json!(author));
        }
        // Shallow embed tracking: keep the stored document unless the remote
        // embed vanished or changed title.
        let remote_embed = remote["embeds"].as_array().and_then(|e| e.first());
        match remote_embed {
            None => state.set_null("embed"),
            Some(embed) => {
                let remote_title = embed["title"].as_str().map(String::from);
                let stored_title = state.str_value("embed").as_deref().and_then(embed_title);
                if stored_title != remote_title || state.str_value("embed").is_none() {
                    state.set_known("embed", json!(embed.to_string()));
                }
            }
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
        let (channel_id, message_id) = CompositeId::split_pair("channel_id:message_id", &id)?;
        let reason = audit_reason(planned);

        let mut builder = PatchBuilder::new(planned, prior).field("content");
        if embed_changed(planned, prior) {
            let embeds = match embed_wire(planned)? {
                Some(embed) => json!([embed]),
                None => json!([]),
            };
            builder = builder.computed("embeds", embeds, true);
        }
        if let Some(body) = builder.build() {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/channels/{}/messages/{}", channel_id, message_id),
                    &[],
                    Some(&Value::Object(body)),
                    reason.as_deref(),
                )
                .await?;
        }

        if planned.get("pinned").differs_from(&prior.get("pinned")) {
            let pinned = planned.bool_value("pinned").unwrap_or(false);
            set_pinned(ctx, &channel_id, &message_id, pinned, reason.as_deref()).await?;
        }
        planned.set_id(id);
        Ok(())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let (channel_id, message_id) = CompositeId::split_pair("channel_id:message_id", &id)?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/channels/{}/messages/{}", channel_id, message_id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (channel_id, _message_id) = CompositeId::split_pair("channel_id:message_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("channel_id", json!(channel_id));
        state.set_id(id);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embed_shallow_diff_on_title() {
        let mut prior = ResourceState::new();
        prior.set_known("embed", json!(r#"{"title":"old","color":1}"#));
        let mut planned = ResourceState::new();
        planned.set_known("embed", json!(r#"{"title":"old","color":9}"#));
        assert!(!embed_changed(&planned, &prior));

        planned.set_known("embed", json!(r#"{"title":"new","color":1}"#));
        assert!(embed_changed(&planned, &prior));
    }

    #[test]
    fn test_embed_presence_counts() {
        let prior = ResourceState::new();
        let mut planned = ResourceState::new();
        planned.set_known("embed", json!(r#"{"title":"t"}"#));
        assert!(embed_changed(&planned, &prior));
        assert!(!embed_changed(&prior, &prior));
    }

    #[test]
    fn test_import_splits_composite() {
        let state = Message
            .import("81384788765712384:103735883630395392")
            .unwrap();
        assert_eq!(
            state.str_value("channel_id").as_deref(),
            Some("81384788765712384")
        );
        assert!(Message.import("only-one-part").is_err());
    }
}
