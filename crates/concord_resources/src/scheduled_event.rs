//! The `discord_scheduled_event` resource.

use crate::common::{audit_reason, insert_known, require_str, response_id};
use concord_core::CompositeId;
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, Validator, project_fields,
};
use concord_transport::Method;
use serde_json::{Map, Value, json};

/// Guild scheduled events: stage, voice or external.
pub struct ScheduledEvent;

const ENTITY_TYPES: &[(&str, i64)] = &[("stage_instance", 1), ("voice", 2), ("external", 3)];

fn entity_code(name: &str) -> Option<i64> {
    ENTITY_TYPES.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

fn entity_label(code: i64) -> Option<&'static str> {
    ENTITY_TYPES.iter().find(|(_, c)| *c == code).map(|(n, _)| *n)
}

#[async_trait::async_trait]
impl Resource for ScheduledEvent {
    fn type_name(&self) -> &'static str {
        "discord_scheduled_event"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string("name").require())
            .attribute(Attribute::string("description"))
            .attribute(
                Attribute::string("entity_type")
                    .require()
                    .validator(Validator::OneOf(
                        ENTITY_TYPES.iter().map(|(n, _)| *n).collect(),
                    )),
            )
            .attribute(Attribute::snowflake("channel_id"))
            .attribute(Attribute::string("location"))
            .attribute(
                Attribute::string("start_time")
                    .require()
                    .validator(Validator::Rfc3339),
            )
            .attribute(Attribute::string("end_time").validator(Validator::Rfc3339))
            .attribute(Attribute::string("status").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
            .require_when("channel_id", "entity_type", json!("stage_instance"))
            .require_when("channel_id", "entity_type", json!("voice"))
            .require_when("location", "entity_type", json!("external"))
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let entity_type = require_str(state, "entity_type")?;
        let code = entity_code(&entity_type).ok_or_else(|| {
            ValidationError::new("entity_type", format!("unknown entity type {:?}", entity_type))
        })?;

        let mut body = Map::new();
        body.insert("entity_type".into(), json!(code));
        body.insert("privacy_level".into(), json!(2));
        insert_known(&mut body, state, "name", "name");
        insert_known(&mut body, state, "description", "description");
        insert_known(&mut body, state, "channel_id", "channel_id");
        insert_known(&mut body, state, "start_time", "scheduled_start_time");
        insert_known(&mut body, state, "end_time", "scheduled_end_time");
        if let Some(location) = state.str_value("location") {
            body.insert("entity_metadata".into(), json!({ "location": location }));
        }

        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/guilds/{}/scheduled-events", server_id),
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
                &format!("/guilds/{}/scheduled-events/{}", server_id, id),
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
                ("description", "description"),
                ("channel_id", "channel_id"),
                ("start_time", "scheduled_start_time"),
                ("end_time", "scheduled_end_time"),
            ],
        );
        if let Some(label) = remote["entity_type"].as_i64().and_then(entity_label) {
            state.set_known("entity_type", json!(label));
        }
        match remote["entity_metadata"]["location"].as_str() {
            Some(location) => state.set_known("location", json!(location)),
            None => state.set_null("location"),
        }
        match remote["status"].as_i64() {
            Some(1) => state.set_known("status", json!("scheduled")),
            Some(2) => state.set_known("status", json!("active")),
            Some(3) => state.set_known("status", json!("completed")),
            Some(4) => state.set_known("status", json!("canceled")),
            _ => state.set_null("status"),
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
        let id = require_str(prior, "id")?;

        let mut builder = PatchBuilder::new(planned, prior)
            .field("name")
            .field("description")
            .field("channel_id")
            .field_as("start_time", "scheduled_start_time")
            .field_as("end_time", "scheduled_end_time");
        if planned
            .get("entity_type")
            .differs_from(&prior.get("entity_type"))
        {
            let entity_type = require_str(planned, "entity_type")?;
            let code = entity_code(&entity_type).ok_or_else(|| {
                ValidationError::new("entity_type", format!("unknown entity type {:?}", entity_type))
            })?;
            builder = builder.computed("entity_type", json!(code), true);
        }
        if planned.get("location").differs_from(&prior.get("location")) {
            let metadata = match planned.str_value("location") {
                Some(location) => json!({ "location": location }),
                None => Value::Null,
            };
            builder = builder.computed("entity_metadata", metadata, true);
        }

        if let Some(body) = builder.build() {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/guilds/{}/scheduled-events/{}", server_id, id),
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
                &format!("/guilds/{}/scheduled-events/{}", server_id, id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (server_id, event_id) = CompositeId::split_pair("server_id:event_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("server_id", json!(server_id));
        state.set_id(event_id);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_codes() {
        assert_eq!(entity_code("external"), Some(3));
        assert_eq!(entity_label(1), Some("stage_instance"));
        assert_eq!(entity_code("concert"), None);
    }
}
