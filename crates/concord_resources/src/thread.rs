//! The `discord_thread` resource.

use crate::common::{audit_reason, insert_known, require_str, response_id};
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, Validator, project_fields,
};
use concord_transport::Method;
use serde_json::{Map, Value, json};

/// Channel threads, standalone or anchored to a message.
pub struct Thread;

const THREAD_TYPES: &[(&str, i64)] = &[("public", 11), ("private", 12)];

fn thread_code(name: &str) -> Option<i64> {
    THREAD_TYPES.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

#[async_trait::async_trait]
impl Resource for Thread {
    fn type_name(&self) -> &'static str {
        "discord_thread"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("channel_id").require().force_new())
            .attribute(Attribute::string("name").require())
            .attribute(
                Attribute::string("type")
                    .force_new()
                    .validator(Validator::OneOf(
                        THREAD_TYPES.iter().map(|(n, _)| *n).collect(),
                    )),
            )
            .attribute(Attribute::snowflake("message_id").force_new())
            .attribute(
                Attribute::int("auto_archive_duration").validator(Validator::IntRange(60, 10_080)),
            )
            .attribute(Attribute::bool("invitable"))
            .attribute(Attribute::bool("archived"))
            .attribute(Attribute::bool("locked"))
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
        let mut body = Map::new();
        insert_known(&mut body, state, "name", "name");
        insert_known(&mut body, state, "auto_archive_duration", "auto_archive_duration");

        // Message-anchored threads inherit their type from the parent.
        let path = match state.str_value("message_id") {
            Some(message_id) => format!("/channels/{}/messages/{}/threads", channel_id, message_id),
            None => {
                let type_name = state.str_value("type").unwrap_or_else(|| "public".into());
                let code = thread_code(&type_name).ok_or_else(|| {
                    ValidationError::new("type", format!("unknown thread type {:?}", type_name))
                })?;
                body.insert("type".into(), json!(code));
                insert_known(&mut body, state, "invitable", "invitable");
                format!("/channels/{}/threads", channel_id)
            }
        };

        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &path,
                &[],
                Some(&Value::Object(body)),
                audit_reason(state).as_deref(),
            )
            .await?;
        state.set_id(response_id(&created)?);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(Method::GET, &format!("/channels/{}", id), &[], None, None)
            .await?;
        project_fields(state, &remote, &[("name", "name")]);
        if let Some(parent) = remote["parent_id"].as_str() {
            state.set_known("channel_id", json!(parent));
        }
        let metadata = &remote["thread_metadata"];
        project_fields(
            state,
            metadata,
            &[
                ("archived", "archived"),
                ("locked", "locked"),
                ("invitable", "invitable"),
                ("auto_archive_duration", "auto_archive_duration"),
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
        let id = require_str(prior, "id")?;
        let patch = PatchBuilder::new(planned, prior)
            .field("name")
            .field("auto_archive_duration")
            .field("invitable")
            .field("archived")
            .field("locked")
            .build();
        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/channels/{}", id),
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
    fn test_thread_type_codes() {
        assert_eq!(thread_code("public"), Some(11));
        assert_eq!(thread_code("private"), Some(12));
        assert_eq!(thread_code("announcement"), None);
    }
}
