//! The `discord_sticker` resource.

use crate::common::{audit_reason, require_str, response_id};
use concord_core::CompositeId;
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, project_fields,
};
use concord_transport::Method;
use serde_json::{Value, json};
use std::path::Path;

/// Custom guild stickers. Create uploads the sticker file as a multipart
/// request; the file is fixed after create.
pub struct Sticker;

#[async_trait::async_trait]
impl Resource for Sticker {
    fn type_name(&self) -> &'static str {
        "discord_sticker"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string("name").require())
            .attribute(Attribute::string("description"))
            .attribute(Attribute::string("tags").require())
            .attribute(
                Attribute::string("file_path")
                    .require()
                    .force_new()
                    .write_only_attr(),
            )
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let file_path = require_str(state, "file_path")?;
        let bytes = std::fs::read(&file_path).map_err(|e| {
            ValidationError::new("file_path", format!("cannot read {}: {}", file_path, e))
        })?;
        let file_name = Path::new(&file_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("sticker.png")
            .to_string();

        let payload = json!({
            "name": state.str_value("name"),
            "description": state.str_value("description").unwrap_or_default(),
            "tags": state.str_value("tags"),
        });
        let created = ctx
            .rest()
            .do_multipart(
                Method::POST,
                &format!("/guilds/{}/stickers", server_id),
                &[],
                &payload,
                "file",
                &file_name,
                bytes,
                audit_reason(state).as_deref(),
            )
            .await?
            .ok_or_else(|| concord_error::JsonError::new("sticker create returned no body"))?;
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
                &format!("/guilds/{}/stickers/{}", server_id, id),
                &[],
                None,
                None,
            )
            .await?;
        project_fields(
            state,
            &remote,
            &[("name", "name"), ("description", "description"), ("tags", "tags")],
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
            .field("description")
            .field("tags")
            .build();
        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/guilds/{}/stickers/{}", server_id, id),
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
                &format!("/guilds/{}/stickers/{}", server_id, id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (server_id, sticker_id) = CompositeId::split_pair("server_id:sticker_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("server_id", json!(server_id));
        state.set_id(sticker_id);
        Ok(state)
    }
}
