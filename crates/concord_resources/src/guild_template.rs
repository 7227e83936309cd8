//! Guild template resources: the template itself and the sync action.

use crate::common::{audit_reason, insert_known, require_str};
use concord_core::CompositeId;
use concord_error::{ConcordResult, JsonError, TransportError};
use concord_provider::{
    Attribute, Context, DestroyScope, PatchBuilder, Resource, ResourceState, Schema,
    project_fields,
};
use concord_transport::Method;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

/// Guild templates; the template code is the resource id.
pub struct GuildTemplate;

#[async_trait::async_trait]
impl Resource for GuildTemplate {
    fn type_name(&self) -> &'static str {
        "discord_guild_template"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string("name").require())
            .attribute(Attribute::string("description"))
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::string("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let mut body = Map::new();
        insert_known(&mut body, state, "name", "name");
        insert_known(&mut body, state, "description", "description");
        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/guilds/{}/templates", server_id),
                &[],
                Some(&Value::Object(body)),
                audit_reason(state).as_deref(),
            )
            .await?;
        let code = created["code"]
            .as_str()
            .ok_or_else(|| JsonError::new("template response had no code field"))?;
        state.set_id(code);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let code = require_str(state, "id")?;
        let templates = ctx
            .rest()
            .do_json_as::<Vec<Value>>(
                Method::GET,
                &format!("/guilds/{}/templates", server_id),
                &[],
                None,
                None,
            )
            .await?;
        let template = templates
            .iter()
            .find(|t| t["code"].as_str() == Some(code.as_str()))
            .ok_or_else(|| {
                TransportError::new(
                    "GET",
                    format!("/guilds/{}/templates", server_id),
                    404,
                    None,
                    format!("template {} not present in guild", code),
                )
            })?;
        project_fields(
            state,
            template,
            &[("name", "name"), ("description", "description")],
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
        let code = require_str(prior, "id")?;
        let patch = PatchBuilder::new(planned, prior)
            .field("name")
            .field("description")
            .build();
        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/guilds/{}/templates/{}", server_id, code),
                    &[],
                    Some(&Value::Object(body)),
                    audit_reason(planned).as_deref(),
                )
                .await?;
        }
        planned.set_id(code);
        Ok(())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let code = require_str(state, "id")?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/guilds/{}/templates/{}", server_id, code),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (server_id, code) = CompositeId::split_pair("server_id:code", id)?;
        let mut state = ResourceState::new();
        state.set_known("server_id", json!(server_id));
        state.set_id(code);
        Ok(state)
    }
}

/// Action-style resource: re-syncs a guild template to the guild's current
/// shape on every create and update. Destroy removes it from state only.
pub struct GuildTemplateSync;

async fn sync_template(ctx: &Context, server_id: &str, code: &str) -> ConcordResult<()> {
    debug!(server_id, code, "Syncing guild template");
    ctx.rest()
        .do_json(
            Method::PUT,
            &format!("/guilds/{}/templates/{}", server_id, code),
            &[],
            None,
            None,
        )
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl Resource for GuildTemplateSync {
    fn type_name(&self) -> &'static str {
        "discord_guild_template_sync"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string("template_code").require().force_new())
            .attribute(Attribute::string_list("triggers"))
            .attribute(Attribute::string("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let code = require_str(state, "template_code")?;
        sync_template(ctx, &server_id, &code).await?;
        state.set_id(CompositeId::pair(server_id, code).to_string());
        Ok(())
    }

    async fn read(&self, _ctx: &Context, _state: &mut ResourceState) -> ConcordResult<()> {
        // An action has no remote object to refresh.
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let server_id = require_str(prior, "server_id")?;
        let code = require_str(prior, "template_code")?;
        if planned.get("triggers").differs_from(&prior.get("triggers")) {
            sync_template(ctx, &server_id, &code).await?;
        }
        if let Some(id) = prior.id() {
            planned.set_id(id);
        }
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            id = %state.id().unwrap_or_default(),
            "Template sync is an action; nothing is reverted remotely"
        );
        Ok(())
    }
}
