//! The `discord_automod_rule` resource.

use crate::common::{audit_reason, payload_value, require_str, response_id, store_response};
use concord_core::CompositeId;
use concord_error::ConcordResult;
use concord_provider::{Attribute, Context, Resource, ResourceState, Schema};
use concord_transport::Method;
use serde_json::{Value, json};

/// Auto-moderation rules as a JSON passthrough with a natural snowflake
/// id and full CRUD, unlike the guild-singleton passthroughs.
pub struct AutomodRule;

#[async_trait::async_trait]
impl Resource for AutomodRule {
    fn type_name(&self) -> &'static str {
        "discord_automod_rule"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::json("payload_json").require())
            .attribute(Attribute::json("response_json").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let payload = payload_value(state)?;
        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/guilds/{}/auto-moderation/rules", server_id),
                &[],
                Some(&payload),
                audit_reason(state).as_deref(),
            )
            .await?;
        store_response(state, &created)?;
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
                &format!("/guilds/{}/auto-moderation/rules/{}", server_id, id),
                &[],
                None,
                None,
            )
            .await?;
        store_response(state, &remote)?;
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
        if planned
            .get("payload_json")
            .differs_from(&prior.get("payload_json"))
        {
            let payload = payload_value(planned)?;
            let response = ctx
                .rest()
                .do_json_as::<Value>(
                    Method::PATCH,
                    &format!("/guilds/{}/auto-moderation/rules/{}", server_id, id),
                    &[],
                    Some(&payload),
                    audit_reason(planned).as_deref(),
                )
                .await?;
            store_response(planned, &response)?;
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
                &format!("/guilds/{}/auto-moderation/rules/{}", server_id, id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (server_id, rule_id) = CompositeId::split_pair("server_id:rule_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("server_id", json!(server_id));
        state.set_id(rule_id);
        Ok(state)
    }
}
