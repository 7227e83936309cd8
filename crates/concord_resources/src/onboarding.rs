//! The `discord_onboarding` resource.

use crate::common::{audit_reason, payload_value, require_str, store_response};
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, DestroyScope, Resource, ResourceState, Schema,
};
use concord_transport::Method;
use serde_json::Value;
use tracing::warn;

/// Guild onboarding as a JSON passthrough. The document is PUT verbatim;
/// onboarding always exists, so destroy is state-only.
pub struct Onboarding;

async fn put_onboarding(
    ctx: &Context,
    server_id: &str,
    state: &ResourceState,
) -> ConcordResult<Value> {
    let payload = payload_value(state)?;
    ctx.rest()
        .do_json_as::<Value>(
            Method::PUT,
            &format!("/guilds/{}/onboarding", server_id),
            &[],
            Some(&payload),
            audit_reason(state).as_deref(),
        )
        .await
}

#[async_trait::async_trait]
impl Resource for Onboarding {
    fn type_name(&self) -> &'static str {
        "discord_onboarding"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::json("payload_json").require())
            .attribute(Attribute::json("response_json").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let response = put_onboarding(ctx, &server_id, state).await?;
        store_response(state, &response)?;
        state.set_id(server_id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let response = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/guilds/{}/onboarding", server_id),
                &[],
                None,
                None,
            )
            .await?;
        store_response(state, &response)?;
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let server_id = require_str(prior, "server_id")?;
        if planned
            .get("payload_json")
            .differs_from(&prior.get("payload_json"))
        {
            let response = put_onboarding(ctx, &server_id, planned).await?;
            store_response(planned, &response)?;
        }
        planned.set_id(server_id);
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            server_id = %state.str_value("server_id").unwrap_or_default(),
            "Removing onboarding from state; the remote flow keeps its configuration"
        );
        Ok(())
    }
}
