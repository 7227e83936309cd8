//! The `discord_api_resource` escape hatch.

use crate::common::{audit_reason, require_str, store_response};
use concord_core::synthetic_id;
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{
    Attribute, Context, DestroyScope, Resource, ResourceState, Schema, Validator,
};
use concord_transport::Method;
use serde_json::Value;
use tracing::warn;

/// Issues one arbitrary API request and content-addresses the result: the
/// id is a hash of the path and the normalized response, so a changed
/// response shows up as a changed resource.
pub struct ApiResource;

fn parse_method(state: &ResourceState) -> ConcordResult<Method> {
    let name = require_str(state, "method")?;
    match name.as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        other => Err(ValidationError::new("method", format!("unknown method {:?}", other)).into()),
    }
}

fn parse_body(state: &ResourceState) -> ConcordResult<Option<Value>> {
    match state.str_value("payload_json") {
        Some(raw) => {
            let value: Value = serde_json::from_str(&raw)
                .map_err(|e| ValidationError::new("payload_json", format!("invalid JSON: {e}")))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

async fn execute(ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
    let method = parse_method(state)?;
    let path = require_str(state, "path")?;
    let body = parse_body(state)?;
    let response = ctx
        .rest()
        .do_json(method, &path, &[], body.as_ref(), audit_reason(state).as_deref())
        .await?
        .unwrap_or(Value::Null);
    store_response(state, &response)?;
    let document = response.to_string();
    state.set_id(synthetic_id(&path, &document)?);
    Ok(())
}

#[async_trait::async_trait]
impl Resource for ApiResource {
    fn type_name(&self) -> &'static str {
        "discord_api_resource"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(
                Attribute::string("method")
                    .require()
                    .validator(Validator::OneOf(vec![
                        "GET", "POST", "PUT", "PATCH", "DELETE",
                    ])),
            )
            .attribute(Attribute::string("path").require())
            .attribute(Attribute::json("payload_json"))
            .attribute(Attribute::json("response_json").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::string("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        execute(ctx, state).await
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        // Only safe methods are replayed on refresh; a write would not be
        // idempotent against an arbitrary endpoint.
        if parse_method(state)? == Method::GET {
            execute(ctx, state).await?;
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let changed = ["method", "path", "payload_json"]
            .iter()
            .any(|attr| planned.get(attr).differs_from(&prior.get(attr)));
        if changed {
            execute(ctx, planned).await?;
        } else if let Some(id) = prior.id() {
            planned.set_id(id);
        }
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            path = %state.str_value("path").unwrap_or_default(),
            "Removing API result from state; no compensating request is issued"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parsing() {
        let mut state = ResourceState::new();
        state.set_known("method", json!("PATCH"));
        assert_eq!(parse_method(&state).unwrap(), Method::PATCH);
        state.set_known("method", json!("HEAD"));
        assert!(parse_method(&state).is_err());
    }
}
