//! The `discord_channel_order` resource.

use crate::common::{audit_reason, require_str};
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, DestroyScope, Resource, ResourceState, Schema,
};
use concord_transport::Method;
use serde_json::{Value, json};
use tracing::warn;

/// Orders a set of guild channels by list index with one batch position
/// PATCH. Channels outside the list keep their positions; destroy is
/// state-only since the previous ordering is gone.
pub struct ChannelOrder;

#[async_trait::async_trait]
impl Resource for ChannelOrder {
    fn type_name(&self) -> &'static str {
        "discord_channel_order"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string_list("channels").require())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        apply_order(ctx, &server_id, state, "channels", "channels").await?;
        state.set_id(server_id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let remote = ctx
            .rest()
            .do_json_as::<Vec<Value>>(
                Method::GET,
                &format!("/guilds/{}/channels", server_id),
                &[],
                None,
                None,
            )
            .await?;
        refresh_order(state, "channels", &remote);
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let server_id = require_str(prior, "server_id")?;
        if planned.get("channels").differs_from(&prior.get("channels")) {
            apply_order(ctx, &server_id, planned, "channels", "channels").await?;
        }
        planned.set_id(server_id);
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            server_id = %state.str_value("server_id").unwrap_or_default(),
            "Removing channel ordering from state; positions are untouched"
        );
        Ok(())
    }
}

/// Batch-PATCH `/guilds/{id}/<endpoint>` assigning each listed id its index
/// as position.
pub(crate) async fn apply_order(
    ctx: &Context,
    server_id: &str,
    state: &ResourceState,
    attr: &str,
    endpoint: &str,
) -> ConcordResult<()> {
    let ids = state.string_list_value(attr).unwrap_or_default();
    let records: Vec<Value> = ids
        .iter()
        .enumerate()
        .map(|(index, id)| json!({ "id": id, "position": index }))
        .collect();
    if records.is_empty() {
        return Ok(());
    }
    ctx.rest()
        .do_json(
            Method::PATCH,
            &format!("/guilds/{}/{}", server_id, endpoint),
            &[],
            Some(&Value::Array(records)),
            audit_reason(state).as_deref(),
        )
        .await?;
    Ok(())
}

/// Rebuild the managed ordering from the remote list: managed ids sorted by
/// their remote position. Unmanaged ids never enter state.
pub(crate) fn refresh_order(state: &mut ResourceState, attr: &str, remote: &[Value]) {
    let managed = state.string_list_value(attr).unwrap_or_default();
    let mut positioned: Vec<(i64, String)> = remote
        .iter()
        .filter_map(|item| {
            let id = item["id"].as_str()?.to_string();
            if managed.contains(&id) {
                Some((item["position"].as_i64().unwrap_or(i64::MAX), id))
            } else {
                None
            }
        })
        .collect();
    positioned.sort();
    let ordered: Vec<String> = positioned.into_iter().map(|(_, id)| id).collect();
    state.set_known(attr, json!(ordered));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_order_sorts_managed_ids_by_position() {
        let mut state = ResourceState::new();
        state.set_known("channels", json!(["b", "a"]));
        let remote = vec![
            json!({"id": "a", "position": 0}),
            json!({"id": "b", "position": 5}),
            json!({"id": "c", "position": 2}),
        ];
        refresh_order(&mut state, "channels", &remote);
        assert_eq!(
            state.string_list_value("channels"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_refresh_order_drops_vanished_ids() {
        let mut state = ResourceState::new();
        state.set_known("channels", json!(["gone", "a"]));
        let remote = vec![json!({"id": "a", "position": 1})];
        refresh_order(&mut state, "channels", &remote);
        assert_eq!(state.string_list_value("channels"), Some(vec!["a".to_string()]));
    }
}
