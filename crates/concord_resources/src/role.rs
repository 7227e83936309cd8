//! The `discord_role` resource.
//!
//! Role position changes are ordering-significant: moving a role to an
//! occupied position swaps the two roles atomically with a single PATCH
//! carrying both position records.

use crate::common::{
    audit_reason, effective_permissions, insert_known, require_str, response_id, store_permissions,
};
use concord_core::{CompositeId, PermissionSet};
use concord_error::{ConcordResult, TransportError, ValidationError};
use concord_provider::{
    Attribute, Context, PatchBuilder, Resource, ResourceState, Schema, project_fields,
};
use concord_transport::Method;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Guild roles, including the 64-bit permission surface and the position
/// swap protocol.
pub struct Role;

/// Fetch the guild's role list.
async fn fetch_roles(ctx: &Context, server_id: &str) -> ConcordResult<Vec<Value>> {
    ctx.rest()
        .do_json_as::<Vec<Value>>(
            Method::GET,
            &format!("/guilds/{}/roles", server_id),
            &[],
            None,
            None,
        )
        .await
}

/// Swap `role_id` into `target` position, exchanging places with the
/// current occupant. Positions outside `[0, count-1]` are rejected.
pub(crate) async fn swap_role_position(
    ctx: &Context,
    server_id: &str,
    role_id: &str,
    target: i64,
    reason: Option<&str>,
) -> ConcordResult<()> {
    let roles = fetch_roles(ctx, server_id).await?;
    let count = roles.len() as i64;
    if target < 0 || target >= count {
        return Err(ValidationError::new(
            "position",
            format!("position {} is outside [0, {}]", target, count - 1),
        )
        .into());
    }

    let current = roles
        .iter()
        .find(|r| r["id"].as_str() == Some(role_id))
        .ok_or_else(|| {
            TransportError::new(
                "GET",
                format!("/guilds/{}/roles", server_id),
                404,
                None,
                format!("role {} not present in guild", role_id),
            )
        })?;
    let current_position = current["position"].as_i64().unwrap_or(0);
    if current_position == target {
        return Ok(());
    }

    let occupant = roles
        .iter()
        .find(|r| r["position"].as_i64() == Some(target) && r["id"].as_str() != Some(role_id));

    let mut records = vec![json!({ "id": role_id, "position": target })];
    if let Some(occupant) = occupant {
        records.push(json!({ "id": occupant["id"], "position": current_position }));
    }
    debug!(role_id, target, "Swapping role positions");
    ctx.rest()
        .do_json(
            Method::PATCH,
            &format!("/guilds/{}/roles", server_id),
            &[],
            Some(&Value::Array(records)),
            reason,
        )
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl Resource for Role {
    fn type_name(&self) -> &'static str {
        "discord_role"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::string("name").require())
            .attribute(Attribute::int("color"))
            .attribute(Attribute::bool("hoist"))
            .attribute(Attribute::bool("mentionable"))
            .attribute(Attribute::int("position").compute())
            .attribute(Attribute::int("permissions").compute())
            .attribute(Attribute::string("permissions_bits64").compute())
            .attribute(Attribute::bool("managed").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let permissions = effective_permissions(state, "permissions", "permissions_bits64")?;

        let mut body = Map::new();
        insert_known(&mut body, state, "name", "name");
        insert_known(&mut body, state, "color", "color");
        insert_known(&mut body, state, "hoist", "hoist");
        insert_known(&mut body, state, "mentionable", "mentionable");
        body.insert("permissions".into(), json!(permissions.to_decimal()));

        let created = ctx
            .rest()
            .do_json_as::<Value>(
                Method::POST,
                &format!("/guilds/{}/roles", server_id),
                &[],
                Some(&Value::Object(body)),
                audit_reason(state).as_deref(),
            )
            .await?;
        let id = response_id(&created)?;
        state.set_id(&id);

        if let Some(position) = state.int_value("position") {
            swap_role_position(ctx, &server_id, &id, position, audit_reason(state).as_deref())
                .await?;
        }
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let id = require_str(state, "id")?;
        let roles = fetch_roles(ctx, &server_id).await?;
        let role = roles
            .iter()
            .find(|r| r["id"].as_str() == Some(id.as_str()))
            .ok_or_else(|| {
                // The list endpoint cannot 404 a single role; synthesize
                // the tombstone signal.
                TransportError::new(
                    "GET",
                    format!("/guilds/{}/roles", server_id),
                    404,
                    None,
                    format!("role {} not present in guild", id),
                )
            })?;

        project_fields(
            state,
            role,
            &[
                ("name", "name"),
                ("color", "color"),
                ("hoist", "hoist"),
                ("mentionable", "mentionable"),
                ("position", "position"),
                ("managed", "managed"),
            ],
        );
        if let Some(permissions) = role["permissions"].as_str() {
            let set = PermissionSet::from_decimal("permissions_bits64", permissions)?;
            store_permissions(state, "permissions", "permissions_bits64", set);
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
        let reason = audit_reason(planned);

        let planned_permissions =
            effective_permissions(planned, "permissions", "permissions_bits64")?;
        let prior_permissions = effective_permissions(prior, "permissions", "permissions_bits64")?;

        let patch = PatchBuilder::new(planned, prior)
            .field("name")
            .field("color")
            .field("hoist")
            .field("mentionable")
            .computed(
                "permissions",
                json!(planned_permissions.to_decimal()),
                planned_permissions != prior_permissions,
            )
            .build();

        if let Some(body) = patch {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/guilds/{}/roles/{}", server_id, id),
                    &[],
                    Some(&Value::Object(body)),
                    reason.as_deref(),
                )
                .await?;
        }

        let position_changed = planned
            .get("position")
            .differs_from(&prior.get("position"));
        if position_changed {
            if let Some(position) = planned.int_value("position") {
                swap_role_position(ctx, &server_id, &id, position, reason.as_deref()).await?;
            }
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
                &format!("/guilds/{}/roles/{}", server_id, id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (server_id, role_id) = CompositeId::split_pair("server_id:role_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("server_id", json!(server_id));
        state.set_id(role_id);
        Ok(state)
    }
}
