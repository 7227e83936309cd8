//! The `discord_member_roles` resource.

use crate::common::{audit_reason, require_str};
use concord_core::CompositeId;
use concord_error::ConcordResult;
use concord_provider::{
    Attribute, Context, DestroyScope, Resource, ResourceState, Schema,
};
use concord_transport::Method;
use serde_json::{Value, json};
use tracing::warn;

/// An authoritative assignment of roles to one guild member, keyed by
/// `server_id:user_id`. Roles outside the managed list are left alone;
/// destroy removes the resource from state without stripping roles.
pub struct MemberRoles;

async fn member_role_ids(ctx: &Context, server_id: &str, user_id: &str) -> ConcordResult<Vec<String>> {
    let member = ctx
        .rest()
        .do_json_as::<Value>(
            Method::GET,
            &format!("/guilds/{}/members/{}", server_id, user_id),
            &[],
            None,
            None,
        )
        .await?;
    Ok(member["roles"]
        .as_array()
        .map(|roles| {
            roles
                .iter()
                .filter_map(|r| r.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default())
}

async fn assign_role(
    ctx: &Context,
    server_id: &str,
    user_id: &str,
    role_id: &str,
    present: bool,
    reason: Option<&str>,
) -> ConcordResult<()> {
    let method = if present { Method::PUT } else { Method::DELETE };
    ctx.rest()
        .do_json(
            method,
            &format!("/guilds/{}/members/{}/roles/{}", server_id, user_id, role_id),
            &[],
            None,
            reason,
        )
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl Resource for MemberRoles {
    fn type_name(&self) -> &'static str {
        "discord_member_roles"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::snowflake("user_id").require().force_new())
            .attribute(Attribute::string_list("roles").require())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::string("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let user_id = require_str(state, "user_id")?;
        let desired = state.string_list_value("roles").unwrap_or_default();
        let current = member_role_ids(ctx, &server_id, &user_id).await?;
        for role in desired.iter().filter(|r| !current.contains(r)) {
            assign_role(ctx, &server_id, &user_id, role, true, audit_reason(state).as_deref())
                .await?;
        }
        state.set_id(CompositeId::pair(server_id, user_id).to_string());
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let (server_id, user_id) = CompositeId::split_pair("server_id:user_id", &id)?;
        let current = member_role_ids(ctx, &server_id, &user_id).await?;
        // Only managed roles participate in the diff.
        let managed = state.string_list_value("roles").unwrap_or_default();
        let held: Vec<String> = managed.into_iter().filter(|r| current.contains(r)).collect();
        state.set_known("server_id", json!(server_id));
        state.set_known("user_id", json!(user_id));
        state.set_known("roles", json!(held));
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let id = require_str(prior, "id")?;
        let (server_id, user_id) = CompositeId::split_pair("server_id:user_id", &id)?;
        let reason = audit_reason(planned);
        let desired = planned.string_list_value("roles").unwrap_or_default();
        let previous = prior.string_list_value("roles").unwrap_or_default();

        for role in desired.iter().filter(|r| !previous.contains(r)) {
            assign_role(ctx, &server_id, &user_id, role, true, reason.as_deref()).await?;
        }
        for role in previous.iter().filter(|r| !desired.contains(r)) {
            assign_role(ctx, &server_id, &user_id, role, false, reason.as_deref()).await?;
        }
        planned.set_id(id);
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            id = %state.id().unwrap_or_default(),
            "Removing member role assignment from state; held roles are not stripped"
        );
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (server_id, user_id) = CompositeId::split_pair("server_id:user_id", id)?;
        let mut state = ResourceState::new();
        state.set_known("server_id", json!(server_id));
        state.set_known("user_id", json!(user_id));
        state.set_id(id);
        Ok(state)
    }
}
