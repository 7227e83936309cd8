//! The `discord_role_everyone` resource.

use crate::common::{audit_reason, effective_permissions, require_str, store_permissions};
use concord_core::PermissionSet;
use concord_error::ConcordResult;
use concord_provider::{Attribute, Context, DestroyScope, Resource, ResourceState, Schema};
use concord_transport::Method;
use serde_json::{Value, json};
use tracing::warn;

/// The guild's built-in `@everyone` role. Its id equals the guild id and
/// it can never be created or deleted, only adopted and patched.
pub struct RoleEveryone;

#[async_trait::async_trait]
impl Resource for RoleEveryone {
    fn type_name(&self) -> &'static str {
        "discord_role_everyone"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require().force_new())
            .attribute(Attribute::int("permissions").compute())
            .attribute(Attribute::string("permissions_bits64").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        // Adoption: the role already exists, so create is a patch.
        let server_id = require_str(state, "server_id")?;
        let permissions = effective_permissions(state, "permissions", "permissions_bits64")?;
        ctx.rest()
            .do_json(
                Method::PATCH,
                &format!("/guilds/{}/roles/{}", server_id, server_id),
                &[],
                Some(&json!({ "permissions": permissions.to_decimal() })),
                audit_reason(state).as_deref(),
            )
            .await?;
        state.set_id(server_id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let server_id = require_str(state, "server_id")?;
        let role = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/guilds/{}/roles/{}", server_id, server_id),
                &[],
                None,
                None,
            )
            .await?;
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
        let planned_set = effective_permissions(planned, "permissions", "permissions_bits64")?;
        let prior_set = effective_permissions(prior, "permissions", "permissions_bits64")?;
        if planned_set != prior_set {
            ctx.rest()
                .do_json(
                    Method::PATCH,
                    &format!("/guilds/{}/roles/{}", server_id, server_id),
                    &[],
                    Some(&json!({ "permissions": planned_set.to_decimal() })),
                    audit_reason(planned).as_deref(),
                )
                .await?;
        }
        planned.set_id(server_id);
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            server_id = %state.str_value("server_id").unwrap_or_default(),
            "The everyone role cannot be deleted; leaving remote permissions as-is"
        );
        Ok(())
    }
}
