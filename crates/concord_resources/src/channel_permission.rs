//! The `discord_channel_permission` resource.

use crate::common::{audit_reason, effective_permissions, require_str, store_permissions};
use concord_core::{CompositeId, PermissionSet};
use concord_error::{ConcordResult, TransportError, ValidationError};
use concord_provider::{Attribute, Context, Resource, ResourceState, Schema, Validator};
use concord_transport::Method;
use serde_json::{Value, json};

/// One permission overwrite on one channel, keyed by
/// `channel_id:overwrite_id:type`.
pub struct ChannelPermission;

const OVERWRITE_TYPES: &[(&str, i64)] = &[("role", 0), ("user", 1)];

fn overwrite_code(name: &str) -> Option<i64> {
    OVERWRITE_TYPES.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

async fn put_overwrite(
    ctx: &Context,
    channel_id: &str,
    overwrite_id: &str,
    type_code: i64,
    allow: PermissionSet,
    deny: PermissionSet,
    reason: Option<&str>,
) -> ConcordResult<()> {
    ctx.rest()
        .do_json(
            Method::PUT,
            &format!("/channels/{}/permissions/{}", channel_id, overwrite_id),
            &[],
            Some(&json!({
                "type": type_code,
                "allow": allow.to_decimal(),
                "deny": deny.to_decimal(),
            })),
            reason,
        )
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl Resource for ChannelPermission {
    fn type_name(&self) -> &'static str {
        "discord_channel_permission"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("channel_id").require().force_new())
            .attribute(Attribute::snowflake("overwrite_id").require().force_new())
            .attribute(
                Attribute::string("type")
                    .require()
                    .force_new()
                    .validator(Validator::OneOf(
                        OVERWRITE_TYPES.iter().map(|(n, _)| *n).collect(),
                    )),
            )
            .attribute(Attribute::int("allow"))
            .attribute(Attribute::string("allow_bits64").compute())
            .attribute(Attribute::int("deny"))
            .attribute(Attribute::string("deny_bits64").compute())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::string("id").compute())
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
        let overwrite_id = require_str(state, "overwrite_id")?;
        let type_name = require_str(state, "type")?;
        let code = overwrite_code(&type_name).ok_or_else(|| {
            ValidationError::new("type", format!("unknown overwrite type {:?}", type_name))
        })?;
        let allow = effective_permissions(state, "allow", "allow_bits64")?;
        let deny = effective_permissions(state, "deny", "deny_bits64")?;
        put_overwrite(
            ctx,
            &channel_id,
            &overwrite_id,
            code,
            allow,
            deny,
            audit_reason(state).as_deref(),
        )
        .await?;
        state.set_id(CompositeId::triple(channel_id, overwrite_id, type_name).to_string());
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let (channel_id, overwrite_id, type_name) =
            CompositeId::split_triple("channel_id:overwrite_id:type", &id)?;
        let channel = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/channels/{}", channel_id),
                &[],
                None,
                None,
            )
            .await?;
        let overwrite = channel["permission_overwrites"]
            .as_array()
            .and_then(|list| {
                list.iter()
                    .find(|o| o["id"].as_str() == Some(overwrite_id.as_str()))
            })
            .ok_or_else(|| {
                TransportError::new(
                    "GET",
                    format!("/channels/{}", channel_id),
                    404,
                    None,
                    format!("overwrite {} not present on channel", overwrite_id),
                )
            })?;

        state.set_known("channel_id", json!(channel_id));
        state.set_known("overwrite_id", json!(overwrite_id));
        state.set_known("type", json!(type_name));
        if let Some(allow) = overwrite["allow"].as_str() {
            let set = PermissionSet::from_decimal("allow_bits64", allow)?;
            store_permissions(state, "allow", "allow_bits64", set);
        }
        if let Some(deny) = overwrite["deny"].as_str() {
            let set = PermissionSet::from_decimal("deny_bits64", deny)?;
            store_permissions(state, "deny", "deny_bits64", set);
        }
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let id = require_str(prior, "id")?;
        let (channel_id, overwrite_id, type_name) =
            CompositeId::split_triple("channel_id:overwrite_id:type", &id)?;
        let code = overwrite_code(&type_name).ok_or_else(|| {
            ValidationError::new("type", format!("unknown overwrite type {:?}", type_name))
        })?;

        let allow = effective_permissions(planned, "allow", "allow_bits64")?;
        let deny = effective_permissions(planned, "deny", "deny_bits64")?;
        let prior_allow = effective_permissions(prior, "allow", "allow_bits64")?;
        let prior_deny = effective_permissions(prior, "deny", "deny_bits64")?;
        if allow != prior_allow || deny != prior_deny {
            put_overwrite(
                ctx,
                &channel_id,
                &overwrite_id,
                code,
                allow,
                deny,
                audit_reason(planned).as_deref(),
            )
            .await?;
        }
        planned.set_id(id);
        Ok(())
    }

    async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        let id = require_str(state, "id")?;
        let (channel_id, overwrite_id, _type_name) =
            CompositeId::split_triple("channel_id:overwrite_id:type", &id)?;
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/channels/{}/permissions/{}", channel_id, overwrite_id),
                &[],
                None,
                audit_reason(state).as_deref(),
            )
            .await?;
        Ok(())
    }

    fn import(&self, id: &str) -> ConcordResult<ResourceState> {
        let (channel_id, overwrite_id, type_name) =
            CompositeId::split_triple("channel_id:overwrite_id:type", id)?;
        if overwrite_code(&type_name).is_none() {
            return Err(ValidationError::new(
                "type",
                format!("unknown overwrite type {:?}", type_name),
            )
            .into());
        }
        let mut state = ResourceState::new();
        state.set_known("channel_id", json!(channel_id));
        state.set_known("overwrite_id", json!(overwrite_id));
        state.set_known("type", json!(type_name));
        state.set_id(id);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_requires_triple_with_known_type() {
        let id = "81384788765712384:53908232506183680:role";
        let state = ChannelPermission.import(id).unwrap();
        assert_eq!(state.str_value("type").as_deref(), Some("role"));
        assert!(ChannelPermission.import("a:b").is_err());
        assert!(
            ChannelPermission
                .import("81384788765712384:53908232506183680:webhook")
                .is_err()
        );
    }
}
