//! The `discord_channel_permissions` resource: the authoritative set of
//! overwrites on one channel.

use crate::common::{audit_reason, require_str};
use concord_core::{PermissionSet, normalize_json};
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{
    Attribute, Context, DestroyScope, Resource, ResourceState, Schema,
};
use concord_transport::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Owns every overwrite on a channel: entries absent from the document are
/// deleted remotely. Destroy is state-only since there is no meaningful
/// default overwrite set to restore.
pub struct ChannelPermissions;

/// One overwrite entry in the `overwrites` JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverwriteEntry {
    /// Role or user id.
    pub overwrite_id: String,
    /// `role` or `user`.
    #[serde(rename = "type")]
    pub overwrite_type: String,
    /// Allowed bits as a decimal string.
    #[serde(default)]
    pub allow_bits64: String,
    /// Denied bits as a decimal string.
    #[serde(default)]
    pub deny_bits64: String,
}

fn parse_entries(raw: &str) -> ConcordResult<Vec<OverwriteEntry>> {
    let entries: Vec<OverwriteEntry> = serde_json::from_str(raw)
        .map_err(|e| ValidationError::new("overwrites", format!("invalid document: {e}")))?;
    for entry in &entries {
        if entry.overwrite_type != "role" && entry.overwrite_type != "user" {
            return Err(ValidationError::new(
                "overwrites",
                format!("unknown overwrite type {:?}", entry.overwrite_type),
            )
            .into());
        }
    }
    Ok(entries)
}

async fn apply_entries(
    ctx: &Context,
    channel_id: &str,
    desired: &[OverwriteEntry],
    reason: Option<&str>,
) -> ConcordResult<()> {
    // Current remote overwrites, so extras can be pruned.
    let channel = ctx
        .rest()
        .do_json_as::<Value>(Method::GET, &format!("/channels/{}", channel_id), &[], None, None)
        .await?;
    let remote_ids: Vec<String> = channel["permission_overwrites"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|o| o["id"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    for entry in desired {
        let type_code = if entry.overwrite_type == "role" { 0 } else { 1 };
        let allow = if entry.allow_bits64.is_empty() {
            PermissionSet::EMPTY
        } else {
            PermissionSet::from_decimal("allow_bits64", &entry.allow_bits64)?
        };
        let deny = if entry.deny_bits64.is_empty() {
            PermissionSet::EMPTY
        } else {
            PermissionSet::from_decimal("deny_bits64", &entry.deny_bits64)?
        };
        ctx.rest()
            .do_json(
                Method::PUT,
                &format!("/channels/{}/permissions/{}", channel_id, entry.overwrite_id),
                &[],
                Some(&json!({
                    "type": type_code,
                    "allow": allow.to_decimal(),
                    "deny": deny.to_decimal(),
                })),
                reason,
            )
            .await?;
    }

    for stale in remote_ids
        .iter()
        .filter(|id| !desired.iter().any(|e| &e.overwrite_id == *id))
    {
        debug!(overwrite_id = %stale, "Pruning overwrite outside the managed set");
        ctx.rest()
            .do_json(
                Method::DELETE,
                &format!("/channels/{}/permissions/{}", channel_id, stale),
                &[],
                None,
                reason,
            )
            .await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl Resource for ChannelPermissions {
    fn type_name(&self) -> &'static str {
        "discord_channel_permissions"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("channel_id").require().force_new())
            .attribute(Attribute::json("overwrites").require())
            .attribute(Attribute::string("reason").write_only_attr())
            .attribute(Attribute::snowflake("id").compute())
    }

    fn destroy_scope(&self) -> DestroyScope {
        DestroyScope::StateOnly
    }

    async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
        let raw = require_str(state, "overwrites")?;
        let entries = parse_entries(&raw)?;
        apply_entries(ctx, &channel_id, &entries, audit_reason(state).as_deref()).await?;
        state.set_id(channel_id);
        Ok(())
    }

    async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
        let channel_id = require_str(state, "channel_id")?;
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
        let mut entries: Vec<OverwriteEntry> = channel["permission_overwrites"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|o| {
                        Some(OverwriteEntry {
                            overwrite_id: o["id"].as_str()?.to_string(),
                            overwrite_type: if o["type"].as_i64()? == 0 {
                                "role".into()
                            } else {
                                "user".into()
                            },
                            allow_bits64: o["allow"].as_str().unwrap_or("0").to_string(),
                            deny_bits64: o["deny"].as_str().unwrap_or("0").to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| a.overwrite_id.cmp(&b.overwrite_id));
        let document = serde_json::to_string(&entries)
            .map_err(|e| concord_error::JsonError::new(e.to_string()))?;
        state.set_known("overwrites", json!(normalize_json(&document)?));
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        planned: &mut ResourceState,
        prior: &ResourceState,
    ) -> ConcordResult<()> {
        let channel_id = require_str(prior, "channel_id")?;
        if planned
            .get("overwrites")
            .differs_from(&prior.get("overwrites"))
        {
            let raw = require_str(planned, "overwrites")?;
            let entries = parse_entries(&raw)?;
            apply_entries(ctx, &channel_id, &entries, audit_reason(planned).as_deref()).await?;
        }
        planned.set_id(channel_id);
        Ok(())
    }

    async fn delete(&self, _ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
        warn!(
            channel_id = %state.str_value("channel_id").unwrap_or_default(),
            "Removing overwrite set from state; remote overwrites are untouched"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_unknown_type() {
        let raw = r#"[{"overwrite_id":"1","type":"webhook"}]"#;
        assert!(parse_entries(raw).is_err());
    }

    #[test]
    fn test_parse_defaults_empty_masks() {
        let raw = r#"[{"overwrite_id":"53908232506183680","type":"role"}]"#;
        let entries = parse_entries(raw).unwrap();
        assert_eq!(entries[0].allow_bits64, "");
        assert_eq!(entries[0].deny_bits64, "");
    }
}
