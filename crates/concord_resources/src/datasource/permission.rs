//! The `discord_permission` data source.

use concord_core::{Permission, PermissionChoice, PermissionSet};
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{Attribute, Context, DataSource, ResourceState, Schema};
use serde_json::{Value, json};
use std::str::FromStr;

/// Folds named permission choices into allow and deny masks without any
/// network traffic. The `choices` document maps permission names (aliases
/// accepted) to `allow`, `deny` or `unset`; `allow_extends` and
/// `deny_extends` OR extra bits into the respective mask.
pub struct PermissionData;

fn parse_choices(raw: &str) -> ConcordResult<Vec<(Permission, PermissionChoice)>> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|e| ValidationError::new("choices", format!("invalid JSON: {e}")))?;
    let map = document
        .as_object()
        .ok_or_else(|| ValidationError::new("choices", "expected a JSON object"))?;
    let mut choices = Vec::with_capacity(map.len());
    for (name, verdict) in map {
        let permission = Permission::from_str(name)
            .map_err(|_| ValidationError::new("choices", format!("unknown permission {:?}", name)))?;
        let choice = match verdict.as_str() {
            Some("allow") => PermissionChoice::Allow,
            Some("deny") => PermissionChoice::Deny,
            Some("unset") => PermissionChoice::Unset,
            _ => {
                return Err(ValidationError::new(
                    "choices",
                    format!("{}: expected allow, deny or unset", name),
                )
                .into());
            }
        };
        choices.push((permission, choice));
    }
    Ok(choices)
}

fn extends(state: &ResourceState, attr: &str) -> ConcordResult<PermissionSet> {
    match state.str_value(attr) {
        Some(s) => Ok(PermissionSet::from_decimal(attr, &s)?),
        None => Ok(PermissionSet::EMPTY),
    }
}

#[async_trait::async_trait]
impl DataSource for PermissionData {
    fn type_name(&self) -> &'static str {
        "discord_permission"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::json("choices").require())
            .attribute(Attribute::string("allow_extends"))
            .attribute(Attribute::string("deny_extends"))
            .attribute(Attribute::int("allow_bits").compute())
            .attribute(Attribute::string("allow_bits64").compute())
            .attribute(Attribute::int("deny_bits").compute())
            .attribute(Attribute::string("deny_bits64").compute())
            .attribute(Attribute::string("id").compute())
    }

    async fn read(&self, _ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
        let raw = config
            .str_value("choices")
            .ok_or_else(|| ValidationError::new("choices", "must be a known document"))?;
        let choices = parse_choices(&raw)?;
        let extend_allow = extends(config, "allow_extends")?;
        let extend_deny = extends(config, "deny_extends")?;
        let (allow, deny) = PermissionSet::masks_from_choices(choices, extend_allow, extend_deny);

        config.set_known("allow_bits64", json!(allow.to_decimal()));
        config.set_known("allow_bits", json!(allow.narrow()));
        config.set_known("deny_bits64", json!(deny.to_decimal()));
        config.set_known("deny_bits", json!(deny.narrow()));
        config.set_id(format!("{}:{}", allow.to_decimal(), deny.to_decimal()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choices_fold_into_masks() {
        let choices =
            parse_choices(r#"{"send_messages":"allow","connect":"deny","speak":"unset"}"#).unwrap();
        let (allow, deny) =
            PermissionSet::masks_from_choices(choices, PermissionSet::EMPTY, PermissionSet::EMPTY);
        assert_eq!(allow.bits(), 1 << 11);
        assert_eq!(deny.bits(), 1 << 20);
    }

    #[test]
    fn test_aliases_accepted() {
        let choices = parse_choices(r#"{"manage_emojis":"allow"}"#).unwrap();
        assert_eq!(choices[0].0, Permission::ManageExpressions);
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert!(parse_choices(r#"{"fly":"allow"}"#).is_err());
        assert!(parse_choices(r#"{"connect":"maybe"}"#).is_err());
    }
}
