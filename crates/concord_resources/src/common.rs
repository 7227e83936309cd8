//! Helpers shared across resource handlers.

use concord_core::PermissionSet;
use concord_error::{ConcordResult, ValidationError};
use concord_provider::ResourceState;
use serde_json::Value;

/// The audit reason from state, when set.
pub fn audit_reason(state: &ResourceState) -> Option<String> {
    state.str_value("reason")
}

/// A known string attribute, or a validation error naming it.
///
/// Validation runs before any operation, so a miss here indicates the host
/// sent an inconsistent plan.
#[track_caller]
pub fn require_str(state: &ResourceState, name: &str) -> ConcordResult<String> {
    state
        .str_value(name)
        .ok_or_else(|| ValidationError::new(name, "must be a known string").into())
}

/// The effective permission set from an int attribute OR-ed with its
/// bits64 string twin. The string form is authoritative; the int form is
/// the legacy convenience surface.
pub fn effective_permissions(
    state: &ResourceState,
    int_attr: &str,
    bits64_attr: &str,
) -> ConcordResult<PermissionSet> {
    let mut set = PermissionSet::EMPTY;
    if let Some(n) = state.int_value(int_attr) {
        if n >= 0 {
            set = set.union(PermissionSet::from_bits(n as u64));
        }
    }
    if let Some(s) = state.str_value(bits64_attr) {
        set = set.union(PermissionSet::from_decimal(bits64_attr, &s)?);
    }
    Ok(set)
}

/// Store both state surfaces of a permission set: the decimal bits64
/// string (authoritative) and the narrowed int (0 on overflow).
pub fn store_permissions(
    state: &mut ResourceState,
    int_attr: &str,
    bits64_attr: &str,
    set: PermissionSet,
) {
    state.set_known(bits64_attr, Value::String(set.to_decimal()));
    state.set_known(int_attr, Value::Number(set.narrow().into()));
}

/// The `id` field of a create response.
#[track_caller]
pub fn response_id(value: &Value) -> ConcordResult<String> {
    value
        .get("id")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| concord_error::JsonError::new("create response had no id field").into())
}

/// Parse the `payload_json` document of a passthrough resource.
#[track_caller]
pub fn payload_value(state: &ResourceState) -> ConcordResult<Value> {
    let raw = require_str(state, "payload_json")?;
    serde_json::from_str(&raw)
        .map_err(|e| ValidationError::new("payload_json", format!("invalid JSON: {}", e)).into())
}

/// Store a remote response as the normalized `response_json` document.
pub fn store_response(state: &mut ResourceState, response: &Value) -> ConcordResult<()> {
    let normalized = concord_core::normalize_value(response.clone());
    let document = serde_json::to_string(&normalized)
        .map_err(|e| concord_error::JsonError::new(e.to_string()))?;
    state.set_known("response_json", Value::String(document));
    Ok(())
}

/// Copy a known attribute into a wire body under `wire_name`.
///
/// Null and unknown attributes are omitted so the server applies its own
/// defaults.
pub fn insert_known(
    body: &mut serde_json::Map<String, Value>,
    state: &ResourceState,
    attr: &str,
    wire_name: &str,
) {
    if let Some(value) = state.get(attr).as_known() {
        body.insert(wire_name.to_string(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_permissions_ors_both_surfaces() {
        let mut state = ResourceState::new();
        state.set_known("allow", json!(1));
        state.set_known("allow_bits64", json!("2048"));
        let set = effective_permissions(&state, "allow", "allow_bits64").unwrap();
        assert_eq!(set.bits(), 2049);
    }

    #[test]
    fn test_store_permissions_overflow_reports_zero_int() {
        let mut state = ResourceState::new();
        let set = PermissionSet::from_bits(1 << 40);
        store_permissions(&mut state, "allow", "allow_bits64", set);
        assert_eq!(state.str_value("allow_bits64").as_deref(), Some("1099511627776"));
        assert_eq!(state.int_value("allow"), Some(0));
    }

    #[test]
    fn test_bits64_string_round_trips() {
        let mut state = ResourceState::new();
        state.set_known("deny_bits64", json!("18446744073709551615"));
        let set = effective_permissions(&state, "deny", "deny_bits64").unwrap();
        assert_eq!(set.to_decimal(), "18446744073709551615");
    }
}
