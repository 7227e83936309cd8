//! Config-time validation.
//!
//! Syntactic checks run before any network call: snowflake shape, RFC3339
//! timestamps, one-of membership, JSON well-formedness, integer ranges,
//! plus the schema-level mutually-exclusive and required-if rules.

use crate::{Diagnostic, Diagnostics, ResourceState, Schema, Validator};
use concord_core::{Snowflake, normalize_json};
use serde_json::Value;
use tracing::instrument;

/// Validate a configuration against a schema.
///
/// Returns one diagnostic per violation; an empty result means the config
/// may proceed to plan.
#[instrument(skip_all)]
pub fn validate_config(schema: &Schema, config: &ResourceState) -> Diagnostics {
    let mut diags = Diagnostics::new();

    for attribute in schema.attributes() {
        let name = attribute.name();
        let value = config.get(name);

        if *attribute.required() && value.is_null() {
            diags.push(
                Diagnostic::error("missing required attribute", format!("{} must be set", name))
                    .with_attribute(name),
            );
            continue;
        }
        let Some(known) = value.as_known() else {
            continue;
        };

        for validator in attribute.validators() {
            if let Some(message) = check(validator, known) {
                diags.push(
                    Diagnostic::error("invalid attribute value", message).with_attribute(name),
                );
            }
        }
    }

    for group in schema.exactly_one_of() {
        let set: Vec<&str> = group
            .iter()
            .filter(|name| config.get(name).is_known())
            .copied()
            .collect();
        if set.len() != 1 {
            diags.error(
                "mutually exclusive attributes",
                format!("exactly one of {} must be set, found {}", group.join(", "), set.len()),
            );
        }
    }

    for (attribute, trigger, trigger_value) in schema.required_when() {
        let triggered = config.get(trigger).as_known() == Some(trigger_value);
        if triggered && !config.get(attribute).is_known() {
            diags.push(
                Diagnostic::error(
                    "missing conditionally required attribute",
                    format!("{} is required when {} is {}", attribute, trigger, trigger_value),
                )
                .with_attribute(*attribute),
            );
        }
    }

    diags
}

fn check(validator: &Validator, value: &Value) -> Option<String> {
    match validator {
        Validator::Snowflake => match value {
            Value::String(s) if Snowflake::is_valid(s) => None,
            other => Some(format!("{} is not a Discord snowflake", other)),
        },
        Validator::Rfc3339 => match value {
            Value::String(s) => chrono::DateTime::parse_from_rfc3339(s)
                .err()
                .map(|e| format!("{:?} is not an RFC3339 timestamp: {}", s, e)),
            other => Some(format!("{} is not a string timestamp", other)),
        },
        Validator::OneOf(allowed) => match value {
            Value::String(s) if allowed.contains(&s.as_str()) => None,
            other => Some(format!("{} is not one of {}", other, allowed.join(", "))),
        },
        Validator::WellFormedJson => match value {
            Value::String(s) => normalize_json(s)
                .err()
                .map(|e| format!("not well-formed JSON: {}", e)),
            other => Some(format!("{} is not a JSON string", other)),
        },
        Validator::IntRange(low, high) => match value.as_i64() {
            Some(n) if n >= *low && n <= *high => None,
            _ => Some(format!("{} is not an integer in [{}, {}]", value, low, high)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attribute;
    use serde_json::json;

    fn state(pairs: &[(&str, Value)]) -> ResourceState {
        let mut state = ResourceState::new();
        for (name, value) in pairs {
            state.set_known(name, value.clone());
        }
        state
    }

    #[test]
    fn test_required_attribute_missing() {
        let schema = Schema::new().attribute(Attribute::string("name").require());
        let diags = validate_config(&schema, &ResourceState::new());
        assert!(diags.has_errors());
    }

    #[test]
    fn test_snowflake_validator() {
        let schema = Schema::new().attribute(Attribute::snowflake("server_id"));
        let ok = validate_config(&schema, &state(&[("server_id", json!("81384788765712384"))]));
        assert!(!ok.has_errors());
        let bad = validate_config(&schema, &state(&[("server_id", json!("abc"))]));
        assert!(bad.has_errors());
    }

    #[test]
    fn test_rfc3339_validator() {
        let schema = Schema::new()
            .attribute(Attribute::string("start_time").validator(Validator::Rfc3339));
        let ok = validate_config(
            &schema,
            &state(&[("start_time", json!("2026-03-01T18:00:00+00:00"))]),
        );
        assert!(!ok.has_errors());
        let bad = validate_config(&schema, &state(&[("start_time", json!("tomorrow"))]));
        assert!(bad.has_errors());
    }

    #[test]
    fn test_exactly_one_of() {
        let schema = Schema::new()
            .attribute(Attribute::snowflake("emoji_id"))
            .attribute(Attribute::string("emoji_name"))
            .exactly_one(vec!["emoji_id", "emoji_name"]);
        let both = validate_config(
            &schema,
            &state(&[
                ("emoji_id", json!("81384788765712384")),
                ("emoji_name", json!("wave")),
            ]),
        );
        assert!(both.has_errors());
        let neither = validate_config(&schema, &ResourceState::new());
        assert!(neither.has_errors());
        let one = validate_config(&schema, &state(&[("emoji_name", json!("wave"))]));
        assert!(!one.has_errors());
    }

    #[test]
    fn test_required_when() {
        let schema = Schema::new()
            .attribute(Attribute::bool("enabled"))
            .attribute(Attribute::snowflake("channel_id"))
            .require_when("channel_id", "enabled", json!(true));
        let bad = validate_config(&schema, &state(&[("enabled", json!(true))]));
        assert!(bad.has_errors());
        let ok = validate_config(&schema, &state(&[("enabled", json!(false))]));
        assert!(!ok.has_errors());
    }

    #[test]
    fn test_json_validator_runs_before_network() {
        let schema = Schema::new().attribute(Attribute::json("payload_json"));
        let bad = validate_config(&schema, &state(&[("payload_json", json!("{oops"))]));
        assert!(bad.has_errors());
    }

    #[test]
    fn test_one_of_validator() {
        let schema = Schema::new().attribute(
            Attribute::string("type").validator(Validator::OneOf(vec!["role", "user"])),
        );
        assert!(!validate_config(&schema, &state(&[("type", json!("role"))])).has_errors());
        assert!(validate_config(&schema, &state(&[("type", json!("cat"))])).has_errors());
    }
}
