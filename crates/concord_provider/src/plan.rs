//! Plan-time normalization.
//!
//! Rewrites the planned values before the host diffs plan against state:
//! JSON attributes are canonicalized so key order never diffs, message
//! content loses one trailing CRLF, and write-only attributes fall back to
//! the prior state value so "not readable" does not manifest as a
//! perpetual diff.

use crate::{Diagnostic, Diagnostics, PlanModifier, ResourceState, Schema};
use concord_core::{AttrValue, normalize_json};
use serde_json::Value;
use tracing::{debug, instrument};

/// Apply every attribute's plan modifiers to the planned state.
///
/// `prior` is the last-written state, absent on first create.
#[instrument(skip_all)]
pub fn plan_modify(
    schema: &Schema,
    prior: Option<&ResourceState>,
    planned: &mut ResourceState,
) -> Diagnostics {
    let mut diags = Diagnostics::new();

    for attribute in schema.attributes() {
        let name = attribute.name();
        for modifier in attribute.plan_modifiers() {
            match modifier {
                PlanModifier::NormalizeJson => {
                    if let AttrValue::Known(Value::String(raw)) = planned.get(name) {
                        match normalize_json(&raw) {
                            Ok(canonical) => {
                                if canonical != raw {
                                    debug!(attribute = name, "Normalized JSON attribute");
                                    planned.set_known(name, Value::String(canonical));
                                }
                            }
                            Err(e) => diags.push(
                                Diagnostic::error("malformed JSON attribute", e.to_string())
                                    .with_attribute(name),
                            ),
                        }
                    }
                }
                PlanModifier::TrimTrailingCrlf => {
                    if let AttrValue::Known(Value::String(raw)) = planned.get(name) {
                        let trimmed = raw
                            .strip_suffix("\r\n")
                            .or_else(|| raw.strip_suffix('\n'))
                            .unwrap_or(&raw);
                        if trimmed != raw {
                            planned.set_known(name, Value::String(trimmed.to_string()));
                        }
                    }
                }
                PlanModifier::PriorStateWins => {
                    let planned_value = planned.get(name);
                    if planned_value.is_known() {
                        continue;
                    }
                    if let Some(prior_state) = prior {
                        let prior_value = prior_state.get(name);
                        if prior_value.is_known() {
                            debug!(attribute = name, "Write-only attribute keeps prior value");
                            planned.set(name, prior_value);
                        }
                    }
                }
            }
        }
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attribute;
    use serde_json::json;

    #[test]
    fn test_json_attribute_is_canonicalized() {
        let schema = Schema::new().attribute(Attribute::json("payload_json"));
        let mut planned = ResourceState::new();
        planned.set_known("payload_json", json!("{\"b\":1,\"a\":2}"));

        let diags = plan_modify(&schema, None, &mut planned);
        assert!(!diags.has_errors());
        assert_eq!(
            planned.str_value("payload_json").as_deref(),
            Some(r#"{"a":2,"b":1}"#)
        );
    }

    #[test]
    fn test_reordered_keys_plan_to_same_value() {
        let schema = Schema::new().attribute(Attribute::json("payload_json"));
        let mut a = ResourceState::new();
        a.set_known("payload_json", json!("{\"b\":1,\"a\":2}"));
        let mut b = ResourceState::new();
        b.set_known("payload_json", json!("{\"a\":2,\"b\":1}"));
        plan_modify(&schema, None, &mut a);
        plan_modify(&schema, None, &mut b);
        assert_eq!(a.str_value("payload_json"), b.str_value("payload_json"));
    }

    #[test]
    fn test_trailing_crlf_trimmed_once() {
        let schema = Schema::new()
            .attribute(Attribute::string("content").plan_modifier(PlanModifier::TrimTrailingCrlf));
        let mut planned = ResourceState::new();
        planned.set_known("content", json!("hello world\r\n"));
        plan_modify(&schema, None, &mut planned);
        assert_eq!(planned.str_value("content").as_deref(), Some("hello world"));

        let mut double = ResourceState::new();
        double.set_known("content", json!("hello\r\n\r\n"));
        plan_modify(&schema, None, &mut double);
        assert_eq!(double.str_value("content").as_deref(), Some("hello\r\n"));
    }

    #[test]
    fn test_write_only_keeps_prior_value() {
        let schema = Schema::new().attribute(Attribute::string("reason").write_only_attr());
        let mut prior = ResourceState::new();
        prior.set_known("reason", json!("managed by concord"));
        let mut planned = ResourceState::new();

        plan_modify(&schema, Some(&prior), &mut planned);
        assert_eq!(
            planned.str_value("reason").as_deref(),
            Some("managed by concord")
        );
    }

    #[test]
    fn test_write_only_operator_change_wins() {
        let schema = Schema::new().attribute(Attribute::string("reason").write_only_attr());
        let mut prior = ResourceState::new();
        prior.set_known("reason", json!("old"));
        let mut planned = ResourceState::new();
        planned.set_known("reason", json!("new"));

        plan_modify(&schema, Some(&prior), &mut planned);
        assert_eq!(planned.str_value("reason").as_deref(), Some("new"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let schema = Schema::new().attribute(Attribute::json("payload_json"));
        let mut planned = ResourceState::new();
        planned.set_known("payload_json", json!("{nope"));
        let diags = plan_modify(&schema, None, &mut planned);
        assert!(diags.has_errors());
    }
}
