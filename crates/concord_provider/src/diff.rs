//! Three-valued diffing and state projection.

use crate::ResourceState;
use serde_json::{Map, Value};

/// Builds the minimal PATCH body for an update by comparing plan against
/// prior state per attribute.
///
/// Three-valued equality: unknown never counts as a change; null vs
/// non-null counts; known values count when unequal. An empty patch means
/// no request should be sent.
///
/// # Examples
///
/// ```
/// use concord_provider::{PatchBuilder, ResourceState};
/// use serde_json::json;
///
/// let mut prior = ResourceState::new();
/// prior.set_known("topic", json!("old"));
/// prior.set_known("name", json!("general"));
/// let mut planned = prior.clone();
/// planned.set_known("topic", json!("new"));
///
/// let patch = PatchBuilder::new(&planned, &prior).field("topic").field("name").build();
/// assert_eq!(patch, Some(serde_json::json!({"topic": "new"}).as_object().unwrap().clone()));
/// ```
pub struct PatchBuilder<'a> {
    planned: &'a ResourceState,
    prior: &'a ResourceState,
    body: Map<String, Value>,
}

impl<'a> PatchBuilder<'a> {
    /// Start a patch comparing `planned` against `prior`.
    pub fn new(planned: &'a ResourceState, prior: &'a ResourceState) -> Self {
        Self {
            planned,
            prior,
            body: Map::new(),
        }
    }

    /// Include `attr` under the same wire name when it changed.
    pub fn field(self, attr: &str) -> Self {
        self.field_as(attr, attr)
    }

    /// Include `attr` under `wire_name` when it changed. Null plans send
    /// JSON null so the server clears the field.
    pub fn field_as(mut self, attr: &str, wire_name: &str) -> Self {
        let planned = self.planned.get(attr);
        let prior = self.prior.get(attr);
        if planned.differs_from(&prior) {
            self.body.insert(wire_name.to_string(), planned.to_wire());
        }
        self
    }

    /// Include a precomputed value when `changed` is set. Used where the
    /// wire value is derived from several attributes (permission masks).
    pub fn computed(mut self, wire_name: &str, value: Value, changed: bool) -> Self {
        if changed {
            self.body.insert(wire_name.to_string(), value);
        }
        self
    }

    /// True when any field changed so far.
    pub fn is_dirty(&self) -> bool {
        !self.body.is_empty()
    }

    /// The patch body, or `None` when nothing changed.
    pub fn build(self) -> Option<Map<String, Value>> {
        if self.body.is_empty() {
            None
        } else {
            Some(self.body)
        }
    }
}

/// Project remote response fields into state.
///
/// Each `(attr, remote_field)` pair copies `remote[remote_field]` into the
/// named state attribute; a missing or null remote field stores explicit
/// null. Write-only attributes are preserved by the runtime, not here.
pub fn project_fields(state: &mut ResourceState, remote: &Value, fields: &[(&str, &str)]) {
    for (attr, remote_field) in fields {
        match remote.get(remote_field) {
            Some(Value::Null) | None => state.set_null(attr),
            Some(value) => state.set_known(attr, value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unchanged_plan_builds_empty_patch() {
        let mut prior = ResourceState::new();
        prior.set_known("name", json!("general"));
        let planned = prior.clone();
        let patch = PatchBuilder::new(&planned, &prior).field("name").build();
        assert!(patch.is_none());
    }

    #[test]
    fn test_unknown_never_counts_as_change() {
        let mut prior = ResourceState::new();
        prior.set_known("position", json!(3));
        let mut planned = ResourceState::new();
        planned.set_unknown("position");
        let patch = PatchBuilder::new(&planned, &prior).field("position").build();
        assert!(patch.is_none());
    }

    #[test]
    fn test_null_vs_value_counts() {
        let mut prior = ResourceState::new();
        prior.set_known("topic", json!("old"));
        let mut planned = ResourceState::new();
        planned.set_null("topic");
        let patch = PatchBuilder::new(&planned, &prior).field("topic").build().unwrap();
        assert_eq!(patch.get("topic"), Some(&Value::Null));
    }

    #[test]
    fn test_field_rename() {
        let prior = ResourceState::new();
        let mut planned = ResourceState::new();
        planned.set_known("server_id", json!("123"));
        let patch = PatchBuilder::new(&planned, &prior)
            .field_as("server_id", "guild_id")
            .build()
            .unwrap();
        assert_eq!(patch.get("guild_id"), Some(&json!("123")));
    }

    #[test]
    fn test_project_fields_copies_and_nulls() {
        let mut state = ResourceState::new();
        state.set_known("topic", json!("stale"));
        let remote = json!({"name": "general", "topic": null});
        project_fields(&mut state, &remote, &[("name", "name"), ("topic", "topic")]);
        assert_eq!(state.str_value("name").as_deref(), Some("general"));
        assert!(state.get("topic").is_null());
    }
}
