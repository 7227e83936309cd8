//! Resource state: a tri-state attribute map.

use concord_core::AttrValue;
use serde_json::{Map, Value};

/// The attribute map for one resource instance.
///
/// Wraps the raw wire map with tri-state accessors. The reserved `id`
/// attribute identifies the remote object; clearing it marks a tombstone.
///
/// # Examples
///
/// ```
/// use concord_provider::ResourceState;
/// use serde_json::json;
///
/// let mut state = ResourceState::new();
/// state.set_known("name", json!("general"));
/// state.set_id("81384788765712384");
/// assert_eq!(state.str_value("name").as_deref(), Some("general"));
/// assert!(state.id().is_some());
/// state.clear_id();
/// assert!(state.is_tombstone());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceState {
    values: Map<String, Value>,
}

impl ResourceState {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a raw wire map.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// The raw wire map.
    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    /// Borrow the raw wire map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Tri-state value of an attribute. Missing keys read as null.
    pub fn get(&self, name: &str) -> AttrValue {
        match self.values.get(name) {
            Some(value) => AttrValue::from_wire(value.clone()),
            None => AttrValue::Null,
        }
    }

    /// Set a concrete value.
    pub fn set_known(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Set explicit null.
    pub fn set_null(&mut self, name: &str) {
        self.values.insert(name.to_string(), Value::Null);
    }

    /// Set the unknown marker.
    pub fn set_unknown(&mut self, name: &str) {
        self.values
            .insert(name.to_string(), AttrValue::Unknown.to_wire());
    }

    /// Write a tri-state value.
    pub fn set(&mut self, name: &str, value: AttrValue) {
        self.values.insert(name.to_string(), value.to_wire());
    }

    /// Known string value of an attribute.
    pub fn str_value(&self, name: &str) -> Option<String> {
        match self.get(name) {
            AttrValue::Known(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Known integer value of an attribute.
    pub fn int_value(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            AttrValue::Known(Value::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    /// Known boolean value of an attribute.
    pub fn bool_value(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            AttrValue::Known(Value::Bool(b)) => Some(b),
            _ => None,
        }
    }

    /// Known list-of-strings value of an attribute.
    pub fn string_list_value(&self, name: &str) -> Option<Vec<String>> {
        match self.get(name) {
            AttrValue::Known(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// The resource id, when known.
    pub fn id(&self) -> Option<String> {
        self.str_value("id")
    }

    /// Set the resource id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.set_known("id", Value::String(id.into()));
    }

    /// Clear the id, marking the resource tombstoned.
    pub fn clear_id(&mut self) {
        self.set_null("id");
    }

    /// True when the id has been cleared.
    pub fn is_tombstone(&self) -> bool {
        self.id().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_core::AttrValue;
    use serde_json::json;

    #[test]
    fn test_missing_reads_as_null() {
        let state = ResourceState::new();
        assert!(state.get("anything").is_null());
    }

    #[test]
    fn test_unknown_round_trip() {
        let mut state = ResourceState::new();
        state.set_unknown("position");
        assert!(state.get("position").is_unknown());
        assert_eq!(state.int_value("position"), None);
    }

    #[test]
    fn test_typed_accessors() {
        let mut state = ResourceState::new();
        state.set_known("name", json!("general"));
        state.set_known("position", json!(3));
        state.set_known("nsfw", json!(false));
        state.set_known("tags", json!(["a", "b"]));
        assert_eq!(state.str_value("name").as_deref(), Some("general"));
        assert_eq!(state.int_value("position"), Some(3));
        assert_eq!(state.bool_value("nsfw"), Some(false));
        assert_eq!(
            state.string_list_value("tags"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_set_tri_state() {
        let mut state = ResourceState::new();
        state.set("x", AttrValue::Known(json!(1)));
        assert!(state.get("x").is_known());
        state.set("x", AttrValue::Null);
        assert!(state.get("x").is_null());
    }
}
