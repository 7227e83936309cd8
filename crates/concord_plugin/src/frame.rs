//! Wire frames: one JSON document per line in each direction.

use concord_provider::Diagnostics;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Operations the host may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Build the shared transport from provider configuration.
    Configure,
    /// Describe a type's schema.
    Schema,
    /// Config-time validation.
    Validate,
    /// Plan modification.
    Plan,
    /// Create and read back.
    Create,
    /// Refresh from remote.
    Read,
    /// Minimal-patch update and read back.
    Update,
    /// Remove the remote object (or state only).
    Delete,
    /// Seed state from an import id.
    Import,
    /// Resolve a data source.
    ReadData,
}

/// One request frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id, echoed in the response.
    pub id: u64,
    /// Requested operation.
    pub op: Op,
    /// Resource or data-source type name; absent only for Configure.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Provider configuration (Configure) or the config under validation
    /// (Validate, ReadData).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    /// Current state (Read, Delete).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Map<String, Value>>,
    /// Planned state (Plan, Create, Update).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned: Option<Map<String, Value>>,
    /// Prior state (Plan, Update).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior: Option<Map<String, Value>>,
    /// Import id (Import).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_id: Option<String>,
}

/// One response frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Correlation id from the request.
    pub id: u64,
    /// Resulting state, when the operation produces one. `None` after a
    /// tombstoned read means the host should drop the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Map<String, Value>>,
    /// Schema description (Schema op only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Errors and warnings from the operation.
    pub diagnostics: Diagnostics,
}

impl Response {
    /// An empty response for `id`.
    pub fn empty(id: u64) -> Self {
        Self {
            id,
            state: None,
            schema: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// A diagnostics-only response.
    pub fn diagnostics(id: u64, diagnostics: Diagnostics) -> Self {
        Self {
            id,
            state: None,
            schema: None,
            diagnostics,
        }
    }

    /// A state-carrying response.
    pub fn with_state(id: u64, state: Option<Map<String, Value>>, diagnostics: Diagnostics) -> Self {
        Self {
            id,
            state,
            schema: None,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_round_trip() {
        let raw = json!({
            "id": 7,
            "op": "create",
            "type": "discord_channel",
            "planned": {"name": "general"},
        })
        .to_string();
        let request: Request = serde_json::from_str(&raw).unwrap();
        assert_eq!(request.op, Op::Create);
        assert_eq!(request.type_name.as_deref(), Some("discord_channel"));
        assert!(request.state.is_none());
    }

    #[test]
    fn test_response_omits_absent_state() {
        let encoded = serde_json::to_string(&Response::empty(3)).unwrap();
        assert!(!encoded.contains("state"));
        assert!(encoded.contains("diagnostics"));
    }
}
