//! Tri-state attribute values.
//!
//! Every desired-state field is known, unknown (computed later by the
//! server), or null (absent). The three states must survive plan and apply:
//! in particular, unknown never counts as a change during diffing.

use serde_json::Value;

/// Sentinel the wire protocol uses for a value that will only be known
/// after apply.
pub const UNKNOWN_KEY: &str = "$unknown";

/// A tri-state attribute value.
///
/// # Examples
///
/// ```
/// use concord_core::AttrValue;
/// use serde_json::json;
///
/// let known = AttrValue::from_wire(json!("general"));
/// let unknown = AttrValue::from_wire(json!({"$unknown": true}));
/// let null = AttrValue::from_wire(json!(null));
///
/// assert!(known.is_known());
/// assert!(unknown.is_unknown());
/// assert!(null.is_null());
/// // Unknown never registers as a change.
/// assert!(!unknown.differs_from(&known));
/// assert!(null.differs_from(&known));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A concrete, non-null value.
    Known(Value),
    /// Absent.
    Null,
    /// Will be computed after apply.
    Unknown,
}

impl AttrValue {
    /// Decode the wire form: `null` is null, the `{"$unknown": true}`
    /// sentinel is unknown, anything else is known.
    pub fn from_wire(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Object(ref map)
                if map.len() == 1 && map.get(UNKNOWN_KEY) == Some(&Value::Bool(true)) =>
            {
                Self::Unknown
            }
            other => Self::Known(other),
        }
    }

    /// Encode back to the wire form.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Known(v) => v.clone(),
            Self::Null => Value::Null,
            Self::Unknown => serde_json::json!({ UNKNOWN_KEY: true }),
        }
    }

    /// True for a concrete value.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// True for null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for the unknown marker.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The inner value, when known.
    pub fn as_known(&self) -> Option<&Value> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Three-valued inequality against a prior value.
    ///
    /// Unknown on either side never counts as a change; null vs non-null
    /// counts; two known values count when unequal.
    pub fn differs_from(&self, prior: &AttrValue) -> bool {
        match (self, prior) {
            (Self::Unknown, _) | (_, Self::Unknown) => false,
            (Self::Null, Self::Null) => false,
            (Self::Null, Self::Known(_)) | (Self::Known(_), Self::Null) => true,
            (Self::Known(a), Self::Known(b)) => a != b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_round_trip() {
        for v in [
            AttrValue::Known(json!(42)),
            AttrValue::Null,
            AttrValue::Unknown,
        ] {
            assert_eq!(AttrValue::from_wire(v.to_wire()), v);
        }
    }

    #[test]
    fn test_plain_object_is_known() {
        let v = AttrValue::from_wire(json!({"$unknown": false}));
        assert!(v.is_known());
        let v = AttrValue::from_wire(json!({"$unknown": true, "extra": 1}));
        assert!(v.is_known());
    }

    #[test]
    fn test_three_valued_diff() {
        let a = AttrValue::Known(json!("x"));
        let b = AttrValue::Known(json!("y"));
        assert!(a.differs_from(&b));
        assert!(!a.differs_from(&a));
        assert!(!AttrValue::Unknown.differs_from(&a));
        assert!(!a.differs_from(&AttrValue::Unknown));
        assert!(AttrValue::Null.differs_from(&a));
        assert!(!AttrValue::Null.differs_from(&AttrValue::Null));
    }
}
