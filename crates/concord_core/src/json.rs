//! Canonical JSON rendering and content-addressed ids.
//!
//! Every JSON string attribute Concord stores is first normalized: object
//! keys deep-sorted, whitespace compacted, numbers in serde_json's shortest
//! round-trippable form. Equality over stored JSON is structural, not
//! textual, which keeps passthrough resources diff-stable when an operator
//! reorders keys.

use concord_error::JsonError;
use serde_json::Value;

/// Canonicalize a JSON document.
///
/// Idempotent: `normalize_json(&normalize_json(j)?)` yields the same string.
///
/// # Errors
///
/// Returns a [`JsonError`] when `input` is not well-formed JSON.
///
/// # Examples
///
/// ```
/// use concord_core::normalize_json;
///
/// let canon = normalize_json(r#"{ "b": 1, "a": { "d": 2, "c": 3 } }"#).unwrap();
/// assert_eq!(canon, r#"{"a":{"c":3,"d":2},"b":1}"#);
/// ```
pub fn normalize_json(input: &str) -> Result<String, JsonError> {
    let value: Value = serde_json::from_str(input)
        .map_err(|e| JsonError::new(format!("invalid JSON: {}", e)))?;
    let sorted = normalize_value(value);
    serde_json::to_string(&sorted).map_err(|e| JsonError::new(format!("serialize failed: {}", e)))
}

/// Deep-sort object keys in a JSON tree.
///
/// serde_json renders maps in iteration order, so rebuilding every object
/// as a `BTreeMap` gives a deterministic key order on serialization.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize_value(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        other => other,
    }
}

/// 32-bit additive hashcode over UTF-16 code units (`h = 31*h + c`,
/// wrapping).
///
/// # Examples
///
/// ```
/// use concord_core::hashcode;
///
/// assert_eq!(hashcode(""), 0);
/// assert_eq!(hashcode("a"), 97);
/// assert_eq!(hashcode("ab"), 31 * 97 + 98);
/// ```
pub fn hashcode(s: &str) -> i32 {
    let mut h: i32 = 0;
    for unit in s.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(unit as i32);
    }
    h
}

/// Content-addressed id for resources without a server-assigned id.
///
/// The id is the hashcode of `path + "|" + normalized-response`, rendered
/// in decimal. Stable inputs give a stable id across refreshes.
///
/// # Errors
///
/// Returns a [`JsonError`] when `response` is not well-formed JSON.
pub fn synthetic_id(path: &str, response: &str) -> Result<String, JsonError> {
    let normalized = normalize_json(response)?;
    Ok(hashcode(&format!("{}|{}", path, normalized)).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sorts_keys_deeply() {
        let canon = normalize_json(r#"{"z":{"b":1,"a":2},"a":[{"y":1,"x":2}]}"#).unwrap();
        assert_eq!(canon, r#"{"a":[{"x":2,"y":1}],"z":{"a":2,"b":1}}"#);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_json(r#"{ "b" : 1, "a" : 2 }"#).unwrap();
        let twice = normalize_json(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_semantically_equal_inputs_normalize_equal() {
        let a = normalize_json(r#"{"b":1,"a":2}"#).unwrap();
        let b = normalize_json("{\n  \"a\": 2,\n  \"b\": 1\n}").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert!(normalize_json("{not json").is_err());
    }

    #[test]
    fn test_array_order_is_preserved() {
        let canon = normalize_json(r#"[3,1,2]"#).unwrap();
        assert_eq!(canon, "[3,1,2]");
    }

    #[test]
    fn test_hashcode_wraps() {
        // Long inputs overflow i32; wrapping arithmetic must not panic.
        let long = "x".repeat(10_000);
        let _ = hashcode(&long);
    }

    #[test]
    fn test_synthetic_id_stable_across_key_order() {
        let a = synthetic_id("/guilds/1/widget", r#"{"b":1,"a":2}"#).unwrap();
        let b = synthetic_id("/guilds/1/widget", r#"{"a":2,"b":1}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthetic_id_varies_with_path() {
        let a = synthetic_id("/guilds/1/widget", "{}").unwrap();
        let b = synthetic_id("/guilds/2/widget", "{}").unwrap();
        assert_ne!(a, b);
    }
}
