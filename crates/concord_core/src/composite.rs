//! Colon-delimited composite identifiers.
//!
//! Resources whose natural key is a pair or triple (ban = server + user,
//! message = channel + message, channel permission = channel + overwrite +
//! type) store a colon-joined id and parse it back on Import and Delete.

use concord_error::ImportError;

/// A composite identifier with two or three colon-delimited parts.
///
/// # Examples
///
/// ```
/// use concord_core::CompositeId;
///
/// let id = CompositeId::pair("81384788765712384", "53908232506183680");
/// assert_eq!(id.to_string(), "81384788765712384:53908232506183680");
///
/// let (a, b) = CompositeId::split_pair("server_id:user_id", &id.to_string()).unwrap();
/// assert_eq!(a, "81384788765712384");
/// assert_eq!(b, "53908232506183680");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    parts: Vec<String>,
}

impl CompositeId {
    /// Build a two-part id.
    pub fn pair(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            parts: vec![a.into(), b.into()],
        }
    }

    /// Build a three-part id.
    pub fn triple(a: impl Into<String>, b: impl Into<String>, c: impl Into<String>) -> Self {
        Self {
            parts: vec![a.into(), b.into(), c.into()],
        }
    }

    /// Parse a two-part id, rejecting the wrong number of parts.
    ///
    /// `expected` documents the shape for the error message, e.g.
    /// `"server_id:user_id"`.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] when `id` does not split into exactly two
    /// non-empty parts.
    #[track_caller]
    pub fn split_pair(expected: &str, id: &str) -> Result<(String, String), ImportError> {
        match Self::split(id, 2) {
            Some(parts) => Ok((parts[0].clone(), parts[1].clone())),
            None => Err(ImportError::new(expected, id)),
        }
    }

    /// Parse a three-part id, rejecting the wrong number of parts.
    #[track_caller]
    pub fn split_triple(
        expected: &str,
        id: &str,
    ) -> Result<(String, String, String), ImportError> {
        match Self::split(id, 3) {
            Some(parts) => Ok((parts[0].clone(), parts[1].clone(), parts[2].clone())),
            None => Err(ImportError::new(expected, id)),
        }
    }

    fn split(id: &str, arity: usize) -> Option<Vec<String>> {
        let parts: Vec<&str> = id.split(':').collect();
        if parts.len() != arity || parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(parts.into_iter().map(String::from).collect())
    }
}

impl std::fmt::Display for CompositeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.parts.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_round_trip() {
        let id = CompositeId::pair("123", "456").to_string();
        assert_eq!(CompositeId::split_pair("a:b", &id).unwrap(), ("123".into(), "456".into()));
    }

    #[test]
    fn test_triple_round_trip() {
        let id = CompositeId::triple("1", "2", "role").to_string();
        assert_eq!(
            CompositeId::split_triple("a:b:c", &id).unwrap(),
            ("1".into(), "2".into(), "role".into())
        );
    }

    #[test]
    fn test_wrong_arity_rejected() {
        assert!(CompositeId::split_pair("a:b", "only-one").is_err());
        assert!(CompositeId::split_pair("a:b", "1:2:3").is_err());
        assert!(CompositeId::split_triple("a:b:c", "1:2").is_err());
    }

    #[test]
    fn test_empty_parts_rejected() {
        assert!(CompositeId::split_pair("a:b", "1:").is_err());
        assert!(CompositeId::split_pair("a:b", ":2").is_err());
    }
}
