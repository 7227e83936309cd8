//! Route-template derivation for rate-limit bucketing.
//!
//! Discord buckets rate limits per route template: the literal path with
//! minor parameters blanked out, keyed together with the HTTP method.
//! Major parameters (the first id after `guilds`, `channels` or
//! `webhooks`) stay in the key because Discord scopes those buckets per
//! object; every other id collapses to `{id}`.

/// Derive the route key used to look up a rate-limit bucket.
///
/// # Examples
///
/// ```
/// use concord_transport::route_key;
///
/// assert_eq!(
///     route_key("GET", "/channels/81384788765712384/messages/53908232506183680"),
///     "GET:/channels/81384788765712384/messages/{id}",
/// );
/// assert_eq!(
///     route_key("PATCH", "/guilds/81384788765712384/roles"),
///     "PATCH:/guilds/81384788765712384/roles",
/// );
/// ```
pub fn route_key(method: &str, path: &str) -> String {
    let mut out = String::with_capacity(path.len() + method.len() + 1);
    out.push_str(method);
    out.push(':');

    let mut previous: Option<&str> = None;
    for segment in path.split('/') {
        if segment.is_empty() {
            continue;
        }
        out.push('/');
        let is_id = segment.chars().all(|c| c.is_ascii_digit()) && segment.len() >= 17;
        let is_major = matches!(previous, Some("guilds") | Some("channels") | Some("webhooks"));
        if is_id && !is_major {
            out.push_str("{id}");
        } else {
            out.push_str(segment);
        }
        previous = Some(segment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_params_stay() {
        assert_eq!(
            route_key("GET", "/guilds/81384788765712384/bans/53908232506183680"),
            "GET:/guilds/81384788765712384/bans/{id}",
        );
    }

    #[test]
    fn test_minor_params_collapse() {
        assert_eq!(
            route_key("DELETE", "/channels/81384788765712384/pins/53908232506183680"),
            "DELETE:/channels/81384788765712384/pins/{id}",
        );
    }

    #[test]
    fn test_method_distinguishes_buckets() {
        assert_ne!(route_key("GET", "/guilds/1/roles"), route_key("PATCH", "/guilds/1/roles"));
    }

    #[test]
    fn test_short_numbers_are_not_ids() {
        // Version segments and small numbers are part of the template.
        assert_eq!(route_key("GET", "/guilds/123/widget"), "GET:/guilds/123/widget");
    }
}
