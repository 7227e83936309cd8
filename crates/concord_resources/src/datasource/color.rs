//! The `discord_color` data source.

use concord_error::{ConcordResult, ValidationError};
use concord_provider::{Attribute, Context, DataSource, ResourceState, Schema};
use serde_json::json;

/// Converts a CSS-style hex color to the integer Discord expects for role
/// and embed colors. No network traffic.
pub struct ColorData;

fn parse_hex(hex: &str) -> Result<i64, ValidationError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::new(
            "hex",
            format!("{:?} is not a 6-digit hex color", hex),
        ));
    }
    i64::from_str_radix(digits, 16)
        .map_err(|_| ValidationError::new("hex", format!("{:?} is not a 6-digit hex color", hex)))
}

#[async_trait::async_trait]
impl DataSource for ColorData {
    fn type_name(&self) -> &'static str {
        "discord_color"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::string("hex").require())
            .attribute(Attribute::int("dec").compute())
            .attribute(Attribute::string("id").compute())
    }

    async fn read(&self, _ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
        let hex = config
            .str_value("hex")
            .ok_or_else(|| ValidationError::new("hex", "must be a known string"))?;
        let dec = parse_hex(&hex)?;
        config.set_known("dec", json!(dec));
        config.set_id(dec.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_with_and_without_hash() {
        assert_eq!(parse_hex("#7289da").unwrap(), 0x7289da);
        assert_eq!(parse_hex("FFFFFF").unwrap(), 0xffffff);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_hex("#fff").is_err());
        assert!(parse_hex("zzzzzz").is_err());
        assert!(parse_hex("#1234567").is_err());
    }
}
