//! Base64 data-URI helpers for image and sound uploads.
//!
//! Discord accepts avatars, icons and splashes as `data:<mime>;base64,`
//! URIs, and soundboard sounds the same way. These attributes are
//! write-only: the API never returns them, so their state value is
//! preserved verbatim across reads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use concord_error::ValidationError;
use std::path::Path;

/// Guess the MIME type from a file extension.
///
/// Covers the formats Discord accepts for images and sounds; anything else
/// falls back to `application/octet-stream`.
pub fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",
        _ => "application/octet-stream",
    }
}

/// Encode raw bytes as a `data:<mime>;base64,` URI.
///
/// # Examples
///
/// ```
/// use concord_core::encode_data_uri;
///
/// let uri = encode_data_uri("image/png", b"\x89PNG");
/// assert!(uri.starts_with("data:image/png;base64,"));
/// ```
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Decode a `data:<mime>;base64,` URI back to `(mime, bytes)`.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `attribute` when the scheme or the
/// base64 payload is malformed.
#[track_caller]
pub fn decode_data_uri(attribute: &str, uri: &str) -> Result<(String, Vec<u8>), ValidationError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ValidationError::new(attribute, "expected a data: URI"))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| ValidationError::new(attribute, "expected ;base64, encoding"))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ValidationError::new(attribute, format!("invalid base64: {}", e)))?;
    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let uri = encode_data_uri("image/png", b"pixels");
        let (mime, bytes) = decode_data_uri("image_data_uri", &uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"pixels");
    }

    #[test]
    fn test_decode_rejects_other_schemes() {
        assert!(decode_data_uri("a", "https://example.com/x.png").is_err());
        assert!(decode_data_uri("a", "data:image/png;hex,ff").is_err());
        assert!(decode_data_uri("a", "data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_mime_guesses() {
        assert_eq!(mime_for_path(Path::new("icon.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("horn.mp3")), "audio/mpeg");
        assert_eq!(mime_for_path(Path::new("mystery")), "application/octet-stream");
    }
}
