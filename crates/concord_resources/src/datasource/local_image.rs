//! The `discord_local_image` data source.

use concord_core::{encode_data_uri, hashcode, mime_for_path};
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{Attribute, Context, DataSource, ResourceState, Schema};
use serde_json::json;
use std::path::Path;

/// Reads a local image file and exposes it as a base64 data URI, ready for
/// avatar, icon and emoji attributes. No network traffic.
pub struct LocalImageData;

#[async_trait::async_trait]
impl DataSource for LocalImageData {
    fn type_name(&self) -> &'static str {
        "discord_local_image"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::string("file").require())
            .attribute(Attribute::string("data_uri").compute())
            .attribute(Attribute::string("id").compute())
    }

    async fn read(&self, _ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
        let file = config
            .str_value("file")
            .ok_or_else(|| ValidationError::new("file", "must be a known string"))?;
        let bytes = std::fs::read(&file)
            .map_err(|e| ValidationError::new("file", format!("cannot read {}: {}", file, e)))?;
        let mime = mime_for_path(Path::new(&file));
        let uri = encode_data_uri(mime, &bytes);
        config.set_id(hashcode(&uri).to_string());
        config.set_known("data_uri", json!(uri));
        Ok(())
    }
}
