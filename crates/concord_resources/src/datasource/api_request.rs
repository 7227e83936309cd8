//! The `discord_api_request` data source.

use crate::common::store_response;
use concord_core::synthetic_id;
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{Attribute, Context, DataSource, ResourceState, Schema};
use concord_transport::Method;
use serde_json::Value;

/// Issues one GET against an arbitrary API path and exposes the normalized
/// response. The read-only counterpart of the API escape-hatch resource.
pub struct ApiRequestData;

#[async_trait::async_trait]
impl DataSource for ApiRequestData {
    fn type_name(&self) -> &'static str {
        "discord_api_request"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::string("path").require())
            .attribute(Attribute::json("response_json").compute())
            .attribute(Attribute::string("id").compute())
    }

    async fn read(&self, ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
        let path = config
            .str_value("path")
            .ok_or_else(|| ValidationError::new("path", "must be a known string"))?;
        if !path.starts_with('/') {
            return Err(ValidationError::new("path", "must start with /").into());
        }
        let response = ctx
            .rest()
            .do_json(Method::GET, &path, &[], None, None)
            .await?
            .unwrap_or(Value::Null);
        store_response(config, &response)?;
        config.set_id(synthetic_id(&path, &response.to_string())?);
        Ok(())
    }
}
