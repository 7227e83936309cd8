//! The `discord_server` data source.

use concord_error::{ConcordResult, ValidationError};
use concord_provider::{Attribute, Context, DataSource, ResourceState, Schema, project_fields};
use concord_transport::Method;
use serde_json::Value;

/// Looks up a guild the bot belongs to.
pub struct ServerData;

#[async_trait::async_trait]
impl DataSource for ServerData {
    fn type_name(&self) -> &'static str {
        "discord_server"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require())
            .attribute(Attribute::string("name").compute())
            .attribute(Attribute::snowflake("owner_id").compute())
            .attribute(Attribute::int("verification_level").compute())
            .attribute(Attribute::snowflake("system_channel_id").compute())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn read(&self, ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
        let server_id = config
            .str_value("server_id")
            .ok_or_else(|| ValidationError::new("server_id", "must be a known string"))?;
        let remote = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/guilds/{}", server_id),
                &[],
                None,
                None,
            )
            .await?;
        project_fields(
            config,
            &remote,
            &[
                ("name", "name"),
                ("owner_id", "owner_id"),
                ("verification_level", "verification_level"),
                ("system_channel_id", "system_channel_id"),
            ],
        );
        config.set_id(server_id);
        Ok(())
    }
}
