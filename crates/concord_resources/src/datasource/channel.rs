//! The `discord_channel` data source.

use concord_error::{ConcordResult, TransportError, ValidationError};
use concord_provider::{Attribute, Context, DataSource, ResourceState, Schema, project_fields};
use concord_transport::Method;
use serde_json::{Value, json};

/// Looks up one guild channel by id or by name.
pub struct ChannelData;

#[async_trait::async_trait]
impl DataSource for ChannelData {
    fn type_name(&self) -> &'static str {
        "discord_channel"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require())
            .attribute(Attribute::snowflake("channel_id"))
            .attribute(Attribute::string("name"))
            .attribute(Attribute::int("type").compute())
            .attribute(Attribute::string("topic").compute())
            .attribute(Attribute::int("position").compute())
            .attribute(Attribute::snowflake("parent_id").compute())
            .attribute(Attribute::snowflake("id").compute())
            .exactly_one(vec!["channel_id", "name"])
    }

    async fn read(&self, ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
        let server_id = config
            .str_value("server_id")
            .ok_or_else(|| ValidationError::new("server_id", "must be a known string"))?;
        let channels = ctx
            .rest()
            .do_json_as::<Vec<Value>>(
                Method::GET,
                &format!("/guilds/{}/channels", server_id),
                &[],
                None,
                None,
            )
            .await?;

        let wanted_id = config.str_value("channel_id");
        let wanted_name = config.str_value("name");
        let channel = channels
            .iter()
            .find(|c| match (&wanted_id, &wanted_name) {
                (Some(id), _) => c["id"].as_str() == Some(id.as_str()),
                (None, Some(name)) => c["name"].as_str() == Some(name.as_str()),
                (None, None) => false,
            })
            .ok_or_else(|| {
                TransportError::new(
                    "GET",
                    format!("/guilds/{}/channels", server_id),
                    404,
                    None,
                    "no channel matched the lookup".to_string(),
                )
            })?;

        project_fields(
            config,
            channel,
            &[
                ("name", "name"),
                ("type", "type"),
                ("topic", "topic"),
                ("position", "position"),
                ("parent_id", "parent_id"),
            ],
        );
        if let Some(id) = channel["id"].as_str() {
            config.set_known("channel_id", json!(id));
            config.set_id(id);
        }
        Ok(())
    }
}
