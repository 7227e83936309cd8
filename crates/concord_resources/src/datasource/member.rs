//! The `discord_member` data source.

use concord_core::CompositeId;
use concord_error::{ConcordResult, ValidationError};
use concord_provider::{Attribute, Context, DataSource, ResourceState, Schema};
use concord_transport::Method;
use serde_json::{Value, json};

/// Looks up one guild member by user id.
pub struct MemberData;

#[async_trait::async_trait]
impl DataSource for MemberData {
    fn type_name(&self) -> &'static str {
        "discord_member"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require())
            .attribute(Attribute::snowflake("user_id").require())
            .attribute(Attribute::string("username").compute())
            .attribute(Attribute::string("nick").compute())
            .attribute(Attribute::string("joined_at").compute())
            .attribute(Attribute::string_list("roles").compute())
            .attribute(Attribute::string("id").compute())
    }

    async fn read(&self, ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
        let server_id = config
            .str_value("server_id")
            .ok_or_else(|| ValidationError::new("server_id", "must be a known string"))?;
        let user_id = config
            .str_value("user_id")
            .ok_or_else(|| ValidationError::new("user_id", "must be a known string"))?;
        let member = ctx
            .rest()
            .do_json_as::<Value>(
                Method::GET,
                &format!("/guilds/{}/members/{}", server_id, user_id),
                &[],
                None,
                None,
            )
            .await?;

        if let Some(username) = member["user"]["username"].as_str() {
            config.set_known("username", json!(username));
        }
        match member["nick"].as_str() {
            Some(nick) => config.set_known("nick", json!(nick)),
            None => config.set_null("nick"),
        }
        if let Some(joined) = member["joined_at"].as_str() {
            config.set_known("joined_at", json!(joined));
        }
        if let Some(roles) = member["roles"].as_array() {
            config.set_known("roles", json!(roles));
        }
        config.set_id(CompositeId::pair(server_id, user_id).to_string());
        Ok(())
    }
}
