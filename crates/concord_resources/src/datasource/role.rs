//! The `discord_role` data source.

use crate::common::store_permissions;
use concord_core::PermissionSet;
use concord_error::{ConcordResult, TransportError, ValidationError};
use concord_provider::{Attribute, Context, DataSource, ResourceState, Schema};
use concord_transport::Method;
use serde_json::{Value, json};

/// Looks up one guild role by id or by name.
pub struct RoleData;

#[async_trait::async_trait]
impl DataSource for RoleData {
    fn type_name(&self) -> &'static str {
        "discord_role"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("server_id").require())
            .attribute(Attribute::snowflake("role_id"))
            .attribute(Attribute::string("name"))
            .attribute(Attribute::int("position").compute())
            .attribute(Attribute::int("color").compute())
            .attribute(Attribute::bool("hoist").compute())
            .attribute(Attribute::bool("mentionable").compute())
            .attribute(Attribute::bool("managed").compute())
            .attribute(Attribute::int("permissions").compute())
            .attribute(Attribute::string("permissions_bits64").compute())
            .attribute(Attribute::snowflake("id").compute())
            .exactly_one(vec!["role_id", "name"])
    }

    async fn read(&self, ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
        let server_id = config
            .str_value("server_id")
            .ok_or_else(|| ValidationError::new("server_id", "must be a known string"))?;
        let roles = ctx
            .rest()
            .do_json_as::<Vec<Value>>(
                Method::GET,
                &format!("/guilds/{}/roles", server_id),
                &[],
                None,
                None,
            )
            .await?;

        let wanted_id = config.str_value("role_id");
        let wanted_name = config.str_value("name");
        let role = roles
            .iter()
            .find(|r| match (&wanted_id, &wanted_name) {
                (Some(id), _) => r["id"].as_str() == Some(id.as_str()),
                (None, Some(name)) => r["name"].as_str() == Some(name.as_str()),
                (None, None) => false,
            })
            .ok_or_else(|| {
                TransportError::new(
                    "GET",
                    format!("/guilds/{}/roles", server_id),
                    404,
                    None,
                    "no role matched the lookup".to_string(),
                )
            })?;

        for (attr, field) in [
            ("position", "position"),
            ("color", "color"),
            ("hoist", "hoist"),
            ("mentionable", "mentionable"),
            ("managed", "managed"),
            ("name", "name"),
        ] {
            if let Some(value) = role.get(field) {
                config.set_known(attr, value.clone());
            }
        }
        if let Some(id) = role["id"].as_str() {
            config.set_known("role_id", json!(id));
            config.set_id(id);
        }
        if let Some(permissions) = role["permissions"].as_str() {
            let set = PermissionSet::from_decimal("permissions_bits64", permissions)?;
            store_permissions(config, "permissions", "permissions_bits64", set);
        }
        Ok(())
    }
}
