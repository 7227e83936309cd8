//! List-shaped data sources: guild emoji, sticker and soundboard
//! inventories, and thread membership rosters.
//!
//! Each exposes the remote collection as a normalized JSON document plus
//! an id list, which is what configurations usually need.

use concord_error::{ConcordResult, JsonError, ValidationError};
use concord_provider::{Attribute, Context, DataSource, ResourceState, Schema};
use concord_transport::Method;
use serde_json::{Value, json};

fn require_attr(config: &ResourceState, attr: &str) -> ConcordResult<String> {
    config
        .str_value(attr)
        .ok_or_else(|| ValidationError::new(attr, "must be a known string").into())
}

/// Store a fetched collection as `items` (normalized JSON) and `ids`.
fn store_list(config: &mut ResourceState, parent_id: &str, items: &[Value]) -> ConcordResult<()> {
    let ids: Vec<String> = items
        .iter()
        .filter_map(|item| item["id"].as_str().map(String::from))
        .collect();
    let normalized = concord_core::normalize_value(json!(items));
    let document = serde_json::to_string(&normalized).map_err(|e| JsonError::new(e.to_string()))?;
    config.set_known("items", json!(document));
    config.set_known("ids", json!(ids));
    config.set_id(parent_id);
    Ok(())
}

fn list_schema(parent: &'static str) -> Schema {
    Schema::new()
        .attribute(Attribute::snowflake(parent).require())
        .attribute(Attribute::json("items").compute())
        .attribute(Attribute::string_list("ids").compute())
        .attribute(Attribute::snowflake("id").compute())
}

macro_rules! guild_list_source {
    ($name:ident, $type_name:literal, $endpoint:literal, $doc:literal) => {
        #[doc = $doc]
        pub struct $name;

        #[async_trait::async_trait]
        impl DataSource for $name {
            fn type_name(&self) -> &'static str {
                $type_name
            }

            fn schema(&self) -> Schema {
                list_schema("server_id")
            }

            async fn read(&self, ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
                let server_id = require_attr(config, "server_id")?;
                let items = ctx
                    .rest()
                    .do_json_as::<Vec<Value>>(
                        Method::GET,
                        &format!(concat!("/guilds/{}/", $endpoint), server_id),
                        &[],
                        None,
                        None,
                    )
                    .await?;
                store_list(config, &server_id, &items)
            }
        }
    };
}

guild_list_source!(
    EmojiListData,
    "discord_emoji_list",
    "emojis",
    "Every custom emoji in a guild."
);
guild_list_source!(
    StickerListData,
    "discord_sticker_list",
    "stickers",
    "Every custom sticker in a guild."
);
guild_list_source!(
    SoundboardListData,
    "discord_soundboard_list",
    "soundboard-sounds",
    "Every soundboard sound in a guild."
);

/// The members of one thread.
pub struct ThreadMemberListData;

#[async_trait::async_trait]
impl DataSource for ThreadMemberListData {
    fn type_name(&self) -> &'static str {
        "discord_thread_member_list"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attribute(Attribute::snowflake("thread_id").require())
            .attribute(Attribute::string_list("user_ids").compute())
            .attribute(Attribute::snowflake("id").compute())
    }

    async fn read(&self, ctx: &Context, config: &mut ResourceState) -> ConcordResult<()> {
        let thread_id = require_attr(config, "thread_id")?;
        let members = ctx
            .rest()
            .do_json_as::<Vec<Value>>(
                Method::GET,
                &format!("/channels/{}/thread-members", thread_id),
                &[],
                None,
                None,
            )
            .await?;
        let user_ids: Vec<String> = members
            .iter()
            .filter_map(|m| m["user_id"].as_str().map(String::from))
            .collect();
        config.set_known("user_ids", json!(user_ids));
        config.set_id(thread_id);
        Ok(())
    }
}
