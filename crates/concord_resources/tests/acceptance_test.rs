//! Live acceptance tests against a real guild.
//!
//! Gated on `TF_ACC` plus a `DISCORD_TOKEN` and a guild id in
//! `DISCORD_GUILD_ID` (or the legacy `DISCORD_SERVER_ID`). Without those
//! every test returns early, so the suite stays green offline. The bot
//! needs manage-channels and manage-roles in the target guild.

use concord_core::{encode_data_uri, mime_for_path};
use concord_provider::{Resource, ResourceRuntime, ResourceState};
use concord_resources::{Channel, Message, Role, SoundboardSound, StageInstance};
use concord_transport::{DiscordRest, RestConfig};
use serde_json::{Map, Value, json};
use std::sync::Arc;

struct Acceptance {
    rest: DiscordRest,
    guild_id: String,
}

fn acceptance() -> Option<Acceptance> {
    if std::env::var("TF_ACC").is_err() {
        eprintln!("skipping: TF_ACC not set");
        return None;
    }
    let token = std::env::var("DISCORD_TOKEN").expect("TF_ACC set but DISCORD_TOKEN missing");
    let guild_id = std::env::var("DISCORD_GUILD_ID")
        .or_else(|_| std::env::var("DISCORD_SERVER_ID"))
        .expect("TF_ACC set but no guild id in DISCORD_GUILD_ID");
    let config = RestConfig::builder().token(token).build().expect("rest config");
    let rest = DiscordRest::new(config).expect("transport");
    Some(Acceptance { rest, guild_id })
}

fn runtime(env: &Acceptance, resource: impl Resource + 'static) -> ResourceRuntime {
    let runtime = ResourceRuntime::new(Arc::new(resource));
    runtime.configure(env.rest.clone());
    runtime
}

fn state(value: Value) -> ResourceState {
    let map: Map<String, Value> = value.as_object().expect("object literal").clone();
    ResourceState::from_map(map)
}

#[tokio::test]
async fn test_channel_and_message_lifecycle() {
    let Some(env) = acceptance() else { return };
    let channels = runtime(&env, Channel);
    let messages = runtime(&env, Message);

    let (created, diags) = channels
        .create(state(json!({
            "server_id": env.guild_id,
            "name": "concord-acceptance",
            "type": "text",
            "topic": "created by the acceptance suite",
        })))
        .await;
    assert!(!diags.has_errors(), "{diags:?}");
    let channel = created.expect("created channel");
    let channel_id = channel.id().expect("channel id");

    // Topic update round-trips.
    let mut planned = channel.clone();
    planned.set_known("topic", json!("updated by the acceptance suite"));
    let (updated, diags) = channels.update(planned, channel.clone()).await;
    assert!(!diags.has_errors(), "{diags:?}");
    assert_eq!(
        updated.expect("updated channel").str_value("topic").as_deref(),
        Some("updated by the acceptance suite")
    );

    // A message in the new channel, edited once.
    let (created, diags) = messages
        .create(state(json!({
            "channel_id": channel_id,
            "content": "first draft",
        })))
        .await;
    assert!(!diags.has_errors(), "{diags:?}");
    let message = created.expect("created message");

    let mut planned = message.clone();
    planned.set_known("content", json!("second draft"));
    let (updated, diags) = messages.update(planned, message.clone()).await;
    assert!(!diags.has_errors(), "{diags:?}");
    let updated = updated.expect("updated message");
    assert_eq!(updated.str_value("content").as_deref(), Some("second draft"));
    assert!(updated.str_value("edited_timestamp").is_some());

    let diags = messages.delete(updated).await;
    assert!(!diags.has_errors(), "{diags:?}");
    let diags = channels.delete(channel).await;
    assert!(!diags.has_errors(), "{diags:?}");
}

#[tokio::test]
async fn test_deleted_channel_reads_as_tombstone() {
    let Some(env) = acceptance() else { return };
    let channels = runtime(&env, Channel);

    let (created, diags) = channels
        .create(state(json!({
            "server_id": env.guild_id,
            "name": "concord-tombstone",
            "type": "text",
        })))
        .await;
    assert!(!diags.has_errors(), "{diags:?}");
    let channel = created.expect("created channel");

    let diags = channels.delete(channel.clone()).await;
    assert!(!diags.has_errors(), "{diags:?}");

    // The follow-up read must report the object gone, not error.
    let (outcome, diags) = channels.read(channel).await;
    assert!(!diags.has_errors(), "{diags:?}");
    assert!(outcome.is_none());
}

#[tokio::test]
async fn test_role_permissions_round_trip() {
    let Some(env) = acceptance() else { return };
    let roles = runtime(&env, Role);

    // kick_members | manage_messages as a 64-bit decimal string.
    let mask = (1u64 << 1) | (1u64 << 13);
    let (created, diags) = roles
        .create(state(json!({
            "server_id": env.guild_id,
            "name": "concord-acceptance",
            "permissions_bits64": mask.to_string(),
            "color": 0x7289da,
        })))
        .await;
    assert!(!diags.has_errors(), "{diags:?}");
    let role = created.expect("created role");
    assert_eq!(
        role.str_value("permissions_bits64").as_deref(),
        Some(mask.to_string().as_str())
    );

    let diags = roles.delete(role).await;
    assert!(!diags.has_errors(), "{diags:?}");
}

#[tokio::test]
async fn test_stage_instance_lifecycle() {
    let Some(env) = acceptance() else { return };
    if std::env::var("DISCORD_ENABLE_STAGE_INSTANCE_TEST").is_err() {
        eprintln!("skipping: DISCORD_ENABLE_STAGE_INSTANCE_TEST not set");
        return;
    }
    let channels = runtime(&env, Channel);
    let stages = runtime(&env, StageInstance);

    let (created, diags) = channels
        .create(state(json!({
            "server_id": env.guild_id,
            "name": "concord-stage",
            "type": "stage",
        })))
        .await;
    assert!(!diags.has_errors(), "{diags:?}");
    let channel = created.expect("created stage channel");
    let channel_id = channel.id().expect("channel id");

    let (created, diags) = stages
        .create(state(json!({
            "channel_id": channel_id,
            "topic": "acceptance run",
        })))
        .await;
    assert!(!diags.has_errors(), "{diags:?}");
    let instance = created.expect("created stage instance");
    assert_eq!(instance.str_value("topic").as_deref(), Some("acceptance run"));

    let diags = stages.delete(instance).await;
    assert!(!diags.has_errors(), "{diags:?}");
    let diags = channels.delete(channel).await;
    assert!(!diags.has_errors(), "{diags:?}");
}

#[tokio::test]
async fn test_soundboard_sound_lifecycle() {
    let Some(env) = acceptance() else { return };
    if std::env::var("DISCORD_ENABLE_SOUNDBOARD_TEST").is_err() {
        eprintln!("skipping: DISCORD_ENABLE_SOUNDBOARD_TEST not set");
        return;
    }
    let file = std::env::var("DISCORD_SOUND_FILE")
        .expect("soundboard test enabled but DISCORD_SOUND_FILE missing");
    let bytes = std::fs::read(&file).expect("readable sound file");
    let uri = encode_data_uri(mime_for_path(std::path::Path::new(&file)), &bytes);

    let sounds = runtime(&env, SoundboardSound);
    let (created, diags) = sounds
        .create(state(json!({
            "server_id": env.guild_id,
            "name": "concord-acceptance",
            "sound_data_uri": uri,
            "volume": 0.5,
            "emoji_name": "🔊",
        })))
        .await;
    assert!(!diags.has_errors(), "{diags:?}");
    let sound = created.expect("created sound");
    // The data URI never comes back from reads; write-only preservation
    // must keep it in state.
    assert!(sound.str_value("sound_data_uri").is_some());

    let diags = sounds.delete(sound).await;
    assert!(!diags.has_errors(), "{diags:?}");
}
