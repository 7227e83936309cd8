//! Cross-handler checks over the resource registry: schema sanity, the
//! uniform plan and import behaviors, and config validation. Nothing
//! here touches the network.

use concord_core::normalize_json;
use concord_provider::{Resource, ResourceRuntime, ResourceState};
use concord_resources::{
    framework_data_sources, framework_resources, legacy_data_sources, legacy_resources,
};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::Arc;

fn runtime(resource: impl Resource + 'static) -> ResourceRuntime {
    ResourceRuntime::new(Arc::new(resource))
}

fn state(value: Value) -> ResourceState {
    let map: Map<String, Value> = value.as_object().expect("object literal").clone();
    ResourceState::from_map(map)
}

#[test]
fn test_type_names_unique_within_each_namespace() {
    let mut resources = HashSet::new();
    for r in legacy_resources().iter().chain(framework_resources().iter()) {
        assert!(resources.insert(r.type_name()), "duplicate resource {}", r.type_name());
    }
    let mut data_sources = HashSet::new();
    for d in legacy_data_sources().iter().chain(framework_data_sources().iter()) {
        assert!(data_sources.insert(d.type_name()), "duplicate data source {}", d.type_name());
    }
}

#[test]
fn test_every_schema_has_unique_attribute_names() {
    for resource in legacy_resources().into_iter().chain(framework_resources()) {
        let schema = resource.schema();
        assert!(!schema.attributes().is_empty(), "{} has no attributes", resource.type_name());
        let mut seen = HashSet::new();
        for attribute in schema.attributes() {
            assert!(
                seen.insert(attribute.name()),
                "{} declares {} twice",
                resource.type_name(),
                attribute.name()
            );
        }
    }
}

#[test]
fn test_write_only_attributes_never_computed() {
    for resource in legacy_resources().into_iter().chain(framework_resources()) {
        for attribute in resource.schema().attributes() {
            if *attribute.write_only() {
                assert!(
                    !*attribute.computed(),
                    "{}.{} is both write-only and computed",
                    resource.type_name(),
                    attribute.name()
                );
            }
        }
    }
}

#[test]
fn test_message_plan_trims_trailing_newline() {
    let runtime = runtime(concord_resources::Message);
    let mut planned = state(json!({
        "channel_id": "81384788765712384",
        "content": "hello there\r\n",
    }));
    let diags = runtime.plan(None, &mut planned);
    assert!(!diags.has_errors());
    assert_eq!(planned.str_value("content").as_deref(), Some("hello there"));
}

#[test]
fn test_passthrough_plan_normalizes_reordered_json() -> anyhow::Result<()> {
    let runtime = runtime(concord_resources::GuildSettings);
    let raw = r#"{"verification_level": 2, "afk_timeout": 300}"#;
    let mut planned = state(json!({
        "server_id": "81384788765712384",
        "payload_json": raw,
    }));
    let diags = runtime.plan(None, &mut planned);
    assert!(!diags.has_errors());
    assert_eq!(planned.str_value("payload_json"), Some(normalize_json(raw)?));
    Ok(())
}

#[test]
fn test_plan_rejects_malformed_json_attribute() {
    let runtime = runtime(concord_resources::GuildSettings);
    let mut planned = state(json!({
        "server_id": "81384788765712384",
        "payload_json": "{not json",
    }));
    let diags = runtime.plan(None, &mut planned);
    assert!(diags.has_errors());
}

#[test]
fn test_write_only_value_survives_planning() {
    let runtime = runtime(concord_resources::Webhook);
    let prior = state(json!({
        "id": "41771983423143937",
        "channel_id": "81384788765712384",
        "name": "hooks",
        "avatar_data_uri": "data:image/png;base64,iVBORw0KGgo=",
    }));
    let mut planned = state(json!({
        "channel_id": "81384788765712384",
        "name": "hooks",
    }));
    let diags = runtime.plan(Some(&prior), &mut planned);
    assert!(!diags.has_errors());
    assert_eq!(
        planned.str_value("avatar_data_uri").as_deref(),
        Some("data:image/png;base64,iVBORw0KGgo=")
    );
}

#[test]
fn test_validation_catches_missing_and_malformed_config() {
    let runtime = runtime(concord_resources::Channel);
    // name is required.
    let diags = runtime.validate(&state(json!({"server_id": "81384788765712384"})));
    assert!(diags.has_errors());

    // server_id must look like a snowflake.
    let diags = runtime.validate(&state(json!({"server_id": "not-a-snowflake", "name": "general"})));
    assert!(diags.has_errors());

    let diags = runtime.validate(&state(json!({"server_id": "81384788765712384", "name": "general"})));
    assert!(!diags.has_errors());
}

#[test]
fn test_import_seeds_state_from_composite_ids() {
    let (state, diags) = runtime(concord_resources::Ban)
        .import("81384788765712384:53908232506183680");
    assert!(!diags.has_errors());
    let state = state.expect("seeded state");
    assert_eq!(state.str_value("server_id").as_deref(), Some("81384788765712384"));
    assert_eq!(state.str_value("user_id").as_deref(), Some("53908232506183680"));

    let (state, diags) = runtime(concord_resources::ChannelPermission)
        .import("81384788765712384:53908232506183680:role");
    assert!(!diags.has_errors());
    assert_eq!(
        state.expect("seeded state").str_value("type").as_deref(),
        Some("role")
    );

    let (state, diags) = runtime(concord_resources::Ban).import("missing-colon");
    assert!(diags.has_errors());
    assert!(state.is_none());
}

#[test]
fn test_import_rejects_empty_id() {
    let (state, diags) = runtime(concord_resources::Role).import("");
    assert!(diags.has_errors());
    assert!(state.is_none());
}

/// Guild-scoped children import as `server_id:id`, so the state they seed
/// carries everything their read needs.
#[test]
fn test_import_of_guild_children_yields_readable_state() {
    let runtimes = vec![
        runtime(concord_resources::Role),
        runtime(concord_resources::Emoji),
        runtime(concord_resources::Sticker),
        runtime(concord_resources::ScheduledEvent),
        runtime(concord_resources::SoundboardSound),
        runtime(concord_resources::AutomodRule),
    ];
    for rt in runtimes {
        let (state, diags) = rt.import("81384788765712384:53908232506183680");
        assert!(!diags.has_errors(), "{} rejected a composite id", rt.type_name());
        let state = state.expect("seeded state");
        assert_eq!(
            state.str_value("server_id").as_deref(),
            Some("81384788765712384"),
            "{} did not seed server_id",
            rt.type_name()
        );
        assert_eq!(
            state.id().as_deref(),
            Some("53908232506183680"),
            "{} did not seed id",
            rt.type_name()
        );

        // A bare snowflake cannot name a guild child.
        let (state, diags) = rt.import("53908232506183680");
        assert!(diags.has_errors(), "{} accepted a bare id", rt.type_name());
        assert!(state.is_none());
    }

    // The template code rides after the guild id.
    let (state, diags) =
        runtime(concord_resources::GuildTemplate).import("81384788765712384:2TffvPucqHkN");
    assert!(!diags.has_errors());
    let state = state.expect("seeded state");
    assert_eq!(state.str_value("server_id").as_deref(), Some("81384788765712384"));
    assert_eq!(state.id().as_deref(), Some("2TffvPucqHkN"));

    // Stage instances are addressed by their stage channel.
    let (state, diags) = runtime(concord_resources::StageInstance).import("81384788765712384");
    assert!(!diags.has_errors());
    let state = state.expect("seeded state");
    assert_eq!(state.str_value("channel_id").as_deref(), Some("81384788765712384"));
}

#[test]
fn test_soundboard_sound_requires_one_emoji_form() {
    let runtime = runtime(concord_resources::SoundboardSound);
    let base = json!({
        "server_id": "81384788765712384",
        "name": "quack",
        "sound_data_uri": "data:audio/mpeg;base64,SUQzBAA=",
    });

    let mut both = base.clone();
    both["emoji_id"] = json!("41771983429993937");
    both["emoji_name"] = json!("duck");
    assert!(runtime.validate(&state(both)).has_errors());

    // Neither form set is just as invalid.
    assert!(runtime.validate(&state(base.clone())).has_errors());

    let mut one = base;
    one["emoji_name"] = json!("duck");
    assert!(!runtime.validate(&state(one)).has_errors());
}
