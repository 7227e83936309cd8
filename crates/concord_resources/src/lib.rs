//! Resource and data-source handlers for the Concord provider.
//!
//! Every handler instantiates the reconciliation runtime from
//! `concord_provider`: a schema, the remote API shape, and the
//! desired-to-remote translation. All Discord traffic goes through the
//! shared transport; no handler retries or rate-limits on its own.
//!
//! The handlers are split across two provider surfaces during migration:
//! [`legacy_resources`] serves the long-standing types, while
//! [`framework_resources`] serves the newer ones. The plugin server
//! multiplexes both behind one endpoint.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod common;
pub mod datasource;

mod api_resource;
mod automod_rule;
mod ban;
mod channel;
mod channel_order;
mod channel_permission;
mod channel_permissions;
mod emoji;
mod guild_settings;
mod guild_template;
mod invite;
mod member_roles;
mod member_verification;
mod message;
mod onboarding;
mod role;
mod role_everyone;
mod role_order;
mod scheduled_event;
mod soundboard_sound;
mod stage_instance;
mod sticker;
mod system_channel;
mod thread;
mod thread_member;
mod webhook;
mod welcome_screen;
mod widget_settings;

pub use api_resource::ApiResource;
pub use automod_rule::AutomodRule;
pub use ban::Ban;
pub use channel::Channel;
pub use channel_order::ChannelOrder;
pub use channel_permission::ChannelPermission;
pub use channel_permissions::ChannelPermissions;
pub use emoji::Emoji;
pub use guild_settings::GuildSettings;
pub use guild_template::{GuildTemplate, GuildTemplateSync};
pub use invite::Invite;
pub use member_roles::MemberRoles;
pub use member_verification::MemberVerification;
pub use message::Message;
pub use onboarding::Onboarding;
pub use role::Role;
pub use role_everyone::RoleEveryone;
pub use role_order::RoleOrder;
pub use scheduled_event::ScheduledEvent;
pub use soundboard_sound::SoundboardSound;
pub use stage_instance::StageInstance;
pub use sticker::Sticker;
pub use system_channel::SystemChannel;
pub use thread::Thread;
pub use thread_member::ThreadMember;
pub use webhook::Webhook;
pub use welcome_screen::WelcomeScreen;
pub use widget_settings::WidgetSettings;

use concord_provider::{DataSource, Resource};
use std::sync::Arc;

/// Resource types served by the legacy schema surface.
pub fn legacy_resources() -> Vec<Arc<dyn Resource>> {
    vec![
        Arc::new(Channel),
        Arc::new(Role),
        Arc::new(RoleEveryone),
        Arc::new(Message),
        Arc::new(Ban),
        Arc::new(Invite),
        Arc::new(Webhook),
        Arc::new(Emoji),
        Arc::new(ChannelPermission),
        Arc::new(ChannelPermissions),
        Arc::new(ChannelOrder),
        Arc::new(RoleOrder),
        Arc::new(MemberRoles),
        Arc::new(WidgetSettings),
        Arc::new(WelcomeScreen),
        Arc::new(SystemChannel),
        Arc::new(GuildSettings),
    ]
}

/// Resource types served by the framework surface.
pub fn framework_resources() -> Vec<Arc<dyn Resource>> {
    vec![
        Arc::new(Sticker),
        Arc::new(ScheduledEvent),
        Arc::new(SoundboardSound),
        Arc::new(Thread),
        Arc::new(ThreadMember),
        Arc::new(StageInstance),
        Arc::new(GuildTemplate),
        Arc::new(GuildTemplateSync),
        Arc::new(Onboarding),
        Arc::new(MemberVerification),
        Arc::new(AutomodRule),
        Arc::new(ApiResource),
    ]
}

/// Data sources served by the legacy surface.
pub fn legacy_data_sources() -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(datasource::ColorData),
        Arc::new(datasource::LocalImageData),
        Arc::new(datasource::PermissionData),
        Arc::new(datasource::RoleData),
        Arc::new(datasource::ChannelData),
        Arc::new(datasource::ServerData),
        Arc::new(datasource::MemberData),
    ]
}

/// Data sources served by the framework surface.
pub fn framework_data_sources() -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(datasource::EmojiListData),
        Arc::new(datasource::StickerListData),
        Arc::new(datasource::SoundboardListData),
        Arc::new(datasource::ThreadMemberListData),
        Arc::new(datasource::ApiRequestData),
    ]
}
