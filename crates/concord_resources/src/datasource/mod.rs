//! Read-only data sources.
//!
//! Local sources (`discord_color`, `discord_local_image`,
//! `discord_permission`) compute their result without touching the API;
//! the rest resolve lookups through the shared transport.

mod api_request;
mod channel;
mod color;
mod lists;
mod local_image;
mod member;
mod permission;
mod role;
mod server;

pub use api_request::ApiRequestData;
pub use channel::ChannelData;
pub use color::ColorData;
pub use lists::{EmojiListData, SoundboardListData, StickerListData, ThreadMemberListData};
pub use local_image::LocalImageData;
pub use member::MemberData;
pub use permission::PermissionData;
pub use role::RoleData;
pub use server::ServerData;
