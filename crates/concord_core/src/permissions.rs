//! The 64-bit Discord permission algebra.
//!
//! Permission fields cross the wire as decimal strings. State carries both
//! the string form (authoritative) and a platform-sized integer that is a
//! best-effort convenience: the value when it fits in an i32, else 0.

use concord_error::ValidationError;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// A named Discord permission bit.
///
/// Aliases (`manage_guild_expressions`/`manage_emojis`,
/// `start_embedded_activities`) parse to the same variant and therefore the
/// identical bit offset.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use concord_core::Permission;
///
/// assert_eq!(Permission::from_str("connect").unwrap().bit(), 1 << 20);
/// assert_eq!(
///     Permission::from_str("manage_emojis").unwrap(),
///     Permission::ManageExpressions,
/// );
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr, derive_more::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Permission {
    /// Create invites (bit 0).
    CreateInstantInvite,
    /// Kick members (bit 1).
    KickMembers,
    /// Ban members (bit 2).
    BanMembers,
    /// All permissions, bypassing overwrites (bit 3).
    Administrator,
    /// Manage and edit channels (bit 4).
    ManageChannels,
    /// Manage guild settings (bit 5).
    ManageGuild,
    /// Add reactions to messages (bit 6).
    AddReactions,
    /// View the audit log (bit 7).
    ViewAuditLog,
    /// Priority speaker in voice (bit 8).
    PrioritySpeaker,
    /// Go live (bit 9).
    Stream,
    /// View channels (bit 10).
    ViewChannel,
    /// Send messages (bit 11).
    SendMessages,
    /// Send text-to-speech messages (bit 12).
    SendTtsMessages,
    /// Delete and pin others' messages (bit 13).
    ManageMessages,
    /// Embed links (bit 14).
    EmbedLinks,
    /// Attach files (bit 15).
    AttachFiles,
    /// Read message history (bit 16).
    ReadMessageHistory,
    /// Mention @everyone and all roles (bit 17).
    MentionEveryone,
    /// Use emojis from other servers (bit 18).
    UseExternalEmojis,
    /// View guild insights (bit 19).
    ViewGuildInsights,
    /// Connect to voice (bit 20).
    Connect,
    /// Speak in voice (bit 21).
    Speak,
    /// Mute members in voice (bit 22).
    MuteMembers,
    /// Deafen members in voice (bit 23).
    DeafenMembers,
    /// Move members between voice channels (bit 24).
    MoveMembers,
    /// Use voice activity detection (bit 25).
    UseVad,
    /// Change own nickname (bit 26).
    ChangeNickname,
    /// Manage others' nicknames (bit 27).
    ManageNicknames,
    /// Manage roles and overwrites (bit 28).
    ManageRoles,
    /// Manage webhooks (bit 29).
    ManageWebhooks,
    /// Manage expressions: emojis, stickers, sounds (bit 30).
    #[strum(
        serialize = "manage_expressions",
        serialize = "manage_guild_expressions",
        serialize = "manage_emojis"
    )]
    ManageExpressions,
    /// Use application commands (bit 31).
    UseApplicationCommands,
    /// Request to speak on a stage (bit 32).
    RequestToSpeak,
    /// Manage scheduled events (bit 33).
    ManageEvents,
    /// Manage threads (bit 34).
    ManageThreads,
    /// Create public threads (bit 35).
    CreatePublicThreads,
    /// Create private threads (bit 36).
    CreatePrivateThreads,
    /// Use stickers from other servers (bit 37).
    UseExternalStickers,
    /// Send messages in threads (bit 38).
    SendMessagesInThreads,
    /// Launch activities in voice channels (bit 39).
    #[strum(
        serialize = "use_embedded_activities",
        serialize = "start_embedded_activities"
    )]
    UseEmbeddedActivities,
    /// Time out members (bit 40).
    ModerateMembers,
    /// View creator monetization analytics (bit 41).
    ViewCreatorMonetizationAnalytics,
    /// Use the soundboard (bit 42).
    UseSoundboard,
    /// Create expressions (bit 43).
    CreateExpressions,
    /// Create scheduled events (bit 44).
    CreateEvents,
    /// Use sounds from other servers (bit 45).
    UseExternalSounds,
    /// Send voice messages (bit 46).
    SendVoiceMessages,
    /// Use Clyde AI (bit 47).
    UseClydeAi,
    /// Set voice channel status (bit 48).
    SetVoiceChannelStatus,
    /// Send polls (bit 49).
    SendPolls,
    /// Use external apps (bit 50).
    UseExternalApps,
    /// Pin messages (bit 51).
    PinMessages,
    /// Bypass channel slowmode (bit 52).
    BypassSlowmode,
}

impl Permission {
    /// Bit offset of this permission within the 64-bit set.
    pub fn offset(self) -> u8 {
        match self {
            Self::CreateInstantInvite => 0,
            Self::KickMembers => 1,
            Self::BanMembers => 2,
            Self::Administrator => 3,
            Self::ManageChannels => 4,
            Self::ManageGuild => 5,
            Self::AddReactions => 6,
            Self::ViewAuditLog => 7,
            Self::PrioritySpeaker => 8,
            Self::Stream => 9,
            Self::ViewChannel => 10,
            Self::SendMessages => 11,
            Self::SendTtsMessages => 12,
            Self::ManageMessages => 13,
            Self::EmbedLinks => 14,
            Self::AttachFiles => 15,
            Self::ReadMessageHistory => 16,
            Self::MentionEveryone => 17,
            Self::UseExternalEmojis => 18,
            Self::ViewGuildInsights => 19,
            Self::Connect => 20,
            Self::Speak => 21,
            Self::MuteMembers => 22,
            Self::DeafenMembers => 23,
            Self::MoveMembers => 24,
            Self::UseVad => 25,
            Self::ChangeNickname => 26,
            Self::ManageNicknames => 27,
            Self::ManageRoles => 28,
            Self::ManageWebhooks => 29,
            Self::ManageExpressions => 30,
            Self::UseApplicationCommands => 31,
            Self::RequestToSpeak => 32,
            Self::ManageEvents => 33,
            Self::ManageThreads => 34,
            Self::CreatePublicThreads => 35,
            Self::CreatePrivateThreads => 36,
            Self::UseExternalStickers => 37,
            Self::SendMessagesInThreads => 38,
            Self::UseEmbeddedActivities => 39,
            Self::ModerateMembers => 40,
            Self::ViewCreatorMonetizationAnalytics => 41,
            Self::UseSoundboard => 42,
            Self::CreateExpressions => 43,
            Self::CreateEvents => 44,
            Self::UseExternalSounds => 45,
            Self::SendVoiceMessages => 46,
            Self::UseClydeAi => 47,
            Self::SetVoiceChannelStatus => 48,
            Self::SendPolls => 49,
            Self::UseExternalApps => 50,
            Self::PinMessages => 51,
            Self::BypassSlowmode => 52,
        }
    }

    /// The single-bit mask for this permission.
    pub fn bit(self) -> u64 {
        1u64 << self.offset()
    }

    /// Every named permission, in offset order.
    pub fn all() -> impl Iterator<Item = Permission> {
        Permission::iter()
    }
}

/// Three-valued per-permission choice in an overwrite or role schema.
///
/// `Unset` contributes to neither mask.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    AsRefStr,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PermissionChoice {
    /// The bit joins the allow mask.
    Allow,
    /// The bit joins the deny mask.
    Deny,
    /// The bit joins neither mask.
    #[default]
    Unset,
}

/// A 64-bit unsigned permission bitset.
///
/// # Examples
///
/// ```
/// use concord_core::{Permission, PermissionSet};
///
/// let set = PermissionSet::from_decimal("permissions", "3145728").unwrap();
/// assert!(set.contains(Permission::Connect));
/// assert!(set.contains(Permission::Speak));
/// assert_eq!(set.to_decimal(), "3145728");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PermissionSet(u64);

impl PermissionSet {
    /// The empty set.
    pub const EMPTY: PermissionSet = PermissionSet(0);

    /// Wrap a raw bit pattern.
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Parse Discord's decimal-string wire form.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming `attribute` when the string is
    /// not an unsigned 64-bit decimal number.
    #[track_caller]
    pub fn from_decimal(attribute: &str, s: &str) -> Result<Self, ValidationError> {
        s.parse::<u64>().map(Self).map_err(|_| {
            ValidationError::new(
                attribute,
                format!("{:?} is not an unsigned 64-bit decimal", s),
            )
        })
    }

    /// Render the decimal-string wire form.
    pub fn to_decimal(self) -> String {
        self.0.to_string()
    }

    /// Raw bit pattern.
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Best-effort platform integer: the value when it fits losslessly in
    /// an i32, else 0. The decimal string stays authoritative either way.
    pub fn narrow(self) -> i64 {
        if self.0 <= i32::MAX as u64 {
            self.0 as i64
        } else {
            0
        }
    }

    /// True when the named bit is set.
    pub fn contains(self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    /// Union with another set.
    pub fn union(self, other: PermissionSet) -> PermissionSet {
        PermissionSet(self.0 | other.0)
    }

    /// Add one named bit.
    pub fn with(self, permission: Permission) -> PermissionSet {
        PermissionSet(self.0 | permission.bit())
    }

    /// Fold per-permission choices into `(allow, deny)` masks, then OR in
    /// the operator's extends bits.
    pub fn masks_from_choices(
        choices: impl IntoIterator<Item = (Permission, PermissionChoice)>,
        extend_allow: PermissionSet,
        extend_deny: PermissionSet,
    ) -> (PermissionSet, PermissionSet) {
        let mut allow = extend_allow;
        let mut deny = extend_deny;
        for (permission, choice) in choices {
            match choice {
                PermissionChoice::Allow => allow = allow.with(permission),
                PermissionChoice::Deny => deny = deny.with(permission),
                PermissionChoice::Unset => {}
            }
        }
        (allow, deny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_decimal_round_trip() {
        for s in ["0", "8", "3145728", "18446744073709551615"] {
            let set = PermissionSet::from_decimal("p", s).unwrap();
            assert_eq!(set.to_decimal(), s);
        }
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        for s in ["", "-1", "abc", "18446744073709551616"] {
            assert!(PermissionSet::from_decimal("p", s).is_err(), "{s}");
        }
    }

    #[test]
    fn test_narrow_overflow_reports_zero() {
        let small = PermissionSet::from_bits(i32::MAX as u64);
        assert_eq!(small.narrow(), i32::MAX as i64);
        let big = PermissionSet::from_bits(i32::MAX as u64 + 1);
        assert_eq!(big.narrow(), 0);
    }

    #[test]
    fn test_aliases_share_an_offset() {
        let canonical = Permission::from_str("manage_expressions").unwrap();
        for alias in ["manage_guild_expressions", "manage_emojis"] {
            assert_eq!(Permission::from_str(alias).unwrap().offset(), canonical.offset());
        }
        assert_eq!(
            Permission::from_str("start_embedded_activities").unwrap(),
            Permission::UseEmbeddedActivities,
        );
    }

    #[test]
    fn test_offsets_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for p in Permission::all() {
            assert!(seen.insert(p.offset()), "duplicate offset for {p:?}");
        }
    }

    #[test]
    fn test_choice_masks() {
        let (allow, deny) = PermissionSet::masks_from_choices(
            [
                (Permission::Connect, PermissionChoice::Allow),
                (Permission::Speak, PermissionChoice::Deny),
                (Permission::Stream, PermissionChoice::Unset),
            ],
            PermissionSet::EMPTY,
            PermissionSet::EMPTY,
        );
        assert!(allow.contains(Permission::Connect));
        assert!(!allow.contains(Permission::Stream));
        assert!(deny.contains(Permission::Speak));
        assert!(!deny.contains(Permission::Connect));
    }

    #[test]
    fn test_extends_joins_masks() {
        let (allow, _) = PermissionSet::masks_from_choices(
            [(Permission::Connect, PermissionChoice::Allow)],
            PermissionSet::from_decimal("extends", "2048").unwrap(),
            PermissionSet::EMPTY,
        );
        assert!(allow.contains(Permission::SendMessages));
        assert!(allow.contains(Permission::Connect));
    }
}
