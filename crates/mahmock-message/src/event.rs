// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform event records pushed to bot clients.
//!
//! These are plain data: they carry no behavior and are validated only by
//! their own serde shapes. The gateway pushes them as the `data` of a frame
//! with the push sync id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::MessageChain;

/// Member role inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Owner,
    Administrator,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: i64,
    pub nickname: String,
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub permission: Permission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub member_name: String,
    pub permission: Permission,
    pub group: Group,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_title: Option<String>,
}

/// Whether a member gained or lost a group honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HonorAction {
    Achieve,
    Lose,
}

/// What a nudge was aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NudgeSubject {
    pub id: i64,
    /// `Friend` or `Group`.
    pub kind: String,
}

/// Events and inbound messages, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    FriendMessage {
        message_chain: MessageChain,
        sender: Friend,
    },
    GroupMessage {
        message_chain: MessageChain,
        sender: Member,
    },
    TempMessage {
        message_chain: MessageChain,
        sender: Member,
    },
    BotOnlineEvent {
        qq: i64,
    },
    BotOfflineEventActive {
        qq: i64,
    },
    BotOfflineEventForce {
        qq: i64,
    },
    BotOfflineEventDropped {
        qq: i64,
    },
    BotReloginEvent {
        qq: i64,
    },
    FriendInputStatusChangedEvent {
        friend: Friend,
        inputting: bool,
    },
    FriendNickChangedEvent {
        friend: Friend,
        #[serde(rename = "from")]
        from_nick: String,
        to: String,
    },
    FriendRecallEvent {
        author_id: i64,
        message_id: i64,
        time: i64,
        operator: i64,
    },
    GroupRecallEvent {
        author_id: i64,
        message_id: i64,
        time: i64,
        group: Group,
        operator: Option<Member>,
    },
    BotGroupPermissionChangeEvent {
        origin: Permission,
        current: Permission,
        group: Group,
    },
    BotMuteEvent {
        duration_seconds: i64,
        operator: Member,
    },
    BotUnmuteEvent {
        operator: Member,
    },
    BotJoinGroupEvent {
        group: Group,
        invitor: Option<Member>,
    },
    BotLeaveEventActive {
        group: Group,
    },
    BotLeaveEventKick {
        group: Group,
        operator: Member,
    },
    GroupNameChangeEvent {
        origin: String,
        current: String,
        group: Group,
        operator: Option<Member>,
    },
    GroupEntranceAnnouncementChangeEvent {
        origin: String,
        current: String,
        group: Group,
        operator: Option<Member>,
    },
    GroupMuteAllEvent {
        origin: bool,
        current: bool,
        group: Group,
        operator: Option<Member>,
    },
    GroupAllowAnonymousChatEvent {
        origin: bool,
        current: bool,
        group: Group,
        operator: Option<Member>,
    },
    GroupAllowConfessTalkEvent {
        origin: bool,
        current: bool,
        group: Group,
    },
    GroupAllowMemberInviteEvent {
        origin: bool,
        current: bool,
        group: Group,
        operator: Option<Member>,
    },
    MemberJoinEvent {
        member: Member,
        invitor: Option<Member>,
    },
    MemberLeaveEventQuit {
        member: Member,
    },
    MemberLeaveEventKick {
        member: Member,
        operator: Option<Member>,
    },
    MemberCardChangeEvent {
        origin: String,
        current: String,
        member: Member,
    },
    MemberSpecialTitleChangeEvent {
        origin: String,
        current: String,
        member: Member,
    },
    MemberPermissionChangeEvent {
        origin: Permission,
        current: Permission,
        member: Member,
    },
    MemberMuteEvent {
        duration_seconds: i64,
        member: Member,
        operator: Option<Member>,
    },
    MemberUnmuteEvent {
        member: Member,
        operator: Option<Member>,
    },
    MemberHonorChangeEvent {
        member: Member,
        action: HonorAction,
        honor: String,
    },
    CommandExecutedEvent {
        name: String,
        friend: Option<Friend>,
        member: Option<Member>,
        args: Vec<Value>,
    },
    NudgeEvent {
        from_id: i64,
        subject: NudgeSubject,
        action: String,
        suffix: String,
        target: i64,
    },
    NewFriendRequestEvent {
        event_id: i64,
        from_id: i64,
        group_id: i64,
        nick: String,
        message: String,
    },
    MemberJoinRequestEvent {
        event_id: i64,
        from_id: i64,
        group_id: i64,
        group_name: String,
        nick: String,
        message: String,
    },
    BotInvitedJoinGroupRequestEvent {
        event_id: i64,
        from_id: i64,
        group_id: i64,
        group_name: String,
        nick: String,
        message: String,
    },
}

impl Event {
    /// The `type` discriminator of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::FriendMessage { .. } => "FriendMessage",
            Event::GroupMessage { .. } => "GroupMessage",
            Event::TempMessage { .. } => "TempMessage",
            Event::BotOnlineEvent { .. } => "BotOnlineEvent",
            Event::BotOfflineEventActive { .. } => "BotOfflineEventActive",
            Event::BotOfflineEventForce { .. } => "BotOfflineEventForce",
            Event::BotOfflineEventDropped { .. } => "BotOfflineEventDropped",
            Event::BotReloginEvent { .. } => "BotReloginEvent",
            Event::FriendInputStatusChangedEvent { .. } => "FriendInputStatusChangedEvent",
            Event::FriendNickChangedEvent { .. } => "FriendNickChangedEvent",
            Event::FriendRecallEvent { .. } => "FriendRecallEvent",
            Event::GroupRecallEvent { .. } => "GroupRecallEvent",
            Event::BotGroupPermissionChangeEvent { .. } => "BotGroupPermissionChangeEvent",
            Event::BotMuteEvent { .. } => "BotMuteEvent",
            Event::BotUnmuteEvent { .. } => "BotUnmuteEvent",
            Event::BotJoinGroupEvent { .. } => "BotJoinGroupEvent",
            Event::BotLeaveEventActive { .. } => "BotLeaveEventActive",
            Event::BotLeaveEventKick { .. } => "BotLeaveEventKick",
            Event::GroupNameChangeEvent { .. } => "GroupNameChangeEvent",
            Event::GroupEntranceAnnouncementChangeEvent { .. } => {
                "GroupEntranceAnnouncementChangeEvent"
            }
            Event::GroupMuteAllEvent { .. } => "GroupMuteAllEvent",
            Event::GroupAllowAnonymousChatEvent { .. } => "GroupAllowAnonymousChatEvent",
            Event::GroupAllowConfessTalkEvent { .. } => "GroupAllowConfessTalkEvent",
            Event::GroupAllowMemberInviteEvent { .. } => "GroupAllowMemberInviteEvent",
            Event::MemberJoinEvent { .. } => "MemberJoinEvent",
            Event::MemberLeaveEventQuit { .. } => "MemberLeaveEventQuit",
            Event::MemberLeaveEventKick { .. } => "MemberLeaveEventKick",
            Event::MemberCardChangeEvent { .. } => "MemberCardChangeEvent",
            Event::MemberSpecialTitleChangeEvent { .. } => "MemberSpecialTitleChangeEvent",
            Event::MemberPermissionChangeEvent { .. } => "MemberPermissionChangeEvent",
            Event::MemberMuteEvent { .. } => "MemberMuteEvent",
            Event::MemberUnmuteEvent { .. } => "MemberUnmuteEvent",
            Event::MemberHonorChangeEvent { .. } => "MemberHonorChangeEvent",
            Event::CommandExecutedEvent { .. } => "CommandExecutedEvent",
            Event::NudgeEvent { .. } => "NudgeEvent",
            Event::NewFriendRequestEvent { .. } => "NewFriendRequestEvent",
            Event::MemberJoinRequestEvent { .. } => "MemberJoinRequestEvent",
            Event::BotInvitedJoinGroupRequestEvent { .. } => "BotInvitedJoinGroupRequestEvent",
        }
    }

    /// The message chain, for the three message-carrying kinds.
    pub fn message_chain(&self) -> Option<&MessageChain> {
        match self {
            Event::FriendMessage { message_chain, .. }
            | Event::GroupMessage { message_chain, .. }
            | Event::TempMessage { message_chain, .. } => Some(message_chain),
            _ => None,
        }
    }
}
