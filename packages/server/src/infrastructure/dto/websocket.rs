//! WebSocket frame DTOs.
//!
//! Inbound frames are JSON objects tagged by `"type"`. Outbound frames are
//! `{"event": <name>, "data": <payload>}`. Times are RFC 3339 strings in UTC.

use serde::{Deserialize, Serialize};

/// Inbound invocation sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Invocation {
    SendMessage {
        #[serde(alias = "chatRoomId")]
        room_id: i64,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_type: Option<String>,
    },
    SendDirectMessage {
        receiver_id: i64,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_type: Option<String>,
    },
    JoinRoom {
        room_id: i64,
    },
    LeaveRoom {
        room_id: i64,
    },
    MarkMessageAsRead {
        message_id: i64,
    },
    UserTyping {
        room_id: i64,
        is_typing: bool,
    },
}

impl Invocation {
    /// Wire name of the invocation (the `type` tag)
    pub fn name(&self) -> &'static str {
        match self {
            Invocation::SendMessage { .. } => "sendMessage",
            Invocation::SendDirectMessage { .. } => "sendDirectMessage",
            Invocation::JoinRoom { .. } => "joinRoom",
            Invocation::LeaveRoom { .. } => "leaveRoom",
            Invocation::MarkMessageAsRead { .. } => "markMessageAsRead",
            Invocation::UserTyping { .. } => "userTyping",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    pub id: i64,
    pub username: String,
    pub avatar: String,
    pub status: String,
    pub last_active: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessageDto {
    pub id: i64,
    pub room_id: i64,
    pub sender: UserProfileDto,
    pub content: String,
    pub message_type: String,
    pub sent_at: String,
    pub is_edited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessageDto {
    pub id: i64,
    pub sender: UserProfileDto,
    pub receiver: UserProfileDto,
    pub content: String,
    pub message_type: String,
    pub sent_at: String,
    pub is_read: bool,
    pub is_edited: bool,
}

/// Payload of `UserJoinedRoom` / `UserLeftRoom`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMemberChangeDto {
    pub room_id: i64,
    pub user: UserProfileDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStatusDto {
    pub room_id: i64,
    pub user: UserProfileDto,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineStatusDto {
    pub user: UserProfileDto,
    pub is_online: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationFailedDto {
    pub invocation: String,
    pub reason: String,
}

/// Outbound event frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundEvent {
    ReceiveMessage(RoomMessageDto),
    ReceiveDirectMessage(DirectMessageDto),
    UserJoinedRoom(RoomMemberChangeDto),
    UserLeftRoom(RoomMemberChangeDto),
    UserTypingStatus(TypingStatusDto),
    UserOnlineStatus(OnlineStatusDto),
    InvocationFailed(InvocationFailedDto),
}
