//! 購読者へ配信するイベント

use super::{
    entity::{EnrichedDirectMessage, EnrichedRoomMessage, UserProfile},
    value_object::RoomId,
};

/// サーバーから接続へ配信されるイベント
///
/// ワイヤ上の表現は Infrastructure 層の DTO が決める。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    ReceiveMessage(EnrichedRoomMessage),
    ReceiveDirectMessage(EnrichedDirectMessage),
    UserJoinedRoom {
        room_id: RoomId,
        user: UserProfile,
    },
    UserLeftRoom {
        room_id: RoomId,
        user: UserProfile,
    },
    UserTypingStatus {
        room_id: RoomId,
        user: UserProfile,
        is_typing: bool,
    },
    UserOnlineStatus {
        user: UserProfile,
        is_online: bool,
    },
    /// リクエスト・レスポンス型の呼び出しが失敗したことを呼び出し元だけに伝える
    InvocationFailed {
        invocation: String,
        reason: String,
    },
}

impl ServerEvent {
    /// イベント名
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::ReceiveMessage(_) => "ReceiveMessage",
            ServerEvent::ReceiveDirectMessage(_) => "ReceiveDirectMessage",
            ServerEvent::UserJoinedRoom { .. } => "UserJoinedRoom",
            ServerEvent::UserLeftRoom { .. } => "UserLeftRoom",
            ServerEvent::UserTypingStatus { .. } => "UserTypingStatus",
            ServerEvent::UserOnlineStatus { .. } => "UserOnlineStatus",
            ServerEvent::InvocationFailed { .. } => "InvocationFailed",
        }
    }
}
