//! 接続から届く呼び出し（検証済み）

use super::value_object::{MessageContent, MessageId, MessageKind, RoomId, UserId};

/// 認証済み接続からの呼び出し
///
/// 境界で値オブジェクトへの変換が済んだものだけがこの型になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    SendMessage {
        room_id: RoomId,
        content: MessageContent,
        kind: MessageKind,
    },
    SendDirectMessage {
        receiver_id: UserId,
        content: MessageContent,
        kind: MessageKind,
    },
    JoinRoom {
        room_id: RoomId,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    MarkMessageAsRead {
        message_id: MessageId,
    },
    UserTyping {
        room_id: RoomId,
        is_typing: bool,
    },
}

impl ChatCommand {
    /// 呼び出し名（ワイヤ上の `type` と同じ）
    pub fn name(&self) -> &'static str {
        match self {
            ChatCommand::SendMessage { .. } => "sendMessage",
            ChatCommand::SendDirectMessage { .. } => "sendDirectMessage",
            ChatCommand::JoinRoom { .. } => "joinRoom",
            ChatCommand::LeaveRoom { .. } => "leaveRoom",
            ChatCommand::MarkMessageAsRead { .. } => "markMessageAsRead",
            ChatCommand::UserTyping { .. } => "userTyping",
        }
    }
}
