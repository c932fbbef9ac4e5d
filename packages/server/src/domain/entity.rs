//! エンティティ
//!
//! ルーム・メンバーシップ・メッセージは永続化コラボレーターが所有する。
//! コアはこれらを定義された操作を通じてのみ読み書きする。

use std::{fmt, str::FromStr};

use super::{
    error::ValueObjectError,
    value_object::{MessageContent, MessageId, MessageKind, RoomId, RoomName, Timestamp, UserId},
};

/// オンライン状態（2 状態のみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresenceStatus {
    Online,
    #[default]
    Offline,
}

impl PresenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Offline => "offline",
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, PresenceStatus::Online)
    }
}

impl FromStr for PresenceStatus {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(PresenceStatus::Online),
            "offline" => Ok(PresenceStatus::Offline),
            other => Err(ValueObjectError::UnknownPresenceStatus(other.to_string())),
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ルーム内の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoomRole {
    Admin,
    Moderator,
    #[default]
    Member,
}

impl RoomRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomRole::Admin => "admin",
            RoomRole::Moderator => "moderator",
            RoomRole::Member => "member",
        }
    }
}

impl FromStr for RoomRole {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(RoomRole::Admin),
            "moderator" => Ok(RoomRole::Moderator),
            "member" => Ok(RoomRole::Member),
            other => Err(ValueObjectError::UnknownRoomRole(other.to_string())),
        }
    }
}

/// 送信時点のユーザープロフィールのスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub avatar: String,
    pub status: PresenceStatus,
    pub last_active: Timestamp,
}

impl UserProfile {
    /// 削除済み・不明ユーザーの代替プロフィール
    ///
    /// 履歴表示などで送信者が既に存在しない場合に使う。
    pub fn unknown(id: UserId) -> Self {
        Self {
            id,
            username: String::new(),
            avatar: String::new(),
            status: PresenceStatus::Offline,
            last_active: Timestamp::default(),
        }
    }
}

/// チャットルーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRoom {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub creator_id: UserId,
    pub is_private: bool,
    pub is_deleted: bool,
    pub created_at: Timestamp,
}

/// ルーム作成の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatRoom {
    pub name: RoomName,
    pub description: String,
    pub image: Option<String>,
    pub is_private: bool,
}

/// メンバー数と作成者を含むルームの表示用ビュー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    pub room: ChatRoom,
    pub members_count: usize,
    pub creator: UserProfile,
}

/// ルームのメンバーシップ（ルーム上の権限の唯一の根拠）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMembership {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub role: RoomRole,
    pub joined_at: Timestamp,
}

/// ルームメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub kind: MessageKind,
    pub sent_at: Timestamp,
    pub is_edited: bool,
    pub is_deleted: bool,
}

/// ダイレクトメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMessage {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: MessageContent,
    pub kind: MessageKind,
    pub sent_at: Timestamp,
    pub is_read: bool,
    pub is_edited: bool,
    pub is_deleted: bool,
}

/// 送信者プロフィール付きのルームメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRoomMessage {
    pub message: ChatMessage,
    pub sender: UserProfile,
}

/// 送信者・受信者プロフィール付きのダイレクトメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedDirectMessage {
    pub message: DirectMessage,
    pub sender: UserProfile,
    pub receiver: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_role_is_a_closed_set() {
        // テスト項目: admin / moderator / member 以外の役割は拒否される
        // given (前提条件):
        let owner = "owner";

        // when (操作):
        let result = owner.parse::<RoomRole>();

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::UnknownRoomRole("owner".to_string()))
        );
        assert_eq!("moderator".parse::<RoomRole>(), Ok(RoomRole::Moderator));
        assert_eq!(RoomRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_presence_status_rejects_intermediate_states() {
        // テスト項目: online / offline 以外の状態は拒否される
        // given (前提条件):
        let away = "away";

        // when (操作):
        let result = away.parse::<PresenceStatus>();

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!("online".parse::<PresenceStatus>(), Ok(PresenceStatus::Online));
        assert!(!PresenceStatus::default().is_online());
    }

    #[test]
    fn test_unknown_profile_placeholder() {
        // テスト項目: 不明ユーザーの代替プロフィールはオフラインで空の表示名を持つ
        // given (前提条件):
        let id = UserId::new(9).unwrap();

        // when (操作):
        let profile = UserProfile::unknown(id);

        // then (期待する結果):
        assert_eq!(profile.id, id);
        assert!(profile.username.is_empty());
        assert_eq!(profile.status, PresenceStatus::Offline);
    }
}
