//! Repository trait 定義（永続化コラボレーター）
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 採番と時刻
//!
//! メッセージ ID・送信時刻・参加時刻・最終アクティブ時刻はすべてストアが
//! 書き込み時に割り当てます。クライアントが送ってきた時刻は使いません。

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{
    entity::{
        ChatMessage, ChatRoom, DirectMessage, NewChatRoom, PresenceStatus, RoomRole, UserProfile,
    },
    error::RepositoryError,
    value_object::{MessageContent, MessageId, MessageKind, Page, RoomId, UserId},
};

/// ユーザープロフィールのストア
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// プロフィールを取得（削除済み・不明なユーザーは NotFound）
    async fn get_profile(&self, user_id: UserId) -> Result<UserProfile, RepositoryError>;

    /// オンライン状態を保存し、最終アクティブ時刻を更新
    async fn update_status(
        &self,
        user_id: UserId,
        status: PresenceStatus,
    ) -> Result<(), RepositoryError>;
}

/// フレンド関係のストア
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FriendStore: Send + Sync {
    /// 承認済みフレンドのユーザー ID 一覧
    async fn get_accepted_friends(&self, user_id: UserId) -> Result<Vec<UserId>, RepositoryError>;
}

/// チャットルームのストア
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// ルームを作成し、作成者を admin として同時に登録
    async fn create_room(
        &self,
        creator_id: UserId,
        room: NewChatRoom,
    ) -> Result<ChatRoom, RepositoryError>;

    /// ルームを取得（存在しない・削除済みは NotFound）
    async fn get_room(&self, room_id: RoomId) -> Result<ChatRoom, RepositoryError>;

    /// ユーザーから見えるルーム一覧（参加中または公開、新しい順）
    async fn list_rooms_visible_to(&self, user_id: UserId)
    -> Result<Vec<ChatRoom>, RepositoryError>;
}

/// ルームメンバーシップのストア
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn is_member(&self, room_id: RoomId, user_id: UserId) -> Result<bool, RepositoryError>;

    /// メンバーを追加（既にメンバーなら行を増やさず `Ok(false)`）
    async fn add_member(
        &self,
        room_id: RoomId,
        user_id: UserId,
        role: RoomRole,
    ) -> Result<bool, RepositoryError>;

    /// メンバーを削除（メンバーでなければ `Ok(false)`）
    async fn remove_member(&self, room_id: RoomId, user_id: UserId)
    -> Result<bool, RepositoryError>;

    async fn count_members(&self, room_id: RoomId) -> Result<usize, RepositoryError>;

    /// ユーザーが参加しているルーム ID 一覧
    async fn rooms_of(&self, user_id: UserId) -> Result<Vec<RoomId>, RepositoryError>;
}

/// メッセージのストア
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// ルームメッセージを保存（ID と送信時刻をここで割り当てる）
    async fn insert_room_message(
        &self,
        room_id: RoomId,
        sender_id: UserId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<ChatMessage, RepositoryError>;

    /// ダイレクトメッセージを保存（ID と送信時刻をここで割り当てる）
    async fn insert_direct_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<DirectMessage, RepositoryError>;

    /// 受信者本人が既読にする（対象が無ければ `Ok(false)`）
    async fn mark_read(
        &self,
        message_id: MessageId,
        reader_id: UserId,
    ) -> Result<bool, RepositoryError>;

    /// ルームの履歴（削除済みを除く、新しい順）
    async fn room_messages(
        &self,
        room_id: RoomId,
        page: Page,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// 2 ユーザー間の DM 履歴（双方向、削除済みを除く、新しい順）
    async fn direct_messages(
        &self,
        user_id: UserId,
        other_id: UserId,
        page: Page,
    ) -> Result<Vec<DirectMessage>, RepositoryError>;
}
