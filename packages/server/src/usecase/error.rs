//! UseCase 層のエラー型
//!
//! ストアの `RepositoryError` を各ユースケースの呼び出し元が扱える形に
//! 写像します。NotFound はどの参照が欠けたかで分け、それ以外は
//! PersistenceFailure にまとめます。

use thiserror::Error;

use crate::domain::{RepositoryError, RoomId, UserId};

/// プレゼンス遷移の失敗（接続自体は失敗させない）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendRoomMessageError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// メンバーでない送信は黙って捨てる（呼び出し元へは返さない）
    #[error("user {user_id} is not a member of room {room_id}")]
    NotAMember { room_id: RoomId, user_id: UserId },

    #[error("sender {0} not found")]
    SenderNotFound(UserId),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendDirectMessageError {
    #[error("sender {0} not found")]
    SenderNotFound(UserId),

    #[error("receiver {0} not found")]
    ReceiverNotFound(UserId),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("creator {0} not found")]
    CreatorNotFound(UserId),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("room {0} is private")]
    PrivateRoom(RoomId),

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaveRoomError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("user {user_id} is not a member of room {room_id}")]
    NotAMember { room_id: RoomId, user_id: UserId },

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkReadError {
    #[error("message not found")]
    MessageNotFound,

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypingError {
    #[error("user {user_id} is not a member of room {room_id}")]
    NotAMember { room_id: RoomId, user_id: UserId },

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("repository error: {0}")]
    RepositoryError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("repository error: {0}")]
    RepositoryError(String),
}

/// NotFound を `not_found` に、それ以外を PersistenceFailure 相当に写像する
pub(crate) fn classify<E>(
    error: RepositoryError,
    not_found: E,
    failure: impl FnOnce(String) -> E,
) -> E {
    match error {
        RepositoryError::NotFound(_) => not_found,
        RepositoryError::PersistenceFailure(reason) => failure(reason),
    }
}
