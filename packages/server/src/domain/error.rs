//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクト生成時の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{kind} id must be positive (got {value})")]
    NonPositiveId { kind: &'static str, value: i64 },

    #[error("{kind} id '{raw}' is not a number")]
    MalformedId { kind: &'static str, raw: String },

    #[error("message content must not be empty")]
    EmptyMessageContent,

    #[error("message content exceeds {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },

    #[error("unknown message type '{0}'")]
    UnknownMessageKind(String),

    #[error("unknown room role '{0}'")]
    UnknownRoomRole(String),

    #[error("unknown presence status '{0}'")]
    UnknownPresenceStatus(String),

    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("room name exceeds {max} characters (got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },

    #[error("page number must start at 1 (got {0})")]
    InvalidPage(u32),

    #[error("page size must be between 1 and {max} (got {actual})")]
    InvalidPageSize { max: u32, actual: u32 },
}

/// 永続化コラボレーター（ストア）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 参照先（ユーザー、ルーム、メッセージ）が存在しない、または削除済み
    #[error("{0} not found")]
    NotFound(String),

    /// 書き込みが反映されなかった
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

/// メッセージ送信（接続へのプッシュ）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    EncodeFailed(String),
}
