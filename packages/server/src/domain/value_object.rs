//! 値オブジェクト（Value Object）
//!
//! 境界で検証済みの値だけがドメイン層に入るよう、生の値はここで型に包みます。
//! 不正な値は `ValueObjectError` として境界で拒否されます。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// メッセージ本文の最大文字数
pub const MESSAGE_CONTENT_MAX_CHARS: usize = 4000;

/// ルーム名の最大文字数
pub const ROOM_NAME_MAX_CHARS: usize = 100;

/// 1 ページあたりの最大件数
pub const PAGE_SIZE_MAX: u32 = 100;

/// 1 ページあたりのデフォルト件数
pub const PAGE_SIZE_DEFAULT: u32 = 50;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// 正の整数から生成する
            pub fn new(value: i64) -> Result<Self, ValueObjectError> {
                if value <= 0 {
                    return Err(ValueObjectError::NonPositiveId {
                        kind: $label,
                        value,
                    });
                }
                Ok(Self(value))
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ValueObjectError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = ValueObjectError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ValueObjectError::MalformedId {
                        kind: $label,
                        raw: s.to_string(),
                    })?;
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// 認証済みユーザーの識別子（外部で認証済み）
    UserId,
    "user"
);
numeric_id!(
    /// チャットルームの識別子
    RoomId,
    "room"
);
numeric_id!(
    /// メッセージの識別子（永続化時にサーバーが採番する）
    MessageId,
    "message"
);

/// トランスポート接続 1 本ごとの識別子
///
/// 接続時に生成され、切断までの間だけ有効。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// 新しい ConnectionId を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ブロードキャスト先のグループ
///
/// `user:<id>` は DM とプレゼンス通知、`room:<id>` はルームチャットに使う。
/// 名前空間が列挙子で分かれているため衝突しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    User(UserId),
    Room(RoomId),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::User(id) => write!(f, "user:{}", id),
            GroupKey::Room(id) => write!(f, "room:{}", id),
        }
    }
}

/// メッセージ本文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageContent(String);

impl MessageContent {
    /// 空白のみ、または上限文字数を超える本文は拒否する
    pub fn new(content: String) -> Result<Self, ValueObjectError> {
        if content.trim().is_empty() {
            return Err(ValueObjectError::EmptyMessageContent);
        }
        let chars = content.chars().count();
        if chars > MESSAGE_CONTENT_MAX_CHARS {
            return Err(ValueObjectError::MessageContentTooLong {
                max: MESSAGE_CONTENT_MAX_CHARS,
                actual: chars,
            });
        }
        Ok(Self(content))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// メッセージ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    System,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::System => "system",
        }
    }
}

impl FromStr for MessageKind {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "system" => Ok(MessageKind::System),
            other => Err(ValueObjectError::UnknownMessageKind(other.to_string())),
        }
    }
}

/// ルーム名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyRoomName);
        }
        let chars = trimmed.chars().count();
        if chars > ROOM_NAME_MAX_CHARS {
            return Err(ValueObjectError::RoomNameTooLong {
                max: ROOM_NAME_MAX_CHARS,
                actual: chars,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix タイムスタンプ（ミリ秒、UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 履歴取得のページ指定（1 始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Result<Self, ValueObjectError> {
        if number == 0 {
            return Err(ValueObjectError::InvalidPage(number));
        }
        if size == 0 || size > PAGE_SIZE_MAX {
            return Err(ValueObjectError::InvalidPageSize {
                max: PAGE_SIZE_MAX,
                actual: size,
            });
        }
        Ok(Self { number, size })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// 先頭からスキップする件数
    pub fn offset(&self) -> usize {
        (self.number as usize - 1) * self.size as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: PAGE_SIZE_DEFAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_non_positive_values() {
        // テスト項目: 0 以下の UserId は拒否される
        // given (前提条件):
        let zero = 0;
        let negative = -5;

        // when (操作):
        let zero_result = UserId::new(zero);
        let negative_result = UserId::new(negative);

        // then (期待する結果):
        assert!(matches!(
            zero_result,
            Err(ValueObjectError::NonPositiveId { kind: "user", .. })
        ));
        assert!(negative_result.is_err());
        assert_eq!(UserId::new(42).unwrap().value(), 42);
    }

    #[test]
    fn test_room_id_from_str() {
        // テスト項目: 文字列から RoomId をパースでき、数値以外は拒否される
        // given (前提条件):
        let valid = " 7 ";
        let invalid = "seven";

        // when (操作):
        let parsed = valid.parse::<RoomId>();
        let rejected = invalid.parse::<RoomId>();

        // then (期待する結果):
        assert_eq!(parsed.unwrap(), RoomId::new(7).unwrap());
        assert!(matches!(
            rejected,
            Err(ValueObjectError::MalformedId { kind: "room", .. })
        ));
    }

    #[test]
    fn test_group_key_namespaces_do_not_collide() {
        // テスト項目: 同じ数値でも user と room のグループキーは区別される
        // given (前提条件):
        let user_group = GroupKey::User(UserId::new(1).unwrap());
        let room_group = GroupKey::Room(RoomId::new(1).unwrap());

        // when (操作):
        let user_label = user_group.to_string();
        let room_label = room_group.to_string();

        // then (期待する結果):
        assert_ne!(user_group, room_group);
        assert_eq!(user_label, "user:1");
        assert_eq!(room_label, "room:1");
    }

    #[test]
    fn test_message_content_validation() {
        // テスト項目: 空白のみ・上限超過の本文は拒否される
        // given (前提条件):
        let blank = "   ".to_string();
        let too_long = "a".repeat(MESSAGE_CONTENT_MAX_CHARS + 1);
        let exact = "a".repeat(MESSAGE_CONTENT_MAX_CHARS);

        // when (操作):
        let blank_result = MessageContent::new(blank);
        let too_long_result = MessageContent::new(too_long);
        let exact_result = MessageContent::new(exact);

        // then (期待する結果):
        assert_eq!(blank_result, Err(ValueObjectError::EmptyMessageContent));
        assert!(matches!(
            too_long_result,
            Err(ValueObjectError::MessageContentTooLong { .. })
        ));
        assert!(exact_result.is_ok());
    }

    #[test]
    fn test_message_kind_is_a_closed_set() {
        // テスト項目: text / image / system 以外の種別は拒否される
        // given (前提条件):
        let inputs = ["text", "image", "system", "video"];

        // when (操作):
        let results: Vec<_> = inputs.iter().map(|s| s.parse::<MessageKind>()).collect();

        // then (期待する結果):
        assert_eq!(results[0], Ok(MessageKind::Text));
        assert_eq!(results[1], Ok(MessageKind::Image));
        assert_eq!(results[2], Ok(MessageKind::System));
        assert_eq!(
            results[3],
            Err(ValueObjectError::UnknownMessageKind("video".to_string()))
        );
    }

    #[test]
    fn test_room_name_is_trimmed() {
        // テスト項目: ルーム名は前後の空白が除去され、空なら拒否される
        // given (前提条件):
        let padded = "  lobby  ".to_string();

        // when (操作):
        let name = RoomName::new(padded).unwrap();

        // then (期待する結果):
        assert_eq!(name.as_str(), "lobby");
        assert_eq!(
            RoomName::new("  ".to_string()),
            Err(ValueObjectError::EmptyRoomName)
        );
    }

    #[test]
    fn test_page_offset_and_bounds() {
        // テスト項目: ページ番号から正しいオフセットが計算され、範囲外は拒否される
        // given (前提条件):
        let page = Page::new(3, 20).unwrap();

        // when (操作):
        let offset = page.offset();

        // then (期待する結果):
        assert_eq!(offset, 40);
        assert!(Page::new(0, 20).is_err());
        assert!(Page::new(1, 0).is_err());
        assert!(Page::new(1, PAGE_SIZE_MAX + 1).is_err());
        assert_eq!(Page::default().size(), PAGE_SIZE_DEFAULT);
    }
}
