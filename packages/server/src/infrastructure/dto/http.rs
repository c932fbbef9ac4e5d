//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::UserProfileDto;

/// Room summary/detail returned by the room endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub members_count: usize,
    pub created_at: String,
    pub creator: UserProfileDto,
    pub is_private: bool,
}

/// Body of `POST /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

/// Paging query for the history endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Result of join/leave over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipChangeDto {
    pub room_id: i64,
    pub user_id: i64,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDto {
    pub user_id: i64,
    pub is_online: bool,
    pub live_connections: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_room_request_defaults() {
        // テスト項目: name 以外のフィールドは省略できる
        // given (前提条件):
        let json = r#"{"name":"lobby"}"#;

        // when (操作):
        let request: CreateRoomRequest = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(request.name, "lobby");
        assert_eq!(request.description, "");
        assert_eq!(request.image, None);
        assert!(!request.is_private);
    }
}
