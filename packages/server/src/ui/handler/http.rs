//! HTTP API endpoint handlers.
//!
//! Every endpoint except the health check requires an authenticated user.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    domain::{NewChatRoom, Page, RoomId, RoomName, UserId},
    infrastructure::dto::{
        http::{CreateRoomRequest, HistoryQuery, MembershipChangeDto, PresenceDto, RoomDto},
        websocket::{DirectMessageDto, RoomMessageDto},
    },
    ui::state::AppState,
    usecase::{
        CreateRoomError, GetRoomDetailError, HistoryError, JoinRoomError, LeaveRoomError,
    },
};

use super::identity::AuthenticatedUser;

fn parse_path<T: std::str::FromStr>(raw: &str) -> Result<T, StatusCode>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| {
        tracing::warn!("Invalid path parameter '{}': {}", raw, e);
        StatusCode::BAD_REQUEST
    })
}

fn page_from(query: &HistoryQuery) -> Result<Page, StatusCode> {
    let default = Page::default();
    Page::new(
        query.page.unwrap_or(default.number()),
        query.page_size.unwrap_or(default.size()),
    )
    .map_err(|e| {
        tracing::warn!("Invalid page request: {}", e);
        StatusCode::BAD_REQUEST
    })
}

fn history_status(error: HistoryError) -> StatusCode {
    match error {
        HistoryError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        HistoryError::RepositoryError(e) => {
            tracing::error!("Failed to load history: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// List rooms visible to the caller (public rooms and rooms they belong to)
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<RoomDto>>, StatusCode> {
    let rooms = state.get_rooms_usecase.execute(user_id).await.map_err(|e| {
        tracing::error!("Failed to list rooms: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // Domain Model から DTO への変換
    Ok(Json(rooms.iter().map(RoomDto::from).collect()))
}

/// Create a room; the caller becomes its admin
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomDto>), StatusCode> {
    let name = RoomName::new(request.name).map_err(|e| {
        tracing::warn!("Invalid room name: {}", e);
        StatusCode::BAD_REQUEST
    })?;
    let room = NewChatRoom {
        name,
        description: request.description,
        image: request.image,
        is_private: request.is_private,
    };

    match state.create_room_usecase.execute(user_id, room).await {
        Ok(view) => Ok((StatusCode::CREATED, Json(RoomDto::from(&view)))),
        Err(CreateRoomError::CreatorNotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(CreateRoomError::PersistenceFailure(e)) => {
            tracing::error!("Failed to create room: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDto>, StatusCode> {
    let room_id: RoomId = parse_path(&room_id)?;
    match state.get_room_detail_usecase.execute(user_id, room_id).await {
        Ok(view) => Ok(Json(RoomDto::from(&view))),
        Err(GetRoomDetailError::RoomNotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(GetRoomDetailError::RepositoryError(e)) => {
            tracing::error!("Failed to get room {}: {}", room_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Room history, newest first
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(room_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<RoomMessageDto>>, StatusCode> {
    let room_id: RoomId = parse_path(&room_id)?;
    let page = page_from(&query)?;
    let messages = state
        .get_message_history_usecase
        .room_history(user_id, room_id, page)
        .await
        .map_err(history_status)?;

    Ok(Json(messages.iter().map(RoomMessageDto::from).collect()))
}

/// Direct conversation between the caller and another user, newest first
pub async fn get_direct_messages(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(other_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DirectMessageDto>>, StatusCode> {
    let other_id: UserId = parse_path(&other_id)?;
    let page = page_from(&query)?;
    let messages = state
        .get_message_history_usecase
        .direct_history(user_id, other_id, page)
        .await
        .map_err(history_status)?;

    Ok(Json(messages.iter().map(DirectMessageDto::from).collect()))
}

/// Join a room without a live connection (membership only)
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(room_id): Path<String>,
) -> Result<Json<MembershipChangeDto>, StatusCode> {
    let room_id: RoomId = parse_path(&room_id)?;
    match state.join_room_usecase.execute(user_id, room_id, None).await {
        Ok(outcome) => Ok(Json(MembershipChangeDto {
            room_id: room_id.value(),
            user_id: user_id.value(),
            changed: outcome.newly_joined,
        })),
        Err(JoinRoomError::RoomNotFound(_)) | Err(JoinRoomError::UserNotFound(_)) => {
            Err(StatusCode::NOT_FOUND)
        }
        Err(JoinRoomError::PrivateRoom(_)) => Err(StatusCode::FORBIDDEN),
        Err(JoinRoomError::PersistenceFailure(e)) => {
            tracing::error!("Failed to join room {}: {}", room_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Leave a room without a live connection
pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(room_id): Path<String>,
) -> Result<Json<MembershipChangeDto>, StatusCode> {
    let room_id: RoomId = parse_path(&room_id)?;
    match state.leave_room_usecase.execute(user_id, room_id, None).await {
        Ok(_) => Ok(Json(MembershipChangeDto {
            room_id: room_id.value(),
            user_id: user_id.value(),
            changed: true,
        })),
        Err(LeaveRoomError::RoomNotFound(_)) | Err(LeaveRoomError::UserNotFound(_)) => {
            Err(StatusCode::NOT_FOUND)
        }
        Err(LeaveRoomError::NotAMember { .. }) => Err(StatusCode::CONFLICT),
        Err(LeaveRoomError::PersistenceFailure(e)) => {
            tracing::error!("Failed to leave room {}: {}", room_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Whether a user currently holds at least one live connection
pub async fn get_presence(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(_): AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<Json<PresenceDto>, StatusCode> {
    let user_id: UserId = parse_path(&user_id)?;
    let snapshot = state.get_presence_usecase.execute(user_id).await;

    Ok(Json(PresenceDto {
        user_id: user_id.value(),
        is_online: snapshot.is_online(),
        live_connections: snapshot.live_connections,
    }))
}
