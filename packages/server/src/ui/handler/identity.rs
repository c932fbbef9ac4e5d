//! Identity extraction from the `x-user-id` header or the `user_id` query.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query},
    http::{StatusCode, request::Parts},
};
use serde::Deserialize;

use crate::{
    domain::UserId,
    infrastructure::identity::{USER_ID_HEADER, USER_ID_QUERY},
    ui::state::AppState,
};

#[derive(Debug, Default, Deserialize)]
struct IdentityQuery {
    user_id: Option<String>,
}

/// Raw credential: the header wins over the query parameter.
///
/// A header that is present but not visible ASCII is malformed, not absent.
fn credential(parts: &Parts) -> Result<Option<String>, StatusCode> {
    if let Some(value) = parts.headers.get(USER_ID_HEADER) {
        return value.to_str().map(|raw| Some(raw.to_string())).map_err(|e| {
            tracing::warn!("Rejected unreadable {} header: {}", USER_ID_HEADER, e);
            StatusCode::BAD_REQUEST
        });
    }
    Ok(Query::<IdentityQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.user_id))
}

fn resolve(parts: &Parts, state: &AppState) -> Result<Option<UserId>, StatusCode> {
    let raw = credential(parts)?;
    state.identity.resolve(raw.as_deref()).map_err(|e| {
        tracing::warn!("Rejected malformed {} / {}: {}", USER_ID_HEADER, USER_ID_QUERY, e);
        StatusCode::BAD_REQUEST
    })
}

/// Identity of the caller, or anonymous when no credential was supplied.
///
/// Rejects with 400 when a credential is present but malformed.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<UserId>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state).map(MaybeUser)
    }
}

/// Identity of the caller; HTTP endpoints require one (401 otherwise).
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match resolve(parts, state)? {
            Some(user_id) => Ok(AuthenticatedUser(user_id)),
            None => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, Request};
    use tsudoi_shared::time::FixedClock;

    use super::*;
    use crate::{bootstrap::InMemoryBackend, usecase::RoomSubscriptionMode};

    fn create_state() -> Arc<AppState> {
        let backend = InMemoryBackend::new(Arc::new(FixedClock::new(0)));
        Arc::new(backend.app_state(RoomSubscriptionMode::Explicit))
    }

    fn parts(uri: &str, header: Option<HeaderValue>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_non_ascii_header_is_rejected() {
        // テスト項目: 可視 ASCII でない x-user-id ヘッダーは匿名扱いせず 400 で拒否する
        // given (前提条件):
        let state = create_state();
        let header = HeaderValue::from_bytes(b"4\xff2").unwrap();
        let mut ws_parts = parts("/ws", Some(header.clone()));
        let mut http_parts = parts("/api/rooms", Some(header));

        // when (操作):
        let maybe = MaybeUser::from_request_parts(&mut ws_parts, &state).await;
        let authenticated = AuthenticatedUser::from_request_parts(&mut http_parts, &state).await;

        // then (期待する結果):
        assert_eq!(maybe.unwrap_err(), StatusCode::BAD_REQUEST);
        assert_eq!(authenticated.unwrap_err(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_ascii_header_wins_over_valid_query() {
        // テスト項目: ヘッダーが読めない場合でもクエリにはフォールバックしない
        // given (前提条件):
        let state = create_state();
        let mut parts = parts(
            "/ws?user_id=7",
            Some(HeaderValue::from_bytes(b"4\xff2").unwrap()),
        );

        // when (操作):
        let result = MaybeUser::from_request_parts(&mut parts, &state).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_header_wins_over_query() {
        // テスト項目: ヘッダーとクエリの両方があればヘッダーの ID を使う
        // given (前提条件):
        let state = create_state();
        let mut parts = parts("/ws?user_id=7", Some(HeaderValue::from_static("42")));

        // when (操作):
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(user, Some(UserId::new(42).unwrap()));
    }

    #[tokio::test]
    async fn test_query_and_missing_identity() {
        // テスト項目: ヘッダーがなければクエリを使い、どちらもなければ匿名（HTTP では 401）
        // given (前提条件):
        let state = create_state();
        let mut with_query = parts("/ws?user_id=7", None);
        let mut anonymous_ws = parts("/ws", None);
        let mut anonymous_http = parts("/api/rooms", None);

        // when (操作):
        let MaybeUser(from_query) = MaybeUser::from_request_parts(&mut with_query, &state)
            .await
            .unwrap();
        let MaybeUser(anonymous) = MaybeUser::from_request_parts(&mut anonymous_ws, &state)
            .await
            .unwrap();
        let unauthorized =
            AuthenticatedUser::from_request_parts(&mut anonymous_http, &state).await;

        // then (期待する結果):
        assert_eq!(from_query, Some(UserId::new(7).unwrap()));
        assert_eq!(anonymous, None);
        assert_eq!(unauthorized.unwrap_err(), StatusCode::UNAUTHORIZED);
    }
}
