//! WebSocket connection handlers.
//!
//! One socket is one connection: it is registered with the pusher and the
//! connection registry on upgrade, dispatches invocations sequentially while
//! open, and runs the disconnect path exactly once when either half ends.
//! An invocation that has started always runs to completion, even when the
//! outbound half dies underneath it.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{Stream, StreamExt},
};
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{ChatCommand, ConnectionId, ServerEvent, UserId},
    infrastructure::dto::websocket::Invocation,
    ui::state::AppState,
    usecase::{SendRoomMessageError, TypingError},
};

use super::identity::MaybeUser;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
) -> impl IntoResponse {
    match user {
        Some(user_id) => tracing::info!("User '{}' is upgrading to WebSocket", user_id),
        None => tracing::info!("Anonymous client is upgrading to WebSocket"),
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Channel receiver for encoded server events addressed to this connection
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Reads client frames until the peer closes, the stream fails or `stop` is raised.
///
/// `stop` is only checked between frames: the frame being handled when it is
/// raised is still handled to the end, and no later frame is.
async fn read_frames<S, E, F, Fut>(
    mut frames: S,
    mut stop: watch::Receiver<bool>,
    connection_id: ConnectionId,
    mut on_text: F,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = stop.changed() => break,
            next = frames.next() => next,
        };
        let msg = match next {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received text on '{}': {}", connection_id, text);
                on_text(text.as_str().to_string()).await;
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection_id);
                break;
            }
            _ => {}
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user: Option<UserId>) {
    let (sender, receiver) = socket.split();
    let connection_id = ConnectionId::generate();

    // Create a channel for this connection to receive server events.
    // `tx` is held until the socket closes so an anonymous connection stays open.
    let (tx, rx) = mpsc::unbounded_channel();

    if let Some(user_id) = user {
        let report = state
            .connect_user_usecase
            .execute(user_id, connection_id, tx.clone())
            .await;
        tracing::info!(
            "Connection '{}' opened for user '{}' ({:?}, {} rooms subscribed)",
            connection_id,
            user_id,
            report.outcome,
            report.rooms_subscribed
        );
    } else {
        tracing::info!("Anonymous connection '{}' opened", connection_id);
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let state_clone = state.clone();

    // Spawn a task to receive invocations from this client
    let mut recv_task = tokio::spawn(read_frames(
        receiver,
        stop_rx,
        connection_id,
        move |text| {
            let state = state_clone.clone();
            async move { handle_text(&state, user, connection_id, &text).await }
        },
    ));

    // Spawn a task to push server events to this client
    let mut send_task = pusher_loop(rx, sender);

    // If the reader ends first the pusher is aborted. If the pusher ends first
    // the reader is stopped between frames and awaited, never aborted.
    let send_ended_first = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => true,
    };
    if send_ended_first {
        let _ = stop_tx.send(true);
        if let Err(e) = recv_task.await {
            tracing::error!("Reader of '{}' failed: {}", connection_id, e);
        }
    } else {
        send_task.abort();
    }
    drop(tx);

    match user {
        Some(user_id) => {
            let report = state
                .disconnect_user_usecase
                .execute(user_id, connection_id)
                .await;
            tracing::info!(
                "Connection '{}' of user '{}' closed ({:?})",
                connection_id,
                user_id,
                report.outcome
            );
        }
        None => tracing::info!("Anonymous connection '{}' closed", connection_id),
    }
}

/// Parse one text frame and dispatch it.
async fn handle_text(
    state: &AppState,
    user: Option<UserId>,
    connection_id: ConnectionId,
    text: &str,
) {
    let Some(user_id) = user else {
        tracing::debug!(
            "Skipping invocation from anonymous connection '{}'",
            connection_id
        );
        return;
    };

    let invocation = match serde_json::from_str::<Invocation>(text) {
        Ok(invocation) => invocation,
        Err(e) => {
            tracing::warn!("Failed to parse invocation from '{}': {}", connection_id, e);
            reply_failure(state, connection_id, "unknown", e).await;
            return;
        }
    };

    let name = invocation.name();
    let command = match ChatCommand::try_from(invocation) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Invalid '{}' invocation from '{}': {}", name, user_id, e);
            reply_failure(state, connection_id, name, e).await;
            return;
        }
    };

    dispatch(state, user_id, connection_id, command).await;
}

async fn dispatch(
    state: &AppState,
    user_id: UserId,
    connection_id: ConnectionId,
    command: ChatCommand,
) {
    let name = command.name();
    match command {
        ChatCommand::SendMessage {
            room_id,
            content,
            kind,
        } => {
            match state
                .send_room_message_usecase
                .execute(user_id, room_id, content, kind)
                .await
            {
                Ok(message) => {
                    tracing::debug!("Message {} stored in room {}", message.message.id, room_id)
                }
                Err(e @ SendRoomMessageError::NotAMember { .. }) => {
                    tracing::debug!("Dropped message: {}", e);
                }
                Err(e) => {
                    tracing::warn!("Failed to send message: {}", e);
                    reply_failure(state, connection_id, name, e).await;
                }
            }
        }
        ChatCommand::SendDirectMessage {
            receiver_id,
            content,
            kind,
        } => {
            if let Err(e) = state
                .send_direct_message_usecase
                .execute(user_id, Some(connection_id), receiver_id, content, kind)
                .await
            {
                tracing::warn!("Failed to send direct message: {}", e);
                reply_failure(state, connection_id, name, e).await;
            }
        }
        ChatCommand::JoinRoom { room_id } => {
            if let Err(e) = state
                .join_room_usecase
                .execute(user_id, room_id, Some(connection_id))
                .await
            {
                tracing::warn!("Failed to join room {}: {}", room_id, e);
                reply_failure(state, connection_id, name, e).await;
            }
        }
        ChatCommand::LeaveRoom { room_id } => {
            if let Err(e) = state
                .leave_room_usecase
                .execute(user_id, room_id, Some(connection_id))
                .await
            {
                tracing::warn!("Failed to leave room {}: {}", room_id, e);
                reply_failure(state, connection_id, name, e).await;
            }
        }
        ChatCommand::MarkMessageAsRead { message_id } => {
            if let Err(e) = state
                .mark_message_read_usecase
                .execute(user_id, message_id)
                .await
            {
                tracing::warn!("Failed to mark message {} as read: {}", message_id, e);
                reply_failure(state, connection_id, name, e).await;
            }
        }
        ChatCommand::UserTyping { room_id, is_typing } => {
            match state
                .user_typing_usecase
                .execute(user_id, room_id, is_typing)
                .await
            {
                Ok(_) => {}
                Err(e @ TypingError::NotAMember { .. }) => {
                    tracing::debug!("Dropped typing status: {}", e);
                }
                Err(e) => tracing::warn!("Failed to broadcast typing status: {}", e),
            }
        }
    }
}

/// Report a failed invocation to the calling connection only.
async fn reply_failure(
    state: &AppState,
    connection_id: ConnectionId,
    invocation: &str,
    reason: impl std::fmt::Display,
) {
    let event = ServerEvent::InvocationFailed {
        invocation: invocation.to_string(),
        reason: reason.to_string(),
    };
    if let Err(e) = state.message_pusher.push_to(connection_id, &event).await {
        tracing::warn!("Failed to reply to '{}': {}", connection_id, e);
    }
}
