//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};
use tsudoi_server::infrastructure::dto::websocket::OutboundEvent;

use crate::{
    command::{self, Action, HELP},
    error::ClientError,
};

use super::{
    formatter::MessageFormatter,
    ui::{prompt, redisplay_prompt},
};

/// Run the WebSocket client session
pub async fn run_client_session(url: &str, user_id: i64) -> Result<(), ClientError> {
    // Construct URL with user_id as query parameter
    let url = format!("{}?user_id={}", url, user_id);

    let (ws_stream, _response) = match connect_async(&url).await {
        Ok(result) => result,
        Err(tungstenite::Error::Http(response)) => {
            return Err(ClientError::Rejected(response.status().as_u16()));
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to chat server!");
    println!(
        "\nYou are user #{}. Select a room with /room <id>, /help lists commands. Press Ctrl+C to exit.\n",
        user_id
    );

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming events
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match serde_json::from_str::<OutboundEvent>(text.as_str()) {
                        Ok(event) => MessageFormatter::format_event(&event, user_id),
                        Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(user_id);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(user_id);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = prompt(user_id);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn input lines into invocations
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;
        let mut current_room: Option<i64> = None;

        while let Some(line) = input_rx.recv().await {
            let invocation = match command::parse(&line, current_room) {
                Ok(Action::Invoke(invocation)) => invocation,
                Ok(Action::SelectRoom(room_id)) => {
                    current_room = Some(room_id);
                    println!("Now talking in room #{}", room_id);
                    redisplay_prompt(user_id);
                    continue;
                }
                Ok(Action::Help) => {
                    print!("{}", HELP);
                    redisplay_prompt(user_id);
                    continue;
                }
                Err(e) => {
                    println!("{}", e);
                    redisplay_prompt(user_id);
                    continue;
                }
            };

            let json = match serde_json::to_string(&invocation) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize invocation: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send invocation: {}", e);
                write_error = true;
                break;
            }
            tracing::debug!("Sent {}", invocation.name());
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
    }

    Ok(())
}
