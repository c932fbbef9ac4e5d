//! Message formatting utilities for client display.

use tsudoi_server::infrastructure::dto::websocket::{
    DirectMessageDto, OutboundEvent, RoomMessageDto, UserProfileDto,
};

const RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any server event for the terminal
    ///
    /// # Arguments
    ///
    /// * `event` - Decoded outbound frame
    /// * `me` - The current user's ID (to mark as "me")
    pub fn format_event(event: &OutboundEvent, me: i64) -> String {
        match event {
            OutboundEvent::ReceiveMessage(message) => Self::format_room_message(message, me),
            OutboundEvent::ReceiveDirectMessage(message) => {
                Self::format_direct_message(message, me)
            }
            OutboundEvent::UserJoinedRoom(change) => format!(
                "\n+ {} joined room #{}\n",
                Self::user_label(&change.user, me),
                change.room_id
            ),
            OutboundEvent::UserLeftRoom(change) => format!(
                "\n- {} left room #{}\n",
                Self::user_label(&change.user, me),
                change.room_id
            ),
            OutboundEvent::UserTypingStatus(typing) => {
                let verb = if typing.is_typing {
                    "is typing"
                } else {
                    "stopped typing"
                };
                format!(
                    "\n… {} {} in room #{}\n",
                    Self::user_label(&typing.user, me),
                    verb,
                    typing.room_id
                )
            }
            OutboundEvent::UserOnlineStatus(status) => {
                let state = if status.is_online { "online" } else { "offline" };
                format!("\n* {} is {}\n", Self::user_label(&status.user, me), state)
            }
            OutboundEvent::InvocationFailed(failure) => {
                format!("\n! {} failed: {}\n", failure.invocation, failure.reason)
            }
        }
    }

    /// Format a room message
    pub fn format_room_message(message: &RoomMessageDto, me: i64) -> String {
        format!(
            "\n\n{RULE}\n\
             [room #{}] @{}: {}\n\
             {} #{} sent at {}\n\
             {RULE}\n",
            message.room_id,
            Self::user_label(&message.sender, me),
            message.content,
            message.message_type,
            message.id,
            message.sent_at
        )
    }

    /// Format a direct message, from either side of the conversation
    pub fn format_direct_message(message: &DirectMessageDto, me: i64) -> String {
        format!(
            "\n\n{RULE}\n\
             [dm] @{} → @{}: {}\n\
             {} #{} sent at {}\n\
             {RULE}\n",
            Self::user_label(&message.sender, me),
            Self::user_label(&message.receiver, me),
            message.content,
            message.message_type,
            message.id,
            message.sent_at
        )
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    fn user_label(user: &UserProfileDto, me: i64) -> String {
        if user.id == me {
            format!("{} (me)", user.username)
        } else {
            user.username.clone()
        }
    }
}
