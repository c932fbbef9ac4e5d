//! Conversion logic between DTOs and domain types.

use tsudoi_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatCommand, EnrichedDirectMessage, EnrichedRoomMessage, MessageContent, MessageId,
    MessageKind, RoomId, RoomView, ServerEvent, UserId, UserProfile, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

fn message_kind(raw: Option<String>) -> Result<MessageKind, ValueObjectError> {
    raw.map_or(Ok(MessageKind::default()), |kind| kind.parse())
}

impl TryFrom<dto::Invocation> for ChatCommand {
    type Error = ValueObjectError;

    fn try_from(invocation: dto::Invocation) -> Result<Self, Self::Error> {
        let command = match invocation {
            dto::Invocation::SendMessage {
                room_id,
                content,
                message_type,
            } => ChatCommand::SendMessage {
                room_id: RoomId::new(room_id)?,
                content: MessageContent::new(content)?,
                kind: message_kind(message_type)?,
            },
            dto::Invocation::SendDirectMessage {
                receiver_id,
                content,
                message_type,
            } => ChatCommand::SendDirectMessage {
                receiver_id: UserId::new(receiver_id)?,
                content: MessageContent::new(content)?,
                kind: message_kind(message_type)?,
            },
            dto::Invocation::JoinRoom { room_id } => ChatCommand::JoinRoom {
                room_id: RoomId::new(room_id)?,
            },
            dto::Invocation::LeaveRoom { room_id } => ChatCommand::LeaveRoom {
                room_id: RoomId::new(room_id)?,
            },
            dto::Invocation::MarkMessageAsRead { message_id } => ChatCommand::MarkMessageAsRead {
                message_id: MessageId::new(message_id)?,
            },
            dto::Invocation::UserTyping { room_id, is_typing } => ChatCommand::UserTyping {
                room_id: RoomId::new(room_id)?,
                is_typing,
            },
        };
        Ok(command)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&UserProfile> for dto::UserProfileDto {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.value(),
            username: profile.username.clone(),
            avatar: profile.avatar.clone(),
            status: profile.status.as_str().to_string(),
            last_active: timestamp_to_rfc3339(profile.last_active.value()),
        }
    }
}

impl From<&EnrichedRoomMessage> for dto::RoomMessageDto {
    fn from(enriched: &EnrichedRoomMessage) -> Self {
        let message = &enriched.message;
        Self {
            id: message.id.value(),
            room_id: message.room_id.value(),
            sender: (&enriched.sender).into(),
            content: message.content.as_str().to_string(),
            message_type: message.kind.as_str().to_string(),
            sent_at: timestamp_to_rfc3339(message.sent_at.value()),
            is_edited: message.is_edited,
        }
    }
}

impl From<&EnrichedDirectMessage> for dto::DirectMessageDto {
    fn from(enriched: &EnrichedDirectMessage) -> Self {
        let message = &enriched.message;
        Self {
            id: message.id.value(),
            sender: (&enriched.sender).into(),
            receiver: (&enriched.receiver).into(),
            content: message.content.as_str().to_string(),
            message_type: message.kind.as_str().to_string(),
            sent_at: timestamp_to_rfc3339(message.sent_at.value()),
            is_read: message.is_read,
            is_edited: message.is_edited,
        }
    }
}

impl From<&ServerEvent> for dto::OutboundEvent {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::ReceiveMessage(message) => Self::ReceiveMessage(message.into()),
            ServerEvent::ReceiveDirectMessage(message) => {
                Self::ReceiveDirectMessage(message.into())
            }
            ServerEvent::UserJoinedRoom { room_id, user } => {
                Self::UserJoinedRoom(dto::RoomMemberChangeDto {
                    room_id: room_id.value(),
                    user: user.into(),
                })
            }
            ServerEvent::UserLeftRoom { room_id, user } => {
                Self::UserLeftRoom(dto::RoomMemberChangeDto {
                    room_id: room_id.value(),
                    user: user.into(),
                })
            }
            ServerEvent::UserTypingStatus {
                room_id,
                user,
                is_typing,
            } => Self::UserTypingStatus(dto::TypingStatusDto {
                room_id: room_id.value(),
                user: user.into(),
                is_typing: *is_typing,
            }),
            ServerEvent::UserOnlineStatus { user, is_online } => {
                Self::UserOnlineStatus(dto::OnlineStatusDto {
                    user: user.into(),
                    is_online: *is_online,
                })
            }
            ServerEvent::InvocationFailed { invocation, reason } => {
                Self::InvocationFailed(dto::InvocationFailedDto {
                    invocation: invocation.clone(),
                    reason: reason.clone(),
                })
            }
        }
    }
}

impl From<&RoomView> for http::RoomDto {
    fn from(view: &RoomView) -> Self {
        Self {
            id: view.room.id.value(),
            name: view.room.name.clone(),
            description: view.room.description.clone(),
            image: view.room.image.clone(),
            members_count: view.members_count,
            created_at: timestamp_to_rfc3339(view.room.created_at.value()),
            creator: (&view.creator).into(),
            is_private: view.room.is_private,
        }
    }
}

/// Serialize a domain event into an outbound text frame
pub fn encode_event(event: &ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::OutboundEvent::from(event))
}
