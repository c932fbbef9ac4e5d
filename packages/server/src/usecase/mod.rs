//! UseCase layer: one use case per invocation, plus the presence state
//! machine and the keyed gate that serialises per-user and per-room work.

pub mod connect_user;
pub mod create_room;
pub mod disconnect_user;
pub mod error;
pub mod gate;
pub mod get_message_history;
pub mod get_presence;
pub mod get_room_detail;
pub mod get_rooms;
pub mod join_room;
pub mod leave_room;
pub mod mark_message_read;
pub mod presence;
pub mod send_direct_message;
pub mod send_room_message;
pub mod user_typing;

#[cfg(test)]
pub(crate) mod testing;

pub use connect_user::{ConnectReport, ConnectUserUseCase, RoomSubscriptionMode};
pub use create_room::CreateRoomUseCase;
pub use disconnect_user::{DisconnectReport, DisconnectUserUseCase};
pub use error::{
    CreateRoomError, GetRoomDetailError, HistoryError, JoinRoomError, LeaveRoomError,
    MarkReadError, PresenceError, SendDirectMessageError, SendRoomMessageError, TypingError,
};
pub use gate::KeyedGate;
pub use get_message_history::GetMessageHistoryUseCase;
pub use get_presence::{GetPresenceUseCase, PresenceSnapshot};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use leave_room::LeaveRoomUseCase;
pub use mark_message_read::MarkMessageReadUseCase;
pub use presence::{PresenceAnnouncement, PresenceService};
pub use send_direct_message::{DirectMessageSent, SendDirectMessageUseCase};
pub use send_room_message::SendRoomMessageUseCase;
pub use user_typing::UserTypingUseCase;
