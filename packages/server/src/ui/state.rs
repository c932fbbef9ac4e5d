//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    domain::{IdentityResolver, MessagePusher},
    usecase::{
        ConnectUserUseCase, CreateRoomUseCase, DisconnectUserUseCase, GetMessageHistoryUseCase,
        GetPresenceUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, MarkMessageReadUseCase, SendDirectMessageUseCase,
        SendRoomMessageUseCase, UserTypingUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// IdentityResolver（認証済みユーザー ID の解決）
    pub identity: Arc<dyn IdentityResolver>,
    /// Direct replies (InvocationFailed) to a single connection
    pub message_pusher: Arc<dyn MessagePusher>,
    pub connect_user_usecase: Arc<ConnectUserUseCase>,
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    pub send_room_message_usecase: Arc<SendRoomMessageUseCase>,
    pub send_direct_message_usecase: Arc<SendDirectMessageUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub mark_message_read_usecase: Arc<MarkMessageReadUseCase>,
    pub user_typing_usecase: Arc<UserTypingUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub get_message_history_usecase: Arc<GetMessageHistoryUseCase>,
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
}
