//! 依存関係の組み立て
//!
//! インメモリの各ストア、接続レジストリ、MessagePusher を生成し、
//! それらを共有するユースケースから `AppState` を構築します。

use std::sync::Arc;

use tsudoi_shared::time::Clock;

use crate::{
    infrastructure::{
        InMemoryConnectionRegistry, InMemoryMessageRepository, InMemoryRoomRepository,
        InMemoryUserRepository, SeedData, SeedError, TrustedIdentityResolver,
        WebSocketMessagePusher,
    },
    ui::AppState,
    usecase::{
        ConnectUserUseCase, CreateRoomUseCase, DisconnectUserUseCase, GetMessageHistoryUseCase,
        GetPresenceUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase, KeyedGate,
        LeaveRoomUseCase, MarkMessageReadUseCase, PresenceService, RoomSubscriptionMode,
        SendDirectMessageUseCase, SendRoomMessageUseCase, UserTypingUseCase,
    },
};

/// プロセス内で完結するバックエンド一式
#[derive(Clone)]
pub struct InMemoryBackend {
    pub users: Arc<InMemoryUserRepository>,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
}

impl InMemoryBackend {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new(clock.clone())),
            rooms: Arc::new(InMemoryRoomRepository::new(clock.clone())),
            messages: Arc::new(InMemoryMessageRepository::new(clock)),
            registry: Arc::new(InMemoryConnectionRegistry::new()),
            pusher: Arc::new(WebSocketMessagePusher::new()),
        }
    }

    /// シードデータを投入
    pub async fn seed(&self, data: &SeedData) -> Result<(), SeedError> {
        data.apply(&self.users, &self.rooms).await
    }

    /// ユースケースを組み立てて `AppState` を作成
    pub fn app_state(&self, mode: RoomSubscriptionMode) -> AppState {
        let user_gate = Arc::new(KeyedGate::new());
        let room_gate = Arc::new(KeyedGate::new());
        let presence = Arc::new(PresenceService::new(
            self.users.clone(),
            self.users.clone(),
            self.pusher.clone(),
        ));

        AppState {
            identity: Arc::new(TrustedIdentityResolver),
            message_pusher: self.pusher.clone(),
            connect_user_usecase: Arc::new(ConnectUserUseCase::new(
                self.registry.clone(),
                self.pusher.clone(),
                self.rooms.clone(),
                presence.clone(),
                user_gate.clone(),
                mode,
            )),
            disconnect_user_usecase: Arc::new(DisconnectUserUseCase::new(
                self.registry.clone(),
                self.pusher.clone(),
                presence,
                user_gate,
            )),
            send_room_message_usecase: Arc::new(SendRoomMessageUseCase::new(
                self.rooms.clone(),
                self.rooms.clone(),
                self.users.clone(),
                self.messages.clone(),
                self.pusher.clone(),
                room_gate,
            )),
            send_direct_message_usecase: Arc::new(SendDirectMessageUseCase::new(
                self.users.clone(),
                self.messages.clone(),
                self.pusher.clone(),
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                self.rooms.clone(),
                self.users.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                self.rooms.clone(),
                self.rooms.clone(),
                self.users.clone(),
                self.pusher.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                self.rooms.clone(),
                self.rooms.clone(),
                self.users.clone(),
                self.pusher.clone(),
            )),
            mark_message_read_usecase: Arc::new(MarkMessageReadUseCase::new(
                self.messages.clone(),
            )),
            user_typing_usecase: Arc::new(UserTypingUseCase::new(
                self.rooms.clone(),
                self.users.clone(),
                self.pusher.clone(),
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(
                self.rooms.clone(),
                self.rooms.clone(),
                self.users.clone(),
            )),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(
                self.rooms.clone(),
                self.rooms.clone(),
                self.users.clone(),
            )),
            get_message_history_usecase: Arc::new(GetMessageHistoryUseCase::new(
                self.rooms.clone(),
                self.rooms.clone(),
                self.users.clone(),
                self.messages.clone(),
            )),
            get_presence_usecase: Arc::new(GetPresenceUseCase::new(self.registry.clone())),
        }
    }
}
