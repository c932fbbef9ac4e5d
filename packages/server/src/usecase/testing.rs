//! ユースケースのテスト用フィクスチャ

use std::sync::Arc;

use tokio::sync::mpsc;
use tsudoi_shared::time::FixedClock;

use crate::{
    domain::{ConnectionId, GroupKey, MessagePusher, NewChatRoom, RoomId, RoomName, RoomStore, UserId},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        registry::InMemoryConnectionRegistry,
        repository::{InMemoryMessageRepository, InMemoryRoomRepository, InMemoryUserRepository},
    },
};

pub(crate) const NOW: i64 = 1_700_000_000_000;

pub(crate) fn uid(value: i64) -> UserId {
    UserId::new(value).unwrap()
}

/// alice(1), bob(2), carol(3) が登録済みで、alice と bob がフレンド
pub(crate) struct World {
    pub users: Arc<InMemoryUserRepository>,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
}

impl World {
    pub async fn new() -> Self {
        let clock = Arc::new(FixedClock::new(NOW));
        let users = Arc::new(InMemoryUserRepository::new(clock.clone()));
        for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
            users
                .upsert_user(uid(id), name, &format!("{}.png", name))
                .await;
        }
        users.add_friendship(uid(1), uid(2)).await.unwrap();
        Self {
            users,
            rooms: Arc::new(InMemoryRoomRepository::new(clock.clone())),
            messages: Arc::new(InMemoryMessageRepository::new(clock)),
            registry: Arc::new(InMemoryConnectionRegistry::new()),
            pusher: Arc::new(WebSocketMessagePusher::new()),
        }
    }

    /// 接続を登録し、自分の user グループを購読させる
    pub async fn connect(&self, user_id: UserId) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let conn = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher.register_connection(conn, tx).await;
        self.pusher.subscribe(conn, GroupKey::User(user_id)).await;
        (conn, rx)
    }

    pub async fn create_room(&self, creator: UserId, is_private: bool) -> RoomId {
        self.rooms
            .create_room(
                creator,
                NewChatRoom {
                    name: RoomName::new("general".to_string()).unwrap(),
                    description: String::new(),
                    image: None,
                    is_private,
                },
            )
            .await
            .unwrap()
            .id
    }
}

/// 受信済みのフレームをすべて取り出す
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(&frame).unwrap());
    }
    frames
}
