//! UseCase: ルームメッセージ送信処理
//!
//! 1. ルームの存在とメンバーシップを確認（メンバーでなければ何も保存しない）
//! 2. 送信者のプロフィールを取得（送信時点のスナップショット）
//! 3. 保存（ID と送信時刻はストアが割り当てる）
//! 4. `room:<id>` グループへ配信
//!
//! 3 と 4 はルーム単位のゲートの中で行うため、購読者が観測する順序は
//! 保存順と一致します。

use std::sync::Arc;

use crate::domain::{
    EnrichedRoomMessage, GroupKey, MembershipStore, MessageContent, MessageKind, MessagePusher,
    MessageStore, ProfileStore, RoomId, RoomStore, ServerEvent, UserId,
};

use super::{
    error::{SendRoomMessageError, classify},
    gate::KeyedGate,
};

/// ルームメッセージ送信のユースケース
pub struct SendRoomMessageUseCase {
    rooms: Arc<dyn RoomStore>,
    memberships: Arc<dyn MembershipStore>,
    profiles: Arc<dyn ProfileStore>,
    messages: Arc<dyn MessageStore>,
    message_pusher: Arc<dyn MessagePusher>,
    room_gate: Arc<KeyedGate<RoomId>>,
}

impl SendRoomMessageUseCase {
    /// 新しい SendRoomMessageUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        memberships: Arc<dyn MembershipStore>,
        profiles: Arc<dyn ProfileStore>,
        messages: Arc<dyn MessageStore>,
        message_pusher: Arc<dyn MessagePusher>,
        room_gate: Arc<KeyedGate<RoomId>>,
    ) -> Self {
        Self {
            rooms,
            memberships,
            profiles,
            messages,
            message_pusher,
            room_gate,
        }
    }

    /// ルームメッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(EnrichedRoomMessage)` - 保存・配信したメッセージ
    /// * `Err(SendRoomMessageError::NotAMember)` - メンバーでない（何も保存・配信していない）
    pub async fn execute(
        &self,
        sender_id: UserId,
        room_id: RoomId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<EnrichedRoomMessage, SendRoomMessageError> {
        // 1. 認可
        self.rooms.get_room(room_id).await.map_err(|e| {
            classify(
                e,
                SendRoomMessageError::RoomNotFound(room_id),
                SendRoomMessageError::PersistenceFailure,
            )
        })?;
        let is_member = self
            .memberships
            .is_member(room_id, sender_id)
            .await
            .map_err(|e| SendRoomMessageError::PersistenceFailure(e.to_string()))?;
        if !is_member {
            return Err(SendRoomMessageError::NotAMember {
                room_id,
                user_id: sender_id,
            });
        }

        // 2. 送信者のプロフィール（保存前に取得し、欠けていれば何も残さない）
        let sender = self.profiles.get_profile(sender_id).await.map_err(|e| {
            classify(
                e,
                SendRoomMessageError::SenderNotFound(sender_id),
                SendRoomMessageError::PersistenceFailure,
            )
        })?;

        // 3. 保存と配信をルーム単位で直列化
        let _guard = self.room_gate.enter(room_id).await;
        let message = self
            .messages
            .insert_room_message(room_id, sender_id, content, kind)
            .await
            .map_err(|e| SendRoomMessageError::PersistenceFailure(e.to_string()))?;

        let enriched = EnrichedRoomMessage { message, sender };
        let delivered = self
            .message_pusher
            .broadcast(
                GroupKey::Room(room_id),
                &ServerEvent::ReceiveMessage(enriched.clone()),
            )
            .await;

        tracing::debug!(
            room_id = %room_id,
            sender_id = %sender_id,
            message_id = %enriched.message.id,
            delivered,
            "room message sent"
        );
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockMessageStore, RepositoryError, RoomRole, Timestamp},
        usecase::testing::{NOW, World, drain, uid},
    };

    fn create_usecase(world: &World) -> SendRoomMessageUseCase {
        SendRoomMessageUseCase::new(
            world.rooms.clone(),
            world.rooms.clone(),
            world.users.clone(),
            world.messages.clone(),
            world.pusher.clone(),
            Arc::new(KeyedGate::new()),
        )
    }

    fn content(text: &str) -> MessageContent {
        MessageContent::new(text.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_message_is_persisted_and_broadcast_to_room_only() {
        // テスト項目: A が作成したルームへの送信は room グループの購読者にだけ届き、
        //             後から参加した B には遡って届かない
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        let (alice_conn, mut alice_rx) = world.connect(uid(1)).await;
        let (bob_conn, mut bob_rx) = world.connect(uid(2)).await;
        world
            .pusher
            .subscribe(alice_conn, GroupKey::Room(room_id))
            .await;
        let usecase = create_usecase(&world);

        // when (操作):
        let sent = usecase
            .execute(uid(1), room_id, content("hello"), MessageKind::Text)
            .await
            .unwrap();
        world
            .rooms
            .add_member(room_id, uid(2), RoomRole::Member)
            .await
            .unwrap();
        world
            .pusher
            .subscribe(bob_conn, GroupKey::Room(room_id))
            .await;

        // then (期待する結果):
        assert_eq!(sent.message.sent_at, Timestamp::new(NOW));
        assert_eq!(sent.sender.username, "alice");
        let frames = drain(&mut alice_rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["event"], "ReceiveMessage");
        assert_eq!(frames[0]["data"]["content"], "hello");
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_non_member_send_is_never_broadcast() {
        // テスト項目: メンバーでない送信者のメッセージは保存も配信もされない
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        let (alice_conn, mut alice_rx) = world.connect(uid(1)).await;
        world
            .pusher
            .subscribe(alice_conn, GroupKey::Room(room_id))
            .await;
        // carol の接続が購読だけしている（メンバーシップはない）状態
        let (carol_conn, mut carol_rx) = world.connect(uid(3)).await;
        world
            .pusher
            .subscribe(carol_conn, GroupKey::Room(room_id))
            .await;
        let usecase = create_usecase(&world);

        // when (操作):
        let result = usecase
            .execute(uid(3), room_id, content("spam"), MessageKind::Text)
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendRoomMessageError::NotAMember {
                room_id,
                user_id: uid(3)
            })
        );
        assert!(drain(&mut alice_rx).is_empty());
        assert!(drain(&mut carol_rx).is_empty());
        assert_eq!(world.messages.count_messages().await, 0);
    }

    #[tokio::test]
    async fn test_successive_sends_are_observed_in_order() {
        // テスト項目: 同じ送信者の連続送信は全購読者に送信順で届く
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        world
            .rooms
            .add_member(room_id, uid(2), RoomRole::Member)
            .await
            .unwrap();
        let (c1, mut rx1) = world.connect(uid(1)).await;
        let (c2, mut rx2) = world.connect(uid(2)).await;
        for conn in [c1, c2] {
            world.pusher.subscribe(conn, GroupKey::Room(room_id)).await;
        }
        let usecase = create_usecase(&world);

        // when (操作):
        for text in ["one", "two", "three"] {
            usecase
                .execute(uid(1), room_id, content(text), MessageKind::Text)
                .await
                .unwrap();
        }

        // then (期待する結果):
        for rx in [&mut rx1, &mut rx2] {
            let texts: Vec<String> = drain(rx)
                .iter()
                .map(|f| f["data"]["content"].as_str().unwrap().to_string())
                .collect();
            assert_eq!(texts, vec!["one", "two", "three"]);
        }
    }

    #[tokio::test]
    async fn test_concurrent_senders_observe_persistence_order() {
        // テスト項目: 並行送信でも購読者が観測する順序は ID（保存順）の昇順
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        world
            .rooms
            .add_member(room_id, uid(2), RoomRole::Member)
            .await
            .unwrap();
        let (conn, mut rx) = world.connect(uid(3)).await;
        world.pusher.subscribe(conn, GroupKey::Room(room_id)).await;
        let usecase = Arc::new(create_usecase(&world));

        // when (操作):
        let mut handles = Vec::new();
        for i in 0..20 {
            let usecase = usecase.clone();
            let sender = if i % 2 == 0 { uid(1) } else { uid(2) };
            handles.push(tokio::spawn(async move {
                usecase
                    .execute(sender, room_id, content(&format!("m{}", i)), MessageKind::Text)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果):
        let ids: Vec<i64> = drain(&mut rx)
            .iter()
            .map(|f| f["data"]["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids.len(), 20);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_persistence_failure_is_not_broadcast() {
        // テスト項目: 保存に失敗したら配信しない
        // given (前提条件):
        let world = World::new().await;
        let room_id = world.create_room(uid(1), false).await;
        let (conn, mut rx) = world.connect(uid(1)).await;
        world.pusher.subscribe(conn, GroupKey::Room(room_id)).await;
        let mut messages = MockMessageStore::new();
        messages
            .expect_insert_room_message()
            .returning(|_, _, _, _| Err(RepositoryError::PersistenceFailure("full".to_string())));
        let usecase = SendRoomMessageUseCase::new(
            world.rooms.clone(),
            world.rooms.clone(),
            world.users.clone(),
            Arc::new(messages),
            world.pusher.clone(),
            Arc::new(KeyedGate::new()),
        );

        // when (操作):
        let result = usecase
            .execute(uid(1), room_id, content("lost"), MessageKind::Text)
            .await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(SendRoomMessageError::PersistenceFailure(_))
        ));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_room_is_rejected() {
        // テスト項目: 存在しないルームへの送信は RoomNotFound
        // given (前提条件):
        let world = World::new().await;
        let usecase = create_usecase(&world);
        let missing = RoomId::new(404).unwrap();

        // when (操作):
        let result = usecase
            .execute(uid(1), missing, content("hi"), MessageKind::Text)
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SendRoomMessageError::RoomNotFound(missing)));
    }
}
