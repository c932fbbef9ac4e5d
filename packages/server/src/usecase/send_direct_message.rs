//! UseCase: ダイレクトメッセージ送信処理
//!
//! 保存したメッセージを受信者の `user:<id>` グループへ配信し、さらに
//! 送信元の接続そのものへエコーします。送信者は自分の user グループへの
//! 配信では受け取らないため、エコーがなければ送信元の画面に表示されません。
//! 自分宛ての DM では送信元が受信者グループを購読済みなので、エコーしません。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, EnrichedDirectMessage, GroupKey, MessageContent, MessageKind, MessagePusher,
    MessageStore, ProfileStore, ServerEvent, UserId,
};

use super::error::{SendDirectMessageError, classify};

/// DM 送信の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMessageSent {
    pub message: EnrichedDirectMessage,
    /// 受信者グループへの配信数とエコーの合計
    pub delivered: usize,
}

/// ダイレクトメッセージ送信のユースケース
pub struct SendDirectMessageUseCase {
    profiles: Arc<dyn ProfileStore>,
    messages: Arc<dyn MessageStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendDirectMessageUseCase {
    /// 新しい SendDirectMessageUseCase を作成
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        messages: Arc<dyn MessageStore>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            profiles,
            messages,
            message_pusher,
        }
    }

    /// ダイレクトメッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者
    /// * `origin` - エコー先の送信元接続（HTTP など接続がない場合は `None`）
    /// * `receiver_id` - 受信者
    pub async fn execute(
        &self,
        sender_id: UserId,
        origin: Option<ConnectionId>,
        receiver_id: UserId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<DirectMessageSent, SendDirectMessageError> {
        // 1. 双方のプロフィール（保存前に確認）
        let sender = self.profiles.get_profile(sender_id).await.map_err(|e| {
            classify(
                e,
                SendDirectMessageError::SenderNotFound(sender_id),
                SendDirectMessageError::PersistenceFailure,
            )
        })?;
        let receiver = self.profiles.get_profile(receiver_id).await.map_err(|e| {
            classify(
                e,
                SendDirectMessageError::ReceiverNotFound(receiver_id),
                SendDirectMessageError::PersistenceFailure,
            )
        })?;

        // 2. 保存
        let message = self
            .messages
            .insert_direct_message(sender_id, receiver_id, content, kind)
            .await
            .map_err(|e| SendDirectMessageError::PersistenceFailure(e.to_string()))?;
        let enriched = EnrichedDirectMessage {
            message,
            sender,
            receiver,
        };

        // 3. 受信者グループへ配信し、まだ届いていなければ送信元の接続へエコー
        let event = ServerEvent::ReceiveDirectMessage(enriched.clone());
        let receiver_group = GroupKey::User(receiver_id);
        let mut delivered = self.message_pusher.broadcast(receiver_group, &event).await;
        let echo_to = match origin {
            Some(origin) if !self.message_pusher.is_subscribed(origin, receiver_group).await => {
                Some(origin)
            }
            _ => None,
        };
        if let Some(origin) = echo_to {
            match self.message_pusher.push_to(origin, &event).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(connection_id = %origin, "failed to echo direct message: {}", e)
                }
            }
        }

        tracing::debug!(
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            delivered,
            "direct message sent"
        );
        Ok(DirectMessageSent {
            message: enriched,
            delivered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::testing::{World, drain, uid};

    fn create_usecase(world: &World) -> SendDirectMessageUseCase {
        SendDirectMessageUseCase::new(
            world.users.clone(),
            world.messages.clone(),
            world.pusher.clone(),
        )
    }

    fn content(text: &str) -> MessageContent {
        MessageContent::new(text.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_direct_message_is_delivered_to_receiver_and_echoed() {
        // テスト項目: DM は受信者グループへの 1 件と送信元へのエコー 1 件の計 2 件届く
        // given (前提条件):
        let world = World::new().await;
        let (alice_conn, mut alice_rx) = world.connect(uid(1)).await;
        let (_bob_conn, mut bob_rx) = world.connect(uid(2)).await;
        let usecase = create_usecase(&world);

        // when (操作):
        let sent = usecase
            .execute(
                uid(1),
                Some(alice_conn),
                uid(2),
                content("psst"),
                MessageKind::Text,
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(sent.delivered, 2);
        let to_bob = drain(&mut bob_rx);
        let echo = drain(&mut alice_rx);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(echo.len(), 1);
        assert_eq!(to_bob[0]["event"], "ReceiveDirectMessage");
        assert_eq!(to_bob[0]["data"]["receiver"]["username"], "bob");
        assert_eq!(echo[0], to_bob[0]);
    }

    #[tokio::test]
    async fn test_other_sender_connections_do_not_receive_echo() {
        // テスト項目: エコーは送信元の接続だけに届き、送信者の他の接続には届かない
        // given (前提条件):
        let world = World::new().await;
        let (alice_conn, mut alice_rx) = world.connect(uid(1)).await;
        let (_alice_other, mut alice_other_rx) = world.connect(uid(1)).await;
        let usecase = create_usecase(&world);

        // when (操作):
        let sent = usecase
            .execute(
                uid(1),
                Some(alice_conn),
                uid(2),
                content("hi"),
                MessageKind::Text,
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(sent.delivered, 1);
        assert_eq!(drain(&mut alice_rx).len(), 1);
        assert!(drain(&mut alice_other_rx).is_empty());
    }

    #[tokio::test]
    async fn test_direct_message_to_self_arrives_once() {
        // テスト項目: 自分宛ての DM は送信元の接続に 1 回だけ届き、他の接続にも 1 回届く
        // given (前提条件):
        let world = World::new().await;
        let (alice_conn, mut alice_rx) = world.connect(uid(1)).await;
        let (_alice_other, mut alice_other_rx) = world.connect(uid(1)).await;
        let usecase = create_usecase(&world);

        // when (操作):
        let sent = usecase
            .execute(
                uid(1),
                Some(alice_conn),
                uid(1),
                content("note to self"),
                MessageKind::Text,
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(sent.delivered, 2);
        let origin = drain(&mut alice_rx);
        assert_eq!(origin.len(), 1);
        assert_eq!(origin[0]["event"], "ReceiveDirectMessage");
        assert_eq!(origin[0]["data"]["content"], "note to self");
        assert_eq!(drain(&mut alice_other_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_receiver_persists_nothing() {
        // テスト項目: 存在しない受信者への DM は保存されない
        // given (前提条件):
        let world = World::new().await;
        let (alice_conn, mut alice_rx) = world.connect(uid(1)).await;
        let usecase = create_usecase(&world);

        // when (操作):
        let result = usecase
            .execute(
                uid(1),
                Some(alice_conn),
                uid(42),
                content("hello?"),
                MessageKind::Text,
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SendDirectMessageError::ReceiverNotFound(uid(42))));
        assert_eq!(world.messages.count_messages().await, 0);
        assert!(drain(&mut alice_rx).is_empty());
    }
}
