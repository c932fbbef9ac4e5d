//! UseCase: ユーザー切断処理
//!
//! 接続の購読をすべて外し、レジストリから取り除きます。
//! 最後の接続だった場合は offline への遷移をフレンドへ配信します。
//! 同じ接続に対して 2 回呼ばれても、2 回目は `UnknownConnection` になり
//! 何も配信しません。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, DisconnectOutcome, MessagePusher, PresenceStatus, UserId,
};

use super::{
    gate::KeyedGate,
    presence::{PresenceAnnouncement, PresenceService},
};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectReport {
    pub outcome: DisconnectOutcome,
    /// offline 遷移が起きた場合の配信結果
    pub presence: Option<PresenceAnnouncement>,
}

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresenceService>,
    user_gate: Arc<KeyedGate<UserId>>,
}

impl DisconnectUserUseCase {
    /// 新しい DisconnectUserUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: Arc<PresenceService>,
        user_gate: Arc<KeyedGate<UserId>>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            presence,
            user_gate,
        }
    }

    /// 切断処理を実行
    pub async fn execute(&self, user_id: UserId, connection_id: ConnectionId) -> DisconnectReport {
        // 1. 以後この接続には何も届かない
        self.message_pusher
            .unregister_connection(connection_id)
            .await;

        // 2. レジストリから外し、最後の接続なら offline へ遷移
        let _guard = self.user_gate.enter(user_id).await;
        let outcome = self.registry.unregister(user_id, connection_id).await;
        let presence = match outcome {
            DisconnectOutcome::LastConnectionClosed => {
                match self
                    .presence
                    .transition(user_id, PresenceStatus::Offline)
                    .await
                {
                    Ok(announcement) => Some(announcement),
                    Err(e) => {
                        tracing::error!(user_id = %user_id, "failed to announce offline: {}", e);
                        None
                    }
                }
            }
            DisconnectOutcome::ConnectionsRemaining(_) => None,
            DisconnectOutcome::UnknownConnection => {
                tracing::warn!(
                    user_id = %user_id,
                    connection_id = %connection_id,
                    "disconnect for unknown connection ignored"
                );
                None
            }
        };

        tracing::info!(user_id = %user_id, connection_id = %connection_id, "user disconnected");
        DisconnectReport { outcome, presence }
    }
}
