//! WebSocket を使った MessagePusher 実装（グループルーター）
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - 接続とグループ（`user:<id>` / `room:<id>`）の購読関係を管理
//! - イベントのシリアライズと配信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//!
//! 接続・グループ・購読の 3 つのマップは 1 つのロックで保護され、
//! 「グループ側の集合」と「接続側の購読集合」が食い違うことはありません。
//! 空になったグループはその場で削除します。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, GroupKey, MessagePushError, MessagePusher, PusherChannel, ServerEvent},
    infrastructure::dto::conversion::encode_event,
};

#[derive(Default)]
struct RouterState {
    /// 接続中の送信チャンネル
    connections: HashMap<ConnectionId, PusherChannel>,
    /// グループ -> 購読中の接続
    groups: HashMap<GroupKey, HashSet<ConnectionId>>,
    /// 接続 -> 購読中のグループ（登録解除時の後始末用）
    subscriptions: HashMap<ConnectionId, HashSet<GroupKey>>,
}

impl RouterState {
    fn detach(&mut self, connection_id: ConnectionId, group: GroupKey) -> bool {
        let Some(members) = self.groups.get_mut(&group) else {
            return false;
        };
        let removed = members.remove(&connection_id);
        if members.is_empty() {
            self.groups.remove(&group);
        }
        removed
    }
}

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    state: Mutex<RouterState>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 存在するグループの数
    #[cfg(test)]
    pub(crate) async fn group_count(&self) -> usize {
        self.state.lock().await.groups.len()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut state = self.state.lock().await;
        state.connections.insert(connection_id, sender);
        state.subscriptions.entry(connection_id).or_default();
        tracing::debug!(connection_id = %connection_id, "connection registered to MessagePusher");
    }

    async fn unregister_connection(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;
        state.connections.remove(&connection_id);
        let groups = state
            .subscriptions
            .remove(&connection_id)
            .unwrap_or_default();
        for group in groups {
            state.detach(connection_id, group);
        }
        tracing::debug!(connection_id = %connection_id, "connection unregistered from MessagePusher");
    }

    async fn subscribe(&self, connection_id: ConnectionId, group: GroupKey) -> bool {
        let mut state = self.state.lock().await;
        // 既に切断された接続は購読させない
        let Some(subscriptions) = state.subscriptions.get_mut(&connection_id) else {
            tracing::debug!(
                connection_id = %connection_id,
                group = %group,
                "subscribe ignored for unregistered connection"
            );
            return false;
        };
        if !subscriptions.insert(group) {
            return false;
        }
        state.groups.entry(group).or_default().insert(connection_id);
        tracing::debug!(connection_id = %connection_id, group = %group, "subscribed");
        true
    }

    async fn unsubscribe(&self, connection_id: ConnectionId, group: GroupKey) -> bool {
        let mut state = self.state.lock().await;
        let removed = state
            .subscriptions
            .get_mut(&connection_id)
            .is_some_and(|subscriptions| subscriptions.remove(&group));
        if removed {
            state.detach(connection_id, group);
            tracing::debug!(connection_id = %connection_id, group = %group, "unsubscribed");
        }
        removed
    }

    async fn is_subscribed(&self, connection_id: ConnectionId, group: GroupKey) -> bool {
        let state = self.state.lock().await;
        state
            .groups
            .get(&group)
            .is_some_and(|members| members.contains(&connection_id))
    }

    async fn subscriber_count(&self, group: GroupKey) -> usize {
        let state = self.state.lock().await;
        state.groups.get(&group).map_or(0, HashSet::len)
    }

    async fn push_to(
        &self,
        connection_id: ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let frame =
            encode_event(event).map_err(|e| MessagePushError::EncodeFailed(e.to_string()))?;
        let state = self.state.lock().await;

        if let Some(sender) = state.connections.get(&connection_id) {
            sender
                .send(frame)
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!(connection_id = %connection_id, event = event.name(), "pushed event");
            Ok(())
        } else {
            Err(MessagePushError::ConnectionNotFound(
                connection_id.to_string(),
            ))
        }
    }

    async fn broadcast(&self, group: GroupKey, event: &ServerEvent) -> usize {
        let frame = match encode_event(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(group = %group, event = event.name(), "failed to encode event: {}", e);
                return 0;
            }
        };

        let targets: Vec<(ConnectionId, PusherChannel)> = {
            let state = self.state.lock().await;
            state
                .groups
                .get(&group)
                .into_iter()
                .flatten()
                .filter_map(|id| state.connections.get(id).map(|tx| (*id, tx.clone())))
                .collect()
        };

        let mut delivered = 0;
        for (connection_id, sender) in targets {
            // 閉じた接続への配信は失敗を許容して続行
            if let Err(e) = sender.send(frame.clone()) {
                tracing::warn!(
                    connection_id = %connection_id,
                    group = %group,
                    "failed to push event: {}",
                    e
                );
            } else {
                delivered += 1;
            }
        }
        tracing::debug!(group = %group, event = event.name(), delivered, "broadcasted event");
        delivered
    }
}
