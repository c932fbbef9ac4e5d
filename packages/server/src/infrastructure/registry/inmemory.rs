//! インメモリ接続レジストリ
//!
//! `UserId -> HashSet<ConnectionId>` を 1 つのロックで保持します。
//! 集合が空になったエントリはその場で削除するため、
//! 「エントリが存在する」ことと「オンライン」であることが常に一致します。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectOutcome, ConnectionId, ConnectionRegistry, DisconnectOutcome, UserId};

/// インメモリ接続レジストリ
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    connections: Mutex<HashMap<UserId, HashSet<ConnectionId>>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// オンラインのユーザー数
    #[cfg(test)]
    pub(crate) async fn count_online_users(&self) -> usize {
        self.connections.lock().await.len()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, user_id: UserId, connection_id: ConnectionId) -> ConnectOutcome {
        let mut connections = self.connections.lock().await;
        let set = connections.entry(user_id).or_default();
        set.insert(connection_id);

        let live_connections = set.len();
        tracing::debug!(
            user_id = %user_id,
            connection_id = %connection_id,
            live_connections,
            "connection registered"
        );
        if live_connections == 1 {
            ConnectOutcome::FirstConnection
        } else {
            ConnectOutcome::AdditionalConnection { live_connections }
        }
    }

    async fn unregister(&self, user_id: UserId, connection_id: ConnectionId) -> DisconnectOutcome {
        let mut connections = self.connections.lock().await;
        let Some(set) = connections.get_mut(&user_id) else {
            return DisconnectOutcome::UnknownConnection;
        };
        if !set.remove(&connection_id) {
            return DisconnectOutcome::UnknownConnection;
        }

        let remaining = set.len();
        if remaining == 0 {
            connections.remove(&user_id);
            tracing::debug!(user_id = %user_id, "last connection closed");
            DisconnectOutcome::LastConnectionClosed
        } else {
            DisconnectOutcome::ConnectionsRemaining(remaining)
        }
    }

    async fn connections_of(&self, user_id: UserId) -> Vec<ConnectionId> {
        let connections = self.connections.lock().await;
        connections
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    async fn is_online(&self, user_id: UserId) -> bool {
        let connections = self.connections.lock().await;
        connections.contains_key(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn uid(value: i64) -> UserId {
        UserId::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_first_and_additional_connection() {
        // テスト項目: 最初の接続だけが FirstConnection になる
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (c1, c2) = (ConnectionId::generate(), ConnectionId::generate());

        // when (操作):
        let first = registry.register(uid(1), c1).await;
        let second = registry.register(uid(1), c2).await;

        // then (期待する結果):
        assert_eq!(first, ConnectOutcome::FirstConnection);
        assert_eq!(
            second,
            ConnectOutcome::AdditionalConnection {
                live_connections: 2
            }
        );
        assert!(registry.is_online(uid(1)).await);
        assert_eq!(registry.count_online_users().await, 1);
    }

    #[tokio::test]
    async fn test_last_connection_closed_removes_entry() {
        // テスト項目: 最後の接続が閉じるとユーザーはオフラインになる
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let (c1, c2) = (ConnectionId::generate(), ConnectionId::generate());
        registry.register(uid(1), c1).await;
        registry.register(uid(1), c2).await;

        // when (操作):
        let first = registry.unregister(uid(1), c1).await;
        let second = registry.unregister(uid(1), c2).await;

        // then (期待する結果):
        assert_eq!(first, DisconnectOutcome::ConnectionsRemaining(1));
        assert_eq!(second, DisconnectOutcome::LastConnectionClosed);
        assert!(!registry.is_online(uid(1)).await);
        assert!(registry.connections_of(uid(1)).await.is_empty());
        assert_eq!(registry.count_online_users().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_unknown_connection() {
        // テスト項目: 未登録の接続の解除は UnknownConnection で、状態は変わらない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let c1 = ConnectionId::generate();
        registry.register(uid(1), c1).await;

        // when (操作):
        let unknown_conn = registry.unregister(uid(1), ConnectionId::generate()).await;
        let unknown_user = registry.unregister(uid(2), c1).await;

        // then (期待する結果):
        assert_eq!(unknown_conn, DisconnectOutcome::UnknownConnection);
        assert_eq!(unknown_user, DisconnectOutcome::UnknownConnection);
        assert_eq!(registry.connections_of(uid(1)).await, vec![c1]);
    }

    #[tokio::test]
    async fn test_concurrent_register_and_unregister() {
        // テスト項目: 並行な接続・切断の後でも集合が空ならオフラインになる
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let ids: Vec<ConnectionId> = (0..32).map(|_| ConnectionId::generate()).collect();

        // when (操作):
        let mut handles = Vec::new();
        for id in ids.clone() {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.register(uid(1), id).await;
                registry.unregister(uid(1), id).await
            }));
        }
        let mut last_closed = 0;
        for handle in handles {
            if handle.await.unwrap() == DisconnectOutcome::LastConnectionClosed {
                last_closed += 1;
            }
        }

        // then (期待する結果):
        assert!(last_closed >= 1);
        assert!(!registry.is_online(uid(1)).await);
        assert_eq!(registry.count_online_users().await, 0);
    }
}
