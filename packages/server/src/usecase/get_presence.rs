//! UseCase: プレゼンス照会

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, UserId};

/// ユーザーの現在の接続状況
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub user_id: UserId,
    pub live_connections: usize,
}

impl PresenceSnapshot {
    pub fn is_online(&self) -> bool {
        self.live_connections > 0
    }
}

/// プレゼンス照会のユースケース
pub struct GetPresenceUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl GetPresenceUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, user_id: UserId) -> PresenceSnapshot {
        PresenceSnapshot {
            user_id,
            live_connections: self.registry.connections_of(user_id).await.len(),
        }
    }
}
