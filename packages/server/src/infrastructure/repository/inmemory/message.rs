//! InMemory Message Repository 実装
//!
//! ルームメッセージと DM を保持します。ID は単調増加で採番し、
//! 送信時刻は注入された Clock から割り当てます。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tsudoi_shared::time::Clock;

use crate::domain::{
    ChatMessage, DirectMessage, MessageContent, MessageId, MessageKind, MessageStore, Page,
    RepositoryError, RoomId, Timestamp, UserId,
};

#[derive(Default)]
struct MessageState {
    next_id: i64,
    /// 挿入順（= ID 昇順）
    room_messages: Vec<ChatMessage>,
    /// 挿入順（= ID 昇順）
    direct_messages: Vec<DirectMessage>,
}

impl MessageState {
    fn next_message_id(&mut self) -> Result<MessageId, RepositoryError> {
        self.next_id += 1;
        MessageId::new(self.next_id).map_err(|e| RepositoryError::PersistenceFailure(e.to_string()))
    }
}

/// 新しい順に並べたイテレータからページ分だけ切り出す
fn paginate<T>(newest_first: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    newest_first
        .skip(page.offset())
        .take(page.size() as usize)
        .collect()
}

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    state: Mutex<MessageState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(MessageState::default()),
            clock,
        }
    }

    /// 保存済みメッセージ（ルーム・DM 合計）の件数
    #[cfg(test)]
    pub(crate) async fn count_messages(&self) -> usize {
        let state = self.state.lock().await;
        state.room_messages.len() + state.direct_messages.len()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageRepository {
    async fn insert_room_message(
        &self,
        room_id: RoomId,
        sender_id: UserId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<ChatMessage, RepositoryError> {
        let sent_at = Timestamp::new(self.clock.now_millis());
        let mut state = self.state.lock().await;
        let id = state.next_message_id()?;

        let message = ChatMessage {
            id,
            room_id,
            sender_id,
            content,
            kind,
            sent_at,
            is_edited: false,
            is_deleted: false,
        };
        state.room_messages.push(message.clone());
        Ok(message)
    }

    async fn insert_direct_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<DirectMessage, RepositoryError> {
        let sent_at = Timestamp::new(self.clock.now_millis());
        let mut state = self.state.lock().await;
        let id = state.next_message_id()?;

        let message = DirectMessage {
            id,
            sender_id,
            receiver_id,
            content,
            kind,
            sent_at,
            is_read: false,
            is_edited: false,
            is_deleted: false,
        };
        state.direct_messages.push(message.clone());
        Ok(message)
    }

    async fn mark_read(
        &self,
        message_id: MessageId,
        reader_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        let Some(message) = state
            .direct_messages
            .iter_mut()
            .find(|m| m.id == message_id && m.receiver_id == reader_id && !m.is_deleted)
        else {
            return Ok(false);
        };
        message.is_read = true;
        Ok(true)
    }

    async fn room_messages(
        &self,
        room_id: RoomId,
        page: Page,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let state = self.state.lock().await;
        let newest_first = state
            .room_messages
            .iter()
            .rev()
            .filter(|m| m.room_id == room_id && !m.is_deleted)
            .cloned();
        Ok(paginate(newest_first, page))
    }

    async fn direct_messages(
        &self,
        user_id: UserId,
        other_id: UserId,
        page: Page,
    ) -> Result<Vec<DirectMessage>, RepositoryError> {
        let state = self.state.lock().await;
        let newest_first = state
            .direct_messages
            .iter()
            .rev()
            .filter(|m| {
                !m.is_deleted
                    && ((m.sender_id == user_id && m.receiver_id == other_id)
                        || (m.sender_id == other_id && m.receiver_id == user_id))
            })
            .cloned();
        Ok(paginate(newest_first, page))
    }
}
