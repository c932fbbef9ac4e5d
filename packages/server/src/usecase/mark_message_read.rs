//! UseCase: 既読処理
//!
//! DM の受信者だけが既読にできます。状態の変更のみで、配信はしません。

use std::sync::Arc;

use crate::domain::{MessageId, MessageStore, UserId};

use super::error::{MarkReadError, classify};

/// 既読処理のユースケース
pub struct MarkMessageReadUseCase {
    messages: Arc<dyn MessageStore>,
}

impl MarkMessageReadUseCase {
    /// 新しい MarkMessageReadUseCase を作成
    pub fn new(messages: Arc<dyn MessageStore>) -> Self {
        Self { messages }
    }

    pub async fn execute(
        &self,
        reader_id: UserId,
        message_id: MessageId,
    ) -> Result<(), MarkReadError> {
        let marked = self
            .messages
            .mark_read(message_id, reader_id)
            .await
            .map_err(|e| {
                classify(
                    e,
                    MarkReadError::MessageNotFound,
                    MarkReadError::PersistenceFailure,
                )
            })?;
        if !marked {
            return Err(MarkReadError::MessageNotFound);
        }
        tracing::debug!(message_id = %message_id, reader_id = %reader_id, "message marked as read");
        Ok(())
    }
}
