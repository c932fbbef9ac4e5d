//! キー単位の非同期ゲート
//!
//! 同じキーに対する処理を 1 つずつ通し、異なるキーは並行に進めます。
//! ユーザー単位のプレゼンス遷移と、ルーム単位の「保存してから配信」を
//! 直列化するのに使います。
//!
//! スロットは `Weak` で保持し、誰も待っていないスロットは次の呼び出しで
//! 取り除かれるため、キーの数だけメモリが増え続けることはありません。

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex as StdMutex, PoisonError, Weak},
};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// キー単位の非同期ゲート
pub struct KeyedGate<K> {
    slots: StdMutex<HashMap<K, Weak<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedGate<K> {
    pub fn new() -> Self {
        Self {
            slots: StdMutex::new(HashMap::new()),
        }
    }

    /// キーのゲートに入る（ガードを drop すると次の待ち手が入る）
    pub async fn enter(&self, key: K) -> OwnedMutexGuard<()> {
        self.slot(key).lock_owned().await
    }

    /// 使用中のキーの数
    #[cfg(test)]
    pub(crate) fn active_keys(&self) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|_, slot| slot.strong_count() > 0);
        slots.len()
    }

    fn slot(&self, key: K) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|_, slot| slot.strong_count() > 0);

        if let Some(slot) = slots.get(&key).and_then(Weak::upgrade) {
            return slot;
        }
        let slot = Arc::new(Mutex::new(()));
        slots.insert(key, Arc::downgrade(&slot));
        slot
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedGate<K> {
    fn default() -> Self {
        Self::new()
    }
}
