use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per cache key, serializing read-modify-write cycles on a
/// single record. Idle entries are pruned on the next acquisition.
#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub(crate) async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.retain(|k, lock| k == key || Arc::strong_count(lock) > 1);
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}
