//! In-memory storage implementation.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{StorageError, WaitGroupRecord, WaitGroupUid};
use crate::ports::{Clock, SystemClock, WaitGroupStorage};

/// In-memory backend: a record map under one async mutex.
///
/// Shared through `Arc`, so handles in one process can exercise the full
/// contract without an external store. Holding the lock across the whole
/// `apply_delta` mutation is what makes the delta indivisible here, mirroring
/// the single atomic `UPDATE` a database backend relies on.
pub struct InMemoryStorage {
    records: Arc<Mutex<HashMap<WaitGroupUid, WaitGroupRecord>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Use an injected clock for deterministic timestamps.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            clock: Arc::new(clock),
        }
    }
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage").finish_non_exhaustive()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WaitGroupStorage for InMemoryStorage {
    async fn insert_wait_group(&self, uid: &WaitGroupUid) -> Result<(), StorageError> {
        let mut records = self.records.lock().await;
        match records.entry(uid.clone()) {
            Entry::Occupied(_) => Err(StorageError::OperationFailed(format!(
                "uid \"{uid}\" already exists"
            ))),
            Entry::Vacant(entry) => {
                entry.insert(WaitGroupRecord::new(uid.clone(), self.clock.now()));
                Ok(())
            }
        }
    }

    async fn fetch_wait_group(
        &self,
        uid: &WaitGroupUid,
    ) -> Result<Option<WaitGroupRecord>, StorageError> {
        let records = self.records.lock().await;
        Ok(records.get(uid).cloned())
    }

    async fn apply_delta(&self, uid: &WaitGroupUid, delta: i64) -> Result<(), StorageError> {
        let mut records = self.records.lock().await;
        if let Some(record) = records.get_mut(uid) {
            record.apply_delta(delta, self.clock.now());
        }
        Ok(())
    }
}
