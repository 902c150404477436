//! Null storage implementation (disabled / dry-run mode).

use async_trait::async_trait;

use crate::domain::{StorageError, WaitGroupRecord, WaitGroupUid};
use crate::ports::WaitGroupStorage;

/// Backend that accepts every write and always reports "absent".
///
/// Useful when the wait-group feature is switched off: producers can keep
/// calling `insert` / `apply_delta` without a store behind them. It cannot
/// fabricate synchronization: any counter read against it fails with
/// not-found at the engine level, so a `wait` over this backend never
/// pretends the work finished.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStorage;

#[async_trait]
impl WaitGroupStorage for NullStorage {
    async fn insert_wait_group(&self, _uid: &WaitGroupUid) -> Result<(), StorageError> {
        Ok(())
    }

    async fn fetch_wait_group(
        &self,
        _uid: &WaitGroupUid,
    ) -> Result<Option<WaitGroupRecord>, StorageError> {
        Ok(None)
    }

    async fn apply_delta(&self, _uid: &WaitGroupUid, _delta: i64) -> Result<(), StorageError> {
        Ok(())
    }
}
