//! Storage port: the persistence contract every backend satisfies.

use async_trait::async_trait;

use crate::domain::{StorageError, WaitGroupRecord, WaitGroupUid};

/// Capability contract over a keyed counter record.
///
/// Design intent:
/// - "Not found" is a normal return value (`Ok(None)`), never an error;
///   `StorageError` is reserved for infrastructure failure.
/// - `apply_delta` is the one place true cross-process atomicity is required:
///   the store's own indivisible update (a single SQL `UPDATE counter =
///   counter + ?`, a mutation under one lock guard) must make concurrent
///   deltas on the same uid linearizable. No application-level locking on top.
/// - None of these operations validate the resulting counter's sign; that is
///   the engine's check, applied after the fact.
///
/// Backends in this crate reject a duplicate uid on insert rather than
/// overwriting; overwriting would silently reset a live counter.
#[async_trait]
pub trait WaitGroupStorage: Send + Sync + std::fmt::Debug {
    /// Create a new record with `counter = 0`.
    async fn insert_wait_group(&self, uid: &WaitGroupUid) -> Result<(), StorageError>;

    /// Current record snapshot, or `None` if no record with this uid exists.
    async fn fetch_wait_group(
        &self,
        uid: &WaitGroupUid,
    ) -> Result<Option<WaitGroupRecord>, StorageError>;

    /// Atomically add `delta` to the stored counter and refresh the update
    /// timestamp. A missing uid is a silent no-op, like an `UPDATE` matching
    /// zero rows.
    async fn apply_delta(&self, uid: &WaitGroupUid, delta: i64) -> Result<(), StorageError>;
}
