//! Counter record: the persisted, shared state of one wait group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::uid::WaitGroupUid;

/// Snapshot of one wait group's counter record.
///
/// Design:
/// - This is the single shared mutable resource; the store is the source of
///   truth and every read goes back to it (no handle-local caching).
/// - `counter` may be observed negative when callers misuse the API; the
///   store itself does not enforce the sign.
/// - `created_at` / `updated_at` are observability only, never used for logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitGroupRecord {
    pub uid: WaitGroupUid,
    pub counter: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WaitGroupRecord {
    /// A fresh record as inserted at creation time: counter starts at zero.
    pub fn new(uid: WaitGroupUid, now: DateTime<Utc>) -> Self {
        Self {
            uid,
            counter: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a delta to the counter and refresh the update timestamp.
    ///
    /// Callers must apply this inside whatever indivisible operation their
    /// store provides; the method itself is just the record-level mutation.
    pub fn apply_delta(&mut self, delta: i64, now: DateTime<Utc>) {
        self.counter += delta;
        self.updated_at = now;
    }

    /// All registered work has finished.
    pub fn is_satisfied(&self) -> bool {
        self.counter == 0
    }
}
