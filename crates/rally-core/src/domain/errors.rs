//! Error taxonomy.
//!
//! - `StorageError`: infrastructure failure in a backend (I/O, query,
//!   connection). Never retried by this crate.
//! - `WaitGroupError`: the engine-level failures a caller has to handle,
//!   with `StorageError` folded in via `From`.

use thiserror::Error;

use super::uid::WaitGroupUid;

/// Failure inside a storage backend or its wiring.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O / query / transport failure.
    #[error("storage operation failed: {0}")]
    OperationFailed(String),

    /// The connection string could not be parsed or is missing a piece the
    /// selected backend needs.
    #[error("invalid dsn: {0}")]
    InvalidDsn(String),

    /// No backend is wired for this connection-string scheme.
    #[error("the scheme \"{0}\" is not supported by the storage wiring")]
    UnsupportedScheme(String),
}

/// Engine-level failures.
#[derive(Debug, Error)]
pub enum WaitGroupError {
    /// No record exists for this uid. Distinguishes "never existed / deleted"
    /// from infrastructure failure.
    #[error("wait group \"{0}\" not found")]
    NotFound(WaitGroupUid),

    /// A negative counter value was observed, meaning more work was reported
    /// done than was ever registered. Caller misuse, not a transient
    /// condition; the value carried is the one that was actually read, which
    /// a concurrent add may have moved since this caller's own write.
    #[error("wait group \"{uid}\" has negative counter {counter}")]
    NegativeCounter { uid: WaitGroupUid, counter: i64 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
