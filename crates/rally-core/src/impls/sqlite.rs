//! SQLite storage implementation.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{StorageError, WaitGroupRecord, WaitGroupUid};
use crate::ports::WaitGroupStorage;

/// Table used when the connection string does not name one.
pub const DEFAULT_TABLE_NAME: &str = "rally_waitgroup";

/// SQLite backend.
///
/// The connection is synchronous, so every operation runs on the blocking
/// pool with the connection behind a mutex. Counter updates are a single
/// `UPDATE ... SET counter = counter + ?`, which SQLite executes as one
/// indivisible statement, which is the atomicity the contract asks for.
/// A duplicate uid violates the `uid` primary key and surfaces as a
/// `StorageError` (reject, never overwrite).
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
    table_name: String,
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

impl SqliteStorage {
    /// Open (or create) a database file, using [`DEFAULT_TABLE_NAME`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with_table(path, DEFAULT_TABLE_NAME)
    }

    /// Open (or create) a database file with a custom table name.
    pub fn open_with_table(
        path: impl AsRef<Path>,
        table_name: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(storage_err)?;
        Self::from_connection(conn, table_name.into())
    }

    /// Private in-memory database, handy for tests and demos.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Self::from_connection(conn, DEFAULT_TABLE_NAME.to_string())
    }

    fn from_connection(conn: Connection, table_name: String) -> Result<Self, StorageError> {
        let storage = Self {
            conn: Arc::new(Mutex::new(conn)),
            table_name,
        };
        storage.bootstrap()?;
        Ok(storage)
    }

    /// Create the counter table if it is not there yet.
    fn bootstrap(&self) -> Result<(), StorageError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                uid TEXT PRIMARY KEY,
                counter INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            self.table_name
        );
        let conn = self.lock_conn()?;
        conn.execute(&sql, []).map_err(storage_err)?;
        tracing::debug!(table = %self.table_name, "sqlite wait-group table ready");
        Ok(())
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::OperationFailed("connection mutex poisoned".to_string()))
    }

    /// Run one operation against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let table_name = self.table_name.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StorageError::OperationFailed("connection mutex poisoned".into()))?;
            op(&conn, &table_name)
        })
        .await
        .map_err(|e| StorageError::OperationFailed(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl WaitGroupStorage for SqliteStorage {
    async fn insert_wait_group(&self, uid: &WaitGroupUid) -> Result<(), StorageError> {
        let uid = uid.clone();
        let now = Utc::now().to_rfc3339();
        self.with_conn(move |conn, table| {
            let sql = format!(
                "INSERT INTO {table} (uid, counter, created_at, updated_at) VALUES (?1, 0, ?2, ?2)"
            );
            conn.execute(&sql, params![uid.as_str(), now])
                .map_err(storage_err)?;
            Ok(())
        })
        .await
    }

    async fn fetch_wait_group(
        &self,
        uid: &WaitGroupUid,
    ) -> Result<Option<WaitGroupRecord>, StorageError> {
        let uid = uid.clone();
        self.with_conn(move |conn, table| {
            let sql = format!(
                "SELECT uid, counter, created_at, updated_at FROM {table} WHERE uid = ?1 LIMIT 1"
            );
            let row: Option<(String, i64, String, String)> = conn
                .query_row(&sql, params![uid.as_str()], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })
                .optional()
                .map_err(storage_err)?;

            match row {
                None => Ok(None),
                Some((uid, counter, created_at, updated_at)) => Ok(Some(WaitGroupRecord {
                    uid: WaitGroupUid::new(uid),
                    counter,
                    created_at: parse_timestamp(&created_at)?,
                    updated_at: parse_timestamp(&updated_at)?,
                })),
            }
        })
        .await
    }

    async fn apply_delta(&self, uid: &WaitGroupUid, delta: i64) -> Result<(), StorageError> {
        let uid = uid.clone();
        let now = Utc::now().to_rfc3339();
        self.with_conn(move |conn, table| {
            let sql = format!(
                "UPDATE {table} SET counter = counter + ?1, updated_at = ?2 WHERE uid = ?3"
            );
            conn.execute(&sql, params![delta, now, uid.as_str()])
                .map_err(storage_err)?;
            Ok(())
        })
        .await
    }
}

fn storage_err(err: rusqlite::Error) -> StorageError {
    StorageError::OperationFailed(err.to_string())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::OperationFailed(format!("bad timestamp \"{raw}\": {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_fetch_returns_zero_counter() {
        let storage = SqliteStorage::in_memory().unwrap();
        let uid = WaitGroupUid::new("wg-one");

        storage.insert_wait_group(&uid).await.unwrap();
        let record = storage.fetch_wait_group(&uid).await.unwrap().unwrap();

        assert_eq!(record.uid, uid);
        assert_eq!(record.counter, 0);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn fetch_unknown_uid_is_absent_not_an_error() {
        let storage = SqliteStorage::in_memory().unwrap();
        let record = storage
            .fetch_wait_group(&WaitGroupUid::new("wg-nope"))
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_violates_the_primary_key() {
        let storage = SqliteStorage::in_memory().unwrap();
        let uid = WaitGroupUid::new("wg-dup");

        storage.insert_wait_group(&uid).await.unwrap();
        let err = storage.insert_wait_group(&uid).await.unwrap_err();

        assert!(matches!(err, StorageError::OperationFailed(_)));
    }

    #[tokio::test]
    async fn deltas_accumulate_and_refresh_updated_at() {
        let storage = SqliteStorage::in_memory().unwrap();
        let uid = WaitGroupUid::new("wg-sum");
        storage.insert_wait_group(&uid).await.unwrap();

        storage.apply_delta(&uid, 3).await.unwrap();
        storage.apply_delta(&uid, -1).await.unwrap();

        let record = storage.fetch_wait_group(&uid).await.unwrap().unwrap();
        assert_eq!(record.counter, 2);
        assert!(record.updated_at >= record.created_at);
    }

    #[tokio::test]
    async fn delta_on_unknown_uid_matches_zero_rows() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage
            .apply_delta(&WaitGroupUid::new("wg-nope"), 1)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn custom_table_name_is_honored() {
        let storage = {
            let conn = Connection::open_in_memory().unwrap();
            SqliteStorage::from_connection(conn, "my_counters".to_string()).unwrap()
        };
        let uid = WaitGroupUid::new("wg-table");

        storage.insert_wait_group(&uid).await.unwrap();
        let record = storage.fetch_wait_group(&uid).await.unwrap().unwrap();
        assert_eq!(record.counter, 0);
    }
}
