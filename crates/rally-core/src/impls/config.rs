//! Storage wiring: connection string in, backend out.

use std::sync::Arc;

use crate::domain::StorageError;
use crate::dsn::Dsn;
use crate::impls::{InMemoryStorage, NullStorage, SqliteStorage};
use crate::impls::sqlite::DEFAULT_TABLE_NAME;
use crate::ports::WaitGroupStorage;

/// Construct a storage backend from a connection string.
///
/// Supported forms:
/// - `sqlite:///path/to/file.db?table_name=custom` (alias scheme `sqlite3`)
/// - `memory:` for the process-local in-memory backend
/// - `null:` for disabled mode (accepts writes, reports absent)
///
/// Anything else is `StorageError::UnsupportedScheme`.
pub fn storage_from_dsn(raw: &str) -> Result<Arc<dyn WaitGroupStorage>, StorageError> {
    let dsn = Dsn::parse(raw).map_err(|e| StorageError::InvalidDsn(e.to_string()))?;

    // scheme alias map
    let scheme = match dsn.scheme() {
        "sqlite3" => "sqlite",
        other => other,
    };

    tracing::debug!(scheme, "wiring wait-group storage");

    match scheme {
        "sqlite" => {
            let path = dsn.path().ok_or_else(|| {
                StorageError::InvalidDsn(format!(
                    "the sqlite DSN \"{raw}\" must contain a database path"
                ))
            })?;
            let table_name = dsn.option("table_name").unwrap_or(DEFAULT_TABLE_NAME);
            Ok(Arc::new(SqliteStorage::open_with_table(path, table_name)?))
        }
        "memory" => Ok(Arc::new(InMemoryStorage::new())),
        "null" => Ok(Arc::new(NullStorage)),
        other => Err(StorageError::UnsupportedScheme(other.to_string())),
    }
}
