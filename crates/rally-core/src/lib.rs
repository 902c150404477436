//! rally-core
//!
//! A distributed wait-group: the counter lives in a shared external store so
//! that independent processes can jointly track completion of a set of
//! distributed tasks. Producers `add` when spawning work and `done` when it
//! finishes; waiters poll until the counter reaches zero.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（WaitGroupUid, WaitGroupRecord, エラー型）
//! - **ports**: 抽象化レイヤー（WaitGroupStorage, UidGenerator, Clock）
//! - **impls**: 実装（InMemoryStorage, NullStorage, SqliteStorage, DSN ワイヤリング）
//! - **app**: アプリケーションロジック（WaitGroup, WaitGroupFactory）
//! - **dsn**: 接続文字列のパース

pub mod app;
pub mod domain;
pub mod dsn;
pub mod impls;
pub mod ports;

pub use app::{DEFAULT_POLL_INTERVAL, WaitGroup, WaitGroupFactory};
pub use domain::{StorageError, WaitGroupError, WaitGroupRecord, WaitGroupUid};
pub use dsn::{Dsn, DsnError};
pub use impls::{InMemoryStorage, NullStorage, SqliteStorage, storage_from_dsn};
pub use ports::WaitGroupStorage;
