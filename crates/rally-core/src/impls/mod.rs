//! Implementations - ストレージ実装とワイヤリング
//!
//! - **InMemoryStorage**: プロセス内テスト・開発用
//! - **NullStorage**: 無効化モード（常に absent を返す）
//! - **SqliteStorage**: SQLite バックエンド（blocking pool 経由）
//! - **storage_from_dsn**: 接続文字列からバックエンドを組み立てる

pub mod config;
pub mod memory;
pub mod null;
pub mod sqlite;

pub use self::config::storage_from_dsn;
pub use self::memory::InMemoryStorage;
pub use self::null::NullStorage;
pub use self::sqlite::{DEFAULT_TABLE_NAME, SqliteStorage};
