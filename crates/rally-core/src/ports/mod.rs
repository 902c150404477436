//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部リソース（共有ストア、時刻、乱数）へのインターフェースを
//! 提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - カウンタの正本は常に共有ストア側（ハンドルにキャッシュしない）
//! - apply_delta の原子性はストアのネイティブ更新に委譲
//! - Clock / UidGenerator は差し替え可能（テストで決定的にできる）

pub mod clock;
pub mod storage;
pub mod uid_generator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::storage::WaitGroupStorage;
pub use self::uid_generator::{UidGenerator, UlidUidGenerator};
