//! UidGenerator port - uid 生成の抽象化
//!
//! 新しい wait group に割り当てる識別子を生成します。テスト容易性のために
//! trait として抽象化しています。
//!
//! # 実装
//! - **UlidUidGenerator**: ULID ベース（本番用）

use ulid::Ulid;

use crate::domain::WaitGroupUid;
use crate::ports::Clock;

/// UidGenerator は分散システムで使える uid を生成
///
/// # ULID の特性
/// - 時刻エントロピー + プロセスローカルな乱数で実用上衝突しない
/// - 分散環境で生成可能（調整不要）
/// - 固定長の不透明トークンになる
///
/// Collisions are not checked or retried here; a duplicate key is the storage
/// backend's to reject.
pub trait UidGenerator: Send + Sync {
    fn generate(&self) -> WaitGroupUid;
}

/// UlidUidGenerator は ULID ベースの uid 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。これにより、テスト時に
/// FixedClock を使って timestamp 部分を決定的にできます。
pub struct UlidUidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidUidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> UidGenerator for UlidUidGenerator<C> {
    fn generate(&self) -> WaitGroupUid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        WaitGroupUid::from_ulid(ulid)
    }
}
