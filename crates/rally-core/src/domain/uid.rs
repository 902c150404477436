//! Wait-group identifier.
//!
//! # ULID ベースの不透明トークン
//! uid は生成時に一度だけ割り当てられ、レコードの生存期間中は不変です。
//! 表示用プレフィックス（"wg-"）を含めた文字列全体がキーになります。
//! 他プロセスから復元する場合は文字列をそのまま受け取るため、内部表現は
//! ULID ではなく String で保持します。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Opaque identifier naming one wait group's shared counter record.
///
/// The value is globally unique, assigned at creation, and immutable for the
/// record's lifetime. Handles restored in another process carry the exact
/// string the creating process produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaitGroupUid(String);

impl WaitGroupUid {
    /// Wrap an existing identifier (e.g. one received from another process).
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// Build a fresh identifier from a ULID.
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(format!("wg-{ulid}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for WaitGroupUid {
    fn from(uid: String) -> Self {
        Self(uid)
    }
}

impl From<&str> for WaitGroupUid {
    fn from(uid: &str) -> Self {
        Self(uid.to_string())
    }
}

impl fmt::Display for WaitGroupUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
