//! Factory: the convenience seam callers go through.

use std::sync::Arc;

use crate::app::WaitGroup;
use crate::domain::{WaitGroupError, WaitGroupUid};
use crate::ports::{SystemClock, UidGenerator, UlidUidGenerator, WaitGroupStorage};

/// Creates fresh wait groups and reattaches to existing ones, so callers
/// never construct identities or storage plumbing directly.
///
/// # 使用例
/// ```ignore
/// let storage = storage_from_dsn("sqlite:///var/data/rally.db")?;
/// let factory = WaitGroupFactory::new(storage);
///
/// let wg = factory.create().await?;            // producer process
/// let wg = factory.restore(uid).await?;        // waiter process, same uid
/// ```
pub struct WaitGroupFactory {
    storage: Arc<dyn WaitGroupStorage>,
    uid_generator: Arc<dyn UidGenerator>,
}

impl WaitGroupFactory {
    /// Factory over the given storage, with the production ULID generator.
    pub fn new(storage: Arc<dyn WaitGroupStorage>) -> Self {
        Self::with_uid_generator(storage, Arc::new(UlidUidGenerator::new(SystemClock)))
    }

    /// Inject a custom uid generator (deterministic tests).
    pub fn with_uid_generator(
        storage: Arc<dyn WaitGroupStorage>,
        uid_generator: Arc<dyn UidGenerator>,
    ) -> Self {
        Self {
            storage,
            uid_generator,
        }
    }

    /// A brand-new wait group with a fresh uid and a zero counter.
    pub async fn create(&self) -> Result<WaitGroup, WaitGroupError> {
        WaitGroup::create(Arc::clone(&self.storage), self.uid_generator.as_ref()).await
    }

    /// Reattach to a wait group another process created. Propagates
    /// `NotFound` / `Storage` errors unchanged.
    pub async fn restore(&self, uid: WaitGroupUid) -> Result<WaitGroup, WaitGroupError> {
        WaitGroup::attach(Arc::clone(&self.storage), uid).await
    }
}
