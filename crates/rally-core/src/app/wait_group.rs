//! The wait-group engine.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::domain::{WaitGroupError, WaitGroupRecord, WaitGroupUid};
use crate::ports::{UidGenerator, WaitGroupStorage};

/// Poll cadence used by callers that have no opinion of their own.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to one shared counter record.
///
/// Design intent:
/// - The handle holds only the uid and a shared storage reference. The
///   counter itself is never cached: other processes mutate it out-of-band,
///   so every read goes back to the store.
/// - Cloning a handle is cheap and gives another view onto the same record,
///   e.g. one clone per spawned worker.
#[derive(Clone, Debug)]
pub struct WaitGroup {
    storage: Arc<dyn WaitGroupStorage>,
    uid: WaitGroupUid,
}

impl WaitGroup {
    /// Create a fresh wait group: generate a uid and insert its record with
    /// a zero counter.
    pub async fn create(
        storage: Arc<dyn WaitGroupStorage>,
        uid_generator: &dyn UidGenerator,
    ) -> Result<Self, WaitGroupError> {
        let uid = uid_generator.generate();
        storage.insert_wait_group(&uid).await?;
        tracing::debug!(%uid, "created wait group");
        Ok(Self { storage, uid })
    }

    /// Attach to an existing wait group. The record must already exist;
    /// absence is `NotFound`, never an implicit creation.
    pub async fn attach(
        storage: Arc<dyn WaitGroupStorage>,
        uid: WaitGroupUid,
    ) -> Result<Self, WaitGroupError> {
        let wait_group = Self { storage, uid };
        wait_group.record().await?;
        Ok(wait_group)
    }

    pub fn uid(&self) -> &WaitGroupUid {
        &self.uid
    }

    /// Register `delta` units of outstanding work (negative to retire them).
    ///
    /// The delta is applied atomically by the store, then the counter is
    /// re-read; a negative fresh value fails with `NegativeCounter`. The
    /// re-read is a separate operation, so under concurrent adds the error
    /// means "a negative value was observed", not "this call crossed zero
    /// first". That weaker guarantee is the contract.
    pub async fn add(&self, delta: i64) -> Result<(), WaitGroupError> {
        self.storage.apply_delta(&self.uid, delta).await?;

        let counter = self.counter().await?;
        if counter < 0 {
            return Err(WaitGroupError::NegativeCounter {
                uid: self.uid.clone(),
                counter,
            });
        }
        Ok(())
    }

    /// One unit of work finished.
    pub async fn done(&self) -> Result<(), WaitGroupError> {
        self.add(-1).await
    }

    /// Current counter value, straight from the store.
    pub async fn counter(&self) -> Result<i64, WaitGroupError> {
        Ok(self.record().await?.counter)
    }

    /// Current record snapshot (counter plus observability timestamps).
    pub async fn record(&self) -> Result<WaitGroupRecord, WaitGroupError> {
        self.storage
            .fetch_wait_group(&self.uid)
            .await?
            .ok_or_else(|| WaitGroupError::NotFound(self.uid.clone()))
    }

    /// Poll the counter until it reaches zero.
    ///
    /// Returns `Ok(true)` once a read observes zero, `Ok(false)` when
    /// `timeout` elapses with the counter still positive. `timeout: None`
    /// waits indefinitely. A negative observation fails with
    /// `NegativeCounter`; a storage failure propagates out of the current
    /// poll iteration.
    ///
    /// The first read always happens before any sleep or deadline check, so
    /// waiting on an already-satisfied counter returns immediately. The
    /// deadline is cooperative: it is checked between iterations, so return
    /// can lag it by up to one poll interval.
    pub async fn wait(
        &self,
        timeout: Option<Duration>,
        poll_interval: Duration,
    ) -> Result<bool, WaitGroupError> {
        let poll_interval = effective_poll_interval(timeout, poll_interval);
        let start = Instant::now();

        loop {
            let counter = self.counter().await?;

            if counter == 0 {
                return Ok(true);
            }
            if counter < 0 {
                return Err(WaitGroupError::NegativeCounter {
                    uid: self.uid.clone(),
                    counter,
                });
            }

            tracing::trace!(uid = %self.uid, counter, "counter still outstanding");

            if !poll_interval.is_zero() {
                sleep(poll_interval).await;
            }

            if let Some(timeout) = timeout {
                if start.elapsed() >= timeout {
                    tracing::debug!(uid = %self.uid, counter, "wait timed out");
                    return Ok(false);
                }
            }
        }
    }
}

/// Clamp the poll interval down to the timeout, so a short deadline is not
/// overshot by a long sleep.
fn effective_poll_interval(timeout: Option<Duration>, poll_interval: Duration) -> Duration {
    match timeout {
        Some(timeout) if !timeout.is_zero() && timeout < poll_interval => timeout,
        _ => poll_interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryStorage;
    use crate::ports::{SystemClock, UlidUidGenerator};
    use rstest::rstest;

    fn uid_gen() -> UlidUidGenerator<SystemClock> {
        UlidUidGenerator::new(SystemClock)
    }

    async fn fresh_wait_group() -> (Arc<InMemoryStorage>, WaitGroup) {
        let storage = Arc::new(InMemoryStorage::new());
        let wait_group = WaitGroup::create(storage.clone(), &uid_gen()).await.unwrap();
        (storage, wait_group)
    }

    #[rstest]
    #[case::no_timeout(None, Duration::from_secs(5), Duration::from_secs(5))]
    #[case::timeout_larger(Some(Duration::from_secs(10)), Duration::from_secs(5), Duration::from_secs(5))]
    #[case::timeout_smaller(Some(Duration::from_secs(2)), Duration::from_secs(5), Duration::from_secs(2))]
    #[case::zero_timeout(Some(Duration::ZERO), Duration::from_secs(5), Duration::from_secs(5))]
    #[case::zero_poll(None, Duration::ZERO, Duration::ZERO)]
    fn poll_interval_clamps_to_the_deadline(
        #[case] timeout: Option<Duration>,
        #[case] poll_interval: Duration,
        #[case] expected: Duration,
    ) {
        assert_eq!(effective_poll_interval(timeout, poll_interval), expected);
    }

    #[tokio::test]
    async fn counter_is_zero_right_after_create() {
        let (_, wait_group) = fresh_wait_group().await;
        assert_eq!(wait_group.counter().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn attach_to_unknown_uid_fails_with_not_found() {
        let storage = Arc::new(InMemoryStorage::new());
        let uid = WaitGroupUid::new("wg-never-created");

        let err = WaitGroup::attach(storage, uid.clone()).await.unwrap_err();
        assert!(matches!(err, WaitGroupError::NotFound(u) if u == uid));
    }

    #[tokio::test]
    async fn attach_binds_to_an_existing_record() {
        let (storage, created) = fresh_wait_group().await;
        created.add(2).await.unwrap();

        let attached = WaitGroup::attach(storage, created.uid().clone())
            .await
            .unwrap();
        assert_eq!(attached.counter().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn concurrent_adds_sum_exactly() {
        let (_, wait_group) = fresh_wait_group().await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let wait_group = wait_group.clone();
            handles.push(tokio::spawn(async move {
                wait_group.add(1).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(wait_group.counter().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn second_done_observes_minus_one() {
        let (_, wait_group) = fresh_wait_group().await;

        wait_group.add(1).await.unwrap();
        wait_group.done().await.unwrap();

        let err = wait_group.done().await.unwrap_err();
        assert!(matches!(
            err,
            WaitGroupError::NegativeCounter { counter: -1, .. }
        ));
    }

    #[tokio::test]
    async fn wait_on_satisfied_counter_returns_without_sleeping() {
        let (_, wait_group) = fresh_wait_group().await;

        let start = Instant::now();
        let satisfied = wait_group.wait(None, Duration::ZERO).await.unwrap();

        assert!(satisfied);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn wait_times_out_when_counter_stays_positive() {
        let (_, wait_group) = fresh_wait_group().await;
        wait_group.add(1).await.unwrap();

        let timeout = Duration::from_millis(200);
        let poll = Duration::from_millis(50);

        let start = Instant::now();
        let satisfied = wait_group.wait(Some(timeout), poll).await.unwrap();
        let elapsed = start.elapsed();

        assert!(!satisfied);
        assert!(elapsed >= timeout);
        assert!(elapsed <= timeout + poll + Duration::from_millis(100));
        // timed out but the work is still outstanding
        assert_eq!(wait_group.counter().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn short_deadline_is_not_overshot_by_a_long_poll() {
        let (_, wait_group) = fresh_wait_group().await;
        wait_group.add(1).await.unwrap();

        let start = Instant::now();
        let satisfied = wait_group
            .wait(Some(Duration::from_millis(100)), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(!satisfied);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn wait_fails_fast_on_a_negative_counter() {
        let (storage, wait_group) = fresh_wait_group().await;
        // drive the counter negative behind the engine's back
        storage.apply_delta(wait_group.uid(), -1).await.unwrap();

        let err = wait_group.wait(None, Duration::ZERO).await.unwrap_err();
        assert!(matches!(
            err,
            WaitGroupError::NegativeCounter { counter: -1, .. }
        ));
    }

    #[tokio::test]
    async fn three_workers_release_one_waiter() {
        let (_, wait_group) = fresh_wait_group().await;
        wait_group.add(3).await.unwrap();

        for delay_ms in [30u64, 60, 90] {
            let worker = wait_group.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(delay_ms)).await;
                worker.done().await.unwrap();
            });
        }

        let satisfied = wait_group
            .wait(None, Duration::from_millis(10))
            .await
            .unwrap();

        assert!(satisfied);
        assert_eq!(wait_group.counter().await.unwrap(), 0);
    }
}
