use chrono::NaiveDate;
use futures::lock::{Mutex, OwnedMutexGuard};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on tracked (employee, day) keys; one working day per
/// employee is live at a time, so this is never reached in practice.
const MAX_TRACKED_KEYS: u64 = 200_000;

/// Per (employee, day) async mutexes.
///
/// Entries expire after being idle for the configured time, which lets past
/// days age out on their own. A guard keeps its mutex alive even if the
/// cache entry is evicted meanwhile.
#[derive(Clone)]
pub struct ScanLocks {
    locks: Cache<(u64, NaiveDate), Arc<Mutex<()>>>,
}

impl ScanLocks {
    pub fn new(idle: Duration) -> Self {
        Self {
            locks: Cache::builder()
                .max_capacity(MAX_TRACKED_KEYS)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Waits until no other scan for the same employee and day is in flight.
    pub async fn acquire(&self, employee_id: u64, day: NaiveDate) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with((employee_id, day), async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}
