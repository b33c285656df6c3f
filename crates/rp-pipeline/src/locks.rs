use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per reference ID, created on demand.
///
/// Entries are dropped again once nobody holds or waits on them, so the
/// table only ever contains reference IDs with calls in flight.
#[derive(Default)]
pub(crate) struct ReferenceLocks {
    table: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ReferenceLocks {
    pub(crate) async fn acquire(&self, reference_id: &str) -> ReferenceGuard<'_> {
        let slot = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(table.entry(reference_id.to_string()).or_default())
        };
        let guard = Arc::clone(&slot).lock_owned().await;
        ReferenceGuard {
            locks: self,
            reference_id: reference_id.to_string(),
            slot,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Held for the duration of a reference ID's critical section.
pub(crate) struct ReferenceGuard<'a> {
    locks: &'a ReferenceLocks,
    reference_id: String,
    slot: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ReferenceGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut table = self.locks.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Table entry plus our own handle; anything more means someone is waiting.
        if Arc::strong_count(&self.slot) == 2 {
            table.remove(&self.reference_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn entries_are_released() {
        let locks = ReferenceLocks::default();
        {
            let _a = locks.acquire("ref-1").await;
            let _b = locks.acquire("ref-2").await;
            assert_eq!(locks.len(), 2);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_reference_is_serialized() {
        let locks = Arc::new(ReferenceLocks::default());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                tokio::spawn(async move {
                    let _g = locks.acquire("shared").await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for t in tasks {
            t.await.unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 0);
    }
}
