use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Process-wide mutual exclusion keyed by resource id.
///
/// Locks are created lazily on first use and live for the process
/// lifetime; the key space is bounded by live account and product ids,
/// so there is no eviction. Acquiring one key never blocks acquisition
/// of another.
#[derive(Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the exclusive lock for `key`, waiting until the current
    /// holder releases it. The lock is released when the returned guard
    /// is dropped, which covers every exit path.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let registry = Arc::new(LockRegistry::new());
        let counter = Arc::new(AsyncMutex::new(0u32));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                let _guard = registry.acquire("account:1").await;
                let mut count = counter.lock().await;
                *count += 1;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*counter.lock().await, 16);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let registry = Arc::new(LockRegistry::new());
        let _held = registry.acquire("account:1").await;

        // A different key must be acquirable while account:1 is held.
        let other = tokio::time::timeout(Duration::from_secs(1), registry.acquire("account:2"))
            .await
            .expect("acquiring an unrelated key should not block");
        drop(other);
    }

    #[tokio::test]
    async fn test_release_on_drop() {
        let registry = LockRegistry::new();
        {
            let _guard = registry.acquire("product:7").await;
        }
        // Reacquisition succeeds once the first guard is dropped.
        let _guard = tokio::time::timeout(Duration::from_secs(1), registry.acquire("product:7"))
            .await
            .expect("lock should be free after guard drop");
    }
}
