use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Lock for one barcode plus the number of callers holding or waiting on it
struct LockEntry {
    lock: Arc<tokio::sync::Mutex<()>>,
    users: usize,
}

type LockMap = HashMap<String, LockEntry>;

/// Per-barcode async locks.
///
/// A barcode's entry exists only while some caller holds or waits on its lock,
/// including callers whose wait is cancelled.
#[derive(Clone, Default)]
pub struct BarcodeLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl BarcodeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other caller holds the lock for `barcode`
    pub async fn acquire(&self, barcode: &str) -> BarcodeLockGuard {
        let (lock, registration) = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            let entry = locks
                .entry(barcode.to_string())
                .or_insert_with(|| LockEntry {
                    lock: Arc::new(tokio::sync::Mutex::new(())),
                    users: 0,
                });
            entry.users += 1;
            (
                entry.lock.clone(),
                Registration {
                    barcode: barcode.to_string(),
                    locks: self.locks.clone(),
                },
            )
        };

        // Dropping this future while waiting still drops `registration`
        let guard = lock.lock_owned().await;

        BarcodeLockGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Number of barcodes with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One caller's claim on a map entry, released on drop
struct Registration {
    barcode: String,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let unused = match locks.get_mut(&self.barcode) {
            Some(entry) => {
                entry.users -= 1;
                entry.users == 0
            }
            None => false,
        };
        if unused {
            locks.remove(&self.barcode);
        }
    }
}

/// Held for the duration of a check. Fields drop in order, so the mutex is
/// released before the entry can be removed.
pub struct BarcodeLockGuard {
    _guard: OwnedMutexGuard<()>,
    _registration: Registration,
}
