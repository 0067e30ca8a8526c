//! Publish/subscribe channel for streaming result records
//!
//! A model owns two channels: one for per-iteration training progress
//! and one for per-sample test outcomes. The channels decouple the
//! training loop from whatever wants to watch it (a UI, a logger, the
//! evaluation pipeline's accumulator) without the model knowing any of
//! them. Notification runs on the caller's thread, so handlers must not
//! block for long or they stall training.

use crate::core::{ModelError, Result};
use std::sync::{Arc, Mutex};

/// Receiver of result records published on an [`ObserverChannel`]
pub trait Observer<T>: Send {
    /// Handle one published record. Returning an error marks this
    /// delivery failed; the channel still notifies remaining observers.
    fn notify(&mut self, result: &T) -> Result<()>;
}

/// Shared, lockable observer handle. Channel identity is handle
/// identity: registering two clones of the same `Arc` is a duplicate.
pub type SharedObserver<T> = Arc<Mutex<dyn Observer<T>>>;

/// Ordered registration list with in-order delivery
///
/// The registration set is mutex-guarded so observers may be added or
/// removed from a different thread than the one training; `notify`
/// snapshots the list under the lock and delivers outside it, so a
/// handler can never observe a torn list and re-entrant registration
/// does not deadlock.
pub struct ObserverChannel<T> {
    observers: Mutex<Vec<SharedObserver<T>>>,
}

impl<T> Default for ObserverChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObserverChannel<T> {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Register an observer handle. Fails if the same handle is already
    /// registered; delivery order equals registration order.
    pub fn register(&self, observer: SharedObserver<T>) -> Result<()> {
        let mut observers = self.lock();
        if observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            return Err(ModelError::DuplicateObserver);
        }
        observers.push(observer);
        Ok(())
    }

    /// Remove a previously registered observer handle.
    pub fn remove(&self, observer: &SharedObserver<T>) -> Result<()> {
        let mut observers = self.lock();
        match observers.iter().position(|o| Arc::ptr_eq(o, observer)) {
            Some(index) => {
                observers.remove(index);
                Ok(())
            }
            None => Err(ModelError::ObserverNotRegistered),
        }
    }

    /// Remove every registered observer.
    pub fn remove_all(&self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Deliver `result` to every registered observer in registration
    /// order. Continues past individual failures and reports an
    /// aggregate error when any delivery failed.
    pub fn notify(&self, result: &T) -> Result<()> {
        let snapshot: Vec<SharedObserver<T>> = self.lock().clone();
        let total = snapshot.len();
        let mut failed = 0;

        for observer in &snapshot {
            match observer.lock() {
                Ok(mut guard) => {
                    if guard.notify(result).is_err() {
                        failed += 1;
                    }
                }
                // A poisoned handle counts as a failed delivery
                Err(_) => failed += 1,
            }
        }

        if failed > 0 {
            return Err(ModelError::NotifyFailed { failed, total });
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SharedObserver<T>>> {
        // The channel never panics while holding this lock, so
        // poisoning cannot occur from within; recover rather than
        // propagate if an observer's thread panicked elsewhere.
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Observer that appends every record to an internal buffer.
///
/// Handy for tests and for callers that just want the stream collected.
pub struct CollectingObserver<T> {
    records: Vec<T>,
}

impl<T> Default for CollectingObserver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CollectingObserver<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<T: Clone + Send> Observer<T> for CollectingObserver<T> {
    fn notify(&mut self, result: &T) -> Result<()> {
        self.records.push(result.clone());
        Ok(())
    }
}
