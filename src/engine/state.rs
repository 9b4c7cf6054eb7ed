//! Shared engine state
//!
//! One `Shared` per engine, referenced by the caller's handle, the control
//! thread and the worker. Results commit in committed-query order, never in
//! completion order: every commit takes a fresh generation from
//! [`Shared::next_generation`], and [`Shared::apply`] drops any result whose
//! generation is no longer the latest.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback invoked after every committed result
pub(crate) type Notify = Arc<dyn Fn() + Send + Sync>;

pub(crate) struct Shared<T> {
    records: Arc<[T]>,
    result: Mutex<Arc<[T]>>,
    busy: AtomicBool,
    latest: AtomicU64,
    notify: Option<Notify>,
}

impl<T> Shared<T> {
    pub fn new(records: Arc<[T]>, notify: Option<Notify>) -> Self {
        let result = Mutex::new(records.clone());
        Self {
            records,
            result,
            busy: AtomicBool::new(false),
            latest: AtomicU64::new(0),
            notify,
        }
    }

    pub fn records(&self) -> &Arc<[T]> {
        &self.records
    }

    pub fn current_result(&self) -> Arc<[T]> {
        self.lock_result().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Release);
    }

    /// Allocate the generation for a newly committed query, superseding all
    /// outstanding work
    pub fn next_generation(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// True when a newer query has been committed since `generation`
    pub fn is_stale(&self, generation: u64) -> bool {
        generation < self.latest_generation()
    }

    /// Commit `result` if `generation` is still the latest
    ///
    /// Returns whether the result was applied. The staleness check runs
    /// under the result lock, so a result for a superseded query can never
    /// overwrite a newer one.
    pub fn apply(&self, generation: u64, result: Arc<[T]>) -> bool {
        let mut guard = self.lock_result();
        if generation != self.latest.load(Ordering::Acquire) {
            return false;
        }
        *guard = result;
        self.busy.store(false, Ordering::Release);
        drop(guard);

        if let Some(notify) = &self.notify {
            notify();
        }
        true
    }

    /// Commit the full, unfiltered collection (empty or below-threshold
    /// queries)
    pub fn apply_full(&self, generation: u64) -> bool {
        self.apply(generation, self.records.clone())
    }

    fn lock_result(&self) -> MutexGuard<'_, Arc<[T]>> {
        // No code path panics while holding the lock; recover anyway rather
        // than poisoning the whole engine
        self.result.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Shared<T> {
    /// Clone the records at `indices` into a result, preserving order
    pub fn materialize(&self, indices: &[u32]) -> Arc<[T]> {
        indices
            .iter()
            .map(|&i| self.records[i as usize].clone())
            .collect()
    }
}
