use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Shared counter of finished slicing planes. Cloning gives another handle to
/// the same counter, so a front-end can watch a pipeline running elsewhere.
#[derive(Clone)]
pub struct Progress(Arc<ProgressInner>);

struct ProgressInner {
    complete: AtomicU64,
    total: AtomicU64,
}

impl Progress {
    pub fn new() -> Self {
        Self(Arc::new(ProgressInner {
            complete: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }))
    }

    /// Fraction of work done, in `0..=1`.
    pub fn progress(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        self.completed() as f32 / total as f32
    }

    pub fn complete(&self) -> bool {
        let total = self.total();
        total != 0 && self.completed() >= total
    }

    pub fn completed(&self) -> u64 {
        self.0.complete.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.0.total.load(Ordering::Relaxed)
    }

    /// Starts a new run of `total` steps.
    pub fn reset(&self, total: u64) {
        self.0.complete.store(0, Ordering::Relaxed);
        self.0.total.store(total, Ordering::Relaxed);
    }

    pub fn add_complete(&self, steps: u64) {
        self.0.complete.fetch_add(steps, Ordering::Relaxed);
    }

    pub fn set_finished(&self) {
        let total = self.total();
        self.0.complete.store(total, Ordering::Relaxed);
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}
