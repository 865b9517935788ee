use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// A cooperative cancellation latch shared between a caller and a running
/// search. Cloning shares the same underlying flag; `cancel()` may be called
/// from any thread, including one different from the one doing the search.
#[derive(Clone, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A single wall-clock deadline. Unlike `Cancel`, a `Deadline` is only ever
/// consulted when iterative deepening is enabled — a fixed-depth search
/// ignores it entirely, per the search options it is paired with.
#[derive(Clone, Copy, Debug)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn from_now(duration: std::time::Duration) -> Self {
        Self(Instant::now() + duration)
    }

    #[inline(always)]
    pub fn is_past(&self) -> bool {
        Instant::now() >= self.0
    }
}
