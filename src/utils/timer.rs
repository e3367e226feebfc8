//! Timer utilities
//!
//! Provides an injectable clock and elapsed-time measurement on top of it.

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Source of time for anything that waits
///
/// Production code uses [`TokioClock`]; tests substitute a manual clock so
/// polling loops run without real delays.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Simple timer for measuring elapsed time against a [`Clock`]
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    /// Create and start a new timer
    pub fn start<C: Clock + ?Sized>(clock: &C, label: impl Into<String>) -> Self {
        Self {
            start: clock.now(),
            label: label.into(),
        }
    }

    /// Get elapsed time
    pub fn elapsed<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        clock.now().saturating_duration_since(self.start)
    }

    /// Stop timer and return elapsed time
    pub fn stop<C: Clock + ?Sized>(self, clock: &C) -> Duration {
        let elapsed = self.elapsed(clock);
        tracing::debug!("{}: {}ms", self.label, elapsed.as_millis());
        elapsed
    }
}
