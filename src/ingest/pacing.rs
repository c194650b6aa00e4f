//! Request pacing
//!
//! Every delay in an ingestion run (between fetches, after persisting a
//! chapter, between novels) goes through a [`Throttle`]. The throttle asks a
//! [`Pacer`] how long to wait given the time since it was last marked, so
//! tests can swap in [`Unpaced`] and run without sleeping.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Maps "time since the last call" to "time to wait now"
pub trait Pacer: Send + Sync {
    /// # Arguments
    ///
    /// * `minimum` - The configured minimum gap between two calls
    /// * `since_last` - Time elapsed since the previous call, `None` on the first call
    fn wait_for(&self, minimum: Duration, since_last: Option<Duration>) -> Duration;
}

/// Enforces a minimum gap between calls; the first call never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumGap;

impl Pacer for MinimumGap {
    fn wait_for(&self, minimum: Duration, since_last: Option<Duration>) -> Duration {
        match since_last {
            Some(elapsed) => minimum.saturating_sub(elapsed),
            None => Duration::ZERO,
        }
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct Unpaced;

impl Pacer for Unpaced {
    fn wait_for(&self, _minimum: Duration, _since_last: Option<Duration>) -> Duration {
        Duration::ZERO
    }
}

/// A pacer plus the timestamp of the last call it has seen
pub struct Throttle {
    pacer: Arc<dyn Pacer>,
    minimum: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(pacer: Arc<dyn Pacer>, minimum: Duration) -> Self {
        Self {
            pacer,
            minimum,
            last: Mutex::new(None),
        }
    }

    /// Convenience constructor for a throttle that never waits
    pub fn unpaced() -> Self {
        Self::new(Arc::new(Unpaced), Duration::ZERO)
    }

    /// Waits until the pacer allows the next call, then marks it
    ///
    /// # Returns
    ///
    /// The time actually slept
    pub async fn ready(&self) -> Duration {
        let since_last = self.lock_last().map(|at| at.elapsed());
        let wait = self.pacer.wait_for(self.minimum, since_last);

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        self.mark();
        wait
    }

    /// Records "now" as the last call without waiting
    pub fn mark(&self) {
        *self.lock_last() = Some(Instant::now());
    }

    fn lock_last(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        // A poisoned timestamp is still a valid timestamp
        self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("minimum", &self.minimum)
            .finish_non_exhaustive()
    }
}
