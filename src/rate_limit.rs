//! Outbound request pacing for the price provider.
//!
//! One limiter instance is shared by every concurrent fetch task and enforces
//! a minimum interval between permitted requests, independent of how many
//! callers are waiting. This replaces sleep-after-call pacing: a burst of K
//! acquisitions is spread out to at least (K - 1) intervals end-to-end.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Interval rate limiter with FIFO fairness.
///
/// Each `acquire` reserves the next free slot under a fair async mutex
/// (tokio's `Mutex` queues waiters in arrival order), then sleeps until its
/// slot without holding the lock. Cancelling a pending `acquire` (dropping
/// the future, e.g. through a run deadline) leaves the limiter consistent:
/// a reserved slot simply elapses unused, and no slot is ever double-granted.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter permitting `requests_per_second` operations per
    /// second (e.g. 5/sec spaces requests 200ms apart).
    ///
    /// `requests_per_second` must be positive; configuration validates this
    /// before construction.
    pub fn new(requests_per_second: u32) -> Self {
        debug_assert!(requests_per_second > 0);
        Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(requests_per_second.max(1))),
            next_slot: Mutex::new(None),
        }
    }

    /// Suspend until it is safe to issue the next request.
    pub async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }

    /// Minimum spacing between permitted requests.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn interval_matches_rate() {
        assert_eq!(RateLimiter::new(5).interval(), Duration::from_millis(200));
        assert_eq!(RateLimiter::new(1).interval(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn first_acquire_is_immediate() {
        let limiter = RateLimiter::new(5);
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_acquires_are_spaced_out() {
        // 8 acquisitions at 5/sec must take at least 7 * 200ms end-to-end.
        let limiter = Arc::new(RateLimiter::new(5));
        let start = Instant::now();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(7 * 200));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_waiter_does_not_corrupt_state() {
        let limiter = Arc::new(RateLimiter::new(5));
        limiter.acquire().await;

        // A cancelled acquisition mid-wait must not wedge later callers.
        {
            let limiter = Arc::clone(&limiter);
            let pending = tokio::spawn(async move { limiter.acquire().await });
            tokio::task::yield_now().await;
            pending.abort();
            let _ = pending.await;
        }

        let start = Instant::now();
        limiter.acquire().await;
        // At most two intervals: its own slot plus the one the aborted
        // caller had reserved.
        assert!(start.elapsed() <= Duration::from_millis(400));
    }
}
