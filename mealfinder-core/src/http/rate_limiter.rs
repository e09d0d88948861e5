//! Per-key request spacing.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Keeps at least `min_delay` between requests sharing a key (a host, or a
/// whole backend).
pub struct RateLimiter {
    min_delay: Duration,
    /// Earliest instant the next request for each key may start.
    next_slot: DashMap<String, Instant>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            next_slot: DashMap::new(),
        }
    }

    /// A limiter that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Reserve the next slot for `key` and sleep until it opens.
    pub async fn wait(&self, key: &str) {
        self.wait_within(key, Duration::MAX).await;
    }

    /// Like `wait`, but gives up without reserving a slot when the next slot
    /// opens more than `budget` from now. Returns whether a slot was taken.
    ///
    /// Reservation happens under the map's shard lock, so concurrent callers
    /// for the same key get distinct, increasing slots and nobody holds a
    /// lock while sleeping.
    pub async fn wait_within(&self, key: &str, budget: Duration) -> bool {
        if self.min_delay.is_zero() {
            return true;
        }

        let now = Instant::now();
        let start = {
            let mut slot = self.next_slot.entry(key.to_string()).or_insert(now);
            let start = (*slot).max(now);
            if start.duration_since(now) > budget {
                return false;
            }
            *slot = start + self.min_delay;
            start
        };

        if start > now {
            sleep(start - now).await;
        }
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_disabled_limiter_never_waits() {
        let limiter = RateLimiter::disabled();
        let start = Instant::now();

        for _ in 0..5 {
            limiter.wait("www.themealdb.com").await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_waits_for_delay() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        let start = Instant::now();

        limiter.wait("www.themealdb.com").await;
        limiter.wait("www.themealdb.com").await;

        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        let start = Instant::now();

        limiter.wait("a.example").await;
        limiter.wait("b.example").await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_past_budget_is_refused_without_reserving() {
        let limiter = std::sync::Arc::new(RateLimiter::new(Duration::from_millis(100)));
        let budget = Duration::from_millis(250);

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..6 {
            let limiter = limiter.clone();
            tasks.spawn(async move { limiter.wait_within("openrouter", budget).await });
        }
        let mut taken = 0;
        while let Some(joined) = tasks.join_next().await {
            taken += joined.unwrap() as usize;
        }

        // Slots at 0, 100 and 200 ms fit the budget; the rest were refused
        // and left the queue where it was.
        assert_eq!(taken, 3);
        assert!(
            limiter
                .wait_within("openrouter", Duration::from_millis(150))
                .await
        );
    }
}
