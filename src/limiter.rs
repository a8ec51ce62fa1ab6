//! Client-side admission gate for remote call starts
//!
//! Keeps the rate of call starts under a requests-per-minute budget using a
//! trailing 60-second window of recorded start timestamps. Admission checks
//! are serialized; operations run concurrently once admitted — the limiter
//! gates the rate of starts, not in-flight concurrency.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter configuration
///
/// `tokens_per_minute` is carried for callers that budget by tokens, but only
/// request counts gate admission.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum call starts per trailing 60 seconds
    pub requests_per_minute: u32,
    /// Token budget; configuration surface only, not enforced
    pub tokens_per_minute: u32,
    /// When false, every call runs immediately
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            tokens_per_minute: 100_000,
            enabled: true,
        }
    }
}

impl RateLimitConfig {
    /// Configuration that admits every call immediately
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Admission gate shared by the calls of one client
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    // start timestamps in the trailing window; mutated only under this lock
    starts: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            starts: Mutex::new(VecDeque::new()),
        }
    }

    /// Run `operation`, delaying its start while the window is at budget.
    ///
    /// The wait is exactly the time the oldest retained timestamp needs to
    /// leave the window. A start timestamp is recorded when the operation
    /// completes, whether it succeeded or failed.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !self.config.enabled {
            return operation().await;
        }

        {
            // lock held across the sleep: admission decisions are serialized
            let mut starts = self.starts.lock().await;
            Self::prune(&mut starts);
            if starts.len() >= self.config.requests_per_minute as usize {
                if let Some(oldest) = starts.front().copied() {
                    let wait = WINDOW.saturating_sub(oldest.elapsed());
                    if !wait.is_zero() {
                        tracing::debug!(?wait, "rate window full, delaying call start");
                        tokio::time::sleep(wait).await;
                    }
                    Self::prune(&mut starts);
                }
            }
        }

        let result = operation().await;

        let mut starts = self.starts.lock().await;
        starts.push_back(Instant::now());
        // retained window stays within budget
        while starts.len() > self.config.requests_per_minute as usize {
            starts.pop_front();
        }
        result
    }

    /// Number of starts currently retained in the trailing window
    pub async fn window_len(&self) -> usize {
        let mut starts = self.starts.lock().await;
        Self::prune(&mut starts);
        starts.len()
    }

    fn prune(starts: &mut VecDeque<Instant>) {
        let now = Instant::now();
        while starts
            .front()
            .is_some_and(|t| now.duration_since(*t) >= WINDOW)
        {
            starts.pop_front();
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn third_call_waits_for_the_window() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 2,
            ..RateLimitConfig::default()
        });

        let origin = Instant::now();
        limiter.execute(|| async {}).await;
        limiter.execute(|| async {}).await;
        assert!(origin.elapsed() < Duration::from_secs(1));

        // window holds two starts; the third must wait out the oldest
        limiter.execute(|| async {}).await;
        assert!(
            origin.elapsed() >= Duration::from_secs(60),
            "third start after {:?}",
            origin.elapsed()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn under_budget_calls_run_immediately() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 10,
            ..RateLimitConfig::default()
        });
        let origin = Instant::now();
        for _ in 0..5 {
            limiter.execute(|| async {}).await;
        }
        assert!(origin.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.window_len().await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_limiter_records_nothing() {
        let limiter = RateLimiter::new(RateLimitConfig::disabled());
        let origin = Instant::now();
        for _ in 0..100 {
            limiter.execute(|| async {}).await;
        }
        assert!(origin.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.window_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timestamps_age_out_of_the_window() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 2,
            ..RateLimitConfig::default()
        });
        limiter.execute(|| async {}).await;
        limiter.execute(|| async {}).await;
        assert_eq!(limiter.window_len().await, 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(limiter.window_len().await, 0);

        let origin = Instant::now();
        limiter.execute(|| async {}).await;
        assert!(origin.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_operations_still_record_a_start() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 5,
            ..RateLimitConfig::default()
        });
        let result: std::result::Result<(), &str> =
            limiter.execute(|| async { Err("boom") }).await;
        assert!(result.is_err());
        assert_eq!(limiter.window_len().await, 1);
    }
}
