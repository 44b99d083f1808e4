//! Token-bucket rate limiter shared by every partner call.
//!
//! The gateway enforces one ceiling per key across all endpoints. The bucket
//! holds at most `capacity` tokens, starts full, and refills continuously at
//! `capacity / window`. [`RateLimiter::acquire`] never rejects; it sleeps
//! until the requested tokens exist.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Creates a limiter allowing `capacity` tokens per `window`.
    ///
    /// A zero capacity is raised to 1 and a zero window to 1 ms so the
    /// limiter can always make progress.
    #[must_use]
    pub fn new(capacity: u32, window: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        let window_secs = window.as_secs_f64().max(0.001);
        Self {
            capacity,
            refill_per_sec: capacity / window_secs,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Waits until `n` tokens are available, then takes them.
    ///
    /// Requests larger than the capacity are clamped to the capacity. Waiters
    /// are served in arrival order: the bucket lock is held while sleeping off
    /// the deficit.
    pub async fn acquire(&self, n: u32) {
        let wanted = f64::from(n).min(self.capacity);
        if f64::from(n) > self.capacity {
            tracing::warn!(
                requested = n,
                capacity = self.capacity,
                "token request exceeds bucket capacity; clamping"
            );
        }

        let mut bucket = self.bucket.lock().await;
        loop {
            self.refill(&mut bucket);
            if bucket.tokens >= wanted {
                bucket.tokens -= wanted;
                return;
            }

            let deficit = wanted - bucket.tokens;
            let wait = Duration::from_secs_f64(deficit / self.refill_per_sec);
            tracing::debug!(
                wait_ms = wait.as_millis(),
                requested = n,
                "rate limit budget exhausted; waiting for refill"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Tokens currently available (after refill).
    pub async fn available(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        self.refill(&mut bucket);
        bucket.tokens
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;
    }
}
