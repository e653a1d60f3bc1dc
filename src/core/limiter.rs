//! Token-bucket rate limiter for outbound probe calls.
//!
//! One limiter is shared across all channels tested in a cycle, so the
//! configured requests-per-second ceiling holds regardless of how many
//! probe workers are active. The bucket stores at most one token: the
//! first admission is immediate and every later one waits out its 1/R
//! share, so N admissions never finish faster than (N - 1) / R seconds.

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep_until};

/// Async token-bucket limiter.
pub struct RateLimiter {
    state: Mutex<Bucket>,
    /// Tokens added per second.
    rate: f64,
    /// Maximum stored tokens.
    capacity: f64,
}

struct Bucket {
    tokens: f64,
    refreshed: Instant,
}

impl RateLimiter {
    /// Create a limiter admitting `rps` requests per second. One token is
    /// available immediately; the burst never exceeds one.
    #[must_use]
    pub fn new(rps: u32) -> Self {
        let rate = f64::from(rps.max(1));
        Self {
            state: Mutex::new(Bucket {
                tokens: 1.0,
                refreshed: Instant::now(),
            }),
            rate,
            capacity: 1.0,
        }
    }

    /// Take one token, waiting until one is available.
    pub async fn acquire(&self) {
        let wait_until = {
            let mut bucket = self.state.lock().await;
            let now = Instant::now();
            let elapsed = now.duration_since(bucket.refreshed).as_secs_f64();
            bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
            bucket.refreshed = now;

            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                return;
            }

            // Reserve the token now; the deficit tells us how long to wait.
            let deficit = 1.0 - bucket.tokens;
            bucket.tokens -= 1.0;
            now + Duration::from_secs_f64(deficit / self.rate)
        };
        sleep_until(wait_until).await;
    }
}
