use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::state::AppState;

/// Buckets idle longer than this are dropped by [`spawn_limiter_cleanup`].
pub const STALE_BUCKET_AGE: Duration = Duration::from_secs(300);

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// Per-IP token bucket limiter guarding the suggestion endpoint.
pub struct IpRateLimiter {
    buckets: Mutex<HashMap<IpAddr, TokenBucket>>,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

impl IpRateLimiter {
    pub fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            max_tokens,
            refill_rate,
        }
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.entry(ip).or_insert_with(|| TokenBucket {
            tokens: self.max_tokens,
            last_refill: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Remove entries that haven't been touched within `max_age`.
    pub async fn cleanup(&self, max_age: Duration) {
        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();
        buckets.retain(|_, bucket| now.duration_since(bucket.last_refill) < max_age);
    }

    pub async fn tracked(&self) -> usize {
        self.buckets.lock().await.len()
    }
}

/// Route middleware: answers 429 once the caller's bucket is empty.
/// Requests served without connect info share the loopback bucket.
pub async fn limit_by_ip(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    if !state.suggest_limiter.check(ip).await {
        tracing::debug!(%ip, "Suggestion rate limit hit");
        return AppError::TooManyRequests("too many suggestion requests".to_string())
            .into_response();
    }
    next.run(request).await
}

/// Background task that periodically evicts idle buckets.
pub fn spawn_limiter_cleanup(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STALE_BUCKET_AGE);
        loop {
            interval.tick().await;
            state.suggest_limiter.cleanup(STALE_BUCKET_AGE).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn allows_burst_within_limit() {
        let limiter = IpRateLimiter::new(5.0, 5.0);
        for _ in 0..5 {
            assert!(limiter.check(ip("127.0.0.1")).await);
        }
    }

    #[tokio::test]
    async fn rejects_over_limit_without_refill() {
        let limiter = IpRateLimiter::new(3.0, 0.0);
        let addr = ip("127.0.0.1");
        for _ in 0..3 {
            assert!(limiter.check(addr).await);
        }
        assert!(!limiter.check(addr).await);
    }

    #[tokio::test]
    async fn buckets_are_per_ip() {
        let limiter = IpRateLimiter::new(1.0, 0.0);
        assert!(limiter.check(ip("10.0.0.1")).await);
        assert!(!limiter.check(ip("10.0.0.1")).await);
        assert!(limiter.check(ip("10.0.0.2")).await);
    }

    #[tokio::test]
    async fn refill_is_proportional_to_elapsed_time() {
        let limiter = IpRateLimiter::new(2.0, 4.0);
        let addr = ip("127.0.0.1");
        let start = Instant::now();
        assert!(limiter.check_at(addr, start).await);
        assert!(limiter.check_at(addr, start).await);
        assert!(!limiter.check_at(addr, start).await);

        // 4 tokens/sec: a quarter second buys exactly one request.
        let later = start + Duration::from_millis(250);
        assert!(limiter.check_at(addr, later).await);
        assert!(!limiter.check_at(addr, later).await);
    }

    #[tokio::test]
    async fn refill_never_exceeds_burst() {
        let limiter = IpRateLimiter::new(2.0, 100.0);
        let addr = ip("127.0.0.1");
        let start = Instant::now();
        assert!(limiter.check_at(addr, start).await);

        let much_later = start + Duration::from_secs(60);
        assert!(limiter.check_at(addr, much_later).await);
        assert!(limiter.check_at(addr, much_later).await);
        assert!(!limiter.check_at(addr, much_later).await);
    }

    #[tokio::test]
    async fn cleanup_removes_stale_entries() {
        let limiter = IpRateLimiter::new(5.0, 5.0);
        limiter.check(ip("127.0.0.1")).await;
        assert_eq!(limiter.tracked().await, 1);
        limiter.cleanup(Duration::ZERO).await;
        assert_eq!(limiter.tracked().await, 0);
    }
}
