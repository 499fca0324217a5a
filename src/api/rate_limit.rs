use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Per-IP sliding window over all `/api/*` traffic. In-process only, same
/// as the middleware it replaces; a multi-instance deployment rate-limits
/// per instance.
#[derive(Clone)]
pub struct IpRateLimiter {
    hits: Arc<Mutex<HashMap<IpAddr, VecDeque<Instant>>>>,
    max: usize,
    window: Duration,
}

impl IpRateLimiter {
    pub fn new(max: usize, window: Duration) -> Self {
        Self {
            hits: Arc::new(Mutex::new(HashMap::new())),
            max,
            window,
        }
    }

    /// Records a hit and reports whether the caller is within its budget.
    pub fn allow(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap();
        let entry = hits.entry(ip).or_default();
        while entry.front().is_some_and(|t| now.duration_since(*t) > self.window) {
            entry.pop_front();
        }
        if entry.len() >= self.max {
            return false;
        }
        entry.push_back(now);
        true
    }
}

pub async fn ip_rate_limit(
    State(limiter): State<IpRateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    // Peer address is only present when served with connect info; its
    // absence (e.g. in-process test harnesses) skips the limiter.
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = ip {
        if !limiter.allow(ip) {
            tracing::warn!(%ip, "request rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "Too many requests from this IP, please try again later."
                })),
            )
                .into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_the_window_budget() {
        let limiter = IpRateLimiter::new(3, Duration::from_secs(60));
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert!(limiter.allow(ip));
        assert!(limiter.allow(ip));
        assert!(limiter.allow(ip));
        assert!(!limiter.allow(ip));
    }

    #[test]
    fn addresses_are_tracked_independently() {
        let limiter = IpRateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.allow("10.0.0.1".parse().unwrap()));
        assert!(limiter.allow("10.0.0.2".parse().unwrap()));
        assert!(!limiter.allow("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn hits_expire_with_the_window() {
        let limiter = IpRateLimiter::new(1, Duration::from_millis(10));
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert!(limiter.allow(ip));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.allow(ip));
    }
}
