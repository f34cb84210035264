//! Sliding-window throttle for provider calls
//!
//! Every provider request, from the scheduler and from all enrichment workers,
//! passes through one shared [`RateLimiter`].

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Limits calls to `max_calls` per sliding window
///
/// The check-and-record step runs under an async mutex, so concurrent callers
/// queue up behind whoever is currently sleeping off a full window.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_calls_per_second` calls in any one-second window
    pub fn new(max_calls_per_second: u32) -> Self {
        Self::with_window(max_calls_per_second, Duration::from_secs(1))
    }

    /// Creates a limiter with a custom window length
    pub fn with_window(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1) as usize,
            window,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Waits until a call is allowed, then records it
    pub async fn acquire(&self) {
        let mut calls = self.calls.lock().await;

        loop {
            let now = Instant::now();
            while calls
                .front()
                .is_some_and(|oldest| now.duration_since(*oldest) >= self.window)
            {
                calls.pop_front();
            }

            if calls.len() < self.max_calls {
                calls.push_back(now);
                return;
            }

            if let Some(oldest) = calls.front().copied() {
                let wait = self.window.saturating_sub(now.duration_since(oldest));
                tracing::trace!(wait_ms = wait.as_millis() as u64, "Rate limit window full");
                tokio::time::sleep(wait).await;
            }
        }
    }
}
