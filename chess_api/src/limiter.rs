//! Sliding-window rate limiter for the shared API endpoints.
//!
//! The window is a deque of successful-request instants. Before each call the
//! caller awaits [`SlidingWindow::acquire`], which prunes instants older than
//! `now - window` and, if the window is full, sleeps until the oldest instant
//! falls out (plus a small margin). Requests are only counted once the server
//! answered 200, via [`SlidingWindow::record`].

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Sliding-window limiter: at most `limit` recorded requests in any trailing
/// `window` period.
pub struct SlidingWindow {
    window: Duration,
    limit: usize,
    margin: Duration,
    stamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindow {
    /// Create a limiter allowing `limit` requests per `window`, sleeping an
    /// extra `margin` past the window edge to absorb clock jitter.
    pub fn new(window: Duration, limit: usize, margin: Duration) -> Self {
        Self {
            window,
            limit,
            margin,
            stamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until the window has room for one more request.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut stamps = self.stamps.lock().expect("limiter lock");
                let now = Instant::now();
                while let Some(&oldest) = stamps.front() {
                    if now.duration_since(oldest) >= self.window {
                        stamps.pop_front();
                    } else {
                        break;
                    }
                }
                if stamps.len() < self.limit {
                    return;
                }
                let oldest = *stamps.front().expect("non-empty at limit");
                self.window - now.duration_since(oldest) + self.margin
            };
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limit window full");
            tokio::time::sleep(wait).await;
        }
    }

    /// Record a successful request at the current instant.
    pub fn record(&self) {
        self.stamps
            .lock()
            .expect("limiter lock")
            .push_back(Instant::now());
    }
}
