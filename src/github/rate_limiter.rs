use reqwest::Response;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Tracks the primary rate-limit budget reported by GitHub and refuses to send
/// requests once it is spent. Never sleeps: an exhausted budget is an error.
pub struct RateLimiter {
    state: Mutex<RateLimitState>,
}

#[derive(Default)]
struct RateLimitState {
    remaining: Option<u32>,
    reset_at: Option<u64>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RateLimitState::default()),
        }
    }

    pub fn check(&self) -> Result<()> {
        self.check_at(unix_now())
    }

    fn check_at(&self, now: u64) -> Result<()> {
        let state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };

        if state.remaining == Some(0) {
            if let Some(reset_at) = state.reset_at {
                if reset_at > now {
                    return Err(Error::RateLimited(reset_at - now));
                }
            }
        }

        Ok(())
    }

    pub fn update_from_response(&self, response: &Response) {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let remaining = header("x-ratelimit-remaining").and_then(|v| v.parse().ok());
        let reset_at = header("x-ratelimit-reset").and_then(|v| v.parse().ok());
        self.record(remaining, reset_at);
    }

    fn record(&self, remaining: Option<u32>, reset_at: Option<u64>) {
        let Some(remaining) = remaining else {
            return;
        };

        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.remaining = Some(remaining);
        if reset_at.is_some() {
            state.reset_at = reset_at;
        }

        if remaining < 10 {
            tracing::warn!("GitHub rate limit nearly exhausted: {} requests left", remaining);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
