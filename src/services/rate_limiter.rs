use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use crate::{
    error::{Result, ServiceError},
    models::AccessLevel,
};

#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub basic_per_window: usize,
    pub premium_per_window: usize,
    pub window: Duration,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            basic_per_window: 20,
            premium_per_window: 60,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimits {
    /// `None` means unlimited.
    fn limit_for(&self, level: AccessLevel) -> Option<usize> {
        match level {
            AccessLevel::Basic => Some(self.basic_per_window),
            AccessLevel::Premium => Some(self.premium_per_window),
            AccessLevel::Admin => None,
        }
    }
}

/// Sliding-window request limiter keyed by user id.
pub struct RateLimiter {
    limits: RateLimits,
    hits: Mutex<HashMap<i64, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Records a request, or rejects it when the user's window is full.
    pub async fn check(&self, user_id: i64, level: AccessLevel) -> Result<()> {
        let Some(limit) = self.limits.limit_for(level) else {
            return Ok(());
        };

        let now = Instant::now();
        let window = self.limits.window;

        let mut hits = self.hits.lock().await;
        for q in hits.values_mut() {
            while q.front().is_some_and(|t| now.duration_since(*t) >= window) {
                q.pop_front();
            }
        }
        // users idle for a full window
        hits.retain(|_, q| !q.is_empty());

        let q = hits.entry(user_id).or_default();

        if q.len() >= limit {
            let retry_after = q
                .front()
                .map(|t| window.saturating_sub(now.duration_since(*t)))
                .unwrap_or(window);
            tracing::debug!(user_id, limit, "rate limited");
            return Err(ServiceError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }

        q.push_back(now);
        Ok(())
    }

    /// Users with hits inside the current window.
    pub async fn tracked_users(&self) -> usize {
        self.hits.lock().await.len()
    }
}
