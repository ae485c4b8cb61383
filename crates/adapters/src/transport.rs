// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Rate-Limited HTTP Transport (§4.B): a shared facade REST-speaking
//! backends build requests through. A 429 triggers retry with exponential
//! backoff and jitter, honoring `Retry-After` when the server sends one;
//! every other status (including other 4xx/5xx) is returned to the caller
//! unchanged — classifying those is the backend's job, since only it knows
//! what a 404 means for its own resource shape.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tsk_core::Error;

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_delay: StdDuration,
    pub max_delay: StdDuration,
    pub max_retries: u32,
    pub jitter: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_delay: StdDuration::from_millis(500),
            max_delay: StdDuration::from_secs(30),
            max_retries: 5,
            jitter: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RateLimitStats {
    pub events: Vec<DateTime<Utc>>,
}

impl RateLimitStats {
    pub fn count(&self) -> usize {
        self.events.len()
    }
}

pub struct Transport {
    backend_id: String,
    client: reqwest::Client,
    config: TransportConfig,
    stats: Arc<Mutex<RateLimitStats>>,
}

impl Transport {
    pub fn new(backend_id: impl Into<String>, client: reqwest::Client, config: TransportConfig) -> Self {
        Self { backend_id: backend_id.into(), client, config, stats: Arc::new(Mutex::new(RateLimitStats::default())) }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn stats(&self) -> RateLimitStats {
        self.stats.lock().clone()
    }

    /// Sends a request built fresh by `build` on every attempt (so a
    /// retried request replays the same buffered body rather than relying
    /// on a consumed stream), retrying on 429 until `max_retries` is
    /// exhausted or `cancel` fires.
    pub async fn send(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, Error> {
        for attempt in 0..=self.config.max_retries {
            if cancel.is_cancelled() {
                return Err(Error::cancelled());
            }

            let response = build()
                .send()
                .await
                .map_err(|e| classify_reqwest_error(&self.backend_id, e))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            self.stats.lock().events.push(Utc::now());

            if attempt == self.config.max_retries {
                return Err(Error::rate_limited(format!(
                    "rate limit exhausted after {} attempts",
                    attempt + 1
                ))
                .with_backend(self.backend_id.clone()));
            }

            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let delay = self.compute_delay(attempt, retry_after);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(Error::cancelled()),
            }
        }

        unreachable!("loop always returns before exhausting its range")
    }

    fn compute_delay(&self, attempt: u32, retry_after: Option<StdDuration>) -> StdDuration {
        if let Some(delay) = retry_after {
            return delay;
        }
        let exponential = self.config.base_delay.saturating_mul(1u32 << attempt.min(20));
        let capped = exponential.min(self.config.max_delay);
        if self.config.jitter {
            let factor = rand::thread_rng().gen_range(0.8..=1.2);
            StdDuration::from_secs_f64(capped.as_secs_f64() * factor)
        } else {
            capped
        }
    }
}

/// Accepts non-negative integer seconds or an HTTP-date. Past dates
/// collapse to zero rather than a negative/error delay.
fn parse_retry_after(value: &str) -> Option<StdDuration> {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Some(StdDuration::from_secs(seconds));
    }
    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let now = Utc::now();
    let delta = date.with_timezone(&Utc) - now;
    Some(delta.to_std().unwrap_or(StdDuration::ZERO))
}

fn classify_reqwest_error(backend_id: &str, err: reqwest::Error) -> Error {
    let error = if err.is_timeout() || err.is_connect() {
        Error::transient_network(err.to_string())
    } else {
        Error::internal(err.to_string())
    };
    error.with_backend(backend_id.to_string())
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
