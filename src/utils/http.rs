use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::config::HttpConfig;
use crate::error::FetchError;

pub fn create_client(http: &HttpConfig) -> Result<Client> {
    build_client(&http.user_agent, http.timeout())
}

pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(timeout)
        .cookie_store(true)
        .pool_max_idle_per_host(2)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(client)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(http: &HttpConfig) -> Self {
        Self {
            max_attempts: http.max_attempts,
            backoff: Duration::from_millis(http.backoff_ms),
        }
    }

    /// Pause after the given failed attempt (1-based): backoff, 2x, 4x, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff.saturating_mul(factor)
    }
}

enum Failure {
    Status(u16),
    Timeout,
    Transport(reqwest::Error),
}

impl Failure {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Failure::Timeout
        } else {
            Failure::Transport(e)
        }
    }

    fn into_error(self, url: &str, attempts: u32) -> FetchError {
        let url = url.to_string();
        match self {
            Failure::Status(status) => FetchError::Status { url, status, attempts },
            Failure::Timeout => FetchError::Timeout { url, attempts },
            Failure::Transport(source) => FetchError::Transport { url, attempts, source },
        }
    }
}

/// GET `url` and return the body. Timeouts, transport errors and
/// non-success statuses are retried until `policy.max_attempts` is spent.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    policy: RetryPolicy,
) -> Result<String, FetchError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let failure = match client.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("Failed to read body from {}: {}", url, e);
                    Failure::from_reqwest(e)
                }
            },
            Ok(response) => {
                let status = response.status();
                warn!("HTTP error {}: {}", status, url);
                Failure::Status(status.as_u16())
            }
            Err(e) => {
                warn!("Request failed for {}: {}", url, e);
                Failure::from_reqwest(e)
            }
        };

        if attempt >= max_attempts {
            return Err(failure.into_error(url, attempt));
        }

        let delay = policy.delay_after(attempt);
        warn!(
            "Retrying in {:?}... (attempt {}/{})",
            delay,
            attempt + 1,
            max_attempts
        );
        sleep(delay).await;
    }
}
