//! Re-driving flaky operations: fixed-delay retry, exponential backoff, and
//! retry-until-true for conditions.

use crate::browser::Page;
use crate::config::settings::RetrySettings;
use crate::error::{Result, SuiteError};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1_000);
pub const DEFAULT_BACKOFF_RETRIES: u32 = 5;
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Delay after failed attempt `attempt` (1-based): `base × 2^(attempt−1)`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(31);
    base.saturating_mul(1u32 << exp)
}

#[derive(Debug, Clone, Copy)]
enum Delay {
    Fixed(Duration),
    Exponential(Duration),
}

impl Delay {
    fn after(&self, attempt: u32) -> Duration {
        match *self {
            Delay::Fixed(delay) => delay,
            Delay::Exponential(base) => backoff_delay(base, attempt),
        }
    }

    fn strategy(&self) -> &'static str {
        match self {
            Delay::Fixed(_) => "",
            Delay::Exponential(_) => " with exponential backoff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryHelper {
    pub default_retries: u32,
    pub default_delay: Duration,
}

impl Default for RetryHelper {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES, DEFAULT_DELAY)
    }
}

impl RetryHelper {
    pub fn new(default_retries: u32, default_delay: Duration) -> Self {
        Self {
            default_retries,
            default_delay,
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.delay_between_retries),
        )
    }

    /// Retry with the helper's default budget and delay.
    pub async fn retry<T, E, F, Fut>(&self, operation: F) -> Result<T>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.retry_with(operation, self.default_retries, self.default_delay)
            .await
    }

    pub async fn retry_with<T, E, F, Fut>(
        &self,
        operation: F,
        retries: u32,
        delay: Duration,
    ) -> Result<T>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        run(operation, retries, Delay::Fixed(delay)).await
    }

    /// Like [`retry_with`](Self::retry_with), but the delay doubles after every
    /// failed attempt.
    pub async fn with_exponential_backoff<T, E, F, Fut>(
        &self,
        operation: F,
        max_retries: u32,
        base_delay: Duration,
    ) -> Result<T>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        run(operation, max_retries, Delay::Exponential(base_delay)).await
    }

    /// Check `condition` up to `retries` times. `false` when it never held.
    pub async fn retry_until<F, Fut>(&self, mut condition: F, retries: u32, delay: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let attempts = retries.max(1);
        for attempt in 1..=attempts {
            if condition().await {
                return true;
            }
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }
        false
    }

    pub async fn retry_click(&self, page: &Page, selector: &str) -> Result<()> {
        let locator = page.locator(selector);
        let locator = &locator;
        self.retry(move || async move { locator.click().await }).await
    }

    pub async fn retry_fill(&self, page: &Page, selector: &str, value: &str) -> Result<()> {
        let locator = page.locator(selector);
        let locator = &locator;
        self.retry(move || async move { locator.fill(value).await })
            .await
    }

    pub async fn retry_navigation(&self, page: &Page, url: &str) -> Result<()> {
        self.retry(move || async move { page.goto(url).await }).await
    }
}

async fn run<T, E, F, Fut>(mut operation: F, retries: u32, delay: Delay) -> Result<T>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let attempts = retries.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!("Operation succeeded on attempt {}/{}", attempt, attempts);
                }
                return Ok(value);
            }
            Err(e) => {
                last_error = e.to_string();
                if attempt < attempts {
                    let wait = delay.after(attempt);
                    tracing::warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt,
                        attempts,
                        last_error,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                } else {
                    tracing::warn!("Attempt {}/{} failed: {}", attempt, attempts, last_error);
                }
            }
        }
    }

    Err(SuiteError::RetryExhausted {
        attempts,
        strategy: delay.strategy(),
        last_error,
    })
}
