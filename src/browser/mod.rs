//! Browser automation over the Chrome DevTools Protocol: process launch,
//! the CDP connection, pages, locators, and polling assertions.

pub mod cdp;
pub mod context;
pub mod expect;
pub mod launcher;
pub mod locator;
pub mod page;
pub mod port;
pub mod trace;

pub use cdp::CdpClient;
pub use context::{BrowserContext, ContextOptions};
pub use expect::{expect, expect_page, LocatorAssertions, PageAssertions};
pub use locator::{Locator, LocatorState};
pub use page::{LoadState, Page, UrlPattern};
pub use trace::ActionTrace;

use crate::error::{Result, SuiteError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Re-run `check` every [`POLL_INTERVAL`] until it yields a value or `timeout`
/// elapses. Transient CDP errors are retried; anything else aborts the wait.
pub(crate) async fn poll_until<T, F, Fut>(timeout: Duration, what: &str, mut check: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    let mut last_error: Option<String> = None;

    loop {
        match check().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_transient() => last_error = Some(e.to_string()),
            Err(e) => return Err(e),
        }

        if Instant::now() >= deadline {
            let suffix = last_error
                .map(|e| format!(" (last error: {})", e))
                .unwrap_or_default();
            return Err(SuiteError::Timeout(format!(
                "{} not reached within {:?}{}",
                what, timeout, suffix
            )));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
