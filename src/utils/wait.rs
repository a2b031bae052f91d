use crate::browser::{expect, LoadState, Locator, LocatorState, Page, UrlPattern};
use crate::error::Result;
use std::time::Duration;

pub const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(30);

fn element_timeout(timeout: Option<Duration>) -> Duration {
    timeout.unwrap_or(ELEMENT_TIMEOUT)
}

fn page_timeout(timeout: Option<Duration>) -> Duration {
    timeout.unwrap_or(PAGE_TIMEOUT)
}

/// Explicit waits with their own timeouts, independent of the action and
/// assertion timeouts. Every `timeout` argument falls back to
/// [`ELEMENT_TIMEOUT`] or [`PAGE_TIMEOUT`] when `None`.
#[derive(Clone)]
pub struct WaitHelper {
    page: Page,
}

impl WaitHelper {
    pub fn new(page: &Page) -> Self {
        Self { page: page.clone() }
    }

    pub async fn wait_for_visible(&self, locator: &Locator, timeout: Option<Duration>) -> Result<()> {
        locator
            .wait_for(LocatorState::Visible, Some(element_timeout(timeout)))
            .await
    }

    pub async fn wait_for_hidden(&self, locator: &Locator, timeout: Option<Duration>) -> Result<()> {
        locator
            .wait_for(LocatorState::Hidden, Some(element_timeout(timeout)))
            .await
    }

    pub async fn wait_for_attached(&self, locator: &Locator, timeout: Option<Duration>) -> Result<()> {
        locator
            .wait_for(LocatorState::Attached, Some(element_timeout(timeout)))
            .await
    }

    /// `pattern` may be an exact URL or path, a [`UrlPattern::contains`]
    /// fragment, or a regex.
    pub async fn wait_for_url(
        &self,
        pattern: impl Into<UrlPattern>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.page
            .wait_for_url(pattern, Some(page_timeout(timeout)))
            .await
    }

    pub async fn wait_for_network_idle(&self, timeout: Option<Duration>) -> Result<()> {
        self.page
            .wait_for_load_state(LoadState::NetworkIdle, Some(page_timeout(timeout)))
            .await
    }

    pub async fn wait_for_dom_loaded(&self, timeout: Option<Duration>) -> Result<()> {
        self.page
            .wait_for_load_state(
                LoadState::DomContentLoaded,
                Some(page_timeout(timeout)),
            )
            .await
    }

    pub async fn wait_for_text(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        expect(locator)
            .with_timeout(element_timeout(timeout))
            .to_have_text(text)
            .await
    }

    pub async fn wait_for_contains_text(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        expect(locator)
            .with_timeout(element_timeout(timeout))
            .to_contain_text(text)
            .await
    }

    pub async fn wait_for_count(
        &self,
        locator: &Locator,
        count: usize,
        timeout: Option<Duration>,
    ) -> Result<()> {
        expect(locator)
            .with_timeout(element_timeout(timeout))
            .to_have_count(count)
            .await
    }

    pub async fn delay(&self, duration: Duration) {
        self.page.wait_for_timeout(duration).await;
    }

    /// Visible, then enabled, each within `timeout`.
    pub async fn wait_for_clickable(&self, locator: &Locator, timeout: Option<Duration>) -> Result<()> {
        let timeout = element_timeout(timeout);
        locator.wait_for(LocatorState::Visible, Some(timeout)).await?;
        expect(locator).with_timeout(timeout).to_be_enabled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_default_timeouts() {
        assert_eq!(element_timeout(None), Duration::from_secs(10));
        assert_eq!(page_timeout(None), Duration::from_secs(30));
        assert_eq!(
            element_timeout(Some(Duration::from_millis(250))),
            Duration::from_millis(250)
        );
        assert_eq!(page_timeout(Some(Duration::ZERO)), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_element_default_bounds_a_wait() {
        let start = Instant::now();
        let waited =
            tokio::time::timeout(element_timeout(None), std::future::pending::<()>()).await;
        assert!(waited.is_err());
        assert_eq!(start.elapsed(), ELEMENT_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_default_outlasts_element_default() {
        let start = Instant::now();
        let waited = tokio::time::timeout(
            page_timeout(None),
            tokio::time::sleep(ELEMENT_TIMEOUT * 2),
        )
        .await;
        assert!(waited.is_ok());
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }
}
