//! Web-first assertions: each one re-reads the page until it holds or the
//! assertion timeout runs out, then fails with the last value it saw.

use crate::browser::locator::Locator;
use crate::browser::page::{Page, UrlPattern};
use crate::browser::POLL_INTERVAL;
use crate::error::{Result, SuiteError};
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Collapse whitespace runs and trim, the way rendered text compares.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Poll `read` until `check` accepts its value. Transient read errors are retried.
async fn assert_eventually<T, F, Fut, C>(
    timeout: Duration,
    description: &str,
    mut read: F,
    check: C,
) -> Result<()>
where
    T: Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&T) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let received = match read().await {
            Ok(value) if check(&value) => return Ok(()),
            Ok(value) => format!("{:?}", value),
            Err(e) if e.is_transient() => e.to_string(),
            Err(e) => return Err(e),
        };

        if Instant::now() >= deadline {
            return Err(SuiteError::Assertion(format!(
                "{} (timeout {:?}); received: {}",
                description, timeout, received
            )));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

pub fn expect(locator: &Locator) -> LocatorAssertions {
    LocatorAssertions {
        timeout: locator.page().timeouts().assertion(),
        locator: locator.clone(),
    }
}

pub fn expect_page(page: &Page) -> PageAssertions {
    PageAssertions {
        timeout: page.timeouts().assertion(),
        page: page.clone(),
    }
}

pub struct LocatorAssertions {
    locator: Locator,
    timeout: Duration,
}

impl LocatorAssertions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Single match whose whitespace-normalized text equals `expected`.
    pub async fn to_have_text(&self, expected: &str) -> Result<()> {
        let expected = normalize_whitespace(expected);
        let locator = &self.locator;
        assert_eventually(
            self.timeout,
            &format!("{} expected to have text {:?}", locator, expected),
            move || async move {
                let texts = locator.all_text_contents().await?;
                if texts.len() > 1 {
                    return Err(SuiteError::StrictModeViolation {
                        selector: locator.to_string(),
                        count: texts.len(),
                    });
                }
                Ok(texts.first().map(|t| normalize_whitespace(t)))
            },
            |text| text.as_deref() == Some(expected.as_str()),
        )
        .await
    }

    pub async fn to_contain_text(&self, expected: &str) -> Result<()> {
        let expected = normalize_whitespace(expected);
        let locator = &self.locator;
        assert_eventually(
            self.timeout,
            &format!("{} expected to contain text {:?}", locator, expected),
            move || async move {
                let texts = locator.all_text_contents().await?;
                Ok(texts.iter().map(|t| normalize_whitespace(t)).collect::<Vec<_>>())
            },
            |texts| texts.iter().any(|t| t.contains(expected.as_str())),
        )
        .await
    }

    pub async fn to_have_count(&self, expected: usize) -> Result<()> {
        let locator = &self.locator;
        assert_eventually(
            self.timeout,
            &format!("{} expected to have count {}", locator, expected),
            move || async move { locator.count().await },
            |count| *count == expected,
        )
        .await
    }

    pub async fn to_be_visible(&self) -> Result<()> {
        let locator = &self.locator;
        assert_eventually(
            self.timeout,
            &format!("{} expected to be visible", locator),
            move || async move { locator.is_visible().await },
            |visible| *visible,
        )
        .await
    }

    pub async fn to_be_hidden(&self) -> Result<()> {
        let locator = &self.locator;
        assert_eventually(
            self.timeout,
            &format!("{} expected to be hidden", locator),
            move || async move { locator.is_visible().await },
            |visible| !*visible,
        )
        .await
    }

    pub async fn to_be_enabled(&self) -> Result<()> {
        let locator = &self.locator;
        assert_eventually(
            self.timeout,
            &format!("{} expected to be enabled", locator),
            move || async move {
                match locator.is_enabled().await {
                    Err(SuiteError::ElementNotFound(_)) => Ok(false),
                    other => other,
                }
            },
            |enabled| *enabled,
        )
        .await
    }

    pub async fn to_have_value(&self, expected: &str) -> Result<()> {
        let locator = &self.locator;
        assert_eventually(
            self.timeout,
            &format!("{} expected to have value {:?}", locator, expected),
            move || async move { locator.input_value().await },
            |value| value == expected,
        )
        .await
    }
}

pub struct PageAssertions {
    page: Page,
    timeout: Duration,
}

impl PageAssertions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn to_have_url(&self, expected: impl Into<UrlPattern>) -> Result<()> {
        let pattern = expected.into();
        let page = &self.page;
        assert_eventually(
            self.timeout,
            &format!("page expected to have URL {}", pattern),
            move || async move { page.url().await },
            |url| pattern.matches(url, page.base_url()),
        )
        .await
    }

    pub async fn to_have_title(&self, expected: &str) -> Result<()> {
        let page = &self.page;
        assert_eventually(
            self.timeout,
            &format!("page expected to have title {:?}", expected),
            move || async move { page.title().await },
            |title| title == expected,
        )
        .await
    }
}
