use crate::browser::cdp::{CdpClient, Clip};
use crate::browser::locator::Locator;
use crate::browser::poll_until;
use crate::browser::trace::ActionTrace;
use crate::config::settings::{Timeouts, Viewport};
use crate::error::{Result, SuiteError};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Quiet period that counts as "network idle".
const NETWORK_IDLE_QUIET: Duration = Duration::from_millis(500);

const DISABLE_ANIMATIONS_JS: &str = r#"(() => {
    if (document.getElementById('__e2e_no_animations')) return true;
    const style = document.createElement('style');
    style.id = '__e2e_no_animations';
    style.textContent = '*, *::before, *::after { animation: none !important; transition: none !important; caret-color: transparent !important; }';
    document.head.appendChild(style);
    return true;
})()"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    DomContentLoaded,
    Load,
    NetworkIdle,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::DomContentLoaded => "domcontentloaded",
            LoadState::Load => "load",
            LoadState::NetworkIdle => "networkidle",
        }
    }
}

/// Expected page URL.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Full URL, or a path resolved against the base URL
    Exact(String),
    /// Substring anywhere in the URL
    Contains(String),
    Regex(Regex),
}

impl UrlPattern {
    pub fn contains(fragment: impl Into<String>) -> Self {
        UrlPattern::Contains(fragment.into())
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(UrlPattern::Regex)
            .map_err(|e| SuiteError::Validation(format!("Invalid URL pattern {}: {}", pattern, e)))
    }

    pub fn matches(&self, url: &str, base_url: &str) -> bool {
        match self {
            UrlPattern::Exact(expected) => url == resolve_url(base_url, expected),
            UrlPattern::Contains(fragment) => url.contains(fragment.as_str()),
            UrlPattern::Regex(re) => re.is_match(url),
        }
    }
}

impl From<&str> for UrlPattern {
    fn from(value: &str) -> Self {
        UrlPattern::Exact(value.to_string())
    }
}

impl From<String> for UrlPattern {
    fn from(value: String) -> Self {
        UrlPattern::Exact(value)
    }
}

impl From<Regex> for UrlPattern {
    fn from(value: Regex) -> Self {
        UrlPattern::Regex(value)
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlPattern::Exact(url) => write!(f, "{}", url),
            UrlPattern::Contains(fragment) => write!(f, "*{}*", fragment),
            UrlPattern::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Join `target` onto `base_url` unless it is already absolute.
pub fn resolve_url(base_url: &str, target: &str) -> String {
    if target.contains("://") || target.starts_with("about:") || target.starts_with("data:") {
        return target.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if target.starts_with('/') {
        format!("{}{}", base, target)
    } else {
        format!("{}/{}", base, target)
    }
}

struct PageInner {
    client: Arc<CdpClient>,
    base_url: String,
    timeouts: Timeouts,
    slow_mo: Duration,
    trace: ActionTrace,
}

/// One browser tab. Clones share the same connection.
#[derive(Clone)]
pub struct Page {
    inner: Arc<PageInner>,
}

impl Page {
    pub fn new(
        client: Arc<CdpClient>,
        base_url: impl Into<String>,
        timeouts: Timeouts,
        slow_mo: Duration,
        trace: ActionTrace,
    ) -> Self {
        Self {
            inner: Arc::new(PageInner {
                client,
                base_url: base_url.into(),
                timeouts,
                slow_mo,
                trace,
            }),
        }
    }

    pub fn client(&self) -> &CdpClient {
        &self.inner.client
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.inner.timeouts
    }

    pub fn trace(&self) -> &ActionTrace {
        &self.inner.trace
    }

    pub fn resolve_url(&self, target: &str) -> String {
        resolve_url(&self.inner.base_url, target)
    }

    pub fn locator(&self, selector: &str) -> Locator {
        Locator::new(self.clone(), selector)
    }

    /// Run one user-visible action: apply slow motion, then record it in the trace.
    pub(crate) async fn traced<T, Fut>(&self, action: &str, target: Option<&str>, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        if !self.inner.slow_mo.is_zero() {
            tokio::time::sleep(self.inner.slow_mo).await;
        }
        let started = Instant::now();
        let result = fut.await;
        let elapsed = started.elapsed().as_millis() as u64;
        self.inner.trace.record(
            action,
            target,
            elapsed,
            result.as_ref().err().map(|e| e.to_string()),
        );
        result
    }

    /// Navigate to `target` (absolute, or relative to the base URL) and wait for `load`.
    pub async fn goto(&self, target: &str) -> Result<()> {
        let url = self.resolve_url(target);
        let timeout = self.inner.timeouts.navigation();
        self.traced("goto", Some(&url), async {
            self.inner.client.navigate(&url, timeout).await?;
            self.wait_for_load_state(LoadState::Load, Some(timeout)).await
        })
        .await
    }

    pub async fn url(&self) -> Result<String> {
        self.inner.client.url().await
    }

    pub async fn title(&self) -> Result<String> {
        self.inner.client.title().await
    }

    pub async fn evaluate(&self, expression: &str) -> Result<Value> {
        self.inner.client.evaluate(expression).await
    }

    /// Wait until the URL matches, then until the document has loaded.
    pub async fn wait_for_url(
        &self,
        pattern: impl Into<UrlPattern>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let pattern = pattern.into();
        let timeout = timeout.unwrap_or_else(|| self.inner.timeouts.navigation());
        let what = format!("URL {}", pattern);
        let pattern = &pattern;
        let client = &self.inner.client;
        let base = self.inner.base_url.as_str();

        poll_until(timeout, &what, move || async move {
            let url = client.url().await?;
            Ok(pattern.matches(&url, base).then_some(()))
        })
        .await?;

        self.wait_for_load_state(LoadState::Load, Some(timeout)).await
    }

    pub async fn wait_for_load_state(&self, state: LoadState, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.inner.timeouts.navigation());
        let client = &self.inner.client;
        let what = format!("load state '{}'", state.as_str());

        poll_until(timeout, &what, move || async move {
            let ready = client.ready_state().await?;
            let reached = match state {
                LoadState::DomContentLoaded => ready == "interactive" || ready == "complete",
                LoadState::Load => ready == "complete",
                LoadState::NetworkIdle => {
                    ready == "complete" && client.is_network_idle(NETWORK_IDLE_QUIET)
                }
            };
            Ok(reached.then_some(()))
        })
        .await
    }

    pub async fn wait_for_timeout(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    pub async fn set_viewport_size(&self, viewport: Viewport) -> Result<()> {
        self.inner
            .client
            .set_viewport(viewport.width, viewport.height)
            .await
    }

    /// Stop CSS animations and transitions so captures are stable.
    pub async fn disable_animations(&self) -> Result<()> {
        self.inner.client.evaluate(DISABLE_ANIMATIONS_JS).await?;
        Ok(())
    }

    /// PNG of the viewport, or of the whole document when `full_page`.
    pub async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>> {
        let clip = if full_page {
            let (width, height) = self.inner.client.content_size().await?;
            Some(Clip {
                x: 0.0,
                y: 0.0,
                width: width.ceil(),
                height: height.ceil(),
                scale: 1.0,
            })
        } else {
            None
        };
        self.traced("screenshot", None, self.inner.client.screenshot(clip))
            .await
    }
}
