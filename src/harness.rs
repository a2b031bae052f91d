//! Scenario runner used by the browser tests.
//!
//! Each scenario gets its own Chrome process and profile. Failed scenarios are
//! re-run up to the environment's retry count, and screenshots and action
//! traces are kept according to the environment's recording modes.

use crate::browser::launcher::find_chrome;
use crate::browser::{BrowserContext, ContextOptions, Page};
use crate::config::{EnvironmentConfig, SuiteConfig, TestSettings, VideoMode};
use crate::error::{Result, SuiteError};
use crate::replica::Replica;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Set to `1` to run against the environment's real storefront instead of
/// the local replica.
pub const LIVE_VAR: &str = "E2E_LIVE";

/// `1`/`true` or `0`/`false` overrides the environment's headless flag.
pub const HEADLESS_VAR: &str = "HEADLESS";

/// Overrides the storefront root for every scenario.
pub const BASE_URL_VAR: &str = "BASE_URL";

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn has_display() -> bool {
    if !cfg!(target_os = "linux") {
        return true;
    }
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|v| std::env::var(v).map(|s| !s.is_empty()).unwrap_or(false))
}

/// File-name-safe form of a scenario name.
pub fn artifact_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let trimmed = stem.trim_matches('-');
    if trimmed.is_empty() {
        "scenario".to_string()
    } else {
        trimmed.to_string()
    }
}

pub struct Harness {
    chrome: PathBuf,
    settings: TestSettings,
    env: EnvironmentConfig,
    base_url: Option<String>,
    headless: bool,
}

impl Harness {
    /// Resolve config, environment, and a Chrome binary. `None` when no
    /// browser is installed, so callers can skip.
    pub fn from_env() -> Option<Self> {
        crate::init_tracing();

        let chrome = find_chrome()?;
        let config = match SuiteConfig::load() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Failed to load config: {}. Using built-in defaults.", e);
                SuiteConfig::default()
            }
        };
        let env = config.environment();

        let mut harness = Self::new(chrome, config.settings, env);
        if let Some(headless) = env_flag(HEADLESS_VAR) {
            harness.headless = headless;
        }
        if !harness.headless && !has_display() {
            tracing::debug!("No display available, forcing headless");
            harness.headless = true;
        }
        if let Ok(url) = std::env::var(BASE_URL_VAR) {
            if !url.is_empty() {
                harness.base_url = Some(url);
            }
        }
        Some(harness)
    }

    pub fn new(chrome: PathBuf, settings: TestSettings, env: EnvironmentConfig) -> Self {
        let headless = env.headless;
        Self {
            chrome,
            settings,
            env,
            base_url: None,
            headless,
        }
    }

    /// Target `base_url` instead of the replica or the environment's URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn environment(&self) -> &EnvironmentConfig {
        &self.env
    }

    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }

    pub fn chrome_path(&self) -> &Path {
        &self.chrome
    }

    pub fn is_live(&self) -> bool {
        env_flag(LIVE_VAR).unwrap_or(false)
    }

    fn output_dir(&self) -> &Path {
        &self.settings.paths.output_dir
    }

    /// Run `scenario` against a fresh page, retrying the whole scenario on
    /// failure. The last error is returned when every attempt fails.
    pub async fn run<F, Fut>(&self, name: &str, scenario: F) -> Result<()>
    where
        F: Fn(Page) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if self.env.video != VideoMode::Off {
            tracing::warn!("Video recording is not supported; ignoring video mode for '{}'", name);
        }

        // Hold the replica for the whole scenario, retries included
        let mut replica: Option<Replica> = None;
        let base_url = match &self.base_url {
            Some(url) => url.clone(),
            None if self.is_live() => self.env.base_url.clone(),
            None => {
                let r = Replica::spawn().await?;
                let url = r.base_url().to_string();
                replica = Some(r);
                url
            }
        };

        let attempts = self.env.retries.saturating_add(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            match self.attempt(name, attempt, &base_url, &scenario).await {
                Ok(()) => {
                    if attempt > 1 {
                        tracing::info!("'{}' passed on attempt {}/{}", name, attempt, attempts);
                    }
                    last_error = None;
                    break;
                }
                Err(e) => {
                    tracing::warn!("'{}' attempt {}/{} failed: {}", name, attempt, attempts, e);
                    last_error = Some(e);
                }
            }
        }

        if let Some(r) = replica {
            r.shutdown().await;
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn attempt<F, Fut>(&self, name: &str, attempt: u32, base_url: &str, scenario: &F) -> Result<()>
    where
        F: Fn(Page) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let options = ContextOptions::new(&self.env, &self.settings)
            .with_base_url(base_url)
            .with_headless(self.headless);
        let context = BrowserContext::launch(&self.chrome, options).await?;
        let page = context.page().clone();

        let limit = Duration::from_millis(self.env.timeout);
        let result = match tokio::time::timeout(limit, scenario(page.clone())).await {
            Ok(r) => r,
            Err(_) => Err(SuiteError::Timeout(format!(
                "scenario '{}' exceeded {:?}",
                name, limit
            ))),
        };

        let failed = result.is_err();
        let stem = format!("{}-attempt{}", artifact_stem(name), attempt);
        if self.env.screenshot.keeps(failed) {
            self.save_screenshot(&page, &stem).await;
        }
        if self.env.trace.keeps(failed) {
            let path = self.output_dir().join(format!("{}.trace.jsonl", stem));
            match context.trace().write_jsonl(&path).await {
                Ok(()) => tracing::info!("Trace saved to {}", path.display()),
                Err(e) => tracing::warn!("Failed to save trace {}: {}", path.display(), e),
            }
        }

        if let Err(e) = context.close().await {
            tracing::debug!("Context close failed: {}", e);
        }
        result
    }

    async fn save_screenshot(&self, page: &Page, stem: &str) {
        let path = self.output_dir().join(format!("{}.png", stem));
        let png = match page.screenshot(true).await {
            Ok(png) => png,
            Err(e) => {
                tracing::warn!("Failed to capture screenshot for {}: {}", stem, e);
                return;
            }
        };
        if let Err(e) = tokio::fs::create_dir_all(self.output_dir()).await {
            tracing::warn!("Failed to create {}: {}", self.output_dir().display(), e);
            return;
        }
        match tokio::fs::write(&path, png).await {
            Ok(()) => tracing::info!("Screenshot saved to {}", path.display()),
            Err(e) => tracing::warn!("Failed to save screenshot {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_stem() {
        assert_eq!(artifact_stem("Checkout: empty first name"), "checkout-empty-first-name");
        assert_eq!(artifact_stem("sort_lohi"), "sort_lohi");
        assert_eq!(artifact_stem("***"), "scenario");
    }

    #[test]
    fn test_new_takes_headless_from_environment() {
        let harness = Harness::new(
            PathBuf::from("/usr/bin/chromium"),
            TestSettings::default(),
            EnvironmentConfig::staging(),
        );
        assert!(harness.headless);
        assert!(harness.base_url.is_none());

        let harness = harness.with_base_url("http://127.0.0.1:3000").with_headless(false);
        assert_eq!(harness.base_url.as_deref(), Some("http://127.0.0.1:3000"));
        assert!(!harness.headless);
    }
}
