use crate::fixtures::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Environment variable selecting the target environment.
pub const ENV_VAR: &str = "ENV";

/// Environment used when the selector is unset or unknown.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoMode {
    On,
    Off,
    RetainOnFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotMode {
    On,
    Off,
    OnlyOnFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceMode {
    On,
    Off,
    RetainOnFailure,
}

impl ScreenshotMode {
    /// Whether a screenshot should be kept for a test with the given outcome.
    pub fn keeps(self, failed: bool) -> bool {
        match self {
            ScreenshotMode::On => true,
            ScreenshotMode::Off => false,
            ScreenshotMode::OnlyOnFailure => failed,
        }
    }
}

impl TraceMode {
    pub fn records(self) -> bool {
        !matches!(self, TraceMode::Off)
    }

    pub fn keeps(self, failed: bool) -> bool {
        match self {
            TraceMode::On => true,
            TraceMode::Off => false,
            TraceMode::RetainOnFailure => failed,
        }
    }
}

/// One target environment. Selected once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Display name
    pub name: String,

    /// Storefront root URL
    pub base_url: String,

    /// Backend API URL
    pub api_url: String,

    /// Per-test timeout in milliseconds
    pub timeout: u64,

    /// Whole-test retries after a failure
    #[serde(default)]
    pub retries: u32,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Delay inserted before every browser action, in milliseconds
    #[serde(default)]
    pub slow_mo: u64,

    #[serde(default = "default_video")]
    pub video: VideoMode,

    #[serde(default = "default_screenshot")]
    pub screenshot: ScreenshotMode,

    #[serde(default = "default_trace")]
    pub trace: TraceMode,
}

fn default_true() -> bool {
    true
}

fn default_video() -> VideoMode {
    VideoMode::RetainOnFailure
}

fn default_screenshot() -> ScreenshotMode {
    ScreenshotMode::OnlyOnFailure
}

fn default_trace() -> TraceMode {
    TraceMode::RetainOnFailure
}

impl EnvironmentConfig {
    pub fn development() -> Self {
        Self {
            name: "Development".to_string(),
            base_url: paths::BASE.to_string(),
            api_url: "https://api.saucedemo.com".to_string(),
            timeout: 30_000,
            retries: 0,
            headless: false,
            slow_mo: 100,
            video: VideoMode::On,
            screenshot: ScreenshotMode::On,
            trace: TraceMode::On,
        }
    }

    pub fn staging() -> Self {
        Self {
            name: "Staging".to_string(),
            base_url: "https://staging.saucedemo.com".to_string(),
            api_url: "https://staging-api.saucedemo.com".to_string(),
            timeout: 30_000,
            retries: 1,
            headless: true,
            slow_mo: 0,
            video: VideoMode::RetainOnFailure,
            screenshot: ScreenshotMode::OnlyOnFailure,
            trace: TraceMode::RetainOnFailure,
        }
    }

    pub fn production() -> Self {
        Self {
            name: "Production".to_string(),
            base_url: paths::BASE.to_string(),
            api_url: "https://api.saucedemo.com".to_string(),
            timeout: 60_000,
            retries: 2,
            headless: true,
            slow_mo: 0,
            video: VideoMode::RetainOnFailure,
            screenshot: ScreenshotMode::OnlyOnFailure,
            trace: TraceMode::RetainOnFailure,
        }
    }
}

/// Named environment table. Built-ins can be extended or replaced from the
/// config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentRegistry {
    environments: BTreeMap<String, EnvironmentConfig>,
}

impl Default for EnvironmentRegistry {
    fn default() -> Self {
        let mut environments = BTreeMap::new();
        environments.insert("dev".to_string(), EnvironmentConfig::development());
        environments.insert("staging".to_string(), EnvironmentConfig::staging());
        environments.insert("prod".to_string(), EnvironmentConfig::production());
        Self { environments }
    }
}

impl EnvironmentRegistry {
    pub fn get(&self, key: &str) -> Option<&EnvironmentConfig> {
        self.environments.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, config: EnvironmentConfig) {
        self.environments.insert(key.into(), config);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }

    /// Merge another table on top of this one; entries with the same key win.
    pub fn extend(&mut self, other: EnvironmentRegistry) {
        self.environments.extend(other.environments);
    }

    /// Look up `key`, falling back to `dev` without logging.
    pub fn by_name(&self, key: &str) -> EnvironmentConfig {
        self.get(key)
            .or_else(|| self.get(DEFAULT_ENVIRONMENT))
            .cloned()
            .unwrap_or_else(EnvironmentConfig::development)
    }

    /// Resolve a selector value. Unknown names fall back to `dev` with a warning.
    pub fn select(&self, selector: Option<&str>) -> EnvironmentConfig {
        let key = selector
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ENVIRONMENT);

        match self.get(key) {
            Some(config) => {
                tracing::info!("Running tests in {} environment", config.name);
                config.clone()
            }
            None => {
                tracing::warn!(
                    "Unknown environment: {}. Defaulting to '{}'.",
                    key,
                    DEFAULT_ENVIRONMENT
                );
                self.by_name(DEFAULT_ENVIRONMENT)
            }
        }
    }
}

/// Resolve the environment from the `ENV` variable against the built-in table.
pub fn get_environment() -> EnvironmentConfig {
    let selector = std::env::var(ENV_VAR).ok();
    EnvironmentRegistry::default().select(selector.as_deref())
}

pub fn get_environment_by_name(name: &str) -> EnvironmentConfig {
    EnvironmentRegistry::default().by_name(name)
}
