use crate::config::environments::{EnvironmentConfig, EnvironmentRegistry, ENV_VAR};
use crate::config::settings::TestSettings;
use crate::config::validation::{validate_environment, validate_settings};
use crate::error::{Result, SuiteError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Variable pointing at an explicit config file.
pub const CONFIG_PATH_VAR: &str = "E2E_CONFIG";

const LOCAL_CONFIG_FILE: &str = "e2e.toml";

/// Shape of the optional TOML file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    environments: Option<EnvironmentRegistry>,

    #[serde(default)]
    settings: TestSettings,
}

/// Effective configuration: built-in environments plus file overrides, and
/// the test settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteConfig {
    pub environments: EnvironmentRegistry,
    pub settings: TestSettings,
}

impl SuiteConfig {
    /// Load from the first config file found, or built-in values when none exists.
    pub fn load() -> Result<Self> {
        match find_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No config file found, using built-in configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SuiteError::Config(format!("Failed to read config from {:?}: {}", path, e))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;

        let mut environments = EnvironmentRegistry::default();
        if let Some(extra) = file.environments {
            environments.extend(extra);
        }

        validate_settings(&file.settings)?;
        for key in environments.keys() {
            if let Some(env) = environments.get(key) {
                validate_environment(env)
                    .map_err(|e| SuiteError::Config(format!("environment '{}': {}", key, e)))?;
            }
        }

        Ok(Self {
            environments,
            settings: file.settings,
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let file = ConfigFile {
            environments: Some(self.environments.clone()),
            settings: self.settings.clone(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    /// Environment chosen by the `ENV` variable.
    pub fn environment(&self) -> EnvironmentConfig {
        let selector = std::env::var(ENV_VAR).ok();
        self.environments.select(selector.as_deref())
    }
}

/// Config file lookup: `E2E_CONFIG`, then `./e2e.toml`, then the user config dir.
pub fn find_config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_VAR) {
        if !explicit.is_empty() {
            return Some(PathBuf::from(explicit));
        }
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|p| p.join("storefront-e2e").join("config.toml"))
        .filter(|p| p.exists())
}
