use crate::config::environments::EnvironmentConfig;
use crate::config::settings::TestSettings;
use crate::error::{Result, SuiteError};

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Validate an environment record
pub fn validate_environment(env: &EnvironmentConfig) -> Result<()> {
    if env.name.trim().is_empty() {
        return Err(SuiteError::Validation(
            "Environment name cannot be empty".to_string(),
        ));
    }

    if !is_http_url(&env.base_url) {
        return Err(SuiteError::Validation(format!(
            "Invalid base URL: {}. Must start with http:// or https://",
            env.base_url
        )));
    }

    if !is_http_url(&env.api_url) {
        return Err(SuiteError::Validation(format!(
            "Invalid API URL: {}. Must start with http:// or https://",
            env.api_url
        )));
    }

    if env.timeout == 0 {
        return Err(SuiteError::Validation(
            "Environment timeout must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Validate test settings
pub fn validate_settings(settings: &TestSettings) -> Result<()> {
    for (name, value) in settings.timeouts.all() {
        if value == 0 {
            return Err(SuiteError::Validation(format!(
                "Timeout '{}' must be greater than zero",
                name
            )));
        }
    }

    if settings.retry.max_attempts == 0 {
        return Err(SuiteError::Validation(
            "Retry max_attempts must be at least 1".to_string(),
        ));
    }

    let threshold = settings.visual.threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(SuiteError::Validation(format!(
            "Visual threshold {} is outside [0, 1]",
            threshold
        )));
    }

    let viewport = settings.browser.viewport;
    if viewport.width == 0 || viewport.height == 0 {
        return Err(SuiteError::Validation(format!(
            "Invalid viewport {}x{}",
            viewport.width, viewport.height
        )));
    }

    Ok(())
}
