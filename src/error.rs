use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("CDP {method} failed: {message}")]
    Cdp { method: String, message: String },

    #[error("Browser launch error: {0}")]
    Launch(String),

    #[error("No Chrome or Chromium binary found (set CHROME_PATH)")]
    BrowserNotFound,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Strict mode violation: {selector} resolved to {count} elements")]
    StrictModeViolation { selector: String, count: usize },

    #[error("Cannot read an amount from {0:?}")]
    AmountParse(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Operation failed after {attempts} attempts{strategy}. Last error: {last_error}")]
    RetryExhausted {
        attempts: u32,
        strategy: &'static str,
        last_error: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Baseline not found: {0}")]
    BaselineNotFound(String),

    #[error("Screenshot mismatch: {name} has {diff_pixels} differing pixels (allowed: {max_diff_pixels})")]
    ScreenshotMismatch {
        name: String,
        diff_pixels: u64,
        max_diff_pixels: u64,
    },
}

pub type Result<T> = std::result::Result<T, SuiteError>;

impl SuiteError {
    /// Errors a polling wait should ride out, such as evaluating while the
    /// execution context is replaced by a navigation.
    pub fn is_transient(&self) -> bool {
        matches!(self, SuiteError::Cdp { .. })
    }
}
