use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Suite-wide constants. Every section can be overridden from the config file;
/// omitted fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSettings {
    pub timeouts: Timeouts,
    pub retry: RetrySettings,
    pub visual: VisualSettings,
    pub browser: BrowserSettings,
    pub reports: ReportSettings,
    pub parallel: ParallelSettings,
    pub paths: PathSettings,
}

/// Timeouts in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub default: u64,
    pub action: u64,
    pub navigation: u64,
    pub assertion: u64,
    pub animation: u64,
    pub api_response: u64,
    pub file_upload: u64,
    pub page_load: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default: 30_000,
            action: 10_000,
            navigation: 30_000,
            assertion: 5_000,
            animation: 500,
            api_response: 15_000,
            file_upload: 60_000,
            page_load: 45_000,
        }
    }
}

impl Timeouts {
    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation)
    }

    pub fn assertion(&self) -> Duration {
        Duration::from_millis(self.assertion)
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation)
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load)
    }

    pub(crate) fn all(&self) -> [(&'static str, u64); 8] {
        [
            ("default", self.default),
            ("action", self.action),
            ("navigation", self.navigation),
            ("assertion", self.assertion),
            ("animation", self.animation),
            ("api_response", self.api_response),
            ("file_upload", self.file_upload),
            ("page_load", self.page_load),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    /// Milliseconds
    pub delay_between_retries: u64,
    pub exponential_backoff: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_between_retries: 1_000,
            exponential_backoff: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Animations {
    Disabled,
    Allow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotScale {
    Css,
    Device,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Per-pixel colour distance tolerance in [0, 1]
    pub threshold: f64,
    pub max_diff_pixels: u64,
    pub animations: Animations,
    pub scale: ScreenshotScale,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            max_diff_pixels: 100,
            animations: Animations::Disabled,
            scale: ScreenshotScale::Css,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub viewport: Viewport,
    pub locale: String,
    pub timezone_id: String,
    pub color_scheme: ColorScheme,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(1920, 1080),
            locale: "en-US".to_string(),
            timezone_id: "America/New_York".to_string(),
            color_scheme: ColorScheme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportOpen {
    Always,
    Never,
    OnFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub screenshot_on_failure: bool,
    pub video_on_failure: bool,
    pub trace_on_failure: bool,
    pub html_report_open: ReportOpen,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            screenshot_on_failure: true,
            video_on_failure: true,
            trace_on_failure: true,
            html_report_open: ReportOpen::Never,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelSettings {
    pub workers: u32,
    pub fully_parallel: bool,
}

impl Default for ParallelSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            fully_parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Screenshots, traces, and diff images of the current run
    pub output_dir: PathBuf,
    /// Visual regression baselines
    pub snapshot_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports/test-results"),
            snapshot_dir: PathBuf::from("reports/snapshots"),
        }
    }
}
