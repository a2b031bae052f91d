//! Configuration loading: built-in environments, file overrides, validation.

use std::time::Duration;
use storefront_e2e::browser::ContextOptions;
use storefront_e2e::config::{
    get_environment_by_name, Animations, ColorScheme, EnvironmentConfig, ScreenshotMode,
    SuiteConfig, TestSettings, TraceMode, VideoMode,
};
use storefront_e2e::SuiteError;

#[test]
fn test_builtin_settings_defaults() {
    let settings = TestSettings::default();
    assert_eq!(settings.timeouts.action(), Duration::from_secs(10));
    assert_eq!(settings.timeouts.navigation(), Duration::from_secs(30));
    assert_eq!(settings.timeouts.assertion(), Duration::from_secs(5));
    assert_eq!(settings.retry.max_attempts, 3);
    assert_eq!(settings.visual.threshold, 0.1);
    assert_eq!(settings.visual.max_diff_pixels, 100);
    assert_eq!(settings.visual.animations, Animations::Disabled);
    assert_eq!(settings.browser.locale, "en-US");
    assert_eq!(settings.browser.timezone_id, "America/New_York");
    assert_eq!(settings.browser.color_scheme, ColorScheme::Light);
}

#[test]
fn test_recording_modes_per_environment() {
    let dev = get_environment_by_name("dev");
    assert_eq!(dev.video, VideoMode::On);
    assert!(dev.screenshot.keeps(false));
    assert!(dev.trace.keeps(false));

    let staging = get_environment_by_name("staging");
    assert_eq!(staging.screenshot, ScreenshotMode::OnlyOnFailure);
    assert!(!staging.screenshot.keeps(false));
    assert!(staging.screenshot.keeps(true));
    assert_eq!(staging.trace, TraceMode::RetainOnFailure);
    assert!(staging.trace.records());
    assert!(!staging.trace.keeps(false));
}

#[test]
fn test_unknown_name_is_dev() {
    assert_eq!(get_environment_by_name("qa"), EnvironmentConfig::development());
}

#[test]
fn test_load_from_file_overrides_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("e2e.toml");
    std::fs::write(
        &path,
        r#"
        [settings.timeouts]
        action = 2500

        [settings.browser]
        color_scheme = "dark"
        viewport = { width = 1280, height = 720 }

        [settings.paths]
        snapshot_dir = "baselines"

        [environments.staging]
        name = "Staging (replica)"
        base_url = "http://127.0.0.1:3000"
        api_url = "http://127.0.0.1:3000"
        timeout = 20000
        retries = 3
        "#,
    )
    .unwrap();

    let config = SuiteConfig::load_from(&path).unwrap();
    let settings = &config.settings;
    assert_eq!(settings.timeouts.action, 2_500);
    assert_eq!(settings.timeouts.navigation, 30_000);
    assert_eq!(settings.browser.color_scheme, ColorScheme::Dark);
    assert_eq!(settings.browser.viewport.width, 1280);
    assert_eq!(settings.paths.snapshot_dir.to_str(), Some("baselines"));

    let staging = config.environments.get("staging").unwrap();
    assert_eq!(staging.retries, 3);
    assert!(staging.headless);
    assert_eq!(staging.video, VideoMode::RetainOnFailure);

    // Context options follow the merged values
    let options = ContextOptions::new(staging, settings);
    assert_eq!(options.base_url, "http://127.0.0.1:3000");
    assert_eq!(options.timeouts.action(), Duration::from_millis(2_500));
    assert_eq!(options.color_scheme, ColorScheme::Dark);
    assert!(options.trace);
}

#[test]
fn test_invalid_settings_rejected() {
    let zero_timeout = SuiteConfig::from_toml_str("[settings.timeouts]\nassertion = 0\n");
    assert!(matches!(zero_timeout, Err(SuiteError::Validation(_))));

    let bad_threshold = SuiteConfig::from_toml_str("[settings.visual]\nthreshold = 1.5\n");
    assert!(matches!(bad_threshold, Err(SuiteError::Validation(_))));

    let bad_mode = SuiteConfig::from_toml_str(
        r#"
        [environments.x]
        name = "X"
        base_url = "http://x"
        api_url = "http://x"
        timeout = 1
        video = "sometimes"
        "#,
    );
    assert!(matches!(bad_mode, Err(SuiteError::TomlDeserialize(_))));
}

#[test]
fn test_missing_file_is_config_error() {
    let err = SuiteConfig::load_from(std::path::Path::new("/nonexistent/e2e.toml")).unwrap_err();
    assert!(matches!(err, SuiteError::Config(_)));
}
