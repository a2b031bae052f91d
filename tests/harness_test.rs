//! Scenario retries and failure artifacts.

use std::sync::atomic::{AtomicU32, Ordering};
use storefront_e2e::browser::launcher::find_chrome;
use storefront_e2e::config::{EnvironmentConfig, ScreenshotMode, TestSettings, TraceMode, VideoMode};
use storefront_e2e::harness::artifact_stem;
use storefront_e2e::pages::LoginPage;
use storefront_e2e::{Harness, SuiteError};

fn harness_in(dir: &std::path::Path, retries: u32) -> Option<Harness> {
    let Some(chrome) = find_chrome() else {
        eprintln!("SKIP: no Chrome or Chromium found (set CHROME_PATH)");
        return None;
    };
    let mut settings = TestSettings::default();
    settings.paths.output_dir = dir.to_path_buf();
    let env = EnvironmentConfig {
        retries,
        video: VideoMode::Off,
        screenshot: ScreenshotMode::OnlyOnFailure,
        trace: TraceMode::RetainOnFailure,
        ..EnvironmentConfig::staging()
    };
    Some(Harness::new(chrome, settings, env).with_headless(true))
}

#[tokio::test]
async fn test_failed_attempt_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let Some(harness) = harness_in(dir.path(), 1) else { return };
    let counter = AtomicU32::new(0);
    let calls = &counter;

    harness
        .run("flaky once", move |page| async move {
            LoginPage::new(&page).navigate().await?;
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(SuiteError::Assertion("first attempt fails".to_string()));
            }
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 2);
    let stem = artifact_stem("flaky once");
    // Only the failed attempt keeps artifacts
    assert!(dir.path().join(format!("{}-attempt1.png", stem)).exists());
    assert!(dir.path().join(format!("{}-attempt1.trace.jsonl", stem)).exists());
    assert!(!dir.path().join(format!("{}-attempt2.png", stem)).exists());
}

#[tokio::test]
async fn test_last_error_returned_when_all_attempts_fail() {
    let dir = tempfile::tempdir().unwrap();
    let Some(harness) = harness_in(dir.path(), 0) else { return };

    let err = harness
        .run("always fails", |page| async move {
            LoginPage::new(&page).navigate().await?;
            page.locator("#does-not-exist").click().await
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SuiteError::Timeout(_)), "{}", err);
    let trace = std::fs::read_to_string(dir.path().join("always-fails-attempt1.trace.jsonl")).unwrap();
    let entries: Vec<serde_json::Value> = trace
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(entries[0]["action"], "goto");
    let click = entries.iter().find(|e| e["action"] == "click").unwrap();
    assert_eq!(click["success"], false);
    assert!(click["error"].as_str().unwrap().contains("#does-not-exist"));
}
