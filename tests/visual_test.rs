//! Screenshot comparison against baselines on disk.
//!
//! Browser scenarios record a baseline in one browser session and verify a
//! fresh session against it with updates turned off. The seeded-baseline
//! tests check the failure path: actual and diff images land in the output
//! directory and the baseline is left untouched.

mod common;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use storefront_e2e::browser::Page;
use storefront_e2e::config::{TestSettings, Viewport};
use storefront_e2e::fixtures::users;
use storefront_e2e::pages::LoginPage;
use storefront_e2e::utils::WaitHelper;
use storefront_e2e::visual::{SnapshotUpdate, VisualTester};
use storefront_e2e::{Harness, Result, SuiteError};
use tempfile::TempDir;

/// Baseline and result directories laid out like the configured defaults,
/// rooted in a scratch directory.
fn reports(dir: &TempDir) -> (PathBuf, PathBuf) {
    (
        dir.path().join("reports/snapshots"),
        dir.path().join("reports/test-results"),
    )
}

fn tester(settings: &TestSettings, dir: &TempDir, update: SnapshotUpdate) -> VisualTester {
    let (snapshots, output) = reports(dir);
    VisualTester::new(settings)
        .with_dirs(snapshots, output)
        .with_update(update)
}

fn solid_png(width: u32, height: u32, colour: [u8; 4]) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(colour)));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
    out.into_inner()
}

fn seed_baseline(path: &Path, png: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, png).unwrap();
}

#[derive(Debug, Clone, Copy)]
enum Shot {
    LoginDefault,
    LoginLockedOut,
    InventoryDefault,
    MenuOpen,
    MobileLogin,
    TabletInventory,
}

impl Shot {
    fn name(self) -> &'static str {
        match self {
            Shot::LoginDefault => "login-page-default",
            Shot::LoginLockedOut => "login-page-locked-out",
            Shot::InventoryDefault => "inventory-page-default",
            Shot::MenuOpen => "inventory-menu-open",
            Shot::MobileLogin => "login-page-mobile",
            Shot::TabletInventory => "inventory-page-tablet",
        }
    }
}

async fn capture(page: &Page, shot: Shot) -> Result<Vec<u8>> {
    let login = LoginPage::new(page);
    let full_page = match shot {
        Shot::LoginDefault => {
            login.navigate().await?;
            WaitHelper::new(page).wait_for_network_idle(None).await?;
            true
        }
        Shot::LoginLockedOut => {
            login.navigate().await?;
            login
                .login(users::LOCKED_OUT.username, users::LOCKED_OUT.password)
                .await?;
            login.error_text().await?;
            true
        }
        Shot::InventoryDefault => {
            common::login_as_standard_user(page).await?;
            true
        }
        Shot::MenuOpen => {
            let inventory = common::login_as_standard_user(page).await?;
            inventory.hamburger_menu.click().await?;
            WaitHelper::new(page)
                .wait_for_visible(&inventory.logout_link, None)
                .await?;
            false
        }
        Shot::MobileLogin => {
            page.set_viewport_size(Viewport::new(375, 667)).await?;
            login.navigate().await?;
            false
        }
        Shot::TabletInventory => {
            page.set_viewport_size(Viewport::new(768, 1024)).await?;
            common::login_as_standard_user(page).await?;
            false
        }
    };
    page.disable_animations().await?;
    page.screenshot(full_page).await
}

/// Record `shot` in one session, then verify a second session against the
/// stored baseline without allowing updates.
async fn assert_baseline_holds(harness: &Harness, shot: Shot) {
    let dir = TempDir::new().unwrap();
    let recorder = tester(harness.settings(), &dir, SnapshotUpdate::Missing);
    let checker = tester(harness.settings(), &dir, SnapshotUpdate::None);

    for (label, visual) in [("record", &recorder), ("verify", &checker)] {
        harness
            .run(&format!("visual {} {}", shot.name(), label), move |page| async move {
                let png = capture(&page, shot).await?;
                let diff = visual.assert_matches(shot.name(), &png)?;
                assert_eq!(diff.baseline_written, label == "record", "{}", label);
                Ok(())
            })
            .await
            .unwrap();
    }

    let (snapshots, output) = reports(&dir);
    assert!(snapshots.join(format!("{}.png", shot.name())).exists());
    assert!(!output.join(format!("{}-diff.png", shot.name())).exists());
}

#[tokio::test]
async fn test_login_page_default() {
    let Some(harness) = common::harness() else { return };
    assert_baseline_holds(&harness, Shot::LoginDefault).await;
}

#[tokio::test]
async fn test_login_page_locked_out_error() {
    let Some(harness) = common::harness() else { return };
    assert_baseline_holds(&harness, Shot::LoginLockedOut).await;
}

#[tokio::test]
async fn test_inventory_page_default() {
    let Some(harness) = common::harness() else { return };
    assert_baseline_holds(&harness, Shot::InventoryDefault).await;
}

#[tokio::test]
async fn test_inventory_menu_open() {
    let Some(harness) = common::harness() else { return };
    assert_baseline_holds(&harness, Shot::MenuOpen).await;
}

#[tokio::test]
async fn test_login_page_mobile() {
    let Some(harness) = common::harness() else { return };
    assert_baseline_holds(&harness, Shot::MobileLogin).await;

    let dir = TempDir::new().unwrap();
    let (snapshots, _) = reports(&dir);
    let visual = tester(harness.settings(), &dir, SnapshotUpdate::Missing);
    let visual = &visual;
    harness
        .run("visual mobile width", |page| async move {
            let png = capture(&page, Shot::MobileLogin).await?;
            visual.assert_matches(Shot::MobileLogin.name(), &png)?;
            Ok(())
        })
        .await
        .unwrap();
    let stored = image::open(snapshots.join("login-page-mobile.png")).unwrap();
    assert_eq!((stored.width(), stored.height()), (375, 667));
}

#[tokio::test]
async fn test_inventory_page_tablet() {
    let Some(harness) = common::harness() else { return };
    assert_baseline_holds(&harness, Shot::TabletInventory).await;
}

#[tokio::test]
async fn test_product_card() {
    let Some(harness) = common::harness() else { return };
    let dir = TempDir::new().unwrap();
    let recorder = tester(harness.settings(), &dir, SnapshotUpdate::Missing);
    let checker = tester(harness.settings(), &dir, SnapshotUpdate::None);

    for visual in [&recorder, &checker] {
        harness
            .run("visual product card", move |page| async move {
                let inventory = common::login_as_standard_user(&page).await?;
                visual
                    .check_locator(&inventory.inventory_items.first(), "product-card-default")
                    .await?;
                Ok(())
            })
            .await
            .unwrap();
    }
    let (snapshots, _) = reports(&dir);
    assert!(snapshots.join("product-card-default.png").exists());
}

#[tokio::test]
async fn test_error_state_differs_from_default() {
    let Some(harness) = common::harness() else { return };
    let dir = TempDir::new().unwrap();
    let recorder = tester(harness.settings(), &dir, SnapshotUpdate::Missing);
    let visual = tester(harness.settings(), &dir, SnapshotUpdate::None);
    let (visual, recorder) = (&visual, &recorder);

    harness
        .run("visual login error", |page| async move {
            let login = LoginPage::new(&page);
            login.navigate().await?;
            recorder.check_page(&page, "login", false).await?;

            login.login("invalid_user", "wrong_password").await?;
            login.error_text().await?;
            let png = page.screenshot(false).await?;
            let diff = visual.compare("login", &png)?;
            assert!(!diff.matches, "error banner should change the capture");
            assert!(diff.diff_pixels > 100);
            assert!(diff.diff_image_path.is_some());
            Ok(())
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_page_against_seeded_baseline_writes_diff() {
    let Some(harness) = common::harness() else { return };
    let dir = TempDir::new().unwrap();
    let visual = tester(harness.settings(), &dir, SnapshotUpdate::None);
    let (snapshots, output) = reports(&dir);

    let seeded = solid_png(800, 600, [255, 0, 255, 255]);
    let baseline = snapshots.join("login-seeded.png");
    seed_baseline(&baseline, &seeded);

    let visual = &visual;
    harness
        .run("visual seeded baseline", |page| async move {
            page.set_viewport_size(Viewport::new(800, 600)).await?;
            LoginPage::new(&page).navigate().await?;
            match visual.check_page(&page, "login-seeded", false).await {
                Err(SuiteError::ScreenshotMismatch { diff_pixels, .. }) => {
                    assert!(diff_pixels > 100, "{}", diff_pixels);
                    Ok(())
                }
                other => panic!("expected a mismatch, got {:?}", other.map(|d| d.matches)),
            }
        })
        .await
        .unwrap();

    assert!(output.join("login-seeded-actual.png").exists());
    assert!(output.join("login-seeded-diff.png").exists());
    assert_eq!(std::fs::read(&baseline).unwrap(), seeded);
}

#[test]
fn test_baselines_default_to_reports_snapshots() {
    let visual = VisualTester::new(&TestSettings::default());
    assert_eq!(
        visual.baseline_path("login-page-default"),
        PathBuf::from("reports/snapshots/login-page-default.png")
    );
}

#[test]
fn test_seeded_baseline_mismatch_keeps_baseline() {
    let dir = TempDir::new().unwrap();
    let (snapshots, output) = reports(&dir);
    let baseline = snapshots.join("checkout-summary.png");
    let seeded = solid_png(40, 30, [255, 255, 255, 255]);
    seed_baseline(&baseline, &seeded);

    let visual = tester(&TestSettings::default(), &dir, SnapshotUpdate::None);
    let actual = solid_png(40, 30, [0, 0, 0, 255]);
    let err = visual.assert_matches("checkout-summary", &actual).unwrap_err();
    assert!(matches!(
        err,
        SuiteError::ScreenshotMismatch { diff_pixels: 1200, .. }
    ));

    assert_eq!(std::fs::read(output.join("checkout-summary-actual.png")).unwrap(), actual);
    let diff = image::open(output.join("checkout-summary-diff.png")).unwrap().to_rgba8();
    assert_eq!(diff.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    assert_eq!(std::fs::read(&baseline).unwrap(), seeded);
}

#[test]
fn test_seeded_baseline_tolerance_and_update_all() {
    let dir = TempDir::new().unwrap();
    let (snapshots, _) = reports(&dir);
    let baseline = snapshots.join("cart-badge.png");
    seed_baseline(&baseline, &solid_png(20, 20, [255, 255, 255, 255]));
    let actual = solid_png(20, 20, [0, 0, 0, 255]);

    // Allowing every pixel to differ accepts the capture
    let lenient = tester(&TestSettings::default(), &dir, SnapshotUpdate::None)
        .with_tolerance(0.1, 400);
    assert!(lenient.compare("cart-badge", &actual).unwrap().matches);

    let strict = tester(&TestSettings::default(), &dir, SnapshotUpdate::None)
        .with_tolerance(0.1, 399);
    assert!(!strict.compare("cart-badge", &actual).unwrap().matches);

    let updater = tester(&TestSettings::default(), &dir, SnapshotUpdate::All);
    assert!(updater.compare("cart-badge", &actual).unwrap().baseline_written);
    assert_eq!(std::fs::read(&baseline).unwrap(), actual);
}

#[test]
fn test_missing_seeded_baseline_without_updates() {
    let dir = TempDir::new().unwrap();
    let visual = tester(&TestSettings::default(), &dir, SnapshotUpdate::None);
    let err = visual
        .compare("never-recorded", &solid_png(4, 4, [0, 0, 0, 255]))
        .unwrap_err();
    assert!(matches!(err, SuiteError::BaselineNotFound(_)));
}
