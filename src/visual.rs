//! Screenshot comparison against stored baselines.

use crate::browser::{Locator, Page};
use crate::config::settings::{Animations, TestSettings};
use crate::error::{Result, SuiteError};
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Variable selecting how baselines are written.
pub const UPDATE_SNAPSHOTS_VAR: &str = "E2E_UPDATE_SNAPSHOTS";

/// Largest possible YIQ delta between two pixels.
const MAX_YIQ_DELTA: f64 = 35_215.0;

/// When a capture may replace the stored baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotUpdate {
    /// Never write baselines; a missing one is an error
    None,
    /// Write baselines that do not exist yet
    #[default]
    Missing,
    /// Overwrite every baseline with the new capture
    All,
}

impl SnapshotUpdate {
    pub fn from_env() -> Self {
        match std::env::var(UPDATE_SNAPSHOTS_VAR) {
            Ok(value) => value.parse().unwrap_or_else(|e: String| {
                warn!("{}", e);
                SnapshotUpdate::default()
            }),
            Err(_) => SnapshotUpdate::default(),
        }
    }
}

impl FromStr for SnapshotUpdate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "0" | "false" => Ok(SnapshotUpdate::None),
            "missing" | "" => Ok(SnapshotUpdate::Missing),
            "all" | "1" | "true" => Ok(SnapshotUpdate::All),
            other => Err(format!(
                "Unknown {} value '{}'; expected none, missing, or all",
                UPDATE_SNAPSHOTS_VAR, other
            )),
        }
    }
}

/// Outcome of one comparison.
#[derive(Debug, Clone)]
pub struct VisualDiff {
    pub matches: bool,
    pub diff_pixels: u64,
    pub total_pixels: u64,
    /// Set when the baseline was created or replaced by this run
    pub baseline_written: bool,
    pub diff_image_path: Option<PathBuf>,
    pub actual_hash: String,
    pub baseline_hash: String,
}

/// YIQ colour distance between two pixels after blending onto white,
/// on the 0..=35215 scale.
pub fn pixel_delta(a: &Rgba<u8>, b: &Rgba<u8>) -> f64 {
    let (ya, ia, qa) = yiq(a);
    let (yb, ib, qb) = yiq(b);
    let (y, i, q) = (ya - yb, ia - ib, qa - qb);
    0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q
}

fn yiq(px: &Rgba<u8>) -> (f64, f64, f64) {
    let alpha = px[3] as f64 / 255.0;
    let blend = |c: u8| 255.0 + (c as f64 - 255.0) * alpha;
    let (r, g, b) = (blend(px[0]), blend(px[1]), blend(px[2]));
    (
        r * 0.298_895_31 + g * 0.586_622_47 + b * 0.114_482_23,
        r * 0.595_977_99 - g * 0.274_176_10 - b * 0.321_801_89,
        r * 0.211_470_17 - g * 0.522_617_11 + b * 0.311_146_94,
    )
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn file_name(name: &str) -> String {
    if name.ends_with(".png") {
        name.to_string()
    } else {
        format!("{}.png", name)
    }
}

pub struct VisualTester {
    snapshot_dir: PathBuf,
    output_dir: PathBuf,
    /// Per-pixel tolerance in [0, 1]
    threshold: f64,
    max_diff_pixels: u64,
    animations: Animations,
    update: SnapshotUpdate,
}

impl VisualTester {
    /// Tester using the configured directories and tolerances, with the
    /// update mode taken from [`UPDATE_SNAPSHOTS_VAR`].
    pub fn new(settings: &TestSettings) -> Self {
        Self {
            snapshot_dir: settings.paths.snapshot_dir.clone(),
            output_dir: settings.paths.output_dir.clone(),
            threshold: settings.visual.threshold,
            max_diff_pixels: settings.visual.max_diff_pixels,
            animations: settings.visual.animations,
            update: SnapshotUpdate::from_env(),
        }
    }

    pub fn with_dirs(mut self, snapshot_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = snapshot_dir.into();
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_update(mut self, update: SnapshotUpdate) -> Self {
        self.update = update;
        self
    }

    pub fn with_tolerance(mut self, threshold: f64, max_diff_pixels: u64) -> Self {
        self.threshold = threshold;
        self.max_diff_pixels = max_diff_pixels;
        self
    }

    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.snapshot_dir.join(file_name(name))
    }

    fn write_baseline(&self, path: &Path, png: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, png)?;
        Ok(())
    }

    /// Compare PNG bytes against the baseline called `name`.
    pub fn compare(&self, name: &str, png: &[u8]) -> Result<VisualDiff> {
        let baseline_path = self.baseline_path(name);
        let actual_hash = sha256_hex(png);

        let write_through = match self.update {
            SnapshotUpdate::All => true,
            SnapshotUpdate::Missing => !baseline_path.exists(),
            SnapshotUpdate::None => false,
        };
        if write_through {
            self.write_baseline(&baseline_path, png)?;
            info!("Wrote baseline {}", baseline_path.display());
            return Ok(VisualDiff {
                matches: true,
                diff_pixels: 0,
                total_pixels: 0,
                baseline_written: true,
                diff_image_path: None,
                baseline_hash: actual_hash.clone(),
                actual_hash,
            });
        }

        if !baseline_path.exists() {
            return Err(SuiteError::BaselineNotFound(
                baseline_path.display().to_string(),
            ));
        }

        let baseline_bytes = std::fs::read(&baseline_path)?;
        let baseline_hash = sha256_hex(&baseline_bytes);
        if baseline_hash == actual_hash {
            debug!("Screenshot '{}' matches baseline byte for byte", name);
            return Ok(VisualDiff {
                matches: true,
                diff_pixels: 0,
                total_pixels: 0,
                baseline_written: false,
                diff_image_path: None,
                actual_hash,
                baseline_hash,
            });
        }

        let actual = image::load_from_memory(png)?.to_rgba8();
        let baseline = image::load_from_memory(&baseline_bytes)?.to_rgba8();

        let size_mismatch = actual.dimensions() != baseline.dimensions();
        let (diff_pixels, total_pixels, diff_image) = if size_mismatch {
            warn!(
                "Screenshot '{}' size {:?} differs from baseline {:?}",
                name,
                actual.dimensions(),
                baseline.dimensions()
            );
            let (aw, ah) = actual.dimensions();
            let (bw, bh) = baseline.dimensions();
            let total = (aw as u64 * ah as u64).max(bw as u64 * bh as u64);
            (total, total, None)
        } else {
            let (count, diff) = self.diff_images(&actual, &baseline);
            (count, actual.width() as u64 * actual.height() as u64, Some(diff))
        };

        let matches = !size_mismatch && diff_pixels <= self.max_diff_pixels;
        let mut diff_image_path = None;
        if !matches {
            warn!(
                "Visual regression in '{}': {} of {} pixels differ (allowed {})",
                name, diff_pixels, total_pixels, self.max_diff_pixels
            );
            std::fs::create_dir_all(&self.output_dir)?;
            let stem = file_name(name).trim_end_matches(".png").to_string();
            std::fs::write(self.output_dir.join(format!("{}-actual.png", stem)), png)?;
            if let Some(diff) = diff_image {
                let path = self.output_dir.join(format!("{}-diff.png", stem));
                diff.save(&path)?;
                diff_image_path = Some(path);
            }
        }

        Ok(VisualDiff {
            matches,
            diff_pixels,
            total_pixels,
            baseline_written: false,
            diff_image_path,
            actual_hash,
            baseline_hash,
        })
    }

    fn diff_images(&self, actual: &RgbaImage, baseline: &RgbaImage) -> (u64, RgbaImage) {
        let limit = MAX_YIQ_DELTA * self.threshold * self.threshold;
        let mut diff = RgbaImage::new(actual.width(), actual.height());
        let mut count = 0u64;

        for (x, y, a) in actual.enumerate_pixels() {
            let b = baseline.get_pixel(x, y);
            if pixel_delta(a, b) > limit {
                count += 1;
                diff.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            } else {
                // Faded copy of the original for context
                diff.put_pixel(x, y, Rgba([a[0] / 4 + 191, a[1] / 4 + 191, a[2] / 4 + 191, 255]));
            }
        }
        (count, diff)
    }

    /// Compare and turn a mismatch into [`SuiteError::ScreenshotMismatch`].
    pub fn assert_matches(&self, name: &str, png: &[u8]) -> Result<VisualDiff> {
        let diff = self.compare(name, png)?;
        if !diff.matches {
            return Err(SuiteError::ScreenshotMismatch {
                name: file_name(name),
                diff_pixels: diff.diff_pixels,
                max_diff_pixels: self.max_diff_pixels,
            });
        }
        Ok(diff)
    }

    pub async fn check_page(&self, page: &Page, name: &str, full_page: bool) -> Result<VisualDiff> {
        if self.animations == Animations::Disabled {
            page.disable_animations().await?;
        }
        let png = page.screenshot(full_page).await?;
        self.assert_matches(name, &png)
    }

    pub async fn check_locator(&self, locator: &Locator, name: &str) -> Result<VisualDiff> {
        if self.animations == Animations::Disabled {
            locator.page().disable_animations().await?;
        }
        let png = locator.screenshot().await?;
        self.assert_matches(name, &png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat};
    use std::io::Cursor;

    fn png(width: u32, height: u32, paint: impl Fn(u32, u32) -> Rgba<u8>) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, paint));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    fn tester(dir: &Path, update: SnapshotUpdate) -> VisualTester {
        VisualTester::new(&TestSettings::default())
            .with_dirs(dir.join("snapshots"), dir.join("results"))
            .with_update(update)
    }

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_pixel_delta_bounds() {
        assert_eq!(pixel_delta(&WHITE, &WHITE), 0.0);
        let black_white = pixel_delta(&WHITE, &BLACK);
        assert!(black_white > 30_000.0 && black_white <= MAX_YIQ_DELTA, "got {}", black_white);
        // Fully transparent pixels blend to white
        assert!(pixel_delta(&Rgba([0, 0, 0, 0]), &WHITE) < 1e-6);
    }

    #[test]
    fn test_parse_update_mode() {
        assert_eq!("none".parse::<SnapshotUpdate>(), Ok(SnapshotUpdate::None));
        assert_eq!("ALL".parse::<SnapshotUpdate>(), Ok(SnapshotUpdate::All));
        assert_eq!("missing".parse::<SnapshotUpdate>(), Ok(SnapshotUpdate::Missing));
        assert!("sometimes".parse::<SnapshotUpdate>().is_err());
    }

    #[test]
    fn test_missing_baseline_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester(dir.path(), SnapshotUpdate::Missing);
        let shot = png(8, 8, |_, _| WHITE);

        let diff = tester.compare("login-page", &shot).unwrap();
        assert!(diff.matches);
        assert!(diff.baseline_written);
        assert!(tester.baseline_path("login-page").exists());

        let again = tester.compare("login-page.png", &shot).unwrap();
        assert!(again.matches);
        assert!(!again.baseline_written);
    }

    #[test]
    fn test_missing_baseline_without_update_fails() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester(dir.path(), SnapshotUpdate::None);
        let err = tester.compare("cart-page", &png(4, 4, |_, _| WHITE)).unwrap_err();
        assert!(matches!(err, SuiteError::BaselineNotFound(_)));
    }

    #[test]
    fn test_small_differences_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester(dir.path(), SnapshotUpdate::Missing).with_tolerance(0.1, 100);
        tester.compare("grid", &png(20, 20, |_, _| WHITE)).unwrap();

        // 40 black pixels: above threshold each, but under max_diff_pixels
        let shot = png(20, 20, |x, y| if y < 2 && x < 25 { BLACK } else { WHITE });
        let diff = tester.compare("grid", &shot).unwrap();
        assert_eq!(diff.diff_pixels, 40);
        assert!(diff.matches);

        // Near-white noise stays under the per-pixel threshold
        let faint = png(20, 20, |_, _| Rgba([250, 250, 250, 255]));
        let diff = tester.compare("grid", &faint).unwrap();
        assert_eq!(diff.diff_pixels, 0);
    }

    #[test]
    fn test_large_difference_fails_and_writes_diff() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester(dir.path(), SnapshotUpdate::Missing);
        tester.compare("inventory", &png(20, 20, |_, _| WHITE)).unwrap();

        let err = tester
            .assert_matches("inventory", &png(20, 20, |_, _| BLACK))
            .unwrap_err();
        match err {
            SuiteError::ScreenshotMismatch { diff_pixels, max_diff_pixels, .. } => {
                assert_eq!(diff_pixels, 400);
                assert_eq!(max_diff_pixels, 100);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(dir.path().join("results/inventory-diff.png").exists());
        assert!(dir.path().join("results/inventory-actual.png").exists());
    }

    #[test]
    fn test_size_mismatch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester(dir.path(), SnapshotUpdate::Missing);
        tester.compare("header", &png(10, 10, |_, _| WHITE)).unwrap();

        let diff = tester.compare("header", &png(12, 10, |_, _| WHITE)).unwrap();
        assert!(!diff.matches);
        assert_eq!(diff.total_pixels, 120);
    }

    #[test]
    fn test_update_all_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        tester(dir.path(), SnapshotUpdate::Missing)
            .compare("footer", &png(4, 4, |_, _| WHITE))
            .unwrap();
        let black = png(4, 4, |_, _| BLACK);
        let diff = tester(dir.path(), SnapshotUpdate::All)
            .compare("footer", &black)
            .unwrap();
        assert!(diff.baseline_written);
        assert_eq!(std::fs::read(dir.path().join("snapshots/footer.png")).unwrap(), black);
    }
}
