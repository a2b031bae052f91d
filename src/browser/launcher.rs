use crate::config::settings::Viewport;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Variable overriding Chrome discovery.
pub const CHROME_PATH_VAR: &str = "CHROME_PATH";

/// Options for one test browser process.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub cdp_port: u16,
    pub user_data_dir: PathBuf,
    pub headless: bool,
    pub viewport: Viewport,
    pub locale: String,
    pub extra_args: Vec<String>,
}

/// Find a Chrome or Chromium binary.
///
/// Discovery order: `CHROME_PATH`, well-known install locations, then `PATH`.
pub fn find_chrome() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CHROME_PATH_VAR) {
        let pb = PathBuf::from(&p);
        if pb.exists() {
            return Some(pb);
        }
        tracing::warn!("{} points at missing file {}", CHROME_PATH_VAR, p);
    }

    let candidates: &[&str] = {
        #[cfg(target_os = "linux")]
        {
            &[
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/usr/bin/chromium-browser",
                "/usr/bin/chromium",
                "/usr/local/bin/google-chrome",
                "/snap/bin/chromium",
            ]
        }
        #[cfg(target_os = "macos")]
        {
            &[
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ]
        }
        #[cfg(target_os = "windows")]
        {
            &[
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            ]
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            &[]
        }
    };

    for path in candidates {
        let pb = PathBuf::from(path);
        if pb.exists() {
            return Some(pb);
        }
    }

    for name in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(out) = std::process::Command::new("which").arg(name).output() {
            if out.status.success() {
                let p = String::from_utf8_lossy(&out.stdout).trim().to_string();
                let pb = PathBuf::from(&p);
                if !p.is_empty() && pb.exists() {
                    return Some(pb);
                }
            }
        }
    }

    None
}

/// Build the Chrome command line for an isolated, remotely debuggable browser.
pub fn build_command(chrome_path: &Path, options: &LaunchOptions) -> Command {
    let mut cmd = Command::new(chrome_path);

    cmd.arg(format!("--remote-debugging-port={}", options.cdp_port));
    cmd.arg(format!(
        "--user-data-dir={}",
        options.user_data_dir.display()
    ));

    if options.headless {
        cmd.arg("--headless=new");
        cmd.arg("--disable-gpu");
        cmd.arg("--hide-scrollbars");
    }

    cmd.arg(format!(
        "--window-size={},{}",
        options.viewport.width, options.viewport.height
    ));
    cmd.arg(format!("--lang={}", options.locale));

    cmd.arg("--no-first-run");
    cmd.arg("--no-default-browser-check");
    cmd.arg("--disable-background-networking");
    cmd.arg("--disable-sync");
    cmd.arg("--disable-default-apps");
    cmd.arg("--disable-dev-shm-usage");
    cmd.arg("--disable-crash-reporter");

    for arg in &options.extra_args {
        cmd.arg(arg);
    }

    // Start on about:blank so the first target is a page
    cmd.arg("about:blank");

    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());
    cmd.kill_on_drop(true);

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(headless: bool) -> LaunchOptions {
        LaunchOptions {
            cdp_port: 9333,
            user_data_dir: PathBuf::from("/tmp/storefront-profile"),
            headless,
            viewport: Viewport::new(1920, 1080),
            locale: "en-US".to_string(),
            extra_args: vec![],
        }
    }

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.as_std()
            .get_args()
            .map(|s| s.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_build_command_headless_profile() {
        let cmd = build_command(Path::new("/usr/bin/google-chrome"), &options(true));
        let args = args_of(&cmd);

        assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/storefront-profile".to_string()));
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(args.contains(&"--lang=en-US".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("about:blank"));
    }

    #[test]
    fn test_build_command_lets_chrome_pick_port() {
        let mut opts = options(true);
        opts.cdp_port = crate::browser::port::DYNAMIC_PORT;
        let args = args_of(&build_command(Path::new("/usr/bin/chromium"), &opts));
        assert!(args.contains(&"--remote-debugging-port=0".to_string()));
    }

    #[test]
    fn test_build_command_headed_with_extra_args() {
        let mut opts = options(false);
        opts.extra_args.push("--force-device-scale-factor=1".to_string());
        let cmd = build_command(Path::new("/usr/bin/google-chrome"), &opts);
        let args = args_of(&cmd);

        assert!(!args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--force-device-scale-factor=1".to_string()));
    }
}
