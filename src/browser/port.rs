//! Remote-debugging port discovery.
//!
//! Test browsers are started with `--remote-debugging-port=0`, so Chrome picks
//! a free port itself and records it in `DevToolsActivePort` inside the
//! profile directory.

use crate::error::{Result, SuiteError};
use std::path::Path;
use std::time::Duration;
use tokio::process::Child;
use tokio::time::Instant;

/// Asks Chrome to choose the debugging port.
pub const DYNAMIC_PORT: u16 = 0;

/// File Chrome writes into the user-data dir once DevTools is listening.
pub const ACTIVE_PORT_FILE: &str = "DevToolsActivePort";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// First line of `DevToolsActivePort` is the port, the second the browser
/// target path. `None` for a partial or empty write.
pub fn parse_active_port(contents: &str) -> Option<u16> {
    contents
        .lines()
        .next()
        .and_then(|line| line.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
}

/// Wait for the browser owning `data_dir` to report its debugging port.
///
/// Fails early when `child` exits before the file appears.
pub async fn wait_for_active_port(
    data_dir: &Path,
    timeout: Duration,
    mut child: Option<&mut Child>,
) -> Result<u16> {
    let path = data_dir.join(ACTIVE_PORT_FILE);
    let deadline = Instant::now() + timeout;

    loop {
        if let Ok(contents) = tokio::fs::read_to_string(&path).await {
            if let Some(port) = parse_active_port(&contents) {
                return Ok(port);
            }
        }

        if let Some(child) = child.as_deref_mut() {
            if let Some(status) = child.try_wait()? {
                return Err(SuiteError::Launch(format!(
                    "Browser exited with {} before opening DevTools",
                    status
                )));
            }
        }

        if Instant::now() >= deadline {
            return Err(SuiteError::Launch(format!(
                "{} not written to {} within {:?}",
                ACTIVE_PORT_FILE,
                data_dir.display(),
                timeout
            )));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_active_port() {
        assert_eq!(
            parse_active_port("41873\n/devtools/browser/5b0e-4c1a\n"),
            Some(41873)
        );
        assert_eq!(parse_active_port("9222"), Some(9222));
        assert_eq!(parse_active_port(""), None);
        assert_eq!(parse_active_port("0\n/devtools/browser/x"), None);
        assert_eq!(parse_active_port("41\u{0}"), None);
    }

    #[tokio::test]
    async fn test_waits_for_port_file_in_own_profile() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(ACTIVE_PORT_FILE);
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            tokio::fs::write(file, "53117\n/devtools/browser/abc\n")
                .await
                .unwrap();
        });

        let port = wait_for_active_port(dir.path(), Duration::from_secs(5), None)
            .await
            .unwrap();
        assert_eq!(port, 53117);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_ignores_browsers_outside_profile() {
        // A debugging endpoint elsewhere on the machine is never consulted
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = wait_for_active_port(dir.path(), Duration::from_millis(200), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SuiteError::Launch(_)));
        assert!(err.to_string().contains(ACTIVE_PORT_FILE));
        drop(listener);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reports_early_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg("exit 3")
            .spawn()
            .unwrap();

        let err = wait_for_active_port(dir.path(), Duration::from_secs(5), Some(&mut child))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exited"), "{}", err);
    }
}
