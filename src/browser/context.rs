use crate::browser::cdp::CdpClient;
use crate::browser::launcher::{build_command, LaunchOptions};
use crate::browser::page::Page;
use crate::browser::port::{wait_for_active_port, DYNAMIC_PORT};
use crate::browser::trace::ActionTrace;
use crate::config::environments::EnvironmentConfig;
use crate::config::settings::{ColorScheme, TestSettings, Timeouts, Viewport};
use crate::error::{Result, SuiteError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Child;

/// How long a freshly spawned browser gets to expose its DevTools endpoint.
const ATTACH_TIMEOUT: Duration = Duration::from_secs(20);

/// Everything needed to start one isolated browser for a test.
#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub base_url: String,
    pub headless: bool,
    pub slow_mo: Duration,
    pub viewport: Viewport,
    pub locale: String,
    pub timezone_id: String,
    pub color_scheme: ColorScheme,
    pub timeouts: Timeouts,
    pub trace: bool,
    pub extra_args: Vec<String>,
}

impl ContextOptions {
    pub fn new(env: &EnvironmentConfig, settings: &TestSettings) -> Self {
        Self {
            base_url: env.base_url.clone(),
            headless: env.headless,
            slow_mo: Duration::from_millis(env.slow_mo),
            viewport: settings.browser.viewport,
            locale: settings.browser.locale.clone(),
            timezone_id: settings.browser.timezone_id.clone(),
            color_scheme: settings.browser.color_scheme,
            timeouts: settings.timeouts,
            trace: env.trace.records(),
            extra_args: vec!["--no-sandbox".to_string()],
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

/// A browser process with a fresh profile and one page attached over CDP.
/// The process is killed and the profile removed on drop.
pub struct BrowserContext {
    child: Option<Child>,
    client: Arc<CdpClient>,
    data_dir: PathBuf,
    page: Page,
}

impl BrowserContext {
    pub async fn launch(chrome_path: &Path, options: ContextOptions) -> Result<Self> {
        let data_dir = std::env::temp_dir().join(format!(
            "storefront-e2e-{}",
            uuid::Uuid::new_v4()
        ));
        tokio::fs::create_dir_all(&data_dir).await?;

        let launch = LaunchOptions {
            cdp_port: DYNAMIC_PORT,
            user_data_dir: data_dir.clone(),
            headless: options.headless,
            viewport: options.viewport,
            locale: options.locale.clone(),
            extra_args: options.extra_args.clone(),
        };
        let child = build_command(chrome_path, &launch)
            .spawn()
            .map_err(|e| SuiteError::Launch(format!("{}: {}", chrome_path.display(), e)))?;
        let pid = child.id();

        // From here the context owns cleanup, even if attaching fails
        let mut context = PendingContext {
            child: Some(child),
            data_dir,
        };

        let cdp_port =
            wait_for_active_port(&context.data_dir, ATTACH_TIMEOUT, context.child.as_mut()).await?;
        tracing::info!(
            "Launched {} (pid {:?}) on CDP port {}",
            chrome_path.display(),
            pid,
            cdp_port
        );

        let client = Arc::new(CdpClient::attach("test", cdp_port, ATTACH_TIMEOUT).await?);
        client
            .set_viewport(options.viewport.width, options.viewport.height)
            .await?;
        client.set_timezone(&options.timezone_id).await?;
        client.set_color_scheme(options.color_scheme.as_str()).await?;

        let page = Page::new(
            Arc::clone(&client),
            options.base_url,
            options.timeouts,
            options.slow_mo,
            ActionTrace::new(options.trace),
        );

        Ok(Self {
            child: context.child.take(),
            client,
            data_dir: std::mem::take(&mut context.data_dir),
            page,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn trace(&self) -> &ActionTrace {
        self.page.trace()
    }

    pub fn cdp_port(&self) -> u16 {
        self.client.cdp_port()
    }

    /// Close the connection, stop the browser, and delete its profile.
    pub async fn close(mut self) -> Result<()> {
        self.client.close().await;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill browser: {}", e);
            }
        }
        if let Err(e) = tokio::fs::remove_dir_all(&self.data_dir).await {
            tracing::debug!("Profile {} not removed: {}", self.data_dir.display(), e);
        }
        Ok(())
    }
}

impl Drop for BrowserContext {
    fn drop(&mut self) {
        cleanup(&mut self.child, &self.data_dir);
    }
}

/// Owns a spawned browser until `launch` finishes setting it up.
struct PendingContext {
    child: Option<Child>,
    data_dir: PathBuf,
}

impl Drop for PendingContext {
    fn drop(&mut self) {
        cleanup(&mut self.child, &self.data_dir);
    }
}

fn cleanup(child: &mut Option<Child>, data_dir: &Path) {
    if let Some(mut child) = child.take() {
        let _ = child.start_kill();
    }
    if !data_dir.as_os_str().is_empty() && data_dir.exists() {
        let _ = std::fs::remove_dir_all(data_dir);
    }
}
