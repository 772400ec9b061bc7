//! Browser session lifecycle for a single crawl.
//!
//! One `CrawlSession` wraps one Chrome process: located (or overridden
//! via `CHROMIUM_PATH`), launched against a throwaway profile directory,
//! and closed unconditionally when the crawl ends. Anti-automation
//! measures live in the declarative launch configuration and in
//! [`super::stealth`], not in the navigation path.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::Page;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::BrowserSettings;

use super::CrawlError;

/// User agent presented by both the browser session and the plain HTTP
/// client, matching the spoofed platform fingerprint.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Viewport fixed to a common desktop size; headless Chrome defaults to
/// 800x600, which some sites treat as a bot signal.
const VIEWPORT: (u32, u32) = (1920, 1080);

/// How long to wait for Chrome to report the main-document response
/// status after the load completed.
const STATUS_WAIT: Duration = Duration::from_secs(3);

/// Common Chrome/Chromium installation paths.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/opt/google/chrome/google-chrome",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// A live browser session owned by exactly one in-flight crawl.
pub struct CrawlSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    // Held for the session's lifetime; removed from disk on drop so
    // parallel crawls never contend on a shared profile.
    _user_data_dir: TempDir,
}

impl CrawlSession {
    /// Launch an isolated browser configured for crawling: spoofed user
    /// agent, fixed desktop viewport, automation flags disabled.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, CrawlError> {
        let executable = match &settings.executable {
            Some(path) if path.exists() => path.clone(),
            Some(path) => {
                warn!(
                    "Configured browser executable {} does not exist, discovering instead",
                    path.display()
                );
                find_browser_executable()?
            }
            None => find_browser_executable()?,
        };

        let user_data_dir = tempfile::Builder::new()
            .prefix("mediascout-chrome-")
            .tempdir()
            .map_err(|e| CrawlError::Launch(format!("failed to create profile dir: {e}")))?;

        let mut builder = BrowserConfigBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .window_size(VIEWPORT.0, VIEWPORT.1)
            .user_data_dir(user_data_dir.path())
            .chrome_executable(executable)
            .arg(format!("--user-agent={DESKTOP_USER_AGENT}"))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--metrics-recording-only")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-software-rasterizer")
            .arg("--mute-audio")
            .arg("--hide-scrollbars");

        if settings.headless {
            builder = builder.headless_mode(HeadlessMode::default());
        } else {
            builder = builder.with_head();
        }

        if let Some(proxy) = &settings.proxy {
            builder = builder.arg(format!("--proxy-server={proxy}"));
        }

        for arg in &settings.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| CrawlError::Launch(format!("failed to build browser config: {e}")))?;

        info!("Launching browser (headless={})", settings.headless);
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CrawlError::Launch(format!("failed to launch browser: {e}")))?;

        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    // Unknown CDP events deserialize as errors on some
                    // Chrome versions; they are not fatal to the session.
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            _user_data_dir: user_data_dir,
        })
    }

    pub async fn new_page(&self) -> Result<Page, CrawlError> {
        Ok(self.browser.new_page("about:blank").await?)
    }

    /// Tear the session down. Runs on every exit path out of a crawl so
    /// no browser process or page handle leaks across requests.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

/// Navigate the page within `budget`, waiting for DOM ready plus the
/// network-idle signal, then validate the main-document status Chrome
/// reported. A status of 400 or above fails the whole crawl.
pub async fn navigate(page: &Page, target: &Url, budget: Duration) -> Result<(), CrawlError> {
    // Subscribe before navigating so the document response is not missed.
    let mut responses = page.event_listener::<EventResponseReceived>().await?;

    let navigation = async {
        page.goto(target.as_str()).await?;
        page.wait_for_navigation().await?;
        Ok::<(), chromiumoxide::error::CdpError>(())
    };

    match tokio::time::timeout(budget, navigation).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(CrawlError::Navigation(format!("{target}: {e}")));
        }
        Err(_) => return Err(CrawlError::Timeout(budget)),
    }

    match document_status(&mut responses).await {
        Some(status) if status >= 400 => Err(CrawlError::Navigation(format!(
            "{target} returned HTTP {status}"
        ))),
        Some(status) => {
            debug!("Main document loaded with HTTP {}", status);
            Ok(())
        }
        None => {
            // Chrome reports no document response for some schemes and
            // cached loads; a page we cannot classify still gets crawled.
            debug!("No document response event observed for {}", target);
            Ok(())
        }
    }
}

/// First main-document response status from the CDP event stream,
/// bounded by [`STATUS_WAIT`].
async fn document_status(responses: &mut EventStream<EventResponseReceived>) -> Option<i64> {
    tokio::time::timeout(STATUS_WAIT, async {
        while let Some(event) = responses.next().await {
            if event.r#type == ResourceType::Document {
                return Some(event.response.status);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}

/// Locate a Chrome/Chromium executable: `CHROMIUM_PATH` first, then the
/// platform path table, then `which`.
fn find_browser_executable() -> Result<PathBuf, CrawlError> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    for candidate in CHROME_PATHS {
        let path = PathBuf::from(candidate);
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    for cmd in &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(output) = Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    info!("Found browser in PATH: {}", path);
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(CrawlError::Launch(
        "Chrome/Chromium not found; install it or set CHROMIUM_PATH".to_string(),
    ))
}
