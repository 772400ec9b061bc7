//! Media-discovery crawler for third-party listing pages.
//!
//! Each crawl owns exactly one stealth browser session: launch, navigate
//! with a hard budget, reveal lazy galleries by clicking likely
//! affordances, harvest media URLs across DOM snapshots, and tear the
//! session down on every exit path. Exploration faults are recovered
//! locally; only navigation-level failures surface to the caller.

mod aggregate;
mod explore;
mod extract;
mod session;
mod stealth;

pub use aggregate::MediaAggregator;
pub use extract::{classify_snapshot, DomMediaSnapshot, ExtractedMedia};
pub use session::DESKTOP_USER_AGENT;

use std::time::Duration;

use chromiumoxide::Page;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

use crate::config::BrowserSettings;
use crate::models::MediaAsset;

use session::CrawlSession;

/// Hard budget for the initial navigation.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);

/// Bounded race-wait for any media element to appear after load. The
/// crawl continues regardless of the outcome.
const MEDIA_WAIT: Duration = Duration::from_secs(10);

/// Settle delay after the initial load, for lazy loaders and galleries
/// that hydrate asynchronously.
const LOAD_SETTLE: Duration = Duration::from_secs(5);

/// Settle delay after each qualifying click during exploration.
pub(crate) const CLICK_SETTLE: Duration = Duration::from_secs(2);

/// Errors that can fail a crawl. Anything not represented here (bad
/// selectors, unclickable elements, detached nodes) is swallowed during
/// exploration and the crawl returns whatever it found.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Target unreachable, unparsable, or responded with HTTP >= 400.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The navigation budget was exceeded.
    #[error("navigation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Chrome could not be located, configured, or launched.
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// CDP transport fault outside of navigation.
    #[error("browser session error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),
}

/// Crawl one listing page and return its classified, de-duplicated media.
///
/// The browser session is torn down on every success and error path, so
/// no Chrome process or page handle leaks across requests.
pub async fn run_crawl(
    target_url: &str,
    settings: &BrowserSettings,
) -> Result<Vec<MediaAsset>, CrawlError> {
    let target = Url::parse(target_url)
        .map_err(|e| CrawlError::Navigation(format!("invalid target url {target_url:?}: {e}")))?;

    let session = CrawlSession::launch(settings).await?;
    let result = crawl_on_session(&session, &target).await;
    session.close().await;
    result
}

async fn crawl_on_session(
    session: &CrawlSession,
    target: &Url,
) -> Result<Vec<MediaAsset>, CrawlError> {
    let page = session.new_page().await?;
    stealth::prepare_page(&page).await?;
    session::navigate(&page, target, NAVIGATION_TIMEOUT).await?;

    wait_for_media(&page).await;
    tokio::time::sleep(LOAD_SETTLE).await;

    // Relative URLs resolve against wherever navigation actually landed,
    // which may differ from the requested URL after redirects.
    let base = current_url(&page).await.unwrap_or_else(|| target.clone());

    let mut aggregator = MediaAggregator::new();
    aggregator.merge(extract::extract_media(&page, &base).await);
    explore::explore_galleries(&page, &base, &mut aggregator).await;

    info!(
        "Crawl of {} found {} images, {} videos, {} floor plans",
        target,
        aggregator.image_count(),
        aggregator.video_count(),
        aggregator.floorplan_count(),
    );

    Ok(aggregator.into_assets())
}

/// Poll for the first `img`/`video`/`iframe` to show up, bounded by
/// [`MEDIA_WAIT`]. Pages without media still settle normally.
async fn wait_for_media(page: &Page) {
    let deadline = Instant::now() + MEDIA_WAIT;
    let poll_interval = Duration::from_millis(200);

    while Instant::now() < deadline {
        if page.find_element("img, video, iframe").await.is_ok() {
            return;
        }
        tokio::time::sleep(poll_interval).await;
    }
    debug!(
        "No media elements appeared within {}s, continuing",
        MEDIA_WAIT.as_secs()
    );
}

async fn current_url(page: &Page) -> Option<Url> {
    let raw = page.url().await.ok().flatten()?;
    Url::parse(&raw).ok()
}
