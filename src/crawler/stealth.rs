//! Fingerprint spoofing applied once when a page is created.
//!
//! Scripts are registered with `Page.addScriptToEvaluateOnNewDocument`
//! so they run before any page script can read the unspoofed values.
//! Based on puppeteer-extra-plugin-stealth techniques; this covers
//! naive automation checks only, not full fingerprinting suites.

use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, SetBlockedUrLsParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use tracing::debug;

use super::CrawlError;
use super::session::DESKTOP_USER_AGENT;

/// Request patterns failed at the network layer. Stylesheets and fonts
/// contribute nothing to media discovery and dominate load time on
/// image-heavy listing pages.
const BLOCKED_URL_PATTERNS: &[&str] = &["*.css", "*.woff", "*.woff2", "*.ttf", "*.otf"];

/// Evasion scripts, injected in order.
const STEALTH_SCRIPTS: &[&str] = &[
    // Remove the webdriver flag
    r#"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined,
        configurable: true
    });
    "#,
    // Benign chrome object; its absence is the cheapest headless check
    r#"
    window.chrome = {
        runtime: {},
        loadTimes: function() {},
        csi: function() {},
        app: {}
    };
    "#,
    // Permissions API consistent with a real browser
    r#"
    const originalQuery = window.navigator.permissions.query;
    window.navigator.permissions.query = (parameters) => (
        parameters.name === 'notifications' ?
        Promise.resolve({ state: Notification.permission }) :
        originalQuery(parameters)
    );
    "#,
    // Plugins as regular Chrome reports them
    r#"
    Object.defineProperty(navigator, 'plugins', {
        get: () => [
            { name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer', description: 'Portable Document Format' },
            { name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai', description: '' },
            { name: 'Native Client', filename: 'internal-nacl-plugin', description: '' }
        ],
        configurable: true
    });
    "#,
    // Languages
    r#"
    Object.defineProperty(navigator, 'languages', {
        get: () => ['en-US', 'en'],
        configurable: true
    });
    "#,
];

/// Apply the session's declarative anti-automation configuration to a
/// fresh page: evasion scripts, user-agent override, and the blocked
/// request patterns. Must run before the first navigation.
pub async fn prepare_page(page: &Page) -> Result<(), CrawlError> {
    debug!("Registering {} stealth scripts", STEALTH_SCRIPTS.len());
    for script in STEALTH_SCRIPTS {
        page.execute(AddScriptToEvaluateOnNewDocumentParams {
            source: (*script).to_string(),
            include_command_line_api: None,
            world_name: None,
            run_immediately: None,
        })
        .await?;
    }

    page.execute(SetUserAgentOverrideParams::new(DESKTOP_USER_AGENT))
        .await?;

    page.execute(EnableParams::default()).await?;
    page.execute(SetBlockedUrLsParams::new(
        BLOCKED_URL_PATTERNS
            .iter()
            .map(|pattern| (*pattern).to_string())
            .collect::<Vec<_>>(),
    ))
    .await?;

    Ok(())
}
