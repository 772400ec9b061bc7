//! Heuristic gallery interaction.
//!
//! Listing sites hide most photos behind tabs and "show all photos"
//! buttons. The explorer walks a fixed table of likely selectors, clicks
//! every element whose visible text suggests a gallery affordance, and
//! re-harvests the DOM after each click. Exhaustive-but-bounded by
//! design: the selector table is the only limit, and no failure in here
//! ever aborts the crawl.

use chromiumoxide::Page;
use tracing::debug;
use url::Url;

use super::aggregate::MediaAggregator;
use super::extract;
use super::CLICK_SETTLE;

/// Candidate selectors, most specific first, generic `button`/`a` last.
const GALLERY_SELECTORS: &[&str] = &[
    "[class*='gallery']",
    "[class*='Gallery']",
    "[class*='photo']",
    "[class*='carousel']",
    "[class*='tab']",
    "[role='tab']",
    "button",
    "a",
];

/// An element qualifies when its text contains any of these,
/// case-insensitively.
const GALLERY_KEYWORDS: &[&str] = &["gallery", "photo", "image"];

fn matches_gallery_keyword(text: &str) -> bool {
    let text = text.to_lowercase();
    GALLERY_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Click every qualifying element and merge each post-settle extraction
/// pass into the aggregator. Bad selectors, unreadable or detached
/// elements, and failed clicks are skipped, never propagated.
pub async fn explore_galleries(page: &Page, base: &Url, aggregator: &mut MediaAggregator) {
    for selector in GALLERY_SELECTORS {
        let elements = match page.find_elements(*selector).await {
            Ok(elements) => elements,
            Err(e) => {
                debug!("Selector {:?} not queryable, skipping: {}", selector, e);
                continue;
            }
        };

        for element in elements {
            let text = match element.inner_text().await {
                Ok(Some(text)) => text,
                _ => continue,
            };
            if !matches_gallery_keyword(&text) {
                continue;
            }

            debug!("Clicking gallery affordance {:?} ({})", text.trim(), selector);
            if let Err(e) = element.click().await {
                debug!("Click failed, skipping element: {}", e);
                continue;
            }

            tokio::time::sleep(CLICK_SETTLE).await;
            aggregator.merge(extract::extract_media(page, base).await);
        }
    }
}
