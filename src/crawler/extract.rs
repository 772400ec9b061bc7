//! DOM media harvesting and candidate classification.
//!
//! One injected script walks the live DOM and returns raw candidate
//! strings (element sources, lazy-load attributes, computed background
//! images). Everything downstream of that snapshot is pure: resolution
//! against the page base, scheme filtering, and per-type classification
//! never touch the browser and never fail — malformed candidates are
//! dropped, not propagated.

use std::sync::LazyLock;

use chromiumoxide::Page;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;
use url::Url;

/// Harvest script evaluated in the page. Keeps the passes aligned with
/// the classifier: direct/lazy image sources first, then computed
/// backgrounds, then video sources, then the floor-plan sweep.
const HARVEST_JS: &str = r#"
(() => {
    const images = [];
    const floorplans = [];
    for (const el of document.querySelectorAll('img')) {
        const src = el.currentSrc
            || el.getAttribute('src')
            || el.getAttribute('data-src')
            || el.getAttribute('data-lazy-src')
            || el.getAttribute('data-original');
        if (!src) continue;
        const hint = (src + ' ' + (el.alt || '') + ' ' + (el.className || '')).toLowerCase();
        if (hint.includes('floorplan') || hint.includes('floor-plan') || hint.includes('floor_plan')) {
            floorplans.push(src);
        } else {
            images.push(src);
        }
    }

    const backgrounds = [];
    for (const el of document.querySelectorAll('*')) {
        const bg = window.getComputedStyle(el).backgroundImage;
        if (bg && bg !== 'none') backgrounds.push(bg);
    }

    const videos = [];
    for (const el of document.querySelectorAll('video')) {
        const src = el.currentSrc || el.getAttribute('src') || el.getAttribute('data-src');
        if (src) videos.push(src);
        for (const source of el.querySelectorAll('source')) {
            const s = source.getAttribute('src');
            if (s) videos.push(s);
        }
    }

    return { images, backgrounds, videos, floorplans };
})()
"#;

/// `url(...)` references inside a computed `background-image` value.
/// One declaration can carry several layers.
static CSS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#).expect("valid regex"));

/// Raw candidate strings as harvested from the DOM, before resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomMediaSnapshot {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub backgrounds: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub floorplans: Vec<String>,
}

/// Classified absolute URLs from one extraction pass. Duplicates within
/// a pass are allowed here; the aggregator is the uniqueness boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedMedia {
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub floorplans: Vec<String>,
}

/// Run the harvest script against the live page and classify the result.
/// A failed evaluation yields an empty pass — extraction problems never
/// abort a crawl.
pub async fn extract_media(page: &Page, base: &Url) -> ExtractedMedia {
    let snapshot = match page.evaluate(HARVEST_JS).await {
        Ok(result) => result.into_value::<DomMediaSnapshot>().unwrap_or_default(),
        Err(e) => {
            warn!("DOM media harvest failed, treating pass as empty: {}", e);
            DomMediaSnapshot::default()
        }
    };
    classify_snapshot(snapshot, base)
}

/// Pure classification of a harvested snapshot. Deterministic for a
/// given snapshot and base URL.
pub fn classify_snapshot(snapshot: DomMediaSnapshot, base: &Url) -> ExtractedMedia {
    let mut media = ExtractedMedia::default();

    for raw in &snapshot.images {
        if let Some(url) = resolve_candidate(raw, base) {
            media.images.push(url);
        }
    }
    for declaration in &snapshot.backgrounds {
        for candidate in background_urls(declaration) {
            if let Some(url) = resolve_candidate(candidate, base) {
                media.images.push(url);
            }
        }
    }
    for raw in &snapshot.videos {
        if let Some(url) = resolve_candidate(raw, base) {
            media.videos.push(url);
        }
    }
    for raw in &snapshot.floorplans {
        if let Some(url) = resolve_candidate(raw, base) {
            media.floorplans.push(url);
        }
    }

    media
}

/// Pull every `url(...)` reference out of a background-image value.
fn background_urls(declaration: &str) -> impl Iterator<Item = &str> {
    CSS_URL
        .captures_iter(declaration)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Resolve one raw candidate against the page base. Malformed URLs and
/// non-http(s) schemes (`data:` placeholders from lazy loaders, `blob:`)
/// are silently discarded.
fn resolve_candidate(raw: &str, base: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let resolved = base.join(raw).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.into()),
        _ => None,
    }
}
