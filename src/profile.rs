//! Static agent-profile extraction over raw HTML.
//!
//! No browser involved: the page is parsed once and an ordered table of
//! selector heuristics is walked with a first-match-wins rule per field.
//! Extraction never fails — malformed markup degrades to empty
//! collections and absent fields.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::models::{AgentDetails, MediaKind, ProfileExtraction, ProfileImage};

/// Fixed score assigned to every avatar candidate. A filter threshold
/// for callers, not a ranking.
const AVATAR_CONFIDENCE: f64 = 0.5;

/// An image whose src or alt contains any of these is page chrome, not
/// a person.
const EXCLUDED_IMAGE_MARKERS: &[&str] = &["icon", "logo", "favicon"];

/// Name heuristics, highest priority first: headings, then naming
/// conventions seen across agency page builders.
const NAME_SELECTORS: &[&str] = &[
    "h1",
    "h2",
    "[class*='agent-name']",
    "[id*='agent-name']",
    "[class*='profile-name']",
    "[id*='profile-name']",
    "[class*='name']",
];

/// Longest text still plausible as a personal name.
const NAME_MAX_LEN: usize = 50;

/// Position/job-title heuristics, highest priority first.
const POSITION_SELECTORS: &[&str] = &[
    "[class*='agent-title']",
    "[class*='position']",
    "[class*='job-title']",
    "[class*='role']",
    "h3",
];

/// Extract avatar candidates and best-effort contact details from one
/// profile page. `base_url` anchors relative image sources.
pub fn extract_profile(html: &str, base_url: &str) -> ProfileExtraction {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    ProfileExtraction {
        images: collect_avatar_candidates(&document, base.as_ref()),
        agent_details: AgentDetails {
            name: first_heuristic_match(&document, NAME_SELECTORS, accept_name),
            email: first_link_target(&document, "mailto:"),
            phone: first_link_target(&document, "tel:"),
            position: first_heuristic_match(&document, POSITION_SELECTORS, accept_position),
        },
    }
}

fn accept_name(text: &str) -> bool {
    text.len() < NAME_MAX_LEN
}

/// Emails and phone numbers routinely sit in title-like containers;
/// reject anything that looks like one.
fn accept_position(text: &str) -> bool {
    !text.contains('@') && !text.starts_with(|c: char| c.is_ascii_digit())
}

/// Generic first-match-wins walk over an ordered selector table. The
/// first element with non-empty trimmed text passing `accept` settles
/// the field; later heuristics are not consulted.
fn first_heuristic_match(
    document: &Html,
    selectors: &[&str],
    accept: fn(&str) -> bool,
) -> Option<String> {
    for pattern in selectors {
        let Ok(selector) = Selector::parse(pattern) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element.text().collect::<String>();
            let text = normalize_whitespace(&text);
            if !text.is_empty() && accept(&text) {
                return Some(text);
            }
        }
    }
    None
}

/// First anchor whose href carries the given scheme, with the scheme
/// prefix and any query suffix (`?subject=...`) stripped.
fn first_link_target(document: &Html, scheme: &str) -> Option<String> {
    let selector = Selector::parse(&format!("a[href^='{scheme}']")).ok()?;
    let href = document
        .select(&selector)
        .find_map(|element| element.value().attr("href"))?;
    let value = href.trim_start_matches(scheme);
    let value = value.split('?').next().unwrap_or(value).trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn collect_avatar_candidates(document: &Html, base: Option<&Url>) -> Vec<ProfileImage> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for element in document.select(&selector) {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        let alt = element.value().attr("alt").unwrap_or_default();
        if src.trim().is_empty() || is_excluded_image(src, alt) {
            continue;
        }
        let Some(url) = resolve_image_src(src, base) else {
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        let name = normalize_whitespace(alt);
        images.push(ProfileImage {
            kind: MediaKind::Image,
            url,
            name: (!name.is_empty()).then_some(name),
            confidence: AVATAR_CONFIDENCE,
        });
    }

    images
}

fn is_excluded_image(src: &str, alt: &str) -> bool {
    let haystack = format!("{} {}", src.to_lowercase(), alt.to_lowercase());
    EXCLUDED_IMAGE_MARKERS
        .iter()
        .any(|marker| haystack.contains(marker))
}

fn resolve_image_src(src: &str, base: Option<&Url>) -> Option<String> {
    let resolved = match base {
        Some(base) => base.join(src.trim()).ok()?,
        None => Url::parse(src.trim()).ok()?,
    };
    match resolved.scheme() {
        "http" | "https" => Some(resolved.into()),
        _ => None,
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://agency.example.com/team/jane";

    #[test]
    fn test_heading_name_and_contact_links() {
        let html = r#"<h1>Jane Smith</h1>
            <a href="mailto:jane@x.com">Email</a>
            <a href="tel:+1555123">Call</a>"#;
        let result = extract_profile(html, BASE);

        assert_eq!(result.agent_details.name.as_deref(), Some("Jane Smith"));
        assert_eq!(result.agent_details.email.as_deref(), Some("jane@x.com"));
        assert_eq!(result.agent_details.phone.as_deref(), Some("+1555123"));
        assert!(result.images.is_empty());
    }

    #[test]
    fn test_chrome_images_excluded_real_photos_kept() {
        let html = r#"<img src="/icons/favicon.png">
            <img src="/assets/logo.svg" alt="Acme Realty">
            <img src="/team/jane.jpg" alt="Jane">"#;
        let result = extract_profile(html, BASE);

        assert_eq!(result.images.len(), 1);
        let image = &result.images[0];
        assert_eq!(image.url, "https://agency.example.com/team/jane.jpg");
        assert_eq!(image.name.as_deref(), Some("Jane"));
        assert_eq!(image.confidence, 0.5);
        assert_eq!(image.kind, MediaKind::Image);
    }

    #[test]
    fn test_first_name_heuristic_wins() {
        let html = r#"<h1>Meet Our Team</h1>
            <div class="agent-name">Robert Chen</div>"#;
        let result = extract_profile(html, BASE);
        // h1 text qualifies (non-empty, short), so the class heuristic
        // is never consulted.
        assert_eq!(result.agent_details.name.as_deref(), Some("Meet Our Team"));
    }

    #[test]
    fn test_overlong_heading_falls_through_to_next_heuristic() {
        let html = r#"<h1>Welcome to the finest boutique real estate agency on the entire coastline</h1>
            <div class="profile-name">Robert Chen</div>"#;
        let result = extract_profile(html, BASE);
        assert_eq!(result.agent_details.name.as_deref(), Some("Robert Chen"));
    }

    #[test]
    fn test_position_rejects_email_and_number_shaped_text() {
        let html = r#"<div class="agent-title">jane@x.com</div>
            <div class="position">555-1234</div>
            <h3>Senior Broker</h3>"#;
        let result = extract_profile(html, BASE);
        assert_eq!(result.agent_details.position.as_deref(), Some("Senior Broker"));
    }

    #[test]
    fn test_mailto_query_suffix_stripped() {
        let html = r#"<a href="mailto:jane@x.com?subject=Listing">mail</a>"#;
        let result = extract_profile(html, BASE);
        assert_eq!(result.agent_details.email.as_deref(), Some("jane@x.com"));
    }

    #[test]
    fn test_malformed_html_degrades_to_empty() {
        let result = extract_profile("<div><<<<span", BASE);
        assert_eq!(result, ProfileExtraction::default());
    }

    #[test]
    fn test_fields_are_independent() {
        let html = r#"<a href="tel:+44123">Call</a>"#;
        let result = extract_profile(html, BASE);
        assert!(result.agent_details.name.is_none());
        assert!(result.agent_details.email.is_none());
        assert_eq!(result.agent_details.phone.as_deref(), Some("+44123"));
    }

    #[test]
    fn test_relative_avatar_resolved_against_base() {
        let html = r#"<img src="headshot.jpg" alt="Jane Smith">"#;
        let result = extract_profile(html, BASE);
        assert_eq!(
            result.images[0].url,
            "https://agency.example.com/team/headshot.jpg"
        );
    }

    #[test]
    fn test_duplicate_avatar_sources_collapse() {
        let html = r#"<img src="/team/jane.jpg"><img src="/team/jane.jpg" alt="Jane">"#;
        let result = extract_profile(html, BASE);
        assert_eq!(result.images.len(), 1);
    }
}
