//! Wire-level data types shared by the crawler, the profile extractor,
//! and the HTTP API.

use serde::{Deserialize, Serialize};

/// Kind of a discovered media resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Sub-classification of an image asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Floorplan,
}

/// A single media resource discovered on a listing page.
///
/// Assets are created once by the result assembler and never mutated
/// afterwards. Within one crawl response no URL appears twice for the
/// same kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Stable sequence-derived id, e.g. `img-0`, `video-2`, `floorplan-1`.
    pub id: String,
    /// Absolute URL of the resource.
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<MediaCategory>,
    /// Selection is a caller/UI concern; always false at creation.
    pub selected: bool,
}

impl MediaAsset {
    pub fn image(index: usize, url: String) -> Self {
        Self {
            id: format!("img-{index}"),
            url,
            kind: MediaKind::Image,
            category: None,
            selected: false,
        }
    }

    pub fn video(index: usize, url: String) -> Self {
        Self {
            id: format!("video-{index}"),
            url,
            kind: MediaKind::Video,
            category: None,
            selected: false,
        }
    }

    pub fn floorplan(index: usize, url: String) -> Self {
        Self {
            id: format!("floorplan-{index}"),
            url,
            kind: MediaKind::Image,
            category: Some(MediaCategory::Floorplan),
            selected: false,
        }
    }
}

/// Candidate avatar image found on an agent profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileImage {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Absolute URL of the image.
    pub url: String,
    /// Alt text, when the markup carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Static heuristic score in [0, 1], fixed at extraction time.
    pub confidence: f64,
}

/// Best-effort agent contact details. Every field is independently
/// optional; absence means "not found", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// Result of running the static profile extractor over one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileExtraction {
    pub images: Vec<ProfileImage>,
    #[serde(rename = "agentDetails")]
    pub agent_details: AgentDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_asset_serializes_wire_names() {
        let asset = MediaAsset::floorplan(3, "https://x.test/plan.png".into());
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["id"], "floorplan-3");
        assert_eq!(json["type"], "image");
        assert_eq!(json["category"], "floorplan");
        assert_eq!(json["selected"], false);
    }

    #[test]
    fn test_plain_image_omits_category() {
        let asset = MediaAsset::image(0, "https://x.test/a.jpg".into());
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["id"], "img-0");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_agent_details_omits_missing_fields() {
        let details = AgentDetails {
            name: Some("Jane Smith".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
    }
}
