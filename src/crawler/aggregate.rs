//! Cross-round media accumulation and final asset assembly.
//!
//! The aggregator is an owned value threaded through every exploration
//! round. Merging is idempotent: a URL already seen for a type is a
//! no-op, and insertion order of first sightings is the only ordering
//! the assembled result guarantees.

use std::collections::HashSet;

use super::extract::ExtractedMedia;
use crate::models::MediaAsset;

/// A uniqueness set that remembers insertion order.
#[derive(Debug, Default)]
struct UniqueUrls {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl UniqueUrls {
    fn insert(&mut self, url: String) {
        if self.seen.insert(url.clone()) {
            self.ordered.push(url);
        }
    }

    fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    fn len(&self) -> usize {
        self.ordered.len()
    }
}

/// Per-type dedup accumulator for one crawl.
#[derive(Debug, Default)]
pub struct MediaAggregator {
    images: UniqueUrls,
    videos: UniqueUrls,
    floorplans: UniqueUrls,
}

impl MediaAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one extraction pass into the accumulated sets.
    pub fn merge(&mut self, media: ExtractedMedia) {
        for url in media.images {
            self.images.insert(url);
        }
        for url in media.videos {
            self.videos.insert(url);
        }
        for url in media.floorplans {
            self.floorplans.insert(url);
        }
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn video_count(&self) -> usize {
        self.videos.len()
    }

    pub fn floorplan_count(&self) -> usize {
        self.floorplans.len()
    }

    /// Emit the final asset list: images, then videos, then floor plans,
    /// each with a type-scoped zero-based id. A URL claimed by the
    /// floor-plan pass is emitted once as `floorplan-N`, never also as
    /// `img-N` — both carry `type: image` and the URL set must stay
    /// unique per type.
    pub fn into_assets(self) -> Vec<MediaAsset> {
        let MediaAggregator {
            images,
            videos,
            floorplans,
        } = self;

        let mut assets =
            Vec::with_capacity(images.len() + videos.len() + floorplans.len());

        let mut image_index = 0;
        for url in images.ordered {
            if floorplans.contains(&url) {
                continue;
            }
            assets.push(MediaAsset::image(image_index, url));
            image_index += 1;
        }
        for (index, url) in videos.ordered.into_iter().enumerate() {
            assets.push(MediaAsset::video(index, url));
        }
        for (index, url) in floorplans.ordered.into_iter().enumerate() {
            assets.push(MediaAsset::floorplan(index, url));
        }
        assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaCategory, MediaKind};

    fn media(images: &[&str], videos: &[&str], floorplans: &[&str]) -> ExtractedMedia {
        ExtractedMedia {
            images: images.iter().map(|s| s.to_string()).collect(),
            videos: videos.iter().map(|s| s.to_string()).collect(),
            floorplans: floorplans.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut agg = MediaAggregator::new();
        let pass = media(&["https://x.test/a.jpg", "https://x.test/b.jpg"], &[], &[]);
        agg.merge(pass.clone());
        agg.merge(pass);
        assert_eq!(agg.image_count(), 2);

        let assets = agg.into_assets();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].id, "img-0");
        assert_eq!(assets[1].id, "img-1");
    }

    #[test]
    fn test_insertion_order_survives_rounds() {
        let mut agg = MediaAggregator::new();
        agg.merge(media(&["https://x.test/1.jpg"], &[], &[]));
        agg.merge(media(&["https://x.test/2.jpg", "https://x.test/1.jpg"], &[], &[]));
        agg.merge(media(&["https://x.test/3.jpg"], &[], &[]));

        let urls: Vec<_> = agg.into_assets().into_iter().map(|a| a.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://x.test/1.jpg",
                "https://x.test/2.jpg",
                "https://x.test/3.jpg"
            ]
        );
    }

    #[test]
    fn test_assembly_emits_types_in_order_with_scoped_ids() {
        let mut agg = MediaAggregator::new();
        agg.merge(media(
            &["https://x.test/a.jpg"],
            &["https://x.test/tour.mp4"],
            &["https://x.test/plan.png"],
        ));
        agg.merge(media(&["https://x.test/b.jpg"], &[], &[]));

        let assets = agg.into_assets();
        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["img-0", "img-1", "video-0", "floorplan-0"]);
        assert!(assets.iter().all(|a| !a.selected));
        assert_eq!(assets[2].kind, MediaKind::Video);
        assert_eq!(assets[3].kind, MediaKind::Image);
        assert_eq!(assets[3].category, Some(MediaCategory::Floorplan));
    }

    #[test]
    fn test_floorplan_pass_claims_url_from_images() {
        let mut agg = MediaAggregator::new();
        agg.merge(media(
            &["https://x.test/plan.png", "https://x.test/a.jpg"],
            &[],
            &["https://x.test/plan.png"],
        ));

        let assets = agg.into_assets();
        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["img-0", "floorplan-0"]);
        assert_eq!(assets[0].url, "https://x.test/a.jpg");
        assert_eq!(assets[1].url, "https://x.test/plan.png");
    }

    #[test]
    fn test_empty_exploration_rounds_leave_result_untouched() {
        let initial = media(&["https://x.test/a.jpg"], &["https://x.test/v.mp4"], &[]);

        let mut baseline = MediaAggregator::new();
        baseline.merge(initial.clone());

        let mut explored = MediaAggregator::new();
        explored.merge(initial);
        explored.merge(ExtractedMedia::default());
        explored.merge(ExtractedMedia::default());

        assert_eq!(baseline.into_assets(), explored.into_assets());
    }

    #[test]
    fn test_no_duplicate_urls_within_type() {
        let mut agg = MediaAggregator::new();
        for _ in 0..3 {
            agg.merge(media(
                &["https://x.test/a.jpg"],
                &["https://x.test/v.mp4"],
                &[],
            ));
        }
        let assets = agg.into_assets();
        assert_eq!(assets.len(), 2);
    }
}
