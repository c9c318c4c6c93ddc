//! History-based item collaborative filtering.
//!
//! Candidates already present in the requesting user's watch history are
//! excluded; the rest are weighted by a combined engagement score with a
//! 2x boost for the user's top historical categories. Callers with an empty
//! history are routed to popularity ranking by the dispatch layer.

use crate::models::{Recommendation, Strategy, VideoRecord, WatchHistoryEntry};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Categories receiving the preference boost.
const TOP_CATEGORY_COUNT: usize = 3;
/// Multiplier applied when a candidate matches a preferred category.
const CATEGORY_BOOST: f64 = 2.0;

pub fn recommend(
    history: &[WatchHistoryEntry],
    videos: &[VideoRecord],
    top_n: usize,
) -> Vec<Recommendation> {
    let watched: HashSet<&str> = history.iter().map(|e| e.video_id.as_str()).collect();
    let preferred = top_categories(history);

    let mut scored: Vec<(&VideoRecord, f64)> = videos
        .iter()
        .filter(|video| !watched.contains(video.id.as_str()))
        .map(|video| {
            let engagement = 0.3 * video.view as f64
                + 0.3 * video.like as f64
                + 0.2 * video.coin as f64
                + 0.2 * video.share as f64;

            let boost = match &video.category {
                Some(category) if preferred.contains(category.as_str()) => CATEGORY_BOOST,
                _ => 1.0,
            };

            (video, engagement * boost)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    debug!(
        history_len = history.len(),
        candidates = scored.len(),
        preferred_categories = preferred.len(),
        "Item-CF candidates scored"
    );

    scored
        .into_iter()
        .take(top_n)
        .map(|(video, score)| Recommendation {
            video_id: video.id.clone(),
            title: video.title.clone(),
            score,
            strategy: Strategy::ItemCollaborative,
        })
        .collect()
}

/// The user's most-watched categories, up to [`TOP_CATEGORY_COUNT`], counted
/// over history entries that carry a category snapshot. Ties keep first-seen
/// order.
fn top_categories(history: &[WatchHistoryEntry]) -> HashSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for entry in history {
        if let Some(category) = &entry.category {
            let count = counts.entry(category.as_str()).or_insert(0);
            if *count == 0 {
                first_seen.push(category.as_str());
            }
            *count += 1;
        }
    }

    let mut ranked: Vec<(usize, &str)> = first_seen
        .iter()
        .enumerate()
        .map(|(order, category)| (order, *category))
        .collect();
    ranked.sort_by(|a, b| counts[b.1].cmp(&counts[a.1]).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(TOP_CATEGORY_COUNT)
        .map(|(_, category)| category.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::recommendation::tests::{history_entry, video_in_category};

    #[test]
    fn test_watched_videos_are_excluded() {
        let history = vec![history_entry("v1", Some("tech"))];
        let videos = vec![
            video_in_category("v1", "tech", 100),
            video_in_category("v2", "tech", 50),
        ];
        let recs = recommend(&history, &videos, 10);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].video_id, "v2");
        assert_eq!(recs[0].strategy, Strategy::ItemCollaborative);
    }

    #[test]
    fn test_preferred_category_gets_boost() {
        let history = vec![
            history_entry("h1", Some("music")),
            history_entry("h2", Some("music")),
        ];
        // Same counters; only the category differs.
        let videos = vec![
            video_in_category("plain", "tech", 100),
            video_in_category("boosted", "music", 100),
        ];
        let recs = recommend(&history, &videos, 10);
        assert_eq!(recs[0].video_id, "boosted");
        assert!((recs[0].score / recs[1].score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_categories_caps_at_three() {
        let history = vec![
            history_entry("a", Some("c1")),
            history_entry("b", Some("c1")),
            history_entry("c", Some("c2")),
            history_entry("d", Some("c2")),
            history_entry("e", Some("c3")),
            history_entry("f", Some("c4")),
        ];
        let preferred = top_categories(&history);
        assert_eq!(preferred.len(), 3);
        assert!(preferred.contains("c1"));
        assert!(preferred.contains("c2"));
        // c3 seen before c4 with an equal count.
        assert!(preferred.contains("c3"));
    }
}
