//! Popularity-ranked recommendation.
//!
//! Composite score over max-normalized engagement counters, multiplied by a
//! recency decay factor when a publish timestamp is present:
//!
//!   score = 0.40·view + 0.25·like + 0.20·coin + 0.15·share  (normalized)
//!   score *= e^(-days_since_publish / window)

use crate::models::{Recommendation, Strategy, VideoRecord};
use crate::utils::{max_normalize, recency_decay};
use chrono::{DateTime, Utc};

/// Weight multipliers for the composite popularity score.
#[derive(Debug, Clone)]
pub struct PopularityWeights {
    pub view: f64,
    pub like: f64,
    pub coin: f64,
    pub share: f64,
}

impl Default for PopularityWeights {
    fn default() -> Self {
        Self {
            view: 0.40,
            like: 0.25,
            coin: 0.20,
            share: 0.15,
        }
    }
}

pub fn rank(
    videos: &[VideoRecord],
    weights: &PopularityWeights,
    recency_window_days: f64,
    now: DateTime<Utc>,
    top_n: usize,
) -> Vec<Recommendation> {
    if videos.is_empty() {
        return Vec::new();
    }

    let max_view = videos.iter().map(|v| v.view).max().unwrap_or(0) as f64;
    let max_like = videos.iter().map(|v| v.like).max().unwrap_or(0) as f64;
    let max_coin = videos.iter().map(|v| v.coin).max().unwrap_or(0) as f64;
    let max_share = videos.iter().map(|v| v.share).max().unwrap_or(0) as f64;

    let mut scored: Vec<(&VideoRecord, f64)> = videos
        .iter()
        .map(|video| {
            let mut score = weights.view * max_normalize(video.view as f64, max_view)
                + weights.like * max_normalize(video.like as f64, max_like)
                + weights.coin * max_normalize(video.coin as f64, max_coin)
                + weights.share * max_normalize(video.share as f64, max_share);

            if let Some(published_at) = video.published_at {
                let days = (now - published_at).num_seconds() as f64 / 86_400.0;
                score *= recency_decay(days, recency_window_days);
            }

            (video, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .take(top_n)
        .map(|(video, score)| Recommendation {
            video_id: video.id.clone(),
            title: video.title.clone(),
            score,
            strategy: Strategy::Popularity,
        })
        .collect()
}
