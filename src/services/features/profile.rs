//! Per-user preference profile: a fixed-length numeric vector derived from
//! watch history, used for user-to-user similarity.
//!
//! Profiles are computed fresh for every request; the engine never caches
//! them across requests.

use crate::config::FeatureConfig;
use crate::models::WatchHistoryEntry;
use std::collections::HashMap;

/// Dimensions of the base profile before the named-category ratios:
/// avg view/like/coin/share/duration, total watched, unique categories,
/// activity score.
const BASE_DIMENSIONS: usize = 8;

/// Fallback duration (seconds) when no history entry carries one.
const DEFAULT_DURATION_SECS: f64 = 300.0;

/// Builds the per-user preference vector.
///
/// Layout: [avg_view, avg_like, avg_coin, avg_share, avg_duration,
/// total_watched, unique_categories, activity_score,
/// <one ratio per named category>, other_ratio].
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    named_categories: Vec<String>,
}

impl ProfileBuilder {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            named_categories: config.named_categories.clone(),
        }
    }

    /// Number of dimensions produced by [`build`](Self::build).
    pub fn dimensions(&self) -> usize {
        BASE_DIMENSIONS + self.named_categories.len() + 1
    }

    /// Names of the produced dimensions, aligned with the vector layout.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [
            "avg_view",
            "avg_like",
            "avg_coin",
            "avg_share",
            "avg_duration",
            "total_videos",
            "unique_categories",
            "activity_score",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for category in &self.named_categories {
            names.push(format!("{}_preference", category));
        }
        names.push("other_preference".to_string());
        names
    }

    /// Compute the profile vector. An empty history yields all zeros.
    pub fn build(&self, history: &[WatchHistoryEntry]) -> Vec<f64> {
        if history.is_empty() {
            return vec![0.0; self.dimensions()];
        }

        let total = history.len() as f64;

        let avg_view = history.iter().map(|e| e.view as f64).sum::<f64>() / total;
        let avg_like = history.iter().map(|e| e.like as f64).sum::<f64>() / total;
        let avg_coin = history.iter().map(|e| e.coin as f64).sum::<f64>() / total;
        let avg_share = history.iter().map(|e| e.share as f64).sum::<f64>() / total;

        let durations: Vec<f64> = history
            .iter()
            .filter_map(|e| e.duration_secs.map(f64::from))
            .collect();
        let avg_duration = if durations.is_empty() {
            DEFAULT_DURATION_SECS
        } else {
            durations.iter().sum::<f64>() / durations.len() as f64
        };

        let mut category_counts: HashMap<&str, usize> = HashMap::new();
        for entry in history {
            if let Some(category) = &entry.category {
                *category_counts.entry(category.as_str()).or_insert(0) += 1;
            }
        }
        let unique_categories = category_counts.len().max(1) as f64;

        let activity_score = (total / 100.0).min(1.0);

        let mut profile = vec![
            avg_view,
            avg_like,
            avg_coin,
            avg_share,
            avg_duration,
            total,
            unique_categories,
            activity_score,
        ];

        let mut named_sum = 0.0;
        for category in &self.named_categories {
            let ratio = category_counts
                .get(category.as_str())
                .map(|&count| count as f64 / total)
                .unwrap_or(0.0);
            named_sum += ratio;
            profile.push(ratio);
        }
        // Residual share: everything not captured by a named category,
        // including uncategorized entries.
        profile.push((1.0 - named_sum).max(0.0));

        profile
    }
}
