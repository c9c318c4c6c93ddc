//! Behavioral feature set used for user clustering: nine dimensions
//! summarizing volume, watch time, timing, engagement and breadth.

use crate::models::WatchHistoryEntry;
use crate::services::features::scaler::OTHER_CATEGORY;
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const BEHAVIOR_DIMENSIONS: usize = 9;

/// Hour assumed when a history carries no viewing timestamps.
const DEFAULT_ACTIVE_HOUR: u32 = 12;

/// Per-user behavioral summary.
///
/// Also used for cluster centroids, where each field holds the mean over
/// the cluster's members in original (unstandardized) units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorFeatures {
    pub total_videos: f64,
    pub avg_watch_time: f64,
    pub total_watch_time: f64,
    /// Mode of viewing hours [0, 24); ties go to the hour seen first.
    pub most_active_hour: f64,
    pub total_likes: f64,
    pub total_coins: f64,
    pub total_shares: f64,
    /// Distinct categories watched, uncategorized entries counting as one
    /// shared "other" bucket.
    pub category_diversity: f64,
    /// Share of history taken by the most-watched category.
    pub top_category_ratio: f64,
}

impl BehaviorFeatures {
    pub fn from_history(history: &[WatchHistoryEntry]) -> Self {
        if history.is_empty() {
            return Self {
                most_active_hour: f64::from(DEFAULT_ACTIVE_HOUR),
                ..Self::default()
            };
        }

        let total = history.len() as f64;

        let total_watch_time: f64 = history
            .iter()
            .map(|e| e.duration_secs.map(f64::from).unwrap_or(0.0))
            .sum();
        let avg_watch_time = total_watch_time / total;

        let most_active_hour = most_frequent_hour(history);

        let total_likes: f64 = history.iter().map(|e| e.like as f64).sum();
        let total_coins: f64 = history.iter().map(|e| e.coin as f64).sum();
        let total_shares: f64 = history.iter().map(|e| e.share as f64).sum();

        let mut category_counts: HashMap<&str, usize> = HashMap::new();
        for entry in history {
            let label = entry
                .category
                .as_deref()
                .unwrap_or(OTHER_CATEGORY);
            *category_counts.entry(label).or_insert(0) += 1;
        }
        let category_diversity = category_counts.len() as f64;
        let top_category_ratio = category_counts
            .values()
            .max()
            .map(|&count| count as f64 / total)
            .unwrap_or(0.0);

        Self {
            total_videos: total,
            avg_watch_time,
            total_watch_time,
            most_active_hour,
            total_likes,
            total_coins,
            total_shares,
            category_diversity,
            top_category_ratio,
        }
    }

    pub fn to_vector(&self) -> [f64; BEHAVIOR_DIMENSIONS] {
        [
            self.total_videos,
            self.avg_watch_time,
            self.total_watch_time,
            self.most_active_hour,
            self.total_likes,
            self.total_coins,
            self.total_shares,
            self.category_diversity,
            self.top_category_ratio,
        ]
    }

    pub fn from_vector(values: &[f64]) -> Self {
        Self {
            total_videos: values[0],
            avg_watch_time: values[1],
            total_watch_time: values[2],
            most_active_hour: values[3],
            total_likes: values[4],
            total_coins: values[5],
            total_shares: values[6],
            category_diversity: values[7],
            top_category_ratio: values[8],
        }
    }
}

fn most_frequent_hour(history: &[WatchHistoryEntry]) -> f64 {
    let mut counts = [0usize; 24];
    let mut first_seen = [usize::MAX; 24];
    let mut order = 0usize;

    for entry in history {
        if let Some(viewed_at) = entry.viewed_at {
            let hour = viewed_at.hour() as usize;
            if first_seen[hour] == usize::MAX {
                first_seen[hour] = order;
                order += 1;
            }
            counts[hour] += 1;
        }
    }

    let mut best: Option<usize> = None;
    for hour in 0..24 {
        if counts[hour] == 0 {
            continue;
        }
        match best {
            None => best = Some(hour),
            Some(current) => {
                if counts[hour] > counts[current]
                    || (counts[hour] == counts[current]
                        && first_seen[hour] < first_seen[current])
                {
                    best = Some(hour);
                }
            }
        }
    }

    best.map(|h| h as f64)
        .unwrap_or(f64::from(DEFAULT_ACTIVE_HOUR))
}
