// ============================================
// Clustering Engine
// ============================================
//
// Groups users into behavioral segments via seeded k-means over the
// standardized 9-d behavior feature set, then describes each cluster from
// its centroid averages on four independent axes: activity level,
// content-length preference, interest breadth and time of day.

use crate::config::ClusteringConfig;
use crate::error::{EngineError, Result};
use crate::models::UserHistory;
use crate::services::features::{BehaviorFeatures, StandardScaler, BEHAVIOR_DIMENSIONS};
use linfa::DatasetBase;
use linfa::traits::{Fit, Predict};
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

const KMEANS_TOLERANCE: f64 = 1e-4;

/// Activity-level thresholds on total videos watched.
const HEAVY_VIEWER_VIDEOS: f64 = 50.0;
const MODERATE_VIEWER_VIDEOS: f64 = 20.0;
/// Average watch time (seconds) separating long-form from short-form taste.
const LONG_FORM_SECS: f64 = 600.0;
/// Distinct categories separating broad from narrow interests.
const BROAD_INTEREST_CATEGORIES: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub user_id: String,
    pub cluster: usize,
}

/// One cluster's centroid summary in original feature units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub user_count: usize,
    pub centroid: BehaviorFeatures,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterAnalysis {
    pub assignments: Vec<ClusterAssignment>,
    pub clusters: Vec<ClusterSummary>,
}

pub struct UserClustering {
    config: ClusteringConfig,
}

impl UserClustering {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    pub fn cluster_count(&self) -> usize {
        self.config.cluster_count
    }

    /// Partition users into the configured number of clusters.
    ///
    /// Fails with `InsufficientData` when fewer users than clusters are
    /// known; never returns a partial clustering.
    pub fn cluster(&self, histories: &[UserHistory]) -> Result<ClusterAnalysis> {
        let k = self.config.cluster_count;
        if histories.len() < k {
            return Err(EngineError::InsufficientData(format!(
                "Clustering {} users into {} clusters is not possible",
                histories.len(),
                k
            )));
        }

        let features: Vec<BehaviorFeatures> = histories
            .iter()
            .map(|h| BehaviorFeatures::from_history(&h.entries))
            .collect();

        let mut matrix = Array2::<f64>::zeros((features.len(), BEHAVIOR_DIMENSIONS));
        for (row, feature) in features.iter().enumerate() {
            for (col, value) in feature.to_vector().into_iter().enumerate() {
                matrix[[row, col]] = value;
            }
        }

        let (_, standardized) = StandardScaler::fit_transform(&matrix);

        let dataset = DatasetBase::from(standardized.clone());
        let model = KMeans::params_with_rng(k, ChaCha8Rng::seed_from_u64(self.config.random_seed))
            .max_n_iterations(self.config.max_iterations)
            .tolerance(KMEANS_TOLERANCE)
            .fit(&dataset)
            .map_err(|e| EngineError::FeatureExtraction(format!("K-means failed: {}", e)))?;

        let labels = model.predict(&standardized);

        let assignments: Vec<ClusterAssignment> = histories
            .iter()
            .zip(labels.iter())
            .map(|(history, &cluster)| ClusterAssignment {
                user_id: history.user_id.clone(),
                cluster,
            })
            .collect();

        // Centroid summaries from member averages in original units; empty
        // clusters are omitted.
        let mut clusters: Vec<ClusterSummary> = Vec::new();
        for cluster in 0..k {
            let members: Vec<&BehaviorFeatures> = labels
                .iter()
                .zip(features.iter())
                .filter(|(&label, _)| label == cluster)
                .map(|(_, feature)| feature)
                .collect();
            if members.is_empty() {
                continue;
            }

            let mut sums = [0.0; BEHAVIOR_DIMENSIONS];
            for member in &members {
                for (col, value) in member.to_vector().into_iter().enumerate() {
                    sums[col] += value;
                }
            }
            for value in sums.iter_mut() {
                *value /= members.len() as f64;
            }
            let centroid = BehaviorFeatures::from_vector(&sums);

            clusters.push(ClusterSummary {
                cluster,
                user_count: members.len(),
                description: describe(&centroid),
                centroid,
            });
        }

        info!(
            users = histories.len(),
            clusters = clusters.len(),
            "User clustering completed"
        );

        Ok(ClusterAnalysis {
            assignments,
            clusters,
        })
    }
}

/// Human-readable segment label on four independent axes.
fn describe(centroid: &BehaviorFeatures) -> String {
    let activity = if centroid.total_videos > HEAVY_VIEWER_VIDEOS {
        "heavy"
    } else if centroid.total_videos > MODERATE_VIEWER_VIDEOS {
        "moderate"
    } else {
        "light"
    };

    let length = if centroid.avg_watch_time > LONG_FORM_SECS {
        "long-form"
    } else {
        "short-form"
    };

    let breadth = if centroid.category_diversity > BROAD_INTEREST_CATEGORIES {
        "broad"
    } else {
        "narrow"
    };

    let hour = centroid.most_active_hour;
    let daypart = if hour >= 18.0 || hour <= 6.0 {
        "night-active"
    } else {
        "day-active"
    };

    format!("{} | {} | {} | {}", activity, length, breadth, daypart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WatchHistoryEntry;
    use chrono::{TimeZone, Utc};

    fn history(user_id: &str, videos: usize, hour: u32, duration: u32) -> UserHistory {
        let entries = (0..videos)
            .map(|i| WatchHistoryEntry {
                video_id: format!("{}-{}", user_id, i),
                title: None,
                category: Some(format!("cat{}", i % 3)),
                viewed_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()),
                duration_secs: Some(duration),
                view: 100,
                like: 3,
                coin: 1,
                share: 0,
            })
            .collect();
        UserHistory {
            user_id: user_id.to_string(),
            entries,
        }
    }

    fn clustering(k: usize) -> UserClustering {
        UserClustering::new(ClusteringConfig {
            cluster_count: k,
            ..ClusteringConfig::default()
        })
    }

    #[test]
    fn test_too_few_users_is_insufficient_data() {
        let histories = vec![history("u1", 5, 10, 120), history("u2", 8, 20, 700)];
        let result = clustering(5).cluster(&histories);
        assert!(matches!(result, Err(EngineError::InsufficientData(_))));
    }

    #[test]
    fn test_every_user_is_assigned() {
        let histories: Vec<UserHistory> = (0..8)
            .map(|i| history(&format!("u{}", i), 5 + i * 10, (i as u32 * 3) % 24, 300))
            .collect();
        let analysis = clustering(2).cluster(&histories).unwrap();

        assert_eq!(analysis.assignments.len(), 8);
        assert!(analysis
            .assignments
            .iter()
            .all(|a| a.cluster < 2));
        let total: usize = analysis.clusters.iter().map(|c| c.user_count).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn test_descriptions_follow_axes() {
        let night_heavy = BehaviorFeatures {
            total_videos: 80.0,
            avg_watch_time: 900.0,
            total_watch_time: 72_000.0,
            most_active_hour: 22.0,
            total_likes: 10.0,
            total_coins: 2.0,
            total_shares: 1.0,
            category_diversity: 7.0,
            top_category_ratio: 0.4,
        };
        assert_eq!(describe(&night_heavy), "heavy | long-form | broad | night-active");

        let light_day = BehaviorFeatures {
            total_videos: 3.0,
            avg_watch_time: 120.0,
            most_active_hour: 14.0,
            category_diversity: 2.0,
            ..BehaviorFeatures::default()
        };
        assert_eq!(describe(&light_day), "light | short-form | narrow | day-active");
    }

    #[test]
    fn test_clustering_is_reproducible() {
        let histories: Vec<UserHistory> = (0..10)
            .map(|i| history(&format!("u{}", i), 3 + i * 7, (i as u32 * 5) % 24, 200 + i as u32 * 80))
            .collect();
        let first = clustering(3).cluster(&histories).unwrap();
        let second = clustering(3).cluster(&histories).unwrap();

        for (a, b) in first.assignments.iter().zip(second.assignments.iter()) {
            assert_eq!(a.cluster, b.cluster);
        }
    }

    #[test]
    fn test_zero_feature_users_cluster_without_nan() {
        // Users with empty histories produce zero-heavy vectors; clustering
        // alongside real users must stay defined.
        let mut histories: Vec<UserHistory> = (0..3)
            .map(|i| UserHistory {
                user_id: format!("empty{}", i),
                entries: Vec::new(),
            })
            .collect();
        histories.push(history("active1", 30, 21, 800));
        histories.push(history("active2", 60, 9, 90));

        let analysis = clustering(2).cluster(&histories).unwrap();
        assert_eq!(analysis.assignments.len(), 5);
        for summary in &analysis.clusters {
            assert!(!summary.centroid.total_videos.is_nan());
            assert!(!summary.centroid.avg_watch_time.is_nan());
        }
    }
}
