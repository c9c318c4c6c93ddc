// ============================================
// Recommendation Engine
// ============================================
//
// Four strategies behind one dispatch layer:
// - popularity: normalized engagement composite with recency decay
// - content-based: TF-IDF cosine neighbours of a seed video
// - item collaborative: engagement-weighted candidates filtered and
//   boosted by the user's own history
// - user collaborative: aggregation over similar users' histories
//
// Fallbacks are explicit branches here, never silent exception handling:
// an empty history routes item-CF to popularity, and user-CF degrades to
// popularity when fewer than two users are known, the target is unknown,
// or no candidate survives filtering.

pub mod content_based;
pub mod item_cf;
pub mod popularity;
pub mod user_cf;

pub use popularity::PopularityWeights;

use crate::config::RecommendConfig;
use crate::models::{Recommendation, UserHistory, VideoRecord, WatchHistoryEntry};
use crate::services::similarity::SimilarityMatrix;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;

pub struct Recommender {
    config: RecommendConfig,
    weights: PopularityWeights,
}

impl Recommender {
    pub fn new(config: RecommendConfig) -> Self {
        Self {
            config,
            weights: PopularityWeights::default(),
        }
    }

    pub fn popular(
        &self,
        videos: &[VideoRecord],
        now: DateTime<Utc>,
        top_n: usize,
    ) -> Vec<Recommendation> {
        popularity::rank(
            videos,
            &self.weights,
            self.config.recency_window_days,
            now,
            top_n,
        )
    }

    pub fn content_based(
        &self,
        matrix: &SimilarityMatrix,
        titles: &HashMap<String, String>,
        seed_id: &str,
        top_n: usize,
    ) -> Vec<Recommendation> {
        content_based::recommend(matrix, titles, seed_id, top_n)
    }

    /// Item-based collaborative filtering over the caller's own history.
    /// An empty history falls back to popularity ranking.
    pub fn item_collaborative(
        &self,
        history: &[WatchHistoryEntry],
        videos: &[VideoRecord],
        now: DateTime<Utc>,
        top_n: usize,
    ) -> Vec<Recommendation> {
        if history.is_empty() {
            info!("Item-CF requested with empty history, falling back to popularity");
            return self.popular(videos, now, top_n);
        }
        item_cf::recommend(history, videos, top_n)
    }

    /// User-based collaborative filtering against the known user corpus.
    /// Falls back to popularity when fewer than two users are known, the
    /// target is unknown, or no similar-user candidate remains.
    pub fn user_collaborative(
        &self,
        target_user: &str,
        histories: &[UserHistory],
        user_matrix: &SimilarityMatrix,
        videos: &[VideoRecord],
        now: DateTime<Utc>,
        top_n: usize,
    ) -> Vec<Recommendation> {
        if histories.len() < 2 || !user_matrix.contains(target_user) {
            info!(
                target = target_user,
                users = histories.len(),
                "User-CF prerequisites not met, falling back to popularity"
            );
            return self.popular(videos, now, top_n);
        }

        let recs = user_cf::recommend(
            target_user,
            histories,
            user_matrix,
            self.config.similar_user_count,
            top_n,
        );
        if recs.is_empty() {
            info!(
                target = target_user,
                "User-CF produced no candidates, falling back to popularity"
            );
            return self.popular(videos, now, top_n);
        }
        recs
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn video(id: &str, view: u64, like: u64, coin: u64, share: u64) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: format!("title {}", id),
            author: String::new(),
            category: None,
            view,
            like,
            coin,
            share,
            danmaku: 0,
            favorite: 0,
            reply: 0,
            duration_secs: None,
            published_at: None,
            description: None,
            tags: Vec::new(),
        }
    }

    pub fn video_in_category(id: &str, category: &str, view: u64) -> VideoRecord {
        let mut v = video(id, view, view / 2, view / 4, view / 10);
        v.category = Some(category.to_string());
        v
    }

    pub fn history_entry(video_id: &str, category: Option<&str>) -> WatchHistoryEntry {
        WatchHistoryEntry {
            video_id: video_id.to_string(),
            title: Some(format!("title {}", video_id)),
            category: category.map(|c| c.to_string()),
            viewed_at: None,
            duration_secs: Some(300),
            view: 10,
            like: 1,
            coin: 0,
            share: 0,
        }
    }

    pub fn user_history(user_id: &str, entries: Vec<WatchHistoryEntry>) -> UserHistory {
        UserHistory {
            user_id: user_id.to_string(),
            entries,
        }
    }

    #[test]
    fn test_item_cf_empty_history_falls_back_to_popularity() {
        let recommender = Recommender::new(RecommendConfig::default());
        let videos = vec![video("v1", 100, 10, 5, 2), video("v2", 50, 5, 2, 1)];
        let now = Utc::now();

        let fallback = recommender.item_collaborative(&[], &videos, now, 10);
        let direct = recommender.popular(&videos, now, 10);

        assert_eq!(fallback.len(), direct.len());
        for (a, b) in fallback.iter().zip(direct.iter()) {
            assert_eq!(a.video_id, b.video_id);
            assert_eq!(a.score, b.score);
            assert_eq!(a.strategy, crate::models::Strategy::Popularity);
        }
    }

    #[test]
    fn test_user_cf_with_single_user_falls_back() {
        use crate::config::FeatureConfig;
        use crate::services::features::ProfileBuilder;
        use crate::services::similarity;

        let recommender = Recommender::new(RecommendConfig::default());
        let histories = vec![user_history("solo", vec![history_entry("v", None)])];
        let builder = ProfileBuilder::new(&FeatureConfig::default());
        let matrix = similarity::user_similarity(&histories, &builder);
        let videos = vec![video("v1", 100, 10, 5, 2), video("v2", 10, 1, 0, 0)];
        let now = Utc::now();

        let fallback =
            recommender.user_collaborative("solo", &histories, &matrix, &videos, now, 10);
        let direct = recommender.popular(&videos, now, 10);

        assert_eq!(fallback.len(), direct.len());
        for (a, b) in fallback.iter().zip(direct.iter()) {
            assert_eq!(a.video_id, b.video_id);
            assert_eq!(a.score, b.score);
        }
    }
}
