// ============================================
// Analytics Engine Facade
// ============================================
//
// Single coordinating interface exposed to the external API layer:
// recommendation strategy selection, view prediction, user clustering,
// sentiment scoring and trend extrapolation.
//
// Rebuild/fit methods take `&mut self`; read paths take `&self`. The host
// must not run a rebuild concurrently with reads of the same instance
// (single-writer, multiple-reader), and heavy calls (training, clustering,
// matrix rebuilds) are CPU-bound and belong off latency-sensitive paths.

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    Recommendation, TimeSeriesPoint, UserHistory, VideoRecord, WatchHistoryEntry,
};
use crate::services::clustering::{ClusterAnalysis, UserClustering};
use crate::services::features::ProfileBuilder;
use crate::services::prediction::{TrainingReport, ViewPredictor};
use crate::services::recommendation::Recommender;
use crate::services::sentiment::{SentimentAnalyzer, SentimentResult, SentimentSummary};
use crate::services::similarity::{self, SimilarUser, SimilarityMatrix};
use crate::services::trend::{self, TrendPoint};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Content similarity artifact, rebuilt wholesale whenever the video set
/// changes.
struct ContentIndex {
    matrix: SimilarityMatrix,
    titles: HashMap<String, String>,
}

/// Readiness snapshot for the host's status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub content_index_ready: bool,
    pub indexed_videos: usize,
    pub model_trained: bool,
    pub active_model: Option<String>,
    pub validation_mse: Option<f64>,
    pub cluster_count: usize,
}

pub struct AnalyticsEngine {
    config: Config,
    profile_builder: ProfileBuilder,
    recommender: Recommender,
    predictor: ViewPredictor,
    clustering: UserClustering,
    sentiment: SentimentAnalyzer,
    content_index: Option<ContentIndex>,
}

impl AnalyticsEngine {
    pub fn new(config: Config) -> Self {
        let profile_builder = ProfileBuilder::new(&config.features);
        let recommender = Recommender::new(config.recommend.clone());
        let predictor = ViewPredictor::new(config.prediction.clone());
        let clustering = UserClustering::new(config.clustering.clone());

        Self {
            config,
            profile_builder,
            recommender,
            predictor,
            clustering,
            sentiment: SentimentAnalyzer::new(),
            content_index: None,
        }
    }

    /// Rebuild the content similarity matrix for `videos`, replacing any
    /// previous index. Returns the number of indexed videos.
    pub fn rebuild_content_index(&mut self, videos: &[VideoRecord]) -> usize {
        let matrix = similarity::content_similarity(videos, self.config.features.max_vocabulary);
        let titles = videos
            .iter()
            .map(|v| (v.id.clone(), v.title.clone()))
            .collect();
        let indexed = matrix.len();
        self.content_index = Some(ContentIndex { matrix, titles });
        indexed
    }

    /// Strategy dispatch over the caller's intent: a seed video selects
    /// content-based ranking, a watch history selects item collaborative
    /// filtering, and everything else is popularity-ranked. Degradation
    /// rules live in the recommendation layer.
    pub fn recommend(
        &self,
        videos: &[VideoRecord],
        seed_video: Option<&str>,
        history: Option<&[WatchHistoryEntry]>,
        top_n: Option<usize>,
    ) -> Vec<Recommendation> {
        if videos.is_empty() {
            return Vec::new();
        }
        let top_n = top_n.unwrap_or(self.config.recommend.default_top_n);

        if let Some(seed) = seed_video {
            return match &self.content_index {
                Some(index) => {
                    self.recommender
                        .content_based(&index.matrix, &index.titles, seed, top_n)
                }
                None => {
                    info!("Content recommendation requested before any index rebuild");
                    Vec::new()
                }
            };
        }

        if let Some(history) = history {
            return self
                .recommender
                .item_collaborative(history, videos, Utc::now(), top_n);
        }

        self.recommender.popular(videos, Utc::now(), top_n)
    }

    /// User-based collaborative filtering for `target_user`, with the
    /// documented popularity fallbacks. The user similarity matrix is
    /// recomputed from the supplied histories on every call.
    pub fn recommend_for_user(
        &self,
        target_user: &str,
        histories: &[UserHistory],
        videos: &[VideoRecord],
        top_n: Option<usize>,
    ) -> Vec<Recommendation> {
        if videos.is_empty() {
            return Vec::new();
        }
        let top_n = top_n.unwrap_or(self.config.recommend.default_top_n);

        let matrix = similarity::user_similarity(histories, &self.profile_builder);
        self.recommender.user_collaborative(
            target_user,
            histories,
            &matrix,
            videos,
            Utc::now(),
            top_n,
        )
    }

    /// Most similar users to `target_user`, with their profile vectors.
    pub fn similar_users(
        &self,
        target_user: &str,
        histories: &[UserHistory],
        top_n: Option<usize>,
    ) -> Vec<SimilarUser> {
        let top_n = top_n.unwrap_or(self.config.recommend.similar_user_count);
        let matrix = similarity::user_similarity(histories, &self.profile_builder);

        let by_user: HashMap<&str, &UserHistory> = histories
            .iter()
            .map(|h| (h.user_id.as_str(), h))
            .collect();

        matrix
            .neighbors(target_user, top_n)
            .into_iter()
            .map(|(user_id, similarity)| {
                let profile = by_user
                    .get(user_id.as_str())
                    .map(|h| self.profile_builder.build(&h.entries))
                    .unwrap_or_else(|| vec![0.0; self.profile_builder.dimensions()]);
                SimilarUser {
                    user_id,
                    similarity,
                    profile,
                }
            })
            .collect()
    }

    /// Train the view prediction panel and keep the best candidate.
    pub fn train_view_model(&mut self, videos: &[VideoRecord]) -> Result<TrainingReport> {
        self.predictor.train(videos)
    }

    /// Predict views for one record using the active model.
    pub fn predict_views(&self, video: &VideoRecord) -> Result<u64> {
        self.predictor.predict(video)
    }

    /// Partition users into behavioral segments.
    pub fn cluster_users(&self, histories: &[UserHistory]) -> Result<ClusterAnalysis> {
        self.clustering.cluster(histories)
    }

    pub fn sentiment(&self, text: &str) -> SentimentResult {
        self.sentiment.analyze(text)
    }

    pub fn sentiment_summary(&self, texts: &[String]) -> SentimentSummary {
        self.sentiment.summarize(texts)
    }

    pub fn forecast(&self, series: &[TimeSeriesPoint], periods: usize) -> Vec<TrendPoint> {
        trend::forecast(series, periods)
    }

    pub fn status(&self) -> EngineStatus {
        let active = self.predictor.active_model();
        EngineStatus {
            content_index_ready: self.content_index.is_some(),
            indexed_videos: self
                .content_index
                .as_ref()
                .map(|i| i.matrix.len())
                .unwrap_or(0),
            model_trained: self.predictor.is_trained(),
            active_model: active.map(|(kind, _)| kind.as_str().to_string()),
            validation_mse: active.map(|(_, mse)| mse),
            cluster_count: self.clustering.cluster_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_engine_reports_cold_status() {
        let engine = AnalyticsEngine::new(Config::default());
        let status = engine.status();
        assert!(!status.content_index_ready);
        assert_eq!(status.indexed_videos, 0);
        assert!(!status.model_trained);
        assert!(status.active_model.is_none());
        assert_eq!(status.cluster_count, 5);
    }

    #[test]
    fn test_recommend_on_empty_candidate_set() {
        let engine = AnalyticsEngine::new(Config::default());
        assert!(engine.recommend(&[], None, None, None).is_empty());
    }
}
