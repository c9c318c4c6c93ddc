use serde::Deserialize;
use std::env;

/// Engine configuration, resolved once at startup by the host process.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub features: FeatureConfig,
    pub recommend: RecommendConfig,
    pub prediction: PredictionConfig,
    pub clustering: ClusteringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureConfig {
    /// Upper bound on the TF-IDF vocabulary size.
    pub max_vocabulary: usize,
    /// Categories tracked as named preference ratios in the user profile.
    /// Everything else folds into the residual "other" ratio.
    pub named_categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendConfig {
    pub default_top_n: usize,
    /// Neighbours consulted by user-based collaborative filtering.
    pub similar_user_count: usize,
    /// Recency decay window in days for popularity ranking.
    pub recency_window_days: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    /// Minimum usable rows required before model training is attempted.
    pub min_training_rows: usize,
    /// Fraction of rows held out for validation.
    pub validation_split: f64,
    pub random_seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringConfig {
    pub cluster_count: usize,
    pub max_iterations: u64,
    pub random_seed: u64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_vocabulary: 1000,
            named_categories: ["tech", "entertainment", "game", "knowledge", "music"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            similar_user_count: 5,
            recency_window_days: 30.0,
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            min_training_rows: 10,
            validation_split: 0.2,
            random_seed: 42,
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            cluster_count: 5,
            max_iterations: 300,
            random_seed: 42,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            features: FeatureConfig {
                max_vocabulary: env::var("FEATURE_MAX_VOCABULARY")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .expect("FEATURE_MAX_VOCABULARY must be a valid usize"),
                named_categories: env::var("FEATURE_NAMED_CATEGORIES")
                    .map(|raw| {
                        raw.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.features.named_categories),
            },
            recommend: RecommendConfig {
                default_top_n: env::var("RECOMMEND_TOP_N")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("RECOMMEND_TOP_N must be a valid usize"),
                similar_user_count: env::var("RECOMMEND_SIMILAR_USERS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("RECOMMEND_SIMILAR_USERS must be a valid usize"),
                recency_window_days: env::var("RECOMMEND_RECENCY_WINDOW_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("RECOMMEND_RECENCY_WINDOW_DAYS must be a valid f64"),
            },
            prediction: PredictionConfig {
                min_training_rows: env::var("PREDICTION_MIN_ROWS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("PREDICTION_MIN_ROWS must be a valid usize"),
                validation_split: env::var("PREDICTION_VALIDATION_SPLIT")
                    .unwrap_or_else(|_| "0.2".to_string())
                    .parse()
                    .expect("PREDICTION_VALIDATION_SPLIT must be a valid f64"),
                random_seed: env::var("PREDICTION_RANDOM_SEED")
                    .unwrap_or_else(|_| "42".to_string())
                    .parse()
                    .expect("PREDICTION_RANDOM_SEED must be a valid u64"),
            },
            clustering: ClusteringConfig {
                cluster_count: env::var("CLUSTERING_CLUSTER_COUNT")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("CLUSTERING_CLUSTER_COUNT must be a valid usize"),
                max_iterations: env::var("CLUSTERING_MAX_ITERATIONS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .expect("CLUSTERING_MAX_ITERATIONS must be a valid u64"),
                random_seed: env::var("CLUSTERING_RANDOM_SEED")
                    .unwrap_or_else(|_| "42".to_string())
                    .parse()
                    .expect("CLUSTERING_RANDOM_SEED must be a valid u64"),
            },
        }
    }
}
