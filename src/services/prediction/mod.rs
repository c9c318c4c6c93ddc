// ============================================
// Prediction Engine
// ============================================
//
// Supervised view-count prediction:
// 1. Engineer features from video metadata (publish time, title shape,
//    encoded category, duration)
// 2. Train a fixed panel of regressors on a seeded 80/20 split
// 3. Keep the lowest-validation-MSE model as the active one; the losing
//    candidates are discarded
// 4. Serve single-record predictions through the retained scaler/encoder

pub mod regressors;
pub mod tree;

use crate::config::PredictionConfig;
use crate::error::{EngineError, Result};
use crate::models::VideoRecord;
use crate::services::features::{LabelEncoder, StandardScaler, OTHER_CATEGORY};
use chrono::{Datelike, Timelike};
use ndarray::{Array1, Array2};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use self::regressors::{
    GradientBoostingRegressor, LinearRegressor, RandomForestRegressor, Regressor,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use self::tree::TreeParams;

/// The closed candidate panel. Selection picks one by validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    Linear,
    RandomForest,
    GradientBoosting,
    StochasticGradientBoosting,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoosting => "gradient_boosting",
            ModelKind::StochasticGradientBoosting => "stochastic_gradient_boosting",
        }
    }

    fn all() -> [ModelKind; 4] {
        [
            ModelKind::Linear,
            ModelKind::RandomForest,
            ModelKind::GradientBoosting,
            ModelKind::StochasticGradientBoosting,
        ]
    }

    fn build(&self, seed: u64) -> Box<dyn Regressor> {
        match self {
            ModelKind::Linear => Box::new(LinearRegressor::default()),
            ModelKind::RandomForest => Box::new(RandomForestRegressor::new(
                100,
                TreeParams {
                    max_depth: 10,
                    ..TreeParams::default()
                },
                seed,
            )),
            ModelKind::GradientBoosting => Box::new(GradientBoostingRegressor::new(
                100,
                0.1,
                1.0,
                TreeParams {
                    max_depth: 3,
                    ..TreeParams::default()
                },
                seed,
            )),
            ModelKind::StochasticGradientBoosting => Box::new(GradientBoostingRegressor::new(
                150,
                0.05,
                0.8,
                TreeParams {
                    max_depth: 4,
                    ..TreeParams::default()
                },
                seed,
            )),
        }
    }
}

/// Feature columns, selected at training time from what the data offers and
/// reused verbatim at prediction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureColumn {
    Hour,
    DayOfWeek,
    Month,
    TitleLength,
    TitleWordCount,
    Category,
    DurationMinutes,
}

impl FeatureColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureColumn::Hour => "hour",
            FeatureColumn::DayOfWeek => "day_of_week",
            FeatureColumn::Month => "month",
            FeatureColumn::TitleLength => "title_length",
            FeatureColumn::TitleWordCount => "title_word_count",
            FeatureColumn::Category => "category",
            FeatureColumn::DurationMinutes => "duration_minutes",
        }
    }
}

/// Validation metrics for one candidate model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub model: ModelKind,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// Outcome of a training run: per-candidate metrics plus the selected
/// active model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub rows_used: usize,
    pub rows_dropped: usize,
    pub results: Vec<ModelMetrics>,
    pub best_model: ModelKind,
    pub best_mse: f64,
    pub feature_importance: Option<Vec<(String, f64)>>,
}

struct TrainedState {
    columns: Vec<FeatureColumn>,
    scaler: StandardScaler,
    encoder: Option<LabelEncoder>,
    model: Box<dyn Regressor>,
    kind: ModelKind,
    validation_mse: f64,
    importances: Option<Vec<(String, f64)>>,
}

/// View-count predictor holding at most one active model.
pub struct ViewPredictor {
    config: PredictionConfig,
    state: Option<TrainedState>,
}

impl ViewPredictor {
    pub fn new(config: PredictionConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    pub fn active_model(&self) -> Option<(ModelKind, f64)> {
        self.state.as_ref().map(|s| (s.kind, s.validation_mse))
    }

    pub fn feature_importance(&self) -> Option<&[(String, f64)]> {
        self.state
            .as_ref()
            .and_then(|s| s.importances.as_deref())
    }

    /// Train the candidate panel and keep the best model. Rows missing a
    /// selected feature are dropped silently; a structurally unusable
    /// dataset surfaces as `InsufficientData`.
    pub fn train(&mut self, videos: &[VideoRecord]) -> Result<TrainingReport> {
        let columns = select_columns(videos);
        if columns.is_empty() {
            return Err(EngineError::InsufficientData(
                "No usable feature columns".to_string(),
            ));
        }

        let usable: Vec<&VideoRecord> = videos
            .iter()
            .filter(|v| row_is_usable(v, &columns))
            .collect();
        let dropped = videos.len() - usable.len();
        if dropped > 0 {
            debug!(dropped, "Dropped rows missing selected features");
        }

        if usable.len() < self.config.min_training_rows {
            return Err(EngineError::InsufficientData(format!(
                "Need at least {} usable rows, got {}",
                self.config.min_training_rows,
                usable.len()
            )));
        }

        let encoder = if columns.contains(&FeatureColumn::Category) {
            Some(LabelEncoder::fit(
                usable
                    .iter()
                    .map(|v| v.category.as_deref().unwrap_or(OTHER_CATEGORY)),
            ))
        } else {
            None
        };

        let n = usable.len();
        let mut features = Array2::<f64>::zeros((n, columns.len()));
        let mut target = Array1::<f64>::zeros(n);
        for (row, video) in usable.iter().enumerate() {
            let values = feature_row(video, &columns, encoder.as_ref());
            for (col, value) in values.into_iter().enumerate() {
                features[[row, col]] = value;
            }
            target[row] = video.view as f64;
        }

        let (scaler, scaled) = StandardScaler::fit_transform(&features);

        // Seeded shuffle, then an 80/20 hold-out for validation.
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_seed);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let mut validation_len = ((n as f64) * self.config.validation_split).round() as usize;
        validation_len = validation_len.clamp(1, n - 1);
        let (validation_idx, train_idx) = indices.split_at(validation_len);

        let x_train = select_rows(&scaled, train_idx);
        let y_train = select_values(&target, train_idx);
        let x_val = select_rows(&scaled, validation_idx);
        let y_val = select_values(&target, validation_idx);

        let mut results: Vec<ModelMetrics> = Vec::new();
        let mut best: Option<(ModelKind, Box<dyn Regressor>, f64)> = None;

        for kind in ModelKind::all() {
            let mut model = kind.build(self.config.random_seed);
            if let Err(error) = model.fit(&x_train, &y_train) {
                warn!(model = kind.as_str(), %error, "Candidate model failed to fit");
                continue;
            }

            let predictions = model.predict(&x_val);
            let mse = mean_squared_error(&y_val, &predictions);
            results.push(ModelMetrics {
                model: kind,
                mse,
                rmse: mse.sqrt(),
                r2: r_squared(&y_val, &predictions),
            });

            let better = best.as_ref().map(|(_, _, m)| mse < *m).unwrap_or(true);
            if better {
                best = Some((kind, model, mse));
            }
        }

        let (kind, model, validation_mse) = best.ok_or_else(|| {
            EngineError::FeatureExtraction("All candidate models failed to train".to_string())
        })?;

        let importances = model.feature_importances().map(|scores| {
            columns
                .iter()
                .map(|c| c.as_str().to_string())
                .zip(scores)
                .collect::<Vec<_>>()
        });

        info!(
            model = kind.as_str(),
            mse = validation_mse,
            rows = n,
            "View prediction model selected"
        );

        let report = TrainingReport {
            rows_used: n,
            rows_dropped: dropped,
            results,
            best_model: kind,
            best_mse: validation_mse,
            feature_importance: importances.clone(),
        };

        self.state = Some(TrainedState {
            columns,
            scaler,
            encoder,
            model,
            kind,
            validation_mse,
            importances,
        });

        Ok(report)
    }

    /// Predict the view count for a single record. Missing fields fall back
    /// to safe defaults instead of failing; the result is clamped at zero
    /// and rounded.
    pub fn predict(&self, video: &VideoRecord) -> Result<u64> {
        let state = self.state.as_ref().ok_or_else(|| {
            EngineError::ModelNotTrained(
                "Train the view model before requesting predictions".to_string(),
            )
        })?;

        let values = feature_row(video, &state.columns, state.encoder.as_ref());
        let mut features = Array2::<f64>::zeros((1, values.len()));
        for (col, value) in values.into_iter().enumerate() {
            features[[0, col]] = value;
        }

        let scaled = state.scaler.transform(&features);
        let prediction = state.model.predict(&scaled)[0];

        Ok(prediction.max(0.0).round() as u64)
    }
}

/// Columns available for this video set. Time and title features are always
/// engineered; category and duration join when any record carries them.
fn select_columns(videos: &[VideoRecord]) -> Vec<FeatureColumn> {
    let mut columns = vec![
        FeatureColumn::Hour,
        FeatureColumn::DayOfWeek,
        FeatureColumn::Month,
        FeatureColumn::TitleLength,
        FeatureColumn::TitleWordCount,
    ];
    if videos.iter().any(|v| v.category.is_some()) {
        columns.push(FeatureColumn::Category);
    }
    if videos.iter().any(|v| v.duration_secs.is_some()) {
        columns.push(FeatureColumn::DurationMinutes);
    }
    columns
}

/// Training-time usability: publish time backs three selected columns, and
/// duration is required once its column is selected. A missing category is
/// not disqualifying; it encodes to the "other" bucket.
fn row_is_usable(video: &VideoRecord, columns: &[FeatureColumn]) -> bool {
    if video.published_at.is_none() {
        return false;
    }
    if columns.contains(&FeatureColumn::DurationMinutes) && video.duration_secs.is_none() {
        return false;
    }
    true
}

fn feature_row(
    video: &VideoRecord,
    columns: &[FeatureColumn],
    encoder: Option<&LabelEncoder>,
) -> Vec<f64> {
    columns
        .iter()
        .map(|column| match column {
            FeatureColumn::Hour => video
                .published_at
                .map(|t| f64::from(t.hour()))
                .unwrap_or(0.0),
            FeatureColumn::DayOfWeek => video
                .published_at
                .map(|t| f64::from(t.weekday().num_days_from_monday()))
                .unwrap_or(0.0),
            FeatureColumn::Month => video
                .published_at
                .map(|t| f64::from(t.month()))
                .unwrap_or(0.0),
            FeatureColumn::TitleLength => video.title.chars().count() as f64,
            FeatureColumn::TitleWordCount => video.title.split_whitespace().count() as f64,
            FeatureColumn::Category => {
                let label = video.category.as_deref().unwrap_or(OTHER_CATEGORY);
                encoder.map(|e| e.encode(label) as f64).unwrap_or(0.0)
            }
            FeatureColumn::DurationMinutes => video
                .duration_secs
                .map(|secs| f64::from(secs) / 60.0)
                .unwrap_or(0.0),
        })
        .collect()
}

fn select_rows(data: &Array2<f64>, rows: &[usize]) -> Array2<f64> {
    let mut out = Array2::zeros((rows.len(), data.ncols()));
    for (i, &row) in rows.iter().enumerate() {
        out.row_mut(i).assign(&data.row(row));
    }
    out
}

fn select_values(data: &Array1<f64>, rows: &[usize]) -> Array1<f64> {
    Array1::from_iter(rows.iter().map(|&row| data[row]))
}

fn mean_squared_error(truth: &Array1<f64>, predictions: &Array1<f64>) -> f64 {
    truth
        .iter()
        .zip(predictions.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / truth.len() as f64
}

fn r_squared(truth: &Array1<f64>, predictions: &Array1<f64>) -> f64 {
    let mean = truth.sum() / truth.len() as f64;
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = truth
        .iter()
        .zip(predictions.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}
