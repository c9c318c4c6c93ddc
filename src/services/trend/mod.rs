// ============================================
// Trend Utility
// ============================================
//
// Stateless linear extrapolation of a labelled time series. A least-squares
// line is fitted over elapsed seconds and projected forward at the series'
// last observed step. Per-step confidence starts at 0.8 and decays by 0.1
// per step ahead.

use crate::models::TimeSeriesPoint;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum observations before a trend is considered fittable.
const MIN_POINTS: usize = 3;
/// Step fallback when the series does not expose a usable last interval.
const DEFAULT_STEP_SECS: f64 = 86_400.0;
const BASE_CONFIDENCE: f64 = 0.8;
const CONFIDENCE_DECAY: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub predicted_value: f64,
    pub confidence: f64,
}

/// Project `periods` future points. Series with fewer than three points
/// yield an empty projection. Predicted values are floor-clamped at zero.
pub fn forecast(series: &[TimeSeriesPoint], periods: usize) -> Vec<TrendPoint> {
    if series.len() < MIN_POINTS {
        return Vec::new();
    }

    let mut sorted = series.to_vec();
    sorted.sort_by_key(|p| p.timestamp);

    let origin = sorted[0].timestamp;
    let elapsed: Vec<f64> = sorted
        .iter()
        .map(|p| (p.timestamp - origin).num_seconds() as f64)
        .collect();
    let values: Vec<f64> = sorted.iter().map(|p| p.value).collect();

    let (slope, intercept) = least_squares(&elapsed, &values);

    let last_elapsed = elapsed[elapsed.len() - 1];
    let mut step = last_elapsed - elapsed[elapsed.len() - 2];
    if step <= 0.0 {
        step = DEFAULT_STEP_SECS;
    }
    let last_timestamp = sorted[sorted.len() - 1].timestamp;

    debug!(
        points = sorted.len(),
        slope,
        step_secs = step,
        "Trend line fitted"
    );

    (1..=periods)
        .map(|ahead| {
            let future = last_elapsed + step * ahead as f64;
            let predicted = (intercept + slope * future).max(0.0);
            TrendPoint {
                timestamp: last_timestamp + Duration::seconds((step * ahead as f64) as i64),
                predicted_value: predicted,
                confidence: (BASE_CONFIDENCE - CONFIDENCE_DECAY * ahead as f64).max(0.0),
            }
        })
        .collect()
}

/// Closed-form simple linear regression. A degenerate x-spread fits a flat
/// line through the mean.
fn least_squares(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        covariance += (xi - mean_x) * (yi - mean_y);
        variance += (xi - mean_x).powi(2);
    }

    if variance == 0.0 {
        return (0.0, mean_y);
    }
    let slope = covariance / variance;
    (slope, mean_y - slope * mean_x)
}
