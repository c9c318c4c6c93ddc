// Utility functions shared across the engine's scoring paths.

/// Normalize a raw counter against the maximum observed value in the
/// candidate set. An all-zero column normalizes to 0 rather than dividing
/// by zero.
pub fn max_normalize(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        0.0
    } else {
        value / max
    }
}

/// Recency decay factor for content published `days` ago.
///
/// Formula: e^(-days / window)
///
/// With the default 30-day window, day-0 content keeps its full score and
/// 30-day-old content retains ~36.8% of it.
pub fn recency_decay(days: f64, window_days: f64) -> f64 {
    (-days.max(0.0) / window_days).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_normalize() {
        assert!((max_normalize(5.0, 10.0) - 0.5).abs() < 0.001);
        assert!((max_normalize(10.0, 10.0) - 1.0).abs() < 0.001);
        // All-zero column: treated as normalized 0
        assert_eq!(max_normalize(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_recency_decay() {
        assert!((recency_decay(0.0, 30.0) - 1.0).abs() < 0.001);
        let month_old = recency_decay(30.0, 30.0);
        assert!((month_old - 0.368).abs() < 0.01);
        // Future publish dates are treated as fresh, never boosted
        assert!((recency_decay(-5.0, 30.0) - 1.0).abs() < 0.001);
    }
}
