//! Z-score standardization and label encoding, fitted once per training
//! session and reused for every later transform of new data.

use ndarray::{Array1, Array2, Axis};
use std::collections::HashMap;

/// Label assigned to records whose category is missing, and the bucket
/// unseen categories map to at transform time.
pub const OTHER_CATEGORY: &str = "other";

/// Per-column z-score scaler (zero mean, unit variance).
///
/// Zero-variance columns transform to 0.0 instead of dividing by zero.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(data: &Array2<f64>) -> Self {
        let means = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(data.ncols()));
        let stds = data.std_axis(Axis(0), 0.0);
        Self { means, stds }
    }

    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let mut out = data.clone();
        for mut row in out.rows_mut() {
            for (col, value) in row.iter_mut().enumerate() {
                let std = self.stds[col];
                *value = if std > 0.0 {
                    (*value - self.means[col]) / std
                } else {
                    0.0
                };
            }
        }
        out
    }

    pub fn fit_transform(data: &Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(data);
        let transformed = scaler.transform(data);
        (scaler, transformed)
    }
}

/// Dense label encoder with a designated bucket for categories unseen at
/// fit time. Indices follow first-seen order over the training data.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Fit on the training-time labels. The `other` bucket is always part
    /// of the vocabulary even when the training data never used it.
    pub fn fit<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for label in labels {
            if !index.contains_key(label) {
                index.insert(label.to_string(), classes.len());
                classes.push(label.to_string());
            }
        }
        if !index.contains_key(OTHER_CATEGORY) {
            index.insert(OTHER_CATEGORY.to_string(), classes.len());
            classes.push(OTHER_CATEGORY.to_string());
        }
        Self { classes, index }
    }

    /// Encode a label; unknown labels map to the `other` bucket rather than
    /// failing.
    pub fn encode(&self, label: &str) -> usize {
        self.index
            .get(label)
            .copied()
            .unwrap_or_else(|| self.index[OTHER_CATEGORY])
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}
