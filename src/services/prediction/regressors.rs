//! The closed panel of candidate regressors behind one fit/predict
//! capability interface. Selection between them happens by validation
//! error, never by downcasting.

use super::tree::{RegressionTree, TreeParams};
use crate::error::{EngineError, Result};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait Regressor: Send + Sync {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;
    fn predict(&self, x: &Array2<f64>) -> Array1<f64>;
    /// Per-feature importance scores summing to 1, when the model exposes
    /// them.
    fn feature_importances(&self) -> Option<Vec<f64>>;
}

// ---------- Linear ----------

/// Ordinary least squares via the normal equations, with a small ridge term
/// so near-collinear feature sets stay solvable.
#[derive(Debug, Default)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

const RIDGE_EPSILON: f64 = 1e-8;

impl Regressor for LinearRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        let d = x.ncols();
        // Augmented design: d coefficients plus the intercept column.
        let size = d + 1;

        let mut gram = vec![vec![0.0; size]; size];
        let mut rhs = vec![0.0; size];
        for row in 0..n {
            for i in 0..size {
                let a_i = if i < d { x[[row, i]] } else { 1.0 };
                rhs[i] += a_i * y[row];
                for j in i..size {
                    let a_j = if j < d { x[[row, j]] } else { 1.0 };
                    gram[i][j] += a_i * a_j;
                }
            }
        }
        for i in 0..size {
            for j in 0..i {
                gram[i][j] = gram[j][i];
            }
            gram[i][i] += RIDGE_EPSILON;
        }

        let solution = solve(gram, rhs).ok_or_else(|| {
            EngineError::FeatureExtraction("Singular design matrix in linear fit".to_string())
        })?;

        self.coefficients = solution[..d].to_vec();
        self.intercept = solution[d];
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(x.nrows());
        for (row_idx, row) in x.rows().into_iter().enumerate() {
            let mut value = self.intercept;
            for (coef, feature) in self.coefficients.iter().zip(row.iter()) {
                value += coef * feature;
            }
            out[row_idx] = value;
        }
        out
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut value = b[col];
        for k in (col + 1)..n {
            value -= a[col][k] * x[k];
        }
        x[col] = value / a[col][col];
    }
    Some(x)
}

// ---------- Random forest ----------

pub struct RandomForestRegressor {
    n_estimators: usize,
    params: TreeParams,
    seed: u64,
    trees: Vec<RegressionTree>,
    importances: Vec<f64>,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, params: TreeParams, seed: u64) -> Self {
        Self {
            n_estimators,
            params,
            seed,
            trees: Vec::new(),
            importances: Vec::new(),
        }
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(EngineError::InsufficientData(
                "Cannot fit a forest on zero rows".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.trees = Vec::with_capacity(self.n_estimators);
        self.importances = vec![0.0; x.ncols()];

        for _ in 0..self.n_estimators {
            // Bootstrap sample, same size as the training set.
            let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            self.trees.push(RegressionTree::fit(
                x,
                y,
                rows,
                &self.params,
                &mut self.importances,
            ));
        }

        normalize(&mut self.importances);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(x.nrows());
        for (row_idx, row) in x.rows().into_iter().enumerate() {
            let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
            out[row_idx] = sum / self.trees.len().max(1) as f64;
        }
        out
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        Some(self.importances.clone())
    }
}

// ---------- Gradient boosting ----------

pub struct GradientBoostingRegressor {
    n_estimators: usize,
    learning_rate: f64,
    /// Row fraction drawn (without replacement) per boosting round; 1.0
    /// disables subsampling.
    subsample: f64,
    params: TreeParams,
    seed: u64,
    base_prediction: f64,
    trees: Vec<RegressionTree>,
    importances: Vec<f64>,
}

impl GradientBoostingRegressor {
    pub fn new(
        n_estimators: usize,
        learning_rate: f64,
        subsample: f64,
        params: TreeParams,
        seed: u64,
    ) -> Self {
        Self {
            n_estimators,
            learning_rate,
            subsample,
            params,
            seed,
            base_prediction: 0.0,
            trees: Vec::new(),
            importances: Vec::new(),
        }
    }
}

impl Regressor for GradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(EngineError::InsufficientData(
                "Cannot boost on zero rows".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.base_prediction = y.sum() / n as f64;
        self.trees = Vec::with_capacity(self.n_estimators);
        self.importances = vec![0.0; x.ncols()];

        let mut residuals = y.mapv(|v| v - self.base_prediction);

        for _ in 0..self.n_estimators {
            let rows: Vec<usize> = if self.subsample < 1.0 {
                let take = ((n as f64 * self.subsample).floor() as usize).max(1);
                let mut all: Vec<usize> = (0..n).collect();
                for i in 0..take {
                    let j = rng.gen_range(i..n);
                    all.swap(i, j);
                }
                all.truncate(take);
                all
            } else {
                (0..n).collect()
            };

            let tree = RegressionTree::fit(x, &residuals, rows, &self.params, &mut self.importances);

            for (row_idx, row) in x.rows().into_iter().enumerate() {
                residuals[row_idx] -= self.learning_rate * tree.predict_row(row);
            }
            self.trees.push(tree);
        }

        normalize(&mut self.importances);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(x.nrows());
        for (row_idx, row) in x.rows().into_iter().enumerate() {
            let boosted: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
            out[row_idx] = self.base_prediction + self.learning_rate * boosted;
        }
        out
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        Some(self.importances.clone())
    }
}

fn normalize(importances: &mut [f64]) {
    let total: f64 = importances.iter().sum();
    if total > 0.0 {
        for value in importances.iter_mut() {
            *value /= total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn linear_data() -> (Array2<f64>, Array1<f64>) {
        // y = 3x + 2
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![2.0, 5.0, 8.0, 11.0, 14.0, 17.0];
        (x, y)
    }

    #[test]
    fn test_linear_recovers_line() {
        let (x, y) = linear_data();
        let mut model = LinearRegressor::default();
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&array![[10.0]]);
        assert!((pred[0] - 32.0).abs() < 1e-4);
        assert!(model.feature_importances().is_none());
    }

    #[test]
    fn test_forest_predicts_in_target_range() {
        let (x, y) = linear_data();
        let mut model = RandomForestRegressor::new(20, TreeParams::default(), 42);
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&array![[2.5]]);
        assert!(pred[0] >= 2.0 && pred[0] <= 17.0);

        let importances = model.feature_importances().unwrap();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_boosting_reduces_training_error() {
        let (x, y) = linear_data();
        let mut model =
            GradientBoostingRegressor::new(50, 0.1, 1.0, TreeParams::default(), 42);
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x);
        let mse: f64 = pred
            .iter()
            .zip(y.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        let variance = y.std(0.0).powi(2);
        assert!(mse < variance, "mse {} should beat variance {}", mse, variance);
    }

    #[test]
    fn test_seeded_fits_are_reproducible() {
        let (x, y) = linear_data();
        let mut a = RandomForestRegressor::new(10, TreeParams::default(), 7);
        let mut b = RandomForestRegressor::new(10, TreeParams::default(), 7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        let pa = a.predict(&x);
        let pb = b.predict(&x);
        for (va, vb) in pa.iter().zip(pb.iter()) {
            assert_eq!(va, vb);
        }
    }
}
