//! Variance-reduction regression tree, the shared building block of the
//! forest and boosted ensemble regressors.

use ndarray::{Array1, Array2, ArrayView1};

#[derive(Debug, Clone)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree stored as a flat node arena.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit on the subset `rows` of `(x, y)`. Split gains are credited to
    /// `importances`, weighted by the number of samples reaching the split.
    pub fn fit(
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: Vec<usize>,
        params: &TreeParams,
        importances: &mut [f64],
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, rows, params, 0, importances);
        tree
    }

    fn grow(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: Vec<usize>,
        params: &TreeParams,
        depth: usize,
        importances: &mut [f64],
    ) -> usize {
        let node_idx = self.nodes.len();
        let mean = rows.iter().map(|&r| y[r]).sum::<f64>() / rows.len() as f64;
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= params.max_depth || rows.len() < params.min_samples_split {
            return node_idx;
        }

        let Some((feature, threshold, gain)) = best_split(x, y, &rows, params) else {
            return node_idx;
        };
        importances[feature] += gain * rows.len() as f64;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| x[[r, feature]] <= threshold);

        let left = self.grow(x, y, left_rows, params, depth + 1, importances);
        let right = self.grow(x, y, right_rows, params, depth + 1, importances);

        self.nodes[node_idx] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        node_idx
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Exhaustive best-split search: for every feature, scan the sorted sample
/// boundaries and keep the split with the largest variance reduction.
fn best_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    rows: &[usize],
    params: &TreeParams,
) -> Option<(usize, f64, f64)> {
    let n = rows.len() as f64;
    let total_sum: f64 = rows.iter().map(|&r| y[r]).sum();
    let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
    let parent_var = total_sq / n - (total_sum / n).powi(2);
    if parent_var <= 1e-12 {
        return None;
    }

    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..x.ncols() {
        let mut sorted = rows.to_vec();
        sorted.sort_by(|&a, &b| {
            x[[a, feature]]
                .partial_cmp(&x[[b, feature]])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..sorted.len() - 1 {
            let value = y[sorted[i]];
            left_sum += value;
            left_sq += value * value;

            // No boundary between equal feature values.
            if x[[sorted[i], feature]] == x[[sorted[i + 1], feature]] {
                continue;
            }

            let left_n = (i + 1) as f64;
            let right_n = n - left_n;
            if (i + 1) < params.min_samples_leaf
                || (sorted.len() - i - 1) < params.min_samples_leaf
            {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let left_var = left_sq / left_n - (left_sum / left_n).powi(2);
            let right_var = right_sq / right_n - (right_sum / right_n).powi(2);
            let gain = parent_var - (left_n * left_var + right_n * right_var) / n;

            if gain > 1e-12 && best.map(|(_, _, g)| gain > g).unwrap_or(true) {
                let threshold = (x[[sorted[i], feature]] + x[[sorted[i + 1], feature]]) / 2.0;
                best = Some((feature, threshold, gain));
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_tree_fits_step_function() {
        let x = array![[0.0], [1.0], [2.0], [10.0], [11.0], [12.0]];
        let y = array![1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
        let rows: Vec<usize> = (0..6).collect();
        let mut importances = vec![0.0];

        let tree = RegressionTree::fit(&x, &y, rows, &TreeParams::default(), &mut importances);

        assert!((tree.predict_row(array![1.5].view()) - 1.0).abs() < 1e-9);
        assert!((tree.predict_row(array![11.0].view()) - 5.0).abs() < 1e-9);
        assert!(importances[0] > 0.0);
    }

    #[test]
    fn test_pure_node_stays_leaf() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![3.0, 3.0, 3.0];
        let mut importances = vec![0.0];

        let tree = RegressionTree::fit(
            &x,
            &y,
            vec![0, 1, 2],
            &TreeParams::default(),
            &mut importances,
        );

        assert!((tree.predict_row(array![99.0].view()) - 3.0).abs() < 1e-9);
        assert_eq!(importances[0], 0.0);
    }
}
