// ============================================
// Similarity Engine
// ============================================
//
// Pairwise cosine-similarity matrices over feature vectors built by the
// Feature Builder:
// - content-to-content over the TF-IDF matrix
// - user-to-user over standardized preference profiles
//
// A matrix is owned by the engine instance that built it and must be
// rebuilt from scratch whenever the underlying entity set changes.

use crate::models::{UserHistory, VideoRecord};
use crate::services::features::{ProfileBuilder, StandardScaler, TfidfVectorizer};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Cosine similarity between two vectors. Zero-norm vectors have a defined
/// similarity of 0.0 rather than NaN.
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let dot = a.dot(&b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// A symmetric similarity matrix keyed by entity identifier.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    matrix: Array2<f64>,
}

/// A similar-user lookup result with the neighbour's profile features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarUser {
    pub user_id: String,
    pub similarity: f64,
    pub profile: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build the full pairwise matrix from one feature row per entity.
    /// Duplicate identifiers keep their first-seen row; later rows are
    /// dropped with a warning.
    pub fn from_features(ids: Vec<String>, features: &Array2<f64>) -> Self {
        debug_assert_eq!(ids.len(), features.nrows());

        let mut kept_ids: Vec<String> = Vec::with_capacity(ids.len());
        let mut kept_rows: Vec<usize> = Vec::with_capacity(ids.len());
        let mut index: HashMap<String, usize> = HashMap::new();
        for (row, id) in ids.into_iter().enumerate() {
            if index.contains_key(&id) {
                warn!(entity = %id, "Duplicate identifier dropped from similarity matrix");
                continue;
            }
            index.insert(id.clone(), kept_ids.len());
            kept_ids.push(id);
            kept_rows.push(row);
        }

        let n = kept_ids.len();
        let mut matrix = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            matrix[[i, i]] = 1.0;
            for j in (i + 1)..n {
                let sim = cosine_similarity(
                    features.row(kept_rows[i]),
                    features.row(kept_rows[j]),
                );
                matrix[[i, j]] = sim;
                matrix[[j, i]] = sim;
            }
        }

        Self {
            ids: kept_ids,
            index,
            matrix,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Neighbours of `id` sorted by descending similarity, the entity
    /// itself excluded. Ties keep first-seen input order. Returns empty when
    /// the identifier is unknown or fewer than two entities are loaded.
    pub fn neighbors(&self, id: &str, top_n: usize) -> Vec<(String, f64)> {
        if self.ids.len() < 2 {
            return Vec::new();
        }
        let row = match self.index.get(id) {
            Some(&row) => row,
            None => return Vec::new(),
        };

        let mut scored: Vec<(usize, f64)> = (0..self.ids.len())
            .filter(|&other| other != row)
            .map(|other| (other, self.matrix[[row, other]]))
            .collect();
        // Stable sort: equal scores preserve first-seen order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_n)
            .map(|(other, score)| (self.ids[other].clone(), score))
            .collect()
    }
}

/// Build the content similarity matrix over a video set's titles and
/// descriptions. Missing text is tolerated as empty.
pub fn content_similarity(videos: &[VideoRecord], max_vocabulary: usize) -> SimilarityMatrix {
    let documents: Vec<String> = videos.iter().map(|v| v.content_text()).collect();
    let mut vectorizer = TfidfVectorizer::new(max_vocabulary);
    let tfidf = vectorizer.fit_transform(&documents);

    let ids: Vec<String> = videos.iter().map(|v| v.id.clone()).collect();
    let matrix = SimilarityMatrix::from_features(ids, &tfidf);

    info!(
        videos = matrix.len(),
        vocabulary = vectorizer.vocabulary_len(),
        "Content similarity matrix rebuilt"
    );

    matrix
}

/// Build the user similarity matrix over standardized preference profiles.
/// Profiles are recomputed from scratch on every call.
pub fn user_similarity(
    histories: &[UserHistory],
    profile_builder: &ProfileBuilder,
) -> SimilarityMatrix {
    let n = histories.len();
    let dims = profile_builder.dimensions();

    let mut features = Array2::<f64>::zeros((n, dims));
    for (row, history) in histories.iter().enumerate() {
        let profile = profile_builder.build(&history.entries);
        for (col, value) in profile.into_iter().enumerate() {
            features[[row, col]] = value;
        }
    }

    let (_, standardized) = StandardScaler::fit_transform(&features);

    let ids: Vec<String> = histories.iter().map(|h| h.user_id.clone()).collect();
    let matrix = SimilarityMatrix::from_features(ids, &standardized);

    info!(users = matrix.len(), "User similarity matrix rebuilt");

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cosine_similarity_basics() {
        let a = array![1.0, 0.0];
        let b = array![1.0, 0.0];
        let c = array![0.0, 1.0];
        assert!((cosine_similarity(a.view(), b.view()) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(a.view(), c.view()), 0.0);
    }

    #[test]
    fn test_zero_norm_is_defined() {
        let zero = array![0.0, 0.0];
        let other = array![1.0, 2.0];
        let sim = cosine_similarity(zero.view(), other.view());
        assert_eq!(sim, 0.0);
        assert!(!sim.is_nan());
    }

    #[test]
    fn test_neighbors_exclude_self_and_sort_descending() {
        let features = array![[1.0, 0.0], [1.0, 0.1], [0.0, 1.0]];
        let matrix = SimilarityMatrix::from_features(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            &features,
        );

        let neighbors = matrix.neighbors("a", 10);
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].0, "b");
        assert!(neighbors[0].1 > neighbors[1].1);
        assert!(neighbors.iter().all(|(id, _)| id != "a"));
    }

    #[test]
    fn test_unknown_id_returns_empty() {
        let features = array![[1.0, 0.0], [0.0, 1.0]];
        let matrix =
            SimilarityMatrix::from_features(vec!["a".to_string(), "b".to_string()], &features);
        assert!(matrix.neighbors("missing", 5).is_empty());
    }

    #[test]
    fn test_single_entity_returns_empty() {
        let features = array![[1.0, 0.0]];
        let matrix = SimilarityMatrix::from_features(vec!["only".to_string()], &features);
        assert!(matrix.neighbors("only", 5).is_empty());
    }
}
