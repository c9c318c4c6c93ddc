//! Content-based recommendation: nearest neighbours of a seed video in the
//! content similarity matrix, annotated with their cosine scores.

use crate::models::{Recommendation, Strategy};
use crate::services::similarity::SimilarityMatrix;
use std::collections::HashMap;

/// Top-N neighbours of `seed_id`, the seed itself excluded. A seed absent
/// from the matrix yields an empty list, not an error.
pub fn recommend(
    matrix: &SimilarityMatrix,
    titles: &HashMap<String, String>,
    seed_id: &str,
    top_n: usize,
) -> Vec<Recommendation> {
    matrix
        .neighbors(seed_id, top_n)
        .into_iter()
        .map(|(video_id, score)| {
            let title = titles.get(&video_id).cloned().unwrap_or_default();
            Recommendation {
                video_id,
                title,
                score,
                strategy: Strategy::ContentBased,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fixture() -> (SimilarityMatrix, HashMap<String, String>) {
        let features = array![[1.0, 0.0, 0.0], [0.9, 0.1, 0.0], [0.0, 0.0, 1.0]];
        let matrix = SimilarityMatrix::from_features(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            &features,
        );
        let titles = [("a", "alpha"), ("b", "beta"), ("c", "gamma")]
            .iter()
            .map(|(id, t)| (id.to_string(), t.to_string()))
            .collect();
        (matrix, titles)
    }

    #[test]
    fn test_never_returns_seed() {
        let (matrix, titles) = fixture();
        let recs = recommend(&matrix, &titles, "a", 10);
        assert!(!recs.is_empty());
        assert!(recs.iter().all(|r| r.video_id != "a"));
        assert_eq!(recs[0].video_id, "b");
        assert_eq!(recs[0].title, "beta");
        assert_eq!(recs[0].strategy, Strategy::ContentBased);
    }

    #[test]
    fn test_unknown_seed_returns_empty() {
        let (matrix, titles) = fixture();
        assert!(recommend(&matrix, &titles, "nope", 10).is_empty());
    }
}
