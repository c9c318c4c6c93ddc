//! User-based collaborative filtering.
//!
//! Aggregates unseen videos from the target user's most similar neighbours.
//! Per candidate, each contributing neighbour adds its similarity weight;
//! the final score is
//!
//!   (similarity_sum / contributor_count) · ln(contributor_count + 1)
//!
//! so broadly-endorsed candidates outrank single-neighbour ones at equal
//! average similarity. Fallback to popularity ranking is decided by the
//! dispatch layer.

use crate::models::{Recommendation, Strategy, UserHistory};
use crate::services::similarity::SimilarityMatrix;
use std::collections::{HashMap, HashSet};
use tracing::debug;

struct CandidateScore {
    title: String,
    similarity_sum: f64,
    contributors: usize,
}

pub fn recommend(
    target_user: &str,
    histories: &[UserHistory],
    user_matrix: &SimilarityMatrix,
    neighbor_count: usize,
    top_n: usize,
) -> Vec<Recommendation> {
    let neighbors = user_matrix.neighbors(target_user, neighbor_count);
    if neighbors.is_empty() {
        return Vec::new();
    }

    let by_user: HashMap<&str, &UserHistory> = histories
        .iter()
        .map(|h| (h.user_id.as_str(), h))
        .collect();

    let watched: HashSet<&str> = by_user
        .get(target_user)
        .map(|h| h.entries.iter().map(|e| e.video_id.as_str()).collect())
        .unwrap_or_default();

    let mut candidates: HashMap<String, CandidateScore> = HashMap::new();
    // Remember insertion order so equal final scores stay deterministic.
    let mut order: Vec<String> = Vec::new();

    for (neighbor_id, similarity) in &neighbors {
        let Some(neighbor) = by_user.get(neighbor_id.as_str()) else {
            continue;
        };

        for entry in &neighbor.entries {
            if watched.contains(entry.video_id.as_str()) {
                continue;
            }

            let candidate = candidates
                .entry(entry.video_id.clone())
                .or_insert_with(|| {
                    order.push(entry.video_id.clone());
                    CandidateScore {
                        title: entry.title.clone().unwrap_or_default(),
                        similarity_sum: 0.0,
                        contributors: 0,
                    }
                });
            candidate.similarity_sum += similarity;
            candidate.contributors += 1;
        }
    }

    let mut scored: Vec<(String, String, f64)> = order
        .into_iter()
        .map(|video_id| {
            let candidate = &candidates[&video_id];
            let count = candidate.contributors as f64;
            let score = candidate.similarity_sum / count * (count + 1.0).ln();
            (video_id, candidate.title.clone(), score)
        })
        .collect();

    scored.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

    debug!(
        target = target_user,
        neighbors = neighbors.len(),
        candidates = scored.len(),
        "User-CF candidates aggregated"
    );

    scored
        .into_iter()
        .take(top_n)
        .map(|(video_id, title, score)| Recommendation {
            video_id,
            title,
            score,
            strategy: Strategy::UserCollaborative,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureConfig;
    use crate::services::features::ProfileBuilder;
    use crate::services::recommendation::tests::{history_entry, user_history};
    use crate::services::similarity;

    fn matrix_for(histories: &[UserHistory]) -> SimilarityMatrix {
        let builder = ProfileBuilder::new(&FeatureConfig::default());
        similarity::user_similarity(histories, &builder)
    }

    #[test]
    fn test_excludes_already_watched() {
        let histories = vec![
            user_history("target", vec![history_entry("seen", Some("tech"))]),
            user_history(
                "peer",
                vec![
                    history_entry("seen", Some("tech")),
                    history_entry("fresh", Some("tech")),
                ],
            ),
        ];
        let matrix = matrix_for(&histories);
        let recs = recommend("target", &histories, &matrix, 5, 10);

        assert!(recs.iter().all(|r| r.video_id != "seen"));
        assert!(recs.iter().any(|r| r.video_id == "fresh"));
        assert!(recs.iter().all(|r| r.strategy == Strategy::UserCollaborative));
    }

    #[test]
    fn test_multiple_contributors_raise_score() {
        let histories = vec![
            user_history("target", vec![history_entry("seen", Some("tech"))]),
            user_history(
                "peer1",
                vec![
                    history_entry("shared", Some("tech")),
                    history_entry("solo1", Some("tech")),
                ],
            ),
            user_history(
                "peer2",
                vec![
                    history_entry("shared", Some("tech")),
                    history_entry("solo2", Some("tech")),
                ],
            ),
        ];
        let matrix = matrix_for(&histories);
        let recs = recommend("target", &histories, &matrix, 5, 10);

        let shared = recs.iter().find(|r| r.video_id == "shared").unwrap();
        let solo = recs.iter().find(|r| r.video_id == "solo1").unwrap();
        assert!(shared.score > solo.score);
        assert_eq!(recs[0].video_id, "shared");
    }

    #[test]
    fn test_unknown_target_returns_empty() {
        let histories = vec![
            user_history("a", vec![history_entry("v", Some("tech"))]),
            user_history("b", vec![history_entry("w", Some("tech"))]),
        ];
        let matrix = matrix_for(&histories);
        assert!(recommend("ghost", &histories, &matrix, 5, 10).is_empty());
    }
}
