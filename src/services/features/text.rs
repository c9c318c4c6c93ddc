//! Text feature extraction: word segmentation and a bounded-vocabulary
//! TF-IDF matrix over video titles and descriptions.

use ndarray::Array2;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// Segment free text into lowercase terms.
///
/// Word boundaries follow UAX #29, which keeps Latin words whole and splits
/// CJK runs into per-ideograph unigrams, so mixed-language titles segment
/// without a dictionary. Missing text is the caller's empty string; this
/// never fails.
pub fn segment(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|word| word.to_lowercase())
        .collect()
}

/// Bounded-vocabulary TF-IDF vectorizer.
///
/// Vocabulary is capped at `max_features` terms, selected by document
/// frequency with ties broken by first-seen order. Weights use the smoothed
/// idf `ln((1 + n) / (1 + df)) + 1` and rows are L2-normalized, so row dot
/// products are cosine similarities.
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: HashMap<String, usize>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: HashMap::new(),
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Fit the vocabulary on `documents` and return the weighted term
    /// matrix, one L2-normalized row per document. Documents with no
    /// in-vocabulary terms produce all-zero rows.
    pub fn fit_transform(&mut self, documents: &[String]) -> Array2<f64> {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| segment(d)).collect();

        // Document frequency per term, remembering first-seen order for
        // deterministic tie-breaks.
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();
        for tokens in &tokenized {
            let mut seen_here: HashSet<&str> = HashSet::new();
            for token in tokens {
                if seen_here.insert(token.as_str()) {
                    let count = doc_freq.entry(token.as_str()).or_insert(0);
                    if *count == 0 {
                        first_seen.push(token.as_str());
                    }
                    *count += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, &str)> = first_seen
            .iter()
            .enumerate()
            .map(|(order, term)| (order, *term))
            .collect();
        ranked.sort_by(|a, b| {
            let df_a = doc_freq[a.1];
            let df_b = doc_freq[b.1];
            df_b.cmp(&df_a).then(a.0.cmp(&b.0))
        });

        self.vocabulary = ranked
            .into_iter()
            .take(self.max_features)
            .enumerate()
            .map(|(idx, (_, term))| (term.to_string(), idx))
            .collect();

        let n_docs = documents.len();
        let n_terms = self.vocabulary.len();

        let mut idf = vec![0.0; n_terms];
        for (term, &idx) in &self.vocabulary {
            let df = doc_freq.get(term.as_str()).copied().unwrap_or(0);
            idf[idx] = ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0;
        }

        let mut matrix = Array2::<f64>::zeros((n_docs, n_terms));
        for (row, tokens) in tokenized.iter().enumerate() {
            for token in tokens {
                if let Some(&col) = self.vocabulary.get(token.as_str()) {
                    matrix[[row, col]] += 1.0;
                }
            }

            for col in 0..n_terms {
                matrix[[row, col]] *= idf[col];
            }

            let norm = matrix.row(row).dot(&matrix.row(row)).sqrt();
            if norm > 0.0 {
                for col in 0..n_terms {
                    matrix[[row, col]] /= norm;
                }
            }
        }

        debug!(
            documents = n_docs,
            vocabulary = n_terms,
            "TF-IDF matrix built"
        );

        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_mixed_language() {
        let tokens = segment("Rust 科技 tutorial");
        assert_eq!(tokens, vec!["rust", "科", "技", "tutorial"]);
    }

    #[test]
    fn test_segment_empty() {
        assert!(segment("").is_empty());
        assert!(segment("   ").is_empty());
    }

    #[test]
    fn test_fit_transform_rows_are_normalized() {
        let docs = vec![
            "cat video funny cat".to_string(),
            "dog video".to_string(),
            "cooking show".to_string(),
        ];
        let mut vectorizer = TfidfVectorizer::new(100);
        let matrix = vectorizer.fit_transform(&docs);

        assert_eq!(matrix.nrows(), 3);
        for row in 0..3 {
            let norm = matrix.row(row).dot(&matrix.row(row)).sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "row {} norm {}", row, norm);
        }
    }

    #[test]
    fn test_vocabulary_cap() {
        let docs = vec![
            "a b c d e".to_string(),
            "a b c".to_string(),
            "a b".to_string(),
        ];
        let mut vectorizer = TfidfVectorizer::new(2);
        let matrix = vectorizer.fit_transform(&docs);

        // Highest document frequency wins the capped slots.
        assert_eq!(vectorizer.vocabulary_len(), 2);
        assert_eq!(matrix.ncols(), 2);
    }

    #[test]
    fn test_empty_document_gives_zero_row() {
        let docs = vec!["something here".to_string(), String::new()];
        let mut vectorizer = TfidfVectorizer::new(100);
        let matrix = vectorizer.fit_transform(&docs);
        let norm = matrix.row(1).dot(&matrix.row(1)).sqrt();
        assert_eq!(norm, 0.0);
    }
}
