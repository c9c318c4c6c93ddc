// ============================================
// Sentiment Utility
// ============================================
//
// Stateless polarity scoring over free text. A primary lexicon scorer
// (CJK terms, matched by substring scan) produces a [0, 1] polarity; an
// English token scorer is consulted only when the primary finds no signal
// at all. Total failure degrades to a neutral result. This path never
// returns an error.

use crate::services::features::segment;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

const POSITIVE_THRESHOLD: f64 = 0.6;
const NEGATIVE_THRESHOLD: f64 = 0.4;

/// CJK sentiment terms, matched by substring occurrence.
const POSITIVE_TERMS: &[&str] = &[
    "好", "棒", "赞", "爱", "喜欢", "精彩", "优秀", "强", "美", "妙", "神", "绝",
    "厉害", "感动", "开心", "快乐", "满意", "推荐", "支持", "好看", "好听", "有趣",
    "哈哈", "笑死", "高能", "治愈", "用心", "良心",
];
const NEGATIVE_TERMS: &[&str] = &[
    "差", "烂", "坏", "垃圾", "讨厌", "无聊", "失望", "难看", "难听", "糟", "弱",
    "坑", "骗", "假", "尬", "恶心", "愤怒", "生气", "难受", "拉胯", "劝退", "避雷",
    "敷衍", "浪费", "标题党",
];

/// English sentiment tokens, matched on segmented words.
const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "awesome", "excellent", "amazing", "love", "like", "best",
    "nice", "cool", "fun", "wonderful", "perfect", "enjoy", "happy", "recommend",
    "brilliant", "fantastic",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "awful", "terrible", "worst", "hate", "boring", "disappointing",
    "poor", "broken", "slow", "ugly", "annoying", "waste", "sad", "angry",
    "wrong", "useless", "garbage",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }

    fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
    pub confidence: f64,
}

impl SentimentResult {
    fn from_score(score: f64) -> Self {
        Self {
            label: SentimentLabel::from_score(score),
            score,
            confidence: (score - 0.5).abs() * 2.0,
        }
    }
}

/// Aggregate view over a batch of scored texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub total_texts: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub average_score: f64,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub neutral_ratio: f64,
}

pub struct SentimentAnalyzer {
    positive_words: HashSet<&'static str>,
    negative_words: HashSet<&'static str>,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            positive_words: POSITIVE_WORDS.iter().copied().collect(),
            negative_words: NEGATIVE_WORDS.iter().copied().collect(),
        }
    }

    /// Score one text. Empty or whitespace-only input returns a neutral
    /// result with score 0.0; any other scoring failure degrades to
    /// neutral 0.5.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult {
                label: SentimentLabel::Neutral,
                score: 0.0,
                confidence: 0.0,
            };
        }

        if let Some(score) = self.lexicon_score(text) {
            return SentimentResult::from_score(score);
        }

        if let Some(score) = self.token_score(text) {
            debug!("Primary sentiment scorer found no signal, using token scorer");
            return SentimentResult::from_score(score);
        }

        // Terminal fallback: neutral with an uncommitted score.
        SentimentResult::from_score(0.5)
    }

    pub fn summarize(&self, texts: &[String]) -> SentimentSummary {
        let results: Vec<SentimentResult> = texts.iter().map(|t| self.analyze(t)).collect();

        let total = results.len();
        let positive = results
            .iter()
            .filter(|r| r.label == SentimentLabel::Positive)
            .count();
        let negative = results
            .iter()
            .filter(|r| r.label == SentimentLabel::Negative)
            .count();
        let neutral = total - positive - negative;
        let average_score = if total == 0 {
            0.0
        } else {
            results.iter().map(|r| r.score).sum::<f64>() / total as f64
        };

        let ratio = |count: usize| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            }
        };

        SentimentSummary {
            total_texts: total,
            positive_count: positive,
            negative_count: negative,
            neutral_count: neutral,
            average_score,
            positive_ratio: ratio(positive),
            negative_ratio: ratio(negative),
            neutral_ratio: ratio(neutral),
        }
    }

    /// Primary scorer: smoothed share of positive occurrences among all
    /// lexicon hits. None when the text contains no lexicon term.
    fn lexicon_score(&self, text: &str) -> Option<f64> {
        let positive: usize = POSITIVE_TERMS
            .iter()
            .map(|term| text.matches(term).count())
            .sum();
        let negative: usize = NEGATIVE_TERMS
            .iter()
            .map(|term| text.matches(term).count())
            .sum();

        if positive + negative == 0 {
            return None;
        }
        Some((positive as f64 + 0.5) / ((positive + negative) as f64 + 1.0))
    }

    /// Secondary scorer over segmented lowercase tokens.
    fn token_score(&self, text: &str) -> Option<f64> {
        let mut positive = 0usize;
        let mut negative = 0usize;
        for token in segment(text) {
            if self.positive_words.contains(token.as_str()) {
                positive += 1;
            } else if self.negative_words.contains(token.as_str()) {
                negative += 1;
            }
        }

        if positive + negative == 0 {
            return None;
        }
        Some((positive as f64 + 0.5) / ((positive + negative) as f64 + 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_neutral_zero() {
        let analyzer = SentimentAnalyzer::new();
        for text in ["", "   ", "\n\t"] {
            let result = analyzer.analyze(text);
            assert_eq!(result.label, SentimentLabel::Neutral);
            assert_eq!(result.score, 0.0);
            assert_eq!(result.confidence, 0.0);
        }
    }

    #[test]
    fn test_positive_chinese_text() {
        let analyzer = SentimentAnalyzer::new();
        let result = analyzer.analyze("这个视频太精彩了，非常喜欢，强烈推荐！");
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(result.score > POSITIVE_THRESHOLD);
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn test_negative_chinese_text() {
        let analyzer = SentimentAnalyzer::new();
        let result = analyzer.analyze("垃圾内容，无聊又失望，劝退");
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!(result.score < NEGATIVE_THRESHOLD);
    }

    #[test]
    fn test_english_fallback_only_without_primary_signal() {
        let analyzer = SentimentAnalyzer::new();
        let result = analyzer.analyze("this video is awesome and fun");
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_unscorable_text_is_neutral_half() {
        let analyzer = SentimentAnalyzer::new();
        let result = analyzer.analyze("12345 xyz qwerty");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.score, 0.5);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_confidence_formula() {
        let analyzer = SentimentAnalyzer::new();
        let result = analyzer.analyze("棒");
        assert!((result.confidence - (result.score - 0.5).abs() * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_ratios() {
        let analyzer = SentimentAnalyzer::new();
        let texts = vec![
            "非常精彩".to_string(),
            "太烂了".to_string(),
            "12345".to_string(),
            "好看又有趣".to_string(),
        ];
        let summary = analyzer.summarize(&texts);
        assert_eq!(summary.total_texts, 4);
        assert_eq!(summary.positive_count, 2);
        assert_eq!(summary.negative_count, 1);
        assert_eq!(summary.neutral_count, 1);
        let ratio_sum =
            summary.positive_ratio + summary.negative_ratio + summary.neutral_ratio;
        assert!((ratio_sum - 1.0).abs() < 1e-9);
    }
}
