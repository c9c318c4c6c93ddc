use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Video metadata as delivered by the ingestion pipeline.
///
/// Records are read-only to the engine; optional fields reflect what the
/// upstream platform actually returns rather than what we wish it returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform identifier, unique and immutable.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub category: Option<String>,
    /// Engagement counters at crawl time.
    #[serde(default)]
    pub view: u64,
    #[serde(default)]
    pub like: u64,
    #[serde(default)]
    pub coin: u64,
    #[serde(default)]
    pub share: u64,
    #[serde(default)]
    pub danmaku: u64,
    #[serde(default)]
    pub favorite: u64,
    #[serde(default)]
    pub reply: u64,
    pub duration_secs: Option<u32>,
    pub published_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl VideoRecord {
    /// Title and description joined for text feature extraction.
    /// Missing description degrades to the title alone.
    pub fn content_text(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} {}", self.title, desc),
            None => self.title.clone(),
        }
    }
}

/// One viewed video in a user's watch history.
///
/// Counters and category are snapshots taken at viewing time. Entries are
/// not guaranteed to arrive in timestamp order; all aggregation over them is
/// order-independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchHistoryEntry {
    pub video_id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<u32>,
    #[serde(default)]
    pub view: u64,
    #[serde(default)]
    pub like: u64,
    #[serde(default)]
    pub coin: u64,
    #[serde(default)]
    pub share: u64,
}

/// Per-user watch history table handed in by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserHistory {
    pub user_id: String,
    pub entries: Vec<WatchHistoryEntry>,
}

/// Recommendation strategy tag. Scores carry different semantics per
/// strategy and are not comparable across tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    Popularity,
    ContentBased,
    ItemCollaborative,
    UserCollaborative,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Popularity => "popularity",
            Strategy::ContentBased => "content_based",
            Strategy::ItemCollaborative => "item_collaborative",
            Strategy::UserCollaborative => "user_collaborative",
        }
    }
}

/// One ranked recommendation row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub video_id: String,
    pub title: String,
    pub score: f64,
    pub strategy: Strategy,
}

/// One observation of a labelled time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_text_tolerates_missing_description() {
        let video = VideoRecord {
            id: "v1".to_string(),
            title: "hello".to_string(),
            author: String::new(),
            category: None,
            view: 0,
            like: 0,
            coin: 0,
            share: 0,
            danmaku: 0,
            favorite: 0,
            reply: 0,
            duration_secs: None,
            published_at: None,
            description: None,
            tags: Vec::new(),
        };
        assert_eq!(video.content_text(), "hello");
    }

    #[test]
    fn test_strategy_tags() {
        assert_eq!(Strategy::Popularity.as_str(), "popularity");
        assert_eq!(Strategy::UserCollaborative.as_str(), "user_collaborative");
    }
}
