pub mod clustering;
pub mod features;
pub mod prediction;
pub mod recommendation;
pub mod sentiment;
pub mod similarity;
pub mod trend;

pub use clustering::UserClustering;
pub use prediction::ViewPredictor;
pub use recommendation::Recommender;
pub use sentiment::SentimentAnalyzer;
