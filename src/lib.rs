pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use engine::{AnalyticsEngine, EngineStatus};
pub use error::{EngineError, Result};
pub use models::{
    Recommendation, Strategy, TimeSeriesPoint, UserHistory, VideoRecord, WatchHistoryEntry,
};
