use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine-level error taxonomy.
///
/// Data-quality problems on individual records are tolerated by silent
/// exclusion; these variants cover structural failures that must be surfaced
/// to the caller instead of crashing or being swallowed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Model not trained: {0}")]
    ModelNotTrained(String),

    #[error("Feature extraction failed: {0}")]
    FeatureExtraction(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
