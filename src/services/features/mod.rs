// ============================================
// Feature Builder
// ============================================
//
// Turns raw video/watch-history records into numeric and textual feature
// sets consumed by the similarity, recommendation, prediction and
// clustering engines:
// 1. Segmented-text TF-IDF matrix (content similarity)
// 2. 14-d preference profile per user (user similarity)
// 3. 9-d behavioral summary per user (clustering)
// 4. Z-score scaler and label encoder shared by downstream consumers

pub mod behavior;
pub mod profile;
pub mod scaler;
pub mod text;

pub use behavior::{BehaviorFeatures, BEHAVIOR_DIMENSIONS};
pub use profile::ProfileBuilder;
pub use scaler::{LabelEncoder, StandardScaler, OTHER_CATEGORY};
pub use text::{segment, TfidfVectorizer};
