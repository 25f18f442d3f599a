//! Outline inference over collected fragments.
//!
//! Stages run in order: font statistics and size clustering, title
//! detection, heading scoring, then deduplication and hierarchy repair.

mod candidate;
mod config;
mod dedup;
mod embedding;
mod scorer;
mod stats;
pub mod text;
mod title;

pub use candidate::Candidate;
pub use config::{ClusterConfig, OutlineConfig, ScoringWeights, TitleConfig, MAX_CLUSTERS};
pub use dedup::{deduplicate, repair_hierarchy};
pub use embedding::{
    cosine_similarity, related_similarity, Embedder, HashingEmbedder, DEFAULT_DIMENSIONS,
};
pub use scorer::{apply_semantic_bonus, HeadingScorer};
pub use stats::{FontSizeCluster, FontStatistics, DEFAULT_BODY_SIZE};
pub use title::{TitleDetector, TitleMatch};
