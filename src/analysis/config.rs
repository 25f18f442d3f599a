//! Tunable thresholds and weights for outline inference.
//!
//! Every knob has a default matching the reference behaviour; a partial
//! JSON document can override any subset of them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration for outline inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Minimum base score for a candidate to become an outline entry
    pub heading_threshold: f32,

    /// Fragments longer than this (in characters) are never headings
    pub max_fragment_chars: usize,

    /// Cosine similarity above which two candidates count as related
    pub similarity_threshold: f32,

    /// Share of the smaller token set two entries must overlap by to be
    /// treated as near-duplicates
    pub overlap_ratio: f32,

    /// Title detection settings
    pub title: TitleConfig,

    /// Heading score weights
    pub weights: ScoringWeights,

    /// Font size clustering settings
    pub clusters: ClusterConfig,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            heading_threshold: 0.6,
            max_fragment_chars: 200,
            similarity_threshold: 0.7,
            overlap_ratio: 0.7,
            title: TitleConfig::default(),
            weights: ScoringWeights::default(),
            clusters: ClusterConfig::default(),
        }
    }
}

impl OutlineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading acceptance threshold.
    pub fn with_heading_threshold(mut self, threshold: f32) -> Self {
        self.heading_threshold = threshold;
        self
    }

    /// Set the maximum fragment length considered.
    pub fn with_max_fragment_chars(mut self, chars: usize) -> Self {
        self.max_fragment_chars = chars;
        self
    }

    /// Set the similarity threshold for the semantic signal.
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set title detection settings.
    pub fn with_title(mut self, title: TitleConfig) -> Self {
        self.title = title;
        self
    }

    /// Set heading score weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set clustering settings.
    pub fn with_clusters(mut self, clusters: ClusterConfig) -> Self {
        self.clusters = clusters;
        self
    }

    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: OutlineConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("heading_threshold", self.heading_threshold),
            ("similarity_threshold", self.similarity_threshold),
            ("overlap_ratio", self.overlap_ratio),
            ("title.min_score", self.title.min_score),
            ("clusters.significance_margin", self.clusters.significance_margin),
            ("clusters.merge_tolerance", self.clusters.merge_tolerance),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Config(format!("{} must be a finite number", name)));
        }
        if !(0.0..=1.0).contains(&self.overlap_ratio) {
            return Err(Error::Config("overlap_ratio must be within 0..=1".to_string()));
        }
        if !(1..=MAX_CLUSTERS).contains(&self.clusters.max_clusters) {
            return Err(Error::Config(format!(
                "clusters.max_clusters must be within 1..={}",
                MAX_CLUSTERS
            )));
        }
        if self.clusters.max_iterations == 0 {
            return Err(Error::Config(
                "clusters.max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Upper bound on the number of size clusters.
pub const MAX_CLUSTERS: usize = 4;

/// Bonuses used to pick the document title on page 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// A title must score strictly above this
    pub min_score: f32,
    /// Size more than 4pt above body
    pub large_size_bonus: f32,
    /// Size more than 2pt above body
    pub medium_size_bonus: f32,
    pub bold_bonus: f32,
    /// All uppercase or title case
    pub case_bonus: f32,
    /// Top 15% of the page
    pub top_bonus: f32,
    /// Top 30% of the page
    pub upper_bonus: f32,
    pub centered_bonus: f32,
    /// Starts in the left 20% of the page
    pub left_bonus: f32,
    /// 5 to 15 words
    pub ideal_length_bonus: f32,
    /// 3 to 20 words
    pub acceptable_length_bonus: f32,
    /// Fewer than 3 words
    pub short_penalty: f32,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            min_score: 0.7,
            large_size_bonus: 0.4,
            medium_size_bonus: 0.3,
            bold_bonus: 0.3,
            case_bonus: 0.2,
            top_bonus: 0.3,
            upper_bonus: 0.2,
            centered_bonus: 0.15,
            left_bonus: 0.1,
            ideal_length_bonus: 0.2,
            acceptable_length_bonus: 0.15,
            short_penalty: 0.1,
        }
    }
}

impl TitleConfig {
    /// Set the minimum title score.
    pub fn with_min_score(mut self, score: f32) -> Self {
        self.min_score = score;
        self
    }
}

/// Additive weights of the heading score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Scaled by cluster rank and closeness to the cluster center
    pub size: f32,
    pub bold: f32,
    /// All caps with at most 8 words
    pub all_caps: f32,
    pub title_case: f32,
    pub trailing_colon: f32,
    /// Decays linearly across the left 30% of the page
    pub left_position: f32,
    /// Decays linearly across the top 40% of the page
    pub top_position: f32,
    pub cue_word: f32,
    /// `1.` / `2.3` style prefixes
    pub numbered: f32,
    /// `A.` / `II.` style prefixes
    pub lettered: f32,
    /// 1 to 10 words
    pub short_words: f32,
    /// 3 to 50 characters
    pub moderate_length: f32,
    /// Subtracted above 100 characters
    pub long_penalty: f32,
    pub single_word: f32,
    /// Multiplies the mean related-candidate similarity
    pub semantic: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            size: 0.35,
            bold: 0.25,
            all_caps: 0.2,
            title_case: 0.15,
            trailing_colon: 0.1,
            left_position: 0.15,
            top_position: 0.15,
            cue_word: 0.2,
            numbered: 0.2,
            lettered: 0.15,
            short_words: 0.05,
            moderate_length: 0.1,
            long_penalty: 0.15,
            single_word: 0.1,
            semantic: 0.1,
        }
    }
}

/// Font size clustering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// At most this many heading bands
    pub max_clusters: usize,
    /// Sizes must exceed body size by more than this to count
    pub significance_margin: f32,
    /// Centers closer than this are merged
    pub merge_tolerance: f32,
    /// Lloyd iterations per k-means run
    pub max_iterations: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_clusters: MAX_CLUSTERS,
            significance_margin: 1.0,
            merge_tolerance: 0.5,
            max_iterations: 100,
        }
    }
}

impl ClusterConfig {
    /// Set the maximum number of clusters.
    pub fn with_max_clusters(mut self, max: usize) -> Self {
        self.max_clusters = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = OutlineConfig::default();
        assert_eq!(config.heading_threshold, 0.6);
        assert_eq!(config.max_fragment_chars, 200);
        assert_eq!(config.title.min_score, 0.7);
        assert_eq!(config.weights.size, 0.35);
        assert_eq!(config.clusters.max_clusters, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config =
            OutlineConfig::from_json(r#"{"heading_threshold": 0.8, "weights": {"bold": 0.5}}"#)
                .unwrap();
        assert_eq!(config.heading_threshold, 0.8);
        assert_eq!(config.weights.bold, 0.5);
        assert_eq!(config.weights.size, 0.35);
        assert_eq!(config.title, TitleConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            OutlineConfig::from_json(r#"{"clusters": {"max_clusters": 7}}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            OutlineConfig::from_json(r#"{"overlap_ratio": 1.5}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            OutlineConfig::from_json("{not json"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_builders() {
        let config = OutlineConfig::new()
            .with_heading_threshold(0.5)
            .with_title(TitleConfig::default().with_min_score(0.9))
            .with_clusters(ClusterConfig::default().with_max_clusters(3));
        assert_eq!(config.heading_threshold, 0.5);
        assert_eq!(config.title.min_score, 0.9);
        assert_eq!(config.clusters.max_clusters, 3);
    }
}
