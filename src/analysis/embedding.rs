//! Optional embedding collaborator for the semantic heading signal.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::Result;

/// Turns texts into fixed-length vectors.
///
/// Implementations must return exactly one vector per input text. Any error
/// disables the semantic signal for the document being processed.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
}

/// Default dimensionality of [`HashingEmbedder`] vectors.
pub const DEFAULT_DIMENSIONS: usize = 256;

/// Deterministic feature-hashing embedder over words and word bigrams.
///
/// Features are hashed with the standard library's `DefaultHasher`, whose
/// output may change between Rust releases. Vectors are comparable within
/// one build only; do not persist them.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashingEmbedder {
    /// Create an embedder with the given dimensionality (at least 8).
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(8),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed one text.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];

        for feature in features(text) {
            let hash = feature_hash(&feature);
            let index = (hash as usize) % self.dimensions;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            let weight = 1.0 + (((hash >> 48) & 0xFF) as f32 / 255.0);
            vector[index] += sign * weight;
        }

        normalize(&mut vector);
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Cosine similarity; 0 for mismatched or empty vectors.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    let (mut dot, mut left_norm, mut right_norm) = (0f64, 0f64, 0f64);
    for (l, r) in left.iter().zip(right) {
        let (l, r) = (f64::from(*l), f64::from(*r));
        dot += l * r;
        left_norm += l * l;
        right_norm += r * r;
    }

    if left_norm <= 0.0 || right_norm <= 0.0 {
        return 0.0;
    }
    (dot / (left_norm.sqrt() * right_norm.sqrt())) as f32
}

/// For each vector, the mean similarity to the other vectors that exceed
/// `threshold`, or 0 when none do.
pub fn related_similarity(embeddings: &[Vec<f32>], threshold: f32) -> Vec<f32> {
    (0..embeddings.len())
        .map(|i| {
            let related: Vec<f32> = embeddings
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| cosine_similarity(&embeddings[i], other))
                .filter(|s| *s > threshold)
                .collect();
            if related.is_empty() {
                0.0
            } else {
                related.iter().sum::<f32>() / related.len() as f32
            }
        })
        .collect()
}

/// Build-local feature hash (`DefaultHasher` with fixed keys).
fn feature_hash(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// `w:<word>` and `b:<word>_<next>` features over lowercase alphanumeric words.
fn features(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect();

    let mut features = Vec::with_capacity(words.len() * 2);
    for (i, word) in words.iter().enumerate() {
        features.push(format!("w:{word}"));
        if let Some(next) = words.get(i + 1) {
            features.push(format!("b:{word}_{next}"));
        }
    }
    features
}

fn normalize(values: &mut [f32]) {
    let norm = values
        .iter()
        .map(|v| f64::from(*v) * f64::from(*v))
        .sum::<f64>()
        .sqrt() as f32;
    if norm > 0.0 {
        for v in values {
            *v /= norm;
        }
    }
}
