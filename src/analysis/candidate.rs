//! Heading candidates: a fragment with its layout features and score.

use serde::Serialize;

use crate::model::{HeadingLevel, TextFragment};

/// A fragment under consideration for the outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub fragment: TextFragment,
    /// Left edge as a fraction of page width
    pub x_pos: f32,
    /// Top edge as a fraction of page height
    pub y_pos: f32,
    /// Horizontal center as a fraction of page width
    pub center_x: f32,
    pub word_count: usize,
    pub char_count: usize,
    /// Index of the nearest font size cluster
    pub cluster_index: usize,
    /// Score from layout, formatting and lexical signals
    pub base_score: f32,
    /// Advisory bonus from embedding similarity
    pub semantic_bonus: f32,
}

impl Candidate {
    /// Derive position and length features for a fragment.
    pub fn new(fragment: TextFragment, page_size: (f32, f32), cluster_index: usize) -> Self {
        let (width, height) = page_size;
        let bbox = fragment.bbox;
        Self {
            x_pos: bbox.x0 / width,
            y_pos: bbox.y0 / height,
            center_x: bbox.center_x() / width,
            word_count: fragment.word_count(),
            char_count: fragment.char_count(),
            cluster_index,
            base_score: 0.0,
            semantic_bonus: 0.0,
            fragment,
        }
    }

    /// Total score.
    pub fn score(&self) -> f32 {
        self.base_score + self.semantic_bonus
    }

    pub fn text(&self) -> &str {
        &self.fragment.text
    }

    pub fn page(&self) -> u32 {
        self.fragment.page
    }

    /// Outline level implied by the size cluster.
    pub fn level(&self) -> HeadingLevel {
        HeadingLevel::from_cluster_index(self.cluster_index)
    }
}
