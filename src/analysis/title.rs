//! Title detection on the first page.

use crate::model::{FragmentCollection, TextFragment};

use super::config::TitleConfig;
use super::text;

/// Vertical zone (fraction of page height) for the top bonus.
const TOP_ZONE: f32 = 0.15;
/// Vertical zone for the smaller upper-page bonus.
const UPPER_ZONE: f32 = 0.30;
/// Left zone (fraction of page width) for the left-aligned bonus.
const LEFT_ZONE: f32 = 0.2;
/// Left/right margins may differ by this fraction of page width when centered.
const CENTER_TOLERANCE: f32 = 0.1;
/// Centered text must start at least this far from the left edge.
const CENTER_MIN_X: f32 = 0.1;

/// The fragment chosen as document title.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMatch {
    /// Index into `FragmentCollection::fragments`
    pub index: usize,
    pub text: String,
    pub score: f32,
}

/// Scores page-1 fragments and picks at most one title.
pub struct TitleDetector<'a> {
    config: &'a TitleConfig,
    body_size: f32,
    max_chars: usize,
}

impl<'a> TitleDetector<'a> {
    pub fn new(config: &'a TitleConfig, body_size: f32, max_chars: usize) -> Self {
        Self {
            config,
            body_size,
            max_chars,
        }
    }

    /// Pick the best-scoring eligible fragment on page 1 if it clears the
    /// minimum score. The first fragment wins ties.
    pub fn detect(&self, collection: &FragmentCollection) -> Option<TitleMatch> {
        let page_size = collection.page_size(1);

        let mut best: Option<TitleMatch> = None;
        for (index, fragment) in collection.fragments.iter().enumerate() {
            if fragment.page != 1 || !text::is_eligible(&fragment.text, self.max_chars) {
                continue;
            }
            let score = self.score(fragment, page_size);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(TitleMatch {
                    index,
                    text: fragment.text.clone(),
                    score,
                });
            }
        }

        match best {
            Some(title) if title.score > self.config.min_score => {
                log::debug!("Title '{}' (score {:.2})", title.text, title.score);
                Some(title)
            }
            Some(title) => {
                log::debug!(
                    "Best title candidate '{}' scored {:.2}, below {:.2}",
                    title.text,
                    title.score,
                    self.config.min_score
                );
                None
            }
            None => None,
        }
    }

    /// Title score of one fragment.
    pub fn score(&self, fragment: &TextFragment, page_size: (f32, f32)) -> f32 {
        let c = self.config;
        let (page_width, page_height) = page_size;
        let x_pos = fragment.bbox.x0 / page_width;
        let y_pos = fragment.bbox.y0 / page_height;
        let words = fragment.word_count();

        let mut score = 0.0;

        if fragment.font_size > self.body_size + 4.0 {
            score += c.large_size_bonus;
        } else if fragment.font_size > self.body_size + 2.0 {
            score += c.medium_size_bonus;
        }

        if fragment.is_bold {
            score += c.bold_bonus;
        }

        if text::is_all_caps(&fragment.text) || text::is_title_case(&fragment.text) {
            score += c.case_bonus;
        }

        if y_pos < TOP_ZONE {
            score += c.top_bonus;
        } else if y_pos < UPPER_ZONE {
            score += c.upper_bonus;
        }

        let left_margin = fragment.bbox.x0;
        let right_margin = page_width - fragment.bbox.x1;
        let centered = (left_margin - right_margin).abs() < CENTER_TOLERANCE * page_width
            && x_pos >= CENTER_MIN_X;
        if centered {
            score += c.centered_bonus;
        } else if x_pos < LEFT_ZONE {
            score += c.left_bonus;
        }

        if (5..=15).contains(&words) {
            score += c.ideal_length_bonus;
        } else if (3..=20).contains(&words) {
            score += c.acceptable_length_bonus;
        } else if words < 3 {
            score -= c.short_penalty;
        }

        score
    }
}
