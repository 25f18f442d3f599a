//! Heading candidate scoring.

use crate::error::{Error, Result};
use crate::model::FragmentCollection;

use super::candidate::Candidate;
use super::config::OutlineConfig;
use super::embedding::{related_similarity, Embedder};
use super::stats::{FontSizeCluster, FontStatistics};
use super::text;

/// Left band (fraction of page width) over which the left bonus decays.
const LEFT_BAND: f32 = 0.3;
/// Top band (fraction of page height) over which the top bonus decays.
const TOP_BAND: f32 = 0.4;
/// All-caps text only counts as a heading cue up to this many words.
const ALL_CAPS_MAX_WORDS: usize = 8;

/// Scores fragments for heading likelihood.
pub struct HeadingScorer<'a> {
    config: &'a OutlineConfig,
    stats: &'a FontStatistics,
    clusters: &'a FontSizeCluster,
}

impl<'a> HeadingScorer<'a> {
    pub fn new(
        config: &'a OutlineConfig,
        stats: &'a FontStatistics,
        clusters: &'a FontSizeCluster,
    ) -> Self {
        Self {
            config,
            stats,
            clusters,
        }
    }

    /// Score every eligible fragment except `exclude` (the title).
    ///
    /// Returns candidates in fragment order, accepted or not.
    pub fn score_all(
        &self,
        collection: &FragmentCollection,
        exclude: Option<usize>,
    ) -> Vec<Candidate> {
        collection
            .fragments
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != exclude)
            .filter(|(_, f)| text::is_eligible(&f.text, self.config.max_fragment_chars))
            .map(|(_, fragment)| {
                let cluster_index = self.clusters.level_index(fragment.font_size);
                let page_size = collection.page_size(fragment.page);
                let mut candidate = Candidate::new(fragment.clone(), page_size, cluster_index);
                candidate.base_score = self.base_score(&candidate);
                candidate
            })
            .collect()
    }

    /// Scored candidates whose base score clears the heading threshold.
    pub fn accepted(
        &self,
        collection: &FragmentCollection,
        exclude: Option<usize>,
    ) -> Vec<Candidate> {
        let threshold = self.config.heading_threshold;
        let all = self.score_all(collection, exclude);
        let total = all.len();
        let accepted: Vec<Candidate> = all
            .into_iter()
            .filter(|c| c.base_score > threshold)
            .collect();
        log::debug!(
            "{} of {} eligible fragments scored above {:.2}",
            accepted.len(),
            total,
            threshold
        );
        accepted
    }

    /// Sum of the size, formatting, position, lexical and length signals.
    pub fn base_score(&self, candidate: &Candidate) -> f32 {
        self.size_signal(candidate)
            + self.format_signal(candidate)
            + self.position_signal(candidate)
            + self.lexical_signal(candidate)
            + self.length_signal(candidate)
    }

    fn size_signal(&self, candidate: &Candidate) -> f32 {
        let k = self.clusters.len();
        let Some(center) = self.clusters.center(candidate.cluster_index) else {
            return 0.0;
        };

        let rank = (k - candidate.cluster_index) as f32 / k as f32;
        let span = center - self.stats.body_size;
        if span <= 0.0 {
            return 0.0;
        }
        let closeness = (1.0 - (candidate.fragment.font_size - center).abs() / span).clamp(0.0, 1.0);

        self.config.weights.size * rank * closeness
    }

    fn format_signal(&self, candidate: &Candidate) -> f32 {
        let w = &self.config.weights;
        let text = candidate.text();
        let mut score = 0.0;

        if candidate.fragment.is_bold {
            score += w.bold;
        }
        if text::is_all_caps(text) && candidate.word_count <= ALL_CAPS_MAX_WORDS {
            score += w.all_caps;
        }
        if text::is_title_case(text) {
            score += w.title_case;
        }
        if text.ends_with(':') {
            score += w.trailing_colon;
        }
        score
    }

    fn position_signal(&self, candidate: &Candidate) -> f32 {
        let w = &self.config.weights;
        let mut score = 0.0;

        if (0.0..LEFT_BAND).contains(&candidate.x_pos) {
            score += w.left_position * (1.0 - candidate.x_pos / LEFT_BAND);
        }
        if (0.0..TOP_BAND).contains(&candidate.y_pos) {
            score += w.top_position * (1.0 - candidate.y_pos / TOP_BAND);
        }
        score
    }

    fn lexical_signal(&self, candidate: &Candidate) -> f32 {
        let w = &self.config.weights;
        let text = candidate.text();
        let mut score = 0.0;

        if text::has_cue_word(text) {
            score += w.cue_word;
        }
        if text::is_numbered(text) {
            score += w.numbered;
        } else if text::is_lettered(text) {
            score += w.lettered;
        }
        score
    }

    fn length_signal(&self, candidate: &Candidate) -> f32 {
        let w = &self.config.weights;
        let mut score = 0.0;

        if (1..=10).contains(&candidate.word_count) {
            score += w.short_words;
        }
        if (3..=50).contains(&candidate.char_count) {
            score += w.moderate_length;
        } else if candidate.char_count > 100 {
            score -= w.long_penalty;
        }
        if candidate.word_count == 1 && candidate.char_count >= 2 {
            score += w.single_word;
        }
        score
    }
}

/// Fill in the advisory semantic bonus of each candidate.
///
/// Fails without touching the candidates if the embedder errors or returns
/// the wrong number of vectors.
pub fn apply_semantic_bonus(
    candidates: &mut [Candidate],
    embedder: &dyn Embedder,
    config: &OutlineConfig,
) -> Result<()> {
    if candidates.len() < 2 {
        return Ok(());
    }

    let texts: Vec<&str> = candidates.iter().map(|c| c.text()).collect();
    let embeddings = embedder.embed(&texts).map_err(|e| match e {
        Error::ModelUnavailable(_) => e,
        other => Error::ModelUnavailable(other.to_string()),
    })?;

    if embeddings.len() != candidates.len() {
        return Err(Error::ModelUnavailable(format!(
            "expected {} embeddings, got {}",
            candidates.len(),
            embeddings.len()
        )));
    }

    let related = related_similarity(&embeddings, config.similarity_threshold);
    for (candidate, similarity) in candidates.iter_mut().zip(related) {
        candidate.semantic_bonus = similarity * config.weights.semantic;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::config::ClusterConfig;
    use crate::analysis::embedding::HashingEmbedder;
    use crate::model::{BBox, PageInfo, TextFragment};

    fn frag(text: &str, size: f32, font: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, size, font, 1, BBox::new(x, y, x + 100.0, y + size))
    }

    fn body_lines(n: usize) -> Vec<TextFragment> {
        (0..n)
            .map(|i| {
                frag(
                    "the committee reviewed every submitted proposal in detail during the spring session",
                    10.0,
                    "Times-Roman",
                    72.0,
                    400.0 + i as f32 * 12.0,
                )
            })
            .collect()
    }

    struct Fixture {
        config: OutlineConfig,
        stats: FontStatistics,
        clusters: FontSizeCluster,
        collection: FragmentCollection,
    }

    fn fixture(extra: Vec<TextFragment>) -> Fixture {
        let mut fragments = body_lines(6);
        fragments.extend(extra);
        let collection = FragmentCollection {
            pages: vec![PageInfo::letter(1)],
            fragments,
        };
        let config = OutlineConfig::default();
        let stats = FontStatistics::from_sizes(&collection.font_sizes(), 1.0);
        let clusters = FontSizeCluster::build(&stats, &ClusterConfig::default());
        Fixture {
            config,
            stats,
            clusters,
            collection,
        }
    }

    #[test]
    fn test_body_text_not_accepted() {
        let f = fixture(vec![]);
        let scorer = HeadingScorer::new(&f.config, &f.stats, &f.clusters);
        assert!(scorer.accepted(&f.collection, None).is_empty());
        assert_eq!(scorer.score_all(&f.collection, None).len(), 6);
    }

    #[test]
    fn test_bold_heading_signals() {
        let f = fixture(vec![frag("Introduction", 16.0, "Arial-Bold", 0.0, 0.0)]);
        let scorer = HeadingScorer::new(&f.config, &f.stats, &f.clusters);
        let accepted = scorer.accepted(&f.collection, None);

        assert_eq!(accepted.len(), 1);
        let c = &accepted[0];
        // size 0.35 + bold 0.25 + title case 0.15 + left 0.15 + top 0.15
        // + cue 0.2 + words 0.05 + chars 0.1 + single word 0.1
        assert!((c.base_score - 1.5).abs() < 1e-4, "{}", c.base_score);
        assert_eq!(c.semantic_bonus, 0.0);
    }

    #[test]
    fn test_exclude_and_ineligible() {
        let f = fixture(vec![
            frag("Overview", 16.0, "Arial-Bold", 72.0, 100.0),
            frag("Page 3", 16.0, "Arial-Bold", 72.0, 700.0),
        ]);
        let scorer = HeadingScorer::new(&f.config, &f.stats, &f.clusters);

        let all = scorer.score_all(&f.collection, Some(6));
        assert!(all.iter().all(|c| c.text() != "Overview"));
        assert!(all.iter().all(|c| c.text() != "Page 3"));
    }

    #[test]
    fn test_closeness_decays_toward_body() {
        let f = fixture(vec![
            frag("Results", 20.0, "Arial", 300.0, 500.0),
            frag("Results", 15.0, "Arial", 300.0, 500.0),
        ]);
        let scorer = HeadingScorer::new(&f.config, &f.stats, &f.clusters);
        let all = scorer.score_all(&f.collection, None);
        let full = all.iter().find(|c| c.fragment.font_size == 20.0).unwrap();
        let partial = all.iter().find(|c| c.fragment.font_size == 15.0).unwrap();

        assert!(full.base_score > partial.base_score);
    }

    #[test]
    fn test_lexical_prefixes() {
        let f = fixture(vec![
            frag("2.1 Scope of work", 10.0, "Times-Roman", 300.0, 600.0),
            frag("B. Scope of work", 10.0, "Times-Roman", 300.0, 600.0),
            frag("Scope of work", 10.0, "Times-Roman", 300.0, 600.0),
        ]);
        let scorer = HeadingScorer::new(&f.config, &f.stats, &f.clusters);
        let all = scorer.score_all(&f.collection, None);
        let score = |t: &str| all.iter().find(|c| c.text() == t).unwrap().base_score;

        assert!((score("2.1 Scope of work") - score("Scope of work") - 0.2).abs() < 1e-5);
        assert!((score("B. Scope of work") - score("Scope of work") - 0.15).abs() < 1e-5);
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Err(Error::ModelUnavailable("no model".to_string()))
        }
    }

    struct ShortEmbedder;

    impl Embedder for ShortEmbedder {
        fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0]])
        }
    }

    #[test]
    fn test_semantic_bonus() {
        let f = fixture(vec![
            frag("Project Results", 16.0, "Arial-Bold", 72.0, 100.0),
            frag("Project Results", 16.0, "Arial-Bold", 72.0, 300.0),
            frag("Appendix", 16.0, "Arial-Bold", 72.0, 500.0),
        ]);
        let scorer = HeadingScorer::new(&f.config, &f.stats, &f.clusters);
        let mut accepted = scorer.accepted(&f.collection, None);
        let before: Vec<f32> = accepted.iter().map(|c| c.base_score).collect();

        apply_semantic_bonus(&mut accepted, &HashingEmbedder::default(), &f.config).unwrap();

        assert!((accepted[0].semantic_bonus - 0.1).abs() < 1e-4);
        assert!((accepted[1].semantic_bonus - 0.1).abs() < 1e-4);
        assert_eq!(accepted[2].semantic_bonus, 0.0);
        let after: Vec<f32> = accepted.iter().map(|c| c.base_score).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_semantic_failures_leave_candidates() {
        let f = fixture(vec![
            frag("Scope", 16.0, "Arial-Bold", 72.0, 100.0),
            frag("Budget", 16.0, "Arial-Bold", 72.0, 300.0),
        ]);
        let scorer = HeadingScorer::new(&f.config, &f.stats, &f.clusters);
        let mut accepted = scorer.accepted(&f.collection, None);

        let err = apply_semantic_bonus(&mut accepted, &FailingEmbedder, &f.config).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
        let err = apply_semantic_bonus(&mut accepted, &ShortEmbedder, &f.config).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
        assert!(accepted.iter().all(|c| c.semantic_bonus == 0.0));
    }
}
