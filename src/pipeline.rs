//! End-to-end outline extraction.
//!
//! The [`OutlineExtractor`] wires collection, statistics, title detection,
//! scoring, deduplication and validation together. Extraction is total: a
//! document that cannot be read or produces an invalid record yields the
//! `{"title": "Untitled", "outline": []}` fallback plus a diagnostic.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Sender;
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::{
    apply_semantic_bonus, deduplicate, repair_hierarchy, text, Candidate, Embedder,
    FontSizeCluster, FontStatistics, HeadingScorer, OutlineConfig, TitleDetector,
};
use crate::detect;
use crate::error::{Error, Result};
use crate::model::{FragmentCollection, OutlineEntry, OutlineResult, UNTITLED};
use crate::parser::{CollectOptions, DocumentSource, FragmentCollector, LopdfSource};
use crate::schema;

/// Category of a recovered failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The document could not be read; the fallback record was produced
    Extraction,
    /// The assembled record violated the output contract; replaced by the fallback
    Validation,
    /// The embedder failed; the semantic signal was skipped
    ModelUnavailable,
}

/// A failure that was recovered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of one extraction, with the intermediate analysis.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineReport {
    pub result: OutlineResult,
    pub diagnostics: Vec<Diagnostic>,
    /// Score of the chosen title, if any
    pub title_score: Option<f32>,
    pub body_size: f32,
    pub clusters: FontSizeCluster,
    /// Accepted candidates in outline order
    pub candidates: Vec<Candidate>,
}

impl OutlineReport {
    /// Untitled, empty report carrying one diagnostic.
    pub fn fallback(diagnostic: Diagnostic) -> Self {
        Self {
            result: OutlineResult::untitled(),
            diagnostics: vec![diagnostic],
            title_score: None,
            body_size: crate::analysis::DEFAULT_BODY_SIZE,
            clusters: FontSizeCluster::default(),
            candidates: Vec::new(),
        }
    }

    /// Whether the run recovered from any failure.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Whether the document could not be read at all.
    pub fn is_extraction_failure(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Extraction)
    }
}

/// One document of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub path: PathBuf,
    pub report: OutlineReport,
}

/// Infers a title and heading outline from documents.
#[derive(Clone, Default)]
pub struct OutlineExtractor {
    config: OutlineConfig,
    collect: CollectOptions,
    embedder: Option<Arc<dyn Embedder>>,
}

impl std::fmt::Debug for OutlineExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineExtractor")
            .field("config", &self.config)
            .field("collect", &self.collect)
            .field("embedder", &self.embedder.is_some())
            .finish()
    }
}

impl OutlineExtractor {
    /// Create an extractor with default configuration and no embedder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set scoring configuration.
    pub fn with_config(mut self, config: OutlineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set collection options.
    pub fn with_collect_options(mut self, options: CollectOptions) -> Self {
        self.collect = options;
        self
    }

    /// Enable the semantic signal.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    pub fn collect_options(&self) -> &CollectOptions {
        &self.collect
    }

    /// Collect fragments from a source.
    pub fn collect<S: DocumentSource + ?Sized>(&self, source: &S) -> Result<FragmentCollection> {
        FragmentCollector::new(self.collect.clone()).collect(source)
    }

    /// Collect fragments from a PDF file.
    pub fn collect_file<P: AsRef<Path>>(&self, path: P) -> Result<FragmentCollection> {
        let source = LopdfSource::open(path)?;
        self.collect(&source)
    }

    /// Collect fragments from PDF bytes.
    pub fn collect_bytes(&self, data: &[u8]) -> Result<FragmentCollection> {
        let source = LopdfSource::from_bytes(data)?;
        self.collect(&source)
    }

    /// Extract from any source.
    pub fn extract<S: DocumentSource + ?Sized>(&self, source: &S) -> OutlineReport {
        self.analyze_collected(self.collect(source))
    }

    /// Extract from a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> OutlineReport {
        let path = path.as_ref();
        log::debug!("Extracting outline from {}", path.display());
        self.analyze_collected(self.collect_file(path))
    }

    /// Extract from PDF bytes.
    pub fn extract_bytes(&self, data: &[u8]) -> OutlineReport {
        self.analyze_collected(self.collect_bytes(data))
    }

    fn analyze_collected(&self, collected: Result<FragmentCollection>) -> OutlineReport {
        match collected {
            Ok(collection) => self.analyze(&collection),
            Err(e) => {
                log::warn!("Extraction failed: {}", e);
                OutlineReport::fallback(Diagnostic::new(DiagnosticKind::Extraction, e.to_string()))
            }
        }
    }

    /// Run inference over already collected fragments.
    pub fn analyze(&self, collection: &FragmentCollection) -> OutlineReport {
        let config = &self.config;
        let mut diagnostics = Vec::new();

        let stats =
            FontStatistics::from_sizes(&collection.font_sizes(), config.clusters.significance_margin);
        let clusters = FontSizeCluster::build(&stats, &config.clusters);
        log::debug!(
            "Body size {:.1}pt, clusters {:?}",
            stats.body_size,
            clusters.centers()
        );

        let title = TitleDetector::new(&config.title, stats.body_size, config.max_fragment_chars)
            .detect(collection);

        let scorer = HeadingScorer::new(config, &stats, &clusters);
        let mut candidates = scorer.accepted(collection, title.as_ref().map(|t| t.index));

        if let Some(embedder) = &self.embedder {
            if let Err(e) = apply_semantic_bonus(&mut candidates, embedder.as_ref(), config) {
                log::warn!("Semantic signal disabled: {}", e);
                diagnostics.push(Diagnostic::new(DiagnosticKind::ModelUnavailable, e.to_string()));
            }
        }

        let candidates = deduplicate(
            candidates,
            title.as_ref().map(|t| t.text.as_str()),
            config.overlap_ratio,
        );

        let (result, candidates) = assemble(title.as_ref().map(|t| t.text.as_str()), candidates);

        let (result, candidates) = match schema::validate_result(&result) {
            Ok(()) => (result, candidates),
            Err(e) => {
                log::warn!("Outline failed validation: {}", e);
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Validation,
                    Error::Validation(e).to_string(),
                ));
                (OutlineResult::untitled(), Vec::new())
            }
        };

        log::debug!(
            "Outline '{}' with {} entries",
            result.title,
            result.outline.len()
        );

        OutlineReport {
            result,
            diagnostics,
            title_score: title.map(|t| t.score),
            body_size: stats.body_size,
            clusters,
            candidates,
        }
    }

    /// Extract many files in parallel, preserving input order.
    pub fn process_batch<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Vec<BatchItem> {
        paths
            .par_iter()
            .map(|path| BatchItem {
                path: path.as_ref().to_path_buf(),
                report: self.extract_file(path),
            })
            .collect()
    }

    /// Extract many files in parallel, sending each result as it completes.
    ///
    /// Returns once every document was processed. Items are dropped if the
    /// receiver has gone away.
    pub fn process_batch_streaming<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
        sender: &Sender<BatchItem>,
    ) {
        paths.par_iter().for_each(|path| {
            let item = BatchItem {
                path: path.as_ref().to_path_buf(),
                report: self.extract_file(path),
            };
            if sender.send(item).is_err() {
                log::debug!("Batch receiver closed; dropping {}", path.as_ref().display());
            }
        });
    }
}

/// Clean texts and build the output record; entries with empty text are dropped.
fn assemble(title: Option<&str>, candidates: Vec<Candidate>) -> (OutlineResult, Vec<Candidate>) {
    let title = title
        .map(text::clean_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let mut kept = Vec::with_capacity(candidates.len());
    let mut outline = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let cleaned = text::clean_text(candidate.text());
        if cleaned.is_empty() {
            continue;
        }
        outline.push(OutlineEntry::new(candidate.level(), cleaned, candidate.page()));
        kept.push(candidate);
    }
    repair_hierarchy(&mut outline);

    (OutlineResult::new(title, outline), kept)
}

/// PDF files directly inside a directory, sorted by path.
pub fn pdf_files_in<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && detect::has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HashingEmbedder;
    use crate::model::{BBox, HeadingLevel, PageInfo, TextFragment};
    use crate::parser::RawPage;

    fn body(page: u32, y: f32) -> TextFragment {
        TextFragment::new(
            "the results of the survey were compiled by the regional office and shared with all participating members",
            10.0,
            "Times-Roman",
            page,
            BBox::new(72.0, y, 540.0, y + 10.0),
        )
    }

    fn heading(text: &str, size: f32, page: u32, y: f32) -> TextFragment {
        TextFragment::new(text, size, "Helvetica-Bold", page, BBox::new(72.0, y, 300.0, y + size))
    }

    fn document() -> FragmentCollection {
        let mut fragments = vec![
            TextFragment::new(
                "Regional Survey Report",
                18.0,
                "Helvetica-Bold",
                1,
                BBox::new(200.0, 40.0, 412.0, 58.0),
            ),
            heading("1. Introduction", 18.0, 1, 100.0),
            heading("1.1 Scope", 14.0, 1, 300.0),
        ];
        fragments.extend((0..5).map(|i| body(1, 400.0 + i as f32 * 14.0)));
        fragments.push(heading("2. Methods", 18.0, 2, 100.0));
        fragments.extend((0..5).map(|i| body(2, 400.0 + i as f32 * 14.0)));
        FragmentCollection {
            pages: vec![PageInfo::letter(1), PageInfo::letter(2)],
            fragments,
        }
    }

    #[test]
    fn test_empty_collection_fallback() {
        let report = OutlineExtractor::new().analyze(&FragmentCollection::new());
        assert_eq!(report.result, OutlineResult::untitled());
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.title_score, None);
    }

    #[test]
    fn test_analyze_levels() {
        let report = OutlineExtractor::new().analyze(&document());
        let outline = &report.result.outline;

        let summary: Vec<_> = outline
            .iter()
            .map(|e| (e.level, e.text.as_str(), e.page))
            .collect();
        assert_eq!(
            summary,
            vec![
                (HeadingLevel::H1, "1. Introduction", 1),
                (HeadingLevel::H2, "1.1 Scope", 1),
                (HeadingLevel::H1, "2. Methods", 2),
            ]
        );
        assert_eq!(report.result.title, "Regional Survey Report");
        assert!(report.title_score.unwrap() > 0.7);
        assert!(report.result.is_hierarchy_consistent());
        assert_eq!(report.candidates.len(), 3);
        assert_eq!(report.body_size, 10.0);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let extractor = OutlineExtractor::new();
        let doc = document();
        assert_eq!(extractor.analyze(&doc).result, extractor.analyze(&doc).result);
    }

    #[test]
    fn test_embedder_does_not_change_structure() {
        let doc = document();
        let plain = OutlineExtractor::new().analyze(&doc);
        let semantic = OutlineExtractor::new()
            .with_embedder(Arc::new(HashingEmbedder::default()))
            .analyze(&doc);
        assert_eq!(plain.result, semantic.result);
        assert!(semantic.diagnostics.is_empty());
    }

    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Err(Error::ModelUnavailable("weights missing".to_string()))
        }
    }

    #[test]
    fn test_broken_embedder_recorded() {
        let report = OutlineExtractor::new()
            .with_embedder(Arc::new(BrokenEmbedder))
            .analyze(&document());
        assert_eq!(report.result.outline.len(), 3);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::ModelUnavailable);
    }

    /// Serves the fixture document as page 0, which the output contract forbids.
    struct ZeroNumberedSource;

    impl DocumentSource for ZeroNumberedSource {
        fn page_numbers(&self) -> Vec<u32> {
            vec![0]
        }

        fn page(&self, _number: u32) -> Result<RawPage> {
            Ok(RawPage {
                width: 612.0,
                height: 792.0,
                fragments: document().fragments,
            })
        }
    }

    #[test]
    fn test_invalid_record_replaced_by_fallback() {
        let report = OutlineExtractor::new().extract(&ZeroNumberedSource);

        assert_eq!(report.result, OutlineResult::untitled());
        assert!(report.candidates.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Validation);
        assert!(report.diagnostics[0].message.contains(".page"));
        assert!(!report.is_extraction_failure());
    }

    #[test]
    fn test_unreadable_bytes_fallback() {
        let report = OutlineExtractor::new().extract_bytes(b"definitely not a pdf");
        assert_eq!(report.result, OutlineResult::untitled());
        assert!(report.is_extraction_failure());
    }

    #[test]
    fn test_assemble_cleans_text() {
        let frag = TextFragment::new("Scope\u{0007}  of work", 14.0, "Arial", 1, BBox::default());
        let candidate = Candidate::new(frag, (612.0, 792.0), 2);
        let (result, kept) = assemble(Some("  \u{0000} "), vec![candidate]);

        assert_eq!(result.title, UNTITLED);
        assert_eq!(result.outline[0].text, "Scope of work");
        assert_eq!(result.outline[0].level, HeadingLevel::H3);
        assert_eq!(kept.len(), 1);
    }
}
