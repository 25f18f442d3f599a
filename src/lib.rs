//! # pdfoutline
//!
//! Title and heading outline inference for PDF documents.
//!
//! The library reads positioned text from a PDF, works out the body font
//! size and the heading size bands, picks a title on the first page and
//! scores every other fragment for heading likelihood. The result is a
//! small JSON-ready record:
//!
//! ```text
//! { "title": "...", "outline": [ { "level": "H1", "text": "...", "page": 1 } ] }
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_outline, render, JsonFormat};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = extract_outline("document.pdf");
//!     println!("{}", render::to_json(&outline, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Never fails**: unreadable documents yield `{"title": "Untitled", "outline": []}`
//! - **Configurable**: every threshold and weight lives in [`OutlineConfig`]
//! - **Optional semantic signal**: plug in any [`Embedder`]
//! - **Parallel batches**: uses Rayon across documents

pub mod analysis;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod schema;

// Re-export commonly used types
pub use analysis::{
    Candidate, ClusterConfig, Embedder, FontSizeCluster, FontStatistics, HashingEmbedder,
    OutlineConfig, ScoringWeights, TitleConfig,
};
pub use detect::{is_pdf_bytes, pdf_version};
pub use error::{Error, Result};
pub use model::{
    BBox, FragmentCollection, HeadingLevel, OutlineEntry, OutlineResult, PageInfo, TextFragment,
};
pub use parser::{
    CollectOptions, DocumentSource, ErrorMode, LopdfSource, MemorySource, PageSelection,
};
pub use pipeline::{BatchItem, Diagnostic, DiagnosticKind, OutlineExtractor, OutlineReport};
pub use render::JsonFormat;
pub use schema::{validate_json, validate_result, ValidationError};

use std::path::Path;

/// Infer the outline of a PDF file with default settings.
///
/// Never fails: unreadable documents produce the untitled, empty outline.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_outline;
///
/// let outline = extract_outline("document.pdf");
/// println!("{} ({} headings)", outline.title, outline.outline.len());
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> OutlineResult {
    OutlineExtractor::new().extract_file(path).result
}

/// Infer the outline of a PDF file with a custom configuration.
pub fn extract_outline_with_config<P: AsRef<Path>>(path: P, config: OutlineConfig) -> OutlineResult {
    OutlineExtractor::new()
        .with_config(config)
        .extract_file(path)
        .result
}

/// Infer the outline of PDF bytes with default settings.
pub fn extract_outline_bytes(data: &[u8]) -> OutlineResult {
    OutlineExtractor::new().extract_bytes(data).result
}

/// Collect the text fragments of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::collect_fragments;
///
/// let fragments = collect_fragments("document.pdf")?;
/// for f in &fragments.fragments {
///     println!("p{} {:>5.1}pt {}", f.page, f.font_size, f.text);
/// }
/// # Ok::<(), pdfoutline::Error>(())
/// ```
pub fn collect_fragments<P: AsRef<Path>>(path: P) -> Result<FragmentCollection> {
    OutlineExtractor::new().collect_file(path)
}

/// Infer the outline of a PDF file and render it as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    render::to_json(&extract_outline(path), format)
}
