//! Error types for pdfoutline library.

use std::io;
use thiserror::Error;

use crate::schema::ValidationError;

/// Result type alias for pdfoutline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while inferring a document outline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The document could not be turned into text fragments.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The assembled record violates the output contract.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The optional embedding collaborator could not be used.
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error during JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
