//! PDF header sniffing.
//!
//! Readers tolerate a little garbage before the `%PDF-` marker, so the
//! header is searched for within the first kilobyte.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"
const HEADER_WINDOW: usize = 1024;

/// Return the PDF version declared in the header (e.g. `"1.7"`).
///
/// # Errors
/// * `Error::UnknownFormat` if no `%PDF-` marker is found in the first kilobyte
/// * `Error::UnsupportedVersion` if the version is not of the form `d.d`
pub fn pdf_version(data: &[u8]) -> Result<String> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version_bytes = data
        .get(start + PDF_MAGIC.len()..start + PDF_MAGIC.len() + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(version_bytes) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

/// Read the header of a file and return its PDF version.
pub fn pdf_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = Vec::with_capacity(HEADER_WINDOW);
    File::open(path)?
        .take(HEADER_WINDOW as u64)
        .read_to_end(&mut header)?;
    pdf_version(&header)
}

/// Check if bytes start (within the header window) with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version(data).is_ok()
}

/// Check whether a path carries a `.pdf` extension (any case).
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn is_valid_version(bytes: &[u8]) -> bool {
    matches!(bytes, [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit())
}
