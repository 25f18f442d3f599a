//! Collection options and configuration.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Options for collecting text fragments from a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Page selection (which pages to collect)
    pub pages: PageSelection,
}

impl CollectOptions {
    /// Create new collect options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip undecodable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

/// Error handling mode during collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Fail the document on any page error
    #[default]
    Strict,
    /// Skip pages that cannot be decoded and continue
    Lenient,
}

/// Page selection for collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSelection {
    /// Collect all pages
    #[default]
    All,
    /// Collect a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Collect specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                if start > end {
                    return Err(format!("Invalid page range: {}", s));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                pages.extend(start..=end);
            } else {
                pages.push(parse_page_number(part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page_number(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err("Page numbers start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid page number: '{}'", s.trim())),
    }
}
