//! Outline record types (the external output contract).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Title used when no fragment qualifies as the document title.
pub const UNTITLED: &str = "Untitled";

/// Heading level of an outline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Top-level heading
    H1,
    /// Second-level heading
    H2,
    /// Third-level heading
    H3,
}

impl HeadingLevel {
    /// Map a size-cluster index to a level: 0 → H1, 1 → H2, anything else → H3.
    pub fn from_cluster_index(index: usize) -> Self {
        match index {
            0 => HeadingLevel::H1,
            1 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Build a level from its number, clamping into 1..=3.
    pub fn from_number(n: u8) -> Self {
        match n {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Numeric level (1-3).
    pub fn number(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// The wire representation ("H1", "H2", "H3").
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }

    /// Parse a loosely formatted level string.
    ///
    /// Strings that do not start with `H` become H1; the first run of digits
    /// is clamped into 1..=3 (`"H7"` → H3, `"H0"` → H1).
    pub fn parse_lenient(s: &str) -> Self {
        let s = s.trim();
        if !s.starts_with('H') {
            return HeadingLevel::H1;
        }
        let digits: String = s
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        match digits.parse::<u64>() {
            Ok(n) if n > 3 => HeadingLevel::H3,
            Ok(n) => HeadingLevel::from_number(n as u8),
            Err(_) => HeadingLevel::H1,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One heading in the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text (non-empty)
    pub text: String,
    /// 1-indexed page number
    pub page: u32,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// The title and outline inferred for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlineResult {
    /// Document title ("Untitled" when none was found)
    pub title: String,
    /// Ordered heading entries
    pub outline: Vec<OutlineEntry>,
}

impl OutlineResult {
    /// Create a result.
    pub fn new(title: impl Into<String>, outline: Vec<OutlineEntry>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    /// The minimal safe result: `{"title": "Untitled", "outline": []}`.
    pub fn untitled() -> Self {
        Self::new(UNTITLED, Vec::new())
    }

    /// Check whether the hierarchy never skips a level going down.
    pub fn is_hierarchy_consistent(&self) -> bool {
        self.outline
            .windows(2)
            .all(|w| w[1].level.number() <= w[0].level.number() + 1)
    }

    /// Number of entries at a given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.outline.iter().filter(|e| e.level == level).count()
    }
}

impl Default for OutlineResult {
    fn default() -> Self {
        Self::untitled()
    }
}
