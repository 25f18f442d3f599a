//! Text fragment types produced by the collector.

use serde::{Deserialize, Serialize};

/// Default page width in points (US Letter).
pub const DEFAULT_PAGE_WIDTH: f32 = 612.0;

/// Default page height in points (US Letter).
pub const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Axis-aligned bounding box with a top-left origin (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box, reordering coordinates so that `x0 <= x1` and `y0 <= y1`.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

/// One contiguous run of text sharing font, size and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// The text content (trimmed, never empty once collected)
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// 1-indexed page number
    pub page: u32,
    /// Position on the page
    pub bbox: BBox,
}

impl TextFragment {
    /// Create a fragment, inferring bold/italic from the font name.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        font_name: impl Into<String>,
        page: u32,
        bbox: BBox,
    ) -> Self {
        let font_name = font_name.into();
        let (is_bold, is_italic) = style_from_font_name(&font_name);
        Self {
            text: text.into(),
            font_size,
            is_bold,
            is_italic,
            font_name,
            page,
            bbox,
        }
    }

    /// Force the bold flag.
    pub fn bold(mut self, is_bold: bool) -> Self {
        self.is_bold = is_bold;
        self
    }

    /// Force the italic flag.
    pub fn italic(mut self, is_italic: bool) -> Self {
        self.is_italic = is_italic;
        self
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Number of characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Infer (bold, italic) from a font name such as `ABCDEF+Arial-BoldItalicMT`.
pub fn style_from_font_name(font_name: &str) -> (bool, bool) {
    let lower = font_name.to_lowercase();
    let is_bold = lower.contains("bold")
        || lower.contains("black")
        || lower.contains("heavy")
        || lower.contains("semibold");
    let is_italic = lower.contains("italic") || lower.contains("oblique");
    (is_bold, is_italic)
}

/// Page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-indexed page number
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
}

impl PageInfo {
    /// Create page info.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
        }
    }

    /// Create a US Letter page.
    pub fn letter(number: u32) -> Self {
        Self::new(number, DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT)
    }
}

/// All fragments of one document in reading order, with page geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentCollection {
    /// Pages that were collected, ascending
    pub pages: Vec<PageInfo>,
    /// Fragments, page ascending then layout order
    pub fragments: Vec<TextFragment>,
}

impl FragmentCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether no fragment was collected.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Width and height for a page, falling back to US Letter.
    pub fn page_size(&self, page: u32) -> (f32, f32) {
        self.pages
            .iter()
            .find(|p| p.number == page)
            .filter(|p| p.width > 0.0 && p.height > 0.0)
            .map(|p| (p.width, p.height))
            .unwrap_or((DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT))
    }

    /// All font sizes, in fragment order.
    pub fn font_sizes(&self) -> Vec<f32> {
        self.fragments.iter().map(|f| f.font_size).collect()
    }

    /// Fragments on a given page.
    pub fn on_page(&self, page: u32) -> impl Iterator<Item = &TextFragment> {
        self.fragments.iter().filter(move |f| f.page == page)
    }
}
