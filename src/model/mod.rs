//! Document model types.

mod fragment;
mod outline;

pub use fragment::{
    style_from_font_name, BBox, FragmentCollection, PageInfo, TextFragment, DEFAULT_PAGE_HEIGHT,
    DEFAULT_PAGE_WIDTH,
};
pub use outline::{HeadingLevel, OutlineEntry, OutlineResult, UNTITLED};
