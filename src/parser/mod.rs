//! PDF reading: turns a document into positioned text fragments.

mod backend;
mod collector;
mod content;
mod options;

pub use backend::LopdfSource;
pub use collector::{DocumentSource, FragmentCollector, MemorySource, RawPage};
pub use content::decode_text_simple;
pub use options::{CollectOptions, ErrorMode, PageSelection};
