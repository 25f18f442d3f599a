//! Fragment collection.
//!
//! A [`DocumentSource`] yields raw positioned text per page; the
//! [`FragmentCollector`] walks the selected pages in ascending order,
//! stamps page numbers, trims text and applies the error policy.

use crate::error::{Error, Result};
use crate::model::{FragmentCollection, PageInfo, TextFragment};

use super::options::{CollectOptions, ErrorMode};

/// Positioned text of a single page, as read from a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Fragments in layout order (page numbers are filled in by the collector)
    pub fragments: Vec<TextFragment>,
}

/// Anything that can provide per-page positioned text.
pub trait DocumentSource {
    /// 1-indexed page numbers available in the document.
    fn page_numbers(&self) -> Vec<u32>;

    /// Read one page.
    fn page(&self, number: u32) -> Result<RawPage>;
}

/// In-memory source, used for tests and pre-extracted layouts.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<(u32, RawPage)>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page; it gets the next page number.
    pub fn with_page(mut self, width: f32, height: f32, fragments: Vec<TextFragment>) -> Self {
        let number = self.pages.len() as u32 + 1;
        self.pages.push((
            number,
            RawPage {
                width,
                height,
                fragments,
            },
        ));
        self
    }

    /// Append a US Letter page.
    pub fn with_letter_page(self, fragments: Vec<TextFragment>) -> Self {
        self.with_page(
            crate::model::DEFAULT_PAGE_WIDTH,
            crate::model::DEFAULT_PAGE_HEIGHT,
            fragments,
        )
    }
}

impl DocumentSource for MemorySource {
    fn page_numbers(&self) -> Vec<u32> {
        self.pages.iter().map(|(n, _)| *n).collect()
    }

    fn page(&self, number: u32) -> Result<RawPage> {
        self.pages
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, page)| page.clone())
            .ok_or(Error::PageOutOfRange(number, self.pages.len() as u32))
    }
}

/// Turns a [`DocumentSource`] into a [`FragmentCollection`].
#[derive(Debug, Clone, Default)]
pub struct FragmentCollector {
    options: CollectOptions,
}

impl FragmentCollector {
    /// Create a collector.
    pub fn new(options: CollectOptions) -> Self {
        Self { options }
    }

    /// Collector options.
    pub fn options(&self) -> &CollectOptions {
        &self.options
    }

    /// Collect every selected page.
    ///
    /// In strict mode the first failing page aborts the whole document with
    /// [`Error::Extraction`]; in lenient mode it is logged and skipped.
    pub fn collect<S: DocumentSource + ?Sized>(&self, source: &S) -> Result<FragmentCollection> {
        let mut numbers = source.page_numbers();
        numbers.sort_unstable();
        numbers.dedup();

        let mut collection = FragmentCollection::new();

        for number in numbers {
            if !self.options.pages.includes(number) {
                continue;
            }

            let raw = match source.page(number) {
                Ok(raw) => raw,
                Err(e) => match self.options.error_mode {
                    ErrorMode::Strict => {
                        return Err(match e {
                            Error::Extraction(_) => e,
                            other => Error::Extraction(format!("page {}: {}", number, other)),
                        });
                    }
                    ErrorMode::Lenient => {
                        log::warn!("Skipping page {}: {}", number, e);
                        continue;
                    }
                },
            };

            collection
                .pages
                .push(PageInfo::new(number, raw.width, raw.height));

            for mut fragment in raw.fragments {
                let text = fragment.text.trim();
                if text.is_empty() {
                    continue;
                }
                if !fragment.font_size.is_finite() {
                    log::debug!("Dropping fragment with invalid font size on page {}", number);
                    continue;
                }
                fragment.text = text.to_string();
                fragment.font_size = fragment.font_size.abs();
                fragment.page = number;
                collection.fragments.push(fragment);
            }
        }

        log::debug!(
            "Collected {} fragments from {} pages",
            collection.fragments.len(),
            collection.pages.len()
        );

        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;
    use crate::parser::options::PageSelection;

    fn frag(text: &str) -> TextFragment {
        TextFragment::new(text, 12.0, "Helvetica", 0, BBox::new(72.0, 100.0, 200.0, 112.0))
    }

    /// Source whose second page cannot be read.
    struct BrokenSource;

    impl DocumentSource for BrokenSource {
        fn page_numbers(&self) -> Vec<u32> {
            vec![1, 2, 3]
        }

        fn page(&self, number: u32) -> Result<RawPage> {
            if number == 2 {
                return Err(Error::PdfParse("bad content stream".to_string()));
            }
            Ok(RawPage {
                width: 612.0,
                height: 792.0,
                fragments: vec![frag(&format!("Page {} text", number))],
            })
        }
    }

    #[test]
    fn test_collect_stamps_pages_and_trims() {
        let source = MemorySource::new()
            .with_letter_page(vec![frag("  Intro  "), frag("   ")])
            .with_page(595.0, 842.0, vec![frag("Body")]);

        let collection = FragmentCollector::default().collect(&source).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.fragments[0].text, "Intro");
        assert_eq!(collection.fragments[0].page, 1);
        assert_eq!(collection.fragments[1].page, 2);
        assert_eq!(collection.page_size(2), (595.0, 842.0));
    }

    #[test]
    fn test_collect_page_selection() {
        let source = MemorySource::new()
            .with_letter_page(vec![frag("One")])
            .with_letter_page(vec![frag("Two")])
            .with_letter_page(vec![frag("Three")]);

        let options = CollectOptions::new().with_pages(PageSelection::Pages(vec![2, 3]));
        let collection = FragmentCollector::new(options).collect(&source).unwrap();

        let texts: Vec<_> = collection.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Two", "Three"]);
    }

    #[test]
    fn test_strict_mode_fails_document() {
        let err = FragmentCollector::default()
            .collect(&BrokenSource)
            .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
        assert!(err.to_string().contains("page 2"));
    }

    #[test]
    fn test_lenient_mode_skips_page() {
        let collector = FragmentCollector::new(CollectOptions::new().lenient());
        let collection = collector.collect(&BrokenSource).unwrap();

        assert_eq!(collection.pages.len(), 2);
        let pages: Vec<_> = collection.fragments.iter().map(|f| f.page).collect();
        assert_eq!(pages, vec![1, 3]);
    }

    #[test]
    fn test_empty_document() {
        let collection = FragmentCollector::default()
            .collect(&MemorySource::new())
            .unwrap();
        assert!(collection.is_empty());
        assert!(collection.pages.is_empty());
    }
}
