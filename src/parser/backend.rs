//! lopdf-backed document source.
//!
//! Isolates the concrete PDF library from the rest of the pipeline: pages
//! come out as [`RawPage`]s with top-left page coordinates.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect;
use crate::error::{Error, Result};
use crate::model::{BBox, TextFragment, DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH};

use super::collector::{DocumentSource, RawPage};
use super::content::{decode_text_simple, merge_runs, walk_operations, ShownText};

/// Ascender height as a fraction of the font size.
const ASCENT: f32 = 0.8;
/// Descender depth as a fraction of the font size.
const DESCENT: f32 = 0.2;

/// Deepest /Parent chain followed when looking for an inherited MediaBox.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// [`DocumentSource`] backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect::pdf_version_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect::pdf_version(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc)
    }

    /// Load from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        let pages = doc.get_pages();
        log::debug!("Loaded PDF {} with {} pages", doc.version, pages.len());
        Ok(Self { doc, pages })
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_id(&self, number: u32) -> Result<ObjectId> {
        self.pages
            .get(&number)
            .copied()
            .ok_or(Error::PageOutOfRange(number, self.page_count()))
    }

    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone())),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// MediaBox as `[llx, lly, urx, ury]`, inherited through /Parent.
    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let default = [0.0, 0.0, DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT];
        let mut current = self.doc.get_dictionary(page_id).ok();

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let Some(dict) = current else { break };

            if let Ok(obj) = dict.get(b"MediaBox") {
                if let Some(rect) = self.resolve_rect(obj) {
                    return rect;
                }
            }

            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|id| self.doc.get_dictionary(id).ok());
        }

        default
    }

    fn resolve_rect(&self, obj: &Object) -> Option<[f32; 4]> {
        let obj = match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok()?,
            other => other,
        };
        let arr = obj.as_array().ok()?;
        if arr.len() != 4 {
            return None;
        }

        let mut rect = [0.0f32; 4];
        for (slot, item) in rect.iter_mut().zip(arr) {
            *slot = match item {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r,
                _ => return None,
            };
        }
        Some(rect)
    }
}

impl DocumentSource for LopdfSource {
    fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    fn page(&self, number: u32) -> Result<RawPage> {
        let page_id = self.page_id(number)?;
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let base_fonts: HashMap<Vec<u8>, String> = fonts
            .iter()
            .map(|(name, font_dict)| (name.clone(), base_font_name(font_dict)))
            .collect();
        // Encodings are resolved once per page, not per shown string.
        let encodings: HashMap<Vec<u8>, _> = fonts
            .iter()
            .filter_map(|(name, font_dict)| {
                font_dict
                    .get_font_encoding(&self.doc)
                    .ok()
                    .map(|enc| (name.clone(), enc))
            })
            .collect();
        let content = self.page_content(page_id)?;

        let operations = lopdf::content::Content::decode(&content)
            .map_err(|e| Error::PdfParse(e.to_string()))?
            .operations;

        let decode = |font: &[u8], bytes: &[u8]| {
            encodings
                .get(font)
                .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
                .unwrap_or_else(|| decode_text_simple(bytes))
        };
        let shown = merge_runs(walk_operations(&operations, &base_fonts, &decode));

        let [llx, lly, urx, ury] = self.media_box(page_id);
        let (width, height) = ((urx - llx).abs(), (ury - lly).abs());

        let fragments = shown
            .into_iter()
            .map(|s| to_fragment(s, number, llx, ury))
            .collect();

        Ok(RawPage {
            width,
            height,
            fragments,
        })
    }
}

fn base_font_name(font_dict: &Dictionary) -> String {
    font_dict
        .get(b"BaseFont")
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Convert user-space shown text into a fragment with a top-left bbox.
fn to_fragment(shown: ShownText, page: u32, origin_x: f32, top: f32) -> TextFragment {
    let x0 = shown.x - origin_x;
    let y0 = top - (shown.baseline + ASCENT * shown.font_size);
    let y1 = top - (shown.baseline - DESCENT * shown.font_size);
    let bbox = BBox::new(x0, y0, x0 + shown.width, y1);
    TextFragment::new(shown.text, shown.font_size, shown.font_name, page, bbox)
}
