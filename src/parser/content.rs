//! Content stream walking.
//!
//! Replays the text-positioning operators of a page content stream and
//! records every show-text operation with its position, effective font size
//! and an estimated advance width. Coordinates are PDF user space
//! (bottom-left origin); the backend converts them to page coordinates.

use std::collections::HashMap;

use lopdf::content::Operation;
use lopdf::Object;

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustment (thousandths of text space) treated as a word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Baselines closer than this fraction of the font size are the same line.
const BASELINE_TOLERANCE: f32 = 0.2;

/// Runs further apart than this many glyph widths are not joined.
const MAX_JOIN_GAP: f32 = 1.0;

/// Gap (fraction of the font size) that separates two joined runs by a space.
const WORD_GAP: f32 = 0.15;

/// Text shown by one Tj/TJ/'/" operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShownText {
    /// Decoded text
    pub text: String,
    /// X of the text origin in user space
    pub x: f32,
    /// Baseline Y in user space
    pub baseline: f32,
    /// Estimated advance width in user space
    pub width: f32,
    /// Effective font size (Tf size scaled by the rendering matrix)
    pub font_size: f32,
    /// Base font name
    pub font_name: String,
}

/// 2-D affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Matrix::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Matrix {
            a: get_number(&operands[0])?,
            b: get_number(&operands[1])?,
            c: get_number(&operands[2])?,
            d: get_number(&operands[3])?,
            e: get_number(&operands[4])?,
            f: get_number(&operands[5])?,
        })
    }

    /// `self × other`
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text and graphics state tracked while walking a content stream.
struct TextState<'a> {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    in_text_block: bool,
    fonts: &'a HashMap<Vec<u8>, String>,
}

impl<'a> TextState<'a> {
    fn new(fonts: &'a HashMap<Vec<u8>, String>) -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            leading: 0.0,
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            in_text_block: false,
            fonts,
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn set_font(&mut self, resource: &[u8], size: f32) {
        self.font_resource = resource.to_vec();
        self.font_name = self
            .fonts
            .get(resource)
            .cloned()
            .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
        self.font_size = size;
    }

    /// Record shown text and advance the text matrix past it.
    fn show(&mut self, text: String, extra_advance: f32, out: &mut Vec<ShownText>) {
        let advance = text.chars().count() as f32 * self.font_size * AVG_GLYPH_WIDTH + extra_advance;
        let rendering = self.text_matrix.multiply(&self.ctm);

        if !text.trim().is_empty() {
            out.push(ShownText {
                text,
                x: rendering.e,
                baseline: rendering.f,
                width: (advance * rendering.horizontal_scale()).max(0.0),
                font_size: (self.font_size * rendering.vertical_scale()).abs(),
                font_name: self.font_name.clone(),
            });
        }

        self.text_matrix = Matrix::translation(advance, 0.0).multiply(&self.text_matrix);
    }
}

/// Walk decoded content stream operations and collect shown text.
///
/// `fonts` maps font resource names (`/F1`) to base font names;
/// `decode` turns a string operand into text using the resource's encoding.
pub fn walk_operations(
    operations: &[Operation],
    fonts: &HashMap<Vec<u8>, String>,
    decode: &dyn Fn(&[u8], &[u8]) -> String,
) -> Vec<ShownText> {
    let mut state = TextState::new(fonts);
    let mut shown = Vec::new();

    for op in operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => state.ctm_stack.push(state.ctm),
            "Q" => {
                if let Some(ctm) = state.ctm_stack.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    state.ctm = m.multiply(&state.ctm);
                }
            }
            "BT" => {
                state.in_text_block = true;
                state.text_matrix = Matrix::IDENTITY;
                state.line_matrix = Matrix::IDENTITY;
            }
            "ET" => state.in_text_block = false,
            "Tf" => {
                if let (Some(Object::Name(name)), Some(size)) =
                    (operands.first(), operands.get(1).and_then(get_number))
                {
                    state.set_font(name, size);
                }
            }
            "TL" => {
                if let Some(tl) = operands.first().and_then(get_number) {
                    state.leading = tl;
                }
            }
            "Td" | "TD" => {
                let tx = operands.first().and_then(get_number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(get_number).unwrap_or(0.0);
                if op.operator == "TD" {
                    state.leading = -ty;
                }
                state.move_line(tx, ty);
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    state.line_matrix = m;
                    state.text_matrix = m;
                }
            }
            "T*" => state.next_line(),
            "Tj" if state.in_text_block => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = decode(&state.font_resource, bytes);
                    state.show(text, 0.0, &mut shown);
                }
            }
            "TJ" if state.in_text_block => {
                if let Some(Object::Array(items)) = operands.first() {
                    let (text, adjustment) = join_tj_array(items, &state.font_resource, decode);
                    let extra = -adjustment / 1000.0 * state.font_size;
                    state.show(text, extra, &mut shown);
                }
            }
            "'" | "\"" => {
                state.next_line();
                if state.in_text_block {
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = operands.get(index) {
                        let text = decode(&state.font_resource, bytes);
                        state.show(text, 0.0, &mut shown);
                    }
                }
            }
            _ => {}
        }
    }

    shown
}

/// Join consecutive runs that continue each other on one line.
///
/// Generators often emit an enumerator and its heading text, or single words,
/// as separate show operations. Runs are joined when they share font and size,
/// sit on the same baseline and follow each other within one glyph width. A
/// space is inserted when the gap looks like a word break.
pub fn merge_runs(shown: Vec<ShownText>) -> Vec<ShownText> {
    let mut merged: Vec<ShownText> = Vec::with_capacity(shown.len());

    for run in shown {
        if let Some(last) = merged.last_mut() {
            if continues(last, &run) {
                append_run(last, run);
                continue;
            }
        }
        merged.push(run);
    }

    merged
}

fn continues(prev: &ShownText, next: &ShownText) -> bool {
    if prev.font_name != next.font_name || (prev.font_size - next.font_size).abs() > 0.01 {
        return false;
    }
    if (prev.baseline - next.baseline).abs() > BASELINE_TOLERANCE * prev.font_size {
        return false;
    }

    let glyph = prev.font_size * AVG_GLYPH_WIDTH;
    let gap = next.x - (prev.x + prev.width);
    gap >= -glyph && gap <= MAX_JOIN_GAP * glyph
}

fn append_run(prev: &mut ShownText, next: ShownText) {
    let gap = next.x - (prev.x + prev.width);
    let needs_space = gap > WORD_GAP * prev.font_size
        && !prev.text.ends_with(char::is_whitespace)
        && !next.text.starts_with(char::is_whitespace)
        && !prev.text.chars().last().is_some_and(is_spaceless_script_char);
    if needs_space {
        prev.text.push(' ');
    }
    prev.text.push_str(&next.text);
    prev.width = (next.x + next.width - prev.x).max(prev.width);
}

/// Concatenate a TJ array, inserting a space at large negative kerning.
///
/// Returns the text and the summed numeric adjustment.
fn join_tj_array(
    items: &[Object],
    font_resource: &[u8],
    decode: &dyn Fn(&[u8], &[u8]) -> String,
) -> (String, f32) {
    let mut combined = String::new();
    let mut total_adjustment = 0.0;

    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode(font_resource, bytes)),
            Object::Integer(_) | Object::Real(_) => {
                let n = get_number(item).unwrap_or(0.0);
                total_adjustment += n;
                // Negative values advance to the right; large ones are word gaps.
                if -n > TJ_SPACE_THRESHOLD
                    && !combined.ends_with(' ')
                    && !combined.ends_with('\u{00A0}')
                {
                    if let Some(c) = combined.chars().last() {
                        if !is_spaceless_script_char(c) {
                            combined.push(' ');
                        }
                    }
                }
            }
            _ => {}
        }
    }

    (combined, total_adjustment)
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
