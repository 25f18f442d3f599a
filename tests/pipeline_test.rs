//! End-to-end outline inference over in-memory documents.

use pdfoutline::render::{to_json, JsonFormat};
use pdfoutline::{
    validate_result, BBox, HeadingLevel, MemorySource, OutlineConfig, OutlineExtractor,
    OutlineResult, TextFragment,
};

const BODY: &str = "the annual community gathering will take place near the old mill road where residents can share stories and meals together";

fn body_lines(count: usize, start_y: f32) -> Vec<TextFragment> {
    (0..count)
        .map(|i| {
            let y = start_y + i as f32 * 14.0;
            TextFragment::new(BODY, 10.0, "Times-Roman", 0, BBox::new(72.0, y, 540.0, y + 10.0))
        })
        .collect()
}

fn bold(text: &str, size: f32, x: f32, y: f32) -> TextFragment {
    let width = text.chars().count() as f32 * size * 0.5;
    TextFragment::new(text, size, "Helvetica-Bold", 0, BBox::new(x, y, x + width, y + size))
}

fn centered(text: &str, size: f32, y: f32) -> TextFragment {
    let width = text.chars().count() as f32 * size * 0.5;
    bold(text, size, (612.0 - width) / 2.0, y)
}

fn summary(result: &OutlineResult) -> Vec<(HeadingLevel, &str, u32)> {
    result
        .outline
        .iter()
        .map(|e| (e.level, e.text.as_str(), e.page))
        .collect()
}

#[test]
fn test_poster_title_only() {
    let mut fragments = vec![centered("PARKWAY", 24.0, 60.0)];
    fragments.extend(body_lines(6, 350.0));
    let source = MemorySource::new().with_letter_page(fragments);

    let report = OutlineExtractor::new().extract(&source);

    assert_eq!(
        to_json(&report.result, JsonFormat::Compact).unwrap(),
        r#"{"title":"PARKWAY","outline":[]}"#
    );
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_form_fields_become_headings() {
    let mut fragments = vec![
        bold("Name", 12.0, 72.0, 245.0),
        bold("Date", 12.0, 72.0, 277.0),
        bold("Signature of the applicant", 12.0, 72.0, 301.0),
    ];
    fragments.extend(body_lines(6, 420.0));
    let source = MemorySource::new().with_letter_page(fragments);

    let result = OutlineExtractor::new().extract(&source).result;

    assert_eq!(result.title, "Untitled");
    assert_eq!(
        summary(&result),
        vec![
            (HeadingLevel::H1, "Name", 1),
            (HeadingLevel::H1, "Date", 1),
            (HeadingLevel::H1, "Signature of the applicant", 1),
        ]
    );
}

#[test]
fn test_level_gap_is_repaired() {
    let mut fragments = vec![
        centered("Project Handbook", 20.0, 40.0),
        bold("Overview", 20.0, 72.0, 200.0),
        bold("Details", 13.0, 72.0, 300.0),
        bold("- 2 -", 16.0, 290.0, 760.0),
    ];
    fragments.extend(body_lines(6, 420.0));
    let source = MemorySource::new().with_letter_page(fragments);

    let report = OutlineExtractor::new().extract(&source);

    assert_eq!(report.clusters.centers(), &[20.0, 16.0, 13.0]);
    assert_eq!(report.result.title, "Project Handbook");
    assert_eq!(
        summary(&report.result),
        vec![
            (HeadingLevel::H1, "Overview", 1),
            (HeadingLevel::H2, "Details", 1),
        ]
    );
    // The scorer still saw the third size band.
    assert_eq!(report.candidates[1].cluster_index, 2);
}

#[test]
fn test_empty_document_fallback() {
    let report = OutlineExtractor::new().extract(&MemorySource::new());
    assert_eq!(
        to_json(&report.result, JsonFormat::Compact).unwrap(),
        r#"{"title":"Untitled","outline":[]}"#
    );

    let blank = MemorySource::new().with_letter_page(vec![]).with_letter_page(vec![]);
    assert_eq!(
        OutlineExtractor::new().extract(&blank).result,
        OutlineResult::untitled()
    );
}

fn handbook() -> MemorySource {
    let mut page1 = vec![
        centered("Employee Handbook", 16.0, 40.0),
        bold("1. Introduction", 16.0, 72.0, 120.0),
    ];
    page1.extend(body_lines(5, 200.0));

    let mut page2 = vec![
        bold("2. Policies", 16.0, 72.0, 60.0),
        bold("2.1 Leave", 13.0, 72.0, 200.0),
        bold("2.1 Leave", 13.0, 72.0, 500.0),
    ];
    page2.extend(body_lines(5, 300.0));

    let mut page3 = vec![
        bold("Employee Handbook", 16.0, 72.0, 60.0),
        bold("3. Benefits", 16.0, 72.0, 120.0),
        bold("3.1 Health", 13.0, 72.0, 250.0),
    ];
    page3.extend(body_lines(5, 300.0));

    MemorySource::new()
        .with_letter_page(page1)
        .with_letter_page(page2)
        .with_letter_page(page3)
}

#[test]
fn test_multi_page_outline() {
    let result = OutlineExtractor::new().extract(&handbook()).result;

    assert_eq!(result.title, "Employee Handbook");
    assert_eq!(
        summary(&result),
        vec![
            (HeadingLevel::H1, "1. Introduction", 1),
            (HeadingLevel::H1, "2. Policies", 2),
            (HeadingLevel::H2, "2.1 Leave", 2),
            (HeadingLevel::H1, "3. Benefits", 3),
            (HeadingLevel::H2, "3.1 Health", 3),
        ]
    );
}

#[test]
fn test_outline_properties() {
    let extractor = OutlineExtractor::new();
    let source = handbook();
    let result = extractor.extract(&source).result;

    // Valid against the output contract.
    assert!(validate_result(&result).is_ok());

    // No level jumps by more than one.
    assert!(result.is_hierarchy_consistent());

    // No same-page duplicates.
    for (i, a) in result.outline.iter().enumerate() {
        for b in &result.outline[i + 1..] {
            if a.page == b.page {
                let (x, y) = (a.text.to_lowercase(), b.text.to_lowercase());
                assert!(!x.contains(&y) && !y.contains(&x), "{} / {}", a.text, b.text);
            }
        }
    }

    // The title never reappears as a heading.
    assert!(result.outline.iter().all(|e| e.text != result.title));

    // Same input, same output.
    assert_eq!(extractor.extract(&source).result, result);
}

#[test]
fn test_threshold_controls_acceptance() {
    let strict = OutlineExtractor::new()
        .with_config(OutlineConfig::default().with_heading_threshold(5.0))
        .extract(&handbook())
        .result;
    assert!(strict.outline.is_empty());
    assert_eq!(strict.title, "Employee Handbook");
}
