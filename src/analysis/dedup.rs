//! Duplicate removal and hierarchy repair.

use std::collections::HashSet;

use crate::model::{HeadingLevel, OutlineEntry};

use super::candidate::Candidate;
use super::text::normalize_for_match;

/// Order candidates and drop duplicates.
///
/// Candidates matching the title are removed first. The rest are sorted by
/// page, then base score (descending), then text; on each page a candidate
/// is dropped when an earlier one has the same normalized text, contains or
/// is contained by it, or shares more than `overlap_ratio` of the smaller
/// token set.
pub fn deduplicate(
    candidates: Vec<Candidate>,
    title: Option<&str>,
    overlap_ratio: f32,
) -> Vec<Candidate> {
    let title_key = title.map(normalize_for_match);

    let mut keyed: Vec<(String, Candidate)> = candidates
        .into_iter()
        .map(|c| (normalize_for_match(c.text()), c))
        .filter(|(key, _)| title_key.as_deref() != Some(key.as_str()))
        .collect();

    keyed.sort_by(|(_, a), (_, b)| {
        a.page()
            .cmp(&b.page())
            .then_with(|| b.base_score.total_cmp(&a.base_score))
            .then_with(|| a.text().cmp(b.text()))
    });

    let mut kept: Vec<(String, Candidate)> = Vec::with_capacity(keyed.len());
    for (key, candidate) in keyed {
        let duplicate = kept.iter().any(|(kept_key, kept_candidate)| {
            kept_candidate.page() == candidate.page()
                && is_near_duplicate(kept_key, &key, overlap_ratio)
        });
        if duplicate {
            log::debug!(
                "Dropping duplicate heading '{}' on page {}",
                candidate.text(),
                candidate.page()
            );
        } else {
            kept.push((key, candidate));
        }
    }

    kept.into_iter().map(|(_, c)| c).collect()
}

/// Same text, containment, or heavy token overlap.
fn is_near_duplicate(a: &str, b: &str, overlap_ratio: f32) -> bool {
    if a == b {
        return true;
    }
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(b) || b.contains(a) {
        return true;
    }

    let a_tokens: HashSet<&str> = a.split_whitespace().collect();
    let b_tokens: HashSet<&str> = b.split_whitespace().collect();
    let smaller = a_tokens.len().min(b_tokens.len());
    if smaller == 0 {
        return false;
    }
    let shared = a_tokens.intersection(&b_tokens).count();
    shared as f32 > overlap_ratio * smaller as f32
}

/// Ensure no entry is more than one level deeper than its predecessor.
pub fn repair_hierarchy(entries: &mut [OutlineEntry]) {
    let mut previous: Option<u8> = None;
    for entry in entries.iter_mut() {
        let mut level = entry.level.number();
        if let Some(prev) = previous {
            if level > prev + 1 {
                level = prev + 1;
                entry.level = HeadingLevel::from_number(level);
            }
        }
        previous = Some(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, TextFragment};

    fn candidate(text: &str, page: u32, score: f32) -> Candidate {
        let frag = TextFragment::new(text, 14.0, "Arial-Bold", page, BBox::default());
        let mut c = Candidate::new(frag, (612.0, 792.0), 0);
        c.base_score = score;
        c
    }

    fn texts(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.text()).collect()
    }

    #[test]
    fn test_sort_order() {
        let out = deduplicate(
            vec![
                candidate("Zeta", 2, 0.9),
                candidate("Beta", 1, 0.7),
                candidate("Alpha", 1, 0.7),
                candidate("Gamma", 1, 0.95),
            ],
            None,
            0.7,
        );
        assert_eq!(texts(&out), vec!["Gamma", "Alpha", "Beta", "Zeta"]);
    }

    #[test]
    fn test_exact_duplicates_same_page_only() {
        let out = deduplicate(
            vec![
                candidate("Results", 1, 0.8),
                candidate("RESULTS!", 1, 0.9),
                candidate("Results", 2, 0.8),
            ],
            None,
            0.7,
        );
        assert_eq!(texts(&out), vec!["RESULTS!", "Results"]);
        assert_eq!(out[1].page(), 2);
    }

    #[test]
    fn test_containment_keeps_higher_score() {
        let out = deduplicate(
            vec![
                candidate("Methods", 1, 0.7),
                candidate("Research Methods", 1, 0.9),
            ],
            None,
            0.7,
        );
        assert_eq!(texts(&out), vec!["Research Methods"]);
    }

    #[test]
    fn test_token_overlap() {
        let out = deduplicate(
            vec![
                candidate("Annual budget review summary", 1, 0.9),
                candidate("Summary annual budget review", 1, 0.8),
                candidate("Staffing plan", 1, 0.7),
            ],
            None,
            0.7,
        );
        assert_eq!(
            texts(&out),
            vec!["Annual budget review summary", "Staffing plan"]
        );
    }

    #[test]
    fn test_title_excluded() {
        let out = deduplicate(
            vec![candidate("Parkway!", 1, 0.9), candidate("Parkway", 3, 0.9)],
            Some("PARKWAY"),
            0.7,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_repair_hierarchy() {
        let mut entries = vec![
            OutlineEntry::new(HeadingLevel::H1, "A", 1),
            OutlineEntry::new(HeadingLevel::H3, "B", 1),
            OutlineEntry::new(HeadingLevel::H3, "C", 2),
            OutlineEntry::new(HeadingLevel::H1, "D", 2),
            OutlineEntry::new(HeadingLevel::H3, "E", 3),
        ];
        repair_hierarchy(&mut entries);
        let levels: Vec<_> = entries.iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![
                HeadingLevel::H1,
                HeadingLevel::H2,
                HeadingLevel::H3,
                HeadingLevel::H1,
                HeadingLevel::H2
            ]
        );
    }

    #[test]
    fn test_repair_leaves_first_entry() {
        let mut entries = vec![
            OutlineEntry::new(HeadingLevel::H3, "A", 1),
            OutlineEntry::new(HeadingLevel::H3, "B", 1),
        ];
        repair_hierarchy(&mut entries);
        assert_eq!(entries[0].level, HeadingLevel::H3);
        assert_eq!(entries[1].level, HeadingLevel::H3);
    }
}
