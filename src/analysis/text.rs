//! Text predicates and normalization shared by the title detector, the
//! scorer and the deduplicator.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Why a fragment can never be a title or heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    TooLong,
    PageNumber,
    Date,
    Copyright,
    NoAlphanumeric,
    Leaders,
}

const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

fn page_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?ix)^(?:
                \d+\.?
              | page\s*\d+(?:\s*(?:of|/)\s*\d+)?
              | \d+\s*(?:of|/)\s*\d+
              | [-–—]\s*\d+\s*[-–—]
            )$",
        )
        .expect("valid page number regex")
    })
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?ix)^(?:
                \d{{1,2}}[-/.]\d{{1,2}}[-/.]\d{{2,4}}
              | \d{{4}}[-/.]\d{{1,2}}[-/.]\d{{1,2}}
              | (?:{m})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?(?:\s+\d{{4}})?
              | \d{{1,2}}(?:st|nd|rd|th)?\s+(?:{m})\.?,?\s+\d{{4}}
              | (?:{m})\.?,?\s+\d{{4}}
            )$",
            m = MONTHS
        );
        Regex::new(&pattern).expect("valid date regex")
    })
}

fn leader_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[._]{5,}").expect("valid leader regex"))
}

fn cue_word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:chapter|section|part|introduction|overview|summary|conclusions?|appendix|abstract|background|references|glossary|contents|acknowledge?ments?)\b",
        )
        .expect("valid cue word regex")
    })
}

fn numbered_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(?:\.\d+)*\.?\s+\S").expect("valid numbered regex"))
}

fn lettered_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z]|[IVXLCDM]+|[ivxlcdm]+)[.)]\s+\S").expect("valid lettered regex")
    })
}

fn non_word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("valid non-word regex"))
}

/// Return the reason a fragment is ineligible, or `None` if it may be a
/// title or heading.
pub fn rejection(text: &str, max_chars: usize) -> Option<Rejection> {
    let text = text.trim();
    if text.is_empty() {
        return Some(Rejection::Empty);
    }
    if text.chars().count() > max_chars {
        return Some(Rejection::TooLong);
    }
    if page_number_regex().is_match(text) {
        return Some(Rejection::PageNumber);
    }
    if date_regex().is_match(text) {
        return Some(Rejection::Date);
    }
    let lower = text.to_lowercase();
    if text.contains('©') || lower.contains("copyright") || lower.contains("all rights reserved")
    {
        return Some(Rejection::Copyright);
    }
    if !text.chars().any(char::is_alphanumeric) {
        return Some(Rejection::NoAlphanumeric);
    }
    let fillers = text.chars().filter(|c| matches!(c, '.' | '_')).count();
    if fillers > 8 || leader_regex().is_match(text) {
        return Some(Rejection::Leaders);
    }
    None
}

/// Whether a fragment may be a title or heading.
pub fn is_eligible(text: &str, max_chars: usize) -> bool {
    rejection(text, max_chars).is_none()
}

/// At least one cased letter and no lowercase letters.
pub fn is_all_caps(text: &str) -> bool {
    let mut has_upper = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        has_upper |= c.is_uppercase();
    }
    has_upper
}

/// Every word starts with an uppercase letter followed only by lowercase
/// letters; uncased characters separate words.
pub fn is_title_case(text: &str) -> bool {
    let mut previous_cased = false;
    let mut has_cased = false;

    for c in text.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            has_cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            has_cased = true;
        } else {
            previous_cased = false;
        }
    }

    has_cased
}

/// Contains a structural cue word such as "Chapter" or "Appendix".
pub fn has_cue_word(text: &str) -> bool {
    cue_word_regex().is_match(text)
}

/// Starts with a numeric enumerator (`1. `, `2.3 `).
pub fn is_numbered(text: &str) -> bool {
    numbered_regex().is_match(text)
}

/// Starts with a letter or roman numeral enumerator (`A. `, `II. `).
pub fn is_lettered(text: &str) -> bool {
    lettered_regex().is_match(text)
}

/// Lowercase, drop non-word characters, collapse whitespace.
pub fn normalize_for_match(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = non_word_regex().replace_all(&lower, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// NFC-normalize, strip control characters, collapse whitespace and trim.
pub fn clean_text(text: &str) -> String {
    let normalized: String = text
        .nfc()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| !is_control(*c))
        .collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_numbers_rejected() {
        for text in ["12", "12.", "Page 3", "page 3 of 10", "3 of 10", "- 4 -", "– 7 –"] {
            assert_eq!(rejection(text, 200), Some(Rejection::PageNumber), "{}", text);
        }
        assert!(is_eligible("12 Angry Men", 200));
    }

    #[test]
    fn test_dates_rejected() {
        for text in ["12/03/2021", "2021-03-12", "March 21, 2003", "Mar. 21", "21 March 2003"] {
            assert_eq!(rejection(text, 200), Some(Rejection::Date), "{}", text);
        }
        assert!(is_eligible("Marketing Plan", 200));
        assert!(is_eligible("Mayor's Office", 200));
        assert!(is_eligible("March Madness", 200));
    }

    #[test]
    fn test_other_rejections() {
        assert_eq!(rejection("   ", 200), Some(Rejection::Empty));
        assert_eq!(rejection(&"a".repeat(201), 200), Some(Rejection::TooLong));
        assert_eq!(rejection("© 2023 ACME", 200), Some(Rejection::Copyright));
        assert_eq!(
            rejection("All Rights Reserved", 200),
            Some(Rejection::Copyright)
        );
        assert_eq!(rejection("* * *", 200), Some(Rejection::NoAlphanumeric));
        assert_eq!(rejection("Introduction.....", 200), Some(Rejection::Leaders));
        assert_eq!(rejection("a.b.c.d.e.f.g.h.i.j", 200), Some(Rejection::Leaders));
        assert_eq!(rejection("Introduction", 200), None);
    }

    #[test]
    fn test_case_predicates() {
        assert!(is_all_caps("PARKWAY"));
        assert!(is_all_caps("SECTION 2: RESULTS"));
        assert!(!is_all_caps("Parkway"));
        assert!(!is_all_caps("2024"));

        assert!(is_title_case("Table Of Contents"));
        assert!(is_title_case("Name"));
        assert!(!is_title_case("Signature of the applicant"));
        assert!(!is_title_case("PARKWAY"));
        assert!(!is_title_case("123"));
    }

    #[test]
    fn test_lexical_cues() {
        assert!(has_cue_word("Chapter 3"));
        assert!(has_cue_word("Executive summary"));
        assert!(!has_cue_word("Partial results"));

        assert!(is_numbered("1. Introduction"));
        assert!(is_numbered("2.3 Methods"));
        assert!(!is_numbered("Version 1.2"));
        assert!(!is_numbered("1.5"));

        assert!(is_lettered("A. Scope"));
        assert!(is_lettered("II. Background"));
        assert!(!is_lettered("A Study"));
    }

    #[test]
    fn test_normalize_for_match() {
        assert_eq!(normalize_for_match("  Hello,   World! "), "hello world");
        assert_eq!(normalize_for_match("1.2 Results:"), "12 results");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  A\tb\u{0007}c \n d  "), "A bc d");
        assert_eq!(clean_text("Cafe\u{0301}"), "Café");
        assert_eq!(clean_text("\u{0085}\u{0000}"), "");
    }
}
