//! Indented plain-text rendering of an outline.

use std::fmt::Write;

use crate::model::OutlineResult;

/// Render the title and an indented outline, one entry per line.
///
/// ```text
/// Annual Report
///   Introduction ... 1
///     Scope ... 2
/// ```
pub fn to_text(result: &OutlineResult) -> String {
    let mut output = String::new();
    output.push_str(&result.title);
    output.push('\n');

    for entry in &result.outline {
        let indent = "  ".repeat(entry.level.number() as usize);
        // Writing to a String cannot fail.
        let _ = writeln!(output, "{}{} ... {}", indent, entry.text, entry.page);
    }

    output
}
