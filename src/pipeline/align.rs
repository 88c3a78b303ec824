//! Response alignment — maps a numbered-list completion back to its batch.
//!
//! Policy: the count of parsed explanation lines must equal the batch length
//! exactly, and positional correspondence is by line order, not the numeric
//! label the model printed. A model that mislabels numbers but keeps line
//! order still aligns; a model that reorders lines silently misaligns. That
//! gap is accepted and documented — tightening the check would change
//! observable behavior for existing pattern files.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// A numbered explanation line: leading digits, a period, optional
/// whitespace, then the remainder.
static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)").unwrap());

/// The response could not be aligned one-for-one with the batch.
#[derive(Error, Debug, Clone)]
#[error("expected {expected} explanation(s), parsed {matched} ({unmatched_lines} unparsable line(s))")]
pub struct AlignmentMismatch {
    pub expected: usize,
    pub matched: usize,
    /// Non-blank lines that did not look like `<n>. <text>`.
    pub unmatched_lines: usize,
    /// Raw response text, kept for diagnostics.
    pub raw_response: String,
}

/// Parse a completion response into one explanation per batch record.
///
/// All-or-nothing: either every record gets an explanation, positionally, or
/// the whole batch fails with diagnostics.
pub fn align(raw_response: &str, batch_len: usize) -> Result<Vec<String>, AlignmentMismatch> {
    let trimmed = raw_response.trim();
    if trimmed.is_empty() {
        return Err(AlignmentMismatch {
            expected: batch_len,
            matched: 0,
            unmatched_lines: 0,
            raw_response: raw_response.to_string(),
        });
    }

    let mut explanations = Vec::new();
    let mut unmatched_lines = 0;

    for line in trimmed.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match NUMBERED_LINE.captures(line) {
            // The numeric label is not checked against the expected position;
            // only line order carries meaning.
            Some(caps) => {
                let text = caps.get(2).map_or("", |m| m.as_str());
                explanations.push(strip_matches_prefix(text).trim().to_string());
            }
            None => {
                debug!(line, "Discarding unnumbered response line");
                unmatched_lines += 1;
            }
        }
    }

    if explanations.len() == batch_len {
        Ok(explanations)
    } else {
        Err(AlignmentMismatch {
            expected: batch_len,
            matched: explanations.len(),
            unmatched_lines,
            raw_response: raw_response.to_string(),
        })
    }
}

/// Strip a leading case-insensitive `"matches "` from an explanation.
/// Interior occurrences are untouched.
fn strip_matches_prefix(text: &str) -> &str {
    match text.get(..8) {
        Some(prefix) if prefix.eq_ignore_ascii_case("matches ") => &text[8..],
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_numbered_lines_in_order() {
        let response = "1. matches 'foo'\n2. looks for 'bar' followed by digits";
        let explanations = align(response, 2).unwrap();
        assert_eq!(
            explanations,
            vec![
                "'foo'".to_string(),
                "looks for 'bar' followed by digits".to_string()
            ]
        );
    }

    #[test]
    fn empty_response_fails_with_zero_matches() {
        let err = align("", 2).unwrap_err();
        assert_eq!(err.expected, 2);
        assert_eq!(err.matched, 0);
    }

    #[test]
    fn whitespace_only_response_fails() {
        let err = align("   \n\n  ", 2).unwrap_err();
        assert_eq!(err.matched, 0);
    }

    #[test]
    fn wrong_line_count_fails_and_keeps_raw_response() {
        let response = "1. matches 'foo'";
        let err = align(response, 2).unwrap_err();
        assert_eq!(err.expected, 2);
        assert_eq!(err.matched, 1);
        assert_eq!(err.raw_response, response);
    }

    #[test]
    fn extra_lines_fail_too() {
        let response = "1. one\n2. two\n3. three";
        let err = align(response, 2).unwrap_err();
        assert_eq!(err.matched, 3);
    }

    #[test]
    fn numeric_labels_are_not_validated() {
        // Mislabeled but order-preserving output still aligns by line order.
        let response = "7. first explanation\n3. second explanation";
        let explanations = align(response, 2).unwrap();
        assert_eq!(explanations[0], "first explanation");
        assert_eq!(explanations[1], "second explanation");
    }

    #[test]
    fn unnumbered_lines_are_discarded_but_counted() {
        let response = "Here are your explanations:\n1. one\n2. two";
        let explanations = align(response, 2).unwrap();
        assert_eq!(explanations, vec!["one".to_string(), "two".to_string()]);

        let err = align("preamble only\nmore chatter", 1).unwrap_err();
        assert_eq!(err.matched, 0);
        assert_eq!(err.unmatched_lines, 2);
    }

    #[test]
    fn blank_lines_between_entries_are_ignored() {
        let response = "1. one\n\n2. two\n";
        let explanations = align(response, 2).unwrap();
        assert_eq!(explanations.len(), 2);
    }

    #[test]
    fn matches_prefix_is_stripped_case_insensitively() {
        let explanations =
            align("1. Matches a digit\n2. MATCHES 'x'\n3. matches nothing", 3).unwrap();
        assert_eq!(explanations[0], "a digit");
        assert_eq!(explanations[1], "'x'");
        assert_eq!(explanations[2], "nothing");
    }

    #[test]
    fn interior_matches_is_untouched() {
        let explanations = align("1. a pattern that matches digits", 1).unwrap();
        assert_eq!(explanations[0], "a pattern that matches digits");
    }

    #[test]
    fn prefix_without_trailing_space_is_kept() {
        let explanations = align("1. matchesall", 1).unwrap();
        assert_eq!(explanations[0], "matchesall");
    }

    #[test]
    fn explanations_are_trimmed() {
        let explanations = align("1.    padded explanation   ", 1).unwrap();
        assert_eq!(explanations[0], "padded explanation");
    }

    #[test]
    fn numbered_line_with_no_text_yields_empty_explanation() {
        // Count parity is all that is checked; an empty remainder still counts.
        let explanations = align("1. one\n2.", 2).unwrap();
        assert_eq!(explanations[1], "");
    }

    #[test]
    fn multibyte_text_after_prefix_check_is_safe() {
        let explanations = align("1. é um padrão\n2. matches é", 2).unwrap();
        assert_eq!(explanations[0], "é um padrão");
        assert_eq!(explanations[1], "é");
    }
}
