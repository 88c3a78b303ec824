//! Prompt construction for batch explanation requests.
//!
//! The aligner matches response lines back to records purely by position, so
//! the prompt must be deterministic: identical batches always produce
//! identical prompts.

use crate::store::PatternRecord;

/// System message sent with every completion request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Fixed instruction block: task description, output-format directive, and
/// two worked examples.
const PROMPT_HEADER: &str = "\
The following is a numbered list of regular expressions taken from a translation pattern file.
For each one, write a terse one-line explanation of what the expression matches, for QA reviewers.

Respond with exactly one line per input, numbered to match, in the format:
<n>. <explanation>

Do not add headings, commentary, or blank lines between entries.

Examples:
Input: 1. ^\\d{4}-\\d{2}-\\d{2}$
Output: 1. matches an ISO-8601 date such as 2024-01-15
Input: 2. [A-Z]{2}\\d+
Output: 2. matches two uppercase letters followed by one or more digits

Patterns:
";

/// Render a batch into a single instruction string.
///
/// Each record is listed as `<position>. <source_pattern>` with a 1-based
/// position within the batch (not the global sequence).
pub fn build_batch_prompt(batch: &[PatternRecord]) -> String {
    let mut prompt = String::from(PROMPT_HEADER);
    for (i, record) in batch.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, record.source_pattern));
    }
    prompt
}
