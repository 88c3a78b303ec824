//! PipelineRunner — drives prompt → complete → align → annotate per batch.
//!
//! Faults are isolated at batch granularity: a failed completion call or an
//! unalignable response writes a sentinel explanation into that batch's
//! records and the run moves on to the next batch. Only file- and
//! config-level failures abort a run, and those happen before this module is
//! reached. Execution is strictly sequential — one completion call in flight
//! at a time, batches in order.

use tracing::{debug, warn};

use super::{align, batch, prompt};
use crate::openai::CompletionClient;
use crate::store::PatternRecord;

/// Written to every record of a batch whose completion call failed.
pub const COMPLETION_FAILED_SENTINEL: &str = "Error: OpenAI call failed";

/// Written to records left unexplained when a response cannot be aligned.
pub const ALIGNMENT_FAILED_SENTINEL: &str = "Error: Failed to get explanation";

/// Batch explanation requests always run at temperature 0.0 so identical
/// prompts yield identical output.
const BATCH_TEMPERATURE: f32 = 0.0;

/// Counters for one annotation run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub batches_total: usize,
    pub batches_aligned: usize,
    pub batches_failed_completion: usize,
    pub batches_failed_alignment: usize,
    /// Records that received a model-derived explanation (not a sentinel).
    pub records_annotated: usize,
}

/// Annotate every record in place, one batch at a time, in order.
///
/// After this returns, every record carries `Some` explanation — either
/// model-derived or a sentinel naming the failure class. `batch_size` must
/// be positive.
pub fn annotate_records(
    records: &mut [PatternRecord],
    client: &dyn CompletionClient,
    batch_size: usize,
) -> RunReport {
    let mut report = RunReport {
        batches_total: batch::batch_count(records.len(), batch_size),
        ..RunReport::default()
    };

    for (index, chunk) in batch::plan_mut(records, batch_size).enumerate() {
        let built = prompt::build_batch_prompt(chunk);

        let raw = match client.complete(&built, BATCH_TEMPERATURE) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    batch = index,
                    records = chunk.len(),
                    error = %e,
                    "Completion call failed, writing sentinel explanations"
                );
                for record in chunk.iter_mut() {
                    record.explanation = Some(COMPLETION_FAILED_SENTINEL.to_string());
                }
                report.batches_failed_completion += 1;
                continue;
            }
        };

        match align::align(&raw, chunk.len()) {
            Ok(explanations) => {
                for (record, explanation) in chunk.iter_mut().zip(explanations) {
                    record.explanation = Some(explanation);
                    report.records_annotated += 1;
                }
                report.batches_aligned += 1;
            }
            Err(mismatch) => {
                warn!(
                    batch = index,
                    expected = mismatch.expected,
                    matched = mismatch.matched,
                    "Response did not align with batch, writing sentinel explanations"
                );
                debug!(raw = %mismatch.raw_response, "Unaligned response");
                for record in chunk.iter_mut() {
                    if record.explanation.is_none() {
                        record.explanation = Some(ALIGNMENT_FAILED_SENTINEL.to_string());
                    }
                }
                report.batches_failed_alignment += 1;
            }
        }
    }

    report
}
