//! Fatal error taxonomy for the alignment/leverage engine.
//!
//! Only structural violations live here; content-quality anomalies (code
//! mismatches, non-1-1 alignments, low-confidence matches) degrade
//! gracefully through the diagnostics sink and never become errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The DP table would exceed the admission-control ceiling.
    #[error(
        "alignment too large: {source_len} x {target_len} segments = {cells} cells \
         (ceiling {ceiling})"
    )]
    AlignmentTooLarge {
        source_len: usize,
        target_len: usize,
        cells: usize,
        ceiling: usize,
    },

    /// Paragraph leverage requires unsegmented input.
    #[error("text unit '{unit_id}' is already segmented; leverage works on whole paragraphs")]
    AlreadySegmented { unit_id: String },

    /// Two lockstep streams ran out of step.
    #[error("document streams out of step: {source_units} source units vs {target_units} target units")]
    Desynchronized {
        source_units: usize,
        target_units: usize,
    },

    /// Two files in one matching set map to the same relative path.
    #[error("duplicate relative path '{path}' in the {set} file set")]
    DuplicatePath { path: String, set: String },

    /// Rewriting coded text hit a structurally ambiguous recipient.
    #[error("code transfer failed for unit '{unit_id}': {reason}")]
    CodeTransfer { unit_id: String, reason: String },
}
