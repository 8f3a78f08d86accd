//! Inline-code reconciliation between a donor and a recipient fragment.
//!
//! The donor is leveraged/translated text; the recipient is the content
//! whose code inventory is structurally expected (usually the current
//! source). Transfer is tolerant by design: translators drop and add codes
//! all the time, so mismatches are warnings, not failures. The only hard
//! error is a recipient whose code ids are ambiguous; there is no right
//! answer to copy from in that case.

use std::collections::BTreeSet;

use crate::core::error::EngineError;
use crate::core::fragment::{Code, TextFragment};
use crate::infra::diag::Diagnostics;

/// Reconcile `donor`'s inline codes against `recipient`'s.
///
/// - A donor code whose id exists in the recipient inherits the recipient's
///   `data`/`outer_data` where its own copy lacks them.
/// - A donor code with no recipient counterpart is kept as-is when it
///   carries its own data; otherwise it is reported as a warning.
/// - A recipient code missing from the donor is a warning unless flagged
///   deletable.
///
/// Codes are matched by id; the donor is mutated in place. This is the only
/// in-place mutation the engine performs.
pub fn transfer_codes(
    donor: &mut TextFragment,
    recipient: &TextFragment,
    unit_id: &str,
    diag: &mut Diagnostics,
) -> Result<(), EngineError> {
    let reference = reference_codes(recipient, unit_id)?;

    let mut donor_ids = BTreeSet::new();
    for code in donor.codes_mut() {
        donor_ids.insert(code.id);
        // Prefer an exact (id, kind) counterpart so the halves of a paired
        // code don't inherit each other's payload; fall back to id alone
        let counterpart = reference
            .iter()
            .find(|r| r.id == code.id && r.kind == code.kind)
            .or_else(|| reference.iter().find(|r| r.id == code.id));
        match counterpart {
            Some(expected) => {
                if code.data.is_none() {
                    code.data = expected.data.clone();
                }
                if code.outer_data.is_none() {
                    code.outer_data = expected.outer_data.clone();
                }
            }
            None if code.data.is_some() => {
                // Self-contained extra code; the translator added markup of
                // their own and it can be emitted verbatim
            }
            None => {
                diag.warn(
                    Some(unit_id),
                    format!(
                        "leveraged text carries code id {} with no data and no counterpart \
                         in the expected content",
                        code.id
                    ),
                );
            }
        }
    }

    for expected in &reference {
        if !donor_ids.contains(&expected.id) && !expected.deletable {
            diag.warn(
                Some(unit_id),
                format!(
                    "code id {} expected by the content is missing from the leveraged text",
                    expected.id
                ),
            );
        }
    }

    Ok(())
}

/// Snapshot the recipient's codes, rejecting ambiguous id reuse.
///
/// The same id may legally appear as an opening/closing pair; two codes
/// with the same id and the same kind but different payloads leave nothing
/// well-defined to inherit.
fn reference_codes(recipient: &TextFragment, unit_id: &str) -> Result<Vec<Code>, EngineError> {
    let mut out: Vec<Code> = Vec::new();
    for code in recipient.codes() {
        if let Some(prior) = out.iter().find(|c| c.id == code.id && c.kind == code.kind) {
            if prior.data != code.data || prior.outer_data != code.outer_data {
                return Err(EngineError::CodeTransfer {
                    unit_id: unit_id.to_owned(),
                    reason: format!(
                        "recipient content reuses code id {} ({:?}) with conflicting payloads",
                        code.id, code.kind
                    ),
                });
            }
            continue;
        }
        out.push(code.clone());
    }
    Ok(out)
}
