use crate::domain::document::{PayoutDocument, PayoutStatus};
use crate::error::Result;

/// Administrative correction of a payout document. Every field is optional;
/// only values that differ from the current document are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Correction {
    pub status: Option<PayoutStatus>,
    pub transaction: Option<String>,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
    pub failure_transaction: Option<String>,
}

/// Result of an applied correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// The status change landed in an in-flight or settled status, so the
    /// merchant ledger must be recalculated.
    pub recompute: bool,
}

fn differs(current: &Option<String>, candidate: &Option<String>) -> bool {
    matches!(candidate, Some(value) if current.as_ref() != Some(value))
}

/// Applies the subset of `correction` that differs from the document.
///
/// Returns `None` when nothing differs: the operation is a no-op and must
/// not be persisted or audited. A differing status is validated against the
/// lifecycle before anything is mutated. Failure detail fields are settable
/// independently of status and do not constitute a transition on their own.
pub fn apply_correction(
    document: &mut PayoutDocument,
    correction: &Correction,
) -> Result<Option<Applied>> {
    let status_change = correction.status.filter(|next| *next != document.status);
    let modified = status_change.is_some()
        || differs(&document.transaction, &correction.transaction)
        || differs(&document.failure_code, &correction.failure_code)
        || differs(&document.failure_message, &correction.failure_message)
        || differs(&document.failure_transaction, &correction.failure_transaction);
    if !modified {
        return Ok(None);
    }

    if let Some(next) = status_change {
        document.transition_to(next)?;
    }
    if differs(&document.transaction, &correction.transaction) {
        document.transaction = correction.transaction.clone();
    }
    if differs(&document.failure_code, &correction.failure_code) {
        document.failure_code = correction.failure_code.clone();
    }
    if differs(&document.failure_message, &correction.failure_message) {
        document.failure_message = correction.failure_message.clone();
    }
    if differs(&document.failure_transaction, &correction.failure_transaction) {
        document.failure_transaction = correction.failure_transaction.clone();
    }

    Ok(Some(Applied {
        recompute: status_change.is_some_and(PayoutStatus::requires_recalculation),
    }))
}
