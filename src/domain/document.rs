use crate::error::{PayoutError, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::net::IpAddr;
use uuid::Uuid;

use super::merchant::BankingDetails;

/// Days between creation and the projected settlement date communicated to
/// the merchant.
pub const SETTLEMENT_LEAD_DAYS: i64 = 5;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    InProgress,
    Paid,
    Skip,
    Failed,
}

impl PayoutStatus {
    /// Whether a document may move from `self` to `next`.
    ///
    /// The lifecycle is `Pending -> InProgress -> {Paid, Skip, Failed}`;
    /// `Paid`, `Skip` and `Failed` are terminal.
    pub fn can_become(self, next: PayoutStatus) -> bool {
        match self {
            PayoutStatus::Pending => next == PayoutStatus::InProgress,
            PayoutStatus::InProgress => matches!(
                next,
                PayoutStatus::Paid | PayoutStatus::Skip | PayoutStatus::Failed
            ),
            PayoutStatus::Paid | PayoutStatus::Skip | PayoutStatus::Failed => false,
        }
    }

    /// Statuses that represent an in-flight or settled payout and therefore
    /// require the merchant ledger to be recalculated when entered.
    pub fn requires_recalculation(self) -> bool {
        matches!(
            self,
            PayoutStatus::Pending | PayoutStatus::InProgress | PayoutStatus::Paid
        )
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::InProgress => "in_progress",
            PayoutStatus::Paid => "paid",
            PayoutStatus::Skip => "skip",
            PayoutStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Which party a signature slot belongs to.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SignerKind {
    Merchant,
    Psp,
}

impl SignerKind {
    /// The change source recorded when a sign URL is renewed for this
    /// signer.
    pub fn change_source(self) -> ChangeSource {
        match self {
            SignerKind::Merchant => ChangeSource::Merchant,
            SignerKind::Psp => ChangeSource::Admin,
        }
    }
}

/// Who initiated a payout document mutation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    Merchant,
    Admin,
    SignerWebhook,
}

/// Per-signer signature state. Each signer has an independent sign URL and
/// expiry; the URL lifecycle is decided purely by wall-clock comparison.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct SignerSlot {
    pub signature_id: String,
    pub sign_url: Option<String>,
    pub sign_url_expires_at: Option<DateTime<Utc>>,
    pub signed: bool,
}

impl SignerSlot {
    pub fn new(signature_id: String) -> Self {
        Self {
            signature_id,
            sign_url: None,
            sign_url_expires_at: None,
            signed: false,
        }
    }
}

/// Signature workflow state attached to a payout document.
///
/// Absent exactly for skip-status documents; fully populated before any
/// signed flag can be set.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct SignatureData {
    pub request_id: String,
    pub details_url: String,
    pub files_url: String,
    pub merchant: SignerSlot,
    pub psp: SignerSlot,
    pub signed_document_url: Option<String>,
}

impl SignatureData {
    pub fn slot(&self, kind: SignerKind) -> &SignerSlot {
        match kind {
            SignerKind::Merchant => &self.merchant,
            SignerKind::Psp => &self.psp,
        }
    }

    pub fn slot_mut(&mut self, kind: SignerKind) -> &mut SignerSlot {
        match kind {
            SignerKind::Merchant => &mut self.merchant,
            SignerKind::Psp => &mut self.psp,
        }
    }

    pub fn fully_signed(&self) -> bool {
        self.merchant.signed && self.psp.signed
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PayoutDocument {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub status: PayoutStatus,
    pub amount: Decimal,
    pub currency: String,
    /// Royalty report ids this payout settles, in period order.
    pub source_ids: Vec<Uuid>,
    pub description: String,
    /// Projected settlement date, fixed at creation time.
    pub arrival_date: DateTime<Utc>,
    /// Banking destination copied from the merchant profile at creation
    /// time; immutable thereafter.
    pub destination: BankingDetails,
    pub signature: Option<SignatureData>,
    pub transaction: Option<String>,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
    pub failure_transaction: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PayoutDocument {
    pub fn new(
        merchant_id: Uuid,
        status: PayoutStatus,
        amount: Decimal,
        currency: String,
        source_ids: Vec<Uuid>,
        description: String,
        destination: BankingDetails,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            merchant_id,
            status,
            amount,
            currency,
            source_ids,
            description,
            arrival_date: now + Duration::days(SETTLEMENT_LEAD_DAYS),
            destination,
            signature: None,
            transaction: None,
            failure_code: None,
            failure_message: None,
            failure_transaction: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn fully_signed(&self) -> bool {
        self.signature
            .as_ref()
            .map(SignatureData::fully_signed)
            .unwrap_or(false)
    }

    /// Moves the document to `next`, validating lifecycle legality.
    pub fn transition_to(&mut self, next: PayoutStatus) -> Result<()> {
        if !self.status.can_become(next) {
            return Err(PayoutError::StatusTransitionInvalid {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Applies a signer-webhook signature update. Flags left as `None`
    /// remain untouched. Returns whether the document became fully signed
    /// with this update.
    pub fn apply_signature_update(
        &mut self,
        merchant_signed: Option<bool>,
        psp_signed: Option<bool>,
        signed_document_url: Option<String>,
    ) -> Result<bool> {
        let Some(data) = self.signature.as_mut() else {
            return Err(PayoutError::InvalidPayout);
        };
        let was_fully_signed = data.fully_signed();
        if let Some(signed) = merchant_signed {
            data.merchant.signed = signed;
        }
        if let Some(signed) = psp_signed {
            data.psp.signed = signed;
        }
        if let Some(url) = signed_document_url {
            data.signed_document_url = Some(url);
        }
        Ok(!was_fully_signed && data.fully_signed())
    }

    /// Hex SHA-256 over the serialized document snapshot. Recorded in every
    /// change record so the audit trail is tamper-evident.
    pub fn content_hash(&self) -> String {
        // Struct fields serialize in declaration order, so the preimage is
        // stable for identical documents.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}

/// Append-only audit record; exactly one per accepted mutation of its
/// parent document.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PayoutDocumentChange {
    pub id: Uuid,
    pub payout_document_id: Uuid,
    pub source: ChangeSource,
    pub origin_ip: Option<IpAddr>,
    pub occurred_at: DateTime<Utc>,
    pub document_hash: String,
}

impl PayoutDocumentChange {
    pub fn for_document(
        document: &PayoutDocument,
        source: ChangeSource,
        origin_ip: Option<IpAddr>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            payout_document_id: document.id,
            source,
            origin_ip,
            occurred_at: Utc::now(),
            document_hash: document.content_hash(),
        }
    }
}
