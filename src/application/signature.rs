use chrono::Utc;
use std::net::IpAddr;
use tracing::error;

use crate::domain::document::{PayoutDocument, SignatureData, SignerKind, SignerSlot};
use crate::domain::ports::{DocumentSigner, SignUrl, SignatureRequest, SignerParty};
use crate::domain::statistics::PayoutStatistics;
use crate::error::{PayoutError, Result};

use super::repository::DocumentRepository;

/// Action identifier the signer collaborator tags payout workflows with.
pub const SIGNATURE_ACTION: &str = "payout_document";

/// Issues the two-signer workflow for a freshly assembled payout document.
/// The statistics travel as request metadata so both parties sign against
/// the same supporting documentation.
pub async fn create_workflow(
    signer: &dyn DocumentSigner,
    merchant_signer: SignerParty,
    platform_signer: SignerParty,
    document: &PayoutDocument,
    statistics: PayoutStatistics,
) -> Result<SignatureData> {
    let request = SignatureRequest {
        action: SIGNATURE_ACTION.to_string(),
        document_id: document.id,
        merchant_signer,
        ps_signer: platform_signer,
        amount: document.amount,
        currency: document.currency.clone(),
        statistics,
    };

    let created = signer.create_signature(request).await.map_err(|err| {
        error!(
            operation = "payout_signature_create",
            service = "document_signer",
            document_id = %document.id,
            error = %err,
            "signature workflow creation failed"
        );
        PayoutError::SignatureCreationFailed(err)
    })?;

    Ok(SignatureData {
        request_id: created.signature_request_id,
        details_url: created.details_url,
        files_url: created.files_url,
        merchant: SignerSlot::new(created.merchant_signature_id),
        psp: SignerSlot::new(created.ps_signature_id),
        signed_document_url: None,
    })
}

/// Returns the signer's sign URL, renewing it through the collaborator only
/// when the stored one has expired.
///
/// The fast path makes no external call: two requests inside the validity
/// window return the identical URL and expiry. Renewal persists the new URL
/// through the repository, tagged with the merchant or admin change source
/// depending on the signer.
pub async fn sign_url(
    signer: &dyn DocumentSigner,
    repository: &DocumentRepository,
    document: &mut PayoutDocument,
    kind: SignerKind,
    ip: IpAddr,
) -> Result<SignUrl> {
    let signature_id = {
        let Some(data) = document.signature.as_ref() else {
            return Err(PayoutError::InvalidPayout);
        };
        let slot = data.slot(kind);
        if slot.signed {
            return Err(PayoutError::SignatureAlreadySigned);
        }
        if let (Some(url), Some(expires_at)) = (slot.sign_url.clone(), slot.sign_url_expires_at)
            && expires_at > Utc::now()
        {
            return Ok(SignUrl { url, expires_at });
        }
        slot.signature_id.clone()
    };

    let fresh = signer.signature_url(&signature_id).await.map_err(|err| {
        error!(
            operation = "payout_sign_url_renew",
            service = "document_signer",
            document_id = %document.id,
            signature_id = %signature_id,
            error = %err,
            "sign url renewal failed"
        );
        PayoutError::SignatureCreationFailed(err)
    })?;

    if let Some(data) = document.signature.as_mut() {
        let slot = data.slot_mut(kind);
        slot.sign_url = Some(fresh.url.clone());
        slot.sign_url_expires_at = Some(fresh.expires_at);
    }
    repository
        .update(document, Some(ip), kind.change_source())
        .await?;

    Ok(fresh)
}
