use std::net::IpAddr;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::document::{ChangeSource, PayoutDocument, PayoutStatus, SignerKind};
use crate::domain::ports::{
    BalanceRecalculatorBox, DocumentFilter, DocumentSignerBox, MerchantBalancesBox,
    MerchantProfilesBox, OrderAnalyticsBox, RoyaltyReportsBox, SignUrl, SignerParty,
};
use crate::error::{PayoutError, Result};

use super::repository::{DocumentPage, DocumentRepository};
use super::response::Response;
use super::transition::{Correction, apply_correction};
use super::{aggregator, governance, signature, statistics};

/// Handles to every external collaborator the engine consumes, constructed
/// once at composition time and injected by reference.
pub struct Collaborators {
    pub reports: RoyaltyReportsBox,
    pub balances: MerchantBalancesBox,
    pub recalculator: BalanceRecalculatorBox,
    pub signer: DocumentSignerBox,
    pub profiles: MerchantProfilesBox,
    pub analytics: OrderAnalyticsBox,
}

#[derive(Debug, Clone)]
pub struct CreatePayoutRequest {
    pub merchant_id: Uuid,
    pub source_ids: Vec<Uuid>,
    pub description: String,
    pub ip: IpAddr,
}

/// The payout document engine.
///
/// Stateless between calls: all state lives in the repository and the
/// collaborators, so concurrent requests against different documents need
/// no coordination. The check-balance-then-insert sequence in creation is
/// intentionally unguarded for a single merchant (see DESIGN.md).
pub struct PayoutEngine {
    collaborators: Collaborators,
    repository: DocumentRepository,
    platform_signer: SignerParty,
}

impl PayoutEngine {
    pub fn new(
        collaborators: Collaborators,
        repository: DocumentRepository,
        platform_signer: SignerParty,
    ) -> Self {
        Self {
            collaborators,
            repository,
            platform_signer,
        }
    }

    /// Aggregates the requested royalty reports into a payable document,
    /// checks the merchant ledger, attaches supporting statistics and the
    /// two-signer workflow, and persists the result.
    pub async fn create_payout_document(
        &self,
        request: CreatePayoutRequest,
    ) -> Response<PayoutDocument> {
        match self.create_inner(request).await {
            Ok(document) => Response::ok(document),
            Err(err) => Response::from_error(&err),
        }
    }

    async fn create_inner(&self, request: CreatePayoutRequest) -> Result<PayoutDocument> {
        let sources = aggregator::aggregate(
            self.collaborators.reports.as_ref(),
            request.merchant_id,
            &request.source_ids,
        )
        .await?;

        let profile = self
            .collaborators
            .profiles
            .profile(request.merchant_id)
            .await
            .map_err(|err| {
                error!(
                    operation = "payout_merchant_fetch",
                    collection = "merchant",
                    merchant_id = %request.merchant_id,
                    error = %err,
                    "failed to fetch merchant profile"
                );
                PayoutError::Storage(err)
            })?
            .ok_or(PayoutError::MerchantNotFound)?;

        let assessment = governance::assess(
            self.collaborators.balances.as_ref(),
            request.merchant_id,
            sources.total,
            profile.min_payout_amount,
        )
        .await?;

        let status = if assessment.below_minimum {
            PayoutStatus::Skip
        } else {
            PayoutStatus::Pending
        };
        let mut document = PayoutDocument::new(
            request.merchant_id,
            status,
            assessment.net,
            sources.currency,
            sources.source_ids,
            request.description,
            profile.banking.clone(),
        );

        // Skip documents exist purely for accounting continuity: no
        // statistics, no signature workflow.
        if status == PayoutStatus::Pending {
            let stats = statistics::collect(
                self.collaborators.analytics.as_ref(),
                request.merchant_id,
                &sources.periods,
            )
            .await?;
            let merchant_signer = SignerParty {
                name: profile.contact_name.clone(),
                email: profile.contact_email.clone(),
            };
            let data = signature::create_workflow(
                self.collaborators.signer.as_ref(),
                merchant_signer,
                self.platform_signer.clone(),
                &document,
                stats,
            )
            .await?;
            document.signature = Some(data);
        }

        self.repository
            .insert(&document, Some(request.ip), ChangeSource::Merchant)
            .await?;
        info!(
            document_id = %document.id,
            merchant_id = %document.merchant_id,
            amount = %document.amount,
            status = %document.status,
            "payout document created"
        );
        Ok(document)
    }

    /// Signer-webhook entry point: updates the signed flags and the signed
    /// document URL. The first update that makes the document fully signed
    /// triggers exactly one balance recalculation.
    pub async fn update_payout_document_signatures(
        &self,
        id: Uuid,
        merchant_signed: Option<bool>,
        psp_signed: Option<bool>,
        signed_document_url: Option<String>,
    ) -> Response<PayoutDocument> {
        let result = self
            .update_signatures_inner(id, merchant_signed, psp_signed, signed_document_url)
            .await;
        match result {
            Ok(document) => Response::ok(document),
            Err(err) => Response::from_error(&err),
        }
    }

    async fn update_signatures_inner(
        &self,
        id: Uuid,
        merchant_signed: Option<bool>,
        psp_signed: Option<bool>,
        signed_document_url: Option<String>,
    ) -> Result<PayoutDocument> {
        let mut document = self
            .repository
            .by_id(id)
            .await?
            .ok_or(PayoutError::PayoutNotFound)?;
        let newly_fully_signed =
            document.apply_signature_update(merchant_signed, psp_signed, signed_document_url)?;

        // The webhook carries no caller address; the change record keeps an
        // empty origin.
        self.repository
            .update(&mut document, None, ChangeSource::SignerWebhook)
            .await?;

        if newly_fully_signed {
            self.recalculate(document.merchant_id).await?;
        }
        Ok(document)
    }

    /// Administrative correction of status, transaction reference and
    /// failure details. A correction with no differing field is a no-op
    /// that writes no audit record.
    pub async fn update_payout_document(
        &self,
        id: Uuid,
        correction: Correction,
        ip: IpAddr,
    ) -> Response<PayoutDocument> {
        match self.update_inner(id, correction, ip).await {
            Ok((document, true)) => Response::ok(document),
            Ok((document, false)) => Response::not_modified(document),
            Err(err) => Response::from_error(&err),
        }
    }

    async fn update_inner(
        &self,
        id: Uuid,
        correction: Correction,
        ip: IpAddr,
    ) -> Result<(PayoutDocument, bool)> {
        let mut document = self
            .repository
            .by_id(id)
            .await?
            .ok_or(PayoutError::PayoutNotFound)?;

        let Some(applied) = apply_correction(&mut document, &correction)? else {
            return Ok((document, false));
        };

        self.repository
            .update(&mut document, Some(ip), ChangeSource::Admin)
            .await?;
        if applied.recompute {
            self.recalculate(document.merchant_id).await?;
        }
        Ok((document, true))
    }

    /// Paginated lookup by id or by merchant / status / fully-signed
    /// criteria. Zero matches is an explicit not-found, not an empty page.
    pub async fn get_payout_documents(
        &self,
        filter: DocumentFilter,
        limit: usize,
        offset: usize,
    ) -> Response<DocumentPage> {
        match self.repository.find(&filter, limit, offset).await {
            Ok(page) if page.total == 0 => Response::from_error(&PayoutError::PayoutNotFound),
            Ok(page) => Response::ok(page),
            Err(err) => Response::from_error(&err),
        }
    }

    /// Signer-specific sign URL, renewed through the signer collaborator
    /// only when the stored URL has expired.
    pub async fn get_payout_document_sign_url(
        &self,
        id: Uuid,
        signer: SignerKind,
        ip: IpAddr,
    ) -> Response<SignUrl> {
        match self.sign_url_inner(id, signer, ip).await {
            Ok(url) => Response::ok(url),
            Err(err) => Response::from_error(&err),
        }
    }

    async fn sign_url_inner(&self, id: Uuid, signer: SignerKind, ip: IpAddr) -> Result<SignUrl> {
        let mut document = self
            .repository
            .by_id(id)
            .await?
            .ok_or(PayoutError::PayoutNotFound)?;
        signature::sign_url(
            self.collaborators.signer.as_ref(),
            &self.repository,
            &mut document,
            signer,
            ip,
        )
        .await
    }

    async fn recalculate(&self, merchant_id: Uuid) -> Result<()> {
        self.collaborators
            .recalculator
            .recalculate(merchant_id)
            .await
            .map_err(|err| {
                error!(
                    operation = "payout_balance_recalculate",
                    service = "balance_recalculator",
                    merchant_id = %merchant_id,
                    error = %err,
                    "balance recalculation failed after payout mutation"
                );
                PayoutError::RecalculationFailed(err)
            })
    }
}
