use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io;
use uuid::Uuid;

use crate::error::SignerError;

use super::document::{PayoutDocument, PayoutDocumentChange, PayoutStatus};
use super::merchant::{MerchantBalance, MerchantProfile};
use super::report::{ReportPeriod, RoyaltyReport};
use super::statistics::{OrdersBreakdown, PayoutStatistics, RevenueBreakdown};

/// Royalty report lookup, read-only.
#[async_trait]
pub trait RoyaltyReports: Send + Sync {
    /// Accepted reports for the merchant among the requested ids, sorted by
    /// period start.
    async fn accepted(&self, merchant_id: Uuid, ids: &[Uuid]) -> io::Result<Vec<RoyaltyReport>>;
}

/// Merchant ledger snapshot, read-only.
#[async_trait]
pub trait MerchantBalances: Send + Sync {
    async fn balance(&self, merchant_id: Uuid) -> io::Result<MerchantBalance>;
}

/// External balance recomputation, invoked when a document enters an
/// in-flight or settled status. The algorithm itself lives outside this
/// engine.
#[async_trait]
pub trait BalanceRecalculator: Send + Sync {
    async fn recalculate(&self, merchant_id: Uuid) -> io::Result<()>;
}

/// Merchant profile lookup, read-only.
#[async_trait]
pub trait MerchantProfiles: Send + Sync {
    async fn profile(&self, merchant_id: Uuid) -> io::Result<Option<MerchantProfile>>;
}

/// Per-period order analytics backing the payout statistics.
#[async_trait]
pub trait OrderAnalytics: Send + Sync {
    async fn revenue_by_country(
        &self,
        merchant_id: Uuid,
        period: &ReportPeriod,
        top: usize,
    ) -> io::Result<RevenueBreakdown>;

    async fn orders_by_item(
        &self,
        merchant_id: Uuid,
        period: &ReportPeriod,
        top: usize,
    ) -> io::Result<OrdersBreakdown>;
}

/// One party of the two-signer workflow.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct SignerParty {
    pub name: String,
    pub email: String,
}

/// Request sent to the signer collaborator when a payout document is
/// created.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SignatureRequest {
    /// Action identifier the signer tags the workflow with.
    pub action: String,
    pub document_id: Uuid,
    pub merchant_signer: SignerParty,
    pub ps_signer: SignerParty,
    pub amount: Decimal,
    pub currency: String,
    pub statistics: PayoutStatistics,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct CreatedSignature {
    pub signature_request_id: String,
    pub merchant_signature_id: String,
    pub ps_signature_id: String,
    pub details_url: String,
    pub files_url: String,
}

/// A time-boxed link allowing one party to complete their signature.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct SignUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// External e-signature service.
#[async_trait]
pub trait DocumentSigner: Send + Sync {
    async fn create_signature(
        &self,
        request: SignatureRequest,
    ) -> Result<CreatedSignature, SignerError>;

    /// Fresh sign URL for one signer, keyed by their signature id.
    async fn signature_url(&self, signature_id: &str) -> Result<SignUrl, SignerError>;
}

/// Lookup criteria for payout documents. All present fields must match.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct DocumentFilter {
    pub id: Option<Uuid>,
    pub merchant_id: Option<Uuid>,
    pub statuses: Vec<PayoutStatus>,
    pub fully_signed: Option<bool>,
}

impl DocumentFilter {
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn matches(&self, document: &PayoutDocument) -> bool {
        if let Some(id) = self.id
            && document.id != id
        {
            return false;
        }
        if let Some(merchant_id) = self.merchant_id
            && document.merchant_id != merchant_id
        {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&document.status) {
            return false;
        }
        if let Some(fully_signed) = self.fully_signed
            && document.fully_signed() != fully_signed
        {
            return false;
        }
        true
    }
}

/// Durable collection of payout documents, keyed by id.
#[async_trait]
pub trait PayoutDocumentStore: Send + Sync {
    async fn insert(&self, document: PayoutDocument) -> io::Result<()>;
    async fn update(&self, document: PayoutDocument) -> io::Result<()>;
    async fn get(&self, id: Uuid) -> io::Result<Option<PayoutDocument>>;
    /// Matching documents, newest first, paginated.
    async fn find(
        &self,
        filter: &DocumentFilter,
        limit: usize,
        offset: usize,
    ) -> io::Result<Vec<PayoutDocument>>;
    async fn count(&self, filter: &DocumentFilter) -> io::Result<usize>;
}

/// Append-only audit collection. Records are never mutated or deleted.
#[async_trait]
pub trait PayoutChangeStore: Send + Sync {
    async fn append(&self, change: PayoutDocumentChange) -> io::Result<()>;
    /// Changes for one document, oldest first.
    async fn for_document(&self, document_id: Uuid) -> io::Result<Vec<PayoutDocumentChange>>;
}

/// Single-entity document cache. Lists are never cached; documents mutate
/// frequently relative to list queries.
#[async_trait]
pub trait DocumentCache: Send + Sync {
    async fn get(&self, id: Uuid) -> io::Result<Option<PayoutDocument>>;
    async fn put(&self, document: PayoutDocument) -> io::Result<()>;
}

pub type RoyaltyReportsBox = Box<dyn RoyaltyReports>;
pub type MerchantBalancesBox = Box<dyn MerchantBalances>;
pub type BalanceRecalculatorBox = Box<dyn BalanceRecalculator>;
pub type MerchantProfilesBox = Box<dyn MerchantProfiles>;
pub type OrderAnalyticsBox = Box<dyn OrderAnalytics>;
pub type DocumentSignerBox = Box<dyn DocumentSigner>;
pub type PayoutDocumentStoreBox = Box<dyn PayoutDocumentStore>;
pub type PayoutChangeStoreBox = Box<dyn PayoutChangeStore>;
pub type DocumentCacheBox = Box<dyn DocumentCache>;
