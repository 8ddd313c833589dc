//! Deterministic collaborator implementations for dry runs and tests.
//!
//! The dry-run binary wires these in place of the real balance, signer and
//! analytics services; the integration tests use their call counters to
//! assert how often the engine actually reaches out.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::merchant::{MerchantBalance, MerchantProfile};
use crate::domain::ports::{
    BalanceRecalculator, CreatedSignature, DocumentSigner, MerchantBalances, MerchantProfiles,
    OrderAnalytics, SignUrl, SignatureRequest,
};
use crate::domain::report::ReportPeriod;
use crate::domain::statistics::{OrdersBreakdown, RevenueBreakdown};
use crate::error::SignerError;

/// Signer that fabricates signature ids and sign URLs locally.
#[derive(Clone)]
pub struct OfflineSigner {
    url_ttl: Duration,
    create_calls: Arc<AtomicUsize>,
    url_calls: Arc<AtomicUsize>,
    issued: Arc<AtomicUsize>,
    signed: Arc<RwLock<HashSet<String>>>,
}

impl OfflineSigner {
    pub fn new() -> Self {
        Self::with_url_ttl(Duration::hours(1))
    }

    pub fn with_url_ttl(url_ttl: Duration) -> Self {
        Self {
            url_ttl,
            create_calls: Arc::new(AtomicUsize::new(0)),
            url_calls: Arc::new(AtomicUsize::new(0)),
            issued: Arc::new(AtomicUsize::new(0)),
            signed: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn url_calls(&self) -> usize {
        self.url_calls.load(Ordering::SeqCst)
    }

    /// Marks a signature id as completed on the signer side, so the next
    /// URL request for it fails with the signer's own business error.
    pub async fn mark_signed(&self, signature_id: &str) {
        let mut signed = self.signed.write().await;
        signed.insert(signature_id.to_string());
    }
}

impl Default for OfflineSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentSigner for OfflineSigner {
    async fn create_signature(
        &self,
        request: SignatureRequest,
    ) -> Result<CreatedSignature, SignerError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedSignature {
            signature_request_id: format!("req-{}", request.document_id),
            merchant_signature_id: format!("sig-m-{}", request.document_id),
            ps_signature_id: format!("sig-p-{}", request.document_id),
            details_url: format!("https://sign.example/requests/{}", request.document_id),
            files_url: format!("https://sign.example/requests/{}/files", request.document_id),
        })
    }

    async fn signature_url(&self, signature_id: &str) -> Result<SignUrl, SignerError> {
        let signed = self.signed.read().await;
        if signed.contains(signature_id) {
            return Err(SignerError::Business {
                code: "already_signed".to_string(),
                message: "signature request already signed".to_string(),
            });
        }
        self.url_calls.fetch_add(1, Ordering::SeqCst);
        let serial = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(SignUrl {
            url: format!("https://sign.example/sign/{signature_id}/{serial}"),
            expires_at: Utc::now() + self.url_ttl,
        })
    }
}

/// Balance provider answering from one fixed ledger snapshot.
#[derive(Clone)]
pub struct StaticBalances {
    balance: Option<MerchantBalance>,
}

impl StaticBalances {
    pub fn new(balance: MerchantBalance) -> Self {
        Self {
            balance: Some(balance),
        }
    }

    /// Provider whose fetch always fails, for dependency-error paths.
    pub fn unavailable() -> Self {
        Self { balance: None }
    }
}

#[async_trait]
impl MerchantBalances for StaticBalances {
    async fn balance(&self, _merchant_id: Uuid) -> io::Result<MerchantBalance> {
        self.balance
            .ok_or_else(|| io::Error::other("balance service unavailable"))
    }
}

/// Recalculator that only counts invocations.
#[derive(Default, Clone)]
pub struct RecordingRecalculator {
    calls: Arc<AtomicUsize>,
}

impl RecordingRecalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceRecalculator for RecordingRecalculator {
    async fn recalculate(&self, _merchant_id: Uuid) -> io::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Profile lookup over a fixed set of merchants.
#[derive(Default, Clone)]
pub struct StaticProfiles {
    profiles: Arc<HashMap<Uuid, MerchantProfile>>,
}

impl StaticProfiles {
    pub fn new(profiles: Vec<MerchantProfile>) -> Self {
        Self {
            profiles: Arc::new(profiles.into_iter().map(|p| (p.id, p)).collect()),
        }
    }
}

#[async_trait]
impl MerchantProfiles for StaticProfiles {
    async fn profile(&self, merchant_id: Uuid) -> io::Result<Option<MerchantProfile>> {
        Ok(self.profiles.get(&merchant_id).cloned())
    }
}

/// Analytics stub reporting empty breakdowns for every period.
#[derive(Default, Clone, Copy)]
pub struct ZeroAnalytics;

#[async_trait]
impl OrderAnalytics for ZeroAnalytics {
    async fn revenue_by_country(
        &self,
        _merchant_id: Uuid,
        _period: &ReportPeriod,
        _top: usize,
    ) -> io::Result<RevenueBreakdown> {
        Ok(RevenueBreakdown::default())
    }

    async fn orders_by_item(
        &self,
        _merchant_id: Uuid,
        _period: &ReportPeriod,
        _top: usize,
    ) -> io::Result<OrdersBreakdown> {
        Ok(OrdersBreakdown::default())
    }
}
