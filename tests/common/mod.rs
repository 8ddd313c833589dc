#![allow(dead_code)]

use chrono::{Duration, Utc};
use payout_engine::application::engine::{Collaborators, CreatePayoutRequest, PayoutEngine};
use payout_engine::application::repository::DocumentRepository;
use payout_engine::application::response::Response;
use payout_engine::domain::document::PayoutDocument;
use payout_engine::domain::merchant::{BankingDetails, MerchantBalance, MerchantProfile};
use payout_engine::domain::ports::SignerParty;
use payout_engine::domain::report::{ReportStatus, RoyaltyReport};
use payout_engine::infrastructure::in_memory::{
    InMemoryChangeStore, InMemoryDocumentCache, InMemoryDocumentStore, InMemoryRoyaltyReports,
};
use payout_engine::infrastructure::offline::{
    OfflineSigner, RecordingRecalculator, StaticBalances, StaticProfiles, ZeroAnalytics,
};
use rust_decimal::Decimal;
use std::net::IpAddr;
use uuid::Uuid;

pub fn ip() -> IpAddr {
    "127.0.0.1".parse().unwrap()
}

pub fn profile(merchant_id: Uuid, min_payout: Decimal) -> MerchantProfile {
    MerchantProfile {
        id: merchant_id,
        company: "Acme Games Ltd".to_string(),
        contact_name: "Jordan Doe".to_string(),
        contact_email: "finance@acme.example".to_string(),
        currency: "USD".to_string(),
        min_payout_amount: min_payout,
        banking: BankingDetails {
            name: "First Example Bank".to_string(),
            address: "1 Bank Street".to_string(),
            account_number: "40702810001234567890".to_string(),
            swift: "EXAMPLUS".to_string(),
            correspondent_account: "30101810400000000225".to_string(),
            details: "royalty settlement".to_string(),
        },
    }
}

pub fn accepted_report(
    merchant_id: Uuid,
    amount: Decimal,
    currency: &str,
    days_ago: i64,
) -> RoyaltyReport {
    let from = Utc::now() - Duration::days(days_ago);
    RoyaltyReport {
        id: Uuid::new_v4(),
        merchant_id,
        status: ReportStatus::Accepted,
        period_from: from,
        period_to: from + Duration::days(7),
        amount,
        currency: currency.to_string(),
    }
}

pub fn balance(debit: Decimal, credit: Decimal, rolling_reserve: Decimal) -> MerchantBalance {
    MerchantBalance {
        debit,
        credit,
        rolling_reserve,
    }
}

/// Fully wired engine over in-memory infrastructure, with handles into the
/// collaborator stubs so tests can observe external calls and the audit
/// trail.
pub struct Harness {
    pub engine: PayoutEngine,
    pub merchant_id: Uuid,
    pub report_ids: Vec<Uuid>,
    pub signer: OfflineSigner,
    pub recalculator: RecordingRecalculator,
    pub changes: InMemoryChangeStore,
}

impl Harness {
    pub fn new(balance: MerchantBalance, min_payout: Decimal, specs: &[(Decimal, &str)]) -> Self {
        let merchant_id = Uuid::new_v4();
        let reports = reports_from_specs(merchant_id, specs);
        Self::build(merchant_id, reports, balance, min_payout, true)
    }

    pub fn with_reports(
        merchant_id: Uuid,
        reports: Vec<RoyaltyReport>,
        balance: MerchantBalance,
        min_payout: Decimal,
    ) -> Self {
        Self::build(merchant_id, reports, balance, min_payout, true)
    }

    /// Harness whose reports exist but whose merchant has no profile.
    pub fn without_profile(balance: MerchantBalance, specs: &[(Decimal, &str)]) -> Self {
        let merchant_id = Uuid::new_v4();
        let reports = reports_from_specs(merchant_id, specs);
        Self::build(merchant_id, reports, balance, Decimal::ZERO, false)
    }

    fn build(
        merchant_id: Uuid,
        reports: Vec<RoyaltyReport>,
        balance: MerchantBalance,
        min_payout: Decimal,
        with_profile: bool,
    ) -> Self {
        let report_ids = reports.iter().map(|r| r.id).collect();
        let signer = OfflineSigner::new();
        let recalculator = RecordingRecalculator::new();
        let changes = InMemoryChangeStore::new();
        let profiles = if with_profile {
            vec![profile(merchant_id, min_payout)]
        } else {
            Vec::new()
        };

        let repository = DocumentRepository::new(
            Box::new(InMemoryDocumentStore::new()),
            Box::new(changes.clone()),
            Box::new(InMemoryDocumentCache::new()),
        );
        let engine = PayoutEngine::new(
            Collaborators {
                reports: Box::new(InMemoryRoyaltyReports::new(reports)),
                balances: Box::new(StaticBalances::new(balance)),
                recalculator: Box::new(recalculator.clone()),
                signer: Box::new(signer.clone()),
                profiles: Box::new(StaticProfiles::new(profiles)),
                analytics: Box::new(ZeroAnalytics),
            },
            repository,
            SignerParty {
                name: "Payment Platform Operations".to_string(),
                email: "ops@platform.example".to_string(),
            },
        );

        Self {
            engine,
            merchant_id,
            report_ids,
            signer,
            recalculator,
            changes,
        }
    }

    pub async fn create(&self) -> Response<PayoutDocument> {
        self.engine
            .create_payout_document(CreatePayoutRequest {
                merchant_id: self.merchant_id,
                source_ids: self.report_ids.clone(),
                description: "royalty payout".to_string(),
                ip: ip(),
            })
            .await
    }
}

fn reports_from_specs(merchant_id: Uuid, specs: &[(Decimal, &str)]) -> Vec<RoyaltyReport> {
    specs
        .iter()
        .enumerate()
        .map(|(i, (amount, currency))| {
            accepted_report(merchant_id, *amount, currency, 7 * (specs.len() - i) as i64)
        })
        .collect()
}
