use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payout_engine::application::engine::{Collaborators, CreatePayoutRequest, PayoutEngine};
use payout_engine::application::repository::DocumentRepository;
use payout_engine::domain::merchant::{MerchantBalance, MerchantProfile};
use payout_engine::domain::ports::SignerParty;
use payout_engine::infrastructure::in_memory::{
    InMemoryChangeStore, InMemoryDocumentCache, InMemoryDocumentStore, InMemoryRoyaltyReports,
};
use payout_engine::infrastructure::offline::{
    OfflineSigner, RecordingRecalculator, StaticBalances, StaticProfiles, ZeroAnalytics,
};
use payout_engine::interfaces::csv::report_reader::ReportReader;
use serde::Deserialize;
use std::fs::File;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Payout dry-run tool: replays royalty report fixtures through the payout
/// document engine and prints the resulting response envelope.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Royalty report fixture CSV
    #[arg(long)]
    reports: PathBuf,

    /// Merchant profile + balance snapshot fixture JSON
    #[arg(long)]
    merchant: PathBuf,

    /// Description attached to the payout document
    #[arg(long, default_value = "royalty payout")]
    description: String,

    /// Platform-side signer name
    #[arg(long, default_value = "Payment Platform Operations")]
    platform_name: String,

    /// Platform-side signer email
    #[arg(long, default_value = "ops@platform.example")]
    platform_email: String,

    /// Path to persistent database (requires the storage-rocksdb feature).
    /// If omitted, documents live in memory for the run.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

/// Fixture shape for `--merchant`.
#[derive(Deserialize)]
struct MerchantFixture {
    profile: MerchantProfile,
    balance: MerchantBalance,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let merchant_file = File::open(&cli.merchant).into_diagnostic()?;
    let fixture: MerchantFixture = serde_json::from_reader(merchant_file).into_diagnostic()?;
    let merchant_id = fixture.profile.id;

    let reports_file = File::open(&cli.reports).into_diagnostic()?;
    let mut reports = Vec::new();
    for report in ReportReader::new(reports_file).reports() {
        match report {
            Ok(report) => reports.push(report),
            Err(e) => eprintln!("Error reading royalty report: {e}"),
        }
    }
    let source_ids: Vec<_> = reports.iter().map(|report| report.id).collect();

    let repository = build_repository(&cli)?;
    let engine = PayoutEngine::new(
        Collaborators {
            reports: Box::new(InMemoryRoyaltyReports::new(reports)),
            balances: Box::new(StaticBalances::new(fixture.balance)),
            recalculator: Box::new(RecordingRecalculator::new()),
            signer: Box::new(OfflineSigner::new()),
            profiles: Box::new(StaticProfiles::new(vec![fixture.profile])),
            analytics: Box::new(ZeroAnalytics),
        },
        repository,
        SignerParty {
            name: cli.platform_name.clone(),
            email: cli.platform_email.clone(),
        },
    );

    let response = engine
        .create_payout_document(CreatePayoutRequest {
            merchant_id,
            source_ids,
            description: cli.description.clone(),
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        })
        .await;

    println!(
        "{}",
        serde_json::to_string_pretty(&response).into_diagnostic()?
    );
    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn build_repository(cli: &Cli) -> Result<DocumentRepository> {
    use payout_engine::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = &cli.db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        Ok(DocumentRepository::new(
            Box::new(store.clone()),
            Box::new(store),
            Box::new(InMemoryDocumentCache::new()),
        ))
    } else {
        Ok(in_memory_repository())
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn build_repository(cli: &Cli) -> Result<DocumentRepository> {
    if cli.db_path.is_some() {
        return Err(miette::miette!(
            "--db-path requires building with --features storage-rocksdb"
        ));
    }
    Ok(in_memory_repository())
}

fn in_memory_repository() -> DocumentRepository {
    DocumentRepository::new(
        Box::new(InMemoryDocumentStore::new()),
        Box::new(InMemoryChangeStore::new()),
        Box::new(InMemoryDocumentCache::new()),
    )
}
