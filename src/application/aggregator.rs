use rust_decimal::Decimal;
use tracing::error;
use uuid::Uuid;

use crate::domain::ports::RoyaltyReports;
use crate::domain::report::ReportPeriod;
use crate::error::{PayoutError, Result};

/// Validated sum of the royalty reports a payout settles.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSources {
    /// Gross payable amount before the rolling reserve is applied.
    pub total: Decimal,
    pub currency: String,
    /// Matched report ids, in period order.
    pub source_ids: Vec<Uuid>,
    /// Period windows covered, sorted by period start.
    pub periods: Vec<ReportPeriod>,
}

/// Resolves and validates the requested royalty report sources.
pub async fn aggregate(
    reports: &dyn RoyaltyReports,
    merchant_id: Uuid,
    source_ids: &[Uuid],
) -> Result<AggregatedSources> {
    if source_ids.is_empty() {
        return Err(PayoutError::NoSources);
    }

    let matched = reports
        .accepted(merchant_id, source_ids)
        .await
        .map_err(|err| {
            error!(
                operation = "payout_sources_fetch",
                collection = "royalty_report",
                merchant_id = %merchant_id,
                error = %err,
                "failed to resolve royalty report sources"
            );
            PayoutError::Storage(err)
        })?;
    if matched.is_empty() {
        return Err(PayoutError::SourcesNotFound);
    }

    let currency = matched[0].currency.clone();
    if matched.iter().any(|report| report.currency != currency) {
        return Err(PayoutError::SourcesInconsistentCurrency);
    }

    let total = matched.iter().map(|report| report.amount).sum();
    let mut periods: Vec<ReportPeriod> = matched.iter().map(|report| report.period()).collect();
    periods.sort_by_key(|period| period.from);

    Ok(AggregatedSources {
        total,
        currency,
        source_ids: matched.iter().map(|report| report.id).collect(),
        periods,
    })
}
