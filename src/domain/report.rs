use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    New,
    Accepted,
    Declined,
}

/// Accepted, period-bounded statement of amounts owed to a merchant; the
/// raw input to a payout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RoyaltyReport {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub status: ReportStatus,
    pub period_from: DateTime<Utc>,
    pub period_to: DateTime<Utc>,
    pub amount: Decimal,
    pub currency: String,
}

impl RoyaltyReport {
    pub fn period(&self) -> ReportPeriod {
        ReportPeriod {
            from: self.period_from,
            to: self.period_to,
        }
    }
}

/// A reporting window a payout settles, used to scope the supporting
/// statistics.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct ReportPeriod {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}
