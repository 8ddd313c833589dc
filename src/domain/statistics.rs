use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::report::ReportPeriod;

/// How many countries / items the per-period breakdowns keep.
pub const STATISTICS_TOP_N: usize = 10;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CountryRevenue {
    pub country: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ItemOrders {
    pub item: String,
    pub orders: u64,
}

/// Net revenue breakdown for one period window, as returned by the
/// analytics collaborator.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct RevenueBreakdown {
    pub top_countries: Vec<CountryRevenue>,
    pub total: Decimal,
}

/// Order count breakdown for one period window.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct OrdersBreakdown {
    pub top_items: Vec<ItemOrders>,
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PeriodRevenue {
    pub period: ReportPeriod,
    pub top_countries: Vec<CountryRevenue>,
    pub total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PeriodOrders {
    pub period: ReportPeriod,
    pub top_items: Vec<ItemOrders>,
    pub total: u64,
}

/// Supporting documentation embedded as metadata in the signature request.
/// A payout is never created without it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct PayoutStatistics {
    pub revenue: Vec<PeriodRevenue>,
    pub orders: Vec<PeriodOrders>,
}
