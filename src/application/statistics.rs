use tracing::error;
use uuid::Uuid;

use crate::domain::ports::OrderAnalytics;
use crate::domain::report::ReportPeriod;
use crate::domain::statistics::{PayoutStatistics, PeriodOrders, PeriodRevenue, STATISTICS_TOP_N};
use crate::error::{PayoutError, Result};

/// Computes the per-period revenue and order breakdowns that document a
/// payout. Failure of either computation is fatal to document creation.
pub async fn collect(
    analytics: &dyn OrderAnalytics,
    merchant_id: Uuid,
    periods: &[ReportPeriod],
) -> Result<PayoutStatistics> {
    let mut statistics = PayoutStatistics::default();

    for period in periods {
        let revenue = analytics
            .revenue_by_country(merchant_id, period, STATISTICS_TOP_N)
            .await
            .map_err(|err| {
                error!(
                    operation = "payout_statistics_revenue",
                    service = "order_analytics",
                    merchant_id = %merchant_id,
                    period_from = %period.from,
                    error = %err,
                    "net revenue breakdown failed"
                );
                PayoutError::NetRevenueCalculationFailed(err)
            })?;
        statistics.revenue.push(PeriodRevenue {
            period: *period,
            top_countries: revenue.top_countries,
            total: revenue.total,
        });

        let orders = analytics
            .orders_by_item(merchant_id, period, STATISTICS_TOP_N)
            .await
            .map_err(|err| {
                error!(
                    operation = "payout_statistics_orders",
                    service = "order_analytics",
                    merchant_id = %merchant_id,
                    period_from = %period.from,
                    error = %err,
                    "order count breakdown failed"
                );
                PayoutError::OrderStatCalculationFailed(err)
            })?;
        statistics.orders.push(PeriodOrders {
            period: *period,
            top_items: orders.top_items,
            total: orders.total,
        });
    }

    Ok(statistics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::statistics::{OrdersBreakdown, RevenueBreakdown};
    use crate::infrastructure::offline::ZeroAnalytics;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::io;

    struct FailingAnalytics {
        fail_revenue: bool,
    }

    #[async_trait]
    impl OrderAnalytics for FailingAnalytics {
        async fn revenue_by_country(
            &self,
            _merchant_id: Uuid,
            _period: &ReportPeriod,
            _top: usize,
        ) -> io::Result<RevenueBreakdown> {
            if self.fail_revenue {
                Err(io::Error::other("aggregation timed out"))
            } else {
                Ok(RevenueBreakdown::default())
            }
        }

        async fn orders_by_item(
            &self,
            _merchant_id: Uuid,
            _period: &ReportPeriod,
            _top: usize,
        ) -> io::Result<OrdersBreakdown> {
            Err(io::Error::other("aggregation timed out"))
        }
    }

    fn period() -> ReportPeriod {
        let from = Utc::now() - Duration::days(7);
        ReportPeriod {
            from,
            to: from + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn test_one_entry_per_period() {
        let analytics = ZeroAnalytics;
        let periods = vec![period(), period()];
        let statistics = collect(&analytics, Uuid::new_v4(), &periods).await.unwrap();
        assert_eq!(statistics.revenue.len(), 2);
        assert_eq!(statistics.orders.len(), 2);
    }

    #[tokio::test]
    async fn test_revenue_failure_is_fatal() {
        let analytics = FailingAnalytics { fail_revenue: true };
        let result = collect(&analytics, Uuid::new_v4(), &[period()]).await;
        assert!(matches!(
            result,
            Err(PayoutError::NetRevenueCalculationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_order_failure_is_fatal() {
        let analytics = FailingAnalytics {
            fail_revenue: false,
        };
        let result = collect(&analytics, Uuid::new_v4(), &[period()]).await;
        assert!(matches!(
            result,
            Err(PayoutError::OrderStatCalculationFailed(_))
        ));
    }
}
