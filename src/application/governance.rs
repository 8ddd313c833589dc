use rust_decimal::Decimal;
use tracing::error;
use uuid::Uuid;

use crate::domain::ports::MerchantBalances;
use crate::error::{PayoutError, Result};

/// Outcome of the payability check for one aggregated payout amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceAssessment {
    pub gross: Decimal,
    /// Payable amount after the rolling reserve is applied.
    pub net: Decimal,
    /// Below the merchant's minimum payout threshold: the document is still
    /// created, as a skip document, for accounting continuity.
    pub below_minimum: bool,
}

/// Fetches the merchant ledger snapshot and enforces the payability
/// invariants.
pub async fn assess(
    balances: &dyn MerchantBalances,
    merchant_id: Uuid,
    gross: Decimal,
    min_payout_amount: Decimal,
) -> Result<BalanceAssessment> {
    let balance = balances.balance(merchant_id).await.map_err(|err| {
        error!(
            operation = "payout_balance_fetch",
            service = "merchant_balance",
            merchant_id = %merchant_id,
            error = %err,
            "failed to fetch merchant balance"
        );
        PayoutError::BalanceFetchFailed(err)
    })?;

    if gross > balance.available() {
        return Err(PayoutError::InsufficientBalance);
    }

    // A negative rolling reserve is a reserve release and increases the
    // payable amount.
    let net = gross - balance.rolling_reserve;
    if net <= Decimal::ZERO {
        return Err(PayoutError::AmountInvalid);
    }

    Ok(BalanceAssessment {
        gross,
        net,
        below_minimum: net < min_payout_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::merchant::MerchantBalance;
    use crate::infrastructure::offline::StaticBalances;
    use rust_decimal_macros::dec;

    fn balances(debit: Decimal, credit: Decimal, reserve: Decimal) -> StaticBalances {
        StaticBalances::new(MerchantBalance {
            debit,
            credit,
            rolling_reserve: reserve,
        })
    }

    #[tokio::test]
    async fn test_insufficient_balance() {
        let port = balances(dec!(100), dec!(20), dec!(0));
        let result = assess(&port, Uuid::new_v4(), dec!(100), dec!(10)).await;
        assert!(matches!(result, Err(PayoutError::InsufficientBalance)));
    }

    #[tokio::test]
    async fn test_reserve_reduces_net() {
        let port = balances(dec!(500), dec!(0), dec!(20));
        let assessment = assess(&port, Uuid::new_v4(), dec!(150), dec!(50))
            .await
            .unwrap();
        assert_eq!(assessment.net, dec!(130));
        assert!(!assessment.below_minimum);
    }

    #[tokio::test]
    async fn test_negative_reserve_is_a_release() {
        let port = balances(dec!(500), dec!(0), dec!(-25));
        let assessment = assess(&port, Uuid::new_v4(), dec!(100), dec!(50))
            .await
            .unwrap();
        assert_eq!(assessment.net, dec!(125));
    }

    #[tokio::test]
    async fn test_non_positive_net_fails() {
        let port = balances(dec!(500), dec!(0), dec!(100));
        let result = assess(&port, Uuid::new_v4(), dec!(100), dec!(10)).await;
        assert!(matches!(result, Err(PayoutError::AmountInvalid)));
    }

    #[tokio::test]
    async fn test_below_minimum_flag() {
        let port = balances(dec!(500), dec!(0), dec!(0));
        let assessment = assess(&port, Uuid::new_v4(), dec!(30), dec!(50))
            .await
            .unwrap();
        assert_eq!(assessment.net, dec!(30));
        assert!(assessment.below_minimum);
    }
}
