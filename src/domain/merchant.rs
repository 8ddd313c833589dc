use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Banking destination for a payout. Copied into each payout document at
/// creation time so later profile edits never affect issued documents.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct BankingDetails {
    pub name: String,
    pub address: String,
    pub account_number: String,
    pub swift: String,
    pub correspondent_account: String,
    pub details: String,
}

/// Merchant record as exposed by the profile collaborator.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MerchantProfile {
    pub id: Uuid,
    pub company: String,
    /// Authorized signatory for the e-signature workflow.
    pub contact_name: String,
    pub contact_email: String,
    pub currency: String,
    /// Payouts below this net amount are persisted as skip documents.
    pub min_payout_amount: Decimal,
    pub banking: BankingDetails,
}

/// Ledger snapshot returned by the balance collaborator.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
pub struct MerchantBalance {
    pub debit: Decimal,
    pub credit: Decimal,
    /// May be negative, representing a reserve release back to the
    /// merchant.
    pub rolling_reserve: Decimal,
}

impl MerchantBalance {
    pub fn available(&self) -> Decimal {
        self.debit - self.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_available_balance() {
        let balance = MerchantBalance {
            debit: dec!(500),
            credit: dec!(120),
            rolling_reserve: dec!(30),
        };
        assert_eq!(balance.available(), dec!(380));
    }
}
