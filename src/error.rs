use crate::domain::document::PayoutStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PayoutError>;

/// Error returned by the document signer collaborator.
///
/// `Business` carries the signer's own structured code and message and is
/// proxied to callers unchanged. `Transport` covers everything else and is
/// mapped to a generic system failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("{message}")]
    Business { code: String, message: String },
    #[error("signer transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum PayoutError {
    // Validation
    #[error("no payout sources provided")]
    NoSources,
    #[error("payout sources use more than one currency")]
    SourcesInconsistentCurrency,
    #[error("payout amount is invalid")]
    AmountInvalid,
    #[error("merchant balance is insufficient for the requested payout")]
    InsufficientBalance,
    #[error("payout status cannot change from {from} to {to}")]
    StatusTransitionInvalid {
        from: PayoutStatus,
        to: PayoutStatus,
    },

    // Not found
    #[error("payout document not found")]
    PayoutNotFound,
    #[error("payout sources not found")]
    SourcesNotFound,
    #[error("merchant not found")]
    MerchantNotFound,

    // State
    #[error("signer has already signed this payout document")]
    SignatureAlreadySigned,
    #[error("payout document has no signature data")]
    InvalidPayout,

    // Dependency
    #[error("failed to fetch merchant balance")]
    BalanceFetchFailed(#[source] std::io::Error),
    #[error("net revenue calculation failed")]
    NetRevenueCalculationFailed(#[source] std::io::Error),
    #[error("order statistics calculation failed")]
    OrderStatCalculationFailed(#[source] std::io::Error),
    #[error("signature workflow request failed: {0}")]
    SignatureCreationFailed(#[source] SignerError),

    // System
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("balance recalculation failed")]
    RecalculationFailed(#[source] std::io::Error),
}
