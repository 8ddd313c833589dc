use serde::Serialize;

use crate::error::{PayoutError, SignerError};

/// Envelope status for every public engine operation. Business-rule
/// violations surface here, never as panics or raw faults.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    NotModified,
    BadData,
    NotFound,
    System,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Response<T> {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
}

impl<T> Response<T> {
    pub fn ok(item: T) -> Self {
        Self {
            status: ResponseStatus::Ok,
            message: None,
            item: Some(item),
        }
    }

    /// A no-op mutation: the unchanged document travels back with the
    /// not-modified marker.
    pub fn not_modified(item: T) -> Self {
        Self {
            status: ResponseStatus::NotModified,
            message: Some("payout document not modified".to_string()),
            item: Some(item),
        }
    }

    pub fn from_error(error: &PayoutError) -> Self {
        let (status, message) = classify(error);
        Self {
            status,
            message: Some(message),
            item: None,
        }
    }
}

fn classify(error: &PayoutError) -> (ResponseStatus, String) {
    match error {
        PayoutError::NoSources
        | PayoutError::SourcesInconsistentCurrency
        | PayoutError::AmountInvalid
        | PayoutError::InsufficientBalance
        | PayoutError::StatusTransitionInvalid { .. }
        | PayoutError::SignatureAlreadySigned
        | PayoutError::InvalidPayout => (ResponseStatus::BadData, error.to_string()),

        PayoutError::PayoutNotFound
        | PayoutError::SourcesNotFound
        | PayoutError::MerchantNotFound => (ResponseStatus::NotFound, error.to_string()),

        // The signer's own structured business error is proxied through
        // unchanged; everything else degrades to a generic system failure.
        PayoutError::SignatureCreationFailed(SignerError::Business { message, .. }) => {
            (ResponseStatus::BadData, message.clone())
        }

        PayoutError::SignatureCreationFailed(SignerError::Transport(_))
        | PayoutError::BalanceFetchFailed(_)
        | PayoutError::NetRevenueCalculationFailed(_)
        | PayoutError::OrderStatCalculationFailed(_)
        | PayoutError::Storage(_)
        | PayoutError::RecalculationFailed(_) => (
            ResponseStatus::System,
            "internal system error".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_data() {
        let response = Response::<()>::from_error(&PayoutError::NoSources);
        assert_eq!(response.status, ResponseStatus::BadData);
        assert_eq!(response.message.as_deref(), Some("no payout sources provided"));
    }

    #[test]
    fn test_not_found_mapping() {
        let response = Response::<()>::from_error(&PayoutError::PayoutNotFound);
        assert_eq!(response.status, ResponseStatus::NotFound);
    }

    #[test]
    fn test_signer_business_error_is_proxied_unchanged() {
        let error = PayoutError::SignatureCreationFailed(SignerError::Business {
            code: "template_not_found".to_string(),
            message: "signature template does not exist".to_string(),
        });
        let response = Response::<()>::from_error(&error);
        assert_eq!(response.status, ResponseStatus::BadData);
        assert_eq!(
            response.message.as_deref(),
            Some("signature template does not exist")
        );
    }

    #[test]
    fn test_transport_error_degrades_to_system() {
        let error = PayoutError::SignatureCreationFailed(SignerError::Transport(
            "connection reset".to_string(),
        ));
        let response = Response::<()>::from_error(&error);
        assert_eq!(response.status, ResponseStatus::System);
        assert_eq!(response.message.as_deref(), Some("internal system error"));
    }
}
