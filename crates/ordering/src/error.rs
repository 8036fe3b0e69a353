//! Unified error type for the order flow.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::persistence::StoreError;
use crate::submission::SubmissionError;

/// Error returned by [`OrderFlow`](crate::flow::OrderFlow) operations.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A command was rejected by the checkout state machine.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Placing the order failed.
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// Catalog data could not be fetched and no fallback applies.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// An explicit storage operation failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl FlowError {
    /// Message suitable for display to the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Checkout(err) => err.user_message().to_string(),
            Self::Submission(err) => err.user_message(),
            Self::Api(_) => "The menu cannot be loaded right now. Please try again later.".to_string(),
            Self::Store(_) => "Your saved order could not be updated.".to_string(),
        }
    }

    /// Whether the error points at a fault outside the customer's control
    /// and should be reported.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Api(_) | Self::Store(_) | Self::Submission(SubmissionError::Transport(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_transport_detail() {
        let err = FlowError::from(ApiError::Unavailable("dns failure for api.internal".into()));
        assert!(err.is_internal());
        assert!(!err.user_message().contains("api.internal"));
    }

    #[test]
    fn test_checkout_errors_are_not_internal() {
        let err = FlowError::from(CheckoutError::EmptyCart);
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), CheckoutError::EmptyCart.user_message());
    }

    #[test]
    fn test_rejection_reason_is_shown() {
        let err = FlowError::from(SubmissionError::Rejected {
            status: Some(422),
            reason: Some("Pickup date is fully booked".into()),
        });
        assert!(!err.is_internal());
        assert!(err.user_message().contains("fully booked"));
    }
}
