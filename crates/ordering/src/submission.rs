//! Order submission.

use leipomo_core::CheckoutStep;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, OrderBackend, OrderItem, OrderReference, OrderRequest, OrderResponse};
use crate::checkout::CheckoutError;
use crate::session::OrderSession;

/// Errors that can occur when placing an order. The session is never
/// modified when one of these is returned.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The session is missing something the order needs.
    #[error("order is incomplete: {0}")]
    Incomplete(#[from] CheckoutError),

    /// The backend refused the order, or accepted it without an order number.
    #[error("order rejected{}", reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    Rejected {
        status: Option<u16>,
        reason: Option<String>,
    },

    /// The order could not be delivered.
    #[error("order could not be sent: {0}")]
    Transport(#[source] ApiError),
}

impl SubmissionError {
    /// Message suitable for display to the customer. A backend reason is
    /// passed through; transport detail is not.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Incomplete(err) => err.user_message().to_string(),
            Self::Rejected {
                reason: Some(reason),
                ..
            } => format!("The order could not be placed: {reason}"),
            Self::Rejected { reason: None, .. } => {
                "The order could not be placed. Please try again.".to_string()
            }
            Self::Transport(_) => {
                "The order could not be sent. Check your connection and try again.".to_string()
            }
        }
    }
}

/// Build the order body from the session.
///
/// # Errors
///
/// Returns `SubmissionError::Incomplete` when the cart is empty, the pickup
/// is not chosen, or a required contact field is blank.
pub fn build_request(session: &OrderSession) -> Result<OrderRequest, SubmissionError> {
    if session.cart.is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    let pickup_time = session
        .pickup_timestamp()
        .ok_or(CheckoutError::MissingPickup)?;
    let name = required(&session.name, CheckoutStep::Name)?;
    let phone = required(&session.phone, CheckoutStep::Phone)?;

    let items = session
        .cart
        .lines()
        .iter()
        .map(|line| OrderItem {
            quantity: line.quantity,
            name: line.name.clone(),
            price: line.unit_price,
            product_id: line.product_id,
            sku: line.sku.clone().filter(|sku| !sku.trim().is_empty()),
        })
        .collect();

    Ok(OrderRequest {
        items,
        name,
        email: optional(&session.email),
        phone,
        pickup_time,
        note: optional(&session.note),
    })
}

fn required(value: &str, step: CheckoutStep) -> Result<String, CheckoutError> {
    optional(value).ok_or(CheckoutError::BlankField(step))
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Turn the backend's answer into an order reference or a failure.
///
/// # Errors
///
/// Returns `SubmissionError::Rejected` for non-2xx responses and responses
/// without an order number, `SubmissionError::Transport` otherwise.
pub fn interpret(
    result: Result<OrderResponse, ApiError>,
) -> Result<OrderReference, SubmissionError> {
    match result {
        Ok(OrderResponse {
            reference: Some(reference),
            ..
        }) => Ok(reference),
        Ok(OrderResponse { reason, .. }) => Err(SubmissionError::Rejected {
            status: None,
            reason,
        }),
        Err(ApiError::Status { status, detail }) => Err(SubmissionError::Rejected {
            status: Some(status),
            reason: detail,
        }),
        Err(e) => Err(SubmissionError::Transport(e)),
    }
}

/// Place the order described by `session`.
///
/// On success the session is reset. On any failure it is left untouched so
/// the customer can retry.
///
/// # Errors
///
/// Returns `SubmissionError` if the order is incomplete or was not accepted.
#[instrument(skip(backend, session), fields(lines = session.cart.lines().len()))]
pub async fn submit(
    backend: &dyn OrderBackend,
    session: &mut OrderSession,
) -> Result<OrderReference, SubmissionError> {
    let request = build_request(session)?;

    match interpret(backend.create_order(&request).await) {
        Ok(reference) => {
            info!(order = %reference, pickup = %request.pickup_time, "Order placed");
            session.reset();
            Ok(reference)
        }
        Err(e) => {
            warn!(error = %e, "Order submission failed");
            Err(e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use leipomo_core::{Price, ProductId, SlotTime};

    use super::*;
    use crate::cart::CartItem;

    fn ready_session() -> OrderSession {
        let mut session = OrderSession::new();
        session
            .cart
            .add_item(
                &CartItem {
                    product_id: Some(ProductId::new(7)),
                    sku: None,
                    name: "Pulla".to_string(),
                    unit_price: Some(Price::from_cents(350)),
                },
                2,
            );
        session
            .cart
            .add_item(
                &CartItem {
                    product_id: None,
                    sku: Some("RUIS".to_string()),
                    name: "Ruisleipä".to_string(),
                    unit_price: None,
                },
                1,
            );
        session.name = " Aino ".to_string();
        session.phone = "0401234567".to_string();
        session.pickup_date = NaiveDate::from_ymd_opt(2026, 10, 26);
        session.pickup_time = SlotTime::new(8, 0);
        session.step = Some(CheckoutStep::Note);
        session
    }

    #[test]
    fn test_build_request_payload() {
        let request = build_request(&ready_session()).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "items": [
                    {"quantity": 2, "name": "Pulla", "price": 3.5, "productId": 7},
                    {"quantity": 1, "name": "Ruisleipä", "sku": "RUIS"}
                ],
                "name": "Aino",
                "phone": "0401234567",
                "pickup_time": "2026-10-26T08:00"
            })
        );
    }

    #[test]
    fn test_build_request_requires_pickup() {
        let mut session = ready_session();
        session.pickup_time = None;
        assert!(matches!(
            build_request(&session),
            Err(SubmissionError::Incomplete(CheckoutError::MissingPickup))
        ));
    }

    #[test]
    fn test_build_request_requires_phone() {
        let mut session = ready_session();
        session.phone = "  ".to_string();
        assert!(matches!(
            build_request(&session),
            Err(SubmissionError::Incomplete(CheckoutError::BlankField(CheckoutStep::Phone)))
        ));
    }

    #[test]
    fn test_interpret_outcomes() {
        let ok = interpret(Ok(OrderResponse {
            reference: Some(OrderReference::Number(1042)),
            reason: None,
        }));
        assert_eq!(ok.unwrap(), OrderReference::Number(1042));

        let missing = interpret(Ok(OrderResponse::default()));
        assert!(matches!(missing, Err(SubmissionError::Rejected { status: None, .. })));

        let rejected = interpret(Err(ApiError::Status {
            status: 400,
            detail: Some("Pickup too soon".to_string()),
        }))
        .unwrap_err();
        assert_eq!(
            rejected.user_message(),
            "The order could not be placed: Pickup too soon"
        );

        let transport = interpret(Err(ApiError::Unavailable("connection refused".into())))
            .unwrap_err();
        assert!(matches!(transport, SubmissionError::Transport(_)));
        assert!(!transport.user_message().contains("refused"));
    }
}
