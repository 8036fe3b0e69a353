//! Integration tests for placing orders.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use leipomo_core::CheckoutStep;
use leipomo_integration_tests::{
    FakeBackend, OrderOutcome, TestFlow, at, date, friday_morning, open_flow, pulla, ruisleipa,
};
use leipomo_ordering::api::OrderReference;
use leipomo_ordering::cart::CartItem;
use leipomo_ordering::checkout::Command;
use leipomo_ordering::persistence::{MemoryStore, SESSION_KEY, SessionStore};
use leipomo_ordering::submission::SubmissionError;
use leipomo_ordering::{FlowError, View};

/// Walk to the note step with two products and Monday 2026-10-26 10:00.
async fn to_note_step(flow: &mut TestFlow) {
    for command in [
        Command::AddItem {
            item: CartItem::from(&pulla()),
            quantity: 2,
        },
        Command::AddItem {
            item: CartItem::from(&ruisleipa()),
            quantity: 1,
        },
        Command::BeginCheckout,
        Command::SubmitName("Aino Virtanen".into()),
        Command::SubmitEmail("aino@example.com".into()),
        Command::SubmitPhone("0401234567".into()),
        Command::SelectDate(date(2026, 10, 26)),
        Command::SelectTime(at(10, 0)),
    ] {
        flow.dispatch(command).await.unwrap();
    }
}

fn submission_error(result: Result<View, FlowError>) -> SubmissionError {
    match result {
        Err(FlowError::Submission(err)) => err,
        other => panic!("expected a submission error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_order_payload() {
    let backend = FakeBackend::bakery();
    let store = Arc::new(MemoryStore::new());
    let mut flow = open_flow(&backend, &store, friday_morning());
    to_note_step(&mut flow).await;

    flow.dispatch(Command::SubmitNote(String::new())).await.unwrap();

    let orders = backend.orders();
    let payload = serde_json::to_value(orders.first().unwrap()).unwrap();
    assert_eq!(
        payload,
        serde_json::json!({
            "items": [
                {"quantity": 2, "name": "Pulla", "price": 3.5, "productId": 7, "sku": "PULLA"},
                {"quantity": 1, "name": "Ruisleipä", "price": 6.0, "productId": 12, "sku": "RUIS-500"}
            ],
            "name": "Aino Virtanen",
            "email": "aino@example.com",
            "phone": "0401234567",
            "pickup_time": "2026-10-26T10:00"
        })
    );
}

#[tokio::test]
async fn test_success_resets_stored_session() {
    let backend = FakeBackend::bakery();
    backend.set_outcome(OrderOutcome::Accept(OrderReference::Text("K-2026-118".into())));
    let store = Arc::new(MemoryStore::new());
    let mut flow = open_flow(&backend, &store, friday_morning());
    to_note_step(&mut flow).await;

    let view = flow.dispatch(Command::SubmitNote("Kiitos".into())).await.unwrap();
    assert_eq!(
        view,
        View::Confirmed {
            reference: OrderReference::Text("K-2026-118".into())
        }
    );

    let reloaded = open_flow(&backend, &store, friday_morning());
    assert!(reloaded.session().cart.is_empty());
    assert_eq!(reloaded.session().step, None);
    assert_eq!(reloaded.session().pickup_date, None);
    assert!(store.read(SESSION_KEY).unwrap().is_some());
}

#[tokio::test]
async fn test_rejection_keeps_state_for_retry() {
    let backend = FakeBackend::bakery();
    backend.set_outcome(OrderOutcome::Reject {
        status: 409,
        detail: Some("Pickup slot is full".into()),
    });
    let store = Arc::new(MemoryStore::new());
    let mut flow = open_flow(&backend, &store, friday_morning());
    to_note_step(&mut flow).await;

    let err = submission_error(flow.dispatch(Command::SubmitNote("Kiitos".into())).await);
    assert!(matches!(
        err,
        SubmissionError::Rejected {
            status: Some(409),
            ..
        }
    ));
    assert_eq!(
        err.user_message(),
        "The order could not be placed: Pickup slot is full"
    );

    assert_eq!(flow.session().step, Some(CheckoutStep::Note));
    assert_eq!(flow.session().cart.total_quantity(), 3);
    assert_eq!(flow.session().pickup_time, Some(at(10, 0)));
    assert_eq!(flow.session().name, "Aino Virtanen");

    backend.set_outcome(OrderOutcome::Accept(OrderReference::Number(1043)));
    let view = flow.dispatch(Command::SubmitNote("Kiitos".into())).await.unwrap();
    assert_eq!(
        view,
        View::Confirmed {
            reference: OrderReference::Number(1043)
        }
    );
    assert_eq!(backend.orders().len(), 2);
}

#[tokio::test]
async fn test_missing_order_number_is_a_failure() {
    let backend = FakeBackend::bakery();
    backend.set_outcome(OrderOutcome::MissingReference);
    let store = Arc::new(MemoryStore::new());
    let mut flow = open_flow(&backend, &store, friday_morning());
    to_note_step(&mut flow).await;

    let err = submission_error(flow.dispatch(Command::SubmitNote(String::new())).await);
    assert!(matches!(
        err,
        SubmissionError::Rejected {
            status: None,
            reason: None
        }
    ));
    assert!(!flow.session().cart.is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_generic_and_reported() {
    let backend = FakeBackend::bakery();
    backend.set_outcome(OrderOutcome::Down);
    let store = Arc::new(MemoryStore::new());
    let mut flow = open_flow(&backend, &store, friday_morning());
    to_note_step(&mut flow).await;

    let result = flow.dispatch(Command::SubmitNote(String::new())).await;
    let Err(err) = result else {
        panic!("expected a failure");
    };
    assert!(err.is_internal());
    assert!(!err.user_message().contains("down"));
    assert_eq!(flow.session().step, Some(CheckoutStep::Note));

    // The preserved session survives a reload too.
    let reloaded = open_flow(&backend, &store, friday_morning());
    assert_eq!(reloaded.session(), flow.session());
}
