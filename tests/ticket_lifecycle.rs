//! Status Lifecycle Tests
//!
//! Ticket, trip, payment and disruption status machines as enforced by the
//! store:
//! - Declared transitions succeed
//! - Terminal states refuse any write naming the status, even the same value
//! - Undeclared transitions are refused
//! - New documents start in an initial state
//! - Append-only histories can only grow

use serde_json::{json, Value};
use ticketing_store::catalog::{self, CatalogOptions};
use ticketing_store::store::{EntityStore, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

fn store_with_ticket(options: CatalogOptions) -> EntityStore {
    let store = catalog::build_store(catalog::registry().unwrap(), options).unwrap();
    store
        .insert(
            "tickets",
            json!({
                "_id": "k1",
                "ticketId": "T1",
                "userId": "U1",
                "ticketType": "SINGLE",
                "status": "CREATED",
                "price": "2.50"
            }),
        )
        .unwrap();
    store
}

fn status(store: &EntityStore, entity: &str, id: &str) -> Value {
    store.get(entity, id).unwrap().unwrap()["status"].clone()
}

fn validation_entry(id: &str) -> Value {
    json!({"validationId": id, "validatedAt": "2024-01-01T08:00:00Z", "success": true})
}

// =============================================================================
// Tickets
// =============================================================================

#[test]
fn test_ticket_full_path() {
    let store = store_with_ticket(CatalogOptions::default());
    for next in ["PENDING_PAYMENT", "PAID", "VALIDATED", "VALIDATED", "EXPIRED"] {
        store.transition("tickets", "k1", next).unwrap();
        assert_eq!(status(&store, "tickets", "k1"), json!(next));
    }
}

#[test]
fn test_direct_payment_allowed_by_default() {
    let store = store_with_ticket(CatalogOptions::default());
    store.transition("tickets", "k1", "PAID").unwrap();
}

#[test]
fn test_direct_payment_can_be_disabled() {
    let store = store_with_ticket(CatalogOptions {
        ticket_direct_payment: false,
        ..CatalogOptions::default()
    });

    let err = store.transition("tickets", "k1", "PAID").unwrap_err();
    assert!(matches!(err, StoreError::InvalidTransition { .. }));
    assert_eq!(status(&store, "tickets", "k1"), json!("CREATED"));

    store.transition("tickets", "k1", "PENDING_PAYMENT").unwrap();
    store.transition("tickets", "k1", "PAID").unwrap();
}

#[test]
fn test_cancelled_ticket_cannot_be_revived() {
    let store = store_with_ticket(CatalogOptions::default());
    store.transition("tickets", "k1", "CANCELLED").unwrap();

    let err = store.transition("tickets", "k1", "PAID").unwrap_err();
    assert_eq!(err.code(), "TICKETING_TERMINAL_STATE");
    match err {
        StoreError::TerminalStateViolation {
            entity,
            id,
            current_state,
            attempted,
        } => {
            assert_eq!(entity, "tickets");
            assert_eq!(id, "k1");
            assert_eq!(current_state, "CANCELLED");
            assert_eq!(attempted, "PAID");
        }
        other => panic!("expected terminal state violation, got {:?}", other),
    }
    assert_eq!(status(&store, "tickets", "k1"), json!("CANCELLED"));
}

/// A status change smuggled into a general update is still checked.
#[test]
fn test_update_cannot_bypass_lifecycle() {
    let store = store_with_ticket(CatalogOptions::default());
    store.transition("tickets", "k1", "EXPIRED").unwrap();

    let err = store
        .update("tickets", "k1", json!({"status": "VALIDATED", "qrCode": "Q"}))
        .unwrap_err();
    assert!(matches!(err, StoreError::TerminalStateViolation { .. }));
    assert!(store.get("tickets", "k1").unwrap().unwrap().get("qrCode").is_none());
}

#[test]
fn test_terminal_status_cannot_be_rewritten() {
    let store = store_with_ticket(CatalogOptions::default());
    store.transition("tickets", "k1", "CANCELLED").unwrap();

    let err = store.transition("tickets", "k1", "CANCELLED").unwrap_err();
    assert_eq!(err.code(), "TICKETING_TERMINAL_STATE");

    let err = store
        .update("tickets", "k1", json!({"status": "CANCELLED", "price": "0.00"}))
        .unwrap_err();
    assert!(matches!(err, StoreError::TerminalStateViolation { .. }));

    let doc = store.get("tickets", "k1").unwrap().unwrap();
    assert_eq!(doc["price"], json!("2.50"));

    let metrics = store.metrics().snapshot();
    assert_eq!(metrics.updates, 1);
    assert_eq!(metrics.lifecycle_rejections, 2);
}

#[test]
fn test_terminal_ticket_accepts_writes_without_status() {
    let store = store_with_ticket(CatalogOptions::default());
    store.transition("tickets", "k1", "EXPIRED").unwrap();
    let doc = store
        .update("tickets", "k1", json!({"qrCode": "Q"}))
        .unwrap();
    assert_eq!(doc["status"], json!("EXPIRED"));
}

#[test]
fn test_repeated_validation_is_accepted() {
    let store = store_with_ticket(CatalogOptions::default());
    store.transition("tickets", "k1", "PAID").unwrap();
    store.transition("tickets", "k1", "VALIDATED").unwrap();
    store
        .update("tickets", "k1", json!({"status": "VALIDATED", "qrCode": "Q"}))
        .unwrap();
    assert_eq!(store.metrics().snapshot().transitions, 2);
}

#[test]
fn test_ticket_cannot_be_created_validated() {
    let store = catalog::memory_store().unwrap();
    let err = store
        .insert(
            "tickets",
            json!({
                "_id": "k1",
                "ticketId": "T1",
                "userId": "U1",
                "ticketType": "SINGLE",
                "status": "VALIDATED",
                "price": "2.50"
            }),
        )
        .unwrap_err();
    assert_eq!(err.code(), "TICKETING_INVALID_INITIAL_STATE");
    assert_eq!(store.count("tickets").unwrap(), 0);
    assert_eq!(store.metrics().snapshot().lifecycle_rejections, 1);
}

#[test]
fn test_unknown_status_is_schema_violation() {
    let store = store_with_ticket(CatalogOptions::default());
    let err = store.transition("tickets", "k1", "LOST").unwrap_err();
    assert_eq!(err.violation().unwrap().field, "status");
}

#[test]
fn test_validation_history_is_append_only() {
    let store = store_with_ticket(CatalogOptions::default());
    store
        .append("tickets", "k1", "validationHistory", validation_entry("V1"))
        .unwrap();
    store
        .append("tickets", "k1", "validationHistory", validation_entry("V2"))
        .unwrap();

    let doc = store.get("tickets", "k1").unwrap().unwrap();
    assert_eq!(doc["validationHistory"].as_array().unwrap().len(), 2);

    let err = store
        .update(
            "tickets",
            "k1",
            json!({"validationHistory": [validation_entry("V2")]}),
        )
        .unwrap_err();
    assert_eq!(err.code(), "TICKETING_APPEND_ONLY");

    let err = store
        .update("tickets", "k1", json!({"validationHistory": null}))
        .unwrap_err();
    assert!(matches!(err, StoreError::AppendOnlyViolation { .. }));
}

// =============================================================================
// Trips, Payments, Disruptions
// =============================================================================

#[test]
fn test_completed_trip_is_terminal() {
    let store = catalog::memory_store().unwrap();
    catalog::seed(&store).unwrap();
    let id = store
        .get_by_key("trips", catalog::SAMPLE_TRIP_ID)
        .unwrap()
        .unwrap()["_id"]
        .as_str()
        .unwrap()
        .to_string();

    store.transition("trips", &id, "IN_PROGRESS").unwrap();
    store.transition("trips", &id, "COMPLETED").unwrap();
    let err = store.transition("trips", &id, "DELAYED").unwrap_err();
    assert!(matches!(err, StoreError::TerminalStateViolation { .. }));
}

#[test]
fn test_payment_refund_only_after_success() {
    let store = catalog::memory_store().unwrap();
    store
        .insert(
            "payments",
            json!({
                "_id": "p1",
                "paymentId": "P1",
                "userId": "U1",
                "ticketId": "T1",
                "amount": "2.50",
                "method": "MOBILE_MONEY",
                "status": "PENDING"
            }),
        )
        .unwrap();

    let err = store.transition("payments", "p1", "REFUNDED").unwrap_err();
    assert!(matches!(err, StoreError::InvalidTransition { .. }));

    store.transition("payments", "p1", "SUCCESS").unwrap();
    store.transition("payments", "p1", "REFUNDED").unwrap();
    let err = store.transition("payments", "p1", "SUCCESS").unwrap_err();
    assert!(matches!(err, StoreError::TerminalStateViolation { .. }));
}

#[test]
fn test_resolved_disruption_is_terminal() {
    let store = catalog::memory_store().unwrap();
    store
        .insert(
            "service_disruptions",
            json!({
                "_id": "d1",
                "disruptionId": "D1",
                "title": "Signal failure",
                "severity": "HIGH",
                "status": "ACTIVE",
                "startTime": "2024-01-01T08:00:00Z"
            }),
        )
        .unwrap();

    store
        .append(
            "service_disruptions",
            "d1",
            "updates",
            json!({"timestamp": "2024-01-01T08:30:00Z", "message": "Crews on site"}),
        )
        .unwrap();
    store.transition("service_disruptions", "d1", "MONITORING").unwrap();
    store.transition("service_disruptions", "d1", "RESOLVED").unwrap();

    let err = store
        .transition("service_disruptions", "d1", "ACTIVE")
        .unwrap_err();
    assert!(matches!(err, StoreError::TerminalStateViolation { .. }));
}

#[test]
fn test_collection_without_lifecycle() {
    let store = catalog::memory_store().unwrap();
    let err = store.transition("routes", "r1", "ACTIVE").unwrap_err();
    assert_eq!(err.code(), "TICKETING_NO_LIFECYCLE");
}

#[test]
fn test_immutable_collections_refuse_updates() {
    let store = catalog::memory_store().unwrap();
    store
        .insert(
            "system_logs",
            json!({
                "_id": "l1",
                "logId": "L1",
                "service": "API_GATEWAY",
                "level": "WARN",
                "message": "slow upstream",
                "timestamp": "2024-01-01T00:00:00Z"
            }),
        )
        .unwrap();

    let err = store
        .update("system_logs", "l1", json!({"message": "edited"}))
        .unwrap_err();
    assert_eq!(err.code(), "TICKETING_IMMUTABLE_DOCUMENT");
}

#[test]
fn test_lifecycle_rejections_are_counted() {
    let store = store_with_ticket(CatalogOptions::default());
    store.transition("tickets", "k1", "CANCELLED").unwrap();
    let _ = store.transition("tickets", "k1", "PAID");

    let metrics = store.metrics().snapshot();
    assert_eq!(metrics.transitions, 1);
    assert_eq!(metrics.lifecycle_rejections, 1);
}
