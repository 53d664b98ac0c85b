//! Uniqueness Tests
//!
//! Unique indexes of the catalog collections:
//! - Duplicate keys are refused with the offending field and holder
//! - A refused write changes nothing
//! - Updates may keep their own key; identity fields never change
//! - Concurrent inserts of one key admit exactly one writer

mod common;

use std::sync::Arc;
use std::thread;

use common::valid_documents;
use serde_json::{json, Value};
use ticketing_store::catalog;
use ticketing_store::index::IndexSpec;
use ticketing_store::store::{EntityStore, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

fn user(id: &str, username: &str, email: &str) -> Value {
    json!({
        "_id": id,
        "username": username,
        "email": email,
        "password": "hash",
        "role": "PASSENGER",
        "fullName": "Someone",
        "createdAt": "2024-01-01T00:00:00Z"
    })
}

fn ticket(id: &str, ticket_id: &str) -> Value {
    json!({
        "_id": id,
        "ticketId": ticket_id,
        "userId": "U1",
        "ticketType": "SINGLE",
        "status": "CREATED",
        "price": "2.50"
    })
}

fn unique_conflict(err: StoreError) -> (String, String) {
    match err {
        StoreError::UniquenessViolation {
            field,
            conflicting_id,
            ..
        } => (field, conflicting_id),
        other => panic!("expected uniqueness violation, got {:?}", other),
    }
}

// =============================================================================
// Catalog Unique Keys
// =============================================================================

#[test]
fn test_duplicate_email_rejected() {
    let store = catalog::memory_store().unwrap();
    store.insert("users", user("U1", "alice", "a@x.com")).unwrap();

    let err = store
        .insert("users", user("U2", "alice2", "a@x.com"))
        .unwrap_err();
    assert_eq!(err.code(), "TICKETING_UNIQUENESS_VIOLATION");
    assert_eq!(unique_conflict(err), ("email".to_string(), "U1".to_string()));
    assert_eq!(store.count("users").unwrap(), 1);
}

#[test]
fn test_duplicate_username_rejected() {
    let store = catalog::memory_store().unwrap();
    store.insert("users", user("U1", "alice", "a@x.com")).unwrap();

    let err = store
        .insert("users", user("U2", "alice", "b@x.com"))
        .unwrap_err();
    assert_eq!(unique_conflict(err).0, "username");
}

#[test]
fn test_duplicate_ticket_id_rejected() {
    let store = catalog::memory_store().unwrap();
    store.insert("tickets", ticket("k1", "T1")).unwrap();

    let err = store.insert("tickets", ticket("k2", "T1")).unwrap_err();
    assert_eq!(unique_conflict(err), ("ticketId".to_string(), "k1".to_string()));
    assert!(store.get("tickets", "k2").unwrap().is_none());
}

#[test]
fn test_duplicate_id_rejected() {
    let store = catalog::memory_store().unwrap();
    store.insert("tickets", ticket("k1", "T1")).unwrap();

    let err = store.insert("tickets", ticket("k1", "T2")).unwrap_err();
    assert_eq!(unique_conflict(err).0, "_id");
}

/// Each business key of the catalog is unique.
#[test]
fn test_every_business_key_is_unique() {
    for def in catalog::collection_defs(Default::default()) {
        let unique: Vec<&IndexSpec> = def.indexes.iter().filter(|spec| spec.unique).collect();
        assert!(!unique.is_empty(), "{} has no unique index", def.name);
        if def.key_field != "_id" {
            assert!(
                unique.iter().any(|spec| spec.covers(&[def.key_field.as_str()])),
                "{} key {} is not unique",
                def.name,
                def.key_field
            );
        }
    }
}

/// For every single-field unique key of every collection, a second document
/// repeating only that value is refused.
#[test]
fn test_every_unique_field_refuses_duplicates() {
    let mut checked = 0;

    for (entity, doc) in valid_documents() {
        let def = catalog::memory_store().unwrap().definition(entity).unwrap();
        let unique_fields: Vec<&str> = def
            .indexes
            .iter()
            .filter(|spec| spec.unique && spec.fields.len() == 1)
            .map(|spec| spec.fields[0].as_str())
            .collect();

        for field in &unique_fields {
            let store = catalog::memory_store().unwrap();
            let id = store.insert(entity, doc.clone()).unwrap();

            let mut duplicate = doc.clone();
            duplicate["_id"] = json!(format!("other-{}", id));
            for other in unique_fields.iter().filter(|f| *f != field) {
                let value = doc[*other].as_str().unwrap();
                duplicate[*other] = json!(format!("other-{}", value));
            }

            let err = store.insert(entity, duplicate).unwrap_err();
            assert_eq!(
                unique_conflict(err),
                (field.to_string(), id),
                "{}.{} accepted a duplicate",
                entity,
                field
            );
            assert_eq!(store.count(entity).unwrap(), 1);
            checked += 1;
        }
    }

    // username and email, plus one business key per other collection
    assert_eq!(checked, 11);
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn test_update_keeping_own_key_allowed() {
    let store = catalog::memory_store().unwrap();
    store.insert("users", user("U1", "alice", "a@x.com")).unwrap();

    let updated = store
        .update("users", "U1", json!({"email": "a@x.com", "fullName": "Alice B"}))
        .unwrap();
    assert_eq!(updated["fullName"], json!("Alice B"));
}

#[test]
fn test_update_taking_other_key_rejected() {
    let store = catalog::memory_store().unwrap();
    store
        .declare_index("tickets", IndexSpec::unique(&["qrCode"]))
        .unwrap();
    let mut first = ticket("k1", "T1");
    first["qrCode"] = json!("QR-1");
    store.insert("tickets", first).unwrap();
    store.insert("tickets", ticket("k2", "T2")).unwrap();

    let err = store
        .update("tickets", "k2", json!({"qrCode": "QR-1"}))
        .unwrap_err();
    assert_eq!(unique_conflict(err), ("qrCode".to_string(), "k1".to_string()));
    assert!(store.get("tickets", "k2").unwrap().unwrap().get("qrCode").is_none());
}

/// A freed key can be taken by another document.
#[test]
fn test_released_key_can_be_reused() {
    let store = catalog::memory_store().unwrap();
    store
        .declare_index("tickets", IndexSpec::unique(&["qrCode"]))
        .unwrap();
    let mut first = ticket("k1", "T1");
    first["qrCode"] = json!("QR-1");
    store.insert("tickets", first).unwrap();
    store
        .update("tickets", "k1", json!({"qrCode": "QR-2"}))
        .unwrap();

    let mut second = ticket("k2", "T2");
    second["qrCode"] = json!("QR-1");
    store.insert("tickets", second).unwrap();
}

// =============================================================================
// Identity Fields
// =============================================================================

#[test]
fn test_ticket_id_cannot_be_rewritten() {
    let store = catalog::memory_store().unwrap();
    store.insert("tickets", ticket("k1", "T1")).unwrap();
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

    let err = store
        .update("tickets", "k1", json!({"ticketId": "T2"}))
        .unwrap_err();
    assert_eq!(err.code(), "TICKETING_IMMUTABLE_FIELD");
    assert!(matches!(err, StoreError::ImmutableField { ref field, .. } if field == "ticketId"));

    // the payment still points at a live ticket
    assert!(store.resolve("tickets", "T1").unwrap());
    assert!(store.dangling_references().iter().all(|l| l.target.entity != "tickets"));

    let err = store
        .update("payments", "p1", json!({"paymentId": "P9"}))
        .unwrap_err();
    assert!(matches!(err, StoreError::ImmutableField { ref field, .. } if field == "paymentId"));
    let err = store
        .update("payments", "p1", json!({"ticketId": "T9"}))
        .unwrap_err();
    assert!(matches!(err, StoreError::ImmutableField { ref field, .. } if field == "ticketId"));
    assert!(store.get_by_key("payments", "P1").unwrap().is_some());
}

#[test]
fn test_owner_and_unique_user_fields_are_fixed() {
    let store = catalog::memory_store().unwrap();
    store.insert("users", user("U1", "alice", "a@x.com")).unwrap();
    store.insert("tickets", ticket("k1", "T1")).unwrap();

    let err = store
        .update("users", "U1", json!({"email": "alice@x.com"}))
        .unwrap_err();
    assert!(matches!(err, StoreError::ImmutableField { ref field, .. } if field == "email"));

    let err = store
        .update("tickets", "k1", json!({"userId": "U2"}))
        .unwrap_err();
    assert!(matches!(err, StoreError::ImmutableField { ref field, .. } if field == "userId"));

    // other fields stay writable
    store
        .update("users", "U1", json!({"fullName": "Alice B"}))
        .unwrap();
    assert_eq!(store.metrics().snapshot().updates, 1);
}

// =============================================================================
// Declared Indexes
// =============================================================================

#[test]
fn test_compound_unique_index() {
    let store = catalog::memory_store().unwrap();
    store
        .declare_index("tickets", IndexSpec::unique(&["userId", "tripId"]))
        .unwrap();

    let mut first = ticket("k1", "T1");
    first["tripId"] = json!("TR1");
    store.insert("tickets", first).unwrap();

    let mut other_trip = ticket("k2", "T2");
    other_trip["tripId"] = json!("TR2");
    store.insert("tickets", other_trip).unwrap();

    let mut clash = ticket("k3", "T3");
    clash["tripId"] = json!("TR1");
    let err = store.insert("tickets", clash).unwrap_err();
    assert_eq!(unique_conflict(err), ("userId,tripId".to_string(), "k1".to_string()));
}

#[test]
fn test_declaring_unique_index_over_duplicates_fails() {
    let store = catalog::memory_store().unwrap();
    store.insert("tickets", ticket("k1", "T1")).unwrap();
    store.insert("tickets", ticket("k2", "T2")).unwrap();

    let err = store
        .declare_index("tickets", IndexSpec::unique(&["userId"]))
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.code(), "TICKETING_INDEX_BUILD_FAILED");
}

/// Documents missing an indexed field do not collide.
#[test]
fn test_missing_fields_are_not_indexed() {
    let store = catalog::memory_store().unwrap();
    store
        .declare_index("tickets", IndexSpec::unique(&["qrCode"]))
        .unwrap();

    store.insert("tickets", ticket("k1", "T1")).unwrap();
    store.insert("tickets", ticket("k2", "T2")).unwrap();
}

// =============================================================================
// Concurrency
// =============================================================================

/// Racing inserts of the same ticketId: exactly one wins.
#[test]
fn test_concurrent_inserts_admit_one_writer() {
    let store: Arc<EntityStore> = Arc::new(catalog::memory_store().unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.insert("tickets", ticket(&format!("k{}", i), "T-RACE")))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert!(matches!(err, StoreError::UniquenessViolation { .. }));
    }

    assert_eq!(store.count("tickets").unwrap(), 1);
    assert_eq!(store.metrics().snapshot().rejections(), 7);
}
