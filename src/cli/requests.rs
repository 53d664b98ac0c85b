//! Write requests accepted by `apply`
//!
//! One JSON object per line, tagged by `op`:
//!
//! ```json
//! {"op": "insert", "entity": "tickets", "document": {...}}
//! {"op": "update", "entity": "tickets", "id": "...", "patch": {...}}
//! {"op": "transition", "entity": "tickets", "id": "...", "status": "PAID"}
//! {"op": "append", "entity": "tickets", "id": "...", "field": "validationHistory", "item": {...}}
//! ```

use serde::Deserialize;
use serde_json::{json, Value};

use crate::store::{EntityStore, StoreResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum WriteRequest {
    Insert {
        entity: String,
        document: Value,
    },
    Update {
        entity: String,
        id: String,
        patch: Value,
    },
    Transition {
        entity: String,
        id: String,
        status: String,
    },
    Append {
        entity: String,
        id: String,
        field: String,
        item: Value,
    },
}

impl WriteRequest {
    /// Runs the request, returning the response payload
    pub fn execute(self, store: &EntityStore) -> StoreResult<Value> {
        match self {
            WriteRequest::Insert { entity, document } => {
                let id = store.insert(&entity, document)?;
                Ok(json!({ "_id": id }))
            }
            WriteRequest::Update { entity, id, patch } => store.update(&entity, &id, patch),
            WriteRequest::Transition { entity, id, status } => {
                store.transition(&entity, &id, &status)
            }
            WriteRequest::Append {
                entity,
                id,
                field,
                item,
            } => store.append(&entity, &id, &field, item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn parse(line: &str) -> WriteRequest {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_parse_ops() {
        assert!(matches!(
            parse(r#"{"op":"transition","entity":"tickets","id":"a","status":"PAID"}"#),
            WriteRequest::Transition { .. }
        ));
        assert!(serde_json::from_str::<WriteRequest>(r#"{"op":"delete","entity":"x"}"#).is_err());
    }

    #[test]
    fn test_execute_insert_then_transition() {
        let store = catalog::memory_store().unwrap();
        let inserted = parse(
            r#"{"op":"insert","entity":"tickets","document":{"_id":"a1","ticketId":"T1","userId":"U1","ticketType":"SINGLE","status":"CREATED","price":"2.50"}}"#,
        )
        .execute(&store)
        .unwrap();
        assert_eq!(inserted, json!({"_id": "a1"}));

        let paid = parse(r#"{"op":"transition","entity":"tickets","id":"a1","status":"PAID"}"#)
            .execute(&store)
            .unwrap();
        assert_eq!(paid["status"], json!("PAID"));
    }
}
