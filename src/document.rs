//! Helpers for reading JSON documents

use serde_json::Value;

/// Field holding the storage identity of every document
pub const ID_FIELD: &str = "_id";

/// Resolves a dotted path (`tripDetails.tripId`) inside a document.
///
/// Nulls count as absent.
pub fn value_at<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.get(segment))
        .filter(|v| !v.is_null())
}

/// Resolves a dotted path to a string value.
pub fn str_at<'a>(doc: &'a Value, path: &str) -> Option<&'a str> {
    value_at(doc, path).and_then(Value::as_str)
}

/// Returns the `_id` of a document, if it has a string one.
pub fn document_id(doc: &Value) -> Option<&str> {
    str_at(doc, ID_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_at_nested() {
        let doc = json!({"tripDetails": {"tripId": "TR1", "seat": null}});
        assert_eq!(str_at(&doc, "tripDetails.tripId"), Some("TR1"));
        assert!(value_at(&doc, "tripDetails.seat").is_none());
        assert!(value_at(&doc, "tripDetails.routeId").is_none());
        assert!(value_at(&doc, "missing.path").is_none());
    }

    #[test]
    fn test_document_id() {
        assert_eq!(document_id(&json!({"_id": "abc"})), Some("abc"));
        assert_eq!(document_id(&json!({"_id": 7})), None);
    }
}
