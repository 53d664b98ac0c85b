//! BTreeMap-based index structures
//!
//! Each index maps a composite key to the set of document ids holding it.
//! Composite keys compare lexicographically in declared field order.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use serde_json::Value;

/// Index key representing a single scalar field value.
///
/// Ordering is deterministic: Bool < Int < Float < String.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value (stored as order-preserving bits)
    Float(u64),
    /// String value (also dates and decimal strings)
    String(String),
}

impl IndexKey {
    pub fn from_bool(v: bool) -> Self {
        IndexKey::Bool(v)
    }

    pub fn from_int(v: i64) -> Self {
        IndexKey::Int(v)
    }

    /// Create a key from a float, mapped onto bits with total ordering.
    pub fn from_float(v: f64) -> Self {
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        IndexKey::Float(ordered)
    }

    pub fn from_string(v: impl Into<String>) -> Self {
        IndexKey::String(v.into())
    }

    /// Create a key from a scalar JSON value.
    ///
    /// Nulls, arrays and objects have no key.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(IndexKey::from_bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(IndexKey::from_int(i))
                } else {
                    n.as_f64().map(IndexKey::from_float)
                }
            }
            Value::String(s) => Some(IndexKey::from_string(s.as_str())),
            _ => None,
        }
    }

    /// Expands a field value into its index keys.
    ///
    /// Scalars yield one key, arrays yield one key per scalar element.
    pub fn expand(value: &Value) -> Vec<Self> {
        match value {
            Value::Array(items) => {
                let mut keys: Vec<IndexKey> = items.iter().filter_map(IndexKey::from_json).collect();
                keys.sort();
                keys.dedup();
                keys
            }
            other => IndexKey::from_json(other).into_iter().collect(),
        }
    }
}

/// Key of a (possibly compound) index entry
pub type CompositeKey = Vec<IndexKey>;

/// A single index over one or more fields.
#[derive(Debug, Default)]
pub struct IndexTree {
    tree: BTreeMap<CompositeKey, BTreeSet<String>>,
}

impl IndexTree {
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// Insert a document id under a key.
    pub fn insert(&mut self, key: CompositeKey, doc_id: &str) {
        self.tree.entry(key).or_default().insert(doc_id.to_string());
    }

    /// Remove a document id from a key.
    ///
    /// If the key has no more ids, removes the key entirely.
    pub fn remove(&mut self, key: &CompositeKey, doc_id: &str) {
        if let Some(ids) = self.tree.get_mut(key) {
            ids.remove(doc_id);
            if ids.is_empty() {
                self.tree.remove(key);
            }
        }
    }

    /// Ids under an exact key, ascending.
    pub fn lookup_eq(&self, key: &CompositeKey) -> Vec<String> {
        self.tree
            .get(key)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether any id other than `except` holds `key`; returns the first such id.
    pub fn holder_other_than(&self, key: &CompositeKey, except: Option<&str>) -> Option<&str> {
        self.tree
            .get(key)?
            .iter()
            .map(String::as_str)
            .find(|id| Some(*id) != except)
    }

    /// Ids with keys in `[min, max]` (inclusive), ascending and deduplicated.
    pub fn lookup_range(&self, min: Option<&CompositeKey>, max: Option<&CompositeKey>) -> Vec<String> {
        let lower = match min {
            Some(k) => Bound::Included(k),
            None => Bound::Unbounded,
        };
        let upper = match max {
            Some(k) => Bound::Included(k),
            None => Bound::Unbounded,
        };

        let ids: BTreeSet<&String> = self
            .tree
            .range::<CompositeKey, _>((lower, upper))
            .flat_map(|(_, ids)| ids.iter())
            .collect();
        ids.into_iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Total number of (key, id) entries
    pub fn entry_count(&self) -> usize {
        self.tree.values().map(BTreeSet::len).sum()
    }
}
