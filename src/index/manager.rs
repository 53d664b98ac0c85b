//! Index Manager
//!
//! Maintains the declared indexes of one collection.
//!
//! # API
//!
//! - `declare(spec, docs)` - Add an index and build it over existing documents
//! - `check_unique(doc, self_id)` - Unique-key check before commit
//! - `apply_write(id, old, new)` - Update indexes after commit
//! - `rebuild(docs)` - Rebuild every index from scratch
//! - `lookup_eq(fields, values)` - Exact match through a matching index
//! - `lookup_range(field, min, max, limit)` - Range lookup on a single-field index

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::btree::{CompositeKey, IndexKey, IndexTree};
use super::errors::{IndexError, IndexResult, UniqueConflict};
use crate::document::value_at;

/// Declaration of a single or compound index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name, derived from the fields unless given
    pub name: String,
    /// Indexed field paths, in comparison order
    pub fields: Vec<String>,
    /// Whether the key must be unique across live documents
    pub unique: bool,
}

impl IndexSpec {
    pub fn new(fields: &[&str], unique: bool) -> Self {
        Self {
            name: fields.join("_"),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            unique,
        }
    }

    /// Unique index over `fields`
    pub fn unique(fields: &[&str]) -> Self {
        Self::new(fields, true)
    }

    /// Lookup-only index over `fields`
    pub fn lookup(fields: &[&str]) -> Self {
        Self::new(fields, false)
    }

    /// Field label used in violations ("email", "status,validUntil")
    pub fn field_label(&self) -> String {
        self.fields.join(",")
    }

    /// Whether this index covers exactly `fields`, in order
    pub fn covers(&self, fields: &[&str]) -> bool {
        self.fields.len() == fields.len() && self.fields.iter().zip(fields).all(|(a, b)| a == b)
    }

    /// Keys a document contributes to this index.
    ///
    /// A document missing any indexed field contributes none. Array values
    /// contribute one key per element.
    pub fn keys_for(&self, doc: &Value) -> Vec<CompositeKey> {
        let mut keys: Vec<CompositeKey> = vec![Vec::new()];

        for field in &self.fields {
            let parts = match value_at(doc, field) {
                Some(value) => IndexKey::expand(value),
                None => return Vec::new(),
            };
            if parts.is_empty() {
                return Vec::new();
            }

            keys = keys
                .into_iter()
                .flat_map(|prefix| {
                    parts.iter().map(move |part| {
                        let mut key = prefix.clone();
                        key.push(part.clone());
                        key
                    })
                })
                .collect();
        }

        keys
    }

    fn render_value(&self, doc: &Value) -> String {
        let values: Vec<Value> = self
            .fields
            .iter()
            .map(|f| value_at(doc, f).cloned().unwrap_or(Value::Null))
            .collect();

        match values.as_slice() {
            [single] => single.to_string(),
            _ => Value::Array(values).to_string(),
        }
    }
}

struct Index {
    spec: IndexSpec,
    tree: IndexTree,
}

/// Index Manager for one collection
#[derive(Default)]
pub struct IndexManager {
    indexes: Vec<Index>,
}

impl IndexManager {
    /// Creates a manager with no declared indexes
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an index and builds it over `docs`.
    ///
    /// Fails if the name is taken or if a unique index finds duplicates.
    pub fn declare<'a, I>(&mut self, spec: IndexSpec, docs: I) -> IndexResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        if self.indexes.iter().any(|idx| idx.spec.name == spec.name) {
            return Err(IndexError::duplicate_index(&spec.name));
        }

        let mut index = Index {
            spec,
            tree: IndexTree::new(),
        };
        build_index(&mut index, docs)?;
        self.indexes.push(index);
        Ok(())
    }

    /// Declared specs, in declaration order
    pub fn specs(&self) -> impl Iterator<Item = &IndexSpec> {
        self.indexes.iter().map(|idx| &idx.spec)
    }

    /// Checks every unique index for a document other than `self_id`
    /// already holding one of `doc`'s keys.
    pub fn check_unique(&self, doc: &Value, self_id: Option<&str>) -> Result<(), UniqueConflict> {
        for index in self.indexes.iter().filter(|idx| idx.spec.unique) {
            for key in index.spec.keys_for(doc) {
                if let Some(holder) = index.tree.holder_other_than(&key, self_id) {
                    return Err(UniqueConflict {
                        field: index.spec.field_label(),
                        value: index.spec.render_value(doc),
                        conflicting_id: holder.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Applies a committed write.
    ///
    /// `old` is the previous version of the document on update.
    pub fn apply_write(&mut self, doc_id: &str, old: Option<&Value>, new: &Value) {
        for index in &mut self.indexes {
            if let Some(old) = old {
                for key in index.spec.keys_for(old) {
                    index.tree.remove(&key, doc_id);
                }
            }
            for key in index.spec.keys_for(new) {
                index.tree.insert(key, doc_id);
            }
        }
    }

    /// Rebuilds every index from `docs`.
    ///
    /// Traversal order does not affect the result. Duplicate unique keys
    /// are FATAL.
    pub fn rebuild<'a, I>(&mut self, docs: I) -> IndexResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)> + Clone,
    {
        for index in &mut self.indexes {
            index.tree.clear();
            build_index(index, docs.clone())?;
        }
        Ok(())
    }

    /// Exact-match lookup through the index covering `fields`.
    ///
    /// Returns `None` when no declared index covers the fields, so the
    /// caller can fall back to a scan. Ids are ascending.
    pub fn lookup_eq(&self, fields: &[&str], values: &[&Value]) -> Option<Vec<String>> {
        let index = self.indexes.iter().find(|idx| idx.spec.covers(fields))?;

        let key: Option<CompositeKey> = values.iter().map(|v| IndexKey::from_json(v)).collect();
        Some(match key {
            Some(key) => index.tree.lookup_eq(&key),
            None => Vec::new(),
        })
    }

    /// Range lookup on a single-field index, bounds inclusive.
    pub fn lookup_range(
        &self,
        field: &str,
        min: Option<&Value>,
        max: Option<&Value>,
        limit: Option<usize>,
    ) -> Option<Vec<String>> {
        let index = self.indexes.iter().find(|idx| idx.spec.covers(&[field]))?;

        let min_key = min.and_then(IndexKey::from_json).map(|k| vec![k]);
        let max_key = max.and_then(IndexKey::from_json).map(|k| vec![k]);

        let mut ids = index.tree.lookup_range(min_key.as_ref(), max_key.as_ref());
        if let Some(limit) = limit {
            ids.truncate(limit);
        }
        Some(ids)
    }

    /// Number of entries held by the named index
    pub fn entry_count(&self, name: &str) -> Option<usize> {
        self.indexes
            .iter()
            .find(|idx| idx.spec.name == name)
            .map(|idx| idx.tree.entry_count())
    }
}

fn build_index<'a, I>(index: &mut Index, docs: I) -> IndexResult<()>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    for (doc_id, doc) in docs {
        for key in index.spec.keys_for(doc) {
            if index.spec.unique {
                if let Some(holder) = index.tree.holder_other_than(&key, Some(doc_id)) {
                    return Err(IndexError::build_failed(
                        &index.spec.name,
                        format!(
                            "documents '{}' and '{}' share {} = {}",
                            holder,
                            doc_id,
                            index.spec.field_label(),
                            index.spec.render_value(doc)
                        ),
                    ));
                }
            }
            index.tree.insert(key, doc_id);
        }
    }
    Ok(())
}
