//! Collection definitions and per-collection state

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::document::{str_at, value_at, ID_FIELD};
use crate::index::{IndexManager, IndexSpec};
use crate::lifecycle::StatusMachine;
use crate::reference::{EntityRef, ReferenceField};

/// Write rules of one collection.
///
/// The schema lives in the registry under the same name.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionDef {
    pub name: String,
    /// Business key other documents reference; `_id` when there is none
    pub key_field: String,
    pub indexes: Vec<IndexSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<StatusMachine>,
    pub references: Vec<ReferenceField>,
    pub append_only: Vec<String>,
    /// Fields fixed at insert: the business key, single-field unique keys
    /// and any owning references
    pub identity: Vec<String>,
    /// Insert-only collection
    pub immutable: bool,
}

impl CollectionDef {
    pub fn new(name: impl Into<String>, key_field: impl Into<String>) -> Self {
        let key_field = key_field.into();
        let identity = if key_field == ID_FIELD {
            Vec::new()
        } else {
            vec![key_field.clone()]
        };

        Self {
            name: name.into(),
            key_field,
            indexes: Vec::new(),
            lifecycle: None,
            references: Vec::new(),
            append_only: Vec::new(),
            identity,
            immutable: false,
        }
    }

    /// Unique index over `fields`. A single-field key is also fixed at insert.
    pub fn unique(mut self, fields: &[&str]) -> Self {
        if let [field] = fields {
            self.push_identity(field);
        }
        self.indexes.push(IndexSpec::unique(fields));
        self
    }

    /// Fields that may not change once the document is stored
    pub fn identity(mut self, fields: &[&str]) -> Self {
        for field in fields {
            self.push_identity(field);
        }
        self
    }

    fn push_identity(&mut self, field: &str) {
        if !self.identity.iter().any(|f| f == field) {
            self.identity.push(field.to_string());
        }
    }

    pub fn lookup(mut self, fields: &[&str]) -> Self {
        self.indexes.push(IndexSpec::lookup(fields));
        self
    }

    pub fn lifecycle(mut self, machine: StatusMachine) -> Self {
        self.lifecycle = Some(machine);
        self
    }

    /// `path` holds a key of `target`
    pub fn reference(mut self, path: &str, target: &str) -> Self {
        self.references.push(ReferenceField::new(path, target));
        self
    }

    pub fn append_only(mut self, field: &str) -> Self {
        self.append_only.push(field.to_string());
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }
}

/// Live documents of one collection and their indexes
pub(crate) struct Collection {
    pub(crate) def: CollectionDef,
    /// Documents by `_id`
    pub(crate) documents: BTreeMap<String, Value>,
    pub(crate) indexes: IndexManager,
}

impl Collection {
    pub(crate) fn new(def: CollectionDef) -> Self {
        Self {
            def,
            documents: BTreeMap::new(),
            indexes: IndexManager::new(),
        }
    }

    /// Business key of a document, falling back to its `_id`
    pub(crate) fn key_of<'a>(&self, doc: &'a Value, id: &'a str) -> &'a str {
        str_at(doc, &self.def.key_field).unwrap_or(id)
    }

    pub(crate) fn source_ref(&self, doc: &Value, id: &str) -> EntityRef {
        EntityRef::new(&self.def.name, self.key_of(doc, id))
    }

    /// Soft references held by `doc`, paired with the field they came from
    pub(crate) fn outgoing_links(&self, doc: &Value) -> Vec<(String, EntityRef)> {
        self.def
            .references
            .iter()
            .filter_map(|reference| {
                str_at(doc, &reference.path).map(|key| {
                    (
                        reference.path.clone(),
                        EntityRef::new(&reference.target, key),
                    )
                })
            })
            .collect()
    }

    /// `_id` of the document whose business key is `key`
    pub(crate) fn id_for_key(&self, key: &str) -> Option<String> {
        if self.def.key_field == ID_FIELD {
            return self.documents.contains_key(key).then(|| key.to_string());
        }

        let wanted = Value::String(key.to_string());
        let key_field = self.def.key_field.as_str();
        match self.indexes.lookup_eq(&[key_field], &[&wanted]) {
            Some(ids) => ids.into_iter().next(),
            None => self
                .documents
                .iter()
                .find(|(_, doc)| str_at(doc, key_field) == Some(key))
                .map(|(id, _)| id.clone()),
        }
    }

    /// Ids matching every `(field, value)` pair, ascending.
    ///
    /// Goes through an index declared on exactly these fields when there is
    /// one, otherwise scans.
    pub(crate) fn matching_ids(&self, filter: &[(&str, Value)]) -> Vec<String> {
        let fields: Vec<&str> = filter.iter().map(|(f, _)| *f).collect();
        let values: Vec<&Value> = filter.iter().map(|(_, v)| v).collect();

        let all_scalar = values.iter().all(|v| !v.is_array() && !v.is_object());
        if all_scalar {
            if let Some(ids) = self.indexes.lookup_eq(&fields, &values) {
                return ids;
            }
        }

        self.documents
            .iter()
            .filter(|(_, doc)| {
                filter
                    .iter()
                    .all(|(field, wanted)| field_matches(doc, field, wanted))
            })
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Equality on a field, element-wise for array fields
fn field_matches(doc: &Value, field: &str, wanted: &Value) -> bool {
    match value_at(doc, field) {
        Some(actual) if actual == wanted => true,
        Some(Value::Array(items)) => items.iter().any(|item| item == wanted),
        _ => false,
    }
}
