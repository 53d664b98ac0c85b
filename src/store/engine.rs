//! Entity store
//!
//! The write path tying schemas, indexes, lifecycles and references
//! together. Every write to a collection runs under that collection's write
//! lock from the unique check through the commit, which makes insert an
//! atomic insert-if-absent on every unique key.
//!
//! Lock order: collection, then linker. Nothing takes a collection lock
//! while holding the linker lock.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};
use uuid::Uuid;

use super::collection::{Collection, CollectionDef};
use super::errors::{StoreError, StoreResult};
use crate::document::{document_id, str_at, value_at, ID_FIELD};
use crate::index::{IndexKey, IndexSpec, UniqueConflict};
use crate::lifecycle::{StatusMachine, TransitionRefusal};
use crate::model::Entity;
use crate::observability::{log_event_with_fields, Event, StoreMetrics};
use crate::reference::{EntityRef, Link, ReferenceLinker, SoftRef};
use crate::schema::{SchemaError, SchemaRegistry, SchemaValidator, Violation};

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of a committed write, used for logging and reference checks
struct Committed {
    id: String,
    document: Value,
    source: EntityRef,
    links: Vec<(String, EntityRef)>,
    status_change: Option<(String, String)>,
}

/// Schema-validated document store over the declared collections
pub struct EntityStore {
    registry: Arc<SchemaRegistry>,
    pub(crate) collections: BTreeMap<String, RwLock<Collection>>,
    pub(crate) linker: RwLock<ReferenceLinker>,
    pub(crate) metrics: Arc<StoreMetrics>,
    warn_on_dangling: bool,
}

impl EntityStore {
    /// Creates a store with no collections over `registry`
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            collections: BTreeMap::new(),
            linker: RwLock::new(ReferenceLinker::new()),
            metrics: Arc::new(StoreMetrics::new()),
            warn_on_dangling: true,
        }
    }

    /// Whether dangling references are logged as warnings. They are always counted.
    pub fn warn_on_dangling(mut self, enabled: bool) -> Self {
        self.warn_on_dangling = enabled;
        self
    }

    /// Declares a collection and its indexes.
    ///
    /// # Errors
    ///
    /// - `TICKETING_UNKNOWN_ENTITY_TYPE` if the registry has no schema for it
    /// - `TICKETING_COLLECTION_EXISTS` if it is already declared
    pub fn declare_collection(&mut self, def: CollectionDef) -> StoreResult<()> {
        self.registry.require(&def.name)?;

        if self.collections.contains_key(&def.name) {
            return Err(StoreError::CollectionExists { entity: def.name });
        }

        let mut collection = Collection::new(def.clone());
        for spec in def.indexes {
            collection.indexes.declare(spec, std::iter::empty())?;
        }

        log_event_with_fields(Event::CollectionDeclared, &[("entity", &def.name)]);
        self.collections.insert(def.name, RwLock::new(collection));
        Ok(())
    }

    /// Declares an index on a live collection, building it over the
    /// documents already stored.
    pub fn declare_index(&self, entity: &str, spec: IndexSpec) -> StoreResult<()> {
        let mut guard = write_lock(self.collection(entity)?);
        let collection = &mut *guard;

        collection.indexes.declare(
            spec.clone(),
            collection
                .documents
                .iter()
                .map(|(id, doc)| (id.as_str(), doc)),
        )?;

        log_event_with_fields(
            Event::IndexDeclared,
            &[("entity", entity), ("index", &spec.name)],
        );
        collection.def.indexes.push(spec);
        Ok(())
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    /// Declared collection names, sorted
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Write rules of a collection
    pub fn definition(&self, entity: &str) -> StoreResult<CollectionDef> {
        Ok(read_lock(self.collection(entity)?).def.clone())
    }

    pub(crate) fn collection(&self, entity: &str) -> StoreResult<&RwLock<Collection>> {
        self.collections
            .get(entity)
            .ok_or_else(|| StoreError::unknown_entity(entity))
    }

    // ---------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------

    /// Inserts a document and returns its `_id`.
    ///
    /// A missing `_id` is generated. The document is validated, checked
    /// against every unique index, committed and linked.
    pub fn insert(&self, entity: &str, document: Value) -> StoreResult<String> {
        let result = self.try_insert(entity, document);
        let committed = self.observe(entity, "insert", result)?;

        self.metrics.increment_inserts();
        log_event_with_fields(
            Event::DocumentInserted,
            &[("entity", entity), ("id", &committed.id)],
        );
        self.report_dangling(&committed);
        Ok(committed.id)
    }

    fn try_insert(&self, entity: &str, mut document: Value) -> StoreResult<Committed> {
        let lock = self.collection(entity)?;

        if let Some(obj) = document.as_object_mut() {
            if !obj.contains_key(ID_FIELD) {
                obj.insert(
                    ID_FIELD.to_string(),
                    Value::String(Uuid::new_v4().to_string()),
                );
            }
        }

        self.validator().validate_document(entity, &document)?;
        let id = document_id(&document)
            .map(str::to_string)
            .ok_or_else(|| violation(entity, Violation::missing_field(ID_FIELD)))?;

        let mut collection = write_lock(lock);

        if let Some(machine) = &collection.def.lifecycle {
            if let Some(state) = str_at(&document, machine.field()) {
                if !machine.is_initial(state) {
                    return Err(StoreError::InvalidInitialState {
                        entity: entity.to_string(),
                        id,
                        state: state.to_string(),
                    });
                }
            }
        }

        if collection.documents.contains_key(&id) {
            return Err(StoreError::UniquenessViolation {
                entity: entity.to_string(),
                field: ID_FIELD.to_string(),
                value: Value::String(id.clone()).to_string(),
                conflicting_id: id,
            });
        }
        collection
            .indexes
            .check_unique(&document, None)
            .map_err(|c| uniqueness(entity, c))?;

        collection.indexes.apply_write(&id, None, &document);
        let source = collection.source_ref(&document, &id);
        let links = collection.outgoing_links(&document);
        collection.documents.insert(id.clone(), document.clone());

        write_lock(&self.linker).replace_field_links(&source, links.clone());

        Ok(Committed {
            id,
            document,
            source,
            links,
            status_change: None,
        })
    }

    /// Applies a top-level merge patch and returns the stored document.
    ///
    /// Patch members replace fields; `null` members remove them. The merged
    /// document must pass schema, identity, lifecycle, append-only and
    /// unique checks. A patch naming the status field is checked against the
    /// lifecycle even when the value is unchanged.
    pub fn update(&self, entity: &str, id: &str, patch: Value) -> StoreResult<Value> {
        let patch = match patch {
            Value::Object(map) => map,
            other => {
                let err = violation(
                    entity,
                    Violation::type_mismatch("$patch", "object", json_kind(&other)),
                );
                return self.observe(entity, "update", Err(err));
            }
        };

        let touched: Vec<String> = patch.keys().cloned().collect();
        self.write_existing(entity, id, "update", &touched, move |existing| {
            Ok(merge_patch(existing, patch))
        })
    }

    /// Moves the lifecycle field of a document to `status`.
    ///
    /// Refused in a terminal state, even when `status` is the current one.
    pub fn transition(&self, entity: &str, id: &str, status: &str) -> StoreResult<Value> {
        let field = {
            let lock = self.collection(entity)?;
            let collection = read_lock(lock);
            collection
                .def
                .lifecycle
                .as_ref()
                .map(|machine| machine.field().to_string())
        };
        let field = match field {
            Some(field) => field,
            None => {
                let err = StoreError::NoLifecycle {
                    entity: entity.to_string(),
                };
                return self.observe(entity, "transition", Err(err));
            }
        };

        let touched = [field.clone()];
        let mut patch = Map::new();
        patch.insert(field, Value::String(status.to_string()));
        self.write_existing(entity, id, "transition", &touched, move |existing| {
            Ok(merge_patch(existing, patch))
        })
    }

    /// Appends `item` to the array at top-level `field`, creating it if absent
    pub fn append(&self, entity: &str, id: &str, field: &str, item: Value) -> StoreResult<Value> {
        self.write_existing(entity, id, "append", &[field.to_string()], |existing| {
            let mut updated = existing.clone();
            let obj = updated
                .as_object_mut()
                .ok_or_else(|| violation(entity, Violation::type_mismatch("$root", "object", json_kind(existing))))?;

            match obj
                .entry(field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => items.push(item),
                other => {
                    return Err(violation(
                        entity,
                        Violation::type_mismatch(field, "array", json_kind(other)),
                    ))
                }
            }
            Ok(updated)
        })
    }

    fn write_existing<F>(
        &self,
        entity: &str,
        id: &str,
        op: &str,
        touched: &[String],
        build: F,
    ) -> StoreResult<Value>
    where
        F: FnOnce(&Value) -> StoreResult<Value>,
    {
        let result = self.try_write_existing(entity, id, touched, build);
        let committed = self.observe(entity, op, result)?;

        self.metrics.increment_updates();
        log_event_with_fields(
            Event::DocumentUpdated,
            &[("entity", entity), ("id", &committed.id), ("op", op)],
        );
        if let Some((from, to)) = &committed.status_change {
            self.metrics.increment_transitions();
            log_event_with_fields(
                Event::StatusTransition,
                &[("entity", entity), ("id", &committed.id), ("from", from), ("to", to)],
            );
        }
        self.report_dangling(&committed);
        Ok(committed.document)
    }

    /// `touched` names the top-level fields the write sets or removes
    fn try_write_existing<F>(
        &self,
        entity: &str,
        id: &str,
        touched: &[String],
        build: F,
    ) -> StoreResult<Committed>
    where
        F: FnOnce(&Value) -> StoreResult<Value>,
    {
        let lock = self.collection(entity)?;
        let mut collection = write_lock(lock);

        if collection.def.immutable {
            return Err(StoreError::ImmutableDocument {
                entity: entity.to_string(),
                id: id.to_string(),
            });
        }

        let existing = collection
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(entity, id))?;

        let updated = build(&existing)?;
        self.validator().validate_update(entity, id, &updated)?;
        check_identity(&collection.def, entity, id, &existing, &updated)?;

        let status_change = match &collection.def.lifecycle {
            Some(machine) if touched.iter().any(|f| f == machine.field()) => {
                check_transition(entity, id, machine, &existing, &updated)?
            }
            _ => None,
        };
        check_append_only(&collection.def, entity, id, &existing, &updated)?;

        collection
            .indexes
            .check_unique(&updated, Some(id))
            .map_err(|c| uniqueness(entity, c))?;

        collection.indexes.apply_write(id, Some(&existing), &updated);
        let old_source = collection.source_ref(&existing, id);
        let source = collection.source_ref(&updated, id);
        let links = collection.outgoing_links(&updated);
        collection.documents.insert(id.to_string(), updated.clone());

        {
            let mut linker = write_lock(&self.linker);
            if old_source != source {
                linker.replace_field_links(&old_source, Vec::new());
            }
            linker.replace_field_links(&source, links.clone());
        }

        Ok(Committed {
            id: id.to_string(),
            document: updated,
            source,
            links,
            status_change,
        })
    }

    /// Counts and logs a refused write, passing the result through
    fn observe<T>(&self, entity: &str, op: &str, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(err) = &result {
            self.metrics.increment_rejections(err.rejection_kind());
            log_event_with_fields(
                Event::WriteRejected,
                &[
                    ("entity", entity),
                    ("op", op),
                    ("code", err.code()),
                    ("reason", &err.to_string()),
                ],
            );
        }
        result
    }

    fn report_dangling(&self, committed: &Committed) {
        let missing: Vec<&EntityRef> = committed
            .links
            .iter()
            .map(|(_, target)| target)
            .filter(|target| !self.exists(target))
            .collect();

        if missing.is_empty() {
            return;
        }

        self.metrics.add_dangling_references(missing.len() as u64);
        if self.warn_on_dangling {
            for target in missing {
                log_event_with_fields(
                    Event::DanglingReference,
                    &[
                        ("source", &format!("{}/{}", committed.source.entity, committed.source.key)),
                        ("target", &format!("{}/{}", target.entity, target.key)),
                    ],
                );
            }
        }
    }

    fn validator(&self) -> SchemaValidator<'_> {
        SchemaValidator::new(&self.registry)
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Document by `_id`
    pub fn get(&self, entity: &str, id: &str) -> StoreResult<Option<Value>> {
        let collection = read_lock(self.collection(entity)?);
        Ok(collection.documents.get(id).cloned())
    }

    /// Document by business key (`ticketId`, `routeId`, ... or `_id` for users)
    pub fn get_by_key(&self, entity: &str, key: &str) -> StoreResult<Option<Value>> {
        let collection = read_lock(self.collection(entity)?);
        Ok(collection
            .id_for_key(key)
            .and_then(|id| collection.documents.get(&id).cloned()))
    }

    /// Documents whose fields equal every given value, in `_id` order.
    ///
    /// Array fields match when any element equals the value.
    pub fn find(&self, entity: &str, filter: &[(&str, Value)]) -> StoreResult<Vec<Value>> {
        let collection = read_lock(self.collection(entity)?);
        Ok(collection
            .matching_ids(filter)
            .iter()
            .filter_map(|id| collection.documents.get(id).cloned())
            .collect())
    }

    /// Documents with `field` within `[min, max]`, in `_id` order.
    ///
    /// Open bounds are `None`. Values compare bool < int < float < string.
    pub fn find_range(
        &self,
        entity: &str,
        field: &str,
        min: Option<&Value>,
        max: Option<&Value>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>> {
        let collection = read_lock(self.collection(entity)?);

        let ids = match collection.indexes.lookup_range(field, min, max, limit) {
            Some(ids) => ids,
            None => {
                let lower = min.and_then(IndexKey::from_json);
                let upper = max.and_then(IndexKey::from_json);
                let in_range = |key: &IndexKey| {
                    lower.as_ref().map_or(true, |lo| key >= lo)
                        && upper.as_ref().map_or(true, |hi| key <= hi)
                };

                let matching = collection.documents.iter().filter(|(_, doc)| {
                    value_at(doc, field)
                        .map_or(false, |v| IndexKey::expand(v).iter().any(|k| in_range(k)))
                });
                matching
                    .map(|(id, _)| id.clone())
                    .take(limit.unwrap_or(usize::MAX))
                    .collect()
            }
        };

        Ok(ids
            .iter()
            .filter_map(|id| collection.documents.get(id).cloned())
            .collect())
    }

    pub fn count(&self, entity: &str) -> StoreResult<usize> {
        Ok(read_lock(self.collection(entity)?).documents.len())
    }

    /// Every document of a collection, in `_id` order
    pub fn documents(&self, entity: &str) -> StoreResult<Vec<Value>> {
        Ok(read_lock(self.collection(entity)?)
            .documents
            .values()
            .cloned()
            .collect())
    }

    // ---------------------------------------------------------------------
    // References
    // ---------------------------------------------------------------------

    /// Whether a document with business key `key` exists. Advisory only.
    pub fn resolve(&self, entity: &str, key: &str) -> StoreResult<bool> {
        Ok(read_lock(self.collection(entity)?).id_for_key(key).is_some())
    }

    /// Fetches the target of a soft reference, if it exists
    pub fn resolve_ref<E: Entity>(&self, reference: &SoftRef<E>) -> StoreResult<Option<E>> {
        self.get_record_by_key(reference.key())
    }

    fn exists(&self, target: &EntityRef) -> bool {
        self.collections
            .get(&target.entity)
            .map_or(false, |lock| read_lock(lock).id_for_key(&target.key).is_some())
    }

    /// Records a reference that no field of the source carries
    pub fn link(&self, source_type: &str, source_id: &str, target_type: &str, target_id: &str) -> bool {
        write_lock(&self.linker).link(source_type, source_id, target_type, target_id)
    }

    /// Documents referencing `entity`/`key`
    pub fn referrers(&self, entity: &str, key: &str) -> Vec<EntityRef> {
        read_lock(&self.linker).referrers(&EntityRef::new(entity, key))
    }

    /// References held by `entity`/`key`
    pub fn references_from(&self, entity: &str, key: &str) -> Vec<Link> {
        read_lock(&self.linker).references_from(&EntityRef::new(entity, key))
    }

    /// Every recorded reference whose target does not exist
    pub fn dangling_references(&self) -> Vec<Link> {
        // copied out so no collection lock is taken under the linker lock
        let links: Vec<Link> = read_lock(&self.linker).links().collect();
        links
            .into_iter()
            .filter(|link| !self.exists(&link.target))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Typed records
    // ---------------------------------------------------------------------

    /// Inserts a typed record into its collection
    pub fn insert_record<T: Entity>(&self, record: &T) -> StoreResult<String> {
        self.insert(T::COLLECTION, serde_json::to_value(record)?)
    }

    pub fn get_record<T: Entity>(&self, id: &str) -> StoreResult<Option<T>> {
        self.get(T::COLLECTION, id)?
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .transpose()
    }

    pub fn get_record_by_key<T: Entity>(&self, key: &str) -> StoreResult<Option<T>> {
        self.get_by_key(T::COLLECTION, key)?
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .transpose()
    }
}

fn violation(entity: &str, violation: Violation) -> StoreError {
    StoreError::Schema(SchemaError::violation(entity, violation))
}

fn uniqueness(entity: &str, conflict: UniqueConflict) -> StoreError {
    StoreError::UniquenessViolation {
        entity: entity.to_string(),
        field: conflict.field,
        value: conflict.value,
        conflicting_id: conflict.conflicting_id,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn merge_patch(existing: &Value, patch: Map<String, Value>) -> Value {
    let mut merged = existing.clone();
    if let Value::Object(base) = &mut merged {
        for (key, value) in patch {
            if value.is_null() {
                base.remove(&key);
            } else {
                base.insert(key, value);
            }
        }
    }
    merged
}

/// Identity fields keep the value they were inserted with
fn check_identity(
    def: &CollectionDef,
    entity: &str,
    id: &str,
    existing: &Value,
    updated: &Value,
) -> StoreResult<()> {
    for field in &def.identity {
        let old = match value_at(existing, field) {
            Some(old) => old,
            None => continue,
        };
        if value_at(updated, field) != Some(old) {
            return Err(StoreError::ImmutableField {
                entity: entity.to_string(),
                id: id.to_string(),
                field: field.clone(),
            });
        }
    }
    Ok(())
}

/// Checks a write that names the status field.
///
/// Returns the `(from, to)` pair when the status actually changes.
fn check_transition(
    entity: &str,
    id: &str,
    machine: &StatusMachine,
    existing: &Value,
    updated: &Value,
) -> StoreResult<Option<(String, String)>> {
    let field = machine.field();
    let (from, to) = match (str_at(existing, field), str_at(updated, field)) {
        (Some(from), Some(to)) => (from, to),
        _ => return Ok(None),
    };

    machine.check(from, to).map_err(|refusal| match refusal {
        TransitionRefusal::Terminal { current } => StoreError::TerminalStateViolation {
            entity: entity.to_string(),
            id: id.to_string(),
            current_state: current,
            attempted: to.to_string(),
        },
        TransitionRefusal::Undeclared { from, to } => StoreError::InvalidTransition {
            entity: entity.to_string(),
            id: id.to_string(),
            from,
            to,
        },
    })?;

    Ok((from != to).then(|| (from.to_string(), to.to_string())))
}

/// Existing entries of append-only fields must survive unchanged, in order
fn check_append_only(
    def: &CollectionDef,
    entity: &str,
    id: &str,
    existing: &Value,
    updated: &Value,
) -> StoreResult<()> {
    for field in &def.append_only {
        let old = match value_at(existing, field).and_then(Value::as_array) {
            Some(old) => old,
            None => continue,
        };
        let keeps_prefix = value_at(updated, field)
            .and_then(Value::as_array)
            .map_or(false, |new| {
                new.len() >= old.len() && new[..old.len()] == old[..]
            });

        if !keeps_prefix {
            return Err(StoreError::AppendOnlyViolation {
                entity: entity.to_string(),
                id: id.to_string(),
                field: field.clone(),
            });
        }
    }
    Ok(())
}
