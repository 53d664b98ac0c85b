//! JSON-lines persistence
//!
//! Layout under the data directory:
//!
//! ```text
//! data/<collection>.jsonl    one document per line, in _id order
//! ```
//!
//! Loading is all-or-nothing: every file is parsed and every document
//! re-validated, and every index rebuilt, before any collection is replaced.
//! Duplicate `_id`s or unique keys are FATAL.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::engine::{read_lock, write_lock, EntityStore};
use super::errors::{StoreError, StoreResult};
use crate::document::document_id;
use crate::index::{IndexManager, IndexSpec};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::SchemaValidator;

/// Directory holding the collection files
pub fn data_dir_for(data_dir: &Path) -> PathBuf {
    data_dir.join("data")
}

fn collection_file(data_dir: &Path, entity: &str) -> PathBuf {
    data_dir_for(data_dir).join(format!("{}.jsonl", entity))
}

impl EntityStore {
    /// Writes every collection to `<data_dir>/data/<collection>.jsonl`.
    ///
    /// Each file is written beside its target and renamed into place.
    /// Returns the number of documents written.
    pub fn save_snapshot(&self, data_dir: &Path) -> StoreResult<usize> {
        let dir = data_dir_for(data_dir);
        fs::create_dir_all(&dir).map_err(|e| StoreError::snapshot(&dir, e.to_string()))?;

        let mut written = 0;
        for (entity, lock) in &self.collections {
            let collection = read_lock(lock);
            let path = collection_file(data_dir, entity);
            write_collection(&path, collection.documents.values())?;
            written += collection.documents.len();
        }

        self.metrics.increment_snapshots_saved();
        log_event_with_fields(
            Event::SnapshotSaved,
            &[
                ("dir", &dir.display().to_string()),
                ("documents", &written.to_string()),
            ],
        );
        Ok(written)
    }

    /// Replaces every collection with the contents of its snapshot file.
    ///
    /// A collection without a file is loaded empty. Manually recorded links
    /// are dropped; field links are rebuilt from the loaded documents.
    /// Returns the number of documents loaded.
    pub fn load_snapshot(&self, data_dir: &Path) -> StoreResult<usize> {
        let result = self.try_load_snapshot(data_dir);
        if let Err(err) = &result {
            log_event_with_fields(
                Event::SnapshotLoadFailed,
                &[("code", err.code()), ("reason", &err.to_string())],
            );
        }
        result
    }

    fn try_load_snapshot(&self, data_dir: &Path) -> StoreResult<usize> {
        let validator = SchemaValidator::new(self.registry());
        let mut loaded: BTreeMap<&str, (BTreeMap<String, Value>, IndexManager)> = BTreeMap::new();

        for (entity, lock) in &self.collections {
            let path = collection_file(data_dir, entity);
            let documents = read_collection(&path, entity, &validator)?;

            log_event_with_fields(Event::IndexRebuildBegin, &[("entity", entity.as_str())]);
            let specs: Vec<IndexSpec> = read_lock(lock).indexes.specs().cloned().collect();
            let mut indexes = IndexManager::new();
            for spec in specs {
                indexes.declare(spec, std::iter::empty())?;
            }
            indexes.rebuild(documents.iter().map(|(id, doc)| (id.as_str(), doc)))?;
            for spec in indexes.specs() {
                let entries = indexes.entry_count(&spec.name).unwrap_or_default();
                log_event_with_fields(
                    Event::IndexRebuildComplete,
                    &[
                        ("entity", entity.as_str()),
                        ("index", spec.name.as_str()),
                        ("entries", entries.to_string().as_str()),
                    ],
                );
            }

            loaded.insert(entity.as_str(), (documents, indexes));
        }

        let mut total = 0;
        let mut links = Vec::new();
        for (entity, (documents, indexes)) in loaded {
            let mut collection = write_lock(self.collection(entity)?);
            for (id, doc) in &documents {
                links.push((collection.source_ref(doc, id), collection.outgoing_links(doc)));
            }
            total += documents.len();
            collection.documents = documents;
            collection.indexes = indexes;
        }

        let mut linker = write_lock(&self.linker);
        linker.clear();
        for (source, targets) in links {
            linker.replace_field_links(&source, targets);
        }
        drop(linker);

        self.metrics.increment_snapshots_loaded();
        log_event_with_fields(
            Event::SnapshotLoaded,
            &[
                ("dir", &data_dir_for(data_dir).display().to_string()),
                ("documents", &total.to_string()),
            ],
        );
        Ok(total)
    }
}

fn write_collection<'a, I>(path: &Path, documents: I) -> StoreResult<()>
where
    I: IntoIterator<Item = &'a Value>,
{
    let tmp = path.with_extension("jsonl.tmp");
    let io_err = |e: std::io::Error| StoreError::snapshot(path, e.to_string());

    let file = File::create(&tmp).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    for doc in documents {
        serde_json::to_writer(&mut writer, doc)?;
        writer.write_all(b"\n").map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;
    writer.get_ref().sync_all().map_err(io_err)?;
    drop(writer);

    fs::rename(&tmp, path).map_err(io_err)
}

fn read_collection(
    path: &Path,
    entity: &str,
    validator: &SchemaValidator<'_>,
) -> StoreResult<BTreeMap<String, Value>> {
    let mut documents = BTreeMap::new();
    if !path.exists() {
        return Ok(documents);
    }

    let file = File::open(path).map_err(|e| StoreError::snapshot(path, e.to_string()))?;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| StoreError::snapshot(path, e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }

        let doc: Value = serde_json::from_str(&line).map_err(|e| {
            StoreError::snapshot(path, format!("line {}: invalid JSON: {}", line_no, e))
        })?;
        validator.validate_document(entity, &doc).map_err(|e| {
            StoreError::snapshot(path, format!("line {}: {}", line_no, e))
        })?;

        let id = document_id(&doc)
            .map(str::to_string)
            .ok_or_else(|| StoreError::snapshot(path, format!("line {}: missing _id", line_no)))?;
        if documents.insert(id.clone(), doc).is_some() {
            return Err(StoreError::snapshot(
                path,
                format!("line {}: duplicate _id '{}'", line_no, id),
            ));
        }
    }

    Ok(documents)
}
