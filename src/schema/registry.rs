//! Schema registry
//!
//! Holds exactly one schema per entity type. The registry is built once at
//! process start and handed to the store behind an `Arc`.
//!
//! On disk, schemas live at `<data_dir>/metadata/schemas/schema_<entity>_<version>.json`,
//! one file per entity type.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, FieldType, Schema};
use super::validator::SchemaValidator;
use crate::observability::{log_event_with_fields, Event};

/// Registry of entity schemas, optionally backed by a schema directory.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    /// Directory containing schema files, if any
    schema_dir: Option<PathBuf>,
    /// Registered schemas indexed by entity type
    schemas: BTreeMap<String, Schema>,
    /// Compiled patterns keyed by their source text
    patterns: HashMap<String, Regex>,
}

impl SchemaRegistry {
    /// Creates an empty in-memory registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry backed by `<data_dir>/metadata/schemas/`.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self {
            schema_dir: Some(schema_dir_for(data_dir)),
            ..Self::default()
        }
    }

    /// Returns the schema directory path, if any.
    pub fn schema_dir(&self) -> Option<&Path> {
        self.schema_dir.as_deref()
    }

    /// Registers the schema for an entity type.
    ///
    /// Fails if the schema is malformed or the entity type already has one.
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        schema
            .validate_structure()
            .map_err(|e| SchemaError::malformed_schema(&schema.entity_type, e))?;

        if self.schemas.contains_key(&schema.entity_type) {
            return Err(SchemaError::schema_immutable(
                &schema.entity_type,
                &schema.schema_version,
            ));
        }

        for def in schema.fields.values() {
            self.compile_patterns(def)?;
        }

        log_event_with_fields(
            Event::SchemaRegistered,
            &[
                ("entity", &schema.entity_type),
                ("version", &schema.schema_version),
            ],
        );
        self.schemas.insert(schema.entity_type.clone(), schema);
        Ok(())
    }

    fn compile_patterns(&mut self, def: &FieldDef) -> SchemaResult<()> {
        if let Some(pattern) = &def.pattern {
            if !self.patterns.contains_key(pattern) {
                let regex = Regex::new(pattern)
                    .map_err(|e| SchemaError::malformed_schema(pattern, e.to_string()))?;
                self.patterns.insert(pattern.clone(), regex);
            }
        }

        match &def.field_type {
            FieldType::Object { fields } => {
                for nested in fields.values() {
                    self.compile_patterns(nested)?;
                }
            }
            FieldType::Array { items } => self.compile_patterns(items)?,
            FieldType::Map { values } => self.compile_patterns(values)?,
            _ => {}
        }

        Ok(())
    }

    /// Validates a document against the schema of `entity_type`.
    ///
    /// Pure check: returns a violation for malformed documents and an
    /// `UnknownEntityType` (FATAL) error when nothing is registered.
    pub fn validate(&self, entity_type: &str, document: &Value) -> SchemaResult<()> {
        SchemaValidator::new(self).validate_document(entity_type, document)
    }

    /// Gets the schema for an entity type.
    pub fn get(&self, entity_type: &str) -> Option<&Schema> {
        self.schemas.get(entity_type)
    }

    /// Gets the schema for an entity type or fails with `UnknownEntityType`.
    pub fn require(&self, entity_type: &str) -> SchemaResult<&Schema> {
        self.get(entity_type)
            .ok_or_else(|| SchemaError::unknown_entity_type(entity_type))
    }

    /// Checks if an entity type is registered.
    pub fn contains(&self, entity_type: &str) -> bool {
        self.schemas.contains_key(entity_type)
    }

    /// Returns registered entity types in name order.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Returns all registered schemas.
    pub fn all_schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    /// Returns the number of registered schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    pub(crate) fn pattern(&self, source: &str) -> Option<&Regex> {
        self.patterns.get(source)
    }

    /// Loads all schema files from the schema directory.
    ///
    /// Missing directory means no schemas; malformed files are FATAL.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        let dir = self.require_dir()?.to_path_buf();

        if !dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&dir).map_err(|e| {
            SchemaError::malformed_schema(
                dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }

        // Deterministic load order
        paths.sort();

        for path in &paths {
            self.load_schema_file(path)?;
        }

        log_event_with_fields(
            Event::SchemasLoaded,
            &[
                ("dir", &dir.display().to_string()),
                ("count", &paths.len().to_string()),
            ],
        );
        Ok(paths.len())
    }

    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let schema: Schema = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        self.register(schema)
    }

    /// Saves a schema to the schema directory.
    ///
    /// Refuses to overwrite an existing file for the same entity and version.
    pub fn save_schema(&self, schema: &Schema) -> SchemaResult<PathBuf> {
        let dir = self.require_dir()?;
        let path = dir.join(format!(
            "schema_{}_{}.json",
            schema.entity_type, schema.schema_version
        ));

        if path.exists() {
            return Err(SchemaError::schema_immutable(
                &schema.entity_type,
                &schema.schema_version,
            ));
        }

        fs::create_dir_all(dir).map_err(|e| {
            SchemaError::malformed_schema(
                dir.display().to_string(),
                format!("Failed to create schema directory: {}", e),
            )
        })?;

        let content = serde_json::to_string_pretty(schema).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to serialize schema: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }

    /// Saves every registered schema.
    pub fn save_all(&self) -> SchemaResult<Vec<PathBuf>> {
        self.schemas.values().map(|s| self.save_schema(s)).collect()
    }

    fn require_dir(&self) -> SchemaResult<&Path> {
        self.schema_dir
            .as_deref()
            .ok_or_else(|| SchemaError::malformed_schema("<in-memory>", "registry has no schema directory"))
    }
}

/// Schema directory under a data directory.
pub fn schema_dir_for(data_dir: &Path) -> PathBuf {
    data_dir.join("metadata").join("schemas")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;
    use tempfile::TempDir;

    fn sample_schema() -> Schema {
        let mut fields = BTreeMap::new();
        fields.insert("_id".into(), FieldDef::required_string());
        fields.insert("routeId".into(), FieldDef::required_string());
        fields.insert(
            "transportType".into(),
            FieldDef::required_enum(&["BUS", "TRAIN"]),
        );
        Schema::new("routes", "v1", fields)
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = SchemaRegistry::new();
        registry.register(sample_schema()).unwrap();

        assert!(registry.contains("routes"));
        assert_eq!(registry.get("routes").unwrap().schema_version, "v1");
        assert_eq!(registry.entity_types().collect::<Vec<_>>(), vec!["routes"]);
    }

    #[test]
    fn test_schema_immutability() {
        let mut registry = SchemaRegistry::new();
        registry.register(sample_schema()).unwrap();

        let err = registry.register(sample_schema()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::SchemaImmutable);
    }

    #[test]
    fn test_require_unknown_entity() {
        let registry = SchemaRegistry::new();
        let err = registry.require("buses").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownEntityType);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = SchemaRegistry::with_data_dir(temp_dir.path());
        registry.register(sample_schema()).unwrap();
        let paths = registry.save_all().unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("schema_routes_v1.json"));

        let mut reloaded = SchemaRegistry::with_data_dir(temp_dir.path());
        assert_eq!(reloaded.load_all().unwrap(), 1);
        assert_eq!(reloaded.get("routes"), registry.get("routes"));
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let registry = SchemaRegistry::with_data_dir(temp_dir.path());
        registry.save_schema(&sample_schema()).unwrap();

        let err = registry.save_schema(&sample_schema()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::SchemaImmutable);
    }

    #[test]
    fn test_load_malformed_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let dir = schema_dir_for(temp_dir.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("schema_broken_v1.json"), "{ not json").unwrap();

        let mut registry = SchemaRegistry::with_data_dir(temp_dir.path());
        let err = registry.load_all().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MalformedSchema);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = SchemaRegistry::with_data_dir(temp_dir.path());
        assert_eq!(registry.load_all().unwrap(), 0);
        assert_eq!(registry.schema_count(), 0);
    }

    #[test]
    fn test_in_memory_registry_cannot_save() {
        let registry = SchemaRegistry::new();
        assert!(registry.save_schema(&sample_schema()).is_err());
    }
}
