//! The ticketing platform's collections
//!
//! Schemas, indexes, lifecycles, soft references and write rules of the ten
//! collections shared by the platform's services, plus sample seed data.

mod collections;
pub mod lifecycles;
pub mod schemas;
mod seed;

use std::path::Path;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{SchemaRegistry, SchemaResult};
use crate::store::{CollectionDef, EntityStore, StoreResult};

pub use seed::{sample_route, sample_trip, SAMPLE_ROUTE_ID, SAMPLE_TRIP_ID};

/// Catalog collection names, in declaration order
pub const COLLECTIONS: &[&str] = &[
    "users",
    "routes",
    "trips",
    "tickets",
    "payments",
    "notifications",
    "service_disruptions",
    "validations",
    "analytics_reports",
    "system_logs",
];

/// Catalog knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Allow tickets to go from CREATED straight to PAID
    pub ticket_direct_payment: bool,
    pub warn_on_dangling_references: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            ticket_direct_payment: true,
            warn_on_dangling_references: true,
        }
    }
}

impl From<&StoreConfig> for CatalogOptions {
    fn from(config: &StoreConfig) -> Self {
        Self {
            ticket_direct_payment: config.ticket_direct_payment,
            warn_on_dangling_references: config.warn_on_dangling_references,
        }
    }
}

/// Write rules of every catalog collection
pub fn collection_defs(options: CatalogOptions) -> Vec<CollectionDef> {
    collections::all(options.ticket_direct_payment)
}

/// In-memory registry holding the catalog schemas
pub fn registry() -> SchemaResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    register_catalog(&mut registry)?;
    Ok(registry)
}

/// Registry bound to `data_dir`.
///
/// Schemas saved under the data directory take precedence; an empty schema
/// directory yields the catalog schemas.
pub fn registry_for(data_dir: &Path) -> SchemaResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::with_data_dir(data_dir);
    let loaded = registry.load_all()?;
    if loaded == 0 {
        register_catalog(&mut registry)?;
    }
    Ok(registry)
}

fn register_catalog(registry: &mut SchemaRegistry) -> SchemaResult<()> {
    for schema in schemas::all() {
        registry.register(schema)?;
    }
    Ok(())
}

/// Store over `registry` with every catalog collection declared
pub fn build_store(registry: SchemaRegistry, options: CatalogOptions) -> StoreResult<EntityStore> {
    let mut store = EntityStore::new(Arc::new(registry))
        .warn_on_dangling(options.warn_on_dangling_references);
    for def in collection_defs(options) {
        store.declare_collection(def)?;
    }
    log_event_with_fields(
        Event::StoreOpened,
        &[("collections", &COLLECTIONS.len().to_string())],
    );
    Ok(store)
}

/// In-memory catalog store with default options
pub fn memory_store() -> StoreResult<EntityStore> {
    build_store(registry()?, CatalogOptions::default())
}

/// Opens the catalog store for a data directory and loads its snapshot
pub fn open_store(config: &StoreConfig) -> StoreResult<EntityStore> {
    let registry = registry_for(config.data_path())?;
    let store = build_store(registry, CatalogOptions::from(config))?;
    store.load_snapshot(config.data_path())?;
    Ok(store)
}

/// Inserts the sample route and trip. Returns their `_id`s.
pub fn seed(store: &EntityStore) -> StoreResult<Vec<String>> {
    let ids = vec![
        store.insert_record(&sample_route())?,
        store.insert_record(&sample_trip())?,
    ];
    log_event_with_fields(Event::SeedApplied, &[("documents", &ids.len().to_string())]);
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_every_collection_has_a_schema() {
        let registry = registry().unwrap();
        for name in COLLECTIONS {
            assert!(registry.contains(name), "missing schema for {}", name);
        }
        let defs = collection_defs(CatalogOptions::default());
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, COLLECTIONS);
    }

    #[test]
    fn test_seed_passes_validation() {
        let store = memory_store().unwrap();
        seed(&store).unwrap();

        assert!(store.resolve("routes", SAMPLE_ROUTE_ID).unwrap());
        assert!(store.dangling_references().is_empty());
        assert_eq!(
            store.referrers("routes", SAMPLE_ROUTE_ID),
            vec![crate::reference::EntityRef::new("trips", SAMPLE_TRIP_ID)]
        );
    }

    #[test]
    fn test_registry_for_prefers_saved_schemas() {
        let dir = TempDir::new().unwrap();
        let empty = registry_for(dir.path()).unwrap();
        assert_eq!(empty.schema_count(), COLLECTIONS.len());

        empty.save_all().unwrap();
        let reloaded = registry_for(dir.path()).unwrap();
        assert_eq!(reloaded.schema_count(), COLLECTIONS.len());
        assert_eq!(reloaded.get("tickets"), empty.get("tickets"));
    }
}
