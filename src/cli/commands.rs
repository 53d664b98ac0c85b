//! CLI command implementations

use std::fs;
use std::io;
use std::path::Path;

use serde_json::{json, Value};

use crate::catalog::{self, CatalogOptions};
use crate::config::StoreConfig;
use crate::observability::{init_logging, log_event_with_fields, Event};
use crate::schema::{schema_dir_for, SchemaValidator};
use crate::store::{data_dir_for, StoreError};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_document, read_lines, write_error, write_response};
use super::requests::WriteRequest;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config, seed } => init(&config, seed),
        Command::Validate { config, entity } => validate(&config, &entity),
        Command::Apply { config } => apply(&config),
        Command::Get {
            config,
            entity,
            key,
        } => get(&config, &entity, &key),
        Command::Schemas => schemas(),
        Command::CheckRefs { config } => check_refs(&config),
    }
}

fn load_config(path: &Path) -> CliResult<StoreConfig> {
    let config = StoreConfig::load(path)?;
    init_logging(&config);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("path", &path.display().to_string()),
            ("data_dir", &config.data_dir.display().to_string()),
        ],
    );
    Ok(config)
}

fn is_initialized(data_dir: &Path) -> bool {
    schema_dir_for(data_dir).is_dir()
}

fn require_initialized(data_dir: &Path) -> CliResult<()> {
    if is_initialized(data_dir) {
        Ok(())
    } else {
        Err(CliError::NotInitialized(data_dir.to_path_buf()))
    }
}

/// Creates the data directory layout and writes the catalog schemas.
///
/// With `seed`, the sample route and trip are stored as well.
pub fn init(config_path: &Path, seed: bool) -> CliResult<()> {
    let config = load_config(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::AlreadyInitialized(data_dir.to_path_buf()));
    }

    for dir in [data_dir_for(data_dir), schema_dir_for(data_dir)] {
        fs::create_dir_all(&dir)?;
    }

    let registry = catalog::registry_for(data_dir)?;
    let saved = registry.save_all()?;

    let mut seeded = 0;
    if seed {
        let store = catalog::build_store(registry, CatalogOptions::from(&config))?;
        seeded = catalog::seed(&store)?.len();
        store.save_snapshot(data_dir)?;
    }

    write_response(json!({
        "initialized": true,
        "schemas": saved.len(),
        "seeded": seeded
    }))
}

/// Validates one document from stdin without storing it
pub fn validate(config_path: &Path, entity: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    require_initialized(config.data_path())?;

    let registry = catalog::registry_for(config.data_path())?;
    let document = read_document()?;

    match SchemaValidator::new(&registry).validate_document(entity, &document) {
        Ok(()) => write_response(json!({ "valid": true })),
        Err(e) => {
            write_error(e.code().code(), e.message())?;
            Err(e.into())
        }
    }
}

/// Applies write requests from stdin, one response per line.
///
/// A refused request does not stop the run. The snapshot is saved once
/// all input is consumed.
pub fn apply(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    require_initialized(config.data_path())?;

    let store = catalog::open_store(&config)?;

    let stdin = io::stdin();
    for line in read_lines(stdin.lock()) {
        let line = line?;
        let request: WriteRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                write_error("TICKETING_CLI_BAD_INPUT", &e.to_string())?;
                continue;
            }
        };

        match request.execute(&store) {
            Ok(data) => write_response(data)?,
            Err(e) if e.is_fatal() => {
                write_error(e.code(), &e.to_string())?;
                return Err(e.into());
            }
            Err(e) => write_error(e.code(), &e.to_string())?,
        }
    }

    store.save_snapshot(config.data_path())?;
    Ok(())
}

/// Prints one document by business key, falling back to `_id`
pub fn get(config_path: &Path, entity: &str, key: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    require_initialized(config.data_path())?;

    let store = catalog::open_store(&config)?;
    let found = match store.get_by_key(entity, key)? {
        Some(doc) => Some(doc),
        None => store.get(entity, key)?,
    };

    match found {
        Some(doc) => write_response(doc),
        None => {
            let err = StoreError::not_found(entity, key);
            write_error(err.code(), &err.to_string())?;
            Err(err.into())
        }
    }
}

/// Prints the catalog schemas
pub fn schemas() -> CliResult<()> {
    let schemas: Vec<Value> = catalog::schemas::all()
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;
    write_response(Value::Array(schemas))
}

/// Lists dangling references across the stored collections
pub fn check_refs(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    require_initialized(config.data_path())?;

    let store = catalog::open_store(&config)?;
    let dangling = store.dangling_references();
    write_response(json!({
        "count": dangling.len(),
        "dangling": serde_json::to_value(&dangling)?
    }))
}
