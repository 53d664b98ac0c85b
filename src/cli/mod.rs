//! CLI module for the ticketing store
//!
//! Provides command-line interface for:
//! - init: Create directory structure and write the catalog schemas
//! - validate: Check one document against its schema
//! - apply: Run JSON-lines write requests
//! - get: Fetch one document
//! - schemas: Print the catalog schemas
//! - check-refs: Report dangling references

mod args;
mod commands;
mod errors;
mod io;
mod requests;

pub use args::{Cli, Command};
pub use commands::{apply, check_refs, get, init, run, run_command, schemas, validate};
pub use errors::{CliError, CliResult};
pub use io::{error_response, ok_response, write_error, write_response};
pub use requests::WriteRequest;
