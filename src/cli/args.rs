//! CLI argument definitions using clap
//!
//! Commands:
//! - ticketing-store init --config <path> [--seed]
//! - ticketing-store validate --config <path> --entity <collection>
//! - ticketing-store apply --config <path>
//! - ticketing-store get --config <path> --entity <collection> --key <key>
//! - ticketing-store schemas
//! - ticketing-store check-refs --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Schema-validated entity store for the transport ticketing platform
#[derive(Parser, Debug)]
#[command(name = "ticketing-store")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and write the catalog schemas
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./ticketing.json")]
        config: PathBuf,

        /// Also store the sample route and trip
        #[arg(long)]
        seed: bool,
    },

    /// Validate one JSON document read from stdin
    Validate {
        #[arg(long, default_value = "./ticketing.json")]
        config: PathBuf,

        /// Collection the document belongs to
        #[arg(long)]
        entity: String,
    },

    /// Apply JSON-lines write requests from stdin, then save
    Apply {
        #[arg(long, default_value = "./ticketing.json")]
        config: PathBuf,
    },

    /// Print one document by business key or _id
    Get {
        #[arg(long, default_value = "./ticketing.json")]
        config: PathBuf,

        #[arg(long)]
        entity: String,

        #[arg(long)]
        key: String,
    },

    /// Print the catalog schemas
    Schemas,

    /// List references whose target does not exist
    CheckRefs {
        #[arg(long, default_value = "./ticketing.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
