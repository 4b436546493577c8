//! CLI struct definitions for the esf-bootstrap command-line interface.
//!
//! All clap-derived top-level types live here. Per-command argument structs
//! live next to their implementation in `plugins/`.

use crate::plugins::{provision, specs};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(
    name = "esf-bootstrap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Local development bootstrap: provision the DynamoDB table and regenerate the technical specification documents."
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create the application table if it does not exist yet
    #[clap(name = "init-table", alias = "init-dynamodb")]
    InitTable(provision::ProvisionCli),

    /// Generate technical specification documents
    Specs(specs::SpecsCli),

    /// Print the version
    Version,
}
