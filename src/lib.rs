//! esf-bootstrap: local development bootstrap for the Enterprise Service Framework.
//!
//! Two independent pipelines, both safe to re-run at any time:
//!
//! - **Table provisioning** (`init-table`): checks that the DynamoDB endpoint
//!   is reachable, looks the application table up and creates it with its
//!   fixed key schema only when absent. Losing a creation race to another
//!   process counts as success.
//! - **Document generation** (`specs`): renders the embedded specification
//!   documents into an output directory. Each file carries a metadata header
//!   that is replaced, never stacked, on regeneration. One failed document
//!   does not stop the others.
//!
//! # Examples
//!
//! ```bash
//! # Provision against DynamoDB Local on :8000
//! esf-bootstrap init-table
//!
//! # Regenerate every document under ./specs
//! esf-bootstrap specs --all
//!
//! # Only two documents, somewhere else
//! esf-bootstrap specs --auth --deployment --output-dir ./docs/specs
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: configuration, table model, service seam, header writer, assets
//! - [`plugins`]: the `init-table` and `specs` commands and the DynamoDB adapter

pub mod core;
pub mod plugins;

mod cli;

use crate::cli::{Cli, Command};
use crate::core::error::EsfError;
use crate::plugins::{provision, specs};
use clap::{CommandFactory, Parser};

/// Install the stderr diagnostics subscriber. `RUST_LOG` controls verbosity;
/// the default only shows warnings.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> Result<(), EsfError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::InitTable(provision_cli) => provision::run_provision_cli(provision_cli),
        Command::Specs(specs_cli) => match specs::run_specs_cli(specs_cli)? {
            specs::SpecsOutcome::Done => Ok(()),
            specs::SpecsOutcome::NothingSelected => {
                let mut cmd = Cli::command();
                if let Some(sub) = cmd.find_subcommand_mut("specs") {
                    sub.print_help()?;
                }
                Ok(())
            }
        },
    }
}
