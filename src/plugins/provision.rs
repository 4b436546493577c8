//! Idempotent table provisioning.
//!
//! `ensure` runs a three-step check-then-act sequence against a
//! [`TableService`]: liveness probe, existence check, create. A create that
//! loses a race to another provisioner comes back as a conflict and is
//! reported as [`ProvisioningOutcome::AlreadyExists`], so repeated or
//! concurrent invocations converge on the same table without locks.

use crate::core::config::{ConfigOverrides, ProvisionConfig};
use crate::core::error::EsfError;
use crate::core::service::{CreateResult, TableLookup, TableService};
use crate::core::table::TableDescriptor;
use crate::core::time;
use crate::plugins::dynamo::DynamoTableService;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const START_SERVICE_HINT: &str = "docker-compose -f docker/docker-compose.yml up -d";
pub const BOOTSTRAP_HINT: &str = "./scripts/esf-cli.sh bootstrap -u admin -e admin@example.com -p";

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ProvisionFailure {
    #[error("service unreachable: {0}")]
    ServiceUnreachable(String),
    #[error("error checking table: {0}")]
    Describe(String),
    #[error("error creating table: {0}")]
    Creation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    AlreadyExists,
    Created,
    Failed(ProvisionFailure),
}

impl ProvisioningOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ProvisioningOutcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProvisioningOutcome::AlreadyExists => "already_exists",
            ProvisioningOutcome::Created => "created",
            ProvisioningOutcome::Failed(_) => "failed",
        }
    }
}

/// Intermediate steps of [`ResourceProvisioner::ensure_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionStage<'a> {
    ServiceReachable,
    Creating(&'a str),
}

pub struct ResourceProvisioner<S> {
    service: S,
}

impl<S: TableService> ResourceProvisioner<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn ensure(&self, descriptor: &TableDescriptor) -> ProvisioningOutcome {
        self.ensure_with(descriptor, |_| {})
    }

    /// Like [`ensure`](Self::ensure), reporting each stage reached to `on_stage`.
    pub fn ensure_with<'d>(
        &self,
        descriptor: &'d TableDescriptor,
        mut on_stage: impl FnMut(ProvisionStage<'d>),
    ) -> ProvisioningOutcome {
        if let Err(e) = self.service.list_tables() {
            warn!(error = %e, "liveness probe failed");
            return ProvisioningOutcome::Failed(ProvisionFailure::ServiceUnreachable(e.to_string()));
        }
        on_stage(ProvisionStage::ServiceReachable);

        match self.service.describe_table(&descriptor.name) {
            Ok(TableLookup::Found(observed)) => {
                if !observed.same_key_schema(descriptor) {
                    warn!(table = %descriptor.name, "existing table key schema differs from descriptor");
                }
                return ProvisioningOutcome::AlreadyExists;
            }
            Ok(TableLookup::Absent) => {
                debug!(table = %descriptor.name, "table absent, creating");
                on_stage(ProvisionStage::Creating(&descriptor.name));
            }
            Err(e) => return ProvisioningOutcome::Failed(ProvisionFailure::Describe(e.to_string())),
        }

        match self.service.create_table(descriptor) {
            Ok(CreateResult::Created) => {
                info!(table = %descriptor.name, "table created");
                ProvisioningOutcome::Created
            }
            Ok(CreateResult::Conflict) => {
                info!(table = %descriptor.name, "table created concurrently by another caller");
                ProvisioningOutcome::AlreadyExists
            }
            Err(e) => ProvisioningOutcome::Failed(ProvisionFailure::Creation(e.to_string())),
        }
    }
}

/// CLI structure for `esf-bootstrap init-table`
#[derive(clap::Args, Debug)]
pub struct ProvisionCli {
    /// Service endpoint URL (env: ESF_DYNAMODB_ENDPOINT).
    #[clap(long)]
    pub endpoint: Option<String>,
    /// Region name (env: ESF_DYNAMODB_REGION).
    #[clap(long)]
    pub region: Option<String>,
    /// Table to provision (env: ESF_DYNAMODB_TABLE).
    #[clap(long = "table")]
    pub table_name: Option<String>,
    /// TOML file with endpoint/region/table_name keys.
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    pub format: String,
}

fn print_banner(config: &ProvisionConfig) {
    let rule = "=".repeat(50);
    println!("{}", rule);
    println!("{}", "DynamoDB Table Initialization".bold());
    println!("{}", rule);
    println!("Endpoint: {}", config.endpoint);
    println!("Region: {}", config.region);
    println!("Table: {}", config.table_name);
    println!();
}

fn report_text(config: &ProvisionConfig, outcome: &ProvisioningOutcome) {
    match outcome {
        ProvisioningOutcome::Created => {
            println!(
                "{} Table '{}' created successfully",
                "✓".green(),
                config.table_name
            );
        }
        ProvisioningOutcome::AlreadyExists => {
            println!("{} Table '{}' already exists", "✓".green(), config.table_name);
        }
        ProvisioningOutcome::Failed(ProvisionFailure::ServiceUnreachable(reason)) => {
            eprintln!(
                "{} Error: DynamoDB is not accessible at {}",
                "✗".red(),
                config.endpoint
            );
            eprintln!("  {}", reason);
            eprintln!("  Please start DynamoDB using: {}", START_SERVICE_HINT.bright_cyan());
        }
        ProvisioningOutcome::Failed(failure) => {
            eprintln!("{} {}", "✗".red(), failure);
        }
    }
    if outcome.is_success() {
        println!();
        println!("You can now run the bootstrap command:");
        println!("  {}", BOOTSTRAP_HINT);
        println!();
    }
}

fn run_with<S: TableService>(
    service: S,
    config: &ProvisionConfig,
    format: &str,
) -> Result<ProvisioningOutcome, EsfError> {
    let descriptor = config.table_descriptor();
    let provisioner = ResourceProvisioner::new(service);
    let json = format == "json";

    if !json {
        print_banner(config);
        println!("Checking if DynamoDB is running...");
    }
    let outcome = provisioner.ensure_with(&descriptor, |stage| {
        if json {
            return;
        }
        match stage {
            ProvisionStage::ServiceReachable => {
                println!("{} DynamoDB is running", "✓".green());
                println!();
            }
            ProvisionStage::Creating(name) => println!("Creating table: {}...", name),
        }
    });

    if json {
        let (status, failure) = match &outcome {
            ProvisioningOutcome::Failed(f) => ("error", serde_json::to_value(f)?),
            _ => ("ok", serde_json::Value::Null),
        };
        let envelope = time::command_envelope(
            "init-table",
            status,
            serde_json::json!({
                "config": config,
                "table": descriptor,
                "outcome": outcome.label(),
                "failure": failure,
            }),
        );
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        report_text(config, &outcome);
    }
    Ok(outcome)
}

/// Entry point for `init-table`. Returns `Err` when the table could not be
/// provisioned so the process exits non-zero.
pub fn run_provision_cli(cli: ProvisionCli) -> Result<(), EsfError> {
    if cli.format != "text" && cli.format != "json" {
        return Err(EsfError::ConfigError(format!(
            "unsupported format '{}': expected 'text' or 'json'",
            cli.format
        )));
    }
    let overrides = ConfigOverrides {
        endpoint: cli.endpoint,
        region: cli.region,
        table_name: cli.table_name,
    };
    let config =
        ProvisionConfig::resolve(cli.config.as_deref(), |k| std::env::var(k).ok(), &overrides)?;

    let service = DynamoTableService::connect(&config)?;
    let outcome = run_with(service, &config, &cli.format)?;

    match outcome {
        ProvisioningOutcome::Failed(failure) => Err(EsfError::ProvisionError(failure.to_string())),
        _ => Ok(()),
    }
}
