//! Specification document generator.
//!
//! Renders the fixed catalog of embedded documents into an output directory
//! through [`HeaderedFileWriter`]. Batches are best-effort: a failed document
//! is recorded and the remaining ones are still attempted.

use crate::core::assets;
use crate::core::error::EsfError;
use crate::core::header::{HeaderedFileWriter, PriorContent, WriteOutcome};
use crate::core::output;
use crate::core::time;
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const DEFAULT_OUTPUT_DIR: &str = "./specs";

/// The closed catalog, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    Authentication,
    Authorization,
    Monitoring,
    Deployment,
    DisasterRecovery,
    Api,
    Security,
    Performance,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 8] = [
        DocumentKind::Authentication,
        DocumentKind::Authorization,
        DocumentKind::Monitoring,
        DocumentKind::Deployment,
        DocumentKind::DisasterRecovery,
        DocumentKind::Api,
        DocumentKind::Security,
        DocumentKind::Performance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DocumentKind::Authentication => "authentication",
            DocumentKind::Authorization => "authorization",
            DocumentKind::Monitoring => "monitoring",
            DocumentKind::Deployment => "deployment",
            DocumentKind::DisasterRecovery => "disaster-recovery",
            DocumentKind::Api => "api",
            DocumentKind::Security => "security",
            DocumentKind::Performance => "performance",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DocumentKind::Authentication => "authentication-requirements.md",
            DocumentKind::Authorization => "authorization-requirements.md",
            DocumentKind::Monitoring => "monitoring-requirements.md",
            DocumentKind::Deployment => "deployment-architectures.md",
            DocumentKind::DisasterRecovery => "disaster-recovery.md",
            DocumentKind::Api => "api-specifications.md",
            DocumentKind::Security => "security-requirements.md",
            DocumentKind::Performance => "performance-requirements.md",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            DocumentKind::Authentication => assets::DOC_AUTHENTICATION,
            DocumentKind::Authorization => assets::DOC_AUTHORIZATION,
            DocumentKind::Monitoring => assets::DOC_MONITORING,
            DocumentKind::Deployment => assets::DOC_DEPLOYMENT,
            DocumentKind::DisasterRecovery => assets::DOC_DISASTER_RECOVERY,
            DocumentKind::Api => assets::DOC_API,
            DocumentKind::Security => assets::DOC_SECURITY,
            DocumentKind::Performance => assets::DOC_PERFORMANCE,
        }
    }

    /// Accepts the catalog name (`disaster-recovery`) or the file name
    /// (`disaster-recovery.md`).
    pub fn from_name(name: &str) -> Result<Self, EsfError> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name || k.file_name() == name)
            .ok_or_else(|| EsfError::UnknownDocument(name.to_string()))
    }
}

/// A document ready to be streamed to the writer.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub name: &'static str,
    pub body: &'static str,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedDocument {
    pub name: &'static str,
    #[serde(flatten)]
    pub outcome: WriteOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderFailure {
    pub name: &'static str,
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub run_id: String,
    pub output_dir: PathBuf,
    pub rendered: Vec<RenderedDocument>,
    pub failures: Vec<RenderFailure>,
}

impl RenderReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.rendered.len() + self.failures.len()
    }

    pub fn failure_summary(&self) -> String {
        let messages: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.name, f.error))
            .collect();
        output::summarize(&messages, 3, 120)
    }
}

pub struct DocumentGenerator {
    output_dir: PathBuf,
    writer: HeaderedFileWriter,
    progress: bool,
}

impl DocumentGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            writer: HeaderedFileWriter::default(),
            progress: false,
        }
    }

    /// Print per-document progress lines to stdout.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_writer(mut self, writer: HeaderedFileWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn record(&self, kind: DocumentKind) -> DocumentRecord {
        DocumentRecord {
            name: kind.name(),
            body: kind.body(),
            path: self.output_dir.join(kind.file_name()),
        }
    }

    /// Render one document by catalog name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not in the catalog. Names coming from users go
    /// through [`DocumentKind::from_name`] first.
    pub fn render(&self, name: &str) -> Result<WriteOutcome, EsfError> {
        match DocumentKind::from_name(name) {
            Ok(kind) => self.render_kind(kind),
            Err(_) => panic!("document '{}' is not in the catalog", name),
        }
    }

    pub fn render_kind(&self, kind: DocumentKind) -> Result<WriteOutcome, EsfError> {
        let record = self.record(kind);
        if self.progress {
            println!("Generating {}...", kind.file_name());
        }
        debug!(document = record.name, path = %record.path.display(), "rendering");
        let outcome = self.writer.write(&record.path, record.body)?;
        if self.progress {
            let note = match outcome.prior {
                PriorContent::Absent => "created",
                _ => "regenerated",
            };
            println!(
                "  {} {} {} successfully (hash: {})",
                "✓".green(),
                kind.file_name(),
                note,
                output::short_digest(&outcome.body_sha256)
            );
        }
        Ok(outcome)
    }

    pub fn render_all(&self) -> RenderReport {
        self.render_selected(&DocumentKind::ALL)
    }

    /// Render `kinds` in catalog order, each at most once. Failures are
    /// collected; the batch always runs to completion.
    pub fn render_selected(&self, kinds: &[DocumentKind]) -> RenderReport {
        let mut ordered = kinds.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut report = RenderReport {
            run_id: time::new_run_id(),
            output_dir: self.output_dir.clone(),
            rendered: Vec::new(),
            failures: Vec::new(),
        };
        for kind in ordered {
            match self.render_kind(kind) {
                Ok(outcome) => report.rendered.push(RenderedDocument {
                    name: kind.name(),
                    outcome,
                }),
                Err(e) => {
                    warn!(document = kind.name(), error = %e, "render failed");
                    if self.progress {
                        eprintln!("  {} {} failed: {}", "✗".red(), kind.file_name(), e);
                    }
                    report.failures.push(RenderFailure {
                        name: kind.name(),
                        path: self.output_dir.join(kind.file_name()),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

/// Subcommands for `esf-bootstrap specs`
#[derive(Subcommand, Debug)]
pub enum SpecsCommand {
    /// List the document catalog.
    List,
}

/// CLI structure for `esf-bootstrap specs`
#[derive(clap::Args, Debug)]
pub struct SpecsCli {
    #[clap(subcommand)]
    pub command: Option<SpecsCommand>,
    /// Generate all specification documents
    #[clap(long)]
    pub all: bool,
    /// Generate authentication requirements
    #[clap(long)]
    pub auth: bool,
    /// Generate authorization requirements
    #[clap(long)]
    pub authz: bool,
    /// Generate monitoring requirements
    #[clap(long)]
    pub monitoring: bool,
    /// Generate deployment architectures
    #[clap(long)]
    pub deployment: bool,
    /// Generate disaster recovery plan
    #[clap(long)]
    pub disaster_recovery: bool,
    /// Generate API specifications
    #[clap(long)]
    pub api: bool,
    /// Generate security requirements
    #[clap(long)]
    pub security: bool,
    /// Generate performance requirements
    #[clap(long)]
    pub performance: bool,
    /// Select documents by catalog name (repeatable and/or comma-separated).
    #[clap(long = "doc", value_delimiter = ',')]
    pub docs: Vec<String>,
    /// Output directory for generated files
    #[clap(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    pub format: String,
}

impl SpecsCli {
    /// Documents chosen by flags, in catalog order. Empty means nothing was selected.
    pub fn selection(&self) -> Result<Vec<DocumentKind>, EsfError> {
        if self.all {
            return Ok(DocumentKind::ALL.to_vec());
        }
        let flags = [
            (self.auth, DocumentKind::Authentication),
            (self.authz, DocumentKind::Authorization),
            (self.monitoring, DocumentKind::Monitoring),
            (self.deployment, DocumentKind::Deployment),
            (self.disaster_recovery, DocumentKind::DisasterRecovery),
            (self.api, DocumentKind::Api),
            (self.security, DocumentKind::Security),
            (self.performance, DocumentKind::Performance),
        ];
        let mut kinds: Vec<DocumentKind> = flags
            .into_iter()
            .filter_map(|(on, kind)| on.then_some(kind))
            .collect();
        for name in &self.docs {
            kinds.push(DocumentKind::from_name(name.trim())?);
        }
        kinds.sort();
        kinds.dedup();
        Ok(kinds)
    }
}

/// What the caller should do after `run_specs_cli` returns `Ok`.
#[derive(Debug, PartialEq, Eq)]
pub enum SpecsOutcome {
    Done,
    /// No document was selected; the caller prints usage.
    NothingSelected,
}

pub fn run_specs_cli(cli: SpecsCli) -> Result<SpecsOutcome, EsfError> {
    if cli.format != "text" && cli.format != "json" {
        return Err(EsfError::ConfigError(format!(
            "unsupported format '{}': expected 'text' or 'json'",
            cli.format
        )));
    }
    let json = cli.format == "json";

    if let Some(SpecsCommand::List) = cli.command {
        if json {
            let docs: Vec<_> = DocumentKind::ALL
                .iter()
                .map(|k| serde_json::json!({"name": k.name(), "file": k.file_name()}))
                .collect();
            let envelope =
                time::command_envelope("specs.list", "ok", serde_json::json!({ "documents": docs }));
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        } else {
            println!("Specification documents:");
            for kind in DocumentKind::ALL {
                println!("- {:<18} {}", kind.name(), kind.file_name());
            }
        }
        return Ok(SpecsOutcome::Done);
    }

    let kinds = cli.selection()?;
    if kinds.is_empty() {
        return Ok(SpecsOutcome::NothingSelected);
    }

    let generator = DocumentGenerator::new(&cli.output_dir).with_progress(!json);
    if !json && cli.all {
        println!("Generating all specification documents...");
    }
    let report = generator.render_selected(&kinds);

    if json {
        let status = if report.is_success() { "ok" } else { "error" };
        let envelope = time::command_envelope("specs", status, serde_json::to_value(&report)?);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if report.is_success() && cli.all {
        println!();
        println!("All documents generated in: {}", cli.output_dir.display());
    }

    if report.is_success() {
        Ok(SpecsOutcome::Done)
    } else {
        Err(EsfError::RenderError(format!(
            "{} of {} documents failed: {}",
            report.failures.len(),
            report.attempted(),
            report.failure_summary()
        )))
    }
}
