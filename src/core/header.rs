//! Header-preserving file writer for generated documents.
//!
//! Every generated file starts with a small metadata block:
//!
//! ```text
//! ---
//! Generated: 2026-10-19 14:03:22
//! Generator: Technical Specification Generator v1.0
//! ---
//!
//! <body>
//! ```
//!
//! On regeneration the old block is detected and dropped before the fresh one
//! is attached, so repeated runs never stack headers. The body on disk is
//! always replaced by the in-memory body; nothing from the previous file
//! survives a successful write.
//!
//! Detection is deliberately strict: line 0 must be exactly `---`, the closing
//! `---` must sit on its own line within the first [`HEADER_SCAN_LINES`] lines,
//! and every line in between must look like `Key: value`. Anything else is
//! treated as unheadered content.

use crate::core::error::EsfError;
use crate::core::time;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

pub const HEADER_MARKER: &str = "---";
pub const GENERATOR_IDENTITY: &str = "Technical Specification Generator v1.0";
pub const HEADER_SCAN_LINES: usize = 8;

static METADATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*:(\s.*)?$").unwrap());

/// The metadata block written at offset 0 of every generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeaderBlock {
    pub generated: String,
    pub generator: String,
}

impl FileHeaderBlock {
    pub fn new(generated: impl Into<String>, generator: impl Into<String>) -> Self {
        Self {
            generated: generated.into(),
            generator: generator.into(),
        }
    }

    /// Header stamped with the current local time.
    pub fn now(generator: impl Into<String>) -> Self {
        Self::new(time::header_timestamp(), generator)
    }

    /// Block text including the blank separator line.
    pub fn render(&self) -> String {
        format!(
            "{marker}\nGenerated: {}\nGenerator: {}\n{marker}\n\n",
            self.generated,
            self.generator,
            marker = HEADER_MARKER
        )
    }

    /// Parse a block previously produced by [`split_header`].
    pub fn parse(block: &str) -> Option<Self> {
        let mut generated = None;
        let mut generator = None;
        for line in block.lines() {
            if let Some(v) = line.strip_prefix("Generated:") {
                generated = Some(v.trim().to_string());
            } else if let Some(v) = line.strip_prefix("Generator:") {
                generator = Some(v.trim().to_string());
            }
        }
        Some(Self::new(generated?, generator?))
    }
}

/// Split `content` into `(header_block, body)` when it starts with a
/// well-formed header. The blank line after the closing marker belongs to the
/// header. Returns `None` for unheadered or malformed content.
pub fn split_header(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != HEADER_MARKER {
        return None;
    }

    let mut offset = first.len();
    let mut metadata_lines = 0usize;
    for line in lines.take(HEADER_SCAN_LINES - 1) {
        offset += line.len();
        let text = line.trim_end();
        if text == HEADER_MARKER {
            if metadata_lines == 0 {
                return None;
            }
            let rest = &content[offset..];
            let body = rest
                .strip_prefix("\r\n")
                .or_else(|| rest.strip_prefix('\n'))
                .unwrap_or(rest);
            let header_len = content.len() - body.len();
            return Some((&content[..header_len], body));
        }
        if !METADATA_LINE.is_match(text) {
            return None;
        }
        metadata_lines += 1;
    }
    None
}

/// What was on disk before a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriorContent {
    /// No file existed.
    Absent,
    /// A generated file; its header was stripped.
    Headered {
        previous_generated: Option<String>,
        had_body: bool,
    },
    /// A file without a recognisable header; all of it was treated as body.
    Unheadered { had_body: bool },
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub prior: PriorContent,
    pub body_sha256: String,
    pub bytes_written: usize,
}

/// Single point of filesystem mutation for generated documents.
#[derive(Debug, Clone)]
pub struct HeaderedFileWriter {
    generator: String,
}

impl Default for HeaderedFileWriter {
    fn default() -> Self {
        Self::new(GENERATOR_IDENTITY)
    }
}

impl HeaderedFileWriter {
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
        }
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    /// Replace `path` with a fresh header followed by exactly `fresh_body`.
    pub fn write(&self, path: &Path, fresh_body: &str) -> Result<WriteOutcome, EsfError> {
        let header = FileHeaderBlock::now(self.generator.clone());
        self.write_with_header(path, &header, fresh_body)
    }

    pub fn write_with_header(
        &self,
        path: &Path,
        header: &FileHeaderBlock,
        fresh_body: &str,
    ) -> Result<WriteOutcome, EsfError> {
        let prior = inspect_existing(path)?;
        debug!(path = %path.display(), ?prior, "replacing generated file");

        ensure_parent(path)?;
        let mut rendered = header.render();
        rendered.push_str(fresh_body);
        fs::write(path, &rendered).map_err(EsfError::IoError)?;

        let mut hasher = Sha256::new();
        hasher.update(fresh_body.as_bytes());

        Ok(WriteOutcome {
            path: path.to_path_buf(),
            prior,
            body_sha256: format!("{:x}", hasher.finalize()),
            bytes_written: rendered.len(),
        })
    }
}

fn ensure_parent(path: &Path) -> Result<(), EsfError> {
    if let Some(p) = path.parent() {
        if !p.as_os_str().is_empty() {
            fs::create_dir_all(p).map_err(EsfError::IoError)?;
        }
    }
    Ok(())
}

fn inspect_existing(path: &Path) -> Result<PriorContent, EsfError> {
    if !path.exists() {
        return Ok(PriorContent::Absent);
    }
    let raw = fs::read(path).map_err(EsfError::IoError)?;
    let content = String::from_utf8_lossy(&raw);

    Ok(match split_header(&content) {
        Some((block, body)) => PriorContent::Headered {
            previous_generated: FileHeaderBlock::parse(block).map(|h| h.generated),
            had_body: !body.trim().is_empty(),
        },
        None => PriorContent::Unheadered {
            had_body: !content.trim().is_empty(),
        },
    })
}
