//! CLI output formatting.
//!
//! # Single Requests
//!
//! `fotomat process` prints one JSON status document on stdout so callers can
//! parse it the way they parsed the HTTP response:
//!
//! ```text
//! {"status":200,"full":"images/forum/full/up-1.jpg","thumbnail":"images/forum/thumbnail/up-1.png"}
//! {"status":400,"reason":"profile image must be JPEG or PNG"}
//! ```
//!
//! # Batches
//!
//! `fotomat batch` prints a human-readable listing, one entry per request
//! file, with paths or the failure reason as indented context lines:
//!
//! ```text
//! 001 up-1.json → 200
//!     Full: images/forum/full/up-1.jpg
//!     Thumbnail: images/forum/thumbnail/up-1.png
//! 002 up-2.json → 400
//!     Reason: profile image must be JPEG or PNG
//!
//! Processed 2 requests: 1 ok, 1 failed
//! ```
//!
//! Format functions return `Vec<String>` (or `String`) and do no I/O; the
//! `print_*` wrappers write to stdout.

use crate::dispatch::ProcessError;
use crate::types::ArtifactPair;
use serde::Serialize;
use std::path::PathBuf;

/// Result of one request as reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusDocument {
    Ok {
        status: u16,
        full: PathBuf,
        thumbnail: PathBuf,
    },
    Failed {
        status: u16,
        reason: String,
    },
}

impl StatusDocument {
    pub fn from_result(result: &Result<ArtifactPair, ProcessError>) -> Self {
        match result {
            Ok(pair) => StatusDocument::Ok {
                status: 200,
                full: pair.full.clone(),
                thumbnail: pair.thumbnail.clone(),
            },
            Err(err) => StatusDocument::failed(err.status_code(), err.to_string()),
        }
    }

    pub fn failed(status: u16, reason: impl Into<String>) -> Self {
        StatusDocument::Failed {
            status,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            StatusDocument::Ok { status, .. } | StatusDocument::Failed { status, .. } => *status,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StatusDocument::Ok { .. })
    }
}

/// Serialize a status document as a single JSON line.
pub fn format_status(document: &StatusDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string(document)
}

/// One entry of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// What the user passed, usually the request file name.
    pub label: String,
    pub document: StatusDocument,
}

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a batch run: one header per request, context lines, then a summary.
pub fn format_batch_output(outcomes: &[BatchOutcome]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, outcome) in outcomes.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            outcome.label,
            outcome.document.status()
        ));
        match &outcome.document {
            StatusDocument::Ok {
                full, thumbnail, ..
            } => {
                lines.push(format!("{}Full: {}", indent(1), full.display()));
                lines.push(format!("{}Thumbnail: {}", indent(1), thumbnail.display()));
            }
            StatusDocument::Failed { reason, .. } => {
                lines.push(format!("{}Reason: {}", indent(1), reason));
            }
        }
    }

    let ok = outcomes.iter().filter(|o| o.document.is_ok()).count();
    lines.push(String::new());
    lines.push(format!(
        "Processed {} request{}: {} ok, {} failed",
        outcomes.len(),
        if outcomes.len() == 1 { "" } else { "s" },
        ok,
        outcomes.len() - ok
    ));
    lines
}

pub fn print_batch_output(outcomes: &[BatchOutcome]) {
    for line in format_batch_output(outcomes) {
        println!("{}", line);
    }
}
