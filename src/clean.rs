//! In-place front matter cleanup (`postsync clean`).
//!
//! Every corpus document with detectable front matter is re-emitted as
//! normalized metadata in its original format, the format's separator, and
//! the untouched body. Files are only written when their bytes change, so a
//! second run over a cleaned corpus touches nothing.

use anyhow::Result;
use tracing::{info, warn};

use postsync_core::date;
use postsync_core::normalize::NormalizeOptions;
use postsync_core::pipeline::prepare_document;
use postsync_core::render::render;

use crate::config::Config;
use crate::connector_fs::{self, CorpusScan};

/// Outcome of a cleanup pass.
#[derive(Debug, Default)]
pub struct CleanSummary {
    pub dry_run: bool,
    pub scanned: usize,
    /// Source identifiers whose bytes changed (or would change).
    pub rewritten: Vec<String>,
    pub unchanged: usize,
    pub invalid: usize,
    /// Documents that could not be rendered or written back.
    pub failed: Vec<String>,
}

impl CleanSummary {
    pub fn print(&self) {
        if self.dry_run {
            println!("clean posts (dry-run)");
        } else {
            println!("clean posts");
        }
        println!("  scanned: {} documents", self.scanned);
        println!(
            "  skipped (no front matter / invalid): {}",
            self.invalid
        );
        let verb = if self.dry_run { "would rewrite" } else { "rewritten" };
        println!("  {}: {}", verb, self.rewritten.len());
        for id in &self.rewritten {
            println!("    ~ {}", id);
        }
        println!("  unchanged: {}", self.unchanged);
        println!("  failed: {}", self.failed.len());
        println!("ok");
    }
}

/// CLI entry point.
pub async fn run_clean(config: &Config, dry_run: bool) -> Result<()> {
    let summary = clean_corpus(config, dry_run)?;
    summary.print();
    Ok(())
}

/// Normalize the front matter of every corpus document on disk.
pub fn clean_corpus(config: &Config, dry_run: bool) -> Result<CleanSummary> {
    let scan = connector_fs::scan_corpus(config)?;

    // No heading fallback: a rewritten file must not copy its heading
    // into the metadata block.
    let options = NormalizeOptions::new(date::today());

    let mut summary = CleanSummary {
        dry_run,
        scanned: scan.documents.len() + scan.unreadable.len(),
        invalid: scan.unreadable.len(),
        ..Default::default()
    };

    for doc in &scan.documents {
        let record = match prepare_document(doc, &options) {
            Ok(record) => record,
            Err(err) => {
                warn!(source_id = %err.source_id(), error = %err, "skipping document");
                summary.invalid += 1;
                continue;
            }
        };

        let cleaned = match render(&record) {
            Ok(text) => text,
            Err(err) => {
                warn!(source_id = %doc.source_id, error = %err, "render failed");
                summary.failed.push(doc.source_id.clone());
                continue;
            }
        };

        if cleaned.as_bytes() == doc.bytes.as_slice() {
            summary.unchanged += 1;
            continue;
        }

        if !dry_run {
            let path = CorpusScan::path_of(config, &doc.source_id);
            if let Err(err) = std::fs::write(&path, cleaned.as_bytes()) {
                warn!(source_id = %doc.source_id, error = %err, "write failed");
                summary.failed.push(doc.source_id.clone());
                continue;
            }
            info!(source_id = %doc.source_id, format = %record.format, "rewritten");
        }
        summary.rewritten.push(doc.source_id.clone());
    }

    Ok(summary)
}
