//! Sync pipeline orchestration.
//!
//! Coordinates `postsync sync`: corpus scan → detect/parse/normalize →
//! extensions → sync engine → SQLite. Per-document problems are logged and
//! counted; only configuration and database failures abort the run.

use std::collections::HashSet;

use anyhow::{Context, Result};
use tracing::info;

use postsync_core::date;
use postsync_core::extension::{apply_chain, ExtensionRegistry};
use postsync_core::normalize::NormalizeOptions;
use postsync_core::pipeline::prepare_batch;
use postsync_core::store::memory::InMemoryStore;
use postsync_core::store::PostStore;
use postsync_core::sync::{sync_with_store, SyncReport};

use crate::config::Config;
use crate::connector_fs;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Counts for one `sync` run.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub dry_run: bool,
    /// Documents matched by the corpus globs (after `--limit`).
    pub scanned: usize,
    /// Unreadable files plus documents without usable front matter.
    pub invalid: usize,
    /// Records removed by extensions before the sync engine ran.
    pub filtered: usize,
    pub report: SyncReport,
}

impl SyncSummary {
    pub fn print(&self) {
        if self.dry_run {
            println!("sync posts (dry-run)");
        } else {
            println!("sync posts");
        }
        println!("  scanned: {} documents", self.scanned);
        println!(
            "  skipped (no front matter / invalid): {}",
            self.invalid
        );
        if self.filtered > 0 {
            println!("  filtered by extensions: {}", self.filtered);
        }
        if self.dry_run {
            println!("  would insert: {}", self.report.inserted_count());
            for slug in &self.report.inserted {
                println!("    + {}", slug);
            }
        } else {
            println!("  inserted: {}", self.report.inserted_count());
        }
        println!("  already present: {}", self.report.skipped_count());
        println!("  failed: {}", self.report.failed_count());
        for failure in &self.report.failures {
            println!("    {} ({}): {}", failure.slug, failure.source_id, failure.error);
        }
        println!("ok");
    }
}

/// CLI entry point: sync with the built-in extensions and print the summary.
pub async fn run_sync(config: &Config, dry_run: bool, limit: Option<usize>) -> Result<()> {
    let registry = ExtensionRegistry::with_builtins();
    let summary = sync_corpus(config, &registry, dry_run, limit).await?;
    summary.print();
    Ok(())
}

/// Scan the corpus and reconcile it against the configured database.
pub async fn sync_corpus(
    config: &Config,
    registry: &ExtensionRegistry,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<SyncSummary> {
    // Resolve extensions before touching the corpus so a typo fails fast.
    let chain = registry.resolve(&config.pipeline.extensions)?;

    let mut scan = connector_fs::scan_corpus(config)?;

    // Apply --limit
    if let Some(lim) = limit {
        scan.documents.truncate(lim);
    }

    let options = NormalizeOptions::new(date::today())
        .with_title_from_heading(config.normalize.title_from_heading);
    let batch = prepare_batch(&scan.documents, &options);

    let prepared = batch.records.len();
    let records = apply_chain(&chain, batch.records);

    let mut summary = SyncSummary {
        dry_run,
        scanned: scan.documents.len() + scan.unreadable.len(),
        invalid: scan.unreadable.len() + batch.rejected.len(),
        filtered: prepared - records.len(),
        report: SyncReport::default(),
    };

    if dry_run {
        let existing = snapshot(config).await?;
        let preview = InMemoryStore::with_slugs(existing);
        summary.report = sync_with_store(records, &preview)
            .await
            .context("Failed to simulate sync")?;
        return Ok(summary);
    }

    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;
    let store = SqliteStore::new(pool);

    summary.report = sync_with_store(records, &store)
        .await
        .context("Failed to read existing slugs")?;

    info!(
        inserted = summary.report.inserted_count(),
        skipped = summary.report.skipped_count(),
        failed = summary.report.failed_count(),
        "sync finished"
    );

    store.pool().close().await;
    Ok(summary)
}

/// Slugs already stored, read without migrating or writing anything.
async fn snapshot(config: &Config) -> Result<HashSet<String>> {
    let Some(pool) = db::connect_read_only(config).await? else {
        return Ok(HashSet::new());
    };

    let has_posts =
        sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'posts'")
            .fetch_optional(&pool)
            .await
            .context("Failed to inspect database schema")?
            .is_some();

    let slugs = if has_posts {
        SqliteStore::new(pool.clone())
            .existing_slugs()
            .await
            .context("Failed to read existing slugs")?
    } else {
        HashSet::new()
    };

    pool.close().await;
    Ok(slugs)
}
