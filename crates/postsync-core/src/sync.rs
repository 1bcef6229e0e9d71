//! Idempotent reconciliation of a normalized batch against a store.
//!
//! # Algorithm
//!
//! 1. Stable-sort the batch by date ascending. Records whose date does not
//!    parse sort after every dated record, keeping their relative order.
//!    Ordering only decides *when* a record reaches the store, never
//!    *whether* it does.
//! 2. Walk the sorted batch. A slug already in the `existing` set is
//!    skipped. Otherwise the record is inserted and its slug added to the
//!    set straight away, so a second record with the same slug in the same
//!    batch is skipped too.
//! 3. A failed insert is recorded and the walk continues.
//!
//! Running the same batch twice against the same store therefore inserts
//! nothing the second time. The walk is strictly sequential: each decision
//! depends on the ones before it.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::NormalizedRecord;
use crate::store::PostStore;

/// A record the store refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub source_id: String,
    pub slug: String,
    pub error: String,
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Slugs inserted, in the order they were handed to the store.
    pub inserted: Vec<String>,
    /// Slugs skipped because they were already present.
    pub skipped: Vec<String>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// True when the pass changed nothing in the store.
    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty()
    }
}

/// Sort a batch into insertion order.
pub fn order_batch(batch: &mut [NormalizedRecord]) {
    batch.sort_by_key(|record| match record.parsed_date() {
        Some(date) => (false, Some(date)),
        None => (true, None),
    });
}

/// Reconcile `batch` against an `existing` slug snapshot.
pub async fn sync(
    mut batch: Vec<NormalizedRecord>,
    mut existing: HashSet<String>,
    store: &dyn PostStore,
) -> SyncReport {
    order_batch(&mut batch);

    let mut report = SyncReport::default();
    for record in &batch {
        if existing.contains(&record.slug) {
            debug!(slug = %record.slug, source_id = %record.source_id, "already present");
            report.skipped.push(record.slug.clone());
            continue;
        }

        match store.insert(record).await {
            Ok(()) => {
                info!(slug = %record.slug, date = %record.date, "inserted");
                existing.insert(record.slug.clone());
                report.inserted.push(record.slug.clone());
            }
            Err(StoreError::Duplicate(slug)) => {
                // Snapshot was stale; the store already has it.
                debug!(slug = %slug, source_id = %record.source_id, "store reported duplicate");
                existing.insert(slug.clone());
                report.skipped.push(slug);
            }
            Err(err) => {
                warn!(slug = %record.slug, source_id = %record.source_id, error = %err, "insert failed");
                report.failures.push(SyncFailure {
                    source_id: record.source_id.clone(),
                    slug: record.slug.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
    report
}

/// Take a fresh snapshot from `store` and reconcile `batch` against it.
///
/// Only the snapshot read can fail; individual inserts are reported.
pub async fn sync_with_store(
    batch: Vec<NormalizedRecord>,
    store: &dyn PostStore,
) -> Result<SyncReport, StoreError> {
    let existing = store.existing_slugs().await?;
    debug!(existing = existing.len(), batch = batch.len(), "snapshot taken");
    Ok(sync(batch, existing, store).await)
}
