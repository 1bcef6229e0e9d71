//! Per-document pipeline: detect → parse → normalize.
//!
//! Each document is independent of every other, so a failure only drops
//! that document. [`prepare_batch`] collects the survivors in input order
//! into one batch for the sync engine, alongside the rejected documents.

use tracing::{debug, warn};

use crate::detect;
use crate::error::PipelineError;
use crate::models::{NormalizedRecord, RawDocument};
use crate::normalize::{normalize, NormalizeOptions};
use crate::parse;

/// Normalized records plus the documents that could not be processed.
#[derive(Debug, Default)]
pub struct PreparedBatch {
    pub records: Vec<NormalizedRecord>,
    pub rejected: Vec<PipelineError>,
}

/// Run a single document through detection, parsing, and normalization.
pub fn prepare_document(
    doc: &RawDocument,
    options: &NormalizeOptions,
) -> Result<NormalizedRecord, PipelineError> {
    let split = detect::split(doc)?;
    let parsed = parse::parse(&doc.source_id, &split)?;
    Ok(normalize(parsed, options))
}

/// Prepare every document, logging and collecting failures.
pub fn prepare_batch<'a, I>(docs: I, options: &NormalizeOptions) -> PreparedBatch
where
    I: IntoIterator<Item = &'a RawDocument>,
{
    let mut batch = PreparedBatch::default();
    for doc in docs {
        match prepare_document(doc, options) {
            Ok(record) => {
                debug!(source_id = %record.source_id, slug = %record.slug, format = %record.format, "normalized");
                batch.records.push(record);
            }
            Err(err) => {
                warn!(source_id = %err.source_id(), error = %err, "skipping document");
                batch.rejected.push(err);
            }
        }
    }
    batch
}
