//! Error taxonomy for the pipeline and the store boundary.
//!
//! Pipeline errors are always per-document: callers log them with the
//! carried source identifier and move on to the next document.

use thiserror::Error;

use crate::models::MetadataFormat;

/// A document could not be turned into a record.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither a JSON nor a YAML metadata terminator was found.
    #[error("no front matter block found in {source_id}")]
    Detection { source_id: String },

    /// A metadata block was found but is not valid for its format.
    #[error("invalid {format} front matter in {source_id}: {message}")]
    Parse {
        source_id: String,
        format: MetadataFormat,
        message: String,
    },
}

impl PipelineError {
    pub fn source_id(&self) -> &str {
        match self {
            PipelineError::Detection { source_id } | PipelineError::Parse { source_id, .. } => {
                source_id
            }
        }
    }
}

/// Failure reported by a [`PostStore`](crate::store::PostStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The slug is already persisted.
    #[error("duplicate slug: {0}")]
    Duplicate(String),

    /// Any other backend failure (I/O, constraint, connection).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A normalized record could not be serialized back into a document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize JSON front matter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to serialize YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The rendered text would be detected as a different block, or would
    /// split at a different place, on the next read.
    #[error("rendered {format} front matter does not split back into the same document")]
    Unstable { format: MetadataFormat },
}
