//! Storage abstraction for postsync.
//!
//! The [`PostStore`] trait is the whole contract the sync engine needs from
//! a backend: one snapshot read of every persisted slug, and an insert that
//! refuses slugs it already holds. Storage layout, timestamps, and soft
//! deletion are the backend's business.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::NormalizedRecord;

/// Abstract post store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`existing_slugs`](PostStore::existing_slugs) | Snapshot of all persisted slugs |
/// | [`insert`](PostStore::insert) | Persist a new record addressed by its slug |
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Every slug currently persisted, including soft-deleted posts.
    async fn existing_slugs(&self) -> Result<HashSet<String>, StoreError>;

    /// Persist a record.
    ///
    /// Must fail with [`StoreError::Duplicate`] when the slug is already
    /// present, so a bypassed skip check can never create a second copy.
    async fn insert(&self, record: &NormalizedRecord) -> Result<(), StoreError>;
}
