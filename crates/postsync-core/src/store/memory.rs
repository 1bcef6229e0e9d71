//! In-memory [`PostStore`] implementation.
//!
//! Used by tests and by dry runs, where it is seeded with a real store's
//! slug snapshot so a sync can be simulated without writing anything.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::NormalizedRecord;

use super::PostStore;

/// A post as persisted by [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub metadata: String,
}

#[derive(Default)]
struct Inner {
    posts: HashMap<String, StoredPost>,
    /// Slugs present before any insert (seeded snapshot).
    seeded: HashSet<String>,
    order: Vec<String>,
    next_id: i64,
}

/// In-memory store keyed by slug.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    /// A store that already "contains" the given slugs.
    pub fn with_slugs<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.write() {
            inner.seeded = slugs.into_iter().map(Into::into).collect();
        }
        store
    }

    /// Slugs inserted through [`PostStore::insert`], in insertion order.
    pub fn inserted_slugs(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.order.clone())
            .unwrap_or_default()
    }

    /// Look up a post inserted through this store.
    pub fn get(&self, slug: &str) -> Option<StoredPost> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.posts.get(slug).cloned())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn existing_slugs(&self) -> Result<HashSet<String>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .seeded
            .iter()
            .chain(inner.posts.keys())
            .cloned()
            .collect())
    }

    async fn insert(&self, record: &NormalizedRecord) -> Result<(), StoreError> {
        let metadata = record
            .metadata_json()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.seeded.contains(&record.slug) || inner.posts.contains_key(&record.slug) {
            return Err(StoreError::Duplicate(record.slug.clone()));
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.order.push(record.slug.clone());
        inner.posts.insert(
            record.slug.clone(),
            StoredPost {
                id,
                title: record.title.clone(),
                slug: record.slug.clone(),
                body: record.body.clone(),
                metadata,
            },
        );
        Ok(())
    }
}
