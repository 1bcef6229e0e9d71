//! Optional batch extensions.
//!
//! An [`Extension`] rewrites the normalized batch after normalization and
//! before the sync engine sees it (dropping records, tidying fields).
//! Extensions are looked up by name in an [`ExtensionRegistry`] that the
//! driver builds once at startup and passes by reference; there is no
//! global registration.
//!
//! ```rust
//! use postsync_core::extension::ExtensionRegistry;
//!
//! let registry = ExtensionRegistry::with_builtins();
//! let chain = registry.resolve(&["drop-drafts".to_string()]).unwrap();
//! assert_eq!(chain.len(), 1);
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{NormalizedRecord, Status};

/// A named transformation over a normalized batch.
pub trait Extension: Send + Sync {
    /// Name used in configuration (e.g. `"drop-drafts"`).
    fn name(&self) -> &str;

    /// One-line description for listings.
    fn description(&self) -> &str;

    /// Transform the batch. Order is irrelevant; the sync engine sorts.
    fn apply(&self, batch: Vec<NormalizedRecord>) -> Vec<NormalizedRecord>;
}

/// A configured extension name has no registered handler.
#[derive(Debug, Error)]
#[error("unknown extension '{name}' (available: {available})")]
pub struct UnknownExtension {
    pub name: String,
    pub available: String,
}

/// Removes `draft` records so only published posts are synced.
pub struct DropDrafts;

impl Extension for DropDrafts {
    fn name(&self) -> &str {
        "drop-drafts"
    }

    fn description(&self) -> &str {
        "Exclude records whose status is draft"
    }

    fn apply(&self, batch: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
        batch
            .into_iter()
            .filter(|record| record.status != Status::Draft)
            .collect()
    }
}

/// Removes repeated tags, keeping the first occurrence of each.
pub struct DedupeTags;

impl Extension for DedupeTags {
    fn name(&self) -> &str {
        "dedupe-tags"
    }

    fn description(&self) -> &str {
        "Remove repeated tags, keeping first occurrences in order"
    }

    fn apply(&self, batch: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
        batch
            .into_iter()
            .map(|mut record| {
                let mut seen = std::collections::HashSet::new();
                record.tags.retain(|tag| seen.insert(tag.clone()));
                record
            })
            .collect()
    }
}

/// Name → handler lookup table for extensions.
pub struct ExtensionRegistry {
    handlers: BTreeMap<String, Box<dyn Extension>>,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Create a registry holding the built-in extensions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DropDrafts));
        registry.register(Box::new(DedupeTags));
        registry
    }

    /// Register a handler under its own name, replacing any previous one.
    pub fn register(&mut self, extension: Box<dyn Extension>) {
        self.handlers
            .insert(extension.name().to_string(), extension);
    }

    /// Find a handler by name.
    pub fn get(&self, name: &str) -> Option<&dyn Extension> {
        self.handlers.get(name).map(|e| e.as_ref())
    }

    /// All handlers, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Extension> {
        self.handlers.values().map(|e| e.as_ref())
    }

    /// Resolve configured names into an ordered chain of handlers.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<&dyn Extension>, UnknownExtension> {
        names
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| UnknownExtension {
                    name: name.clone(),
                    available: self.handlers.keys().cloned().collect::<Vec<_>>().join(", "),
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `batch` through each extension in order.
pub fn apply_chain(chain: &[&dyn Extension], batch: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    chain
        .iter()
        .fold(batch, |batch, extension| extension.apply(batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Extras, MetadataFormat};

    fn record(slug: &str, status: Status, tags: &[&str]) -> NormalizedRecord {
        NormalizedRecord {
            source_id: format!("{slug}.md"),
            format: MetadataFormat::JsonBlock,
            title: slug.into(),
            description: String::new(),
            status,
            category: Category::Posts,
            date: "2024-01-01".into(),
            slug: slug.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            extras: Extras::new(),
            body: String::new(),
        }
    }

    #[test]
    fn builtins_are_registered() {
        let registry = ExtensionRegistry::with_builtins();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("drop-drafts").is_some());
        assert!(registry.get("dedupe-tags").is_some());
        let names: Vec<_> = registry.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["dedupe-tags", "drop-drafts"]);
    }

    #[test]
    fn unknown_names_are_reported() {
        let registry = ExtensionRegistry::with_builtins();
        let err = match registry.resolve(&["drop-drafts".into(), "nope".into()]) {
            Ok(_) => panic!("expected an error"),
            Err(err) => err,
        };
        assert_eq!(err.name, "nope");
        assert!(err.to_string().contains("dedupe-tags, drop-drafts"));
    }

    #[test]
    fn chain_applies_in_order() {
        let registry = ExtensionRegistry::with_builtins();
        let chain = registry
            .resolve(&["drop-drafts".into(), "dedupe-tags".into()])
            .unwrap();
        let batch = vec![
            record("pub", Status::Published, &["x", "y", "x"]),
            record("draft", Status::Draft, &[]),
        ];
        let out = apply_chain(&chain, batch);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].slug, "pub");
        assert_eq!(out[0].tags, vec!["x", "y"]);
    }

    #[test]
    fn custom_extension_can_be_registered() {
        struct Nothing;
        impl Extension for Nothing {
            fn name(&self) -> &str {
                "nothing"
            }
            fn description(&self) -> &str {
                "Drop everything"
            }
            fn apply(&self, _batch: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
                Vec::new()
            }
        }

        let mut registry = ExtensionRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(Nothing));
        let chain = registry.resolve(&["nothing".into()]).unwrap();
        assert!(apply_chain(&chain, vec![record("a", Status::Published, &[])]).is_empty());
    }
}
