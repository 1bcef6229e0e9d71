//! Corpus file source.
//!
//! Walks `corpus.root`, applies the include/exclude globs, and reads every
//! matching file as raw bytes. Source identifiers are paths relative to the
//! root, and the result is sorted by them so a scan is deterministic.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use postsync_core::RawDocument;

use crate::config::Config;

/// Documents read from the corpus.
#[derive(Debug, Default)]
pub struct CorpusScan {
    pub documents: Vec<RawDocument>,
    /// Source identifiers of matching files that could not be read.
    pub unreadable: Vec<String>,
}

impl CorpusScan {
    /// Path of a document on disk.
    pub fn path_of(config: &Config, source_id: &str) -> PathBuf {
        config.corpus.root.join(source_id)
    }
}

pub fn scan_corpus(config: &Config) -> Result<CorpusScan> {
    let corpus = &config.corpus;
    let root = &corpus.root;
    if !root.exists() {
        bail!("Corpus root does not exist: {}", root.display());
    }

    let include_set = build_globset(&corpus.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(corpus.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut scan = CorpusScan::default();

    let walker = WalkDir::new(root).follow_links(corpus.follow_symlinks);
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        match read_document(path, &rel_str) {
            Ok(doc) => scan.documents.push(doc),
            Err(err) => {
                warn!(source_id = %rel_str, error = %err, "unreadable file, skipping");
                scan.unreadable.push(rel_str);
            }
        }
    }

    // Sort for deterministic ordering
    scan.documents.sort_by(|a, b| a.source_id.cmp(&b.source_id));
    scan.unreadable.sort();

    debug!(
        root = %root.display(),
        documents = scan.documents.len(),
        unreadable = scan.unreadable.len(),
        "corpus scanned"
    );
    Ok(scan)
}

fn read_document(path: &Path, relative_path: &str) -> std::io::Result<RawDocument> {
    let bytes = std::fs::read(path)?;
    Ok(RawDocument::new(relative_path, bytes))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: '{}'", pattern))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Config, CorpusConfig, DbConfig, LogConfig, NormalizeConfig, PipelineConfig,
    };
    use std::fs;
    use tempfile::TempDir;

    fn config(root: &Path, exclude: &[&str]) -> Config {
        Config {
            db: DbConfig {
                path: root.join("posts.sqlite"),
            },
            corpus: CorpusConfig {
                root: root.to_path_buf(),
                include_globs: vec!["**/*.md".to_string()],
                exclude_globs: exclude.iter().map(|s| s.to_string()).collect(),
                follow_symlinks: false,
            },
            normalize: NormalizeConfig::default(),
            pipeline: PipelineConfig::default(),
            log: LogConfig::default(),
        }
    }

    #[test]
    fn scan_is_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("til")).unwrap();
        fs::create_dir_all(root.join("drafts")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("til/b.md"), "b").unwrap();
        fs::write(root.join("a.md"), "a").unwrap();
        fs::write(root.join("notes.txt"), "not markdown").unwrap();
        fs::write(root.join("drafts/c.md"), "c").unwrap();
        fs::write(root.join(".git/HEAD.md"), "x").unwrap();

        let scan = scan_corpus(&config(root, &["drafts/**"])).unwrap();
        let ids: Vec<_> = scan.documents.iter().map(|d| d.source_id.as_str()).collect();
        assert_eq!(ids, vec!["a.md", "til/b.md"]);
        assert!(scan.unreadable.is_empty());
        assert_eq!(scan.documents[0].bytes, b"a");
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let cfg = config(&tmp.path().join("nope"), &[]);
        assert!(scan_corpus(&cfg).is_err());
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let cfg = config(tmp.path(), &["[unclosed"]);
        assert!(scan_corpus(&cfg).is_err());
    }
}
