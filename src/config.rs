//! Configuration parsing and validation.
//!
//! postsync is configured via a TOML file (default: `config/postsync.toml`).
//! Only `[db]` and `[corpus]` are required; every other section has defaults.
//!
//! # Example
//!
//! ```toml
//! [db]
//! path = "./data/posts.sqlite"
//!
//! [corpus]
//! root = "./posts"
//! include_globs = ["**/*.md"]
//! exclude_globs = ["drafts/**"]
//!
//! [normalize]
//! title_from_heading = true
//!
//! [pipeline]
//! extensions = ["dedupe-tags"]
//!
//! [log]
//! level = "info"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct NormalizeConfig {
    /// Recover blank titles from a leading Markdown heading during `sync`.
    #[serde(default = "default_title_from_heading")]
    pub title_from_heading: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            title_from_heading: default_title_from_heading(),
        }
    }
}

fn default_title_from_heading() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PipelineConfig {
    /// Extension names, applied in order to the normalized batch.
    #[serde(default)]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.corpus.root.as_os_str().is_empty() {
        bail!("corpus.root must not be empty");
    }

    if config.db.path.as_os_str().is_empty() {
        bail!("db.path must not be empty");
    }

    if config.corpus.include_globs.is_empty() {
        bail!("corpus.include_globs must contain at least one pattern");
    }

    EnvFilter::try_new(&config.log.level)
        .with_context(|| format!("Invalid log.level: '{}'", config.log.level))?;

    Ok(config)
}
