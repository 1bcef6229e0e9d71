//! # postsync CLI
//!
//! ## Usage
//!
//! ```bash
//! postsync --config ./config/postsync.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `postsync init` | Create the SQLite database and run schema migrations |
//! | `postsync sync` | Insert posts from the corpus that are not yet stored |
//! | `postsync clean` | Rewrite corpus files with normalized front matter |
//! | `postsync get <slug>` | Print a stored post |
//! | `postsync extensions` | List batch extensions and whether they are enabled |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use postsync::{clean, config, extensions, get, ingest, migrate};
use postsync_core::extension::ExtensionRegistry;

/// postsync: normalize Markdown front matter and sync posts into SQLite.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/postsync.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "postsync",
    about = "Normalize Markdown front matter and sync posts into SQLite",
    version,
    long_about = "postsync reads a corpus of Markdown documents with JSON or YAML front matter, \
    normalizes every field to a canonical form, and inserts posts whose slug is not yet stored. \
    Running it twice over the same corpus changes nothing."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/postsync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it multiple times is safe.
    Init,

    /// Sync the corpus into the database.
    ///
    /// Normalizes every document with front matter, then inserts the
    /// records whose slug is not already stored, oldest first.
    Sync {
        /// Show what would be inserted without writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of documents to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Rewrite corpus files with normalized front matter.
    Clean {
        /// List files that would change without writing them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a stored post by slug.
    Get {
        /// Post slug.
        slug: String,
    },

    /// List available batch extensions.
    Extensions,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            init_tracing("info");
            return Err(err);
        }
    };
    init_tracing(&cfg.log.level);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sync { dry_run, limit } => {
            ingest::run_sync(&cfg, dry_run, limit).await?;
        }
        Commands::Clean { dry_run } => {
            clean::run_clean(&cfg, dry_run).await?;
        }
        Commands::Get { slug } => {
            get::run_get(&cfg, &slug).await?;
        }
        Commands::Extensions => {
            let registry = ExtensionRegistry::with_builtins();
            extensions::list_extensions(&cfg, &registry);
        }
    }

    Ok(())
}
