//! # postsync
//!
//! Normalize front matter across a Markdown corpus and sync the posts into
//! SQLite, idempotently.
//!
//! The pure pipeline (detection, parsing, normalization, dates, slugs, the
//! sync engine) lives in [`postsync_core`]. This crate adds the outer
//! surfaces: configuration, the corpus file source, the SQLite store, and
//! the `postsync` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────┐   ┌──────────┐
//! │   Corpus    │──▶│  detect → parse →    │──▶│  SQLite  │
//! │  (*.md)     │   │  normalize → extend  │   │  posts   │
//! └─────────────┘   └──────────┬───────────┘   └──────────┘
//!                              │
//!                              ▼
//!                       ┌─────────────┐
//!                       │ clean: write│
//!                       │ files back  │
//!                       └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! postsync init                 # create database
//! postsync sync --dry-run       # preview
//! postsync sync                 # insert new posts
//! postsync clean                # normalize front matter on disk
//! postsync get my-first-post
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`connector_fs`] | Corpus file source |
//! | [`ingest`] | `sync` orchestration |
//! | [`clean`] | In-place front matter rewrite |
//! | [`get`] | Single post retrieval |
//! | [`extensions`] | Extension listing |
//! | [`sqlite_store`] | `PostStore` over the `posts` table |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod clean;
pub mod config;
pub mod connector_fs;
pub mod db;
pub mod extensions;
pub mod get;
pub mod ingest;
pub mod migrate;
pub mod sqlite_store;
