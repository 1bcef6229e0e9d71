//! # postsync core
//!
//! Pure logic for postsync: front matter detection, metadata parsing,
//! schema normalization, and the idempotent sync engine, plus the store
//! trait the engine talks to.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Drivers supply
//! [`models::RawDocument`]s and a [`store::PostStore`] implementation.
//!
//! ```text
//! RawDocument ─▶ detect ─▶ parse ─▶ normalize ─▶ [extensions] ─▶ sync ─▶ PostStore
//! ```

pub mod date;
pub mod detect;
pub mod error;
pub mod extension;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod render;
pub mod slug;
pub mod store;
pub mod sync;

pub use error::{PipelineError, RenderError, StoreError};
pub use models::{Category, MetadataFormat, NormalizedRecord, RawDocument, Status};
pub use store::PostStore;
