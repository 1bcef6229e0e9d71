//! Post retrieval by slug.
//!
//! Fetches a single stored post from the database for `postsync get`.

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::{PostRow, SqliteStore};

/// Look up a post by slug, returning an error when it does not exist.
pub async fn get_post(config: &Config, slug: &str) -> Result<PostRow> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);

    let post = store
        .get_post(slug)
        .await
        .with_context(|| format!("Failed to query post '{}'", slug))?;
    store.pool().close().await;

    match post {
        Some(post) => Ok(post),
        None => bail!("post not found: {}", slug),
    }
}

/// CLI entry point: print the post to stdout.
pub async fn run_get(config: &Config, slug: &str) -> Result<()> {
    let post = get_post(config, slug).await?;

    println!("--- Post ---");
    println!("id:           {}", post.id);
    println!("title:        {}", post.title);
    println!("slug:         {}", post.slug);
    if post.deleted {
        println!("deleted:      true");
    }
    println!("created_at:   {}", post.created_at);
    println!("updated_at:   {}", post.updated_at);
    println!("metadata:     {}", post.metadata);
    println!();

    println!("--- Body ---");
    println!("{}", post.body);

    Ok(())
}
