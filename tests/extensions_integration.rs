//! Integration tests for the library surface: a custom [`Extension`]
//! registered by the caller flows through the real sync pipeline into
//! SQLite, and cleanup leaves documents that sync to the same slugs.

use std::fs;
use std::path::Path;

use postsync::clean::clean_corpus;
use postsync::config::{load_config, Config};
use postsync::get::get_post;
use postsync::ingest::sync_corpus;
use postsync_core::extension::{Extension, ExtensionRegistry};
use postsync_core::models::NormalizedRecord;
use tempfile::TempDir;

// ─── Test Extension ─────────────────────────────────────────────────

/// Prefixes every slug, proving caller-registered extensions run.
struct PrefixSlugs;

impl Extension for PrefixSlugs {
    fn name(&self) -> &str {
        "prefix-slugs"
    }

    fn description(&self) -> &str {
        "Prefix slugs with 'blog-'"
    }

    fn apply(&self, batch: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
        batch
            .into_iter()
            .map(|mut record| {
                record.slug = format!("blog-{}", record.slug);
                record
            })
            .collect()
    }
}

fn setup(extensions: &str) -> (TempDir, Config) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let posts = root.join("posts");
    fs::create_dir_all(&posts).unwrap();

    fs::write(
        posts.join("one.md"),
        "---\ntitle: First Post\ndate: 2024-01-02\ntags: [a, b, a]\n---\n\nOne.\n",
    )
    .unwrap();
    fs::write(
        posts.join("two.md"),
        "{\"title\": \"Second Post\", \"date\": \"2024/01/01\", \"image_url\": \"/x.png\"}\n\nTwo.\n",
    )
    .unwrap();
    fs::write(posts.join("notes.md"), "plain notes\n").unwrap();

    let config_path = root.join("postsync.toml");
    fs::write(
        &config_path,
        format!(
            "[db]\npath = \"{0}/posts.sqlite\"\n\n[corpus]\nroot = \"{0}/posts\"\n\n[pipeline]\nextensions = [{1}]\n",
            root.display(),
            extensions
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    (tmp, config)
}

fn registry() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::with_builtins();
    registry.register(Box::new(PrefixSlugs));
    registry
}

#[tokio::test]
async fn custom_extension_runs_in_pipeline() {
    let (_tmp, config) = setup("\"prefix-slugs\", \"dedupe-tags\"");
    let registry = registry();

    let summary = sync_corpus(&config, &registry, false, None).await.unwrap();
    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.invalid, 1);
    // Oldest first: two.md is dated 2024-01-01.
    assert_eq!(
        summary.report.inserted,
        vec!["blog-second-post", "blog-first-post"]
    );

    let first = get_post(&config, "blog-first-post").await.unwrap();
    assert_eq!(first.metadata["tags"], serde_json::json!(["a", "b"]));

    let second = get_post(&config, "blog-second-post").await.unwrap();
    assert_eq!(second.metadata["image_url"], "/x.png");
    assert_eq!(second.metadata["status"], "published");
    assert_eq!(second.body, "Two.\n");
}

#[tokio::test]
async fn second_sync_is_a_noop() {
    let (_tmp, config) = setup("");
    let registry = ExtensionRegistry::with_builtins();

    let first = sync_corpus(&config, &registry, false, None).await.unwrap();
    assert_eq!(first.report.inserted_count(), 2);

    let second = sync_corpus(&config, &registry, false, None).await.unwrap();
    assert!(second.report.is_noop());
    assert_eq!(second.report.skipped_count(), 2);
}

#[tokio::test]
async fn dry_run_sees_existing_slugs() {
    let (_tmp, config) = setup("");
    let registry = ExtensionRegistry::with_builtins();

    sync_corpus(&config, &registry, false, None).await.unwrap();
    fs::write(
        config.corpus.root.join("three.md"),
        "---\ntitle: Third\n---\n\nThree.\n",
    )
    .unwrap();

    let preview = sync_corpus(&config, &registry, true, None).await.unwrap();
    assert_eq!(preview.report.inserted, vec!["third"]);
    assert_eq!(preview.report.skipped_count(), 2);
    assert!(get_post(&config, "third").await.is_err());
}

#[tokio::test]
async fn unknown_extension_is_fatal() {
    let (_tmp, config) = setup("\"prefix-slugs\"");
    let registry = ExtensionRegistry::with_builtins();
    let err = sync_corpus(&config, &registry, false, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("prefix-slugs"));
}

#[tokio::test]
async fn cleaned_corpus_syncs_to_the_same_slugs() {
    let (tmp, config) = setup("");
    let summary = clean_corpus(&config, false).unwrap();
    assert_eq!(summary.rewritten.len(), 2);
    assert_eq!(summary.invalid, 1);

    let one = fs::read_to_string(Path::new(tmp.path()).join("posts/one.md")).unwrap();
    assert!(one.starts_with("---\n"));
    assert!(one.contains("slug: first-post"));
    assert!(one.ends_with("---\n\nOne.\n"));

    let again = clean_corpus(&config, false).unwrap();
    assert!(again.rewritten.is_empty());
    assert_eq!(again.unchanged, 2);

    let registry = ExtensionRegistry::with_builtins();
    let report = sync_corpus(&config, &registry, false, None)
        .await
        .unwrap()
        .report;
    assert_eq!(report.inserted, vec!["second-post", "first-post"]);
}

#[tokio::test]
async fn dry_run_leaves_database_schema_alone() {
    let (_tmp, config) = setup("");
    let registry = ExtensionRegistry::with_builtins();

    // An existing database file without the posts table.
    let pool = postsync::db::connect(&config).await.unwrap();
    pool.close().await;

    let preview = sync_corpus(&config, &registry, true, None).await.unwrap();
    assert_eq!(preview.report.inserted_count(), 2);

    let pool = postsync::db::connect(&config).await.unwrap();
    let table = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'posts'")
        .fetch_optional(&pool)
        .await
        .unwrap();
    pool.close().await;
    assert!(table.is_none(), "dry run must not create the schema");
}

#[tokio::test]
async fn clean_skips_documents_that_would_not_read_back() {
    let (tmp, config) = setup("");
    let odd = tmp.path().join("posts/odd.md");
    let original = "---\ntitle: Odd\ndate: 2024-01-03\ndescription: \"a}\\n\\nb\"\n---\n\nbody\n";
    fs::write(&odd, original).unwrap();

    let summary = clean_corpus(&config, false).unwrap();
    assert_eq!(summary.failed, vec!["odd.md"]);
    assert_eq!(summary.rewritten.len(), 2);
    assert_eq!(fs::read_to_string(&odd).unwrap(), original);

    let registry = ExtensionRegistry::with_builtins();
    let report = sync_corpus(&config, &registry, false, None)
        .await
        .unwrap()
        .report;
    assert!(report.inserted.contains(&"odd".to_string()));
}
