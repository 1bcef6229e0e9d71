//! URL slug generation.
//!
//! One algorithm is used everywhere a slug is derived: lower-case the input,
//! collapse every run of characters outside `[a-z0-9]` into a single `-`,
//! trim hyphens from both ends, and fall back to `"untitled"` when nothing
//! is left.

use once_cell::sync::Lazy;
use regex::Regex;

/// Slug used when the input contains no usable characters.
pub const DEFAULT_SLUG: &str = "untitled";

static NON_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new("[^a-z0-9]+").unwrap());

/// Derive a URL-safe slug from a title.
///
/// ```rust
/// use postsync_core::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("!!!"), "untitled");
/// ```
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    let replaced = NON_ALNUM_RUN.replace_all(&lower, "-");
    let slug = replaced.trim_matches('-');
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
