//! Field normalization.
//!
//! Turns a tentative [`FrontMatter`] into a [`NormalizedRecord`]. The
//! function is total: every missing or malformed field has a default or a
//! repair, so a parsed document can never be rejected here.
//!
//! | Field | Rule |
//! |-------|------|
//! | `title` | blank → first-line heading (if enabled) → `"Untitled Post"` |
//! | `description` | absent → `""` |
//! | `status` | not `published`/`draft` → `published` |
//! | `type` | outside the seven categories → `posts` |
//! | `date` | canonicalized, unparseable → today |
//! | `slug` | blank → slug of the (possibly defaulted) title |
//! | `tags` | absent → `[]`, otherwise untouched |
//! | extras | untouched |

use chrono::NaiveDate;

use crate::date;
use crate::models::{Category, FrontMatter, NormalizedRecord, Status, DEFAULT_TITLE};
use crate::parse::ParsedDocument;
use crate::slug::slugify;

/// Knobs for [`normalize`].
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Substituted for missing or unparseable dates.
    pub today: NaiveDate,
    /// Recover a blank title from a leading Markdown heading in the body.
    ///
    /// Used by the ingestion driver; the cleanup driver leaves it off so a
    /// rewritten file never duplicates its heading into the metadata.
    pub title_from_heading: bool,
}

impl NormalizeOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            title_from_heading: false,
        }
    }

    pub fn with_title_from_heading(mut self, enabled: bool) -> Self {
        self.title_from_heading = enabled;
        self
    }
}

/// Normalize a parsed document into a fully defaulted record.
pub fn normalize(doc: ParsedDocument, options: &NormalizeOptions) -> NormalizedRecord {
    let ParsedDocument {
        source_id,
        format,
        front_matter,
        body,
    } = doc;
    let FrontMatter {
        title,
        description,
        status,
        category,
        date,
        slug,
        tags,
        extras,
    } = front_matter;

    let title = non_blank(title)
        .or_else(|| {
            options
                .title_from_heading
                .then(|| heading_title(&body))
                .flatten()
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let slug = non_blank(slug)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| slugify(&title));

    NormalizedRecord {
        source_id,
        format,
        description: description.unwrap_or_default(),
        status: Status::coerce(status.as_deref().unwrap_or_default()),
        category: Category::coerce(category.as_deref().unwrap_or_default()),
        date: date::canonicalize(date.as_deref().unwrap_or_default(), options.today),
        slug,
        tags: tags.unwrap_or_default(),
        extras,
        title,
        body,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Text of the body's first line if that line is a Markdown ATX heading.
pub fn heading_title(body: &str) -> Option<String> {
    let first = body.lines().next()?.trim();
    let text = first.strip_prefix('#')?.trim_start_matches('#').trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
