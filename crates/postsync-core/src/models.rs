//! Core data models used throughout postsync.
//!
//! These types represent the documents, metadata blocks, and normalized
//! records that flow through the detect → parse → normalize → sync pipeline.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::CANONICAL_FORMAT;

/// Title substituted when a document carries none.
pub const DEFAULT_TITLE: &str = "Untitled Post";

/// Metadata keys that map onto typed [`FrontMatter`] fields.
///
/// Everything else in a metadata block is carried in [`Extras`].
pub const RECOGNIZED_FIELDS: &[&str] = &[
    "title",
    "description",
    "status",
    "type",
    "date",
    "slug",
    "tags",
];

/// Raw document bytes as produced by a file source, before detection.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Where the document came from (usually a corpus-relative path).
    pub source_id: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(source_id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source_id: source_id.into(),
            bytes: bytes.into(),
        }
    }
}

/// Serialization of a document's metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetadataFormat {
    /// A JSON object terminated by `}` and a blank line.
    JsonBlock,
    /// A YAML block terminated by a `---` line and a blank line.
    YamlBlock,
}

impl MetadataFormat {
    /// Bytes that sit between the metadata block and the body.
    pub fn separator(&self) -> &'static [u8] {
        match self {
            MetadataFormat::JsonBlock => b"\n\n",
            MetadataFormat::YamlBlock => b"---\n\n",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataFormat::JsonBlock => "json",
            MetadataFormat::YamlBlock => "yaml",
        }
    }
}

impl fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document split into its metadata block and body.
///
/// Both slices borrow from the original document bytes; `metadata` always
/// precedes `body`, with [`MetadataFormat::separator`] between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSplit<'a> {
    pub format: MetadataFormat,
    pub metadata: &'a [u8],
    pub body: &'a [u8],
}

/// Publication status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Published,
    Draft,
}

impl Status {
    /// Coerce a raw metadata value; anything unrecognized becomes `Published`.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "draft" => Status::Draft,
            _ => Status::Published,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Published => "published",
            Status::Draft => "draft",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of post categories (stored under the `type` key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Posts,
    Newsletter,
    Thoughts,
    Projects,
    Til,
    Work,
    Sqlog,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Posts,
        Category::Newsletter,
        Category::Thoughts,
        Category::Projects,
        Category::Til,
        Category::Work,
        Category::Sqlog,
    ];

    /// Coerce a raw metadata value; anything outside the set becomes `Posts`.
    pub fn coerce(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == raw)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Posts => "posts",
            Category::Newsletter => "newsletter",
            Category::Thoughts => "thoughts",
            Category::Projects => "projects",
            Category::Til => "til",
            Category::Work => "work",
            Category::Sqlog => "sqlog",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque metadata value preserved for round-tripping.
///
/// Variant order matters: untagged deserialization tries them top to bottom,
/// so integers are preferred over floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ExtraValue>),
    Mapping(BTreeMap<String, ExtraValue>),
}

impl ExtraValue {
    /// Render a scalar as a string. Null and collections yield `None`.
    pub fn as_scalar_string(&self) -> Option<String> {
        match self {
            ExtraValue::String(s) => Some(s.clone()),
            ExtraValue::Integer(i) => Some(i.to_string()),
            // Debug formatting keeps the decimal point: 1.0 stays "1.0".
            ExtraValue::Float(f) => Some(format!("{f:?}")),
            ExtraValue::Bool(b) => Some(b.to_string()),
            ExtraValue::Null | ExtraValue::Sequence(_) | ExtraValue::Mapping(_) => None,
        }
    }
}

impl From<serde_json::Value> for ExtraValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ExtraValue::Null,
            serde_json::Value::Bool(b) => ExtraValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ExtraValue::Integer(i),
                None => n
                    .as_f64()
                    .map(ExtraValue::Float)
                    .unwrap_or_else(|| ExtraValue::String(n.to_string())),
            },
            serde_json::Value::String(s) => ExtraValue::String(s),
            serde_json::Value::Array(items) => {
                ExtraValue::Sequence(items.into_iter().map(ExtraValue::from).collect())
            }
            serde_json::Value::Object(map) => ExtraValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, ExtraValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for ExtraValue {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => ExtraValue::Null,
            serde_yaml::Value::Bool(b) => ExtraValue::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => ExtraValue::Integer(i),
                None => n
                    .as_f64()
                    .map(ExtraValue::Float)
                    .unwrap_or_else(|| ExtraValue::String(n.to_string())),
            },
            serde_yaml::Value::String(s) => ExtraValue::String(s),
            serde_yaml::Value::Sequence(items) => {
                ExtraValue::Sequence(items.into_iter().map(ExtraValue::from).collect())
            }
            serde_yaml::Value::Mapping(map) => ExtraValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), ExtraValue::from(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => ExtraValue::from(tagged.value),
        }
    }
}

/// YAML allows non-string keys; they are stringified so extras stay a
/// string-keyed mapping.
pub(crate) fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => ExtraValue::from(other)
            .as_scalar_string()
            .unwrap_or_else(|| "~".to_string()),
    }
}

/// Unrecognized metadata fields, keyed by name.
pub type Extras = BTreeMap<String, ExtraValue>;

/// Tentative, schema-shaped record produced by the metadata parser.
///
/// Every field is optional: absence and malformed scalars are resolved
/// later by [`normalize`](crate::normalize). Collections supplied where a
/// scalar is expected are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Option<Vec<String>>,
    #[serde(skip)]
    pub extras: Extras,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use tracing::debug;

    use super::ExtraValue;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = ExtraValue::deserialize(deserializer)?;
        Ok(value.as_scalar_string())
    }

    pub fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = ExtraValue::deserialize(deserializer)?;
        Ok(match value {
            ExtraValue::Null | ExtraValue::Mapping(_) => None,
            ExtraValue::Sequence(items) => {
                let total = items.len();
                let tags: Vec<String> = items
                    .iter()
                    .filter_map(ExtraValue::as_scalar_string)
                    .collect();
                if tags.len() < total {
                    debug!(dropped = total - tags.len(), "non-scalar tag elements ignored");
                }
                Some(tags)
            }
            scalar => scalar.as_scalar_string().map(|s| vec![s]),
        })
    }
}

/// Fully defaulted, schema-conformant record.
///
/// Serializes to the metadata blob stored alongside the body: typed fields
/// first (category under `type`), then extras flattened in key order. The
/// body, format, and source identifier are not part of the blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    #[serde(skip)]
    pub source_id: String,
    #[serde(skip)]
    pub format: MetadataFormat,
    pub title: String,
    pub description: String,
    pub status: Status,
    #[serde(rename = "type")]
    pub category: Category,
    pub date: String,
    pub slug: String,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extras: Extras,
    #[serde(skip)]
    pub body: String,
}

impl NormalizedRecord {
    /// The record's date as a calendar date, if it is in canonical form.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, CANONICAL_FORMAT).ok()
    }

    /// Serialize the metadata blob (everything but the body) as JSON.
    pub fn metadata_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_coercion() {
        assert_eq!(Status::coerce("draft"), Status::Draft);
        assert_eq!(Status::coerce("published"), Status::Published);
        assert_eq!(Status::coerce("Draft"), Status::Published);
        assert_eq!(Status::coerce(""), Status::Published);
    }

    #[test]
    fn category_coercion() {
        for c in Category::ALL {
            assert_eq!(Category::coerce(c.as_str()), c);
        }
        assert_eq!(Category::coerce("blog"), Category::Posts);
        assert_eq!(Category::coerce(""), Category::Posts);
    }

    #[test]
    fn scalar_strings_keep_float_text() {
        assert_eq!(ExtraValue::Float(1.0).as_scalar_string().as_deref(), Some("1.0"));
        assert_eq!(ExtraValue::Float(2.25).as_scalar_string().as_deref(), Some("2.25"));
        assert_eq!(ExtraValue::Integer(7).as_scalar_string().as_deref(), Some("7"));
        assert_eq!(ExtraValue::Sequence(vec![]).as_scalar_string(), None);
    }

    #[test]
    fn yaml_extras_stringify_keys() {
        let value: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        let ExtraValue::Mapping(map) = ExtraValue::from(value) else {
            panic!("expected mapping");
        };
        assert_eq!(map.get("1"), Some(&ExtraValue::String("one".into())));
        assert_eq!(map.get("true"), Some(&ExtraValue::String("yes".into())));
    }

    #[test]
    fn metadata_json_flattens_extras_and_skips_body() {
        let mut extras = Extras::new();
        extras.insert("image_url".into(), ExtraValue::String("/a.png".into()));
        let record = NormalizedRecord {
            source_id: "a.md".into(),
            format: MetadataFormat::JsonBlock,
            title: "Hello".into(),
            description: String::new(),
            status: Status::Draft,
            category: Category::Til,
            date: "2024-01-15".into(),
            slug: "hello".into(),
            tags: vec!["rust".into()],
            extras,
            body: "body text".into(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&record.metadata_json().unwrap()).unwrap();
        assert_eq!(json["type"], "til");
        assert_eq!(json["status"], "draft");
        assert_eq!(json["image_url"], "/a.png");
        assert!(json.get("body").is_none());
        assert!(json.get("source_id").is_none());
    }
}
