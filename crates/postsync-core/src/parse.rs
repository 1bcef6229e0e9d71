//! Metadata block parsing.
//!
//! Each block is deserialized twice from the same bytes:
//!
//! - into an untyped map, which is the only place unknown keys survive.
//!   After removing [`RECOGNIZED_FIELDS`] what remains becomes the extras;
//! - into [`FrontMatter`], which picks up the typed fields leniently.
//!
//! Missing optional fields never fail a parse. Only syntax errors (or a
//! block that is not a mapping) do, and those are reported per document.

use serde_json::Map;

use crate::error::PipelineError;
use crate::models::{
    yaml_key, ExtraValue, Extras, FrontMatter, MetadataFormat, RawSplit, RECOGNIZED_FIELDS,
};

/// Output of the parser: a tentative record plus the untouched body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub source_id: String,
    pub format: MetadataFormat,
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Parse a split document's metadata block according to its format.
pub fn parse(source_id: &str, split: &RawSplit<'_>) -> Result<ParsedDocument, PipelineError> {
    let fail = |message: String| PipelineError::Parse {
        source_id: source_id.to_string(),
        format: split.format,
        message,
    };

    let mut front_matter = match split.format {
        MetadataFormat::JsonBlock => parse_json(split.metadata).map_err(fail)?,
        MetadataFormat::YamlBlock => parse_yaml(split.metadata).map_err(fail)?,
    };
    strip_recognized(&mut front_matter.extras);

    let body = String::from_utf8(split.body.to_vec())
        .map_err(|e| fail(format!("body is not valid UTF-8: {e}")))?;

    Ok(ParsedDocument {
        source_id: source_id.to_string(),
        format: split.format,
        front_matter,
        body,
    })
}

fn parse_json(bytes: &[u8]) -> Result<FrontMatter, String> {
    // Repeated keys are valid JSON and resolve last-wins in the map; the
    // typed pass reads the map so it sees the same single value.
    let untyped: Map<String, serde_json::Value> =
        serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    let mut front_matter: FrontMatter =
        serde_json::from_value(serde_json::Value::Object(untyped.clone()))
            .map_err(|e| e.to_string())?;

    front_matter.extras = untyped
        .into_iter()
        .map(|(k, v)| (k, ExtraValue::from(v)))
        .collect();
    Ok(front_matter)
}

fn parse_yaml(bytes: &[u8]) -> Result<FrontMatter, String> {
    let untyped: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(|e| e.to_string())?;
    let mapping = match untyped {
        // A block holding only the opening delimiter or comments.
        serde_yaml::Value::Null => return Ok(FrontMatter::default()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => return Err("front matter is not a mapping".to_string()),
    };

    let mut front_matter: FrontMatter =
        serde_yaml::from_slice(bytes).map_err(|e| e.to_string())?;

    front_matter.extras = mapping
        .into_iter()
        .map(|(k, v)| (yaml_key(k), ExtraValue::from(v)))
        .collect();
    Ok(front_matter)
}

fn strip_recognized(extras: &mut Extras) {
    for key in RECOGNIZED_FIELDS {
        extras.remove(*key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::split_bytes;

    fn parse_text(text: &str) -> Result<ParsedDocument, PipelineError> {
        let split = split_bytes("t.md", text.as_bytes())?;
        parse("t.md", &split)
    }

    #[test]
    fn json_typed_fields_and_extras() {
        let doc = parse_text(
            "{\"title\": \"Hello\", \"type\": \"til\", \"tags\": [\"a\", \"b\"], \"image_url\": \"/x.png\", \"draft_no\": 3}\n\nBody",
        )
        .unwrap();
        assert_eq!(doc.format, MetadataFormat::JsonBlock);
        assert_eq!(doc.front_matter.title.as_deref(), Some("Hello"));
        assert_eq!(doc.front_matter.category.as_deref(), Some("til"));
        assert_eq!(doc.front_matter.tags, Some(vec!["a".into(), "b".into()]));
        assert_eq!(doc.front_matter.extras.len(), 2);
        assert_eq!(
            doc.front_matter.extras.get("image_url"),
            Some(&ExtraValue::String("/x.png".into()))
        );
        assert_eq!(doc.front_matter.extras.get("draft_no"), Some(&ExtraValue::Integer(3)));
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn yaml_typed_fields_and_nested_extras() {
        let doc = parse_text(
            "---\ntitle: Hi there\ndate: 2024-01-15\nseries:\n  name: intro\n  part: 2\n---\n\n# Body\n",
        )
        .unwrap();
        assert_eq!(doc.format, MetadataFormat::YamlBlock);
        assert_eq!(doc.front_matter.title.as_deref(), Some("Hi there"));
        assert_eq!(doc.front_matter.date.as_deref(), Some("2024-01-15"));
        assert!(doc.front_matter.tags.is_none());
        let Some(ExtraValue::Mapping(series)) = doc.front_matter.extras.get("series") else {
            panic!("series should be a nested mapping");
        };
        assert_eq!(series.get("part"), Some(&ExtraValue::Integer(2)));
        assert_eq!(doc.body, "# Body\n");
    }

    #[test]
    fn missing_fields_are_not_errors() {
        let doc = parse_text("{}\n\nBody").unwrap();
        assert_eq!(doc.front_matter, FrontMatter::default());
    }

    #[test]
    fn empty_yaml_block_is_default() {
        let doc = parse_text("---\n---\n\nBody").unwrap();
        assert_eq!(doc.front_matter, FrontMatter::default());
    }

    #[test]
    fn scalar_fields_accept_numbers_and_bools() {
        let doc = parse_text("{\"title\": 1999, \"slug\": true, \"tags\": \"solo\"}\n\nB").unwrap();
        assert_eq!(doc.front_matter.title.as_deref(), Some("1999"));
        assert_eq!(doc.front_matter.slug.as_deref(), Some("true"));
        assert_eq!(doc.front_matter.tags, Some(vec!["solo".into()]));
    }

    #[test]
    fn repeated_json_keys_keep_the_last_value() {
        let doc = parse_text("{\"title\": \"a\", \"title\": \"b\", \"mood\": 1, \"mood\": 2}\n\nbody")
            .unwrap();
        assert_eq!(doc.front_matter.title.as_deref(), Some("b"));
        assert_eq!(doc.front_matter.extras.get("mood"), Some(&ExtraValue::Integer(2)));
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn float_scalars_keep_their_decimal_point() {
        let doc = parse_text("---\ntitle: 1.0\nslug: 2.5\n---\n\nB").unwrap();
        assert_eq!(doc.front_matter.title.as_deref(), Some("1.0"));
        assert_eq!(doc.front_matter.slug.as_deref(), Some("2.5"));
    }

    #[test]
    fn non_scalar_tag_elements_are_dropped_in_order() {
        let doc = parse_text("---\ntags: [a, [x, y], 3, {k: v}, b]\n---\n\nB").unwrap();
        assert_eq!(
            doc.front_matter.tags,
            Some(vec!["a".into(), "3".into(), "b".into()])
        );
    }

    #[test]
    fn null_tags_are_absent() {
        let doc = parse_text("---\ntitle: x\ntags:\n---\n\nB").unwrap();
        assert!(doc.front_matter.tags.is_none());
    }

    #[test]
    fn invalid_json_is_parse_failure() {
        let err = parse_text("{\"title\": \"unterminated}\n\nBody").unwrap_err();
        match err {
            PipelineError::Parse { format, source_id, .. } => {
                assert_eq!(format, MetadataFormat::JsonBlock);
                assert_eq!(source_id, "t.md");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_yaml_is_parse_failure() {
        let err = parse_text("---\ntitle: [unclosed\n---\n\nBody").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Parse {
                format: MetadataFormat::YamlBlock,
                ..
            }
        ));
    }

    #[test]
    fn yaml_scalar_block_is_parse_failure() {
        let err = parse_text("just a sentence\n---\n\nBody").unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }
}
