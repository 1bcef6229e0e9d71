//! Front matter format detection and document splitting.
//!
//! A document is a metadata block followed by a body. Two block shapes are
//! recognized, and JSON always wins:
//!
//! 1. **JSON**: the first `}` immediately followed by a blank line ends
//!    the block. The brace belongs to the metadata; the blank line is the
//!    separator.
//! 2. **YAML**: only considered when no JSON terminator exists anywhere in
//!    the document. The first line consisting of `---` followed by a blank
//!    line ends the block; that line and the blank line form the separator.
//!
//! A document matching neither shape is a [`PipelineError::Detection`].

use crate::error::PipelineError;
use crate::models::{MetadataFormat, RawDocument, RawSplit};

/// Closing brace followed by a blank line.
pub const JSON_TERMINATOR: &[u8] = b"}\n\n";

/// Triple-dash line followed by a blank line.
pub const YAML_TERMINATOR: &[u8] = b"---\n\n";

/// Split a document into metadata and body.
pub fn split(doc: &RawDocument) -> Result<RawSplit<'_>, PipelineError> {
    split_bytes(&doc.source_id, &doc.bytes)
}

/// Split raw bytes; `source_id` is only used for error reporting.
pub fn split_bytes<'a>(source_id: &str, bytes: &'a [u8]) -> Result<RawSplit<'a>, PipelineError> {
    if let Some(pos) = find(bytes, JSON_TERMINATOR) {
        // Keep the closing brace with the metadata.
        let end = pos + 1;
        return Ok(RawSplit {
            format: MetadataFormat::JsonBlock,
            metadata: &bytes[..end],
            body: &bytes[end + MetadataFormat::JsonBlock.separator().len()..],
        });
    }

    if let Some(pos) = find_at_line_start(bytes, YAML_TERMINATOR) {
        return Ok(RawSplit {
            format: MetadataFormat::YamlBlock,
            metadata: &bytes[..pos],
            body: &bytes[pos + YAML_TERMINATOR.len()..],
        });
    }

    Err(PipelineError::Detection {
        source_id: source_id.to_string(),
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn find_at_line_start(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .enumerate()
        .find(|(i, window)| *window == needle && (*i == 0 || haystack[i - 1] == b'\n'))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json_block() {
        let doc = RawDocument::new("a.md", "{\"title\": \"Hi\"}\n\nBody here.\n");
        let split = split(&doc).unwrap();
        assert_eq!(split.format, MetadataFormat::JsonBlock);
        assert_eq!(split.metadata, b"{\"title\": \"Hi\"}");
        assert_eq!(split.body, b"Body here.\n");
    }

    #[test]
    fn detects_yaml_block() {
        let doc = RawDocument::new("b.md", "---\ntitle: Hi\n---\n\nBody.\n");
        let split = split(&doc).unwrap();
        assert_eq!(split.format, MetadataFormat::YamlBlock);
        assert_eq!(split.metadata, b"---\ntitle: Hi\n");
        assert_eq!(split.body, b"Body.\n");
    }

    #[test]
    fn json_takes_priority_over_later_yaml() {
        let text = "{\"title\": \"Json\"}\n\nsome text\n---\n\nmore\n";
        let split = split_bytes("c.md", text.as_bytes()).unwrap();
        assert_eq!(split.format, MetadataFormat::JsonBlock);
        assert_eq!(split.body, b"some text\n---\n\nmore\n");
    }

    #[test]
    fn json_terminator_in_body_still_commits_to_json() {
        let text = "---\ntitle: Yaml\n---\n\n```\nfn main() {}\n\n```\n";
        let split = split_bytes("d.md", text.as_bytes()).unwrap();
        assert_eq!(split.format, MetadataFormat::JsonBlock);
    }

    #[test]
    fn yaml_terminator_must_start_a_line() {
        let text = "title: x\n----\n\nbody";
        assert!(split_bytes("e.md", text.as_bytes()).is_err());
    }

    #[test]
    fn no_front_matter_is_detection_failure() {
        let err = split_bytes("plain.md", b"# Just a heading\n\nText.").unwrap_err();
        assert!(matches!(err, PipelineError::Detection { .. }));
        assert_eq!(err.source_id(), "plain.md");
    }

    #[test]
    fn metadata_and_body_are_contiguous() {
        let text = b"---\nslug: s\n---\n\nB";
        let split = split_bytes("f.md", text).unwrap();
        let total = split.metadata.len() + YAML_TERMINATOR.len() + split.body.len();
        assert_eq!(total, text.len());
    }
}
