//! Re-emit a normalized record as a document.
//!
//! The output uses the record's original metadata format followed by the
//! format's separator and the untouched body, so it splits back into the
//! same record. Rendering a document that is already normalized produces
//! identical bytes. Output that would not split back the same way is
//! refused with [`RenderError::Unstable`].

use crate::detect;
use crate::error::RenderError;
use crate::models::{MetadataFormat, NormalizedRecord};

/// Opening delimiter written before a YAML block.
const YAML_OPENER: &str = "---\n";

/// Render `record` as front matter + separator + body.
pub fn render(record: &NormalizedRecord) -> Result<String, RenderError> {
    let mut out = match record.format {
        MetadataFormat::JsonBlock => serde_json::to_string_pretty(record)?,
        MetadataFormat::YamlBlock => {
            let yaml = serde_yaml::to_string(record)?;
            format!("{YAML_OPENER}{yaml}")
        }
    };
    out.push_str(separator_str(record.format));
    out.push_str(&record.body);

    // A YAML block scalar can carry `}` and a blank line, which the detector
    // reads as a JSON terminator.
    match detect::split_bytes(&record.source_id, out.as_bytes()) {
        Ok(split) if split.format == record.format && split.body == record.body.as_bytes() => {
            Ok(out)
        }
        _ => Err(RenderError::Unstable {
            format: record.format,
        }),
    }
}

fn separator_str(format: MetadataFormat) -> &'static str {
    match format {
        MetadataFormat::JsonBlock => "\n\n",
        MetadataFormat::YamlBlock => "---\n\n",
    }
}
