//! YAML front-matter split/render and the `sync_checksum` marker.
//!
//! A sealed document looks like:
//!
//! ```text
//! ---
//! title: ...
//! sync_checksum: <sha256 hex of the document without this line>
//! ---
//!
//! body
//! ```
//!
//! The marker lets a later sync tell a pristine synced copy from one that was
//! edited by hand.

use serde_yaml::{Mapping, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const CHECKSUM_KEY: &str = "sync_checksum";

/// Why a front-matter block could not be read.
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("no front-matter block (file must start with `---`)")]
    Missing,

    #[error("front-matter block is never closed")]
    Unterminated,

    #[error("front-matter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front-matter must be a mapping")]
    NotAMapping,
}

/// A markdown document split into front-matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub front_matter: Mapping,
    pub body: String,
}

/// Split `content` (LF line endings) into front-matter and body.
///
/// The block opens with a `---` first line and closes with `---` or `...`.
pub fn split(content: &str) -> Result<Document, FrontMatterError> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next().ok_or(FrontMatterError::Missing)?;
    if first.trim_end() != "---" {
        return Err(FrontMatterError::Missing);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        let marker = line.trim_end();
        if marker == "---" || marker == "..." {
            let front_matter = parse_mapping(&content[yaml_start..offset])?;
            let body = content[offset + line.len()..].to_string();
            return Ok(Document { front_matter, body });
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

fn parse_mapping(yaml: &str) -> Result<Mapping, FrontMatterError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FrontMatterError::NotAMapping),
    }
}

/// Render `front_matter` + `body` and append the checksum marker as the last
/// front-matter line.
pub fn seal(front_matter: &Mapping, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = if front_matter.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(front_matter)?
    };
    let unsealed = format!("---\n{yaml}---\n\n{body}");
    let digest = sha256_hex(&unsealed);
    Ok(format!("---\n{yaml}{CHECKSUM_KEY}: {digest}\n---\n\n{body}"))
}

/// State of the checksum marker in a previously synced file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    /// No marker (written by hand or by an older sync).
    Missing,
    /// Marker matches the content.
    Valid,
    /// Content changed since the marker was written.
    Mismatch,
}

/// Check the marker inside the front-matter block of `content`.
pub fn verify(content: &str) -> Checksum {
    let prefix = format!("{CHECKSUM_KEY}: ");
    let mut offset = 0;
    for (index, line) in content.split_inclusive('\n').enumerate() {
        let trimmed = line.trim_end();
        if index > 0 && (trimmed == "---" || trimmed == "...") {
            break;
        }
        if let Some(recorded) = trimmed.strip_prefix(&prefix) {
            let without = format!("{}{}", &content[..offset], &content[offset + line.len()..]);
            return if sha256_hex(&without) == recorded.trim() {
                Checksum::Valid
            } else {
                Checksum::Mismatch
            };
        }
        offset += line.len();
    }
    Checksum::Missing
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_reads_mapping_and_body() {
        let doc = split("---\ntitle: Hello\ntags: [a, b]\n---\n\nBody text\n").expect("split");
        assert_eq!(doc.front_matter.get("title").and_then(Value::as_str), Some("Hello"));
        assert_eq!(doc.body, "\nBody text\n");
    }

    #[test]
    fn split_accepts_dot_terminator_and_empty_block() {
        let doc = split("---\ntitle: x\n...\nbody").expect("split");
        assert_eq!(doc.body, "body");

        let doc = split("---\n---\nbody").expect("split");
        assert!(doc.front_matter.is_empty());
    }

    #[test]
    fn split_rejects_bad_blocks() {
        assert!(matches!(split("# Just markdown\n"), Err(FrontMatterError::Missing)));
        assert!(matches!(split(""), Err(FrontMatterError::Missing)));
        assert!(matches!(
            split("---\ntitle: x\nbody without close\n"),
            Err(FrontMatterError::Unterminated)
        ));
        assert!(matches!(
            split("---\ntitle: [unclosed\n---\n"),
            Err(FrontMatterError::Yaml(_))
        ));
        assert!(matches!(
            split("---\n- a\n- b\n---\n"),
            Err(FrontMatterError::NotAMapping)
        ));
    }

    #[test]
    fn body_horizontal_rule_is_not_a_terminator_of_the_next_block() {
        let doc = split("---\ntitle: x\n---\nintro\n\n---\n\nfooter\n").expect("split");
        assert_eq!(doc.body, "intro\n\n---\n\nfooter\n");
    }

    #[test]
    fn sealed_document_verifies_and_resplits() {
        let mut fm = Mapping::new();
        fm.insert("title".into(), "Hello".into());
        let sealed = seal(&fm, "Body\n").expect("seal");

        assert!(sealed.starts_with("---\ntitle: Hello\nsync_checksum: "));
        assert_eq!(verify(&sealed), Checksum::Valid);

        let doc = split(&sealed).expect("split");
        assert!(doc.front_matter.contains_key(CHECKSUM_KEY));
        assert_eq!(doc.body, "\nBody\n");
    }

    #[test]
    fn edits_are_detected() {
        let mut fm = Mapping::new();
        fm.insert("title".into(), "Hello".into());
        let sealed = seal(&fm, "Body\n").expect("seal");

        let edited = sealed.replace("Body", "Body, edited by hand");
        assert_eq!(verify(&edited), Checksum::Mismatch);
        assert_eq!(verify("---\ntitle: x\n---\nbody\n"), Checksum::Missing);
    }

    #[test]
    fn marker_in_body_is_ignored() {
        let text = "---\ntitle: x\n---\nsync_checksum: abc\n";
        assert_eq!(verify(text), Checksum::Missing);
    }
}
