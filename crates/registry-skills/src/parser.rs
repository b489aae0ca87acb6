//! Skill document parsing.
//!
//! A skill document optionally starts with a header block:
//!
//! ```text
//! ---
//! name: pdf-export
//! description: Export documents to PDF
//! ---
//!
//! # PDF Export
//! ...
//! ```
//!
//! The header is parsed as YAML. Hand-written descriptions often contain an
//! unquoted `": "`, which strict YAML rejects. Such plain values are quoted
//! and the header is parsed again. Any other syntax error stays an error.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::fs_util::bounded;
use crate::models::SkillMetadata;
use crate::scanner::skill_name_from_path;
use crate::triggers::extract_triggers;

const HEADER_BLOCK: &str = r"(?s)\A---\s*\n(.*?)\n---";

fn header_block() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(HEADER_BLOCK).ok()).as_ref()
}

/// Errors that drop a single document from the index.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document's file metadata could not be read.
    #[error("Failed to stat {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Header / Body Split ─────────────────────────────────────────────────

/// A document split into its raw header block and trimmed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentParts<'a> {
    /// Text between the `---` delimiters, if a header is present.
    pub header: Option<&'a str>,

    /// Everything after the header, trimmed.
    pub body: &'a str,
}

/// Separate the header block (anchored at the start) from the body.
pub fn split_document(text: &str) -> DocumentParts<'_> {
    if let Some(caps) = header_block().and_then(|re| re.captures(text)) {
        if let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) {
            return DocumentParts {
                header: Some(inner.as_str()),
                body: text[whole.end()..].trim(),
            };
        }
    }

    DocumentParts {
        header: None,
        body: text.trim(),
    }
}

// ── Header Fields ───────────────────────────────────────────────────────

/// Header fields the registry cares about. Other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Parse a raw header block.
///
/// Non-mapping headers (e.g. a lone scalar) yield empty fields.
pub fn parse_header(raw: &str) -> Result<HeaderFields, serde_yaml::Error> {
    let value = match serde_yaml::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(yaml_err) => match quote_plain_values(raw).map(|q| serde_yaml::from_str::<Value>(&q)) {
            Some(Ok(value)) => {
                debug!("Header has unquoted values containing ': ', read them as strings");
                value
            }
            _ => return Err(yaml_err),
        },
    };

    Ok(HeaderFields {
        name: scalar_field(&value, "name"),
        description: scalar_field(&value, "description"),
    })
}

fn scalar_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Characters that open a YAML construct a plain value cannot start with.
const YAML_INDICATORS: &[char] = &['[', '{', '"', '\'', '|', '>', '&', '*', '!', '%', '@', '`'];

/// Single-quote top-level plain values that contain `": "` or end in `:`.
///
/// Returns None when no line needed quoting.
fn quote_plain_values(raw: &str) -> Option<String> {
    let mut changed = false;
    let lines: Vec<String> = raw
        .lines()
        .map(|line| match plain_value_with_colon(line) {
            Some((key, value)) => {
                changed = true;
                format!("{}: '{}'", key, value.replace('\'', "''"))
            }
            None => line.to_string(),
        })
        .collect();

    changed.then(|| lines.join("\n"))
}

fn plain_value_with_colon(line: &str) -> Option<(&str, &str)> {
    if line.starts_with(&[' ', '\t', '-', '#'][..]) {
        return None;
    }

    let (key, value) = line.split_once(": ")?;
    let key = key.trim_end();
    let value = value.trim();
    if key.is_empty() || key.starts_with(YAML_INDICATORS) || value.starts_with(YAML_INDICATORS) {
        return None;
    }

    (value.contains(": ") || value.ends_with(':')).then_some((key, value))
}

// ── Metadata ────────────────────────────────────────────────────────────

/// Build a metadata record from document text.
///
/// Header problems are logged and degrade to empty header fields.
/// The name falls back to the containing directory name.
pub fn parse_skill_document(path: &Path, text: &str, last_modified: DateTime<Utc>) -> SkillMetadata {
    let parts = split_document(text);

    let fields = match parts.header {
        Some(raw) => match parse_header(raw) {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Header parsing error in {}: {}", path.display(), e);
                HeaderFields::default()
            }
        },
        None => HeaderFields::default(),
    };

    let name = fields
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .or_else(|| skill_name_from_path(path))
        .unwrap_or_else(|| fallback_name(path));

    let description = fields.description.unwrap_or_default();
    let triggers = extract_triggers(&description, parts.body);

    SkillMetadata {
        name,
        description,
        triggers,
        content: parts.body.to_string(),
        path: path.to_path_buf(),
        last_modified,
    }
}

fn fallback_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read and parse one skill document from disk.
pub async fn parse_skill_file(path: &Path, timeout: Duration) -> Result<SkillMetadata, ParseError> {
    let path = if path.is_relative() {
        std::env::current_dir()
            .map_err(|source| ParseError::Metadata {
                path: path.to_path_buf(),
                source,
            })?
            .join(path)
    } else {
        path.to_path_buf()
    };

    let text = bounded(timeout, tokio::fs::read_to_string(&path))
        .await
        .map_err(|source| ParseError::Read {
            path: path.clone(),
            source,
        })?;

    let meta = bounded(timeout, tokio::fs::metadata(&path))
        .await
        .map_err(|source| ParseError::Metadata {
            path: path.clone(),
            source,
        })?;
    let modified = meta.modified().unwrap_or_else(|_| SystemTime::now());

    Ok(parse_skill_document(&path, &text, DateTime::<Utc>::from(modified)))
}
