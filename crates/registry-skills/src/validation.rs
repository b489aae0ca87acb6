//! Structural validation of a single skill document.
//!
//! Independent of the index: any path can be validated, indexed or not.

use std::path::Path;
use std::time::Duration;

use crate::fs_util::bounded;
use crate::models::ValidationResult;
use crate::parser::{parse_header, split_document};
use crate::triggers::first_heading;

/// Descriptions shorter than this (in characters) get a warning.
const MIN_DESCRIPTION_CHARS: usize = 10;

/// Bodies shorter than this (in characters) get a warning.
const MIN_CONTENT_CHARS: usize = 100;

/// Validate the skill document at `path`.
///
/// A missing file is the only check that short-circuits.
pub async fn validate_skill_file(path: &Path, timeout: Duration) -> ValidationResult {
    let mut result = ValidationResult::pass();

    if bounded(timeout, tokio::fs::metadata(path)).await.is_err() {
        result.add_error(format!("File does not exist: {}", path.display()));
        return result;
    }

    match bounded(timeout, tokio::fs::read_to_string(path)).await {
        Ok(text) => check_document(&text, &mut result),
        Err(e) => result.add_error(format!("Error reading file: {}", e)),
    }

    result
}

/// Validate document text that is already in memory.
pub fn validate_document(text: &str) -> ValidationResult {
    let mut result = ValidationResult::pass();
    check_document(text, &mut result);
    result
}

fn check_document(text: &str, result: &mut ValidationResult) {
    let parts = split_document(text);

    match parts.header {
        None => result.add_warning("No YAML front matter found"),
        Some(raw) => match parse_header(raw) {
            Ok(fields) => {
                let has_name = fields
                    .name
                    .as_deref()
                    .map(|n| !n.trim().is_empty())
                    .unwrap_or(false);
                if !has_name {
                    result.add_error("Missing required field: name");
                }

                match fields.description.as_deref() {
                    None | Some("") => result.add_warning("Missing description field"),
                    Some(d) if d.chars().count() < MIN_DESCRIPTION_CHARS => {
                        result.add_warning("Description is too short (< 10 characters)")
                    }
                    Some(_) => {}
                }
            }
            Err(e) => result.add_error(format!("Invalid YAML syntax: {}", e)),
        },
    }

    let body = parts.body;
    if body.is_empty() {
        result.add_error("Skill has no content");
    } else if body.chars().count() < MIN_CONTENT_CHARS {
        result.add_warning("Skill content is very short (< 100 characters)");
    }

    let has_heading = first_heading().map(|re| re.is_match(body)).unwrap_or(false);
    if !has_heading {
        result.add_warning("No headings found in content");
    }
}
