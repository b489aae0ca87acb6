//! Core data models for the skill registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Skill Metadata ──────────────────────────────────────────────────────

/// Normalized metadata extracted from one skill document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillMetadata {
    /// Skill identifier, unique within the index.
    /// Taken from the header, or the containing directory name.
    pub name: String,

    /// Free-text description from the header. May be empty.
    pub description: String,

    /// Lowercase, deduplicated keywords in discovery order.
    pub triggers: Vec<String>,

    /// Document body with the header removed, trimmed.
    pub content: String,

    /// Absolute path to the source document.
    pub path: PathBuf,

    /// Last write time of the source document. Informational only.
    pub last_modified: DateTime<Utc>,
}

impl SkillMetadata {
    /// Projection without the body text.
    pub fn summary(&self) -> SkillSummary {
        SkillSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            triggers: self.triggers.clone(),
            path: self.path.clone(),
            last_modified: self.last_modified,
        }
    }
}

/// Skill metadata without the document body, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillSummary {
    pub name: String,
    pub description: String,
    pub triggers: Vec<String>,
    pub path: PathBuf,
    pub last_modified: DateTime<Utc>,
}

// ── Search ──────────────────────────────────────────────────────────────

/// Which metadata field contributed to a search match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    Name,
    Description,
    Triggers,
}

impl MatchedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchedField::Name => "name",
            MatchedField::Description => "description",
            MatchedField::Triggers => "triggers",
        }
    }
}

/// A single keyword search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub skill: SkillMetadata,

    /// Additive relevance points. Only the ordering is meaningful.
    pub score: u32,

    /// Fields that matched, in `name`, `description`, `triggers` order.
    pub matched_fields: Vec<MatchedField>,
}

// ── Recommendation ──────────────────────────────────────────────────────

/// A skill suggested for a free-text request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecommendation {
    pub skill: SkillMetadata,

    /// Relevance estimate in `[0, 1]`.
    pub confidence: f64,

    /// Human-readable explanation of the signals that matched.
    pub reason: String,
}

// ── Registry ────────────────────────────────────────────────────────────

/// Outcome of a full rescan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    /// Number of records in the index after the refresh.
    pub skills_found: usize,

    /// Names of the records loaded, in load order.
    pub updated: Vec<String>,
}

/// Registry statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_skills: usize,
    pub initialized: bool,
}

// ── Validation ──────────────────────────────────────────────────────────

/// Structural check result for one skill document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    /// True when `errors` is empty. Warnings never affect it.
    pub valid: bool,

    /// Blocking problems.
    pub errors: Vec<String>,

    /// Non-blocking problems.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn pass() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.valid = false;
    }

    /// Add a warning.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// One-line outcome for display.
    pub fn summary(&self) -> String {
        if self.valid {
            "Skill file is valid".to_string()
        } else {
            format!(
                "Found {} error(s) and {} warning(s)",
                self.errors.len(),
                self.warnings.len()
            )
        }
    }
}
