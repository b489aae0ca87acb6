//! Skill registry core.
//!
//! Discovers skill documents on disk, extracts normalized metadata from
//! each, and serves keyword search, natural-language recommendation and
//! structural validation over an in-memory index.
//!
//! The index is keyed by the skill name derived at parse time. Renaming a
//! skill in its header changes its identity on the next refresh.

pub mod index;
pub mod manager;
pub mod models;
pub mod parser;
pub mod recommend;
pub mod scanner;
pub mod search;
pub mod triggers;
pub mod validation;

mod fs_util;

pub use index::SkillIndex;
pub use manager::SkillsManager;
pub use models::{
    MatchedField, RefreshSummary, RegistryStats, SearchResult, SkillMetadata,
    SkillRecommendation, SkillSummary, ValidationResult,
};
pub use parser::{parse_skill_file, ParseError};
pub use scanner::scan_skills_directory;
pub use triggers::extract_triggers;
pub use validation::validate_skill_file;
