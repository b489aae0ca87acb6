//! Keyword search over the skill index.
//!
//! Scoring is an additive points model. Every bonus below applies
//! independently; a record collects all that match.

use tracing::debug;

use crate::index::SkillIndex;
use crate::models::{MatchedField, SearchResult, SkillMetadata};

const NAME_EXACT: u32 = 100;
const NAME_CONTAINS: u32 = 50;
const NAME_WORD: u32 = 30;
const TRIGGER_EXACT: u32 = 40;
const TRIGGER_CONTAINS: u32 = 20;
const TRIGGER_WORD: u32 = 15;
const DESCRIPTION_CONTAINS: u32 = 25;
const DESCRIPTION_WORD: u32 = 10;
const CONTENT_PER_HIT: u32 = 2;
/// Per-word cap on content points.
const CONTENT_WORD_CAP: u32 = 10;

/// Words of this length or shorter are not used as search tokens.
const MIN_QUERY_WORD_LEN: usize = 2;

/// Lowercased query plus its significant words.
pub(crate) struct Query {
    pub(crate) full: String,
    pub(crate) words: Vec<String>,
}

impl Query {
    pub(crate) fn new(raw: &str) -> Self {
        let full = raw.to_lowercase();
        let words = full
            .split_whitespace()
            .filter(|w| w.chars().count() > MIN_QUERY_WORD_LEN)
            .map(str::to_string)
            .collect();
        Self { full, words }
    }
}

impl SkillIndex {
    /// Rank records against `query`, best first, at most `limit` results.
    ///
    /// Records scoring zero are left out. Equal scores keep name order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let query = Query::new(query);

        let mut results: Vec<SearchResult> = self
            .by_name()
            .into_iter()
            .filter_map(|skill| {
                let score = relevance_score(skill, &query);
                (score > 0).then(|| SearchResult {
                    skill: skill.clone(),
                    score,
                    matched_fields: matched_fields(skill, &query),
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score));

        debug!("Skill search '{}' found {} results", query.full, results.len());

        results.truncate(limit);
        results
    }
}

/// Points for one record against a query.
pub(crate) fn relevance_score(skill: &SkillMetadata, query: &Query) -> u32 {
    let q = query.full.as_str();
    let name = skill.name.to_lowercase();
    let description = skill.description.to_lowercase();
    let content = skill.content.to_lowercase();

    let mut score = 0;

    if name == q {
        score += NAME_EXACT;
    } else if name.contains(q) {
        score += NAME_CONTAINS;
    }
    for word in &query.words {
        if name.contains(word.as_str()) {
            score += NAME_WORD;
        }
    }

    for trigger in skill.triggers.iter().map(|t| t.to_lowercase()) {
        if trigger == q {
            score += TRIGGER_EXACT;
        } else if trigger.contains(q) {
            score += TRIGGER_CONTAINS;
        }
        for word in &query.words {
            if trigger.contains(word.as_str()) {
                score += TRIGGER_WORD;
            }
        }
    }

    if description.contains(q) {
        score += DESCRIPTION_CONTAINS;
    }
    for word in &query.words {
        if description.contains(word.as_str()) {
            score += DESCRIPTION_WORD;
        }
    }

    for word in &query.words {
        score += content_points(content.matches(word.as_str()).count());
    }

    score
}

fn content_points(hits: usize) -> u32 {
    u32::try_from(hits)
        .unwrap_or(u32::MAX)
        .saturating_mul(CONTENT_PER_HIT)
        .min(CONTENT_WORD_CAP)
}

/// Which of name, description and triggers matched the query.
pub(crate) fn matched_fields(skill: &SkillMetadata, query: &Query) -> Vec<MatchedField> {
    let q = query.full.as_str();
    let hit = |text: &str| text.contains(q) || query.words.iter().any(|w| text.contains(w.as_str()));

    let mut matched = Vec::new();

    if hit(&skill.name.to_lowercase()) {
        matched.push(MatchedField::Name);
    }
    if hit(&skill.description.to_lowercase()) {
        matched.push(MatchedField::Description);
    }
    if skill.triggers.iter().any(|t| hit(&t.to_lowercase())) {
        matched.push(MatchedField::Triggers);
    }

    matched
}
