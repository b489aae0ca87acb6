//! Recommendation of skills for a free-text request.

use std::cmp::Ordering;

use tracing::debug;

use crate::index::SkillIndex;
use crate::models::{SkillMetadata, SkillRecommendation};
use crate::search::Query;

const TRIGGER_IN_REQUEST: f64 = 0.3;
const NAME_IN_REQUEST: f64 = 0.4;
const WORD_IN_DESCRIPTION: f64 = 0.1;
const WORD_TRIGGER_OVERLAP: f64 = 0.15;

/// Recommendations at or below this confidence are dropped.
const MIN_CONFIDENCE: f64 = 0.1;

/// Triggers this short or shorter are not matched against the whole request.
const MIN_TRIGGER_LEN: usize = 3;

/// Number of items listed in each reason clause.
const REASON_ITEMS: usize = 3;

/// Characters of description quoted in a fallback reason.
const EXCERPT_CHARS: usize = 80;

impl SkillIndex {
    /// Suggest skills for `request`, most confident first, at most `limit`.
    pub fn recommend(&self, request: &str, limit: usize) -> Vec<SkillRecommendation> {
        let request = Query::new(request);

        let mut recommendations: Vec<SkillRecommendation> = self
            .by_name()
            .into_iter()
            .filter_map(|skill| {
                let confidence = confidence(skill, &request);
                (confidence > MIN_CONFIDENCE).then(|| SkillRecommendation {
                    skill: skill.clone(),
                    confidence,
                    reason: reason(skill, &request),
                })
            })
            .collect();

        recommendations.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        debug!(
            "Recommendation for '{}' found {} candidates",
            request.full,
            recommendations.len()
        );

        recommendations.truncate(limit);
        recommendations
    }
}

fn long_trigger(trigger: &str) -> bool {
    trigger.chars().count() > MIN_TRIGGER_LEN
}

/// Confidence in `[0, 1]` that `skill` serves the request.
pub(crate) fn confidence(skill: &SkillMetadata, request: &Query) -> f64 {
    let name = skill.name.to_lowercase();
    let description = skill.description.to_lowercase();
    let triggers: Vec<String> = skill.triggers.iter().map(|t| t.to_lowercase()).collect();

    let mut confidence = 0.0;

    for trigger in &triggers {
        if long_trigger(trigger) && request.full.contains(trigger.as_str()) {
            confidence += TRIGGER_IN_REQUEST;
        }
    }

    if request.full.contains(name.as_str()) {
        confidence += NAME_IN_REQUEST;
    }

    for word in &request.words {
        if description.contains(word.as_str()) {
            confidence += WORD_IN_DESCRIPTION;
        }
        for trigger in &triggers {
            if trigger.contains(word.as_str()) || word.contains(trigger.as_str()) {
                confidence += WORD_TRIGGER_OVERLAP;
            }
        }
    }

    f64::min(confidence, 1.0)
}

/// Explain which signals matched, most specific first.
pub(crate) fn reason(skill: &SkillMetadata, request: &Query) -> String {
    let name = skill.name.to_lowercase();
    let description = skill.description.to_lowercase();

    let mut clauses = Vec::new();

    let matched_triggers: Vec<String> = skill
        .triggers
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| long_trigger(t) && request.full.contains(t.as_str()))
        .take(REASON_ITEMS)
        .collect();
    if !matched_triggers.is_empty() {
        clauses.push(format!("Matches triggers: {}", matched_triggers.join(", ")));
    }

    if request.full.contains(name.as_str()) {
        clauses.push("Skill name mentioned in request".to_string());
    }

    let matched_words: Vec<&str> = request
        .words
        .iter()
        .filter(|w| description.contains(w.as_str()))
        .take(REASON_ITEMS)
        .map(String::as_str)
        .collect();
    if !matched_words.is_empty() {
        clauses.push(format!("Relevant keywords: {}", matched_words.join(", ")));
    }

    if clauses.is_empty() {
        let excerpt: String = skill.description.chars().take(EXCERPT_CHARS).collect();
        clauses.push(format!("General match: {}...", excerpt));
    }

    clauses.join("; ")
}
