//! Heuristic trigger keyword extraction.
//!
//! Keywords come from four independent sources, merged in discovery order
//! with duplicates dropped:
//!
//! - the phrase after "triggers on" in the description, split on `,`/`;`
//! - the phrase after "use when" in the description, words longer than 3 chars
//! - capitalized words in the description (technology and product names)
//! - the first heading of the body, words longer than 3 chars
//!
//! Extraction never fails. Empty inputs produce no keywords.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

const TRIGGERS_ON: &str = r"(?i)triggers?\s+on[:\s]+([^.]+)";
const USE_WHEN: &str = r"(?i)use\s+when[:\s]+([^.]+)";
const CAPITALIZED: &str = r"\b[A-Z][a-zA-Z]+\b";
const FIRST_HEADING: &str = r"(?m)^#+[ \t]+(.+)$";

/// Minimum length (exclusive) for words taken from free-running phrases.
const MIN_WORD_LEN: usize = 3;

fn pattern(cell: &'static OnceLock<Option<Regex>>, src: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(src).ok()).as_ref()
}

fn triggers_on() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, TRIGGERS_ON)
}

fn use_when() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, USE_WHEN)
}

fn capitalized() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, CAPITALIZED)
}

pub(crate) fn first_heading() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&RE, FIRST_HEADING)
}

/// Ordered keyword set.
#[derive(Default)]
struct TriggerSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl TriggerSet {
    fn insert(&mut self, word: &str) {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return;
        }
        if self.seen.insert(word.clone()) {
            self.ordered.push(word);
        }
    }

    fn insert_long_words(&mut self, phrase: &str) {
        for word in phrase.split_whitespace() {
            if word.chars().count() > MIN_WORD_LEN {
                self.insert(word);
            }
        }
    }
}

/// Extract trigger keywords from a skill's description and body.
pub fn extract_triggers(description: &str, body: &str) -> Vec<String> {
    let mut triggers = TriggerSet::default();
    let desc_lower = description.to_lowercase();

    if let Some(caps) = triggers_on().and_then(|re| re.captures(&desc_lower)) {
        for word in caps[1].split([',', ';']) {
            triggers.insert(word);
        }
    }

    if let Some(caps) = use_when().and_then(|re| re.captures(&desc_lower)) {
        triggers.insert_long_words(&caps[1]);
    }

    if let Some(re) = capitalized() {
        for m in re.find_iter(description) {
            triggers.insert(m.as_str());
        }
    }

    if let Some(caps) = first_heading().and_then(|re| re.captures(body)) {
        triggers.insert_long_words(&caps[1]);
    }

    triggers.ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_on_phrase() {
        let triggers = extract_triggers("Triggers on: pdf, export, print.", "# PDF Export Skill");
        for expected in ["pdf", "export", "print", "skill"] {
            assert!(triggers.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn test_trigger_on_singular_with_semicolons() {
        let triggers = extract_triggers("trigger on csv; tsv ;excel. Other text", "");
        assert_eq!(triggers, vec!["csv", "tsv", "excel", "other"]);
    }

    #[test]
    fn test_use_when_keeps_long_words() {
        let triggers = extract_triggers("use when converting html to slides. more", "");
        assert_eq!(triggers, vec!["converting", "html", "slides"]);
    }

    #[test]
    fn test_capitalized_words() {
        let triggers = extract_triggers("Publishes posts to WordPress via the REST api", "");
        assert_eq!(triggers, vec!["publishes", "wordpress", "rest"]);
    }

    #[test]
    fn test_first_heading_only() {
        let body = "Intro line\n\n## Quick Start Guide\n\n# Later Heading Words";
        let triggers = extract_triggers("", body);
        assert_eq!(triggers, vec!["quick", "start", "guide"]);
    }

    #[test]
    fn test_duplicates_merge_across_sources() {
        let triggers = extract_triggers("Triggers on docker. Docker images", "# Docker Builds");
        assert_eq!(triggers.iter().filter(|t| *t == "docker").count(), 1);
        assert!(triggers.contains(&"builds".to_string()));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(extract_triggers("", "").is_empty());
        assert!(extract_triggers("lowercase only text", "no heading here").is_empty());
    }

    #[test]
    fn test_trailing_separator_drops_empty_keyword() {
        let triggers = extract_triggers("triggers on a, b,", "");
        assert_eq!(triggers, vec!["a", "b"]);
    }
}
