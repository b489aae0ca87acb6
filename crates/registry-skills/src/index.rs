//! In-memory skill index keyed by skill name.
//!
//! Scoring lives next to the data it ranks: keyword search in
//! [`crate::search`] and recommendation in [`crate::recommend`], both as
//! methods on [`SkillIndex`].

use std::collections::HashMap;

use crate::models::SkillMetadata;

/// Keyed collection of skill metadata. Names are unique; a later `add`
/// for the same name replaces the earlier record.
#[derive(Debug, Clone, Default)]
pub struct SkillIndex {
    skills: HashMap<String, SkillMetadata>,
}

impl SkillIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any record with the same name.
    pub fn add(&mut self, skill: SkillMetadata) {
        self.skills.insert(skill.name.clone(), skill);
    }

    /// Remove a record by name. No-op if absent.
    pub fn remove(&mut self, name: &str) {
        self.skills.remove(name);
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.skills.clear();
    }

    /// Find a record by name.
    pub fn get(&self, name: &str) -> Option<&SkillMetadata> {
        self.skills.get(name)
    }

    /// Snapshot of all records, in no particular order.
    pub fn get_all(&self) -> Vec<SkillMetadata> {
        self.skills.values().cloned().collect()
    }

    /// Number of records.
    pub fn count(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Iterate over all records, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillMetadata> {
        self.skills.values()
    }

    /// Records sorted by name, the base order for ranking ties.
    pub(crate) fn by_name(&self) -> Vec<&SkillMetadata> {
        let mut skills: Vec<&SkillMetadata> = self.skills.values().collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        skills
    }
}
