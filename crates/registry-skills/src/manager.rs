//! Registry manager: scan, parse and index skill documents, then serve
//! queries from the index.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use registry_core::config::RegistryConfig;
use registry_core::error::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::index::SkillIndex;
use crate::models::{
    RefreshSummary, RegistryStats, SearchResult, SkillMetadata, SkillRecommendation,
    ValidationResult,
};
use crate::parser::parse_skill_file;
use crate::scanner::scan_skills_directory;
use crate::validation::validate_skill_file;

/// Owns one skill index and the settings used to rebuild it.
///
/// Construct one per registry and share it behind an `Arc`. Refreshes are
/// serialized; queries running alongside a refresh see either the old or
/// the new index contents.
pub struct SkillsManager {
    root: PathBuf,
    document_name: String,
    io_timeout: Duration,
    search_limit: usize,
    recommend_limit: usize,
    index: RwLock<SkillIndex>,
    refresh_lock: Mutex<()>,
    initialized: AtomicBool,
}

impl SkillsManager {
    /// Create a manager from validated configuration.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config.skills_root(), config))
    }

    /// Create a manager over `root` with default settings.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::build(root.into(), &RegistryConfig::default())
    }

    fn build(root: PathBuf, config: &RegistryConfig) -> Self {
        let root = if root.is_relative() {
            std::env::current_dir()
                .map(|cwd| cwd.join(&root))
                .unwrap_or(root)
        } else {
            root
        };

        Self {
            root,
            document_name: config.skills.document_name.clone(),
            io_timeout: config.skills.io_timeout(),
            search_limit: config.search.default_limit,
            recommend_limit: config.recommend.default_limit,
            index: RwLock::new(SkillIndex::new()),
            refresh_lock: Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Skills root this manager scans.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build the index for the first time. Later calls are no-ops.
    pub async fn initialize(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        info!("Initializing skills registry...");
        let started = Instant::now();

        let summary = self.rebuild().await?;
        self.initialized.store(true, Ordering::Release);

        info!(
            "Skills registry initialized: {} skills indexed in {:?}",
            summary.skills_found,
            started.elapsed()
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Rescan the skills root and replace the index contents.
    ///
    /// A missing or unreadable root produces an empty index, not an error.
    pub async fn refresh(&self) -> Result<RefreshSummary> {
        let _guard = self.refresh_lock.lock().await;
        self.rebuild().await
    }

    /// Scan and parse outside the index lock, then swap contents in one
    /// write-locked step. Caller holds `refresh_lock`.
    async fn rebuild(&self) -> Result<RefreshSummary> {
        let started = Instant::now();
        debug!("Scanning skills directory {}", self.root.display());

        let documents =
            scan_skills_directory(&self.root, &self.document_name, self.io_timeout).await;

        let mut parsed = Vec::with_capacity(documents.len());
        for document in &documents {
            match parse_skill_file(document, self.io_timeout).await {
                Ok(skill) => parsed.push(skill),
                Err(e) => warn!("Skipping skill document: {}", e),
            }
        }

        let mut updated = Vec::with_capacity(parsed.len());
        let skills_found = {
            let mut index = self.index.write().await;
            index.clear();
            for skill in parsed {
                updated.push(skill.name.clone());
                index.add(skill);
            }
            index.count()
        };

        info!(
            "Indexed {} skills from {} documents in {:?}",
            skills_found,
            documents.len(),
            started.elapsed()
        );

        Ok(RefreshSummary {
            skills_found,
            updated,
        })
    }

    /// All skills sorted by name, optionally filtered by a case-insensitive
    /// substring of name or description.
    pub async fn list_skills(&self, pattern: Option<&str>) -> Vec<SkillMetadata> {
        let index = self.index.read().await;
        let pattern = pattern.map(str::to_lowercase);

        let mut skills: Vec<SkillMetadata> = index
            .iter()
            .filter(|skill| match &pattern {
                Some(p) => {
                    skill.name.to_lowercase().contains(p.as_str())
                        || skill.description.to_lowercase().contains(p.as_str())
                }
                None => true,
            })
            .cloned()
            .collect();

        skills.sort_by(|a, b| a.name.cmp(&b.name));
        skills
    }

    /// Keyword search. `None` uses the configured default limit.
    pub async fn search_skills(&self, query: &str, limit: Option<usize>) -> Vec<SearchResult> {
        let limit = limit.unwrap_or(self.search_limit);
        self.index.read().await.search(query, limit)
    }

    pub async fn get_skill(&self, name: &str) -> Option<SkillMetadata> {
        self.index.read().await.get(name).cloned()
    }

    /// Recommend skills for a request. `None` uses the configured default limit.
    pub async fn recommend_skills(
        &self,
        request: &str,
        limit: Option<usize>,
    ) -> Vec<SkillRecommendation> {
        let limit = limit.unwrap_or(self.recommend_limit);
        self.index.read().await.recommend(request, limit)
    }

    /// Recommend skills for a request plus optional extra context, which is
    /// appended to the request before scoring.
    pub async fn recommend_skills_with_context(
        &self,
        request: &str,
        context: Option<&str>,
        limit: Option<usize>,
    ) -> Vec<SkillRecommendation> {
        match context {
            Some(ctx) if !ctx.is_empty() => {
                let full = format!("{} {}", request, ctx);
                self.recommend_skills(&full, limit).await
            }
            _ => self.recommend_skills(request, limit).await,
        }
    }

    /// Validate any skill document, indexed or not.
    pub async fn validate_skill(&self, path: &Path) -> ValidationResult {
        validate_skill_file(path, self.io_timeout).await
    }

    pub async fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_skills: self.index.read().await.count(),
            initialized: self.is_initialized(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_skill(root: &Path, dir: &str, text: &str) -> PathBuf {
        let skill_dir = root.join(dir);
        fs::create_dir_all(&skill_dir).unwrap();
        let path = skill_dir.join("SKILL.md");
        fs::write(&path, text).unwrap();
        path
    }

    const PDF_EXPORT: &str = "---\nname: pdf-export\ndescription: Triggers on: pdf, export, print.\n---\n\n# PDF Export Skill\n\nConvert documents to PDF.\n";

    #[tokio::test]
    async fn test_pdf_export_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_skill(temp_dir.path(), "pdf", PDF_EXPORT);

        let manager = SkillsManager::with_root(temp_dir.path());
        let summary = manager.refresh().await.unwrap();
        assert_eq!(summary.skills_found, 1);
        assert_eq!(summary.updated, vec!["pdf-export".to_string()]);

        let skill = manager.get_skill("pdf-export").await.unwrap();
        for t in ["pdf", "export", "print", "skill"] {
            assert!(skill.triggers.contains(&t.to_string()), "missing {}", t);
        }

        let result = manager.validate_skill(&path).await;
        assert!(result.valid, "{:?}", result.errors);
    }

    #[tokio::test]
    async fn test_missing_header_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_skill(temp_dir.path(), "notes", "# Notes\n\nA short body.");

        let manager = SkillsManager::with_root(temp_dir.path());
        let result = manager.validate_skill(&path).await;

        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings.contains(&"No YAML front matter found".to_string()));
        assert!(result
            .warnings
            .contains(&"Skill content is very short (< 100 characters)".to_string()));
    }

    #[tokio::test]
    async fn test_header_without_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_skill(
            temp_dir.path(),
            "charts",
            "---\ndescription: Draw charts from tables\n---\n# Charts\n",
        );

        let manager = SkillsManager::with_root(temp_dir.path());
        let result = manager.validate_skill(&path).await;
        assert!(!result.valid);
        assert!(result
            .errors
            .contains(&"Missing required field: name".to_string()));

        manager.refresh().await.unwrap();
        assert!(manager.get_skill("charts").await.is_some());
    }

    #[tokio::test]
    async fn test_empty_index_queries() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SkillsManager::with_root(temp_dir.path());
        manager.refresh().await.unwrap();

        assert!(manager.search_skills("anything", Some(10)).await.is_empty());
        assert!(manager.recommend_skills("anything", Some(5)).await.is_empty());
    }

    #[tokio::test]
    async fn test_directory_names_as_fallback_keys() {
        let temp_dir = TempDir::new().unwrap();
        write_skill(temp_dir.path(), "alpha", "# Alpha\n\nFirst.");
        write_skill(temp_dir.path(), "beta", "---\ndescription: Second one\n---\n# Beta");

        let manager = SkillsManager::with_root(temp_dir.path());
        manager.refresh().await.unwrap();

        assert!(manager.get_skill("alpha").await.is_some());
        assert!(manager.get_skill("beta").await.is_some());
        assert!(manager.get_skill("gamma").await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write_skill(temp_dir.path(), "alpha", "# Alpha");
        write_skill(temp_dir.path(), "beta", PDF_EXPORT);

        let manager = SkillsManager::with_root(temp_dir.path());
        let first = manager.refresh().await.unwrap();
        let second = manager.refresh().await.unwrap();

        assert_eq!(first.skills_found, second.skills_found);
        let a: HashSet<_> = first.updated.into_iter().collect();
        let b: HashSet<_> = second.updated.into_iter().collect();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_duplicate_names_keep_one_record() {
        let temp_dir = TempDir::new().unwrap();
        write_skill(temp_dir.path(), "one", "---\nname: shared\n---\n# One");
        write_skill(temp_dir.path(), "two", "---\nname: shared\n---\n# Two");

        let manager = SkillsManager::with_root(temp_dir.path());
        let summary = manager.refresh().await.unwrap();

        assert_eq!(summary.skills_found, 1);
        let names: Vec<String> = manager
            .list_skills(None)
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["shared".to_string()]);
    }

    #[tokio::test]
    async fn test_refresh_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        write_skill(temp_dir.path(), "alpha", "# Alpha");

        let manager = SkillsManager::with_root(temp_dir.path());
        manager.refresh().await.unwrap();
        assert!(manager.get_skill("alpha").await.is_some());

        fs::remove_dir_all(temp_dir.path().join("alpha")).unwrap();
        write_skill(temp_dir.path(), "beta", "# Beta");

        let summary = manager.refresh().await.unwrap();
        assert_eq!(summary.skills_found, 1);
        assert!(manager.get_skill("alpha").await.is_none());
        assert!(manager.get_skill("beta").await.is_some());
    }

    #[tokio::test]
    async fn test_missing_root_yields_zero() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SkillsManager::with_root(temp_dir.path().join("missing"));

        let summary = manager.refresh().await.unwrap();
        assert_eq!(summary.skills_found, 0);
        assert!(summary.updated.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_document_skipped() {
        let temp_dir = TempDir::new().unwrap();
        write_skill(temp_dir.path(), "good", "# Good");
        let bad_dir = temp_dir.path().join("bad");
        fs::create_dir_all(&bad_dir).unwrap();
        fs::write(bad_dir.join("SKILL.md"), [0xff, 0xfe, 0xfd]).unwrap();

        let manager = SkillsManager::with_root(temp_dir.path());
        let summary = manager.refresh().await.unwrap();

        assert_eq!(summary.skills_found, 1);
        assert_eq!(summary.updated, vec!["good".to_string()]);
    }

    #[tokio::test]
    async fn test_list_pattern_and_order() {
        let temp_dir = TempDir::new().unwrap();
        write_skill(temp_dir.path(), "zeta", "---\nname: zeta\ndescription: Charts and graphs\n---\n# Z");
        write_skill(temp_dir.path(), "alpha", "---\nname: alpha\ndescription: Text tools\n---\n# A");
        write_skill(temp_dir.path(), "graph-db", "---\nname: graph-db\ndescription: Databases\n---\n# G");

        let manager = SkillsManager::with_root(temp_dir.path());
        manager.refresh().await.unwrap();

        let all: Vec<String> = manager.list_skills(None).await.into_iter().map(|s| s.name).collect();
        assert_eq!(all, vec!["alpha", "graph-db", "zeta"]);

        let graph: Vec<String> = manager
            .list_skills(Some("GRAPH"))
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(graph, vec!["graph-db", "zeta"]);
    }

    #[tokio::test]
    async fn test_initialize_and_stats() {
        let temp_dir = TempDir::new().unwrap();
        write_skill(temp_dir.path(), "alpha", "# Alpha");

        let manager = SkillsManager::with_root(temp_dir.path());
        assert_eq!(
            manager.stats().await,
            RegistryStats {
                total_skills: 0,
                initialized: false
            }
        );

        manager.refresh().await.unwrap();
        assert!(!manager.is_initialized());

        manager.initialize().await.unwrap();
        write_skill(temp_dir.path(), "beta", "# Beta");
        manager.initialize().await.unwrap();

        let stats = manager.stats().await;
        assert!(stats.initialized);
        assert_eq!(stats.total_skills, 1);
    }

    #[tokio::test]
    async fn test_recommend_with_context() {
        let temp_dir = TempDir::new().unwrap();
        write_skill(temp_dir.path(), "pdf", PDF_EXPORT);

        let manager = SkillsManager::with_root(temp_dir.path());
        manager.refresh().await.unwrap();

        assert!(manager.recommend_skills("make a file", None).await.is_empty());
        let recs = manager
            .recommend_skills_with_context("make a file", Some("for printing"), None)
            .await;
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].skill.name, "pdf-export");
    }

    #[tokio::test]
    async fn test_concurrent_refreshes() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a1", "b2", "c3"] {
            write_skill(temp_dir.path(), name, "# Skill");
        }

        let manager = Arc::new(SkillsManager::with_root(temp_dir.path()));
        let (m1, m2) = (Arc::clone(&manager), Arc::clone(&manager));
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { m1.refresh().await.unwrap() }),
            tokio::spawn(async move { m2.search_skills("skill", None).await })
        );

        assert_eq!(r1.unwrap().skills_found, 3);
        let seen = r2.unwrap().len();
        assert!(seen == 0 || seen == 3);
        assert_eq!(manager.stats().await.total_skills, 3);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = RegistryConfig::default();
        config.skills.root = Some(temp_dir.path().to_path_buf());
        config.skills.document_name = String::new();

        assert!(SkillsManager::new(&config).is_err());
    }
}
