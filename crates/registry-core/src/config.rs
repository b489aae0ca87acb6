use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RegistryError, Result};

/// Top-level registry configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub skills: SkillsConfig,
    pub search: SearchConfig,
    pub recommend: RecommendConfig,
}

impl RegistryConfig {
    /// Load configuration from default path (~/.config/skill-registry/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skill-registry")
            .join("config.toml")
    }

    /// Resolved skills root: the configured directory, or `~/.claude/skills`.
    pub fn skills_root(&self) -> PathBuf {
        match &self.skills.root {
            Some(root) => root.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".claude")
                .join("skills"),
        }
    }

    /// Check the settings a registry cannot start without.
    ///
    /// A root that does not exist yet is accepted: scanning it simply
    /// yields no skills. A root that exists but is a file is rejected.
    pub fn validate(&self) -> Result<()> {
        let name = self.skills.document_name.trim();
        if name.is_empty() {
            return Err(RegistryError::Config(
                "skills.document_name must not be empty".into(),
            ));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(RegistryError::Config(format!(
                "skills.document_name must be a bare file name, got '{}'",
                name
            )));
        }
        if self.skills.io_timeout_secs == 0 {
            return Err(RegistryError::Config(
                "skills.io_timeout_secs must be greater than zero".into(),
            ));
        }

        let root = self.skills_root();
        if let Ok(meta) = std::fs::metadata(&root) {
            if !meta.is_dir() {
                return Err(RegistryError::RootDirectory(root));
            }
        }

        Ok(())
    }
}

/// Where skill documents live and how they are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Root directory holding one subdirectory per skill.
    /// None = resolved at runtime to ~/.claude/skills.
    pub root: Option<PathBuf>,
    /// File name expected inside each skill directory.
    pub document_name: String,
    /// Timeout applied to each filesystem call, in seconds.
    pub io_timeout_secs: u64,
}

impl SkillsConfig {
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            root: None,
            document_name: "SKILL.md".into(),
            io_timeout_secs: 10,
        }
    }
}

/// Keyword search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result limit when the caller does not pass one.
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

/// Recommendation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Result limit when the caller does not pass one.
    pub default_limit: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self { default_limit: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_serializes() {
        let config = RegistryConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("SKILL.md"));
        assert!(toml_str.contains("default_limit"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = RegistryConfig::default();
        config.skills.root = Some(PathBuf::from("/srv/skills"));
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RegistryConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.skills.root, config.skills.root);
        assert_eq!(parsed.search.default_limit, 10);
        assert_eq!(parsed.recommend.default_limit, 5);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: RegistryConfig = toml::from_str("[search]\ndefault_limit = 3\n").unwrap();
        assert_eq!(parsed.search.default_limit, 3);
        assert_eq!(parsed.skills.document_name, "SKILL.md");
        assert_eq!(parsed.skills.io_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_root_under_home() {
        let config = RegistryConfig::default();
        let root = config.skills_root();
        assert!(root.ends_with(".claude/skills"));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[skills]\nroot = \"/opt/skills\"\nio_timeout_secs = 2\n").unwrap();

        let config = RegistryConfig::load_from(&path).unwrap();
        assert_eq!(config.skills_root(), PathBuf::from("/opt/skills"));
        assert_eq!(config.skills.io_timeout_secs, 2);
    }

    #[test]
    fn test_validate_accepts_missing_root() {
        let tmp = TempDir::new().unwrap();
        let mut config = RegistryConfig::default();
        config.skills.root = Some(tmp.path().join("does-not-exist"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_file_root() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let mut config = RegistryConfig::default();
        config.skills.root = Some(file);
        assert!(matches!(
            config.validate(),
            Err(RegistryError::RootDirectory(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_document_name() {
        let tmp = TempDir::new().unwrap();
        let mut config = RegistryConfig::default();
        config.skills.root = Some(tmp.path().to_path_buf());

        config.skills.document_name = "  ".into();
        assert!(matches!(config.validate(), Err(RegistryError::Config(_))));

        config.skills.document_name = "docs/SKILL.md".into();
        assert!(matches!(config.validate(), Err(RegistryError::Config(_))));

        config.skills.document_name = "SKILL.md".into();
        config.skills.io_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(RegistryError::Config(_))));
    }
}
