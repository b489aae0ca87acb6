//! Skill document discovery.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::fs_util::bounded;

/// List the skill documents under `root`, one directory level deep.
///
/// Every immediate subdirectory holding a file called `document_name`
/// contributes that file's path. Subdirectories without one are skipped.
/// An unreadable root yields an empty list; the failure is logged.
/// Paths are returned sorted.
pub async fn scan_skills_directory(
    root: &Path,
    document_name: &str,
    timeout: Duration,
) -> Vec<PathBuf> {
    let mut entries = match bounded(timeout, tokio::fs::read_dir(root)).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Error scanning skills directory {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut documents = Vec::new();

    loop {
        let entry = match bounded(timeout, entries.next_entry()).await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Error reading entry in {}: {}", root.display(), e);
                break;
            }
        };

        let dir = entry.path();
        // Follow symlinks so linked skill directories are picked up.
        let is_dir = bounded(timeout, tokio::fs::metadata(&dir))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            continue;
        }

        let document = dir.join(document_name);
        if is_file(&document, timeout).await {
            debug!("Found skill document: {}", document.display());
            documents.push(document);
        } else {
            info!(
                "No {} found in {}, skipping",
                document_name,
                entry.file_name().to_string_lossy()
            );
        }
    }

    documents.sort();
    documents
}

/// Check whether `dir` contains a skill document.
pub async fn is_skill_directory(dir: &Path, document_name: &str, timeout: Duration) -> bool {
    is_file(&dir.join(document_name), timeout).await
}

/// Name of the directory that contains a skill document.
pub fn skill_name_from_path(document: &Path) -> Option<String> {
    document
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

async fn is_file(path: &Path, timeout: Duration) -> bool {
    bounded(timeout, tokio::fs::metadata(path))
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
