//! Discovery and promotion of received artifacts.
//!
//! A failing approval leaves `<filebase>.<name>.nok` next to the expected
//! `<filebase>.<name>.ok`. Once a human has reviewed the received output,
//! promoting it renames the artifact over the reference file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::ApprovalConfig;

/// A received artifact and the reference file it would replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArtifact {
    pub received: PathBuf,
    pub approved: PathBuf,
}

impl PendingArtifact {
    /// Whether a reference file already exists (mismatch rather than
    /// missing reference).
    pub fn replaces_existing(&self) -> bool {
        self.approved.exists()
    }

    /// Rename the received artifact over its reference file.
    pub fn promote(&self) -> Result<()> {
        fs::rename(&self.received, &self.approved).with_context(|| {
            format!(
                "promoting {} to {}",
                self.received.display(),
                self.approved.display()
            )
        })?;
        log::info!(
            "[Artifacts] Promoted {} -> {}",
            self.received.display(),
            self.approved.display()
        );
        Ok(())
    }
}

/// Catalog responsible for discovering received artifacts on disk.
pub struct ArtifactCatalog {
    root: PathBuf,
    config: ApprovalConfig,
}

impl ArtifactCatalog {
    pub fn new<P: Into<PathBuf>>(root: P, config: ApprovalConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All received artifacts below the root, sorted by path.
    pub fn discover(&self) -> Result<Vec<PendingArtifact>> {
        let mut pending = Vec::new();
        if self.root.exists() {
            self.scan(&self.root, &mut pending)?;
        }
        pending.sort_by(|a, b| a.received.cmp(&b.received));
        Ok(pending)
    }

    fn scan(&self, dir: &Path, pending: &mut Vec<PendingArtifact>) -> Result<()> {
        let entries =
            fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                if !is_hidden_or_build_dir(&path) {
                    self.scan(&path, pending)?;
                }
            } else if file_type.is_file() {
                if let Some(approved) = self.approved_for(&path) {
                    pending.push(PendingArtifact {
                        received: path,
                        approved,
                    });
                }
            }
        }
        Ok(())
    }

    fn approved_for(&self, received: &Path) -> Option<PathBuf> {
        let name = received.file_name()?.to_str()?;
        let suffix = format!(".{}", self.config.received_extension);
        let stem = name.strip_suffix(&suffix)?;
        if stem.is_empty() {
            return None;
        }
        Some(received.with_file_name(format!(
            "{}.{}",
            stem, self.config.approved_extension
        )))
    }
}

fn is_hidden_or_build_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.') || name == "target")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_received_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("tests");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("suite.case.nok"), "LOG: x\n").unwrap();
        fs::write(nested.join("suite.case.ok"), "LOG: y\n").unwrap();
        fs::write(dir.path().join("other.rs"), "").unwrap();

        let catalog = ArtifactCatalog::new(dir.path(), ApprovalConfig::default());
        let pending = catalog.discover().unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].approved, nested.join("suite.case.ok"));
        assert!(pending[0].replaces_existing());
    }

    #[test]
    fn skips_build_and_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        for skipped in ["target", ".git"] {
            let path = dir.path().join(skipped);
            fs::create_dir(&path).unwrap();
            fs::write(path.join("suite.case.nok"), "").unwrap();
        }

        let catalog = ArtifactCatalog::new(dir.path(), ApprovalConfig::default());
        assert!(catalog.discover().unwrap().is_empty());
    }

    #[test]
    fn promote_replaces_reference() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("suite.case.nok"), "LOG: new\n").unwrap();
        fs::write(dir.path().join("suite.case.ok"), "LOG: old\n").unwrap();

        let catalog = ArtifactCatalog::new(dir.path(), ApprovalConfig::default());
        for artifact in catalog.discover().unwrap() {
            artifact.promote().unwrap();
        }

        assert_eq!(
            fs::read_to_string(dir.path().join("suite.case.ok")).unwrap(),
            "LOG: new\n"
        );
        assert!(!dir.path().join("suite.case.nok").exists());
    }

    #[test]
    fn missing_root_is_empty() {
        let catalog = ArtifactCatalog::new("/definitely/not/here", ApprovalConfig::default());
        assert!(catalog.discover().unwrap().is_empty());
    }

    #[test]
    fn bare_extension_is_not_an_artifact() {
        let catalog = ArtifactCatalog::new(".", ApprovalConfig::default());
        assert_eq!(catalog.approved_for(Path::new("dir/.nok")), None);
        assert_eq!(
            catalog.approved_for(Path::new("dir/a.b.nok")),
            Some(PathBuf::from("dir/a.b.ok"))
        );
    }
}
