//! Blob and manifest persistence.

use super::manifest::{BackupEntry, BackupKind, BackupManifest, FileMeta};
use crate::utils::errors::{EngineError, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const BLOB_SUFFIX: &str = ".blob";
const MANIFEST_SUFFIX: &str = ".manifest.json";

/// Handle on one backup directory.
///
/// Constructed with an explicit directory so independent scans (and tests)
/// keep independent stores; there is no ambient backup location. The
/// directory is created on first use and only ever appended to.
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

/// Outcome of restoring one manifest. Entries restore independently, so a
/// partially-successful restore still recovers as much as possible.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub restored: usize,
    pub failures: Vec<String>,
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}{BLOB_SUFFIX}"))
    }

    fn manifest_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}{MANIFEST_SUFFIX}"))
    }

    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Snapshot `path` before it is mutated.
    ///
    /// Read errors propagate: a backup that "succeeds" on an unreadable
    /// file is worse than an explicit abort, because the caller may go on
    /// to delete a file it cannot actually restore.
    pub async fn backup_file(&self, path: &Path, kind: BackupKind) -> Result<BackupEntry> {
        self.ensure_dir().await?;

        let content = tokio::fs::read(path).await?;
        let metadata = tokio::fs::metadata(path).await?;

        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            metadata.permissions().mode()
        };
        #[cfg(not(unix))]
        let mode = 0;

        let id = Uuid::new_v4().to_string();
        tokio::fs::write(self.blob_path(&id), &content).await?;

        debug!(
            "Backed up {} ({} bytes) as {}",
            path.display(),
            content.len(),
            id
        );

        Ok(BackupEntry {
            id,
            created_at: Utc::now(),
            kind,
            source: path.to_path_buf(),
            meta: FileMeta {
                size: metadata.len(),
                mode,
            },
        })
    }

    /// Group `entries` into a fresh manifest and persist it.
    pub async fn create_manifest(&self, entries: Vec<BackupEntry>) -> Result<BackupManifest> {
        self.ensure_dir().await?;

        let manifest = BackupManifest {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            reversible: true,
            entries,
        };

        let doc = serde_json::to_string_pretty(&manifest)?;
        tokio::fs::write(self.manifest_path(&manifest.id), doc).await?;

        Ok(manifest)
    }

    /// Load one manifest by id. A missing manifest is a hard error, not an
    /// empty result; restore is a recovery action and must not guess.
    pub async fn load_manifest(&self, id: &str) -> Result<BackupManifest> {
        let path = self.manifest_path(id);
        let doc = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::ManifestNotFound(id.to_string())
            } else {
                EngineError::Io(e)
            }
        })?;
        Ok(serde_json::from_str(&doc)?)
    }

    /// Write every snapshot in the manifest back to its original path,
    /// recreating missing parent directories and reapplying mode bits.
    ///
    /// Per-entry failures are collected in the report rather than aborting
    /// the rest of the restore.
    pub async fn restore(&self, manifest_id: &str) -> Result<RestoreReport> {
        let manifest = self.load_manifest(manifest_id).await?;

        let mut report = RestoreReport::default();
        for entry in &manifest.entries {
            match self.restore_entry(entry).await {
                Ok(()) => report.restored += 1,
                Err(e) => {
                    warn!("Failed to restore {}: {}", entry.source.display(), e);
                    report
                        .failures
                        .push(format!("{}: {}", entry.source.display(), e));
                }
            }
        }

        Ok(report)
    }

    async fn restore_entry(&self, entry: &BackupEntry) -> Result<()> {
        let content = tokio::fs::read(self.blob_path(&entry.id)).await?;

        if let Some(parent) = entry.source.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&entry.source, &content).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(entry.meta.mode);
            tokio::fs::set_permissions(&entry.source, perms).await?;
        }

        Ok(())
    }

    /// All persisted manifests, newest first.
    ///
    /// A backup directory that does not exist yet simply means nothing has
    /// been backed up; that is an empty list, not an error. Manifest files
    /// that no longer deserialize are skipped with a warning.
    pub async fn list_backups(&self) -> Result<Vec<BackupManifest>> {
        let mut manifests = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(manifests),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(MANIFEST_SUFFIX) {
                continue;
            }
            let doc = tokio::fs::read_to_string(entry.path()).await?;
            match serde_json::from_str::<BackupManifest>(&doc) {
                Ok(manifest) => manifests.push(manifest),
                Err(e) => warn!("Skipping unreadable manifest {}: {}", name, e),
            }
        }

        manifests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(manifests)
    }
}
