//! Backup bookkeeping types.
//!
//! A manifest records every snapshot taken for one executed batch. The
//! snapshot bytes themselves are not duplicated here; they live in blob
//! files next to the manifest, keyed by entry id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The destructive operation a snapshot protects against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    Move,
    Delete,
    Modify,
}

/// Size and permission bits of the original file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FileMeta {
    pub size: u64,

    /// Unix mode bits; zero on platforms without them
    pub mode: u32,
}

/// One content snapshot. The id is the sole link between this entry and
/// its stored bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub kind: BackupKind,

    /// Original absolute path; restore writes back here
    pub source: PathBuf,

    pub meta: FileMeta,
}

/// A named, timestamped group of snapshots for one executed batch.
///
/// Serialized as `<id>.manifest.json` in the backup directory. Created
/// once, immediately before the batch applies; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub reversible: bool,
    pub entries: Vec<BackupEntry>,
}
