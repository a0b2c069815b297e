//! Backup store: content snapshots and restorable manifests.
//!
//! Every destructive change the executor applies is preceded by a snapshot
//! here. Snapshot bytes live in blob files, bookkeeping lives in manifest
//! documents; the two file sets are deliberately separate.

pub mod manifest;
pub mod store;

pub use manifest::{BackupEntry, BackupKind, BackupManifest, FileMeta};
pub use store::{BackupStore, RestoreReport};
