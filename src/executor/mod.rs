//! Plan execution with backup-before-mutate guarantees.
//!
//! State machine per run: Idle -> (dry-run? -> Reporting) -> Backing-up ->
//! Applying -> Reporting. Operations apply strictly in order, one at a
//! time: later moves may depend on directories created earlier in the same
//! plan. One operation failing never stops the rest of the batch.

use crate::backup::{BackupEntry, BackupKind, BackupStore};
use crate::ops::{Operation, OperationKind, Plan};
use crate::utils::errors::Result;
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Summary of one executor run, returned to the caller in-process.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    /// False iff any operation failed
    pub success: bool,

    pub completed: usize,
    pub failed: usize,

    /// One entry per failed operation: `"<kind> <source>: <error>"`
    pub errors: Vec<String>,

    /// Manifest created for this run; absent when no backup was required
    pub manifest_id: Option<String>,
}

/// Applies a validated plan to the filesystem.
pub struct Executor<'a> {
    store: &'a BackupStore,
    dry_run: bool,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a BackupStore) -> Self {
        Self {
            store,
            dry_run: false,
        }
    }

    /// Report what the plan would do without touching disk.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute the plan. Runs to completion once started; a caller wanting
    /// to abort must discard the plan before calling this.
    pub async fn execute(&self, plan: &Plan) -> Result<ExecutionResult> {
        let mut result = ExecutionResult::default();

        if self.dry_run {
            info!(
                "Dry run: {} operations would be applied, nothing touched",
                plan.operations.len()
            );
            result.success = true;
            result.completed = plan.operations.len();
            return Ok(result);
        }

        // Back up every move/delete source that still exists. Operations
        // whose backup failed are withheld from the apply phase: applying
        // them would produce an irreversible change.
        let mut unprotected: HashSet<PathBuf> = HashSet::new();
        if plan.backup_required {
            let entries = self.backup_phase(plan, &mut result, &mut unprotected).await;
            if !entries.is_empty() {
                let manifest = self.store.create_manifest(entries).await?;
                info!(
                    "Created backup manifest {} ({} entries)",
                    manifest.id,
                    manifest.entries.len()
                );
                result.manifest_id = Some(manifest.id);
            }
        }

        for op in &plan.operations {
            if op.is_destructive() && unprotected.contains(&op.source) {
                continue; // already counted as failed during backup
            }
            match self.apply(op).await {
                Ok(()) => {
                    debug!("{} {} ok", op.kind, op.source.display());
                    result.completed += 1;
                }
                Err(e) => {
                    result.failed += 1;
                    result
                        .errors
                        .push(format!("{} {}: {}", op.kind, op.source.display(), e));
                }
            }
        }

        result.success = result.failed == 0;
        Ok(result)
    }

    async fn backup_phase(
        &self,
        plan: &Plan,
        result: &mut ExecutionResult,
        unprotected: &mut HashSet<PathBuf>,
    ) -> Vec<BackupEntry> {
        let mut entries = Vec::new();

        for op in plan.operations.iter().filter(|op| op.is_destructive()) {
            match tokio::fs::try_exists(&op.source).await {
                Ok(false) => {
                    // Already gone; the net effect is what was intended
                    debug!("Nothing to back up, source vanished: {}", op.source.display());
                    continue;
                }
                Ok(true) => {}
                Err(e) => {
                    debug!("Existence check failed for {}: {}", op.source.display(), e);
                }
            }

            let kind = match op.kind {
                OperationKind::Move => BackupKind::Move,
                OperationKind::Delete => BackupKind::Delete,
                OperationKind::CreateDir => continue,
            };

            match self.store.backup_file(&op.source, kind).await {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!("Backup failed for {}: {}", op.source.display(), e);
                    result.failed += 1;
                    result
                        .errors
                        .push(format!("{} {}: {}", op.kind, op.source.display(), e));
                    unprotected.insert(op.source.clone());
                }
            }
        }

        entries
    }

    async fn apply(&self, op: &Operation) -> io::Result<()> {
        match op.kind {
            OperationKind::Move => {
                let target = op.target.as_ref().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "move without a target")
                })?;
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                match tokio::fs::rename(&op.source, target).await {
                    Ok(()) => Ok(()),
                    // Rename cannot cross filesystems; fall back to copy + remove
                    Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                        tokio::fs::copy(&op.source, target).await?;
                        tokio::fs::remove_file(&op.source).await
                    }
                    Err(e) => Err(e),
                }
            }
            OperationKind::Delete => tokio::fs::remove_file(&op.source).await,
            OperationKind::CreateDir => tokio::fs::create_dir_all(&op.source).await,
        }
    }
}
