//! Version-control root discovery.
//!
//! Walks a directory tree and records every directory carrying its own
//! version-control marker as an independent repository. The walk prunes
//! version-control internals and dependency caches, and never follows
//! symlinks, so cyclic link structures cannot trap it.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Markers that make a directory an independent version-control root.
/// `.git` may be a plain file (worktrees, submodules), so presence is
/// checked with `exists`, not `is_dir`.
const VCS_MARKERS: &[&str] = &[".git", ".hg", ".svn"];

/// Version-control internals are always pruned, independent of options.
const VCS_INTERNALS: &[&str] = &[".git", ".hg", ".svn"];

/// Options for the repository scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory names the scan never descends into, on top of the
    /// version-control internals that are always skipped
    pub exclude: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude: vec![
                "node_modules".to_string(),
                "target".to_string(),
                "vendor".to_string(),
                ".venv".to_string(),
                "__pycache__".to_string(),
            ],
        }
    }
}

/// An independent version-control root discovered under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Absolute, normalized path of the repository directory
    pub path: PathBuf,

    /// The repository's own root (itself)
    pub root: PathBuf,

    /// True for the outermost repository of the scanned tree
    pub is_root: bool,
}

/// Everything `discover` learned about a tree.
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    /// All repositories found, in walk order (parents before children)
    pub repositories: Vec<Repository>,

    /// The repository whose path equals the scan root, if the root itself
    /// is a repository
    pub root_repository: Option<Repository>,

    /// True when more than one repository was found
    pub multiple: bool,
}

/// Discover all version-control roots under `root` with default options.
pub fn discover(root: &Path) -> std::io::Result<DiscoveryResult> {
    discover_with_options(root, &ScanOptions::default())
}

/// Discover all version-control roots under `root`.
///
/// Unreadable directories are skipped rather than aborting the scan; on a
/// large tree a partial result beats a hard failure. The scan root itself
/// must exist and resolve, everything below it is best-effort.
pub fn discover_with_options(
    root: &Path,
    options: &ScanOptions,
) -> std::io::Result<DiscoveryResult> {
    let root = root.canonicalize()?;
    let mut repositories = Vec::new();

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !should_prune(e, &options.exclude));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry during scan: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        if has_vcs_marker(entry.path()) {
            let path = entry.path().to_path_buf();
            repositories.push(Repository {
                is_root: path == root,
                root: path.clone(),
                path,
            });
        }
    }

    let root_repository = repositories.iter().find(|r| r.is_root).cloned();
    let multiple = repositories.len() > 1;

    debug!(
        "Discovered {} repositories under {}",
        repositories.len(),
        root.display()
    );

    Ok(DiscoveryResult {
        repositories,
        root_repository,
        multiple,
    })
}

fn has_vcs_marker(dir: &Path) -> bool {
    VCS_MARKERS.iter().any(|marker| dir.join(marker).exists())
}

fn should_prune(entry: &DirEntry, exclude: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    VCS_INTERNALS.iter().any(|p| name == *p) || exclude.iter().any(|p| name == p.as_str())
}
