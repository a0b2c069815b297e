//! Boundary validation and plan shaping.
//!
//! The planner's job ends where it started: it decides nothing about where
//! files should go, it only filters classifier proposals that would cross a
//! repository boundary or touch a file other code still references, and
//! derives the plan-level metadata the executor and the caller need.

use super::operation::{Operation, OperationKind};
use crate::repo::{can_move_file, Repository};
use tracing::debug;

/// Rough mutations-per-second figure for the duration estimate shown to
/// users. Display only, no correctness weight.
const OPS_PER_SECOND: u64 = 20;

/// A validated, ordered list of operations plus derived metadata.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub operations: Vec<Operation>,

    /// True iff the plan contains any move or delete
    pub backup_required: bool,

    /// Coarse duration estimate for progress display
    pub estimated_secs: u64,

    /// Human-readable notes about proposals that were skipped
    pub warnings: Vec<String>,
}

/// Validate raw classifier proposals against the discovered repositories
/// and shape them into a plan.
///
/// Illegal cross-repository moves are dropped silently (they reflect a
/// suggestion that should never have been made, not an engine fault).
/// Still-referenced files are skipped with a warning the caller can show.
pub fn build_plan(operations: Vec<Operation>, repositories: &[Repository]) -> Plan {
    let mut kept = Vec::new();
    let mut warnings = Vec::new();

    for op in operations {
        if op.still_referenced {
            let mut warning = format!(
                "Skipped {}: file is still referenced elsewhere",
                op.source.display()
            );
            if let Some(note) = &op.warning {
                warning.push_str(&format!(" ({note})"));
            }
            warnings.push(warning);
            continue;
        }

        if op.kind == OperationKind::Move {
            let Some(target) = &op.target else {
                warnings.push(format!(
                    "Skipped {}: move proposal without a target",
                    op.source.display()
                ));
                continue;
            };
            if !can_move_file(&op.source, target, repositories) {
                debug!(
                    "Dropping cross-repository move: {} -> {}",
                    op.source.display(),
                    target.display()
                );
                continue;
            }
        }

        kept.push(op);
    }

    let backup_required = kept.iter().any(Operation::is_destructive);
    let estimated_secs = if kept.is_empty() {
        0
    } else {
        (kept.len() as u64).div_ceil(OPS_PER_SECOND)
    };

    Plan {
        operations: kept,
        backup_required,
        estimated_secs,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn repos() -> Vec<Repository> {
        vec![
            Repository {
                path: PathBuf::from("/work/mono"),
                root: PathBuf::from("/work/mono"),
                is_root: true,
            },
            Repository {
                path: PathBuf::from("/work/mono/packages/app"),
                root: PathBuf::from("/work/mono/packages/app"),
                is_root: false,
            },
            Repository {
                path: PathBuf::from("/work/mono/packages/lib"),
                root: PathBuf::from("/work/mono/packages/lib"),
                is_root: false,
            },
        ]
    }

    #[test]
    fn test_keeps_legal_moves() {
        let ops = vec![
            Operation::mv("/work/mono/NOTES.md", "/work/mono/docs/NOTES.md", "docs"),
            Operation::mv(
                "/work/mono/build.sh",
                "/work/mono/packages/app/scripts/build.sh",
                "scripts",
            ),
        ];

        let plan = build_plan(ops, &repos());

        assert_eq!(plan.operations.len(), 2);
        assert!(plan.backup_required);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_drops_boundary_violations_silently() {
        let ops = vec![
            // nested -> root
            Operation::mv(
                "/work/mono/packages/app/conf.toml",
                "/work/mono/conf.toml",
                "hoist",
            ),
            // sibling -> sibling
            Operation::mv(
                "/work/mono/packages/app/util.rs",
                "/work/mono/packages/lib/util.rs",
                "share",
            ),
        ];

        let plan = build_plan(ops, &repos());

        assert!(plan.operations.is_empty());
        // Violations are dropped, not surfaced as warnings
        assert!(plan.warnings.is_empty());
        assert!(!plan.backup_required);
    }

    #[test]
    fn test_skips_still_referenced_with_warning() {
        let mut op = Operation::delete("/work/mono/helper.sh", "unused");
        op.still_referenced = true;
        op.warning = Some("imported by Makefile".to_string());

        let plan = build_plan(vec![op], &repos());

        assert!(plan.operations.is_empty());
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("helper.sh"));
        assert!(plan.warnings[0].contains("imported by Makefile"));
    }

    #[test]
    fn test_move_without_target_is_skipped() {
        let mut op = Operation::delete("/work/mono/x", "r");
        op.kind = OperationKind::Move;

        let plan = build_plan(vec![op], &repos());

        assert!(plan.operations.is_empty());
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn test_backup_not_required_for_directory_creation() {
        let plan = build_plan(
            vec![Operation::create_dir("/work/mono/scripts", "scripts")],
            &repos(),
        );

        assert_eq!(plan.operations.len(), 1);
        assert!(!plan.backup_required);
        assert_eq!(plan.estimated_secs, 1);
    }

    #[test]
    fn test_deletes_are_not_boundary_checked() {
        // Deletes never cross a boundary; they only need a backup
        let plan = build_plan(
            vec![Operation::delete("/work/mono/packages/app/old.rs", "dead")],
            &repos(),
        );

        assert_eq!(plan.operations.len(), 1);
        assert!(plan.backup_required);
    }
}
