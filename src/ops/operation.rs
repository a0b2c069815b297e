//! Proposed filesystem mutations.
//!
//! Operations are produced by an external classifier and consumed by the
//! planner and executor. They describe intent only and own no filesystem
//! state until executed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What an operation does to its source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Move,
    Delete,
    #[serde(rename = "create-directory")]
    CreateDir,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Move => write!(f, "move"),
            OperationKind::Delete => write!(f, "delete"),
            OperationKind::CreateDir => write!(f, "create-directory"),
        }
    }
}

/// One proposed mutation, with the classifier's justification attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,

    /// Absolute path the operation acts on
    pub source: PathBuf,

    /// Absolute destination; required for moves, absent otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,

    /// Human-readable justification from the classifier
    pub reason: String,

    /// Optional caution surfaced to the user (e.g. "still referenced")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    /// True when other code is known to still reference this file
    #[serde(default)]
    pub still_referenced: bool,
}

impl Operation {
    pub fn mv(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: OperationKind::Move,
            source: source.into(),
            target: Some(target.into()),
            reason: reason.into(),
            warning: None,
            still_referenced: false,
        }
    }

    pub fn delete(source: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Delete,
            source: source.into(),
            target: None,
            reason: reason.into(),
            warning: None,
            still_referenced: false,
        }
    }

    pub fn create_dir(source: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::CreateDir,
            source: source.into(),
            target: None,
            reason: reason.into(),
            warning: None,
            still_referenced: false,
        }
    }

    /// Moves and deletes mutate existing content and therefore need a backup
    pub fn is_destructive(&self) -> bool {
        matches!(self.kind, OperationKind::Move | OperationKind::Delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_matches_wire_names() {
        assert_eq!(OperationKind::Move.to_string(), "move");
        assert_eq!(OperationKind::Delete.to_string(), "delete");
        assert_eq!(OperationKind::CreateDir.to_string(), "create-directory");
    }

    #[test]
    fn test_operations_document_deserializes() {
        let doc = r#"[
            {"kind": "move", "source": "/r/NOTES.md", "target": "/r/docs/NOTES.md", "reason": "docs belong in docs/"},
            {"kind": "delete", "source": "/r/old.log", "reason": "stale log", "still_referenced": true},
            {"kind": "create-directory", "source": "/r/scripts", "reason": "scripts folder"}
        ]"#;

        let ops: Vec<Operation> = serde_json::from_str(doc).unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].kind, OperationKind::Move);
        assert!(ops[0].target.is_some());
        assert!(ops[1].still_referenced);
        assert_eq!(ops[2].kind, OperationKind::CreateDir);
        assert!(ops[2].target.is_none());
    }

    #[test]
    fn test_destructive_kinds() {
        assert!(Operation::mv("/a", "/b", "r").is_destructive());
        assert!(Operation::delete("/a", "r").is_destructive());
        assert!(!Operation::create_dir("/a", "r").is_destructive());
    }
}
