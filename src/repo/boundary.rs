//! Containment and cross-boundary rules for file moves.

use super::discovery::Repository;
use std::path::{Component, Path, PathBuf};

/// Normalize a path without touching the filesystem: drops `.` segments,
/// applies `..` against preceding components, ignores trailing separators.
/// Paths arriving here are already absolute; this only irons out cosmetic
/// differences so containment checks never see a false negative.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// True iff `file` is `repo` itself or lies strictly beneath it.
pub fn is_within_repository(file: &Path, repo: &Path) -> bool {
    normalize(file).starts_with(normalize(repo))
}

/// Among all repositories containing `file`, the most deeply nested one.
///
/// A file under both a root repository and a nested sub-repository belongs
/// to the sub-repository.
pub fn find_most_specific_repository<'a>(
    file: &Path,
    repositories: &'a [Repository],
) -> Option<&'a Repository> {
    repositories
        .iter()
        .filter(|r| is_within_repository(file, &r.path))
        .max_by_key(|r| r.path.components().count())
}

/// The core safety gate for moves.
///
/// Allowed: both sides in the same repository, or source in the outermost
/// root repository and target in a repository nested beneath it (the
/// "distribute loose root files" case). Denied: either side outside every
/// repository, nested-to-root, and sibling-to-sibling. The asymmetry is
/// deliberate: any other cross-boundary move silently relocates a file out
/// of the version-control history that was tracking it.
pub fn can_move_file(source: &Path, target: &Path, repositories: &[Repository]) -> bool {
    let source_repo = find_most_specific_repository(source, repositories);
    let target_repo = find_most_specific_repository(target, repositories);

    match (source_repo, target_repo) {
        (Some(src), Some(dst)) => {
            if src.path == dst.path {
                return true;
            }
            src.is_root && is_within_repository(&dst.path, &src.path)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(path: &str, is_root: bool) -> Repository {
        Repository {
            path: PathBuf::from(path),
            root: PathBuf::from(path),
            is_root,
        }
    }

    fn fixture() -> Vec<Repository> {
        vec![
            repo("/work/mono", true),
            repo("/work/mono/packages/app", false),
            repo("/work/mono/packages/lib", false),
        ]
    }

    #[test]
    fn test_is_within_repository() {
        assert!(is_within_repository(
            Path::new("/work/mono/README.md"),
            Path::new("/work/mono")
        ));
        assert!(is_within_repository(
            Path::new("/work/mono"),
            Path::new("/work/mono")
        ));
        assert!(!is_within_repository(
            Path::new("/work/other/file.txt"),
            Path::new("/work/mono")
        ));
        // Prefix of a sibling directory name is not containment
        assert!(!is_within_repository(
            Path::new("/work/monorepo/file.txt"),
            Path::new("/work/mono")
        ));
    }

    #[test]
    fn test_is_within_ignores_path_cosmetics() {
        assert!(is_within_repository(
            Path::new("/work/mono/./docs/../README.md"),
            Path::new("/work/mono/")
        ));
    }

    #[test]
    fn test_find_most_specific_repository() {
        let repos = fixture();

        let found =
            find_most_specific_repository(Path::new("/work/mono/packages/app/src/main.rs"), &repos)
                .unwrap();
        assert_eq!(found.path, Path::new("/work/mono/packages/app"));

        let found = find_most_specific_repository(Path::new("/work/mono/NOTES.md"), &repos).unwrap();
        assert_eq!(found.path, Path::new("/work/mono"));

        assert!(find_most_specific_repository(Path::new("/elsewhere/x"), &repos).is_none());
    }

    #[test]
    fn test_can_move_within_one_repository() {
        let repos = fixture();
        assert!(can_move_file(
            Path::new("/work/mono/NOTES.md"),
            Path::new("/work/mono/documents/NOTES.md"),
            &repos
        ));
        assert!(can_move_file(
            Path::new("/work/mono/packages/app/a.rs"),
            Path::new("/work/mono/packages/app/src/a.rs"),
            &repos
        ));
    }

    #[test]
    fn test_can_move_root_into_nested() {
        let repos = fixture();
        assert!(can_move_file(
            Path::new("/work/mono/build.sh"),
            Path::new("/work/mono/packages/app/scripts/build.sh"),
            &repos
        ));
    }

    #[test]
    fn test_cannot_move_nested_into_root() {
        let repos = fixture();
        assert!(!can_move_file(
            Path::new("/work/mono/packages/app/config.toml"),
            Path::new("/work/mono/config.toml"),
            &repos
        ));
    }

    #[test]
    fn test_cannot_move_between_siblings() {
        let repos = fixture();
        assert!(!can_move_file(
            Path::new("/work/mono/packages/app/util.rs"),
            Path::new("/work/mono/packages/lib/util.rs"),
            &repos
        ));
    }

    #[test]
    fn test_cannot_move_outside_every_repository() {
        let repos = fixture();
        assert!(!can_move_file(
            Path::new("/work/mono/NOTES.md"),
            Path::new("/tmp/NOTES.md"),
            &repos
        ));
        assert!(!can_move_file(
            Path::new("/tmp/NOTES.md"),
            Path::new("/work/mono/NOTES.md"),
            &repos
        ));
    }

    #[test]
    fn test_no_root_repository_denies_cross_moves() {
        // Without an outermost root repo, only same-repo moves survive
        let repos = vec![
            repo("/work/a", false),
            repo("/work/b", false),
        ];
        assert!(!can_move_file(
            Path::new("/work/a/x.txt"),
            Path::new("/work/b/x.txt"),
            &repos
        ));
        assert!(can_move_file(
            Path::new("/work/a/x.txt"),
            Path::new("/work/a/y/x.txt"),
            &repos
        ));
    }
}
