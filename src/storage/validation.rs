//! Path validation
//!
//! Confines client-supplied paths to the server root. A path is accepted only
//! when two independent checks agree: the joined path, taken relative to the
//! root, has no `..` component, and its absolute form starts with the root's
//! absolute form. Nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;
use crate::storage::results::ConfinedPath;

/// Resolves `client_path` under `root`.
///
/// An empty client path resolves to the root itself. Leading separators and
/// drive prefixes are dropped before joining, so `/etc/passwd` resolves to
/// `<root>/etc/passwd`. Any `..` segment is rejected outright, even when it
/// would normalize away (`a/../b`), with either separator style.
pub fn confine(root: &Path, client_path: &str) -> Result<ConfinedPath, StorageError> {
    if client_path.contains('\0') || has_parent_segment(client_path) {
        return Err(StorageError::Rejected(client_path.to_string()));
    }

    let joined = join_under_root(root, client_path);

    let relative = contained_relative(root, &joined);
    let within = absolute_is_contained(root, &joined);

    match (relative, within, absolute_form(&joined)) {
        (Some(relative), true, Some(absolute)) => match to_slash(&relative) {
            Some(relative) => Ok(ConfinedPath::new(absolute, relative)),
            None => Err(StorageError::Rejected(client_path.to_string())),
        },
        _ => Err(StorageError::Rejected(client_path.to_string())),
    }
}

/// Joins two client-relative paths, e.g. a directory and a name inside it.
pub fn join_client_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches(['/', '\\']);
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Syntactic scan: true if any `/`- or `\`-separated segment is `..`.
pub fn has_parent_segment(client_path: &str) -> bool {
    client_path.split(['/', '\\']).any(|segment| segment == "..")
}

/// First check: the joined path relative to `root`, if it contains no `..`.
pub fn contained_relative(root: &Path, joined: &Path) -> Option<PathBuf> {
    relative_to(root, joined)
        .filter(|relative| !relative.components().any(|c| c == Component::ParentDir))
}

/// Second check: the absolute form of `joined` equals or descends from the
/// absolute form of `root`. Comparison is per component, so `/srv/files2` is
/// not inside `/srv/files`.
pub fn absolute_is_contained(root: &Path, joined: &Path) -> bool {
    match (absolute_form(root), absolute_form(joined)) {
        (Some(root), Some(joined)) => joined.starts_with(&root),
        _ => false,
    }
}

/// Appends the client path's components to `root`. Root and prefix
/// components of the client path are dropped instead of replacing `root`.
fn join_under_root(root: &Path, client_path: &str) -> PathBuf {
    let mut joined = root.to_path_buf();
    for component in Path::new(client_path).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => joined.push(".."),
            Component::Normal(part) => joined.push(part),
        }
    }
    joined
}

fn absolute_form(path: &Path) -> Option<PathBuf> {
    std::path::absolute(path)
        .ok()
        .map(|absolute| normalize_lexically(&absolute))
}

/// Removes `.` components and folds `..` into its parent without consulting
/// the filesystem. `..` directly under a root stays at the root; leading `..`
/// in a relative path is preserved.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.into_iter().collect()
}

/// Lexical equivalent of "path of `target` relative to `base`".
///
/// Returns `None` when no relative path exists: one side absolute and the
/// other not, different drive prefixes, or unmatched `..` left in `base`.
pub fn relative_to(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = normalize_lexically(base);
    let target = normalize_lexically(target);
    if base.is_absolute() != target.is_absolute() {
        return None;
    }

    let base_parts: Vec<Component> = base.components().collect();
    let target_parts: Vec<Component> = target.components().collect();

    if (has_prefix(&base_parts) || has_prefix(&target_parts))
        && base_parts.first() != target_parts.first()
    {
        return None;
    }

    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for part in &base_parts[common..] {
        if *part == Component::ParentDir {
            return None;
        }
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part);
    }
    Some(relative)
}

fn has_prefix(parts: &[Component<'_>]) -> bool {
    matches!(parts.first(), Some(Component::Prefix(_)))
}

/// Forward-slash rendering of a relative path; empty for the root. `None`
/// if a component is not valid UTF-8, since clients could not send it back.
fn to_slash(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str()?);
        }
    }
    Some(parts.join("/"))
}

/// Forward-slash path of `path` relative to `root`, used by the walker.
/// `None` outside the root or for names that are not valid UTF-8.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    contained_relative(root, path).and_then(|relative| to_slash(&relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(r"C:\srv\files")
        } else {
            PathBuf::from("/srv/files")
        }
    }

    #[test]
    fn test_empty_path_resolves_to_root() {
        let confined = confine(&root(), "").unwrap();
        assert_eq!(confined.absolute(), root());
        assert_eq!(confined.relative(), "");
        assert!(confined.is_root());
    }

    #[test]
    fn test_nested_path_is_accepted() {
        let confined = confine(&root(), "a/b/c.txt").unwrap();
        assert_eq!(confined.absolute(), root().join("a").join("b").join("c.txt"));
        assert_eq!(confined.relative(), "a/b/c.txt");
    }

    #[test]
    fn test_dot_segments_and_trailing_separator_normalize() {
        let confined = confine(&root(), "./a/./b/").unwrap();
        assert_eq!(confined.relative(), "a/b");
        assert!(confined.absolute().starts_with(root()));
    }

    #[test]
    fn test_absolute_client_path_is_joined_under_root() {
        let confined = confine(&root(), "/etc/passwd").unwrap();
        assert_eq!(confined.absolute(), root().join("etc").join("passwd"));
        assert_eq!(confined.relative(), "etc/passwd");
    }

    #[test]
    fn test_parent_segments_are_rejected() {
        let attempts = [
            "..",
            "../",
            "../../etc",
            "a/../../etc",
            "a/..",
            "a/../b",
            "./..",
            "a/b/../../..",
            "..\\..\\etc",
            "a\\..\\b",
            "/../etc",
            "sub/..\\..",
        ];
        for attempt in attempts {
            assert!(
                matches!(confine(&root(), attempt), Err(StorageError::Rejected(_))),
                "expected rejection for {attempt:?}"
            );
        }
    }

    #[test]
    fn test_every_combination_with_parent_segment_is_rejected() {
        let segments = ["a", ".", "..", "b.txt", "", "..."];
        for first in segments {
            for second in segments {
                for third in segments {
                    for separator in ["/", "\\"] {
                        let path = [first, second, third].join(separator);
                        let outcome = confine(&root(), &path);
                        if [first, second, third].contains(&"..") {
                            assert!(outcome.is_err(), "accepted {path:?}");
                        } else if let Ok(confined) = outcome {
                            assert!(confined.absolute().starts_with(root()));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_dots_inside_names_are_not_parent_segments() {
        for name in ["...", "a..b", "..hidden", "trailing.."] {
            let confined = confine(&root(), name).unwrap();
            assert_eq!(confined.relative(), name);
        }
    }

    #[test]
    fn test_nul_byte_is_rejected() {
        assert!(matches!(
            confine(&root(), "a\0b"),
            Err(StorageError::Rejected(_))
        ));
    }

    #[test]
    fn test_relative_to() {
        let root = root();
        assert_eq!(relative_to(&root, &root), Some(PathBuf::new()));
        assert_eq!(
            relative_to(&root, &root.join("a").join("b")),
            Some(PathBuf::from("a").join("b"))
        );
        let parent = root.parent().unwrap().to_path_buf();
        assert_eq!(relative_to(&root, &parent), Some(PathBuf::from("..")));
        assert_eq!(relative_to(&root, Path::new("relative")), None);
        assert_eq!(relative_to(Path::new("../x"), Path::new("y")), None);
    }

    #[test]
    fn test_sibling_with_shared_string_prefix_is_not_contained() {
        let root = root();
        let sibling = root.with_file_name("files2").join("x");
        assert!(!absolute_is_contained(&root, &sibling));
        assert!(contained_relative(&root, &sibling).is_none());
    }

    #[test]
    fn test_escaping_join_fails_both_checks() {
        let joined = root().join("..").join("..").join("etc");
        assert!(contained_relative(&root(), &joined).is_none());
        assert!(!absolute_is_contained(&root(), &joined));
    }

    #[test]
    fn test_relative_root_is_made_absolute() {
        let confined = confine(Path::new("data"), "x/y").unwrap();
        assert!(confined.absolute().is_absolute());
        assert!(confined.absolute().ends_with(Path::new("data").join("x").join("y")));
        assert_eq!(confined.relative(), "x/y");
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_lexically(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(
            normalize_lexically(Path::new("../a/..")),
            PathBuf::from("..")
        );
    }

    #[test]
    fn test_join_client_path() {
        assert_eq!(join_client_path("", "b"), "b");
        assert_eq!(join_client_path("/", "b"), "b");
        assert_eq!(join_client_path("a", "b"), "a/b");
        assert_eq!(join_client_path("a/", "b"), "a/b");
    }
}
