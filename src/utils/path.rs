//! Lexical path helpers.
//!
//! Snapshot keys name files that may not exist on this machine, so paths are
//! resolved purely lexically instead of through `fs::canonicalize`.

use std::path::{Component, Path, PathBuf};

/// Fold `.` and `..` segments out of a path without touching the filesystem.
///
/// Leading `..` segments of a relative path are kept, and `..` at the root of
/// an absolute path is dropped.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    out.iter().collect()
}

/// Express `path` relative to `base`, with `/` separators.
///
/// Both paths are normalized first. Segments of `base` not shared with `path`
/// become `..`. Returns `"."` when the two are equal.
///
/// # Examples
///
/// ```
/// # use std::path::Path;
/// # use size_snapshot::utils::relative_to;
/// assert_eq!(relative_to(Path::new("/ws/packages/x/dist/x.js"), Path::new("/ws")), "packages/x/dist/x.js");
/// assert_eq!(relative_to(Path::new("/ws/a"), Path::new("/ws/b")), "../a");
/// ```
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> String {
    let path = normalize(path);
    let base = normalize(base);

    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let shared = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let segments: Vec<String> = std::iter::repeat_n("..".to_string(), base_parts.len() - shared)
        .chain(
            path_parts[shared..]
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .collect();

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}
