use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Joins `key` to `root` and proves the result stays inside `root`.
///
/// `.` and `..` are collapsed lexically first; a `..` that would climb above the root is
/// rejected. The deepest existing ancestor is then canonicalized so a symlink cannot lead
/// outside the sandbox.
pub(crate) fn resolve_path(root: &Path, key: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let key = key.as_ref();
    let joined = root.join(normalize(key)?);
    if joined == root {
        return Err(traversal(key, "Key must name an entry below the root"));
    }

    let mut current = Some(joined.as_path());
    while let Some(path) = current {
        if path == root {
            return Ok(joined);
        }
        if path.exists() {
            let canonical = path.canonicalize().map_err(|e| StorageError::Io {
                source: e,
                context: Some(format!("Failed to verify {}", path.display()).into()),
            })?;
            return if canonical.starts_with(root) {
                Ok(joined)
            } else {
                Err(traversal(key, "Existing ancestor resolves outside the root"))
            };
        }
        current = path.parent();
    }

    Err(traversal(key, "No ancestor inside the root"))
}

fn normalize(key: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();
    for component in key.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(traversal(key, "Key climbs above the root"));
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(traversal(key, "Absolute keys are not allowed"));
            },
        }
    }
    Ok(out)
}

fn traversal(key: &Path, reason: &'static str) -> StorageError {
    StorageError::PathTraversalAttempt {
        message: key.display().to_string().into(),
        context: Some(reason.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_inner_parent_segments() {
        let root = Path::new("/srv/psn");
        let path = resolve_path(root, "counters/../counters/7").unwrap();
        assert_eq!(path, root.join("counters/7"));
    }

    #[test]
    fn rejects_escape_and_absolute_keys() {
        let root = Path::new("/srv/psn");
        for key in ["../etc/passwd", "a/../../b", "/etc/passwd", "."] {
            let err = resolve_path(root, key).unwrap_err();
            assert_eq!(err.kind(), "PathTraversalAttempt", "{key}");
        }
    }
}
