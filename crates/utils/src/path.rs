//! Path helpers shared by the version-control backends.

use std::path::{Path, PathBuf};

/// Whether `path` is a filesystem root (`/` on POSIX, a drive root such as
/// `C:\` on Windows).
pub fn is_fs_root(path: &Path) -> bool {
    path.parent().is_none()
}

/// Walk from a file or directory upward until a directory containing
/// `marker` (e.g. `.git`, `.svn`) is found. Returns `None` when the
/// filesystem root is reached without a hit.
pub fn discover_tree(start: &Path, marker: &str) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start.to_path_buf()
    };

    loop {
        if dir.join(marker).exists() {
            return Some(dir);
        }
        if is_fs_root(&dir) {
            return None;
        }
        dir = dir.parent()?.to_path_buf();
    }
}

/// Make `path` relative to `tree` with `/`-separated components, as expected
/// by path-at-revision addressing (`git show rev:path`).
pub fn repo_relative(path: &Path, tree: &Path) -> Option<String> {
    let rel = path.strip_prefix(tree).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Strip scratch-buffer decorations (`*` markers and surrounding
/// whitespace) so names derived from the buffer stay filesystem-safe;
/// `*` is not a legal filename character on Windows.
pub fn sanitize_buffer_name(name: &str) -> String {
    name.replace('*', "").trim().to_string()
}
