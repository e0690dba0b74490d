//! Path and filter utilities

use std::path::{Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Path as a portable map key: forward slashes regardless of platform.
pub fn path_to_key_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Key under which `path` lands in the digest map.
/// With `relative`, a root that is itself a file is keyed by its file name.
pub fn map_key(path: &Path, root: &Path, relative: bool) -> PathBuf {
    if !relative {
        return path.to_path_buf();
    }
    let rel = match path_relative_to(path, root) {
        Some(rel) if rel.as_os_str().is_empty() => path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf()),
        Some(rel) => rel,
        None => path.to_path_buf(),
    };
    PathBuf::from(path_to_key_string(&rel))
}

/// Returns true if the path should be handed to the digest stage (not excluded).
///
/// Each pattern is tried against the file name and against the full walked path; `*` also
/// matches `/`, so `/data/logs/*` drops everything below `/data/logs`. The root itself is
/// never included here (callers decide what to do with a file root).
pub fn should_include_in_walk(path: &Path, root: &Path, exclude_patterns: &[String]) -> bool {
    if path == root {
        return false;
    }
    if exclude_patterns.is_empty() {
        return true;
    }
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return true,
    };
    let path_str = path.to_str().unwrap_or("");
    !exclude_patterns
        .iter()
        .any(|pattern| glob_match(pattern, name) || glob_match(pattern, path_str))
}

/// True if any directory name between `root` and `path` (exclusive of both) matches an exclude
/// pattern. Only single components are matched here, never the full path.
/// Lets a pattern like `target` drop every file below a `target/` directory.
pub fn is_under_excluded_dir(path: &Path, root: &Path, exclude_patterns: &[String]) -> bool {
    if exclude_patterns.is_empty() {
        return false;
    }
    let Ok(rel) = path.strip_prefix(root) else {
        return false;
    };
    let mut components = rel.components().peekable();
    while let Some(c) = components.next() {
        // last component is the file itself; should_include_in_walk handles it
        if components.peek().is_none() {
            break;
        }
        let Some(name) = c.as_os_str().to_str() else {
            continue;
        };
        if exclude_patterns.iter().any(|p| glob_match(p, name)) {
            return true;
        }
    }
    false
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    // Remove leading '!' if present (negation handled by caller)
    let pattern = pattern.strip_prefix('!').unwrap_or(pattern);

    let mut pattern_chars = pattern.chars().peekable();
    let mut text_chars = text.chars().peekable();

    while let Some(&p) = pattern_chars.peek() {
        match p {
            '*' => {
                pattern_chars.next();
                if pattern_chars.peek().is_none() {
                    return true; // trailing * matches everything
                }
                let rest: String = pattern_chars.clone().collect();
                loop {
                    if glob_match(&rest, &text_chars.clone().collect::<String>()) {
                        return true;
                    }
                    if text_chars.next().is_none() {
                        return false;
                    }
                }
            }
            '?' => {
                pattern_chars.next();
                if text_chars.next().is_none() {
                    return false;
                }
            }
            _ => {
                pattern_chars.next();
                if text_chars.next() != Some(p) {
                    return false;
                }
            }
        }
    }

    text_chars.peek().is_none()
}
