use std::path::{Path, PathBuf};

/// Turns a user supplied path string into an absolute path, expanding a leading `~`.
pub fn normalized_path_from_user_string(path: impl AsRef<str>) -> PathBuf {
    let path = path.as_ref();

    let expanded = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    };

    std::path::absolute(&expanded).unwrap_or(expanded)
}

/// The directory a file lives in, treating a bare file name as living in the current directory.
pub fn parent_dir_or_cwd(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
