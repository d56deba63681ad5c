//! Path utilities
//!
//! Cache entries live at `<cache_dir>/<key>.<ext>`. Keys are used verbatim:
//! a key containing separators or other unsafe characters surfaces later as
//! a file-system error rather than being rejected here.

use std::path::{Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Build the file path backing `key` inside `cache_dir`
pub fn entry_path(cache_dir: &Path, key: &str, extension: &str) -> PathBuf {
    cache_dir.join(format!("{}.{}", key, extension))
}
