//! Logical path to filesystem path mapping.

use std::path::{Path, PathBuf};

use crate::utils::path::normalize_path;

/// Maps a logical (content-relative) path to a physical path.
pub trait PathMapper: Send + Sync {
    fn map(&self, logical: &str) -> PathBuf;
}

/// Roots logical paths under a directory.
///
/// `/js/app.js`, `~/js/app.js` and `js/app.js` all map to `<root>/js/app.js`.
#[derive(Debug, Clone)]
pub struct RootedPathMapper {
    root: PathBuf,
}

impl RootedPathMapper {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize_path(root.as_ref()),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PathMapper for RootedPathMapper {
    fn map(&self, logical: &str) -> PathBuf {
        let relative = logical.strip_prefix('~').unwrap_or(logical);
        let relative = relative.trim_start_matches(['/', '\\']);
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

/// Join a logical directory and a file name with exactly one `/`.
pub(crate) fn join_logical(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() && !name.starts_with('/') {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}
