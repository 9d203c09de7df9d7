//! Candidate discovery under the sweep root.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
#[error("failed to walk {}: {}", .path.display(), .source)]
pub struct WalkError {
    pub path: PathBuf,
    #[source]
    pub source: walkdir::Error,
}

/// Accepts files whose name ends with one of a fixed set of suffixes.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    suffixes: Vec<String>,
}

impl CandidateFilter {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Byte-wise suffix test on the file name only. Names that are not
    /// UTF-8 still match; directories in the path do not count.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.as_encoded_bytes();
        self.suffixes.iter().any(|s| name.ends_with(s.as_bytes()))
    }
}

/// Collect every regular file under `root` that `filter` accepts, sorted.
///
/// Symlinks are not followed. A missing root yields an empty list.
pub fn discover(root: &Path, filter: &CandidateFilter) -> Result<Vec<PathBuf>, WalkError> {
    if !root.exists() {
        log::warn!("sweep root {} does not exist", root.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|source| WalkError {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if filter.accepts(entry.path()) {
            files.push(entry.into_path());
        } else {
            log::trace!("skipping {}", entry.path().display());
        }
    }

    files.sort();
    Ok(files)
}
