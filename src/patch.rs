use crate::rules::{RuleHit, RuleSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Whether a patched file is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Write,
    /// Compute the rewrite but leave the file alone.
    DryRun,
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of running the rule set over one file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "FileOutcome should be checked with is_fixed()"]
pub enum FileOutcome {
    /// No rule changed the text; the file was not written.
    Unchanged,
    /// The text changed. In [`WriteMode::Write`] the file now holds `after`.
    Fixed {
        hits: Vec<RuleHit>,
        before: String,
        after: String,
    },
}

impl FileOutcome {
    pub fn is_fixed(&self) -> bool {
        matches!(self, FileOutcome::Fixed { .. })
    }

    pub fn hits(&self) -> &[RuleHit] {
        match self {
            FileOutcome::Fixed { hits, .. } => hits,
            FileOutcome::Unchanged => &[],
        }
    }
}

/// Apply `rules` to the file at `path`.
///
/// The file is rewritten only when the final text differs from what was
/// read. Read, decode and write failures are returned as-is.
pub fn patch_file(
    path: &Path,
    rules: &RuleSet,
    mode: WriteMode,
) -> Result<FileOutcome, PatchError> {
    let bytes = fs::read(path).map_err(|source| PatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let original = String::from_utf8(bytes).map_err(|source| PatchError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let rewrite = rules.apply(&original);
    if !rewrite.changed() {
        return Ok(FileOutcome::Unchanged);
    }

    // Truncate in place; the inode, links and ownership stay as they were.
    if mode == WriteMode::Write {
        fs::write(path, rewrite.content.as_bytes()).map_err(|source| PatchError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    Ok(FileOutcome::Fixed {
        hits: rewrite.hits,
        before: original,
        after: rewrite.content,
    })
}
