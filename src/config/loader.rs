use crate::config::schema::{SweepConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "route-sweeper.toml";

/// Where a configuration came from, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from a string.
    Inline,
    /// Named with `--config`.
    Explicit(PathBuf),
    /// `route-sweeper.toml` picked up from the working directory.
    Discovered(PathBuf),
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Inline => write!(f, "inline sweep config"),
            ConfigOrigin::Explicit(path) => write!(f, "sweep config {}", path.display()),
            ConfigOrigin::Discovered(path) => write!(
                f,
                "{} found in {} (pass --config to use another file)",
                DEFAULT_CONFIG_FILE,
                path.parent().unwrap_or(path).display()
            ),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// The file exists (or was named) but could not be read.
    Unreadable {
        origin: ConfigOrigin,
        source: std::io::Error,
    },
    /// Not TOML, or keys the sweep does not know.
    Malformed {
        origin: ConfigOrigin,
        source: toml_edit::de::Error,
    },
    /// Parsed, but the settings or rules cannot drive a sweep.
    Rejected {
        origin: ConfigOrigin,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn origin(&self) -> &ConfigOrigin {
        match self {
            ConfigError::Unreadable { origin, .. }
            | ConfigError::Malformed { origin, .. }
            | ConfigError::Rejected { origin, .. } => origin,
        }
    }

    fn with_origin(self, origin: ConfigOrigin) -> Self {
        match self {
            ConfigError::Unreadable { source, .. } => ConfigError::Unreadable { origin, source },
            ConfigError::Malformed { source, .. } => ConfigError::Malformed { origin, source },
            ConfigError::Rejected { source, .. } => ConfigError::Rejected { origin, source },
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Unreadable { origin, source } => {
                write!(f, "cannot read {origin}: {source}")
            }
            ConfigError::Malformed { origin, source } => {
                write!(f, "{origin} is not a valid sweep config: {source}")
            }
            ConfigError::Rejected { origin, source } => {
                write!(f, "{origin} cannot drive a sweep:\n{source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Unreadable { source, .. } => Some(source),
            ConfigError::Malformed { source, .. } => Some(source),
            ConfigError::Rejected { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<SweepConfig, ConfigError> {
    let config: SweepConfig =
        toml_edit::de::from_str(input).map_err(|source| ConfigError::Malformed {
            origin: ConfigOrigin::Inline,
            source,
        })?;
    config.validate().map_err(|source| ConfigError::Rejected {
        origin: ConfigOrigin::Inline,
        source,
    })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<SweepConfig, ConfigError> {
    let path = path.as_ref();
    load_file(path, ConfigOrigin::Explicit(path.to_path_buf()))
}

fn load_file(path: &Path, origin: ConfigOrigin) -> Result<SweepConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(source) => return Err(ConfigError::Unreadable { origin, source }),
    };
    load_from_str(&contents).map_err(|error| error.with_origin(origin))
}

/// Resolve the configuration for a run.
///
/// An explicit path must exist. Without one, `route-sweeper.toml` in `dir`
/// is used when present, and the built-in defaults otherwise.
pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<SweepConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        log::info!("using config {}", candidate.display());
        return load_file(&candidate, ConfigOrigin::Discovered(candidate.clone()));
    }

    Ok(SweepConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_document_is_default() {
        let config = load_from_str("").unwrap();
        assert_eq!(config.sweep.root, PathBuf::from("src/app/api"));
        assert_eq!(config.sweep.extensions, vec![".js", ".ts"]);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_parse_full_document() {
        let config = load_from_str(
            r#"
[sweep]
root = "app/routes"
extensions = [".mjs"]
include_builtin = false

[[rules]]
id = "imports"
description = "swap the old client helper"
pattern = 'getSupabaseClient\(\)'
replacement = "createSupabaseAdminClient()"
"#,
        )
        .unwrap();

        assert_eq!(config.sweep.root, PathBuf::from("app/routes"));
        assert_eq!(config.sweep.extensions, vec![".mjs"]);
        assert!(!config.sweep.include_builtin);
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].pattern, r"getSupabaseClient\(\)");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = load_from_str("[sweep]\nroots = \"x\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Malformed {
                origin: ConfigOrigin::Inline,
                ..
            }
        ));
    }

    #[test]
    fn test_validation_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[sweep]\nextensions = []\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Rejected { .. }));
        assert_eq!(err.origin(), &ConfigOrigin::Explicit(path));
        assert!(err.to_string().contains("bad.toml"));
        assert!(err
            .to_string()
            .contains("sweep.extensions must not be empty"));
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
        assert!(err.to_string().starts_with("cannot read sweep config"));
    }

    #[test]
    fn test_resolve_picks_up_default_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[sweep]\nroot = \"lib\"\n",
        )
        .unwrap();

        let config = resolve(None, dir.path()).unwrap();
        assert_eq!(config.sweep.root, PathBuf::from("lib"));
    }

    #[test]
    fn test_discovered_file_is_named_in_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[sweep\n").unwrap();

        let err = resolve(None, dir.path()).unwrap_err();
        assert_eq!(
            err.origin(),
            &ConfigOrigin::Discovered(dir.path().join(DEFAULT_CONFIG_FILE))
        );
        let message = err.to_string();
        assert!(message.contains("route-sweeper.toml found in"));
        assert!(message.contains("--config"));
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve(None, dir.path()).unwrap();
        assert_eq!(config.sweep.root, PathBuf::from("src/app/api"));
    }
}
