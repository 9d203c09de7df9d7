//! Sweep driver: walk the root, patch each candidate, count the fixes.
//!
//! Candidates are processed one at a time in sorted path order. The first
//! failure ends the run; files fixed before it stay fixed.

use crate::config::SweepConfig;
use crate::patch::{patch_file, FileOutcome, PatchError, WriteMode};
use crate::rules::{RuleError, RuleHit, RuleSet};
use crate::walker::{discover, CandidateFilter, WalkError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// A file the sweep changed (or would change, on a dry run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixedFile {
    pub path: PathBuf,
    pub rules: Vec<RuleHit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub root: PathBuf,
    pub dry_run: bool,
    /// Candidate files read.
    pub scanned: usize,
    pub fixed: Vec<FixedFile>,
}

impl SweepSummary {
    pub fn fixed_count(&self) -> usize {
        self.fixed.len()
    }
}

#[derive(Debug, Clone)]
pub struct Sweeper {
    root: PathBuf,
    filter: CandidateFilter,
    rules: RuleSet,
    mode: WriteMode,
}

impl Sweeper {
    pub fn new(
        root: impl Into<PathBuf>,
        filter: CandidateFilter,
        rules: RuleSet,
        mode: WriteMode,
    ) -> Self {
        Self {
            root: root.into(),
            filter,
            rules,
            mode,
        }
    }

    /// Build a sweeper from configuration: built-in rules first (unless
    /// disabled), then the configured rules in file order.
    pub fn from_config(config: &SweepConfig, mode: WriteMode) -> Result<Self, SweepError> {
        Ok(Self::new(
            config.sweep.root.clone(),
            CandidateFilter::new(config.sweep.extensions.iter().cloned()),
            active_rules(config)?,
            mode,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run the sweep. `on_fixed` is called for each changed file as soon as
    /// it has been handled, before the next candidate is read.
    pub fn run<F>(&self, mut on_fixed: F) -> Result<SweepSummary, SweepError>
    where
        F: FnMut(&Path, &FileOutcome),
    {
        log::info!(
            "sweeping {} for {} ({} rule(s){})",
            self.root.display(),
            self.filter.suffixes().join(", "),
            self.rules.len(),
            if self.mode == WriteMode::DryRun {
                ", dry run"
            } else {
                ""
            }
        );

        let candidates = discover(&self.root, &self.filter)?;
        let mut fixed = Vec::new();

        for path in &candidates {
            log::debug!("checking {}", path.display());
            let outcome = patch_file(path, &self.rules, self.mode)?;
            if outcome.is_fixed() {
                on_fixed(path, &outcome);
                fixed.push(FixedFile {
                    path: path.clone(),
                    rules: outcome.hits().to_vec(),
                });
            }
        }

        log::info!(
            "scanned {} file(s), fixed {}",
            candidates.len(),
            fixed.len()
        );

        Ok(SweepSummary {
            root: self.root.clone(),
            dry_run: self.mode == WriteMode::DryRun,
            scanned: candidates.len(),
            fixed,
        })
    }
}

/// Rules a configuration asks for, in application order.
pub fn active_rules(config: &SweepConfig) -> Result<RuleSet, RuleError> {
    let mut rules = if config.sweep.include_builtin {
        RuleSet::builtin()
    } else {
        RuleSet::empty()
    };
    rules.extend(RuleSet::compile(&config.rules)?);
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_from_str, SweepSettings};
    use std::fs;

    #[test]
    fn test_active_rules_order() {
        let config = load_from_str(
            r#"
[[rules]]
id = "extra"
pattern = "x"
"#,
        )
        .unwrap();
        let ids: Vec<_> = active_rules(&config)
            .unwrap()
            .rules()
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(
            ids,
            ["error-block", "inline-error-arg", "stray-brace", "extra"]
        );
    }

    #[test]
    fn test_active_rules_without_builtin() {
        let config = load_from_str(
            r#"
[sweep]
include_builtin = false

[[rules]]
id = "only"
pattern = "x"
"#,
        )
        .unwrap();
        let rules = active_rules(&config).unwrap();
        assert!(!rules.is_empty());
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_run_reports_fixed_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(
            root.join("b/route.ts"),
            "const supabase = createSupabaseAdminClient();\n}\n",
        )
        .unwrap();
        fs::write(
            root.join("a.js"),
            "const supabase = createSupabaseAdminClient();, { status: 500 });\n",
        )
        .unwrap();
        fs::write(root.join("clean.ts"), "export {};\n").unwrap();

        let config = SweepConfig {
            sweep: SweepSettings {
                root: root.to_path_buf(),
                ..SweepSettings::default()
            },
            rules: Vec::new(),
        };
        let sweeper = Sweeper::from_config(&config, WriteMode::Write).unwrap();

        let mut seen = Vec::new();
        let summary = sweeper
            .run(|path, _| seen.push(path.strip_prefix(root).unwrap().to_path_buf()))
            .unwrap();

        assert_eq!(seen, vec![PathBuf::from("a.js"), PathBuf::from("b/route.ts")]);
        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.fixed_count(), 2);
        assert!(!summary.dry_run);
        assert_eq!(summary.fixed[0].rules[0].rule, "inline-error-arg");
        assert_eq!(summary.fixed[1].rules[0].rule, "stray-brace");
    }

    #[test]
    fn test_bad_custom_rule_fails_before_walking() {
        let config = load_from_str(
            r#"
[[rules]]
id = "bad"
pattern = "(("
"#,
        )
        .unwrap();
        let err = Sweeper::from_config(&config, WriteMode::Write).unwrap_err();
        assert!(matches!(err, SweepError::Rules(_)));
    }
}
