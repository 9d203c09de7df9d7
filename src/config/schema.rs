use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Directory the original cleanup ran against.
pub const DEFAULT_ROOT: &str = "src/app/api";

/// Script sources that can carry the corruption.
pub const DEFAULT_EXTENSIONS: [&str; 2] = [".js", ".ts"];

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    #[serde(default)]
    pub sweep: SweepSettings,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.sweep.extensions.is_empty() {
            issues.push(ValidationIssue::NoExtensions);
        }
        for ext in &self.sweep.extensions {
            if ext.trim().is_empty() {
                issues.push(ValidationIssue::EmptyExtension);
            }
        }

        if !self.sweep.include_builtin && self.rules.is_empty() {
            issues.push(ValidationIssue::NoRules);
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateRule {
                    rule_id: rule.id.clone(),
                });
            }
            if rule.pattern.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: Some(rule.id.clone()),
                    field: "pattern",
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SweepSettings {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Run the built-in rules before any user rules.
    #[serde(default = "default_true")]
    pub include_builtin: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            root: default_root(),
            extensions: default_extensions(),
            include_builtin: true,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_ROOT)
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub pattern: String,
    /// `regex` expansion syntax: `$1`, `${name}`
    #[serde(default)]
    pub replacement: String,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    NoExtensions,
    EmptyExtension,
    NoRules,
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateRule {
        rule_id: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NoExtensions => write!(f, "sweep.extensions must not be empty"),
            ValidationIssue::EmptyExtension => {
                write!(f, "sweep.extensions contains an empty suffix")
            }
            ValidationIssue::NoRules => write!(
                f,
                "no rules to apply: include_builtin is false and no [[rules]] are defined"
            ),
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::DuplicateRule { rule_id } => {
                write!(f, "rule id '{rule_id}' is defined more than once")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, pattern: &str) -> RuleDefinition {
        RuleDefinition {
            id: id.to_string(),
            description: None,
            pattern: pattern.to_string(),
            replacement: String::new(),
        }
    }

    #[test]
    fn test_defaults_match_original_cleanup() {
        let config = SweepConfig::default();
        assert_eq!(config.sweep.root, PathBuf::from("src/app/api"));
        assert_eq!(config.sweep.extensions, vec![".js", ".ts"]);
        assert!(config.sweep.include_builtin);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_collects_every_issue() {
        let config = SweepConfig {
            sweep: SweepSettings {
                extensions: vec![" ".to_string()],
                ..SweepSettings::default()
            },
            rules: vec![rule("a", "x"), rule("a", ""), rule("", "y")],
        };
        let err = config.validate().unwrap_err();
        assert!(err.issues.contains(&ValidationIssue::EmptyExtension));
        assert!(err.issues.contains(&ValidationIssue::DuplicateRule {
            rule_id: "a".to_string()
        }));
        assert!(err.issues.contains(&ValidationIssue::MissingField {
            rule_id: Some("a".to_string()),
            field: "pattern"
        }));
        assert!(err.issues.contains(&ValidationIssue::MissingField {
            rule_id: None,
            field: "id"
        }));
        assert_eq!(err.to_string().lines().count(), 4);
    }

    #[test]
    fn test_no_rules_without_builtin() {
        let config = SweepConfig {
            sweep: SweepSettings {
                include_builtin: false,
                ..SweepSettings::default()
            },
            rules: Vec::new(),
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.issues, vec![ValidationIssue::NoRules]);
    }
}
