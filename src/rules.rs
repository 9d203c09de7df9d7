//! Ordered regex substitution rules.
//!
//! A [`RuleSet`] is applied front to back: each rule rewrites the output of
//! the rule before it, so one file can be touched by several rules.

use crate::config::RuleDefinition;
use regex::Regex;
use std::borrow::Cow;
use thiserror::Error;

/// The statement every built-in rule anchors on. The corruption always
/// trails it, and the replacement always keeps it.
pub const ANCHOR_STATEMENT: &str = "const supabase = createSupabaseAdminClient();";

const ANCHOR_PATTERN: &str = r"(?P<call>const supabase = createSupabaseAdminClient\(\);)";

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("rule '{id}' has an invalid pattern: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },
}

/// A single compiled `(pattern, replacement)` substitution.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub description: Option<String>,
    pattern: Regex,
    replacement: String,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, RuleError> {
        let id = id.into();
        let pattern = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
            id: id.clone(),
            source,
        })?;
        Ok(Self {
            id,
            description: None,
            pattern,
            replacement: replacement.into(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every non-overlapping match. Returns the new text and the
    /// number of matches replaced.
    pub fn apply<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let count = self.pattern.find_iter(text).count();
        if count == 0 {
            return (Cow::Borrowed(text), 0);
        }
        let rewritten = self.pattern.replace_all(text, self.replacement.as_str());
        (Cow::Owned(rewritten.into_owned()), count)
    }
}

/// How many times one rule fired on one file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RuleHit {
    pub rule: String,
    pub count: usize,
}

/// Output of running a [`RuleSet`] over some text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Rewrite should be checked with changed()"]
pub struct Rewrite {
    pub content: String,
    pub hits: Vec<RuleHit>,
    changed: bool,
}

impl Rewrite {
    /// True when the final text differs from the input.
    ///
    /// A rule can match and still leave the text as it was (e.g. a
    /// replacement that reproduces its match), so this is a text comparison
    /// rather than "some rule fired".
    pub fn changed(&self) -> bool {
        self.changed
    }
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// The three repairs for the stray error-response scaffolding, in the
    /// order they must run.
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Compile user-defined rules, in order.
    pub fn compile(definitions: &[RuleDefinition]) -> Result<Self, RuleError> {
        let mut rules = Vec::with_capacity(definitions.len());
        for def in definitions {
            let mut rule = Rule::new(&def.id, &def.pattern, &def.replacement)?;
            rule.description = def.description.clone();
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule over `original`, each on the previous rule's output.
    pub fn apply(&self, original: &str) -> Rewrite {
        let mut content = original.to_string();
        let mut hits = Vec::new();

        for rule in &self.rules {
            let (rewritten, count) = rule.apply(&content);
            if count == 0 {
                continue;
            }
            log::trace!("rule {} matched {} time(s)", rule.id, count);
            hits.push(RuleHit {
                rule: rule.id.clone(),
                count,
            });
            content = rewritten.into_owned();
        }

        let changed = content != original;
        Rewrite {
            content,
            hits,
            changed,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_rules() -> Vec<Rule> {
    let specs: [(&str, &str, String); 3] = [
        (
            "error-block",
            "drop a `{ status: 500 } ); }` block trailing the admin client call",
            format!(r"{ANCHOR_PATTERN}\s*\{{\s*status:\s*500\s*\}}\s*\);\s*\}}"),
        ),
        (
            "inline-error-arg",
            "drop a `, { status: 500 });` argument glued onto the admin client call",
            format!(r"{ANCHOR_PATTERN},\s*\{{\s*status:\s*500\s*\}}\s*\);"),
        ),
        (
            "stray-brace",
            "drop a lone `}` following the admin client call",
            format!(r"{ANCHOR_PATTERN}\s*\}}"),
        ),
    ];

    specs
        .into_iter()
        .map(|(id, description, pattern)| {
            Rule::new(id, &pattern, "$call")
                .map(|rule| rule.with_description(description))
                .expect("built-in rule patterns are valid")
        })
        .collect()
}
