//! Route Sweeper: strips stray error-response scaffolding from API routes
//!
//! An earlier bulk edit replaced client-initialisation blocks with
//! `const supabase = createSupabaseAdminClient();` but left pieces of the old
//! error branch behind it (`{ status: 500 } ); }`, a glued-on
//! `, { status: 500 });`, or a lone `}`). This crate finds and removes them.
//!
//! # Architecture
//!
//! - [`rules`]: ordered regex substitutions; each rule sees the previous
//!   rule's output.
//! - [`patch`]: read one file, apply the rules, write back only on change.
//! - [`walker`]: find candidate files by name suffix.
//! - [`sweep`]: drive the walk and count fixed files.
//! - [`config`]: `{root, extensions, rules}` with the historic defaults.
//!
//! # Example
//!
//! ```no_run
//! use route_sweeper::{Sweeper, SweepConfig, WriteMode};
//!
//! let sweeper = Sweeper::from_config(&SweepConfig::default(), WriteMode::Write)?;
//! let summary = sweeper.run(|path, _| println!("Fixed: {}", path.display()))?;
//! println!("Fixed {} files", summary.fixed_count());
//! # Ok::<(), route_sweeper::SweepError>(())
//! ```

pub mod config;
pub mod patch;
pub mod rules;
pub mod sweep;
pub mod walker;

// Re-exports
pub use config::{
    load_from_path, load_from_str, ConfigError, ConfigOrigin, RuleDefinition, SweepConfig,
};
pub use patch::{patch_file, FileOutcome, PatchError, WriteMode};
pub use rules::{Rewrite, Rule, RuleError, RuleHit, RuleSet};
pub use sweep::{active_rules, FixedFile, SweepError, SweepSummary, Sweeper};
pub use walker::{discover, CandidateFilter, WalkError};
