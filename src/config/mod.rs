pub mod loader;
pub mod schema;

pub use loader::{
    load_from_path, load_from_str, resolve, ConfigError, ConfigOrigin, DEFAULT_CONFIG_FILE,
};
pub use schema::{
    RuleDefinition, SweepConfig, SweepSettings, ValidationError, ValidationIssue, DEFAULT_EXTENSIONS,
    DEFAULT_ROOT,
};
