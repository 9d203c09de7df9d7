use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use route_sweeper::config::{self, SweepConfig};
use route_sweeper::{FileOutcome, Sweeper, WriteMode};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "route-sweeper")]
#[command(
    about = "Strip stray error-response scaffolding from API route sources",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Defaults to `fix` with no options
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Default)]
struct SweepArgs {
    /// Directory to sweep [default: src/app/api]
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Accepted file-name suffix, repeatable [default: .js .ts]
    #[arg(short, long = "ext", value_name = "SUFFIX")]
    extensions: Vec<String>,

    /// Config file [default: ./route-sweeper.toml when present]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fix candidate files in place
    Fix {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List files that still need fixing; exits 1 if there are any
    Check {
        #[command(flatten)]
        sweep: SweepArgs,
    },

    /// List active rules in the order they are applied
    Rules {
        /// Config file [default: ./route-sweeper.toml when present]
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Fix {
            sweep: SweepArgs::default(),
            dry_run: false,
            diff: false,
            format: OutputFormat::Text,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command.unwrap_or_default() {
        Commands::Fix {
            sweep,
            dry_run,
            diff,
            format,
        } => cmd_fix(sweep, dry_run, diff, format),

        Commands::Check { sweep } => cmd_check(sweep),

        Commands::Rules { config } => cmd_rules(config),
    }
}

/// Log records go to stderr; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Helper: config file (or defaults) with CLI overrides on top.
fn load_config(args: &SweepArgs) -> Result<SweepConfig> {
    let cwd = env::current_dir().context("cannot determine working directory")?;
    let mut config = config::resolve(args.config.as_deref(), &cwd)?;

    if let Some(root) = &args.root {
        config.sweep.root = root.clone();
    }
    if !args.extensions.is_empty() {
        config.sweep.extensions = args.extensions.clone();
    }

    config
        .validate()
        .context("invalid options on the command line")?;

    Ok(config)
}

/// Helper: Show unified diff between original and fixed content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (fixed)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
        if change.missing_newline() {
            println!();
        }
    }
    println!();
}

fn cmd_fix(args: SweepArgs, dry_run: bool, show_diff: bool, format: OutputFormat) -> Result<()> {
    if show_diff && format == OutputFormat::Json {
        anyhow::bail!("--diff cannot be combined with --format json");
    }

    let config = load_config(&args)?;
    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };
    let sweeper = Sweeper::from_config(&config, mode)?;
    let label = if dry_run { "Would fix" } else { "Fixed" };

    let summary = sweeper
        .run(|path, outcome| {
            if format == OutputFormat::Json {
                return;
            }
            println!("{} {}", format!("{label}:").green(), path.display());
            if show_diff {
                if let FileOutcome::Fixed { before, after, .. } = outcome {
                    display_diff(path, before, after);
                }
            }
        })
        .with_context(|| format!("sweep of {} aborted", sweeper.root().display()))?;

    match format {
        OutputFormat::Text => {
            println!();
            println!("{} {} files", label, summary.fixed_count());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn cmd_check(args: SweepArgs) -> Result<()> {
    let config = load_config(&args)?;
    let sweeper = Sweeper::from_config(&config, WriteMode::DryRun)?;

    let summary = sweeper
        .run(|path, outcome| {
            let rules: Vec<&str> = outcome.hits().iter().map(|h| h.rule.as_str()).collect();
            println!(
                "{} {} ({})",
                "✗".red(),
                path.display(),
                rules.join(", ").dimmed()
            );
        })
        .with_context(|| format!("check of {} aborted", sweeper.root().display()))?;

    if summary.fixed_count() > 0 {
        eprintln!();
        eprintln!(
            "{}",
            format!(
                "{} of {} files need fixing",
                summary.fixed_count(),
                summary.scanned
            )
            .red()
        );
        std::process::exit(1);
    }

    println!(
        "{} {} files clean",
        "✓".green(),
        format!("{}", summary.scanned).green()
    );
    Ok(())
}

fn cmd_rules(config_path: Option<PathBuf>) -> Result<()> {
    let cwd = env::current_dir().context("cannot determine working directory")?;
    let config = config::resolve(config_path.as_deref(), &cwd)?;
    let rules = route_sweeper::active_rules(&config)?;

    println!("{}", "Rules (applied in order):".bold());
    for (idx, rule) in rules.rules().iter().enumerate() {
        match &rule.description {
            Some(description) => println!("  {}. {}: {}", idx + 1, rule.id.bold(), description),
            None => println!("  {}. {}", idx + 1, rule.id.bold()),
        }
        println!("     {}", rule.pattern().dimmed());
        println!("     {} {}", "=>".dimmed(), rule.replacement().dimmed());
    }

    Ok(())
}
