//! # Module: Command Line
//!
//! ## Responsibility
//! Shared argument parsing for the `driftguard` and `driftguard-tui`
//! binaries, and turning parsed arguments into a validated
//! [`DriftGuardConfig`].
//!
//! ## Guarantees
//! - Command-line overrides are applied after the file is loaded and are
//!   re-validated, so an override can never produce an invalid config
//! - Unknown flags are rejected with the usage text
//!
//! ## NOT Responsible For
//! - Terminal setup or the run loop (that belongs to the binaries)

use std::path::PathBuf;

use crate::config::loader::load_from_file;
use crate::config::validation::{validate, ConfigError};
use crate::config::DriftGuardConfig;
use crate::DriftGuardError;

/// Usage text shared by both binaries.
pub const USAGE: &str = "\
Options:
  --config <PATH>     Load settings from a TOML file
  --api-url <URL>     Backend base URL (overrides poller.base_url)
  --seed <N>          Seed the simulation for reproducible runs
  --ticks <N>         Stop after N simulation ticks (headless only)
  --no-poll           Do not poll the backend
  --print-schema      Print the config JSON Schema and exit
  -h, --help          Show this help";

/// Parsed command-line arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// `--config`: TOML file to load.
    pub config: Option<PathBuf>,
    /// `--api-url`: backend base URL override.
    pub api_url: Option<String>,
    /// `--seed`: RNG seed override.
    pub seed: Option<u64>,
    /// `--ticks`: run a fixed number of ticks, then exit.
    pub ticks: Option<u64>,
    /// `--no-poll`: disable the snapshot poller.
    pub no_poll: bool,
    /// `--print-schema`: print the config schema and exit.
    pub print_schema: bool,
    /// `-h` / `--help`.
    pub help: bool,
}

/// Parses arguments, excluding the program name.
///
/// # Errors
///
/// Returns a message naming the offending flag when a flag is unknown,
/// is missing its value, or has a value that does not parse.
pub fn parse_args<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => cli.config = Some(PathBuf::from(value_for(&arg, args.next())?)),
            "--api-url" => cli.api_url = Some(value_for(&arg, args.next())?),
            "--seed" => cli.seed = Some(number_for(&arg, args.next())?),
            "--ticks" => cli.ticks = Some(number_for(&arg, args.next())?),
            "--no-poll" => cli.no_poll = true,
            "--print-schema" => cli.print_schema = true,
            "-h" | "--help" => cli.help = true,
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(cli)
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, String> {
    match value {
        Some(v) if !v.starts_with("--") => Ok(v),
        _ => Err(format!("{flag} requires a value")),
    }
}

fn number_for(flag: &str, value: Option<String>) -> Result<u64, String> {
    let raw = value_for(flag, value)?;
    raw.parse()
        .map_err(|_| format!("{flag} expects a non-negative integer, got '{raw}'"))
}

/// Loads the config named by `--config` (or the defaults) and applies the
/// command-line overrides.
///
/// # Errors
///
/// Returns [`DriftGuardError::Config`] if the file cannot be read or parsed,
/// or if the final config fails validation.
pub fn load_config(cli: &CliArgs) -> Result<DriftGuardConfig, DriftGuardError> {
    let mut config = match &cli.config {
        Some(path) => load_from_file(path)?,
        None => DriftGuardConfig::default(),
    };

    if let Some(url) = &cli.api_url {
        config.poller.base_url = url.clone();
    }
    if let Some(seed) = cli.seed {
        config.feed.seed = Some(seed);
    }
    if cli.no_poll {
        config.poller.enabled = false;
    }

    validate(&config).map_err(|errors| {
        ConfigError::Validation(
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    })?;

    Ok(config)
}
