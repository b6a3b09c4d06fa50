//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `sounder probe <targets>` - one-shot reachability sweep
//! - `sounder monitor <targets>` - repeated sweeps on an interval

mod monitor;
mod probe;

pub use monitor::MonitorCommand;
pub use probe::ProbeCommand;

use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::export::ExportFormat;
use crate::probe::SweepConfig;
use crate::types::Resolution;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Sounder - a concurrent network reachability prober.
///
/// Sounder expands literal addresses, CIDR ranges and address files into
/// a target set, probes every target concurrently via the OS ping
/// utility, and reports or exports the per-host outcomes. Monitor mode
/// repeats the sweep on a fixed interval.
#[derive(Parser, Debug)]
#[command(name = "sounder")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Probe and monitor host reachability", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe targets once and report
    #[command(alias = "p")]
    Probe(ProbeCommand),

    /// Monitor targets continuously
    #[command(alias = "m")]
    Monitor(MonitorCommand),
}

/// Target selection arguments shared by both subcommands.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Literal IPv4/IPv6 addresses to probe
    #[arg(value_name = "ADDRESS")]
    pub addresses: Vec<String>,

    /// Network ranges in CIDR notation (e.g. 192.168.1.0/24)
    #[arg(short = 'n', long = "network", value_name = "CIDR")]
    pub networks: Vec<String>,

    /// Files with one address per line
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,
}

impl TargetArgs {
    /// Resolve every source into a deduplicated target set.
    ///
    /// Invalid literals and CIDR ranges are collected as rejections; a
    /// missing address file aborts resolution.
    pub fn resolve(&self) -> CliResult<Resolution> {
        let mut resolution = Resolution::new();

        resolution.add_literals(&self.addresses);
        for network in &self.networks {
            resolution.add_cidr(network);
        }
        for file in &self.files {
            resolution.add_file(file)?;
        }

        Ok(resolution)
    }
}

/// Probe execution arguments shared by both subcommands.
///
/// Flags left unset fall back to the persisted settings.
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Probe timeout in seconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Number of echo requests per probe
    #[arg(short = 'c', long)]
    pub count: Option<u32>,

    /// Maximum number of concurrent probes
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Probe launches per second (0 = unlimited)
    #[arg(short = 'r', long = "rate", default_value = "0")]
    pub rate_limit: u32,
}

impl SweepArgs {
    /// Build the sweep configuration, falling back to settings defaults.
    pub fn to_config(&self, settings: &AppSettings, progress: bool) -> SweepConfig {
        let config = SweepConfig::new()
            .with_timeout_secs(self.timeout.unwrap_or(settings.default_timeout_secs))
            .with_attempts(self.count.unwrap_or(settings.default_attempts))
            .with_concurrency(self.workers.unwrap_or(settings.default_workers))
            .with_rate_limit(self.rate_limit);

        if progress {
            config.with_progress()
        } else {
            config
        }
    }
}

/// Export arguments shared by both subcommands.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export results to this file
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Export format
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,
}

impl ExportArgs {
    /// The effective format: the flag, else the settings default.
    pub fn effective_format(&self, settings: &AppSettings) -> ExportFormat {
        self.format
            .or_else(|| settings.default_format.parse().ok())
            .unwrap_or_default()
    }
}

/// Load settings from an explicit path or the default location.
pub(crate) fn load_settings(config: Option<&std::path::Path>) -> CliResult<AppSettings> {
    let settings = match config {
        Some(path) => AppSettings::load_from(path)?,
        None => AppSettings::load()?,
    };
    Ok(settings)
}

/// Fail when resolution produced nothing to probe.
pub(crate) fn require_targets(resolution: &Resolution) -> CliResult<()> {
    if resolution.is_empty() {
        return Err(CliError::Other(
            "no valid targets resolved; see 'sounder probe --help' for target syntax".to_string(),
        ));
    }
    Ok(())
}
