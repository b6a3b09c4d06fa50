//! Probe subcommand implementation.
//!
//! Handles the `sounder probe <targets>` command: one sweep, one report,
//! optional export.

use crate::cli::{load_settings, require_targets, ExportArgs, SweepArgs, TargetArgs};
use crate::error::CliResult;
use crate::export;
use crate::output;
use crate::probe::{run_sweep, SystemPing};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

/// Probe targets once and report their reachability.
#[derive(Parser, Debug)]
pub struct ProbeCommand {
    #[command(flatten)]
    pub targets: TargetArgs,

    #[command(flatten)]
    pub sweep: SweepArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

impl ProbeCommand {
    /// Execute the probe command.
    pub async fn execute(&self, verbose: bool, quiet: bool, config: Option<&Path>) -> CliResult<()> {
        let settings = load_settings(config)?;

        let resolution = self.targets.resolve()?;
        for rejected in resolution.rejected() {
            output::print_warning(&rejected.to_string());
        }
        require_targets(&resolution)?;

        let sweep_config = self.sweep.to_config(&settings, verbose && !quiet);

        if !quiet {
            output::print_sweep_header(
                resolution.len(),
                sweep_config.timeout_secs,
                sweep_config.concurrency,
            );
        }

        let primitive = Arc::new(SystemPing::new());
        let snapshot = run_sweep(primitive, resolution.targets(), &sweep_config).await;

        output::print_snapshot(&snapshot, verbose)?;

        if let Some(ref path) = self.export.output {
            let format = self.export.effective_format(&settings);
            export::export_to_file(&snapshot, path, format)?;
            if !quiet {
                output::print_success(&format!(
                    "Exported {} results to {}",
                    snapshot.len(),
                    path.display()
                ));
            }
        }

        Ok(())
    }
}
