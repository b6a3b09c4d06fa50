//! Monitor subcommand implementation.
//!
//! Handles the `sounder monitor <targets>` command: repeated sweeps on a
//! fixed interval until the duration elapses or Ctrl-C fires. Only the
//! most recent cycle's snapshot is kept for export.

use crate::cli::{load_settings, require_targets, ExportArgs, SweepArgs, TargetArgs};
use crate::error::CliResult;
use crate::export;
use crate::monitor::{cancellation, Monitor, MonitorConfig, MonitorState};
use crate::output;
use crate::probe::{Snapshot, SystemPing};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Monitor targets continuously.
#[derive(Parser, Debug)]
pub struct MonitorCommand {
    #[command(flatten)]
    pub targets: TargetArgs,

    #[command(flatten)]
    pub sweep: SweepArgs,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Seconds between cycle starts
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Total monitoring duration in seconds (runs until Ctrl-C if unset)
    #[arg(short = 'd', long)]
    pub duration: Option<u64>,
}

impl MonitorCommand {
    /// Execute the monitor command.
    pub async fn execute(&self, verbose: bool, quiet: bool, config: Option<&Path>) -> CliResult<()> {
        let settings = load_settings(config)?;

        let resolution = self.targets.resolve()?;
        for rejected in resolution.rejected() {
            output::print_warning(&rejected.to_string());
        }
        require_targets(&resolution)?;

        let interval = self.interval.unwrap_or(settings.default_interval_secs);
        let mut monitor_config = MonitorConfig::new(Duration::from_secs(interval));
        if let Some(duration) = self.duration {
            monitor_config = monitor_config.with_duration(Duration::from_secs(duration));
        }

        if !quiet {
            output::print_info(&format!(
                "Monitoring {} addresses every {}s{}",
                resolution.len(),
                interval,
                self.duration
                    .map(|d| format!(" for {}s", d))
                    .unwrap_or_default()
            ));
            output::print_info("Press Ctrl-C to stop after the current cycle");
        }

        // Signal registration stays in this adapter; the scheduler only
        // sees the cancellation channel.
        let (handle, signal) = cancellation();
        let ctrl_handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_handle.cancel();
            }
        });

        let sweep_config = self.sweep.to_config(&settings, false);
        let monitor = Monitor::new(Arc::new(SystemPing::new()), sweep_config, monitor_config);

        let mut latest: Option<Snapshot> = None;
        let session = monitor
            .run(resolution.targets(), signal, |cycle, snapshot| {
                output::print_cycle_header(cycle, &snapshot.started_at);
                if output::print_snapshot(snapshot, verbose).is_err() {
                    output::print_warning("failed to render cycle results");
                }
                latest = Some(snapshot.clone());
            })
            .await;

        if !quiet {
            match session.state {
                MonitorState::Cancelled => output::print_info(&format!(
                    "Monitoring stopped by user after {} cycles",
                    session.cycles_completed
                )),
                _ => output::print_info(&format!(
                    "Monitoring completed after {} cycles",
                    session.cycles_completed
                )),
            }
        }

        if let (Some(path), Some(snapshot)) = (self.export.output.as_ref(), latest.as_ref()) {
            let format = self.export.effective_format(&settings);
            export::export_to_file(snapshot, path, format)?;
            if !quiet {
                output::print_success(&format!(
                    "Exported final cycle to {}",
                    path.display()
                ));
            }
        }

        Ok(())
    }
}
