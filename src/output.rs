//! Output formatting for probe snapshots.
//!
//! Renders a snapshot as a table in numeric address order with a trailing
//! summary line, plus the styled terminal helpers used by the CLI.

use crate::probe::{ProbeResult, ProbeStatus, Snapshot};
use chrono::{DateTime, Utc};
use console::{style, Style};
use std::io::{self, Write};

/// Render a snapshot as a plain table.
///
/// One row per target, sorted by the numeric value of the address, with
/// columns ADDRESS / STATUS / RESPONSE TIME / TIMESTAMP and a summary
/// line of online, offline and errors/timeouts counts.
pub fn render_table(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<39} {:<10} {:<15} {:<20}\n",
        "ADDRESS", "STATUS", "RESPONSE TIME", "TIMESTAMP"
    ));
    out.push_str(&format!("{}\n", "-".repeat(86)));

    for result in snapshot.results.values() {
        out.push_str(&format!(
            "{:<39} {:<10} {:<15} {:<20}\n",
            result.address,
            result.status.to_string().to_uppercase(),
            response_time_display(result),
            format_timestamp(&result.timestamp),
        ));
    }

    out.push_str(&format!("\nSummary: {}\n", snapshot.summary()));
    out
}

/// Print a snapshot to stdout with status colouring.
///
/// With `show_details`, failed rows get their diagnostic text on an
/// indented line underneath.
pub fn print_snapshot(snapshot: &Snapshot, show_details: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if snapshot.is_empty() {
        writeln!(out, "  {}", style("No results to display.").dim())?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {:<39} {:<12} {:<15} {}",
        style("ADDRESS").bold(),
        style("STATUS").bold(),
        style("RESPONSE TIME").bold(),
        style("TIMESTAMP").bold()
    )?;
    writeln!(out, "  {}", style("-".repeat(86)).dim())?;

    for result in snapshot.results.values() {
        let (marker, status_style) = match result.status {
            ProbeStatus::Online => ("✓", Style::new().green().bold()),
            ProbeStatus::Offline => ("✗", Style::new().red()),
            ProbeStatus::Timeout | ProbeStatus::Error => ("⚠", Style::new().yellow()),
        };
        let status_display = format!("{} {}", marker, result.status.to_string().to_uppercase());

        writeln!(
            out,
            "  {:<39} {:<12} {:<15} {}",
            result.address,
            status_style.apply_to(status_display),
            response_time_display(result),
            format_timestamp(&result.timestamp),
        )?;

        if show_details && !result.is_online() {
            if let Some(ref detail) = result.detail {
                writeln!(out, "      {}", style(detail).dim())?;
            }
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "  Summary: {} online, {} offline, {} errors/timeouts",
        style(snapshot.online_count()).green().bold(),
        style(snapshot.offline_count()).red(),
        style(snapshot.failure_count()).yellow()
    )?;
    writeln!(out)?;

    Ok(())
}

/// Print a header before a one-shot sweep begins.
pub fn print_sweep_header(target_count: usize, timeout_secs: u64, workers: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("Sounder").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Probing {} addresses ({}s timeout, {} workers)...",
        style("•").dim(),
        style(target_count).white().bold(),
        timeout_secs,
        workers
    );
}

/// Print a monitoring cycle header.
pub fn print_cycle_header(cycle: u64, started_at: &DateTime<Utc>) {
    println!();
    println!(
        "{}",
        style(format!(
            "=== Monitoring Cycle {} - {} ===",
            cycle,
            started_at.format("%Y-%m-%d %H:%M:%S")
        ))
        .cyan()
        .bold()
    );
}

fn response_time_display(result: &ProbeResult) -> String {
    result
        .response_time_ms
        .map(|t| format!("{:.2}ms", t))
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an informational message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("•").dim(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn snapshot() -> Snapshot {
        let results: Vec<ProbeResult> = vec![
            ProbeResult::new("10.0.0.10".parse().unwrap(), ProbeStatus::Online)
                .with_response_time(12.3),
            ProbeResult::new("10.0.0.2".parse().unwrap(), ProbeStatus::Offline),
        ];
        Snapshot {
            started_at: Utc::now(),
            duration_ms: 42,
            results: results.into_iter().map(|r| (r.address, r)).collect(),
        }
    }

    #[test]
    fn test_render_orders_numerically() {
        let table = render_table(&snapshot());

        let pos_2 = table.find("10.0.0.2 ").unwrap();
        let pos_10 = table.find("10.0.0.10").unwrap();
        assert!(pos_2 < pos_10, "10.0.0.2 must sort before 10.0.0.10");
    }

    #[test]
    fn test_render_summary_line() {
        let table = render_table(&snapshot());
        assert!(table.contains("Summary: 1 online, 1 offline, 0 errors/timeouts"));
    }

    #[test]
    fn test_render_response_time_or_na() {
        let table = render_table(&snapshot());
        assert!(table.contains("12.30ms"));
        assert!(table.contains("N/A"));
    }

    #[test]
    fn test_render_one_row_per_target() {
        let table = render_table(&snapshot());
        let rows = table
            .lines()
            .filter(|l| l.starts_with("10.0.0."))
            .count();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_empty_snapshot_render() {
        let empty = Snapshot {
            started_at: Utc::now(),
            duration_ms: 0,
            results: BTreeMap::new(),
        };
        let table = render_table(&empty);
        assert!(table.contains("Summary: 0 online, 0 offline, 0 errors/timeouts"));
    }
}
