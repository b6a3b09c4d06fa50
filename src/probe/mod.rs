//! Probe execution and concurrent dispatch.
//!
//! This module wraps a [`ProbePrimitive`] with a wall-clock watchdog,
//! fans a target set out across a bounded pool of concurrent probes, and
//! collects the outcomes into a per-cycle [`Snapshot`].

pub mod rate_limiter;
pub mod system;
pub mod traits;

use crate::probe::rate_limiter::RateLimiter;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::debug;

pub use system::SystemPing;
pub use traits::{PingOutput, ProbePrimitive, ProbeResult, ProbeStatus, SharedPrimitive};

/// Wall-clock margin added on top of the protocol timeout before the
/// external call is declared hung. This is a watchdog over the external
/// call, not the protocol-level timeout handed to the primitive.
pub const WATCHDOG_GRACE: Duration = Duration::from_secs(5);

/// Default number of concurrent probes.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Default protocol-level probe timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

/// Default echo requests per probe.
pub const DEFAULT_ATTEMPTS: u32 = 1;

/// Execute one probe under a watchdog.
///
/// This is the error-containment boundary for a single target: every
/// outcome, including a hung or unspawnable primitive, is folded into a
/// [`ProbeResult`]. This function never fails.
pub async fn probe_host(
    primitive: &dyn ProbePrimitive,
    address: IpAddr,
    timeout_secs: u64,
    attempts: u32,
) -> ProbeResult {
    let cutoff = Duration::from_secs(timeout_secs) + WATCHDOG_GRACE;
    let start = Instant::now();

    match tokio::time::timeout(cutoff, primitive.execute(address, attempts, timeout_secs)).await {
        Ok(Ok(output)) if output.reachable => {
            // Prefer the RTT the primitive parsed from its own output;
            // the wall-clock duration is only an approximation.
            let rtt = output
                .round_trip_ms
                .unwrap_or_else(|| start.elapsed().as_secs_f64() * 1000.0);
            let detail = Some(output.stdout.trim().to_string()).filter(|s| !s.is_empty());
            ProbeResult::new(address, ProbeStatus::Online)
                .with_response_time(rtt)
                .with_detail(detail)
        }
        Ok(Ok(output)) => {
            let stderr = output.stderr.trim();
            let detail = if stderr.is_empty() {
                "host unreachable".to_string()
            } else {
                stderr.to_string()
            };
            ProbeResult::new(address, ProbeStatus::Offline).with_detail(Some(detail))
        }
        Ok(Err(e)) => ProbeResult::new(address, ProbeStatus::Error).with_detail(Some(e.to_string())),
        Err(_) => {
            debug!("watchdog expired for {}", address);
            ProbeResult::new(address, ProbeStatus::Timeout).with_detail(Some(format!(
                "probe exceeded {}s watchdog cutoff",
                cutoff.as_secs()
            )))
        }
    }
}

/// Configuration for one dispatch cycle.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Protocol-level probe timeout in seconds.
    pub timeout_secs: u64,
    /// Echo requests per probe.
    pub attempts: u32,
    /// Maximum number of concurrent probes.
    pub concurrency: usize,
    /// Probe launches per second, 0 for unlimited.
    pub rate_limit: u32,
    /// Render a progress bar while the sweep runs.
    pub progress: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            attempts: DEFAULT_ATTEMPTS,
            concurrency: DEFAULT_CONCURRENCY,
            rate_limit: 0,
            progress: false,
        }
    }
}

impl SweepConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the probe timeout in seconds.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the echo request count per probe.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Set the maximum number of concurrent probes.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the probe launch rate limit.
    pub fn with_rate_limit(mut self, rate_limit: u32) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Enable the progress bar.
    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }
}

/// All probe results for one dispatch cycle, keyed by address.
///
/// Built fresh each cycle and immutable afterwards; the previous cycle's
/// snapshot is simply dropped unless the caller exported it. The
/// `BTreeMap` keeps addresses in numeric order for rendering and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the sweep started.
    pub started_at: DateTime<Utc>,
    /// Total sweep duration in milliseconds.
    pub duration_ms: u64,
    /// Exactly one result per requested target.
    pub results: BTreeMap<IpAddr, ProbeResult>,
}

impl Snapshot {
    /// Assemble a snapshot from collected results.
    ///
    /// Guarantees one entry per requested target: a target whose probe
    /// future produced nothing gets a synthetic error result.
    fn assemble(
        targets: &BTreeSet<IpAddr>,
        collected: Vec<ProbeResult>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        let mut results: BTreeMap<IpAddr, ProbeResult> =
            collected.into_iter().map(|r| (r.address, r)).collect();

        for &address in targets {
            results.entry(address).or_insert_with(|| {
                ProbeResult::new(address, ProbeStatus::Error)
                    .with_detail(Some("probe produced no result".to_string()))
            });
        }

        Self {
            started_at,
            duration_ms,
            results,
        }
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Look up the result for an address.
    pub fn get(&self, address: &IpAddr) -> Option<&ProbeResult> {
        self.results.get(address)
    }

    /// Count of hosts that answered.
    pub fn online_count(&self) -> usize {
        self.count_status(ProbeStatus::Online)
    }

    /// Count of hosts that did not answer.
    pub fn offline_count(&self) -> usize {
        self.count_status(ProbeStatus::Offline)
    }

    /// Combined count of timed-out and errored probes.
    pub fn failure_count(&self) -> usize {
        self.count_status(ProbeStatus::Timeout) + self.count_status(ProbeStatus::Error)
    }

    /// One-line summary of the cycle.
    pub fn summary(&self) -> String {
        format!(
            "{} online, {} offline, {} errors/timeouts",
            self.online_count(),
            self.offline_count(),
            self.failure_count()
        )
    }

    fn count_status(&self, status: ProbeStatus) -> usize {
        self.results.values().filter(|r| r.status == status).count()
    }
}

/// Probe every target concurrently and collect a snapshot.
///
/// Up to `config.concurrency` probes run at once; all targets are
/// submitted up front and results are collected as they complete, in no
/// particular order. The snapshot contains exactly one result per target
/// regardless of individual probe failures.
pub async fn run_sweep(
    primitive: SharedPrimitive,
    targets: &BTreeSet<IpAddr>,
    config: &SweepConfig,
) -> Snapshot {
    let started_at = Utc::now();
    let start = Instant::now();

    let progress = if config.progress {
        let pb = ProgressBar::new(targets.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let limiter = (config.rate_limit > 0).then(|| RateLimiter::new(config.rate_limit));

    let collected: Vec<ProbeResult> = stream::iter(targets.iter().copied())
        .map(|address| {
            let primitive = Arc::clone(&primitive);
            let sem = Arc::clone(&semaphore);
            let limiter = limiter.clone();
            let progress = progress.clone();
            let timeout_secs = config.timeout_secs;
            let attempts = config.attempts;

            async move {
                // Acquire semaphore permit
                let _permit = sem.acquire().await.unwrap();

                if let Some(ref limiter) = limiter {
                    limiter.wait().await;
                }

                let result = probe_host(primitive.as_ref(), address, timeout_secs, attempts).await;

                if let Some(ref pb) = progress {
                    pb.inc(1);
                    if result.is_online() {
                        pb.set_message(format!("{} online", address));
                    }
                }

                result
            }
        })
        .buffer_unordered(1000) // Allow high buffering, semaphore controls actual concurrency
        .collect()
        .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Snapshot::assemble(
        targets,
        collected,
        started_at,
        start.elapsed().as_millis() as u64,
    )
}
