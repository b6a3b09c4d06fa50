//! Continuous monitoring scheduler.
//!
//! Repeats dispatch-and-report cycles at a fixed interval until the
//! configured duration elapses or the session is cancelled. Cancellation
//! is a channel, not a process signal, and only takes effect at the
//! sleep boundary between cycles: an in-flight cycle always finishes, so
//! a half-built snapshot is never surfaced.

use crate::probe::{run_sweep, SharedPrimitive, Snapshot, SweepConfig};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

/// Default seconds between cycle starts.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Lifecycle of a monitor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Not started yet.
    Idle,
    /// Cycles are being dispatched.
    Running,
    /// The configured duration elapsed.
    Completed,
    /// The cancellation channel fired.
    Cancelled,
}

impl MonitorState {
    /// Whether the session has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Triggering side of the cancellation channel.
///
/// The host wires this to whatever it likes (typically Ctrl-C); the
/// scheduler itself never registers signal handlers.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Receiving side of the cancellation channel.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Resolves once cancellation has been requested.
    ///
    /// Parks forever if the handle is dropped without firing, so a
    /// discarded handle never cancels a session.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Check without waiting.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Create a linked cancellation handle/signal pair.
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Timing bounds for a monitor session.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Gap between cycle starts.
    pub interval: Duration,
    /// Total monitoring duration; `None` runs until cancelled.
    pub duration: Option<Duration>,
}

impl MonitorConfig {
    /// Create a configuration with the given interval and no duration bound.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            duration: None,
        }
    }

    /// Bound the session to a total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_INTERVAL_SECS))
    }
}

/// Report for a finished monitor session.
#[derive(Debug, Clone)]
pub struct MonitorSession {
    /// Terminal state (`Completed` or `Cancelled`).
    pub state: MonitorState,
    /// Number of fully completed cycles.
    pub cycles_completed: u64,
    /// When the session started.
    pub started_at: DateTime<Utc>,
}

/// The monitoring scheduler.
///
/// State machine: `Idle -> Running -> {Completed, Cancelled}`. A cycle
/// always runs to completion before the next one starts; there are never
/// two cycles in flight.
pub struct Monitor {
    primitive: SharedPrimitive,
    sweep: SweepConfig,
    config: MonitorConfig,
}

impl Monitor {
    /// Create a new monitor.
    pub fn new(primitive: SharedPrimitive, sweep: SweepConfig, config: MonitorConfig) -> Self {
        Self {
            primitive,
            sweep,
            config,
        }
    }

    /// Run dispatch-and-report cycles until the duration elapses or the
    /// signal fires.
    ///
    /// Each completed cycle's snapshot is handed to `on_cycle` before the
    /// inter-cycle sleep; the snapshot is dropped afterwards, so the
    /// callback is the place to render or export it. The sleep absorbs
    /// the cycle's own dispatch time (`max(0, interval - elapsed)`), so a
    /// slow cycle does not push later cycles off their boundaries.
    pub async fn run<F>(
        &self,
        targets: &BTreeSet<IpAddr>,
        mut signal: CancelSignal,
        mut on_cycle: F,
    ) -> MonitorSession
    where
        F: FnMut(u64, &Snapshot),
    {
        let started = Instant::now();
        let mut session = MonitorSession {
            state: MonitorState::Idle,
            cycles_completed: 0,
            started_at: Utc::now(),
        };

        debug!(
            "monitor {} -> running, {} targets",
            session.state,
            targets.len()
        );
        session.state = MonitorState::Running;

        loop {
            let cycle_start = Instant::now();
            let snapshot = run_sweep(Arc::clone(&self.primitive), targets, &self.sweep).await;
            session.cycles_completed += 1;
            on_cycle(session.cycles_completed, &snapshot);

            let sleep_for = self.config.interval.saturating_sub(cycle_start.elapsed());

            if let Some(limit) = self.config.duration {
                // The duration check runs between cycles, never mid-cycle:
                // stop once the next cycle would begin at or past the limit.
                if started.elapsed() + sleep_for >= limit {
                    info!(
                        "monitoring completed after {} cycles",
                        session.cycles_completed
                    );
                    session.state = MonitorState::Completed;
                    break;
                }
            }

            tokio::select! {
                _ = signal.cancelled() => {
                    info!("monitoring cancelled after {} cycles", session.cycles_completed);
                    session.state = MonitorState::Cancelled;
                    break;
                }
                _ = tokio::time::sleep(sleep_for) => {}
            }
        }

        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrimitiveResult;
    use crate::probe::{PingOutput, ProbePrimitive};
    use async_trait::async_trait;

    /// Primitive that reports every host online instantly.
    struct AlwaysOnline;

    #[async_trait]
    impl ProbePrimitive for AlwaysOnline {
        async fn execute(
            &self,
            _address: IpAddr,
            _attempts: u32,
            _timeout_secs: u64,
        ) -> PrimitiveResult<PingOutput> {
            Ok(PingOutput {
                reachable: true,
                round_trip_ms: Some(0.1),
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    fn targets() -> BTreeSet<IpAddr> {
        ["10.0.0.1", "10.0.0.2"]
            .iter()
            .map(|a| a.parse().unwrap())
            .collect()
    }

    fn monitor(config: MonitorConfig) -> Monitor {
        Monitor::new(Arc::new(AlwaysOnline), SweepConfig::default(), config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_bounds_cycle_count() {
        let config = MonitorConfig::new(Duration::from_secs(10))
            .with_duration(Duration::from_secs(25));
        let (_handle, signal) = cancellation();

        let mut seen = Vec::new();
        let session = monitor(config)
            .run(&targets(), signal, |cycle, snapshot| {
                seen.push((cycle, snapshot.len()));
            })
            .await;

        assert_eq!(session.state, MonitorState::Completed);
        assert_eq!(session.cycles_completed, 3);
        assert_eq!(seen, vec![(1, 2), (2, 2), (3, 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_cycle_starts_at_duration_boundary() {
        // Cycle 4 would begin exactly at the 30s limit, so it never runs.
        let config = MonitorConfig::new(Duration::from_secs(10))
            .with_duration(Duration::from_secs(30));
        let (_handle, signal) = cancellation();

        let session = monitor(config).run(&targets(), signal, |_, _| {}).await;

        assert_eq!(session.state, MonitorState::Completed);
        assert_eq!(session.cycles_completed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_finishes_in_flight_cycle() {
        let config = MonitorConfig::new(Duration::from_secs(10));
        let (handle, signal) = cancellation();

        let session = monitor(config)
            .run(&targets(), signal, |cycle, _| {
                if cycle == 2 {
                    handle.cancel();
                }
            })
            .await;

        assert_eq!(session.state, MonitorState::Cancelled);
        assert_eq!(session.cycles_completed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_does_not_cancel() {
        let config = MonitorConfig::new(Duration::from_secs(10))
            .with_duration(Duration::from_secs(15));
        let (handle, signal) = cancellation();
        drop(handle);

        let session = monitor(config).run(&targets(), signal, |_, _| {}).await;

        assert_eq!(session.state, MonitorState::Completed);
        assert_eq!(session.cycles_completed, 2);
    }

    #[test]
    fn test_state_machine_terminals() {
        assert!(!MonitorState::Idle.is_terminal());
        assert!(!MonitorState::Running.is_terminal());
        assert!(MonitorState::Completed.is_terminal());
        assert!(MonitorState::Cancelled.is_terminal());
        assert_eq!(MonitorState::Cancelled.to_string(), "cancelled");
    }
}
