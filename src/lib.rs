//! # Sounder - A Concurrent Network Reachability Prober
//!
//! Sounder checks which hosts on a network are alive. It expands literal
//! addresses, CIDR ranges and address files into a deduplicated target
//! set, probes every target concurrently through the operating system's
//! ping utility, and reports per-host outcomes with timing data.
//!
//! ## Features
//!
//! - **Flexible Targeting**: literal IPv4/IPv6 addresses, CIDR ranges,
//!   and newline-delimited address files, deduplicated across sources
//! - **Bounded Concurrency**: async fan-out with a configurable worker
//!   limit and optional launch rate limiting
//! - **Contained Failures**: every probe yields a result; a hung or
//!   unspawnable probe becomes a timeout/error row, never a crash
//! - **Continuous Monitoring**: repeated sweeps on a fixed interval,
//!   bounded by duration or stopped via a cancellation channel
//! - **Multiple Output Formats**: styled terminal tables, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use sounder::probe::{run_sweep, SweepConfig, SystemPing};
//! use sounder::types::Resolution;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut resolution = Resolution::new();
//!     resolution.add_cidr("192.168.1.0/24");
//!
//!     let snapshot = run_sweep(
//!         Arc::new(SystemPing::new()),
//!         resolution.targets(),
//!         &SweepConfig::default(),
//!     )
//!     .await;
//!
//!     println!("{}", snapshot.summary());
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`types`] - Target specification parsing and resolution
//! - [`probe`] - The `ProbePrimitive` trait, executor watchdog, and
//!   concurrent dispatcher
//! - [`monitor`] - The interval scheduler and its cancellation channel
//! - [`output`] - Table rendering and styled terminal output
//! - [`export`] - JSON/CSV snapshot export and CSV re-import
//! - [`config`] - Persisted default settings
//! - [`error`] - Comprehensive error types

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod monitor;
pub mod output;
pub mod probe;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, ExportError, ProbeError, ResolveError};
pub use export::ExportFormat;
pub use monitor::{cancellation, CancelHandle, CancelSignal, Monitor, MonitorConfig, MonitorSession, MonitorState};
pub use probe::{
    probe_host, run_sweep, PingOutput, ProbePrimitive, ProbeResult, ProbeStatus, SharedPrimitive,
    Snapshot, SweepConfig, SystemPing,
};
pub use types::{Rejected, Resolution, TargetSpec};
