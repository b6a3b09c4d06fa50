//! Error types for Sounder.
//!
//! Uses `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving target specifications.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("failed to read address file {path}: {reason}")]
    FileRead { path: PathBuf, reason: String },
}

/// Errors raised while invoking the external probe primitive.
///
/// These never escape the probe executor; `probe_host` folds them into a
/// `ProbeResult` with `ProbeStatus::Error`.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to spawn probe process: {0}")]
    Spawn(String),

    #[error("probe produced undecodable output: {0}")]
    InvalidOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while exporting or re-importing a snapshot.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write to sink: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid record in import: {0}")]
    InvalidRecord(String),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidFormat(e.to_string())
    }
}

/// Top-level error type for CLI command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type alias for primitive invocations.
pub type PrimitiveResult<T> = Result<T, ProbeError>;

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for CLI command handlers.
pub type CliResult<T> = Result<T, CliError>;
