//! Probe primitive abstraction.
//!
//! Defines the capability interface between the probe executor and the
//! OS-level liveness mechanism. Platform-specific argument mapping and
//! output parsing stay inside the primitive implementation, so the
//! executor only ever sees a structured outcome.

use crate::error::PrimitiveResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

/// Outcome classification for one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// The host answered within the timeout.
    Online,
    /// The primitive completed but the host did not answer.
    Offline,
    /// The watchdog cut the external call off.
    Timeout,
    /// The probe could not be executed at all.
    Error,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
            Self::Timeout => write!(f, "timeout"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for ProbeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "timeout" => Ok(Self::Timeout),
            "error" => Ok(Self::Error),
            _ => Err(format!("unknown probe status: {}", s)),
        }
    }
}

/// Result of probing a single address.
///
/// Created exactly once per probe attempt and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The probed address.
    pub address: IpAddr,
    /// Outcome classification.
    pub status: ProbeStatus,
    /// Round-trip time in milliseconds, present only for online hosts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    /// When the probe completed.
    pub timestamp: DateTime<Utc>,
    /// Raw probe output on success, diagnostic text on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProbeResult {
    /// Create a new probe result stamped with the current time.
    pub fn new(address: IpAddr, status: ProbeStatus) -> Self {
        Self {
            address,
            status,
            response_time_ms: None,
            timestamp: Utc::now(),
            detail: None,
        }
    }

    /// Set the round-trip time.
    pub fn with_response_time(mut self, ms: f64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    /// Set the diagnostic detail.
    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    /// Check if the host answered.
    pub fn is_online(&self) -> bool {
        matches!(self.status, ProbeStatus::Online)
    }
}

/// Raw outcome reported by a probe primitive.
#[derive(Debug, Clone, Default)]
pub struct PingOutput {
    /// Whether the primitive reported the host reachable.
    pub reachable: bool,
    /// Round-trip time the primitive parsed from its own output, if any.
    pub round_trip_ms: Option<f64>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Capability interface over the OS-level probe mechanism.
///
/// Implementations own all platform-specific concerns: argument mapping,
/// timeout unit conversion, and free-text output parsing. This keeps the
/// executor's logic platform-independent and makes dispatch and
/// monitoring testable with a scripted primitive.
#[async_trait]
pub trait ProbePrimitive: Send + Sync {
    /// Issue one probe against `address`.
    ///
    /// `timeout_secs` is the protocol-level timeout; the executor wraps
    /// the call in its own wall-clock watchdog on top of it.
    async fn execute(
        &self,
        address: IpAddr,
        attempts: u32,
        timeout_secs: u64,
    ) -> PrimitiveResult<PingOutput>;
}

/// A shared primitive for concurrent dispatch.
pub type SharedPrimitive = Arc<dyn ProbePrimitive>;
