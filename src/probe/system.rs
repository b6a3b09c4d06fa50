//! System `ping` probe primitive.
//!
//! Spawns the operating system's ping utility and parses its free-text
//! output. Needs no elevated privileges; raw ICMP handling is the
//! utility's problem.

use crate::error::{PrimitiveResult, ProbeError};
use crate::probe::traits::{PingOutput, ProbePrimitive};
use async_trait::async_trait;
use std::net::IpAddr;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Probe primitive backed by the OS `ping` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPing;

impl SystemPing {
    /// Create a new system ping primitive.
    pub fn new() -> Self {
        Self
    }

    /// Build the platform-specific argument list.
    ///
    /// Windows takes the timeout in milliseconds (`-w`), Unix in seconds
    /// (`-W`); the conversion lives here so callers reason in seconds only.
    fn command_args(address: IpAddr, attempts: u32, timeout_secs: u64) -> Vec<String> {
        #[cfg(windows)]
        {
            vec![
                "-n".to_string(),
                attempts.to_string(),
                "-w".to_string(),
                (timeout_secs * 1000).to_string(),
                address.to_string(),
            ]
        }
        #[cfg(not(windows))]
        {
            vec![
                "-c".to_string(),
                attempts.to_string(),
                "-W".to_string(),
                timeout_secs.to_string(),
                address.to_string(),
            ]
        }
    }
}

#[async_trait]
impl ProbePrimitive for SystemPing {
    async fn execute(
        &self,
        address: IpAddr,
        attempts: u32,
        timeout_secs: u64,
    ) -> PrimitiveResult<PingOutput> {
        let args = Self::command_args(address, attempts.max(1), timeout_secs);
        debug!("ping {}", args.join(" "));

        let output = Command::new("ping")
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProbeError::Spawn(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let reachable = output.status.success();
        let round_trip_ms = if reachable {
            parse_round_trip(&stdout)
        } else {
            None
        };

        Ok(PingOutput {
            reachable,
            round_trip_ms,
            stdout,
            stderr,
        })
    }
}

/// Extract a round-trip time in milliseconds from ping output.
///
/// Handles the Unix `time=0.045 ms` form and the Windows `time=4ms` /
/// `time<1ms` forms.
fn parse_round_trip(stdout: &str) -> Option<f64> {
    for line in stdout.lines() {
        let idx = match line.find("time=").or_else(|| line.find("time<")) {
            Some(idx) => idx,
            None => continue,
        };
        let number: String = line[idx + 5..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if let Ok(ms) = number.parse::<f64>() {
            return Some(ms);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unix_output() {
        let stdout = "PING 10.0.0.1 (10.0.0.1) 56(84) bytes of data.\n\
                      64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=0.045 ms\n\
                      \n\
                      --- 10.0.0.1 ping statistics ---\n";
        assert_eq!(parse_round_trip(stdout), Some(0.045));
    }

    #[test]
    fn test_parse_windows_output() {
        let stdout = "Pinging 10.0.0.1 with 32 bytes of data:\r\n\
                      Reply from 10.0.0.1: bytes=32 time=4ms TTL=128\r\n";
        assert_eq!(parse_round_trip(stdout), Some(4.0));
    }

    #[test]
    fn test_parse_windows_sub_millisecond() {
        let stdout = "Reply from 10.0.0.1: bytes=32 time<1ms TTL=128\r\n";
        assert_eq!(parse_round_trip(stdout), Some(1.0));
    }

    #[test]
    fn test_parse_no_time() {
        assert_eq!(parse_round_trip("Request timed out.\n"), None);
        assert_eq!(parse_round_trip(""), None);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_unix_command_args() {
        let args = SystemPing::command_args("10.0.0.1".parse().unwrap(), 2, 3);
        assert_eq!(args, vec!["-c", "2", "-W", "3", "10.0.0.1"]);
    }
}
