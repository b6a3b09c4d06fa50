//! Target specification and resolution.
//!
//! Expands user-supplied inputs into a deduplicated set of probe targets:
//! - Single IP addresses (IPv4 and IPv6)
//! - CIDR notation (192.168.1.0/24)
//! - Address files (one address per line)

use crate::error::{ResolveError, ResolveResult};
use ipnetwork::IpNetwork;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// A parsed target specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// A single IP address.
    Single(IpAddr),
    /// A CIDR network range.
    Cidr(IpNetwork),
}

impl TargetSpec {
    /// Usable host count above which expansion records a size warning.
    pub const LARGE_RANGE_WARN: usize = 254;

    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> ResolveResult<Self> {
        let s = s.trim();

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if s.contains('/') {
            let network: IpNetwork = s
                .parse()
                .map_err(|_| ResolveError::InvalidCidr(s.to_string()))?;
            return Ok(Self::Cidr(network));
        }

        Err(ResolveError::InvalidAddress(s.to_string()))
    }

    /// Expand this specification to concrete addresses.
    ///
    /// CIDR ranges yield every usable host; the IPv4 network and broadcast
    /// addresses are excluded for prefixes shorter than /31.
    pub fn expand(&self) -> Vec<IpAddr> {
        match self {
            Self::Single(ip) => vec![*ip],
            Self::Cidr(network) => network
                .iter()
                .filter(|ip| {
                    if let (IpNetwork::V4(net), IpAddr::V4(addr)) = (network, ip) {
                        if net.prefix() < 31 {
                            return *addr != net.network() && *addr != net.broadcast();
                        }
                    }
                    true
                })
                .collect(),
        }
    }
}

impl FromStr for TargetSpec {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Cidr(network) => write!(f, "{}", network),
        }
    }
}

/// An input string rejected during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// The raw input as supplied.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.input, self.reason)
    }
}

/// Accumulated outcome of resolving all target sources.
///
/// Addresses are deduplicated across sources and kept in numeric order.
/// Rejections are non-fatal and reported alongside the resolved set; only
/// an unreadable address file aborts its source.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    targets: BTreeSet<IpAddr>,
    rejected: Vec<Rejected>,
    warnings: Vec<String>,
}

impl Resolution {
    /// Create an empty resolution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add literal address strings.
    ///
    /// Invalid entries are rejected and resolution continues with the rest.
    pub fn add_literals<I, S>(&mut self, inputs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in inputs {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            match raw.parse::<IpAddr>() {
                Ok(ip) => {
                    self.targets.insert(ip);
                }
                Err(_) => self.reject(raw, "not a valid IPv4/IPv6 address"),
            }
        }
    }

    /// Expand a CIDR range into the target set.
    ///
    /// An invalid range is rejected with an empty expansion and does not
    /// affect other inputs. Ranges above [`TargetSpec::LARGE_RANGE_WARN`]
    /// usable hosts record a size warning but still expand fully.
    pub fn add_cidr(&mut self, raw: &str) {
        match TargetSpec::parse(raw) {
            Ok(spec) => {
                let hosts = spec.expand();
                if hosts.len() > TargetSpec::LARGE_RANGE_WARN {
                    let msg = format!(
                        "range {} expands to {} hosts, this may take a while",
                        raw.trim(),
                        hosts.len()
                    );
                    warn!("{}", msg);
                    self.warnings.push(msg);
                }
                self.targets.extend(hosts);
            }
            Err(e) => self.reject(raw, &e.to_string()),
        }
    }

    /// Read newline-delimited addresses from a file.
    ///
    /// Blank lines and invalid addresses are skipped. A missing or
    /// unreadable file is fatal for this source only; returns the number
    /// of addresses read on success.
    pub fn add_file(&mut self, path: &Path) -> ResolveResult<usize> {
        let content = fs::read_to_string(path).map_err(|e| ResolveError::FileRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut loaded = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<IpAddr>() {
                Ok(ip) => {
                    self.targets.insert(ip);
                    loaded += 1;
                }
                Err(_) => {
                    debug!("skipping invalid address in {}: {}", path.display(), line);
                }
            }
        }

        Ok(loaded)
    }

    /// The resolved target set, deduplicated, in numeric address order.
    pub fn targets(&self) -> &BTreeSet<IpAddr> {
        &self.targets
    }

    /// Consume the resolution, keeping only the target set.
    pub fn into_targets(self) -> BTreeSet<IpAddr> {
        self.targets
    }

    /// Inputs rejected so far.
    pub fn rejected(&self) -> &[Rejected] {
        &self.rejected
    }

    /// Non-fatal warnings recorded during resolution.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of resolved targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets resolved.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn reject(&mut self, input: &str, reason: &str) {
        warn!("rejecting target '{}': {}", input, reason);
        self.rejected.push(Rejected {
            input: input.to_string(),
            reason: reason.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_parse_ipv4() {
        let spec = TargetSpec::parse("192.168.1.1").unwrap();
        assert!(matches!(spec, TargetSpec::Single(IpAddr::V4(_))));
    }

    #[test]
    fn test_parse_ipv6() {
        let spec = TargetSpec::parse("::1").unwrap();
        assert!(matches!(spec, TargetSpec::Single(IpAddr::V6(_))));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            TargetSpec::parse("not-an-ip"),
            Err(ResolveError::InvalidAddress(_))
        ));
        assert!(matches!(
            TargetSpec::parse("10.0.0.0/99"),
            Err(ResolveError::InvalidCidr(_))
        ));
    }

    #[test]
    fn test_expand_cidr_excludes_network_and_broadcast() {
        let spec = TargetSpec::parse("192.168.1.0/24").unwrap();
        let hosts = spec.expand();

        assert_eq!(hosts.len(), 254);
        assert!(!hosts.contains(&"192.168.1.0".parse().unwrap()));
        assert!(!hosts.contains(&"192.168.1.255".parse().unwrap()));
        assert!(hosts.contains(&"192.168.1.1".parse().unwrap()));
        assert!(hosts.contains(&"192.168.1.254".parse().unwrap()));
    }

    #[test]
    fn test_expand_point_to_point_keeps_both() {
        // /31 has no network/broadcast pair to exclude
        let spec = TargetSpec::parse("10.0.0.0/31").unwrap();
        assert_eq!(spec.expand().len(), 2);
    }

    #[test]
    fn test_literals_deduplicate_and_reject() {
        let mut resolution = Resolution::new();
        resolution.add_literals(["10.0.0.5", "10.0.0.5", "not-an-ip"]);

        assert_eq!(resolution.len(), 1);
        assert!(resolution
            .targets()
            .contains(&IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))));
        assert_eq!(resolution.rejected().len(), 1);
        assert_eq!(resolution.rejected()[0].input, "not-an-ip");
    }

    #[test]
    fn test_invalid_cidr_is_non_fatal() {
        let mut resolution = Resolution::new();
        resolution.add_cidr("10.0.0.0/24");
        resolution.add_cidr("bogus/range");
        resolution.add_cidr("10.0.1.0/30");

        assert_eq!(resolution.len(), 254 + 2);
        assert_eq!(resolution.rejected().len(), 1);
    }

    #[test]
    fn test_large_range_warns_but_expands() {
        let mut resolution = Resolution::new();
        resolution.add_cidr("10.1.0.0/23");

        assert_eq!(resolution.len(), 510);
        assert_eq!(resolution.warnings().len(), 1);
    }

    #[test]
    fn test_duplicates_across_sources_probed_once() {
        let mut resolution = Resolution::new();
        resolution.add_literals(["192.168.1.10"]);
        resolution.add_cidr("192.168.1.8/29");

        assert!(resolution.len() < 1 + 6);
        assert!(resolution
            .targets()
            .contains(&"192.168.1.10".parse().unwrap()));
    }

    #[test]
    fn test_file_source_skips_blank_and_invalid_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10.0.0.1").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "garbage-line").unwrap();
        writeln!(file, "  10.0.0.2  ").unwrap();
        file.flush().unwrap();

        let mut resolution = Resolution::new();
        let loaded = resolution.add_file(file.path()).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(resolution.len(), 2);
        assert!(resolution.rejected().is_empty());
    }

    #[test]
    fn test_missing_file_is_fatal_for_source() {
        let mut resolution = Resolution::new();
        let err = resolution
            .add_file(Path::new("/nonexistent/addresses.txt"))
            .unwrap_err();

        assert!(matches!(err, ResolveError::FileRead { .. }));
    }

    #[test]
    fn test_numeric_ordering() {
        let mut resolution = Resolution::new();
        resolution.add_literals(["10.0.0.10", "10.0.0.2"]);

        let ordered: Vec<_> = resolution.targets().iter().collect();
        assert_eq!(ordered[0].to_string(), "10.0.0.2");
        assert_eq!(ordered[1].to_string(), "10.0.0.10");
    }
}
