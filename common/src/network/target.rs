//! # Scan Target Model
//!
//! Defines the hosts a scan can be pointed at.
//!
//! This module handles parsing and resolving targets, which can be:
//! * An IPv4 literal (e.g., `192.168.1.5`).
//! * An IPv6 literal, optionally bracketed (e.g., `::1`, `[fe80::1]`).
//! * A DNS name (e.g., `example.com`).
//! * A comma-separated list of any of the above.

use std::collections::HashSet;
use std::net::IpAddr;
use std::str::FromStr;

use tracing::{debug, info, warn};

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Represents a distinct target to be scanned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A literal address, no lookup needed.
    Host { target_addr: IpAddr },
    /// A name that has to go through the system resolver.
    Name { hostname: String },
    /// Holds a list of different targets
    Multi { targets: Vec<Target> },
}

impl FromStr for Target {
    type Err = String;

    /// Parses a string into a `Target`.
    ///
    /// Supported formats:
    /// * **Host**: Single IPv4/IPv6 address (e.g., "10.0.0.1", "::1", "[::1]").
    /// * **Name**: A DNS hostname (e.g., "scanme.example.org").
    /// * **List**: Any of the above separated by commas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains(',') {
            return parse_commas(s);
        }

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_hostname(s) {
            return Ok(target);
        }

        Err(format!("invalid target: {s}"))
    }
}

impl Target {
    /// Visits every non-list target in input order.
    fn flatten_into<'a>(&'a self, leaves: &mut Vec<&'a Target>) {
        match self {
            Target::Multi { targets } => {
                for target in targets {
                    target.flatten_into(leaves);
                }
            }
            leaf => leaves.push(leaf),
        }
    }
}

/// Resolves every target into a flat, deduplicated address list.
///
/// Names that fail to resolve are logged and skipped. The first occurrence of an
/// address decides its position in the output.
pub async fn to_addresses(targets: &[Target]) -> Vec<IpAddr> {
    let mut leaves: Vec<&Target> = Vec::new();
    for target in targets {
        target.flatten_into(&mut leaves);
    }

    let mut seen: HashSet<IpAddr> = HashSet::new();
    let mut addresses: Vec<IpAddr> = Vec::new();

    for leaf in leaves {
        let resolved: Vec<IpAddr> = match leaf {
            Target::Host { target_addr } => vec![*target_addr],
            Target::Name { hostname } => match resolve_name(hostname).await {
                Ok(ips) => ips,
                Err(e) => {
                    warn!("Could not resolve {hostname}: {e}");
                    continue;
                }
            },
            Target::Multi { .. } => continue,
        };

        for ip in resolved {
            if seen.insert(ip) {
                addresses.push(ip);
            }
        }
    }

    let len: usize = addresses.len();
    let unit: &str = if len == 1 { "address" } else { "addresses" };
    info!("{len} {unit} ready to scan");

    addresses
}

async fn resolve_name(hostname: &str) -> std::io::Result<Vec<IpAddr>> {
    let ips: Vec<IpAddr> = tokio::net::lookup_host((hostname, 0))
        .await?
        .map(|socket_addr| socket_addr.ip())
        .collect();
    debug!("{hostname} resolved to {ips:?}");
    Ok(ips)
}

/// Parses a comma-separated list of targets (e.g., "10.0.0.1, ::1, example.com").
pub fn parse_commas(s: &str) -> Result<Target, String> {
    let mut targets = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let target = Target::from_str(part)
            .map_err(|e| format!("Failed to parse target '{part}': {e}"))?;

        targets.push(target);
    }

    if targets.is_empty() {
        return Err(format!("no targets in '{s}'"));
    }

    Ok(Target::Multi { targets })
}

/// Parses a single IP address, accepting the bracketed IPv6 form.
fn parse_host(s: &str) -> Option<Target> {
    let unbracketed = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(s);

    unbracketed
        .parse::<IpAddr>()
        .ok()
        .map(|target_addr| Target::Host { target_addr })
}

/// Accepts names made of dot-separated LDH labels, with an optional trailing dot.
fn parse_hostname(s: &str) -> Option<Target> {
    let name = s.strip_suffix('.').unwrap_or(s);
    if name.is_empty() || name.len() > MAX_HOSTNAME_LEN {
        return None;
    }

    let valid_labels = name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    valid_labels.then(|| Target::Name {
        hostname: name.to_ascii_lowercase(),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_from_str_full_parsing() {
        // Test host
        assert_eq!(
            Target::from_str("1.1.1.1"),
            Ok(Target::Host { target_addr: IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)) })
        );
        assert!(matches!(Target::from_str("::1"), Ok(Target::Host { .. })));
        assert_eq!(
            Target::from_str("[::1]"),
            Ok(Target::Host { target_addr: IpAddr::V6(Ipv6Addr::LOCALHOST) })
        );

        // Test names
        assert_eq!(
            Target::from_str("Example.COM."),
            Ok(Target::Name { hostname: "example.com".to_string() })
        );
        assert!(matches!(Target::from_str("localhost"), Ok(Target::Name { .. })));

        // Test lists
        match Target::from_str("10.0.0.1, example.org,::1") {
            Ok(Target::Multi { targets }) => assert_eq!(targets.len(), 3),
            other => panic!("expected a list, got {other:?}"),
        }

        // Test invalid
        assert!(Target::from_str("").is_err());
        assert!(Target::from_str("bad host").is_err());
        assert!(Target::from_str("a..b").is_err());
        assert!(Target::from_str("-leading.example").is_err());
        assert!(Target::from_str("10.0.0.1,under_score").is_err());
        assert!(Target::from_str(" , ").is_err());
    }

    #[tokio::test]
    async fn literal_targets_resolve_without_lookup_and_deduplicate() {
        let targets = vec![
            Target::from_str("127.0.0.1,::1").unwrap(),
            Target::from_str("127.0.0.1").unwrap(),
        ];

        let addresses = to_addresses(&targets).await;

        assert_eq!(
            addresses,
            vec![
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(Ipv6Addr::LOCALHOST)
            ]
        );
    }

    #[tokio::test]
    async fn empty_target_list_resolves_to_nothing() {
        assert!(to_addresses(&[]).await.is_empty());
    }
}
