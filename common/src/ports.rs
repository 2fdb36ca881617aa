//! # Port Set Model
//!
//! Turns user supplied port specifications into one canonical, ascending list.
//!
//! Every specification is a comma-separated list of pieces, each of which can be:
//! * A single port (e.g., `443`).
//! * An inclusive range (e.g., `8000-8100`).
//! * The `common` keyword, a fixed table of frequently exposed service ports.
//! * The `all` keyword, every port from 1 to 65535.
//!
//! Pieces are unioned together, so repeating a port anywhere is harmless.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ScanError;

pub const COMMON_ALIAS: &str = "common";
pub const ALL_ALIAS: &str = "all";

/// Ports expanded from the `common` keyword.
pub const COMMON_PORTS: [u16; 55] = [
    7, 20, 21, 22, 23, 25, 53, 67, 68, 69, //
    80, 88, 110, 111, 119, 123, 135, 137, 138, 139, //
    143, 161, 162, 179, 389, 443, 445, 465, 500, 514, //
    515, 520, 587, 631, 636, 873, 993, 995, 1080, 1194, //
    1433, 1521, 1723, 2049, 2082, 2083, 3306, 3389, 5060, 5432, //
    5900, 6379, 8000, 8080, 8443,
];

/// A deduplicated set of TCP ports, always iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<u16>,
}

impl PortSet {
    /// Parses every specification and unions the results.
    ///
    /// Fails on the first malformed piece; nothing is returned partially.
    pub fn parse<I, S>(specs: I) -> Result<Self, ScanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = PortSetBuilder::default();
        for spec in specs {
            builder.add_spec(spec.as_ref())?;
        }
        Ok(builder.build())
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports.binary_search(&port).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.ports
    }
}

impl FromStr for PortSet {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse([s])
    }
}

impl<'a> IntoIterator for &'a PortSet {
    type Item = &'a u16;
    type IntoIter = std::slice::Iter<'a, u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.ports.iter()
    }
}

/// Accumulates pieces from several specifications before freezing them into a [`PortSet`].
#[derive(Debug, Default)]
pub struct PortSetBuilder {
    seen: BTreeSet<u16>,
}

impl PortSetBuilder {
    /// Adds one comma-separated specification (e.g., `"22, 80-82, common"`).
    pub fn add_spec(&mut self, spec: &str) -> Result<&mut Self, ScanError> {
        for piece in spec.split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            self.add_piece(piece)?;
        }
        Ok(self)
    }

    pub fn build(self) -> PortSet {
        PortSet {
            ports: self.seen.into_iter().collect(),
        }
    }

    fn add_piece(&mut self, piece: &str) -> Result<(), ScanError> {
        if let Some(expansion) = parse_keyword(piece) {
            self.seen.extend(expansion);
            return Ok(());
        }

        if let Some(range) = parse_range(piece)? {
            self.seen.extend(range);
            return Ok(());
        }

        self.seen.insert(parse_port(piece)?);
        Ok(())
    }
}

/// Expands `common` and `all` (case-insensitive).
fn parse_keyword(piece: &str) -> Option<Box<dyn Iterator<Item = u16>>> {
    match piece.to_ascii_lowercase().as_str() {
        COMMON_ALIAS => Some(Box::new(COMMON_PORTS.into_iter())),
        // RangeInclusive stops at u16::MAX without wrapping.
        ALL_ALIAS => Some(Box::new(1..=u16::MAX)),
        _ => None,
    }
}

/// Parses "start-end". Returns `Ok(None)` when the piece has no dash at all.
fn parse_range(piece: &str) -> Result<Option<RangeInclusive<u16>>, ScanError> {
    let Some((start_str, end_str)) = piece.split_once('-') else {
        return Ok(None);
    };

    if end_str.contains('-') {
        return Err(ScanError::InvalidArgument(format!(
            "port range '{piece}' has more than one '-'"
        )));
    }

    let start = parse_port(start_str)?;
    let end = parse_port(end_str)?;

    if start > end {
        return Err(ScanError::InvalidPortRange { start, end });
    }

    Ok(Some(start..=end))
}

fn parse_port(s: &str) -> Result<u16, ScanError> {
    let s = s.trim();
    let value = s
        .parse::<u32>()
        .map_err(|e| ScanError::InvalidArgument(format!("invalid port '{s}': {e}")))?;

    match u16::try_from(value) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ScanError::InvalidArgument(format!(
            "port {value} is outside 1-65535"
        ))),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
