//! Collection of open ports found while a scan is running, and their final ordering.

use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{self, AtomicUsize};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// An address and port that accepted a TCP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanResult {
    pub addr: IpAddr,
    pub port: u16,
}

impl ScanResult {
    pub fn new(addr: IpAddr, port: u16) -> Self {
        Self { addr, port }
    }
}

/// IPv4 sorts before IPv6, then raw octets, then port.
impl Ord for ScanResult {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_addrs(&self.addr, &other.addr).then(self.port.cmp(&other.port))
    }
}

impl PartialOrd for ScanResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", SocketAddr::new(self.addr, self.port))
    }
}

fn compare_addrs(a: &IpAddr, b: &IpAddr) -> Ordering {
    match (a, b) {
        (IpAddr::V4(a), IpAddr::V4(b)) => a.octets().cmp(&b.octets()),
        (IpAddr::V6(a), IpAddr::V6(b)) => a.octets().cmp(&b.octets()),
        (IpAddr::V4(_), IpAddr::V6(_)) => Ordering::Less,
        (IpAddr::V6(_), IpAddr::V4(_)) => Ordering::Greater,
    }
}

/// Shared sink that workers append open ports to.
///
/// The lock is only held for the push itself; probing happens outside of it.
#[derive(Debug, Default)]
pub struct ResultCollection {
    results: Mutex<Vec<ScanResult>>,
    dropped: AtomicUsize,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one open port. If memory for it can't be reserved the result is
    /// dropped and counted instead of aborting the scan.
    pub fn record(&self, result: ScanResult) {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        if results.try_reserve(1).is_err() {
            drop(results);
            self.dropped.fetch_add(1, atomic::Ordering::Relaxed);
            warn!("Out of memory, dropped result for {result}");
            return;
        }
        results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(atomic::Ordering::Relaxed)
    }

    /// Takes everything collected so far and returns it in its final order.
    ///
    /// Must only be called once all workers are finished.
    pub fn finalize(&self, probed: usize) -> ScanReport {
        let mut results: Vec<ScanResult> =
            std::mem::take(&mut *self.results.lock().unwrap_or_else(PoisonError::into_inner));
        results.sort();

        ScanReport {
            results,
            probed,
            dropped: self.dropped(),
        }
    }
}

/// Outcome of a finished scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Open ports, sorted by family, address bytes, then port.
    pub results: Vec<ScanResult>,
    /// Number of (address, port) pairs that were probed.
    pub probed: usize,
    /// Open ports that were found but could not be stored.
    pub dropped: usize,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
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
