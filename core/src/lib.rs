//! Concurrent TCP connect scanning.
//!
//! [`scanner::perform_scan`] is the entry point; everything else is exposed for
//! callers that want to drive the pieces themselves.

pub mod network;
pub mod results;
pub mod scanner;
pub mod sync;

pub use results::{ResultCollection, ScanReport, ScanResult};
pub use scanner::{Prober, ProgressCallback, TcpConnectProber, perform_scan, perform_scan_with};
