use thiserror::Error;

/// Everything that can stop a scan before the first probe is sent.
///
/// Probe-level conditions (refused, timed out, unreachable) never show up here;
/// they are folded into the open/not-open verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid port range {start}-{end}: start is greater than end")]
    InvalidPortRange { start: u16, end: u16 },

    #[error("no addresses left to scan")]
    NoAddresses,

    #[error("port set is empty")]
    EmptyPortSet,

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}
