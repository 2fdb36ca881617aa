use std::num::NonZeroUsize;

/// Milliseconds a single probe may wait for the TCP handshake.
pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;

/// Worker count requested when the caller does not pick one.
pub const DEFAULT_MAX_WORKERS: usize = 1_000;

/// Hard ceiling on pool threads, regardless of what was requested.
///
/// Every in-flight probe holds one socket, so this also bounds open file descriptors.
pub const MAX_POOL_SIZE: usize = 128;

/// The smaller of [`MAX_POOL_SIZE`] and the execution units the OS reports.
pub fn pool_ceiling() -> usize {
    let units: usize = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    MAX_POOL_SIZE.min(units)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Per-probe handshake budget. `0` only accepts connections that complete immediately.
    pub timeout_ms: u64,
    /// Requested number of concurrent probes, before [`MAX_POOL_SIZE`] is applied.
    pub max_workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl ScanConfig {
    /// Number of pool threads to spawn for `task_count` probes.
    ///
    /// Never more than [`pool_ceiling`], never more than there are tasks, never zero.
    pub fn effective_workers(&self, task_count: usize) -> usize {
        self.max_workers
            .min(pool_ceiling())
            .min(task_count)
            .max(1)
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
