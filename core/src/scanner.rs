//! The central **orchestration** for port scans.
//!
//! A scan is the Cartesian product of resolved addresses and a [`PortSet`]. Every pair
//! becomes a [`ScanTask`] that is handed to a fixed-size worker pool. Workers run the
//! [`Prober`] and push open ports into a shared [`ResultCollection`]; the caller is
//! released by a [`WaitGroup`] once the last task has finished, and only then are the
//! results sorted.
//!
//! **Architectural Note:**
//! High-level modules should depend on [`perform_scan`] and the [`Prober`] trait rather
//! than on the TCP implementation. Tests swap in their own probers to exercise the
//! scheduling without touching the network.

use std::net::IpAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use portsweep_common::{ScanError, config::ScanConfig, ports::PortSet};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error, warn};

use crate::network::tcp;
use crate::results::{ResultCollection, ScanReport, ScanResult};
use crate::sync::WaitGroup;

/// Called with the number of probes completed so far, once per finished probe.
pub type ProgressCallback = Box<dyn Fn(usize) + Send + Sync>;

/// Decides whether a single address and port is reachable.
///
/// Implementations must absorb every failure into `false`; a probe never aborts a scan.
pub trait Prober: Send + Sync {
    fn probe(&self, addr: IpAddr, port: u16) -> bool;
}

/// Plain TCP connect with a per-probe handshake timeout.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnectProber {
    timeout_ms: u64,
}

impl TcpConnectProber {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }
}

impl Prober for TcpConnectProber {
    fn probe(&self, addr: IpAddr, port: u16) -> bool {
        tcp::probe(addr, port, self.timeout_ms)
    }
}

/// One address paired with one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTask {
    pub addr: IpAddr,
    pub port: u16,
}

/// State every task of one scan shares. Everything but the collection is read-only.
struct SharedState<P> {
    prober: P,
    collection: Arc<ResultCollection>,
    latch: WaitGroup,
    completed: AtomicUsize,
    on_probe_done: Option<ProgressCallback>,
}

impl<P: Prober> SharedState<P> {
    fn execute(&self, task: ScanTask) {
        let _done = self.latch.guard();

        let open: bool = panic::catch_unwind(AssertUnwindSafe(|| {
            self.prober.probe(task.addr, task.port)
        }))
        .unwrap_or_else(|_| {
            error!("Probe of {}:{} panicked, counting it as closed", task.addr, task.port);
            false
        });

        if open {
            self.collection.record(ScanResult::new(task.addr, task.port));
        }

        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(callback) = &self.on_probe_done {
            callback(completed);
        }
    }
}

/// A fixed-size pool of probe workers.
pub struct ProbeScheduler {
    pool: ThreadPool,
    workers: usize,
}

impl ProbeScheduler {
    pub fn new(workers: usize) -> Result<Self, ScanError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("probe-worker-{idx}"))
            .panic_handler(|_| error!("A probe worker panicked outside of a probe"))
            .build()
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;

        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Probes every (address, port) pair and blocks until all of them are done.
    ///
    /// Tasks are submitted address by address, ports ascending within each address.
    /// Returns the number of tasks that ran.
    pub fn run<P>(
        &self,
        addresses: &[IpAddr],
        ports: &PortSet,
        prober: P,
        collection: Arc<ResultCollection>,
        on_probe_done: Option<ProgressCallback>,
    ) -> usize
    where
        P: Prober + 'static,
    {
        let task_count: usize = addresses.len().saturating_mul(ports.len());
        let shared = Arc::new(SharedState {
            prober,
            collection,
            latch: WaitGroup::new(task_count),
            completed: AtomicUsize::new(0),
            on_probe_done,
        });

        for &addr in addresses {
            for port in ports.iter() {
                let task = ScanTask { addr, port };
                let shared = Arc::clone(&shared);
                self.pool.spawn(move || shared.execute(task));
            }
        }

        shared.latch.wait();
        shared.completed.load(Ordering::Relaxed)
    }
}

/// Executes a full TCP connect scan of `addresses` × `ports`.
pub fn perform_scan(
    addresses: &[IpAddr],
    ports: &PortSet,
    cfg: &ScanConfig,
    on_probe_done: Option<ProgressCallback>,
) -> Result<ScanReport, ScanError> {
    let prober = TcpConnectProber::new(cfg.timeout_ms);
    perform_scan_with(prober, addresses, ports, cfg, on_probe_done)
}

/// Same as [`perform_scan`], with a caller supplied prober.
pub fn perform_scan_with<P>(
    prober: P,
    addresses: &[IpAddr],
    ports: &PortSet,
    cfg: &ScanConfig,
    on_probe_done: Option<ProgressCallback>,
) -> Result<ScanReport, ScanError>
where
    P: Prober + 'static,
{
    if addresses.is_empty() {
        return Err(ScanError::NoAddresses);
    }
    if ports.is_empty() {
        return Err(ScanError::EmptyPortSet);
    }

    let task_count: usize = addresses.len().saturating_mul(ports.len());
    let scheduler = ProbeScheduler::new(cfg.effective_workers(task_count))?;
    debug!(
        "Scanning {} addresses x {} ports with {} workers, {}ms timeout",
        addresses.len(),
        ports.len(),
        scheduler.workers(),
        cfg.timeout_ms
    );

    let collection = Arc::new(ResultCollection::new());
    let probed = scheduler.run(addresses, ports, prober, Arc::clone(&collection), on_probe_done);
    let report = collection.finalize(probed);

    if report.dropped > 0 {
        warn!("{} open ports could not be recorded", report.dropped);
    }
    debug!(
        "Scan finished: {} of {} probes open",
        report.results.len(),
        report.probed
    );

    Ok(report)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
