//! Non-blocking TCP connect probe.
//!
//! One probe is a small state machine:
//!
//! ```text
//! connect() ──► Connected                          => Open
//!           ├─► Refused / other error              => closed (not open)
//!           └─► EINPROGRESS ─► poll(POLLOUT, timeout)
//!                               ├─► nothing         => TimedOut
//!                               ├─► ERR/HUP/NVAL    => closed, even if POLLOUT is set
//!                               └─► POLLOUT         => Open
//! ```
//!
//! The socket is owned by [`socket2::Socket`] for the whole probe and closed when it
//! goes out of scope, whichever branch returns.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::trace;

/// What a single connect attempt ended in.
///
/// Only [`ProbeOutcome::Open`] counts as reachable; the other variants exist so
/// that logs can tell a refusal from a silent drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open,
    Refused,
    TimedOut,
    Unreachable,
    Failed,
}

impl ProbeOutcome {
    pub fn is_open(self) -> bool {
        matches!(self, ProbeOutcome::Open)
    }
}

/// Returns `true` if `addr:port` completed a TCP handshake within `timeout_ms`.
pub fn probe(addr: IpAddr, port: u16, timeout_ms: u64) -> bool {
    let outcome = probe_outcome(addr, port, timeout_ms);
    trace!(%addr, port, ?outcome, "probe finished");
    outcome.is_open()
}

/// Same as [`probe`], but keeps the reason a port was not open.
pub fn probe_outcome(addr: IpAddr, port: u16, timeout_ms: u64) -> ProbeOutcome {
    let target = SocketAddr::new(addr, port);

    let socket = match open_socket(&target) {
        Ok(socket) => socket,
        Err(e) => {
            trace!(%target, "socket setup failed: {e}");
            return ProbeOutcome::Failed;
        }
    };

    match socket.connect(&SockAddr::from(target)) {
        Ok(()) => ProbeOutcome::Open,
        Err(e) if is_pending(&e) => await_handshake(&socket, timeout_ms),
        Err(e) => classify_error(&e),
    }
}

fn open_socket(target: &SocketAddr) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(*target), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

fn is_pending(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EINPROGRESS) || e.kind() == io::ErrorKind::WouldBlock
}

fn classify_error(e: &io::Error) -> ProbeOutcome {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => ProbeOutcome::Refused,
        io::ErrorKind::TimedOut => ProbeOutcome::TimedOut,
        io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
            ProbeOutcome::Unreachable
        }
        _ => ProbeOutcome::Failed,
    }
}

/// Waits for the pending connect to resolve, for at most `timeout_ms`.
fn await_handshake(socket: &Socket, timeout_ms: u64) -> ProbeOutcome {
    if timeout_ms == 0 {
        return ProbeOutcome::TimedOut;
    }

    let budget = Duration::from_millis(timeout_ms.min(libc::c_int::MAX as u64));
    let deadline = Instant::now() + budget;

    let mut pollfd = libc::pollfd {
        fd: socket.as_raw_fd(),
        events: libc::POLLOUT,
        revents: 0,
    };

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let wait_ms = remaining.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        // SAFETY: `pollfd` is a single initialised entry and `socket` keeps the fd open
        // for the duration of the call.
        let ready = unsafe { libc::poll(&mut pollfd, 1, wait_ms) };

        match ready {
            0 => return ProbeOutcome::TimedOut,
            n if n > 0 => return readiness_outcome(socket, pollfd.revents),
            _ => {
                let err = io::Error::last_os_error();
                match poll_error_outcome(&err, remaining) {
                    Some(outcome) => return outcome,
                    None => {
                        pollfd.revents = 0;
                        continue;
                    }
                }
            }
        }
    }
}

/// Maps a failed `poll` to an outcome, or `None` when the wait should resume.
fn poll_error_outcome(err: &io::Error, remaining: Duration) -> Option<ProbeOutcome> {
    if err.kind() != io::ErrorKind::Interrupted {
        trace!("poll failed: {err}");
        return Some(ProbeOutcome::Failed);
    }

    if remaining.is_zero() {
        Some(ProbeOutcome::TimedOut)
    } else {
        None
    }
}

fn readiness_outcome(socket: &Socket, revents: libc::c_short) -> ProbeOutcome {
    if revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
        return match socket.take_error() {
            Ok(Some(e)) => classify_error(&e),
            _ => ProbeOutcome::Failed,
        };
    }

    if revents & libc::POLLOUT != 0 {
        ProbeOutcome::Open
    } else {
        ProbeOutcome::Failed
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
