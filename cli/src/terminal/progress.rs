use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// The bar of the scan currently running, if any. Log output is routed around it.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁", "▁▂▂▂▁", "▁▄▂▄▁", "▂▄▆▄▂", "▄▆█▆▄", "▂▄▆▄▂", "▁▄▂▄▁", "▁▂▂▂▁",
];

/// Starts a bar counting `total` probes. A hidden bar still counts, it just never draws.
pub fn start(total: u64, hidden: bool) -> ProgressBar {
    let pb = if hidden {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total)
    };

    let style = ProgressStyle::with_template(
        "{spinner:.blue} {bar:32.green/black} {pos}/{len} probes {msg:.dim} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .tick_strings(TICK_STRINGS);

    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));

    *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb.clone());
    pb
}

/// Clears the active bar from the terminal.
pub fn finish() {
    if let Some(pb) = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner).take() {
        pb.finish_and_clear();
    }
}

/// Writes to stdout, suspending the progress bar while doing so.
pub struct ProgressWriter;

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let active = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner).clone();
        match active {
            Some(pb) if !pb.is_finished() => pb.suspend(|| io::stdout().write_all(buf))?,
            _ => io::stdout().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
