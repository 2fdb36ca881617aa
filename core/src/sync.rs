use std::sync::{Condvar, Mutex, PoisonError};

/// A countdown latch: created with the number of outstanding tasks, released when
/// every one of them has called [`WaitGroup::done`].
#[derive(Debug)]
pub struct WaitGroup {
    remaining: Mutex<usize>,
    all_done: Condvar,
}

impl WaitGroup {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            all_done: Condvar::new(),
        }
    }

    /// Marks one task finished. Extra calls past zero are ignored.
    pub fn done(&self) {
        let mut remaining = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.all_done.notify_all();
        }
    }

    /// Blocks until the count reaches zero.
    pub fn wait(&self) {
        let remaining = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        let _released = self
            .all_done
            .wait_while(remaining, |remaining| *remaining > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a guard that calls [`WaitGroup::done`] when dropped, including during a panic.
    pub fn guard(&self) -> DoneGuard<'_> {
        DoneGuard { group: self }
    }
}

pub struct DoneGuard<'a> {
    group: &'a WaitGroup,
}

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.group.done();
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
