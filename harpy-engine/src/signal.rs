use crate::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Longest timeout `try_wait` accepts: `i64::MAX` nanoseconds, a little over 292 years.
pub const TIMEOUT_MAX: Duration = Duration::from_nanos(i64::MAX as u64);

/// A thread-safe event that can be set exactly once.
///
/// Once set it stays set for the rest of the process, and every thread blocked in
/// [`wait`](CancellationSignal::wait) is woken. Workers use it both to learn that they should
/// stop and to sleep, so a stop request never has to wait for a pause to run out.
#[derive(Debug, Default)]
pub struct CancellationSignal {
    set: Mutex<bool>,
    changed: Condvar,
}

impl CancellationSignal {
    pub fn new() -> Self {
        CancellationSignal::default()
    }

    /// Sets the signal and wakes all waiters. Setting an already set signal does nothing.
    pub fn set(&self) {
        let mut set = self.set.lock();
        if !*set {
            *set = true;
            self.changed.notify_all();
        }
    }

    pub fn is_set(&self) -> bool {
        *self.set.lock()
    }

    /// Blocks until the signal is set or `timeout` elapses, whichever comes first.
    ///
    /// Returns whether the signal is set. A timeout too large to turn into a deadline waits
    /// until the signal is set.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut set = self.set.lock();
        match Instant::now().checked_add(timeout) {
            Some(deadline) => {
                while !*set {
                    if self.changed.wait_until(&mut set, deadline).timed_out() {
                        break;
                    }
                }
            }
            None => {
                while !*set {
                    self.changed.wait(&mut set);
                }
            }
        }
        *set
    }

    /// Like [`wait`](CancellationSignal::wait), but rejects timeouts above [`TIMEOUT_MAX`]
    /// instead of treating them as "forever".
    pub fn try_wait(&self, timeout: Duration) -> Result<bool> {
        if timeout > TIMEOUT_MAX {
            return Err(Error::DelayOverflow(timeout));
        }
        Ok(self.wait(timeout))
    }
}
