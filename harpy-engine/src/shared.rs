use crate::interrupts::Interrupts;
use crate::signal::CancellationSignal;
use crate::status::StatusSlot;
use crate::Error;
use std::io;
use std::sync::Arc;
use tracing::error;

/// Shared state injected into every worker.
///
/// Cloning is cheap and every clone refers to the same signal, slot and log.
#[derive(Clone, Debug, Default)]
pub struct Shared {
    pub signal: Arc<CancellationSignal>,
    pub sent: Arc<StatusSlot>,
    pub interrupts: Arc<Interrupts>,
}

impl Shared {
    pub fn new() -> Self {
        Shared::default()
    }

    /// Stops everything: records `source` against `worker`, then sets the signal.
    pub(crate) fn escalate(&self, worker: &'static str, source: io::Error) {
        error!(worker, error = %source, "transport failure, stopping");
        self.interrupts.push(Error::Transport { worker, source });
        self.signal.set();
    }
}
