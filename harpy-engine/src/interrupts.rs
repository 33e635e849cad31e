use crate::Error;
use crossbeam::queue::SegQueue;

/// Failures that stopped a worker, in the order they were recorded.
///
/// Workers push from their own threads; the orchestrator drains the log once every worker has
/// been joined.
#[derive(Debug, Default)]
pub struct Interrupts {
    log: SegQueue<Error>,
}

impl Interrupts {
    pub fn new() -> Self {
        Interrupts::default()
    }

    pub fn push(&self, error: Error) {
        self.log.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<Error> {
        let mut errors = Vec::with_capacity(self.log.len());
        while let Some(error) = self.log.pop() {
            errors.push(error);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn drain_preserves_order() {
        let interrupts = Interrupts::new();
        assert!(interrupts.is_empty());

        interrupts.push(Error::Transport {
            worker: "Sniffer",
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        });
        interrupts.push(Error::Transport {
            worker: "Sender",
            source: io::Error::from(io::ErrorKind::BrokenPipe),
        });
        assert_eq!(interrupts.len(), 2);

        let workers: Vec<_> = interrupts
            .drain()
            .iter()
            .map(|error| error.worker().unwrap())
            .collect();
        assert_eq!(workers, vec!["Sniffer", "Sender"]);
        assert!(interrupts.is_empty());
    }
}
