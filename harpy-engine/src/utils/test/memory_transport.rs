use crate::transport::Transport;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use crossbeam::queue::SegQueue;
use harpy_packets::MacAddr;
use std::io;
use std::time::{Duration, Instant};

/// A [`Transport`] backed by channels.
///
/// Frames handed to [`inject`](MemoryTransport::inject) come out of `recv`, in order, and
/// everything passed to `send` can be collected with [`sent`](MemoryTransport::sent). With
/// nothing queued, `recv` fails with would-block like a non-blocking socket does. Errors can
/// be scripted for the next calls with [`fail_send`](MemoryTransport::fail_send) and
/// [`fail_recv`](MemoryTransport::fail_recv).
pub struct MemoryTransport {
    hardware_addr: MacAddr,
    inbound: (Sender<Vec<u8>>, Receiver<Vec<u8>>),
    outbound: (Sender<Vec<u8>>, Receiver<Vec<u8>>),
    send_faults: SegQueue<io::ErrorKind>,
    recv_faults: SegQueue<io::ErrorKind>,
}

impl MemoryTransport {
    pub fn new(hardware_addr: MacAddr) -> Self {
        MemoryTransport {
            hardware_addr,
            inbound: channel::unbounded(),
            outbound: channel::unbounded(),
            send_faults: SegQueue::new(),
            recv_faults: SegQueue::new(),
        }
    }

    /// Queues a frame for a later `recv`.
    pub fn inject(&self, frame: &[u8]) {
        // Both ends live in self, the channel cannot be disconnected.
        let _ = self.inbound.0.send(frame.to_vec());
    }

    /// Frames that have not been picked up by `recv` yet.
    pub fn pending(&self) -> usize {
        self.inbound.1.len()
    }

    /// Takes every frame sent since the last call.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.outbound.1.try_iter().collect()
    }

    /// Blocks until `count` frames have been sent or `timeout` runs out, then takes what
    /// arrived.
    pub fn wait_sent(&self, count: usize, timeout: Duration) -> Vec<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let mut frames = vec![];
        while frames.len() < count {
            match self.outbound.1.recv_deadline(deadline) {
                Ok(frame) => frames.push(frame),
                Err(_) => break,
            }
        }
        frames
    }

    /// The next `send` fails with `kind` instead of sending. Calls stack up in order.
    pub fn fail_send(&self, kind: io::ErrorKind) {
        self.send_faults.push(kind);
    }

    /// The next `recv` fails with `kind`. Calls stack up in order.
    pub fn fail_recv(&self, kind: io::ErrorKind) {
        self.recv_faults.push(kind);
    }
}

impl Transport for MemoryTransport {
    fn send(&self, frame: &[u8]) -> io::Result<usize> {
        if let Some(kind) = self.send_faults.pop() {
            return Err(io::Error::from(kind));
        }
        let _ = self.outbound.0.send(frame.to_vec());
        Ok(frame.len())
    }

    fn recv(&self, buffer: &mut [u8]) -> io::Result<usize> {
        if let Some(kind) = self.recv_faults.pop() {
            return Err(io::Error::from(kind));
        }
        match self.inbound.1.try_recv() {
            Ok(frame) => {
                let len = frame.len().min(buffer.len());
                buffer[..len].copy_from_slice(&frame[..len]);
                Ok(len)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                Err(io::Error::from(io::ErrorKind::WouldBlock))
            }
        }
    }

    fn hardware_addr(&self) -> MacAddr {
        self.hardware_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recv_truncates_and_would_block_when_empty() {
        let transport = MemoryTransport::new(MacAddr::ZERO);
        transport.inject(&[1, 2, 3, 4, 5]);

        let mut buffer = [0; 3];
        assert_eq!(transport.recv(&mut buffer).unwrap(), 3);
        assert_eq!(buffer, [1, 2, 3]);

        let err = transport.recv(&mut buffer).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn scripted_faults_come_first() {
        let transport = MemoryTransport::new(MacAddr::ZERO);
        transport.fail_send(io::ErrorKind::WouldBlock);

        assert_eq!(
            transport.send(&[0xaa]).unwrap_err().kind(),
            io::ErrorKind::WouldBlock
        );
        assert_eq!(transport.send(&[0xbb]).unwrap(), 1);
        assert_eq!(transport.sent(), vec![vec![0xbb]]);
    }
}
