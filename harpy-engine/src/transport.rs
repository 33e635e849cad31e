use harpy_packets::MacAddr;
use std::io;
use std::sync::Arc;

/// A non-blocking raw frame socket bound to one interface.
///
/// Both engines hold the same transport at once, one sending and one receiving, so every
/// operation only borrows it. When there is nothing to read, or no room to write, the calls
/// fail with [`io::ErrorKind::WouldBlock`] instead of parking the thread.
pub trait Transport: Send + Sync {
    /// Writes one complete frame.
    fn send(&self, frame: &[u8]) -> io::Result<usize>;

    /// Reads one frame into `buffer`, truncating it if the buffer is too small.
    fn recv(&self, buffer: &mut [u8]) -> io::Result<usize>;

    /// Hardware address of the bound interface.
    fn hardware_addr(&self) -> MacAddr;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, frame: &[u8]) -> io::Result<usize> {
        (**self).send(frame)
    }

    fn recv(&self, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buffer)
    }

    fn hardware_addr(&self) -> MacAddr {
        (**self).hardware_addr()
    }
}

#[cfg(target_os = "linux")]
pub use self::linux::open;

#[cfg(target_os = "linux")]
mod linux {
    use super::Transport;
    use crate::{Error, Result};
    use afpacket::{BoundSocket, Socket};
    use harpy_packets::MacAddr;
    use std::ffi::CString;
    use std::io;
    use tracing::{debug, info};

    impl Transport for BoundSocket {
        fn send(&self, frame: &[u8]) -> io::Result<usize> {
            BoundSocket::send(self, frame)
        }

        fn recv(&self, buffer: &mut [u8]) -> io::Result<usize> {
            BoundSocket::recv(self, buffer)
        }

        fn hardware_addr(&self) -> MacAddr {
            MacAddr::new(BoundSocket::hardware_addr(self))
        }
    }

    fn startup(context: &str) -> impl FnOnce(io::Error) -> Error + '_ {
        move |source| Error::Startup {
            context: context.to_string(),
            source,
        }
    }

    /// Opens the raw socket both engines share: non-blocking, address reuse on, bound to
    /// `device`.
    ///
    /// `SO_REUSEPORT` is best-effort, every other failure is fatal.
    pub fn open(device: &str) -> Result<BoundSocket> {
        let name = CString::new(device).map_err(|err| Error::Startup {
            context: format!("device {:?}", device),
            source: io::Error::new(io::ErrorKind::InvalidInput, err),
        })?;

        let mut socket = Socket::new().map_err(startup("open raw socket"))?;
        socket
            .set_nonblocking(true)
            .map_err(startup("set non-blocking mode"))?;
        if let Err(err) = socket.set_reuse_port(true) {
            debug!(error = %err, "SO_REUSEPORT unavailable");
        }
        socket
            .set_reuse_addr(true)
            .map_err(startup("set SO_REUSEADDR"))?;

        let bound = socket
            .bind(&name)
            .map_err(|source| Error::Startup {
                context: format!("bind to {}", device),
                source,
            })?;
        info!(
            device,
            hardware_addr = %MacAddr::new(bound.hardware_addr()),
            ifindex = bound.ifindex(),
            "raw socket bound"
        );
        Ok(bound)
    }
}
