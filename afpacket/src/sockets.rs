#![deny(missing_docs)]

use crate::linux;
use libc;
use std::{
    ffi::CStr,
    io,
    mem::{self, MaybeUninit},
    ptr,
};

/// Represents an unbound `AF_PACKET` socket.  At this phase of a socket's lifecycle, it can be
/// configured.
pub struct Socket {
    fd: libc::c_int,
}

/// Represents a bound `AF_PACKET` socket. At this phase of a socket's lifecycle, it can be read
/// from and written to.
///
/// `send` and `recv` only borrow the socket, so one bound socket can be shared between a thread
/// that writes and a thread that reads.
pub struct BoundSocket {
    fd: libc::c_int,
    send_addr: libc::sockaddr_ll,
    hardware_addr: [u8; 6],
}

impl Socket {
    /// Creates a new unbound socket that sees every ethernet protocol (`ETH_P_ALL`).
    pub fn new() -> io::Result<Self> {
        // This block must be marked as unsafe because it uses FFI with C code. We believe the code
        // in this block to be safe because it does not interact with any memory owned by Rust
        // code, nor does it violate the invariant of the Socket type -- namely, that it return an
        // Err if it fails to initialize.
        let fd = unsafe {
            // Resources:
            // man 7 packet
            let fd = libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW,
                (libc::ETH_P_ALL as u16).to_be() as libc::c_int,
            );
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            fd
        };
        Ok(Self { fd })
    }

    /// Binds the socket to a network interface. This function consumes the `Socket` instance, as
    /// no more configuration options may be safely changed.
    ///
    /// The interface's hardware address is looked up at the same time, see
    /// [`BoundSocket::hardware_addr`].
    pub fn bind(self, iface: impl AsRef<CStr>) -> io::Result<BoundSocket> {
        let name = iface.as_ref().to_bytes_with_nul();
        if name.len() > libc::IFNAMSIZ {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "interface name is too long",
            ));
        }

        // This block is marked as unsafe because it uses FFI, however, we believe it to be safe
        // because 1) it handles FFI failures in accordance with the bound API's conventions, and
        // 2) it copies at most IFNAMSIZ bytes of the borrowed name, terminator included.
        let (send_addr, hardware_addr) = unsafe {
            let mut ifr: linux::ifreq = MaybeUninit::zeroed().assume_init();
            ptr::copy_nonoverlapping(
                name.as_ptr() as *const libc::c_char,
                ifr.ifr_ifrn.ifrn_name.as_mut_ptr(),
                name.len(),
            );

            // ioctl(SIOCGIFHWADDR) fills in the hardware address of the interface
            // Resources:
            // man 7 netdevice
            let err = libc::ioctl(self.fd, linux::SIOCGIFHWADDR, &mut ifr);
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
            let mut hardware_addr = [0u8; 6];
            for (dst, src) in hardware_addr
                .iter_mut()
                .zip(ifr.ifr_ifru.ifru_hwaddr.sa_data.iter())
            {
                *dst = *src as u8;
            }

            // ioctl(SIOCGIFINDEX) fills in the index field of the same ifreq object
            let err = libc::ioctl(self.fd, linux::SIOCGIFINDEX, &mut ifr);
            if err < 0 {
                return Err(io::Error::last_os_error());
            }

            // Resources:
            // man 7 packet regarding sockaddr_ll
            let mut ll: libc::sockaddr_ll = MaybeUninit::zeroed().assume_init();
            ll.sll_family = libc::AF_PACKET as libc::c_ushort;
            ll.sll_protocol = (libc::ETH_P_ALL as u16).to_be();
            ll.sll_ifindex = ifr.ifr_ifru.ifru_ivalue; // expanded from `ifr_ifindex` in kernel headers
            let err = libc::bind(
                self.fd,
                &ll as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            );
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
            (ll, hardware_addr)
        };
        let fd = self.fd;
        // The file descriptor moves into the BoundSocket; forgetting `self` keeps its Drop from
        // closing it.
        mem::forget(self);
        Ok(BoundSocket {
            fd,
            send_addr,
            hardware_addr,
        })
    }

    /// Configures the socket's non-blocking status.
    pub fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        // This block is marked as unsafe because it uses FFI, however, we assume this code to be
        // safe because we handle fcntl's failures properly. Additionally, we do not borrow any
        // Rust-owned memory.
        // Resources:
        // man 2 fcntl
        unsafe {
            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 {
                return Err(io::Error::last_os_error());
            }
            let new_flags = if nonblocking {
                flags | libc::O_NONBLOCK
            } else {
                flags & (!libc::O_NONBLOCK)
            };
            let err = libc::fcntl(self.fd, libc::F_SETFL, new_flags);
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    /// Returns true if the socket is configured not to block, false otherwise.
    pub fn is_nonblocking(&self) -> io::Result<bool> {
        // See comments on block above (in set_nonblocking).
        let flags = unsafe {
            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 {
                return Err(io::Error::last_os_error());
            }
            flags
        };
        Ok(flags & libc::O_NONBLOCK == libc::O_NONBLOCK)
    }

    /// Sets `SO_REUSEADDR`.
    pub fn set_reuse_addr(&mut self, reuse: bool) -> io::Result<()> {
        self.set_bool_option(libc::SO_REUSEADDR, reuse)
    }

    /// Sets `SO_REUSEPORT`. Older kernels reject this option for packet sockets, so callers
    /// usually treat a failure here as non-fatal.
    pub fn set_reuse_port(&mut self, reuse: bool) -> io::Result<()> {
        self.set_bool_option(libc::SO_REUSEPORT, reuse)
    }

    fn set_bool_option(&mut self, option: libc::c_int, value: bool) -> io::Result<()> {
        let value = value as libc::c_int;
        // Safe for the same reasons as set_nonblocking: the only borrowed memory is `value`,
        // whose size is passed alongside it.
        // Resources:
        // man 7 socket
        let err = unsafe {
            libc::setsockopt(
                self.fd,
                libc::SOL_SOCKET,
                option,
                &value as *const _ as *const libc::c_void,
                mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if err < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl BoundSocket {
    /// Sends a frame to the NIC.
    pub fn send(&self, frame: &[u8]) -> io::Result<usize> {
        // This block is marked as unsafe because it uses FFI. We believe this code to be safe,
        // because it safely borrows the Rust-owned frame and passes the length of the frame to the
        // libc function, so it should not exhibit any C-side undefined behaviour.
        unsafe {
            let bytes = libc::sendto(
                self.fd,
                frame.as_ptr() as *const _,
                frame.len(),
                0,
                &self.send_addr as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            );
            if bytes < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(bytes as usize)
            }
        }
    }

    /// Receives a frame from the NIC. Frames longer than `frame` are truncated to fit.
    pub fn recv(&self, frame: &mut [u8]) -> io::Result<usize> {
        // Note comment in `send` call.
        unsafe {
            let bytes = libc::recv(self.fd, frame.as_mut_ptr() as *mut _, frame.len(), 0);
            if bytes < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(bytes as usize)
            }
        }
    }

    /// Hardware address of the interface the socket is bound to.
    pub fn hardware_addr(&self) -> [u8; 6] {
        self.hardware_addr
    }

    /// Kernel index of the interface the socket is bound to.
    pub fn ifindex(&self) -> i32 {
        self.send_addr.sll_ifindex
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

impl Drop for BoundSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
