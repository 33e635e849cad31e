use crate::{Error, Result};
use cidr::{Ipv4Cidr, Ipv4Inet};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 network, e.g. `192.168.1.0/24`.
///
/// Parsing is lenient about host bits: `192.168.1.7/24` is the same range as `192.168.1.0/24`.
/// An address without a prefix length is a /32.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NetworkRange {
    cidr: Ipv4Cidr,
}

impl NetworkRange {
    /// The range of `network_length` bits containing `addr`.
    pub fn new(addr: Ipv4Addr, network_length: u8) -> Result<Self> {
        let inet = Ipv4Inet::new(addr, network_length).map_err(|err| Error::InvalidRange {
            input: format!("{}/{}", addr, network_length),
            reason: err.to_string(),
        })?;
        Ok(NetworkRange {
            cidr: inet.network(),
        })
    }

    pub fn network_length(&self) -> u8 {
        self.cidr.network_length()
    }

    pub fn network(&self) -> Ipv4Addr {
        self.cidr.first_address()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.cidr.last_address()
    }

    pub fn contains(&self, addr: &Ipv4Addr) -> bool {
        self.cidr.contains(addr)
    }

    /// The usable host addresses, in ascending order.
    ///
    /// The network and broadcast addresses are left out, except for /31 point-to-point
    /// ranges where both addresses are hosts, and /32 where the single address is.
    pub fn hosts(&self) -> Hosts {
        let first = u32::from(self.network()) as u64;
        let last = u32::from(self.broadcast()) as u64;
        match self.network_length() {
            31 | 32 => Hosts {
                next: first,
                end: last + 1,
            },
            _ => Hosts {
                next: first + 1,
                end: last,
            },
        }
    }
}

impl FromStr for NetworkRange {
    type Err = Error;

    /// Accepts a full dotted quad, optionally followed by `/` and a prefix length.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidRange {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let (addr, network_length) = match s.find('/') {
            Some(slash) => (&s[..slash], &s[slash + 1..]),
            None => (s, "32"),
        };
        let addr = Ipv4Addr::from_str(addr)
            .map_err(|_| invalid("expected an address of 4 decimal octets"))?;
        let network_length = network_length
            .parse::<u8>()
            .map_err(|_| invalid("expected a prefix length between 0 and 32"))?;
        NetworkRange::new(addr, network_length)
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.network_length())
    }
}

/// Iterator over the host addresses of a [`NetworkRange`].
///
/// Bounds are kept as `u64` so that a range ending at 255.255.255.255 can be walked without
/// overflowing.
#[derive(Clone, Debug)]
pub struct Hosts {
    next: u64,
    end: u64,
}

impl Iterator for Hosts {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Ipv4Addr> {
        if self.next >= self.end {
            return None;
        }
        let addr = Ipv4Addr::from(self.next as u32);
        self.next += 1;
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end.saturating_sub(self.next) as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Hosts {}
