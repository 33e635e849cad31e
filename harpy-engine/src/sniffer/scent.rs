use harpy_packets::MacAddr;
use std::fmt;
use std::net::Ipv4Addr;

/// A hardware address together with the manufacturer its prefix is registered to. The
/// manufacturer is empty when the prefix is unknown.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Station {
    pub mac: MacAddr,
    pub vendor: String,
}

impl Station {
    pub fn new(mac: MacAddr, vendor: impl Into<String>) -> Self {
        Station {
            mac,
            vendor: vendor.into(),
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.vendor.is_empty() {
            write!(f, "{}", self.mac)
        } else {
            write!(f, "{} ({})", self.mac, self.vendor)
        }
    }
}

/// Aggregated ARP traffic from one (sender protocol address, ethernet source) pair.
///
/// `sender` is the hardware address claimed inside the ARP payload. It normally matches
/// `source`; when it does not, something is proxying or spoofing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scent {
    pub spa: Ipv4Addr,
    pub who_has: u64,
    pub is_at: u64,
    pub source: Station,
    pub sender: Station,
}

impl Scent {
    pub fn is_consistent(&self) -> bool {
        self.source.mac == self.sender.mac
    }
}

impl fmt::Display for Scent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} who-has={} is-at={} source={}",
            self.spa, self.who_has, self.is_at, self.source
        )?;
        if !self.is_consistent() {
            write!(f, " sender={}", self.sender)?;
        }
        Ok(())
    }
}
