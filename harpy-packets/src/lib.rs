//! Fixed-layout Ethernet II and ARP (RFC 826) frames, as sent and sniffed by harpy.

mod error;
pub use self::error::*;

mod types;
pub use self::types::*;

mod ethernet;
pub use self::ethernet::*;

mod arp;
pub use self::arp::*;
