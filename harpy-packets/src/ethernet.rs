use crate::{MacAddr, MalformedFrame};
use std::convert::TryInto;

pub const ETHERNET_HEADER_LEN: usize = 14;
pub const ARP_ETHER_TYPE: u16 = 0x0806;
pub const IPV4_ETHER_TYPE: u16 = 0x0800;

const DEST_MAC_RANGE: (usize, usize) = (0, 6);
const SRC_MAC_RANGE: (usize, usize) = (6, 12);
const ETHER_TYPE_RANGE: (usize, usize) = (12, 14);

/// Ethernet II header.
///
/// ```text
/// 0                    6                    12                    14
/// |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 byte EtherType--|
/// ```
///
/// 802.1Q tags are not understood; a tagged frame decodes with EtherType 0x8100 and is
/// dropped by anything looking for ARP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EthernetFrame {
    pub dest_mac: MacAddr,
    pub src_mac: MacAddr,
    pub ether_type: u16,
}

impl EthernetFrame {
    pub fn new(dest_mac: MacAddr, src_mac: MacAddr, ether_type: u16) -> Self {
        EthernetFrame {
            dest_mac,
            src_mac,
            ether_type,
        }
    }

    /// Reads the header from the front of `data`. Anything past the first 14 bytes is ignored.
    pub fn decode(data: &[u8]) -> Result<Self, MalformedFrame> {
        MalformedFrame::check("ethernet", ETHERNET_HEADER_LEN, data)?;

        let (start, end) = DEST_MAC_RANGE;
        let dest_mac = MacAddr::new(data[start..end].try_into().unwrap());
        let (start, end) = SRC_MAC_RANGE;
        let src_mac = MacAddr::new(data[start..end].try_into().unwrap());
        let (start, end) = ETHER_TYPE_RANGE;
        let ether_type = u16::from_be_bytes(data[start..end].try_into().unwrap());

        Ok(EthernetFrame {
            dest_mac,
            src_mac,
            ether_type,
        })
    }

    pub fn encode(&self) -> [u8; ETHERNET_HEADER_LEN] {
        let mut data = [0; ETHERNET_HEADER_LEN];
        let (start, end) = DEST_MAC_RANGE;
        data[start..end].copy_from_slice(&self.dest_mac.bytes);
        let (start, end) = SRC_MAC_RANGE;
        data[start..end].copy_from_slice(&self.src_mac.bytes);
        let (start, end) = ETHER_TYPE_RANGE;
        data[start..end].copy_from_slice(&self.ether_type.to_be_bytes());
        data
    }

    pub fn is_arp(&self) -> bool {
        self.ether_type == ARP_ETHER_TYPE
    }
}
