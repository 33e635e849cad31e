use crate::{
    EthernetFrame, MacAddr, MalformedFrame, ARP_ETHER_TYPE, ETHERNET_HEADER_LEN, IPV4_ETHER_TYPE,
};
use std::convert::TryInto;
use std::net::Ipv4Addr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArpOp {
    Request = 1,
    Reply = 2,
}

pub enum ArpHardwareType {
    Ethernet = 1,
}

/// Size of an Ethernet/IPv4 ARP payload: 8 bytes of fixed fields plus two 6 byte hardware
/// addresses and two 4 byte protocol addresses.
pub const ARP_PAYLOAD_LEN: usize = 28;

const HARDWARE_TYPE_RANGE: (usize, usize) = (0, 2);
const PROTOCOL_TYPE_RANGE: (usize, usize) = (2, 4);
const HARDWARE_ADDR_LEN_RANGE: (usize, usize) = (4, 5);
const PROTOCOL_ADDR_LEN_RANGE: (usize, usize) = (5, 6);
const OPCODE_RANGE: (usize, usize) = (6, 8);
const SENDER_HARDWARE_ADDR_RANGE: (usize, usize) = (8, 14);
const SENDER_PROTOCOL_ADDR_RANGE: (usize, usize) = (14, 18);
const TARGET_HARDWARE_ADDR_RANGE: (usize, usize) = (18, 24);
const TARGET_PROTOCOL_ADDR_RANGE: (usize, usize) = (24, 28);

///
/// ARP message for Ethernet hardware and IPv4 protocol addresses, as described in RFC 826
/// https://tools.ietf.org/html/rfc826
///
/// The address length fields are carried as read off the wire but the layout is always the
/// 6/4 one; anything else on the segment is decoded positionally.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpMessage {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub hardware_addr_len: u8,
    pub protocol_addr_len: u8,
    pub opcode: u16,
    pub sender_hardware_addr: MacAddr,
    pub sender_protocol_addr: Ipv4Addr,
    pub target_hardware_addr: MacAddr,
    pub target_protocol_addr: Ipv4Addr,
}

impl ArpMessage {
    /// Builds an Ethernet/IPv4 message with the given operation and addresses.
    pub fn new(
        opcode: u16,
        sender_hardware_addr: MacAddr,
        sender_protocol_addr: Ipv4Addr,
        target_hardware_addr: MacAddr,
        target_protocol_addr: Ipv4Addr,
    ) -> Self {
        ArpMessage {
            hardware_type: ArpHardwareType::Ethernet as u16,
            protocol_type: IPV4_ETHER_TYPE,
            hardware_addr_len: 6,
            protocol_addr_len: 4,
            opcode,
            sender_hardware_addr,
            sender_protocol_addr,
            target_hardware_addr,
            target_protocol_addr,
        }
    }

    pub fn is_request(&self) -> bool {
        self.opcode == ArpOp::Request as u16
    }

    pub fn decode(data: &[u8]) -> Result<Self, MalformedFrame> {
        MalformedFrame::check("arp", ARP_PAYLOAD_LEN, data)?;

        Ok(ArpMessage {
            hardware_type: u16::from_be_bytes(field(data, HARDWARE_TYPE_RANGE).try_into().unwrap()),
            protocol_type: u16::from_be_bytes(field(data, PROTOCOL_TYPE_RANGE).try_into().unwrap()),
            hardware_addr_len: field(data, HARDWARE_ADDR_LEN_RANGE)[0],
            protocol_addr_len: field(data, PROTOCOL_ADDR_LEN_RANGE)[0],
            opcode: u16::from_be_bytes(field(data, OPCODE_RANGE).try_into().unwrap()),
            sender_hardware_addr: mac(field(data, SENDER_HARDWARE_ADDR_RANGE)),
            sender_protocol_addr: ipv4(field(data, SENDER_PROTOCOL_ADDR_RANGE)),
            target_hardware_addr: mac(field(data, TARGET_HARDWARE_ADDR_RANGE)),
            target_protocol_addr: ipv4(field(data, TARGET_PROTOCOL_ADDR_RANGE)),
        })
    }

    pub fn encode(&self) -> [u8; ARP_PAYLOAD_LEN] {
        let mut data = [0; ARP_PAYLOAD_LEN];
        set_field(&mut data, HARDWARE_TYPE_RANGE, &self.hardware_type.to_be_bytes());
        set_field(&mut data, PROTOCOL_TYPE_RANGE, &self.protocol_type.to_be_bytes());
        set_field(&mut data, HARDWARE_ADDR_LEN_RANGE, &[self.hardware_addr_len]);
        set_field(&mut data, PROTOCOL_ADDR_LEN_RANGE, &[self.protocol_addr_len]);
        set_field(&mut data, OPCODE_RANGE, &self.opcode.to_be_bytes());
        set_field(
            &mut data,
            SENDER_HARDWARE_ADDR_RANGE,
            &self.sender_hardware_addr.bytes,
        );
        set_field(
            &mut data,
            SENDER_PROTOCOL_ADDR_RANGE,
            &self.sender_protocol_addr.octets(),
        );
        set_field(
            &mut data,
            TARGET_HARDWARE_ADDR_RANGE,
            &self.target_hardware_addr.bytes,
        );
        set_field(
            &mut data,
            TARGET_PROTOCOL_ADDR_RANGE,
            &self.target_protocol_addr.octets(),
        );
        data
    }
}

// Returns the bytes in the payload between start and end, exclusive
fn field(data: &[u8], (start, end): (usize, usize)) -> &[u8] {
    &data[start..end]
}

fn set_field(data: &mut [u8], (start, end): (usize, usize), bytes: &[u8]) {
    data[start..end].copy_from_slice(bytes);
}

fn mac(bytes: &[u8]) -> MacAddr {
    MacAddr::new(bytes.try_into().unwrap())
}

fn ipv4(bytes: &[u8]) -> Ipv4Addr {
    let octets: [u8; 4] = bytes.try_into().unwrap();
    Ipv4Addr::from(octets)
}

/// Size of the smallest frame worth looking at: an Ethernet header directly followed by an
/// ARP payload.
pub const ARP_FRAME_LEN: usize = ETHERNET_HEADER_LEN + ARP_PAYLOAD_LEN;

/// An Ethernet header together with the ARP message that immediately follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpFrame {
    pub ethernet: EthernetFrame,
    pub arp: ArpMessage,
}

impl ArpFrame {
    /// Broadcast "who-has `tpa`? tell `spa`" request from `src_mac`.
    ///
    /// The target hardware address is set to the broadcast address rather than left zeroed;
    /// RFC 826 leaves it unspecified for requests.
    pub fn request(src_mac: MacAddr, spa: Ipv4Addr, tpa: Ipv4Addr) -> Self {
        ArpFrame {
            ethernet: EthernetFrame::new(MacAddr::BROADCAST, src_mac, ARP_ETHER_TYPE),
            arp: ArpMessage::new(ArpOp::Request as u16, src_mac, spa, MacAddr::BROADCAST, tpa),
        }
    }

    /// Decodes both layers without checking the EtherType; deciding what to do with non-ARP
    /// traffic is left to the caller.
    pub fn decode(data: &[u8]) -> Result<Self, MalformedFrame> {
        MalformedFrame::check("ethernet+arp", ARP_FRAME_LEN, data)?;
        Ok(ArpFrame {
            ethernet: EthernetFrame::decode(&data[..ETHERNET_HEADER_LEN])?,
            arp: ArpMessage::decode(&data[ETHERNET_HEADER_LEN..ARP_FRAME_LEN])?,
        })
    }

    pub fn encode(&self) -> [u8; ARP_FRAME_LEN] {
        let mut data = [0; ARP_FRAME_LEN];
        data[..ETHERNET_HEADER_LEN].copy_from_slice(&self.ethernet.encode());
        data[ETHERNET_HEADER_LEN..].copy_from_slice(&self.arp.encode());
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn arp_message_from_bytes() {
        let arp_payload: Vec<u8> = vec![
            0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 1, 2, 3, 4, 5, 6, 10, 0, 0, 1, 10, 9,
            8, 7, 6, 5, 0xff, 0xff, 0xff, 0xff,
        ];

        let arp = ArpMessage::decode(&arp_payload).unwrap();
        assert_eq!(arp.hardware_type, 1);
        assert_eq!(arp.protocol_type, 0x0800);
        assert_eq!(arp.hardware_addr_len, 6);
        assert_eq!(arp.protocol_addr_len, 4);
        assert_eq!(arp.opcode, ArpOp::Request as u16);
        assert!(arp.is_request());
        assert_eq!(arp.sender_hardware_addr, MacAddr::new([1, 2, 3, 4, 5, 6]));
        assert_eq!(arp.sender_protocol_addr, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(arp.target_hardware_addr, MacAddr::new([10, 9, 8, 7, 6, 5]));
        assert_eq!(arp.target_protocol_addr, Ipv4Addr::BROADCAST);
        assert_eq!(&arp.encode()[..], &arp_payload[..]);
    }

    #[test]
    fn short_payload_is_malformed() {
        let err = ArpMessage::decode(&[0; 27]).unwrap_err();
        assert_eq!(err.expected, ARP_PAYLOAD_LEN);
        assert_eq!(err.actual, 27);
    }

    #[test]
    fn request_layout() {
        let src = MacAddr::new([0x02, 0, 0, 0, 0, 0x01]);
        let frame = ArpFrame::request(
            src,
            Ipv4Addr::new(192, 168, 1, 43),
            Ipv4Addr::new(192, 168, 1, 1),
        );
        let data = frame.encode();

        assert_eq!(data.len(), 42);
        assert_eq!(&data[0..6], &[0xff; 6]);
        assert_eq!(&data[6..12], &src.bytes);
        assert_eq!(&data[12..14], &[0x08, 0x06]);
        assert_eq!(&data[14..22], &[0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01]);
        assert_eq!(&data[22..28], &src.bytes);
        assert_eq!(&data[28..32], &[192, 168, 1, 43]);
        assert_eq!(&data[32..38], &[0xff; 6]);
        assert_eq!(&data[38..42], &[192, 168, 1, 1]);
    }

    #[test]
    fn frame_roundtrip_with_random_fields() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let frame = ArpFrame {
                ethernet: EthernetFrame::new(
                    MacAddr::new(rng.gen()),
                    MacAddr::new(rng.gen()),
                    rng.gen(),
                ),
                arp: ArpMessage {
                    hardware_type: rng.gen(),
                    protocol_type: rng.gen(),
                    hardware_addr_len: rng.gen(),
                    protocol_addr_len: rng.gen(),
                    opcode: rng.gen(),
                    sender_hardware_addr: MacAddr::new(rng.gen()),
                    sender_protocol_addr: Ipv4Addr::from(rng.gen::<u32>()),
                    target_hardware_addr: MacAddr::new(rng.gen()),
                    target_protocol_addr: Ipv4Addr::from(rng.gen::<u32>()),
                },
            };
            assert_eq!(ArpFrame::decode(&frame.encode()), Ok(frame));
        }
    }

    #[test]
    fn frame_roundtrip_edge_addresses() {
        for (mac, ip) in &[
            (MacAddr::ZERO, Ipv4Addr::UNSPECIFIED),
            (MacAddr::BROADCAST, Ipv4Addr::BROADCAST),
        ] {
            let frame = ArpFrame {
                ethernet: EthernetFrame::new(*mac, *mac, ARP_ETHER_TYPE),
                arp: ArpMessage::new(ArpOp::Reply as u16, *mac, *ip, *mac, *ip),
            };
            assert_eq!(ArpFrame::decode(&frame.encode()), Ok(frame));
        }
    }

    #[test]
    fn frame_shorter_than_42_bytes_is_malformed() {
        let data = ArpFrame::request(MacAddr::ZERO, Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST)
            .encode();
        for len in 0..ARP_FRAME_LEN {
            assert!(ArpFrame::decode(&data[..len]).is_err());
        }
        assert!(ArpFrame::decode(&data).is_ok());
    }
}
