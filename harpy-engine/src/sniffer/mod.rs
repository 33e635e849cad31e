use crate::display::shorten;
use crate::manufacturer::Manufacturers;
use crate::range::NetworkRange;
use crate::transport::Transport;
use crate::{Shared, WAIT_BLOCK};
use harpy_packets::{ArpFrame, MacAddr, ARP_FRAME_LEN};
use parking_lot::RwLock;
use std::io;
use std::sync::Arc;
use tracing::{debug, info, trace};

mod scent;
pub use self::scent::{Scent, Station};

/// Filtering policy of the sniffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnifferConfig {
    /// Drop traffic whose sender protocol address is outside the range.
    pub exclude: bool,
    /// Keep traffic whose ARP sender hardware address disagrees with an existing scent apart,
    /// instead of merging it in.
    pub strict: bool,
}

impl SnifferConfig {
    pub fn new() -> Self {
        SnifferConfig::default()
    }

    pub fn exclude(self, exclude: bool) -> Self {
        SnifferConfig { exclude, ..self }
    }

    pub fn strict(self, strict: bool) -> Self {
        SnifferConfig { strict, ..self }
    }
}

/// Passive capture worker.
///
/// Reads frames off the shared socket and folds the ARP ones into an insertion-ordered list
/// of [`Scent`]s. The sniffer is the only writer of that list; [`lines`](Sniffer::lines) and
/// [`scents`](Sniffer::scents) may be called from any thread while [`run`](Sniffer::run) is
/// going, and see a consistent snapshot.
pub struct Sniffer<T: Transport> {
    transport: Arc<T>,
    hardware_addr: MacAddr,
    range: NetworkRange,
    manufacturers: Arc<Manufacturers>,
    config: SnifferConfig,
    shared: Shared,
    scents: RwLock<Vec<Scent>>,
}

impl<T: Transport> Sniffer<T> {
    pub const NAME: &'static str = "Sniffer";

    pub fn new(
        transport: Arc<T>,
        range: NetworkRange,
        manufacturers: Arc<Manufacturers>,
        config: SnifferConfig,
        shared: Shared,
    ) -> Self {
        Sniffer {
            hardware_addr: transport.hardware_addr(),
            transport,
            range,
            manufacturers,
            config,
            shared,
            scents: RwLock::new(vec![]),
        }
    }

    /// Receives until the shared signal is set. A socket error other than would-block is
    /// recorded and sets the signal.
    pub fn run(&self) {
        info!(
            range = %self.range,
            exclude = self.config.exclude,
            strict = self.config.strict,
            manufacturers = self.manufacturers.len(),
            "sniffer started"
        );

        let mut buffer = [0u8; ARP_FRAME_LEN];
        while !self.shared.signal.is_set() {
            match self.transport.recv(&mut buffer) {
                Ok(len) => {
                    self.observe(&buffer[..len]);
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                    self.shared.signal.wait(WAIT_BLOCK);
                }
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.shared.escalate(Self::NAME, err);
                    return;
                }
            }
        }
        debug!(scents = self.scents.read().len(), "sniffer cancelled");
    }

    /// Folds one received frame into the scents. Returns whether the frame was kept.
    ///
    /// Dropped without complaint: frames shorter than an ethernet header plus an ARP payload,
    /// frames we sent ourselves, anything that is not ARP, and with `exclude` on, senders
    /// outside the range.
    pub fn observe(&self, packet: &[u8]) -> bool {
        if packet.len() < ARP_FRAME_LEN {
            return false;
        }
        let frame = match ArpFrame::decode(packet) {
            Ok(frame) => frame,
            Err(err) => {
                trace!(error = %err, "skipping frame");
                return false;
            }
        };

        if frame.ethernet.src_mac == self.hardware_addr || !frame.ethernet.is_arp() {
            return false;
        }

        let spa = frame.arp.sender_protocol_addr;
        if self.config.exclude && !self.range.contains(&spa) {
            return false;
        }

        // Anything that is not a request is counted as a reply, unknown opcodes included.
        let (who_has, is_at) = if frame.arp.is_request() { (1, 0) } else { (0, 1) };

        let source = self.station(frame.ethernet.src_mac);
        let sender = self.station(frame.arp.sender_hardware_addr);

        let mut scents = self.scents.write();
        let existing = scents.iter_mut().find(|scent| {
            scent.spa == spa
                && scent.source == source
                && (!self.config.strict || scent.sender == sender)
        });
        match existing {
            Some(scent) => {
                scent.who_has += who_has;
                scent.is_at += is_at;
            }
            None => {
                debug!(%spa, %source, %sender, "new scent");
                scents.push(Scent {
                    spa,
                    who_has,
                    is_at,
                    source,
                    sender,
                });
            }
        }
        true
    }

    /// A copy of the current scents, in the order they were first seen.
    pub fn scents(&self) -> Vec<Scent> {
        self.scents.read().clone()
    }

    /// One summary line per scent, each shortened to `width` characters.
    ///
    /// Every call takes a fresh snapshot; the returned iterator never touches the sniffer
    /// again.
    pub fn lines(&self, width: usize) -> impl Iterator<Item = String> {
        self.scents()
            .into_iter()
            .map(move |scent| shorten(&scent.to_string(), width))
    }

    fn station(&self, mac: MacAddr) -> Station {
        Station::new(mac, self.manufacturers.lookup(&mac))
    }
}
