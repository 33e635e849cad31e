use crate::range::NetworkRange;
use crate::transport::Transport;
use crate::{Error, Result, Shared, DEFAULT_NODE, DEFAULT_SLEEP, WAIT_BLOCK};
use harpy_packets::{ArpFrame, MacAddr};
use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Last octets fast mode still sends to: the addresses routers, servers and DHCP pools
/// conventionally sit on.
pub const FAST_NODES: [u8; 6] = [1, 2, 100, 127, 200, 254];

/// Lowest and highest accepted values for [`SenderConfig::node`].
pub const NODE_MIN: u8 = 2;
pub const NODE_MAX: u8 = 253;

/// How the sweep is run.
///
/// Built like the rest of the configuration surface, one consuming setter per option:
///
/// ```
/// # use harpy_engine::sender::SenderConfig;
/// # use std::time::Duration;
/// let config = SenderConfig::new(43).unwrap().sleep(Duration::from_millis(5)).fast(true);
/// assert_eq!(config.node, 43);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SenderConfig {
    /// Last octet the requests claim to come from.
    pub node: u8,
    /// Pause after every request that went out.
    pub sleep: Duration,
    /// Only send to the hosts in [`FAST_NODES`].
    pub fast: bool,
    /// Start over at the first host instead of stopping after the last one.
    pub continuous: bool,
}

impl Default for SenderConfig {
    fn default() -> Self {
        SenderConfig {
            node: DEFAULT_NODE,
            sleep: DEFAULT_SLEEP,
            fast: false,
            continuous: false,
        }
    }
}

impl SenderConfig {
    pub fn new(node: u8) -> Result<Self> {
        SenderConfig {
            node,
            ..SenderConfig::default()
        }
        .validate()
    }

    /// Sets the node octet without checking it; see [`validate`](SenderConfig::validate).
    pub fn node(self, node: u8) -> Self {
        SenderConfig { node, ..self }
    }

    pub fn sleep(self, sleep: Duration) -> Self {
        SenderConfig { sleep, ..self }
    }

    pub fn fast(self, fast: bool) -> Self {
        SenderConfig { fast, ..self }
    }

    pub fn continuous(self, continuous: bool) -> Self {
        SenderConfig { continuous, ..self }
    }

    pub fn validate(self) -> Result<Self> {
        if self.node < NODE_MIN || self.node > NODE_MAX {
            return Err(Error::Config(format!(
                "node octet {} is outside {}..={}",
                self.node, NODE_MIN, NODE_MAX
            )));
        }
        Ok(self)
    }
}

/// Address a request to `host` claims to come from.
///
/// The last octet of `host` is swapped for `node`. When `host` already ends in `node` the last
/// octet is zeroed instead, so that sender and target never coincide; a request asking for its
/// own address is an announcement and would go unanswered.
pub fn sender_protocol_addr(host: Ipv4Addr, node: u8) -> Ipv4Addr {
    let candidate = host.octets()[3];
    let base = u32::from(host) - candidate as u32;
    if candidate == node {
        Ipv4Addr::from(base)
    } else {
        Ipv4Addr::from(base + node as u32)
    }
}

/// Active sweep worker.
///
/// Walks the host addresses of the range, once or forever, broadcasting one who-has request
/// per host and publishing each one to [`Shared::sent`]. Runs until the sweep is exhausted or
/// the shared signal is set. Any socket error other than would-block sets the signal itself.
pub struct Sender<T: Transport> {
    transport: Arc<T>,
    hardware_addr: MacAddr,
    hosts: Box<dyn Iterator<Item = Ipv4Addr> + Send>,
    cycle_len: usize,
    config: SenderConfig,
    shared: Shared,
}

impl<T: Transport> Sender<T> {
    pub const NAME: &'static str = "Sender";

    pub fn new(
        transport: Arc<T>,
        range: &NetworkRange,
        config: SenderConfig,
        shared: Shared,
    ) -> Result<Self> {
        let config = config.validate()?;
        let hosts: Box<dyn Iterator<Item = Ipv4Addr> + Send> = if config.continuous {
            Box::new(range.hosts().cycle())
        } else {
            Box::new(range.hosts())
        };
        Ok(Sender {
            hardware_addr: transport.hardware_addr(),
            transport,
            hosts,
            cycle_len: range.hosts().len(),
            config,
            shared,
        })
    }

    pub fn run(mut self) {
        info!(
            node = self.config.node,
            sleep_ms = self.config.sleep.as_millis() as u64,
            fast = self.config.fast,
            continuous = self.config.continuous,
            "sender started"
        );

        // A host whose request could not be written yet; it is retried before moving on.
        let mut pending = None;
        // Hosts passed over by fast mode since the last request went out.
        let mut skipped = 0;
        loop {
            if self.shared.signal.is_set() {
                debug!("sender cancelled");
                break;
            }

            let tpa = match pending.take().or_else(|| self.hosts.next()) {
                Some(tpa) => tpa,
                None => {
                    info!("sweep exhausted");
                    break;
                }
            };

            if self.config.fast && !FAST_NODES.contains(&tpa.octets()[3]) {
                skipped += 1;
                if skipped >= self.cycle_len {
                    // A whole cycle without a single candidate.
                    skipped = 0;
                    self.shared.signal.wait(WAIT_BLOCK);
                }
                continue;
            }
            skipped = 0;

            let spa = sender_protocol_addr(tpa, self.config.node);
            let frame = ArpFrame::request(self.hardware_addr, spa, tpa).encode();

            match self.transport.send(&frame) {
                Ok(_) => {
                    self.shared.sent.set(format!("{}->{}", spa, tpa));
                    self.pace();
                }
                Err(ref err)
                    if err.kind() == io::ErrorKind::WouldBlock
                        || err.kind() == io::ErrorKind::Interrupted =>
                {
                    pending = Some(tpa);
                    self.shared.signal.wait(WAIT_BLOCK);
                }
                Err(err) => {
                    self.shared.escalate(Self::NAME, err);
                    return;
                }
            }
        }

        self.shared.sent.clear();
    }

    fn pace(&mut self) {
        if let Err(err) = self.shared.signal.try_wait(self.config.sleep) {
            warn!(error = %err, default = ?DEFAULT_SLEEP, "using default sleep");
            self.config.sleep = DEFAULT_SLEEP;
            self.shared.signal.wait(self.config.sleep);
        }
    }
}
