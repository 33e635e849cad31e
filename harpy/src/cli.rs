use clap::{App, Arg, ArgMatches, ErrorKind};
use harpy_engine::range::NetworkRange;
use harpy_engine::sender::{SenderConfig, NODE_MAX, NODE_MIN};
use harpy_engine::sniffer::SnifferConfig;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_NODE: &str = "43";
const DEFAULT_SLEEP: &str = "1";

/// Everything the command line decides about a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub range: NetworkRange,
    pub device: String,
    /// IEEE `oui.csv` to rebuild the manufacturer cache from.
    pub database: Option<PathBuf>,
    pub node: u8,
    pub sleep: Duration,
    pub fast: bool,
    pub filter: bool,
    pub passive: bool,
    pub continuous: bool,
    pub strict: bool,
    pub verbosity: u64,
}

/// The argument parser. `devices` are the interfaces `-i` accepts; the first one is the
/// default.
pub fn app<'a>(devices: &'a [String]) -> App<'a, 'a> {
    let names: Vec<&str> = devices.iter().map(String::as_str).collect();

    let mut device = Arg::with_name("device")
        .short("i")
        .value_name("DEVICE")
        .help("use DEVICE as network device")
        .takes_value(true);
    if let Some(first) = names.first() {
        device = device.default_value(first).possible_values(&names);
    }

    App::new("harpy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("harpy - active/passive arp discovery tool")
        .arg(
            Arg::with_name("range")
                .value_name("RANGE")
                .help("ip range in cidr format")
                .required(true)
                .validator(|value| {
                    value
                        .parse::<NetworkRange>()
                        .map(|_| ())
                        .map_err(|err| err.to_string())
                }),
        )
        .arg(
            Arg::with_name("database")
                .short("D")
                .value_name("FILE")
                .help("create/update the manufacturer database from an IEEE oui.csv")
                .takes_value(true),
        )
        .arg(device)
        .arg(
            Arg::with_name("node")
                .short("n")
                .value_name("NODE")
                .help("use NODE as last ip octet for sending")
                .takes_value(true)
                .default_value(DEFAULT_NODE)
                .validator(|value| parse_node(&value).map(|_| ())),
        )
        .arg(
            Arg::with_name("sleep")
                .short("s")
                .value_name("TIME")
                .help("sleep TIME ms between each request")
                .takes_value(true)
                .default_value(DEFAULT_SLEEP)
                .validator(|value| {
                    value
                        .parse::<u64>()
                        .map(|_| ())
                        .map_err(|_| format!("{:?} is not a number of milliseconds", value))
                }),
        )
        .arg(
            Arg::with_name("fast")
                .short("f")
                .help("enable fast mode, only scan specific hosts"),
        )
        .arg(
            Arg::with_name("filter")
                .short("F")
                .help("enable filter mode, exclude hosts not in range"),
        )
        .arg(
            Arg::with_name("passive")
                .short("p")
                .help("enable passive mode, do not send any packets")
                .conflicts_with("continuous"),
        )
        .arg(
            Arg::with_name("continuous")
                .short("R")
                .help("enable continuous mode, never stop sending packets"),
        )
        .arg(
            Arg::with_name("strict")
                .short("S")
                .help("enable strict mode, treat inconsistent packets as new"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("log more to stderr, repeat for even more"),
        )
}

fn parse_node(value: &str) -> Result<u8, String> {
    match value.parse::<u8>() {
        Ok(node) if node >= NODE_MIN && node <= NODE_MAX => Ok(node),
        _ => Err(format!(
            "{:?} is not an octet between {} and {}",
            value, NODE_MIN, NODE_MAX
        )),
    }
}

fn invalid(description: impl AsRef<str>) -> clap::Error {
    clap::Error::with_description(description.as_ref(), ErrorKind::InvalidValue)
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Result<Options, clap::Error> {
        let range = matches
            .value_of("range")
            .unwrap_or_default()
            .parse::<NetworkRange>()
            .map_err(|err| invalid(err.to_string()))?;
        let device = matches
            .value_of("device")
            .ok_or_else(|| invalid("no available network devices"))?
            .to_string();
        let node = parse_node(matches.value_of("node").unwrap_or(DEFAULT_NODE)).map_err(invalid)?;
        let sleep = matches
            .value_of("sleep")
            .unwrap_or(DEFAULT_SLEEP)
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|err| invalid(err.to_string()))?;

        Ok(Options {
            range,
            device,
            database: matches.value_of_os("database").map(PathBuf::from),
            node,
            sleep,
            fast: matches.is_present("fast"),
            filter: matches.is_present("filter"),
            passive: matches.is_present("passive"),
            continuous: matches.is_present("continuous"),
            strict: matches.is_present("strict"),
            verbosity: matches.occurrences_of("verbose"),
        })
    }

    /// The single-letter modes that are switched on, in `fFpRS` order.
    pub fn modes(&self) -> String {
        [
            ('f', self.fast),
            ('F', self.filter),
            ('p', self.passive),
            ('R', self.continuous),
            ('S', self.strict),
        ]
        .iter()
        .filter(|(_, on)| *on)
        .map(|(mode, _)| *mode)
        .collect()
    }

    pub fn sender_config(&self) -> harpy_engine::Result<SenderConfig> {
        Ok(SenderConfig::new(self.node)?
            .sleep(self.sleep)
            .fast(self.fast)
            .continuous(self.continuous))
    }

    pub fn sniffer_config(&self) -> SnifferConfig {
        SnifferConfig::new()
            .exclude(self.filter)
            .strict(self.strict)
    }
}
