extern crate crossbeam;

use std::time::Duration;

/// Errors produced by the engines and by the things they are built from. Decode failures on
/// the wire and would-block conditions never show up here; they are handled where they occur.
pub mod error;
pub use error::{Error, Result};

/// The one-shot cancellation event every worker watches. Setting it is how the whole run stops,
/// whether the trigger is an interrupt from the user or a worker hitting an I/O failure. It also
/// doubles as the sleep primitive, so that every pause in a worker loop can be cut short.
pub mod signal;

/// Last-sent register, read by whatever is drawing the screen.
pub mod status;

/// Append-only record of the failures that stopped a worker, printed once the run is over.
pub mod interrupts;

/// The bundle of shared state handed to every worker at construction.
pub mod shared;
pub use shared::Shared;

/// IPv4 CIDR block the engines sweep and filter on.
pub mod range;

/// Hardware address prefix to manufacturer name lookup.
pub mod manufacturer;

/// The seam between the engines and the raw socket they share.
pub mod transport;

/// Active half of the discovery: sweeps the range with ARP who-has requests.
pub mod sender;

/// Passive half of the discovery: reads ARP traffic off the wire and aggregates it into scents.
pub mod sniffer;

/// Helpers for rendering engine state on a terminal.
pub mod display;

/// Test support, built for this crate's own tests or with the `test-utils` feature.
#[cfg(any(test, feature = "test-utils"))]
pub mod utils;

/// Pause between retries when the socket has no data, or no buffer space, for us.
pub const WAIT_BLOCK: Duration = Duration::from_millis(1);

/// Pause between two requests when none was configured, or the configured one is unusable.
pub const DEFAULT_SLEEP: Duration = Duration::from_millis(1);

/// Last IPv4 octet the sender claims requests from when none was configured.
pub const DEFAULT_NODE: u8 = 43;
