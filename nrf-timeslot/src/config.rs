//! Startup configuration.
//!
//! A single [`Config`] is assembled when the system starts and handed to every
//! component by reference. Queue capacities are const generics and therefore
//! fixed at compile time; the constants below are the values the firmware uses.

use embassy_time::Duration;

use crate::probe::ProbeMode;
use crate::scheduler::TimeslotRequest;

/// Data channel capacity in normal mode.
pub const DATA_CAPACITY: usize = 120;
/// Data channel capacity in high-load mode.
pub const HIGH_LOAD_DATA_CAPACITY: usize = 200;
/// Session control channel capacity.
pub const CONTROL_CAPACITY: usize = 10;

const SLOT_LENGTH_US: u32 = 6700;
const HIGH_LOAD_SLOT_LENGTH_US: u32 = 1500;
const DEADLINE_MARGIN_US: u32 = 200;
const REQUEST_TIMEOUT_US: u32 = 1_000_000;

const BATCH_SIZE: usize = 20;
const HIGH_LOAD_BATCH_SIZE: usize = 100;

const INTERVAL_MS: u64 = 100;
const HIGH_LOAD_INTERVAL_MS: u64 = 12;

/// Runtime configuration shared by the callback, the owner and the negotiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Shorter slots, bigger batches and a faster negotiation cadence.
    pub high_load: bool,
    /// Drain fewer samples per cycle than a slot produces, so the data channel fills up.
    pub fill_buffer: bool,
    /// How the request and idle probes are driven.
    pub probe_mode: ProbeMode,
    /// Toggle the test probe for every sample pushed from the callback.
    pub probe_tx: bool,
    /// Toggle the test probe for every sample drained by the negotiator.
    pub probe_rx: bool,
    /// Requested timeslot length.
    pub slot_length_us: u32,
    /// How long before the end of the slot the deadline timer fires.
    pub deadline_margin_us: u32,
    /// Timeout for an earliest-available request.
    pub timeout_us: u32,
    /// Samples produced on every slot start.
    pub batch_size: usize,
    /// Maximum samples drained per negotiation cycle.
    pub drain_limit: usize,
    /// Pause between negotiation cycles.
    pub interval: Duration,
}

impl Config {
    /// Normal mode with `fill_buffer` enabled.
    pub const fn new() -> Self {
        Self {
            high_load: false,
            fill_buffer: true,
            probe_mode: ProbeMode::Toggle,
            probe_tx: false,
            probe_rx: false,
            slot_length_us: SLOT_LENGTH_US,
            deadline_margin_us: DEADLINE_MARGIN_US,
            timeout_us: REQUEST_TIMEOUT_US,
            batch_size: BATCH_SIZE,
            drain_limit: drain_limit(false, true),
            interval: Duration::from_millis(INTERVAL_MS),
        }
    }

    /// High-load mode with `fill_buffer` enabled.
    pub const fn high_load() -> Self {
        Self {
            high_load: true,
            slot_length_us: HIGH_LOAD_SLOT_LENGTH_US,
            batch_size: HIGH_LOAD_BATCH_SIZE,
            drain_limit: drain_limit(true, true),
            interval: Duration::from_millis(HIGH_LOAD_INTERVAL_MS),
            ..Self::new()
        }
    }

    pub const fn with_fill_buffer(mut self, fill_buffer: bool) -> Self {
        self.fill_buffer = fill_buffer;
        self.drain_limit = drain_limit(self.high_load, fill_buffer);
        self
    }

    pub const fn with_probe_mode(mut self, probe_mode: ProbeMode) -> Self {
        self.probe_mode = probe_mode;
        self
    }

    pub const fn with_probe_tx(mut self, probe_tx: bool) -> Self {
        self.probe_tx = probe_tx;
        self
    }

    pub const fn with_probe_rx(mut self, probe_rx: bool) -> Self {
        self.probe_rx = probe_rx;
        self
    }

    /// Offset from slot start at which the deadline timer expires.
    pub const fn deadline_us(&self) -> u32 {
        self.slot_length_us.saturating_sub(self.deadline_margin_us)
    }

    /// The request the owner issues for every `MakeRequest`.
    pub const fn request(&self) -> TimeslotRequest {
        TimeslotRequest::earliest(self.slot_length_us, self.timeout_us)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

const fn drain_limit(high_load: bool, fill_buffer: bool) -> usize {
    match (high_load, fill_buffer) {
        (false, true) => 18,
        (false, false) => 40,
        (true, true) => 98,
        (true, false) => 120,
    }
}
