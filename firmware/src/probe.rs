use core::cell::RefCell;

use embassy_nrf::gpio::{Level, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant};
use nrf_timeslot::{ClearTable, PinId, Probe, ProbeError};

/// Probe outputs on GPIO pins, indexed by [`PinId`].
pub struct GpioProbe {
    pins: Mutex<CriticalSectionRawMutex, RefCell<Option<[Output<'static>; PinId::COUNT]>>>,
    clears: ClearTable,
}

impl GpioProbe {
    pub const fn new() -> Self {
        Self {
            pins: Mutex::new(RefCell::new(None)),
            clears: ClearTable::new(),
        }
    }

    /// Hand over the output pins, in [`PinId::ALL`] order.
    pub fn install(&self, pins: [Output<'static>; PinId::COUNT]) {
        self.pins.lock(|p| p.borrow_mut().replace(pins));
    }

    /// Carry out scheduled clears. Spawn once.
    pub async fn run_clears(&self) -> ! {
        self.clears.run(self).await
    }

    fn with_pin(&self, pin: PinId, f: impl FnOnce(&mut Output<'static>)) {
        self.pins.lock(|p| {
            if let Some(pins) = p.borrow_mut().as_mut() {
                f(&mut pins[pin.index()]);
            }
        })
    }
}

impl Default for GpioProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for GpioProbe {
    fn init(&self) -> Result<(), ProbeError> {
        self.pins.lock(|p| match p.borrow_mut().as_mut() {
            Some(pins) => {
                pins.iter_mut().for_each(|pin| pin.set_low());
                Ok(())
            }
            None => Err(ProbeError),
        })
    }

    fn set(&self, pin: PinId, active: bool) {
        let level = if active { Level::High } else { Level::Low };
        self.with_pin(pin, |out| out.set_level(level));
    }

    fn toggle(&self, pin: PinId) {
        self.with_pin(pin, |out| out.toggle());
    }

    fn schedule_clear(&self, pin: PinId, delay: Duration) {
        self.clears.schedule(pin, Instant::now() + delay);
    }
}
