//! Debug signal outputs.
//!
//! Every interesting point in the negotiation cycle is made visible on an output
//! pin, either by toggling it or by emitting a short pulse. The pins themselves
//! are board specific and live behind the [`Probe`] trait.
use core::cell::Cell;

use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};

use crate::error::ProbeError;

/// How long a pulse stays active before it is cleared.
pub const PULSE_WIDTH: Duration = Duration::from_micros(100);

/// Logical probe outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinId {
    /// Heartbeat of the main thread.
    Main,
    /// The negotiator took the gate and queued a request.
    ReqAllowed,
    /// The negotiator found the gate closed.
    ReqDenied,
    SlotStart,
    SlotTimer,
    SlotRadio,
    SlotBlock,
    SlotCancel,
    SlotIdle,
    /// Per-sample activity on the data channel.
    Test,
}

impl PinId {
    pub const COUNT: usize = 10;

    pub const ALL: [PinId; Self::COUNT] = [
        PinId::Main,
        PinId::ReqAllowed,
        PinId::ReqDenied,
        PinId::SlotStart,
        PinId::SlotTimer,
        PinId::SlotRadio,
        PinId::SlotBlock,
        PinId::SlotCancel,
        PinId::SlotIdle,
        PinId::Test,
    ];

    /// Dense index of this pin, suitable for lookup tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How event pins are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeMode {
    /// Flip the pin on every event.
    Toggle,
    /// Drive the pin active and clear it again after [`PULSE_WIDTH`].
    Pulse,
}

/// Signal probe outputs.
///
/// Methods take `&self` because the probe is shared between the timeslot callback
/// and thread context; implementations synchronize internally.
pub trait Probe {
    /// Configure all outputs as inactive.
    fn init(&self) -> Result<(), ProbeError>;

    fn set(&self, pin: PinId, active: bool);

    fn toggle(&self, pin: PinId);

    /// Drive `pin` inactive once `delay` has elapsed.
    fn schedule_clear(&self, pin: PinId, delay: Duration);

    /// Make an event visible on `pin`.
    fn mark(&self, pin: PinId, mode: ProbeMode) {
        match mode {
            ProbeMode::Toggle => self.toggle(pin),
            ProbeMode::Pulse => {
                self.set(pin, true);
                self.schedule_clear(pin, PULSE_WIDTH);
            }
        }
    }
}

impl<P: Probe + ?Sized> Probe for &P {
    fn init(&self) -> Result<(), ProbeError> {
        P::init(self)
    }

    fn set(&self, pin: PinId, active: bool) {
        P::set(self, pin, active)
    }

    fn toggle(&self, pin: PinId) {
        P::toggle(self, pin)
    }

    fn schedule_clear(&self, pin: PinId, delay: Duration) {
        P::schedule_clear(self, pin, delay)
    }
}

/// A set of [`PinId`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinSet(u16);

impl PinSet {
    pub const fn empty() -> Self {
        PinSet(0)
    }

    pub fn insert(&mut self, pin: PinId) {
        self.0 |= 1 << pin.index();
    }

    pub const fn contains(&self, pin: PinId) -> bool {
        self.0 & (1 << pin.index()) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = PinId> {
        PinId::ALL.into_iter().filter(move |pin| self.contains(*pin))
    }
}

/// Pending pin clears, one slot per [`PinId`].
///
/// Probe implementations forward [`Probe::schedule_clear`] here and spawn
/// [`run`](Self::run) to carry the clears out.
pub struct ClearTable {
    deadlines: Mutex<CriticalSectionRawMutex, Cell<[Option<Instant>; PinId::COUNT]>>,
    rearm: Signal<CriticalSectionRawMutex, ()>,
}

impl ClearTable {
    pub const fn new() -> Self {
        Self {
            deadlines: Mutex::new(Cell::new([None; PinId::COUNT])),
            rearm: Signal::new(),
        }
    }

    /// Clear `pin` at `at`, replacing an earlier schedule for the same pin.
    pub fn schedule(&self, pin: PinId, at: Instant) {
        self.deadlines.lock(|d| {
            let mut deadlines = d.get();
            deadlines[pin.index()] = Some(at);
            d.set(deadlines);
        });
        self.rearm.signal(());
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.lock(|d| d.get().into_iter().flatten().min())
    }

    /// Remove and return every pin due at `now`.
    pub fn expire(&self, now: Instant) -> PinSet {
        self.deadlines.lock(|d| {
            let mut deadlines = d.get();
            let mut due = PinSet::empty();
            for pin in PinId::ALL {
                if deadlines[pin.index()].is_some_and(|at| at <= now) {
                    deadlines[pin.index()] = None;
                    due.insert(pin);
                }
            }
            d.set(deadlines);
            due
        })
    }

    /// Drive pins inactive as their deadlines pass.
    pub async fn run<P: Probe + ?Sized>(&self, probe: &P) -> ! {
        loop {
            match self.next_deadline() {
                Some(at) => {
                    select(Timer::at(at), self.rearm.wait()).await;
                }
                None => self.rearm.wait().await,
            }

            for pin in self.expire(Instant::now()).iter() {
                trace!("clearing probe {:?}", pin);
                probe.set(pin, false);
            }
        }
    }
}

impl Default for ClearTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Toggle the [`PinId::Main`] output forever.
pub async fn heartbeat<P: Probe + ?Sized>(probe: &P, period: Duration) -> ! {
    loop {
        probe.toggle(PinId::Main);
        Timer::after(period).await;
    }
}
