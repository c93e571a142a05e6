//! The timeslot callback.
//!
//! Runs in the highest priority interrupt context, driven by the scheduler. It
//! must never block: samples are pushed without waiting and the gate is given
//! without checking its state.
use crate::config::Config;
use crate::data::{DataChannel, Sample};
use crate::gate::Gate;
use crate::probe::{PinId, Probe};
use crate::scheduler::{Action, TimeslotSignal, UnknownSignal};
use crate::timer::DeadlineTimer;

/// State of the timeslot callback.
pub struct SlotHandler<'a, P, T, const N: usize> {
    data: &'a DataChannel<N>,
    gate: &'a Gate,
    config: &'a Config,
    probe: P,
    timer: T,
    last: Sample,
    armed: bool,
}

impl<'a, P: Probe, T: DeadlineTimer, const N: usize> SlotHandler<'a, P, T, N> {
    pub fn new(data: &'a DataChannel<N>, gate: &'a Gate, config: &'a Config, probe: P, timer: T) -> Self {
        Self {
            data,
            gate,
            config,
            probe,
            timer,
            last: Sample(0),
            armed: false,
        }
    }

    /// The most recently produced sample, `Sample(0)` before the first slot.
    pub fn last_sample(&self) -> Sample {
        self.last
    }

    /// Handle a raw signal number from the scheduler.
    ///
    /// # Panics
    ///
    /// Panics on a signal this application does not expect. There is no action
    /// that is safe to return for an unknown event.
    pub fn dispatch(&mut self, raw: u32) -> Option<Action> {
        match TimeslotSignal::try_from(raw) {
            Ok(signal) => self.on_signal(signal),
            Err(UnknownSignal(raw)) => {
                error!("unexpected signal: {}", raw);
                panic!("unexpected timeslot signal: {}", raw)
            }
        }
    }

    /// Handle a signal. `None` means the callback has no return parameters.
    pub fn on_signal(&mut self, signal: TimeslotSignal) -> Option<Action> {
        match signal {
            TimeslotSignal::Start => {
                self.start();
                Some(Action::None)
            }
            TimeslotSignal::Timer0 => {
                self.timer.disarm();
                self.armed = false;
                self.probe.toggle(PinId::SlotTimer);
                Some(Action::End)
            }
            TimeslotSignal::SessionIdle => {
                self.probe.mark(PinId::SlotIdle, self.config.probe_mode);
                self.gate.give();
                None
            }
            TimeslotSignal::SessionClosed => None,
        }
    }

    fn start(&mut self) {
        if self.armed {
            self.timer.disarm();
        }
        self.timer.arm(self.config.deadline_us());
        self.armed = true;

        self.probe.toggle(PinId::SlotStart);

        for _ in 0..self.config.batch_size {
            if self.config.probe_tx {
                self.probe.toggle(PinId::Test);
            }
            self.last = self.last.next();
            // A full channel is expected under load; the channel counts the loss.
            self.data.push(self.last);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::vec::Vec;

    use embassy_time::Duration;

    use super::*;
    use crate::error::ProbeError;
    use crate::probe::ProbeMode;

    #[derive(Default)]
    struct Pins(RefCell<Vec<(PinId, &'static str)>>);

    impl Probe for Pins {
        fn init(&self) -> Result<(), ProbeError> {
            Ok(())
        }

        fn set(&self, pin: PinId, active: bool) {
            self.0.borrow_mut().push((pin, if active { "on" } else { "off" }));
        }

        fn toggle(&self, pin: PinId) {
            self.0.borrow_mut().push((pin, "toggle"));
        }

        fn schedule_clear(&self, pin: PinId, _delay: Duration) {
            self.0.borrow_mut().push((pin, "clear"));
        }
    }

    #[derive(Default)]
    struct Deadline(Vec<Option<u32>>);

    impl DeadlineTimer for Deadline {
        fn arm(&mut self, offset_us: u32) {
            self.0.push(Some(offset_us));
        }

        fn disarm(&mut self) {
            self.0.push(None);
        }
    }

    fn drain<const N: usize>(data: &DataChannel<N>) -> Vec<u8> {
        core::iter::from_fn(|| data.pop()).map(Sample::value).collect()
    }

    #[test]
    fn start_produces_a_batch_and_arms_the_deadline() {
        let data = DataChannel::<120>::new();
        let gate = Gate::new();
        let config = Config::new();
        let pins = Pins::default();
        let mut timer = Deadline::default();
        let mut handler = SlotHandler::new(&data, &gate, &config, &pins, &mut timer);

        assert_eq!(handler.on_signal(TimeslotSignal::Start), Some(Action::None));
        assert_eq!(handler.last_sample(), Sample(20));
        assert_eq!(handler.on_signal(TimeslotSignal::Timer0), Some(Action::End));
        assert_eq!(handler.dispatch(TimeslotSignal::START), Some(Action::None));
        drop(handler);

        assert_eq!(drain(&data), (1..=40).collect::<Vec<u8>>());
        assert_eq!(timer.0, [Some(6500), None, Some(6500)]);
        assert_eq!(
            *pins.0.borrow(),
            [
                (PinId::SlotStart, "toggle"),
                (PinId::SlotTimer, "toggle"),
                (PinId::SlotStart, "toggle")
            ]
        );
        assert!(!gate.is_given());
    }

    #[test]
    fn deadline_is_disarmed_before_rearming() {
        let data = DataChannel::<120>::new();
        let gate = Gate::new();
        let config = Config::new();
        let mut timer = Deadline::default();
        let mut handler = SlotHandler::new(&data, &gate, &config, Pins::default(), &mut timer);

        // Second start without an expiry in between.
        handler.on_signal(TimeslotSignal::Start);
        handler.on_signal(TimeslotSignal::Start);
        drop(handler);

        assert_eq!(timer.0, [Some(6500), None, Some(6500)]);
    }

    #[test]
    fn full_channel_drops_the_rest_of_the_batch() {
        let data = DataChannel::<8>::new();
        let gate = Gate::new();
        let config = Config::new().with_probe_tx(true);
        let pins = Pins::default();
        let mut handler = SlotHandler::new(&data, &gate, &config, &pins, Deadline::default());

        handler.on_signal(TimeslotSignal::Start);

        assert_eq!(handler.last_sample(), Sample(20));
        assert_eq!(data.dropped(), 12);
        assert_eq!(drain(&data), [1, 2, 3, 4, 5, 6, 7, 8]);
        let toggles = pins.0.borrow().iter().filter(|(pin, _)| *pin == PinId::Test).count();
        assert_eq!(toggles, 20);
    }

    #[test]
    fn idle_opens_the_gate_once() {
        let data = DataChannel::<120>::new();
        let gate = Gate::new();
        let config = Config::new().with_probe_mode(ProbeMode::Pulse);
        let pins = Pins::default();
        let mut handler = SlotHandler::new(&data, &gate, &config, &pins, Deadline::default());

        assert_eq!(handler.on_signal(TimeslotSignal::SessionIdle), None);
        assert_eq!(handler.dispatch(TimeslotSignal::SESSION_IDLE), None);
        assert_eq!(handler.on_signal(TimeslotSignal::SessionClosed), None);

        assert!(gate.try_take());
        assert!(!gate.try_take());
        assert_eq!(
            pins.0.borrow()[..2],
            [(PinId::SlotIdle, "on"), (PinId::SlotIdle, "clear")]
        );
        assert!(data.is_empty());
    }

    #[test]
    #[should_panic(expected = "unexpected timeslot signal: 5")]
    fn unknown_signal_halts() {
        let data = DataChannel::<120>::new();
        let gate = Gate::new();
        let config = Config::new();
        let mut handler = SlotHandler::new(&data, &gate, &config, Pins::default(), Deadline::default());

        handler.dispatch(5);
    }
}
