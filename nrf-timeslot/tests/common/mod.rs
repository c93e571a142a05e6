#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::vec::Vec;

use embassy_time::Duration;
use nrf_timeslot::{
    Action, DeadlineTimer, Error, PinId, Probe, ProbeError, Scheduler, SessionId, SlotHandler, TimeslotRequest,
    TimeslotSignal,
};

/// Probe that records every toggle and can be told to fail initialization.
#[derive(Default)]
pub struct RecordingProbe {
    pub fail_init: bool,
    pub toggles: RefCell<Vec<PinId>>,
}

impl RecordingProbe {
    pub fn count(&self, pin: PinId) -> usize {
        self.toggles.borrow().iter().filter(|p| **p == pin).count()
    }
}

impl Probe for RecordingProbe {
    fn init(&self) -> Result<(), ProbeError> {
        if self.fail_init {
            Err(ProbeError)
        } else {
            Ok(())
        }
    }

    fn set(&self, _pin: PinId, _active: bool) {}

    fn toggle(&self, pin: PinId) {
        self.toggles.borrow_mut().push(pin);
    }

    fn schedule_clear(&self, _pin: PinId, _delay: Duration) {}
}

#[derive(Default)]
pub struct NullTimer;

impl DeadlineTimer for NullTimer {
    fn arm(&mut self, _offset_us: u32) {}

    fn disarm(&mut self) {}
}

/// Records scheduler calls and hands out session 0.
#[derive(Default)]
pub struct RecordingScheduler {
    pub opened: usize,
    pub requests: Vec<TimeslotRequest>,
    pub closed: usize,
}

impl Scheduler for RecordingScheduler {
    fn open_session(&mut self) -> Result<SessionId, Error> {
        self.opened += 1;
        Ok(SessionId(0))
    }

    fn request(&mut self, _session: SessionId, request: &TimeslotRequest) -> Result<(), Error> {
        self.requests.push(*request);
        Ok(())
    }

    fn close_session(&mut self, _session: SessionId) -> Result<(), Error> {
        self.closed += 1;
        Ok(())
    }
}

/// Run one granted slot through the callback the way MPSL would:
/// start, deadline expiry, then idle.
pub fn run_slot<P: Probe, T: DeadlineTimer, const N: usize>(handler: &mut SlotHandler<'_, P, T, N>) {
    assert_eq!(handler.on_signal(TimeslotSignal::Start), Some(Action::None));
    assert_eq!(handler.on_signal(TimeslotSignal::Timer0), Some(Action::End));
    assert_eq!(handler.on_signal(TimeslotSignal::SessionIdle), None);
}

/// Scheduler that grants every request immediately by running the slot inline.
pub struct InlineScheduler<'h, 'a, P, T, const N: usize> {
    pub handler: &'h RefCell<SlotHandler<'a, P, T, N>>,
    pub requests: &'h Cell<usize>,
}

impl<P: Probe, T: DeadlineTimer, const N: usize> Scheduler for InlineScheduler<'_, '_, P, T, N> {
    fn open_session(&mut self) -> Result<SessionId, Error> {
        Ok(SessionId(1))
    }

    fn request(&mut self, _session: SessionId, _request: &TimeslotRequest) -> Result<(), Error> {
        self.requests.set(self.requests.get() + 1);
        run_slot(&mut self.handler.borrow_mut());
        Ok(())
    }

    fn close_session(&mut self, _session: SessionId) -> Result<(), Error> {
        Ok(())
    }
}
