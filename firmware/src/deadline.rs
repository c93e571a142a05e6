use embassy_nrf::pac;
use nrf_timeslot::DeadlineTimer;

/// Compare channel 0 of TIMER0.
///
/// MPSL starts TIMER0 at 1 MHz from zero when a slot begins, so the compare value is
/// the offset from slot start. The compare interrupt arrives as the `Timer0` signal.
pub struct Timer0Deadline;

impl DeadlineTimer for Timer0Deadline {
    fn arm(&mut self, offset_us: u32) {
        let p = pac::TIMER0;
        p.cc(0).write_value(offset_us);
        p.intenset().write(|w| w.set_compare(0, true));
    }

    fn disarm(&mut self) {
        let p = pac::TIMER0;
        p.intenclr().write(|w| w.set_compare(0, true));
        p.events_compare(0).write_value(0);
    }
}
