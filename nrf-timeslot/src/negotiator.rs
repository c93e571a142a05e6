use embassy_time::Timer;

use crate::config::Config;
use crate::control::{ControlChannel, SessionRequest};
use crate::data::{DataChannel, Sample};
use crate::gate::Gate;
use crate::probe::{PinId, Probe};

/// Periodically asks for a new timeslot and consumes the samples produced in previous slots.
///
/// The cadence is set by [`Config::interval`]; the [`Gate`] only decides whether a
/// given cycle may issue a request.
pub struct Negotiator<'a, P, const N: usize, const C: usize> {
    control: &'a ControlChannel<C>,
    data: &'a DataChannel<N>,
    gate: &'a Gate,
    config: &'a Config,
    probe: P,
}

impl<'a, P: Probe, const N: usize, const C: usize> Negotiator<'a, P, N, C> {
    pub fn new(
        control: &'a ControlChannel<C>,
        data: &'a DataChannel<N>,
        gate: &'a Gate,
        config: &'a Config,
        probe: P,
    ) -> Self {
        Self {
            control,
            data,
            gate,
            config,
            probe,
        }
    }

    /// Queue a `MakeRequest` if the gate is open. Returns whether a request was queued.
    ///
    /// Waits for room in the control channel; a granted request is never dropped.
    pub async fn negotiate(&self) -> bool {
        if self.gate.try_take() {
            self.probe.mark(PinId::ReqAllowed, self.config.probe_mode);
            self.control.send(SessionRequest::MakeRequest).await;
            true
        } else {
            self.probe.mark(PinId::ReqDenied, self.config.probe_mode);
            false
        }
    }

    /// Pop up to [`Config::drain_limit`] samples without waiting, passing each to `report`.
    ///
    /// Returns how many samples were consumed.
    pub fn drain(&self, mut report: impl FnMut(Sample)) -> usize {
        let mut count = 0;
        while count < self.config.drain_limit {
            let Some(sample) = self.data.pop() else {
                break;
            };
            if self.config.probe_rx {
                self.probe.toggle(PinId::Test);
            }
            report(sample);
            count += 1;
        }
        count
    }

    /// Negotiate, sleep and drain, forever.
    pub async fn run(&self) -> ! {
        loop {
            self.negotiate().await;

            Timer::after(self.config.interval).await;

            let count = self.drain(|sample| info!("{}", sample.value()));
            if count == self.config.drain_limit {
                debug!("drain limit reached, {} samples left", self.data.len());
            } else {
                debug!("no more samples");
            }
        }
    }
}
