//! Composition root.
//!
//! [`Resources`] owns every structure shared between execution contexts. Build it
//! once at startup (typically in a `static`, since the timeslot callback cannot
//! carry a context pointer) and hand out the components it creates.
use crate::config::Config;
use crate::control::{ControlChannel, SessionRequest};
use crate::data::DataChannel;
use crate::error::ProbeError;
use crate::gate::Gate;
use crate::negotiator::Negotiator;
use crate::owner::ResourceOwner;
use crate::probe::Probe;
use crate::scheduler::Scheduler;
use crate::slot::SlotHandler;
use crate::timer::DeadlineTimer;

/// Shared channels and gate, with data channel capacity `N` and control channel capacity `C`.
pub struct Resources<const N: usize, const C: usize> {
    pub data: DataChannel<N>,
    pub control: ControlChannel<C>,
    pub gate: Gate,
}

impl<const N: usize, const C: usize> Resources<N, C> {
    pub const fn new() -> Self {
        Self {
            data: DataChannel::new(),
            control: ControlChannel::new(),
            gate: Gate::new(),
        }
    }

    pub fn owner<'a, S: Scheduler>(&'a self, scheduler: S, config: &'a Config) -> ResourceOwner<'a, S, C> {
        ResourceOwner::new(scheduler, &self.control, &self.gate, config)
    }

    pub fn negotiator<'a, P: Probe>(&'a self, probe: P, config: &'a Config) -> Negotiator<'a, P, N, C> {
        Negotiator::new(&self.control, &self.data, &self.gate, config, probe)
    }

    pub fn slot_handler<'a, P: Probe, T: DeadlineTimer>(
        &'a self,
        probe: P,
        timer: T,
        config: &'a Config,
    ) -> SlotHandler<'a, P, T, N> {
        SlotHandler::new(&self.data, &self.gate, config, probe, timer)
    }

    /// Prepare the system for its loops.
    ///
    /// Configures the probe outputs and queues the `OpenSession` request, so that it
    /// is processed before any request the negotiator produces. On error nothing has
    /// been queued and the loops must not be started.
    pub async fn bootstrap<P: Probe + ?Sized>(&self, probe: &P) -> Result<(), ProbeError> {
        if let Err(err) = probe.init() {
            error!("probe init failed: {:?}", err);
            return Err(err);
        }
        self.control.send(SessionRequest::OpenSession).await;
        Ok(())
    }
}

impl<const N: usize, const C: usize> Default for Resources<N, C> {
    fn default() -> Self {
        Self::new()
    }
}
