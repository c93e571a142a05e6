use crate::config::Config;
use crate::control::{ControlChannel, SessionRequest};
use crate::error::SessionError;
use crate::gate::Gate;
use crate::scheduler::{Scheduler, SessionId};

/// The only component that calls into the session API.
///
/// Requests arrive over a [`ControlChannel`] and are executed one at a time, in
/// arrival order. Run it from a context that the scheduler's own low priority
/// processing cannot preempt.
pub struct ResourceOwner<'a, S, const C: usize> {
    scheduler: S,
    control: &'a ControlChannel<C>,
    gate: &'a Gate,
    config: &'a Config,
    session: Option<SessionId>,
}

impl<'a, S: Scheduler, const C: usize> ResourceOwner<'a, S, C> {
    pub fn new(scheduler: S, control: &'a ControlChannel<C>, gate: &'a Gate, config: &'a Config) -> Self {
        Self {
            scheduler,
            control,
            gate,
            config,
            session: None,
        }
    }

    /// The currently open session, if any.
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Execute a single request.
    pub fn process(&mut self, request: SessionRequest) -> Result<(), SessionError> {
        match request {
            SessionRequest::OpenSession => {
                if self.session.is_some() {
                    return Err(SessionError::AlreadyOpen);
                }
                let session = self.scheduler.open_session()?;
                self.session = Some(session);
                info!("opened session {:?}", session);
                // Let the first negotiation cycle through without waiting for an idle signal.
                self.gate.give();
            }
            SessionRequest::MakeRequest => {
                let session = self.session.ok_or(SessionError::NotOpen)?;
                self.scheduler.request(session, &self.config.request())?;
            }
            SessionRequest::CloseSession => {
                let session = self.session.ok_or(SessionError::NotOpen)?;
                self.scheduler.close_session(session)?;
                self.session = None;
                info!("closed session {:?}", session);
            }
        }
        Ok(())
    }

    /// Serve requests forever.
    ///
    /// # Panics
    ///
    /// Panics if any request fails. Nothing that depends on the session can make
    /// progress afterwards.
    pub async fn run(&mut self) -> ! {
        loop {
            let request = self.control.receive().await;
            if let Err(err) = self.process(request) {
                error!("{:?} failed: {:?}", request, err);
                panic!("timeslot session call failed: {:?}", err);
            }
        }
    }
}
