//! The timeslot scheduler seen from the application side.
//!
//! [`Scheduler`] covers the three session calls of the MPSL timeslot API.
//! The scheduler in turn invokes a registered callback with a
//! [`TimeslotSignal`] and expects an [`Action`] back; see [`crate::SlotHandler`].

use crate::error::Error;

/// Identifier of an open timeslot session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionId(pub u8);

/// Clock requirement for a timeslot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HfclkConfig {
    /// The high frequency clock may be off during the slot.
    NoGuarantee,
    /// The high frequency crystal must be running for the whole slot.
    XtalGuaranteed,
}

/// Priority of a timeslot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Priority {
    Normal,
    High,
}

/// Parameters of an earliest-available timeslot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeslotRequest {
    pub hfclk: HfclkConfig,
    pub priority: Priority,
    /// Length of the slot.
    pub length_us: u32,
    /// Give up if no slot could be granted within this time.
    pub timeout_us: u32,
}

impl TimeslotRequest {
    /// A normal priority request with no clock guarantee.
    pub const fn earliest(length_us: u32, timeout_us: u32) -> Self {
        Self {
            hfclk: HfclkConfig::NoGuarantee,
            priority: Priority::Normal,
            length_us,
            timeout_us,
        }
    }
}

/// Session lifecycle events delivered to the timeslot callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeslotSignal {
    /// The slot has started.
    Start,
    /// The slot timer (TIMER0) fired.
    Timer0,
    /// No slot is granted or pending; a new request may be made.
    SessionIdle,
    /// The session has been closed.
    SessionClosed,
}

impl TimeslotSignal {
    pub const START: u32 = 0;
    pub const TIMER0: u32 = 1;
    pub const SESSION_IDLE: u32 = 7;
    pub const SESSION_CLOSED: u32 = 9;
}

/// A raw signal that the callback does not handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownSignal(pub u32);

impl TryFrom<u32> for TimeslotSignal {
    type Error = UnknownSignal;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            Self::START => Ok(Self::Start),
            Self::TIMER0 => Ok(Self::Timer0),
            Self::SESSION_IDLE => Ok(Self::SessionIdle),
            Self::SESSION_CLOSED => Ok(Self::SessionClosed),
            other => Err(UnknownSignal(other)),
        }
    }
}

/// What the scheduler should do once the callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Keep the current slot running.
    None,
    /// End the current slot now.
    End,
}

/// Session calls of the timeslot API.
///
/// Implementations register the timeslot callback as part of [`open_session`](Scheduler::open_session).
/// All methods must be called from the same, non-preemptible context; in this crate
/// that is the [`ResourceOwner`](crate::ResourceOwner).
pub trait Scheduler {
    fn open_session(&mut self) -> Result<SessionId, Error>;

    fn request(&mut self, session: SessionId, request: &TimeslotRequest) -> Result<(), Error>;

    fn close_session(&mut self, session: SessionId) -> Result<(), Error>;
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn open_session(&mut self) -> Result<SessionId, Error> {
        S::open_session(self)
    }

    fn request(&mut self, session: SessionId, request: &TimeslotRequest) -> Result<(), Error> {
        S::request(self, session, request)
    }

    fn close_session(&mut self, session: SessionId) -> Result<(), Error> {
        S::close_session(self, session)
    }
}
