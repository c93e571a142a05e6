//! Timeslot negotiation on top of the Nordic Multiprotocol Service Layer.
//!
//! An application that borrows the radio through the MPSL timeslot API has to
//! coordinate three execution contexts:
//!
//! - the timeslot callback ([`SlotHandler`]), run by MPSL in the highest priority
//!   interrupt. It produces [`Sample`]s into a [`DataChannel`], ends every slot
//!   through a [`DeadlineTimer`] and opens the [`Gate`] when the session goes idle.
//! - the [`ResourceOwner`], a cooperative task that is the only caller of the
//!   session API. It executes [`SessionRequest`]s from a [`ControlChannel`].
//! - the [`Negotiator`], a normal priority task that turns an open gate into a
//!   `MakeRequest` and drains the data channel.
//!
//! [`Resources`] holds the shared channels and gate and builds the three
//! components. The session API and the debug outputs are reached through the
//! [`Scheduler`] and [`Probe`] traits.
//!
//! ```rust,ignore
//! static RESOURCES: Resources<DATA_CAPACITY, CONTROL_CAPACITY> = Resources::new();
//! static CONFIG: Config = Config::new();
//!
//! unwrap!(RESOURCES.bootstrap(&probe).await);
//! spawner.must_spawn(owner_task(RESOURCES.owner(MpslScheduler::new(), &CONFIG)));
//! RESOURCES.negotiator(&probe, &CONFIG).run().await
//! ```
#![no_std]

#[cfg(test)]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod app;
pub mod config;
mod control;
mod data;
mod error;
mod gate;
mod negotiator;
mod owner;
pub mod probe;
mod scheduler;
mod slot;
mod timer;

pub use app::*;
pub use config::{Config, CONTROL_CAPACITY, DATA_CAPACITY, HIGH_LOAD_DATA_CAPACITY};
pub use control::*;
pub use data::*;
pub use error::*;
pub use gate::*;
pub use negotiator::*;
pub use owner::*;
pub use probe::{ClearTable, PinId, Probe, ProbeMode};
pub use scheduler::*;
pub use slot::*;
pub use timer::*;
