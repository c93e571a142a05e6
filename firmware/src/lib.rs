//! nRF52840 bindings for `nrf-timeslot`: the MPSL scheduler, the TIMER0 deadline and GPIO probes.
#![no_std]

pub mod deadline;
pub mod probe;
pub mod scheduler;

#[cfg(not(feature = "high-load"))]
pub const DATA_CAP: usize = nrf_timeslot::DATA_CAPACITY;
#[cfg(feature = "high-load")]
pub const DATA_CAP: usize = nrf_timeslot::HIGH_LOAD_DATA_CAPACITY;
