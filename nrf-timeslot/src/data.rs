//! Bounded sample channel from the timeslot callback to the negotiator thread.
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// One sampled byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample(pub u8);

impl Sample {
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The sample produced after this one.
    pub const fn next(self) -> Sample {
        Sample(self.0.wrapping_add(1))
    }
}

/// Fixed-capacity FIFO of [`Sample`]s.
///
/// Pushing never blocks: when the channel is full the new sample is dropped and
/// counted, the queued samples stay as they are. Safe to push from interrupt context.
pub struct DataChannel<const N: usize> {
    inner: Channel<CriticalSectionRawMutex, Sample, N>,
    dropped: AtomicU32,
}

impl<const N: usize> DataChannel<N> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a sample, returning `false` if it was dropped.
    pub fn push(&self, sample: Sample) -> bool {
        match self.inner.try_send(sample) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Take the oldest sample, if any.
    pub fn pop(&self) -> Option<Sample> {
        self.inner.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Total number of samples lost because the channel was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for DataChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}
