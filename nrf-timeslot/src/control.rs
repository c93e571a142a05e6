//! Session requests queued for the resource owner.
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// A pending call into the timeslot session API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionRequest {
    OpenSession,
    MakeRequest,
    CloseSession,
}

/// FIFO of [`SessionRequest`]s.
///
/// Unlike the [`DataChannel`](crate::DataChannel), nothing is ever dropped here:
/// [`send`](Self::send) waits for room.
pub struct ControlChannel<const N: usize> {
    inner: Channel<CriticalSectionRawMutex, SessionRequest, N>,
}

impl<const N: usize> ControlChannel<N> {
    pub const fn new() -> Self {
        Self { inner: Channel::new() }
    }

    /// Queue a request, waiting as long as the channel is full.
    pub async fn send(&self, request: SessionRequest) {
        self.inner.send(request).await
    }

    /// Wait for the next request.
    pub async fn receive(&self) -> SessionRequest {
        self.inner.receive().await
    }

    pub fn try_receive(&self) -> Option<SessionRequest> {
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
}

impl<const N: usize> Default for ControlChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}
