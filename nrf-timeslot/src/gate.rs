use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Permission to issue the next timeslot request.
///
/// A binary semaphore: [`give`](Self::give) holds at most one grant no matter how
/// often it is called, [`try_take`](Self::try_take) consumes it without waiting.
pub struct Gate {
    grant: Signal<CriticalSectionRawMutex, ()>,
}

impl Gate {
    pub const fn new() -> Self {
        Self { grant: Signal::new() }
    }

    /// Grant one request. A grant that is already pending is left as is.
    pub fn give(&self) {
        self.grant.signal(());
    }

    /// Consume the pending grant, returning `false` if there was none.
    pub fn try_take(&self) -> bool {
        self.grant.try_take().is_some()
    }

    pub fn is_given(&self) -> bool {
        self.grant.signaled()
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn give_is_idempotent() {
        let gate = Gate::new();
        assert!(!gate.try_take());

        gate.give();
        gate.give();
        gate.give();
        assert!(gate.is_given());
        assert!(gate.try_take());
        assert!(!gate.try_take());
        assert!(!gate.is_given());
    }
}
