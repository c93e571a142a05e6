/// One-shot timer that ends a slot before the scheduler reclaims it.
///
/// The timer runs relative to slot start and raises the `Timer0` signal in the
/// timeslot callback when it expires. Both methods are called from the callback.
pub trait DeadlineTimer {
    /// Expire `offset_us` microseconds after slot start.
    fn arm(&mut self, offset_us: u32);

    /// Stop the timer and acknowledge a pending expiry.
    fn disarm(&mut self);
}

impl<T: DeadlineTimer + ?Sized> DeadlineTimer for &mut T {
    fn arm(&mut self, offset_us: u32) {
        T::arm(self, offset_us)
    }

    fn disarm(&mut self) {
        T::disarm(self)
    }
}
