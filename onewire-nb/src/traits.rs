use crate::OneWireError;

/// Bus-level conditions a master reports to the layers above it.
pub trait OneWireStatus {
    /// Whether a device answered the most recent reset with a presence pulse.
    fn presence(&self) -> bool;

    /// Level sampled in the most recent read slot, if the master records it.
    fn logic_level(&self) -> Option<bool> {
        None
    }
}

/// Polled 1-Wire bus master.
///
/// Every method performs at most one time slot of bus activity. When the
/// current slot has not elapsed yet, the method returns
/// [`nb::Error::WouldBlock`] without touching the bus or its own state; the
/// caller re-polls once the next slot tick arrives. This keeps the whole
/// stack single-stepped: one invocation of the top-level machine per tick
/// advances exactly one slot's worth of wire activity.
pub trait OneWireNb {
    /// The error type of the underlying line driver.
    type BusError;
    /// The status snapshot type reported by [`OneWireNb::status`].
    type Status: OneWireStatus;

    /// Drives the long reset pulse and releases the line.
    ///
    /// The pulse occupies many nominal slot widths; implementations suspend
    /// their slot timing for its duration.
    ///
    /// # Errors
    /// Returns an error if the line driver fails.
    fn poll_reset_pulse(&mut self) -> nb::Result<(), OneWireError<Self::BusError>>;

    /// Advances presence detection by one read slot.
    ///
    /// Call repeatedly after [`OneWireNb::poll_reset_pulse`] completes.
    /// Completes with `Ok(())` once a device's presence pulse has been seen.
    ///
    /// # Errors
    /// Returns [`OneWireError::NoDevicePresent`] when the line stays low for
    /// more than the configured number of consecutive slots, or a line driver
    /// error.
    fn poll_presence(&mut self) -> nb::Result<(), OneWireError<Self::BusError>>;

    /// Produces one write slot carrying the given bit.
    ///
    /// # Errors
    /// Returns an error if the line driver fails.
    fn poll_write_bit(&mut self, bit: bool) -> nb::Result<(), OneWireError<Self::BusError>>;

    /// Produces one read slot and samples the line.
    ///
    /// # Errors
    /// Returns an error if the line driver fails.
    fn poll_read_bit(&mut self) -> nb::Result<bool, OneWireError<Self::BusError>>;

    /// Snapshot of the master's current view of the bus.
    fn status(&self) -> Self::Status;
}
