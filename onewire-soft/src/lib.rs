#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

/*! # onewire-soft
 *
 * A software 1-Wire master that bit-bangs an open-drain GPIO line, paced by
 * an external slot tick.
 *
 * The master performs exactly one time slot of bus activity per consumed
 * tick. When no tick is pending, every poll returns
 * [`nb::Error::WouldBlock`] without touching the line, so the calling
 * context is never blocked across slot boundaries; only the microsecond
 * holds inside a slot are driven synchronously through the
 * [`DelayNs`](embedded_hal::delay::DelayNs) provider.
 */

pub use onewire_nb::{OneWireError, OneWireNb, OneWireResult, OneWireStatus};

mod slot;
mod status;
mod tick;
mod timing;

pub use status::LineStatus;
pub use tick::{SharedTick, TickSource};
pub use timing::SlotTiming;

use embedded_hal::digital::OutputPin;

use crate::slot::PresenceDetect;

/// A bit-banged 1-Wire bus master.
///
/// Owns the open-drain data pin (implementing the
/// [`InputPin`](embedded_hal::digital::InputPin) and [`OutputPin`] traits),
/// a [`DelayNs`](embedded_hal::delay::DelayNs) provider for the
/// intra-slot microsecond holds, and a [`TickSource`] that paces the slots.
/// The caller is responsible for configuring the pin as open-drain with a
/// pull-up so that `set_high` releases the line.
pub struct SoftMaster<P, D, T> {
    pub(crate) pin: P,
    pub(crate) delay: D,
    pub(crate) ticks: T,
    pub(crate) timing: SlotTiming,
    pub(crate) status: LineStatus,
    pub(crate) detector: PresenceDetect,
}

/// Builder for creating a [`SoftMaster`] with custom slot timing.
#[derive(Debug, Default)]
pub struct SoftMasterBuilder {
    timing: SlotTiming,
}

impl SoftMasterBuilder {
    /// Sets the slot timing parameters.
    pub fn with_timing(mut self, timing: SlotTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Builds the master and releases the line so the bus idles high.
    ///
    /// # Errors
    /// Returns an error if releasing the line fails.
    pub fn build<P: OutputPin, D, T>(
        self,
        mut pin: P,
        delay: D,
        ticks: T,
    ) -> OneWireResult<SoftMaster<P, D, T>, P::Error> {
        pin.set_high()?;
        Ok(SoftMaster {
            pin,
            delay,
            ticks,
            timing: self.timing,
            status: LineStatus::new(),
            detector: PresenceDetect::default(),
        })
    }
}

impl<P: OutputPin, D, T> SoftMaster<P, D, T> {
    /// Creates a master with default slot timing and releases the line.
    ///
    /// # Errors
    /// Returns an error if releasing the line fails.
    pub fn new(pin: P, delay: D, ticks: T) -> OneWireResult<Self, P::Error> {
        SoftMasterBuilder::default().build(pin, delay, ticks)
    }
}

impl<P, D, T> SoftMaster<P, D, T> {
    /// The slot timing this master runs with.
    pub fn timing(&self) -> &SlotTiming {
        &self.timing
    }

    /// Releases the pin, delay provider, and tick source.
    pub fn into_parts(self) -> (P, D, T) {
        (self.pin, self.delay, self.ticks)
    }
}
