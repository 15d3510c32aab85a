//! One time slot of bus activity per consumed tick.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use onewire_nb::{OneWireError, OneWireNb};

use crate::status::LineStatus;
use crate::tick::TickSource;
use crate::SoftMaster;

fn pin_err<E>(err: E) -> nb::Error<OneWireError<E>> {
    nb::Error::Other(OneWireError::Other(err))
}

/// Presence-detect progress, advanced one read slot at a time.
///
/// Counts consecutive low samples after a reset pulse. A low-to-high
/// transition following at least one low sample means a device held its
/// presence pulse and released; too many lows in a row mean nothing ever
/// released the line.
#[derive(Debug, Default)]
pub(crate) struct PresenceDetect {
    state: DetectState,
    lows: u8,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum DetectState {
    #[default]
    Sampling,
    Detected,
    TimedOut,
}

impl<P, D, T> OneWireNb for SoftMaster<P, D, T>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    T: TickSource,
{
    type BusError = P::Error;
    type Status = LineStatus;

    fn poll_reset_pulse(&mut self) -> nb::Result<(), OneWireError<P::Error>> {
        if !self.ticks.take_tick() {
            return Err(nb::Error::WouldBlock);
        }
        // The pulse spans many nominal slots; stop the tick supply while the
        // line is held low.
        self.ticks.suspend();
        self.status.set_presence_detect(false);
        self.detector = PresenceDetect::default();
        self.pin.set_low().map_err(pin_err)?;
        self.delay.delay_us(self.timing.reset_low_us);
        self.pin.set_high().map_err(pin_err)?;
        self.ticks.resume();
        Ok(())
    }

    fn poll_presence(&mut self) -> nb::Result<(), OneWireError<P::Error>> {
        match self.detector.state {
            DetectState::Sampling => {
                let level = self.poll_read_bit()?;
                if !level {
                    self.detector.lows += 1;
                } else if self.detector.lows > 0 {
                    self.detector.state = DetectState::Detected;
                }
                if self.detector.lows > self.timing.presence_timeout_slots {
                    self.detector.state = DetectState::TimedOut;
                }
                Err(nb::Error::WouldBlock)
            }
            DetectState::Detected => {
                self.detector = PresenceDetect::default();
                self.status.set_presence_detect(true);
                Ok(())
            }
            DetectState::TimedOut => {
                self.detector = PresenceDetect::default();
                Err(nb::Error::Other(OneWireError::NoDevicePresent))
            }
        }
    }

    fn poll_write_bit(&mut self, bit: bool) -> nb::Result<(), OneWireError<P::Error>> {
        if !self.ticks.take_tick() {
            return Err(nb::Error::WouldBlock);
        }
        let low_us = if bit {
            self.timing.write_one_low_us
        } else {
            self.timing.write_zero_low_us
        };
        self.pin.set_low().map_err(pin_err)?;
        self.delay.delay_us(low_us);
        self.pin.set_high().map_err(pin_err)?;
        Ok(())
    }

    fn poll_read_bit(&mut self) -> nb::Result<bool, OneWireError<P::Error>> {
        if !self.ticks.take_tick() {
            return Err(nb::Error::WouldBlock);
        }
        self.pin.set_low().map_err(pin_err)?;
        self.delay.delay_us(self.timing.read_init_low_us);
        self.pin.set_high().map_err(pin_err)?;
        self.delay.delay_us(self.timing.read_sample_delay_us);
        let level = self.pin.is_high().map_err(pin_err)?;
        self.status.set_single_bit_result(level);
        Ok(level)
    }

    fn status(&self) -> LineStatus {
        self.status
    }
}
