#![cfg_attr(not(test), no_std)]
//! Polled readout of a DS18B20 temperature sensor on a single-drop 1-Wire bus.
//!
//! One measurement takes two full bus cycles: the first resets the bus, reads
//! the ROM record and triggers a conversion; the second resets again, reads
//! the ROM record and fetches the scratchpad. [`Ds18b20::poll`] advances the
//! whole sequence one slot per call and yields the converted temperature
//! exactly once per double cycle.

use fixed::types::I12F4;
use onewire_nb::{Command, OneWireError, OneWireNb, Reply, Rom, Transaction};

/// Fixed-point temperature in degrees Celsius, 4 fractional bits.
pub type Temperature = I12F4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleState {
    Reset,
    ReadRom,
    Function,
}

/// Measurement cycle for one sensor, advanced one bus slot per poll.
#[derive(Debug)]
pub struct Ds18b20 {
    state: CycleState,
    pulse_sent: bool,
    conversion_started: bool,
    tx: Transaction,
    rom: Option<Rom>,
    raw: Option<i16>,
}

impl Default for Ds18b20 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ds18b20 {
    /// Family code shared by all DS18B20 devices.
    #[inline]
    pub const fn family() -> u8 {
        0x28
    }

    /// Creates an idle driver ready to start a measurement cycle.
    pub fn new() -> Self {
        Self {
            state: CycleState::Reset,
            pulse_sent: false,
            conversion_started: false,
            tx: Transaction::new(Command::ReadRom),
            rom: None,
            raw: None,
        }
    }

    /// Advances the measurement cycle by one bus slot.
    ///
    /// Returns the whole-degree reading on the poll that completes the
    /// scratchpad readback; every earlier poll reports `WouldBlock`. On
    /// [`OneWireError::NoDevicePresent`] the cycle re-arms itself, so the
    /// next poll starts over with a fresh reset pulse.
    ///
    /// # Errors
    /// Propagates presence-detect timeouts and line driver errors.
    pub fn poll<O: OneWireNb>(&mut self, bus: &mut O) -> nb::Result<i16, OneWireError<O::BusError>> {
        match self.state {
            CycleState::Reset => {
                if !self.pulse_sent {
                    bus.poll_reset_pulse()?;
                    self.pulse_sent = true;
                    return Err(nb::Error::WouldBlock);
                }
                match bus.poll_presence() {
                    Ok(()) => {}
                    Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
                    Err(err) => {
                        // No presence: re-arm so the caller's next poll opens
                        // a new cycle with a fresh reset pulse.
                        self.pulse_sent = false;
                        return Err(err);
                    }
                }
                self.state = CycleState::ReadRom;
                self.tx = Transaction::new(Command::ReadRom);
                Err(nb::Error::WouldBlock)
            }
            CycleState::ReadRom => {
                if let Reply::Rom(rom) = self.tx.poll(bus)? {
                    self.rom = Some(rom);
                }
                self.state = CycleState::Function;
                self.tx = Transaction::new(if self.conversion_started {
                    Command::ReadScratchpad
                } else {
                    Command::ConvertT
                });
                Err(nb::Error::WouldBlock)
            }
            CycleState::Function => match self.tx.poll(bus)? {
                Reply::Ready => {
                    // Conversion is running in the device; a second cycle
                    // must reset, re-read the ROM and fetch the result.
                    self.conversion_started = true;
                    self.pulse_sent = false;
                    self.state = CycleState::Reset;
                    Err(nb::Error::WouldBlock)
                }
                Reply::Scratchpad(raw) => {
                    self.raw = Some(raw);
                    self.conversion_started = false;
                    self.pulse_sent = false;
                    self.state = CycleState::Reset;
                    Ok(raw >> 4)
                }
                // The function commands produce no other replies.
                Reply::Rom(_) | Reply::Done => Err(nb::Error::WouldBlock),
            },
        }
    }

    /// Last converted temperature in whole degrees Celsius.
    pub fn temperature(&self) -> Option<i16> {
        self.raw.map(|raw| raw >> 4)
    }

    /// Last converted temperature with the sensor's fractional bits.
    pub fn temperature_fine(&self) -> Option<Temperature> {
        self.raw.map(Temperature::from_bits)
    }

    /// Identification record read during the last cycle.
    pub fn rom(&self) -> Option<&Rom> {
        self.rom.as_ref()
    }

    /// Family code from the last ROM readout.
    pub fn family_code(&self) -> Option<u8> {
        self.rom.map(|rom| rom.family_code)
    }
}
