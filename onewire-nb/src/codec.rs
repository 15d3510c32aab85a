//! Bit-serial codecs for instruction bytes and device replies.
//!
//! Each machine moves the bus by exactly one bit per successful poll and
//! rewinds itself when it reports completion, so a single value can be reused
//! for the next byte or reply.

use crate::{Command, OneWireError, OneWireNb, Rom};

/// Number of scratchpad bits transferred before the early terminating reset.
pub const SCRATCHPAD_REPLY_BITS: u8 = 15;

/// Serializes one instruction byte onto the bus, least significant bit first.
#[derive(Debug)]
pub struct CommandWriter {
    opcode: u8,
    mask: u8,
}

impl CommandWriter {
    /// Prepares a writer for the given command.
    pub fn new(command: Command) -> Self {
        Self {
            opcode: command.opcode(),
            mask: 0x01,
        }
    }

    /// Sends the next bit of the instruction.
    ///
    /// Completes on the poll after the eighth bit went out; that poll wraps
    /// the mask back to bit 0 and leaves the bus untouched.
    ///
    /// # Errors
    /// Propagates line driver errors from the write slot.
    pub fn poll<O: OneWireNb>(&mut self, bus: &mut O) -> nb::Result<(), OneWireError<O::BusError>> {
        if self.mask == 0 {
            self.mask = 0x01;
            return Ok(());
        }
        bus.poll_write_bit(self.opcode & self.mask != 0)?;
        self.mask <<= 1;
        Err(nb::Error::WouldBlock)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum RomField {
    #[default]
    FamilyCode,
    SerialNumber,
    Crc,
}

/// Deserializes the 64-bit ROM reply, one read slot per poll.
///
/// Fields fill strictly in transfer order; the bit index restarts at every
/// field boundary. Completes on the poll that consumes the 64th bit and
/// starts the next readout from a zeroed record.
#[derive(Debug, Default)]
pub struct RomReader {
    field: RomField,
    bit: u8,
    byte: usize,
    rom: Rom,
}

impl RomReader {
    /// Prepares a reader for a fresh ROM readout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one reply bit.
    ///
    /// # Errors
    /// Propagates line driver errors from the read slot.
    pub fn poll<O: OneWireNb>(&mut self, bus: &mut O) -> nb::Result<Rom, OneWireError<O::BusError>> {
        let bit = u8::from(bus.poll_read_bit()?);
        match self.field {
            RomField::FamilyCode => {
                self.rom.family_code |= bit << self.bit;
                self.bit += 1;
                if self.bit >= 8 {
                    self.bit = 0;
                    self.field = RomField::SerialNumber;
                }
            }
            RomField::SerialNumber => {
                self.rom.serial_number[self.byte] |= bit << (self.bit - self.byte as u8 * 8);
                self.bit += 1;
                if self.bit % 8 == 0 {
                    self.byte += 1;
                }
                if self.bit >= 48 {
                    self.bit = 0;
                    self.byte = 0;
                    self.field = RomField::Crc;
                }
            }
            RomField::Crc => {
                self.rom.crc |= bit << self.bit;
                self.bit += 1;
                if self.bit >= 8 {
                    let rom = self.rom;
                    *self = Self::default();
                    return Ok(rom);
                }
            }
        }
        Err(nb::Error::WouldBlock)
    }
}

/// Deserializes the scratchpad reply into the raw temperature accumulator.
///
/// The transfer is cut short after [`SCRATCHPAD_REPLY_BITS`] bits: in place
/// of the next read slot the reader issues a reset pulse, telling the device
/// to abandon the rest of the register transfer.
#[derive(Debug, Default)]
pub struct ScratchpadReader {
    bit: u8,
    raw: i16,
    terminating: bool,
}

impl ScratchpadReader {
    /// Prepares a reader with a zeroed accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one reply bit, or, once all bits are in, terminates the
    /// transfer and yields the accumulator.
    ///
    /// # Errors
    /// Propagates line driver errors from the read slot or reset pulse.
    pub fn poll<O: OneWireNb>(&mut self, bus: &mut O) -> nb::Result<i16, OneWireError<O::BusError>> {
        if self.terminating {
            bus.poll_reset_pulse()?;
            let raw = self.raw;
            *self = Self::default();
            return Ok(raw);
        }
        let bit = bus.poll_read_bit()?;
        self.raw |= i16::from(bit) << self.bit;
        self.bit += 1;
        if self.bit >= SCRATCHPAD_REPLY_BITS {
            self.terminating = true;
        }
        Err(nb::Error::WouldBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBus, bits_lsb_first};
    use rand::Rng;

    #[test]
    fn command_writer_emits_lsb_first() {
        for command in [
            Command::SearchRom,
            Command::ReadRom,
            Command::MatchRom,
            Command::SkipRom,
            Command::AlarmSearch,
            Command::ConvertT,
            Command::WriteScratchpad,
            Command::ReadScratchpad,
            Command::CopyScratchpad,
            Command::ReadPowerSupply,
        ] {
            let mut bus = MockBus::new();
            let mut writer = CommandWriter::new(command);
            let mut polls = 0;
            while writer.poll(&mut bus).is_err() {
                polls += 1;
            }
            assert_eq!(polls, 8, "{command:?}");
            assert_eq!(bus.writes, bits_lsb_first(&[command.opcode()]), "{command:?}");
        }
    }

    #[test]
    fn command_writer_is_reusable() {
        let mut bus = MockBus::new();
        let mut writer = CommandWriter::new(Command::ReadRom);
        while writer.poll(&mut bus).is_err() {}
        let mut again = bits_lsb_first(&[Command::ReadRom.opcode()]);
        while writer.poll(&mut bus).is_err() {}
        again.extend(bits_lsb_first(&[Command::ReadRom.opcode()]));
        assert_eq!(bus.writes, again);
    }

    #[test]
    fn command_writer_holds_without_tick() {
        let mut bus = MockBus::new();
        bus.gated = true;
        let mut writer = CommandWriter::new(Command::ConvertT);
        for _ in 0..3 {
            assert!(matches!(writer.poll(&mut bus), Err(nb::Error::WouldBlock)));
        }
        assert!(bus.writes.is_empty());
        bus.gated = false;
        while writer.poll(&mut bus).is_err() {}
        assert_eq!(bus.writes, bits_lsb_first(&[Command::ConvertT.opcode()]));
    }

    #[test]
    fn rom_reader_completes_on_bit_64() {
        let bytes = [0x28, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x9c];
        let mut bus = MockBus::new();
        bus.reads.extend(bits_lsb_first(&bytes));
        let mut reader = RomReader::new();
        for _ in 0..63 {
            assert!(matches!(reader.poll(&mut bus), Err(nb::Error::WouldBlock)));
        }
        let rom = reader.poll(&mut bus).expect("64th bit completes the readout");
        assert_eq!(rom.to_bytes(), bytes);
        assert_eq!(rom.family_code, 0x28);
        assert_eq!(rom.serial_number, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(rom.crc, 0x9c);
    }

    #[test]
    fn rom_reader_randomized_payloads() {
        let mut rng = rand::rng();
        for _ in 0..32 {
            let mut bytes = [0u8; 8];
            rng.fill(&mut bytes);
            let mut bus = MockBus::new();
            bus.reads.extend(bits_lsb_first(&bytes));
            let mut reader = RomReader::new();
            let rom = loop {
                match reader.poll(&mut bus) {
                    Ok(rom) => break rom,
                    Err(nb::Error::WouldBlock) => {}
                    Err(err) => panic!("unexpected error: {err:?}"),
                }
            };
            assert_eq!(rom, Rom::from_bytes(bytes));
        }
    }

    #[test]
    fn rom_reader_leaves_no_residue() {
        let first = [0xff; 8];
        let second = [0x28, 0, 0, 0, 0, 0, 0, 0];
        let mut bus = MockBus::new();
        bus.reads.extend(bits_lsb_first(&first));
        bus.reads.extend(bits_lsb_first(&second));
        let mut reader = RomReader::new();
        while reader.poll(&mut bus).is_err() {}
        let rom = loop {
            match reader.poll(&mut bus) {
                Ok(rom) => break rom,
                Err(_) => {}
            }
        };
        assert_eq!(rom, Rom::from_bytes(second));
    }

    #[test]
    fn scratchpad_reader_accumulates_and_terminates() {
        let raw: i16 = 0x0191; // 25.0625 C on a DS18B20
        let mut bus = MockBus::new();
        bus.reads
            .extend((0..SCRATCHPAD_REPLY_BITS).map(|i| raw >> i & 1 == 1));
        let mut reader = ScratchpadReader::new();
        for _ in 0..SCRATCHPAD_REPLY_BITS {
            assert!(matches!(reader.poll(&mut bus), Err(nb::Error::WouldBlock)));
        }
        assert_eq!(bus.resets, 0);
        let value = reader.poll(&mut bus).expect("terminating poll yields the accumulator");
        assert_eq!(value, raw);
        assert_eq!(bus.resets, 1, "the 16th slot is replaced by a reset pulse");
        assert!(bus.reads.is_empty());
    }
}
