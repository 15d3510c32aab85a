//! One device transaction: instruction out, reply in.

use crate::codec::{CommandWriter, RomReader, ScratchpadReader};
use crate::{Command, OneWireError, OneWireNb, Rom};

/// Payload a completed transaction hands back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The device's identification record.
    Rom(Rom),
    /// Raw scratchpad temperature bits, sign bit untransferred.
    Scratchpad(i16),
    /// The device signalled that its conversion result is ready.
    Ready,
    /// The command carries no decodable reply.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxPhase {
    Writing,
    Reading,
}

#[derive(Debug)]
enum ReplyDecoder {
    Rom(RomReader),
    Scratchpad(ScratchpadReader),
    ConversionReady,
    None,
}

/// Drives a full "send instruction, read reply" exchange, one slot per poll.
///
/// A two-phase machine: `Writing` streams the opcode through a
/// [`CommandWriter`]; `Reading` runs the decoder the instruction calls for.
/// The conversion trigger is special-cased: its reply is a single busy bit
/// polled until the device answers ready. Exactly one transaction should be
/// in flight on a bus at a time; the value rewinds to the write phase when it
/// completes so it can be reused.
#[derive(Debug)]
pub struct Transaction {
    phase: TxPhase,
    writer: CommandWriter,
    decoder: ReplyDecoder,
}

impl Transaction {
    /// Prepares an exchange for the given instruction.
    pub fn new(command: Command) -> Self {
        let decoder = match command {
            Command::ReadRom => ReplyDecoder::Rom(RomReader::new()),
            Command::ReadScratchpad => ReplyDecoder::Scratchpad(ScratchpadReader::new()),
            Command::ConvertT => ReplyDecoder::ConversionReady,
            _ => ReplyDecoder::None,
        };
        Self {
            phase: TxPhase::Writing,
            writer: CommandWriter::new(command),
            decoder,
        }
    }

    /// Advances the exchange by one slot. Yields the reply exactly once.
    ///
    /// # Errors
    /// Propagates line driver errors from the underlying slots.
    pub fn poll<O: OneWireNb>(&mut self, bus: &mut O) -> nb::Result<Reply, OneWireError<O::BusError>> {
        match self.phase {
            TxPhase::Writing => {
                self.writer.poll(bus)?;
                if matches!(self.decoder, ReplyDecoder::None) {
                    return Ok(Reply::Done);
                }
                self.phase = TxPhase::Reading;
                Err(nb::Error::WouldBlock)
            }
            TxPhase::Reading => {
                let reply = match &mut self.decoder {
                    ReplyDecoder::Rom(reader) => Reply::Rom(reader.poll(bus)?),
                    ReplyDecoder::Scratchpad(reader) => Reply::Scratchpad(reader.poll(bus)?),
                    ReplyDecoder::ConversionReady => {
                        if !bus.poll_read_bit()? {
                            return Err(nb::Error::WouldBlock);
                        }
                        Reply::Ready
                    }
                    // Commands without a decoder never leave the write phase.
                    ReplyDecoder::None => Reply::Done,
                };
                self.phase = TxPhase::Writing;
                Ok(reply)
            }
        }
    }
}
