use bitfield_struct::bitfield;
use onewire_nb::OneWireStatus;

/// The master's live view of the line.
///
/// Laid out like the status register of a hardware bridge: one bit per
/// reported condition, updated as slots complete. The presence bit is
/// cleared by every reset pulse and set again once the following
/// presence-detect sequence observes a device.
#[bitfield(u8)]
pub struct LineStatus {
    /// A device answered the most recent reset pulse.
    pub presence_detect: bool,
    /// Level sampled in the most recent read slot.
    pub single_bit_result: bool,
    #[bits(6)]
    reserved: u8,
}

impl OneWireStatus for LineStatus {
    fn presence(&self) -> bool {
        self.presence_detect()
    }

    fn logic_level(&self) -> Option<bool> {
        Some(self.single_bit_result())
    }
}
