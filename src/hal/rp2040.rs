//! RP2040 DMA register backend.

use crate::driver::error::ConfigResult;
use crate::hal::dma::{ChannelConfig, ChannelId, ChannelRegister, DmaController};
use crate::internal::register::dma::{CTRL_BUSY, DmaRegs};

/// [`DmaController`] driving the RP2040 DMA block through volatile register
/// accesses.
///
/// The type carries no state; every call goes straight to the hardware.
/// Channel ownership is tracked separately by [`crate::hal::pool::ChannelPool`].
pub struct Rp2040Dma {
    _private: (),
}

impl Rp2040Dma {
    /// Take the DMA block.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other code programs the channels handed to
    /// the pipeline while it owns this value, and that the DMA block has been
    /// taken out of reset.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl DmaController for Rp2040Dma {
    fn register_address(&self, channel: ChannelId, register: ChannelRegister) -> u32 {
        (DmaRegs::channel_base(channel.index()) + register.offset()) as u32
    }

    fn configure(
        &mut self,
        channel: ChannelId,
        config: &ChannelConfig,
        write_addr: u32,
        read_addr: u32,
        transfer_count: u32,
    ) -> ConfigResult<()> {
        let ctrl = config.ctrl_bits(channel)?;
        let ch = channel.index();

        DmaRegs::set_read_addr(ch, read_addr);
        DmaRegs::set_write_addr(ch, write_addr);
        DmaRegs::set_trans_count(ch, transfer_count);
        DmaRegs::set_ctrl_no_trigger(ch, ctrl);
        Ok(())
    }

    fn start(&mut self, mask: u32) {
        DmaRegs::multi_chan_trigger(mask);
    }

    fn read_address(&self, channel: ChannelId) -> u32 {
        DmaRegs::read_addr(channel.index())
    }

    fn transfer_count(&self, channel: ChannelId) -> u32 {
        DmaRegs::trans_count(channel.index())
    }

    fn is_busy(&self, channel: ChannelId) -> bool {
        DmaRegs::ctrl(channel.index()) & CTRL_BUSY != 0
    }

    fn completion_flag(&self, channel: ChannelId) -> bool {
        DmaRegs::intr() & channel.mask() != 0
    }

    fn clear_completion_flag(&mut self, channel: ChannelId) {
        // INTR is write-one-to-clear
        DmaRegs::set_intr(channel.mask());
    }

    fn set_completion_interrupt(&mut self, channel: ChannelId, enabled: bool) {
        let inte = DmaRegs::inte0();
        if enabled {
            DmaRegs::set_inte0(inte | channel.mask());
        } else {
            DmaRegs::set_inte0(inte & !channel.mask());
        }
    }
}
