//! Testing utilities and mock implementations
//!
//! This module provides a recording [`DmaController`] for checking exactly
//! how the pipeline programs the DMA block, without the step-driven
//! simulator.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use std::vec::Vec;

use crate::driver::error::ConfigResult;
use crate::hal::dma::{ChannelConfig, ChannelId, ChannelRegister, DmaController};
use crate::internal::constants::DMA_CHANNELS;
use crate::internal::register::dma::DmaRegs;

// =============================================================================
// Mock DMA Controller
// =============================================================================

/// One call made on [`MockDma`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaCall {
    Configure {
        channel: ChannelId,
        config: ChannelConfig,
        write_addr: u32,
        read_addr: u32,
        transfer_count: u32,
    },
    Start(u32),
    ClearFlag(ChannelId),
    SetInterrupt(ChannelId, bool),
}

/// Recording DMA controller.
///
/// `configure` validates the CTRL encoding the way the RP2040 backend does,
/// so configurations the silicon cannot express are rejected here too.
/// Channel status (busy, read address, completion flag) is whatever the test
/// sets.
///
/// # Example
///
/// ```ignore
/// let mut dma = MockDma::new();
/// dma.set_complete(data, true);
/// let pipeline = Pipeline::new(&mut dma, control, data, config)?;
/// ```
#[derive(Debug, Default)]
pub struct MockDma {
    calls: Vec<DmaCall>,
    read_addrs: [u32; DMA_CHANNELS as usize],
    busy: u32,
    flags: u32,
    inte0: u32,
}

impl MockDma {
    /// Create a mock with every channel idle
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call, oldest first
    pub fn calls(&self) -> &[DmaCall] {
        &self.calls
    }

    /// Forget recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Last `configure` of `channel`: (config, write, read, count)
    pub fn configured(&self, channel: ChannelId) -> Option<(ChannelConfig, u32, u32, u32)> {
        self.calls.iter().rev().find_map(|call| match *call {
            DmaCall::Configure {
                channel: ch,
                config,
                write_addr,
                read_addr,
                transfer_count,
            } if ch == channel => Some((config, write_addr, read_addr, transfer_count)),
            _ => None,
        })
    }

    /// Masks passed to `start`
    pub fn starts(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DmaCall::Start(mask) => Some(*mask),
                _ => None,
            })
            .collect()
    }

    pub fn set_busy(&mut self, channel: ChannelId, busy: bool) {
        if busy {
            self.busy |= channel.mask();
        } else {
            self.busy &= !channel.mask();
        }
    }

    pub fn set_read_address(&mut self, channel: ChannelId, addr: u32) {
        self.read_addrs[channel.index() as usize] = addr;
    }

    pub fn set_complete(&mut self, channel: ChannelId, complete: bool) {
        if complete {
            self.flags |= channel.mask();
        } else {
            self.flags &= !channel.mask();
        }
    }

    pub fn interrupt_enabled(&self, channel: ChannelId) -> bool {
        self.inte0 & channel.mask() != 0
    }
}

impl DmaController for MockDma {
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
        config.ctrl_bits(channel)?;
        self.read_addrs[channel.index() as usize] = read_addr;
        self.calls.push(DmaCall::Configure {
            channel,
            config: *config,
            write_addr,
            read_addr,
            transfer_count,
        });
        Ok(())
    }

    fn start(&mut self, mask: u32) {
        self.busy |= mask;
        self.calls.push(DmaCall::Start(mask));
    }

    fn read_address(&self, channel: ChannelId) -> u32 {
        self.read_addrs[channel.index() as usize]
    }

    fn transfer_count(&self, _channel: ChannelId) -> u32 {
        0
    }

    fn is_busy(&self, channel: ChannelId) -> bool {
        self.busy & channel.mask() != 0
    }

    fn completion_flag(&self, channel: ChannelId) -> bool {
        self.flags & channel.mask() != 0
    }

    fn clear_completion_flag(&mut self, channel: ChannelId) {
        self.flags &= !channel.mask();
        self.calls.push(DmaCall::ClearFlag(channel));
    }

    fn set_completion_interrupt(&mut self, channel: ChannelId, enabled: bool) {
        if enabled {
            self.inte0 |= channel.mask();
        } else {
            self.inte0 &= !channel.mask();
        }
        self.calls.push(DmaCall::SetInterrupt(channel, enabled));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(index: u8) -> ChannelId {
        ChannelId::new(index).unwrap()
    }

    #[test]
    fn records_configure_and_start() {
        let mut dma = MockDma::new();
        dma.configure(ch(2), &ChannelConfig::new(), 0x10, 0x20, 3).unwrap();
        dma.start(ch(2).mask());
        assert_eq!(dma.configured(ch(2)), Some((ChannelConfig::new(), 0x10, 0x20, 3)));
        assert_eq!(dma.starts(), [1 << 2]);
        assert!(dma.is_busy(ch(2)));
    }

    #[test]
    fn rejects_what_the_ctrl_encoder_rejects() {
        let mut dma = MockDma::new();
        let config = ChannelConfig::new().with_read_ring(4).with_write_ring(3);
        assert!(dma.configure(ch(0), &config, 0, 0, 2).is_err());
        assert!(dma.calls().is_empty());
    }
}
