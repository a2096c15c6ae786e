//! Simulated system bus: SRAM, DMA register file and one TX FIFO.

use super::{BusFault, SimError, SimFifo, SimMemory};
use crate::descriptor::{DescriptorList, ListLayout};
use crate::driver::error::{ConfigError, ConfigResult};
use crate::hal::dma::{ChannelConfig, ChannelId, ChannelRegister, DmaController, Pacing, RegisterField};
use crate::hal::output::{OutputEngine, PioTxFifo};
use crate::internal::constants::{DMA_CHANNELS, MAX_RING_BITS, WORD_SIZE};
use crate::internal::register::DMA_BASE;
use crate::internal::register::dma::{
    CHANNEL_STRIDE, CTRL_BUSY, DMA_WINDOW_SIZE, DmaRegs, INTE0_OFFSET, INTR_OFFSET, INTS0_OFFSET,
    MULTI_CHAN_TRIGGER_OFFSET,
};

const CHANNEL_MASK: u32 = (1 << DMA_CHANNELS) - 1;

#[derive(Debug, Clone, Copy)]
struct SimChannel {
    read_addr: u32,
    write_addr: u32,
    reload: u32,
    remaining: u32,
    config: ChannelConfig,
    busy: bool,
}

impl SimChannel {
    const RESET: Self = Self {
        read_addr: 0,
        write_addr: 0,
        reload: 0,
        remaining: 0,
        config: ChannelConfig {
            enable: false,
            ..ChannelConfig::new()
        },
        busy: false,
    };
}

fn advance(addr: u32, increment: bool, ring: Option<u8>, step: u32) -> u32 {
    if !increment {
        return addr;
    }
    let next = addr.wrapping_add(step);
    match ring {
        Some(bits) => {
            let mask = (1u32 << bits) - 1;
            (addr & !mask) | (next & mask)
        }
        None => next,
    }
}

fn check_ring(ring: Option<u8>) -> ConfigResult<()> {
    match ring {
        Some(bits) if bits == 0 || bits > MAX_RING_BITS => Err(ConfigError::WrapMismatch),
        _ => Ok(()),
    }
}

/// Step-driven bus model with `MEM` words of SRAM and a FIFO capturing up to
/// `CAP` output words
#[derive(Debug, Clone)]
pub struct SimBus<const MEM: usize, const CAP: usize> {
    memory: SimMemory<MEM>,
    fifo: SimFifo<CAP>,
    channels: [SimChannel; DMA_CHANNELS as usize],
    intr: u32,
    inte0: u32,
    cycles: u64,
    overlap_cycles: u64,
    triggers: u32,
    null_triggers: u32,
    faults: u32,
    last_fault: Option<BusFault>,
}

impl<const MEM: usize, const CAP: usize> SimBus<MEM, CAP> {
    /// Bus with all channels disabled and a FIFO of `depth` words at
    /// `target`, draining one word every `drain_period` cycles
    pub fn new(target: PioTxFifo, depth: usize, drain_period: u32) -> Self {
        Self {
            memory: SimMemory::new(),
            fifo: SimFifo::new(target, depth, drain_period),
            channels: [SimChannel::RESET; DMA_CHANNELS as usize],
            intr: 0,
            inte0: 0,
            cycles: 0,
            overlap_cycles: 0,
            triggers: 0,
            null_triggers: 0,
            faults: 0,
            last_fault: None,
        }
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// The modelled output engine
    pub const fn output(&self) -> PioTxFifo {
        self.fifo.target()
    }

    /// SRAM contents
    pub const fn memory(&self) -> &SimMemory<MEM> {
        &self.memory
    }

    /// Copy `words` into SRAM at `addr`
    pub fn load(&mut self, addr: u32, words: &[u32]) -> Result<(), BusFault> {
        self.memory.load(addr, words)
    }

    /// Copy a descriptor list into SRAM at `addr` and return its layout
    pub fn place<const N: usize>(
        &mut self,
        addr: u32,
        list: &DescriptorList<N>,
    ) -> Result<ListLayout, SimError> {
        let layout = list.layout_at(addr)?;
        let mut cursor = addr;
        for word in list.words() {
            self.memory.write(cursor, word)?;
            cursor = cursor.wrapping_add(WORD_SIZE as u32);
        }
        Ok(layout)
    }

    // =========================================================================
    // Bus Access
    // =========================================================================

    /// Read a word as a bus master would
    pub fn read(&mut self, addr: u32) -> u32 {
        if self.memory.contains(addr) {
            return match self.memory.read(addr) {
                Ok(value) => value,
                Err(fault) => self.fault(fault),
            };
        }
        match self.dma_offset(addr) {
            Some(offset) => self.read_register(offset),
            None => self.fault(BusFault { address: addr }),
        }
    }

    /// Write a word as a bus master would
    pub fn write(&mut self, addr: u32, value: u32) {
        if self.memory.contains(addr) {
            if let Err(fault) = self.memory.write(addr, value) {
                self.fault(fault);
            }
        } else if let Some(offset) = self.dma_offset(addr) {
            self.write_register(offset, value);
        } else if addr == self.fifo.target().fifo_address() {
            self.fifo.push(value);
        } else {
            self.fault(BusFault { address: addr });
        }
    }

    fn fault(&mut self, fault: BusFault) -> u32 {
        self.faults += 1;
        self.last_fault = Some(fault);
        0
    }

    fn dma_offset(&self, addr: u32) -> Option<usize> {
        let offset = (addr as usize).checked_sub(DMA_BASE)?;
        (offset < DMA_WINDOW_SIZE && offset % WORD_SIZE == 0).then_some(offset)
    }

    fn channel_slot(offset: usize) -> Option<(usize, ChannelRegister)> {
        let index = offset / CHANNEL_STRIDE;
        if index >= DMA_CHANNELS as usize {
            return None;
        }
        ChannelRegister::from_offset(offset % CHANNEL_STRIDE).map(|reg| (index, reg))
    }

    fn read_register(&mut self, offset: usize) -> u32 {
        if let Some((index, reg)) = Self::channel_slot(offset) {
            let ch = &self.channels[index];
            return match reg.field() {
                RegisterField::ReadAddr => ch.read_addr,
                RegisterField::WriteAddr => ch.write_addr,
                RegisterField::TransCount => ch.remaining,
                RegisterField::Ctrl => {
                    let id = ChannelId::new(index as u8);
                    let bits = id.and_then(|id| ch.config.ctrl_bits(id)).unwrap_or(0);
                    if ch.busy { bits | CTRL_BUSY } else { bits }
                }
            };
        }
        match offset {
            INTR_OFFSET => self.intr,
            INTE0_OFFSET => self.inte0,
            INTS0_OFFSET => self.intr & self.inte0,
            _ => 0,
        }
    }

    fn write_register(&mut self, offset: usize, value: u32) {
        if let Some((index, reg)) = Self::channel_slot(offset) {
            let ch = &mut self.channels[index];
            match reg.field() {
                RegisterField::ReadAddr => ch.read_addr = value,
                RegisterField::WriteAddr => ch.write_addr = value,
                RegisterField::TransCount => {
                    ch.reload = value;
                    if !ch.busy {
                        ch.remaining = value;
                    }
                }
                RegisterField::Ctrl => {
                    let decoded = ChannelId::new(index as u8)
                        .and_then(|id| ChannelConfig::from_ctrl_bits(value, id));
                    match decoded {
                        Ok(config) => ch.config = config,
                        Err(_) => {
                            let address = (DMA_BASE + offset) as u32;
                            self.fault(BusFault { address });
                            return;
                        }
                    }
                }
            }
            if reg.is_trigger() {
                self.trigger(index, value == 0);
            }
            return;
        }
        match offset {
            INTR_OFFSET | INTS0_OFFSET => self.intr &= !value,
            INTE0_OFFSET => self.inte0 = value & CHANNEL_MASK,
            MULTI_CHAN_TRIGGER_OFFSET => self.trigger_mask(value),
            _ => {}
        }
    }

    // =========================================================================
    // Channel Engine
    // =========================================================================

    fn trigger_mask(&mut self, mask: u32) {
        for index in 0..DMA_CHANNELS as usize {
            if mask & (1 << index) != 0 {
                self.trigger(index, false);
            }
        }
    }

    /// Start a channel. A null trigger, or a trigger with nothing to
    /// transfer, raises the channel's interrupt flag instead.
    fn trigger(&mut self, index: usize, null: bool) {
        let ch = &mut self.channels[index];
        if ch.busy || !ch.config.enable {
            return;
        }
        self.triggers += 1;
        if null || ch.reload == 0 {
            self.null_triggers += 1;
            self.intr |= 1 << index;
            return;
        }
        ch.remaining = ch.reload;
        ch.busy = true;
    }

    fn paced(&self, pacing: Pacing) -> bool {
        match pacing {
            Pacing::Permanent => true,
            dreq => self.fifo.paces(dreq) && self.fifo.ready(),
        }
    }

    fn service(&mut self, index: usize) {
        let ch = self.channels[index];
        if !ch.busy || !self.paced(ch.config.pacing) {
            return;
        }

        let step = ch.config.data_size.bytes();
        let value = self.read(ch.read_addr & !(WORD_SIZE as u32 - 1));

        let remaining = ch.remaining - 1;
        {
            let live = &mut self.channels[index];
            live.read_addr = advance(ch.read_addr, ch.config.incr_read, ch.config.read_ring, step);
            live.write_addr =
                advance(ch.write_addr, ch.config.incr_write, ch.config.write_ring, step);
            live.remaining = remaining;
            live.busy = remaining > 0;
        }

        self.write(ch.write_addr, value);

        if remaining == 0 {
            if !ch.config.irq_quiet {
                self.intr |= 1 << index;
            }
            if let Some(next) = ch.config.chain_to {
                self.trigger(next.index() as usize, false);
            }
        }
    }

    /// Advance one cycle
    pub fn step(&mut self) {
        self.cycles += 1;
        for index in 0..DMA_CHANNELS as usize {
            self.service(index);
        }
        self.fifo.tick();
        if self.active_channels() > 1 {
            self.overlap_cycles += 1;
        }
    }

    /// Advance `cycles` cycles
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Step until every channel is idle and the FIFO is drained.
    ///
    /// Returns the cycles taken, or `None` if still active after
    /// `max_cycles`.
    pub fn run_until_idle(&mut self, max_cycles: u64) -> Option<u64> {
        for elapsed in 0..max_cycles {
            if self.is_idle() {
                return Some(elapsed);
            }
            self.step();
        }
        self.is_idle().then_some(max_cycles)
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Whether no channel is busy and no word is waiting in the FIFO
    pub fn is_idle(&self) -> bool {
        self.active_channels() == 0 && self.fifo.level() == 0
    }

    /// Number of busy channels
    pub fn active_channels(&self) -> usize {
        self.channels.iter().filter(|ch| ch.busy).count()
    }

    /// Words shifted out of the FIFO, oldest first
    pub fn captured(&self) -> &[u32] {
        self.fifo.captured()
    }

    /// The FIFO model
    pub const fn fifo(&self) -> &SimFifo<CAP> {
        &self.fifo
    }

    /// Cycles simulated so far
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles in which more than one channel was busy
    pub const fn overlap_cycles(&self) -> u64 {
        self.overlap_cycles
    }

    /// Accepted triggers, null triggers included
    pub const fn triggers(&self) -> u32 {
        self.triggers
    }

    /// Null triggers seen
    pub const fn null_triggers(&self) -> u32 {
        self.null_triggers
    }

    /// Accesses to unmapped addresses
    pub const fn faults(&self) -> u32 {
        self.faults
    }

    /// Most recent bus fault
    pub const fn last_fault(&self) -> Option<BusFault> {
        self.last_fault
    }

    /// Whether an enabled channel flag is pending on DMA_IRQ_0
    pub const fn irq_pending(&self) -> bool {
        self.intr & self.inte0 != 0
    }
}

impl<const MEM: usize, const CAP: usize> DmaController for SimBus<MEM, CAP> {
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
        check_ring(config.read_ring)?;
        check_ring(config.write_ring)?;

        let ch = &mut self.channels[channel.index() as usize];
        ch.config = *config;
        ch.read_addr = read_addr;
        ch.write_addr = write_addr;
        ch.reload = transfer_count;
        if !ch.busy {
            ch.remaining = transfer_count;
        }
        Ok(())
    }

    fn start(&mut self, mask: u32) {
        self.trigger_mask(mask);
    }

    fn read_address(&self, channel: ChannelId) -> u32 {
        self.channels[channel.index() as usize].read_addr
    }

    fn transfer_count(&self, channel: ChannelId) -> u32 {
        self.channels[channel.index() as usize].remaining
    }

    fn is_busy(&self, channel: ChannelId) -> bool {
        self.channels[channel.index() as usize].busy
    }

    fn completion_flag(&self, channel: ChannelId) -> bool {
        self.intr & channel.mask() != 0
    }

    fn clear_completion_flag(&mut self, channel: ChannelId) {
        self.intr &= !channel.mask();
    }

    fn set_completion_interrupt(&mut self, channel: ChannelId, enabled: bool) {
        if enabled {
            self.inte0 |= channel.mask();
        } else {
            self.inte0 &= !channel.mask();
        }
    }
}
