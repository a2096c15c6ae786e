//! Self-chaining DMA pipeline.
//!
//! Two channels feed the output engine without CPU involvement:
//!
//! ```text
//!            chain                       2 words / trigger
//!   +------+ -----> +---------+  list  -----------------> +------+
//!   | data |        | control | <----- [count, source]... | data |
//!   +------+        +---------+        AL3 window         +------+
//!      |                                                     |
//!      +-------- paced by DREQ --------> FIFO <--------------+
//! ```
//!
//! The control channel copies one descriptor into the data channel's alias 3
//! window. Its last write lands on `AL3_READ_ADDR_TRIG` and starts the data
//! channel, which streams the descriptor's words into the FIFO and chains
//! back to the control channel when its count runs out. A `{0, 0}` sentinel
//! turns the final trigger into a null trigger that raises the data
//! channel's completion flag.

use crate::descriptor::{ListKind, ListLayout};
use crate::driver::config::{PipelineConfig, PipelineState};
use crate::driver::error::{ConfigError, ConfigResult, Result, StateError, StateResult};
use crate::hal::dma::{ChannelConfig, ChannelId, DescriptorWindow, DmaController, Pacing};
use crate::hal::output::OutputEngine;
use crate::internal::constants::DESCRIPTOR_WRAP_BITS;

#[cfg(feature = "log")]
use log::{debug, warn};

/// Where the data channel writes and what paces it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutputTarget {
    fifo: u32,
    pacing: Pacing,
}

/// DMA pipeline over a control and a data channel.
///
/// # Example
///
/// ```ignore
/// let mut pipeline = Pipeline::new(dma, control, data, PipelineConfig::new())?;
/// pipeline.arm_data(&fifo)?;
/// pipeline.arm_control(&list.layout()?, ListKind::Terminated.wrap_bits())?;
/// pipeline.start()?;
/// pipeline.wait()?;
/// ```
pub struct Pipeline<D: DmaController> {
    dma: D,
    control: ChannelId,
    data: ChannelId,
    config: PipelineConfig,
    layout: Option<ListLayout>,
    output: Option<OutputTarget>,
    started: bool,
}

impl<D: DmaController> Pipeline<D> {
    /// Create an idle pipeline over two distinct channels
    pub fn new(
        dma: D,
        control: ChannelId,
        data: ChannelId,
        config: PipelineConfig,
    ) -> ConfigResult<Self> {
        if control == data {
            #[cfg(feature = "log")]
            warn!("control and data channel are both {}", control.index());
            return Err(ConfigError::ChannelConflict);
        }
        Ok(Self {
            dma,
            control,
            data,
            config,
            layout: None,
            output: None,
            started: false,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Control channel
    pub const fn control_channel(&self) -> ChannelId {
        self.control
    }

    /// Data channel
    pub const fn data_channel(&self) -> ChannelId {
        self.data
    }

    /// Active configuration
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Armed descriptor list, if any
    pub const fn layout(&self) -> Option<&ListLayout> {
        self.layout.as_ref()
    }

    /// The DMA controller
    pub const fn dma(&self) -> &D {
        &self.dma
    }

    /// The DMA controller, mutably.
    ///
    /// Reprogramming either pipeline channel through this reference breaks
    /// the pipeline's state tracking.
    pub fn dma_mut(&mut self) -> &mut D {
        &mut self.dma
    }

    /// Give back the controller and both channels
    pub fn release(self) -> (D, ChannelId, ChannelId) {
        (self.dma, self.control, self.data)
    }

    // =========================================================================
    // Arming
    // =========================================================================

    /// Program the data channel to stream into `output`.
    ///
    /// The destination is fixed, reads increment, and pacing follows the
    /// output engine's DREQ. The read address and count are left for the
    /// control channel, except in `Single` lists where the count is preset.
    /// The channel runs IRQ-quiet and chains to the control channel, so its
    /// completion flag is only raised by a null trigger.
    pub fn arm_data(&mut self, output: &impl OutputEngine) -> Result<()> {
        self.ensure_stopped()?;
        let target = OutputTarget {
            fifo: output.fifo_address(),
            pacing: output.pacing(),
        };
        self.program_data(target)?;
        self.output = Some(target);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "data channel {} armed: fifo={:#010x}",
            self.data.index(),
            target.fifo
        );
        Ok(())
    }

    fn program_data(&mut self, target: OutputTarget) -> ConfigResult<()> {
        let preset = self.layout.map_or(0, |layout| layout.preset_count());
        let config = ChannelConfig::new()
            .with_read_increment(true)
            .with_write_increment(false)
            .with_pacing(target.pacing)
            .with_chain_to(self.control)
            .with_irq_quiet(true)
            .with_high_priority(self.config.data_high_priority);
        self.dma.configure(self.data, &config, target.fifo, 0, preset)
    }

    /// Program the control channel to walk `list`.
    ///
    /// `wrap_bits` is the ring width the list kind walks with
    /// ([`ListKind::wrap_bits`]); any other value is rejected with
    /// [`ConfigError::WrapMismatch`]. The channel is left stopped.
    pub fn arm_control(&mut self, list: &ListLayout, wrap_bits: u8) -> Result<()> {
        self.ensure_stopped()?;

        let kind = list.kind();
        if kind != self.config.variant.list_kind() {
            #[cfg(feature = "log")]
            warn!("list kind {kind:?} does not match {:?}", self.config.variant);
            return Err(ConfigError::KindMismatch.into());
        }
        if wrap_bits != kind.wrap_bits() {
            #[cfg(feature = "log")]
            warn!("wrap of {wrap_bits} bits rejected for {kind:?} list");
            return Err(ConfigError::WrapMismatch.into());
        }

        let base = ChannelConfig::new()
            .with_pacing(Pacing::Permanent)
            .with_irq_quiet(true);
        let (config, window) = match kind {
            ListKind::Terminated => (
                base.with_read_increment(true)
                    .with_write_increment(true)
                    .with_write_ring(DESCRIPTOR_WRAP_BITS),
                DescriptorWindow::FIRST,
            ),
            ListKind::Looping => (
                base.with_read_increment(true)
                    .with_read_ring(wrap_bits)
                    .with_write_increment(true)
                    .with_write_ring(DESCRIPTOR_WRAP_BITS),
                DescriptorWindow::FIRST,
            ),
            ListKind::Single => (
                base.with_read_increment(false).with_write_increment(false),
                DescriptorWindow::TRIGGER,
            ),
        };

        let write_addr = self.dma.register_address(self.data, window);
        self.dma.configure(
            self.control,
            &config,
            write_addr,
            list.control_read_address(),
            kind.words_per_trigger(),
        )?;
        self.layout = Some(*list);

        // The preset count is only known once the list is
        if let (ListKind::Single, Some(target)) = (kind, self.output) {
            self.program_data(target)?;
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "control channel {} armed: list={:#010x} entries={}",
            self.control.index(),
            list.base(),
            list.entries()
        );
        #[cfg(feature = "log")]
        debug!(
            "control channel {} armed for {} entries at {:#010x}",
            self.control.index(),
            list.entries(),
            list.base()
        );
        Ok(())
    }

    /// Arm both channels for `list` streaming into `output`
    pub fn arm(&mut self, list: &ListLayout, output: &impl OutputEngine) -> Result<()> {
        self.arm_control(list, list.kind().wrap_bits())?;
        self.arm_data(output)
    }

    fn ensure_stopped(&self) -> StateResult<()> {
        if self.started {
            return Err(StateError::Busy);
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Issue the single start trigger on the control channel
    pub fn start(&mut self) -> StateResult<()> {
        if self.started {
            return Err(StateError::AlreadyStarted);
        }
        if self.layout.is_none() || self.output.is_none() {
            return Err(StateError::NotArmed);
        }

        self.dma.clear_completion_flag(self.data);
        self.started = true;
        self.dma.start(self.control.mask());

        #[cfg(feature = "defmt")]
        defmt::info!("pipeline started on channel {}", self.control.index());
        Ok(())
    }

    /// Current state, derived from the hardware.
    ///
    /// While the control channel loads a descriptor its read pointer names
    /// that descriptor; once it is idle, the descriptor it loaded last is the
    /// one the data channel streams.
    pub fn state(&self) -> PipelineState {
        let Some(layout) = self.layout else {
            return PipelineState::Idle;
        };
        if self.output.is_none() {
            return PipelineState::Idle;
        }
        if !self.started {
            return PipelineState::Armed;
        }

        let kind = layout.kind();
        if kind.terminates() && self.dma.completion_flag(self.data) {
            return PipelineState::Halted;
        }

        let entries = layout.entries() as usize;
        if kind == ListKind::Single {
            return PipelineState::Streaming(0);
        }
        if entries == 0 {
            return PipelineState::Armed;
        }

        let slot = layout.slot_of(self.dma.read_address(self.control)) as usize;
        let current = match (kind, self.dma.is_busy(self.control)) {
            (ListKind::Looping, true) => slot % entries,
            (ListKind::Looping, false) => (slot + entries - 1) % entries,
            // Loading the sentinel still streams the last entry
            (_, true) => slot.min(entries - 1),
            (_, false) => slot.saturating_sub(1).min(entries - 1),
        };
        PipelineState::Streaming(current)
    }

    /// Whether [`Pipeline::start`] has run since the last reset
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the completion flag is set.
    ///
    /// Never true for looping lists.
    pub fn is_complete(&self) -> bool {
        self.started && self.dma.completion_flag(self.data)
    }

    /// Spin until the completion flag is set.
    ///
    /// There is no timeout. On looping lists this never returns.
    pub fn wait(&self) -> StateResult<()> {
        self.spin_check()?;
        while !self.is_complete() {
            core::hint::spin_loop();
        }
        self.log_halted();
        Ok(())
    }

    /// Spin until the completion flag is set, calling `on_poll` with the
    /// controller between polls
    pub fn spin_until_complete<F>(&mut self, mut on_poll: F) -> StateResult<()>
    where
        F: FnMut(&mut D),
    {
        self.spin_check()?;
        while !self.is_complete() {
            on_poll(&mut self.dma);
        }
        self.log_halted();
        Ok(())
    }

    fn spin_check(&self) -> StateResult<()> {
        if !self.started {
            return Err(StateError::NotArmed);
        }
        Ok(())
    }

    fn log_halted(&self) {
        #[cfg(feature = "defmt")]
        defmt::info!("pipeline halted, data channel {}", self.data.index());
    }

    /// Return a halted (or never started) pipeline to `Idle`.
    ///
    /// Clears the completion flag and forgets both arms. A pipeline still
    /// streaming cannot be stopped and is rejected with
    /// [`StateError::Busy`].
    pub fn reset(&mut self) -> StateResult<()> {
        if self.started && !self.is_complete() {
            return Err(StateError::Busy);
        }
        self.dma.clear_completion_flag(self.data);
        self.dma.set_completion_interrupt(self.data, false);
        self.layout = None;
        self.output = None;
        self.started = false;
        Ok(())
    }

    /// Route the data channel's completion flag to the DMA IRQ line
    pub fn enable_completion_interrupt(&mut self, enabled: bool) {
        self.dma.set_completion_interrupt(self.data, enabled);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::descriptor::{Descriptor, DescriptorList};
    use crate::driver::config::StreamVariant;
    use crate::driver::error::Error;
    use crate::hal::output::{PioBlock, PioTxFifo};
    use crate::sim::SimBus;
    use crate::testing::MockDma;

    type Bus = SimBus<128, 256>;

    const LIST: u32 = 0x2000_0000;
    const BUF_A: u32 = 0x2000_0100;
    const BUF_B: u32 = 0x2000_0140;
    const MAX_CYCLES: u64 = 10_000;

    fn ch(index: u8) -> ChannelId {
        ChannelId::new(index).unwrap()
    }

    fn fifo() -> PioTxFifo {
        PioTxFifo::new(PioBlock::Pio0, 0).unwrap()
    }

    fn pipeline(variant: StreamVariant) -> Pipeline<Bus> {
        let bus = SimBus::new(fifo(), 4, 3);
        let config = PipelineConfig::new().with_variant(variant);
        Pipeline::new(bus, ch(0), ch(1), config).unwrap()
    }

    fn armed<const N: usize>(
        variant: StreamVariant,
        buffers: &[(u32, &[u32])],
        list: &DescriptorList<N>,
    ) -> Pipeline<Bus> {
        let mut p = pipeline(variant);
        for (addr, words) in buffers {
            p.dma_mut().load(*addr, words).unwrap();
        }
        let layout = p.dma_mut().place(LIST, list).unwrap();
        let output = p.dma().output();
        p.arm(&layout, &output).unwrap();
        p
    }

    /// Step until halted and drained, recording each distinct state and
    /// checking the flag only sets on entering `Halted`
    fn run_to_halt(p: &mut Pipeline<Bus>) -> Vec<PipelineState> {
        let mut states = vec![p.state()];
        for _ in 0..MAX_CYCLES {
            p.dma_mut().step();
            let state = p.state();
            assert_eq!(p.is_complete(), state == PipelineState::Halted);
            if states.last() != Some(&state) {
                states.push(state);
            }
            if state == PipelineState::Halted && p.dma().is_idle() {
                break;
            }
        }
        states
    }

    // =========================================================================
    // Finite Lists
    // =========================================================================

    #[test]
    fn single_descriptor_streams_then_halts() {
        let list = DescriptorList::<2>::terminated(&[Descriptor::new(2, BUF_A)]).unwrap();
        let mut p = armed(StreamVariant::Finite, &[(BUF_A, &[0xAA, 0xAA])], &list);
        assert_eq!(p.state(), PipelineState::Armed);

        p.start().unwrap();
        let states = run_to_halt(&mut p);

        assert_eq!(states, [PipelineState::Streaming(0), PipelineState::Halted]);
        assert_eq!(p.dma().captured(), [0xAA, 0xAA]);
        assert!(p.is_complete());
        assert_eq!(p.dma().null_triggers(), 1);
    }

    #[test]
    fn every_entry_streams_once_in_order() {
        let list = DescriptorList::<4>::terminated(&[
            Descriptor::new(2, BUF_A),
            Descriptor::new(3, BUF_B),
            Descriptor::new(1, BUF_A + 4),
        ])
        .unwrap();
        let mut p = armed(
            StreamVariant::Finite,
            &[(BUF_A, &[1, 2]), (BUF_B, &[3, 4, 5])],
            &list,
        );
        p.start().unwrap();
        let states = run_to_halt(&mut p);

        assert_eq!(
            states,
            [
                PipelineState::Streaming(0),
                PipelineState::Streaming(1),
                PipelineState::Streaming(2),
                PipelineState::Halted,
            ]
        );
        assert_eq!(p.dma().captured(), [1, 2, 3, 4, 5, 2]);
        assert_eq!(p.dma().overlap_cycles(), 0);
        assert_eq!(p.dma().fifo().overflows(), 0);
    }

    #[test]
    fn delivered_words_equal_buffer_concatenation() {
        let a: Vec<u32> = (0..10).collect();
        let b: Vec<u32> = (100..107).collect();
        let list = DescriptorList::<3>::terminated(&[
            Descriptor::new(a.len() as u32, BUF_A),
            Descriptor::new(b.len() as u32, BUF_B),
        ])
        .unwrap();
        let mut p = armed(StreamVariant::Finite, &[(BUF_A, a.as_slice()), (BUF_B, b.as_slice())], &list);
        p.start().unwrap();
        run_to_halt(&mut p);

        let expected: Vec<u32> = a.iter().chain(b.iter()).copied().collect();
        assert_eq!(p.dma().captured(), expected.as_slice());
        assert_eq!(p.dma().faults(), 0);
    }

    #[test]
    fn sentinel_only_list_halts_without_output() {
        let list = DescriptorList::<1>::terminated(&[]).unwrap();
        let mut p = armed(StreamVariant::Finite, &[], &list);
        p.start().unwrap();
        assert_eq!(p.state(), PipelineState::Armed);

        let states = run_to_halt(&mut p);
        assert_eq!(states, [PipelineState::Armed, PipelineState::Halted]);
        assert_eq!(p.dma().fifo().delivered(), 0);
    }

    #[test]
    fn spin_until_complete_drives_the_bus() {
        let list = DescriptorList::<2>::terminated(&[Descriptor::new(2, BUF_A)]).unwrap();
        let mut p = armed(StreamVariant::Finite, &[(BUF_A, &[7, 8])], &list);
        p.start().unwrap();
        p.spin_until_complete(|bus| bus.step()).unwrap();
        assert_eq!(p.state(), PipelineState::Halted);
        assert!(p.wait().is_ok());
    }

    #[test]
    fn halted_pipeline_resets_and_reruns() {
        let list = DescriptorList::<2>::terminated(&[Descriptor::new(2, BUF_A)]).unwrap();
        let mut p = armed(StreamVariant::Finite, &[(BUF_A, &[0xAA, 0xAA])], &list);
        p.start().unwrap();
        run_to_halt(&mut p);

        p.reset().unwrap();
        assert_eq!(p.state(), PipelineState::Idle);
        assert!(!p.is_complete());

        let layout = list.layout_at(LIST).unwrap();
        let output = p.dma().output();
        p.arm(&layout, &output).unwrap();
        p.start().unwrap();
        run_to_halt(&mut p);
        assert_eq!(p.dma().captured(), [0xAA; 4]);
    }

    // =========================================================================
    // Looping Lists
    // =========================================================================

    #[test]
    fn looping_pair_repeats_same_word_forever() {
        let list = DescriptorList::looping(Descriptor::new(1, BUF_A), Descriptor::new(1, BUF_A));
        let mut p = armed(StreamVariant::Looping, &[(BUF_A, &[0x5A])], &list);
        p.start().unwrap();

        for _ in 0..600 {
            p.dma_mut().step();
            assert!(!p.is_complete());
            assert_ne!(p.state(), PipelineState::Halted);
        }
        let captured = p.dma().captured();
        assert!(captured.len() > 50);
        assert!(captured.iter().all(|&word| word == 0x5A));
        assert_eq!(p.dma().overlap_cycles(), 0);
        assert!(p.dma().active_channels() > 0);
    }

    #[test]
    fn looping_output_is_periodic_in_total_count() {
        let list = DescriptorList::looping(Descriptor::new(2, BUF_A), Descriptor::new(3, BUF_B));
        let mut p = armed(
            StreamVariant::Looping,
            &[(BUF_A, &[1, 2]), (BUF_B, &[3, 4, 5])],
            &list,
        );
        p.start().unwrap();
        p.dma_mut().run(1_000);

        let captured = p.dma().captured();
        let period = list.total_transfers() as usize;
        assert!(captured.len() >= 4 * period);
        for (i, word) in captured.iter().enumerate() {
            assert_eq!(*word, [1, 2, 3, 4, 5][i % period]);
        }
    }

    #[test]
    fn looping_state_alternates_between_entries() {
        let list = DescriptorList::looping(Descriptor::new(2, BUF_A), Descriptor::new(2, BUF_B));
        let mut p = armed(StreamVariant::Looping, &[], &list);
        p.start().unwrap();

        let mut states = vec![p.state()];
        for _ in 0..200 {
            p.dma_mut().step();
            let state = p.state();
            if states.last() != Some(&state) {
                states.push(state);
            }
        }
        assert!(states.len() > 6);
        for (i, state) in states.iter().enumerate() {
            assert_eq!(*state, PipelineState::Streaming(i % 2));
        }
    }

    #[test]
    fn streaming_loop_cannot_be_reset() {
        let list = DescriptorList::looping(Descriptor::new(1, BUF_A), Descriptor::new(1, BUF_A));
        let mut p = armed(StreamVariant::Looping, &[], &list);
        p.start().unwrap();
        p.dma_mut().run(10);
        assert_eq!(p.reset(), Err(StateError::Busy));
    }

    #[test]
    fn looping_list_needs_two_rings() {
        let mut dma = MockDma::new();
        let config = PipelineConfig::new().with_variant(StreamVariant::Looping);
        let mut p = Pipeline::new(&mut dma, ch(0), ch(1), config).unwrap();
        let list = DescriptorList::looping(Descriptor::new(1, BUF_A), Descriptor::new(1, BUF_A));
        let layout = list.layout_at(LIST).unwrap();
        assert_eq!(
            p.arm_control(&layout, ListKind::Looping.wrap_bits()),
            Err(Error::Config(ConfigError::RingUnsupported))
        );
    }

    // =========================================================================
    // Single Buffer
    // =========================================================================

    #[test]
    fn single_buffer_replays_forever() {
        let list = DescriptorList::single(BUF_A, 3);
        let mut p = armed(StreamVariant::Single, &[(BUF_A, &[9, 8, 7])], &list);
        p.start().unwrap();
        p.dma_mut().run(500);

        let captured = p.dma().captured();
        assert!(captured.len() >= 30);
        for (i, word) in captured.iter().enumerate() {
            assert_eq!(*word, [9, 8, 7][i % 3]);
        }
        assert_eq!(p.state(), PipelineState::Streaming(0));
        assert!(!p.is_complete());
        assert_eq!(p.dma().overlap_cycles(), 0);
    }

    #[test]
    fn single_buffer_count_preset_in_either_arm_order() {
        let list = DescriptorList::single(BUF_A, 2);
        let layout = list.layout_at(LIST).unwrap();
        let mut dma = MockDma::new();
        let config = PipelineConfig::new().with_variant(StreamVariant::Single);
        let mut p = Pipeline::new(&mut dma, ch(0), ch(1), config).unwrap();

        p.arm_data(&fifo()).unwrap();
        p.arm_control(&layout, 0).unwrap();

        let (_, _, _, count) = dma.configured(ch(1)).unwrap();
        assert_eq!(count, 2);
        let (control, write, read, words) = dma.configured(ch(0)).unwrap();
        assert!(!control.incr_read);
        assert!(!control.incr_write);
        assert_eq!(write, 0x5000_007C);
        assert_eq!(read, LIST + 4);
        assert_eq!(words, 1);
    }

    // =========================================================================
    // Register Programming
    // =========================================================================

    #[test]
    fn channels_programmed_for_descriptor_window() {
        let mut dma = MockDma::new();
        let mut p = Pipeline::new(&mut dma, ch(4), ch(5), PipelineConfig::new()).unwrap();
        let list = DescriptorList::<2>::terminated(&[Descriptor::new(2, BUF_A)]).unwrap();
        let layout = list.layout_at(LIST).unwrap();
        let output = PioTxFifo::new(PioBlock::Pio1, 2).unwrap();
        p.arm(&layout, &output).unwrap();
        p.start().unwrap();

        let (data, write, _, count) = dma.configured(ch(5)).unwrap();
        assert_eq!(write, 0x5030_0018);
        assert_eq!(count, 0);
        assert_eq!(data.pacing, Pacing::Dreq(10));
        assert_eq!(data.chain_to, Some(ch(4)));
        assert!(data.irq_quiet);
        assert!(data.incr_read);
        assert!(!data.incr_write);

        let (control, write, read, words) = dma.configured(ch(4)).unwrap();
        assert_eq!(write, 0x5000_0140 + 0x38);
        assert_eq!(read, LIST);
        assert_eq!(words, 2);
        assert_eq!(control.write_ring, Some(3));
        assert_eq!(control.read_ring, None);
        assert!(control.incr_read && control.incr_write);
        assert_eq!(control.chain_to, None);

        assert_eq!(dma.starts(), [ch(4).mask()]);
    }

    #[test]
    fn derived_state_follows_control_read_pointer() {
        let mut dma = MockDma::new();
        let layout = ListLayout::new(ListKind::Terminated, LIST, 3, 0).unwrap();
        let mut p = Pipeline::new(&mut dma, ch(0), ch(1), PipelineConfig::new()).unwrap();
        p.arm(&layout, &fifo()).unwrap();
        p.start().unwrap();

        let control = ch(0);
        let cases = [
            (true, LIST + 4, PipelineState::Streaming(0)),
            (false, LIST + 8, PipelineState::Streaming(0)),
            (true, LIST + 12, PipelineState::Streaming(1)),
            (false, LIST + 24, PipelineState::Streaming(2)),
            (true, LIST + 28, PipelineState::Streaming(2)),
        ];
        for (busy, read, expected) in cases {
            p.dma_mut().set_busy(control, busy);
            p.dma_mut().set_read_address(control, read);
            assert_eq!(p.state(), expected, "busy={busy} read={read:#x}");
        }

        p.dma_mut().set_complete(ch(1), true);
        assert_eq!(p.state(), PipelineState::Halted);
        assert!(p.is_complete());
    }

    // =========================================================================
    // Error Paths
    // =========================================================================

    #[test]
    fn shared_channel_is_rejected() {
        let result = Pipeline::new(MockDma::new(), ch(3), ch(3), PipelineConfig::new());
        assert!(matches!(result, Err(ConfigError::ChannelConflict)));
    }

    #[test]
    fn start_requires_both_arms() {
        let mut p = pipeline(StreamVariant::Finite);
        assert_eq!(p.start(), Err(StateError::NotArmed));
        p.arm_data(&fifo()).unwrap();
        assert_eq!(p.state(), PipelineState::Idle);
        assert_eq!(p.start(), Err(StateError::NotArmed));
    }

    #[test]
    fn second_start_is_rejected() {
        let list = DescriptorList::<2>::terminated(&[Descriptor::new(1, BUF_A)]).unwrap();
        let mut p = armed(StreamVariant::Finite, &[(BUF_A, &[1])], &list);
        p.start().unwrap();
        assert_eq!(p.start(), Err(StateError::AlreadyStarted));
        assert_eq!(p.dma().triggers(), 1);
    }

    #[test]
    fn wrong_wrap_is_rejected() {
        let mut p = pipeline(StreamVariant::Finite);
        let layout = ListLayout::new(ListKind::Terminated, LIST, 1, 0).unwrap();
        assert_eq!(
            p.arm_control(&layout, 4),
            Err(Error::Config(ConfigError::WrapMismatch))
        );
        assert_eq!(p.state(), PipelineState::Idle);
    }

    #[test]
    fn list_kind_must_match_variant() {
        let mut p = pipeline(StreamVariant::Looping);
        let layout = ListLayout::new(ListKind::Terminated, LIST, 1, 0).unwrap();
        assert_eq!(
            p.arm_control(&layout, ListKind::Terminated.wrap_bits()),
            Err(Error::Config(ConfigError::KindMismatch))
        );
    }

    #[test]
    fn rearming_while_streaming_is_rejected() {
        let list = DescriptorList::<2>::terminated(&[Descriptor::new(1, BUF_A)]).unwrap();
        let mut p = armed(StreamVariant::Finite, &[(BUF_A, &[1])], &list);
        p.start().unwrap();
        assert_eq!(p.arm_data(&fifo()), Err(Error::State(StateError::Busy)));
    }

    #[test]
    fn waiting_before_start_is_rejected() {
        let mut p = pipeline(StreamVariant::Finite);
        assert_eq!(p.wait(), Err(StateError::NotArmed));
        assert_eq!(p.spin_until_complete(|_| {}), Err(StateError::NotArmed));
    }

    #[test]
    fn release_returns_channels() {
        let p = pipeline(StreamVariant::Finite);
        let (_, control, data) = p.release();
        assert_eq!((control, data), (ch(0), ch(1)));
    }
}
