//! Descriptor lists and their bus layout.

use super::Descriptor;
use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{DESCRIPTOR_SIZE, DESCRIPTOR_WRAP_BITS, LOOP_WRAP_BITS, WORD_SIZE};

/// How the control channel walks a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ListKind {
    /// Real entries followed by a zero-count sentinel; halts at the end
    Terminated,
    /// Two descriptors replayed forever through read-address wraparound
    Looping,
    /// One buffer replayed forever: the control channel rewrites only the
    /// data channel's triggering read address
    Single,
}

impl ListKind {
    /// Words the control channel copies per trigger
    #[must_use]
    pub const fn words_per_trigger(self) -> u32 {
        match self {
            ListKind::Terminated | ListKind::Looping => 2,
            ListKind::Single => 1,
        }
    }

    /// Ring width `arm_control` expects for this kind.
    ///
    /// `Terminated` wraps the write pointer over one descriptor, `Looping`
    /// wraps the read pointer over two descriptors, `Single` does not wrap.
    #[must_use]
    pub const fn wrap_bits(self) -> u8 {
        match self {
            ListKind::Terminated => DESCRIPTOR_WRAP_BITS,
            ListKind::Looping => LOOP_WRAP_BITS,
            ListKind::Single => 0,
        }
    }

    /// Whether the pipeline ever reaches `Halted`
    #[must_use]
    pub const fn terminates(self) -> bool {
        matches!(self, ListKind::Terminated)
    }
}

// =============================================================================
// Descriptor List
// =============================================================================

/// Statically allocated descriptor list.
///
/// `N` counts every slot, sentinel included. The array is 16-byte aligned so
/// a two-descriptor loop sits on its read-ring boundary.
///
/// # Example
///
/// ```ignore
/// static SAMPLES: [u32; 2] = [0xAA, 0xAA];
/// static LIST: StaticCell<DescriptorList<2>> = StaticCell::new();
///
/// let list = LIST.init(
///     DescriptorList::builder()
///         .with(Descriptor::from_samples(&SAMPLES))?
///         .finish()?,
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C, align(16))]
pub struct DescriptorList<const N: usize> {
    descriptors: [Descriptor; N],
    entries: usize,
    kind: ListKind,
}

impl<const N: usize> DescriptorList<N> {
    /// Start building a terminated list
    #[must_use]
    pub const fn builder() -> DescriptorListBuilder<N> {
        DescriptorListBuilder::new()
    }

    /// Terminated list holding `entries` followed by the sentinel.
    ///
    /// Requires `entries.len() < N`.
    pub fn terminated(entries: &[Descriptor]) -> ConfigResult<Self> {
        let mut builder = DescriptorListBuilder::new();
        for entry in entries {
            builder.push(entry.transfer_count, entry.source)?;
        }
        builder.finish()
    }

    /// List kind
    #[inline(always)]
    pub const fn kind(&self) -> ListKind {
        self.kind
    }

    /// Number of real (non-sentinel) entries
    #[inline(always)]
    pub const fn entries(&self) -> usize {
        self.entries
    }

    /// Descriptors the control channel reads, sentinel included
    pub fn descriptors(&self) -> &[Descriptor] {
        match self.kind {
            ListKind::Terminated => &self.descriptors[..=self.entries],
            ListKind::Looping | ListKind::Single => &self.descriptors[..self.entries],
        }
    }

    /// Words in control-channel read order
    pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
        self.descriptors().iter().flat_map(|desc| desc.to_words())
    }

    /// Total words streamed per pass over the list
    pub fn total_transfers(&self) -> u64 {
        self.descriptors()
            .iter()
            .map(|desc| desc.transfer_count as u64)
            .sum()
    }

    /// Bus layout of a list placed at `base`
    pub fn layout_at(&self, base: u32) -> ConfigResult<ListLayout> {
        let preset_count = match self.kind {
            ListKind::Single => self.descriptors.first().map_or(0, |desc| desc.transfer_count),
            ListKind::Terminated | ListKind::Looping => 0,
        };
        ListLayout::new(self.kind, base, self.entries as u32, preset_count)
    }

    /// Bus layout of this list in place
    #[cfg(target_pointer_width = "32")]
    pub fn layout(&'static self) -> ConfigResult<ListLayout> {
        self.layout_at(self.descriptors.as_ptr() as u32)
    }
}

impl DescriptorList<2> {
    /// Two descriptors replayed forever
    #[must_use]
    pub const fn looping(first: Descriptor, second: Descriptor) -> Self {
        Self {
            descriptors: [first, second],
            entries: 2,
            kind: ListKind::Looping,
        }
    }
}

impl DescriptorList<1> {
    /// One buffer of `transfer_count` words at `source`, replayed forever
    #[must_use]
    pub const fn single(source: u32, transfer_count: u32) -> Self {
        Self {
            descriptors: [Descriptor::new(transfer_count, source)],
            entries: 1,
            kind: ListKind::Single,
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for terminated lists with capacity `N` (sentinel included)
#[derive(Debug, Clone, Copy)]
pub struct DescriptorListBuilder<const N: usize> {
    descriptors: [Descriptor; N],
    len: usize,
}

impl<const N: usize> DescriptorListBuilder<N> {
    /// Empty builder
    #[must_use]
    pub const fn new() -> Self {
        Self {
            descriptors: [Descriptor::SENTINEL; N],
            len: 0,
        }
    }

    /// Append `transfer_count` words at `source`.
    ///
    /// One slot always stays reserved for the sentinel.
    pub fn push(&mut self, transfer_count: u32, source: u32) -> ConfigResult<&mut Self> {
        if self.len + 1 >= N {
            return Err(ConfigError::ListFull);
        }
        self.descriptors[self.len] = Descriptor::new(transfer_count, source);
        self.len += 1;
        Ok(self)
    }

    /// Chaining form of [`DescriptorListBuilder::push`]
    pub fn with(mut self, descriptor: Descriptor) -> ConfigResult<Self> {
        self.push(descriptor.transfer_count, descriptor.source)?;
        Ok(self)
    }

    /// Entries pushed so far
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing was pushed yet
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append the sentinel and produce the list
    pub fn finish(mut self) -> ConfigResult<DescriptorList<N>> {
        if self.len >= N {
            return Err(ConfigError::ListFull);
        }
        self.descriptors[self.len] = Descriptor::SENTINEL;
        Ok(DescriptorList {
            descriptors: self.descriptors,
            entries: self.len,
            kind: ListKind::Terminated,
        })
    }
}

impl<const N: usize> Default for DescriptorListBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Bus Layout
// =============================================================================

/// Where a list lives on the bus and how the control channel walks it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ListLayout {
    kind: ListKind,
    base: u32,
    entries: u32,
    preset_count: u32,
}

impl ListLayout {
    /// Validate a layout.
    ///
    /// Looping lists must sit on their read-ring boundary, everything else on
    /// a word boundary. `preset_count` is the data channel's fixed transfer
    /// count for `Single` lists and ignored otherwise.
    pub const fn new(
        kind: ListKind,
        base: u32,
        entries: u32,
        preset_count: u32,
    ) -> ConfigResult<Self> {
        let align = match kind {
            ListKind::Looping => 1u32 << LOOP_WRAP_BITS,
            ListKind::Terminated | ListKind::Single => WORD_SIZE as u32,
        };
        if base % align != 0 {
            return Err(ConfigError::UnalignedList);
        }
        if matches!(kind, ListKind::Looping) && entries != 2 {
            return Err(ConfigError::WrapMismatch);
        }
        if matches!(kind, ListKind::Single) && entries != 1 {
            return Err(ConfigError::WrapMismatch);
        }
        Ok(Self {
            kind,
            base,
            entries,
            preset_count,
        })
    }

    /// List kind
    #[inline(always)]
    pub const fn kind(&self) -> ListKind {
        self.kind
    }

    /// Bus address of the first descriptor
    #[inline(always)]
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Real entries (sentinel excluded)
    #[inline(always)]
    pub const fn entries(&self) -> u32 {
        self.entries
    }

    /// Data channel transfer count programmed at arm time
    #[inline(always)]
    pub const fn preset_count(&self) -> u32 {
        match self.kind {
            ListKind::Single => self.preset_count,
            ListKind::Terminated | ListKind::Looping => 0,
        }
    }

    /// First address the control channel reads
    #[inline(always)]
    pub const fn control_read_address(&self) -> u32 {
        match self.kind {
            // Only the source word is replayed
            ListKind::Single => self.base + WORD_SIZE as u32,
            ListKind::Terminated | ListKind::Looping => self.base,
        }
    }

    /// Index of the descriptor slot a read address points into
    #[inline(always)]
    pub const fn slot_of(&self, read_addr: u32) -> u32 {
        read_addr.wrapping_sub(self.base) / DESCRIPTOR_SIZE as u32
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;

    #[test]
    fn builder_appends_sentinel() {
        let list = DescriptorList::<3>::builder()
            .with(Descriptor::new(2, 0x2000_0000))
            .unwrap()
            .finish()
            .unwrap();
        assert_eq!(list.kind(), ListKind::Terminated);
        assert_eq!(list.entries(), 1);
        assert_eq!(list.descriptors().len(), 2);
        assert!(list.descriptors()[1].is_sentinel());
    }

    #[test]
    fn builder_reserves_sentinel_slot() {
        let mut builder = DescriptorListBuilder::<2>::new();
        builder.push(1, 0x2000_0000).unwrap();
        assert_eq!(builder.push(1, 0x2000_0004).err(), Some(ConfigError::ListFull));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn empty_terminated_list_is_only_sentinel() {
        let list = DescriptorList::<1>::terminated(&[]).unwrap();
        assert_eq!(list.entries(), 0);
        assert_eq!(list.words().collect::<Vec<_>>(), [0, 0]);
    }

    #[test]
    fn zero_capacity_list_cannot_finish() {
        assert_eq!(
            DescriptorList::<0>::terminated(&[]).err(),
            Some(ConfigError::ListFull)
        );
    }

    #[test]
    fn words_in_read_order() {
        let list = DescriptorList::<3>::terminated(&[
            Descriptor::new(2, 0x2000_0100),
            Descriptor::new(5, 0x2000_0200),
        ])
        .unwrap();
        assert_eq!(
            list.words().collect::<Vec<_>>(),
            [2, 0x2000_0100, 5, 0x2000_0200, 0, 0]
        );
        assert_eq!(list.total_transfers(), 7);
    }

    #[test]
    fn list_storage_is_ring_aligned() {
        assert_eq!(core::mem::align_of::<DescriptorList<2>>(), 16);
        assert_eq!(core::mem::offset_of!(DescriptorList<2>, descriptors), 0);
    }

    #[test]
    fn looping_layout_requires_ring_alignment() {
        let list = DescriptorList::looping(
            Descriptor::new(1, 0x2000_0000),
            Descriptor::new(1, 0x2000_0000),
        );
        assert!(list.layout_at(0x2000_0010).is_ok());
        assert_eq!(list.layout_at(0x2000_0008).err(), Some(ConfigError::UnalignedList));
    }

    #[test]
    fn single_layout_replays_source_word() {
        let list = DescriptorList::single(0x2000_0040, 2);
        let layout = list.layout_at(0x2000_0100).unwrap();
        assert_eq!(layout.control_read_address(), 0x2000_0104);
        assert_eq!(layout.preset_count(), 2);
    }

    #[test]
    fn slot_of_counts_descriptors() {
        let layout = ListLayout::new(ListKind::Terminated, 0x2000_0000, 3, 0).unwrap();
        assert_eq!(layout.slot_of(0x2000_0000), 0);
        assert_eq!(layout.slot_of(0x2000_0004), 0);
        assert_eq!(layout.slot_of(0x2000_0008), 1);
        assert_eq!(layout.slot_of(0x2000_0018), 3);
    }

    #[test]
    fn kind_wrap_widths() {
        assert_eq!(ListKind::Terminated.wrap_bits(), 3);
        assert_eq!(ListKind::Looping.wrap_bits(), 4);
        assert_eq!(ListKind::Single.wrap_bits(), 0);
        assert!(ListKind::Terminated.terminates());
        assert!(!ListKind::Looping.terminates());
    }
}
