//! Transfer descriptors
//!
//! A [`Descriptor`] is the two-word record the control channel copies into
//! the data channel: transfer count first, source address second. The field
//! order matches [`crate::hal::DescriptorWindow`], so a 2-word copy lands the
//! count in `AL3_TRANS_COUNT` and the address in the triggering
//! `AL3_READ_ADDR_TRIG`.
//!
//! Lists of descriptors are built with [`DescriptorList`].

mod list;

pub use list::{DescriptorList, DescriptorListBuilder, ListKind, ListLayout};

use crate::internal::constants::{DESCRIPTOR_SIZE, DESCRIPTOR_WRAP_BITS};

/// One chunk of samples to stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct Descriptor {
    /// Number of 32-bit words to transfer (0 = end of list)
    pub transfer_count: u32,
    /// Bus address of the first word
    pub source: u32,
}

// The control channel's write ring must cover exactly one descriptor.
const _: () = assert!(core::mem::size_of::<Descriptor>() == 1 << DESCRIPTOR_WRAP_BITS);
const _: () = assert!(core::mem::size_of::<Descriptor>() == DESCRIPTOR_SIZE);

impl Descriptor {
    /// Size of a descriptor in bytes
    pub const SIZE: usize = DESCRIPTOR_SIZE;

    /// End-of-list marker.
    ///
    /// The zero address turns the final trigger write into a null trigger,
    /// which raises the data channel's completion flag.
    pub const SENTINEL: Self = Self {
        transfer_count: 0,
        source: 0,
    };

    /// Descriptor streaming `transfer_count` words from bus address `source`
    #[must_use]
    pub const fn new(transfer_count: u32, source: u32) -> Self {
        Self {
            transfer_count,
            source,
        }
    }

    /// Descriptor streaming a whole sample buffer
    #[cfg(target_pointer_width = "32")]
    #[must_use]
    pub fn from_samples(samples: &'static [u32]) -> Self {
        Self::new(samples.len() as u32, samples.as_ptr() as u32)
    }

    /// Whether this descriptor terminates a list
    #[inline(always)]
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        self.transfer_count == 0
    }

    /// The two words as the control channel reads them
    #[inline(always)]
    #[must_use]
    pub const fn to_words(self) -> [u32; 2] {
        [self.transfer_count, self.source]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_precedes_address() {
        let desc = Descriptor::new(2, 0x2000_0100);
        assert_eq!(desc.to_words(), [2, 0x2000_0100]);
        assert_eq!(core::mem::offset_of!(Descriptor, transfer_count), 0);
        assert_eq!(core::mem::offset_of!(Descriptor, source), 4);
    }

    #[test]
    fn sentinel_is_all_zero() {
        assert!(Descriptor::SENTINEL.is_sentinel());
        assert_eq!(Descriptor::SENTINEL.to_words(), [0, 0]);
        assert!(!Descriptor::new(1, 0x2000_0000).is_sentinel());
    }

    #[test]
    fn zero_count_with_address_is_still_sentinel() {
        assert!(Descriptor::new(0, 0x2000_0000).is_sentinel());
    }
}
