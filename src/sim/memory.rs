//! Word-addressed SRAM model.

use super::BusFault;
use crate::internal::constants::WORD_SIZE;
use crate::internal::register::SRAM_BASE;

/// `MEM` words of SRAM starting at `0x2000_0000`
#[derive(Debug, Clone)]
pub struct SimMemory<const MEM: usize> {
    words: [u32; MEM],
}

impl<const MEM: usize> SimMemory<MEM> {
    /// Zero-filled memory
    pub const fn new() -> Self {
        Self { words: [0; MEM] }
    }

    /// Bus address of the first word
    pub const fn base(&self) -> u32 {
        SRAM_BASE as u32
    }

    /// One past the last mapped byte
    pub const fn end(&self) -> u32 {
        (SRAM_BASE + MEM * WORD_SIZE) as u32
    }

    /// Whether `addr` falls inside the modelled SRAM
    pub const fn contains(&self, addr: u32) -> bool {
        addr >= self.base() && addr < self.end()
    }

    fn index(&self, addr: u32) -> Result<usize, BusFault> {
        if !self.contains(addr) || addr as usize % WORD_SIZE != 0 {
            return Err(BusFault { address: addr });
        }
        Ok((addr - self.base()) as usize / WORD_SIZE)
    }

    /// Read the word at `addr`
    pub fn read(&self, addr: u32) -> Result<u32, BusFault> {
        Ok(self.words[self.index(addr)?])
    }

    /// Write the word at `addr`
    pub fn write(&mut self, addr: u32, value: u32) -> Result<(), BusFault> {
        let index = self.index(addr)?;
        self.words[index] = value;
        Ok(())
    }

    /// Copy `words` into memory starting at `addr`
    pub fn load(&mut self, addr: u32, words: &[u32]) -> Result<(), BusFault> {
        let last = addr.wrapping_add((words.len().saturating_sub(1) * WORD_SIZE) as u32);
        let start = self.index(addr)?;
        if !words.is_empty() {
            self.index(last)?;
        }
        self.words[start..start + words.len()].copy_from_slice(words);
        Ok(())
    }
}

impl<const MEM: usize> Default for SimMemory<MEM> {
    fn default() -> Self {
        Self::new()
    }
}
