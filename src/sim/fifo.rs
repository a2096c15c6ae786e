//! Paced TX FIFO model standing in for a PIO state machine.

use crate::hal::dma::Pacing;
use crate::hal::output::{OutputEngine, PioTxFifo};

/// Deepest FIFO the model can hold (TX and RX joined)
pub const MAX_FIFO_DEPTH: usize = 8;

/// TX FIFO draining one word every `drain_period` cycles.
///
/// Drained words are captured in order, up to `CAP` of them; the total count
/// keeps running past that.
#[derive(Debug, Clone)]
pub struct SimFifo<const CAP: usize> {
    target: PioTxFifo,
    depth: usize,
    drain_period: u32,
    level: usize,
    queue: [u32; MAX_FIFO_DEPTH],
    head: usize,
    countdown: u32,
    captured: [u32; CAP],
    delivered: usize,
    overflows: u32,
}

impl<const CAP: usize> SimFifo<CAP> {
    /// FIFO at the address and DREQ of `target`.
    ///
    /// `depth` is clamped to 1..=8 and `drain_period` to at least one cycle.
    pub fn new(target: PioTxFifo, depth: usize, drain_period: u32) -> Self {
        let drain_period = drain_period.max(1);
        Self {
            target,
            depth: depth.clamp(1, MAX_FIFO_DEPTH),
            drain_period,
            level: 0,
            queue: [0; MAX_FIFO_DEPTH],
            head: 0,
            countdown: drain_period,
            captured: [0; CAP],
            delivered: 0,
            overflows: 0,
        }
    }

    /// State machine this FIFO models
    pub const fn target(&self) -> PioTxFifo {
        self.target
    }

    /// Whether the DREQ is asserted
    pub fn ready(&self) -> bool {
        self.level < self.depth
    }

    /// Whether `pacing` is this FIFO's DREQ
    pub fn paces(&self, pacing: Pacing) -> bool {
        pacing == self.target.pacing()
    }

    /// Words waiting in the FIFO
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Push a word written by the bus; a full FIFO drops it
    pub fn push(&mut self, word: u32) {
        if self.level == self.depth {
            self.overflows += 1;
            return;
        }
        let tail = (self.head + self.level) % MAX_FIFO_DEPTH;
        self.queue[tail] = word;
        self.level += 1;
    }

    /// Advance one cycle, shifting a word out when the period elapses
    pub fn tick(&mut self) {
        if self.level == 0 {
            self.countdown = self.drain_period;
            return;
        }
        self.countdown -= 1;
        if self.countdown > 0 {
            return;
        }
        self.countdown = self.drain_period;

        let word = self.queue[self.head];
        self.head = (self.head + 1) % MAX_FIFO_DEPTH;
        self.level -= 1;
        if let Some(slot) = self.captured.get_mut(self.delivered) {
            *slot = word;
        }
        self.delivered += 1;
    }

    /// Captured output words, oldest first
    pub fn captured(&self) -> &[u32] {
        &self.captured[..self.delivered.min(CAP)]
    }

    /// Total words shifted out
    pub const fn delivered(&self) -> usize {
        self.delivered
    }

    /// Words dropped because the FIFO was full
    pub const fn overflows(&self) -> u32 {
        self.overflows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::output::PioBlock;

    fn fifo<const CAP: usize>(depth: usize, period: u32) -> SimFifo<CAP> {
        SimFifo::new(PioTxFifo::new(PioBlock::Pio0, 0).unwrap(), depth, period)
    }

    #[test]
    fn drains_in_order_at_period() {
        let mut f = fifo::<4>(4, 2);
        f.push(1);
        f.push(2);
        f.tick();
        assert_eq!(f.delivered(), 0);
        f.tick();
        assert_eq!(f.captured(), [1]);
        f.tick();
        f.tick();
        assert_eq!(f.captured(), [1, 2]);
        assert_eq!(f.level(), 0);
    }

    #[test]
    fn dreq_deasserts_when_full() {
        let mut f = fifo::<4>(2, 1);
        assert!(f.ready());
        f.push(1);
        f.push(2);
        assert!(!f.ready());
        f.push(3);
        assert_eq!(f.overflows(), 1);
    }

    #[test]
    fn capture_stops_at_capacity_but_count_continues() {
        let mut f = fifo::<2>(4, 1);
        for word in 0..3 {
            f.push(word);
            f.tick();
        }
        assert_eq!(f.captured(), [0, 1]);
        assert_eq!(f.delivered(), 3);
    }

    #[test]
    fn paces_only_its_own_dreq() {
        let f = fifo::<1>(4, 1);
        assert!(f.paces(Pacing::Dreq(0)));
        assert!(!f.paces(Pacing::Dreq(1)));
        assert!(!f.paces(Pacing::Permanent));
    }
}
