//! Async/await support for pipeline completion.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        User Code                            │
//! │   pipeline.start()?;                                        │
//! │   pipeline.wait_async().await?;                             │
//! └─────────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CompletionFuture                         │
//! │   - Checks the data channel's completion flag               │
//! │   - Registers with COMPLETION_WAKER, enables INTE0          │
//! │   - Returns Poll::Pending if not halted                     │
//! └─────────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              ISR (completion_interrupt_handler)             │
//! │   - Masks the channel in INTE0, leaving the flag set        │
//! │   - Wakes COMPLETION_WAKER                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ph_rp2040_dac::sync::asynch::completion_interrupt_handler;
//!
//! async fn play(pipeline: &mut Pipeline<Rp2040Dma>) {
//!     pipeline.start().unwrap();
//!     pipeline.wait_async().await.unwrap();
//! }
//!
//! #[interrupt]
//! fn DMA_IRQ_0() {
//!     let mut dma = unsafe { Rp2040Dma::steal() };
//!     completion_interrupt_handler(&mut dma, DATA_CHANNEL);
//! }
//! ```

use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use super::primitives::AtomicWaker;
use crate::driver::error::{StateError, StateResult};
use crate::driver::pipeline::Pipeline;
use crate::hal::dma::{ChannelId, DmaController};

/// Waker for the pending completion wait.
pub static COMPLETION_WAKER: AtomicWaker = AtomicWaker::new();

/// Completion interrupt handler.
///
/// Call from the DMA_IRQ_0 handler with the pipeline's data channel. The
/// completion flag stays set so [`Pipeline::is_complete`] keeps reporting
/// the halt.
#[inline]
pub fn completion_interrupt_handler<D: DmaController>(dma: &mut D, data: ChannelId) {
    if dma.completion_flag(data) {
        dma.set_completion_interrupt(data, false);
        COMPLETION_WAKER.wake();
    }
}

/// Future resolving once a started pipeline halts.
///
/// Never resolves on looping lists.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct CompletionFuture<'a, D: DmaController> {
    pipeline: &'a mut Pipeline<D>,
}

impl<'a, D: DmaController> CompletionFuture<'a, D> {
    /// Create a new completion future.
    pub fn new(pipeline: &'a mut Pipeline<D>) -> Self {
        Self { pipeline }
    }

    /// The pipeline being waited on
    pub fn pipeline_mut(&mut self) -> &mut Pipeline<D> {
        self.pipeline
    }
}

impl<D: DmaController> Future for CompletionFuture<'_, D> {
    type Output = StateResult<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if !this.pipeline.is_started() {
            return Poll::Ready(Err(StateError::NotArmed));
        }

        if !this.pipeline.is_complete() {
            COMPLETION_WAKER.register(cx.waker());
            this.pipeline.enable_completion_interrupt(true);
            if !this.pipeline.is_complete() {
                return Poll::Pending;
            }
        }

        this.pipeline.enable_completion_interrupt(false);
        Poll::Ready(Ok(()))
    }
}

impl<D: DmaController> Drop for CompletionFuture<'_, D> {
    fn drop(&mut self) {
        self.pipeline.enable_completion_interrupt(false);
    }
}

impl<D: DmaController> Pipeline<D> {
    /// Wait for the completion flag without spinning.
    ///
    /// Requires [`completion_interrupt_handler`] to run from the DMA
    /// interrupt. Resolves to [`StateError::NotArmed`] if the pipeline was
    /// never started.
    pub fn wait_async(&mut self) -> CompletionFuture<'_, D> {
        CompletionFuture::new(self)
    }
}
