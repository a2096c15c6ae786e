//! Interrupt-safe cells backing the shared pools and the completion waker.

use core::cell::RefCell;
#[cfg(feature = "async")]
use core::task::Waker;
use critical_section::Mutex;

/// Mutable `static` storage guarded by a critical section.
///
/// Combines `critical_section::Mutex` with `RefCell` so a `static` can be
/// mutated from both thread mode and interrupt handlers.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Wrap `value`; usable in a `static` initializer
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` on the contents with interrupts masked.
    ///
    /// Panics if called re-entrantly from inside `f`.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Like [`CriticalSectionCell::with`], but `None` instead of a panic on
    /// re-entry
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| match self.inner.borrow(cs).try_borrow_mut() {
            Ok(mut value) => Some(f(&mut value)),
            Err(_) => None,
        })
    }
}

// SAFETY: every access to `inner` happens inside `critical_section::with`.
unsafe impl<T> Sync for CriticalSectionCell<T> {}

/// Interrupt-safe storage for the waker of a pending completion wait.
///
/// Registered from `poll`, taken and woken from the DMA interrupt handler.
#[cfg(feature = "async")]
pub struct AtomicWaker {
    waker: CriticalSectionCell<Option<Waker>>,
}

#[cfg(feature = "async")]
impl AtomicWaker {
    /// Empty slot; usable in a `static` initializer
    pub const fn new() -> Self {
        Self {
            waker: CriticalSectionCell::new(None),
        }
    }

    /// Store `waker`, replacing a different one
    pub fn register(&self, waker: &Waker) {
        self.waker.with(|slot| match slot {
            Some(existing) if existing.will_wake(waker) => {}
            _ => *slot = Some(waker.clone()),
        });
    }

    /// Wake and clear the stored waker, if any
    #[inline]
    pub fn wake(&self) {
        if let Some(waker) = self.waker.with(Option::take) {
            waker.wake();
        }
    }

    /// Whether a waker is stored
    pub fn is_registered(&self) -> bool {
        self.waker.with(|slot| slot.is_some())
    }
}

#[cfg(feature = "async")]
impl Default for AtomicWaker {
    fn default() -> Self {
        Self::new()
    }
}
