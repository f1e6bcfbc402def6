//! Critical-section protected interior mutability.

use core::cell::RefCell;
use critical_section::Mutex;

/// Cell giving exclusive access to its value inside a critical section.
///
/// Combines `critical_section::Mutex` with `RefCell` so the same value can be
/// driven from thread mode and from the XDMAC interrupt handler.
///
/// The cell is `Sync` exactly when `T: Send`, so a value tied to one
/// context cannot be placed in a `static`:
///
/// ```compile_fail
/// use ph_sam_xdmac::sync::CriticalSectionCell;
///
/// static CELL: CriticalSectionCell<Option<std::rc::Rc<u8>>> = CriticalSectionCell::new(None);
/// ```
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, usable in a `static`).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access to the value.
    ///
    /// Interrupts are masked for the duration of the closure. Re-entering
    /// the same cell from inside `f` panics; use [`try_with`](Self::try_with)
    /// where that can happen.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Run `f`, or return `None` if the value is already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }

    /// Consume the cell and return the value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}
