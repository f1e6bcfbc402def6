//! ISR-safe channel wrapper.

use super::primitives::CriticalSectionCell;
use crate::driver::channel::ChannelController;
use crate::hal::clock::{PeripheralClock, Pmc};
use crate::register::{MmioBus, RegisterBus};

/// Channel controller shared between thread mode and interrupt handlers.
///
/// All access goes through `critical_section::with()`, so a completion
/// interrupt can read and clear the channel's status while the main loop
/// owns the transfer.
///
/// # Example
///
/// ```ignore
/// ph_sam_xdmac::xdmac_static_channel!(ADC_DMA, 0);
///
/// ADC_DMA.with(|ch| ch.open())?;
///
/// #[interrupt]
/// fn XDMAC() {
///     let status = ADC_DMA.with(|ch| ch.interrupt_status());
///     if status.block_end {
///         // hand the buffer off
///     }
/// }
/// ```
pub struct SharedChannel<B: RegisterBus, C: PeripheralClock, const CH: usize> {
    inner: CriticalSectionCell<ChannelController<B, C, CH>>,
}

/// Shared channel on the memory-mapped XDMAC and PMC
pub type SharedXdmacChannel<const CH: usize> = SharedChannel<MmioBus, Pmc<MmioBus>, CH>;

impl<B: RegisterBus, C: PeripheralClock, const CH: usize> SharedChannel<B, C, CH> {
    /// Create a closed shared channel (const, usable in a `static`).
    pub const fn new(bus: B, clock: C) -> Self {
        Self {
            inner: CriticalSectionCell::new(ChannelController::new(bus, clock)),
        }
    }

    /// Wrap an existing controller, keeping its state.
    pub const fn from_controller(channel: ChannelController<B, C, CH>) -> Self {
        Self {
            inner: CriticalSectionCell::new(channel),
        }
    }

    /// Run `f` with exclusive access to the channel.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut ChannelController<B, C, CH>) -> R,
    {
        self.inner.with(f)
    }

    /// Run `f`, or return `None` if the channel is already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut ChannelController<B, C, CH>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Unwrap the controller.
    pub fn into_inner(self) -> ChannelController<B, C, CH> {
        self.inner.into_inner()
    }
}
