//! Peripheral Clock HAL
//!
//! The DMA engine only needs one thing from the clock tree: the ability to
//! ungate a peripheral clock by identifier. Board bring-up (oscillators,
//! PLL, master clock) is assumed to have happened before any channel is
//! opened.

use crate::driver::error::{ConfigError, ConfigResult};
use crate::register::RegisterBus;
use crate::register::pmc::gate;

/// Gate control for peripheral clocks
///
/// This trait can be implemented by a board support crate that already owns
/// the PMC, allowing the channel controller to share its clock tree.
pub trait PeripheralClock {
    /// Check whether the clock for peripheral `id` is running
    fn is_enabled(&self, id: u8) -> bool;

    /// Enable the clock for peripheral `id`
    fn enable(&mut self, id: u8) -> ConfigResult<()>;

    /// Disable the clock for peripheral `id`
    fn disable(&mut self, id: u8) -> ConfigResult<()>;
}

impl<T: PeripheralClock + ?Sized> PeripheralClock for &mut T {
    fn is_enabled(&self, id: u8) -> bool {
        (**self).is_enabled(id)
    }

    fn enable(&mut self, id: u8) -> ConfigResult<()> {
        (**self).enable(id)
    }

    fn disable(&mut self, id: u8) -> ConfigResult<()> {
        (**self).disable(id)
    }
}

/// PMC-backed peripheral clock gate
///
/// # Example
///
/// ```ignore
/// let pmc = Pmc::new(unsafe { MmioBus::new(PMC_BASE) });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Pmc<B: RegisterBus> {
    bus: B,
}

impl<B: RegisterBus> Pmc<B> {
    /// Create a clock gate over the PMC register block
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: RegisterBus> PeripheralClock for Pmc<B> {
    fn is_enabled(&self, id: u8) -> bool {
        match gate(id) {
            Some((_, _, status, bit)) => (self.bus.read(status) & bit) != 0,
            None => false,
        }
    }

    fn enable(&mut self, id: u8) -> ConfigResult<()> {
        let (enable, _, _, bit) = gate(id).ok_or(ConfigError::ClockError)?;
        self.bus.write(enable, bit);
        debug!("peripheral clock {} enabled", id);
        Ok(())
    }

    fn disable(&mut self, id: u8) -> ConfigResult<()> {
        let (_, disable, _, bit) = gate(id).ok_or(ConfigError::ClockError)?;
        self.bus.write(disable, bit);
        Ok(())
    }
}
