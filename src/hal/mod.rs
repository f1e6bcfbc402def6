//! Hardware Abstraction Layer
//!
//! This module provides the collaborators the DMA driver needs from the rest
//! of the chip, expressed as traits so boards and tests can supply their own.
//!
//! # Modules
//!
//! - [`clock`]: Peripheral clock gating
//!
//! # Delay Integration
//!
//! Types that wait on hardware use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL (e.g., a SysTick delay).

pub mod clock;

// Re-export commonly used types
pub use clock::{PeripheralClock, Pmc};
