//! SAM E70/V71 XDMAC Driver
//!
//! A `no_std`, `no_alloc` driver for the Extensible DMA Controller (XDMAC)
//! found on Microchip SAM E70, S70, V70 and V71 parts.
//!
//! The crate covers three concerns:
//!
//! 1. **Allocation** ([`allocation`]): a const-evaluated registry of
//!    peripheral-to-channel bindings. Two features that program the same
//!    channel register block fail the build instead of corrupting each
//!    other's transfers at runtime.
//! 2. **Channel control** ([`driver`]): [`ChannelController`] drives one
//!    hardware channel through open, configure, transfer, completion polling
//!    with an elapsed-time bound, and close.
//! 3. **Acquisition** ([`acquisition`]): single-shot, double-buffered and
//!    interleaved multi-input capture from an ADC-style sampling peripheral.
//!
//! Hardware is reached through the [`RegisterBus`](register::RegisterBus)
//! trait, so the same driver code runs against memory-mapped registers on
//! target and against a simulated controller in host tests.
//!
//! # Features
//!
//! - `defmt`: Route driver logging through `defmt` and derive `defmt::Format`
//! - `log`: Route driver logging through the `log` facade
//! - `critical-section`: Enable the ISR-safe [`sync::SharedChannel`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use ph_sam_xdmac::{ChannelController, DataWidth, TransferConfig};
//! use ph_sam_xdmac::constants::{DEFAULT_TRANSFER_TIMEOUT_US, PMC_BASE, XDMAC_BASE};
//! use ph_sam_xdmac::hal::Pmc;
//! use ph_sam_xdmac::unsafe_registers::MmioBus;
//!
//! ph_sam_xdmac::dma_allocations!(ALLOCATIONS = [
//!     AllocationDescriptor::new(Peripheral::Usart0, RequestLine::Tx, 0),
//!     AllocationDescriptor::new(Peripheral::Spi0, RequestLine::Rx, 1),
//! ]);
//!
//! let bus = unsafe { MmioBus::new(XDMAC_BASE) };
//! let pmc = Pmc::new(unsafe { MmioBus::new(PMC_BASE) });
//! let mut channel: ChannelController<_, _, 2> = ChannelController::new(bus, pmc);
//!
//! channel.open()?;
//! channel.configure(TransferConfig::memory_to_memory(DataWidth::Word))?;
//! // SAFETY: neither buffer is touched until the wait below returns.
//! unsafe { channel.start_copy(&src, &mut dst)? };
//! channel.wait_complete(&mut delay, DEFAULT_TRANSFER_TIMEOUT_US)?;
//! channel.close()?;
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

// Internal implementation details (pub(crate) only); declared first so the
// logging macros are visible to every other module.
#[macro_use]
mod internal;

pub mod acquisition;
pub mod allocation;
pub mod driver;
pub mod hal;
pub mod register;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use acquisition::{
    DoubleBufferedAcquisition, InterleavedScan, SamplerConfig, SamplingPeripheral,
    StreamingAcquisition,
};
pub use allocation::{AllocationDescriptor, AllocationRegistry, Peripheral, RequestLine};
pub use driver::channel::{ChannelController, ChannelState};
pub use driver::config::{BurstSize, ChunkSize, DataWidth, Direction, TransferConfig};
pub use driver::element::Element;
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use driver::interrupt::{ChannelInterruptStatus, ChannelInterrupts};

#[cfg(feature = "critical-section")]
pub use sync::{SharedChannel, SharedXdmacChannel};

/// Low-level register accessors for advanced use.
///
/// Most users should prefer [`ChannelController`] over touching the
/// registers directly.
///
/// # Safety
///
/// Direct register access bypasses the channel state machine. Writing a
/// channel's registers while the controller owns it can corrupt an in-flight
/// transfer.
pub mod unsafe_registers {
    pub use crate::register::{MmioBus, RegisterBus, pmc, read_reg, write_reg, xdmac};
}

/// Controller limits, addresses and timing defaults.
pub mod constants {
    pub use crate::internal::constants::{
        // Timing
        DEFAULT_POLL_INTERVAL_US,
        DEFAULT_TRANSFER_TIMEOUT_US,
        // Limits
        MAX_ALLOCATIONS,
        MAX_HANDSHAKE_ID,
        MAX_SCAN_CHANNELS,
        MAX_TRANSFER_COUNT,
        // Addresses
        PMC_BASE,
        XDMAC_BASE,
        XDMAC_CHANNELS,
        XDMAC_PERIPHERAL_ID,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe channel on the memory-mapped controller.
///
/// Expands to a [`SharedXdmacChannel`] static bound to `XDMAC_BASE` and
/// `PMC_BASE`. The channel index is checked at compile time.
///
/// # Examples
///
/// ```ignore
/// ph_sam_xdmac::xdmac_static_channel!(ADC_DMA, 0);
///
/// ADC_DMA.with(|ch| {
///     ch.open().unwrap();
///     ch.configure(TransferConfig::peripheral_to_memory(35, DataWidth::HalfWord)).unwrap();
/// });
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! xdmac_static_channel {
    ($name:ident, $ch:expr) => {
        static $name: $crate::sync::SharedXdmacChannel<{ $ch }> = $crate::sync::SharedChannel::new(
            // SAFETY: both windows are the fixed register blocks of this device.
            unsafe { $crate::unsafe_registers::MmioBus::new($crate::constants::XDMAC_BASE) },
            $crate::hal::Pmc::new(unsafe {
                $crate::unsafe_registers::MmioBus::new($crate::constants::PMC_BASE)
            }),
        );
    };
}
