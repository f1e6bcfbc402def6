//! Interrupt-safe sharing
//!
//! Available with the `critical-section` feature.
//!
//! - [`CriticalSectionCell`] - interior mutability guarded by a critical section
//! - [`SharedChannel`] - a [`ChannelController`](crate::ChannelController)
//!   that thread mode and the XDMAC interrupt handler can both drive
//!
//! # Example
//!
//! ```ignore
//! ph_sam_xdmac::xdmac_static_channel!(SPI_TX_DMA, 1);
//!
//! fn main() {
//!     SPI_TX_DMA.with(|ch| {
//!         ch.open().unwrap();
//!         ch.configure(TransferConfig::memory_to_peripheral(1, DataWidth::Byte)).unwrap();
//!     });
//! }
//! ```

mod primitives;
mod shared;

pub use primitives::CriticalSectionCell;
pub use shared::{SharedChannel, SharedXdmacChannel};
