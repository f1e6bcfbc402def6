//! Core driver components for the XDMAC.
//!
//! - [`config`] - Transfer configuration and its channel-register encoding
//! - [`channel`] - The per-channel controller and its lifecycle
//! - [`error`] - Error types and result aliases
//! - [`interrupt`] - Channel interrupt status and source selection
//! - [`element`] - Element types for typed memory copies
//!
//! # Example
//!
//! ```ignore
//! use ph_sam_xdmac::driver::{ChannelController, DataWidth, TransferConfig};
//!
//! let mut dma: ChannelController<_, _, 2> = ChannelController::new(bus, pmc);
//! dma.open()?;
//! dma.configure(TransferConfig::memory_to_memory(DataWidth::Byte))?;
//! ```

// Submodules
pub mod channel;
pub mod config;
pub mod element;
pub mod error;
pub mod interrupt;

// Re-exports for convenience
pub use channel::{ChannelController, ChannelState};
pub use config::{BurstSize, ChunkSize, DataWidth, Direction, TransferConfig};
pub use element::Element;
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
pub use interrupt::{ChannelInterruptStatus, ChannelInterrupts};
