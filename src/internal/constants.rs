//! Centralized Constants
//!
//! This module provides a single source of truth for the addresses, limits
//! and timing defaults used throughout the DMA driver.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Memory map**: Peripheral base addresses
//! - **Controller limits**: Channel count, microblock field width
//! - **Peripheral identifiers**: PMC clock gate ids
//! - **Timing**: Poll interval and default completion timeout
//!
//! # Note
//!
//! Hardware register bit definitions remain in their respective modules
//! (`register/xdmac.rs`, `register/pmc.rs`) as they are specific to those
//! hardware blocks.

// =============================================================================
// Memory Map
// =============================================================================

/// XDMAC register block base address
pub const XDMAC_BASE: usize = 0x4007_8000;

/// PMC register block base address
pub const PMC_BASE: usize = 0x400E_0600;

// =============================================================================
// Controller Limits
// =============================================================================

/// Number of XDMAC channels
pub const XDMAC_CHANNELS: usize = 24;

/// Largest microblock length the CUBC.UBLEN field can hold (data units)
pub const MAX_TRANSFER_COUNT: usize = 0x00FF_FFFF;

/// Largest hardware interface identifier that fits CC.PERID
pub const MAX_HANDSHAKE_ID: u8 = 0x7F;

/// Capacity of an allocation registry
pub const MAX_ALLOCATIONS: usize = 32;

/// Largest number of sampler channels an interleaved scan may cover
pub const MAX_SCAN_CHANNELS: usize = 16;

// =============================================================================
// Peripheral Identifiers (PMC)
// =============================================================================

/// PMC peripheral identifier of the XDMAC
pub const XDMAC_PERIPHERAL_ID: u8 = 58;

// =============================================================================
// Timing Constants
// =============================================================================

/// Default interval between completion polls in microseconds
pub const DEFAULT_POLL_INTERVAL_US: u32 = 10;

/// Default `wait_complete` timeout in microseconds
pub const DEFAULT_TRANSFER_TIMEOUT_US: u32 = 100_000;
