//! Channel interrupt flags for the XDMAC.
//!
//! [`ChannelInterruptStatus`] parses the clear-on-read CIS register.
//! [`ChannelInterrupts`] selects sources for the CIE/CID registers.
//!
//! Completion is always observed by polling the global channel status;
//! these flags exist for diagnostics (bus errors, overflows) and for
//! applications that wire their own XDMAC interrupt handler.

use crate::register::xdmac::{
    XDMAC_CI_BI, XDMAC_CI_DI, XDMAC_CI_FI, XDMAC_CI_LI, XDMAC_CI_RBE, XDMAC_CI_RO, XDMAC_CI_WBE,
};

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt status flags parsed from a channel's CIS register.
///
/// # Example
///
/// ```ignore
/// let status = channel.interrupt_status();
/// if status.has_error() {
///     // Bus error or request overflow on this channel
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelInterruptStatus {
    /// End of block
    pub block_end: bool,
    /// End of linked list
    pub linked_list_end: bool,
    /// End of disable
    pub disabled: bool,
    /// End of flush
    pub flushed: bool,
    /// Read bus error
    pub read_bus_error: bool,
    /// Write bus error
    pub write_bus_error: bool,
    /// Request overflow
    pub request_overflow: bool,
}

impl ChannelInterruptStatus {
    /// Create from a raw CIS register value
    #[inline]
    pub fn from_raw(status: u32) -> Self {
        Self {
            block_end: (status & XDMAC_CI_BI) != 0,
            linked_list_end: (status & XDMAC_CI_LI) != 0,
            disabled: (status & XDMAC_CI_DI) != 0,
            flushed: (status & XDMAC_CI_FI) != 0,
            read_bus_error: (status & XDMAC_CI_RBE) != 0,
            write_bus_error: (status & XDMAC_CI_WBE) != 0,
            request_overflow: (status & XDMAC_CI_RO) != 0,
        }
    }

    /// Convert back to the raw register encoding
    #[inline]
    pub fn to_raw(&self) -> u32 {
        let mut val = 0u32;
        if self.block_end {
            val |= XDMAC_CI_BI;
        }
        if self.linked_list_end {
            val |= XDMAC_CI_LI;
        }
        if self.disabled {
            val |= XDMAC_CI_DI;
        }
        if self.flushed {
            val |= XDMAC_CI_FI;
        }
        if self.read_bus_error {
            val |= XDMAC_CI_RBE;
        }
        if self.write_bus_error {
            val |= XDMAC_CI_WBE;
        }
        if self.request_overflow {
            val |= XDMAC_CI_RO;
        }
        val
    }

    /// Check if any error condition is flagged
    #[inline]
    pub fn has_error(&self) -> bool {
        self.read_bus_error || self.write_bus_error || self.request_overflow
    }

    /// Check if any flag is set
    #[inline]
    pub fn any(&self) -> bool {
        self.to_raw() != 0
    }
}

// =============================================================================
// Interrupt Selection
// =============================================================================

/// Set of channel interrupt sources to enable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelInterrupts(u32);

impl ChannelInterrupts {
    /// No sources
    pub const NONE: Self = Self(0);
    /// End of block
    pub const BLOCK_END: Self = Self(XDMAC_CI_BI);
    /// Read and write bus errors
    pub const BUS_ERRORS: Self = Self(XDMAC_CI_RBE | XDMAC_CI_WBE);
    /// Request overflow
    pub const REQUEST_OVERFLOW: Self = Self(XDMAC_CI_RO);

    /// Combine two sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Raw CIE register value
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl core::ops::BitOr for ChannelInterrupts {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
