//! XDMAC Register Definitions
//!
//! The Extensible DMA Controller exposes a block of global registers
//! (enable/disable/status bitmaps with one bit per channel, software request
//! triggers) followed by one 0x40-byte register group per channel.
//!
//! Offsets and bit positions follow the SAM E70/S70/V70/V71 datasheet.

// =============================================================================
// Global Register Offsets
// =============================================================================

/// Global Type Register offset (read-only)
pub const XDMAC_GTYPE: usize = 0x00;
/// Global Configuration Register offset
pub const XDMAC_GCFG: usize = 0x04;
/// Global Weighted Arbiter Configuration Register offset
pub const XDMAC_GWAC: usize = 0x08;
/// Global Interrupt Enable Register offset (write-only)
pub const XDMAC_GIE: usize = 0x0C;
/// Global Interrupt Disable Register offset (write-only)
pub const XDMAC_GID: usize = 0x10;
/// Global Interrupt Mask Register offset (read-only)
pub const XDMAC_GIM: usize = 0x14;
/// Global Interrupt Status Register offset (read-only)
pub const XDMAC_GIS: usize = 0x18;
/// Global Channel Enable Register offset (write-only, one bit per channel)
pub const XDMAC_GE: usize = 0x1C;
/// Global Channel Disable Register offset (write-only, one bit per channel)
pub const XDMAC_GD: usize = 0x20;
/// Global Channel Status Register offset (read-only, one bit per channel)
///
/// A channel's bit is set by a write to [`XDMAC_GE`] and cleared by hardware
/// when the programmed microblock has been transferred, or by [`XDMAC_GD`].
pub const XDMAC_GS: usize = 0x24;
/// Global Channel Read Suspend Register offset
pub const XDMAC_GRS: usize = 0x28;
/// Global Channel Write Suspend Register offset
pub const XDMAC_GWS: usize = 0x2C;
/// Global Channel Read Write Suspend Register offset
pub const XDMAC_GRWS: usize = 0x30;
/// Global Channel Read Write Resume Register offset
pub const XDMAC_GRWR: usize = 0x34;
/// Global Channel Software Request Register offset (write-only)
pub const XDMAC_GSWR: usize = 0x38;
/// Global Channel Software Request Status Register offset
pub const XDMAC_GSWS: usize = 0x3C;
/// Global Channel Software Flush Request Register offset
pub const XDMAC_GSWF: usize = 0x40;

// =============================================================================
// Per-Channel Register Offsets
// =============================================================================

/// Offset of channel 0's register group
pub const XDMAC_CHANNEL_BASE: usize = 0x50;
/// Stride between consecutive channel register groups
pub const XDMAC_CHANNEL_STRIDE: usize = 0x40;

/// Channel Interrupt Enable Register offset (write-only)
pub const XDMAC_CIE: usize = 0x00;
/// Channel Interrupt Disable Register offset (write-only)
pub const XDMAC_CID: usize = 0x04;
/// Channel Interrupt Mask Register offset (read-only)
pub const XDMAC_CIM: usize = 0x08;
/// Channel Interrupt Status Register offset (read-only, clear-on-read)
pub const XDMAC_CIS: usize = 0x0C;
/// Channel Source Address Register offset
pub const XDMAC_CSA: usize = 0x10;
/// Channel Destination Address Register offset
pub const XDMAC_CDA: usize = 0x14;
/// Channel Next Descriptor Address Register offset
pub const XDMAC_CNDA: usize = 0x18;
/// Channel Next Descriptor Control Register offset
pub const XDMAC_CNDC: usize = 0x1C;
/// Channel Microblock Control Register offset
pub const XDMAC_CUBC: usize = 0x20;
/// Channel Block Control Register offset
pub const XDMAC_CBC: usize = 0x24;
/// Channel Configuration Register offset
pub const XDMAC_CC: usize = 0x28;
/// Channel Data Stride Memory Set Pattern Register offset
pub const XDMAC_CDS_MSP: usize = 0x2C;
/// Channel Source Microblock Stride Register offset
pub const XDMAC_CSUS: usize = 0x30;
/// Channel Destination Microblock Stride Register offset
pub const XDMAC_CDUS: usize = 0x34;

/// Byte offset of register `reg` within channel `channel`'s group
#[inline(always)]
pub const fn channel_reg(channel: usize, reg: usize) -> usize {
    XDMAC_CHANNEL_BASE + channel * XDMAC_CHANNEL_STRIDE + reg
}

/// Bit for `channel` in the global GE/GD/GS/GSWR bitmaps
#[inline(always)]
pub const fn channel_bit(channel: usize) -> u32 {
    1 << channel
}

// =============================================================================
// Channel Interrupt Bits (CIE / CID / CIM / CIS)
// =============================================================================

/// End of Block interrupt
pub const XDMAC_CI_BI: u32 = 1 << 0;
/// End of Linked List interrupt
pub const XDMAC_CI_LI: u32 = 1 << 1;
/// End of Disable interrupt
pub const XDMAC_CI_DI: u32 = 1 << 2;
/// End of Flush interrupt
pub const XDMAC_CI_FI: u32 = 1 << 3;
/// Read Bus Error interrupt
pub const XDMAC_CI_RBE: u32 = 1 << 4;
/// Write Bus Error interrupt
pub const XDMAC_CI_WBE: u32 = 1 << 5;
/// Request Overflow Error interrupt
pub const XDMAC_CI_RO: u32 = 1 << 6;

/// All channel interrupt sources
pub const XDMAC_CI_ALL: u32 = XDMAC_CI_BI
    | XDMAC_CI_LI
    | XDMAC_CI_DI
    | XDMAC_CI_FI
    | XDMAC_CI_RBE
    | XDMAC_CI_WBE
    | XDMAC_CI_RO;

// =============================================================================
// Channel Microblock Control (CUBC)
// =============================================================================

/// Microblock length field mask (data units)
pub const XDMAC_CUBC_UBLEN_MASK: u32 = 0x00FF_FFFF;

// =============================================================================
// Channel Configuration Register (CC) Bits
// =============================================================================

/// Transfer type: 0 = memory transfer, 1 = peripheral synchronized
pub const XDMAC_CC_TYPE: u32 = 1 << 0;
/// Memory burst size shift
pub const XDMAC_CC_MBSIZE_SHIFT: u32 = 1;
/// Memory burst size mask
pub const XDMAC_CC_MBSIZE_MASK: u32 = 0x3 << 1;
/// Synchronization direction: 0 = peripheral to memory, 1 = memory to peripheral
pub const XDMAC_CC_DSYNC: u32 = 1 << 4;
/// Software request: 0 = hardware handshake, 1 = software trigger
pub const XDMAC_CC_SWREQ: u32 = 1 << 6;
/// Memory set mode
pub const XDMAC_CC_MEMSET: u32 = 1 << 7;
/// Chunk size shift
pub const XDMAC_CC_CSIZE_SHIFT: u32 = 8;
/// Chunk size mask
pub const XDMAC_CC_CSIZE_MASK: u32 = 0x7 << 8;
/// Data width shift
pub const XDMAC_CC_DWIDTH_SHIFT: u32 = 11;
/// Data width mask
pub const XDMAC_CC_DWIDTH_MASK: u32 = 0x3 << 11;
/// Source interface: 0 = AHB IF0, 1 = AHB IF1
pub const XDMAC_CC_SIF: u32 = 1 << 13;
/// Destination interface: 0 = AHB IF0, 1 = AHB IF1
pub const XDMAC_CC_DIF: u32 = 1 << 14;
/// Source addressing mode shift
pub const XDMAC_CC_SAM_SHIFT: u32 = 16;
/// Source addressing mode mask
pub const XDMAC_CC_SAM_MASK: u32 = 0x3 << 16;
/// Destination addressing mode shift
pub const XDMAC_CC_DAM_SHIFT: u32 = 18;
/// Destination addressing mode mask
pub const XDMAC_CC_DAM_MASK: u32 = 0x3 << 18;
/// Channel initialization terminated (read-only)
pub const XDMAC_CC_INITD: u32 = 1 << 21;
/// Read in progress (read-only)
pub const XDMAC_CC_RDIP: u32 = 1 << 22;
/// Write in progress (read-only)
pub const XDMAC_CC_WRIP: u32 = 1 << 23;
/// Hardware interface (peripheral) identifier shift
pub const XDMAC_CC_PERID_SHIFT: u32 = 24;
/// Hardware interface (peripheral) identifier mask
pub const XDMAC_CC_PERID_MASK: u32 = 0x7F << 24;

/// Addressing mode field values (SAM / DAM)
pub mod am {
    /// Address remains unchanged
    pub const FIXED: u32 = 0;
    /// Address incremented by the data width after each unit
    pub const INCREMENTED: u32 = 1;
}

/// Memory burst size field values (MBSIZE)
pub mod mbsize {
    /// Single-beat burst
    pub const SINGLE: u32 = 0;
    /// Four-beat burst
    pub const FOUR: u32 = 1;
    /// Eight-beat burst
    pub const EIGHT: u32 = 2;
    /// Sixteen-beat burst
    pub const SIXTEEN: u32 = 3;
}

/// Data width field values (DWIDTH)
pub mod dwidth {
    /// 8-bit units
    pub const BYTE: u32 = 0;
    /// 16-bit units
    pub const HALFWORD: u32 = 1;
    /// 32-bit units
    pub const WORD: u32 = 2;
}
