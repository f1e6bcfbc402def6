//! Transfer configuration types for the XDMAC driver

use super::error::{DmaError, DmaResult};
use crate::internal::constants::MAX_HANDSHAKE_ID;
use crate::register::xdmac::{
    XDMAC_CC_CSIZE_MASK, XDMAC_CC_CSIZE_SHIFT, XDMAC_CC_DAM_MASK, XDMAC_CC_DAM_SHIFT,
    XDMAC_CC_DIF, XDMAC_CC_DSYNC, XDMAC_CC_DWIDTH_MASK, XDMAC_CC_DWIDTH_SHIFT,
    XDMAC_CC_MBSIZE_MASK, XDMAC_CC_MBSIZE_SHIFT, XDMAC_CC_PERID_MASK, XDMAC_CC_PERID_SHIFT,
    XDMAC_CC_SAM_MASK, XDMAC_CC_SAM_SHIFT, XDMAC_CC_SIF, XDMAC_CC_SWREQ, XDMAC_CC_TYPE, am,
    dwidth, mbsize,
};

/// Direction of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Peripheral data register to memory, paced by the peripheral's request line
    #[default]
    PeripheralToMemory,
    /// Memory to peripheral data register, paced by the peripheral's request line
    MemoryToPeripheral,
    /// Memory to memory, started by a software trigger
    MemoryToMemory,
}

impl Direction {
    /// Whether the transfer is paced by a peripheral handshake
    #[inline]
    pub const fn is_peripheral_synchronized(self) -> bool {
        !matches!(self, Direction::MemoryToMemory)
    }
}

/// Width of one transfer unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataWidth {
    /// 8-bit
    #[default]
    Byte,
    /// 16-bit
    HalfWord,
    /// 32-bit
    Word,
}

impl DataWidth {
    /// Size of one unit in bytes
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            DataWidth::Byte => 1,
            DataWidth::HalfWord => 2,
            DataWidth::Word => 4,
        }
    }

    /// DWIDTH field value
    #[must_use]
    pub const fn to_reg_value(self) -> u32 {
        match self {
            DataWidth::Byte => dwidth::BYTE,
            DataWidth::HalfWord => dwidth::HALFWORD,
            DataWidth::Word => dwidth::WORD,
        }
    }
}

/// Memory burst size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BurstSize {
    /// Single beat
    #[default]
    Single,
    /// 4 beats
    Four,
    /// 8 beats
    Eight,
    /// 16 beats
    Sixteen,
}

impl BurstSize {
    /// MBSIZE field value
    #[must_use]
    pub const fn to_reg_value(self) -> u32 {
        match self {
            BurstSize::Single => mbsize::SINGLE,
            BurstSize::Four => mbsize::FOUR,
            BurstSize::Eight => mbsize::EIGHT,
            BurstSize::Sixteen => mbsize::SIXTEEN,
        }
    }
}

/// Number of data units moved per peripheral request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ChunkSize {
    /// 1 unit per request
    #[default]
    One = 0,
    /// 2 units per request
    Two = 1,
    /// 4 units per request
    Four = 2,
    /// 8 units per request
    Eight = 3,
    /// 16 units per request
    Sixteen = 4,
}

impl ChunkSize {
    /// CSIZE field value
    #[must_use]
    pub const fn to_reg_value(self) -> u32 {
        self as u32
    }
}

/// Configuration for one DMA channel
///
/// The XDMAC moves a single data width per channel, so `src_width` and
/// `dst_width` must agree; [`validate`](Self::validate) rejects a mismatch.
///
/// # Example
///
/// ```ignore
/// let config = TransferConfig::peripheral_to_memory(35, DataWidth::HalfWord)
///     .with_burst_size(BurstSize::Four);
/// channel.configure(config)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferConfig {
    /// Transfer direction
    pub direction: Direction,
    /// Source unit width
    pub src_width: DataWidth,
    /// Destination unit width
    pub dst_width: DataWidth,
    /// Hardware interface id of the pacing peripheral (`None` for memory to memory)
    pub peripheral_id: Option<u8>,
    /// Increment the source address after each unit
    pub src_increment: bool,
    /// Increment the destination address after each unit
    pub dst_increment: bool,
    /// Memory burst size
    pub burst_size: BurstSize,
    /// Units per peripheral request
    pub chunk_size: ChunkSize,
}

impl TransferConfig {
    /// Create a configuration for `direction` with byte units.
    ///
    /// Memory-side addresses increment and peripheral-side addresses stay
    /// fixed; no handshake id is set.
    pub const fn new(direction: Direction) -> Self {
        let (src_increment, dst_increment) = match direction {
            Direction::PeripheralToMemory => (false, true),
            Direction::MemoryToPeripheral => (true, false),
            Direction::MemoryToMemory => (true, true),
        };

        Self {
            direction,
            src_width: DataWidth::Byte,
            dst_width: DataWidth::Byte,
            peripheral_id: None,
            src_increment,
            dst_increment,
            burst_size: BurstSize::Single,
            chunk_size: ChunkSize::One,
        }
    }

    /// Memory to memory copy with the given unit width
    pub const fn memory_to_memory(width: DataWidth) -> Self {
        Self::new(Direction::MemoryToMemory).with_width(width)
    }

    /// Peripheral to memory transfer paced by hardware interface `peripheral_id`
    pub const fn peripheral_to_memory(peripheral_id: u8, width: DataWidth) -> Self {
        Self::new(Direction::PeripheralToMemory)
            .with_width(width)
            .with_peripheral_id(peripheral_id)
    }

    /// Memory to peripheral transfer paced by hardware interface `peripheral_id`
    pub const fn memory_to_peripheral(peripheral_id: u8, width: DataWidth) -> Self {
        Self::new(Direction::MemoryToPeripheral)
            .with_width(width)
            .with_peripheral_id(peripheral_id)
    }

    /// Set both source and destination width
    #[must_use]
    pub const fn with_width(mut self, width: DataWidth) -> Self {
        self.src_width = width;
        self.dst_width = width;
        self
    }

    /// Set the source width only
    #[must_use]
    pub const fn with_src_width(mut self, width: DataWidth) -> Self {
        self.src_width = width;
        self
    }

    /// Set the destination width only
    #[must_use]
    pub const fn with_dst_width(mut self, width: DataWidth) -> Self {
        self.dst_width = width;
        self
    }

    /// Set the pacing peripheral's hardware interface id
    #[must_use]
    pub const fn with_peripheral_id(mut self, peripheral_id: u8) -> Self {
        self.peripheral_id = Some(peripheral_id);
        self
    }

    /// Set address increment flags
    #[must_use]
    pub const fn with_increment(mut self, src: bool, dst: bool) -> Self {
        self.src_increment = src;
        self.dst_increment = dst;
        self
    }

    /// Set the memory burst size
    #[must_use]
    pub const fn with_burst_size(mut self, burst_size: BurstSize) -> Self {
        self.burst_size = burst_size;
        self
    }

    /// Set the chunk size
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: ChunkSize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Unit width of the transfer
    #[inline]
    pub const fn width(&self) -> DataWidth {
        self.dst_width
    }

    /// Check the configuration can be expressed in the channel registers
    ///
    /// # Errors
    /// - `InvalidParameter` - Widths differ, a peripheral transfer has no
    ///   (or an out-of-range) handshake id, or a memory copy names one
    pub const fn validate(&self) -> DmaResult<()> {
        if !matches!(
            (self.src_width, self.dst_width),
            (DataWidth::Byte, DataWidth::Byte)
                | (DataWidth::HalfWord, DataWidth::HalfWord)
                | (DataWidth::Word, DataWidth::Word)
        ) {
            return Err(DmaError::InvalidParameter);
        }

        match (self.direction.is_peripheral_synchronized(), self.peripheral_id) {
            (true, Some(id)) if id <= MAX_HANDSHAKE_ID => Ok(()),
            (false, None) => Ok(()),
            _ => Err(DmaError::InvalidParameter),
        }
    }

    /// Encode as a channel configuration (CC) register value
    ///
    /// Memory sits on AHB interface 0 and peripherals on interface 1.
    pub const fn to_cc(&self) -> u32 {
        let mut cc = 0u32;

        match self.direction {
            Direction::PeripheralToMemory => {
                cc |= XDMAC_CC_TYPE | XDMAC_CC_SIF;
            }
            Direction::MemoryToPeripheral => {
                cc |= XDMAC_CC_TYPE | XDMAC_CC_DSYNC | XDMAC_CC_DIF;
            }
            Direction::MemoryToMemory => {
                cc |= XDMAC_CC_SWREQ;
            }
        }

        cc |= (self.burst_size.to_reg_value() << XDMAC_CC_MBSIZE_SHIFT) & XDMAC_CC_MBSIZE_MASK;
        cc |= (self.chunk_size.to_reg_value() << XDMAC_CC_CSIZE_SHIFT) & XDMAC_CC_CSIZE_MASK;
        cc |= (self.dst_width.to_reg_value() << XDMAC_CC_DWIDTH_SHIFT) & XDMAC_CC_DWIDTH_MASK;

        let sam = if self.src_increment { am::INCREMENTED } else { am::FIXED };
        let dam = if self.dst_increment { am::INCREMENTED } else { am::FIXED };
        cc |= (sam << XDMAC_CC_SAM_SHIFT) & XDMAC_CC_SAM_MASK;
        cc |= (dam << XDMAC_CC_DAM_SHIFT) & XDMAC_CC_DAM_MASK;

        if let Some(id) = self.peripheral_id {
            cc |= ((id as u32) << XDMAC_CC_PERID_SHIFT) & XDMAC_CC_PERID_MASK;
        }

        cc
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::new(Direction::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
