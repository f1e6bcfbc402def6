//! PMC (Power Management Controller) peripheral clock registers
//!
//! Peripheral clocks are gated in two banks of 32: identifiers 0-31 live in
//! the `*0` registers, 32-63 in the `*1` registers. Enable and disable
//! registers are write-1-to-act; the status registers mirror the gate state.

/// Peripheral Clock Enable Register 0 offset
pub const PMC_PCER0: usize = 0x0010;
/// Peripheral Clock Disable Register 0 offset
pub const PMC_PCDR0: usize = 0x0014;
/// Peripheral Clock Status Register 0 offset
pub const PMC_PCSR0: usize = 0x0018;
/// Peripheral Clock Enable Register 1 offset
pub const PMC_PCER1: usize = 0x0100;
/// Peripheral Clock Disable Register 1 offset
pub const PMC_PCDR1: usize = 0x0104;
/// Peripheral Clock Status Register 1 offset
pub const PMC_PCSR1: usize = 0x0108;

/// Number of peripheral identifiers per register bank
pub const PMC_IDS_PER_BANK: u8 = 32;

/// Highest peripheral identifier addressable through PCER/PCDR
pub const PMC_MAX_PERIPHERAL_ID: u8 = 63;

/// Register offsets `(enable, disable, status)` and bit for a peripheral id
///
/// Returns `None` for identifiers above [`PMC_MAX_PERIPHERAL_ID`].
pub const fn gate(id: u8) -> Option<(usize, usize, usize, u32)> {
    if id > PMC_MAX_PERIPHERAL_ID {
        None
    } else if id < PMC_IDS_PER_BANK {
        Some((PMC_PCER0, PMC_PCDR0, PMC_PCSR0, 1 << id))
    } else {
        Some((PMC_PCER1, PMC_PCDR1, PMC_PCSR1, 1 << (id - PMC_IDS_PER_BANK)))
    }
}
