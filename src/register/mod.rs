//! Memory-mapped register access for the XDMAC and PMC blocks
//!
//! Every driver in this crate reaches hardware through a [`RegisterBus`]:
//! a base-relative, 32-bit, volatile register window. On target the bus is an
//! [`MmioBus`] pointing at the peripheral's base address; on the host the
//! tests substitute a simulated register file with the same layout.

pub mod pmc;
pub mod xdmac;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

// =============================================================================
// Register Bus
// =============================================================================

/// A window of 32-bit registers addressed by byte offset from a base.
///
/// Implementations must perform each access exactly once and in program
/// order (volatile semantics). Reads may have side effects: several XDMAC
/// status registers are clear-on-read.
pub trait RegisterBus {
    /// Read the register at `offset`
    fn read(&self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`
    fn write(&self, offset: usize, value: u32);

    /// Read-modify-write the register at `offset`
    #[inline]
    fn modify<F>(&self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for &T {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value);
    }
}

/// Volatile memory-mapped register window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioBus {
    base: usize,
}

impl MmioBus {
    /// Create a bus for the register block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the start of a register block that is valid for
    /// 32-bit volatile access at every offset the driver uses. Only one
    /// owner may drive a given channel's registers at a time.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of this window
    #[inline(always)]
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterBus for MmioBus {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: the constructor contract guarantees the window is valid
        unsafe { read_reg(self.base + offset) }
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: the constructor contract guarantees the window is valid
        unsafe { write_reg(self.base + offset, value) }
    }
}
