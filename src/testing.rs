//! Testing utilities and simulated hardware
//!
//! This module provides mock implementations for exercising the DMA driver
//! on the host without hardware access. The centerpiece is
//! [`SimulatedXdmac`], a register-level model of the controller that moves
//! real bytes between host buffers.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::vec::Vec;

use crate::acquisition::sampler::{SamplerConfig, SamplingPeripheral};
use crate::driver::error::{ConfigError, ConfigResult, DmaError, Result};
use crate::hal::clock::PeripheralClock;
use crate::internal::constants::XDMAC_CHANNELS;
use crate::register::RegisterBus;
use crate::register::xdmac::{
    XDMAC_CC, XDMAC_CC_DAM_MASK, XDMAC_CC_DAM_SHIFT, XDMAC_CC_DWIDTH_MASK,
    XDMAC_CC_DWIDTH_SHIFT, XDMAC_CC_SAM_MASK, XDMAC_CC_SAM_SHIFT, XDMAC_CC_SWREQ, XDMAC_CDA,
    XDMAC_CHANNEL_BASE, XDMAC_CHANNEL_STRIDE, XDMAC_CI_BI, XDMAC_CI_DI, XDMAC_CI_RBE,
    XDMAC_CI_WBE, XDMAC_CID, XDMAC_CIE, XDMAC_CIM, XDMAC_CIS, XDMAC_CSA, XDMAC_CUBC,
    XDMAC_CUBC_UBLEN_MASK, XDMAC_GD, XDMAC_GE, XDMAC_GS, XDMAC_GSWR, am, channel_bit,
    channel_reg, dwidth,
};

// =============================================================================
// Recording Bus
// =============================================================================

/// Plain register file that remembers every write
///
/// Reads return the last written (or preset) value; no register has side
/// effects.
#[derive(Debug, Default)]
pub struct RecordingBus {
    registers: RefCell<HashMap<usize, u32>>,
    write_log: RefCell<Vec<(usize, u32)>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a register without logging a write
    pub fn set(&self, offset: usize, value: u32) {
        self.registers.borrow_mut().insert(offset, value);
    }

    /// All writes in order
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.write_log.borrow().clone()
    }
}

impl RegisterBus for RecordingBus {
    fn read(&self, offset: usize) -> u32 {
        self.registers.borrow().get(&offset).copied().unwrap_or(0)
    }

    fn write(&self, offset: usize, value: u32) {
        self.registers.borrow_mut().insert(offset, value);
        self.write_log.borrow_mut().push((offset, value));
    }
}

// =============================================================================
// Simulated XDMAC
// =============================================================================

/// Bus address the simulator treats as a peripheral data register.
///
/// Reads pop from the sample feed and writes are collected in the drain
/// log. A channel reading this address while the feed is empty stalls, as a
/// peripheral that has not raised its request line.
pub const SIM_PERIPHERAL_DATA: usize = 0x4003_C020;

#[derive(Debug, Default, Clone, Copy)]
struct SimChannel {
    active: bool,
    requested: bool,
    src: u32,
    dst: u32,
    remaining: u32,
    width: usize,
    src_increment: bool,
    dst_increment: bool,
    interrupt_status: u32,
}

#[derive(Debug, Default)]
struct SimState {
    registers: HashMap<usize, u32>,
    writes: Vec<(usize, u32)>,
    status: u32,
    channels: [SimChannel; XDMAC_CHANNELS],
    regions: Vec<(usize, usize)>,
    feed: VecDeque<u32>,
    drained: Vec<u32>,
    stores: Vec<usize>,
}

/// Register-level XDMAC model
///
/// - Writing GE latches the channel's CSA, CDA, CUBC and CC registers and
///   sets its GS bit; GD stops the channel and clears the bit.
/// - Channels configured for software requests only move data after their
///   GSWR bit is written.
/// - Every GS read advances each running channel by one data unit. The
///   channel's GS bit clears on the read that moves its last unit.
/// - Addresses resolve against host buffers registered with [`map`] or
///   [`map_mut`]; an unmapped address raises a bus error and stops the
///   channel.
///
/// [`map`]: SimulatedXdmac::map
/// [`map_mut`]: SimulatedXdmac::map_mut
#[derive(Debug, Default)]
pub struct SimulatedXdmac {
    state: RefCell<SimState>,
}

impl SimulatedXdmac {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source buffer and return its bus address
    pub fn map<T>(&self, buf: &[T]) -> usize {
        let addr = buf.as_ptr() as usize;
        self.state.borrow_mut().regions.push((addr, core::mem::size_of_val(buf)));
        addr
    }

    /// Register a destination buffer and return its bus address
    pub fn map_mut<T>(&self, buf: &mut [T]) -> usize {
        let addr = buf.as_mut_ptr() as usize;
        self.state.borrow_mut().regions.push((addr, core::mem::size_of_val(buf)));
        addr
    }

    /// Queue samples for reads of [`SIM_PERIPHERAL_DATA`]
    pub fn feed<I: IntoIterator<Item = u32>>(&self, samples: I) {
        self.state.borrow_mut().feed.extend(samples);
    }

    /// Samples not yet consumed
    pub fn pending_samples(&self) -> usize {
        self.state.borrow().feed.len()
    }

    /// Values written to [`SIM_PERIPHERAL_DATA`]
    pub fn drained(&self) -> Vec<u32> {
        self.state.borrow().drained.clone()
    }

    /// Host addresses of every data unit stored to memory, in order
    pub fn stores(&self) -> Vec<usize> {
        self.state.borrow().stores.clone()
    }

    /// All register writes in order
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state.borrow().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    /// Peek at a register without read side effects
    pub fn register(&self, offset: usize) -> u32 {
        let state = self.state.borrow();
        match (offset, decode_channel(offset)) {
            (XDMAC_GS, _) => state.status,
            (_, Some((ch, XDMAC_CIS))) => state.channels[ch].interrupt_status,
            _ => state.registers.get(&offset).copied().unwrap_or(0),
        }
    }

    /// Advance running channels as a GS read would
    pub fn tick(&self) {
        self.state.borrow_mut().step();
    }

    /// Whether channel `ch` is still running
    pub fn is_active(&self, ch: usize) -> bool {
        self.state.borrow().channels[ch].active
    }
}

fn decode_channel(offset: usize) -> Option<(usize, usize)> {
    let rel = offset.checked_sub(XDMAC_CHANNEL_BASE)?;
    let ch = rel / XDMAC_CHANNEL_STRIDE;
    (ch < XDMAC_CHANNELS).then_some((ch, rel % XDMAC_CHANNEL_STRIDE))
}

fn channels_in(bits: u32) -> impl Iterator<Item = usize> {
    (0..XDMAC_CHANNELS).filter(move |ch| bits & channel_bit(*ch) != 0)
}

impl SimState {
    fn reg(&self, offset: usize) -> u32 {
        self.registers.get(&offset).copied().unwrap_or(0)
    }

    fn enable(&mut self, ch: usize) {
        let cc = self.reg(channel_reg(ch, XDMAC_CC));
        let width = match (cc & XDMAC_CC_DWIDTH_MASK) >> XDMAC_CC_DWIDTH_SHIFT {
            dwidth::BYTE => 1,
            dwidth::HALFWORD => 2,
            _ => 4,
        };

        self.channels[ch] = SimChannel {
            active: true,
            requested: cc & XDMAC_CC_SWREQ == 0,
            src: self.reg(channel_reg(ch, XDMAC_CSA)),
            dst: self.reg(channel_reg(ch, XDMAC_CDA)),
            remaining: self.reg(channel_reg(ch, XDMAC_CUBC)) & XDMAC_CUBC_UBLEN_MASK,
            width,
            src_increment: (cc & XDMAC_CC_SAM_MASK) >> XDMAC_CC_SAM_SHIFT == am::INCREMENTED,
            dst_increment: (cc & XDMAC_CC_DAM_MASK) >> XDMAC_CC_DAM_SHIFT == am::INCREMENTED,
            interrupt_status: self.channels[ch].interrupt_status,
        };
        self.status |= channel_bit(ch);
    }

    fn disable(&mut self, ch: usize) {
        if self.channels[ch].active {
            self.channels[ch].interrupt_status |= XDMAC_CI_DI;
        }
        self.channels[ch].active = false;
        self.status &= !channel_bit(ch);
    }

    fn finish(&mut self, ch: usize, flag: u32) {
        self.channels[ch].active = false;
        self.channels[ch].interrupt_status |= flag;
        self.status &= !channel_bit(ch);
    }

    fn step(&mut self) {
        for ch in 0..XDMAC_CHANNELS {
            if self.channels[ch].active && self.channels[ch].requested {
                self.move_unit(ch);
            }
        }
    }

    fn move_unit(&mut self, ch: usize) {
        let channel = self.channels[ch];
        let peripheral = SIM_PERIPHERAL_DATA as u32;

        let value = if channel.src == peripheral {
            match self.feed.pop_front() {
                Some(value) => value,
                None => return,
            }
        } else {
            match self.resolve(channel.src, channel.width) {
                Some(host) => unsafe { load(host, channel.width) },
                None => return self.finish(ch, XDMAC_CI_RBE),
            }
        };

        if channel.dst == peripheral {
            self.drained.push(value);
        } else {
            match self.resolve(channel.dst, channel.width) {
                Some(host) => {
                    unsafe { store(host, channel.width, value) };
                    self.stores.push(host);
                }
                None => return self.finish(ch, XDMAC_CI_WBE),
            }
        }

        let step = channel.width as u32;
        let channel = &mut self.channels[ch];
        if channel.src_increment {
            channel.src = channel.src.wrapping_add(step);
        }
        if channel.dst_increment {
            channel.dst = channel.dst.wrapping_add(step);
        }
        channel.remaining = channel.remaining.saturating_sub(1);
        if channel.remaining == 0 {
            self.finish(ch, XDMAC_CI_BI);
        }
    }

    /// Map a 32-bit bus address back onto a registered host buffer
    fn resolve(&self, addr: u32, width: usize) -> Option<usize> {
        self.regions.iter().find_map(|&(start, len)| {
            let offset = addr.wrapping_sub(start as u32) as usize;
            (offset + width <= len).then_some(start + offset)
        })
    }
}

unsafe fn load(host: usize, width: usize) -> u32 {
    unsafe {
        match width {
            1 => u32::from(core::ptr::read_unaligned(host as *const u8)),
            2 => u32::from(core::ptr::read_unaligned(host as *const u16)),
            _ => core::ptr::read_unaligned(host as *const u32),
        }
    }
}

unsafe fn store(host: usize, width: usize, value: u32) {
    unsafe {
        match width {
            1 => core::ptr::write_unaligned(host as *mut u8, value as u8),
            2 => core::ptr::write_unaligned(host as *mut u16, value as u16),
            _ => core::ptr::write_unaligned(host as *mut u32, value),
        }
    }
}

impl RegisterBus for SimulatedXdmac {
    fn read(&self, offset: usize) -> u32 {
        let mut state = self.state.borrow_mut();
        match (offset, decode_channel(offset)) {
            (XDMAC_GS, _) => {
                state.step();
                state.status
            }
            (_, Some((ch, XDMAC_CIS))) => core::mem::take(&mut state.channels[ch].interrupt_status),
            _ => state.reg(offset),
        }
    }

    fn write(&self, offset: usize, value: u32) {
        let mut state = self.state.borrow_mut();
        state.writes.push((offset, value));

        match (offset, decode_channel(offset)) {
            (XDMAC_GE, _) => channels_in(value).for_each(|ch| state.enable(ch)),
            (XDMAC_GD, _) => channels_in(value).for_each(|ch| state.disable(ch)),
            (XDMAC_GSWR, _) => {
                channels_in(value).for_each(|ch| state.channels[ch].requested = true);
            }
            (_, Some((ch, XDMAC_CIE))) => {
                let mask = state.reg(channel_reg(ch, XDMAC_CIM)) | value;
                state.registers.insert(channel_reg(ch, XDMAC_CIM), mask);
            }
            (_, Some((ch, XDMAC_CID))) => {
                let mask = state.reg(channel_reg(ch, XDMAC_CIM)) & !value;
                state.registers.insert(channel_reg(ch, XDMAC_CIM), mask);
            }
            _ => {
                state.registers.insert(offset, value);
            }
        }
    }
}

// =============================================================================
// Mock Clock
// =============================================================================

/// Peripheral clock gate backed by a bitmap
///
/// Implemented for `&MockClock` so several controllers can share one gate.
#[derive(Debug, Default)]
pub struct MockClock {
    enabled: Cell<u64>,
    enable_calls: Cell<usize>,
    fail: Cell<bool>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has been enabled
    pub fn enabled(&self, id: u8) -> bool {
        id < 64 && self.enabled.get() & (1 << id) != 0
    }

    /// Number of successful `enable` calls
    pub fn enable_calls(&self) -> usize {
        self.enable_calls.get()
    }

    /// Make every `enable` fail
    pub fn set_fail(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl PeripheralClock for &MockClock {
    fn is_enabled(&self, id: u8) -> bool {
        self.enabled(id)
    }

    fn enable(&mut self, id: u8) -> ConfigResult<()> {
        if self.fail.get() || id >= 64 {
            return Err(ConfigError::ClockError);
        }
        self.enabled.set(self.enabled.get() | (1 << id));
        self.enable_calls.set(self.enable_calls.get() + 1);
        Ok(())
    }

    fn disable(&mut self, id: u8) -> ConfigResult<()> {
        if id >= 64 {
            return Err(ConfigError::ClockError);
        }
        self.enabled.set(self.enabled.get() & !(1 << id));
        Ok(())
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay provider that accumulates requested time
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Get total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

// =============================================================================
// Mock Sampler
// =============================================================================

/// Analog front end stand-in feeding the simulator's peripheral register
#[derive(Debug, Default)]
pub struct MockSampler {
    pub opened: bool,
    pub config: Option<SamplerConfig>,
    pub enabled_channels: Vec<u8>,
    pub conversions_started: usize,
}

impl MockSampler {
    /// Hardware interface id reported by the mock (AFEC0 receive)
    pub const HANDSHAKE_ID: u8 = 35;
    /// Highest analog input the mock accepts
    pub const MAX_INPUT: u8 = 11;

    pub fn new() -> Self {
        Self::default()
    }
}

impl SamplingPeripheral for MockSampler {
    fn open(&mut self) -> Result<()> {
        if self.opened {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        self.opened = true;
        Ok(())
    }

    fn configure(&mut self, config: &SamplerConfig) -> Result<()> {
        if !self.opened {
            return Err(ConfigError::NotInitialized.into());
        }
        self.config = Some(*config);
        Ok(())
    }

    fn enable_channel(&mut self, channel: u8) -> Result<()> {
        if channel > Self::MAX_INPUT {
            return Err(DmaError::InvalidParameter.into());
        }
        self.enabled_channels.push(channel);
        Ok(())
    }

    fn disable_channel(&mut self, channel: u8) -> Result<()> {
        if channel > Self::MAX_INPUT {
            return Err(DmaError::InvalidParameter.into());
        }
        self.enabled_channels.retain(|&c| c != channel);
        Ok(())
    }

    fn start_conversion(&mut self) -> Result<()> {
        if self.config.is_none() {
            return Err(ConfigError::NotInitialized.into());
        }
        self.conversions_started += 1;
        Ok(())
    }

    fn transfer_source_address(&self) -> usize {
        SIM_PERIPHERAL_DATA
    }

    fn handshake_id(&self) -> u8 {
        Self::HANDSHAKE_ID
    }
}
