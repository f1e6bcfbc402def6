//! XDMAC channel controller
//!
//! A [`ChannelController`] owns one hardware channel, selected at compile
//! time by the `CH` const parameter, and drives it through its lifecycle:
//!
//! ```text
//!  Closed --open--> Opened --configure--> Configured --transfer--> Transferring
//!    ^                                        ^                     |        |
//!    |                                        +------ transfer -----+        |
//!    |                                                 Complete <-- GS clear |
//!    +----------------------- close (any open state) ----- TimedOut <--------+
//! ```
//!
//! `cancel` stops an in-flight transfer and returns the channel to
//! `Configured`.
//!
//! Completion is observed by polling the channel's bit in the global status
//! register; [`wait_complete`](ChannelController::wait_complete) bounds the
//! poll by elapsed time through an [`embedded_hal::delay::DelayNs`] provider.

use core::sync::atomic::{Ordering, fence};

use embedded_hal::delay::DelayNs;

use super::config::{Direction, TransferConfig};
use super::element::Element;
use super::error::{ConfigError, DmaError, IoError, Result};
use super::interrupt::{ChannelInterruptStatus, ChannelInterrupts};
use crate::hal::clock::PeripheralClock;
use crate::internal::constants::{
    DEFAULT_POLL_INTERVAL_US, MAX_TRANSFER_COUNT, XDMAC_CHANNELS, XDMAC_PERIPHERAL_ID,
};
use crate::register::RegisterBus;
use crate::register::xdmac::{
    XDMAC_CBC, XDMAC_CC, XDMAC_CDA, XDMAC_CDS_MSP, XDMAC_CDUS, XDMAC_CI_ALL, XDMAC_CID,
    XDMAC_CIE, XDMAC_CIS, XDMAC_CNDC, XDMAC_CSA, XDMAC_CSUS, XDMAC_CUBC, XDMAC_GD, XDMAC_GE,
    XDMAC_GS, XDMAC_GSWR, channel_bit, channel_reg,
};

// =============================================================================
// Channel State
// =============================================================================

/// Lifecycle state of a channel controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// Not owned; no registers touched
    #[default]
    Closed,
    /// Clock running, channel disabled, no configuration yet
    Opened,
    /// Configuration written, ready for a transfer
    Configured,
    /// Transfer issued, hardware enable bit set
    Transferring,
    /// Last transfer finished
    Complete,
    /// Last wait gave up before the transfer finished
    TimedOut,
}

impl ChannelState {
    /// Whether `open` has been called and `close` has not
    #[inline]
    pub const fn is_open(self) -> bool {
        !matches!(self, ChannelState::Closed)
    }

    /// Whether a transfer has been issued that may still be running
    #[inline]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, ChannelState::Transferring | ChannelState::TimedOut)
    }
}

// =============================================================================
// Channel Controller
// =============================================================================

/// Owner of XDMAC channel `CH`
///
/// `B` is the register bus over the XDMAC block and `C` gates the XDMAC
/// peripheral clock. Both are injected so the controller can run against
/// simulated hardware.
///
/// # Example
///
/// ```ignore
/// let bus = unsafe { MmioBus::new(XDMAC_BASE) };
/// let pmc = Pmc::new(unsafe { MmioBus::new(PMC_BASE) });
/// let mut dma: ChannelController<_, _, 0> = ChannelController::new(bus, pmc);
///
/// dma.open()?;
/// dma.configure(TransferConfig::memory_to_memory(DataWidth::Word))?;
/// // SAFETY: `src` and `dst` outlive the wait below and are not touched before it.
/// unsafe { dma.transfer(src.as_ptr() as usize, dst.as_mut_ptr() as usize, src.len())? };
/// dma.wait_complete(&mut delay, 1_000)?;
/// dma.close()?;
/// ```
#[derive(Debug)]
pub struct ChannelController<B: RegisterBus, C: PeripheralClock, const CH: usize> {
    bus: B,
    clock: C,
    state: ChannelState,
    config: Option<TransferConfig>,
    poll_interval_us: u32,
}

impl<B: RegisterBus, C: PeripheralClock, const CH: usize> ChannelController<B, C, CH> {
    /// Create a controller in the `Closed` state. No registers are touched.
    pub const fn new(bus: B, clock: C) -> Self {
        const { assert!(CH < XDMAC_CHANNELS, "XDMAC channel index out of range") };

        Self {
            bus,
            clock,
            state: ChannelState::Closed,
            config: None,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
        }
    }

    /// Set the interval between completion polls in `wait_complete`
    #[must_use]
    pub const fn with_poll_interval_us(mut self, poll_interval_us: u32) -> Self {
        self.poll_interval_us = if poll_interval_us == 0 { 1 } else { poll_interval_us };
        self
    }

    /// Hardware channel index
    #[inline]
    pub const fn channel(&self) -> usize {
        CH
    }

    /// Current lifecycle state
    #[inline]
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Active configuration, if any
    #[inline]
    pub fn config(&self) -> Option<&TransferConfig> {
        self.config.as_ref()
    }

    /// Interval between completion polls in microseconds
    #[inline]
    pub fn poll_interval_us(&self) -> u32 {
        self.poll_interval_us
    }

    /// Give back the register bus and clock gate
    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Take ownership of the hardware channel.
    ///
    /// Ungates the XDMAC clock if it is not already running, disables the
    /// channel and masks and clears its interrupt sources.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` if the channel is already open
    /// - `ClockError` if the clock gate refuses the XDMAC id
    pub fn open(&mut self) -> Result<()> {
        if self.state.is_open() {
            return Err(ConfigError::AlreadyInitialized.into());
        }

        if !self.clock.is_enabled(XDMAC_PERIPHERAL_ID) {
            self.clock.enable(XDMAC_PERIPHERAL_ID)?;
        }

        self.bus.write(XDMAC_GD, channel_bit(CH));
        self.bus.write(channel_reg(CH, XDMAC_CID), XDMAC_CI_ALL);
        let _ = self.bus.read(channel_reg(CH, XDMAC_CIS));

        self.config = None;
        self.state = ChannelState::Opened;

        debug!("xdmac ch{}: opened", CH);
        Ok(())
    }

    /// Apply a transfer configuration.
    ///
    /// May be called again to reconfigure once the previous transfer has
    /// finished.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` if the channel is not open
    /// - `InvalidParameter` if the configuration is inconsistent
    /// - `ChannelBusy` if a transfer is still running
    pub fn configure(&mut self, config: TransferConfig) -> Result<()> {
        if !self.state.is_open() {
            return Err(ConfigError::NotInitialized.into());
        }

        config.validate()?;
        self.ensure_idle()?;

        let cc = config.to_cc();
        self.bus.write(channel_reg(CH, XDMAC_CC), cc);

        self.config = Some(config);
        self.state = ChannelState::Configured;

        debug!("xdmac ch{}: CC={:#010x}", CH, cc);
        Ok(())
    }

    /// Issue a transfer of `count` data units from `src` to `dst`.
    ///
    /// Addresses are bus addresses; for a peripheral transfer one of them is
    /// the peripheral's data register. Memory to memory transfers are started
    /// with a software request; peripheral transfers wait for the handshake.
    ///
    /// Arguments are checked before any register is written.
    ///
    /// # Safety
    ///
    /// The hardware reads `src` and writes `dst` after this call returns.
    /// Both regions must be valid for `count` data units of the configured
    /// width and must stay valid, and must not be accessed by the CPU, until
    /// the transfer is observed complete or is stopped with
    /// [`cancel`](Self::cancel) or [`close`](Self::close).
    ///
    /// # Errors
    ///
    /// - `NotInitialized` if the channel is not open or not configured
    /// - `InvalidParameter` for a null address, a zero count, or a count
    ///   the microblock length field cannot hold
    /// - `ChannelBusy` if the previous transfer is still running
    pub unsafe fn transfer(&mut self, src: usize, dst: usize, count: usize) -> Result<()> {
        let config = match (self.state.is_open(), self.config) {
            (true, Some(config)) => config,
            _ => return Err(ConfigError::NotInitialized.into()),
        };

        if src == 0 || dst == 0 || count == 0 || count > MAX_TRANSFER_COUNT {
            return Err(DmaError::InvalidParameter.into());
        }

        self.ensure_idle()?;

        let _ = self.bus.read(channel_reg(CH, XDMAC_CIS));

        self.bus.write(channel_reg(CH, XDMAC_CSA), src as u32);
        self.bus.write(channel_reg(CH, XDMAC_CDA), dst as u32);
        self.bus.write(channel_reg(CH, XDMAC_CUBC), count as u32);
        self.bus.write(channel_reg(CH, XDMAC_CNDC), 0);
        self.bus.write(channel_reg(CH, XDMAC_CBC), 0);
        self.bus.write(channel_reg(CH, XDMAC_CDS_MSP), 0);
        self.bus.write(channel_reg(CH, XDMAC_CSUS), 0);
        self.bus.write(channel_reg(CH, XDMAC_CDUS), 0);

        self.bus.write(XDMAC_GE, channel_bit(CH));
        if config.direction == Direction::MemoryToMemory {
            self.bus.write(XDMAC_GSWR, channel_bit(CH));
        }

        self.state = ChannelState::Transferring;

        trace!(
            "xdmac ch{}: {:#010x} -> {:#010x}, {} units",
            CH,
            src as u32,
            dst as u32,
            count as u32
        );
        Ok(())
    }

    /// Copy `src` into `dst` with the configured memory to memory channel.
    ///
    /// The slices must have equal length and the element width must match
    /// the configured data width. The copy is only started; completion is
    /// observed with [`is_complete`](Self::is_complete) or
    /// [`wait_complete`](Self::wait_complete).
    ///
    /// # Safety
    ///
    /// The borrows end when this call returns but the copy does not. Neither
    /// slice may be moved, dropped or accessed until the copy is observed
    /// complete or is stopped with [`cancel`](Self::cancel) or
    /// [`close`](Self::close).
    pub unsafe fn start_copy<T: Element>(&mut self, src: &[T], dst: &mut [T]) -> Result<()> {
        let config = match (self.state.is_open(), self.config) {
            (true, Some(config)) => config,
            _ => return Err(ConfigError::NotInitialized.into()),
        };

        if config.direction != Direction::MemoryToMemory
            || config.width() != T::WIDTH
            || src.len() != dst.len()
        {
            return Err(DmaError::InvalidParameter.into());
        }

        // SAFETY: the caller upholds the same contract for both slices.
        unsafe { self.transfer(src.as_ptr() as usize, dst.as_mut_ptr() as usize, src.len()) }
    }

    /// Check whether the last issued transfer has finished.
    ///
    /// Returns `false` when no transfer has been issued. Once the hardware
    /// reports the channel idle the state moves to `Complete`.
    pub fn is_complete(&mut self) -> bool {
        match self.state {
            ChannelState::Complete => true,
            ChannelState::Transferring | ChannelState::TimedOut => {
                if self.hardware_active() {
                    false
                } else {
                    self.state = ChannelState::Complete;
                    true
                }
            }
            _ => false,
        }
    }

    /// Block until the last issued transfer finishes or `timeout_us` elapses.
    ///
    /// The channel is polled every `poll_interval_us`, sleeping on `delay`
    /// between polls, and once more after the last sleep. On timeout the
    /// transfer is left running and the state becomes `TimedOut`; a later
    /// `is_complete` or `wait_complete` may still observe completion.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` if no transfer has been issued
    /// - `Timeout` if the transfer did not finish in time
    pub fn wait_complete<D: DelayNs>(&mut self, delay: &mut D, timeout_us: u32) -> Result<()> {
        match self.state {
            ChannelState::Complete => return Ok(()),
            ChannelState::Transferring | ChannelState::TimedOut => {}
            _ => return Err(ConfigError::NotInitialized.into()),
        }

        let max_polls = (timeout_us / self.poll_interval_us).max(1);
        for _ in 0..max_polls {
            if self.is_complete() {
                return Ok(());
            }
            delay.delay_us(self.poll_interval_us);
        }
        if self.is_complete() {
            return Ok(());
        }

        self.state = ChannelState::TimedOut;
        warn!("xdmac ch{}: transfer timed out after {} us", CH, timeout_us);
        Err(IoError::Timeout.into())
    }

    /// Stop the running transfer, keeping the channel open and configured.
    ///
    /// Returns once the global status register shows the channel stopped,
    /// after which the hardware no longer touches the transfer's memory. A
    /// channel with nothing in flight is left as it is.
    ///
    /// # Errors
    ///
    /// `NotInitialized` if the channel is not open.
    pub fn cancel(&mut self) -> Result<()> {
        if !self.state.is_open() {
            return Err(ConfigError::NotInitialized.into());
        }
        if !self.state.is_in_flight() {
            return Ok(());
        }

        self.stop();
        let _ = self.bus.read(channel_reg(CH, XDMAC_CIS));

        self.state = ChannelState::Configured;

        debug!("xdmac ch{}: cancelled", CH);
        Ok(())
    }

    /// Disable the channel and release it.
    ///
    /// Any running transfer is stopped, and the call returns only once the
    /// hardware has let go of its memory. The XDMAC clock is left running
    /// since other channels may share it.
    ///
    /// # Errors
    ///
    /// `NotInitialized` if the channel is not open.
    pub fn close(&mut self) -> Result<()> {
        if !self.state.is_open() {
            return Err(ConfigError::NotInitialized.into());
        }

        if self.state.is_in_flight() {
            self.stop();
        } else {
            self.bus.write(XDMAC_GD, channel_bit(CH));
        }
        self.bus.write(channel_reg(CH, XDMAC_CID), XDMAC_CI_ALL);
        let _ = self.bus.read(channel_reg(CH, XDMAC_CIS));

        self.config = None;
        self.state = ChannelState::Closed;

        debug!("xdmac ch{}: closed", CH);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Interrupt sources
    // -------------------------------------------------------------------------

    /// Unmask the given channel interrupt sources
    pub fn enable_interrupts(&mut self, sources: ChannelInterrupts) -> Result<()> {
        if !self.state.is_open() {
            return Err(ConfigError::NotInitialized.into());
        }
        self.bus.write(channel_reg(CH, XDMAC_CIE), sources.bits());
        Ok(())
    }

    /// Mask every channel interrupt source
    pub fn disable_interrupts(&mut self) -> Result<()> {
        if !self.state.is_open() {
            return Err(ConfigError::NotInitialized.into());
        }
        self.bus.write(channel_reg(CH, XDMAC_CID), XDMAC_CI_ALL);
        Ok(())
    }

    /// Read and clear the channel interrupt status
    pub fn interrupt_status(&mut self) -> ChannelInterruptStatus {
        ChannelInterruptStatus::from_raw(self.bus.read(channel_reg(CH, XDMAC_CIS)))
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Disable the channel and wait for GS to confirm it
    fn stop(&mut self) {
        self.bus.write(XDMAC_GD, channel_bit(CH));
        // GS stays set until the current chunk has been flushed
        while self.hardware_active() {
            core::hint::spin_loop();
        }
        // Order the stop against later CPU access to the buffers
        fence(Ordering::SeqCst);
    }

    fn hardware_active(&self) -> bool {
        (self.bus.read(XDMAC_GS) & channel_bit(CH)) != 0
    }

    /// Refuse to touch the channel while its previous transfer is running
    fn ensure_idle(&mut self) -> Result<()> {
        if self.state.is_in_flight() {
            if self.hardware_active() {
                return Err(DmaError::ChannelBusy.into());
            }
            self.state = ChannelState::Complete;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
