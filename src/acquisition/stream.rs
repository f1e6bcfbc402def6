//! Single-input streaming acquisition
//!
//! [`StreamingAcquisition`] issues one bounded transfer per call from a
//! free-running converter into a caller buffer. [`DoubleBufferedAcquisition`]
//! builds continuous capture on top of it by alternating two buffers: while
//! the hardware fills one, the caller processes the other.

use embedded_hal::delay::DelayNs;

use super::bind_channel;
use super::sampler::{SamplerConfig, SamplingPeripheral};
use crate::driver::channel::ChannelController;
use crate::driver::error::{ConfigError, DmaError, Result};
use crate::hal::clock::PeripheralClock;
use crate::register::RegisterBus;

// =============================================================================
// Streaming Acquisition
// =============================================================================

/// One converter input drained by one DMA channel
///
/// # Example
///
/// ```ignore
/// let mut stream = StreamingAcquisition::new(afec0, dma);
/// stream.init(4)?;
///
/// let mut block = [0u16; 256];
/// stream.acquire_blocking(&mut block, &mut delay, 10_000)?;
/// ```
#[derive(Debug)]
pub struct StreamingAcquisition<S, B, C, const CH: usize>
where
    S: SamplingPeripheral,
    B: RegisterBus,
    C: PeripheralClock,
{
    sampler: S,
    channel: ChannelController<B, C, CH>,
    sampler_open: bool,
    input: Option<u8>,
}

impl<S, B, C, const CH: usize> StreamingAcquisition<S, B, C, CH>
where
    S: SamplingPeripheral,
    B: RegisterBus,
    C: PeripheralClock,
{
    /// Pair a converter with a channel. Nothing is touched until `init`.
    pub fn new(sampler: S, channel: ChannelController<B, C, CH>) -> Self {
        Self {
            sampler,
            channel,
            sampler_open: false,
            input: None,
        }
    }

    /// Start the converter free-running on `sampler_channel` and bind its
    /// result register as the channel's transfer source.
    ///
    /// The converter is opened on the first call only. If a later step
    /// fails the input is removed from the sequence again, so `init` can
    /// simply be retried.
    pub fn init(&mut self, sampler_channel: u8) -> Result<()> {
        if self.input.is_some() {
            return Err(ConfigError::AlreadyInitialized.into());
        }

        if !self.sampler_open {
            self.sampler.open()?;
            self.sampler_open = true;
        }
        self.sampler.configure(&SamplerConfig::free_running())?;
        self.sampler.enable_channel(sampler_channel)?;

        let bound = bind_channel(&mut self.channel, &self.sampler)
            .and_then(|()| self.sampler.start_conversion());
        if let Err(e) = bound {
            let _ = self.sampler.disable_channel(sampler_channel);
            return Err(e);
        }

        self.input = Some(sampler_channel);
        debug!("stream: input {} bound to xdmac ch{}", sampler_channel, CH);
        Ok(())
    }

    /// Issue one transfer of `count` samples into the front of `buffer`.
    ///
    /// Returns as soon as the transfer is started.
    ///
    /// # Safety
    ///
    /// The hardware keeps writing into `buffer` after the borrow ends. The
    /// buffer must not be moved, dropped, read or written until
    /// [`is_complete`](Self::is_complete) or
    /// [`wait_complete`](Self::wait_complete) confirms completion, or the
    /// transfer is stopped with [`cancel`](Self::cancel) or
    /// [`abort`](Self::abort).
    ///
    /// # Errors
    ///
    /// - `NotInitialized` before `init`
    /// - `InvalidParameter` if `count` is zero or exceeds `buffer.len()`
    /// - `ChannelBusy` while the previous acquisition is still running
    pub unsafe fn start_acquisition(&mut self, buffer: &mut [u16], count: usize) -> Result<()> {
        if self.input.is_none() {
            return Err(ConfigError::NotInitialized.into());
        }
        if count > buffer.len() {
            return Err(DmaError::InvalidParameter.into());
        }

        let src = self.sampler.transfer_source_address();
        // SAFETY: forwarded to the caller.
        unsafe { self.channel.transfer(src, buffer.as_mut_ptr() as usize, count) }
    }

    /// Whether the last acquisition has finished
    pub fn is_complete(&mut self) -> bool {
        self.channel.is_complete()
    }

    /// Wait for the last acquisition to finish
    pub fn wait_complete<D: DelayNs>(&mut self, delay: &mut D, timeout_us: u32) -> Result<()> {
        self.channel.wait_complete(delay, timeout_us)
    }

    /// Fill `buffer` and wait for it.
    ///
    /// If the wait times out the transfer is cancelled before returning, so
    /// `buffer` is never written after this call.
    pub fn acquire_blocking<D: DelayNs>(
        &mut self,
        buffer: &mut [u16],
        delay: &mut D,
        timeout_us: u32,
    ) -> Result<()> {
        let count = buffer.len();
        // SAFETY: `buffer` stays borrowed until the transfer has completed
        // or has been cancelled below.
        unsafe { self.start_acquisition(buffer, count)? };

        if let Err(e) = self.wait_complete(delay, timeout_us) {
            self.channel.cancel()?;
            return Err(e);
        }
        Ok(())
    }

    /// Stop the running acquisition and keep the pipeline ready for the
    /// next one.
    pub fn cancel(&mut self) -> Result<()> {
        self.channel.cancel()
    }

    /// Stop the channel outright and unbind the input.
    ///
    /// The converter stays open; `init` binds an input again.
    pub fn abort(&mut self) -> Result<()> {
        let input = self.input.take();
        let closed = self.channel.close();
        if let Some(input) = input {
            self.sampler.disable_channel(input)?;
        }
        closed
    }

    /// Whether `init` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.input.is_some()
    }

    /// Converter input bound by `init`
    pub fn input(&self) -> Option<u8> {
        self.input
    }

    /// The converter
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// The DMA channel
    pub fn channel(&self) -> &ChannelController<B, C, CH> {
        &self.channel
    }

    /// Take the pipeline apart
    pub fn release(self) -> (S, ChannelController<B, C, CH>) {
        (self.sampler, self.channel)
    }
}

// =============================================================================
// Double Buffering
// =============================================================================

/// One of the two buffers of a [`DoubleBufferedAcquisition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// First buffer
    A,
    /// Second buffer
    B,
}

impl Slot {
    /// The other buffer
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    const fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

/// Continuous capture over two buffers of `N` samples.
///
/// Exactly one buffer is the DMA target at any time. [`next_block`] waits for
/// it, immediately re-arms the channel on the other buffer, and only then
/// lends the finished buffer to the caller's closure.
///
/// The buffers are `'static` and owned by this type until [`finish`] hands
/// them back, so nothing else can reach the one in flight even if the value
/// is leaked. Dropping it cancels the running transfer.
///
/// Throughput is sustained as long as the closure returns before the other
/// buffer fills.
///
/// [`next_block`]: DoubleBufferedAcquisition::next_block
/// [`finish`]: DoubleBufferedAcquisition::finish
#[derive(Debug)]
pub struct DoubleBufferedAcquisition<'a, S, B, C, const CH: usize, const N: usize>
where
    S: SamplingPeripheral,
    B: RegisterBus,
    C: PeripheralClock,
{
    stream: &'a mut StreamingAcquisition<S, B, C, CH>,
    buffers: [&'static mut [u16; N]; 2],
    active: Slot,
    running: bool,
    blocks_completed: u32,
}

impl<'a, S, B, C, const CH: usize, const N: usize> DoubleBufferedAcquisition<'a, S, B, C, CH, N>
where
    S: SamplingPeripheral,
    B: RegisterBus,
    C: PeripheralClock,
{
    /// Borrow an initialized stream and take its two buffers
    pub fn new(
        stream: &'a mut StreamingAcquisition<S, B, C, CH>,
        a: &'static mut [u16; N],
        b: &'static mut [u16; N],
    ) -> Self {
        Self {
            stream,
            buffers: [a, b],
            active: Slot::A,
            running: false,
            blocks_completed: 0,
        }
    }

    /// Arm the first transfer into buffer A
    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Err(ConfigError::AlreadyInitialized.into());
        }

        // SAFETY: the buffer is owned by `self` and the transfer is stopped
        // by `finish` or `drop` before it can be reached again.
        unsafe {
            self.stream
                .start_acquisition(&mut self.buffers[Slot::A.index()][..], N)?;
        }
        self.active = Slot::A;
        self.running = true;
        Ok(())
    }

    /// Wait for the in-flight buffer, re-arm the other one and pass the
    /// finished samples to `f`.
    ///
    /// On `Timeout` nothing is re-armed and the same buffer stays in flight;
    /// calling `next_block` again resumes waiting on it.
    pub fn next_block<D, F, R>(&mut self, delay: &mut D, timeout_us: u32, f: F) -> Result<R>
    where
        D: DelayNs,
        F: FnOnce(&[u16]) -> R,
    {
        if !self.running {
            return Err(ConfigError::NotInitialized.into());
        }

        self.stream.wait_complete(delay, timeout_us)?;

        let done = self.active;
        let next = done.other();
        // SAFETY: as in `start`; the finished buffer is only lent out below
        // and is not the new target.
        let armed = unsafe {
            self.stream
                .start_acquisition(&mut self.buffers[next.index()][..], N)
        };
        if let Err(e) = armed {
            self.running = false;
            return Err(e);
        }
        self.active = next;
        self.blocks_completed = self.blocks_completed.wrapping_add(1);

        trace!("double buffer: block {} ready", self.blocks_completed);
        Ok(f(&self.buffers[done.index()][..]))
    }

    /// Number of blocks handed out so far
    pub fn blocks_completed(&self) -> u32 {
        self.blocks_completed
    }

    /// Buffer currently targeted by the hardware
    pub fn active_slot(&self) -> Slot {
        self.active
    }

    /// Whether a block is in flight
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop streaming and give back both buffers.
    ///
    /// The in-flight block is waited for and discarded. If it does not finish
    /// in time it is cancelled. Either way the hardware has stopped writing
    /// when the buffers are returned, and the stream stays initialized.
    pub fn finish<D: DelayNs>(
        mut self,
        delay: &mut D,
        timeout_us: u32,
    ) -> ([&'static mut [u16; N]; 2], Result<()>) {
        let outcome = self.stop(delay, timeout_us);

        // SAFETY: `self` is forgotten right away, so the buffers are moved
        // out exactly once and `drop` does not run.
        let buffers = unsafe { core::ptr::read(&self.buffers) };
        core::mem::forget(self);
        (buffers, outcome)
    }

    fn stop<D: DelayNs>(&mut self, delay: &mut D, timeout_us: u32) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;

        match self.stream.wait_complete(delay, timeout_us) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.stream.cancel()?;
                Err(e)
            }
        }
    }
}

impl<S, B, C, const CH: usize, const N: usize> Drop
    for DoubleBufferedAcquisition<'_, S, B, C, CH, N>
where
    S: SamplingPeripheral,
    B: RegisterBus,
    C: PeripheralClock,
{
    fn drop(&mut self) {
        if self.running {
            let _ = self.stream.cancel();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
