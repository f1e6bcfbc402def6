//! Multi-input interleaved scanning
//!
//! A scan enables several converter inputs and drains their results with a
//! single transfer of `samples_per_channel * inputs` units. The converter
//! cycles through its enabled inputs in ascending order, so the buffer ends
//! up round-robin:
//!
//! ```text
//! [in0, in1, .., inN-1, in0, in1, .., inN-1, ..]
//! ```
//!
//! The DMA engine has no notion of inputs once the transfer runs. Recovering
//! one input's series is a strided read done after completion, see
//! [`channel_samples`] and [`deinterleave`].

use embedded_hal::delay::DelayNs;

use super::bind_channel;
use super::sampler::{SamplerConfig, SamplingPeripheral};
use crate::driver::channel::ChannelController;
use crate::driver::error::{ConfigError, DmaError, Result};
use crate::hal::clock::PeripheralClock;
use crate::internal::constants::{MAX_SCAN_CHANNELS, MAX_TRANSFER_COUNT};
use crate::register::RegisterBus;

/// Several converter inputs drained into one interleaved buffer
#[derive(Debug)]
pub struct InterleavedScan<S, B, C, const CH: usize>
where
    S: SamplingPeripheral,
    B: RegisterBus,
    C: PeripheralClock,
{
    sampler: S,
    channel: ChannelController<B, C, CH>,
    sampler_open: bool,
    inputs: [u8; MAX_SCAN_CHANNELS],
    input_count: usize,
}

impl<S, B, C, const CH: usize> InterleavedScan<S, B, C, CH>
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
            inputs: [0; MAX_SCAN_CHANNELS],
            input_count: 0,
        }
    }

    /// Enable `inputs` on the converter and bind the channel.
    ///
    /// Inputs are stored in ascending order, which is the order they appear
    /// in each round of the scan buffer. On failure every input enabled so
    /// far is disabled again and `init` may be retried.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` if the scan is already set up
    /// - `InvalidParameter` for an empty list, more than 16 inputs, or a
    ///   repeated input
    pub fn init(&mut self, inputs: &[u8]) -> Result<()> {
        if self.input_count != 0 {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        if inputs.is_empty() || inputs.len() > MAX_SCAN_CHANNELS {
            return Err(DmaError::InvalidParameter.into());
        }

        let mut sorted = [0u8; MAX_SCAN_CHANNELS];
        let sorted = &mut sorted[..inputs.len()];
        sorted.copy_from_slice(inputs);
        sorted.sort_unstable();
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(DmaError::InvalidParameter.into());
        }

        if !self.sampler_open {
            self.sampler.open()?;
            self.sampler_open = true;
        }
        self.sampler.configure(&SamplerConfig::free_running())?;

        let mut enabled = 0;
        let mut bound = Ok(());
        for &input in &*sorted {
            bound = self.sampler.enable_channel(input);
            if bound.is_err() {
                break;
            }
            enabled += 1;
        }
        let bound = bound
            .and_then(|()| bind_channel(&mut self.channel, &self.sampler))
            .and_then(|()| self.sampler.start_conversion());
        if let Err(e) = bound {
            for &input in &sorted[..enabled] {
                let _ = self.sampler.disable_channel(input);
            }
            return Err(e);
        }

        self.inputs[..sorted.len()].copy_from_slice(sorted);
        self.input_count = sorted.len();

        debug!("scan: {} inputs on xdmac ch{}", self.input_count, CH);
        Ok(())
    }

    /// Enabled inputs in buffer order
    pub fn inputs(&self) -> &[u8] {
        &self.inputs[..self.input_count]
    }

    /// Position of `input` within each round of the buffer
    pub fn slot_of(&self, input: u8) -> Option<usize> {
        self.inputs().iter().position(|&i| i == input)
    }

    /// Issue one transfer of `samples_per_channel` rounds into `buffer`.
    ///
    /// # Safety
    ///
    /// The hardware keeps writing into `buffer` after the borrow ends. The
    /// buffer must not be moved, dropped, read or written until the scan is
    /// observed complete or is stopped with [`cancel`](Self::cancel) or
    /// [`abort`](Self::abort).
    ///
    /// # Errors
    ///
    /// - `NotInitialized` before `init`
    /// - `InvalidParameter` if `samples_per_channel` is zero, the buffer is
    ///   too short, or the total exceeds the microblock length limit
    pub unsafe fn start_scan(
        &mut self,
        buffer: &mut [u16],
        samples_per_channel: usize,
    ) -> Result<()> {
        if self.input_count == 0 {
            return Err(ConfigError::NotInitialized.into());
        }

        let total = samples_per_channel
            .checked_mul(self.input_count)
            .filter(|&total| total != 0 && total <= buffer.len() && total <= MAX_TRANSFER_COUNT)
            .ok_or(DmaError::InvalidParameter)?;

        let src = self.sampler.transfer_source_address();
        // SAFETY: forwarded to the caller.
        unsafe { self.channel.transfer(src, buffer.as_mut_ptr() as usize, total) }
    }

    /// Whether the last scan has finished
    pub fn is_complete(&mut self) -> bool {
        self.channel.is_complete()
    }

    /// Wait for the last scan to finish
    pub fn wait_complete<D: DelayNs>(&mut self, delay: &mut D, timeout_us: u32) -> Result<()> {
        self.channel.wait_complete(delay, timeout_us)
    }

    /// Run one scan and wait for it.
    ///
    /// A scan that times out is cancelled before returning.
    pub fn scan_blocking<D: DelayNs>(
        &mut self,
        buffer: &mut [u16],
        samples_per_channel: usize,
        delay: &mut D,
        timeout_us: u32,
    ) -> Result<()> {
        // SAFETY: `buffer` stays borrowed until the scan has completed or
        // has been cancelled below.
        unsafe { self.start_scan(buffer, samples_per_channel)? };

        if let Err(e) = self.wait_complete(delay, timeout_us) {
            self.channel.cancel()?;
            return Err(e);
        }
        Ok(())
    }

    /// Stop the running scan, keeping the inputs bound
    pub fn cancel(&mut self) -> Result<()> {
        self.channel.cancel()
    }

    /// Close the channel and disable every scanned input.
    ///
    /// The converter stays open; `init` may bind a new input list.
    pub fn abort(&mut self) -> Result<()> {
        let count = core::mem::take(&mut self.input_count);
        let closed = self.channel.close();
        for &input in &self.inputs[..count] {
            self.sampler.disable_channel(input)?;
        }
        closed
    }

    /// The converter
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// The DMA channel
    pub fn channel(&self) -> &ChannelController<B, C, CH> {
        &self.channel
    }

    /// Take the scan apart
    pub fn release(self) -> (S, ChannelController<B, C, CH>) {
        (self.sampler, self.channel)
    }
}

// =============================================================================
// Deinterleaving
// =============================================================================

/// Samples of the input at `index` in an interleaved buffer of `channels`
/// inputs.
///
/// Yields nothing if `channels` is zero or `index` is out of range. A
/// trailing partial round contributes its sample when it reaches `index`.
pub fn channel_samples<T: Copy>(
    buffer: &[T],
    channels: usize,
    index: usize,
) -> impl Iterator<Item = T> + '_ {
    let (start, step) = if channels == 0 || index >= channels {
        (buffer.len(), 1)
    } else {
        (index.min(buffer.len()), channels)
    };
    buffer[start..].iter().copied().step_by(step)
}

/// Copy the samples of input `index` into `out`, returning how many were
/// written.
pub fn deinterleave<T: Copy>(buffer: &[T], channels: usize, index: usize, out: &mut [T]) -> usize {
    let mut written = 0;
    for (slot, sample) in out.iter_mut().zip(channel_samples(buffer, channels, index)) {
        *slot = sample;
        written += 1;
    }
    written
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::driver::channel::ChannelState;
    use crate::driver::error::{Error, IoError};
    use crate::testing::{MockClock, MockDelay, MockSampler, SimulatedXdmac};

    type Scan<'a> = InterleavedScan<MockSampler, &'a SimulatedXdmac, &'a MockClock, 5>;

    fn scan<'a>(sim: &'a SimulatedXdmac, clock: &'a MockClock) -> Scan<'a> {
        InterleavedScan::new(MockSampler::new(), ChannelController::new(sim, clock))
    }

    /// Converter output for `count` passes over `inputs`: input * 1000 + round
    fn rounds(inputs: &[u8], count: u32) -> Vec<u32> {
        (0..count)
            .flat_map(|round| inputs.iter().map(move |&input| u32::from(input) * 1000 + round))
            .collect()
    }

    #[test]
    fn init_enables_inputs_in_ascending_order() {
        let sim = SimulatedXdmac::new();
        let clock = MockClock::new();
        let mut scan = scan(&sim, &clock);

        scan.init(&[7, 1, 4]).unwrap();

        assert_eq!(scan.inputs(), [1, 4, 7]);
        assert_eq!(scan.sampler().enabled_channels, [1, 4, 7]);
        assert_eq!(scan.sampler().conversions_started, 1);
        assert_eq!(scan.slot_of(4), Some(1));
        assert_eq!(scan.slot_of(3), None);
        assert_eq!(scan.init(&[1]), Err(Error::Config(ConfigError::AlreadyInitialized)));
    }

    #[test]
    fn init_rejects_bad_input_lists() {
        let sim = SimulatedXdmac::new();
        let clock = MockClock::new();
        let invalid = Err(Error::Dma(DmaError::InvalidParameter));

        assert_eq!(scan(&sim, &clock).init(&[]), invalid);
        assert_eq!(scan(&sim, &clock).init(&[2, 3, 2]), invalid);
        assert_eq!(scan(&sim, &clock).init(&[0; MAX_SCAN_CHANNELS + 1]), invalid);
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn start_scan_validates_sizes() {
        let sim = SimulatedXdmac::new();
        let clock = MockClock::new();
        let mut scan = scan(&sim, &clock);
        let mut buffer = [0u16; 10];

        assert_eq!(
            unsafe { scan.start_scan(&mut buffer, 2) },
            Err(Error::Config(ConfigError::NotInitialized))
        );

        scan.init(&[0, 1, 2]).unwrap();
        sim.clear_writes();

        let invalid = Err(Error::Dma(DmaError::InvalidParameter));
        assert_eq!(unsafe { scan.start_scan(&mut buffer, 0) }, invalid);
        assert_eq!(unsafe { scan.start_scan(&mut buffer, 4) }, invalid);
        assert_eq!(unsafe { scan.start_scan(&mut buffer, usize::MAX) }, invalid);
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn scan_produces_round_robin_layout() {
        let sim = SimulatedXdmac::new();
        let clock = MockClock::new();
        let mut scan = scan(&sim, &clock);
        let mut delay = MockDelay::new();
        let inputs = [0u8, 3, 5, 9];
        let mut buffer = [0u16; 4 * 5];

        sim.map_mut(&mut buffer);
        sim.feed(rounds(&inputs, 5));

        scan.init(&inputs).unwrap();
        scan.scan_blocking(&mut buffer, 5, &mut delay, 10_000).unwrap();

        assert_eq!(buffer[..4], [0, 3000, 5000, 9000]);
        assert_eq!(buffer[4..8], [1, 3001, 5001, 9001]);

        for (slot, &input) in inputs.iter().enumerate() {
            let series: Vec<u16> = channel_samples(&buffer, inputs.len(), slot).collect();
            let expected: Vec<u16> = (0..5).map(|round| u16::from(input) * 1000 + round).collect();
            assert_eq!(series, expected);
        }
    }

    #[test]
    fn short_scan_leaves_tail_untouched() {
        let sim = SimulatedXdmac::new();
        let clock = MockClock::new();
        let mut scan = scan(&sim, &clock);
        let mut delay = MockDelay::new();
        let mut buffer = [0xAAAAu16; 8];

        sim.map_mut(&mut buffer);
        sim.feed(rounds(&[1, 2], 4));

        scan.init(&[1, 2]).unwrap();
        unsafe { scan.start_scan(&mut buffer, 2).unwrap() };
        assert!(!scan.is_complete());
        scan.wait_complete(&mut delay, 1_000).unwrap();

        assert_eq!(buffer, [1000, 2000, 1001, 2001, 0xAAAA, 0xAAAA, 0xAAAA, 0xAAAA]);
    }

    #[test]
    fn init_can_be_retried_after_rejected_input() {
        let sim = SimulatedXdmac::new();
        let clock = MockClock::new();
        let mut scan = scan(&sim, &clock);

        assert_eq!(scan.init(&[1, 40]), Err(Error::Dma(DmaError::InvalidParameter)));
        assert!(scan.inputs().is_empty());
        assert!(scan.sampler().enabled_channels.is_empty());

        scan.init(&[1, 2]).unwrap();
        assert_eq!(scan.inputs(), [1, 2]);
        assert_eq!(scan.sampler().enabled_channels, [1, 2]);
    }

    #[test]
    fn failed_channel_bring_up_disables_every_input() {
        let sim = SimulatedXdmac::new();
        let clock = MockClock::new();
        let mut scan = scan(&sim, &clock);

        clock.set_fail(true);
        assert_eq!(scan.init(&[4, 2, 6]), Err(Error::Config(ConfigError::ClockError)));
        assert!(scan.sampler().enabled_channels.is_empty());

        clock.set_fail(false);
        scan.init(&[4, 2, 6]).unwrap();
        assert_eq!(scan.sampler().enabled_channels, [2, 4, 6]);
    }

    #[test]
    fn timed_out_scan_is_cancelled() {
        let sim = SimulatedXdmac::new();
        let clock = MockClock::new();
        let mut scan = scan(&sim, &clock);
        let mut delay = MockDelay::new();
        let mut buffer = [0u16; 6];

        sim.map_mut(&mut buffer);
        sim.feed(rounds(&[0, 1], 2));

        scan.init(&[0, 1]).unwrap();
        assert_eq!(
            scan.scan_blocking(&mut buffer, 3, &mut delay, 100),
            Err(Error::Io(IoError::Timeout))
        );
        assert!(!sim.is_active(5));
        assert_eq!(scan.channel().state(), ChannelState::Configured);

        sim.feed(rounds(&[0, 1], 1));
        sim.tick();
        assert_eq!(sim.stores().len(), 4);
        assert_eq!(buffer, [0, 1000, 1, 1001, 0, 0]);
    }

    #[test]
    fn abort_then_init_with_new_inputs() {
        let sim = SimulatedXdmac::new();
        let clock = MockClock::new();
        let mut scan = scan(&sim, &clock);
        let mut delay = MockDelay::new();
        let mut buffer = [0u16; 4];

        sim.map_mut(&mut buffer);
        scan.init(&[1, 2]).unwrap();
        unsafe { scan.start_scan(&mut buffer, 2).unwrap() };

        scan.abort().unwrap();
        assert!(!sim.is_active(5));
        assert!(scan.inputs().is_empty());
        assert!(scan.sampler().enabled_channels.is_empty());
        assert_eq!(scan.channel().state(), ChannelState::Closed);

        scan.init(&[3, 8]).unwrap();
        sim.feed(rounds(&[3, 8], 2));
        scan.scan_blocking(&mut buffer, 2, &mut delay, 1_000).unwrap();
        assert_eq!(buffer, [3000, 8000, 3001, 8001]);
        assert_eq!(scan.sampler().conversions_started, 2);
    }

    #[test]
    fn strided_read_edge_cases() {
        let buffer = [10u16, 20, 30, 11, 21, 31, 12];

        assert!(channel_samples(&buffer, 3, 0).eq([10, 11, 12]));
        assert!(channel_samples(&buffer, 3, 2).eq([30, 31]));
        assert_eq!(channel_samples(&buffer, 0, 0).count(), 0);
        assert_eq!(channel_samples(&buffer, 3, 3).count(), 0);
        assert_eq!(channel_samples::<u16>(&[], 3, 1).count(), 0);
    }

    #[test]
    fn deinterleave_respects_output_length() {
        let buffer = [1u16, 2, 1, 2, 1, 2];
        let mut out = [0u16; 2];

        assert_eq!(deinterleave(&buffer, 2, 1, &mut out), 2);
        assert_eq!(out, [2, 2]);

        let mut wide = [0u16; 8];
        assert_eq!(deinterleave(&buffer, 2, 0, &mut wide), 3);
        assert_eq!(wide[..3], [1, 1, 1]);
    }
}
