//! Sample acquisition pipelines
//!
//! Each pipeline pairs a [`SamplingPeripheral`] with a
//! [`ChannelController`] and drains the converter's result register into
//! caller-owned memory:
//!
//! - [`StreamingAcquisition`] - one input, one bounded transfer per call
//! - [`DoubleBufferedAcquisition`] - continuous capture alternating two buffers
//! - [`InterleavedScan`] - several inputs, round-robin layout in one buffer
//!
//! The pipelines only sequence the two collaborators. Pacing comes from the
//! converter's request line, so the channel is configured as a peripheral to
//! memory transfer of 16-bit units with the converter's handshake id.

pub mod sampler;
pub mod scan;
pub mod stream;

pub use sampler::{ConversionMode, SamplerConfig, SamplingPeripheral};
pub use scan::{InterleavedScan, channel_samples, deinterleave};
pub use stream::{DoubleBufferedAcquisition, Slot, StreamingAcquisition};

use crate::driver::channel::ChannelController;
use crate::driver::config::{DataWidth, TransferConfig};
use crate::driver::error::Result;
use crate::hal::clock::PeripheralClock;
use crate::register::RegisterBus;

/// Channel configuration that drains `sampler`'s result register
pub fn sampler_transfer_config<S: SamplingPeripheral>(sampler: &S) -> TransferConfig {
    TransferConfig::peripheral_to_memory(sampler.handshake_id(), DataWidth::HalfWord)
}

/// Open `channel` if needed and configure it to drain `sampler`
fn bind_channel<S, B, C, const CH: usize>(
    channel: &mut ChannelController<B, C, CH>,
    sampler: &S,
) -> Result<()>
where
    S: SamplingPeripheral,
    B: RegisterBus,
    C: PeripheralClock,
{
    if !channel.state().is_open() {
        channel.open()?;
    }
    channel.configure(sampler_transfer_config(sampler))
}
