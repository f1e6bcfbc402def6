//! Sampling peripheral abstraction
//!
//! The acquisition pipelines do not drive an analog front end directly.
//! A board crate implements [`SamplingPeripheral`] for its converter and
//! hands it to a pipeline, which sequences it together with a DMA channel.

use crate::driver::error::Result;

/// Conversion triggering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionMode {
    /// One conversion sequence per `start_conversion`
    SingleShot,
    /// Conversions repeat back to back once started
    #[default]
    FreeRunning,
}

/// Settings a pipeline applies to its sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplerConfig {
    /// Conversion triggering mode
    pub mode: ConversionMode,
    /// Tag each result with its channel number in the upper bits
    pub tag_channels: bool,
}

impl SamplerConfig {
    /// Free-running conversions without channel tags
    pub const fn free_running() -> Self {
        Self {
            mode: ConversionMode::FreeRunning,
            tag_channels: false,
        }
    }

    /// Set the conversion mode
    #[must_use]
    pub const fn with_mode(mut self, mode: ConversionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable channel tags
    #[must_use]
    pub const fn with_channel_tags(mut self, tag_channels: bool) -> Self {
        self.tag_channels = tag_channels;
        self
    }
}

/// A converter whose results a DMA channel can drain.
///
/// Each result appears in a single data register at
/// [`transfer_source_address`](Self::transfer_source_address), and the
/// converter raises the request line identified by
/// [`handshake_id`](Self::handshake_id) when a result is ready. When several
/// inputs are enabled the converter cycles through them in ascending order.
pub trait SamplingPeripheral {
    /// Take ownership of the converter and bring it out of reset
    fn open(&mut self) -> Result<()>;

    /// Apply conversion settings
    fn configure(&mut self, config: &SamplerConfig) -> Result<()>;

    /// Add an analog input to the conversion sequence
    fn enable_channel(&mut self, channel: u8) -> Result<()>;

    /// Remove an analog input from the conversion sequence
    fn disable_channel(&mut self, channel: u8) -> Result<()>;

    /// Start converting
    fn start_conversion(&mut self) -> Result<()>;

    /// Bus address of the result data register
    fn transfer_source_address(&self) -> usize;

    /// XDMAC hardware interface id of the converter's request line
    fn handshake_id(&self) -> u8;
}
