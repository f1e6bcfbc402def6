//! Error types for the XDMAC driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Lifecycle misuse and clock bring-up failures
//! - [`DmaError`]: Transfer argument validation and busy channels
//! - [`IoError`]: Completion failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most driver methods.
//!
//! Allocation conflicts are deliberately absent: they are rejected while the
//! allocation registry is const-evaluated, so a conflicting build never
//! produces an artifact.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Lifecycle and bring-up errors
///
/// These errors occur when an operation is called in the wrong channel state
/// or a peripheral clock cannot be gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Channel already opened
    AlreadyInitialized,
    /// Channel not opened, or not configured for a transfer
    NotInitialized,
    /// Peripheral clock could not be enabled
    ClockError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::NotInitialized => "not initialized",
            ConfigError::ClockError => "clock configuration error",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Transfer validation errors
///
/// These are detected before any channel register is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Null address, zero or oversized count, or an inconsistent configuration
    InvalidParameter,
    /// The channel's hardware enable bit is still set from a previous transfer
    ChannelBusy,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::InvalidParameter => "invalid parameter",
            DmaError::ChannelBusy => "channel busy",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Completion errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Transfer did not complete within the timeout
    Timeout,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::NotInitialized)) => { /* ... */ }
///     Err(Error::Dma(DmaError::InvalidParameter)) => { /* ... */ }
///     Err(Error::Io(IoError::Timeout)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn config_error_as_str_non_empty() {
        let variants = [
            ConfigError::AlreadyInitialized,
            ConfigError::NotInitialized,
            ConfigError::ClockError,
        ];

        for variant in variants {
            assert!(!variant.as_str().is_empty(), "ConfigError::{:?} has empty string", variant);
        }
    }

    #[test]
    fn config_error_display() {
        assert_eq!(format!("{}", ConfigError::NotInitialized), "not initialized");
    }

    #[test]
    fn dma_error_display() {
        assert_eq!(format!("{}", DmaError::InvalidParameter), "invalid parameter");
        assert_eq!(format!("{}", DmaError::ChannelBusy), "channel busy");
    }

    #[test]
    fn io_error_display() {
        assert_eq!(format!("{}", IoError::Timeout), "operation timed out");
    }

    #[test]
    fn error_from_domain_errors() {
        assert_eq!(
            Error::from(ConfigError::AlreadyInitialized),
            Error::Config(ConfigError::AlreadyInitialized)
        );
        assert_eq!(
            Error::from(DmaError::InvalidParameter),
            Error::Dma(DmaError::InvalidParameter)
        );
        assert_eq!(Error::from(IoError::Timeout), Error::Io(IoError::Timeout));
    }

    #[test]
    fn error_display_is_prefixed_by_domain() {
        let display = format!("{}", Error::Config(ConfigError::ClockError));
        assert!(display.starts_with("config:"));
        assert!(display.contains("clock"));

        let display = format!("{}", Error::Dma(DmaError::ChannelBusy));
        assert!(display.starts_with("dma:"));

        let display = format!("{}", Error::Io(IoError::Timeout));
        assert!(display.starts_with("io:"));
        assert!(display.contains("timed out"));
    }

    #[test]
    fn question_mark_converts_domain_errors() {
        fn inner() -> DmaResult<()> {
            Err(DmaError::InvalidParameter)
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert_eq!(outer(), Err(Error::Dma(DmaError::InvalidParameter)));
    }
}
