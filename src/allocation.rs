//! Static DMA allocation registry
//!
//! Each intended DMA binding is declared as an [`AllocationDescriptor`]
//! (peripheral, request line, stream). The XDMAC lets any number of drivers
//! program the same channel's registers; whichever configures last wins and
//! the others silently lose their data. Collecting every descriptor in one
//! [`AllocationRegistry`] and checking it during constant evaluation turns
//! that runtime corruption into a build error.
//!
//! The registry is a plain `Copy` value built with `const fn`s, so the
//! [`dma_allocations!`](crate::dma_allocations) macro can validate it in a
//! `const` item:
//!
//! ```
//! use ph_sam_xdmac::allocation::{AllocationDescriptor, Peripheral, RequestLine};
//!
//! ph_sam_xdmac::dma_allocations!(ALLOCATIONS = [
//!     AllocationDescriptor::new(Peripheral::Usart0, RequestLine::Tx, 0),
//!     AllocationDescriptor::new(Peripheral::Spi0, RequestLine::Tx, 1),
//! ]);
//!
//! assert_eq!(ALLOCATIONS.len(), 2);
//! ```
//!
//! Two bindings on one stream do not compile:
//!
//! ```compile_fail
//! use ph_sam_xdmac::allocation::{AllocationDescriptor, Peripheral, RequestLine};
//!
//! ph_sam_xdmac::dma_allocations!(ALLOCATIONS = [
//!     AllocationDescriptor::new(Peripheral::Usart0, RequestLine::Tx, 0),
//!     AllocationDescriptor::new(Peripheral::Spi0, RequestLine::Tx, 0),
//! ]);
//! ```

use crate::internal::constants::{MAX_ALLOCATIONS, XDMAC_CHANNELS};

// =============================================================================
// Peripherals and Request Lines
// =============================================================================

/// Peripherals with an XDMAC request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Peripheral {
    Hsmci,
    Spi0,
    Spi1,
    Qspi,
    Usart0,
    Usart1,
    Usart2,
    Pwm0,
    Twihs0,
    Twihs1,
    Twihs2,
    Uart0,
    Uart1,
    Uart2,
    Uart3,
    Uart4,
    Dacc,
    Ssc,
    Pioa,
    Afec0,
    Afec1,
    Aes,
    Pwm1,
    Tc0,
    Tc1,
    Tc2,
    Tc3,
}

/// Direction of a peripheral's request line, seen from the peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RequestLine {
    /// Peripheral consumes data (memory to peripheral)
    Tx,
    /// Peripheral produces data (peripheral to memory)
    Rx,
}

impl Peripheral {
    /// XDMAC hardware interface id for `request`, if the peripheral has one
    #[must_use]
    pub const fn handshake_id(self, request: RequestLine) -> Option<u8> {
        use Peripheral as P;
        use RequestLine::{Rx, Tx};

        let id = match (self, request) {
            (P::Hsmci, _) => 0,
            (P::Spi0, Tx) => 1,
            (P::Spi0, Rx) => 2,
            (P::Spi1, Tx) => 3,
            (P::Spi1, Rx) => 4,
            (P::Qspi, Tx) => 5,
            (P::Qspi, Rx) => 6,
            (P::Usart0, Tx) => 7,
            (P::Usart0, Rx) => 8,
            (P::Usart1, Tx) => 9,
            (P::Usart1, Rx) => 10,
            (P::Usart2, Tx) => 11,
            (P::Usart2, Rx) => 12,
            (P::Pwm0, Tx) => 13,
            (P::Twihs0, Tx) => 14,
            (P::Twihs0, Rx) => 15,
            (P::Twihs1, Tx) => 16,
            (P::Twihs1, Rx) => 17,
            (P::Twihs2, Tx) => 18,
            (P::Twihs2, Rx) => 19,
            (P::Uart0, Tx) => 20,
            (P::Uart0, Rx) => 21,
            (P::Uart1, Tx) => 22,
            (P::Uart1, Rx) => 23,
            (P::Uart2, Tx) => 24,
            (P::Uart2, Rx) => 25,
            (P::Uart3, Tx) => 26,
            (P::Uart3, Rx) => 27,
            (P::Uart4, Tx) => 28,
            (P::Uart4, Rx) => 29,
            (P::Dacc, Tx) => 30,
            (P::Ssc, Tx) => 32,
            (P::Ssc, Rx) => 33,
            (P::Pioa, Rx) => 34,
            (P::Afec0, Rx) => 35,
            (P::Afec1, Rx) => 36,
            (P::Aes, Tx) => 37,
            (P::Aes, Rx) => 38,
            (P::Pwm1, Tx) => 39,
            (P::Tc0, Rx) => 40,
            (P::Tc1, Rx) => 41,
            (P::Tc2, Rx) => 42,
            (P::Tc3, Rx) => 43,
            _ => return None,
        };
        Some(id)
    }
}

// =============================================================================
// Allocation Descriptor
// =============================================================================

/// One intended DMA binding: a peripheral request line served by a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllocationDescriptor {
    peripheral: Peripheral,
    request: RequestLine,
    stream: u8,
}

impl AllocationDescriptor {
    /// Declare that `stream` serves `peripheral`'s `request` line
    pub const fn new(peripheral: Peripheral, request: RequestLine, stream: u8) -> Self {
        Self {
            peripheral,
            request,
            stream,
        }
    }

    /// Peripheral
    pub const fn peripheral(&self) -> Peripheral {
        self.peripheral
    }

    /// Request line
    pub const fn request(&self) -> RequestLine {
        self.request
    }

    /// Stream (XDMAC channel) index
    pub const fn stream(&self) -> u8 {
        self.stream
    }

    /// Stream index as a channel const parameter
    ///
    /// ```ignore
    /// const USART0_TX: AllocationDescriptor =
    ///     AllocationDescriptor::new(Peripheral::Usart0, RequestLine::Tx, 4);
    /// let dma: ChannelController<_, _, { USART0_TX.channel() }> = ChannelController::new(bus, pmc);
    /// ```
    pub const fn channel(&self) -> usize {
        self.stream as usize
    }

    /// Hardware interface id to program into the channel configuration
    pub const fn handshake_id(&self) -> Option<u8> {
        self.peripheral.handshake_id(self.request)
    }

    const fn same_as(&self, other: &Self) -> bool {
        self.peripheral as u8 == other.peripheral as u8
            && self.request as u8 == other.request as u8
            && self.stream == other.stream
    }
}

// =============================================================================
// Allocation Registry
// =============================================================================

const UNUSED: AllocationDescriptor =
    AllocationDescriptor::new(Peripheral::Hsmci, RequestLine::Tx, 0);

/// Fixed-capacity set of allocation descriptors
///
/// Built by chaining [`add`](Self::add); every operation is a `const fn` so
/// the registry can live in a `const` and be checked by the compiler.
#[derive(Debug, Clone, Copy)]
pub struct AllocationRegistry {
    entries: [AllocationDescriptor; MAX_ALLOCATIONS],
    len: usize,
}

impl AllocationRegistry {
    /// Empty registry
    pub const fn new() -> Self {
        Self {
            entries: [UNUSED; MAX_ALLOCATIONS],
            len: 0,
        }
    }

    /// Registry with `descriptor` appended.
    ///
    /// # Panics
    ///
    /// If the registry already holds 32 descriptors. In a `const` this is a
    /// build error.
    #[must_use]
    pub const fn add(self, descriptor: AllocationDescriptor) -> Self {
        assert!(self.len < MAX_ALLOCATIONS, "DMA allocation registry is full");

        let mut next = self;
        next.entries[next.len] = descriptor;
        next.len += 1;
        next
    }

    /// Number of descriptors
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no descriptor has been added
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Descriptor at `index` in insertion order
    pub const fn get(&self, index: usize) -> Option<&AllocationDescriptor> {
        if index < self.len {
            Some(&self.entries[index])
        } else {
            None
        }
    }

    /// Descriptors in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &AllocationDescriptor> {
        self.entries[..self.len].iter()
    }

    /// First pair of distinct descriptors sharing a stream, by index
    pub const fn find_conflict(&self) -> Option<(usize, usize)> {
        let mut i = 0;
        while i < self.len {
            let mut j = i + 1;
            while j < self.len {
                let a = &self.entries[i];
                let b = &self.entries[j];
                if a.stream == b.stream && !a.same_as(b) {
                    return Some((i, j));
                }
                j += 1;
            }
            i += 1;
        }
        None
    }

    /// Whether two distinct descriptors share a stream
    pub const fn has_conflicts(&self) -> bool {
        self.find_conflict().is_some()
    }

    /// Stream declared for `peripheral`'s `request` line
    pub const fn stream_of(&self, peripheral: Peripheral, request: RequestLine) -> Option<u8> {
        let mut i = 0;
        while i < self.len {
            let entry = &self.entries[i];
            if entry.peripheral as u8 == peripheral as u8 && entry.request as u8 == request as u8 {
                return Some(entry.stream);
            }
            i += 1;
        }
        None
    }

    /// Check every descriptor and the set as a whole.
    ///
    /// # Panics
    ///
    /// - A descriptor names a stream beyond the controller's 24 channels
    /// - A peripheral has no request line in the declared direction
    /// - Two distinct descriptors share a stream
    ///
    /// Called from a `const` item these are build errors.
    pub const fn validate(&self) {
        let mut i = 0;
        while i < self.len {
            let entry = &self.entries[i];
            assert!(
                (entry.stream as usize) < XDMAC_CHANNELS,
                "DMA allocation names a stream beyond the XDMAC channel count"
            );
            assert!(
                entry.handshake_id().is_some(),
                "DMA allocation names a request line the peripheral does not have"
            );
            i += 1;
        }

        assert!(!self.has_conflicts(), "two DMA allocations claim the same stream");
    }
}

impl Default for AllocationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Declare the application's DMA allocations as a checked constant.
///
/// Expands to a `const` [`AllocationRegistry`] named `$name` plus an
/// anonymous `const` that validates it, so a stream conflict, an
/// out-of-range stream or a missing request line fails the build.
///
/// ```ignore
/// ph_sam_xdmac::dma_allocations!(pub ALLOCATIONS = [
///     AllocationDescriptor::new(Peripheral::Afec0, RequestLine::Rx, 0),
///     AllocationDescriptor::new(Peripheral::Usart1, RequestLine::Tx, 1),
/// ]);
/// ```
#[macro_export]
macro_rules! dma_allocations {
    ($vis:vis $name:ident = [$($descriptor:expr),* $(,)?]) => {
        $vis const $name: $crate::allocation::AllocationRegistry =
            $crate::allocation::AllocationRegistry::new()$(.add($descriptor))*;

        const _: () = $name.validate();
    };
}

// =============================================================================
// Unit Tests
// =============================================================================
