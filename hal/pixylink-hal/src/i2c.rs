//! I2C link
//!
//! The Pixy2 behaves as an I2C slave that streams its response bytes on
//! every read. Writes are limited to small chunks because the sensor's I2C
//! receive buffer is shallow.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use crate::link::{BusHandle, Link, LinkError};

/// Default 7-bit address of the Pixy2
pub const DEFAULT_ADDRESS: u8 = 0x54;

/// Largest single write the sensor accepts
pub const I2C_WRITE_CHUNK: usize = 16;

/// I2C configuration
///
/// Handed to the board bring-up code that installs the bus driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2cConfig {
    /// 7-bit device address
    pub address: u8,
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            frequency: 500_000, // Pixy2 tolerates above fast mode
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        address: DEFAULT_ADDRESS,
        frequency: 100_000,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        address: DEFAULT_ADDRESS,
        frequency: 400_000,
    };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        address: DEFAULT_ADDRESS,
        frequency: 1_000_000,
    };

    /// Same clock, different device address
    pub const fn with_address(self, address: u8) -> Self {
        Self { address, ..self }
    }
}

/// Error from an I2C link, wrapping the HAL error unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cLinkError<E>(pub E);

impl<E: embedded_hal::i2c::Error> LinkError for I2cLinkError<E> {
    fn is_transient(&self) -> bool {
        // A booting sensor does not acknowledge its address
        matches!(
            self.0.kind(),
            ErrorKind::NoAcknowledge(_) | ErrorKind::ArbitrationLoss
        )
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for I2cLinkError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "I2C bus error: {:?}", self.0)
    }
}

/// Link to a Pixy2 on an I2C bus
#[derive(Debug)]
pub struct I2cLink<'a, B> {
    bus: BusHandle<'a, B>,
    address: u8,
}

impl<'a, B: I2c> I2cLink<'a, B> {
    /// Take ownership of the bus; it is released when the link is dropped
    pub fn owned(bus: B, address: u8) -> Self {
        Self {
            bus: BusHandle::Owned(bus),
            address,
        }
    }

    /// Use a bus that stays owned by the caller
    pub fn attached(bus: &'a mut B, address: u8) -> Self {
        Self {
            bus: BusHandle::Attached(bus),
            address,
        }
    }

    /// Device address this link talks to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Whether this link tears the bus down on drop
    pub fn is_owner(&self) -> bool {
        self.bus.is_owner()
    }

    /// Give an owned bus back; `None` for attached links
    pub fn release(self) -> Option<B> {
        self.bus.release()
    }
}

impl<'a, B: I2c> Link for I2cLink<'a, B> {
    type Error = I2cLinkError<B::Error>;

    fn send(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for chunk in data.chunks(I2C_WRITE_CHUNK) {
            self.bus.write(self.address, chunk).map_err(I2cLinkError)?;
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }
        self.bus.read(self.address, buf).map_err(I2cLinkError)
    }
}
