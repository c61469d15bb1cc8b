//! SPI link
//!
//! The Pixy2 answers on MISO while the master clocks; reads therefore
//! transmit zeros. The device is addressed by its chip select, which the
//! `SpiDevice` implementation manages.

use embedded_hal::spi::{self, SpiDevice};

use crate::link::{BusHandle, Link, LinkError};

/// Largest zero-filled transfer issued per read
pub const SPI_READ_CHUNK: usize = 32;

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity and phase
    pub mode: SpiMode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 6_000_000, // 6 MHz
            mode: SpiMode::Mode3,
        }
    }
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpiMode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1 (what the Pixy2 expects)
    Mode3,
}

impl From<SpiMode> for spi::Mode {
    fn from(mode: SpiMode) -> Self {
        match mode {
            SpiMode::Mode0 => spi::MODE_0,
            SpiMode::Mode1 => spi::MODE_1,
            SpiMode::Mode2 => spi::MODE_2,
            SpiMode::Mode3 => spi::MODE_3,
        }
    }
}

/// Error from an SPI link, wrapping the HAL error unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiLinkError<E>(pub E);

impl<E: spi::Error> LinkError for SpiLinkError<E> {
    fn is_transient(&self) -> bool {
        // SPI has no acknowledge; an absent sensor reads as garbage instead
        false
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for SpiLinkError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SPI bus error: {:?}", self.0)
    }
}

/// Link to a Pixy2 on an SPI bus
#[derive(Debug)]
pub struct SpiLink<'a, D> {
    device: BusHandle<'a, D>,
}

impl<'a, D: SpiDevice> SpiLink<'a, D> {
    /// Take ownership of the device; it is removed from the bus on drop
    pub fn owned(device: D) -> Self {
        Self {
            device: BusHandle::Owned(device),
        }
    }

    /// Use a device that stays owned by the caller
    pub fn attached(device: &'a mut D) -> Self {
        Self {
            device: BusHandle::Attached(device),
        }
    }

    /// Whether this link tears the device down on drop
    pub fn is_owner(&self) -> bool {
        self.device.is_owner()
    }

    /// Give an owned device back; `None` for attached links
    pub fn release(self) -> Option<D> {
        self.device.release()
    }
}

impl<'a, D: SpiDevice> Link for SpiLink<'a, D> {
    type Error = SpiLinkError<D::Error>;

    fn send(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.device.write(data).map_err(SpiLinkError)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let zeros = [0u8; SPI_READ_CHUNK];
        for chunk in buf.chunks_mut(SPI_READ_CHUNK) {
            let len = chunk.len();
            self.device
                .transfer(chunk, &zeros[..len])
                .map_err(SpiLinkError)?;
        }
        Ok(())
    }
}
