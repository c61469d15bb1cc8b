//! Client error taxonomy

use pixylink_hal::LinkError;
use pixylink_protocol::{PacketType, ReceiveError};

/// Errors returned by [`Pixy2`](crate::Pixy2) operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus-level failure, passed through from the link
    Transport(E),
    /// No frame sync within the attempt budget, or the startup deadline passed
    Timeout,
    /// Frame received but its payload failed the checksum
    InvalidChecksum { expected: u16, actual: u16 },
    /// Well-formed frame of the wrong type (protocol or firmware mismatch)
    InvalidResponseType {
        expected: PacketType,
        /// Raw tag received
        actual: u8,
    },
    /// The sensor answered with its error frame; poll again later
    DeviceBusy,
}

impl<E> Error<E> {
    /// Whether repeating the same transaction may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Timeout | Error::InvalidChecksum { .. } | Error::DeviceBusy
        )
    }
}

impl<E: LinkError> Error<E> {
    /// Whether the sensor looks like it is still booting
    ///
    /// Used by the startup handshake to decide between polling again and
    /// giving up.
    pub fn is_not_ready(&self) -> bool {
        match self {
            Error::Timeout | Error::DeviceBusy => true,
            Error::Transport(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl<E> From<ReceiveError<E>> for Error<E> {
    fn from(e: ReceiveError<E>) -> Self {
        match e {
            ReceiveError::Transport(e) => Error::Transport(e),
            ReceiveError::Timeout => Error::Timeout,
            ReceiveError::InvalidChecksum { expected, actual } => {
                Error::InvalidChecksum { expected, actual }
            }
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
            Error::Timeout => f.write_str("timed out"),
            Error::InvalidChecksum { expected, actual } => write!(
                f,
                "invalid checksum: expected {:#06x}, got {:#06x}",
                expected, actual
            ),
            Error::InvalidResponseType { expected, actual } => write!(
                f,
                "expected {:?} response, got type {:#04x}",
                expected, actual
            ),
            Error::DeviceBusy => f.write_str("device busy"),
        }
    }
}
