//! Frame encoding and decoding for the Pixy2 protocol.
//!
//! Request format:
//! - SYNC (2 bytes): 0xAE 0xC1
//! - TYPE (1 byte): packet type
//! - LENGTH (1 byte): payload length (0-255)
//! - PAYLOAD (0-255 bytes)
//!
//! Response format:
//! - SYNC (2 bytes): 0xAE 0xC1 (plain) or 0xAF 0xC1 (checksummed)
//! - TYPE (1 byte), LENGTH (1 byte)
//! - CHECKSUM (2 bytes, little-endian, checksummed frames only):
//!   16-bit wrapping sum of the payload bytes
//! - PAYLOAD (LENGTH bytes)

use heapless::Vec;
use zerocopy::FromBytes;

/// First sync byte of a plain frame
pub const SYNC_PLAIN: u8 = 0xAE;

/// First sync byte of a checksummed frame
pub const SYNC_CHECKSUM: u8 = 0xAF;

/// Second sync byte, shared by both frame kinds
pub const SYNC_SECOND: u8 = 0xC1;

/// Header size of a plain frame
pub const PLAIN_HEADER_SIZE: usize = 4;

/// Header size of a checksummed frame
pub const CHECKSUM_HEADER_SIZE: usize = 6;

/// Maximum payload size in bytes (the length field is one byte)
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// Maximum request size (requests never carry a checksum)
pub const MAX_REQUEST_SIZE: usize = PLAIN_HEADER_SIZE + MAX_PAYLOAD_SIZE;

/// Maximum response size
pub const MAX_FRAME_SIZE: usize = CHECKSUM_HEADER_SIZE + MAX_PAYLOAD_SIZE;

/// Bytes scanned for a sync sequence before giving up
pub const DEFAULT_SYNC_ATTEMPTS: u16 = 64;

/// Packet type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PacketType {
    /// Sensor-side error, e.g. no fresh frame available yet
    Error = 0x03,
    GetVersion = 0x0E,
    VersionResponse = 0x0F,
    GetBlocks = 0x20,
    BlocksResponse = 0x21,
    GetLineFeatures = 0x30,
    LineFeaturesResponse = 0x31,
}

impl PacketType {
    /// Decode a wire tag
    pub const fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x03 => Some(Self::Error),
            0x0E => Some(Self::GetVersion),
            0x0F => Some(Self::VersionResponse),
            0x20 => Some(Self::GetBlocks),
            0x21 => Some(Self::BlocksResponse),
            0x30 => Some(Self::GetLineFeatures),
            0x31 => Some(Self::LineFeaturesResponse),
            _ => None,
        }
    }

    /// Wire tag
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Errors that can occur while building or inspecting frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Bytes do not start with a valid sync sequence
    InvalidSync,
    /// Frame is shorter than its header declares
    Incomplete,
    /// Frame is longer than its header declares or than a frame can be
    FrameTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Field read past the end of the received frame
    OutOfBounds {
        /// Offset one past the last byte the read needed
        end: usize,
        /// Bytes actually available
        len: usize,
    },
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::InvalidSync => f.write_str("invalid sync bytes"),
            FrameError::Incomplete => f.write_str("incomplete frame"),
            FrameError::FrameTooLarge => f.write_str("frame too large"),
            FrameError::BufferTooSmall => f.write_str("buffer too small"),
            FrameError::OutOfBounds { end, len } => {
                write!(f, "read until {} but frame has only {} bytes", end, len)
            }
        }
    }
}

/// Embedded checksum does not match the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChecksumMismatch {
    /// Checksum carried in the header
    pub expected: u16,
    /// Checksum computed over the received payload
    pub actual: u16,
}

/// Errors while receiving a response from the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveError<E> {
    /// The link failed; the bus error is passed through unchanged
    Transport(E),
    /// No sync sequence within the attempt budget
    Timeout,
    /// Frame arrived but its payload is corrupted
    InvalidChecksum {
        expected: u16,
        actual: u16,
    },
}

impl<E> From<ChecksumMismatch> for ReceiveError<E> {
    fn from(m: ChecksumMismatch) -> Self {
        ReceiveError::InvalidChecksum {
            expected: m.expected,
            actual: m.actual,
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for ReceiveError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReceiveError::Transport(e) => write!(f, "transport error: {:?}", e),
            ReceiveError::Timeout => f.write_str("timed out waiting for sync"),
            ReceiveError::InvalidChecksum { expected, actual } => write!(
                f,
                "checksum mismatch: expected {:#06x}, got {:#06x}",
                expected, actual
            ),
        }
    }
}

/// 16-bit wrapping sum used by checksummed frames
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// An outgoing request with a payload of `N` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<const N: usize> {
    packet_type: PacketType,
    payload: [u8; N],
}

impl<const N: usize> Request<N> {
    const PAYLOAD_FITS: () = assert!(
        N <= MAX_PAYLOAD_SIZE,
        "request payload must fit a one-byte length"
    );

    /// Encoded size of this request
    pub const RAW_SIZE: usize = PLAIN_HEADER_SIZE + N;

    /// Create a request carrying `payload`
    pub const fn new(packet_type: PacketType, payload: [u8; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::PAYLOAD_FITS;
        Self {
            packet_type,
            payload,
        }
    }

    /// Packet type of this request
    pub const fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Header bytes: sync, type, payload length
    pub const fn header(&self) -> [u8; PLAIN_HEADER_SIZE] {
        [SYNC_PLAIN, SYNC_SECOND, self.packet_type.as_u8(), N as u8]
    }

    /// Encode this request into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        if buffer.len() < Self::RAW_SIZE {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[..PLAIN_HEADER_SIZE].copy_from_slice(&self.header());
        buffer[PLAIN_HEADER_SIZE..Self::RAW_SIZE].copy_from_slice(&self.payload);

        Ok(Self::RAW_SIZE)
    }

    /// Encode into a buffer sized for the largest request
    ///
    /// Returns the encoded bytes. Cannot fail: `N` is bounded at compile
    /// time.
    pub fn encode_max<'b>(&self, buffer: &'b mut [u8; MAX_REQUEST_SIZE]) -> &'b [u8] {
        buffer[..PLAIN_HEADER_SIZE].copy_from_slice(&self.header());
        buffer[PLAIN_HEADER_SIZE..Self::RAW_SIZE].copy_from_slice(&self.payload);
        &buffer[..Self::RAW_SIZE]
    }

    /// Encode this request into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_REQUEST_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_REQUEST_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

impl Request<0> {
    /// Create a request without payload
    pub const fn empty(packet_type: PacketType) -> Self {
        Self::new(packet_type, [])
    }
}

/// A received response frame
///
/// The buffer is meant to be reused: every [`receive`](Self::receive)
/// overwrites the previous frame, and anything borrowed from it must be
/// dropped first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    raw: Vec<u8, MAX_FRAME_SIZE>,
}

impl Response {
    /// Create an empty response buffer
    pub const fn new() -> Self {
        Self { raw: Vec::new() }
    }

    /// Wrap an already received frame
    ///
    /// The bytes must hold exactly one frame: sync, header and the declared
    /// payload. The checksum is not verified here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < 2 {
            return Err(FrameError::Incomplete);
        }
        if bytes[1] != SYNC_SECOND || (bytes[0] != SYNC_PLAIN && bytes[0] != SYNC_CHECKSUM) {
            return Err(FrameError::InvalidSync);
        }

        let mut raw = Vec::new();
        raw.extend_from_slice(bytes)
            .map_err(|_| FrameError::FrameTooLarge)?;
        let response = Self { raw };

        let header_size = response.header_size();
        if bytes.len() < header_size {
            return Err(FrameError::Incomplete);
        }
        let expected = header_size + response.payload_len();
        if bytes.len() < expected {
            return Err(FrameError::Incomplete);
        }
        if bytes.len() > expected {
            return Err(FrameError::FrameTooLarge);
        }
        Ok(response)
    }

    /// Drop the current frame
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Whether a frame is held
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether the frame carries a checksum
    pub fn has_checksum(&self) -> bool {
        self.raw.first() == Some(&SYNC_CHECKSUM)
    }

    /// Header size implied by the first sync byte
    pub fn header_size(&self) -> usize {
        if self.has_checksum() {
            CHECKSUM_HEADER_SIZE
        } else {
            PLAIN_HEADER_SIZE
        }
    }

    /// Raw type tag (0 when no frame is held)
    pub fn type_tag(&self) -> u8 {
        self.raw.get(2).copied().unwrap_or(0)
    }

    /// Decoded packet type, if the tag is known
    pub fn packet_type(&self) -> Option<PacketType> {
        PacketType::from_u8(self.type_tag())
    }

    /// Declared payload length
    pub fn payload_len(&self) -> usize {
        self.raw.get(3).copied().map_or(0, usize::from)
    }

    /// Payload bytes, without header
    pub fn payload(&self) -> &[u8] {
        self.raw.get(self.header_size()..).unwrap_or(&[])
    }

    /// Whole frame, header included
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Check the embedded checksum against the payload
    ///
    /// Plain frames always pass.
    pub fn verify_checksum(&self) -> Result<(), ChecksumMismatch> {
        if !self.has_checksum() || self.raw.len() < CHECKSUM_HEADER_SIZE {
            return Ok(());
        }

        let expected = u16::from_le_bytes([self.raw[4], self.raw[5]]);
        let actual = checksum(&self.raw[CHECKSUM_HEADER_SIZE..]);
        if expected != actual {
            error!("checksums don't match: {=u16:#x} != {=u16:#x}", actual, expected);
            return Err(ChecksumMismatch { expected, actual });
        }
        Ok(())
    }

    /// Read a fixed-layout field at `offset` into the payload
    pub fn try_read<T: FromBytes>(&self, offset: usize) -> Result<T, FrameError> {
        let start = self.header_size() + offset;
        let end = start + core::mem::size_of::<T>();
        let len = self.raw.len();
        if end > len {
            return Err(FrameError::OutOfBounds { end, len });
        }
        T::read_from_bytes(&self.raw[start..end]).map_err(|_| FrameError::OutOfBounds { end, len })
    }

    /// Read a fixed-layout field, falling back to an all-zero value
    ///
    /// A truncated frame is logged and yields the zero value instead of
    /// reading past the buffer.
    pub fn read<T: FromBytes>(&self, offset: usize) -> T {
        match self.try_read(offset) {
            Ok(value) => value,
            Err(e) => {
                if let FrameError::OutOfBounds { end, len } = e {
                    error!("attempted to read until {}, but only have {} bytes", end, len);
                }
                T::new_zeroed()
            }
        }
    }

    /// Receive one frame through `read`
    ///
    /// `read` must fill the whole buffer it is given (the link's receive).
    /// Scans at most `attempts` bytes for the sync sequence, then reads the
    /// rest of the header, the payload, and verifies the checksum. On error
    /// the buffer is left empty.
    pub fn receive<E, F>(&mut self, attempts: u16, mut read: F) -> Result<(), ReceiveError<E>>
    where
        F: FnMut(&mut [u8]) -> Result<(), E>,
    {
        self.raw.clear();
        let result = self.receive_inner(attempts, &mut read);
        if result.is_err() {
            self.raw.clear();
        }
        result
    }

    fn receive_inner<E, F>(&mut self, attempts: u16, read: &mut F) -> Result<(), ReceiveError<E>>
    where
        F: FnMut(&mut [u8]) -> Result<(), E>,
    {
        let first = Self::wait_for_sync(attempts, read)?;
        self.grow(2).copy_from_slice(&[first, SYNC_SECOND]);

        let header_size = self.header_size();
        read(self.grow(header_size - 2)).map_err(ReceiveError::Transport)?;

        let payload_len = self.payload_len();
        if payload_len > 0 {
            read(self.grow(payload_len)).map_err(ReceiveError::Transport)?;
        }

        self.verify_checksum()?;
        trace!(
            "received frame type {=u8:#x} with {} payload bytes",
            self.type_tag(),
            payload_len
        );
        Ok(())
    }

    /// Scan the stream byte by byte for `[SYNC_PLAIN | SYNC_CHECKSUM, SYNC_SECOND]`
    ///
    /// Returns the first sync byte.
    fn wait_for_sync<E, F>(attempts: u16, read: &mut F) -> Result<u8, ReceiveError<E>>
    where
        F: FnMut(&mut [u8]) -> Result<(), E>,
    {
        let mut prev = 0u8;
        let mut current = [0u8; 1];
        for _ in 0..attempts {
            read(&mut current).map_err(ReceiveError::Transport)?;
            if current[0] == SYNC_SECOND && (prev == SYNC_PLAIN || prev == SYNC_CHECKSUM) {
                return Ok(prev);
            }
            prev = current[0];
        }
        warn!("no sync found in {} bytes", attempts);
        Err(ReceiveError::Timeout)
    }

    /// Extend the frame by `additional` zero bytes and return them
    fn grow(&mut self, additional: usize) -> &mut [u8] {
        let start = self.raw.len();
        // Capacity covers the largest header plus a one-byte length, so
        // this never truncates.
        let _ = self.raw.resize(start + additional, 0);
        &mut self.raw[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CAP: usize = 512;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Exhausted;

    /// Byte source that serves a fixed stream and counts consumption
    struct Stream<'a> {
        bytes: &'a [u8],
        pos: usize,
    }

    impl<'a> Stream<'a> {
        fn new(bytes: &'a [u8]) -> Self {
            Self { bytes, pos: 0 }
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<(), Exhausted> {
            let end = self.pos + buf.len();
            if end > self.bytes.len() {
                return Err(Exhausted);
            }
            buf.copy_from_slice(&self.bytes[self.pos..end]);
            self.pos = end;
            Ok(())
        }
    }

    fn plain_frame(tag: u8, payload: &[u8]) -> Vec<u8, CAP> {
        let mut v = Vec::new();
        v.extend_from_slice(&[SYNC_PLAIN, SYNC_SECOND, tag, payload.len() as u8])
            .unwrap();
        v.extend_from_slice(payload).unwrap();
        v
    }

    fn checksum_frame(tag: u8, payload: &[u8], sum: u16) -> Vec<u8, CAP> {
        let mut v = Vec::new();
        let [lo, hi] = sum.to_le_bytes();
        v.extend_from_slice(&[SYNC_CHECKSUM, SYNC_SECOND, tag, payload.len() as u8, lo, hi])
            .unwrap();
        v.extend_from_slice(payload).unwrap();
        v
    }

    #[test]
    fn test_request_encode_empty_payload() {
        let request = Request::empty(PacketType::GetVersion);
        let encoded = request.encode_to_vec().unwrap();
        assert_eq!(&encoded[..], &[0xAE, 0xC1, 0x0E, 0x00]);
        assert_eq!(Request::<0>::RAW_SIZE, 4);
    }

    #[test]
    fn test_request_encode_with_payload() {
        let request = Request::new(PacketType::GetBlocks, [0xFF, 5]);
        let mut buffer = [0u8; 8];
        let len = request.encode(&mut buffer).unwrap();

        assert_eq!(len, 6);
        assert_eq!(&buffer[..len], &[0xAE, 0xC1, 0x20, 0x02, 0xFF, 0x05]);
        assert_eq!(request.payload(), &[0xFF, 5]);
        assert_eq!(request.packet_type(), PacketType::GetBlocks);

        let mut max = [0u8; MAX_REQUEST_SIZE];
        assert_eq!(request.encode_max(&mut max), &buffer[..len]);
    }

    #[test]
    fn test_request_buffer_too_small() {
        let request = Request::new(PacketType::GetLineFeatures, [0, 7]);
        let mut buffer = [0u8; 5];
        assert_eq!(request.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_packet_type_tags() {
        assert_eq!(PacketType::from_u8(0x03), Some(PacketType::Error));
        assert_eq!(PacketType::from_u8(0x31), Some(PacketType::LineFeaturesResponse));
        assert_eq!(PacketType::from_u8(0x99), None);
        assert_eq!(PacketType::BlocksResponse.as_u8(), 0x21);
    }

    #[test]
    fn test_header_size() {
        let plain = Response::from_bytes(&plain_frame(0x21, &[1, 2])).unwrap();
        assert_eq!(plain.header_size(), 4);
        assert!(!plain.has_checksum());

        let summed = Response::from_bytes(&checksum_frame(0x21, &[1, 2], 3)).unwrap();
        assert_eq!(summed.header_size(), 6);
        assert!(summed.has_checksum());
        assert_eq!(summed.payload(), &[1, 2]);
    }

    #[test]
    fn test_from_bytes_rejects_malformed() {
        assert_eq!(
            Response::from_bytes(&[0x00, 0xC1, 0x21, 0x00]),
            Err(FrameError::InvalidSync)
        );
        assert_eq!(
            Response::from_bytes(&[0xAE, 0xC1, 0x21, 0x03, 1]),
            Err(FrameError::Incomplete)
        );
        assert_eq!(
            Response::from_bytes(&[0xAE, 0xC1, 0x21, 0x00, 1]),
            Err(FrameError::FrameTooLarge)
        );
    }

    #[test]
    fn test_receive_plain_frame() {
        let bytes = plain_frame(0x0F, &[1, 2, 3]);
        let mut stream = Stream::new(&bytes);
        let mut response = Response::new();

        response
            .receive(DEFAULT_SYNC_ATTEMPTS, |buf| stream.read(buf))
            .unwrap();

        assert_eq!(response.packet_type(), Some(PacketType::VersionResponse));
        assert_eq!(response.payload_len(), 3);
        assert_eq!(response.payload(), &[1, 2, 3]);
        assert_eq!(stream.pos, bytes.len());
    }

    #[test]
    fn test_receive_checksummed_frame() {
        let payload = [0x10, 0x20, 0xF0];
        let bytes = checksum_frame(0x21, &payload, checksum(&payload));
        let mut stream = Stream::new(&bytes);
        let mut response = Response::new();

        response
            .receive(DEFAULT_SYNC_ATTEMPTS, |buf| stream.read(buf))
            .unwrap();
        assert_eq!(response.payload(), &payload);
        assert_eq!(response.header_size(), 6);
    }

    #[test]
    fn test_receive_invalid_checksum() {
        let payload = [1, 2, 3];
        let bytes = checksum_frame(0x21, &payload, 7);
        let mut stream = Stream::new(&bytes);
        let mut response = Response::new();

        let result = response.receive(DEFAULT_SYNC_ATTEMPTS, |buf| stream.read(buf));
        assert_eq!(
            result,
            Err(ReceiveError::InvalidChecksum {
                expected: 7,
                actual: 6
            })
        );
        assert!(response.is_empty());
    }

    #[test]
    fn test_resync_after_garbage() {
        let mut bytes: Vec<u8, CAP> = Vec::new();
        bytes
            .extend_from_slice(&[0x00, 0xFF, 0xC1, 0xAE, 0x12, 0xAF, 0x34])
            .unwrap();
        bytes.extend_from_slice(&plain_frame(0x21, &[9, 8])).unwrap();

        let mut stream = Stream::new(&bytes);
        let mut response = Response::new();
        response
            .receive(DEFAULT_SYNC_ATTEMPTS, |buf| stream.read(buf))
            .unwrap();

        assert_eq!(response.type_tag(), 0x21);
        assert_eq!(response.payload(), &[9, 8]);
    }

    #[test]
    fn test_resync_timeout_is_bounded() {
        let garbage = [0x55u8; 200];
        let mut stream = Stream::new(&garbage);
        let mut response = Response::new();

        let result = response.receive(64, |buf| stream.read(buf));
        assert_eq!(result, Err(ReceiveError::Timeout));
        assert_eq!(stream.pos, 64);
        assert!(response.is_empty());
    }

    #[test]
    fn test_transport_error_propagates() {
        let bytes = [0xAE, 0xC1, 0x21];
        let mut stream = Stream::new(&bytes);
        let mut response = Response::new();

        let result = response.receive(DEFAULT_SYNC_ATTEMPTS, |buf| stream.read(buf));
        assert_eq!(result, Err(ReceiveError::Transport(Exhausted)));
        assert!(response.is_empty());
    }

    #[test]
    fn test_receive_overwrites_previous_frame() {
        let mut bytes: Vec<u8, CAP> = Vec::new();
        bytes.extend_from_slice(&plain_frame(0x21, &[1, 2, 3, 4])).unwrap();
        bytes.extend_from_slice(&plain_frame(0x03, &[])).unwrap();
        let mut stream = Stream::new(&bytes);
        let mut response = Response::new();

        response.receive(8, |buf| stream.read(buf)).unwrap();
        assert_eq!(response.payload_len(), 4);
        response.receive(8, |buf| stream.read(buf)).unwrap();
        assert_eq!(response.packet_type(), Some(PacketType::Error));
        assert!(response.payload().is_empty());
    }

    #[test]
    fn test_read_fields() {
        let response = Response::from_bytes(&plain_frame(0x0F, &[0x34, 0x12, 0x07])).unwrap();
        assert_eq!(response.read::<u8>(2), 0x07);
        assert_eq!(response.try_read::<[u8; 2]>(0), Ok([0x34, 0x12]));
    }

    #[test]
    fn test_read_out_of_bounds_returns_default() {
        let response = Response::from_bytes(&plain_frame(0x0F, &[1, 2, 3])).unwrap();
        assert_eq!(
            response.try_read::<[u8; 4]>(0),
            Err(FrameError::OutOfBounds { end: 8, len: 7 })
        );
        assert_eq!(response.read::<[u8; 4]>(0), [0; 4]);
        assert_eq!(response.read::<u8>(3), 0);
    }

    proptest! {
        #[test]
        fn prop_checksum_validates_iff_matches(
            payload in proptest::collection::vec(any::<u8>(), 0..=255),
            embedded in any::<u16>(),
        ) {
            let sum = checksum(&payload);
            let response = Response::from_bytes(&checksum_frame(0x21, &payload, embedded)).unwrap();
            prop_assert_eq!(response.verify_checksum().is_ok(), embedded == sum);
        }

        #[test]
        fn prop_single_byte_mutation_breaks_checksum(
            payload in proptest::collection::vec(any::<u8>(), 1..=255),
            index in any::<prop::sample::Index>(),
            delta in 1u8..=255,
        ) {
            let mut bytes = checksum_frame(0x21, &payload, checksum(&payload));
            let i = CHECKSUM_HEADER_SIZE + index.index(payload.len());
            bytes[i] = bytes[i].wrapping_add(delta);
            let response = Response::from_bytes(&bytes).unwrap();
            prop_assert!(response.verify_checksum().is_err());
        }

        #[test]
        fn prop_resync_skips_garbage(
            garbage in proptest::collection::vec(any::<u8>().prop_filter("no sync tail", |b| *b != SYNC_SECOND), 0..60),
            payload in proptest::collection::vec(any::<u8>(), 0..32),
        ) {
            let mut bytes: Vec<u8, CAP> = Vec::new();
            bytes.extend_from_slice(&garbage).unwrap();
            bytes.extend_from_slice(&plain_frame(0x31, &payload)).unwrap();

            let mut stream = Stream::new(&bytes);
            let mut response = Response::new();
            response.receive(DEFAULT_SYNC_ATTEMPTS, |buf| stream.read(buf)).unwrap();
            prop_assert_eq!(response.payload(), &payload[..]);
            prop_assert_eq!(stream.pos, bytes.len());
        }
    }
}
