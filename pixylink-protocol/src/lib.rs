//! Pixy2 Serial Protocol
//!
//! This crate implements the request/response protocol spoken by the Pixy2
//! vision sensor, independent of the bus it travels over.
//!
//! # Protocol Overview
//!
//! Requests are always sent without a checksum:
//! ```text
//! ┌──────┬──────┬──────┬────────┬─────────────┐
//! │ 0xAE │ 0xC1 │ TYPE │ LENGTH │ PAYLOAD     │
//! │ 1B   │ 1B   │ 1B   │ 1B     │ 0–255B      │
//! └──────┴──────┴──────┴────────┴─────────────┘
//! ```
//!
//! Responses either use the same plain header, or a checksummed one:
//! ```text
//! ┌──────┬──────┬──────┬────────┬──────────────┬─────────────┐
//! │ 0xAF │ 0xC1 │ TYPE │ LENGTH │ CHECKSUM LE  │ PAYLOAD     │
//! │ 1B   │ 1B   │ 1B   │ 1B     │ 2B           │ 0–255B      │
//! └──────┴──────┴──────┴────────┴──────────────┴─────────────┘
//! ```
//!
//! The checksum is the 16-bit wrapping sum of the payload bytes. The link is
//! an unframed byte stream, so [`Response::receive`] scans for the two sync
//! bytes before reading a header.
//!
//! Payloads are arrays of packed little-endian records ([`records`]) that
//! are read in place through a [`View`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod features;
pub mod frame;
pub mod records;
pub mod view;

pub use features::{LineFeatureSet, LineFeatures, SubBlock, SubBlocks};
pub use frame::{
    checksum, ChecksumMismatch, FrameError, PacketType, ReceiveError, Request, Response,
    DEFAULT_SYNC_ATTEMPTS, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, MAX_REQUEST_SIZE,
};
pub use records::{
    ColorBlock, IntersectionSegment, LineBarcode, LineFlags, LineIntersection, LineVector,
    VersionInfo,
};
pub use view::View;
