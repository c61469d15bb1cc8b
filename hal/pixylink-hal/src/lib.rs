//! Pixylink Hardware Abstraction Layer
//!
//! This crate defines the byte-stream link the Pixy2 client talks through,
//! and implements it for the two buses the sensor supports. Chip-specific
//! HALs provide the `embedded-hal` bus; this crate adds the Pixy2 framing
//! rules (chunk sizes, zero-clocked reads) and the bus ownership model.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pixylink (sensor client)               │
//! └─────────────────────────────────────────┘
//!                     │  Link::send / Link::receive
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixylink-hal (this crate)              │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-hal  │       │ embedded-hal  │
//! │   i2c::I2c    │       │spi::SpiDevice │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`Link`] - Blocking send/receive of raw bytes
//! - [`LinkError`] - Classifies bus errors the handshake may retry
//!
//! # Links
//!
//! - [`I2cLink`] - Addressed bus, writes split into 16-byte chunks
//! - [`SpiLink`] - Chip-select bus, reads clock out zeros in 32-byte chunks

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod link;
pub mod spi;

// Re-export key types at crate root for convenience
pub use i2c::{I2cConfig, I2cLink, I2cLinkError};
pub use link::{BusHandle, Link, LinkError};
pub use spi::{SpiConfig, SpiLink, SpiLinkError, SpiMode};
