//! Pixy2 vision sensor client
//!
//! Blocking client for the Pixy2 camera. Every operation is one
//! transaction: send a request, then resynchronize on the byte stream and
//! read the response. Transactions on one [`Pixy2`] are serialized by a
//! mutex held across the whole send/receive pair, so the client can be
//! shared between tasks or threads.
//!
//! # Example
//!
//! ```ignore
//! use pixylink::{Pixy2, Response};
//! use pixylink::hal::{I2cConfig, I2cLink};
//!
//! let link = I2cLink::owned(i2c, I2cConfig::default().address);
//! let pixy: Pixy2<_> = Pixy2::new(link);
//! let version = pixy.wait_for_startup()?;
//!
//! let mut response = Response::new();
//! let blocks = pixy.get_objects(0xFF, 8, &mut response)?;
//! for block in &blocks {
//!     // blocks borrow `response` until the next call
//! }
//! ```
//!
//! Results that borrow a [`Response`] stay valid until that buffer is handed
//! to the next transaction; the borrow checker enforces this.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod client;
pub mod config;
pub mod error;

pub use client::Pixy2;
pub use config::ClientConfig;
pub use error::Error;

pub use pixylink_hal as hal;
pub use pixylink_protocol as protocol;

// Re-export the types every caller needs
pub use pixylink_protocol::{
    ColorBlock, LineBarcode, LineFeatureSet, LineFeatures, LineIntersection, LineVector,
    PacketType, Request, Response, VersionInfo, View,
};
