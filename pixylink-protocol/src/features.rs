//! Line-tracking feature payloads
//!
//! A line-features response payload is a sequence of sub-blocks:
//! ```text
//! ┌──────────┬─────────┬─────────────────┐
//! │ SUBTYPE  │ SUBLEN  │ DATA            │  repeated until the
//! │ 1B       │ 1B      │ SUBLEN bytes    │  payload is exhausted
//! └──────────┴─────────┴─────────────────┘
//! ```
//! Sub-types this client does not know are skipped, so newer firmware can
//! add features without breaking older hosts.

use core::ops::BitOr;

use crate::records::{LineBarcode, LineIntersection, LineVector};
use crate::view::View;

/// Set of line features to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineFeatureSet(u8);

impl LineFeatureSet {
    pub const VECTORS: Self = Self(0x01);
    pub const INTERSECTIONS: Self = Self(0x02);
    pub const BARCODES: Self = Self(0x04);
    pub const ALL: Self = Self(0x01 | 0x02 | 0x04);

    /// Raw bitmask as sent on the wire
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for LineFeatureSet {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for LineFeatureSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One `[subtype, length, data]` entry of a line-features payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubBlock<'a> {
    /// Sub-type tag (same bit values as [`LineFeatureSet`])
    pub kind: u8,
    pub data: &'a [u8],
}

/// Iterator over the sub-blocks of a line-features payload
///
/// A sub-block whose declared length runs past the payload yields the bytes
/// that are present and ends the walk.
#[derive(Debug, Clone)]
pub struct SubBlocks<'a> {
    remaining: &'a [u8],
}

impl<'a> SubBlocks<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { remaining: payload }
    }
}

impl<'a> Iterator for SubBlocks<'a> {
    type Item = SubBlock<'a>;

    fn next(&mut self) -> Option<SubBlock<'a>> {
        let (&kind, rest) = self.remaining.split_first()?;
        let Some((&len, body)) = rest.split_first() else {
            warn!("dangling line feature tag {=u8:#x}", kind);
            self.remaining = &[];
            return None;
        };

        let len = usize::from(len);
        let data = if len > body.len() {
            warn!(
                "line feature {=u8:#x} claims {} bytes, only {} left",
                kind,
                len,
                body.len()
            );
            self.remaining = &[];
            body
        } else {
            let (data, rest) = body.split_at(len);
            self.remaining = rest;
            data
        };
        Some(SubBlock { kind, data })
    }
}

/// Line features decoded from one response
///
/// Each view borrows the response the features were parsed from.
#[derive(Debug, Default)]
pub struct LineFeatures<'a> {
    pub vectors: View<'a, LineVector>,
    pub intersections: View<'a, LineIntersection>,
    pub barcodes: View<'a, LineBarcode>,
}

impl<'a> LineFeatures<'a> {
    /// No features
    pub const fn empty() -> Self {
        Self {
            vectors: View::empty(),
            intersections: View::empty(),
            barcodes: View::empty(),
        }
    }

    /// Walk a line-features payload
    ///
    /// If a sub-type appears more than once, the last occurrence wins.
    pub fn parse(payload: &'a [u8]) -> Self {
        let mut features = Self::empty();
        for block in SubBlocks::new(payload) {
            match block.kind {
                k if k == LineFeatureSet::VECTORS.bits() => {
                    features.vectors = View::from_bytes(block.data);
                }
                k if k == LineFeatureSet::INTERSECTIONS.bits() => {
                    features.intersections = View::from_bytes(block.data);
                }
                k if k == LineFeatureSet::BARCODES.bits() => {
                    features.barcodes = View::from_bytes(block.data);
                }
                other => {
                    trace!("skipping line feature {=u8:#x}", other);
                }
            }
        }
        features
    }

    /// Drop all views
    pub fn reset(&mut self) {
        self.vectors.reset();
        self.intersections.reset();
        self.barcodes.reset();
    }
}
