//! Wire records carried in response payloads
//!
//! Every record is `repr(C)` over single-byte and little-endian integer
//! types, so it has no padding and no alignment requirement and can be
//! viewed directly inside a received frame. Field order and widths are the
//! sensor's byte layout; the size assertions below pin them.

use core::mem::size_of;

use zerocopy::little_endian::{I16, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

const _: () = assert!(size_of::<ColorBlock>() == 14);
const _: () = assert!(size_of::<VersionInfo>() == 16);
const _: () = assert!(size_of::<LineVector>() == 6);
const _: () = assert!(size_of::<IntersectionSegment>() == 4);
const _: () = assert!(size_of::<LineIntersection>() == 28);
const _: () = assert!(size_of::<LineBarcode>() == 4);

/// Maximum number of branches reported per intersection
pub const MAX_INTERSECTION_SEGMENTS: usize = 6;

/// A detected color-signature block
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ColorBlock {
    pub signature: U16,
    pub x: U16,
    pub y: U16,
    pub width: U16,
    pub height: U16,
    /// Rotation in degrees, color-code blocks only
    pub angle: I16,
    /// Tracking index, stable while the object stays in view
    pub index: u8,
    /// Frames the object has been tracked, saturating at 255
    pub age: u8,
}

impl ColorBlock {
    pub fn signature(&self) -> u16 {
        self.signature.get()
    }

    /// Center x in pixels
    pub fn x(&self) -> u16 {
        self.x.get()
    }

    /// Center y in pixels
    pub fn y(&self) -> u16 {
        self.y.get()
    }

    pub fn width(&self) -> u16 {
        self.width.get()
    }

    pub fn height(&self) -> u16 {
        self.height.get()
    }

    pub fn angle(&self) -> i16 {
        self.angle.get()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ColorBlock {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Block[sig={} x={} y={} w={} h={} angle={} idx={} age={}]",
            self.signature(),
            self.x(),
            self.y(),
            self.width(),
            self.height(),
            self.angle(),
            self.index,
            self.age
        );
    }
}

/// Hardware and firmware version of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct VersionInfo {
    pub hw_version: U16,
    pub fw_major: u8,
    pub fw_minor: u8,
    pub fw_build: U16,
    /// Firmware flavor, NUL padded
    pub fw_type: [u8; 10],
}

impl VersionInfo {
    pub fn hardware(&self) -> u16 {
        self.hw_version.get()
    }

    pub fn build(&self) -> u16 {
        self.fw_build.get()
    }

    /// Firmware flavor string (e.g. "general")
    ///
    /// Stops at the first NUL; non-UTF-8 content yields an empty string.
    pub fn firmware_type(&self) -> &str {
        let end = self
            .fw_type
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.fw_type.len());
        core::str::from_utf8(&self.fw_type[..end]).unwrap_or("")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for VersionInfo {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "hw {=u16:#x} fw {}.{}.{} ({})",
            self.hardware(),
            self.fw_major,
            self.fw_minor,
            self.build(),
            self.firmware_type()
        );
    }
}

/// Line vector flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineFlags(pub u8);

impl LineFlags {
    /// Vector was filtered out by the sensor
    pub const INVALID: u8 = 0x02;
    /// One of the vector's ends touches an intersection
    pub const INTERSECTION_PRESENT: u8 = 0x04;

    pub const fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

/// A tracked line segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct LineVector {
    pub x0: u8,
    pub y0: u8,
    pub x1: u8,
    pub y1: u8,
    pub index: u8,
    pub flags: u8,
}

impl LineVector {
    pub fn flags(&self) -> LineFlags {
        LineFlags(self.flags)
    }

    pub fn is_invalid(&self) -> bool {
        self.flags().contains(LineFlags::INVALID)
    }

    pub fn has_intersection(&self) -> bool {
        self.flags().contains(LineFlags::INTERSECTION_PRESENT)
    }
}

/// One branch leaving an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct IntersectionSegment {
    /// Index of the line vector forming this branch
    pub index: u8,
    pub reserved: u8,
    pub angle: I16,
}

impl IntersectionSegment {
    pub fn angle(&self) -> i16 {
        self.angle.get()
    }
}

/// A point where several line vectors meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct LineIntersection {
    pub x: u8,
    pub y: u8,
    pub segment_count: u8,
    pub reserved: u8,
    pub segments: [IntersectionSegment; MAX_INTERSECTION_SEGMENTS],
}

impl LineIntersection {
    /// Branches actually reported
    pub fn segments(&self) -> &[IntersectionSegment] {
        let count = usize::from(self.segment_count).min(MAX_INTERSECTION_SEGMENTS);
        &self.segments[..count]
    }
}

/// A detected barcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct LineBarcode {
    pub x: u8,
    pub y: u8,
    pub flags: u8,
    /// Decoded value, 0-15
    pub code: u8,
}
