//! Link abstraction
//!
//! A link is the already-configured byte pipe to one sensor. Bus bring-up
//! (pins, clocks, driver install) happens elsewhere; a link only moves bytes.

use core::ops::{Deref, DerefMut};

/// Classification of link errors
pub trait LinkError: core::fmt::Debug {
    /// Whether the error means "the device is not answering yet"
    ///
    /// The startup handshake keeps polling on transient errors and gives up
    /// on everything else.
    fn is_transient(&self) -> bool;
}

/// Blocking byte link to the sensor
///
/// Both operations block until the whole buffer has been moved or the bus
/// reports an error.
pub trait Link {
    /// Error type for link operations
    type Error: LinkError;

    /// Send all bytes in `data`
    fn send(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buf` completely with received bytes
    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<L: Link + ?Sized> Link for &mut L {
    type Error = L::Error;

    fn send(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).send(data)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).receive(buf)
    }
}

/// Bus resource held by a link
///
/// `Owned` buses are torn down together with the link (dropping the HAL
/// bus releases the peripheral). `Attached` buses belong to someone else and
/// are left untouched.
#[derive(Debug)]
pub enum BusHandle<'a, B> {
    /// The link owns the bus and releases it on drop
    Owned(B),
    /// The bus is shared with the caller, who keeps ownership
    Attached(&'a mut B),
}

impl<'a, B> BusHandle<'a, B> {
    /// Whether dropping this handle releases the bus
    pub fn is_owner(&self) -> bool {
        matches!(self, BusHandle::Owned(_))
    }

    /// Take the bus back out of the handle
    ///
    /// Returns `None` for attached buses, which were never ours to give.
    pub fn release(self) -> Option<B> {
        match self {
            BusHandle::Owned(bus) => Some(bus),
            BusHandle::Attached(_) => None,
        }
    }
}

impl<'a, B> Deref for BusHandle<'a, B> {
    type Target = B;

    fn deref(&self) -> &B {
        match self {
            BusHandle::Owned(bus) => bus,
            BusHandle::Attached(bus) => bus,
        }
    }
}

impl<'a, B> DerefMut for BusHandle<'a, B> {
    fn deref_mut(&mut self) -> &mut B {
        match self {
            BusHandle::Owned(bus) => bus,
            BusHandle::Attached(bus) => bus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct DropFlag<'a>(&'a Cell<bool>);

    impl Drop for DropFlag<'_> {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[test]
    fn test_owned_handle_is_owner() {
        let handle: BusHandle<'_, u8> = BusHandle::Owned(7);
        assert!(handle.is_owner());
        assert_eq!(*handle, 7);
        assert_eq!(handle.release(), Some(7));
    }

    #[test]
    fn test_attached_handle_does_not_release() {
        let mut bus = 3u8;
        {
            let mut handle = BusHandle::Attached(&mut bus);
            assert!(!handle.is_owner());
            *handle = 9;
            assert_eq!(handle.release(), None);
        }
        // Caller still owns the bus and sees writes made through the handle
        assert_eq!(bus, 9);
    }

    #[test]
    fn test_owned_handle_tears_down_bus() {
        let dropped = Cell::new(false);
        let handle = BusHandle::Owned(DropFlag(&dropped));
        let moved = handle;
        assert!(!dropped.get());
        drop(moved);
        assert!(dropped.get());
    }

    #[test]
    fn test_attached_handle_leaves_bus_alive() {
        let dropped = Cell::new(false);
        let mut bus = DropFlag(&dropped);
        drop(BusHandle::Attached(&mut bus));
        assert!(!dropped.get());
    }
}
